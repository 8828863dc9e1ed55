//! Testing utilities for code built on outcomes
//!
//! Assertion macros for checking the variant and error code of an
//! [`Outcome`](crate::Outcome), and (with the `proptest` feature) `Arbitrary`
//! implementations for property-based tests.
//!
//! # Examples
//!
//! ```rust
//! use sluice::{assert_error_code, assert_failure, assert_success, ErrorCode, Outcome};
//!
//! let ok = Outcome::success(42);
//! assert_success!(ok);
//!
//! let missing = Outcome::<i32>::failure(ErrorCode::NOT_FOUND);
//! assert_failure!(missing);
//!
//! let denied = Outcome::<i32>::failure(ErrorCode::UNAUTHORIZED);
//! assert_error_code!(denied, ErrorCode::UNAUTHORIZED);
//! ```

/// Assert that an outcome is a success.
///
/// This macro will panic if the outcome is a `Failure`.
///
/// # Example
///
/// ```rust
/// use sluice::{assert_success, Outcome};
///
/// assert_success!(Outcome::success("done"));
/// ```
#[macro_export]
macro_rules! assert_success {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Success(_) => {}
            $crate::Outcome::Failure(f) => {
                panic!("Expected Success, got Failure: {:?}", f);
            }
        }
    };
}

/// Assert that an outcome is a failure.
///
/// This macro will panic if the outcome is a `Success`.
///
/// # Example
///
/// ```rust
/// use sluice::{assert_failure, ErrorCode, Outcome};
///
/// assert_failure!(Outcome::<()>::failure(ErrorCode::NOT_FOUND));
/// ```
#[macro_export]
macro_rules! assert_failure {
    ($outcome:expr) => {
        match $outcome {
            $crate::Outcome::Failure(_) => {}
            $crate::Outcome::Success(s) => {
                panic!("Expected Failure, got Success: {:?}", s);
            }
        }
    };
}

/// Assert that an outcome is a failure with a specific error code.
///
/// # Example
///
/// ```rust
/// use sluice::{assert_error_code, ErrorCode, Outcome};
///
/// let o = Outcome::<()>::failure_with_message("bad input", ErrorCode::VALIDATION_FAILED);
/// assert_error_code!(o, ErrorCode::VALIDATION_FAILED);
/// ```
#[macro_export]
macro_rules! assert_error_code {
    ($outcome:expr, $expected:expr) => {
        match $outcome {
            $crate::Outcome::Failure(f) => {
                assert_eq!(f.error_code(), &$expected);
            }
            $crate::Outcome::Success(s) => {
                panic!(
                    "Expected Failure with code {}, got Success: {:?}",
                    $expected, s
                );
            }
        }
    };
}

#[cfg(feature = "proptest")]
use proptest::prelude::*;

#[cfg(feature = "proptest")]
use crate::{ErrorCode, Outcome};

/// Well-known codes plus short lowercase caller-defined ones.
#[cfg(feature = "proptest")]
impl Arbitrary for ErrorCode {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            Just(ErrorCode::NOT_FOUND),
            Just(ErrorCode::UNAUTHORIZED),
            Just(ErrorCode::UNAUTHENTICATED),
            Just(ErrorCode::VALIDATION_FAILED),
            Just(ErrorCode::UNEXPECTED_RESULT_FAILURE),
            Just(ErrorCode::UNCAUGHT_EXCEPTION_IN_THEN),
            "[a-z]{1,12}(-[a-z]{1,8})?".prop_map(ErrorCode::from),
        ]
        .boxed()
    }
}

/// Successes and failures with arbitrary (possibly empty) messages.
#[cfg(feature = "proptest")]
impl<T> Arbitrary for Outcome<T>
where
    T: Arbitrary + 'static,
{
    type Parameters = T::Parameters;
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(args: Self::Parameters) -> Self::Strategy {
        prop_oneof![
            (any_with::<T>(args), ".{0,24}")
                .prop_map(|(data, message)| Outcome::success_with_message(data, message)),
            (".{0,24}", any::<ErrorCode>())
                .prop_map(|(message, code)| Outcome::failure_with_message(message, code)),
        ]
        .boxed()
    }
}
