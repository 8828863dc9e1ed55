//! Open, value-compared error codes
//!
//! An [`ErrorCode`] tags a [`Failure`](crate::Failure) with the kind of thing
//! that went wrong. It is deliberately *not* an enum: any crate can mint its
//! own codes with [`ErrorCode::new`] or [`ErrorCode::from_static`], and they
//! compare equal to the well-known constants whenever the code strings match.
//!
//! # Examples
//!
//! ```
//! use sluice::ErrorCode;
//!
//! // Library-defined
//! let missing = ErrorCode::NOT_FOUND;
//!
//! // Caller-defined, compared by value
//! const RATE_LIMITED: ErrorCode = ErrorCode::from_static("rate-limited");
//! let from_wire = ErrorCode::new(String::from("rate-limited"));
//!
//! assert_eq!(RATE_LIMITED, from_wire);
//! assert_ne!(RATE_LIMITED, missing);
//! assert_eq!(ErrorCode::new("not-found"), ErrorCode::NOT_FOUND);
//! ```

use std::borrow::Cow;
use std::fmt;

/// A labelled token identifying a kind of failure.
///
/// Two codes are equal iff their code strings are equal, so codes created in
/// different modules (or different crates) dispatch the same way.
///
/// ```
/// use sluice::{ErrorCode, Outcome};
///
/// fn describe(outcome: &Outcome<u32>) -> &'static str {
///     match outcome.error_code() {
///         None => "ok",
///         Some(code) if *code == ErrorCode::NOT_FOUND => "missing",
///         Some(code) if code.as_str() == "rate-limited" => "slow down",
///         Some(_) => "failed",
///     }
/// }
///
/// assert_eq!(describe(&Outcome::failure(ErrorCode::NOT_FOUND)), "missing");
/// assert_eq!(describe(&Outcome::failure(ErrorCode::new("rate-limited"))), "slow down");
/// assert_eq!(describe(&Outcome::success(1)), "ok");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ErrorCode(Cow<'static, str>);

impl ErrorCode {
    /// The requested entity does not exist.
    pub const NOT_FOUND: ErrorCode = ErrorCode::from_static("not-found");

    /// The caller is known but not allowed to do this.
    pub const UNAUTHORIZED: ErrorCode = ErrorCode::from_static("unauthorized");

    /// The caller could not be identified.
    pub const UNAUTHENTICATED: ErrorCode = ErrorCode::from_static("unauthenticated");

    /// Input was rejected by a validation step.
    pub const VALIDATION_FAILED: ErrorCode = ErrorCode::from_static("validation-failed");

    /// A chain link had nothing to call, got nothing back, or could not
    /// resolve its input.
    pub const UNEXPECTED_RESULT_FAILURE: ErrorCode =
        ErrorCode::from_static("unexpected-result-failure");

    /// A step passed to `then` panicked; the panic is kept as the cause.
    pub const UNCAUGHT_EXCEPTION_IN_THEN: ErrorCode =
        ErrorCode::from_static("uncaught-exception-in-then");

    /// Create a code from any string.
    ///
    /// ```
    /// use sluice::ErrorCode;
    ///
    /// let code = ErrorCode::new(format!("quota-{}", "exceeded"));
    /// assert_eq!(code.as_str(), "quota-exceeded");
    /// ```
    pub fn new(code: impl Into<Cow<'static, str>>) -> Self {
        ErrorCode(code.into())
    }

    /// Create a code from a string literal, usable in `const` items.
    #[inline]
    pub const fn from_static(code: &'static str) -> Self {
        ErrorCode(Cow::Borrowed(code))
    }

    /// The underlying code string.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ErrorCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for ErrorCode {
    fn from(code: &'static str) -> Self {
        ErrorCode::from_static(code)
    }
}

impl From<String> for ErrorCode {
    fn from(code: String) -> Self {
        ErrorCode(Cow::Owned(code))
    }
}
