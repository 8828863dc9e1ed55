//! The two-variant outcome carrier
//!
//! An [`Outcome<T>`] is either a [`Success<T>`] holding data and a message,
//! or a [`Failure`] holding a message, an [`ErrorCode`] and an optional
//! [`Cause`]. Both variants always carry a non-empty message: when none is
//! supplied, [`DEFAULT_MESSAGE`] is used.
//!
//! # Examples
//!
//! ```
//! use sluice::{ErrorCode, Outcome, DEFAULT_MESSAGE};
//!
//! let ok = Outcome::success(42);
//! assert_eq!(ok.message(), DEFAULT_MESSAGE);
//! assert_eq!(ok.data(), Some(&42));
//!
//! let missing: Outcome<i32> =
//!     Outcome::failure_with_message("no user 7", ErrorCode::NOT_FOUND);
//! assert!(missing.is_failure());
//! assert_eq!(missing.error_code(), Some(&ErrorCode::NOT_FOUND));
//! ```

use std::error::Error as StdError;
use std::fmt;

use crate::{Cause, ErrorCode};

/// Message used whenever a success or failure is built without one.
pub const DEFAULT_MESSAGE: &str = "No message provided.";

fn normalize(message: String) -> String {
    if message.is_empty() {
        DEFAULT_MESSAGE.to_string()
    } else {
        message
    }
}

/// A successful outcome: the data plus a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Success<T> {
    data: T,
    message: String,
}

impl<T> Success<T> {
    /// Create a success with the default message.
    #[inline]
    pub fn new(data: T) -> Self {
        Success {
            data,
            message: DEFAULT_MESSAGE.to_string(),
        }
    }

    /// Replace the message. An empty message falls back to the default.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        Success {
            data: self.data,
            message: normalize(message.into()),
        }
    }

    /// The carried data.
    pub fn data(&self) -> &T {
        &self.data
    }

    /// The success message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Take the data, dropping the message.
    pub fn into_data(self) -> T {
        self.data
    }

    /// Split into data and message.
    pub fn into_parts(self) -> (T, String) {
        (self.data, self.message)
    }
}

/// A failed outcome.
///
/// `Failure` has no payload type, so the same value is a valid failure for
/// any `Outcome<T>`. That is what lets a failure pass through a chain of
/// differently-typed steps unchanged.
///
/// ```
/// use sluice::{ErrorCode, Failure, Outcome};
///
/// let failure = Failure::new(ErrorCode::UNAUTHORIZED).with_message("admins only");
/// let as_int: Outcome<i32> = failure.clone().into();
/// let as_text: Outcome<String> = failure.into();
/// assert_eq!(as_int.message(), as_text.message());
/// ```
///
/// Cloning keeps the cause's text and kind but not a captured panic payload,
/// so [`Cause::downcast_ref`] on a clone's cause returns `None`.
#[derive(Debug)]
pub struct Failure {
    message: String,
    error_code: ErrorCode,
    cause: Option<Cause>,
}

impl Failure {
    /// Create a failure with the default message and no cause.
    pub fn new(error_code: ErrorCode) -> Self {
        Failure {
            message: DEFAULT_MESSAGE.to_string(),
            error_code,
            cause: None,
        }
    }

    /// Replace the message. An empty message falls back to the default.
    pub fn with_message(self, message: impl Into<String>) -> Self {
        Failure {
            message: normalize(message.into()),
            ..self
        }
    }

    /// Attach the fault behind this failure.
    pub fn with_cause(self, cause: Cause) -> Self {
        Failure {
            cause: Some(cause),
            ..self
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The error code.
    pub fn error_code(&self) -> &ErrorCode {
        &self.error_code
    }

    /// The captured cause, if any.
    pub fn cause(&self) -> Option<&Cause> {
        self.cause.as_ref()
    }

    /// Split into message, code and cause.
    pub fn into_parts(self) -> (String, ErrorCode, Option<Cause>) {
        (self.message, self.error_code, self.cause)
    }
}

// Cause payloads are not clonable; the copy keeps the cause's text and kind.
impl Clone for Failure {
    fn clone(&self) -> Self {
        Failure {
            message: self.message.clone(),
            error_code: self.error_code.clone(),
            cause: self.cause.as_ref().map(Cause::detached),
        }
    }
}

impl PartialEq for Failure {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message
            && self.error_code == other.error_code
            && self.cause == other.cause
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code, self.message)
    }
}

impl StdError for Failure {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.cause.as_ref().map(|c| c as &(dyn StdError + 'static))
    }
}

/// The result of a computation step: a [`Success`] or a [`Failure`].
///
/// Chain steps with [`Outcome::then`] and friends; see the crate docs.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// The step produced data.
    Success(Success<T>),
    /// The step failed.
    Failure(Failure),
}

impl<T> Outcome<T> {
    /// Create a success with the default message.
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let o = Outcome::success("hi");
    /// assert_eq!(o.message(), "No message provided.");
    /// ```
    #[inline]
    pub fn success(data: T) -> Self {
        Outcome::Success(Success::new(data))
    }

    /// Create a success with a message.
    ///
    /// ```
    /// use sluice::Outcome;
    ///
    /// let o = Outcome::success_with_message(10, "ok");
    /// assert_eq!(o.message(), "ok");
    ///
    /// let blank = Outcome::success_with_message(10, "");
    /// assert_eq!(blank.message(), "No message provided.");
    /// ```
    pub fn success_with_message(data: T, message: impl Into<String>) -> Self {
        Outcome::Success(Success::new(data).with_message(message))
    }

    /// Create a failure with the default message.
    #[inline]
    pub fn failure(error_code: ErrorCode) -> Self {
        Outcome::Failure(Failure::new(error_code))
    }

    /// Create a failure with a message.
    pub fn failure_with_message(message: impl Into<String>, error_code: ErrorCode) -> Self {
        Outcome::Failure(Failure::new(error_code).with_message(message))
    }

    /// Returns `true` for a success.
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Returns `true` for a failure.
    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    /// The message of whichever variant this is.
    pub fn message(&self) -> &str {
        match self {
            Outcome::Success(s) => s.message(),
            Outcome::Failure(f) => f.message(),
        }
    }

    /// The success data, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            Outcome::Success(s) => Some(s.data()),
            Outcome::Failure(_) => None,
        }
    }

    /// The error code, if this is a failure.
    pub fn error_code(&self) -> Option<&ErrorCode> {
        self.as_failure().map(Failure::error_code)
    }

    /// The captured cause, if this is a failure that has one.
    pub fn cause(&self) -> Option<&Cause> {
        self.as_failure().and_then(Failure::cause)
    }

    /// Borrow the failure, if this is one.
    pub fn as_failure(&self) -> Option<&Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(f) => Some(f),
        }
    }

    /// Take the success data, discarding a failure.
    pub fn into_data(self) -> Option<T> {
        match self {
            Outcome::Success(s) => Some(s.into_data()),
            Outcome::Failure(_) => None,
        }
    }

    /// Take the failure, discarding a success.
    pub fn into_failure(self) -> Option<Failure> {
        match self {
            Outcome::Success(_) => None,
            Outcome::Failure(f) => Some(f),
        }
    }

    /// Convert to a `Result` so the outcome can leave the chain with `?`.
    ///
    /// ```
    /// use sluice::{ErrorCode, Failure, Outcome};
    ///
    /// fn load() -> Result<u32, Failure> {
    ///     let data = Outcome::success(3).into_result()?.into_data();
    ///     Ok(data * 2)
    /// }
    /// assert_eq!(load().unwrap(), 6);
    /// ```
    pub fn into_result(self) -> Result<Success<T>, Failure> {
        match self {
            Outcome::Success(s) => Ok(s),
            Outcome::Failure(f) => Err(f),
        }
    }
}

impl<T> From<Success<T>> for Outcome<T> {
    fn from(success: Success<T>) -> Self {
        Outcome::Success(success)
    }
}

impl<T> From<Failure> for Outcome<T> {
    fn from(failure: Failure) -> Self {
        Outcome::Failure(failure)
    }
}

impl<T> From<Result<T, Failure>> for Outcome<T> {
    fn from(result: Result<T, Failure>) -> Self {
        match result {
            Ok(data) => Outcome::success(data),
            Err(failure) => Outcome::Failure(failure),
        }
    }
}
