//! Captured causes attached to failures
//!
//! A [`Cause`] is the fault behind a [`Failure`](crate::Failure). The chain
//! operator creates one from a caught panic; callers may also attach their
//! own error when constructing a failure by hand.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

/// The fault that produced a failure.
///
/// Panic payloads are kept as-is, so the exact value passed to `panic!` or
/// [`std::panic::panic_any`] can be recovered with [`Cause::downcast_ref`].
///
/// ```
/// use sluice::Cause;
///
/// let cause = Cause::error(std::io::Error::other("disk full"));
/// assert_eq!(cause.to_string(), "disk full");
/// assert!(!cause.is_panic());
/// ```
pub struct Cause {
    text: String,
    origin: Origin,
}

enum Origin {
    Panic(Box<dyn Any + Send>),
    Error(Box<dyn StdError + Send + Sync>),
    // Copy of a cause whose payload could not be cloned.
    Detached { panic: bool },
}

impl Cause {
    /// Wrap a panic payload as returned by [`std::panic::catch_unwind`].
    ///
    /// Text is taken from `&str` and `String` payloads; anything else is
    /// described generically but still kept.
    pub fn panic(payload: Box<dyn Any + Send>) -> Self {
        let text = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            String::from("panic payload of unknown type")
        };

        Cause {
            text,
            origin: Origin::Panic(payload),
        }
    }

    /// Wrap an error value.
    pub fn error<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Cause {
            text: err.to_string(),
            origin: Origin::Error(Box::new(err)),
        }
    }

    /// Human-readable text of the fault.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// `true` if this cause was captured from a panic.
    pub fn is_panic(&self) -> bool {
        matches!(
            self.origin,
            Origin::Panic(_) | Origin::Detached { panic: true }
        )
    }

    /// Copy the text and kind without the payload.
    pub(crate) fn detached(&self) -> Self {
        Cause {
            text: self.text.clone(),
            origin: Origin::Detached {
                panic: self.is_panic(),
            },
        }
    }

    /// Borrow the original panic payload if it has type `T`.
    ///
    /// Error causes are reached through [`StdError::source`] instead.
    ///
    /// ```
    /// use sluice::Cause;
    ///
    /// #[derive(Debug, PartialEq)]
    /// struct Boom(u8);
    ///
    /// let payload = std::panic::catch_unwind(|| std::panic::panic_any(Boom(7))).unwrap_err();
    /// let cause = Cause::panic(payload);
    /// assert_eq!(cause.downcast_ref::<Boom>(), Some(&Boom(7)));
    /// ```
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match &self.origin {
            Origin::Panic(payload) => payload.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Recover the raw panic payload, e.g. to hand it to
    /// [`std::panic::resume_unwind`]. Returns `Err(self)` when there is no
    /// payload to give back.
    pub fn into_panic(self) -> Result<Box<dyn Any + Send>, Self> {
        match self.origin {
            Origin::Panic(payload) => Ok(payload),
            origin => Err(Cause {
                text: self.text,
                origin,
            }),
        }
    }
}

impl fmt::Debug for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_panic() { "panic" } else { "error" };
        f.debug_struct("Cause")
            .field("kind", &kind)
            .field("text", &self.text)
            .finish()
    }
}

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl StdError for Cause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match &self.origin {
            Origin::Error(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}

// Payloads are opaque, so equality looks at what can be observed.
impl PartialEq for Cause {
    fn eq(&self, other: &Self) -> bool {
        self.is_panic() == other.is_panic() && self.text == other.text
    }
}
