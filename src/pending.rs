//! Pending outcomes: the asynchronous side of a chain
//!
//! A [`Pending<'a, T>`] is a boxed, `Send` future that resolves to an
//! [`Outcome<T>`]. It is what the asynchronous `then` entry points return, and
//! it can itself be chained with `then` / `then_async` before being awaited.
//!
//! A synchronous outcome enters the asynchronous domain through
//! [`Outcome::into_pending`], which resolves immediately with no side effects.
//!
//! # Example
//!
//! ```rust
//! use sluice::{Outcome, Pending};
//!
//! # tokio_test::block_on(async {
//! let pending: Pending<'_, i32> = Outcome::success(20).into_pending();
//! let doubled = pending
//!     .then(|n| Outcome::success(n * 2))
//!     .then_async(|n| async move { Outcome::success(n + 2) })
//!     .await;
//!
//! assert_eq!(doubled.into_data(), Some(42));
//! # });
//! ```

use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::future::{self, BoxFuture};
use futures::FutureExt;

use crate::then::panicked;
use crate::Outcome;

/// A future of an [`Outcome<T>`] that can be chained before it is awaited.
#[must_use = "futures do nothing unless polled"]
pub struct Pending<'a, T> {
    inner: BoxFuture<'a, Outcome<T>>,
}

impl<'a, T> Pending<'a, T> {
    /// Wrap any `Send` future that resolves to an outcome.
    ///
    /// ```rust
    /// use sluice::{Outcome, Pending};
    ///
    /// # tokio_test::block_on(async {
    /// let pending = Pending::new(async { Outcome::success("fetched") });
    /// assert_eq!(pending.await.into_data(), Some("fetched"));
    /// # });
    /// ```
    pub fn new<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Outcome<T>> + Send + 'a,
    {
        Pending {
            inner: future.boxed(),
        }
    }

    /// Await the input of a chain link.
    ///
    /// A panic while polling the input is captured the same way as a panic
    /// in a step: the payload becomes the cause of an
    /// `UNCAUGHT_EXCEPTION_IN_THEN` failure.
    pub(crate) async fn resolve(self) -> Outcome<T> {
        match AssertUnwindSafe(self.inner).catch_unwind().await {
            Ok(outcome) => outcome,
            Err(payload) => {
                #[cfg(feature = "tracing")]
                tracing::debug!("pending outcome panicked before resolving");
                panicked(payload)
            }
        }
    }
}

impl<'a, T: Send + 'a> Pending<'a, T> {
    /// A pending outcome that is already resolved.
    pub fn ready(outcome: Outcome<T>) -> Self {
        Pending::new(future::ready(outcome))
    }

    /// Run this pending chain inside a tracing span.
    ///
    /// The span is entered each time the chain is polled, following the
    /// standard `tracing::Instrument` pattern for async code.
    ///
    /// ```rust,ignore
    /// use sluice::Outcome;
    /// use tracing::info_span;
    ///
    /// let outcome = Outcome::success(user_id)
    ///     .then_async(load_user)
    ///     .instrument(info_span!("load_user", %user_id))
    ///     .await;
    /// ```
    #[cfg(feature = "tracing")]
    pub fn instrument(self, span: tracing::Span) -> Self {
        use tracing::Instrument as _;
        Pending::new(self.inner.instrument(span))
    }
}

impl<T> Outcome<T> {
    /// Lift a resolved outcome into the asynchronous domain.
    ///
    /// No work is scheduled and nothing is delayed: the returned future is
    /// ready on its first poll.
    ///
    /// ```rust
    /// use sluice::{ErrorCode, Outcome};
    ///
    /// # tokio_test::block_on(async {
    /// let failed = Outcome::<u8>::failure(ErrorCode::NOT_FOUND).into_pending().await;
    /// assert_eq!(failed.error_code(), Some(&ErrorCode::NOT_FOUND));
    /// # });
    /// ```
    pub fn into_pending<'a>(self) -> Pending<'a, T>
    where
        T: Send + 'a,
    {
        Pending::ready(self)
    }
}

impl<'a, T: Send + 'a> From<Outcome<T>> for Pending<'a, T> {
    fn from(outcome: Outcome<T>) -> Self {
        Pending::ready(outcome)
    }
}

impl<T> Future for Pending<'_, T> {
    type Output = Outcome<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<T> fmt::Debug for Pending<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pending")
            .field("inner", &"<future>")
            .finish()
    }
}
