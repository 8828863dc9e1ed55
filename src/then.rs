//! The chain operator
//!
//! `then` feeds the data of a successful [`Outcome`] into the next step and
//! returns whatever that step returns. A failure short-circuits: the step is
//! never called and the failure moves on unchanged. Every entry point shares
//! the same normalization rules:
//!
//! | situation                          | result                                                   |
//! |------------------------------------|----------------------------------------------------------|
//! | input is a failure                 | that failure, verbatim                                   |
//! | step is `None`                     | [`NULL_STEP_MESSAGE`], `UNEXPECTED_RESULT_FAILURE`       |
//! | step returns `None`                | [`NULL_RESULT_MESSAGE`], `UNEXPECTED_RESULT_FAILURE`     |
//! | step (or its future) panics        | [`PANIC_MESSAGE_PREFIX`] + text, `UNCAUGHT_EXCEPTION_IN_THEN`, panic kept as cause |
//! | pending input panics while polled  | [`PANIC_MESSAGE_PREFIX`] + text, `UNCAUGHT_EXCEPTION_IN_THEN`, panic kept as cause |
//! | otherwise                          | the step's outcome, untouched                            |
//!
//! # Entry points
//!
//! | input        | sync step                 | async step                            |
//! |--------------|---------------------------|---------------------------------------|
//! | `Outcome<T>` | [`Outcome::then`] → `Outcome<U>` | [`Outcome::then_async`] → `Pending<U>` |
//! | `Pending<T>` | [`Pending::then`] → `Pending<U>` | [`Pending::then_async`] → `Pending<U>` |
//!
//! Each has an `*_option` twin taking `Option<F>` for steps that may be absent.
//!
//! # Example
//!
//! ```rust
//! use sluice::{ErrorCode, Outcome};
//!
//! let outcome = Outcome::success_with_message(10, "ok")
//!     .then(|i| Outcome::success_with_message(format!("Value: {}", i), "done"));
//! assert_eq!(outcome, Outcome::success_with_message("Value: 10".to_string(), "done"));
//!
//! let stopped = Outcome::<i32>::failure(ErrorCode::NOT_FOUND)
//!     .then(|_| -> Outcome<i32> { unreachable!() });
//! assert_eq!(stopped.error_code(), Some(&ErrorCode::NOT_FOUND));
//! ```

use std::any::Any;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};

use futures::FutureExt;

use crate::{Cause, ErrorCode, Failure, Outcome, Pending};

/// Message of the failure produced when `then` is given no step.
pub const NULL_STEP_MESSAGE: &str = "The function passed to Then was null.";

/// Message of the failure produced when a step returns no outcome.
pub const NULL_RESULT_MESSAGE: &str = "The function passed to Then returned null.";

/// Prefix of the message produced when a step panics; the panic text follows.
pub const PANIC_MESSAGE_PREFIX: &str =
    "Unexpected unhandled exception caught in func used in Result.Then(<func>). ";

/// What a step may return.
///
/// A step returns either an [`Outcome`] or an `Option<Outcome>`, where `None`
/// stands for "produced nothing" and becomes a [`NULL_RESULT_MESSAGE`]
/// failure.
pub trait StepResult {
    /// Data type of the outcome the step produces.
    type Output;

    /// The produced outcome, or `None` if the step produced nothing.
    fn into_step_outcome(self) -> Option<Outcome<Self::Output>>;
}

impl<U> StepResult for Outcome<U> {
    type Output = U;

    #[inline]
    fn into_step_outcome(self) -> Option<Outcome<U>> {
        Some(self)
    }
}

impl<U> StepResult for Option<Outcome<U>> {
    type Output = U;

    #[inline]
    fn into_step_outcome(self) -> Option<Outcome<U>> {
        self
    }
}

// Decide whether the step runs. Failure propagation is checked before the
// step's presence.
fn gate<T, F>(outcome: Outcome<T>, step: Option<F>) -> Result<(T, F), Failure> {
    match outcome {
        Outcome::Failure(failure) => {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                error_code = %failure.error_code(),
                "then short-circuited on failure"
            );
            Err(failure)
        }
        Outcome::Success(success) => match step {
            Some(step) => Ok((success.into_data(), step)),
            None => {
                #[cfg(feature = "tracing")]
                tracing::debug!("then called without a step");
                Err(Failure::new(ErrorCode::UNEXPECTED_RESULT_FAILURE)
                    .with_message(NULL_STEP_MESSAGE))
            }
        },
    }
}

fn settle<R: StepResult>(result: R) -> Outcome<R::Output> {
    match result.into_step_outcome() {
        Some(outcome) => outcome,
        None => {
            #[cfg(feature = "tracing")]
            tracing::debug!("step passed to then returned nothing");
            Failure::new(ErrorCode::UNEXPECTED_RESULT_FAILURE)
                .with_message(NULL_RESULT_MESSAGE)
                .into()
        }
    }
}

pub(crate) fn panicked<U>(payload: Box<dyn Any + Send>) -> Outcome<U> {
    let cause = Cause::panic(payload);

    #[cfg(feature = "tracing")]
    tracing::warn!(panic = %cause, "step passed to then panicked");

    Failure::new(ErrorCode::UNCAUGHT_EXCEPTION_IN_THEN)
        .with_message(format!("{}{}", PANIC_MESSAGE_PREFIX, cause.text()))
        .with_cause(cause)
        .into()
}

// Shared by every async entry point once the input outcome is resolved. The
// fault boundary covers both the call that builds the future and its await.
async fn bind_async<T, F, Fut>(
    outcome: Outcome<T>,
    step: Option<F>,
) -> Outcome<<Fut::Output as StepResult>::Output>
where
    F: FnOnce(T) -> Fut,
    Fut: Future,
    Fut::Output: StepResult,
{
    let (data, step) = match gate(outcome, step) {
        Ok(link) => link,
        Err(failure) => return failure.into(),
    };

    let future = match catch_unwind(AssertUnwindSafe(move || step(data))) {
        Ok(future) => future,
        Err(payload) => return panicked(payload),
    };

    match AssertUnwindSafe(future).catch_unwind().await {
        Ok(result) => settle(result),
        Err(payload) => panicked(payload),
    }
}

impl<T> Outcome<T> {
    /// Chain a synchronous step.
    ///
    /// On success the step receives the data and its outcome is returned
    /// as-is. On failure the step is not called.
    ///
    /// ```rust
    /// use sluice::{ErrorCode, Outcome};
    ///
    /// fn register(name: &str) -> Outcome<String> {
    ///     Outcome::success(name.to_string())
    ///         .then(|name| {
    ///             if name == "bob" {
    ///                 Outcome::failure_with_message(
    ///                     "User already exists",
    ///                     ErrorCode::VALIDATION_FAILED,
    ///                 )
    ///             } else {
    ///                 Outcome::success(name)
    ///             }
    ///         })
    ///         .then(|name| Outcome::success(format!("welcome, {}", name)))
    /// }
    ///
    /// assert_eq!(register("alice").into_data().as_deref(), Some("welcome, alice"));
    ///
    /// let taken = register("bob");
    /// assert_eq!(taken.message(), "User already exists");
    /// assert_eq!(taken.error_code(), Some(&ErrorCode::VALIDATION_FAILED));
    /// ```
    pub fn then<F, R>(self, step: F) -> Outcome<R::Output>
    where
        F: FnOnce(T) -> R,
        R: StepResult,
    {
        self.then_option(Some(step))
    }

    /// Chain a synchronous step that may be absent.
    ///
    /// ```rust
    /// use sluice::{ErrorCode, Outcome};
    ///
    /// let step: Option<fn(i32) -> Outcome<i32>> = None;
    /// let outcome = Outcome::success(1).then_option(step);
    /// assert_eq!(outcome.message(), "The function passed to Then was null.");
    /// assert_eq!(outcome.error_code(), Some(&ErrorCode::UNEXPECTED_RESULT_FAILURE));
    /// ```
    pub fn then_option<F, R>(self, step: Option<F>) -> Outcome<R::Output>
    where
        F: FnOnce(T) -> R,
        R: StepResult,
    {
        let (data, step) = match gate(self, step) {
            Ok(link) => link,
            Err(failure) => return failure.into(),
        };

        match catch_unwind(AssertUnwindSafe(move || step(data))) {
            Ok(result) => settle(result),
            Err(payload) => panicked(payload),
        }
    }

    /// Chain an asynchronous step, moving the chain into the async domain.
    ///
    /// ```rust
    /// use sluice::Outcome;
    ///
    /// # tokio_test::block_on(async {
    /// let outcome = Outcome::success(2)
    ///     .then_async(|n| async move { Outcome::success(n * 10) })
    ///     .then(|n| Outcome::success(n + 1))
    ///     .await;
    /// assert_eq!(outcome.into_data(), Some(21));
    /// # });
    /// ```
    pub fn then_async<'a, F, Fut>(
        self,
        step: F,
    ) -> Pending<'a, <Fut::Output as StepResult>::Output>
    where
        T: Send + 'a,
        F: FnOnce(T) -> Fut + Send + 'a,
        Fut: Future + Send + 'a,
        Fut::Output: StepResult,
        <Fut::Output as StepResult>::Output: Send + 'a,
    {
        self.into_pending().then_async(step)
    }

    /// Chain an asynchronous step that may be absent.
    pub fn then_async_option<'a, F, Fut>(
        self,
        step: Option<F>,
    ) -> Pending<'a, <Fut::Output as StepResult>::Output>
    where
        T: Send + 'a,
        F: FnOnce(T) -> Fut + Send + 'a,
        Fut: Future + Send + 'a,
        Fut::Output: StepResult,
        <Fut::Output as StepResult>::Output: Send + 'a,
    {
        self.into_pending().then_async_option(step)
    }
}

impl<'a, T: Send + 'a> Pending<'a, T> {
    /// Chain a synchronous step after the pending outcome resolves.
    ///
    /// ```rust
    /// use sluice::{Outcome, Pending};
    ///
    /// # tokio_test::block_on(async {
    /// let outcome = Pending::new(async { Outcome::success("42") })
    ///     .then(|s| match s.parse::<u32>() {
    ///         Ok(n) => Some(Outcome::success(n)),
    ///         Err(_) => None,
    ///     })
    ///     .await;
    /// assert_eq!(outcome.into_data(), Some(42));
    /// # });
    /// ```
    pub fn then<F, R>(self, step: F) -> Pending<'a, R::Output>
    where
        F: FnOnce(T) -> R + Send + 'a,
        R: StepResult + 'a,
        R::Output: Send + 'a,
    {
        self.then_option(Some(step))
    }

    /// Chain a synchronous step that may be absent.
    pub fn then_option<F, R>(self, step: Option<F>) -> Pending<'a, R::Output>
    where
        F: FnOnce(T) -> R + Send + 'a,
        R: StepResult + 'a,
        R::Output: Send + 'a,
    {
        Pending::new(async move { self.resolve().await.then_option(step) })
    }

    /// Chain an asynchronous step after the pending outcome resolves.
    ///
    /// ```rust
    /// use sluice::{ErrorCode, Outcome, Pending};
    ///
    /// async fn find_user(id: u32) -> Outcome<String> {
    ///     if id == 1 {
    ///         Outcome::success("ada".to_string())
    ///     } else {
    ///         Outcome::failure(ErrorCode::NOT_FOUND)
    ///     }
    /// }
    ///
    /// # tokio_test::block_on(async {
    /// let found = Outcome::success(1).into_pending().then_async(find_user).await;
    /// assert_eq!(found.into_data().as_deref(), Some("ada"));
    ///
    /// let missing = Outcome::success(2).into_pending().then_async(find_user).await;
    /// assert_eq!(missing.error_code(), Some(&ErrorCode::NOT_FOUND));
    /// # });
    /// ```
    pub fn then_async<F, Fut>(
        self,
        step: F,
    ) -> Pending<'a, <Fut::Output as StepResult>::Output>
    where
        F: FnOnce(T) -> Fut + Send + 'a,
        Fut: Future + Send + 'a,
        Fut::Output: StepResult,
        <Fut::Output as StepResult>::Output: Send + 'a,
    {
        self.then_async_option(Some(step))
    }

    /// Chain an asynchronous step that may be absent.
    pub fn then_async_option<F, Fut>(
        self,
        step: Option<F>,
    ) -> Pending<'a, <Fut::Output as StepResult>::Output>
    where
        F: FnOnce(T) -> Fut + Send + 'a,
        Fut: Future + Send + 'a,
        Fut::Output: StepResult,
        <Fut::Output as StepResult>::Output: Send + 'a,
    {
        Pending::new(async move {
            let outcome = self.resolve().await;
            bind_async(outcome, step).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Debug, PartialEq)]
    struct Boom(&'static str);

    fn failure_with_cause() -> Outcome<i32> {
        Failure::new(ErrorCode::new("upstream"))
            .with_message("upstream broke")
            .with_cause(Cause::error(std::io::Error::other("socket closed")))
            .into()
    }

    // Sync chaining

    #[test]
    fn test_then_returns_step_outcome_unchanged() {
        let outcome = Outcome::success_with_message(10, "ok")
            .then(|i| Outcome::success_with_message(format!("Value: {}", i), "done"));
        assert_eq!(
            outcome,
            Outcome::success_with_message("Value: 10".to_string(), "done")
        );
    }

    #[test]
    fn test_then_step_failure_is_returned() {
        let outcome = Outcome::success("bob").then(|_| {
            Outcome::<()>::failure_with_message("User already exists", ErrorCode::VALIDATION_FAILED)
        });
        assert_eq!(outcome.message(), "User already exists");
        assert_eq!(outcome.error_code(), Some(&ErrorCode::VALIDATION_FAILED));
        assert!(outcome.cause().is_none());
    }

    #[test]
    fn test_then_short_circuits_failure() {
        let called = AtomicBool::new(false);
        let outcome = failure_with_cause().then(|n| {
            called.store(true, Ordering::SeqCst);
            Outcome::success(n.to_string())
        });

        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(outcome.message(), "upstream broke");
        assert_eq!(outcome.error_code(), Some(&ErrorCode::new("upstream")));
        assert_eq!(outcome.cause().map(Cause::text), Some("socket closed"));
    }

    #[test]
    fn test_then_short_circuit_wins_over_missing_step() {
        let step: Option<fn(i32) -> Outcome<i32>> = None;
        let outcome = Outcome::<i32>::failure(ErrorCode::UNAUTHENTICATED).then_option(step);
        assert_eq!(outcome.error_code(), Some(&ErrorCode::UNAUTHENTICATED));
        assert_eq!(outcome.message(), crate::DEFAULT_MESSAGE);
    }

    #[test]
    fn test_then_missing_step() {
        let step: Option<fn(i32) -> Outcome<i32>> = None;
        let outcome = Outcome::success(1).then_option(step);
        assert_eq!(outcome.message(), NULL_STEP_MESSAGE);
        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNEXPECTED_RESULT_FAILURE)
        );
        assert!(outcome.cause().is_none());
    }

    #[test]
    fn test_then_step_returning_nothing() {
        let outcome = Outcome::success(1).then(|_| None::<Outcome<String>>);
        assert_eq!(outcome.message(), NULL_RESULT_MESSAGE);
        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNEXPECTED_RESULT_FAILURE)
        );
        assert!(outcome.cause().is_none());
    }

    #[test]
    fn test_then_captures_panic() {
        let outcome = Outcome::success(0).then(|_| -> Outcome<i32> { panic!("divide by zero") });

        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNCAUGHT_EXCEPTION_IN_THEN)
        );
        assert!(outcome.message().starts_with(PANIC_MESSAGE_PREFIX));
        assert_eq!(
            outcome.message(),
            "Unexpected unhandled exception caught in func used in Result.Then(<func>). divide by zero"
        );
        let cause = outcome.cause().unwrap();
        assert!(cause.is_panic());
        assert_eq!(cause.text(), "divide by zero");
    }

    #[test]
    fn test_then_keeps_exact_panic_payload() {
        let outcome = Outcome::success(()).then(|_| -> Outcome<()> {
            std::panic::panic_any(Boom("fuse"))
        });
        assert_eq!(
            outcome.cause().and_then(|c| c.downcast_ref::<Boom>()),
            Some(&Boom("fuse"))
        );
    }

    #[test]
    fn test_then_chain_stops_at_first_failure() {
        let downstream = AtomicBool::new(false);
        let outcome = Outcome::success("bob")
            .then(|name| {
                if name == "bob" {
                    Outcome::failure_with_message(
                        "User already exists",
                        ErrorCode::VALIDATION_FAILED,
                    )
                } else {
                    Outcome::success(name.len())
                }
            })
            .then(|len| {
                downstream.store(true, Ordering::SeqCst);
                Outcome::success(len * 2)
            })
            .then(|n| Outcome::success(n.to_string()));

        assert!(!downstream.load(Ordering::SeqCst));
        assert_eq!(outcome.message(), "User already exists");
        assert_eq!(outcome.error_code(), Some(&ErrorCode::VALIDATION_FAILED));
    }

    // Async chaining

    #[tokio::test]
    async fn test_then_async_from_outcome() {
        let outcome = Outcome::success_with_message(10, "ok")
            .then_async(|i| async move {
                tokio::task::yield_now().await;
                Outcome::success_with_message(format!("Value: {}", i), "done")
            })
            .await;
        assert_eq!(
            outcome,
            Outcome::success_with_message("Value: 10".to_string(), "done")
        );
    }

    #[tokio::test]
    async fn test_pending_then_sync_step() {
        let outcome = Pending::new(async { Outcome::success(4) })
            .then(|n| Outcome::success(n + 1))
            .await;
        assert_eq!(outcome.into_data(), Some(5));
    }

    #[tokio::test]
    async fn test_pending_short_circuits_async_step() {
        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();

        let outcome = failure_with_cause()
            .into_pending()
            .then_async(move |n| async move {
                flag.store(true, Ordering::SeqCst);
                Outcome::success(n)
            })
            .await;

        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(outcome.message(), "upstream broke");
        assert_eq!(outcome.cause().map(Cause::text), Some("socket closed"));
    }

    #[tokio::test]
    async fn test_pending_missing_async_step() {
        let step: Option<fn(i32) -> std::future::Ready<Outcome<i32>>> = None;
        let outcome = Outcome::success(1).then_async_option(step).await;
        assert_eq!(outcome.message(), NULL_STEP_MESSAGE);
        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNEXPECTED_RESULT_FAILURE)
        );
    }

    #[tokio::test]
    async fn test_pending_missing_sync_step() {
        let step: Option<fn(i32) -> Outcome<i32>> = None;
        let outcome = Outcome::success(1).into_pending().then_option(step).await;
        assert_eq!(outcome.message(), NULL_STEP_MESSAGE);
    }

    #[tokio::test]
    async fn test_async_step_resolving_to_nothing() {
        let outcome = Outcome::success(1)
            .then_async(|_| async { None::<Outcome<u8>> })
            .await;
        assert_eq!(outcome.message(), NULL_RESULT_MESSAGE);
        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNEXPECTED_RESULT_FAILURE)
        );
    }

    #[tokio::test]
    async fn test_async_step_panicking_before_await() {
        fn step(_: i32) -> std::future::Ready<Outcome<i32>> {
            panic!("failed to build request")
        }

        let outcome = Outcome::success(1).then_async(step).await;
        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNCAUGHT_EXCEPTION_IN_THEN)
        );
        assert_eq!(
            outcome.message(),
            format!("{}failed to build request", PANIC_MESSAGE_PREFIX)
        );
    }

    #[tokio::test]
    async fn test_async_step_panicking_during_await() {
        async fn step(n: i32) -> Outcome<i32> {
            tokio::task::yield_now().await;
            if n > 0 {
                std::panic::panic_any(Boom("mid-flight"));
            }
            Outcome::success(n)
        }

        let outcome = Outcome::success(1).into_pending().then_async(step).await;
        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNCAUGHT_EXCEPTION_IN_THEN)
        );
        assert!(outcome.message().starts_with(PANIC_MESSAGE_PREFIX));
        assert_eq!(
            outcome.cause().and_then(|c| c.downcast_ref::<Boom>()),
            Some(&Boom("mid-flight"))
        );
    }

    #[tokio::test]
    async fn test_pending_sync_step_panicking() {
        let outcome = Outcome::success(vec![1, 2])
            .into_pending()
            .then(|v| Outcome::success(v[5]))
            .await;
        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNCAUGHT_EXCEPTION_IN_THEN)
        );
        assert!(outcome.cause().unwrap().text().contains("index out of bounds"));
    }

    #[tokio::test]
    async fn test_mixed_chain_runs_in_order() {
        let trail = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (t1, t2, t3) = (trail.clone(), trail.clone(), trail.clone());

        let outcome = Outcome::success(1)
            .then(move |n| {
                t1.lock().unwrap().push("sync");
                Outcome::success(n + 1)
            })
            .then_async(move |n| async move {
                tokio::task::yield_now().await;
                t2.lock().unwrap().push("async");
                Outcome::success(n * 10)
            })
            .then(move |n| {
                t3.lock().unwrap().push("pending-sync");
                Outcome::success(n.to_string())
            })
            .await;

        assert_eq!(outcome.into_data().as_deref(), Some("20"));
        assert_eq!(*trail.lock().unwrap(), vec!["sync", "async", "pending-sync"]);
    }

    #[tokio::test]
    async fn test_panicking_input_skips_step_and_keeps_payload() {
        async fn cancelled() -> Outcome<i32> {
            std::panic::panic_any(String::from("task cancelled"))
        }

        let called = Arc::new(AtomicBool::new(false));
        let flag = called.clone();
        let outcome = Pending::new(cancelled())
            .then(move |n| {
                flag.store(true, Ordering::SeqCst);
                Outcome::success(n)
            })
            .await;

        assert!(!called.load(Ordering::SeqCst));
        assert_eq!(
            outcome.message(),
            format!("{}task cancelled", PANIC_MESSAGE_PREFIX)
        );
        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNCAUGHT_EXCEPTION_IN_THEN)
        );
        let cause = outcome.cause().unwrap();
        assert!(cause.is_panic());
        assert_eq!(
            cause.downcast_ref::<String>().map(String::as_str),
            Some("task cancelled")
        );
    }

    #[tokio::test]
    async fn test_panicking_input_before_async_step() {
        async fn explode() -> Outcome<i32> {
            std::panic::panic_any(Boom("input"))
        }

        let outcome = Pending::new(explode())
            .then_async(|n| async move { Outcome::success(n) })
            .await;

        assert_eq!(
            outcome.error_code(),
            Some(&ErrorCode::UNCAUGHT_EXCEPTION_IN_THEN)
        );
        assert_eq!(
            outcome.cause().and_then(|c| c.downcast_ref::<Boom>()),
            Some(&Boom("input"))
        );
    }
}
