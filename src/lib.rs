//! # Sluice
//!
//! > *"A gate in the channel: water flows on, or it stops here."*
//!
//! Short-circuiting outcome chains for synchronous and asynchronous steps.
//!
//! ## Philosophy
//!
//! A pipeline of fallible steps should read as a straight line:
//! - **Outcome** = a success with data, or a failure with a message, an
//!   open [`ErrorCode`] and an optional captured [`Cause`]
//! - **Then** = feed a success into the next step; a failure closes the gate
//!   and flows to the end untouched
//! - **Contained** = a panicking step becomes a failure, it never unwinds
//!   through the chain
//!
//! The same rules apply whether a step is sync or async, and chains can move
//! from one to the other freely via [`Pending`].
//!
//! ## Quick Example
//!
//! ```rust
//! use sluice::{ErrorCode, Outcome};
//!
//! fn parse(input: &str) -> Outcome<u32> {
//!     match input.parse() {
//!         Ok(n) => Outcome::success(n),
//!         Err(_) => Outcome::failure_with_message("not a number", ErrorCode::VALIDATION_FAILED),
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let outcome = Outcome::success("21")
//!     .then(parse)
//!     .then_async(|n| async move { Outcome::success_with_message(n * 2, "doubled") })
//!     .then(|n| Outcome::success(format!("answer: {}", n)))
//!     .await;
//!
//! assert_eq!(outcome.into_data().as_deref(), Some("answer: 42"));
//!
//! let rejected = Outcome::success("twenty-one").then(parse).then(|n| Outcome::success(n + 1));
//! assert_eq!(rejected.message(), "not a number");
//! assert_eq!(rejected.error_code(), Some(&ErrorCode::VALIDATION_FAILED));
//! # });
//! ```
//!
//! ## Features
//!
//! - `tracing`: emit events for short-circuits, captured panics and
//!   normalized failures, and enable `Pending::instrument`
//! - `proptest`: `Arbitrary` implementations for [`ErrorCode`] and
//!   [`Outcome`]

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod cause;
pub mod error_code;
pub mod outcome;
pub mod pending;
pub mod testing;
pub mod then;

// Re-exports
pub use cause::Cause;
pub use error_code::ErrorCode;
pub use outcome::{Failure, Outcome, Success, DEFAULT_MESSAGE};
pub use pending::Pending;
pub use then::StepResult;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cause::Cause;
    pub use crate::error_code::ErrorCode;
    pub use crate::outcome::{Failure, Outcome, Success};
    pub use crate::pending::Pending;
    pub use crate::then::StepResult;
}
