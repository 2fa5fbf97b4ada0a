//! # rxlite: a minimal push-based reactive stream library
//!
//! Single-threaded, callback-driven streams with deterministic cleanup.
//!
//! ## Quick Start
//!
//! ```rust
//! use rxlite::prelude::*;
//!
//! Observable::<i32, ()>::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .observe(FnMutObserver(|v| println!("Value: {}", v)))
//!   .unwrap();
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Cold stream, started by its first observer |
//! | [`Subject`] | Hot stream fed by hand, optional first replay |
//! | [`Observer`] | Consumes `next`, optional `error` / `complete` |
//! | [`Producer`] | Drives an observable through an [`Orchestrator`] |
//! | [`SubscriptionId`] | Identifies one registration, used to cancel it |
//!
//! Operators (`map`, `filter`, `reduce`) live in [`ops`] and are applied with
//! [`Source::pipe`], the [`pipe!`] macro, or the [`SourceExt`] methods.
//!
//! ## Feature Flags
//!
//! - **`future`** (default): [`Observable::from_future`] on top of `futures`
//!
//! [`Observer`]: observer::Observer
//! [`Orchestrator`]: orchestrator::Orchestrator
//! [`SourceExt`]: ops::SourceExt

/// Implements `error` and `complete` of an
/// [`Observer`](crate::observer::Observer) by forwarding them to the
/// orchestrator stored in `self.$field`.
///
/// An error the downstream cannot handle is handed back to the caller.
macro_rules! forward_terminal {
  ($field: ident) => {
    fn error(&mut self, err: Err) -> Result<(), Err> {
      self.$field.error(err).map_err($crate::error::UnhandledError::into_inner)
    }

    fn complete(&mut self) { self.$field.complete(); }
  };
}

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod orchestrator;
pub mod prelude;
pub mod producer;
mod registry;
pub mod subject;
pub mod validate;

pub use observable::{Observable, Source};
pub use producer::{IntoTeardown, Producer, Teardown};
pub use registry::SubscriptionId;
pub use subject::Subject;

// Re-export the prelude module
pub use prelude::*;
