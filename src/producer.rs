//! The contract between an [`Observable`](crate::Observable) and the source
//! that drives it.
//!
//! A producer is started with an [`Orchestrator`] each time its observable
//! goes from zero to one observer. It begins emitting and hands back a
//! [`Teardown`] that is run when the observable goes back to zero observers.
//! Returning an error from `start` aborts the `observe` call that triggered
//! the activation.

use std::fmt;

use crate::{error::RxError, orchestrator::Orchestrator};

/// Releases whatever a producer acquired on activation.
///
/// Wraps an optional `FnOnce`, so it can run at most once. A teardown should
/// release its external resource (listener, task, upstream subscription) and
/// may call `complete()` on the orchestrator to tell observers still attached
/// that the source is going away.
#[must_use]
#[derive(Default)]
pub struct Teardown(Option<Box<dyn FnOnce()>>);

impl Teardown {
  pub fn new(f: impl FnOnce() + 'static) -> Self { Self(Some(Box::new(f))) }

  /// A producer with nothing to release.
  pub fn none() -> Self { Self(None) }

  #[inline]
  pub fn is_empty(&self) -> bool { self.0.is_none() }

  /// Run the teardown. Calling this on an empty teardown does nothing.
  pub fn run(self) {
    if let Some(f) = self.0 {
      f();
    }
  }
}

impl fmt::Debug for Teardown {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let kind = if self.is_empty() { "none" } else { "fn" };
    f.debug_tuple("Teardown").field(&kind).finish()
  }
}

/// What a producer closure may return from activation.
pub trait IntoTeardown {
  fn into_teardown(self) -> Result<Teardown, RxError>;
}

impl IntoTeardown for () {
  #[inline]
  fn into_teardown(self) -> Result<Teardown, RxError> { Ok(Teardown::none()) }
}

impl IntoTeardown for Teardown {
  #[inline]
  fn into_teardown(self) -> Result<Teardown, RxError> { Ok(self) }
}

impl IntoTeardown for Result<Teardown, RxError> {
  #[inline]
  fn into_teardown(self) -> Result<Teardown, RxError> { self }
}

impl IntoTeardown for Result<(), RxError> {
  #[inline]
  fn into_teardown(self) -> Result<Teardown, RxError> {
    self.map(|_| Teardown::none())
  }
}

/// A value source driving an observable.
///
/// `start` is called with the stream's orchestrator on every activation.
/// Closures of the shape `Fn(Orchestrator<Item, Err>) -> T` where `T` is
/// `()`, [`Teardown`], or a `Result` of either are producers.
pub trait Producer<Item, Err> {
  fn start(
    &self, orchestrator: Orchestrator<Item, Err>,
  ) -> Result<Teardown, RxError>;
}

impl<Item, Err, F, T> Producer<Item, Err> for F
where
  F: Fn(Orchestrator<Item, Err>) -> T,
  T: IntoTeardown,
{
  #[inline]
  fn start(
    &self, orchestrator: Orchestrator<Item, Err>,
  ) -> Result<Teardown, RxError> {
    self(orchestrator).into_teardown()
  }
}
