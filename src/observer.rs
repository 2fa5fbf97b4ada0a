//! Observer trait and implementations
//!
//! The Observer trait defines the consumer of data in the reactive pattern.
//! It provides three methods: next (for values), error (for errors), and
//! complete (for stream completion). Only `next` is mandatory.

use crate::{error::RxError, validate};

// ============================================================================
// Observer Trait
// ============================================================================

/// Observer trait: The consumer of data in reactive programming
///
/// An Observer receives values, errors, and completion notifications from
/// an Observable or a Subject.
pub trait Observer<Item, Err> {
  /// Receive the next value from the stream
  fn next(&mut self, value: Item);

  /// Handle an error from the stream
  ///
  /// Returns the error back as `Err` when this observer has no handler for
  /// it. The broadcast that delivered it turns that into an
  /// [`UnhandledError`](crate::error::UnhandledError) for its caller, so a
  /// failure is never silently dropped.
  fn error(&mut self, err: Err) -> Result<(), Err> { Err(err) }

  /// Handle completion of the stream. Ignored unless overridden.
  fn complete(&mut self) {}
}

// ============================================================================
// FnMutObserver - Closure adapter
// ============================================================================

/// Adapter turning a closure into an observer with only a `next` handler.
///
/// Errors delivered to it are handed back unhandled; completion is ignored.
#[derive(Clone)]
pub struct FnMutObserver<F>(pub F);

impl<F, Item, Err> Observer<Item, Err> for FnMutObserver<F>
where
  F: FnMut(Item),
{
  #[inline]
  fn next(&mut self, v: Item) { (self.0)(v); }
}

// ============================================================================
// Subscriber - callback bag with optional handlers
// ============================================================================

type NextFn<Item> = Box<dyn FnMut(Item)>;
type ErrorFn<Err> = Box<dyn FnMut(Err)>;
type CompleteFn = Box<dyn FnMut()>;

/// An observer assembled from a required `next` callback and optional
/// `error` / `complete` callbacks.
///
/// ```
/// use rxlite::prelude::*;
/// use std::{cell::RefCell, rc::Rc};
///
/// let seen = Rc::new(RefCell::new(vec![]));
/// let c_seen = seen.clone();
/// let subject = Subject::<i32, String>::new();
/// subject
///   .observe(
///     Subscriber::new(move |v| c_seen.borrow_mut().push(v)).on_error(|_| {}),
///   )
///   .unwrap();
/// subject.next(1);
/// assert_eq!(*seen.borrow(), vec![1]);
/// ```
pub struct Subscriber<Item, Err> {
  next: NextFn<Item>,
  error: Option<ErrorFn<Err>>,
  complete: Option<CompleteFn>,
}

impl<Item, Err> Subscriber<Item, Err> {
  pub fn new(next: impl FnMut(Item) + 'static) -> Self {
    Self { next: Box::new(next), error: None, complete: None }
  }

  /// Starts a builder where every callback is optional until `build`.
  pub fn builder() -> SubscriberBuilder<Item, Err> {
    SubscriberBuilder::default()
  }

  pub fn on_error(mut self, error: impl FnMut(Err) + 'static) -> Self {
    self.error = Some(Box::new(error));
    self
  }

  pub fn on_complete(mut self, complete: impl FnMut() + 'static) -> Self {
    self.complete = Some(Box::new(complete));
    self
  }

  #[inline]
  pub fn handles_error(&self) -> bool { self.error.is_some() }

  #[inline]
  pub fn handles_complete(&self) -> bool { self.complete.is_some() }
}

impl<Item, Err> Observer<Item, Err> for Subscriber<Item, Err> {
  #[inline]
  fn next(&mut self, value: Item) { (self.next)(value); }

  fn error(&mut self, err: Err) -> Result<(), Err> {
    match &mut self.error {
      Some(error) => {
        error(err);
        Ok(())
      }
      None => Err(err),
    }
  }

  fn complete(&mut self) {
    if let Some(complete) = &mut self.complete {
      complete();
    }
  }
}

/// Builder for [`Subscriber`] when the callbacks are gathered from several
/// places. `build` fails with [`RxError::Contract`] when no `next` callback
/// was supplied.
pub struct SubscriberBuilder<Item, Err> {
  next: Option<NextFn<Item>>,
  error: Option<ErrorFn<Err>>,
  complete: Option<CompleteFn>,
}

impl<Item, Err> Default for SubscriberBuilder<Item, Err> {
  fn default() -> Self { Self { next: None, error: None, complete: None } }
}

impl<Item, Err> SubscriberBuilder<Item, Err> {
  pub fn next(mut self, next: impl FnMut(Item) + 'static) -> Self {
    self.next = Some(Box::new(next));
    self
  }

  pub fn error(mut self, error: impl FnMut(Err) + 'static) -> Self {
    self.error = Some(Box::new(error));
    self
  }

  pub fn complete(mut self, complete: impl FnMut() + 'static) -> Self {
    self.complete = Some(Box::new(complete));
    self
  }

  pub fn build(self) -> Result<Subscriber<Item, Err>, RxError> {
    let SubscriberBuilder { next, error, complete } = self;
    let next = validate::observer(next)?;
    Ok(Subscriber { next, error, complete })
  }
}

// ============================================================================
// Tests
// ============================================================================
