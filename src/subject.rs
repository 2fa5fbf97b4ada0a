//! Hot multicast streams.
//!
//! A [`Subject`] has no producer: it is both a sink, fed through
//! [`next`](Subject::next) / [`error`](Subject::error) /
//! [`complete`](Subject::complete), and a [`Source`] that observers and
//! operators attach to. Broadcasting works the same way as for an
//! [`Observable`](crate::Observable), but it is always possible, even with no
//! observers registered.
//!
//! A subject may be created with an initial value. That value is handed to
//! the very first observer (id 0) during its `observe` call, before the
//! observer joins the broadcast list, and to nobody else.

use std::{cell::RefCell, rc::Rc};

use tracing::trace;

use crate::{
  error::{RxError, UnhandledError},
  observable::Source,
  observer::Observer,
  orchestrator::{broadcast_complete, broadcast_error, broadcast_next},
  registry::Registry,
  SubscriptionId,
};

/// A hot, always-active multicast stream with an optional one-shot replay.
///
/// Clones share observers, ids and the pending initial value.
///
/// ```
/// use rxlite::prelude::*;
/// use std::{cell::RefCell, rc::Rc};
///
/// let seen = Rc::new(RefCell::new(vec![]));
/// let subject = Subject::<i32, ()>::with_initial(0);
///
/// let c_seen = seen.clone();
/// subject
///   .observe(FnMutObserver(move |v| c_seen.borrow_mut().push(v)))
///   .unwrap();
/// subject.next(1);
/// assert_eq!(*seen.borrow(), vec![0, 1]);
/// ```
pub struct Subject<Item, Err> {
  inner: Rc<SubjectInner<Item, Err>>,
}

struct SubjectInner<Item, Err> {
  registry: Rc<RefCell<Registry<Item, Err>>>,
  initial: RefCell<Option<Item>>,
}

impl<Item, Err> Clone for Subject<Item, Err> {
  fn clone(&self) -> Self { Self { inner: self.inner.clone() } }
}

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::from_initial(None) }
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Self::default() }

  /// A subject that replays `value` to its first observer.
  pub fn with_initial(value: Item) -> Self { Self::from_initial(Some(value)) }

  fn from_initial(initial: Option<Item>) -> Self {
    Self {
      inner: Rc::new(SubjectInner {
        registry: Rc::new(RefCell::new(Registry::default())),
        initial: RefCell::new(initial),
      }),
    }
  }

  /// Registers `observer` and returns its id.
  ///
  /// When this is the first subscription ever made and an initial value is
  /// pending, the observer receives it synchronously before it is added to
  /// the broadcast list.
  pub fn observe<O>(&self, mut observer: O) -> Result<SubscriptionId, RxError>
  where
    O: Observer<Item, Err> + 'static,
  {
    let id = self.inner.registry.borrow_mut().reserve_id();
    if id.get() == 0 {
      let initial = self.inner.initial.borrow_mut().take();
      if let Some(value) = initial {
        trace!(%id, "replaying initial value");
        observer.next(value);
      }
    }
    self.inner.registry.borrow_mut().insert(id, Box::new(observer));
    trace!(%id, "observe");
    Ok(id)
  }

  /// Removes exactly the subscription `id`, failing with
  /// [`RxError::NotFound`] when it is not registered.
  pub fn cancel(&self, id: SubscriptionId) -> Result<SubscriptionId, RxError> {
    match self.inner.registry.borrow_mut().remove(id) {
      Some(_) => {
        trace!(%id, "cancel");
        Ok(id)
      }
      None => Err(RxError::NotFound { id }),
    }
  }

  /// Removes every subscription and returns the removed ids in order.
  pub fn cancel_all(&self) -> Vec<SubscriptionId> {
    let ids = self.inner.registry.borrow_mut().clear();
    trace!(count = ids.len(), "cancel all");
    ids
  }

  /// Delivers `value` to every registered observer.
  pub fn next(&self, value: Item)
  where
    Item: Clone,
  {
    broadcast_next(&self.inner.registry, value);
  }

  /// Delivers `err` to every registered observer, stopping at the first one
  /// that has no error handler.
  pub fn error(&self, err: Err) -> Result<(), UnhandledError<Err>>
  where
    Err: Clone,
  {
    broadcast_error(&self.inner.registry, err)
  }

  pub fn complete(&self) { broadcast_complete(&self.inner.registry); }

  pub fn observer_count(&self) -> usize { self.inner.registry.borrow().len() }

  /// Registered subscription ids in subscription order.
  pub fn observer_ids(&self) -> Vec<SubscriptionId> {
    self.inner.registry.borrow().ids()
  }
}

impl<Item, Err> Source for Subject<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  type Item = Item;
  type Err = Err;

  #[inline]
  fn observe<O>(&self, observer: O) -> Result<SubscriptionId, RxError>
  where
    O: Observer<Item, Err> + 'static,
  {
    Subject::observe(self, observer)
  }

  #[inline]
  fn cancel(&self, id: SubscriptionId) -> Result<SubscriptionId, RxError> {
    Subject::cancel(self, id)
  }

  #[inline]
  fn cancel_all(&self) -> Vec<SubscriptionId> { Subject::cancel_all(self) }
}

/// A subject can observe another stream and re-broadcast what it receives.
impl<Item, Err> Observer<Item, Err> for Subject<Item, Err>
where
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) { Subject::next(self, value); }

  fn error(&mut self, err: Err) -> Result<(), Err> {
    Subject::error(self, err).map_err(UnhandledError::into_inner)
  }

  fn complete(&mut self) { Subject::complete(self); }
}
