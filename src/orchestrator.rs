use std::{cell::RefCell, rc::Rc};

use tracing::{debug, trace};

use crate::{
  error::UnhandledError,
  observer::Observer,
  registry::{Deferred, Entry, Registry},
};

/// The broadcaster handed to a producer.
///
/// Every `next` / `error` / `complete` fans out to the observers registered
/// at the moment the call starts, in subscription order. Observers added
/// while a broadcast is running do not see that event; observers cancelled
/// while it is running stop receiving immediately.
///
/// # Re-entrancy
///
/// An observer may emit into the stream it is observing. A `next` or
/// `complete` that reaches an observer still busy with an earlier event is
/// queued on that observer and delivered, in order, as soon as the earlier
/// call returns. An `error` cannot wait for an answer, so a busy observer
/// counts as one without a handler and the broadcast fails with
/// [`UnhandledError`].
pub struct Orchestrator<Item, Err> {
  registry: Rc<RefCell<Registry<Item, Err>>>,
}

impl<Item, Err> Clone for Orchestrator<Item, Err> {
  fn clone(&self) -> Self { Self { registry: self.registry.clone() } }
}

impl<Item, Err> Orchestrator<Item, Err> {
  pub(crate) fn new(registry: &Rc<RefCell<Registry<Item, Err>>>) -> Self {
    Self { registry: registry.clone() }
  }

  /// Delivers `value` to every observer.
  pub fn next(&self, value: Item)
  where
    Item: Clone,
  {
    broadcast_next(&self.registry, value);
  }

  /// Delivers `err` to every observer that handles errors.
  ///
  /// Stops at the first observer without an `error` handler and reports it
  /// as an [`UnhandledError`].
  pub fn error(&self, err: Err) -> Result<(), UnhandledError<Err>>
  where
    Err: Clone,
  {
    broadcast_error(&self.registry, err)
  }

  /// Notifies every observer that handles completion.
  pub fn complete(&self) { broadcast_complete(&self.registry); }
}

fn dispatch<Item, Err>(
  observer: &mut dyn Observer<Item, Err>, event: Deferred<Item>,
) {
  match event {
    Deferred::Next(value) => observer.next(value),
    Deferred::Complete => observer.complete(),
  }
}

/// Hands `event` to the entry's observer, or queues it when the observer is
/// already running further up the stack. The caller that holds the observer
/// drains the queue before letting go of it.
fn deliver<Item, Err>(entry: &Entry<Item, Err>, event: Deferred<Item>) {
  if !entry.active.get() {
    return;
  }
  let Ok(mut observer) = entry.observer.try_borrow_mut() else {
    trace!(id = %entry.id, "observer busy, delivery deferred");
    entry.deferred.borrow_mut().push_back(event);
    return;
  };
  dispatch(&mut **observer, event);
  drain(entry, &mut **observer);
}

/// Delivers whatever nested emissions queued on `entry` while `observer` was
/// running. Stops early if the entry is removed meanwhile.
fn drain<Item, Err>(
  entry: &Entry<Item, Err>, observer: &mut dyn Observer<Item, Err>,
) {
  while entry.active.get() {
    let pending = entry.deferred.borrow_mut().pop_front();
    match pending {
      Some(event) => dispatch(observer, event),
      None => break,
    }
  }
}

/// Broadcast a value, cloning it for every observer except the last one,
/// which receives the moved value.
pub(crate) fn broadcast_next<Item, Err>(
  registry: &RefCell<Registry<Item, Err>>, value: Item,
) where
  Item: Clone,
{
  let snapshot = registry.borrow().snapshot();
  let mut iter = snapshot.iter().peekable();
  while let Some(entry) = iter.next() {
    if iter.peek().is_some() {
      deliver(entry, Deferred::Next(value.clone()));
    } else {
      deliver(entry, Deferred::Next(value));
      break;
    }
  }
}

pub(crate) fn broadcast_error<Item, Err>(
  registry: &RefCell<Registry<Item, Err>>, err: Err,
) -> Result<(), UnhandledError<Err>>
where
  Err: Clone,
{
  let snapshot = registry.borrow().snapshot();
  trace!(observers = snapshot.len(), "broadcast error");
  for entry in snapshot.iter().filter(|entry| entry.active.get()) {
    let handled = match entry.observer.try_borrow_mut() {
      Ok(mut observer) => {
        let handled = observer.error(err.clone());
        drain(entry, &mut **observer);
        handled
      }
      Err(_) => {
        debug!(id = %entry.id, "error reached an observer that is still busy");
        Err(err.clone())
      }
    };
    if let Err(error) = handled {
      return Err(UnhandledError { id: entry.id, error });
    }
  }
  Ok(())
}

pub(crate) fn broadcast_complete<Item, Err>(
  registry: &RefCell<Registry<Item, Err>>,
) {
  let snapshot = registry.borrow().snapshot();
  trace!(observers = snapshot.len(), "broadcast complete");
  for entry in snapshot.iter() {
    deliver(entry, Deferred::Complete);
  }
}
