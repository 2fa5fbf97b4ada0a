use std::{
  cell::{Cell, RefCell},
  collections::VecDeque,
  fmt,
  rc::Rc,
};

use smallvec::SmallVec;

use crate::observer::Observer;

/// Handle returned by `observe`, used to `cancel` exactly that registration.
///
/// Ids are issued per stream instance starting at `0` and are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(usize);

impl SubscriptionId {
  #[inline]
  pub const fn new(id: usize) -> Self { Self(id) }

  #[inline]
  pub const fn get(self) -> usize { self.0 }
}

impl fmt::Display for SubscriptionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Display::fmt(&self.0, f)
  }
}

impl From<usize> for SubscriptionId {
  fn from(id: usize) -> Self { Self(id) }
}

pub(crate) type BoxedObserver<Item, Err> = Box<dyn Observer<Item, Err>>;

/// An event that reached an observer while it was still handling an earlier
/// one. It is delivered once the outer call returns.
pub(crate) enum Deferred<Item> {
  Next(Item),
  Complete,
}

/// One registered observer.
///
/// `active` is cleared the moment the entry is removed, so a broadcast that
/// already holds a snapshot skips it.
pub(crate) struct Entry<Item, Err> {
  pub(crate) id: SubscriptionId,
  pub(crate) active: Cell<bool>,
  pub(crate) observer: RefCell<BoxedObserver<Item, Err>>,
  pub(crate) deferred: RefCell<VecDeque<Deferred<Item>>>,
}

impl<Item, Err> Entry<Item, Err> {
  /// Stop deliveries to this entry and drop whatever was queued for it.
  fn retire(&self) {
    self.active.set(false);
    self.deferred.borrow_mut().clear();
  }
}

pub(crate) type EntryRef<Item, Err> = Rc<Entry<Item, Err>>;

/// Snapshot of the registered observers, taken at the start of a broadcast.
pub(crate) type Snapshot<Item, Err> = SmallVec<[EntryRef<Item, Err>; 4]>;

/// Ordered collection of live observers keyed by a monotonically increasing
/// id.
///
/// # Design
///
/// - **SmallVec Optimization**: most streams carry one or two observers, so
///   they live inline.
/// - **Pre-allocation Pattern**: `reserve_id()` + `insert()` lets a caller
///   learn its id before the observer is registered (subject replay).
pub(crate) struct Registry<Item, Err> {
  nonce: usize,
  entries: SmallVec<[EntryRef<Item, Err>; 2]>,
}

impl<Item, Err> Default for Registry<Item, Err> {
  fn default() -> Self { Self { nonce: 0, entries: SmallVec::new() } }
}

impl<Item, Err> Registry<Item, Err> {
  /// Register an observer under the next id.
  pub(crate) fn add(
    &mut self, observer: BoxedObserver<Item, Err>,
  ) -> SubscriptionId {
    let id = self.reserve_id();
    self.insert(id, observer);
    id
  }

  /// Consume the next id without registering anything yet.
  #[inline]
  pub(crate) fn reserve_id(&mut self) -> SubscriptionId {
    let id = SubscriptionId(self.nonce);
    self.nonce += 1;
    id
  }

  /// Register an observer under a reserved id, keeping ascending id order.
  pub(crate) fn insert(
    &mut self, id: SubscriptionId, observer: BoxedObserver<Item, Err>,
  ) {
    let entry = Rc::new(Entry {
      id,
      active: Cell::new(true),
      observer: RefCell::new(observer),
      deferred: RefCell::new(VecDeque::new()),
    });
    let pos = self.entries.partition_point(|e| e.id < id);
    self.entries.insert(pos, entry);
  }

  /// Remove exactly the entry with `id`, preserving the order of the rest.
  pub(crate) fn remove(
    &mut self, id: SubscriptionId,
  ) -> Option<EntryRef<Item, Err>> {
    let pos = self.entries.iter().position(|e| e.id == id)?;
    let entry = self.entries.remove(pos);
    entry.retire();
    Some(entry)
  }

  /// Remove every entry, returning their ids in their previous order.
  pub(crate) fn clear(&mut self) -> Vec<SubscriptionId> {
    self
      .entries
      .drain(..)
      .map(|entry| {
        entry.retire();
        entry.id
      })
      .collect()
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.entries.len() }

  #[inline]
  pub(crate) fn is_empty(&self) -> bool { self.entries.is_empty() }

  pub(crate) fn ids(&self) -> Vec<SubscriptionId> {
    self.entries.iter().map(|e| e.id).collect()
  }

  pub(crate) fn snapshot(&self) -> Snapshot<Item, Err> {
    self.entries.iter().cloned().collect()
  }
}
