use super::Observable;
use crate::orchestrator::Orchestrator;

impl<Item, Err> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: 'static,
{
  /// Creates an observable that emits every value of `iter` and then
  /// completes, on each activation.
  ///
  /// Values are pushed synchronously while the first observer is being
  /// registered, so only that observer sees them; observers joining later
  /// share an activation that has already finished.
  ///
  /// ```
  /// use rxlite::prelude::*;
  /// use std::{cell::RefCell, rc::Rc};
  ///
  /// let seen = Rc::new(RefCell::new(vec![]));
  /// let c_seen = seen.clone();
  /// Observable::<_, ()>::from_iter(vec![0, 1, 2, 3])
  ///   .observe(FnMutObserver(move |v| c_seen.borrow_mut().push(v)))
  ///   .unwrap();
  /// assert_eq!(*seen.borrow(), vec![0, 1, 2, 3]);
  /// ```
  #[allow(clippy::should_implement_trait)]
  pub fn from_iter<I>(iter: I) -> Self
  where
    I: IntoIterator<Item = Item> + Clone + 'static,
  {
    Observable::new(move |o: Orchestrator<Item, Err>| {
      iter.clone().into_iter().for_each(|v| o.next(v));
      o.complete();
    })
  }

  /// Creates an observable that emits `value` once and then completes.
  pub fn of(value: Item) -> Self { Self::from_iter(std::iter::once(value)) }
}
