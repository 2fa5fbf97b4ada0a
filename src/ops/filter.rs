use std::rc::Rc;

use crate::{
  observable::{Observable, Source},
  observer::Observer,
  ops::{observe_upstream, Operator},
  orchestrator::Orchestrator,
};

/// Emit only those items from a source that pass a predicate test
/// # Example
///
/// ```
/// use rxlite::prelude::*;
/// use std::{cell::RefCell, rc::Rc};
///
/// let coll = Rc::new(RefCell::new(vec![]));
/// let coll_clone = coll.clone();
///
/// Observable::<i32, ()>::from_iter(0..10)
///   .pipe(ops::filter(|v: &i32| *v % 2 == 0))
///   .observe(FnMutObserver(move |v| coll_clone.borrow_mut().push(v)))
///   .unwrap();
///
/// // only even numbers received.
/// assert_eq!(*coll.borrow(), vec![0, 2, 4, 6, 8]);
/// ```
pub fn filter<Item, P>(predicate: P) -> Filter<P>
where
  P: Fn(&Item) -> bool,
{
  Filter(predicate)
}

#[derive(Clone)]
pub struct Filter<P>(P);

impl<S, P> Operator<S> for Filter<P>
where
  S: Source,
  P: Fn(&S::Item) -> bool + 'static,
{
  type Output = Observable<S::Item, S::Err>;

  fn apply(self, source: S) -> Self::Output {
    let predicate = Rc::new(self.0);
    let start = move |downstream: Orchestrator<S::Item, S::Err>| {
      let predicate = predicate.clone();
      observe_upstream(&source, FilterObserver { predicate, downstream })
    };
    Observable::new(start)
  }
}

struct FilterObserver<P, Item, Err> {
  predicate: Rc<P>,
  downstream: Orchestrator<Item, Err>,
}

impl<Item, Err, P> Observer<Item, Err> for FilterObserver<P, Item, Err>
where
  P: Fn(&Item) -> bool,
  Item: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    if (self.predicate)(&value) {
      self.downstream.next(value);
    }
  }

  forward_terminal!(downstream);
}
