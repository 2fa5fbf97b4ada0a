use std::rc::Rc;

use crate::{
  observable::{Observable, Source},
  observer::Observer,
  ops::{observe_upstream, Operator},
  orchestrator::Orchestrator,
};

/// Creates an operator which calls a closure on each element and emits its
/// return value.
///
/// ```
/// use rxlite::prelude::*;
/// use std::{cell::RefCell, rc::Rc};
///
/// let seen = Rc::new(RefCell::new(vec![]));
/// let c_seen = seen.clone();
/// Observable::<i32, ()>::from_iter(100..102)
///   .pipe(ops::map(|v: i32| v * 2))
///   .observe(FnMutObserver(move |v| c_seen.borrow_mut().push(v)))
///   .unwrap();
/// assert_eq!(*seen.borrow(), vec![200, 202]);
/// ```
pub fn map<Item, B, F>(f: F) -> Map<F>
where
  F: Fn(Item) -> B,
{
  Map(f)
}

#[derive(Clone)]
pub struct Map<F>(F);

impl<S, F, B> Operator<S> for Map<F>
where
  S: Source,
  F: Fn(S::Item) -> B + 'static,
  B: Clone + 'static,
{
  type Output = Observable<B, S::Err>;

  fn apply(self, source: S) -> Self::Output {
    let f = Rc::new(self.0);
    let start = move |downstream: Orchestrator<B, S::Err>| {
      observe_upstream(&source, MapObserver { f: f.clone(), downstream })
    };
    Observable::new(start)
  }
}

struct MapObserver<F, B, Err> {
  f: Rc<F>,
  downstream: Orchestrator<B, Err>,
}

impl<Item, B, Err, F> Observer<Item, Err> for MapObserver<F, B, Err>
where
  F: Fn(Item) -> B,
  B: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) { self.downstream.next((self.f)(value)); }

  forward_terminal!(downstream);
}
