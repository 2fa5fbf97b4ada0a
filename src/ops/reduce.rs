//! Reduce operator implementation
//!
//! Threads an accumulator through every upstream value and emits the updated
//! accumulator each time, so downstream sees the running total rather than
//! the raw input.

use std::rc::Rc;

use crate::{
  observable::{Observable, Source},
  observer::Observer,
  ops::{observe_upstream, Operator},
  orchestrator::Orchestrator,
};

/// Creates the reduce operator seeded with `seed`.
///
/// Each activation starts again from a fresh clone of the seed.
pub fn reduce<Acc, Item, F>(f: F, seed: Acc) -> Reduce<F, Acc>
where
  F: Fn(Acc, Item) -> Acc,
{
  Reduce { f, seed }
}

/// The `Reduce` operator.
#[derive(Clone)]
pub struct Reduce<F, Acc> {
  f: F,
  seed: Acc,
}

impl<S, F, Acc> Operator<S> for Reduce<F, Acc>
where
  S: Source,
  F: Fn(Acc, S::Item) -> Acc + 'static,
  Acc: Clone + 'static,
{
  type Output = Observable<Acc, S::Err>;

  fn apply(self, source: S) -> Self::Output {
    let Reduce { f, seed } = self;
    let f = Rc::new(f);
    let start = move |downstream: Orchestrator<Acc, S::Err>| {
      let acc = Some(seed.clone());
      let observer = ReduceObserver { f: f.clone(), acc, downstream };
      observe_upstream(&source, observer)
    };
    Observable::new(start)
  }
}

/// Observer implementation for the Reduce operator.
struct ReduceObserver<F, Acc, Err> {
  f: Rc<F>,
  acc: Option<Acc>,
  downstream: Orchestrator<Acc, Err>,
}

impl<Item, Err, F, Acc> Observer<Item, Err> for ReduceObserver<F, Acc, Err>
where
  F: Fn(Acc, Item) -> Acc,
  Acc: Clone,
  Err: Clone,
{
  fn next(&mut self, value: Item) {
    // acc is always Some(...): it starts from the seed and is put back below.
    if let Some(acc) = self.acc.take() {
      let acc = (self.f)(acc, value);
      self.acc = Some(acc.clone());
      self.downstream.next(acc);
    }
  }

  forward_terminal!(downstream);
}
