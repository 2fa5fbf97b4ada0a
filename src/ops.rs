//! Operators: functions turning one stream into another.
//!
//! Every built-in operator builds a new [`Observable`] whose producer, on
//! activation, observes the upstream source with a derived observer and
//! hands back a teardown that cancels that upstream subscription. Values are
//! transformed on the way through; `error` and `complete` are forwarded
//! unchanged.
//!
//! Operators can be applied one at a time with [`Source::pipe`], several at
//! once with the [`pipe!`](crate::pipe) macro, or as methods through
//! [`SourceExt`].

use tracing::warn;

use crate::{
  error::RxError,
  observable::{Observable, Source},
  observer::Observer,
  producer::Teardown,
};

pub mod filter;
pub mod map;
pub mod reduce;

pub use filter::{filter, Filter};
pub use map::{map, Map};
pub use reduce::{reduce, Reduce};

/// A stage of a pipeline: consumes the upstream `S` and returns the next
/// stage.
///
/// Any `FnOnce(S) -> R` is an operator, so custom stages can be plain
/// closures.
pub trait Operator<S> {
  type Output;

  fn apply(self, source: S) -> Self::Output;
}

impl<S, F, R> Operator<S> for F
where
  F: FnOnce(S) -> R,
{
  type Output = R;

  #[inline]
  fn apply(self, source: S) -> R { self(source) }
}

/// Type-erased operator that keeps item and error types, used by
/// [`Source::pipe_all`].
pub type BoxedOperator<Item, Err> =
  Box<dyn FnOnce(Observable<Item, Err>) -> Observable<Item, Err>>;

/// Boxes an operator so it can sit in a `pipe_all` sequence.
pub fn boxed<Item, Err, Op>(op: Op) -> BoxedOperator<Item, Err>
where
  Op: Operator<Observable<Item, Err>, Output = Observable<Item, Err>> + 'static,
{
  Box::new(move |source| op.apply(source))
}

/// Observes `source` with `observer` and returns the teardown that cancels
/// exactly that subscription.
pub(crate) fn observe_upstream<S, O>(
  source: &S, observer: O,
) -> Result<Teardown, RxError>
where
  S: Source,
  O: Observer<S::Item, S::Err> + 'static,
{
  let id = source.observe(observer)?;
  let source = source.clone();
  Ok(Teardown::new(move || {
    if let Err(err) = source.cancel(id) {
      warn!(
        %id,
        label = err.as_label(),
        "upstream subscription was already gone at teardown"
      );
    }
  }))
}

/// Method-style access to the built-in operators.
pub trait SourceExt: Source {
  /// Emits `f(value)` for every upstream value.
  fn map<B, F>(&self, f: F) -> Observable<B, Self::Err>
  where
    F: Fn(Self::Item) -> B + 'static,
    B: Clone + 'static,
  {
    self.pipe(map(f))
  }

  /// Emits only the upstream values for which `predicate` holds.
  fn filter<P>(&self, predicate: P) -> Observable<Self::Item, Self::Err>
  where
    P: Fn(&Self::Item) -> bool + 'static,
  {
    self.pipe(filter(predicate))
  }

  /// Emits the running accumulation of upstream values, starting from
  /// `seed`.
  fn reduce<Acc, F>(&self, f: F, seed: Acc) -> Observable<Acc, Self::Err>
  where
    F: Fn(Acc, Self::Item) -> Acc + 'static,
    Acc: Clone + 'static,
  {
    self.pipe(reduce(f, seed))
  }
}

impl<S: Source> SourceExt for S {}

/// Left-folds operators over a source: `pipe!(source, a, b)` is
/// `source.pipe(a).pipe(b)`.
///
/// ```
/// use rxlite::prelude::*;
/// use std::{cell::RefCell, rc::Rc};
///
/// let seen = Rc::new(RefCell::new(vec![]));
/// let c_seen = seen.clone();
/// let source = Observable::<i32, ()>::from_iter(vec![1, 2, 3, 4]);
/// let evens = pipe!(
///   source,
///   ops::map(|x: i32| x + 1),
///   ops::filter(|x: &i32| x % 2 == 0)
/// );
/// evens.observe(FnMutObserver(move |v| c_seen.borrow_mut().push(v))).unwrap();
/// assert_eq!(*seen.borrow(), vec![2, 4]);
/// ```
#[macro_export]
macro_rules! pipe {
  ($source: expr $(, $op: expr)* $(,)?) => {{
    let stage = $crate::Source::to_observable(&$source);
    $(let stage = $crate::Source::pipe(&stage, $op);)*
    stage
  }};
}

#[cfg(test)]
mod tests {
  use std::{
    cell::{Cell, RefCell},
    rc::Rc,
  };

  use crate::prelude::*;

  #[rxlite_macro::test]
  fn closures_are_operators() {
    let source = Observable::<i32, ()>::of(2);
    let doubled = source.pipe(|s: Observable<i32, ()>| s.map(|v| v * 2));
    let got = Rc::new(Cell::new(0));
    let c_got = got.clone();
    doubled.observe(FnMutObserver(move |v| c_got.set(v))).unwrap();
    assert_eq!(got.get(), 4);
  }

  #[rxlite_macro::test]
  fn pipe_all_folds_left_to_right() {
    let source = Observable::<i32, ()>::from_iter(1..=3);
    let out = source.pipe_all(vec![
      ops::boxed(ops::map(|x: i32| x * 10)),
      ops::boxed(ops::map(|x: i32| x + 1)),
    ]);
    let seen = Rc::new(RefCell::new(vec![]));
    let c_seen = seen.clone();
    out.observe(FnMutObserver(move |v| c_seen.borrow_mut().push(v))).unwrap();
    assert_eq!(*seen.borrow(), vec![11, 21, 31]);
  }

  #[rxlite_macro::test]
  fn empty_pipe_all_relays_the_source() {
    let subject = Subject::<i32, ()>::new();
    let out = subject.pipe_all(Vec::new());
    let got = Rc::new(Cell::new(0));
    let c_got = got.clone();
    out.observe(FnMutObserver(move |v| c_got.set(v))).unwrap();
    subject.next(9);
    assert_eq!(got.get(), 9);
  }

  #[rxlite_macro::test]
  fn pipe_leaves_the_receiver_untouched() {
    let subject = Subject::<i32, ()>::new();
    let _stage = subject.pipe(ops::map(|x: i32| x + 1));
    assert_eq!(subject.observer_count(), 0);
  }

  #[rxlite_macro::test]
  fn teardown_with_vanished_upstream_is_tolerated() {
    let subject = Subject::<i32, ()>::new();
    let derived = subject.map(|x| x);
    let id = derived.observe(FnMutObserver(|_| {})).unwrap();
    assert_eq!(subject.cancel_all().len(), 1);
    assert_eq!(derived.cancel(id).unwrap(), id);
    assert!(!derived.is_running());
  }
}
