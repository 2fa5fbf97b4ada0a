//! Integration tests for rxlite
//!
//! Exercises operator chains, activation lifecycles and subjects through the
//! public API only.

use std::{
  cell::{Cell, RefCell},
  rc::Rc,
};

use rxlite::prelude::*;

type Log<T> = Rc<RefCell<Vec<T>>>;

fn recorder<T: 'static>() -> (Log<T>, FnMutObserver<impl FnMut(T)>) {
  let log: Log<T> = Rc::new(RefCell::new(Vec::new()));
  let c_log = log.clone();
  (log, FnMutObserver(move |v| c_log.borrow_mut().push(v)))
}

/// A hand-rolled event source: listeners are registered on activation and
/// removed by the teardown.
#[derive(Clone, Default)]
struct EventTarget {
  listeners: Rc<RefCell<Vec<Orchestrator<i32, String>>>>,
}

impl EventTarget {
  fn dispatch(&self, v: i32) {
    let listeners = self.listeners.borrow().clone();
    for listener in listeners {
      listener.next(v);
    }
  }

  fn listener_count(&self) -> usize { self.listeners.borrow().len() }

  fn events(&self) -> Observable<i32, String> {
    let target = self.clone();
    Observable::new(move |o: Orchestrator<i32, String>| {
      target.listeners.borrow_mut().push(o);
      let target = target.clone();
      Teardown::new(move || target.listeners.borrow_mut().clear())
    })
  }
}

#[rxlite_macro::test]
fn map_then_filter_round_trip() {
  let (seen, observer) = recorder::<i32>();
  let source = Observable::<i32, ()>::from_iter(vec![1, 2, 3, 4]);

  pipe!(source, ops::map(|x: i32| x + 1), ops::filter(|x: &i32| x % 2 == 0))
    .observe(observer)
    .unwrap();

  assert_eq!(*seen.borrow(), vec![2, 4]);
}

#[rxlite_macro::test]
fn cancelling_the_derived_stream_releases_the_source() {
  let target = EventTarget::default();
  let source = target.events();
  let derived = source.map(|x| x + 1).filter(|x| x % 2 == 0);
  let (seen, observer) = recorder::<i32>();

  let id = derived.observe(observer).unwrap();
  assert_eq!(source.observer_count(), 1);
  assert_eq!(target.listener_count(), 1);

  for v in 1..=4 {
    target.dispatch(v);
  }
  assert_eq!(*seen.borrow(), vec![2, 4]);

  derived.cancel(id).unwrap();
  assert!(!derived.is_running());
  assert_eq!(source.observer_count(), 0);
  assert!(!source.is_running());
  assert_eq!(target.listener_count(), 0);
}

#[rxlite_macro::test]
fn reduce_emits_running_totals() {
  let (seen, observer) = recorder::<i32>();
  Observable::<i32, ()>::from_iter(vec![1, 2, 3])
    .pipe(ops::reduce(|acc: i32, x: i32| acc + x, 0))
    .observe(observer)
    .unwrap();

  assert_eq!(*seen.borrow(), vec![1, 3, 6]);
}

#[rxlite_macro::test]
fn derived_streams_multicast_a_single_upstream_subscription() {
  let target = EventTarget::default();
  let source = target.events();
  let doubled = source.map(|x| x * 2);

  let (a, obs_a) = recorder::<i32>();
  let (b, obs_b) = recorder::<i32>();
  let id_a = doubled.observe(obs_a).unwrap();
  let id_b = doubled.observe(obs_b).unwrap();
  assert_eq!(source.observer_count(), 1);

  target.dispatch(5);
  doubled.cancel(id_a).unwrap();
  target.dispatch(6);

  assert_eq!(*a.borrow(), vec![10]);
  assert_eq!(*b.borrow(), vec![10, 12]);
  assert_eq!(target.listener_count(), 1);

  doubled.cancel(id_b).unwrap();
  assert_eq!(target.listener_count(), 0);
}

#[rxlite_macro::test]
fn ids_count_up_per_stream_and_are_never_reused() {
  let subject = Subject::<i32, ()>::new();
  let derived = subject.map(|x| x);

  let ids: Vec<_> =
    (0..3).map(|_| derived.observe(FnMutObserver(|_| {})).unwrap()).collect();
  let expected: Vec<_> = [0, 1, 2].map(SubscriptionId::new).into();
  assert_eq!(ids, expected);

  derived.cancel_all();
  let next_id = derived.observe(FnMutObserver(|_| {})).unwrap();
  assert_eq!(next_id, SubscriptionId::new(3));
  // the subject saw two activations of the derived stream
  assert_eq!(subject.observer_ids(), vec![SubscriptionId::new(1)]);
}

#[rxlite_macro::test]
fn subject_replays_initial_value_through_operators() {
  let subject = Subject::<i32, ()>::with_initial(10);
  let (first, obs_first) = recorder::<i32>();
  let (second, obs_second) = recorder::<i32>();

  let plus_one = subject.map(|x| x + 1);
  plus_one.observe(obs_first).unwrap();
  plus_one.observe(obs_second).unwrap();
  subject.next(20);

  assert_eq!(*first.borrow(), vec![11, 21]);
  assert_eq!(*second.borrow(), vec![21]);
}

#[rxlite_macro::test]
fn errors_and_completion_flow_to_the_end_of_the_chain() {
  let subject = Subject::<i32, String>::new();
  let log = Rc::new(RefCell::new(Vec::new()));
  let (c_next, c_err, c_done) = (log.clone(), log.clone(), log.clone());

  subject
    .map(|x| x * 3)
    .filter(|x| *x > 3)
    .reduce(|acc, x| acc + x, 0)
    .observe(
      Subscriber::new(move |v: i32| {
        c_next.borrow_mut().push(format!("next {v}"));
      })
      .on_error(move |e: String| {
        c_err.borrow_mut().push(format!("error {e}"));
      })
      .on_complete(move || c_done.borrow_mut().push("complete".to_string())),
    )
    .unwrap();

  subject.next(1);
  subject.next(2);
  subject.next(3);
  subject.error("broken".to_string()).unwrap();
  subject.complete();

  let expected = vec!["next 6", "next 15", "error broken", "complete"];
  assert_eq!(*log.borrow(), expected);
}

#[rxlite_macro::test]
fn unhandled_error_surfaces_at_the_emitter() {
  let subject = Subject::<i32, &'static str>::new();
  subject.filter(|_| true).observe(FnMutObserver(|_| {})).unwrap();

  let unhandled = subject.error("lost").unwrap_err();
  assert_eq!(unhandled.error, "lost");
  assert_eq!(unhandled.id, SubscriptionId::new(0));
}

#[rxlite_macro::test]
fn builder_rejects_observer_without_next() {
  let built = Subscriber::<i32, ()>::builder().complete(|| {}).build();
  assert!(matches!(built, Err(RxError::Contract { .. })));

  let observer = Subscriber::<i32, ()>::builder().next(|_| {}).build().unwrap();
  assert!(Observable::<i32, ()>::of(1).observe(observer).is_ok());
}

#[rxlite_macro::test]
fn cancel_with_unknown_id_leaves_stream_alone() {
  let target = EventTarget::default();
  let source = target.events();
  source.observe(FnMutObserver(|_| {})).unwrap();

  let missing = SubscriptionId::try_from(5i32).unwrap();
  let err = source.cancel(missing).unwrap_err();
  assert_eq!(err.to_string(), "observer not found. ID: 5");
  assert_eq!(source.observer_count(), 1);
  assert_eq!(target.listener_count(), 1);
}

#[rxlite_macro::test]
fn failed_activation_propagates_through_operators() {
  let refused = Observable::<i32, ()>::new(|_| -> Result<Teardown, RxError> {
    Err(RxError::activation("no listener slot"))
  });
  let derived = refused.map(|x| x);

  let err = derived.observe(FnMutObserver(|_| {})).unwrap_err();
  assert_eq!(err.as_label(), "activation");
  assert!(!derived.is_running());
  assert_eq!(derived.observer_count(), 0);
}

#[rxlite_macro::test]
fn pipe_all_with_boxed_operators() {
  let subject = Subject::<i32, ()>::new();
  let stages: Vec<ops::BoxedOperator<i32, ()>> = vec![
    ops::boxed(ops::filter(|x: &i32| *x > 0)),
    ops::boxed(ops::map(|x: i32| x * 100)),
    ops::boxed(ops::reduce(|acc: i32, x: i32| acc.max(x), i32::MIN)),
  ];
  let (seen, observer) = recorder::<i32>();
  subject.pipe_all(stages).observe(observer).unwrap();

  for v in [-1, 2, 1, 5] {
    subject.next(v);
  }
  assert_eq!(*seen.borrow(), vec![200, 200, 500]);
}

#[rxlite_macro::test]
fn teardown_runs_before_cancel_returns() {
  let torn_down = Rc::new(Cell::new(false));
  let c_torn_down = torn_down.clone();
  let source = Observable::<i32, ()>::new(move |_| {
    let flag = c_torn_down.clone();
    Teardown::new(move || flag.set(true))
  });
  let id = source.observe(FnMutObserver(|_| {})).unwrap();
  source.cancel(id).unwrap();
  assert!(torn_down.get());
}

#[rxlite_macro::test]
fn chain_keeps_running_after_its_handle_is_dropped() {
  let subject = Subject::<i32, &'static str>::new();
  let (seen, observer) = recorder::<i32>();
  subject.map(|x| x * 2).filter(|x| *x > 2).observe(observer).unwrap();

  subject.next(1);
  subject.next(2);
  subject.next(3);
  assert_eq!(*seen.borrow(), vec![4, 6]);
  assert_eq!(subject.observer_count(), 1);

  let unhandled = subject.error("boom").unwrap_err();
  assert_eq!(unhandled.error, "boom");
}

#[rxlite_macro::test]
fn feedback_through_an_operator_is_delivered_in_order() {
  let subject = Subject::<i32, ()>::new();
  let seen = Rc::new(RefCell::new(Vec::new()));
  let (c_seen, c_subject) = (seen.clone(), subject.clone());
  subject
    .map(|x| x * 10)
    .observe(FnMutObserver(move |v: i32| {
      c_seen.borrow_mut().push(v);
      if v < 30 {
        c_subject.next(v / 10 + 1);
      }
    }))
    .unwrap();

  subject.next(1);
  assert_eq!(*seen.borrow(), vec![10, 20, 30]);
  subject.cancel_all();
}
