//! Cold, lazily activated, multicast streams.
//!
//! An [`Observable`] owns a [`Producer`] and starts it when its first
//! observer arrives. Later observers share that single activation. When the
//! last observer is cancelled the producer's [`Teardown`] runs and the
//! observable returns to idle; the next `observe` starts the producer again.
//!
//! ```
//! use rxlite::prelude::*;
//! use std::{cell::RefCell, rc::Rc};
//!
//! let seen = Rc::new(RefCell::new(vec![]));
//! let c_seen = seen.clone();
//!
//! let numbers = Observable::<i32, ()>::from_iter(1..=4);
//! let evens = numbers.map(|x| x + 1).filter(|x| x % 2 == 0);
//! evens.observe(FnMutObserver(move |v| c_seen.borrow_mut().push(v))).unwrap();
//!
//! assert_eq!(*seen.borrow(), vec![2, 4]);
//! ```

use std::{cell::RefCell, rc::Rc};

use tracing::{debug, trace};

use crate::{
  error::RxError,
  observer::Observer,
  ops::{BoxedOperator, Operator},
  orchestrator::Orchestrator,
  producer::{IntoTeardown, Producer, Teardown},
  registry::Registry,
  SubscriptionId,
};

mod from_iter;
#[cfg(feature = "future")]
mod from_future;

// ============================================================================
// Source Trait
// ============================================================================

/// Anything observers can be registered against: [`Observable`] and
/// [`Subject`](crate::Subject).
///
/// Operators are written against this trait, so they compose over both.
pub trait Source: Clone + 'static {
  type Item: Clone + 'static;
  type Err: Clone + 'static;

  /// Registers `observer` and returns its subscription id.
  fn observe<O>(&self, observer: O) -> Result<SubscriptionId, RxError>
  where
    O: Observer<Self::Item, Self::Err> + 'static;

  /// Removes exactly the subscription `id`.
  fn cancel(&self, id: SubscriptionId) -> Result<SubscriptionId, RxError>;

  /// Removes every subscription and returns the removed ids in order.
  fn cancel_all(&self) -> Vec<SubscriptionId>;

  /// Applies one operator stage. The receiver is left untouched.
  fn pipe<Op>(&self, op: Op) -> Op::Output
  where
    Op: Operator<Self>,
  {
    op.apply(self.clone())
  }

  /// Left-folds a sequence of same-typed operators over this source.
  fn pipe_all<I>(&self, ops: I) -> Observable<Self::Item, Self::Err>
  where
    I: IntoIterator<Item = BoxedOperator<Self::Item, Self::Err>>,
  {
    ops.into_iter().fold(self.to_observable(), |stage, op| op.apply(stage))
  }

  /// An [`Observable`] that relays this source. Activating it observes the
  /// source; deactivating it cancels that observation.
  fn to_observable(&self) -> Observable<Self::Item, Self::Err> {
    let source = self.clone();
    Observable::new(move |downstream: Orchestrator<Self::Item, Self::Err>| {
      crate::ops::observe_upstream(&source, Relay { downstream })
    })
  }
}

struct Relay<Item, Err> {
  downstream: Orchestrator<Item, Err>,
}

impl<Item: Clone, Err: Clone> Observer<Item, Err> for Relay<Item, Err> {
  fn next(&mut self, value: Item) { self.downstream.next(value); }

  forward_terminal!(downstream);
}

// ============================================================================
// Observable
// ============================================================================

/// A cold, multicast stream driven by a [`Producer`].
///
/// Cloning an `Observable` clones the handle: both clones share observers,
/// ids and activation state.
pub struct Observable<Item, Err> {
  core: Rc<ObservableCore<Item, Err>>,
}

struct ObservableCore<Item, Err> {
  producer: Rc<dyn Producer<Item, Err>>,
  registry: Rc<RefCell<Registry<Item, Err>>>,
  activation: RefCell<Activation>,
}

/// `running` is true exactly while at least one observer is registered.
/// `epoch` counts activations, so a `start` that was overtaken by a nested
/// deactivation/activation can tell its teardown is stale.
#[derive(Default)]
struct Activation {
  running: bool,
  epoch: u64,
  teardown: Teardown,
}

impl<Item, Err> Clone for Observable<Item, Err> {
  fn clone(&self) -> Self { Self { core: self.core.clone() } }
}

impl<Item: 'static, Err: 'static> Observable<Item, Err> {
  /// Creates an observable from a producer closure.
  ///
  /// The closure runs on every activation and may return `()`, a
  /// [`Teardown`], or a `Result` of either.
  ///
  /// ```
  /// use rxlite::prelude::*;
  ///
  /// let ticks = Observable::<u32, ()>::new(|o| {
  ///   o.next(1);
  ///   Teardown::new(move || o.complete())
  /// });
  /// let id = ticks.observe(FnMutObserver(|v: u32| assert_eq!(v, 1))).unwrap();
  /// assert!(ticks.is_running());
  /// ticks.cancel(id).unwrap();
  /// assert!(!ticks.is_running());
  /// ```
  pub fn new<F, T>(producer: F) -> Self
  where
    F: Fn(Orchestrator<Item, Err>) -> T + 'static,
    T: IntoTeardown,
  {
    Self::from_producer(producer)
  }

  /// Creates an observable from any [`Producer`] implementation.
  pub fn from_producer<P>(producer: P) -> Self
  where
    P: Producer<Item, Err> + 'static,
  {
    Self {
      core: Rc::new(ObservableCore {
        producer: Rc::new(producer),
        registry: Rc::new(RefCell::new(Registry::default())),
        activation: RefCell::new(Activation::default()),
      }),
    }
  }

  /// Registers `observer`, starting the producer if the observable was idle.
  ///
  /// If the producer fails to start, the error is returned and every
  /// observer registered since the activation began is removed again. Their
  /// ids stay consumed.
  pub fn observe<O>(&self, observer: O) -> Result<SubscriptionId, RxError>
  where
    O: Observer<Item, Err> + 'static,
  {
    let id = self.core.registry.borrow_mut().add(Box::new(observer));
    trace!(%id, "observe");

    let epoch = {
      let mut activation = self.core.activation.borrow_mut();
      if activation.running {
        None
      } else {
        activation.running = true;
        activation.epoch += 1;
        Some(activation.epoch)
      }
    };

    if let Some(epoch) = epoch {
      self.activate(id, epoch)?;
    }
    Ok(id)
  }

  fn activate(&self, id: SubscriptionId, epoch: u64) -> Result<(), RxError> {
    debug!(%id, epoch, "activating producer");
    let producer = self.core.producer.clone();
    match producer.start(Orchestrator::new(&self.core.registry)) {
      Ok(teardown) => {
        let mut activation = self.core.activation.borrow_mut();
        if activation.running && activation.epoch == epoch {
          activation.teardown = teardown;
        } else {
          // Every observer left while the producer was starting.
          drop(activation);
          debug!(epoch, "activation overtaken during start, tearing down");
          teardown.run();
        }
        Ok(())
      }
      Err(err) => {
        let current = {
          let mut activation = self.core.activation.borrow_mut();
          let current = activation.running && activation.epoch == epoch;
          if current {
            activation.running = false;
          }
          current
        };
        if current {
          // Observers that joined while `start` ran belong to the failed
          // activation too.
          let dropped = self.core.registry.borrow_mut().clear();
          debug!(
            %id,
            label = err.as_label(),
            dropped = dropped.len(),
            "producer failed to start"
          );
        } else {
          let _removed = self.core.registry.borrow_mut().remove(id);
          debug!(
            %id,
            label = err.as_label(),
            "overtaken producer failed to start"
          );
        }
        Err(err)
      }
    }
  }

  /// Removes exactly the subscription `id`.
  ///
  /// Fails with [`RxError::NotFound`] without touching the registry when the
  /// id is not registered. Removing the last observer runs the producer's
  /// teardown before returning.
  pub fn cancel(&self, id: SubscriptionId) -> Result<SubscriptionId, RxError> {
    let (removed, now_empty) = {
      let mut registry = self.core.registry.borrow_mut();
      let removed = registry.remove(id);
      (removed, registry.is_empty())
    };
    if removed.is_none() {
      return Err(RxError::NotFound { id });
    }
    trace!(%id, "cancel");
    if now_empty {
      self.deactivate();
    }
    Ok(id)
  }

  /// Removes every subscription, running the teardown once if the producer
  /// was active. Returns the removed ids in subscription order.
  pub fn cancel_all(&self) -> Vec<SubscriptionId> {
    let ids = self.core.registry.borrow_mut().clear();
    trace!(count = ids.len(), "cancel all");
    self.deactivate();
    ids
  }

  fn deactivate(&self) {
    let teardown = {
      let mut activation = self.core.activation.borrow_mut();
      if !activation.running {
        return;
      }
      activation.running = false;
      std::mem::take(&mut activation.teardown)
    };
    debug!("deactivating producer");
    teardown.run();
  }

  /// `true` while the producer is active.
  pub fn is_running(&self) -> bool { self.core.activation.borrow().running }

  pub fn observer_count(&self) -> usize { self.core.registry.borrow().len() }

  /// Registered subscription ids in subscription order.
  pub fn observer_ids(&self) -> Vec<SubscriptionId> {
    self.core.registry.borrow().ids()
  }
}

impl<Item, Err> Source for Observable<Item, Err>
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
    Observable::observe(self, observer)
  }

  #[inline]
  fn cancel(&self, id: SubscriptionId) -> Result<SubscriptionId, RxError> {
    Observable::cancel(self, id)
  }

  #[inline]
  fn cancel_all(&self) -> Vec<SubscriptionId> { Observable::cancel_all(self) }

  fn to_observable(&self) -> Observable<Item, Err> { self.clone() }
}
