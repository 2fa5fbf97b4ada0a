use futures::{
  future::{Future, FutureExt},
  task::{LocalSpawn, LocalSpawnExt},
};

use super::Observable;
use crate::{error::RxError, orchestrator::Orchestrator, producer::Teardown};

impl<Item, Err> Observable<Item, Err>
where
  Item: Clone + 'static,
  Err: Clone + 'static,
{
  /// Converts a `Future` into an observable.
  ///
  /// Each activation spawns a task on `spawner` that awaits the future. `Ok`
  /// is emitted as a value followed by `complete`, `Err` is emitted through
  /// the error path. The future is shared, so it runs at most once and later
  /// activations see the same result. Deactivating cancels the spawned task.
  ///
  /// ```
  /// use futures::{executor::LocalPool, future};
  /// use rxlite::prelude::*;
  /// use std::{cell::Cell, rc::Rc};
  ///
  /// let mut pool = LocalPool::new();
  /// let res = Rc::new(Cell::new(0));
  /// let c_res = res.clone();
  /// Observable::<i32, ()>::from_future(future::ready(Ok(1)), pool.spawner())
  ///   .observe(FnMutObserver(move |v| c_res.set(v)))
  ///   .unwrap();
  /// pool.run_until_stalled();
  /// assert_eq!(res.get(), 1);
  /// ```
  pub fn from_future<Fut, Sp>(future: Fut, spawner: Sp) -> Self
  where
    Fut: Future<Output = Result<Item, Err>> + 'static,
    Sp: LocalSpawn + 'static,
  {
    let shared = future.shared();
    let start = move |o: Orchestrator<Item, Err>| -> Result<Teardown, RxError> {
      let task = shared.clone();
      let handle = spawner
        .spawn_local_with_handle(async move {
          match task.await {
            Ok(value) => {
              o.next(value);
              o.complete();
            }
            Err(err) => {
              if let Err(unhandled) = o.error(err) {
                tracing::error!(
                  id = %unhandled.id,
                  "future failed and its observer has no error handler"
                );
              }
            }
          }
        })
        .map_err(RxError::activation)?;
      Ok(Teardown::new(move || drop(handle)))
    };
    Observable::new(start)
  }
}

#[cfg(test)]
mod tests {
  use std::{cell::RefCell, rc::Rc};

  use futures::{channel::oneshot, executor::LocalPool};

  use crate::prelude::*;

  fn pending(
    pool: &LocalPool,
  ) -> (oneshot::Sender<i32>, Observable<i32, String>) {
    let (tx, rx) = oneshot::channel::<i32>();
    let value = async move { rx.await.map_err(|e| e.to_string()) };
    let source = Observable::from_future(value, pool.spawner());
    (tx, source)
  }

  #[rxlite_macro::test]
  fn emits_resolution_then_completes() {
    let mut pool = LocalPool::new();
    let (tx, source) = pending(&pool);
    let log = Rc::new(RefCell::new(vec![]));
    let (c1, c2) = (log.clone(), log.clone());
    source
      .observe(
        Subscriber::new(move |v: i32| c1.borrow_mut().push(v.to_string()))
          .on_complete(move || c2.borrow_mut().push("done".to_string())),
      )
      .unwrap();

    pool.run_until_stalled();
    assert!(log.borrow().is_empty());

    tx.send(7).unwrap();
    pool.run_until_stalled();
    assert_eq!(*log.borrow(), vec!["7", "done"]);
  }

  #[rxlite_macro::test]
  fn failure_goes_through_error_path() {
    let mut pool = LocalPool::new();
    let failed = futures::future::ready(Err("nope".to_string()));
    let source =
      Observable::<i32, String>::from_future(failed, pool.spawner());
    let seen = Rc::new(RefCell::new(None));
    let c_seen = seen.clone();
    source
      .observe(
        Subscriber::new(|_| {})
          .on_error(move |e| *c_seen.borrow_mut() = Some(e)),
      )
      .unwrap();

    pool.run_until_stalled();
    assert_eq!(seen.borrow().as_deref(), Some("nope"));
  }

  #[rxlite_macro::test]
  fn cancel_drops_the_task_and_reactivation_sees_the_result() {
    let mut pool = LocalPool::new();
    let (tx, source) = pending(&pool);
    let log = Rc::new(RefCell::new(vec![]));

    let c_log = log.clone();
    let observer = FnMutObserver(move |v| c_log.borrow_mut().push(v));
    let id = source.observe(observer).unwrap();
    source.cancel(id).unwrap();
    tx.send(3).unwrap();
    pool.run_until_stalled();
    assert!(log.borrow().is_empty());

    let c_log = log.clone();
    source.observe(FnMutObserver(move |v| c_log.borrow_mut().push(v))).unwrap();
    pool.run_until_stalled();
    assert_eq!(*log.borrow(), vec![3]);
  }
}
