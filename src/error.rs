//! Error types raised by streams and their entry points.
//!
//! - [`RxError`]: failures of a call into the library itself (bad arguments,
//!   unknown subscription ids, producers that fail to start).
//! - [`UnhandledError`]: a stream error that reached an observer without an
//!   `error` handler. It travels back out of the broadcast that carried it.

use std::error::Error;

use crate::SubscriptionId;

/// Errors raised synchronously at a public entry point.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum RxError {
  /// A malformed observer or id was passed in.
  #[error("contract violation: {reason}")]
  Contract {
    /// What was wrong with the argument.
    reason: String,
  },

  /// `cancel` was called with an id that is not registered.
  #[error("observer not found. ID: {id}")]
  NotFound {
    /// The id that was looked up.
    id: SubscriptionId,
  },

  /// The producer failed while starting. No observer was registered.
  #[error("producer failed to activate: {0}")]
  Activation(#[source] Box<dyn Error + 'static>),
}

impl RxError {
  pub(crate) fn contract(reason: impl Into<String>) -> Self {
    RxError::Contract { reason: reason.into() }
  }

  /// Wraps any error raised by a producer during activation.
  pub fn activation(err: impl Into<Box<dyn Error + 'static>>) -> Self {
    RxError::Activation(err.into())
  }

  /// Returns a short stable label (snake_case) for use in logs.
  ///
  /// ```
  /// use rxlite::prelude::*;
  ///
  /// let err = RxError::NotFound { id: SubscriptionId::new(3) };
  /// assert_eq!(err.as_label(), "not_found");
  /// ```
  pub fn as_label(&self) -> &'static str {
    match self {
      RxError::Contract { .. } => "contract",
      RxError::NotFound { .. } => "not_found",
      RxError::Activation(_) => "activation",
    }
  }
}

/// A stream error that an observer had no handler for.
///
/// Broadcasting stops at the first observer without an `error` handler; every
/// observer before it has already been handed a clone of the error.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("stream error reached observer {id} which has no error handler")]
pub struct UnhandledError<Err> {
  /// Subscription id of the observer that lacked a handler.
  pub id: SubscriptionId,
  /// The error value that went unhandled.
  pub error: Err,
}

impl<Err> UnhandledError<Err> {
  pub fn into_inner(self) -> Err { self.error }
}
