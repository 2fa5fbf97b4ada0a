//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

// Operators
pub use crate::ops::{self, Operator, SourceExt};
// Observer trait and adapters
pub use crate::observer::{
  FnMutObserver, Observer, Subscriber, SubscriberBuilder,
};
pub use crate::{
  error::{RxError, UnhandledError},
  observable::{Observable, Source},
  orchestrator::Orchestrator,
  pipe,
  producer::{IntoTeardown, Producer, Teardown},
  subject::Subject,
  SubscriptionId,
};
