//! Argument checks run at the public entry points.
//!
//! Most of the contract is carried by types: a [`Producer`](crate::Producer)
//! is always callable, every operator passed to `pipe` is an
//! [`Operator`](crate::ops::Operator), and an observer's `error`/`complete`
//! handlers are either absent or callable. What cannot be expressed in a
//! signature is checked here and reported as [`RxError::Contract`].

use crate::{error::RxError, SubscriptionId};

/// Fails unless an observer's `next` handler is present, handing it back.
///
/// ```
/// use rxlite::validate;
///
/// let next: Option<fn(i32)> = None;
/// let err = validate::observer(next).unwrap_err();
/// assert_eq!(err.as_label(), "contract");
/// ```
pub fn observer<F>(next: Option<F>) -> Result<F, RxError> {
  next.ok_or_else(|| RxError::contract("observer requires a \"next\" method."))
}

/// Turns a raw integer into a subscription id, failing for values no
/// `observe` call could have returned.
pub fn id<T>(raw: T) -> Result<SubscriptionId, RxError>
where
  T: TryInto<usize> + Copy + std::fmt::Display,
{
  raw
    .try_into()
    .map(SubscriptionId::new)
    .map_err(|_| {
      let reason = format!("id must be a non-negative integer. Got: {raw}");
      RxError::contract(reason)
    })
}

macro_rules! impl_try_from_int {
  ($($t: ty),*) => {
    $(
      impl TryFrom<$t> for SubscriptionId {
        type Error = RxError;
        fn try_from(raw: $t) -> Result<Self, Self::Error> { id(raw) }
      }
    )*
  };
}

impl_try_from_int!(i32, i64, isize, u32, u64);
