#![forbid(unsafe_code)]

//! Core: dynamic render values and the render-output comparator.
//!
//! A component's render output is reduced to the ordered sequence of its
//! dynamic slots (everything interpolated into the static markup). This crate
//! defines those slot values ([`Value`]) and decides whether two sequences are
//! observably different ([`Comparator`]). It holds no state of its own.

pub mod compare;
pub mod logging;
pub mod value;

pub use compare::{
    CallableIdentity, Change, ChangeReason, Comparator, DynamicSlots, SlotPath, first_change,
    output_changed,
};
pub use value::{Callable, CallableToken, Key, Keyed, Opaque, Template, Value};
