#![forbid(unsafe_code)]

//! Structural comparison of render outputs.
//!
//! Two render outputs are compared through their dynamic slots only. Static
//! markup is never inspected, so a template literal re-created on every render
//! compares equal to itself as long as its interpolated values do.
//!
//! # Algorithm
//!
//! 1. Different slot counts: changed, no slot is read.
//! 2. Otherwise walk both sequences position by position and stop at the
//!    first difference.
//! 3. Each position is compared by the first rule whose shape matches:
//!    - both [`Callable`]: same declared name (see [`CallableIdentity`]),
//!    - both [`Template`]: recurse into their slots, markup ignored,
//!    - both lists: recurse; fully keyed lists compare keys first,
//!    - both [`Keyed`]: same key, then recurse into the payload,
//!    - anything else: `PartialEq` on [`Value`].
//!
//! # Invariants
//!
//! 1. The comparator is pure: no allocation is observable and neither input
//!    is modified.
//! 2. No slot past the first differing position of a sequence is read.
//! 3. Any shape mismatch is reported as a change.
//! 4. An unchanged nested template does not end the scan of its parent.
//!
//! # Known limitations
//!
//! - Closures are matched by name. Two different closures sharing a name
//!   compare equal even if they capture different state. Attach a
//!   [`CallableToken`](crate::value::CallableToken) or use
//!   [`CallableIdentity::Strict`] when that matters.
//! - [`Opaque`](crate::value::Opaque) values compare by identity, so mutating
//!   a shared object in place is not detected.

use std::fmt;
use std::mem;

use ahash::AHashMap;
use smallvec::SmallVec;

use crate::value::{Callable, Key, Template, Value};

use crate::logging::trace;

/// Position of a slot inside nested outputs, outermost index first.
pub type SlotPath = SmallVec<[usize; 4]>;

/// Read access to an ordered sequence of dynamic slots.
pub trait DynamicSlots {
    /// Number of slots.
    fn slot_count(&self) -> usize;

    /// The slot at `index`.
    ///
    /// Callers only pass `index < slot_count()`.
    fn slot(&self, index: usize) -> &Value;
}

impl DynamicSlots for [Value] {
    #[inline]
    fn slot_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn slot(&self, index: usize) -> &Value {
        &self[index]
    }
}

impl DynamicSlots for Vec<Value> {
    #[inline]
    fn slot_count(&self) -> usize {
        self.len()
    }

    #[inline]
    fn slot(&self, index: usize) -> &Value {
        &self[index]
    }
}

impl DynamicSlots for Template {
    #[inline]
    fn slot_count(&self) -> usize {
        self.values().len()
    }

    #[inline]
    fn slot(&self, index: usize) -> &Value {
        &self.values()[index]
    }
}

/// How two callables are matched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallableIdentity {
    /// Match on declared name. When both sides carry a token the tokens
    /// decide; a token on only one side counts as a change.
    #[default]
    Name,
    /// Match on token when both sides carry one, otherwise on closure
    /// identity. Re-created inline closures always count as changed.
    Strict,
}

/// Why a position was reported as changed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeReason {
    /// Sequences of different lengths.
    LengthMismatch { prev: usize, next: usize },
    /// Two callables that do not match under the identity policy.
    CallableMismatch,
    /// A key in a keyed list (or a keyed value) that the previous output did
    /// not have at this position, and nowhere else either.
    KeyMismatch,
    /// A key that existed in the previous output at position `from`.
    KeyMoved { from: usize },
    /// Values of different shapes.
    ShapeMismatch {
        prev: &'static str,
        next: &'static str,
    },
    /// Same shape, different value.
    ValueMismatch,
}

/// First difference between two outputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    /// Where the difference was found. Empty for a top-level length mismatch.
    pub path: SlotPath,
    pub reason: ChangeReason,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "slot [")?;
        for (i, index) in self.path.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]: ")?;
        match &self.reason {
            ChangeReason::LengthMismatch { prev, next } => write!(f, "length {prev} -> {next}"),
            ChangeReason::CallableMismatch => write!(f, "callable replaced"),
            ChangeReason::KeyMismatch => write!(f, "key changed"),
            ChangeReason::KeyMoved { from } => write!(f, "key moved from {from}"),
            ChangeReason::ShapeMismatch { prev, next } => write!(f, "{prev} -> {next}"),
            ChangeReason::ValueMismatch => write!(f, "value changed"),
        }
    }
}

/// Render-output comparator.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Comparator {
    callable_identity: CallableIdentity,
}

impl Comparator {
    #[must_use]
    pub const fn new(callable_identity: CallableIdentity) -> Self {
        Self { callable_identity }
    }

    #[must_use]
    pub const fn callable_identity(&self) -> CallableIdentity {
        self.callable_identity
    }

    /// Whether `next` is observably different from `prev`.
    #[must_use]
    pub fn changed<P, N>(&self, prev: &P, next: &N) -> bool
    where
        P: DynamicSlots + ?Sized,
        N: DynamicSlots + ?Sized,
    {
        self.first_change(prev, next).is_some()
    }

    /// The first difference between `prev` and `next`, if any.
    #[must_use]
    pub fn first_change<P, N>(&self, prev: &P, next: &N) -> Option<Change>
    where
        P: DynamicSlots + ?Sized,
        N: DynamicSlots + ?Sized,
    {
        let mut path = SlotPath::new();
        let reason = self.diff_slots(prev, next, &mut path)?;
        trace!(path = ?path, reason = ?reason, "render output changed");
        Some(Change { path, reason })
    }

    fn diff_slots<P, N>(&self, prev: &P, next: &N, path: &mut SlotPath) -> Option<ChangeReason>
    where
        P: DynamicSlots + ?Sized,
        N: DynamicSlots + ?Sized,
    {
        let len = prev.slot_count();
        let next_len = next.slot_count();
        if len != next_len {
            return Some(ChangeReason::LengthMismatch {
                prev: len,
                next: next_len,
            });
        }

        for index in 0..len {
            path.push(index);
            if let Some(reason) = self.diff_value(prev.slot(index), next.slot(index), path) {
                return Some(reason);
            }
            path.pop();
        }
        None
    }

    fn diff_value(&self, prev: &Value, next: &Value, path: &mut SlotPath) -> Option<ChangeReason> {
        match (prev, next) {
            (Value::Callable(a), Value::Callable(b)) => {
                (!self.same_callable(a, b)).then_some(ChangeReason::CallableMismatch)
            }
            (Value::Template(a), Value::Template(b)) => self.diff_slots(a, b, path),
            (Value::List(a), Value::List(b)) => self.diff_list(a, b, path),
            (Value::Keyed(a), Value::Keyed(b)) => {
                if a.key == b.key {
                    self.diff_value(&a.value, &b.value, path)
                } else {
                    Some(ChangeReason::KeyMismatch)
                }
            }
            _ if prev == next => None,
            _ if mem::discriminant(prev) != mem::discriminant(next) => {
                Some(ChangeReason::ShapeMismatch {
                    prev: prev.shape(),
                    next: next.shape(),
                })
            }
            _ => Some(ChangeReason::ValueMismatch),
        }
    }

    fn diff_list(
        &self,
        prev: &[Value],
        next: &[Value],
        path: &mut SlotPath,
    ) -> Option<ChangeReason> {
        if prev.len() != next.len() {
            return Some(ChangeReason::LengthMismatch {
                prev: prev.len(),
                next: next.len(),
            });
        }

        // Keys first, payloads second. Duplicate or missing keys fall back
        // to the positional walk.
        if let (Some(prev_index), Some(_)) = (key_index(prev), key_index(next)) {
            for (position, (p, n)) in prev.iter().zip(next).enumerate() {
                let (Some(prev_key), Some(next_key)) = (key_of(p), key_of(n)) else {
                    continue;
                };
                if prev_key != next_key {
                    path.push(position);
                    return Some(match prev_index.get(next_key) {
                        Some(&from) => ChangeReason::KeyMoved { from },
                        None => ChangeReason::KeyMismatch,
                    });
                }
            }
        }

        self.diff_slots(prev, next, path)
    }

    fn same_callable(&self, a: &Callable, b: &Callable) -> bool {
        match (a.token(), b.token()) {
            (Some(x), Some(y)) => x == y,
            (None, None) if self.callable_identity == CallableIdentity::Name => {
                a.name() == b.name()
            }
            (None, None) => a.ptr_eq(b),
            _ => false,
        }
    }
}

fn key_of(value: &Value) -> Option<&Key> {
    match value {
        Value::Keyed(keyed) => Some(&keyed.key),
        _ => None,
    }
}

/// Key -> position for a list whose entries are all keyed with unique keys.
fn key_index(items: &[Value]) -> Option<AHashMap<&Key, usize>> {
    let mut index = AHashMap::with_capacity(items.len());
    for (position, item) in items.iter().enumerate() {
        let key = key_of(item)?;
        if index.insert(key, position).is_some() {
            return None;
        }
    }
    Some(index)
}

/// [`Comparator::changed`] with the default policy.
#[must_use]
pub fn output_changed<P, N>(prev: &P, next: &N) -> bool
where
    P: DynamicSlots + ?Sized,
    N: DynamicSlots + ?Sized,
{
    Comparator::default().changed(prev, next)
}

/// [`Comparator::first_change`] with the default policy.
#[must_use]
pub fn first_change<P, N>(prev: &P, next: &N) -> Option<Change>
where
    P: DynamicSlots + ?Sized,
    N: DynamicSlots + ?Sized,
{
    Comparator::default().first_change(prev, next)
}
