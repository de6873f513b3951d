//! Property-based invariant tests for the render-output comparator.
//!
//! 1. Any output compared with a clone of itself is unchanged.
//! 2. The verdict is symmetric.
//! 3. Different lengths report a change without reading any slot.
//! 4. For flat primitive sequences the verdict is "any position differs", and
//!    nothing past the first differing position is read.
//! 5. Static markup never influences the verdict.
//! 6. Callables with the same name compare equal whatever they capture.
//! 7. The comparator is deterministic.

use std::cell::Cell;
use std::rc::Rc;

use framewatch_core::{
    Callable, ChangeReason, DynamicSlots, Template, Value, first_change, output_changed,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

/// Slot source that records the highest index read.
struct Spy<'a> {
    values: &'a [Value],
    reads: Cell<usize>,
    max_index: Cell<Option<usize>>,
}

impl<'a> Spy<'a> {
    fn new(values: &'a [Value]) -> Self {
        Self {
            values,
            reads: Cell::new(0),
            max_index: Cell::new(None),
        }
    }
}

impl DynamicSlots for Spy<'_> {
    fn slot_count(&self) -> usize {
        self.values.len()
    }

    fn slot(&self, index: usize) -> &Value {
        self.reads.set(self.reads.get() + 1);
        let max = self.max_index.get().map_or(index, |m| m.max(index));
        self.max_index.set(Some(max));
        &self.values[index]
    }
}

/// Primitive slot values. Floats exclude NaN so that every value equals
/// itself.
fn primitive() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-20i64..20).prop_map(Value::Int),
        (-1.0e6f64..1.0e6).prop_map(Value::Float),
        "[a-z]{0,4}".prop_map(Value::from),
    ]
}

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        4 => primitive(),
        1 => "[a-c]{1,2}".prop_map(|name| Value::from(Callable::new(name, |_| {}))),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 32, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            proptest::collection::vec(inner.clone(), 0..4)
                .prop_map(|values| Value::from(Template::from_values(values))),
            (0i64..4, inner).prop_map(|(key, v)| Value::keyed(key, v)),
        ]
    })
}

fn output() -> impl Strategy<Value = Vec<Value>> {
    proptest::collection::vec(value(), 0..8)
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Reflexivity and symmetry
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn clone_is_unchanged(values in output()) {
        let copy = values.clone();
        prop_assert!(!output_changed(&values, &copy));
    }

    #[test]
    fn verdict_is_symmetric(a in output(), b in output()) {
        prop_assert_eq!(output_changed(&a, &b), output_changed(&b, &a));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Length mismatch reads nothing
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn length_mismatch_reads_no_slot(a in output(), b in output()) {
        prop_assume!(a.len() != b.len());
        let spy_a = Spy::new(&a);
        let spy_b = Spy::new(&b);
        let change = first_change(&spy_a, &spy_b);
        prop_assert_eq!(
            change.map(|c| c.reason),
            Some(ChangeReason::LengthMismatch { prev: a.len(), next: b.len() })
        );
        prop_assert_eq!(spy_a.reads.get(), 0);
        prop_assert_eq!(spy_b.reads.get(), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Flat sequences: positional equality and short-circuit
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn flat_sequences_stop_at_first_mismatch(
        pairs in proptest::collection::vec((primitive(), primitive()), 0..12),
    ) {
        let (prev, next): (Vec<Value>, Vec<Value>) = pairs.into_iter().unzip();
        let first_mismatch = prev.iter().zip(&next).position(|(p, n)| p != n);

        let spy_prev = Spy::new(&prev);
        let spy_next = Spy::new(&next);
        let change = first_change(&spy_prev, &spy_next);

        match first_mismatch {
            None => {
                prop_assert!(change.is_none());
                prop_assert_eq!(spy_prev.reads.get(), prev.len());
            }
            Some(index) => {
                let change = change.expect("mismatch must be reported");
                prop_assert_eq!(change.path.as_slice(), &[index]);
                prop_assert_eq!(spy_prev.max_index.get(), Some(index));
                prop_assert_eq!(spy_next.max_index.get(), Some(index));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Static markup is ignored
// ═════════════════════════════════════════════════════════════════════════

static MARKUP_A: [&str; 3] = ["<p>", " and ", "</p>"];
static MARKUP_B: [&str; 2] = ["<section class=\"x\">", "</section>"];

proptest! {
    #[test]
    fn markup_does_not_matter(values in output()) {
        let prev = vec![Value::from(Template::new(&MARKUP_A, values.clone()))];
        let next = vec![Value::from(Template::new(&MARKUP_B, values))];
        prop_assert!(!output_changed(&prev, &next));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Callables match by name
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn same_name_different_capture_is_equal(name in "[a-z_]{1,10}", x in any::<i64>(), y in any::<i64>()) {
        let sink = Rc::new(Cell::new(0i64));
        let s1 = Rc::clone(&sink);
        let s2 = Rc::clone(&sink);
        let prev = vec![Value::from(Callable::new(name.clone(), move |_| s1.set(x)))];
        let next = vec![Value::from(Callable::new(name, move |_| s2.set(y)))];
        prop_assert!(!output_changed(&prev, &next));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Determinism
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn repeated_comparison_is_stable(a in output(), b in output()) {
        let first = first_change(&a, &b);
        let second = first_change(&a, &b);
        prop_assert_eq!(first, second);
    }
}
