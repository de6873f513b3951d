#![no_main]

use arbitrary::Arbitrary;
use framewatch_core::{Callable, CallableIdentity, Comparator, Template, Value};
use libfuzzer_sys::fuzz_target;

const MAX_DEPTH: usize = 4;

#[derive(Arbitrary, Debug)]
enum FuzzValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Callable(u8),
    List(Vec<FuzzValue>),
    Template(Vec<FuzzValue>),
    Keyed(u8, Box<FuzzValue>),
}

impl FuzzValue {
    fn to_value(&self, depth: usize) -> Value {
        if depth > MAX_DEPTH {
            return Value::Null;
        }
        match self {
            FuzzValue::Null => Value::Null,
            FuzzValue::Bool(b) => Value::Bool(*b),
            FuzzValue::Int(i) => Value::Int(*i),
            // NaN never equals itself; keep reflexivity checkable.
            FuzzValue::Float(f) if f.is_nan() => Value::Float(0.0),
            FuzzValue::Float(f) => Value::Float(*f),
            FuzzValue::Str(s) => Value::from(s.as_str()),
            FuzzValue::Callable(tag) => {
                Value::from(Callable::new(format!("cb{}", tag % 4), |_| {}))
            }
            FuzzValue::List(items) => Value::List(convert(items, depth + 1)),
            FuzzValue::Template(items) => {
                Value::from(Template::from_values(convert(items, depth + 1)))
            }
            FuzzValue::Keyed(key, inner) => {
                Value::keyed(i64::from(*key % 8), inner.to_value(depth + 1))
            }
        }
    }
}

fn convert(items: &[FuzzValue], depth: usize) -> Vec<Value> {
    items.iter().take(16).map(|v| v.to_value(depth)).collect()
}

fuzz_target!(|input: (Vec<FuzzValue>, Vec<FuzzValue>)| {
    let prev = convert(&input.0, 0);
    let next = convert(&input.1, 0);
    let comparator = Comparator::new(CallableIdentity::Name);

    assert!(comparator.first_change(&prev, &prev.clone()).is_none());

    let forward = comparator.first_change(&prev, &next);
    let backward = comparator.first_change(&next, &prev);
    assert_eq!(forward.is_some(), backward.is_some());

    if let Some(change) = forward {
        assert!(!change.path.is_empty() || prev.len() != next.len());
        if let Some(&first) = change.path.first() {
            assert!(first < prev.len());
        }
    }
});
