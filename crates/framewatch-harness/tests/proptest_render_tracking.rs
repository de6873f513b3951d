//! Property-based tests for render-tracked components.
//!
//! 1. A render-tracked component redraws on the first tick, then exactly on
//!    the ticks where its rendered values differ from the last redraw.
//! 2. Keyed rows redraw iff the row sequence differs from the previous tick.
//! 3. Replaying the same script yields the same trace digest.

#![forbid(unsafe_code)]

use std::cell::Cell;
use std::rc::Rc;

use framewatch_harness::Harness;
use framewatch_harness::fixtures::{Roster, Ticker};
use proptest::prelude::*;

fn run_ticker(values: &[i64]) -> (Vec<usize>, Option<String>) {
    let mut harness = Harness::new();
    let source = Rc::new(Cell::new(values.first().copied().unwrap_or_default()));
    let _ticker = harness.mount(Ticker::new(Rc::clone(&source)));
    let redraws = values
        .iter()
        .map(|v| {
            source.set(*v);
            harness.tick().redraws
        })
        .collect();
    (redraws, harness.trace().final_digest().map(str::to_string))
}

proptest! {
    #[test]
    fn render_redraws_track_value_changes(values in proptest::collection::vec(-3i64..3, 1..24)) {
        let (redraws, _) = run_ticker(&values);
        for (tick, issued) in redraws.iter().enumerate() {
            let expected = usize::from(tick == 0 || values[tick] != values[tick - 1]);
            prop_assert_eq!(*issued, expected, "tick {}", tick + 1);
        }
    }

    #[test]
    fn replay_is_deterministic(values in proptest::collection::vec(-3i64..3, 1..12)) {
        let (a_redraws, a_digest) = run_ticker(&values);
        let (b_redraws, b_digest) = run_ticker(&values);
        prop_assert_eq!(a_redraws, b_redraws);
        prop_assert_eq!(a_digest, b_digest);
    }
}

fn rows() -> impl Strategy<Value = Vec<(i64, String)>> {
    proptest::collection::vec((0i64..5, "[ab]{1}"), 0..5)
}

proptest! {
    #[test]
    fn keyed_rows_redraw_iff_rows_differ(script in proptest::collection::vec(rows(), 1..10)) {
        let mut harness = Harness::new();
        let roster = harness.mount(Roster::default());
        let mut previous: Option<Vec<(i64, String)>> = None;

        for next in script {
            roster.with_mut(|r| r.rows = next.clone());
            let issued = harness.tick().redraws;
            let expected = usize::from(previous.as_ref() != Some(&next));
            prop_assert_eq!(issued, expected);
            previous = Some(next);
        }
    }
}
