#![forbid(unsafe_code)]

//! Reference components covering each tracking kind.

use std::cell::Cell;
use std::rc::Rc;

use framewatch_core::{Callable, Template, Value};
use framewatch_runtime::{Component, Converted, TrackingSpec};

/// One lazily tracked field, `count`, and an untracked render.
#[derive(Debug, Default)]
pub struct Counter {
    pub count: i64,
}

impl Component for Counter {
    fn tracking() -> TrackingSpec {
        TrackingSpec::new().field("count")
    }

    fn member(&self, name: &str) -> Option<Value> {
        (name == "count").then(|| Value::from(self.count))
    }

    fn render(&self) -> Template {
        Template::new(&["<span>", "</span>"], vec![self.count.into()])
    }
}

/// Tracks its render output, which shows a counter owned elsewhere.
#[derive(Debug)]
pub struct Ticker {
    source: Rc<Cell<i64>>,
}

impl Ticker {
    #[must_use]
    pub fn new(source: Rc<Cell<i64>>) -> Self {
        Self { source }
    }
}

impl Component for Ticker {
    fn tracking() -> TrackingSpec {
        TrackingSpec::new().render()
    }

    fn render(&self) -> Template {
        Template::new(&["<time>", "</time>"], vec![self.source.get().into()])
    }
}

/// Lazily tracks a private member, which fails on the first check.
#[derive(Debug, Default)]
pub struct Secretive {
    pub visible: i64,
}

impl Component for Secretive {
    fn tracking() -> TrackingSpec {
        TrackingSpec::new().field("visible").field("#secret")
    }

    fn member(&self, name: &str) -> Option<Value> {
        (name == "visible").then(|| Value::from(self.visible))
    }

    fn render(&self) -> Template {
        Template::default()
    }
}

/// A range input: a tracked setter with a converter, a tracked method, a
/// lazily tracked label, and a tracked render with an inline handler.
#[derive(Debug)]
pub struct Slider {
    value: Converted<f64>,
    pub label: String,
    pub hooks: Vec<&'static str>,
}

impl Slider {
    #[must_use]
    pub fn new(label: &str, value: f64) -> Self {
        Self {
            value: Converted::new(value, clamp_unit),
            label: label.to_string(),
            hooks: Vec::new(),
        }
    }

    #[must_use]
    pub fn value(&self) -> f64 {
        *self.value
    }

    /// Setter body for `value`.
    pub fn set_value(&mut self, value: f64) {
        self.value.set(value);
    }

    /// Method body for `reset`.
    pub fn reset(&mut self) {
        self.value.set(0.0);
    }
}

fn clamp_unit(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

impl Component for Slider {
    fn tracking() -> TrackingSpec {
        TrackingSpec::new()
            .setter("value")
            .method("reset")
            .field("label")
            .method("render")
    }

    fn member(&self, name: &str) -> Option<Value> {
        (name == "label").then(|| Value::from(self.label.as_str()))
    }

    fn render(&self) -> Template {
        let percent = (self.value() * 100.0).round() as i64;
        let label = self.label.clone();
        let on_input = Callable::new("on_input", move |input| {
            tracing::trace!(%label, from = percent, input = ?input, "slider input");
        });
        Template::new(
            &["<label>", "</label><input value=", " oninput=", ">", "</input>"],
            vec![
                self.label.as_str().into(),
                self.value.to_value(),
                on_input.into(),
                Template::new(&["<em>", "%</em>"], vec![percent.into()]).into(),
            ],
        )
    }

    fn on_mount(&mut self) {
        self.hooks.push("mount");
    }

    fn on_update(&mut self) {
        self.hooks.push("update");
    }

    fn on_unmount(&mut self) {
        self.hooks.push("unmount");
    }
}

/// A list rendered as keyed rows.
#[derive(Debug, Default)]
pub struct Roster {
    pub rows: Vec<(i64, String)>,
}

impl Component for Roster {
    fn tracking() -> TrackingSpec {
        TrackingSpec::new().render()
    }

    fn render(&self) -> Template {
        let rows = self
            .rows
            .iter()
            .map(|(id, name)| {
                Value::keyed(
                    *id,
                    Template::new(&["<li>", "</li>"], vec![name.as_str().into()]),
                )
            })
            .collect::<Vec<_>>();
        Template::new(&["<ul>", "</ul>"], vec![Value::List(rows)])
    }
}
