#![forbid(unsafe_code)]

//! Boundary with the hosting UI framework.
//!
//! The runtime never paints anything. It reads state from a [`Component`],
//! decides whether the component's visible output changed, and tells the
//! [`Host`] to repaint it.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use framewatch_core::{Template, Value};

use crate::error::TrackError;
use crate::tracking::TrackingSpec;

// ─── Component ID generation ─────────────────────────────────────────────────

static NEXT_COMPONENT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a mounted component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Allocate a fresh ID.
    #[must_use]
    pub fn next() -> Self {
        Self(NEXT_COMPONENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub const fn from_raw(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ─── Component ───────────────────────────────────────────────────────────────

/// A UI component observed by the runtime.
///
/// Implementors describe their tracked members once per type, expose the
/// current value of lazily tracked members by name, and produce their render
/// output on demand.
pub trait Component: 'static {
    /// Tracking declarations for this component type.
    fn tracking() -> TrackingSpec
    where
        Self: Sized;

    /// Current value of the member called `name`.
    ///
    /// Returning `None` is treated as [`Value::Null`].
    fn member(&self, name: &str) -> Option<Value> {
        let _ = name;
        None
    }

    /// Produce the current render output.
    ///
    /// Must not have side effects: the runtime calls it during dirty checks
    /// purely to compare outputs.
    fn render(&self) -> Template;

    /// Called once after the component is mounted.
    fn on_mount(&mut self) {}

    /// Called after the host repainted the component.
    fn on_update(&mut self) {}

    /// Called once when the component is unmounted.
    fn on_unmount(&mut self) {}
}

// ─── Host ────────────────────────────────────────────────────────────────────

/// The framework that owns and paints components.
pub trait Host {
    /// Mark `component` for repaint before the next visible frame.
    ///
    /// May be called several times for one component within a frame; the
    /// host decides how to coalesce.
    fn request_redraw(&self, component: ComponentId);

    /// A fatal error surfaced while checking `component`.
    fn report_error(&self, component: ComponentId, error: &TrackError) {
        tracing::error!(component = %component, error = %error, "component error");
    }
}

// ─── Invalidator ─────────────────────────────────────────────────────────────

/// Handle that requests an immediate redraw of one component.
///
/// This is what tracked setters and methods go through. Cloning shares the
/// request counter.
#[derive(Clone)]
pub struct Invalidator {
    component: ComponentId,
    host: Rc<dyn Host>,
    requests: Rc<Cell<u64>>,
}

impl Invalidator {
    #[must_use]
    pub fn new(component: ComponentId, host: Rc<dyn Host>) -> Self {
        Self {
            component,
            host,
            requests: Rc::new(Cell::new(0)),
        }
    }

    /// Request a redraw now.
    pub fn invalidate(&self) {
        self.requests.set(self.requests.get() + 1);
        tracing::trace!(component = %self.component, "eager invalidation");
        self.host.request_redraw(self.component);
    }

    #[must_use]
    pub const fn component(&self) -> ComponentId {
        self.component
    }

    /// Number of eager redraw requests issued so far.
    #[must_use]
    pub fn requests(&self) -> u64 {
        self.requests.get()
    }
}

impl fmt::Debug for Invalidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invalidator")
            .field("component", &self.component)
            .field("requests", &self.requests.get())
            .finish_non_exhaustive()
    }
}
