#![forbid(unsafe_code)]

//! The per-component dirty check run once per tick.
//!
//! # Steps
//!
//! 1. Poll every lazily tracked member and compare it with the cached value.
//! 2. If the component tracks its render output, render it and compare the
//!    dynamic slots with the cached snapshot. On change the snapshot is
//!    replaced wholesale.
//! 3. If either step found a change, ask the host for exactly one redraw.
//!
//! # Invariants
//!
//! 1. At most one redraw request per check.
//! 2. The snapshot only changes when the comparator reports a change.
//! 3. The component is not borrowed while the host is called.
//! 4. The cycle never keeps the component alive: it holds a `Weak`.
//!
//! # Failure Modes
//!
//! - **Private tracked name**: the check fails with
//!   [`TrackError::PrivateMember`] and the host is told through
//!   [`Host::report_error`]. Members polled before the private name keep
//!   their new values, and if any of them changed the redraw is still
//!   requested before the error is reported. The render output is not
//!   compared.
//! - **Component dropped without unmount**: the check returns
//!   [`CheckOutcome::Detached`] so the scheduler can prune it.
//! - **Component already borrowed** (a check issued from inside one of its
//!   own methods): the check returns [`CheckOutcome::Busy`] and does nothing.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use framewatch_core::{Comparator, Value};

use crate::component::{Component, ComponentId, Host};
use crate::error::{Result, TrackError};
use crate::tracking::{TrackedMemberRegistry, TrackingSpec};

/// What a single dirty check decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Nothing changed.
    Clean,
    /// A redraw was requested.
    Redraw,
    /// The component was busy; nothing was checked.
    Busy,
    /// The component no longer exists.
    Detached,
}

/// A callback the [`FrameScheduler`](crate::scheduler::FrameScheduler)
/// invokes once per tick.
pub trait DirtyCheck {
    /// The component this check belongs to.
    fn component(&self) -> ComponentId;

    /// Run the check.
    ///
    /// # Errors
    ///
    /// Any error is fatal for the component.
    fn dirty_check(&self) -> Result<CheckOutcome>;
}

/// Counters accumulated by one cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CycleStats {
    /// Checks that actually ran (not busy, not detached).
    pub checks: u64,
    /// Redraw requests issued.
    pub redraws: u64,
    /// Lazily tracked members seen changing.
    pub member_changes: u64,
    /// Render passes performed for comparison.
    pub renders: u64,
    /// Render passes whose output differed from the snapshot.
    pub render_changes: u64,
}

/// Dirty check for one mounted component.
pub struct DirtyCheckCycle<C> {
    id: ComponentId,
    component: Weak<RefCell<C>>,
    registry: RefCell<TrackedMemberRegistry>,
    /// `None` unless the render output is tracked.
    snapshot: RefCell<Option<Vec<Value>>>,
    comparator: Comparator,
    host: Rc<dyn Host>,
    stats: Cell<CycleStats>,
}

impl<C: Component> DirtyCheckCycle<C> {
    pub fn new(
        id: ComponentId,
        component: &Rc<RefCell<C>>,
        spec: &TrackingSpec,
        comparator: Comparator,
        host: Rc<dyn Host>,
    ) -> Self {
        let registry = TrackedMemberRegistry::from_spec(spec);
        let snapshot = registry.render_tracked().then(Vec::new);
        Self {
            id,
            component: Rc::downgrade(component),
            registry: RefCell::new(registry),
            snapshot: RefCell::new(snapshot),
            comparator,
            host,
            stats: Cell::new(CycleStats::default()),
        }
    }

    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    #[must_use]
    pub fn registry(&self) -> Ref<'_, TrackedMemberRegistry> {
        self.registry.borrow()
    }

    /// The cached render slots, if the render output is tracked.
    #[must_use]
    pub fn snapshot(&self) -> Option<Vec<Value>> {
        self.snapshot.borrow().clone()
    }

    #[must_use]
    pub fn stats(&self) -> CycleStats {
        self.stats.get()
    }

    /// Forget every cached value and the render snapshot.
    pub fn reset(&self) {
        self.registry.borrow_mut().clear();
        if let Some(snapshot) = self.snapshot.borrow_mut().as_mut() {
            snapshot.clear();
        }
    }

    /// Run one dirty check.
    ///
    /// # Errors
    ///
    /// [`TrackError::PrivateMember`] when a lazily tracked name is private.
    /// The error is also reported to the host, after any redraw owed for
    /// members that changed before it.
    pub fn run(&self) -> Result<CheckOutcome> {
        let Some(component) = self.component.upgrade() else {
            return Ok(CheckOutcome::Detached);
        };
        let (redraw, failure) = {
            let Ok(component) = component.try_borrow() else {
                tracing::debug!(component = %self.id, "dirty check skipped: component busy");
                return Ok(CheckOutcome::Busy);
            };
            self.detect(&component)
        };

        if redraw {
            self.bump(|s| s.redraws += 1);
            self.host.request_redraw(self.id);
        }
        if let Some(error) = failure {
            tracing::error!(component = %self.id, error = %error, "dirty check failed");
            self.host.report_error(self.id, &error);
            return Err(error);
        }
        Ok(if redraw {
            CheckOutcome::Redraw
        } else {
            CheckOutcome::Clean
        })
    }

    /// Whether a redraw is owed, plus the error that cut the check short.
    fn detect(&self, component: &C) -> (bool, Option<TrackError>) {
        self.bump(|s| s.checks += 1);

        let polled = self
            .registry
            .borrow_mut()
            .poll(|name| component.member(name).unwrap_or_default());
        let changed_members = polled.changed;
        if changed_members > 0 {
            tracing::debug!(
                component = %self.id,
                changed = changed_members,
                "tracked members changed"
            );
            self.bump(|s| s.member_changes += changed_members as u64);
        }
        if polled.error.is_some() {
            return (changed_members > 0, polled.error);
        }

        let mut snapshot = self.snapshot.borrow_mut();
        let Some(cached) = snapshot.as_mut() else {
            return (changed_members > 0, None);
        };

        self.bump(|s| s.renders += 1);
        let fresh = component.render().into_values();
        let render_changed = match self.comparator.first_change(&*cached, &fresh) {
            Some(change) => {
                tracing::debug!(component = %self.id, change = %change, "render output changed");
                *cached = fresh;
                self.bump(|s| s.render_changes += 1);
                true
            }
            None => false,
        };

        (changed_members > 0 || render_changed, None)
    }

    fn bump(&self, f: impl FnOnce(&mut CycleStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

impl<C: Component> DirtyCheck for DirtyCheckCycle<C> {
    fn component(&self) -> ComponentId {
        self.id
    }

    fn dirty_check(&self) -> Result<CheckOutcome> {
        self.run()
    }
}

impl<C> fmt::Debug for DirtyCheckCycle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirtyCheckCycle")
            .field("id", &self.id)
            .field("attached", &(self.component.strong_count() > 0))
            .field("stats", &self.stats.get())
            .finish_non_exhaustive()
    }
}

// ─── Closure-backed checks ───────────────────────────────────────────────────

/// A [`DirtyCheck`] backed by a closure.
pub struct FnCheck<F> {
    id: ComponentId,
    check: F,
}

impl<F> FnCheck<F>
where
    F: Fn() -> Result<CheckOutcome>,
{
    /// Wrap `check` under a freshly allocated component ID.
    pub fn new(check: F) -> Self {
        Self {
            id: ComponentId::next(),
            check,
        }
    }

    /// Wrap `check` under an existing component ID.
    pub fn with_id(id: ComponentId, check: F) -> Self {
        Self { id, check }
    }
}

impl<F> DirtyCheck for FnCheck<F>
where
    F: Fn() -> Result<CheckOutcome>,
{
    fn component(&self) -> ComponentId {
        self.id
    }

    fn dirty_check(&self) -> Result<CheckOutcome> {
        (self.check)()
    }
}

impl<F> fmt::Debug for FnCheck<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnCheck").field("id", &self.id).finish()
    }
}
