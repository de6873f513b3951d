#![forbid(unsafe_code)]

//! Mount and unmount hooks.
//!
//! [`mount`] makes a component live: it builds the component's
//! [`DirtyCheckCycle`], subscribes it, and runs `on_mount`. The returned
//! [`Mounted`] handle is how the host reaches the component afterwards.
//! Dropping it, or calling [`Mounted::unmount`], unsubscribes the cycle,
//! runs `on_unmount`, and clears the cached state.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use framewatch_core::Comparator;

use crate::component::{Component, ComponentId, Host, Invalidator};
use crate::cycle::{DirtyCheck, DirtyCheckCycle};
use crate::scheduler::{FrameScheduler, SubscriptionId};
use crate::tracking::{MemberKinds, TrackingSpec};

/// Make `component` live on `scheduler`, reporting to `host`.
pub fn mount<C: Component>(
    scheduler: &FrameScheduler,
    host: Rc<dyn Host>,
    component: C,
) -> Mounted<C> {
    let id = ComponentId::next();
    let spec = C::tracking();
    let component = Rc::new(RefCell::new(component));
    let comparator = Comparator::new(scheduler.config().callable_identity);
    let cycle = Rc::new(DirtyCheckCycle::new(
        id,
        &component,
        &spec,
        comparator,
        Rc::clone(&host),
    ));
    let subscription = scheduler.subscribe(Rc::clone(&cycle) as Rc<dyn DirtyCheck>);
    component.borrow_mut().on_mount();
    tracing::debug!(
        component = %id,
        subscription = %subscription,
        members = spec.members().len(),
        render_tracked = spec.tracks_render(),
        "component mounted"
    );

    Mounted {
        id,
        component,
        cycle,
        spec,
        scheduler: scheduler.clone(),
        invalidator: Invalidator::new(id, host),
        subscription: Cell::new(Some(subscription)),
    }
}

/// A live component.
pub struct Mounted<C: Component> {
    id: ComponentId,
    component: Rc<RefCell<C>>,
    cycle: Rc<DirtyCheckCycle<C>>,
    spec: TrackingSpec,
    scheduler: FrameScheduler,
    invalidator: Invalidator,
    subscription: Cell<Option<SubscriptionId>>,
}

impl<C: Component> Mounted<C> {
    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    #[must_use]
    pub fn spec(&self) -> &TrackingSpec {
        &self.spec
    }

    #[must_use]
    pub fn cycle(&self) -> &DirtyCheckCycle<C> {
        &self.cycle
    }

    /// The scheduler subscription, or `None` after unmount.
    #[must_use]
    pub fn subscription(&self) -> Option<SubscriptionId> {
        self.subscription.get()
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.get().is_some()
    }

    /// Read the component.
    ///
    /// # Panics
    ///
    /// Panics if the component is mutably borrowed, i.e. from inside
    /// [`with_mut`](Self::with_mut), [`call`](Self::call) or
    /// [`set`](Self::set).
    pub fn with<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&*self.component.borrow())
    }

    /// Mutate the component directly.
    ///
    /// Nothing is invalidated: changes to lazily tracked members are picked
    /// up by the next dirty check.
    ///
    /// # Panics
    ///
    /// Panics if the component is already borrowed.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut *self.component.borrow_mut())
    }

    /// Invoke the method `member`. If it is declared as a tracked method, a
    /// redraw is requested once `f` returns.
    ///
    /// # Panics
    ///
    /// Panics if the component is already borrowed.
    pub fn call<R>(&self, member: &str, f: impl FnOnce(&mut C) -> R) -> R {
        self.mutate(member, MemberKinds::METHOD, f)
    }

    /// Assign through the setter `member`. If it is declared as a tracked
    /// setter, a redraw is requested once `f` returns.
    ///
    /// # Panics
    ///
    /// Panics if the component is already borrowed.
    pub fn set(&self, member: &str, f: impl FnOnce(&mut C)) {
        self.mutate(member, MemberKinds::SETTER, f);
    }

    fn mutate<R>(&self, member: &str, kind: MemberKinds, f: impl FnOnce(&mut C) -> R) -> R {
        let result = f(&mut *self.component.borrow_mut());
        if self.is_mounted() && self.spec.kinds_of(member).contains(kind) {
            self.invalidator.invalidate();
        }
        result
    }

    /// Handle for requesting redraws from outside the tracked members.
    #[must_use]
    pub fn invalidator(&self) -> Invalidator {
        self.invalidator.clone()
    }

    /// Tell the component the host repainted it.
    pub fn notify_updated(&self) {
        self.component.borrow_mut().on_update();
    }

    /// Make the component not live. Returns `false` if it already was not.
    ///
    /// The cycle receives no further invocations from the scheduler, and
    /// its cached state is cleared.
    pub fn unmount(&self) -> bool {
        let Some(subscription) = self.subscription.take() else {
            return false;
        };
        self.scheduler.unsubscribe(subscription);
        match self.component.try_borrow_mut() {
            Ok(mut component) => component.on_unmount(),
            Err(_) => {
                tracing::warn!(component = %self.id, "on_unmount skipped: component busy");
            }
        }
        self.cycle.reset();
        tracing::debug!(component = %self.id, "component unmounted");
        true
    }
}

impl<C: Component> Drop for Mounted<C> {
    fn drop(&mut self) {
        self.unmount();
    }
}

impl<C: Component> fmt::Debug for Mounted<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mounted")
            .field("id", &self.id)
            .field("subscription", &self.subscription.get())
            .field("cycle", &self.cycle)
            .finish_non_exhaustive()
    }
}
