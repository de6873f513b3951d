#![forbid(unsafe_code)]

//! Frame-synchronized sweep over every subscribed dirty check.
//!
//! A [`FrameScheduler`] is an explicit context object: create one, hand a
//! clone to everything that mounts components, and tick it from whatever
//! owns the refresh signal. Clones share one registry.
//!
//! # State machine
//!
//! ```text
//!          start() / first subscribe (auto_start)
//!   Idle ───────────────────────────────────────▶ Armed ──┐ tick() re-arms
//!                                                  ▲  │   │
//!                                        start()   │  ▼ ◀─┘
//!                                               Stopped ◀── stop()
//! ```
//!
//! Ticks delivered while `Idle` or `Stopped` do nothing and report
//! `swept == false`.
//!
//! # Sweep rules
//!
//! - Checks run synchronously, one after another, in subscription order.
//! - The next frame is requested before the sweep starts.
//! - A sweep iterates a snapshot of the registry. A check unsubscribed
//!   during the sweep is skipped for the rest of that sweep; a check
//!   subscribed during the sweep first runs on the next tick.
//! - `tick()` called from inside a sweep is refused and logged.
//! - With `isolate_panics`, a panicking check is caught and recorded like an
//!   error. With `quarantine_failures`, a failed check is unsubscribed and
//!   never retried.
//! - A check that reports [`CheckOutcome::Detached`] is unsubscribed.
//!
//! No timeout exists: a check that never returns stalls every component.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use web_time::{Duration, Instant};

use crate::clock::{FrameClock, IntervalClock, ManualClock};
use crate::component::ComponentId;
use crate::config::SchedulerConfig;
use crate::cycle::{CheckOutcome, DirtyCheck};
use crate::error::{Result, TrackError};

/// Lifecycle state of a [`FrameScheduler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    /// Created, no frame requested yet.
    Idle,
    /// A frame is requested; ticks sweep.
    Armed,
    /// Explicitly stopped; ticks are ignored until `start()`.
    Stopped,
}

/// Handle to one subscription. Unique within its scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A dirty check that failed during a sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackFailure {
    pub subscription: SubscriptionId,
    pub component: ComponentId,
    pub error: TrackError,
    /// Whether the subscription was removed because of this failure.
    pub quarantined: bool,
}

/// What one call to [`FrameScheduler::tick`] did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Sweep number, starting at 1. For an unswept tick, the number of the
    /// last sweep.
    pub tick: u64,
    /// Whether a sweep actually ran.
    pub swept: bool,
    /// Checks invoked.
    pub invoked: usize,
    /// Checks that requested a redraw.
    pub redraws: usize,
    /// Checks whose component was busy.
    pub busy: usize,
    /// Checks skipped because they were unsubscribed mid-sweep.
    pub skipped: usize,
    /// Checks pruned because their component is gone.
    pub detached: usize,
    pub failures: Vec<CallbackFailure>,
    pub elapsed: Duration,
}

impl TickReport {
    fn unswept(tick: u64) -> Self {
        Self {
            tick,
            ..Self::default()
        }
    }

    /// Swept without any failure.
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.swept && self.failures.is_empty()
    }
}

struct Entry {
    id: SubscriptionId,
    check: Rc<dyn DirtyCheck>,
    live: Cell<bool>,
}

struct Inner {
    config: SchedulerConfig,
    clock: Rc<dyn FrameClock>,
    state: Cell<SchedulerState>,
    entries: RefCell<Vec<Rc<Entry>>>,
    next_id: Cell<u64>,
    ticks: Cell<u64>,
    sweeping: Cell<bool>,
}

/// Registry of dirty checks swept once per frame.
#[derive(Clone)]
pub struct FrameScheduler {
    inner: Rc<Inner>,
}

impl FrameScheduler {
    /// Scheduler with the default configuration.
    #[must_use]
    pub fn new(clock: Rc<dyn FrameClock>) -> Self {
        Self::with_config(SchedulerConfig::default(), clock)
    }

    #[must_use]
    pub fn with_config(config: SchedulerConfig, clock: Rc<dyn FrameClock>) -> Self {
        Self {
            inner: Rc::new(Inner {
                config,
                clock,
                state: Cell::new(SchedulerState::Idle),
                entries: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
                ticks: Cell::new(0),
                sweeping: Cell::new(false),
            }),
        }
    }

    /// Scheduler driven by a fresh [`ManualClock`], returned alongside.
    #[must_use]
    pub fn manual(config: SchedulerConfig) -> (Self, Rc<ManualClock>) {
        let clock = Rc::new(ManualClock::new());
        (Self::with_config(config, clock.clone()), clock)
    }

    /// Scheduler paced by an [`IntervalClock`] at `config.frame_interval`.
    #[must_use]
    pub fn interval(config: SchedulerConfig) -> (Self, Rc<IntervalClock>) {
        let clock = Rc::new(IntervalClock::from_config(&config));
        (Self::with_config(config, clock.clone()), clock)
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        self.inner.state.get()
    }

    /// Arm the scheduler and request the first frame. No-op while armed.
    pub fn start(&self) {
        if self.inner.state.get() == SchedulerState::Armed {
            return;
        }
        self.inner.state.set(SchedulerState::Armed);
        self.inner.clock.request_frame();
        tracing::debug!(callbacks = self.len(), "frame scheduler armed");
    }

    /// Stop sweeping and drop the pending frame. Subscriptions are kept.
    pub fn stop(&self) {
        if self.inner.state.replace(SchedulerState::Stopped) != SchedulerState::Stopped {
            self.inner.clock.cancel_frame();
            tracing::debug!(ticks = self.tick_count(), "frame scheduler stopped");
        }
    }

    /// Add `check` to the sweep.
    ///
    /// Subscribing the same `Rc` twice returns the existing subscription.
    pub fn subscribe(&self, check: Rc<dyn DirtyCheck>) -> SubscriptionId {
        if let Some(id) = self.find(&check) {
            return id;
        }
        let id = SubscriptionId(self.inner.next_id.get());
        self.inner.next_id.set(id.0 + 1);
        let component = check.component();
        self.inner.entries.borrow_mut().push(Rc::new(Entry {
            id,
            check,
            live: Cell::new(true),
        }));
        tracing::trace!(subscription = %id, component = %component, "dirty check subscribed");

        if self.inner.config.auto_start && self.inner.state.get() == SchedulerState::Idle {
            self.start();
        }
        id
    }

    /// Remove a subscription. Returns `false` if it was not present.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut entries = self.inner.entries.borrow_mut();
        let Some(position) = entries.iter().position(|e| e.id == id) else {
            return false;
        };
        let entry = entries.remove(position);
        entry.live.set(false);
        tracing::trace!(subscription = %id, "dirty check unsubscribed");
        true
    }

    /// Remove the subscription holding `check`, if any.
    pub fn unsubscribe_callback(&self, check: &Rc<dyn DirtyCheck>) -> bool {
        self.find(check).is_some_and(|id| self.unsubscribe(id))
    }

    #[must_use]
    pub fn contains(&self, id: SubscriptionId) -> bool {
        self.inner.entries.borrow().iter().any(|e| e.id == id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.entries.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of sweeps run so far.
    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.inner.ticks.get()
    }

    /// Whether a sweep is in progress.
    #[must_use]
    pub fn is_sweeping(&self) -> bool {
        self.inner.sweeping.get()
    }

    /// Handle one refresh signal: re-arm, then sweep every subscription.
    pub fn tick(&self) -> TickReport {
        let inner = &*self.inner;
        if inner.sweeping.get() {
            tracing::warn!(tick = inner.ticks.get(), "re-entrant tick refused");
            return TickReport::unswept(inner.ticks.get());
        }
        if inner.state.get() != SchedulerState::Armed {
            return TickReport::unswept(inner.ticks.get());
        }

        inner.clock.request_frame();
        let tick = inner.ticks.get() + 1;
        inner.ticks.set(tick);

        let snapshot: Vec<Rc<Entry>> = inner.entries.borrow().clone();
        let span = tracing::debug_span!("framewatch.tick", tick, callbacks = snapshot.len());
        let _enter = span.enter();
        let _sweep = SweepGuard::enter(&inner.sweeping);

        let started = Instant::now();
        let mut report = TickReport {
            tick,
            swept: true,
            ..TickReport::default()
        };

        for entry in &snapshot {
            if !entry.live.get() {
                report.skipped += 1;
                continue;
            }
            report.invoked += 1;
            let check_started = Instant::now();
            let result = self.invoke(entry);
            self.check_budget(entry, check_started.elapsed());

            match result {
                Ok(CheckOutcome::Clean) => {}
                Ok(CheckOutcome::Redraw) => report.redraws += 1,
                Ok(CheckOutcome::Busy) => report.busy += 1,
                Ok(CheckOutcome::Detached) => {
                    report.detached += 1;
                    self.unsubscribe(entry.id);
                }
                Err(error) => report.failures.push(self.fail(entry, error)),
            }
        }

        report.elapsed = started.elapsed();
        tracing::debug!(
            tick,
            invoked = report.invoked,
            redraws = report.redraws,
            failures = report.failures.len(),
            elapsed_us = report.elapsed.as_micros() as u64,
            "sweep complete"
        );
        report
    }

    fn invoke(&self, entry: &Entry) -> Result<CheckOutcome> {
        if !self.inner.config.isolate_panics {
            return entry.check.dirty_check();
        }
        panic::catch_unwind(AssertUnwindSafe(|| entry.check.dirty_check())).unwrap_or_else(
            |payload| {
                Err(TrackError::panicked(
                    entry.check.component(),
                    panic_message(payload.as_ref()),
                ))
            },
        )
    }

    fn fail(&self, entry: &Entry, error: TrackError) -> CallbackFailure {
        let component = entry.check.component();
        let quarantined = self.inner.config.quarantine_failures && self.unsubscribe(entry.id);
        tracing::error!(
            subscription = %entry.id,
            component = %component,
            error = %error,
            quarantined,
            "dirty check failed"
        );
        CallbackFailure {
            subscription: entry.id,
            component,
            error,
            quarantined,
        }
    }

    fn check_budget(&self, entry: &Entry, elapsed: Duration) {
        if let Some(budget) = self.inner.config.slow_check_budget
            && elapsed > budget
        {
            tracing::warn!(
                component = %entry.check.component(),
                elapsed_us = elapsed.as_micros() as u64,
                budget_us = budget.as_micros() as u64,
                "slow dirty check"
            );
        }
    }

    fn find(&self, check: &Rc<dyn DirtyCheck>) -> Option<SubscriptionId> {
        self.inner
            .entries
            .borrow()
            .iter()
            .find(|e| Rc::ptr_eq(&e.check, check))
            .map(|e| e.id)
    }
}

impl fmt::Debug for FrameScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("state", &self.state())
            .field("callbacks", &self.len())
            .field("ticks", &self.tick_count())
            .finish_non_exhaustive()
    }
}

/// Clears the sweeping flag even if a check panics through the sweep.
struct SweepGuard<'a>(&'a Cell<bool>);

impl<'a> SweepGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for SweepGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cycle::FnCheck;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing_subscriber::Layer;
    use tracing_subscriber::layer::{Context, SubscriberExt};

    fn scheduler() -> (FrameScheduler, Rc<ManualClock>) {
        FrameScheduler::manual(SchedulerConfig::default().with_slow_check_budget(None))
    }

    /// A check that appends its label to a shared log.
    fn logging_check(
        log: &Rc<RefCell<Vec<&'static str>>>,
        label: &'static str,
    ) -> Rc<dyn DirtyCheck> {
        let log = Rc::clone(log);
        Rc::new(FnCheck::new(move || {
            log.borrow_mut().push(label);
            Ok(CheckOutcome::Clean)
        }))
    }

    #[test]
    fn starts_idle_and_auto_arms_on_subscribe() {
        let (sched, clock) = scheduler();
        assert_eq!(sched.state(), SchedulerState::Idle);
        assert!(!sched.tick().swept);

        sched.subscribe(Rc::new(FnCheck::new(|| Ok(CheckOutcome::Clean))));
        assert_eq!(sched.state(), SchedulerState::Armed);
        assert!(clock.is_pending());
    }

    #[test]
    fn without_auto_start_requires_start() {
        let (sched, clock) =
            FrameScheduler::manual(SchedulerConfig::default().with_auto_start(false));
        sched.subscribe(Rc::new(FnCheck::new(|| Ok(CheckOutcome::Clean))));
        assert_eq!(sched.state(), SchedulerState::Idle);
        assert!(!clock.is_pending());
        sched.start();
        assert_eq!(sched.state(), SchedulerState::Armed);
        assert_eq!(sched.tick().invoked, 1);
    }

    #[test]
    fn tick_rearms_before_sweeping() {
        let (sched, clock) = scheduler();
        let observed = Rc::new(Cell::new(false));
        let seen = Rc::clone(&observed);
        let probe = Rc::clone(&clock);
        sched.subscribe(Rc::new(FnCheck::new(move || {
            seen.set(probe.is_pending());
            Ok(CheckOutcome::Clean)
        })));
        assert!(clock.take_frame());
        sched.tick();
        assert!(observed.get());
    }

    #[test]
    fn sweeps_in_subscription_order() {
        let (sched, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        for label in ["a", "b", "c"] {
            sched.subscribe(logging_check(&log, label));
        }
        let report = sched.tick();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert_eq!(report.tick, 1);
        assert_eq!(report.invoked, 3);
        assert!(report.is_ok());
    }

    #[test]
    fn subscribe_is_idempotent() {
        let (sched, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        let check = logging_check(&log, "x");
        let first = sched.subscribe(Rc::clone(&check));
        let second = sched.subscribe(Rc::clone(&check));
        assert_eq!(first, second);
        assert_eq!(sched.len(), 1);
        sched.tick();
        assert_eq!(log.borrow().len(), 1);
    }

    #[test]
    fn unsubscribed_check_is_never_invoked_again() {
        let (sched, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        let check = logging_check(&log, "x");
        sched.subscribe(Rc::clone(&check));
        sched.tick();
        assert!(sched.unsubscribe_callback(&check));
        assert!(!sched.unsubscribe_callback(&check));
        for _ in 0..3 {
            sched.tick();
        }
        assert_eq!(log.borrow().len(), 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn mid_sweep_unsubscribe_skips_remaining_entry() {
        let (sched, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        let victim: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

        let target = Rc::clone(&victim);
        let handle = sched.clone();
        sched.subscribe(Rc::new(FnCheck::new(move || {
            if let Some(id) = target.get() {
                handle.unsubscribe(id);
            }
            Ok(CheckOutcome::Clean)
        })));
        victim.set(Some(sched.subscribe(logging_check(&log, "victim"))));

        let report = sched.tick();
        assert!(log.borrow().is_empty());
        assert_eq!(report.invoked, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn mid_sweep_subscribe_runs_next_tick() {
        let (sched, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        let late = logging_check(&log, "late");
        let handle = sched.clone();
        sched.subscribe(Rc::new(FnCheck::new(move || {
            handle.subscribe(Rc::clone(&late));
            Ok(CheckOutcome::Clean)
        })));

        assert_eq!(sched.tick().invoked, 1);
        assert!(log.borrow().is_empty());
        assert_eq!(sched.tick().invoked, 2);
        assert_eq!(*log.borrow(), vec!["late"]);
    }

    #[test]
    fn reentrant_tick_is_refused() {
        let (sched, _clock) = scheduler();
        let nested = Rc::new(Cell::new(None));
        let out = Rc::clone(&nested);
        let handle = sched.clone();
        sched.subscribe(Rc::new(FnCheck::new(move || {
            out.set(Some(handle.tick().swept));
            Ok(CheckOutcome::Clean)
        })));
        assert!(sched.tick().swept);
        assert_eq!(nested.get(), Some(false));
        assert_eq!(sched.tick_count(), 1);
        assert!(!sched.is_sweeping());
    }

    #[test]
    fn failing_check_is_isolated_and_quarantined() {
        let (sched, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        let bad = FnCheck::new(|| Err(TrackError::private_member("#x")));
        let bad_component = bad.component();
        let bad_id = sched.subscribe(Rc::new(bad));
        sched.subscribe(logging_check(&log, "after"));

        let report = sched.tick();
        assert_eq!(*log.borrow(), vec!["after"]);
        assert_eq!(
            report.failures,
            vec![CallbackFailure {
                subscription: bad_id,
                component: bad_component,
                error: TrackError::private_member("#x"),
                quarantined: true,
            }]
        );
        assert!(!sched.contains(bad_id));
        assert!(sched.tick().is_ok());
    }

    #[test]
    fn failures_repeat_without_quarantine() {
        let (sched, _clock) =
            FrameScheduler::manual(SchedulerConfig::default().with_quarantine_failures(false));
        sched.subscribe(Rc::new(FnCheck::new(|| Err(TrackError::private_member("#x")))));
        assert_eq!(sched.tick().failures.len(), 1);
        assert_eq!(sched.tick().failures.len(), 1);
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn panicking_check_is_caught() {
        let (sched, _clock) = scheduler();
        let log = Rc::new(RefCell::new(Vec::new()));
        let boom = FnCheck::new(|| panic!("render exploded"));
        let component = boom.component();
        sched.subscribe(Rc::new(boom));
        sched.subscribe(logging_check(&log, "survivor"));

        let report = sched.tick();
        assert_eq!(*log.borrow(), vec!["survivor"]);
        assert_eq!(
            report.failures[0].error,
            TrackError::panicked(component, "render exploded")
        );
        assert_eq!(sched.len(), 1);
    }

    #[test]
    fn unisolated_panic_propagates_and_releases_the_sweep() {
        let (sched, _clock) = FrameScheduler::manual(
            SchedulerConfig::default()
                .with_isolate_panics(false)
                .with_slow_check_budget(None),
        );
        let armed = Rc::new(Cell::new(true));
        let trigger = Rc::clone(&armed);
        sched.subscribe(Rc::new(FnCheck::new(move || {
            if trigger.replace(false) {
                panic!("render exploded");
            }
            Ok(CheckOutcome::Clean)
        })));

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| sched.tick()));
        let payload = outcome.expect_err("the panic reaches the caller");
        assert_eq!(panic_message(payload.as_ref()), "render exploded");
        assert!(!sched.is_sweeping());
        assert_eq!(sched.len(), 1, "nothing is quarantined");

        let report = sched.tick();
        assert!(report.is_ok());
        assert_eq!(report.invoked, 1);
    }

    #[test]
    fn detached_checks_are_pruned() {
        let (sched, _clock) = scheduler();
        sched.subscribe(Rc::new(FnCheck::new(|| Ok(CheckOutcome::Detached))));
        let report = sched.tick();
        assert_eq!(report.detached, 1);
        assert!(sched.is_empty());
    }

    #[test]
    fn redraws_and_busy_are_counted() {
        let (sched, _clock) = scheduler();
        sched.subscribe(Rc::new(FnCheck::new(|| Ok(CheckOutcome::Redraw))));
        sched.subscribe(Rc::new(FnCheck::new(|| Ok(CheckOutcome::Busy))));
        let report = sched.tick();
        assert_eq!((report.redraws, report.busy), (1, 1));
    }

    #[test]
    fn stop_ignores_ticks_until_restarted() {
        let (sched, clock) = scheduler();
        sched.subscribe(Rc::new(FnCheck::new(|| Ok(CheckOutcome::Clean))));
        sched.stop();
        assert_eq!(sched.state(), SchedulerState::Stopped);
        assert!(!clock.is_pending());
        assert!(!sched.tick().swept);

        sched.start();
        assert!(sched.tick().swept);
        assert_eq!(sched.tick_count(), 1);
    }

    #[test]
    fn panic_message_variants() {
        assert_eq!(panic_message(&"static"), "static");
        assert_eq!(panic_message(&String::from("owned")), "owned");
        assert_eq!(panic_message(&42u8), "non-string panic payload");
    }

    // ── Tracing capture ─────────────────────────────────────────────────

    #[derive(Default)]
    struct Captured {
        spans: Vec<String>,
        events: Vec<(tracing::Level, String)>,
    }

    struct Capture {
        state: Arc<Mutex<Captured>>,
    }

    impl<S> Layer<S> for Capture
    where
        S: Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
    {
        fn on_new_span(
            &self,
            attrs: &tracing::span::Attributes<'_>,
            _id: &tracing::Id,
            _ctx: Context<'_, S>,
        ) {
            self.state
                .lock()
                .expect("capture lock")
                .spans
                .push(attrs.metadata().name().to_string());
        }

        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            struct Msg(String);
            impl tracing::field::Visit for Msg {
                fn record_debug(
                    &mut self,
                    field: &tracing::field::Field,
                    value: &dyn std::fmt::Debug,
                ) {
                    if field.name() == "message" {
                        self.0 = format!("{value:?}");
                    }
                }
            }
            let mut msg = Msg(String::new());
            event.record(&mut msg);
            self.state
                .lock()
                .expect("capture lock")
                .events
                .push((*event.metadata().level(), msg.0));
        }
    }

    #[test]
    fn sweep_emits_span_and_failure_events() {
        let state = Arc::new(Mutex::new(Captured::default()));
        let subscriber = tracing_subscriber::registry().with(Capture {
            state: Arc::clone(&state),
        });
        let _guard = tracing::subscriber::set_default(subscriber);

        let (sched, _clock) = FrameScheduler::manual(
            SchedulerConfig::default().with_slow_check_budget(Some(Duration::ZERO)),
        );
        sched.subscribe(Rc::new(FnCheck::new(|| {
            std::thread::sleep(std::time::Duration::from_millis(1));
            Err(TrackError::private_member("#x"))
        })));
        sched.tick();

        let captured = state.lock().expect("capture lock");
        assert!(captured.spans.iter().any(|s| s == "framewatch.tick"));
        assert!(
            captured
                .events
                .iter()
                .any(|(level, msg)| *level == tracing::Level::ERROR && msg == "dirty check failed")
        );
        assert!(
            captured
                .events
                .iter()
                .any(|(level, msg)| *level == tracing::Level::WARN && msg == "slow dirty check")
        );
    }
}
