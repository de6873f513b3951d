#![forbid(unsafe_code)]

//! Scheduler configuration.
//!
//! Defaults suit a 60 Hz display. Every field can be overridden from the
//! environment with [`SchedulerConfig::from_env`]:
//!
//! | Variable                        | Field                 |
//! |---------------------------------|-----------------------|
//! | `FRAMEWATCH_AUTO_START`         | `auto_start`          |
//! | `FRAMEWATCH_ISOLATE_PANICS`     | `isolate_panics`      |
//! | `FRAMEWATCH_QUARANTINE`         | `quarantine_failures` |
//! | `FRAMEWATCH_SLOW_CHECK_US`      | `slow_check_budget`   |
//! | `FRAMEWATCH_FRAME_INTERVAL_US`  | `frame_interval`      |
//! | `FRAMEWATCH_CALLABLE_IDENTITY`  | `callable_identity`   |
//!
//! Booleans accept `1`/`0`/`true`/`false`. A slow-check budget of `0`
//! disables the slow-callback warning. `FRAMEWATCH_CALLABLE_IDENTITY` accepts
//! `name` or `strict`.

use std::env;

use framewatch_core::CallableIdentity;
use web_time::Duration;

/// One refresh of a 60 Hz display.
pub const DEFAULT_FRAME_INTERVAL: Duration = Duration::from_micros(16_667);

/// Dirty checks slower than this are logged.
pub const DEFAULT_SLOW_CHECK_BUDGET: Duration = Duration::from_millis(4);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Arm the scheduler on the first subscription instead of waiting for
    /// an explicit `start()`.
    pub auto_start: bool,
    /// Catch panics raised by a dirty check so the rest of the sweep runs.
    pub isolate_panics: bool,
    /// Unsubscribe a dirty check after it fails.
    pub quarantine_failures: bool,
    /// Warn when a single dirty check takes longer than this.
    pub slow_check_budget: Option<Duration>,
    /// Pacing of [`IntervalClock::from_config`](crate::clock::IntervalClock::from_config).
    pub frame_interval: Duration,
    /// Callable matching policy handed to every mounted component's cycle.
    pub callable_identity: CallableIdentity,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            auto_start: true,
            isolate_panics: true,
            quarantine_failures: true,
            slow_check_budget: Some(DEFAULT_SLOW_CHECK_BUDGET),
            frame_interval: DEFAULT_FRAME_INTERVAL,
            callable_identity: CallableIdentity::Name,
        }
    }
}

impl SchedulerConfig {
    /// Defaults overridden by `FRAMEWATCH_*` environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides read through `lookup`. Unparseable values are ignored.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(val) = lookup("FRAMEWATCH_AUTO_START")
            && let Some(flag) = parse_flag(&val)
        {
            self.auto_start = flag;
        }
        if let Some(val) = lookup("FRAMEWATCH_ISOLATE_PANICS")
            && let Some(flag) = parse_flag(&val)
        {
            self.isolate_panics = flag;
        }
        if let Some(val) = lookup("FRAMEWATCH_QUARANTINE")
            && let Some(flag) = parse_flag(&val)
        {
            self.quarantine_failures = flag;
        }
        if let Some(val) = lookup("FRAMEWATCH_SLOW_CHECK_US")
            && let Ok(us) = val.trim().parse::<u64>()
        {
            self.slow_check_budget = (us > 0).then(|| Duration::from_micros(us));
        }
        if let Some(val) = lookup("FRAMEWATCH_FRAME_INTERVAL_US")
            && let Ok(us) = val.trim().parse::<u64>()
            && us > 0
        {
            self.frame_interval = Duration::from_micros(us);
        }
        if let Some(val) = lookup("FRAMEWATCH_CALLABLE_IDENTITY") {
            match val.trim().to_ascii_lowercase().as_str() {
                "name" => self.callable_identity = CallableIdentity::Name,
                "strict" => self.callable_identity = CallableIdentity::Strict,
                _ => {}
            }
        }
        self
    }

    #[must_use]
    pub fn with_auto_start(mut self, enabled: bool) -> Self {
        self.auto_start = enabled;
        self
    }

    #[must_use]
    pub fn with_isolate_panics(mut self, enabled: bool) -> Self {
        self.isolate_panics = enabled;
        self
    }

    #[must_use]
    pub fn with_quarantine_failures(mut self, enabled: bool) -> Self {
        self.quarantine_failures = enabled;
        self
    }

    #[must_use]
    pub fn with_slow_check_budget(mut self, budget: Option<Duration>) -> Self {
        self.slow_check_budget = budget;
        self
    }

    #[must_use]
    pub fn with_frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    #[must_use]
    pub fn with_callable_identity(mut self, identity: CallableIdentity) -> Self {
        self.callable_identity = identity;
        self
    }
}

fn parse_flag(val: &str) -> Option<bool> {
    let val = val.trim();
    if val == "1" || val.eq_ignore_ascii_case("true") {
        Some(true)
    } else if val == "0" || val.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
