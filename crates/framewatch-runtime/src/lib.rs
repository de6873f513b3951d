#![forbid(unsafe_code)]

//! Runtime: tracked members, per-component dirty checks, and the frame
//! scheduler that sweeps them.
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use framewatch_core::{Template, Value};
//! use framewatch_runtime::{
//!     Component, ComponentId, FrameScheduler, Host, SchedulerConfig, TrackingSpec, mount,
//! };
//!
//! struct Counter {
//!     count: i64,
//! }
//!
//! impl Component for Counter {
//!     fn tracking() -> TrackingSpec {
//!         TrackingSpec::new().field("count")
//!     }
//!
//!     fn member(&self, name: &str) -> Option<Value> {
//!         (name == "count").then(|| Value::from(self.count))
//!     }
//!
//!     fn render(&self) -> Template {
//!         Template::new(&["<b>", "</b>"], vec![self.count.into()])
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Redraws(RefCell<Vec<ComponentId>>);
//!
//! impl Host for Redraws {
//!     fn request_redraw(&self, component: ComponentId) {
//!         self.0.borrow_mut().push(component);
//!     }
//! }
//!
//! let (scheduler, _clock) = FrameScheduler::manual(SchedulerConfig::default());
//! let host = Rc::new(Redraws::default());
//! let counter = mount(&scheduler, host.clone(), Counter { count: 0 });
//!
//! scheduler.tick();
//! assert!(host.0.borrow().is_empty());
//!
//! counter.with_mut(|c| c.count = 1);
//! scheduler.tick();
//! assert_eq!(*host.0.borrow(), vec![counter.id()]);
//! ```

pub mod clock;
pub mod component;
pub mod config;
pub mod convert;
pub mod cycle;
pub mod error;
pub mod mount;
pub mod scheduler;
pub mod tracking;

pub use clock::{FrameClock, FrameDriver, IntervalClock, ManualClock};
pub use component::{Component, ComponentId, Host, Invalidator};
pub use config::SchedulerConfig;
pub use convert::Converted;
pub use cycle::{CheckOutcome, CycleStats, DirtyCheck, DirtyCheckCycle, FnCheck};
pub use error::{Result, TrackError};
pub use mount::{Mounted, mount};
pub use scheduler::{CallbackFailure, FrameScheduler, SchedulerState, SubscriptionId, TickReport};
pub use tracking::{
    MemberKind, MemberKinds, Observation, PollReport, TrackedMember, TrackedMemberRegistry,
    TrackingSpec,
};
