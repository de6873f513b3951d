#![forbid(unsafe_code)]

//! framewatch public facade crate.
//!
//! Decides when a live UI component needs repainting: tracked members are
//! polled once per frame, render outputs are compared slot by slot, and the
//! host is asked to redraw only when something observable changed.

pub use framewatch_core as core;
#[cfg(feature = "runtime")]
pub use framewatch_runtime as runtime;

pub mod prelude {
    pub use framewatch_core::{Callable, CallableIdentity, Comparator, Key, Template, Value};
    #[cfg(feature = "runtime")]
    pub use framewatch_runtime::{
        CheckOutcome, Component, ComponentId, Converted, FrameClock, FrameScheduler, Host,
        ManualClock, Mounted, SchedulerConfig, TickReport, TrackError, TrackingSpec, mount,
    };
}
