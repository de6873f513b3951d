//! Logging shim.
//!
//! With the `tracing` feature `trace!` is re-exported from `tracing`.
//! Without it, a same-named macro expands to nothing, so call sites compile
//! unchanged either way.

#[cfg(feature = "tracing")]
pub use tracing::trace;

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($arg:tt)*) => {{}};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use trace;
