#![forbid(unsafe_code)]

//! Runtime error types.
//!
//! Every variant is fatal for the component it concerns: the scheduler
//! quarantines the offending dirty check and never retries it.

use thiserror::Error;

use crate::component::ComponentId;

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    /// A lazily tracked member name starts with the private-member sigil.
    #[error("private member `{name}` cannot be tracked")]
    PrivateMember { name: String },

    /// The dirty check panicked and was caught by the scheduler.
    #[error("dirty check for component {component} panicked: {message}")]
    Panicked {
        component: ComponentId,
        message: String,
    },
}

impl TrackError {
    #[must_use]
    pub fn private_member(name: impl Into<String>) -> Self {
        Self::PrivateMember { name: name.into() }
    }

    #[must_use]
    pub fn panicked(component: ComponentId, message: impl Into<String>) -> Self {
        Self::Panicked {
            component,
            message: message.into(),
        }
    }
}
