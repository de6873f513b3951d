#![forbid(unsafe_code)]

//! A [`Host`] that records every request instead of painting.

use std::cell::RefCell;

use framewatch_runtime::{ComponentId, Host, TrackError};

#[derive(Debug, Default)]
pub struct RecordingHost {
    redraws: RefCell<Vec<ComponentId>>,
    errors: RefCell<Vec<(ComponentId, TrackError)>>,
}

impl RecordingHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every redraw request, in arrival order.
    #[must_use]
    pub fn redraws(&self) -> Vec<ComponentId> {
        self.redraws.borrow().clone()
    }

    #[must_use]
    pub fn redraw_count(&self) -> usize {
        self.redraws.borrow().len()
    }

    /// Redraw requests received for `component`.
    #[must_use]
    pub fn redraws_for(&self, component: ComponentId) -> usize {
        self.redraws
            .borrow()
            .iter()
            .filter(|id| **id == component)
            .count()
    }

    /// Drain the recorded redraw requests.
    pub fn take_redraws(&self) -> Vec<ComponentId> {
        std::mem::take(&mut *self.redraws.borrow_mut())
    }

    #[must_use]
    pub fn errors(&self) -> Vec<(ComponentId, TrackError)> {
        self.errors.borrow().clone()
    }

    pub fn clear(&self) {
        self.redraws.borrow_mut().clear();
        self.errors.borrow_mut().clear();
    }
}

impl Host for RecordingHost {
    fn request_redraw(&self, component: ComponentId) {
        self.redraws.borrow_mut().push(component);
    }

    fn report_error(&self, component: ComponentId, error: &TrackError) {
        tracing::error!(component = %component, error = %error, "component error");
        self.errors.borrow_mut().push((component, error.clone()));
    }
}
