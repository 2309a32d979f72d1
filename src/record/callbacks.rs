use crate::error::PersistenceError;

use super::Record;

pub type SuccessCallback = Box<dyn FnOnce(&Record) + Send>;
pub type FailureCallback = Box<dyn FnOnce(&Record, &PersistenceError) + Send>;

/// Outcome handlers for `Record::save` and `Record::destroy`.
///
/// With a persistence adapter attached the handlers run when the network call
/// completes; without one, `on_success` runs before `save`/`destroy` returns.
/// A record that fails validation invokes neither.
#[derive(Default)]
pub struct Callbacks {
    pub(crate) on_success: Option<SuccessCallback>,
    pub(crate) on_failure: Option<FailureCallback>,
}

impl Callbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Record) + Send + 'static,
    {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_failure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&Record, &PersistenceError) + Send + 'static,
    {
        self.on_failure = Some(Box::new(f));
        self
    }

    pub(crate) fn succeed(self, record: &Record) {
        if let Some(on_success) = self.on_success {
            on_success(record);
        }
    }

    pub(crate) fn fail(self, record: &Record, error: &PersistenceError) {
        if let Some(on_failure) = self.on_failure {
            on_failure(record, error);
        }
    }
}
