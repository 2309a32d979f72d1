//! Persistence adapters: map record lifecycle verbs onto a remote resource.

mod rest;

pub use rest::{PathBuilder, RestPaths, RestPersistence};

use std::fmt;

use crate::error::PersistenceError;
use crate::record::Record;

/// Called exactly once when a persistence operation finishes.
///
/// On `Ok(())` the adapter has already merged whatever the server returned
/// into the record.
pub type Completion = Box<dyn FnOnce(Result<(), PersistenceError>) + Send>;

/// A record lifecycle verb.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verb {
    Create,
    Update,
    Destroy,
}

impl Verb {
    pub fn as_str(self) -> &'static str {
        match self {
            Verb::Create => "create",
            Verb::Update => "update",
            Verb::Destroy => "destroy",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translates lifecycle verbs into (usually asynchronous) remote operations.
///
/// Implementations must not block the caller and must call `done` exactly
/// once. An adapter is shared by every record of a type, so it should keep no
/// per-record state between calls.
pub trait Persistence: Send + Sync {
    fn create(&self, record: &Record, done: Completion);

    fn update(&self, record: &Record, done: Completion);

    fn destroy(&self, record: &Record, done: Completion);

    fn dispatch(&self, verb: Verb, record: &Record, done: Completion) {
        match verb {
            Verb::Create => self.create(record, done),
            Verb::Update => self.update(record, done),
            Verb::Destroy => self.destroy(record, done),
        }
    }
}
