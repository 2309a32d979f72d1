//! Shared helpers for record tests.

use std::sync::{Arc, Mutex};

use model_rust::{CollectionEvent, Model, Record};

/// Collects `"<topic>"` strings in publish order.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Record every lifecycle topic of `model` and the `add` / `remove` events of
/// its collection into one log.
pub fn watch(model: &Model) -> EventLog {
    let log = EventLog::default();
    for verb in ["initialize", "create", "update", "destroy"] {
        let log = log.clone();
        let topic = model.topic(verb);
        model.on(verb, move |_: &Record| log.push(topic.clone()));
    }
    for topic in ["add", "remove"] {
        let log = log.clone();
        model.bind(topic, move |_: &CollectionEvent| log.push(topic));
    }
    log
}
