use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::collection::{Collection, CollectionEvent, Query};
use crate::emitter::EventBus;
use crate::persistence::Persistence;
use crate::validation::{ErrorSet, Validate};

use super::{IntoAttributes, Record};

/// What every record of one type shares: attached once, never per instance.
pub(crate) struct Definition {
    pub(crate) name: String,
    pub(crate) persistence: Option<Arc<dyn Persistence>>,
    pub(crate) validator: Option<Arc<dyn Validate>>,
    pub(crate) events: EventBus<Record>,
}

impl Definition {
    pub(crate) fn topic(&self, verb: &str) -> String {
        format!("{}:{}", self.name, verb)
    }
}

/// A record type.
///
/// Owns the default collection its records register with and forwards the
/// collection operations to it, so `post.find(1)` reads like a class-level
/// lookup. Lifecycle events are published as `"<name>:<verb>"`.
#[derive(Clone)]
pub struct Model {
    definition: Arc<Definition>,
    collection: Collection,
}

impl Model {
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.definition.name
    }

    /// Construct a record from already-committed attributes and publish
    /// `"<name>:initialize"`. The record is not added to the collection until
    /// it is successfully created.
    pub fn build(&self, attributes: impl IntoAttributes) -> Record {
        let record = Record::new(
            Arc::clone(&self.definition),
            Some(self.collection.downgrade()),
            attributes.into_attributes(),
        );
        record.trigger("initialize");
        record
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn events(&self) -> &EventBus<Record> {
        &self.definition.events
    }

    pub fn topic(&self, verb: &str) -> String {
        self.definition.topic(verb)
    }

    /// Subscribe to this type's `verb` lifecycle topic.
    pub fn on<F>(&self, verb: &str, handler: F) -> &Self
    where
        F: Fn(&Record) + Send + Sync + 'static,
    {
        self.definition.events.subscribe(self.topic(verb), handler);
        self
    }

    pub fn add<I>(&self, records: I) -> &Self
    where
        I: IntoIterator<Item = Record>,
    {
        self.collection.add(records);
        self
    }

    pub fn remove(&self, id: impl Into<Value>) -> bool {
        self.collection.remove(id)
    }

    pub fn bind<F>(&self, topic: impl Into<String>, handler: F) -> &Self
    where
        F: Fn(&CollectionEvent) + Send + Sync + 'static,
    {
        self.collection.bind(topic, handler);
        self
    }
}

impl Query for Model {
    fn records(&self) -> Vec<Record> {
        self.collection.records()
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.definition.name)
            .field("persistent", &self.definition.persistence.is_some())
            .field("collection", &self.collection)
            .finish()
    }
}

/// Configures a [`Model`].
pub struct ModelBuilder {
    name: String,
    persistence: Option<Arc<dyn Persistence>>,
    validator: Option<Arc<dyn Validate>>,
    events: Option<EventBus<Record>>,
    collection: Option<Collection>,
}

impl ModelBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        ModelBuilder {
            name: name.into(),
            persistence: None,
            validator: None,
            events: None,
            collection: None,
        }
    }

    /// Back every record of this type with `persistence`.
    pub fn persistence(self, persistence: impl Persistence + 'static) -> Self {
        self.shared_persistence(Arc::new(persistence))
    }

    pub fn shared_persistence(mut self, persistence: Arc<dyn Persistence>) -> Self {
        self.persistence = Some(persistence);
        self
    }

    pub fn validate<F>(self, f: F) -> Self
    where
        F: Fn(&Record, &mut ErrorSet) + Send + Sync + 'static,
    {
        self.validator(f)
    }

    pub fn validator(mut self, validator: impl Validate + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Publish lifecycle events on `events` instead of a private bus.
    pub fn events(mut self, events: EventBus<Record>) -> Self {
        self.events = Some(events);
        self
    }

    /// Use `collection` as the default collection instead of a fresh one.
    pub fn collection(mut self, collection: Collection) -> Self {
        self.collection = Some(collection);
        self
    }

    pub fn build(self) -> Model {
        Model {
            definition: Arc::new(Definition {
                name: self.name,
                persistence: self.persistence,
                validator: self.validator,
                events: self.events.unwrap_or_default(),
            }),
            collection: self.collection.unwrap_or_default(),
        }
    }
}
