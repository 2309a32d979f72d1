use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use serde_json::Value;

use crate::emitter::EventBus;
use crate::record::Record;

use super::Query;

/// A named helper attached to one collection instance.
pub type CollectionMethod = Arc<dyn Fn(&Collection) -> Value + Send + Sync>;

/// Payload handed to `bind` handlers: the collection that fired and the
/// records the event is about (the newly added ones for `add`, the removed one
/// for `remove`).
#[derive(Clone, Debug)]
pub struct CollectionEvent {
    pub collection: Collection,
    pub records: Vec<Record>,
}

struct Inner {
    members: RwLock<Vec<Record>>,
    events: EventBus<CollectionEvent>,
    methods: HashMap<String, CollectionMethod>,
}

/// Ordered records, unique by identity.
///
/// `Collection` is a handle; clones share the same members and subscriptions.
#[derive(Clone)]
pub struct Collection {
    inner: Arc<Inner>,
}

/// Non-owning reference to a [`Collection`], held by the records that register
/// with it.
#[derive(Clone, Debug)]
pub struct WeakCollection(Weak<Inner>);

impl WeakCollection {
    pub fn upgrade(&self) -> Option<Collection> {
        self.0.upgrade().map(|inner| Collection { inner })
    }
}

impl Collection {
    pub fn new() -> Self {
        CollectionBuilder::new().build()
    }

    pub fn builder() -> CollectionBuilder {
        CollectionBuilder::new()
    }

    fn members(&self) -> RwLockReadGuard<'_, Vec<Record>> {
        self.inner
            .members
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn members_mut(&self) -> RwLockWriteGuard<'_, Vec<Record>> {
        self.inner
            .members
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Append every record not already present, then publish one `add` event
    /// carrying the records actually added (none published if nothing was).
    ///
    /// A record is present when the same instance is a member, or when it has
    /// an identity and a member shares it; the existing member is kept.
    pub fn add<I>(&self, records: I) -> &Self
    where
        I: IntoIterator<Item = Record>,
    {
        let added = {
            let mut members = self.members_mut();
            let mut added = Vec::new();
            for record in records {
                if contains(&members, &record) {
                    tracing::trace!(record = record.type_name(), "skipping duplicate identity");
                    continue;
                }
                members.push(record.clone());
                added.push(record);
            }
            added
        };

        if !added.is_empty() {
            self.trigger("add", added);
        }
        self
    }

    /// Remove the member whose identity is `id` and publish `remove`.
    ///
    /// Returns `false`, publishing nothing, for a `null` or unknown id.
    pub fn remove(&self, id: impl Into<Value>) -> bool {
        let id = id.into();
        if id.is_null() {
            return false;
        }
        self.remove_where(|record| record.id().as_ref() == Some(&id))
    }

    /// Remove this exact instance, for records that have no identity yet.
    pub fn remove_record(&self, record: &Record) -> bool {
        self.remove_where(|member| member.ptr_eq(record))
    }

    fn remove_where<P>(&self, predicate: P) -> bool
    where
        P: Fn(&Record) -> bool,
    {
        let removed = {
            let mut members = self.members_mut();
            match members.iter().position(predicate) {
                Some(index) => members.remove(index),
                None => return false,
            }
        };

        self.trigger("remove", vec![removed]);
        true
    }

    /// Register `handler` for `topic`. Handlers run in registration order.
    pub fn bind<F>(&self, topic: impl Into<String>, handler: F) -> &Self
    where
        F: Fn(&CollectionEvent) + Send + Sync + 'static,
    {
        self.inner.events.subscribe(topic, handler);
        self
    }

    /// Fire `topic` with `records` as the event's records.
    pub fn trigger(&self, topic: &str, records: Vec<Record>) -> &Self {
        let event = CollectionEvent {
            collection: self.clone(),
            records,
        };
        self.inner.events.publish(topic, &event);
        self
    }

    pub fn events(&self) -> &EventBus<CollectionEvent> {
        &self.inner.events
    }

    /// Invoke the helper registered under `name`, if any.
    pub fn call(&self, name: &str) -> Option<Value> {
        let method = self.inner.methods.get(name)?;
        Some(method(self))
    }

    pub fn downgrade(&self) -> WeakCollection {
        WeakCollection(Arc::downgrade(&self.inner))
    }
}

fn contains(members: &[Record], candidate: &Record) -> bool {
    let id = candidate.id();
    members
        .iter()
        .any(|member| member.ptr_eq(candidate) || (id.is_some() && member.id() == id))
}

impl Query for Collection {
    fn records(&self) -> Vec<Record> {
        self.members().clone()
    }

    fn len(&self) -> usize {
        self.members().len()
    }
}

impl Default for Collection {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Collection {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut methods: Vec<&String> = self.inner.methods.keys().collect();
        methods.sort();
        f.debug_struct("Collection")
            .field("len", &self.members().len())
            .field("methods", &methods)
            .finish()
    }
}

/// Configures a [`Collection`].
#[derive(Default)]
pub struct CollectionBuilder {
    events: Option<EventBus<CollectionEvent>>,
    methods: HashMap<String, CollectionMethod>,
}

impl CollectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a domain-specific helper, callable with `Collection::call`.
    pub fn method<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Collection) -> Value + Send + Sync + 'static,
    {
        self.methods.insert(name.into(), Arc::new(f));
        self
    }

    /// Publish `add` / `remove` on `events` instead of a private bus.
    pub fn events(mut self, events: EventBus<CollectionEvent>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> Collection {
        Collection {
            inner: Arc::new(Inner {
                members: RwLock::new(Vec::new()),
                events: self.events.unwrap_or_default(),
                methods: self.methods,
            }),
        }
    }
}
