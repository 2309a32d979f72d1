use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value};

use crate::collection::{Collection, WeakCollection};
use crate::error::{ModelError, PersistenceError};
use crate::persistence::{Completion, Verb};
use crate::validation::ErrorSet;

use super::{Callbacks, Definition};

/// Field name → value mapping used for committed attributes, staged changes,
/// merges and submission params.
pub type Attributes = Map<String, Value>;

/// Conversion into an attribute mapping for `Model::build` and
/// `Record::write_many`.
///
/// A JSON value that is not an object converts to an empty mapping.
pub trait IntoAttributes {
    fn into_attributes(self) -> Attributes;
}

impl IntoAttributes for Attributes {
    fn into_attributes(self) -> Attributes {
        self
    }
}

impl IntoAttributes for Option<Attributes> {
    fn into_attributes(self) -> Attributes {
        self.unwrap_or_default()
    }
}

impl IntoAttributes for Value {
    fn into_attributes(self) -> Attributes {
        match self {
            Value::Object(map) => map,
            _ => Attributes::new(),
        }
    }
}

struct RecordState {
    attributes: Attributes,
    changes: Attributes,
    errors: ErrorSet,
}

/// A single domain entity: committed attributes plus staged changes.
///
/// `Record` is a handle; clones refer to the same instance and compare equal.
/// Reads see staged values first. Writes are staged until `save` commits them.
#[derive(Clone)]
pub struct Record {
    state: Arc<RwLock<RecordState>>,
    definition: Arc<Definition>,
    owner: Option<WeakCollection>,
}

impl Record {
    pub(crate) fn new(
        definition: Arc<Definition>,
        owner: Option<WeakCollection>,
        attributes: Attributes,
    ) -> Self {
        Record {
            state: Arc::new(RwLock::new(RecordState {
                attributes,
                changes: Attributes::new(),
                errors: ErrorSet::new(),
            })),
            definition,
            owner,
        }
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RecordState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RecordState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn type_name(&self) -> &str {
        &self.definition.name
    }

    /// Staged value if present, else the committed value.
    pub fn read(&self, name: &str) -> Option<Value> {
        let state = self.read_state();
        state
            .changes
            .get(name)
            .or_else(|| state.attributes.get(name))
            .cloned()
    }

    /// Stage `value` for `name`, or drop a stale staged entry when `value`
    /// equals the committed one.
    pub fn write_field(&self, name: impl Into<String>, value: impl Into<Value>) -> &Self {
        let mut state = self.write_state();
        stage(&mut state, name.into(), value.into());
        self
    }

    /// `write_field` for every entry of `fields`.
    pub fn write_many(&self, fields: impl IntoAttributes) -> &Self {
        let mut state = self.write_state();
        for (name, value) in fields.into_attributes() {
            stage(&mut state, name, value);
        }
        self
    }

    /// The committed `id`, or `None` when it is absent or `null`.
    pub fn id(&self) -> Option<Value> {
        match self.read_state().attributes.get("id") {
            None | Some(Value::Null) => None,
            Some(id) => Some(id.clone()),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id().is_none()
    }

    /// Snapshot of the committed attributes.
    pub fn attributes(&self) -> Attributes {
        self.read_state().attributes.clone()
    }

    /// Snapshot of the staged changes.
    pub fn changes(&self) -> Attributes {
        self.read_state().changes.clone()
    }

    pub fn has_changes(&self) -> bool {
        !self.read_state().changes.is_empty()
    }

    pub fn is_changed(&self, name: &str) -> bool {
        self.read_state().changes.contains_key(name)
    }

    /// Discard staged changes without applying them.
    pub fn clear_changes(&self) -> &Self {
        self.write_state().changes.clear();
        self
    }

    pub fn reset(&self) -> &Self {
        self.clear_changes()
    }

    /// Apply `attributes` straight into committed state, bypassing staging.
    ///
    /// Staged entries that end up equal to their committed value are dropped.
    /// Persistence adapters use this to merge a server response.
    pub fn merge_committed(&self, attributes: impl IntoAttributes) -> &Self {
        let mut state = self.write_state();
        let RecordState {
            attributes: committed,
            changes,
            ..
        } = &mut *state;
        for (name, value) in attributes.into_attributes() {
            if changes.get(&name) == Some(&value) {
                changes.remove(&name);
            }
            committed.insert(name, value);
        }
        self
    }

    /// Errors from the most recent validation pass.
    pub fn errors(&self) -> ErrorSet {
        self.read_state().errors.clone()
    }

    /// Re-run validation from scratch and report whether it produced no errors.
    pub fn is_valid(&self) -> bool {
        let mut errors = ErrorSet::new();
        if let Some(validator) = &self.definition.validator {
            validator.validate(self, &mut errors);
        }
        let valid = errors.is_empty();
        self.write_state().errors = errors;
        valid
    }

    /// Validate, commit staged changes, then create or update.
    ///
    /// Returns `Err(ModelError::Invalid)` without committing, dispatching or
    /// publishing anything when validation fails. Otherwise the outcome of the
    /// dispatch is delivered through `callbacks`.
    pub fn save(&self, callbacks: Callbacks) -> Result<(), ModelError> {
        if !self.is_valid() {
            let errors = self.errors();
            tracing::debug!(
                record = self.type_name(),
                errors = errors.len(),
                "save rejected by validation"
            );
            return Err(ModelError::Invalid(errors));
        }

        let changes = std::mem::take(&mut self.write_state().changes);
        self.merge_committed(changes);

        let verb = if self.is_new() {
            Verb::Create
        } else {
            Verb::Update
        };
        self.dispatch(verb, callbacks);
        Ok(())
    }

    /// Destroy the record, remotely when a persistence adapter is attached,
    /// and detach it from its owning collection on success. No validation.
    pub fn destroy(&self, callbacks: Callbacks) -> &Self {
        self.dispatch(Verb::Destroy, callbacks);
        self
    }

    fn dispatch(&self, verb: Verb, callbacks: Callbacks) {
        tracing::debug!(
            record = self.type_name(),
            verb = verb.as_str(),
            remote = self.definition.persistence.is_some(),
            "dispatching lifecycle verb"
        );

        let Some(persistence) = self.definition.persistence.clone() else {
            self.bookkeep(verb);
            self.trigger(verb.as_str());
            callbacks.succeed(self);
            return;
        };

        let record = self.clone();
        let done: Completion = Box::new(move |outcome: Result<(), PersistenceError>| {
            match outcome {
                Ok(()) => {
                    record.bookkeep(verb);
                    callbacks.succeed(&record);
                    record.trigger(verb.as_str());
                }
                Err(error) => {
                    tracing::warn!(
                        record = record.type_name(),
                        verb = verb.as_str(),
                        %error,
                        "persistence failed"
                    );
                    callbacks.fail(&record, &error);
                }
            }
        });
        persistence.dispatch(verb, self, done);
    }

    /// Keep the owning collection in step with a successful verb.
    fn bookkeep(&self, verb: Verb) {
        let Some(collection) = self.owner() else {
            return;
        };
        match verb {
            Verb::Create => {
                collection.add([self.clone()]);
            }
            Verb::Destroy => match self.id() {
                Some(id) => {
                    collection.remove(id);
                }
                None => {
                    collection.remove_record(self);
                }
            },
            Verb::Update => {}
        }
    }

    /// Committed attributes keyed `"<type>[<attribute>]"`, skipping `id` and
    /// null values.
    pub fn to_submission_params(&self) -> Attributes {
        let state = self.read_state();
        state
            .attributes
            .iter()
            .filter(|(name, value)| name.as_str() != "id" && !value.is_null())
            .map(|(name, value)| {
                (
                    format!("{}[{}]", self.definition.name, name),
                    value.clone(),
                )
            })
            .collect()
    }

    /// Publish `"<type>:<verb>"` on the record type's event bus.
    pub fn trigger(&self, verb: &str) -> &Self {
        let topic = self.definition.topic(verb);
        self.definition.events.publish(&topic, self);
        self
    }

    /// The collection this record registers with, if it is still alive.
    pub fn owner(&self) -> Option<Collection> {
        self.owner.as_ref().and_then(WeakCollection::upgrade)
    }

    /// Whether `self` and `other` are handles to the same instance.
    pub fn ptr_eq(&self, other: &Record) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

fn stage(state: &mut RecordState, name: String, value: Value) {
    if state.attributes.get(&name) == Some(&value) {
        tracing::trace!(field = %name, "write matches committed value, clearing staged change");
        state.changes.remove(&name);
    } else {
        state.changes.insert(name, value);
    }
}

impl PartialEq for Record {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for Record {}

impl fmt::Debug for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        f.debug_struct("Record")
            .field("type", &self.definition.name)
            .field("attributes", &state.attributes)
            .field("changes", &state.changes)
            .finish()
    }
}
