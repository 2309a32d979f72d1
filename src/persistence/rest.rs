use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::error::PersistenceError;
use crate::record::Record;
use crate::transport::{DataFormat, Method, Request, Transport};

use super::{Completion, Persistence, Verb};

/// Resolves the endpoint for one verb, given the record and the default paths.
pub type PathBuilder = Arc<dyn Fn(&Record, &RestPaths) -> String + Send + Sync>;

/// Default endpoints of a REST resource.
///
/// Create posts to the base path; update and destroy target `<base>/<id>`.
/// Custom path builders receive this so they can delegate, e.g. sending
/// updates to the create path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestPaths {
    base: String,
}

impl RestPaths {
    pub fn new(base: impl Into<String>) -> Self {
        RestPaths { base: base.into() }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn create_path(&self, _record: &Record) -> String {
        self.base.clone()
    }

    pub fn update_path(&self, record: &Record) -> String {
        self.member_path(record)
    }

    pub fn destroy_path(&self, record: &Record) -> String {
        self.member_path(record)
    }

    fn member_path(&self, record: &Record) -> String {
        let base = self.base.trim_end_matches('/');
        match record.id() {
            Some(Value::String(id)) => format!("{}/{}", base, id),
            Some(id) => format!("{}/{}", base, id),
            None => base.to_string(),
        }
    }
}

/// Persists records to a REST resource through a [`Transport`].
///
/// | verb    | method   | path            | body              |
/// |---------|----------|-----------------|-------------------|
/// | create  | `POST`   | `create_path`   | submission params |
/// | update  | `PUT`    | `update_path`   | submission params |
/// | destroy | `DELETE` | `destroy_path`  | none              |
///
/// A JSON object in a create/update response is merged into the record's
/// committed attributes before the completion runs; a `null` body merges
/// nothing.
pub struct RestPersistence {
    paths: RestPaths,
    transport: Arc<dyn Transport>,
    create_path: Option<PathBuilder>,
    update_path: Option<PathBuilder>,
    destroy_path: Option<PathBuilder>,
}

impl RestPersistence {
    pub fn new(base: impl Into<String>, transport: impl Transport + 'static) -> Self {
        Self::with_shared_transport(base, Arc::new(transport))
    }

    pub fn with_shared_transport(base: impl Into<String>, transport: Arc<dyn Transport>) -> Self {
        RestPersistence {
            paths: RestPaths::new(base),
            transport,
            create_path: None,
            update_path: None,
            destroy_path: None,
        }
    }

    pub fn create_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &RestPaths) -> String + Send + Sync + 'static,
    {
        self.create_path = Some(Arc::new(f));
        self
    }

    pub fn update_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &RestPaths) -> String + Send + Sync + 'static,
    {
        self.update_path = Some(Arc::new(f));
        self
    }

    pub fn destroy_path<F>(mut self, f: F) -> Self
    where
        F: Fn(&Record, &RestPaths) -> String + Send + Sync + 'static,
    {
        self.destroy_path = Some(Arc::new(f));
        self
    }

    pub fn paths(&self) -> &RestPaths {
        &self.paths
    }

    /// The endpoint `verb` resolves to for `record`.
    pub fn path_for(&self, verb: Verb, record: &Record) -> String {
        let custom = match verb {
            Verb::Create => &self.create_path,
            Verb::Update => &self.update_path,
            Verb::Destroy => &self.destroy_path,
        };
        if let Some(builder) = custom {
            return builder(record, &self.paths);
        }
        match verb {
            Verb::Create => self.paths.create_path(record),
            Verb::Update => self.paths.update_path(record),
            Verb::Destroy => self.paths.destroy_path(record),
        }
    }

    fn send(&self, verb: Verb, record: &Record, done: Completion) {
        let (method, body) = match verb {
            Verb::Create => (Method::Post, Some(record.to_submission_params())),
            Verb::Update => (Method::Put, Some(record.to_submission_params())),
            Verb::Destroy => (Method::Delete, None),
        };
        let request = Request {
            method,
            url: self.path_for(verb, record),
            body,
            format: DataFormat::Json,
        };
        tracing::debug!(
            record = record.type_name(),
            method = %request.method,
            url = %request.url,
            "sending persistence request"
        );

        let merge_target = (verb != Verb::Destroy).then(|| record.clone());
        self.transport.send(
            request,
            Box::new(move |response| {
                let outcome = response
                    .map_err(PersistenceError::from)
                    .and_then(|body| match merge_target {
                        Some(record) => merge_response(&record, body),
                        None => Ok(()),
                    });
                done(outcome);
            }),
        );
    }
}

fn merge_response(record: &Record, body: Value) -> Result<(), PersistenceError> {
    match body {
        Value::Null => Ok(()),
        Value::Object(attributes) => {
            record.merge_committed(attributes);
            Ok(())
        }
        other => Err(PersistenceError::UnexpectedResponse(other.to_string())),
    }
}

impl Persistence for RestPersistence {
    fn create(&self, record: &Record, done: Completion) {
        self.send(Verb::Create, record, done);
    }

    fn update(&self, record: &Record, done: Completion) {
        self.send(Verb::Update, record, done);
    }

    fn destroy(&self, record: &Record, done: Completion) {
        self.send(Verb::Destroy, record, done);
    }
}

impl fmt::Debug for RestPersistence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestPersistence")
            .field("base", &self.paths.base)
            .field("custom_create_path", &self.create_path.is_some())
            .field("custom_update_path", &self.update_path.is_some())
            .field("custom_destroy_path", &self.destroy_path.is_some())
            .finish()
    }
}
