//! Client-side data modeling.
//!
//! Records with staged attribute changes and validation, identity-indexed
//! collections with chainable non-mutating queries, explicitly scoped event
//! buses, and a REST persistence adapter over a pluggable transport.
//!
//! ```
//! use model_rust::{Callbacks, ErrorSet, Model, Query, Record, RestPersistence, StubTransport};
//! use serde_json::json;
//!
//! let transport = StubTransport::new();
//! let post = Model::builder("post")
//!     .persistence(RestPersistence::new("/posts", transport.clone()))
//!     .validate(|record: &Record, errors: &mut ErrorSet| {
//!         if record.read("title").is_none() {
//!             errors.add("title", "can't be blank");
//!         }
//!     })
//!     .build();
//!
//! let record = post.build(None);
//! assert!(record.save(Callbacks::new()).is_err());
//!
//! record.write_field("title", "Foo");
//! record.save(Callbacks::new()).unwrap();
//! transport.respond_next(json!({ "id": 1 }));
//!
//! assert_eq!(post.find(1), Some(record));
//! ```

mod collection;
mod emitter;
mod error;
mod persistence;
mod record;
mod transport;
mod validation;

pub use collection::{
    Collection, CollectionBuilder, CollectionEvent, CollectionMethod, Query, View, WeakCollection,
};
pub use emitter::{EventBus, Listener};
pub use error::{ModelError, PersistenceError, TransportError};
pub use persistence::{Completion, PathBuilder, Persistence, RestPaths, RestPersistence, Verb};
pub use record::{
    Attributes, Callbacks, FailureCallback, IntoAttributes, Model, ModelBuilder, Record,
    SuccessCallback,
};
pub use transport::{DataFormat, Method, PendingRequest, Request, Responder, StubTransport, Transport};
pub use validation::{ErrorSet, Validate};

#[cfg(feature = "http")]
pub use transport::{HttpConfig, ReqwestTransport};
