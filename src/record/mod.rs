//! Records and record types.
//!
//! A [`Model`] is a record *type*: it carries the type name, the validation
//! hook, the optional persistence adapter and the lifecycle event bus, and it
//! owns a default [`Collection`](crate::Collection) that its records register
//! with. A [`Record`] is one instance: committed attributes plus staged changes.
//!
//! ## Example
//!
//! ```
//! use model_rust::{Callbacks, Model, Query};
//! use serde_json::json;
//!
//! let post = Model::builder("post").build();
//!
//! let record = post.build(json!({ "title": "Foo" }));
//! record.write_field("title", "Bar");
//! assert_eq!(record.read("title"), Some(json!("Bar")));
//! assert_eq!(record.attributes()["title"], json!("Foo"));
//!
//! record.save(Callbacks::new()).unwrap();
//! assert_eq!(record.attributes()["title"], json!("Bar"));
//! assert_eq!(post.all(), vec![record]);
//! ```

mod callbacks;
mod model;
#[allow(clippy::module_inception)]
mod record;

pub use callbacks::{Callbacks, FailureCallback, SuccessCallback};
pub use model::{Model, ModelBuilder};
pub use record::{Attributes, IntoAttributes, Record};

pub(crate) use model::Definition;
