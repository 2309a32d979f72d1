//! Identity-indexed, ordered record containers.
//!
//! A [`Collection`] keeps insertion order and rejects a second record with an
//! identity it already holds. Reading operations live on the [`Query`] trait,
//! which [`Collection`], [`View`] and [`Model`](crate::Model) share; `select`
//! and `sort` return a [`View`] snapshot and never touch the source.
//!
//! ```
//! use model_rust::{Collection, Model, Query};
//! use serde_json::json;
//!
//! let post = Model::builder("post").build();
//! let posts = Collection::new();
//! posts.add([
//!     post.build(json!({ "id": 1, "title": "bcd" })),
//!     post.build(json!({ "id": 2, "title": "Acd" })),
//! ]);
//!
//! let sorted = posts.sort(|record| {
//!     record.read("title").and_then(|t| t.as_str().map(str::to_lowercase))
//! });
//! assert_eq!(sorted.first().and_then(|r| r.id()), Some(json!(2)));
//! assert_eq!(posts.first().and_then(|r| r.id()), Some(json!(1)));
//! ```

#[allow(clippy::module_inception)]
mod collection;
mod query;
mod view;

pub use collection::{Collection, CollectionBuilder, CollectionEvent, CollectionMethod, WeakCollection};
pub use query::Query;
pub use view::View;
