//! Validation: the per-attribute error accumulator and the hook a record type
//! uses to fill it.

mod error_set;

pub use error_set::ErrorSet;

use crate::record::Record;

/// Validation hook attached to a record type.
///
/// Called with a fresh, empty `ErrorSet` on every validation pass; a record is
/// valid when the hook leaves the set empty.
///
/// Any `Fn(&Record, &mut ErrorSet)` closure is a validator:
///
/// ```
/// use model_rust::{ErrorSet, Model, Record};
///
/// let post = Model::builder("post")
///     .validate(|record: &Record, errors: &mut ErrorSet| {
///         if record.read("title").is_none() {
///             errors.add("title", "can't be blank");
///         }
///     })
///     .build();
///
/// assert!(!post.build(None).is_valid());
/// ```
pub trait Validate: Send + Sync {
    fn validate(&self, record: &Record, errors: &mut ErrorSet);
}

impl<F> Validate for F
where
    F: Fn(&Record, &mut ErrorSet) + Send + Sync,
{
    fn validate(&self, record: &Record, errors: &mut ErrorSet) {
        self(record, errors)
    }
}
