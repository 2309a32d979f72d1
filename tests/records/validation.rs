use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use model_rust::{Callbacks, ErrorSet, Model, ModelError, Query, Record};
use serde_json::json;

use crate::support::watch;

fn post_model() -> Model {
    Model::builder("post")
        .validate(|record: &Record, errors: &mut ErrorSet| {
            match record.read("title").and_then(|t| t.as_str().map(str::len)) {
                None => {
                    errors.add("title", "can't be blank");
                }
                Some(len) if len < 2 => {
                    errors.add("title", "must be more than 1 character");
                }
                Some(_) => {}
            }
        })
        .build()
}

#[test]
fn invalid_save_has_no_side_effects() {
    let post = post_model();
    let log = watch(&post);
    let record = post.build(json!({ "body": "..." }));
    record.write_field("title", "x");

    let calls = Arc::new(AtomicUsize::new(0));
    let (on_success, on_failure) = (Arc::clone(&calls), Arc::clone(&calls));
    let result = record.save(
        Callbacks::new()
            .on_success(move |_| {
                on_success.fetch_add(1, Ordering::SeqCst);
            })
            .on_failure(move |_, _| {
                on_failure.fetch_add(1, Ordering::SeqCst);
            }),
    );

    let errors = match result {
        Err(ModelError::Invalid(errors)) => errors,
        other => panic!("expected validation failure, got {other:?}"),
    };
    assert_eq!(errors.on("title"), vec!["must be more than 1 character"]);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
    assert_eq!(log.entries(), vec!["post:initialize"]);
    assert_eq!(record.attributes(), json!({ "body": "..." }).as_object().cloned().unwrap());
    assert!(record.is_changed("title"), "staged changes survive for a retry");
    assert!(post.is_empty());
}

#[test]
fn correcting_and_retrying_succeeds() {
    let post = post_model();
    let record = post.build(None);
    assert!(record.save(Callbacks::new()).is_err());
    assert_eq!(record.errors().len(), 1);

    record.write_field("title", "Foo");
    record.save(Callbacks::new()).unwrap();

    assert!(record.errors().is_empty());
    assert_eq!(post.all(), vec![record]);
}

#[test]
fn each_pass_rebuilds_errors_from_scratch() {
    let post = post_model();
    let record = post.build(None);

    assert!(!record.is_valid());
    assert!(!record.is_valid());
    assert_eq!(record.errors().len(), 1);

    record.write_field("title", "x");
    assert!(!record.is_valid());
    assert_eq!(record.errors().on("title"), vec!["must be more than 1 character"]);
    assert!(record.errors().on("body").is_empty());
}

#[test]
fn models_without_a_validator_are_always_valid() {
    let post = Model::builder("post").build();
    assert!(post.build(None).is_valid());
}

#[test]
fn destroy_skips_validation() {
    let post = post_model();
    let log = watch(&post);
    let record = post.build(json!({ "id": 1 }));

    record.destroy(Callbacks::new());

    assert_eq!(log.entries(), vec!["post:initialize", "post:destroy"]);
}
