use model_rust::{Callbacks, Model, Query};
use serde_json::json;

use crate::support::watch;

#[test]
fn in_memory_create_registers_then_publishes_then_succeeds() {
    let post = Model::builder("post").build();
    let log = watch(&post);
    let record = post.build(json!({ "title": "Foo" }));

    let success_log = log.clone();
    record
        .save(Callbacks::new().on_success(move |_| success_log.push("success")))
        .unwrap();

    assert_eq!(
        log.entries(),
        vec!["post:initialize", "add", "post:create", "success"]
    );
    assert_eq!(post.all(), vec![record.clone()]);
    assert!(record.is_new(), "nothing assigned an id");
}

#[test]
fn save_commits_staged_changes() {
    let post = Model::builder("post").build();
    let record = post.build(json!({ "id": 1, "title": "Foo" }));
    record.write_field("title", "Bar");

    record.save(Callbacks::new()).unwrap();

    assert_eq!(record.attributes()["title"], json!("Bar"));
    assert!(!record.has_changes());
}

#[test]
fn saving_a_persisted_record_updates() {
    let post = Model::builder("post").build();
    let log = watch(&post);
    let record = post.build(json!({ "id": 1, "title": "Foo" }));

    record.save(Callbacks::new()).unwrap();
    record.save(Callbacks::new()).unwrap();

    assert_eq!(
        log.entries(),
        vec!["post:initialize", "post:update", "post:update"]
    );
    assert!(post.is_empty(), "update does no collection bookkeeping");
}

#[test]
fn staged_id_is_committed_before_choosing_the_verb() {
    let post = Model::builder("post").build();
    let log = watch(&post);
    let record = post.build(None);
    record.write_field("id", 9);

    record.save(Callbacks::new()).unwrap();

    assert_eq!(log.entries(), vec!["post:initialize", "post:update"]);
    assert!(!record.is_new());
}

#[test]
fn create_then_destroy_round_trip() {
    let post = Model::builder("post").build();
    let log = watch(&post);
    let first = post.build(None);
    let second = post.build(None);

    first.save(Callbacks::new()).unwrap();
    second.save(Callbacks::new()).unwrap();
    assert_eq!(post.all(), vec![first.clone(), second.clone()]);

    let destroyed = std::sync::Arc::new(std::sync::Mutex::new(false));
    let flag = std::sync::Arc::clone(&destroyed);
    first.destroy(Callbacks::new().on_success(move |_| *flag.lock().unwrap() = true));

    assert!(*destroyed.lock().unwrap());
    assert_eq!(post.all(), vec![second]);
    assert_eq!(
        log.entries(),
        vec![
            "post:initialize",
            "post:initialize",
            "add",
            "post:create",
            "add",
            "post:create",
            "remove",
            "post:destroy",
        ]
    );
}

#[test]
fn destroy_removes_by_identity() {
    let post = Model::builder("post").build();
    let record = post.build(json!({ "id": 3 }));
    post.add([record.clone()]);

    record.destroy(Callbacks::new());

    assert_eq!(post.find(3), None);
}

#[test]
fn destroy_without_identity_removes_the_instance() {
    let post = Model::builder("post").build();
    let kept = post.build(json!({ "title": "Kept" }));
    let dropped = post.build(json!({ "title": "Dropped" }));
    kept.save(Callbacks::new()).unwrap();
    dropped.save(Callbacks::new()).unwrap();
    assert_eq!(post.len(), 2);

    dropped.destroy(Callbacks::new());

    assert_eq!(post.all(), vec![kept]);
}

#[test]
fn destroying_an_unregistered_record_still_publishes() {
    let post = Model::builder("post").build();
    let log = watch(&post);
    let record = post.build(json!({ "id": 3 }));

    record.destroy(Callbacks::new());

    assert_eq!(log.entries(), vec!["post:initialize", "post:destroy"]);
}

#[test]
fn handlers_may_read_the_record_they_receive() {
    let post = Model::builder("post").build();
    let titles = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = std::sync::Arc::clone(&titles);
    post.on("create", move |record| {
        record.write_field("seen", true);
        sink.lock().unwrap().push(record.read("title"));
    });

    let record = post.build(json!({ "title": "Foo" }));
    record.save(Callbacks::new()).unwrap();

    assert_eq!(*titles.lock().unwrap(), vec![Some(json!("Foo"))]);
    assert!(record.is_changed("seen"));
}
