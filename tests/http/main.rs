//! HTTP transport integration tests.
//!
//! Starts an axum server on port 0 and persists records through
//! `ReqwestTransport`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{post, put};
use axum::{Form, Json, Router};
use model_rust::{
    Callbacks, HttpConfig, Model, PersistenceError, Query, ReqwestTransport, RestPersistence,
    TransportError,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Form bodies received by the server, in arrival order.
type Received = Arc<Mutex<Vec<(String, HashMap<String, String>)>>>;

async fn create_post(
    State(received): State<Received>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    let title = form.get("post[title]").cloned().unwrap_or_default();
    received.lock().unwrap().push(("POST".into(), form));
    Json(json!({ "id": 1, "title": format!("{title} amended") }))
}

async fn update_post(
    State(received): State<Received>,
    Path(id): Path<u64>,
    Form(form): Form<HashMap<String, String>>,
) -> impl IntoResponse {
    received.lock().unwrap().push((format!("PUT {id}"), form));
    StatusCode::NO_CONTENT
}

async fn destroy_post(State(received): State<Received>, Path(id): Path<u64>) -> impl IntoResponse {
    received
        .lock()
        .unwrap()
        .push((format!("DELETE {id}"), HashMap::new()));
    StatusCode::NO_CONTENT
}

async fn reject() -> impl IntoResponse {
    (StatusCode::UNPROCESSABLE_ENTITY, "title taken")
}

/// Bind to port 0 and return the base URL plus the request log.
async fn start_server() -> (String, Received) {
    let received: Received = Arc::default();
    let app = Router::new()
        .route("/posts", post(create_post))
        .route("/posts/:id", put(update_post).delete(destroy_post))
        .route("/rejecting", post(reject))
        .with_state(Arc::clone(&received));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), received)
}

fn post_model(base: &str, path: &str) -> Model {
    let transport = ReqwestTransport::new(HttpConfig::new(base)).unwrap();
    Model::builder("post")
        .persistence(RestPersistence::new(path, transport))
        .build()
}

/// Callbacks that report the outcome on a channel.
fn outcome() -> (Callbacks, oneshot::Receiver<Result<(), PersistenceError>>) {
    let (tx, rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));
    let on_failure = Arc::clone(&tx);
    let callbacks = Callbacks::new()
        .on_success(move |_| {
            if let Some(tx) = tx.lock().unwrap().take() {
                let _ = tx.send(Ok(()));
            }
        })
        .on_failure(move |_, error| {
            if let Some(tx) = on_failure.lock().unwrap().take() {
                let _ = tx.send(Err(error.clone()));
            }
        });
    (callbacks, rx)
}

#[tokio::test]
async fn create_update_destroy() {
    let (base, received) = start_server().await;
    let post = post_model(&base, "/posts");
    let record = post.build(json!({ "title": "Foo", "body": "..." }));

    let (callbacks, done) = outcome();
    record.save(callbacks).unwrap();
    done.await.unwrap().unwrap();

    assert_eq!(record.id(), Some(json!(1)));
    assert_eq!(record.attributes()["title"], json!("Foo amended"));
    assert_eq!(post.find(1), Some(record.clone()));

    record.write_field("body", "edited");
    let (callbacks, done) = outcome();
    record.save(callbacks).unwrap();
    done.await.unwrap().unwrap();
    assert_eq!(record.attributes()["body"], json!("edited"));

    let (callbacks, done) = outcome();
    record.destroy(callbacks);
    done.await.unwrap().unwrap();
    assert!(post.is_empty());

    let received = received.lock().unwrap().clone();
    let verbs: Vec<&str> = received.iter().map(|(verb, _)| verb.as_str()).collect();
    assert_eq!(verbs, vec!["POST", "PUT 1", "DELETE 1"]);
    assert_eq!(received[0].1["post[title]"], "Foo");
    assert_eq!(received[0].1["post[body]"], "...");
    assert!(!received[0].1.contains_key("post[id]"));
    assert_eq!(received[1].1["post[body]"], "edited");
}

#[tokio::test]
async fn error_status_reaches_on_failure() {
    let (base, _) = start_server().await;
    let post = post_model(&base, "/rejecting");
    let record = post.build(json!({ "title": "Foo" }));

    let (callbacks, done) = outcome();
    record.save(callbacks).unwrap();
    let result = done.await.unwrap();

    assert_eq!(
        result,
        Err(PersistenceError::Transport(TransportError::Status {
            status: 422,
            body: "title taken".into(),
        }))
    );
    assert!(record.is_new());
    assert!(post.is_empty());
}

#[tokio::test]
async fn unreachable_server_is_a_connection_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let post = post_model(&format!("http://{addr}"), "/posts");
    let record = post.build(json!({ "title": "Foo" }));

    let (callbacks, done) = outcome();
    record.save(callbacks).unwrap();
    let result = done.await.unwrap();

    assert!(matches!(
        result,
        Err(PersistenceError::Transport(TransportError::Connection(_)))
    ));
}

#[tokio::test]
async fn undecodable_body_is_reported() {
    async fn html() -> impl IntoResponse {
        "<html></html>"
    }

    let app = Router::new().route("/posts", post(html));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let post_type = post_model(&format!("http://{addr}"), "/posts");
    let record = post_type.build(None);
    let (callbacks, done) = outcome();
    record.save(callbacks).unwrap();

    assert!(matches!(
        done.await.unwrap(),
        Err(PersistenceError::Transport(TransportError::Decode(_)))
    ));
}

#[test]
fn config_loads_from_json() {
    let config: HttpConfig = serde_json::from_value::<HttpConfig>(
        json!({ "base_url": "http://localhost:8080", "timeout_ms": null }),
    )
    .unwrap();
    assert_eq!(config.timeout_ms, None);
    assert_eq!(config.resolve("/posts"), "http://localhost:8080/posts");
    let _: Value = serde_json::to_value(&config).unwrap();
}
