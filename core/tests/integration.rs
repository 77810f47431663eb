//! End-to-end tests against the live mock server.
//!
//! # Design
//! Each test starts the mock server on a random port, then drives the
//! blocking client over real HTTP from the test thread. The server runs on
//! its own tokio runtime in a background thread.

use std::net::SocketAddr;

use serde_json::{json, Map, Value};
use wilddog_core::{Client, ErrorKind, Payload};

/// Start a mock server with the given state and return its address.
fn start_server(state: mock_server::AppState) -> SocketAddr {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run_with(listener, state).await
        })
        .unwrap();
    });

    addr
}

fn client() -> Client {
    let addr = start_server(mock_server::AppState::default());
    Client::new(&format!("http://{addr}/rest")).unwrap()
}

#[test]
fn replace_root_then_read_root() {
    let client = client();

    // Step 1: clear the root.
    let removed = client.remove().unwrap();
    assert!(removed.is_success());

    // Step 2: replace the root with a map.
    let mut data = Map::new();
    data.insert("PUT-root".into(), json!("This was PUT into the root"));
    let replaced = client.replace(data).unwrap();
    assert!(replaced.is_success());
    assert_eq!(replaced.status(), 200);

    // Step 3: read it back.
    let read = client.read().unwrap();
    assert!(read.is_success());
    assert_eq!(read.body(), &json!({"PUT-root": "This was PUT into the root"}));
    assert_eq!(read.raw_body(), r#"{"PUT-root":"This was PUT into the root"}"#);
}

#[test]
fn replace_path_then_read_path() {
    let client = client();

    client.replace_at("test-PUT", json!({"Key_1": "v1"})).unwrap();
    let read = client.read_at("test-PUT").unwrap();

    assert_eq!(read.body(), &json!({"Key_1": "v1"}));
}

#[test]
fn replace_nested_map_round_trips() {
    let client = client();
    let data = json!({
        "Key_1": "This is the first value",
        "Key_2": "This is value #2",
        "Key_3": {"Sub-Key1": "This is the first sub-value"},
        "numbers": [1, 2.5, -3],
        "flag": false
    });

    client.replace_at("/test-PUT", data.clone()).unwrap();

    assert_eq!(client.read_at("test-PUT").unwrap().into_body(), data);
    assert_eq!(
        client.read_at("test-PUT/Key_3/Sub-Key1").unwrap().into_body(),
        json!("This is the first sub-value")
    );
}

#[test]
fn remove_path_then_read_is_absent() {
    let client = client();

    client
        .replace_at("test-DELETE", json!({"DELETE": "x"}))
        .unwrap();
    let removed = client.remove_at("test-DELETE").unwrap();
    assert!(removed.is_success());

    let read = client.read_at("test-DELETE").unwrap();
    assert!(read.is_success());
    assert_eq!(read.body(), &Value::Null);
    assert_eq!(read.raw_body(), "null");
}

#[test]
fn empty_replace_deletes() {
    let client = client();

    client.replace_at("doomed", json!({"a": 1})).unwrap();
    client.replace_at("doomed", Payload::Empty).unwrap();

    assert_eq!(client.read_at("doomed").unwrap().body(), &Value::Null);
}

#[test]
fn append_is_not_idempotent() {
    let client = client();
    let data = json!({"Key_1": "same payload"});

    let first = client.append_at("test-POST", data.clone()).unwrap();
    let second = client.append_at("test-POST", data.clone()).unwrap();

    let first_key = first.generated_key().unwrap().to_string();
    let second_key = second.generated_key().unwrap().to_string();
    assert_ne!(first_key, second_key);

    let stored = client.read_at("test-POST").unwrap().into_body();
    assert_eq!(stored.as_object().unwrap().len(), 2);
    assert_eq!(stored[&first_key], data);
    assert_eq!(stored[&second_key], data);
}

#[test]
fn merge_updates_listed_children_only() {
    let client = client();

    client
        .replace_at("users/ada", json!({"name": "Ada", "born": 1815}))
        .unwrap();
    let merged = client
        .merge_at("users/ada", Payload::raw(r#"{"died": 1852}"#))
        .unwrap();
    assert!(merged.is_success());

    assert_eq!(
        client.read_at("users/ada").unwrap().into_body(),
        json!({"name": "Ada", "born": 1815, "died": 1852})
    );
}

#[test]
fn merge_with_non_object_is_unsuccessful_not_an_error() {
    let client = client();

    let response = client.merge_at("users", json!([1, 2])).unwrap();

    assert!(!response.is_success());
    assert_eq!(response.status(), 400);
    assert!(response.body()["error"].is_string());
}

#[test]
fn path_with_space_round_trips() {
    let client = client();

    let replaced = client.replace_at("my node", json!({"a": 1})).unwrap();
    assert!(replaced.is_success());

    assert_eq!(client.read_at("my node").unwrap().into_body(), json!({"a": 1}));
    assert_eq!(
        client.read().unwrap().into_body(),
        json!({"my node": {"a": 1}})
    );
}

#[test]
fn large_subtree_is_read_in_full() {
    let client = client();
    let big = "x".repeat(11 * 1024 * 1024);

    assert!(client.replace_at("big", json!(big)).unwrap().is_success());

    let read = client.read_at("big").unwrap();
    assert_eq!(read.body().as_str().map(str::len), Some(big.len()));
}

#[test]
fn query_parameters_are_accepted_once() {
    let client = client();
    client.replace_at("q", json!({"a": 1})).unwrap();

    let with_query = client
        .add_query_parameter("orderBy", "\"$key\"")
        .add_query_parameter("limitToFirst", "1")
        .read_at("q")
        .unwrap();
    assert!(with_query.is_success());

    let plain = client.read_at("q").unwrap();
    assert_eq!(plain.body(), &json!({"a": 1}));
}

#[test]
fn auth_token_is_sent_as_query_parameter() {
    let addr = start_server(mock_server::AppState {
        auth_token: Some("s3cr3t".into()),
        ..Default::default()
    });
    let base = format!("http://{addr}/rest");

    let anonymous = Client::new(&base).unwrap();
    let denied = anonymous.read().unwrap();
    assert!(!denied.is_success());
    assert_eq!(denied.status(), 401);
    assert_eq!(denied.body(), &json!({"error": "Permission denied"}));

    let authed = Client::with_auth(&base, "s3cr3t").unwrap();
    assert!(authed.replace_at("secret", json!(42)).unwrap().is_success());
    let read = authed
        .add_query_parameter("print", "pretty")
        .read_at("secret")
        .unwrap();
    assert_eq!(read.body(), &json!(42));
}

#[test]
fn padded_auth_token_is_accepted() {
    let addr = start_server(mock_server::AppState {
        auth_token: Some("YWJjZA==".into()),
        ..Default::default()
    });

    let client = Client::with_auth(&format!("http://{addr}/rest"), "YWJjZA==").unwrap();
    assert!(client.read().unwrap().is_success());
}

#[test]
fn base_with_trailing_separator_reads_root() {
    let addr = start_server(mock_server::AppState::default());
    // "http://host/" resolves to "http://host/.json", the root of the tree.
    let client = Client::new(&format!("http://{addr}/")).unwrap();
    assert!(client.read().unwrap().is_success());
}

#[test]
fn closed_port_is_a_transport_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = Client::new(&format!("http://127.0.0.1:{port}/rest")).unwrap();

    let err = client.read().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
}

#[test]
fn client_is_shared_between_threads() {
    let client = client();

    std::thread::scope(|scope| {
        for i in 0..4 {
            let client = &client;
            scope.spawn(move || {
                client
                    .add_query_parameter("print", "silent")
                    .replace_at(&format!("threads/{i}"), json!(i))
                    .unwrap();
            });
        }
    });

    assert_eq!(
        client.read_at("threads").unwrap().into_body(),
        json!({"0": 0, "1": 1, "2": 2, "3": 3})
    );
}
