// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use crystal_api::Client;
use crystal_app::{FieldValue, RecordId, RecordStore, Screen, StoreError, TabularDataView};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tiny_http::{Header, Method, Response, Server};

struct Expected {
    method: Method,
    url: &'static str,
    status: u16,
    body: &'static str,
}

/// Serves the given responses in order, asserting each request's method and
/// path. Returns the base URL and the captured `Authorization` headers.
fn mock_backend(expected: Vec<Expected>) -> Result<(String, JoinHandle<Vec<Option<String>>>)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let base = format!("http://{}/api", server.server_addr());

    let handle = thread::spawn(move || {
        let mut auth_headers = Vec::new();
        for step in expected {
            let request = server.recv().expect("request expected");
            assert_eq!(request.method(), &step.method);
            assert_eq!(request.url(), step.url);
            auth_headers.push(
                request
                    .headers()
                    .iter()
                    .find(|header| header.field.equiv("Authorization"))
                    .map(|header| header.value.as_str().to_owned()),
            );
            let response = Response::from_string(step.body)
                .with_status_code(step.status)
                .with_header(
                    Header::from_bytes("Content-Type", "application/json")
                        .expect("valid content type header"),
                );
            request.respond(response).expect("response should succeed");
        }
        auth_headers
    });

    Ok((base, handle))
}

#[test]
fn unreachable_backend_is_a_transport_error() {
    let client = Client::new("http://127.0.0.1:1/api", Duration::from_millis(200))
        .expect("client should initialize");

    let error = client
        .list_records("users")
        .expect_err("listing should fail for unreachable endpoint");
    assert!(error.is_transport(), "{error}");
    assert!(error.to_string().contains("cannot reach http://127.0.0.1:1/api"));
}

#[test]
fn list_accepts_bare_array() -> Result<()> {
    let (base, handle) = mock_backend(vec![Expected {
        method: Method::Get,
        url: "/api/users",
        status: 200,
        body: r#"[
            {"_id":"u1","name":"Bob","createdAt":"2025-03-01T10:00:00Z"},
            {"_id":{"$oid":"65f0c0ffee"},"name":"alice"}
        ]"#,
    }])?;

    let client = Client::new(&base, Duration::from_secs(1))?;
    let records = client.list_records("users")?;
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].id(), &RecordId::from("u1"));
    assert_eq!(records[1].id(), &RecordId::from("65f0c0ffee"));
    assert_eq!(
        records[1].get("name"),
        Some(&FieldValue::Text("alice".to_owned()))
    );

    let auth = handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    assert_eq!(auth, vec![None]);
    Ok(())
}

#[test]
fn list_unwraps_envelope_and_skips_documents_without_ids() -> Result<()> {
    let (base, handle) = mock_backend(vec![Expected {
        method: Method::Get,
        url: "/api/categories",
        status: 200,
        body: r#"{"success":true,"data":[
            {"_id":"c1","name":"Amethyst","productCount":12},
            {"name":"orphan"}
        ]}"#,
    }])?;

    let client = Client::new(&base, Duration::from_secs(1))?;
    let records = client.list_records("categories")?;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].get("productCount"), Some(&FieldValue::Number(12.0)));

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}

#[test]
fn unsuccessful_envelope_is_a_server_error() -> Result<()> {
    let (base, handle) = mock_backend(vec![Expected {
        method: Method::Get,
        url: "/api/orders",
        status: 200,
        body: r#"{"success":false,"message":"admin access required"}"#,
    }])?;

    let client = Client::new(&base, Duration::from_secs(1))?;
    let error = client
        .list_records("orders")
        .expect_err("success false should fail");
    assert_eq!(error, StoreError::server(None, "admin access required"));

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}

#[test]
fn non_success_status_carries_json_message() -> Result<()> {
    let (base, handle) = mock_backend(vec![Expected {
        method: Method::Get,
        url: "/api/users",
        status: 500,
        body: r#"{"success":false,"message":"database unavailable"}"#,
    }])?;

    let client = Client::new(&base, Duration::from_secs(1))?;
    let error = client
        .list_records("users")
        .expect_err("500 should fail");
    assert!(!error.is_transport());
    assert_eq!(
        error.to_string(),
        "server error (500): database unavailable"
    );

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}

#[test]
fn delete_sends_bearer_token_and_encoded_id() -> Result<()> {
    let (base, handle) = mock_backend(vec![
        Expected {
            method: Method::Delete,
            url: "/api/orders/CW%2F001",
            status: 200,
            body: r#"{"success":true,"message":"Order deleted"}"#,
        },
        Expected {
            method: Method::Delete,
            url: "/api/orders/o2",
            status: 200,
            body: r#"{"success":false,"message":"order already shipped"}"#,
        },
    ])?;

    let client =
        Client::new(&base, Duration::from_secs(1))?.with_token(Some("s3cret".to_owned()));
    let ack = client.delete_record("orders", &RecordId::from("CW/001"))?;
    assert!(ack.success);
    assert_eq!(ack.message.as_deref(), Some("Order deleted"));

    let rejected = client.delete_record("orders", &RecordId::from("o2"))?;
    assert!(!rejected.success);
    let error = rejected
        .into_result()
        .expect_err("rejection should become an error");
    assert!(error.to_string().contains("order already shipped"));

    let auth = handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    assert_eq!(
        auth,
        vec![
            Some("Bearer s3cret".to_owned()),
            Some("Bearer s3cret".to_owned())
        ]
    );
    Ok(())
}

#[test]
fn collection_store_drives_a_view() -> Result<()> {
    let (base, handle) = mock_backend(vec![
        Expected {
            method: Method::Get,
            url: "/api/users",
            status: 200,
            body: r#"{"success":true,"data":[
                {"_id":"u1","name":"Bob"},
                {"_id":"u2","name":"alice"},
                {"_id":"u3","name":"Cara"}
            ]}"#,
        },
        Expected {
            method: Method::Delete,
            url: "/api/users/u2",
            status: 200,
            body: r#"{"success":true}"#,
        },
    ])?;

    let client = Client::new(&base, Duration::from_secs(1))?;
    let mut store = client.collection(Screen::Users);
    assert_eq!(store.collection(), "users");

    let mut view = TabularDataView::new(Screen::Users.columns());
    assert_eq!(view.load(&mut store)?, 3);
    view.delete_record(&mut store, &RecordId::from("u2"))?;
    assert!(!view.contains(&RecordId::from("u2")));
    assert_eq!(view.visible_slice().summary(), "Showing 1 to 2 of 2 entries");

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}

#[test]
fn store_trait_reports_not_found_status() -> Result<()> {
    let (base, handle) = mock_backend(vec![Expected {
        method: Method::Delete,
        url: "/api/categories/c404",
        status: 404,
        body: r#"{"error":"Category not found"}"#,
    }])?;

    let client = Client::new(&base, Duration::from_secs(1))?;
    let mut store = client.collection(Screen::Categories);
    let error = store
        .delete_record(&RecordId::from("c404"))
        .expect_err("404 should fail");
    assert_eq!(error, StoreError::server(Some(404), "Category not found"));

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}

#[test]
fn object_without_data_array_fails_and_view_keeps_records() -> Result<()> {
    let (base, handle) = mock_backend(vec![
        Expected {
            method: Method::Get,
            url: "/api/users",
            status: 200,
            body: r#"[{"_id":"u1","name":"Bob"},{"_id":"u2","name":"alice"}]"#,
        },
        Expected {
            method: Method::Get,
            url: "/api/users",
            status: 200,
            body: r#"{"users":[{"_id":"u1","name":"Bob"}]}"#,
        },
        Expected {
            method: Method::Get,
            url: "/api/users",
            status: 200,
            body: r#"{"message":"not authorized"}"#,
        },
    ])?;

    let client = Client::new(&base, Duration::from_secs(1))?;
    let mut store = client.collection(Screen::Users);
    let mut view = TabularDataView::new(Screen::Users.columns());
    assert_eq!(view.load(&mut store)?, 2);

    let error = view
        .load(&mut store)
        .expect_err("unknown object shape should fail");
    assert!(!error.is_transport());
    assert!(error.to_string().contains("no data array"), "{error}");
    assert_eq!(view.total_filtered_count(), 2);

    let error = view
        .load(&mut store)
        .expect_err("message-only body should fail");
    assert_eq!(error, StoreError::server(None, "not authorized"));
    assert_eq!(view.total_filtered_count(), 2);
    assert!(!view.is_loading());

    handle.join().map_err(|_| anyhow!("server thread panicked"))?;
    Ok(())
}
