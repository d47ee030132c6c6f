// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Behavior when no document store is configured.

use axum::http::{Method, StatusCode};
use serde_json::json;

mod common;
use common::{create_unconfigured_app, send};

#[tokio::test]
async fn test_liveness_and_diagnostics_still_answer() {
    let app = create_unconfigured_app();

    let response = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = send(&app, Method::GET, "/test", None, None).await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["backend"], "Running");
    assert_eq!(body["database_url"], "Not Set");
    assert_eq!(body["collections"], json!([]));
}

#[tokio::test]
async fn test_data_routes_report_not_configured() {
    let app = create_unconfigured_app();

    for (method, uri) in [
        (Method::GET, "/api/user"),
        (Method::GET, "/api/p/flames-blue"),
        (Method::GET, "/api/p/flames-blue/vcf"),
        (Method::GET, "/api/admin/users"),
    ] {
        let response = send(&app, method, uri, None, None).await;
        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR, "{}", uri);
        assert_eq!(response.json(), json!({"detail": "Database not configured"}));
    }
}
