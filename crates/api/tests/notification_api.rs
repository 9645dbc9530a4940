//! HTTP-level tests for `/api/v1/notifications`, run against the memory store.

mod common;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Method, Request, StatusCode};
use backoffice_access::MemoryNotificationStore;
use common::{body_json, build_test_app, delete, get, post, post_json, put_json, token_for};
use serde_json::json;
use tower::ServiceExt;

const BASE: &str = "/api/v1/notifications";

/// Create a notification for `user_id` through the API and return its id.
async fn create_for(store: &MemoryNotificationStore, user_id: &str, title: &str) -> i64 {
    let response = post_json(
        build_test_app(store.clone()),
        BASE,
        Some(&token_for("system")),
        json!({
            "user_id": user_id,
            "notification_type": "ticket.assigned",
            "title": title,
            "message": "Please take a look",
            "action_url": "/tickets/1",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_returns_401() {
    let app = build_test_app(MemoryNotificationStore::new());
    let response = get(app, BASE, None).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn invalid_token_returns_401() {
    let app = build_test_app(MemoryNotificationStore::new());
    let response = get(app, &format!("{BASE}/unread-count"), Some("garbage")).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn anonymous_create_is_rejected_and_nothing_stored() {
    let store = MemoryNotificationStore::new();
    let response = post_json(
        build_test_app(store.clone()),
        BASE,
        None,
        json!({
            "user_id": "alice",
            "notification_type": "ticket.assigned",
            "title": "t",
            "message": "m",
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(store.raw_notifications().is_empty());
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_callers_notifications_with_aggregates() {
    let store = MemoryNotificationStore::new();
    let first = create_for(&store, "alice", "First").await;
    create_for(&store, "alice", "Second").await;
    create_for(&store, "bob", "Bob only").await;

    let token = token_for("alice");
    let response = post(
        build_test_app(store.clone()),
        &format!("{BASE}/{first}/read"),
        Some(&token),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(build_test_app(store.clone()), BASE, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["total"], 2);
    assert_eq!(data["unread_count"], 1);
    let titles: Vec<_> = data["notifications"]
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(titles, vec!["Second", "First"]);

    let unread = body_json(
        get(
            build_test_app(store),
            &format!("{BASE}?read=false&type=ticket.assigned"),
            Some(&token),
        )
        .await,
    )
    .await;
    assert_eq!(unread["data"]["total"], 1);
    assert_eq!(unread["data"]["notifications"][0]["title"], "Second");
}

#[tokio::test]
async fn list_limit_is_capped() {
    let store = MemoryNotificationStore::new();
    create_for(&store, "alice", "Only").await;

    let response = get(
        build_test_app(store),
        &format!("{BASE}?limit=5000&offset=0"),
        Some(&token_for("alice")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["total"], 1);
}

#[tokio::test]
async fn negative_offset_returns_400() {
    let response = get(
        build_test_app(MemoryNotificationStore::new()),
        &format!("{BASE}?offset=-1"),
        Some(&token_for("alice")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn other_users_collection_returns_403() {
    let store = MemoryNotificationStore::new();
    create_for(&store, "bob", "Private").await;

    let response = get(
        build_test_app(store),
        &format!("{BASE}?user_id=bob"),
        Some(&token_for("alice")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn unparseable_query_returns_json_400() {
    let response = get(
        build_test_app(MemoryNotificationStore::new()),
        &format!("{BASE}?read=maybe"),
        Some(&token_for("alice")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

// ---------------------------------------------------------------------------
// Single notification
// ---------------------------------------------------------------------------

#[tokio::test]
async fn other_users_notification_returns_404() {
    let store = MemoryNotificationStore::new();
    let id = create_for(&store, "bob", "Private").await;
    let token = token_for("alice");

    let response = get(build_test_app(store.clone()), &format!("{BASE}/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(build_test_app(store.clone()), &format!("{BASE}/{id}"), Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(store.raw_notification(id).unwrap().deleted_at.is_none());
}

#[tokio::test]
async fn mark_read_twice_keeps_read_at() {
    let store = MemoryNotificationStore::new();
    let id = create_for(&store, "alice", "Read me").await;
    let token = token_for("alice");
    let uri = format!("{BASE}/{id}/read");

    let first = body_json(post(build_test_app(store.clone()), &uri, Some(&token)).await).await;
    let second = body_json(post(build_test_app(store), &uri, Some(&token)).await).await;
    assert!(first["data"]["read_at"].is_string());
    assert_eq!(first["data"]["read_at"], second["data"]["read_at"]);
}

#[tokio::test]
async fn delete_hides_row_and_repeats_cleanly() {
    let store = MemoryNotificationStore::new();
    let id = create_for(&store, "alice", "Bye").await;
    let token = token_for("alice");
    let uri = format!("{BASE}/{id}");

    let response = delete(build_test_app(store.clone()), &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = delete(build_test_app(store.clone()), &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(build_test_app(store.clone()), &uri, Some(&token)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let count = body_json(
        get(
            build_test_app(store.clone()),
            &format!("{BASE}/unread-count"),
            Some(&token),
        )
        .await,
    )
    .await;
    assert_eq!(count["data"]["count"], 0);
    assert!(store.raw_notification(id).unwrap().deleted_at.is_some());
}

// ---------------------------------------------------------------------------
// Bulk operations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn read_all_reports_rows_marked() {
    let store = MemoryNotificationStore::new();
    create_for(&store, "alice", "1").await;
    create_for(&store, "alice", "2").await;
    let token = token_for("alice");
    let uri = format!("{BASE}/read-all");

    let json = body_json(post(build_test_app(store.clone()), &uri, Some(&token)).await).await;
    assert_eq!(json["data"]["marked_read"], 2);
    let json = body_json(post(build_test_app(store), &uri, Some(&token)).await).await;
    assert_eq!(json["data"]["marked_read"], 0);
}

#[tokio::test]
async fn batch_create_is_all_or_nothing() {
    let store = MemoryNotificationStore::new();
    let body = json!({
        "user_ids": ["u1", "u2", "u3"],
        "notification_type": "system.announcement",
        "title": "Maintenance",
        "message": "Tonight at 22:00",
    });

    store.fail_batch_after(1);
    let response = post_json(
        build_test_app(store.clone()),
        &format!("{BASE}/batch"),
        Some(&token_for("system")),
        body.clone(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(store.raw_notifications().is_empty());

    let response = post_json(
        build_test_app(store.clone()),
        &format!("{BASE}/batch"),
        Some(&token_for("system")),
        body,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 3);
    assert_eq!(store.raw_notifications().len(), 3);
}

#[tokio::test]
async fn create_with_invalid_fields_returns_400() {
    let response = post_json(
        build_test_app(MemoryNotificationStore::new()),
        BASE,
        Some(&token_for("system")),
        json!({
            "user_id": "alice",
            "notification_type": "ticket.assigned",
            "title": "",
            "message": "m",
            "action_url": "javascript:alert(1)",
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preference_defaults_then_update() {
    let store = MemoryNotificationStore::new();
    let token = token_for("alice");
    let enabled_uri = format!("{BASE}/preferences/ticket.assigned/enabled");

    let json = body_json(get(build_test_app(store.clone()), &enabled_uri, Some(&token)).await).await;
    assert_eq!(json["data"]["enabled"], true);
    assert_eq!(json["data"]["notification_type"], "ticket.assigned");

    let response = put_json(
        build_test_app(store.clone()),
        &format!("{BASE}/preferences/ticket.assigned"),
        Some(&token),
        json!({ "enabled": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["enabled"], false);
    assert_eq!(json["data"]["email_enabled"], false);

    let json = body_json(get(build_test_app(store.clone()), &enabled_uri, Some(&token)).await).await;
    assert_eq!(json["data"]["enabled"], false);

    let json = body_json(
        get(
            build_test_app(store),
            &format!("{BASE}/preferences"),
            Some(&token),
        )
        .await,
    )
    .await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn preference_conflict_returns_409() {
    let store = MemoryNotificationStore::new();
    store.fail_next_upsert_with_conflict();

    let response = put_json(
        build_test_app(store),
        &format!("{BASE}/preferences/ticket.assigned"),
        Some(&token_for("alice")),
        json!({ "push_enabled": true }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[tokio::test]
async fn other_users_preferences_return_403() {
    let response = get(
        build_test_app(MemoryNotificationStore::new()),
        &format!("{BASE}/preferences?user_id=bob"),
        Some(&token_for("alice")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// Malformed requests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn non_numeric_id_returns_json_400() {
    let response = get(
        build_test_app(MemoryNotificationStore::new()),
        &format!("{BASE}/abc"),
        Some(&token_for("alice")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn malformed_json_body_returns_json_400() {
    let store = MemoryNotificationStore::new();
    let request = Request::builder()
        .method(Method::POST)
        .uri(BASE)
        .header(AUTHORIZATION, format!("Bearer {}", token_for("system")))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"user_id\": "))
        .unwrap();

    let response = build_test_app(store.clone()).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
    assert!(store.raw_notifications().is_empty());
}
