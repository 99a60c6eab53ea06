//! Admin API tests driven through the router with `tower::ServiceExt`.

#![allow(clippy::panic, clippy::indexing_slicing)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;

use guild_host::api;
use guild_host::app_state::AppState;
use guild_host::command::CommandCatalog;
use guild_host::domain::{ShardId, TenantDescriptor, TenantId, UserId};
use guild_host::host::HostSettings;
use guild_host::persistence::DocumentStore;
use guild_host::shard::Shard;
use guild_host::transport::InMemoryTransport;

struct TestApp {
    _dir: TempDir,
    transport: Arc<InMemoryTransport>,
    shard: Arc<Shard>,
    router: Router,
}

fn make_app() -> TestApp {
    let Ok(dir) = TempDir::new() else {
        panic!("temp dir");
    };
    let transport = Arc::new(InMemoryTransport::new());
    let shard = Shard::new(
        ShardId::new(3),
        Arc::clone(&transport) as Arc<dyn guild_host::transport::Transport>,
        DocumentStore::new(dir.path().join("hosts")),
        CommandCatalog::new(),
        HostSettings::default(),
        64,
    );
    let router = api::build_app(AppState {
        shard: Arc::clone(&shard),
    });
    TestApp {
        _dir: dir,
        transport,
        shard,
        router,
    }
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    };
    let Ok(request) = request else {
        panic!("request build failed");
    };
    let Ok(response) = router.clone().oneshot(request).await else {
        panic!("router call failed");
    };
    let status = response.status();
    let Ok(collected) = response.into_body().collect().await else {
        panic!("body read failed");
    };
    let bytes = collected.to_bytes();
    if bytes.is_empty() {
        return (status, Value::Null);
    }
    let Ok(value) = serde_json::from_slice(&bytes) else {
        panic!("response is not JSON");
    };
    (status, value)
}

#[tokio::test]
async fn health_reports_shard_and_host_count() {
    let app = make_app();
    let (status, body) = send(&app.router, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["shard_id"], 3);
    assert_eq!(body["hosts"], 0);
}

#[tokio::test]
async fn posting_an_event_activates_its_tenant() {
    let app = make_app();
    let event = json!({
        "origin": { "kind": "tenant", "tenant_id": 42 },
        "channel_id": 1,
        "sender": 7,
        "content": "hello",
    });
    let (status, body) = send(&app.router, Method::POST, "/api/v1/events", Some(event)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["routed"], true);

    let (status, body) = send(&app.router, Method::GET, "/api/v1/hosts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["tenant_id"], 42);
    assert_eq!(body["data"][0]["name"], "guild-42");
}

#[tokio::test]
async fn private_event_is_accepted_without_activation() {
    let app = make_app();
    let event = json!({
        "origin": { "kind": "private" },
        "channel_id": 1,
        "sender": 7,
        "content": "psst",
    });
    let (status, body) = send(&app.router, Method::POST, "/api/v1/events", Some(event)).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["routed"], false);
    assert!(app.shard.is_empty().await);
}

#[tokio::test]
async fn host_detail_exposes_config_and_prefix() {
    let app = make_app();
    let Ok(host) = app
        .shard
        .register(TenantDescriptor::new(TenantId::new(42), "Rust"))
        .await
    else {
        panic!("register failed");
    };
    host.config_set("prefix", "!").await;

    let (status, body) = send(&app.router, Method::GET, "/api/v1/hosts/42", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Rust");
    assert_eq!(body["prefix"], "!");
    assert_eq!(body["pending_events"], 0);
    assert_eq!(body["config"], json!({ "prefix": "!" }));
}

#[tokio::test]
async fn unknown_host_is_not_found() {
    let app = make_app();
    let (status, body) = send(&app.router, Method::GET, "/api/v1/hosts/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], 2001);
}

#[tokio::test]
async fn save_and_reload_round_trip_through_disk() {
    let app = make_app();
    let tenant = TenantId::new(8);
    let Ok(host) = app.shard.activate(tenant).await else {
        panic!("activation failed");
    };
    host.config_set("prefix", "?").await;

    let (status, _) = send(&app.router, Method::POST, "/api/v1/hosts/8/save", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    host.config_set("prefix", "unsaved").await;
    let (status, _) = send(&app.router, Method::POST, "/api/v1/hosts/8/reload", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(host.prefix().await, "?");
}

#[tokio::test]
async fn moderation_reports_denied_authority_as_not_allowed() {
    let app = make_app();
    assert!(app.shard.activate(TenantId::new(5)).await.is_ok());
    app.transport.deny_authority_for(UserId::new(66)).await;

    let request = json!({ "action": "ban", "user_id": 66 });
    let (status, body) =
        send(&app.router, Method::POST, "/api/v1/hosts/5/moderation", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["action"], "ban");
    assert_eq!(body["allowed"], false);

    let request = json!({ "action": "kick", "user_id": 67 });
    let (status, body) =
        send(&app.router, Method::POST, "/api/v1/hosts/5/moderation", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);
}

#[tokio::test]
async fn moderation_surfaces_transport_failures() {
    let app = make_app();
    assert!(app.shard.activate(TenantId::new(5)).await.is_ok());
    app.transport
        .fail_for(
            UserId::new(70),
            guild_host::transport::TransportError::Network("reset".to_string()),
        )
        .await;

    let request = json!({ "action": "mute", "user_id": 70 });
    let (status, _) =
        send(&app.router, Method::POST, "/api/v1/hosts/5/moderation", Some(request)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn deactivate_discards_the_host() {
    let app = make_app();
    assert!(app.shard.activate(TenantId::new(11)).await.is_ok());

    let (status, _) = send(&app.router, Method::DELETE, "/api/v1/hosts/11", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.shard.is_empty().await);

    let (status, _) = send(&app.router, Method::DELETE, "/api/v1/hosts/11", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ban_request_may_override_retention() {
    let app = make_app();
    assert!(app.shard.activate(TenantId::new(5)).await.is_ok());

    let request = json!({ "action": "ban", "user_id": 80, "delete_message_days": 3 });
    let (status, body) =
        send(&app.router, Method::POST, "/api/v1/hosts/5/moderation", Some(request)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], true);

    let actions = app.transport.actions().await;
    let Some(last) = actions.last() else {
        panic!("ban should be recorded");
    };
    assert_eq!(
        last.action,
        guild_host::transport::memory::RemoteAction::Ban {
            delete_message_days: 3
        }
    );
}
