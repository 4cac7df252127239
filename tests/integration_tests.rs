//! Integration tests for the HTTP bridge
//!
//! These tests start the bridge on a local port and drive it the way a game
//! server's packet pipeline would.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;
use uuid::Uuid;

use chat_translator::{
    chat_type::ChatTypeRegistry,
    config::MatchConfig,
    geolocation::Geolocation,
    interceptor::ChatInterceptor,
    onboarding::NewUserOnboarding,
    packet::Player,
    pattern::PatternExtractor,
    server::{self, AppState, JoinResponse, API_KEY_HEADER},
    store::{ChatStore, MemoryStore, MessageId},
};

// ==================== Test Helpers ====================

struct FixedGeolocation(&'static str);

#[async_trait]
impl Geolocation for FixedGeolocation {
    async fn country_code(&self, _player: &Player) -> Option<String> {
        Some(self.0.to_string())
    }
}

struct TestBridge {
    base_url: String,
    store: MemoryStore,
    client: reqwest::Client,
}

/// Start a bridge on an ephemeral port
async fn start_bridge(patterns: &[&str], api_key: Option<&str>) -> TestBridge {
    let store = MemoryStore::new();
    let shared: Arc<dyn ChatStore> = Arc::new(store.clone());

    let interceptor = ChatInterceptor::new(
        shared.clone(),
        Arc::new(PatternExtractor::new(patterns).expect("patterns should compile")),
        Arc::new(ChatTypeRegistry::vanilla()),
        "/translate",
    );
    let onboarding = NewUserOnboarding::new(shared, Arc::new(FixedGeolocation("GB")));

    let state = AppState {
        interceptor: Arc::new(interceptor),
        onboarding: Arc::new(onboarding),
        api_key: api_key.map(Arc::from),
    };

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, server::router(state)).await.unwrap();
    });

    TestBridge {
        base_url: format!("http://{}", addr),
        store,
        client: reqwest::Client::new(),
    }
}

fn alice() -> Value {
    json!({"id": "00000000-0000-0000-0000-0000000a11ce", "name": "Alice"})
}

fn player_chat(content: &str) -> Value {
    json!({
        "player": alice(),
        "packet": {
            "type": "player_chat",
            "sender": "00000000-0000-0000-0000-0000000a11ce",
            "body": {"content": content, "timestamp": "2024-05-01T12:00:00Z"},
            "chat_type": {"chat_type": 0, "name": "Alice"}
        }
    })
}

fn system_chat(content: &str) -> Value {
    json!({
        "player": alice(),
        "packet": {"type": "system_chat", "content": content, "overlay": false}
    })
}

fn message_id(content: &Value) -> MessageId {
    let command = content["clickEvent"]["value"].as_str().expect("click command");
    MessageId(
        command
            .strip_prefix("/translate ")
            .expect("translate prefix")
            .parse()
            .expect("uuid"),
    )
}

impl TestBridge {
    async fn post(&self, route: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.base_url, route))
            .json(body)
            .send()
            .await
            .expect("request should complete")
    }

    async fn outbound(&self, body: &Value) -> Value {
        let response = self.post("/packets/outbound", body).await;
        assert_eq!(response.status(), 200);
        response.json().await.unwrap()
    }
}

// ==================== Packet Tests ====================

#[tokio::test]
async fn test_health() {
    let bridge = start_bridge(&[], None).await;
    let body = reqwest::get(format!("{}/health", bridge.base_url))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_player_chat_becomes_translatable_system_chat() {
    let bridge = start_bridge(&[], None).await;

    let packet = bridge.outbound(&player_chat("hello")).await;
    assert_eq!(packet["type"], "system_chat");

    let content: Value = serde_json::from_str(packet["content"].as_str().unwrap()).unwrap();
    assert_eq!(content["text"], "<Alice> hello");

    let stored = bridge.store.message(message_id(&content)).expect("stored");
    assert_eq!(stored.plain_text, "hello");
}

#[tokio::test]
async fn test_bridge_relay_is_extracted() {
    let bridge = start_bridge(&[r"^\[Bridge\] <(?:.+)> (.+)$"], None).await;

    let packet = bridge.outbound(&system_chat(r#"{"text":"[Bridge] <Bob> hi"}"#)).await;
    let content: Value = serde_json::from_str(packet["content"].as_str().unwrap()).unwrap();

    let stored = bridge.store.message(message_id(&content)).expect("stored");
    assert_eq!(stored.plain_text, "hi");
    assert_eq!(stored.serialized, r#"{"text":"[Bridge] <Bob> hi"}"#);
}

#[tokio::test]
async fn test_unmatched_system_chat_is_returned_unchanged() {
    let bridge = start_bridge(&[r"^\[Bridge\] <(?:.+)> (.+)$"], None).await;
    let request = system_chat(r#""Server restarting in 5m""#);

    let packet = bridge.outbound(&request).await;
    assert_eq!(packet, request["packet"]);
    assert_eq!(bridge.store.message_count(), 0);
}

#[tokio::test]
async fn test_invalid_body_is_rejected() {
    let bridge = start_bridge(&[], None).await;
    let response = bridge
        .post("/packets/outbound", &json!({"packet": "nope"}))
        .await;
    assert!(response.status().is_client_error());
}

// ==================== Join Tests ====================

#[tokio::test]
async fn test_first_join_is_welcomed_once() {
    let bridge = start_bridge(&[], None).await;

    let first: JoinResponse = bridge.post("/players/join", &alice()).await.json().await.unwrap();
    let welcome = first.welcome.expect("new player should be welcomed");
    assert!(welcome.plain_text().contains("Welcome, Alice!"));

    let id = Uuid::from_u128(0xA11CE);
    assert_eq!(
        bridge.store.user(id).unwrap().default_language.as_deref(),
        Some("EN-GB")
    );

    let second: JoinResponse = bridge.post("/players/join", &alice()).await.json().await.unwrap();
    assert!(second.welcome.is_none());
}

// ==================== Auth Tests ====================

#[tokio::test]
async fn test_api_key_required_when_configured() {
    let bridge = start_bridge(&[], Some("secret")).await;

    let denied = bridge.post("/players/join", &alice()).await;
    assert_eq!(denied.status(), 401);

    let allowed = bridge
        .client
        .post(format!("{}/players/join", bridge.base_url))
        .header(API_KEY_HEADER, "secret")
        .json(&alice())
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status(), 200);
}

// ==================== Config Tests ====================

#[test]
fn test_match_config_file_feeds_extractor() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("match.json");
    std::fs::write(
        &path,
        r#"{"match": {"include": ["^\\[Discord\\] [^:]+: (.+)$", "^<%username%> (.+)$"]}}"#,
    )
    .unwrap();

    let config = MatchConfig::load(&path).unwrap();
    let extractor = PatternExtractor::new(&config.include).unwrap();
    let id = Uuid::from_u128(1);

    assert_eq!(
        extractor.extract("[Discord] bob: hey all", id, "Alice"),
        Some("hey all".to_string())
    );
    assert_eq!(extractor.extract("<Alice> yo", id, "Alice"), Some("yo".to_string()));
    assert_eq!(extractor.extract("<Carol> yo", id, "Alice"), None);
}

#[test]
fn test_invalid_pattern_in_config_fails() {
    let config = MatchConfig::parse(r#"{"match": {"include": ["(unclosed"]}}"#).unwrap();
    assert!(PatternExtractor::new(&config.include).is_err());
}
