//! API integration tests
//!
//! Tests for the server-config REST endpoints, the super-admin guard, and
//! the remote config-service pass-through.

use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use portal_config::config::PortalSettings;
use portal_config::database::migrations::Migrator;
use portal_config::errors::{PortalError, PortalResult};
use portal_config::remote::{ConfigServiceApi, ServerConfigDTO};
use portal_config::server::app::create_app;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tempfile::NamedTempFile;

/// Remote-call record for assertions
#[derive(Debug, Clone)]
enum RemoteCall {
    Create(String, ServerConfigDTO),
    Update(String, ServerConfigDTO),
}

/// In-memory stand-in for the admin service
#[derive(Default)]
struct MockConfigService {
    listing: Vec<ServerConfigDTO>,
    fail: bool,
    calls: Mutex<Vec<RemoteCall>>,
}

impl MockConfigService {
    fn with_listing(listing: Vec<ServerConfigDTO>) -> Arc<Self> {
        Arc::new(Self {
            listing,
            ..Default::default()
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigServiceApi for MockConfigService {
    async fn find_all(&self, env: &str) -> PortalResult<Vec<ServerConfigDTO>> {
        if self.fail {
            return Err(PortalError::Remote {
                env: env.to_string(),
                reason: "connection refused".to_string(),
            });
        }
        Ok(self.listing.clone())
    }

    async fn create(&self, env: &str, config: &ServerConfigDTO) -> PortalResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RemoteCall::Create(env.to_string(), config.clone()));
        Ok(())
    }

    async fn update(&self, env: &str, config: &ServerConfigDTO) -> PortalResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push(RemoteCall::Update(env.to_string(), config.clone()));
        Ok(())
    }
}

fn remote_config(key: &str, id: i64) -> ServerConfigDTO {
    ServerConfigDTO {
        id: Some(id),
        key: key.to_string(),
        value: "remote-value".to_string(),
        comment: None,
        created_by: None,
        last_modified_by: None,
    }
}

/// Create a test server over a temp-file database and a mock admin service
async fn setup_test_server(
    envs: &[&str],
    config_service: Arc<MockConfigService>,
) -> Result<(TestServer, NamedTempFile)> {
    let temp_file = NamedTempFile::new()?;
    let db_url = format!("sqlite://{}?mode=rwc", temp_file.path().display());

    let db = Database::connect(&db_url).await?;
    Migrator::up(&db, None).await?;

    let settings = PortalSettings {
        active_environments: envs.iter().map(|e| e.to_string()).collect(),
    };

    let app = create_app(db, settings, config_service, Some("*")).await?;
    let server = TestServer::new(app)?;

    Ok((server, temp_file))
}

fn user_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-portal-user"),
        HeaderValue::from_static("alice"),
    )
}

fn super_admin_header() -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static("x-portal-roles"),
        HeaderValue::from_static("super-admin"),
    )
}

/// POST /server/config as the super admin "alice"
async fn write_config(server: &TestServer, key: &str, value: &str) -> Value {
    let (user_name, user_value) = user_header();
    let (roles_name, roles_value) = super_admin_header();
    let response = server
        .post("/server/config")
        .add_header(user_name, user_value)
        .add_header(roles_name, roles_value)
        .json(&json!({ "key": key, "value": value }))
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    response.json()
}

#[tokio::test]
async fn test_health_endpoint() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    let response = server.get("/health").await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let body: Value = response.json();
    assert_eq!(body["service"], "portal-config-service");
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());

    Ok(())
}

#[tokio::test]
async fn test_first_write_creates_config() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    let config = write_config(&server, "item.navigation", "enabled").await;

    assert!(config["id"].as_i64().unwrap() > 0);
    assert_eq!(config["key"], "item.navigation");
    assert_eq!(config["value"], "enabled");
    assert_eq!(config["created_by"], "alice");
    assert_eq!(config["last_modified_by"], "alice");

    Ok(())
}

#[tokio::test]
async fn test_second_write_updates_in_place() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    let created = write_config(&server, "api.readTimeout", "10000").await;

    // Same key, different user
    let (roles_name, roles_value) = super_admin_header();
    let response = server
        .post("/server/config")
        .add_header(
            HeaderName::from_static("x-portal-user"),
            HeaderValue::from_static("bob"),
        )
        .add_header(roles_name, roles_value)
        .json(&json!({ "key": "api.readTimeout", "value": "20000", "comment": "tuned" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);

    let updated: Value = response.json();
    assert_eq!(updated["id"], created["id"]);
    assert_eq!(updated["created_by"], "alice");
    assert_eq!(updated["last_modified_by"], "bob");
    assert_eq!(updated["value"], "20000");
    assert_eq!(updated["comment"], "tuned");

    Ok(())
}

#[tokio::test]
async fn test_write_requires_authenticated_super_admin() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    // No identity headers at all
    let response = server
        .post("/server/config")
        .json(&json!({ "key": "k", "value": "v" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "UNAUTHORIZED");

    // Authenticated but not a super admin
    let response = server
        .post("/server/config")
        .add_header(
            HeaderName::from_static("x-portal-user"),
            HeaderValue::from_static("bob"),
        )
        .add_header(
            HeaderName::from_static("x-portal-roles"),
            HeaderValue::from_static("operator"),
        )
        .json(&json!({ "key": "k", "value": "v" }))
        .await;
    assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "FORBIDDEN");

    Ok(())
}

#[tokio::test]
async fn test_write_rejects_blank_key() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    let (user_name, user_value) = user_header();
    let (roles_name, roles_value) = super_admin_header();
    let response = server
        .post("/server/config")
        .add_header(user_name, user_value)
        .add_header(roles_name, roles_value)
        .json(&json!({ "key": "   ", "value": "v" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_FAILED");

    Ok(())
}

#[tokio::test]
async fn test_find_all_pages_through_configs() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    for i in 0..25 {
        write_config(&server, &format!("key.{:02}", i), "v").await;
    }

    // First page
    let (user_name, user_value) = user_header();
    let (roles_name, roles_value) = super_admin_header();
    let response = server
        .get("/server/config/findAll")
        .add_query_param("offset", "1")
        .add_query_param("limit", "10")
        .add_header(user_name, user_value)
        .add_header(roles_name, roles_value)
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let page: Vec<Value> = response.json();
    assert_eq!(page.len(), 10);
    assert_eq!(page[0]["key"], "key.00");

    // Last, partial page
    let (user_name, user_value) = user_header();
    let (roles_name, roles_value) = super_admin_header();
    let response = server
        .get("/server/config/findAll")
        .add_query_param("offset", "3")
        .add_query_param("limit", "10")
        .add_header(user_name, user_value)
        .add_header(roles_name, roles_value)
        .await;
    let page: Vec<Value> = response.json();
    assert_eq!(page.len(), 5);
    assert_eq!(page[0]["key"], "key.20");
    assert_eq!(page[4]["key"], "key.24");

    Ok(())
}

#[tokio::test]
async fn test_find_all_rejects_invalid_page_params() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    for (offset, limit) in [("0", "10"), ("-1", "10"), ("1", "0")] {
        let (user_name, user_value) = user_header();
        let (roles_name, roles_value) = super_admin_header();
        let response = server
            .get("/server/config/findAll")
            .add_query_param("offset", offset)
            .add_query_param("limit", limit)
            .add_header(user_name, user_value)
            .add_header(roles_name, roles_value)
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }

    Ok(())
}

#[tokio::test]
async fn test_load_single_config_by_key() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    write_config(&server, "organizations", "org-a,org-b").await;

    let (user_name, user_value) = user_header();
    let (roles_name, roles_value) = super_admin_header();
    let response = server
        .get("/server/config/organizations")
        .add_header(user_name, user_value)
        .add_header(roles_name, roles_value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let config: Value = response.json();
    assert_eq!(config["key"], "organizations");
    assert_eq!(config["value"], "org-a,org-b");

    Ok(())
}

#[tokio::test]
async fn test_load_missing_config_is_not_found() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    let (user_name, user_value) = user_header();
    let (roles_name, roles_value) = super_admin_header();
    let response = server
        .get("/server/config/nope")
        .add_header(user_name, user_value)
        .add_header(roles_name, roles_value)
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: Value = response.json();
    assert_eq!(body["code"], "NOT_FOUND");

    Ok(())
}

#[tokio::test]
async fn test_add_config_service_creates_unseen_key() -> Result<()> {
    let mock = MockConfigService::with_listing(vec![remote_config("other.key", 7)]);
    let (server, _db) = setup_test_server(&["dev", "pro"], mock.clone()).await?;

    let response = server
        .post("/server/config/addConfigService")
        .json(&json!({ "key": "fresh.key", "value": "v" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        RemoteCall::Create(env, config) => {
            assert_eq!(env, "dev");
            assert_eq!(config.id, None);
            assert_eq!(config.key, "fresh.key");
        }
        other => panic!("expected create, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_add_config_service_updates_existing_key() -> Result<()> {
    let mock = MockConfigService::with_listing(vec![remote_config("a.key", 42)]);
    let (server, _db) = setup_test_server(&["dev"], mock.clone()).await?;

    let response = server
        .post("/server/config/addConfigService")
        .json(&json!({ "key": "a.key", "value": "new-value" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

    let calls = mock.calls();
    assert_eq!(calls.len(), 1);
    match &calls[0] {
        RemoteCall::Update(env, config) => {
            assert_eq!(env, "dev");
            assert_eq!(config.id, Some(42));
            assert_eq!(config.value, "new-value");
        }
        other => panic!("expected update, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_add_config_service_honors_env_param() -> Result<()> {
    let mock = MockConfigService::with_listing(vec![]);
    let (server, _db) = setup_test_server(&["dev", "pro"], mock.clone()).await?;

    let response = server
        .post("/server/config/addConfigService")
        .add_query_param("env", "pro")
        .json(&json!({ "key": "k", "value": "v" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::NO_CONTENT);
    match &mock.calls()[0] {
        RemoteCall::Create(env, _) => assert_eq!(env, "pro"),
        other => panic!("expected create, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_add_config_service_rejects_inactive_env() -> Result<()> {
    let mock = MockConfigService::with_listing(vec![]);
    let (server, _db) = setup_test_server(&["dev"], mock.clone()).await?;

    let response = server
        .post("/server/config/addConfigService")
        .add_query_param("env", "uat")
        .json(&json!({ "key": "k", "value": "v" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(mock.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_add_config_service_without_active_envs() -> Result<()> {
    let mock = MockConfigService::with_listing(vec![]);
    let (server, _db) = setup_test_server(&[], mock.clone()).await?;

    let response = server
        .post("/server/config/addConfigService")
        .json(&json!({ "key": "k", "value": "v" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    let body: Value = response.json();
    assert_eq!(body["code"], "NO_ACTIVE_ENVIRONMENT");
    assert!(mock.calls().is_empty());

    Ok(())
}

#[tokio::test]
async fn test_find_all_config_service_pages_remote_listing() -> Result<()> {
    let listing: Vec<ServerConfigDTO> = (0..25)
        .map(|i| remote_config(&format!("key.{:02}", i), i))
        .collect();
    let mock = MockConfigService::with_listing(listing);
    let (server, _db) = setup_test_server(&["dev"], mock).await?;

    let response = server
        .get("/server/config/findAllConfigService")
        .add_query_param("offset", "3")
        .add_query_param("limit", "10")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let page: Vec<Value> = response.json();
    assert_eq!(page.len(), 5);
    assert_eq!(page[0]["key"], "key.20");

    Ok(())
}

#[tokio::test]
async fn test_remote_failure_maps_to_bad_gateway() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], MockConfigService::failing()).await?;

    let response = server.get("/server/config/findAllConfigService").await;

    assert_eq!(response.status_code(), StatusCode::BAD_GATEWAY);
    let body: Value = response.json();
    assert_eq!(body["code"], "REMOTE_SERVICE_ERROR");

    Ok(())
}

#[tokio::test]
async fn test_static_routes_win_over_key_capture() -> Result<()> {
    let (server, _db) = setup_test_server(&["dev"], Arc::new(MockConfigService::default())).await?;

    // An empty table: findAll must page, not resolve as the key "findAll"
    let (user_name, user_value) = user_header();
    let (roles_name, roles_value) = super_admin_header();
    let response = server
        .get("/server/config/findAll")
        .add_header(user_name, user_value)
        .add_header(roles_name, roles_value)
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let page: Vec<Value> = response.json();
    assert!(page.is_empty());

    Ok(())
}
