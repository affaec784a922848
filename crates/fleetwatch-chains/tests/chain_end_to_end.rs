//! Route chains registered in SQLite and executed over real HTTP.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use fleetwatch_chains::{ChainRegistrar, RouteChainExecutor};
use fleetwatch_config::ChainsConfig;
use fleetwatch_http_reqwest::ReqwestSender;
use fleetwatch_protocols::{HttpMethod, RouteRepository, RouteStep, TargetDescriptor};
use fleetwatch_store_sqlite::{Owner, SqliteStore};

fn login_then_profile() -> Vec<RouteStep> {
    let mut login = RouteStep::new(1, "/login", HttpMethod::Post, 200);
    login.body.insert("user".to_string(), json!("ada"));
    login.expected_body.insert("token".to_string(), json!(""));
    login.expected_body.insert("userId".to_string(), json!(""));
    login.next_route_params = vec!["userId".to_string()];

    let mut profile = RouteStep::new(2, "/users/{userId}", HttpMethod::Get, 200);
    profile.parent_id = 1;
    profile.params.insert("userId".to_string(), String::new());
    profile.expected_body.insert("name".to_string(), json!(""));

    vec![profile, login]
}

async fn setup(server: &MockServer) -> (Arc<SqliteStore>, RouteChainExecutor) {
    let port = server.address().port();
    let store = Arc::new(SqliteStore::in_memory().await.unwrap());
    store.upsert_owner(Owner { id: 1, ..Default::default() }).await.unwrap();
    store
        .upsert_target(TargetDescriptor::network(5, "blog", 1, "127.0.0.1", port))
        .await
        .unwrap();

    ChainRegistrar::new(store.clone())
        .register(5, "login", login_then_profile())
        .await
        .unwrap();

    let http = Arc::new(ReqwestSender::new(Duration::from_secs(5)).unwrap());
    let executor = RouteChainExecutor::new(store.clone(), http, &ChainsConfig::default(), 2);
    (store, executor)
}

#[tokio::test]
async fn test_chain_propagates_params_and_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({"user": "ada"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "eyJabc", "userId": "42"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/42"))
        .and(header("authorization", "Bearer eyJabc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "ada"})))
        .expect(1)
        .mount(&server)
        .await;
    let (store, executor) = setup(&server).await;

    let summary = executor.run_due_chains().await.unwrap();

    assert_eq!(summary.chains, 1);
    assert_eq!(summary.executed, 2);
    assert_eq!(summary.failed, 0);
    assert!(store.list_due_steps().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_step_stops_chain_and_retires_it() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "denied"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let (store, executor) = setup(&server).await;

    let summary = executor.run_due_chains().await.unwrap();
    assert_eq!(summary.executed, 1);
    assert_eq!(summary.failed, 1);

    // A failed chain is not run again.
    let again = executor.run_due_chains().await.unwrap();
    assert_eq!(again.chains, 0);
    assert!(store.list_due_steps().await.unwrap().is_empty());
}
