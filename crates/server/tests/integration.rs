//! Integration tests for the HTTP layer.
//!
//! Each test runs a real server on a random port and talks to it with reqwest.

use meridian_agents::{Agent, Orchestrator, WebAgent};
use meridian_core::{AppError, AppResult};
use meridian_llm::mock::ScriptedClient;
use meridian_llm::LlmClient;
use meridian_server::{create_router, AppState};
use std::sync::Arc;

struct Canned(&'static str);

#[async_trait::async_trait]
impl Agent for Canned {
    fn name(&self) -> &str {
        self.0
    }

    async fn answer(&self, _question: &str) -> AppResult<String> {
        Ok(format!("{} answer", self.0))
    }
}

struct Broken;

#[async_trait::async_trait]
impl Agent for Broken {
    fn name(&self) -> &str {
        "clinical"
    }

    async fn answer(&self, _question: &str) -> AppResult<String> {
        Err(AppError::Knowledge("index unreadable".to_string()))
    }
}

/// Spin up a test server on a random port and return the base URL.
async fn start_test_server(classifier_reply: &str) -> String {
    let classifier: Arc<dyn LlmClient> = Arc::new(ScriptedClient::always(classifier_reply));
    let web_llm = Arc::new(ScriptedClient::always(
        "Final Answer: Paris is the capital of France",
    ));
    let orchestrator = Orchestrator::new(
        classifier,
        "m",
        Arc::new(Canned("food")),
        Arc::new(Broken),
        Arc::new(WebAgent::new(web_llm, "m")),
    );
    let router = create_router(Arc::new(AppState::new(Arc::new(orchestrator))));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

/// POST a raw body as JSON and return (status, body).
async fn post_json(base: &str, path: &str, json: &str) -> (u16, String) {
    let resp = reqwest::Client::new()
        .post(format!("{}{}", base, path))
        .header("content-type", "application/json")
        .body(json.to_string())
        .send()
        .await
        .unwrap();
    let status = resp.status().as_u16();
    (status, resp.text().await.unwrap())
}

#[tokio::test]
async fn test_health_endpoint() {
    let base = start_test_server("web").await;
    let resp = reqwest::get(format!("{}/health", base)).await.unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "healthy");
    assert!(json["version"].as_str().is_some());
    assert!(json["uptime_seconds"].as_u64().is_some());
}

#[tokio::test]
async fn test_chat_routes_to_food() {
    let base = start_test_server("food").await;
    let (status, body) = post_json(
        &base,
        "/chat",
        r#"{"question": "What were global CO2 emissions trends?"}"#,
    )
    .await;

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, serde_json::json!({"answer": "food answer"}));
}

#[tokio::test]
async fn test_chat_web_final_answer() {
    let base = start_test_server("I think this is about clinical trials").await;
    let (status, body) = post_json(&base, "/chat", r#"{"question": "Capital of France?"}"#).await;

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["answer"], "Paris is the capital of France");
}

#[tokio::test]
async fn test_chat_agent_failure_is_still_200() {
    let base = start_test_server("clinical").await;
    let (status, body) = post_json(&base, "/chat", r#"{"question": "Aspirin trials?"}"#).await;

    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).unwrap();
    let answer = json["answer"].as_str().unwrap();
    assert!(answer.contains("clinical"));
    assert!(answer.contains("error"));
}

#[tokio::test]
async fn test_chat_rejects_malformed_body() {
    let base = start_test_server("web").await;

    let (status, _) = post_json(&base, "/chat", "{not json").await;
    assert!((400..500).contains(&status), "status {}", status);

    let (status, _) = post_json(&base, "/chat", r#"{"query": "wrong field"}"#).await;
    assert!((400..500).contains(&status), "status {}", status);
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let base = start_test_server("web").await;
    let resp = reqwest::Client::new()
        .get(format!("{}/health", base))
        .header("origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();

    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
