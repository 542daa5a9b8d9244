use async_trait::async_trait;
use axum_test::TestServer;
use chrono::{TimeZone, Utc};
use eventhub_ai::{ContentGenerator, GenerationConfig, LLMProvider, LLMResponse, LLMResult, Message};
use eventhub_api::{create_router, AppState};
use eventhub_core::{
    ConfigManager, Event, EventHubConfig, OrganizationSummary, StudentProfile, UserProfile,
};
use eventhub_store::{InMemoryStores, SeedData};
use serde_json::{json, Value};
use std::sync::Arc;

fn seed() -> SeedData {
    let mut incomplete = StudentProfile::new(UserProfile::new("s1", "Aina", "aina@example.edu"));
    incomplete.programme = Some("Computer Science".into());

    let mut complete = StudentProfile::new(UserProfile::new("s2", "Ben", "ben@example.edu"));
    complete.matric_no = Some("A20EC0001".into());
    complete.programme = Some("Data Engineering".into());
    complete.year = Some("2".into());
    complete.phone = Some("0111111111".into());

    let organizations = (0..7)
        .map(|i| OrganizationSummary {
            id: format!("club-{}", i),
            name: format!("Club {}", i),
            avatar_url: None,
            event_count: 0,
        })
        .collect();

    SeedData {
        users: vec![UserProfile::new("s3", "Chen", "chen@example.edu")],
        students: vec![incomplete, complete],
        organizations,
        events: vec![
            Event {
                id: "e0".into(),
                organization_id: "club-0".into(),
                title: "Founding dinner".into(),
                description: String::new(),
                starts_at: Utc.with_ymd_and_hms(2020, 1, 10, 19, 0, 0).unwrap(),
                venue: None,
                points: 5,
            },
            Event {
                id: "e1".into(),
                organization_id: "club-0".into(),
                title: "Orientation night".into(),
                description: String::new(),
                starts_at: Utc.with_ymd_and_hms(2099, 9, 1, 19, 0, 0).unwrap(),
                venue: Some("Dewan Sultan Iskandar".into()),
                points: 15,
            },
        ],
    }
}

fn config() -> Arc<ConfigManager> {
    Arc::new(ConfigManager::from_config(EventHubConfig::default()).unwrap())
}

fn server_with(state: AppState) -> TestServer {
    TestServer::new(create_router(state)).unwrap()
}

fn server() -> TestServer {
    server_with(AppState::from_stores(InMemoryStores::from_seed(seed()), config()))
}

struct EchoProvider;

#[async_trait]
impl LLMProvider for EchoProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        _config: &GenerationConfig,
    ) -> LLMResult<LLMResponse> {
        let last = messages.last().map(|m| m.content.clone()).unwrap_or_default();
        Ok(LLMResponse {
            content: format!("echo: {}", last),
            total_tokens: None,
            finish_reason: Some("stop".into()),
            model: "echo".into(),
        })
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "echo"
    }

    fn model_name(&self) -> &str {
        "echo"
    }
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let server = server();
    let resp = server.get("/health").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["ai_enabled"], false);
}

#[tokio::test]
async fn completeness_reports_missing_fields() {
    let server = server();

    let body: Value = server.get("/profiles/s1/completeness").await.json();
    assert_eq!(body["incomplete"], true);
    assert_eq!(body["missing_fields"], json!(["matric_no", "year", "phone"]));

    let body: Value = server.get("/profiles/s2/completeness").await.json();
    assert_eq!(body["incomplete"], false);

    let body: Value = server.get("/profiles/s3/completeness").await.json();
    assert_eq!(body["has_student_record"], false);
    assert_eq!(body["incomplete"], false);

    let resp = server.get("/profiles/nobody/completeness").await;
    assert_eq!(resp.status_code(), 404);
    let body: Value = resp.json();
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn profile_update_completes_profile() {
    let server = server();
    let resp = server
        .put("/profiles/s1")
        .json(&json!({"matric_no": "A21EC0002", "year": "1", "phone": "0122222222"}))
        .await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["matric_no"], "A21EC0002");
    assert_eq!(body["display_name"], "Aina");

    let body: Value = server.get("/profiles/s1/completeness").await.json();
    assert_eq!(body["incomplete"], false);

    let body: Value = server.get("/profiles/s1").await.json();
    assert_eq!(body["phone"], "0122222222");
}

#[tokio::test]
async fn organization_search_caps_results() {
    let server = server();

    let body: Value = server
        .get("/organizations/search")
        .add_query_param("q", "club")
        .await
        .json();
    assert_eq!(body["total"], 7);
    assert_eq!(body["results"].as_array().unwrap().len(), 5);

    let body: Value = server
        .get("/organizations/search")
        .add_query_param("q", "   ")
        .await
        .json();
    assert_eq!(body["total"], 0);
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn attendance_awards_points_once() {
    let server = server();

    let resp = server
        .post("/events/e1/attend")
        .json(&json!({"student_id": "s1"}))
        .await;
    assert_eq!(resp.status_code(), 400);

    let resp = server
        .post("/events/e1/register")
        .json(&json!({"student_id": "s1"}))
        .await;
    assert_eq!(resp.status_code(), 200);

    for _ in 0..2 {
        let body: Value = server
            .post("/events/e1/attend")
            .json(&json!({"student_id": "s1"}))
            .await
            .json();
        assert_eq!(body["mycsd_points"], 15);
    }

    let resp = server
        .post("/events/missing/register")
        .json(&json!({"student_id": "s1"}))
        .await;
    assert_eq!(resp.status_code(), 404);
}

#[tokio::test]
async fn events_listing_and_lookup() {
    let server = server();

    let events: Value = server.get("/events").await.json();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["id"], "e1");

    let events: Value = server
        .get("/events")
        .add_query_param("after", "2019-01-01T00:00:00Z")
        .await
        .json();
    assert_eq!(events.as_array().unwrap().len(), 2);

    let events: Value = server
        .get("/events")
        .add_query_param("after", "2099-10-01T00:00:00Z")
        .await
        .json();
    assert!(events.as_array().unwrap().is_empty());

    let event: Value = server.get("/events/e1").await.json();
    assert_eq!(event["points"], 15);
}

#[tokio::test]
async fn organization_events_include_past_ones() {
    let server = server();

    let events: Value = server
        .get("/events")
        .add_query_param("organization", "club-0")
        .await
        .json();
    assert_eq!(events.as_array().unwrap().len(), 2);

    let events: Value = server
        .get("/events")
        .add_query_param("organization", "club-0")
        .add_query_param("after", "2025-01-01T00:00:00Z")
        .await
        .json();
    assert_eq!(events.as_array().unwrap().len(), 1);
    assert_eq!(events[0]["id"], "e1");

    let events: Value = server
        .get("/events")
        .add_query_param("organization", "club-6")
        .await
        .json();
    assert!(events.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ai_routes_unavailable_when_disabled() {
    let server = server();
    let resp = server
        .post("/ai/summary")
        .json(&json!({"description": "A talk"}))
        .await;
    assert_eq!(resp.status_code(), 503);
}

#[tokio::test]
async fn ai_routes_use_content_generator() {
    let state = AppState::from_stores(InMemoryStores::from_seed(seed()), config())
        .with_content(ContentGenerator::new(Arc::new(EchoProvider)));
    let server = server_with(state);

    let body: Value = server
        .post("/ai/chat")
        .json(&json!({
            "history": [{"role": "user", "content": "hi"}, {"role": "assistant", "content": "hello"}],
            "message": "any events tonight?"
        }))
        .await
        .json();
    assert_eq!(body["text"], "echo: any events tonight?");

    let body: Value = server
        .post("/ai/description")
        .json(&json!({"title": "Hackathon"}))
        .await
        .json();
    assert_eq!(body["text"], "echo: Title: Hackathon");

    let resp = server
        .post("/ai/summary")
        .json(&json!({"description": ""}))
        .await;
    assert_eq!(resp.status_code(), 400);
}
