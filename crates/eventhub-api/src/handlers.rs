use crate::{ApiError, ApiResult, AppState};
use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use eventhub_ai::{ContentGenerator, Message};
use eventhub_core::{
    is_incomplete, missing_fields, Event, EventHubError, OrganizationSummary, ProfileUpdate,
    RequiredField, StudentProfile,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub ai_enabled: bool,
}

#[derive(Serialize)]
pub struct CompletenessResponse {
    pub user_id: String,
    pub has_student_record: bool,
    pub incomplete: bool,
    pub missing_fields: Vec<RequiredField>,
}

#[derive(Deserialize)]
pub struct OrganizationSearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Serialize)]
pub struct OrganizationSearchResponse {
    pub query: String,
    pub results: Vec<OrganizationSummary>,
    /// Number of matches before capping.
    pub total: usize,
}

#[derive(Deserialize)]
pub struct EventListQuery {
    pub organization: Option<String>,
    /// Only events starting at or after this instant (RFC 3339). Without an
    /// organization filter this defaults to now.
    pub after: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
pub struct StudentRequest {
    pub student_id: String,
}

#[derive(Deserialize)]
pub struct DescriptionRequest {
    pub title: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Deserialize)]
pub struct SummaryRequest {
    pub description: String,
}

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub history: Vec<Message>,
    pub message: String,
}

#[derive(Serialize)]
pub struct TextResponse {
    pub text: String,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ai_enabled: state.content.is_some(),
    })
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<StudentProfile>> {
    let profile = state.profiles.student_profile(&user_id).await?.ok_or_else(|| {
        EventHubError::NotFound(format!("student profile {}", user_id))
    })?;
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> ApiResult<Json<StudentProfile>> {
    let profile = state.students.update_profile(&user_id, update).await?;
    Ok(Json(profile))
}

/// A user without a student record is reported complete: there is nothing
/// to nag about until the record exists.
pub async fn profile_completeness(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<CompletenessResponse>> {
    let profile = state.profiles.student_profile(&user_id).await?;
    Ok(Json(CompletenessResponse {
        has_student_record: profile.is_some(),
        incomplete: is_incomplete(profile.as_ref()),
        missing_fields: profile.as_ref().map(missing_fields).unwrap_or_default(),
        user_id,
    }))
}

pub async fn search_organizations(
    State(state): State<AppState>,
    Query(params): Query<OrganizationSearchQuery>,
) -> ApiResult<Json<OrganizationSearchResponse>> {
    let query = params.q.trim().to_string();
    if query.is_empty() {
        return Ok(Json(OrganizationSearchResponse {
            query,
            results: Vec::new(),
            total: 0,
        }));
    }

    let mut results = state.organizations.search_organizations(&query).await?;
    let total = results.len();
    results.truncate(state.search_result_cap());
    debug!(query = %query, total, shown = results.len(), "organization search");

    Ok(Json(OrganizationSearchResponse {
        query,
        results,
        total,
    }))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventListQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let events = match params.organization {
        Some(org) => {
            let mut events = state.events.events_by_organization(&org).await?;
            if let Some(after) = params.after {
                events.retain(|event| event.starts_at >= after);
            }
            events
        }
        None => {
            let after = params.after.unwrap_or_else(Utc::now);
            state.events.upcoming_events(after).await?
        }
    };
    debug!(count = events.len(), "listing events");
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
) -> ApiResult<Json<Event>> {
    Ok(Json(state.events.event(&event_id).await?))
}

pub async fn register_for_event(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<StudentRequest>,
) -> ApiResult<Json<StudentProfile>> {
    let profile = state
        .students
        .register_for_event(&request.student_id, &event_id)
        .await?;
    Ok(Json(profile))
}

pub async fn record_attendance(
    State(state): State<AppState>,
    Path(event_id): Path<String>,
    Json(request): Json<StudentRequest>,
) -> ApiResult<Json<StudentProfile>> {
    let profile = state
        .students
        .record_attendance(&request.student_id, &event_id)
        .await?;
    Ok(Json(profile))
}

fn content(state: &AppState) -> ApiResult<&ContentGenerator> {
    state
        .content
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("AI content generation is disabled".into()))
}

pub async fn generate_description(
    State(state): State<AppState>,
    Json(request): Json<DescriptionRequest>,
) -> ApiResult<Json<TextResponse>> {
    let text = content(&state)?
        .generate_event_description(&request.title, &request.details)
        .await?;
    Ok(Json(TextResponse { text }))
}

pub async fn summarize_event(
    State(state): State<AppState>,
    Json(request): Json<SummaryRequest>,
) -> ApiResult<Json<TextResponse>> {
    let text = content(&state)?
        .summarize_event(&request.description)
        .await?;
    Ok(Json(TextResponse { text }))
}

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> ApiResult<Json<TextResponse>> {
    let text = content(&state)?
        .chatbot_reply(&request.history, &request.message)
        .await?;
    Ok(Json(TextResponse { text }))
}
