use axum::{
    extract::{Extension, State},
    http::StatusCode,
    response::Json,
};
use serde::Deserialize;

use crate::middleware::auth::AuthUser;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractSkillsRequest {
    pub resume_text: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendEventsRequest {
    pub skills: Vec<String>,
    pub user_id: Option<String>,
}

/// Relay resume text to the ML service and return its skill data unchanged.
pub async fn extract_skills(
    State(state): State<AppState>,
    Extension(_auth_user): Extension<AuthUser>,
    Json(payload): Json<ExtractSkillsRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    if payload.resume_text.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Resume text is required"})),
        ));
    }

    let data = state
        .ml_client
        .extract_skills(&payload.resume_text)
        .await
        .map_err(|e| e.into_response_parts())?;

    Ok(Json(data))
}

/// Relay a skill list to the ML service and return its ranked
/// recommendations unchanged. The target user defaults to the caller.
pub async fn recommend_events(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<RecommendEventsRequest>,
) -> Result<Json<serde_json::Value>, (StatusCode, Json<serde_json::Value>)> {
    if payload.skills.is_empty() || payload.skills.iter().any(|s| s.trim().is_empty()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "A non-empty skills list is required"})),
        ));
    }

    let user_id = payload
        .user_id
        .unwrap_or_else(|| auth_user.user_id.to_string());

    let data = state
        .ml_client
        .recommend_events(&payload.skills, &user_id)
        .await
        .map_err(|e| e.into_response_parts())?;

    Ok(Json(data))
}
