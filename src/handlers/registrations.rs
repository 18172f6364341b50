use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};

use crate::middleware::auth::AuthUser;
use crate::models::ids::parse_uuid;
use crate::models::RegistrationEntry;
use crate::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub event_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub id: String,
    pub event_id: String,
    pub status: String,
    pub registered_at: String,
}

impl From<RegistrationEntry> for RegistrationResponse {
    fn from(entry: RegistrationEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            event_id: entry.event_id.to_string(),
            status: entry.status.as_str().to_string(),
            registered_at: entry.registered_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MyRegistrationsResponse {
    pub registrations: Vec<RegistrationResponse>,
}

pub async fn register_for_event(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegistrationResponse>), (StatusCode, Json<serde_json::Value>)> {
    let event_id = parse_uuid(&payload.event_id, "eventId").map_err(|msg| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
    })?;

    let entry = state
        .registrations
        .register(auth_user.user_id, event_id)
        .await
        .map_err(|e| e.into_response_parts())?;

    Ok((StatusCode::CREATED, Json(RegistrationResponse::from(entry))))
}

pub async fn my_registrations(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<Json<MyRegistrationsResponse>, (StatusCode, Json<serde_json::Value>)> {
    let entries = state
        .registrations
        .list_mine(auth_user.user_id)
        .await
        .map_err(|e| e.into_response_parts())?;

    Ok(Json(MyRegistrationsResponse {
        registrations: entries.into_iter().map(RegistrationResponse::from).collect(),
    }))
}

pub async fn cancel_registration(
    Path(registration_id): Path<String>,
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<serde_json::Value>)> {
    let entry_id = parse_uuid(&registration_id, "registration id").map_err(|msg| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
    })?;

    let entry = state
        .registrations
        .cancel(entry_id, auth_user.user_id)
        .await
        .map_err(|e| e.into_response_parts())?;

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "id": entry.id.to_string(),
            "message": "Registration cancelled"
        })),
    ))
}
