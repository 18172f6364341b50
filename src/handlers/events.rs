use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{postgres::PgRow, FromRow, Row};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::models::ids::parse_uuid;
use crate::models::{EventCategory, EventStatus, Role};
use crate::AppState;

// Column order shared by every SELECT in this file.
const EVENT_COLUMNS: &str =
    "id, title, description, date, location, organizer_id, category, skills, \
     max_participants, registered_count, status, created_at";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub organizer_id: String,
    pub category: String,
    pub skills: Vec<String>,
    pub max_participants: Option<i32>,
    pub registered_count: i32,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl<'r> FromRow<'r, PgRow> for EventResponse {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get::<Uuid, _>("id")?.to_string(),
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            date: row.try_get("date")?,
            location: row.try_get("location")?,
            organizer_id: row.try_get::<Uuid, _>("organizer_id")?.to_string(),
            category: row.try_get("category")?,
            skills: row.try_get("skills")?,
            max_participants: row.try_get("max_participants")?,
            registered_count: row.try_get("registered_count")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub category: Option<String>,
    pub status: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub category: String,
    pub skills: Option<Vec<String>>,
    pub max_participants: Option<i32>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub category: Option<String>,
    pub skills: Option<Vec<String>>,
    pub max_participants: Option<i32>,
    pub status: Option<String>,
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> Result<Json<Vec<EventResponse>>, (StatusCode, Json<serde_json::Value>)> {
    // Validate filters against the closed sets before they reach SQL.
    if let Some(category) = query.category.as_deref() {
        if EventCategory::from_str(category).is_none() {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("Unknown category: {}", category)})),
            ));
        }
    }
    if let Some(status) = query.status.as_deref() {
        if EventStatus::from_str(status).is_none() {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("Unknown status: {}", status)})),
            ));
        }
    }

    let rows = sqlx::query_as::<_, EventResponse>(&format!(
        "SELECT {} FROM events \
         WHERE ($1::text IS NULL OR category = $1) \
         AND ($2::text IS NULL OR status = $2) \
         ORDER BY date ASC",
        EVENT_COLUMNS
    ))
    .bind(query.category.as_deref())
    .bind(query.status.as_deref())
    .fetch_all(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("Error listing events: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Database error"})),
        )
    })?;

    Ok(Json(rows))
}

pub async fn get_event(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<EventResponse>, (StatusCode, Json<serde_json::Value>)> {
    let event_uuid = parse_uuid(&event_id, "event id").map_err(|msg| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
    })?;

    let row = sqlx::query_as::<_, EventResponse>(&format!(
        "SELECT {} FROM events WHERE id = $1",
        EVENT_COLUMNS
    ))
    .bind(event_uuid)
    .fetch_optional(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("Error fetching event: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Database error"})),
        )
    })?;

    match row {
        Some(event) => Ok(Json(event)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Event not found"})),
        )),
    }
}

pub async fn create_event(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), (StatusCode, Json<serde_json::Value>)> {
    if !auth_user.role.can_manage_events() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "Access denied"})),
        ));
    }

    let title = payload.title.trim();
    if title.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Title is required"})),
        ));
    }
    if payload.description.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Description is required"})),
        ));
    }
    if payload.location.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Location is required"})),
        ));
    }
    let category = EventCategory::from_str(&payload.category).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": format!("Unknown category: {}", payload.category)})),
        )
    })?;
    if let Some(max) = payload.max_participants {
        if max <= 0 {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "maxParticipants must be a positive integer"})),
            ));
        }
    }

    let event_id = Uuid::new_v4();
    let skills = payload.skills.unwrap_or_default();
    let created_at = Utc::now();

    sqlx::query(
        "INSERT INTO events \
         (id, title, description, date, location, organizer_id, category, skills, \
          max_participants, registered_count, status, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 'upcoming', $10)",
    )
    .bind(event_id)
    .bind(title)
    .bind(payload.description.trim())
    .bind(payload.date)
    .bind(payload.location.trim())
    .bind(auth_user.user_id)
    .bind(category.as_str())
    .bind(&skills)
    .bind(payload.max_participants)
    .bind(created_at)
    .execute(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("Error creating event: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to create event"})),
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(EventResponse {
            id: event_id.to_string(),
            title: title.to_string(),
            description: payload.description.trim().to_string(),
            date: payload.date,
            location: payload.location.trim().to_string(),
            organizer_id: auth_user.user_id.to_string(),
            category: category.as_str().to_string(),
            skills,
            max_participants: payload.max_participants,
            registered_count: 0,
            status: "upcoming".to_string(),
            created_at,
        }),
    ))
}

/// Load organizer_id or map absence/storage failure to the right response.
async fn fetch_organizer(
    state: &AppState,
    event_uuid: Uuid,
) -> Result<Uuid, (StatusCode, Json<serde_json::Value>)> {
    let organizer_id = sqlx::query_scalar::<_, Uuid>(
        "SELECT organizer_id FROM events WHERE id = $1"
    )
    .bind(event_uuid)
    .fetch_optional(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("Error fetching event organizer: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Database error"})),
        )
    })?;

    organizer_id.ok_or_else(|| {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "Event not found"})),
        )
    })
}

pub async fn update_event(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<Json<EventResponse>, (StatusCode, Json<serde_json::Value>)> {
    if !auth_user.role.can_manage_events() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "Access denied"})),
        ));
    }

    let event_uuid = parse_uuid(&event_id, "event id").map_err(|msg| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
    })?;

    let organizer_id = fetch_organizer(&state, event_uuid).await?;
    if organizer_id != auth_user.user_id && auth_user.role != Role::Admin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "Access denied"})),
        ));
    }

    if let Some(category) = payload.category.as_deref() {
        if EventCategory::from_str(category).is_none() {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("Unknown category: {}", category)})),
            ));
        }
    }
    if let Some(status) = payload.status.as_deref() {
        if EventStatus::from_str(status).is_none() {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": format!("Unknown status: {}", status)})),
            ));
        }
    }
    if let Some(max) = payload.max_participants {
        if max <= 0 {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"error": "maxParticipants must be a positive integer"})),
            ));
        }
    }

    // Merge with current values; registered_count is deliberately untouchable
    // here. The capacity condition rides along in the UPDATE so a concurrent
    // registration cannot slip an event below its own active count.
    let result = sqlx::query(
        "UPDATE events SET \
         title = COALESCE($2, title), \
         description = COALESCE($3, description), \
         date = COALESCE($4, date), \
         location = COALESCE($5, location), \
         category = COALESCE($6, category), \
         skills = COALESCE($7, skills), \
         max_participants = COALESCE($8, max_participants), \
         status = COALESCE($9, status) \
         WHERE id = $1 \
         AND (COALESCE($8, max_participants) IS NULL \
              OR COALESCE($8, max_participants) >= registered_count)",
    )
    .bind(event_uuid)
    .bind(payload.title.as_deref().map(str::trim))
    .bind(payload.description.as_deref().map(str::trim))
    .bind(payload.date)
    .bind(payload.location.as_deref().map(str::trim))
    .bind(payload.category.as_deref())
    .bind(payload.skills.as_deref())
    .bind(payload.max_participants)
    .bind(payload.status.as_deref())
    .execute(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("Error updating event: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to update event"})),
        )
    })?;

    if result.rows_affected() == 0 {
        return Err((
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "maxParticipants cannot be lower than the current number of registrations"})),
        ));
    }

    let event = sqlx::query_as::<_, EventResponse>(&format!(
        "SELECT {} FROM events WHERE id = $1",
        EVENT_COLUMNS
    ))
    .bind(event_uuid)
    .fetch_one(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("Error re-reading event: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Database error"})),
        )
    })?;

    Ok(Json(event))
}

pub async fn delete_event(
    Path(event_id): Path<String>,
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> Result<(StatusCode, Json<serde_json::Value>), (StatusCode, Json<serde_json::Value>)> {
    if !auth_user.role.can_manage_events() {
        return Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "Access denied"})),
        ));
    }

    let event_uuid = parse_uuid(&event_id, "event id").map_err(|msg| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": msg})),
        )
    })?;

    let organizer_id = fetch_organizer(&state, event_uuid).await?;
    if organizer_id != auth_user.user_id && auth_user.role != Role::Admin {
        return Err((
            StatusCode::FORBIDDEN,
            Json(serde_json::json!({"error": "Access denied"})),
        ));
    }

    // Registration entries keep referencing their event forever (no cascade),
    // so an event with any entries cannot be removed.
    let result = sqlx::query(
        "DELETE FROM events WHERE id = $1 \
         AND NOT EXISTS (SELECT 1 FROM registrations WHERE event_id = $1)",
    )
    .bind(event_uuid)
    .execute(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("Error deleting event: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to delete event"})),
        )
    })?;

    if result.rows_affected() == 0 {
        return Err((
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "Event has registrations and cannot be deleted"})),
        ));
    }

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({"message": "Event deleted"})),
    ))
}
