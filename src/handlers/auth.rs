use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::middleware::auth::Claims;
use crate::models::Role;
use crate::AppState;

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>, // "student" (default) or "organizer"
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

// Generate JWT token carrying the caller identity {user_id, role}
pub fn generate_jwt_token(
    user_id: &Uuid,
    email: &str,
    role: Role,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + Duration::seconds(expiration_secs as i64)).timestamp() as usize;
    let claims = Claims {
        user_id: user_id.to_string(),
        email: email.to_string(),
        role: role.as_str().to_string(),
        exp,
    };

    let header = Header::new(Algorithm::HS256);
    let encoding_key = EncodingKey::from_secret(secret.as_ref());
    encode(&header, &claims, &encoding_key)
}

/// Public signup: create account and return auth (auto sign-in).
/// The role may be student or organizer; admin is never self-assignable.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<serde_json::Value>)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Name is required"})),
        ));
    }

    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "A valid email is required"})),
        ));
    }

    if payload.password.len() < 8 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Password must be at least 8 characters"})),
        ));
    }

    let role = match payload.role.as_deref() {
        None => Role::Student,
        Some(s) => match Role::from_str(s) {
            Some(Role::Admin) | None => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({"error": "Role must be 'student' or 'organizer'"})),
                ));
            }
            Some(r) => r,
        },
    };

    let existing = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)"
    )
    .bind(&email)
    .fetch_one(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("signup: check existing: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Database error"})),
        )
    })?;

    if existing {
        return Err((
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": "An account with this email already exists"})),
        ));
    }

    let password_hash = hash(&payload.password, DEFAULT_COST)
        .map_err(|e| {
            tracing::error!("signup: hash: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Failed to create account"})),
            )
        })?;

    let user_id = Uuid::new_v4();

    sqlx::query(
        "INSERT INTO users (id, name, email, password_hash, role, created_at) VALUES ($1, $2, $3, $4, $5, $6)"
    )
    .bind(user_id)
    .bind(name)
    .bind(&email)
    .bind(&password_hash)
    .bind(role.as_str())
    .bind(Utc::now())
    .execute(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("signup: insert: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to create account"})),
        )
    })?;

    let token = generate_jwt_token(
        &user_id,
        &email,
        role,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )
    .map_err(|e| {
        tracing::error!("signup: jwt: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to create account"})),
        )
    })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user_id: user_id.to_string(),
            name: name.to_string(),
            email,
            role: role.as_str().to_string(),
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<serde_json::Value>)> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Email is required"})),
        ));
    }
    if payload.password.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Password is required"})),
        ));
    }

    let user = sqlx::query_as::<_, (Uuid, String, String, String, String)>(
        "SELECT id, name, email, password_hash, role FROM users WHERE email = $1 LIMIT 1"
    )
    .bind(&email)
    .fetch_optional(&*state.db_pool)
    .await
    .map_err(|e| {
        tracing::error!("login: fetch user: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Database error"})),
        )
    })?;

    // Uniform rejection for unknown email and bad password.
    let declined = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(serde_json::json!({
                "code": "SKILLSPHERE_AUTH_DECLINED",
                "message": "Invalid email or password"
            })),
        )
    };

    let (user_id, name, email, password_hash, role) = match user {
        Some(u) => u,
        None => return Err(declined()),
    };

    let valid = verify(&payload.password, &password_hash)
        .map_err(|e| {
            tracing::error!("login: verify password: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Authentication error"})),
            )
        })?;

    if !valid {
        return Err(declined());
    }

    let role = Role::from_str(&role).ok_or_else(|| {
        tracing::error!("login: unknown role in storage: {}", role);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Authentication error"})),
        )
    })?;

    let token = generate_jwt_token(
        &user_id,
        &email,
        role,
        &state.config.jwt_secret,
        state.config.jwt_expiration,
    )
    .map_err(|e| {
        tracing::error!("login: jwt: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": "Failed to generate token"})),
        )
    })?;

    Ok((
        StatusCode::OK,
        Json(AuthResponse {
            token,
            user_id: user_id.to_string(),
            name,
            email,
            role: role.as_str().to_string(),
        }),
    ))
}
