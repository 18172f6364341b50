use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::Role;
use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub exp: usize,
}

/// The caller identity every protected operation receives. The token is the
/// identity; no database round-trip happens here.
#[derive(Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    #[allow(dead_code)] // Reserved for future use (e.g., logging, user info display)
    pub email: String,
    pub role: Role,
}

pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // Health, signup/login, and the read-only event catalog are public.
    let path = req.uri().path();
    let is_public_catalog_read = req.method() == Method::GET
        && (path == "/api/events" || path.starts_with("/api/events/"));
    if path == "/health" || path.starts_with("/api/auth/") || is_public_catalog_read {
        return Ok(next.run(req).await);
    }

    /// 401 with clear code so client only logs out when server explicitly says auth declined (not on network errors).
    fn auth_declined_response() -> Response {
        let body = serde_json::json!({
            "code": "SKILLSPHERE_AUTH_DECLINED",
            "message": "Authentication required or session invalid"
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }

    // Extract token from Authorization header
    let auth_header = match req.headers().get(AUTHORIZATION).and_then(|h| h.to_str().ok()) {
        Some(h) => h,
        None => return Ok(auth_declined_response()),
    };

    if !auth_header.starts_with("Bearer ") {
        return Ok(auth_declined_response());
    }

    let token = &auth_header[7..]; // Skip "Bearer "

    // Decode and validate JWT
    let decoding_key = DecodingKey::from_secret(state.config.jwt_secret.as_ref());
    let validation = Validation::new(Algorithm::HS256);

    let token_data = match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(d) => d,
        Err(_) => return Ok(auth_declined_response()),
    };

    let claims = token_data.claims;

    let user_id = match Uuid::parse_str(&claims.user_id) {
        Ok(u) => u,
        Err(_) => return Ok(auth_declined_response()),
    };

    let role = match Role::from_str(&claims.role) {
        Some(r) => r,
        None => return Ok(auth_declined_response()),
    };

    // Attach caller identity to request
    let auth_user = AuthUser {
        user_id,
        email: claims.email,
        role,
    };
    req.extensions_mut().insert(auth_user);

    Ok(next.run(req).await)
}
