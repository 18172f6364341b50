//! HTTP client for the external skill-extraction/recommendation service.
//! Pure relay: requests are forwarded, responses returned unchanged, and any
//! transport failure, timeout, or non-success status collapses into
//! `UpstreamUnavailable` so callers never hang on the collaborator.

use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct MlServiceClient {
    client: Client,
    base_url: String,
}

impl MlServiceClient {
    pub fn new(base_url: String, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create HTTP client: {}", e))?;

        Ok(Self { client, base_url })
    }

    /// POST /extract-skills on the ML service. The collaborator's response
    /// body (its parsed skill data) is relayed as-is.
    pub async fn extract_skills(&self, resume_text: &str) -> Result<Value, ApiError> {
        let url = format!("{}/extract-skills", self.base_url);
        let body = serde_json::json!({ "resume_text": resume_text });
        self.relay(&url, &body).await
    }

    /// POST /recommend-events on the ML service. Skills and the target user
    /// are forwarded; the ranked recommendation list comes back unchanged.
    pub async fn recommend_events(
        &self,
        skills: &[String],
        user_id: &str,
    ) -> Result<Value, ApiError> {
        let url = format!("{}/recommend-events", self.base_url);
        let body = serde_json::json!({ "skills": skills, "user_id": user_id });
        self.relay(&url, &body).await
    }

    async fn relay(&self, url: &str, body: &Value) -> Result<Value, ApiError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("ML service unreachable at {}: {:?}", url, e);
                ApiError::UpstreamUnavailable
            })?;

        if !response.status().is_success() {
            tracing::warn!("ML service returned {} for {}", response.status(), url);
            return Err(ApiError::UpstreamUnavailable);
        }

        response.json().await.map_err(|e| {
            tracing::warn!("ML service sent an unreadable body for {}: {:?}", url, e);
            ApiError::UpstreamUnavailable
        })
    }
}
