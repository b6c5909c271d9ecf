use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors from the realtime gateway client
#[derive(Debug, Error)]
pub enum RealtimeError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Gateway returned error: {0}")]
    GatewayError(String),
}

/// Client for the UniNest socket gateway
///
/// Pushes match events to users with a live connection. Delivery is best
/// effort: the gateway drops events for users who are not connected, and
/// callers treat any error here as non-fatal.
pub struct RealtimeClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl RealtimeClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            api_key,
            client,
        }
    }

    /// Emit a match event to a user's live connection, if any
    pub async fn push_match_event(
        &self,
        user_id: Uuid,
        event: &str,
        match_id: Uuid,
        message: &str,
    ) -> Result<(), RealtimeError> {
        let url = format!("{}/internal/emit", self.base_url.trim_end_matches('/'));

        let payload = serde_json::json!({
            "userId": user_id,
            "event": event,
            "payload": {
                "matchId": match_id,
                "message": message,
            },
        });

        let response = self
            .client
            .post(&url)
            .header("X-Internal-Key", &self.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RealtimeError::GatewayError(format!(
                "Failed to push event: {}",
                response.status()
            )));
        }

        tracing::debug!(user_id = %user_id, event, "Realtime event pushed");

        Ok(())
    }
}
