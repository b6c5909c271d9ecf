use std::sync::Arc;
use uuid::Uuid;

use crate::core::store::{NotificationSink, NotifyError};
use crate::services::{PostgresClient, RealtimeClient};

/// Notification sink backed by the notifications table plus the realtime
/// gateway
///
/// The persisted record is the one that matters; the realtime push is a
/// best-effort extra for users with a live connection, so a push failure is
/// logged and does not fail the notification.
pub struct Notifier {
    postgres: Arc<PostgresClient>,
    realtime: Option<Arc<RealtimeClient>>,
}

impl Notifier {
    pub fn new(postgres: Arc<PostgresClient>, realtime: Option<Arc<RealtimeClient>>) -> Self {
        Self { postgres, realtime }
    }
}

impl NotificationSink for Notifier {
    async fn notify(
        &self,
        user_id: Uuid,
        title: &str,
        message: &str,
        match_id: Uuid,
    ) -> Result<(), NotifyError> {
        self.postgres
            .create_notification(user_id, title, message, match_id)
            .await
            .map_err(|e| NotifyError(e.to_string()))?;

        if let Some(realtime) = &self.realtime {
            if let Err(e) = realtime
                .push_match_event(user_id, "roommate_match", match_id, message)
                .await
            {
                tracing::warn!(user_id = %user_id, "Realtime push failed: {}", e);
            }
        }

        Ok(())
    }
}
