//! Prompt notification delivery.

use async_trait::async_trait;
use uuid::Uuid;

use moodcast_core::types::{ContextSnapshot, VibeProfile};

use crate::error::NotifyError;

/// Delivers a "your queue is ready" prompt to the user.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Returns the notification id, or `None` when nothing was shown
    /// (e.g. notification permission not granted).
    async fn notify(
        &self,
        vibe: &VibeProfile,
        context: &ContextSnapshot,
    ) -> Result<Option<String>, NotifyError>;
}

/// Notifier that writes prompts to the log instead of a system tray.
#[derive(Debug, Clone)]
pub struct LogNotifier {
    permission_granted: bool,
}

impl LogNotifier {
    pub fn new(permission_granted: bool) -> Self {
        Self { permission_granted }
    }
}

impl Default for LogNotifier {
    fn default() -> Self {
        Self::new(true)
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(
        &self,
        vibe: &VibeProfile,
        context: &ContextSnapshot,
    ) -> Result<Option<String>, NotifyError> {
        if !self.permission_granted {
            tracing::debug!(vibe = vibe.id, "Notification permission not granted");
            return Ok(None);
        }

        let id = Uuid::new_v4().to_string();
        tracing::info!(
            notification_id = %id,
            title = %vibe.label,
            time_bucket = %context.time_bucket,
            "Notification shown"
        );
        Ok(Some(id))
    }
}
