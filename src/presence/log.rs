use async_trait::async_trait;

use super::status::StatusRecord;
use super::traits::{ApplicationId, EventHandlers, PresenceProvider};
use crate::error::PresenceError;

/// Dry-run provider: writes the announcement to the log instead of the service
#[derive(Debug, Default)]
pub struct LogPresence {
    app_id: Option<ApplicationId>,
}

impl LogPresence {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PresenceProvider for LogPresence {
    fn name(&self) -> &'static str {
        "Log"
    }

    async fn connect(
        &mut self,
        app_id: ApplicationId,
        handlers: EventHandlers,
    ) -> Result<(), PresenceError> {
        tracing::info!("[dry run] would connect as application {}", app_id);
        self.app_id = Some(app_id);
        handlers.on_ready("dry run");
        Ok(())
    }

    async fn publish(&mut self, record: &StatusRecord) -> Result<(), PresenceError> {
        tracing::info!(
            state = record.state(),
            details = record.details(),
            large_image_key = record.large_image_key().unwrap_or(""),
            large_image_text = record.large_image_text(),
            party_id = record.party_id(),
            has_join_secret = !record.join_secret().is_empty(),
            "[dry run] would publish status"
        );
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), PresenceError> {
        if let Some(app_id) = self.app_id.take() {
            tracing::info!("[dry run] would disconnect application {}", app_id);
        }
        Ok(())
    }
}
