//! Built-in subscriber that logs every event through `tracing`.

use async_trait::async_trait;

use super::event::Event;
use super::subscribe::Subscribe;

/// Logs session events at debug/info/error levels.
///
/// Attach with [`Bus::attach`](super::Bus::attach) for development and
/// debugging; production embeddings typically implement their own
/// [`Subscribe`] for structured export.
pub struct EventLogger;

#[async_trait]
impl Subscribe for EventLogger {
    async fn on_event(&self, event: &Event) {
        match event {
            Event::Registered { framework_id, master } => {
                tracing::info!(%framework_id, master = %master.id, "registered");
            }
            Event::Disconnected => {
                tracing::warn!("disconnected from master");
            }
            Event::MasterError { message } => {
                tracing::error!(error = %message, "master error");
            }
            Event::Offers { offers } => {
                tracing::debug!(count = offers.len(), "offers received");
            }
            Event::TaskUpdate { task_id, state, message } => {
                tracing::debug!(%task_id, ?state, status = message.as_deref(), "task update");
            }
        }
    }

    fn name(&self) -> &'static str {
        "event-logger"
    }
}
