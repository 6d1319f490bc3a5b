use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use tripnezt_relay::CloudApiClient;
use tripnezt_store::MessageRepository;

/// How often the delivery log is reconciled with the Cloud API.
const SYNC_INTERVAL: Duration = Duration::from_secs(300);

/// Batch size per sync pass.
const SYNC_BATCH: i64 = 100;

/// Periodically refresh the status of messages still marked `sent`.
///
/// Runs for the lifetime of the process; skips a pass entirely when the
/// WhatsApp credentials are not configured.
pub async fn start_message_status_worker(
    gateway: Arc<CloudApiClient>,
    messages: Arc<MessageRepository>,
) {
    let mut ticker = tokio::time::interval(SYNC_INTERVAL);

    info!("Message status sync worker started");

    loop {
        ticker.tick().await;

        if !gateway.is_configured() {
            continue;
        }

        let pending = match messages.list_pending_sync(SYNC_BATCH).await {
            Ok(pending) => pending,
            Err(e) => {
                error!("Failed to load pending messages: {}", e);
                continue;
            }
        };

        for row in pending {
            match gateway.message_status(&row.message_id).await {
                Ok(status) if status != row.status && status != "unknown" => {
                    if let Err(e) = messages.update_status(row.id, &status).await {
                        error!("Failed to update message {}: {}", row.id, e);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::debug!("Failed to sync message {}: {}", row.message_id, e);
                }
            }
        }
    }
}
