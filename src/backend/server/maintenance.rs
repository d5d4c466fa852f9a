/**
 * Background Maintenance
 *
 * Two periodic tasks run for the life of the server:
 *
 * - Daily: delete channels with no activity for `inactive_channel_days`.
 *   Deletion goes through `ChannelService::destroy`, so sockets still
 *   attached see `channel:deleted` and the namespace is closed.
 * - Every 5 minutes: drop namespaces nobody listens to.
 *
 * Failures are logged. A channel that fails to delete is picked up again on
 * the next tick.
 */

use std::time::Duration;

use chrono::Utc;

use crate::backend::channels::db::list_all_channels;
use crate::backend::channels::ChannelService;
use crate::backend::error::ModerationError;
use crate::backend::server::state::AppState;

const PURGE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
const PRUNE_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Delete channels whose last activity is older than `max_age`
///
/// A channel that fails to delete is logged and skipped; the rest are still
/// purged.
///
/// # Returns
///
/// Number of channels deleted
pub async fn purge_inactive_channels(
    channels: &ChannelService,
    max_age: chrono::Duration,
) -> Result<usize, ModerationError> {
    let cutoff = Utc::now() - max_age;
    let stale: Vec<_> = list_all_channels(channels.pool())
        .await?
        .into_iter()
        .filter(|channel| channel.active_at() < cutoff)
        .collect();

    let mut deleted = 0;
    for channel in &stale {
        tracing::info!(
            "[Maintenance] Deleting inactive channel '{}' (last active {})",
            channel.name,
            channel.active_at()
        );
        match channels.destroy(channel).await {
            Ok(()) => deleted += 1,
            Err(e) => tracing::error!("[Maintenance] Failed to delete '{}': {}", channel.name, e),
        }
    }

    Ok(deleted)
}

/// Spawn the periodic tasks
pub fn spawn_maintenance(state: &AppState) {
    let channels = ChannelService::new(state.db_pool.clone(), state.hub.clone());
    let max_age = chrono::Duration::days(state.config.inactive_channel_days);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            match purge_inactive_channels(&channels, max_age).await {
                Ok(0) => tracing::debug!("[Maintenance] No inactive channels"),
                Ok(count) => tracing::info!("[Maintenance] Deleted {} inactive channels", count),
                Err(e) => tracing::error!("[Maintenance] Inactive channel cleanup failed: {}", e),
            }
        }
    });

    let hub = state.hub.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            interval.tick().await;
            let pruned = hub.prune_idle();
            tracing::debug!("[Maintenance] Pruned {} idle namespaces", pruned);
        }
    });

    tracing::info!("[Maintenance] Background tasks started");
}
