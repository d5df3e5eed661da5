//! Stale-job sweeper.
//!
//! A crash mid-ingestion leaves a job stuck in `pending` or `processing`
//! with partially-applied report writes. This task periodically fails such
//! orphaned jobs so pollers eventually observe a terminal state.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info, warn};

use crate::db::DbPool;
use crate::error::AppResult;
use crate::models::JobUpdate;

/// Configuration for the sweeper.
#[derive(Clone)]
pub struct SweeperConfig {
    /// Age after which a non-terminal job counts as abandoned
    pub stale_hours: u64,
    /// How often to sweep (in seconds)
    pub interval_secs: u64,
}

/// Start the sweeper background task.
pub fn start_sweeper_task(pool: Arc<DbPool>, config: SweeperConfig) {
    tokio::spawn(async move {
        info!(
            "Starting stale-job sweeper (threshold: {} hours, interval: {} seconds)",
            config.stale_hours, config.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(config.interval_secs));

        loop {
            ticker.tick().await;

            if let Err(e) = sweep_stale_jobs(&pool, &config).await {
                error!("Stale-job sweep error: {}", e);
            }
        }
    });
}

/// Run a single sweep cycle.
async fn sweep_stale_jobs(pool: &DbPool, config: &SweeperConfig) -> AppResult<()> {
    let cutoff = Utc::now() - chrono::Duration::hours(config.stale_hours as i64);

    let stale = pool.find_stale_jobs(cutoff).await?;
    if stale.is_empty() {
        return Ok(());
    }

    info!("Found {} stale jobs to fail", stale.len());

    for job in stale {
        let update = JobUpdate::failed(
            "Ingestion interrupted; marked failed by the stale-job sweeper".to_string(),
        );
        match pool.apply_job_update(job.id, update).await {
            Ok(_) => info!("Marked stale job {} as failed", job.id),
            Err(e) => warn!("Failed to mark stale job {}: {}", job.id, e),
        }
    }

    Ok(())
}
