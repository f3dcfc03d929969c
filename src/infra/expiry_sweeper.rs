use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info};

use crate::use_cases::subscription::SubscriptionUseCases;

/// Background loop that time-expires stale active subscriptions. Spawned
/// once from `main`; external scheduling is out of scope.
pub async fn run_expiry_sweep_loop(
    subscription_uc: Arc<SubscriptionUseCases>,
    interval_secs: u64,
    batch_size: i64,
) {
    let mut ticker = interval(Duration::from_secs(interval_secs));

    info!(
        "Expiry sweeper started (sweeping every {}s, batches of {})",
        interval_secs, batch_size
    );

    loop {
        ticker.tick().await;
        sweep_once(&subscription_uc, batch_size).await;
    }
}

async fn sweep_once(subscription_uc: &SubscriptionUseCases, batch_size: i64) {
    let mut expired_total: u64 = 0;

    // Bounded batches keep lock time on the hot table short; a short batch
    // means the backlog is drained for this pass.
    loop {
        match subscription_uc
            .expire_due_batch(Utc::now(), batch_size)
            .await
        {
            Ok(expired) => {
                expired_total += expired;
                if expired < batch_size as u64 {
                    break;
                }
            }
            Err(err) => {
                error!(error = %err, "Expiry sweep batch failed");
                break;
            }
        }
    }

    if expired_total > 0 {
        info!(count = expired_total, "Expired due subscriptions");
    }
}
