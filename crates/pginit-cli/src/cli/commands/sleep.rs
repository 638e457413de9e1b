//! `pginit sleep` – do nothing but sleep. For Docker testing.

use std::time::Duration;

use anyhow::Result;

pub async fn run_sleep(sleep_time_in_seconds: u64) -> Result<()> {
    if sleep_time_in_seconds > 0 {
        tracing::info!(seconds = sleep_time_in_seconds, "sleeping");
        tokio::time::sleep(Duration::from_secs(sleep_time_in_seconds)).await;
    } else {
        loop {
            tracing::info!("sleeping infinitely");
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
    }
    Ok(())
}
