//! `pginit docker-acceptance-test` – log entry and exit only.

use anyhow::Result;

use pginit_core::settings::Settings;

pub fn run_docker_acceptance_test(settings: &Settings) -> Result<()> {
    tracing::info!(settings = %settings.log_view(), "enter docker-acceptance-test");
    tracing::info!("exit docker-acceptance-test");
    Ok(())
}
