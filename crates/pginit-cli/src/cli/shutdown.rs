//! Signal handling: one handler, explicit context.

use std::time::Instant;

/// What the shutdown handler reports when a signal arrives. Passed in
/// explicitly so the handler itself is invocation-independent.
#[derive(Debug, Clone)]
pub struct ShutdownContext {
    pub subcommand: &'static str,
    pub started: Instant,
}

impl ShutdownContext {
    pub fn new(subcommand: &'static str) -> Self {
        Self {
            subcommand,
            started: Instant::now(),
        }
    }
}

/// Wait for SIGINT or SIGTERM in the background, log the exit with its
/// context, and leave with status 0. Interrupting the initializer is
/// clean: every run re-checks the store's state from scratch.
pub fn spawn_shutdown_handler(ctx: ShutdownContext) {
    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!(
            subcommand = ctx.subcommand,
            elapsed_seconds = ctx.started.elapsed().as_secs_f64(),
            "signal received; exiting"
        );
        std::process::exit(0);
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(err) => {
            tracing::warn!(error = %err, "cannot install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
