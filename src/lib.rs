#![forbid(unsafe_code)]

pub mod adapters;
pub mod app;
pub mod commands;
pub mod domain;
pub mod infrastructure;
pub mod ports;

use std::time::Duration;

use anyhow::Context;

use app::AppController;

/// Run the operator console until the operator quits.
///
/// Everything runs on one thread: backend calls are tasks on a current-thread
/// runtime and complete in whatever order the backend answers.
pub fn run() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let result = runtime.block_on(async {
        let controller = AppController::new().context("Failed to initialize application")?;
        infrastructure::terminal::run_shell(&controller)
            .await
            .context("Terminal session failed")
    });

    // A pending stdin read or a hung backend call must not keep the process alive.
    runtime.shutdown_timeout(Duration::from_millis(200));
    result
}
