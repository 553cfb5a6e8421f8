//! Background reload notifier.
//!
//! Runs on the application's tokio runtime and periodically posts a notice to
//! the status line. It only ever goes through [`StatusLine`]; the screen stack
//! stays with the dispatch thread.

use crate::status::StatusLine;
use chrono::{DateTime, Local};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Text posted on every tick
pub fn reload_notice(at: DateTime<Local>) -> String {
    format!("Reload check at {}", at.format("%H:%M:%S"))
}

pub struct ReloadNotifier {
    task: JoinHandle<()>,
}

impl ReloadNotifier {
    /// Start posting notices every `period`; the first one after one period
    pub fn start(runtime: &Handle, status: StatusLine, period: Duration) -> Self {
        debug!("Starting reload notifier every {:?}", period);
        let task = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            // the first tick completes immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                let status = status.clone();
                let notice = reload_notice(Local::now());
                // set_status blocks on the surface lock while the dispatch
                // thread is polling
                if let Err(e) =
                    tokio::task::spawn_blocking(move || status.set_status(&notice)).await
                {
                    warn!("Reload notice failed: {}", e);
                }
            }
        });
        Self { task }
    }

    pub fn stop(&self) {
        self.task.abort();
    }
}

impl Drop for ReloadNotifier {
    fn drop(&mut self) {
        self.stop();
    }
}
