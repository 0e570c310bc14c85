//! services/api/src/adapters/notifier.rs
//!
//! Implements the `NotificationService` port by emitting structured log events.
//! A push or desktop channel can replace it without touching the core.

use scando_core::ports::{NotificationService, PortResult};
use tracing::info;

#[derive(Clone, Debug, Default)]
pub struct TracingNotifier;

impl NotificationService for TracingNotifier {
    fn notify(&self, title: &str, body: &str) -> PortResult<()> {
        info!(target: "scando::notifications", title, body, "notification");
        Ok(())
    }
}
