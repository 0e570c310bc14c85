//! crates/scando_core/src/preferences.rs
//!
//! Persisted user flags: the mocked subscription and the notification opt-in.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::ports::KeyValueStore;

pub const SUBSCRIPTION_KEY: &str = "scando_pro";
pub const NOTIFICATIONS_KEY: &str = "scando_notifications";

pub struct Preferences {
    subscribed: bool,
    notifications_enabled: bool,
    storage: Arc<dyn KeyValueStore>,
}

impl Preferences {
    /// Reads both flags. Anything other than a stored `true` reads as `false`.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let subscribed = read_flag(storage.as_ref(), SUBSCRIPTION_KEY);
        let notifications_enabled = read_flag(storage.as_ref(), NOTIFICATIONS_KEY);
        Self {
            subscribed,
            notifications_enabled,
            storage,
        }
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn activate_subscription(&mut self) {
        if !self.subscribed {
            info!("Subscription activated.");
        }
        self.subscribed = true;
        write_flag(self.storage.as_ref(), SUBSCRIPTION_KEY, true);
    }

    /// Interprets the query string the payment page redirects back with.
    ///
    /// Returns `true` when it signalled success and the subscription is now active.
    pub fn handle_checkout_return(&mut self, query: &str) -> bool {
        if checkout_succeeded(query) {
            self.activate_subscription();
            true
        } else {
            false
        }
    }

    pub fn notifications_enabled(&self) -> bool {
        self.notifications_enabled
    }

    pub fn set_notifications_enabled(&mut self, enabled: bool) {
        self.notifications_enabled = enabled;
        write_flag(self.storage.as_ref(), NOTIFICATIONS_KEY, enabled);
    }
}

/// `success=true` or `payment=success` anywhere in the query marks a paid return.
pub fn checkout_succeeded(query: &str) -> bool {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .any(|(key, value)| {
            matches!(
                (key.trim(), value.trim().to_ascii_lowercase().as_str()),
                ("success", "true") | ("payment", "success")
            )
        })
}

fn read_flag(storage: &dyn KeyValueStore, key: &str) -> bool {
    match storage.get(key) {
        Ok(Some(value)) => match serde_json::from_str::<bool>(&value) {
            Ok(flag) => flag,
            Err(e) => {
                warn!("Ignoring malformed flag '{}': {}", key, e);
                false
            }
        },
        Ok(None) => false,
        Err(e) => {
            warn!("Failed to read flag '{}': {}", key, e);
            false
        }
    }
}

fn write_flag(storage: &dyn KeyValueStore, key: &str, value: bool) {
    if let Err(e) = storage.set(key, if value { "true" } else { "false" }) {
        error!("Failed to persist flag '{}': {}", key, e);
    }
}
