//! Side-channel hooks: background sync, push and notification clicks.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::Router;
use crate::config::NotificationDefaults;
use crate::error::{BoxError, HookError};
use crate::lifecycle::Clients;

/// Background sync tag reconciling offline favorites.
pub const SYNC_FAVORITES: &str = "sync-favorites";

/// Host-side notification display.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Displays the notification.
    async fn show(&self, notification: &Notification) -> Result<(), BoxError>;

    /// Dismisses a displayed notification.
    async fn close(&self, notification: &Notification) -> Result<(), BoxError>;
}

/// A notification built from a push payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Notification title.
    pub title: String,
    /// Notification text.
    pub body: String,
    /// Icon URL.
    pub icon: String,
    /// Badge URL.
    pub badge: String,
    /// Vibration pattern in milliseconds.
    pub vibrate: Vec<u32>,
    /// URL opened when the notification is clicked.
    pub data: String,
}

/// Payload of a push message. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    /// Title override.
    pub title: Option<String>,
    /// Body override.
    pub body: Option<String>,
    /// URL opened on click.
    pub url: Option<String>,
}

impl PushPayload {
    /// Parses a raw push payload.
    ///
    /// Missing and malformed payloads both yield an empty payload, so the
    /// notification falls back to the defaults.
    pub fn parse(data: Option<&[u8]>) -> Self {
        let Some(data) = data else {
            return PushPayload::default();
        };
        match serde_json::from_slice(data) {
            Ok(payload) => payload,
            Err(error) => {
                warn!(%error, "malformed push payload, using defaults");
                PushPayload::default()
            }
        }
    }

    /// Builds the notification, filling gaps from `defaults`.
    ///
    /// Empty strings count as missing.
    pub fn into_notification(self, defaults: &NotificationDefaults) -> Notification {
        fn or_default(value: Option<String>, default: &str) -> String {
            value
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_owned())
        }

        Notification {
            title: or_default(self.title, &defaults.title),
            body: or_default(self.body, &defaults.body),
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
            vibrate: defaults.vibrate.clone(),
            data: or_default(self.url, &defaults.url),
        }
    }
}

/// Outcome of a background sync event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The tag was recognized and its work is done.
    Completed,
    /// The tag is unknown to the router.
    Ignored,
}

/// What a notification click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    /// An open client at the URL was focused.
    Focused(String),
    /// A new window was opened at the URL.
    Opened(String),
}

impl<S, O> Router<S, O> {
    /// Handles a background sync event.
    ///
    /// Favorites reconciliation has nothing to do yet, so the favorites tag
    /// resolves immediately.
    pub async fn on_sync(&self, tag: &str) -> SyncOutcome {
        if tag == SYNC_FAVORITES {
            debug!(tag, "sync completed");
            SyncOutcome::Completed
        } else {
            debug!(tag, "ignoring unknown sync tag");
            SyncOutcome::Ignored
        }
    }

    /// Shows a notification for a push message.
    pub async fn on_push<N>(
        &self,
        notifier: &N,
        payload: Option<&[u8]>,
    ) -> Result<Notification, HookError>
    where
        N: Notifier + ?Sized,
    {
        let notification = PushPayload::parse(payload).into_notification(&self.config.notifications);
        notifier
            .show(&notification)
            .await
            .map_err(HookError::Notifier)?;
        debug!(title = %notification.title, "notification shown");
        Ok(notification)
    }

    /// Closes the notification, then focuses a client at its URL or opens one.
    pub async fn on_notification_click<N, C>(
        &self,
        notifier: &N,
        clients: &C,
        notification: &Notification,
    ) -> Result<ClickOutcome, HookError>
    where
        N: Notifier + ?Sized,
        C: Clients + ?Sized,
    {
        notifier
            .close(notification)
            .await
            .map_err(HookError::Notifier)?;

        let url = if notification.data.is_empty() {
            self.config.notifications.url.clone()
        } else {
            notification.data.clone()
        };

        if clients.focus(&url).await.map_err(HookError::Clients)? {
            return Ok(ClickOutcome::Focused(url));
        }
        clients
            .open_window(&url)
            .await
            .map_err(HookError::Clients)?;
        Ok(ClickOutcome::Opened(url))
    }
}
