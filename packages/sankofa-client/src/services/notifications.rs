use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::api::SankofaApi;
use crate::types::Notification;

/// Member notifications. Every operation here is best-effort: failures are
/// logged and the local view is served or updated anyway.
pub struct NotificationService {
    api: Arc<dyn SankofaApi>,
    cache: RwLock<Option<Vec<Notification>>>,
}

impl NotificationService {
    pub fn new(api: Arc<dyn SankofaApi>) -> Self {
        Self {
            api,
            cache: RwLock::new(None),
        }
    }

    pub async fn notifications(&self, force_refresh: bool) -> Vec<Notification> {
        if !force_refresh {
            if let Some(cached) = self.cache.read().await.as_ref() {
                return cached.clone();
            }
        }

        match self.api.list_notifications().await {
            Ok(raw) => {
                let notifications: Vec<Notification> =
                    raw.into_iter().map(Notification::from).collect();
                debug!(count = notifications.len(), "Fetched notifications");
                *self.cache.write().await = Some(notifications.clone());
                notifications
            }
            Err(e) => {
                warn!(error = %e, "Failed to fetch notifications");
                self.cache
                    .write()
                    .await
                    .get_or_insert_with(Vec::new)
                    .clone()
            }
        }
    }

    pub async fn mark_as_read(&self, id: &str) {
        if let Err(e) = self.api.mark_notification_read(id).await {
            warn!(notification_id = id, error = %e, "Failed to mark notification read");
        }

        if let Some(notifications) = self.cache.write().await.as_mut() {
            for notification in notifications.iter_mut().filter(|n| n.id == id) {
                notification.read = true;
            }
        }
    }

    pub async fn mark_all_as_read(&self) {
        if let Err(e) = self.api.mark_all_notifications_read().await {
            warn!(error = %e, "Failed to mark all notifications read");
        }

        if let Some(notifications) = self.cache.write().await.as_mut() {
            for notification in notifications.iter_mut() {
                notification.read = true;
            }
        }
    }

    /// Unread notifications in the cache; 0 before the first fetch.
    pub async fn unread_count(&self) -> usize {
        self.cache
            .read()
            .await
            .as_ref()
            .map_or(0, |notifications| notifications.iter().filter(|n| !n.read).count())
    }

    pub async fn clear_cache(&self) {
        self.cache.write().await.take();
    }
}
