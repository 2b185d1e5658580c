use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Observable relationship transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Match,
    Unlike,
}

/// Event payload handed to the notification sink, one per transition.
///
/// A match event covers the whole pair; the sink is responsible for
/// delivering it to both sides.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    #[serde(rename = "fromUserId")]
    pub from_user_id: String,
    #[serde(rename = "toUserId")]
    pub to_user_id: String,
}

impl Notification {
    pub fn new(kind: NotificationKind, from_user_id: &str, to_user_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            from_user_id: from_user_id.to_string(),
            to_user_id: to_user_id.to_string(),
        }
    }
}

/// Delivery seam for relationship events.
///
/// Injected into the engine rather than reached through a process-wide
/// object, so the once-per-transition contract can be asserted in tests.
/// Delivery mechanics (push, polling) are entirely the sink's concern.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Sink that publishes events to a Redis pub/sub channel.
///
/// Publishing is fire-and-forget on a background task; a delivery failure is
/// logged, never surfaced into the transition that produced the event.
pub struct RedisSink {
    client: redis::Client,
    channel: String,
}

impl RedisSink {
    pub fn new(redis_url: &str, channel: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(redis_url)?;
        Ok(Self {
            client,
            channel: channel.to_string(),
        })
    }
}

impl NotificationSink for RedisSink {
    fn notify(&self, notification: Notification) {
        let payload = match serde_json::to_string(&notification) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!("failed to serialize notification {}: {}", notification.id, e);
                return;
            }
        };

        let client = self.client.clone();
        let channel = self.channel.clone();

        tokio::spawn(async move {
            let mut conn = match client.get_multiplexed_async_connection().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::warn!("redis connection for notification failed: {}", e);
                    return;
                }
            };

            if let Err(e) = redis::cmd("PUBLISH")
                .arg(&channel)
                .arg(payload)
                .query_async::<()>(&mut conn)
                .await
            {
                tracing::warn!("failed to publish notification: {}", e);
            }
        });
    }
}

/// Sink that only logs, for running without a delivery backend
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, notification: Notification) {
        tracing::info!(
            "notification {:?}: {} -> {}",
            notification.kind,
            notification.from_user_id,
            notification.to_user_id
        );
    }
}

/// Records every event for assertions in tests
#[derive(Default)]
pub struct MemorySink {
    events: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<Notification> {
        self.events.lock().unwrap().clone()
    }

    pub fn count_of(&self, kind: NotificationKind) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|n| n.kind == kind)
            .count()
    }
}

impl NotificationSink for MemorySink {
    fn notify(&self, notification: Notification) {
        self.events.lock().unwrap().push(notification);
    }
}
