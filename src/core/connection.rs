use std::sync::Arc;

use crate::core::error::EngineError;
use crate::models::{ConnectionStatus, LikeOutcome};
use crate::services::notifier::{Notification, NotificationKind, NotificationSink};
use crate::services::store::{EdgeKind, RelationStore};

/// Resolves and transitions the relationship state of viewer/target pairs
///
/// A pair moves through none -> liked -> matched. "Matched" is never stored:
/// it is derived from the two directed like edges on every read, so there is
/// no separate record that could drift out of sync. A block in either
/// direction is an absolute gate checked before anything else; it hides all
/// like/match state from both parties without deleting the underlying edges.
pub struct RelationshipEngine {
    store: Arc<dyn RelationStore>,
    notifier: Arc<dyn NotificationSink>,
}

impl RelationshipEngine {
    pub fn new(store: Arc<dyn RelationStore>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self { store, notifier }
    }

    async fn blocked_either_direction(&self, a: &str, b: &str) -> Result<bool, EngineError> {
        Ok(self.store.edge_exists(EdgeKind::Blocks, a, b).await?
            || self.store.edge_exists(EdgeKind::Blocks, b, a).await?)
    }

    /// Compute the connection status of `target` as seen by `viewer`.
    ///
    /// Fails with `EngineError::Blocked` when a block is active in either
    /// direction, before any like state is read, so a blocked caller learns
    /// nothing about the pair.
    pub async fn resolve(
        &self,
        viewer_id: &str,
        target_id: &str,
    ) -> Result<ConnectionStatus, EngineError> {
        if self.blocked_either_direction(viewer_id, target_id).await? {
            return Err(EngineError::Blocked);
        }

        let liked = self
            .store
            .edge_exists(EdgeKind::Likes, viewer_id, target_id)
            .await?;
        let liked_back = self
            .store
            .edge_exists(EdgeKind::Likes, target_id, viewer_id)
            .await?;

        Ok(ConnectionStatus {
            target_id: target_id.to_string(),
            matched: liked && liked_back,
            liked,
            liked_back,
        })
    }

    /// Record that `from` likes `to`.
    ///
    /// `has_main_photo` is supplied by the caller: whether the liking user
    /// currently has a photo in slot 0. Liking twice is a successful no-op
    /// that emits nothing. A newly created edge emits exactly one event:
    /// "match" when the reverse edge exists, "like" otherwise.
    pub async fn like(
        &self,
        from_id: &str,
        to_id: &str,
        has_main_photo: bool,
    ) -> Result<LikeOutcome, EngineError> {
        if from_id == to_id {
            return Err(EngineError::Validation("cannot like yourself".to_string()));
        }
        if self.blocked_either_direction(from_id, to_id).await? {
            return Err(EngineError::Blocked);
        }
        if !has_main_photo {
            return Err(EngineError::RequirementNotMet(
                "a main photo is required before liking".to_string(),
            ));
        }

        let created = self
            .store
            .set_edge(EdgeKind::Likes, from_id, to_id, true)
            .await?;

        // Re-read the reverse edge after our write has landed. Two users
        // liking each other in the same instant must not both miss the match
        // because of a read taken before the writes.
        let liked_back = self
            .store
            .edge_exists(EdgeKind::Likes, to_id, from_id)
            .await?;

        if created {
            if liked_back {
                // One event per pair transition, fanned out to both sides by
                // the sink, not one per edge write.
                self.notifier
                    .notify(Notification::new(NotificationKind::Match, from_id, to_id));
                tracing::info!("pair matched: {} <-> {}", from_id, to_id);
            } else {
                self.notifier
                    .notify(Notification::new(NotificationKind::Like, from_id, to_id));
                tracing::debug!("like recorded: {} -> {}", from_id, to_id);
            }
        }

        Ok(LikeOutcome {
            matched: liked_back,
        })
    }

    /// Remove `from`'s like of `to`, if present. Idempotent.
    ///
    /// Demoting a matched pair requires no dedicated event; an "unlike" is
    /// emitted only when an edge was actually removed.
    pub async fn unlike(&self, from_id: &str, to_id: &str) -> Result<(), EngineError> {
        let removed = self
            .store
            .set_edge(EdgeKind::Likes, from_id, to_id, false)
            .await?;

        if removed {
            self.notifier
                .notify(Notification::new(NotificationKind::Unlike, from_id, to_id));
            tracing::debug!("like removed: {} -> {}", from_id, to_id);
        }

        Ok(())
    }

    /// Record that `from` blocks `to`. Idempotent.
    ///
    /// Existing like edges stay in place; they are simply unreachable through
    /// `resolve` while the block is active.
    pub async fn block(&self, from_id: &str, to_id: &str) -> Result<(), EngineError> {
        if from_id == to_id {
            return Err(EngineError::Validation("cannot block yourself".to_string()));
        }

        self.store
            .set_edge(EdgeKind::Blocks, from_id, to_id, true)
            .await?;
        tracing::info!("block recorded: {} -> {}", from_id, to_id);

        Ok(())
    }
}
