//! Gateway event router
//!
//! Routes decoded events to the services. Events naming the same member
//! or the same post are serialized through small lock maps so a burst of
//! gateway frames cannot interleave archive writes for one entity.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use gram_core::events::{
    GatewayEvent, MemberProfileUpdatedEvent, MembershipSnapshotEvent, PostCreatedEvent,
    PostDeletedEvent, PostEditedEvent, ReactionAddedEvent, ReactionClearedAllEvent,
    ReactionClearedOneEvent, ReactionRemovedEvent,
};
use gram_core::{Snowflake, FAILURE_EMOJI};
use gram_service::services::{
    notice, EditOutcome, IngestOutcome, LevelService, PostService, ProfileService,
    ReconcileService, RejectionReason, TagService,
};
use gram_service::{ServiceContext, ServiceError, ServiceResult};

/// Dispatches gateway events to the service layer
#[derive(Clone)]
pub struct EventRouter {
    ctx: ServiceContext,
    user_locks: Arc<DashMap<Snowflake, Arc<Mutex<()>>>>,
    post_locks: Arc<DashMap<Snowflake, Arc<Mutex<()>>>>,
}

impl EventRouter {
    #[must_use]
    pub fn new(ctx: ServiceContext) -> Self {
        Self {
            ctx,
            user_locks: Arc::new(DashMap::new()),
            post_locks: Arc::new(DashMap::new()),
        }
    }

    /// Route one event; failures are logged, never propagated
    pub async fn handle(&self, event: GatewayEvent) {
        let kind = event.event_type();
        debug!(event = kind, "Routing event");

        // Lock order is fixed (member, then post) so concurrent handlers
        // cannot deadlock
        let member_mutex = event.user_id().map(|id| self.lock_for(&self.user_locks, id));
        let post_mutex = event.post_id().map(|id| self.lock_for(&self.post_locks, id));
        let _member_guard = match &member_mutex {
            Some(mutex) => Some(mutex.lock().await),
            None => None,
        };
        let _post_guard = match &post_mutex {
            Some(mutex) => Some(mutex.lock().await),
            None => None,
        };

        let result = match event {
            GatewayEvent::PostCreated(event) => self.on_post_created(event).await,
            GatewayEvent::PostEdited(event) => self.on_post_edited(event).await,
            GatewayEvent::PostDeleted(event) => self.on_post_deleted(event).await,
            GatewayEvent::ReactionAdded(event) => self.on_reaction_added(event).await,
            GatewayEvent::ReactionRemoved(event) => self.on_reaction_removed(event).await,
            GatewayEvent::ReactionClearedOne(event) => self.on_reaction_cleared_one(event).await,
            GatewayEvent::ReactionClearedAll(event) => self.on_reaction_cleared_all(event).await,
            GatewayEvent::MemberProfileUpdated(event) => {
                self.on_member_profile_updated(event).await
            }
            GatewayEvent::MembershipSnapshot(event) => self.on_membership_snapshot(event).await,
        };

        if let Err(error) = result {
            error!(event = kind, %error, "Event handler failed");
        }
    }

    fn lock_for(
        &self,
        locks: &DashMap<Snowflake, Arc<Mutex<()>>>,
        id: Snowflake,
    ) -> Arc<Mutex<()>> {
        locks.entry(id).or_default().clone()
    }

    async fn on_post_created(&self, event: PostCreatedEvent) -> ServiceResult<()> {
        let posts = PostService::new(&self.ctx);
        match posts.ingest(&event).await {
            Ok(IngestOutcome::Archived(outcome)) => {
                if let Err(error) = posts.announce(&event, &outcome).await {
                    warn!(post_id = %event.post_id, %error, "Announcement failed");
                }
                if outcome.event.changes_level() {
                    let levels = LevelService::new(&self.ctx);
                    if let Err(error) = levels.sync_after_post(&event.author, &outcome).await {
                        warn!(user_id = %event.author.id, %error, "Level sync failed");
                    }
                }
                Ok(())
            }
            Ok(IngestOutcome::AlreadyArchived) => {
                debug!(post_id = %event.post_id, "Post already archived");
                Ok(())
            }
            Err(ServiceError::Rejected(reason)) => {
                info!(post_id = %event.post_id, %reason, "Post rejected");
                self.reject(event.channel_id, event.post_id, event.author.id, reason)
                    .await;
                Ok(())
            }
            Err(error) => {
                self.compensate_failure(event.channel_id, event.post_id, event.author.id)
                    .await;
                Err(error)
            }
        }
    }

    async fn on_post_edited(&self, event: PostEditedEvent) -> ServiceResult<()> {
        let posts = PostService::new(&self.ctx);
        match posts.edit(&event).await {
            Ok(EditOutcome::Edited) => {
                if let Err(error) = posts.refresh_auto_reactions(&event).await {
                    warn!(post_id = %event.post_id, %error, "Auto reaction refresh failed");
                }
                Ok(())
            }
            Ok(EditOutcome::NotArchived) => {
                debug!(post_id = %event.post_id, "Edit of a post outside the archive");
                Ok(())
            }
            Err(ServiceError::Rejected(reason)) => {
                info!(post_id = %event.post_id, %reason, "Edited post rejected");
                self.reject(event.channel_id, event.post_id, event.author.id, reason)
                    .await;
                Ok(())
            }
            Err(error) => {
                self.compensate_failure(event.channel_id, event.post_id, event.author.id)
                    .await;
                Err(error)
            }
        }
    }

    async fn on_post_deleted(&self, event: PostDeletedEvent) -> ServiceResult<()> {
        PostService::new(&self.ctx).delete(&event).await
    }

    async fn on_reaction_added(&self, event: ReactionAddedEvent) -> ServiceResult<()> {
        TagService::new(&self.ctx)
            .reaction_added(event.post_id, &event.emoji)
            .await
    }

    async fn on_reaction_removed(&self, event: ReactionRemovedEvent) -> ServiceResult<()> {
        TagService::new(&self.ctx)
            .reaction_removed(event.post_id, &event.emoji, event.remaining)
            .await
    }

    async fn on_reaction_cleared_one(&self, event: ReactionClearedOneEvent) -> ServiceResult<()> {
        TagService::new(&self.ctx)
            .reaction_cleared(event.post_id, &event.emoji)
            .await
    }

    async fn on_reaction_cleared_all(&self, event: ReactionClearedAllEvent) -> ServiceResult<()> {
        TagService::new(&self.ctx)
            .reactions_cleared_all(event.post_id)
            .await
    }

    async fn on_member_profile_updated(
        &self,
        event: MemberProfileUpdatedEvent,
    ) -> ServiceResult<()> {
        ProfileService::new(&self.ctx)
            .refresh(&event.member)
            .await
            .map(|_| ())
    }

    async fn on_membership_snapshot(&self, event: MembershipSnapshotEvent) -> ServiceResult<()> {
        let summary = ReconcileService::new(&self.ctx)
            .startup(&event.members)
            .await?;
        info!(
            members = summary.members_seen,
            revoked = summary.roles_revoked,
            "Startup reconciliation complete"
        );
        Ok(())
    }

    /// Remove a rejected post and tell the author why
    async fn reject(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        user_id: Snowflake,
        reason: RejectionReason,
    ) {
        let platform = self.ctx.platform();
        if let Err(error) = platform.delete_post(channel_id, post_id).await {
            warn!(post_id = %post_id, %error, "Could not remove rejected post");
        }
        if let Err(error) = platform
            .send_direct_message(user_id, notice::rejection_notice(reason))
            .await
        {
            warn!(user_id = %user_id, %error, "Could not notify author of rejection");
        }
    }

    /// Best-effort cleanup when archival itself failed
    ///
    /// Mirrors the rejection path but marks the post first so the author
    /// sees the bot noticed before the post disappears.
    async fn compensate_failure(
        &self,
        channel_id: Snowflake,
        post_id: Snowflake,
        user_id: Snowflake,
    ) {
        let platform = self.ctx.platform();
        if let Err(error) = platform
            .add_reaction(channel_id, post_id, FAILURE_EMOJI)
            .await
        {
            debug!(post_id = %post_id, %error, "Failure marker not added");
        }
        if let Err(error) = platform.delete_post(channel_id, post_id).await {
            debug!(post_id = %post_id, %error, "Failed post not removed");
        }
        if let Err(error) = platform
            .send_direct_message(user_id, notice::failure_notice())
            .await
        {
            debug!(user_id = %user_id, %error, "Failure notice not delivered");
        }
    }
}

// Routing behavior is exercised end to end by the pipeline integration
// tests, which drive this router over an in-memory archive and a
// recording platform.
