//! Post service
//!
//! Owns the submission lifecycle: moderation, the attachment mirror and
//! thumbnail pipeline, the transactional archival with its streak
//! transition, wholesale replacement on edit, and removal. Platform side
//! effects that must only happen after a commit (the thread, the notices,
//! the reactions) live in separate methods so the router can log their
//! failures without ever undoing an archival.

use std::path::{Path, PathBuf};

use gram_core::events::{PostCreatedEvent, PostDeletedEvent, PostEditedEvent};
use gram_core::{
    Attachment, AttachmentKind, IncomingAttachment, Post, Snowflake, StreakOutcome, SUCCESS_EMOJI,
};
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};
use super::notice;
use super::profile::ProfileService;
use super::render;
use super::streak;
use super::tag::TagService;
use super::validator;

/// What ingestion did with a submission
#[derive(Debug)]
pub enum IngestOutcome {
    /// Archived; carries the streak transition for the announcements
    Archived(StreakOutcome),
    /// The post id was already archived (redelivered event)
    AlreadyArchived,
}

/// What an edit did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Edited,
    /// The post was never archived; nothing to replace
    NotArchived,
}

/// One fetched attachment with the files written on its behalf
struct PreparedAttachment {
    attachment: Attachment,
    written: Vec<PathBuf>,
}

/// Owns the post lifecycle end to end
pub struct PostService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PostService<'a> {
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Archive an accepted submission as one unit of work
    ///
    /// Validates, mirrors the attachments and derives their thumbnails,
    /// then commits the profile, post, attachment rows, and the streak
    /// transition together. A failed commit removes every file written
    /// along the way before the error surfaces.
    #[instrument(skip(self, event), fields(post_id = %event.post_id, author_id = %event.author.id))]
    pub async fn ingest(&self, event: &PostCreatedEvent) -> ServiceResult<IngestOutcome> {
        validator::validate(&event.content, &event.attachments, &self.ctx.media().extensions)
            .map_err(ServiceError::Rejected)?;

        if self.ctx.store().find_post(event.post_id).await?.is_some() {
            debug!("Post already archived, skipping redelivery");
            return Ok(IngestOutcome::AlreadyArchived);
        }

        let prepared = self
            .prepare_attachments(event.post_id, &event.attachments, false)
            .await?;

        match self.archive(event, &prepared).await {
            Ok(outcome) => {
                info!(
                    event = outcome.event.as_str(),
                    streak = outcome.record.current_streak,
                    attachments = prepared.len(),
                    "Post archived"
                );
                Ok(IngestOutcome::Archived(outcome))
            }
            Err(error) => {
                let written: Vec<PathBuf> = prepared
                    .iter()
                    .flat_map(|item| item.written.iter().cloned())
                    .collect();
                remove_files(&written).await;
                Err(error)
            }
        }
    }

    /// Post-commit announcements for an archived submission
    ///
    /// Opens the discussion thread, posts the profile link, the streak
    /// notice, and the discussion prompt, marks the post with the success
    /// emoji, and applies the keyword auto-reactions. Failures here never
    /// undo the archival; the router logs and moves on.
    #[instrument(skip(self, event, outcome), fields(post_id = %event.post_id))]
    pub async fn announce(
        &self,
        event: &PostCreatedEvent,
        outcome: &StreakOutcome,
    ) -> ServiceResult<()> {
        let author = &event.author;
        let platform = self.ctx.platform();

        let thread_id = platform
            .create_thread(
                event.channel_id,
                event.post_id,
                &notice::thread_title(&author.display_name),
            )
            .await?;

        platform
            .send_threaded_message(
                thread_id,
                &notice::profile_link(
                    &self.ctx.bot().web_base_url,
                    &author.username,
                    &author.display_name,
                ),
            )
            .await?;
        platform
            .send_threaded_message(
                thread_id,
                &notice::streak_notice(
                    &author.display_name,
                    outcome.record.current_streak,
                    outcome.event,
                ),
            )
            .await?;
        platform
            .send_threaded_message(thread_id, &notice::discussion_prompt(&author.display_name))
            .await?;

        platform
            .add_reaction(event.channel_id, event.post_id, SUCCESS_EMOJI)
            .await?;

        TagService::new(self.ctx)
            .apply_auto_reactions(event.channel_id, event.post_id, &event.content)
            .await?;

        debug!("Announcements delivered");
        Ok(())
    }

    /// Replace an archived post's content and attachments wholesale
    ///
    /// The new attachment set displaces the old one; files no longer
    /// referenced are removed once the replacement committed. Editing a
    /// post the archive never accepted is a no-op.
    #[instrument(skip(self, event), fields(post_id = %event.post_id))]
    pub async fn edit(&self, event: &PostEditedEvent) -> ServiceResult<EditOutcome> {
        validator::validate(&event.content, &event.attachments, &self.ctx.media().extensions)
            .map_err(ServiceError::Rejected)?;

        if self.ctx.store().find_post(event.post_id).await?.is_none() {
            debug!("Edit of unarchived post, ignoring");
            return Ok(EditOutcome::NotArchived);
        }

        // Read the current rows up front so both outcomes know which
        // files belong to which version of the post
        let mut read_tx = self.ctx.store().begin().await?;
        let previous = read_tx.attachments_for_post(event.post_id).await?;
        read_tx.rollback().await?;

        let prepared = self
            .prepare_attachments(event.post_id, &event.attachments, true)
            .await?;
        let content = render::render_markdown(&event.content);

        let replaced = async {
            let mut tx = self.ctx.store().begin().await?;
            tx.delete_attachments(event.post_id).await?;
            for item in &prepared {
                tx.insert_attachment(&item.attachment).await?;
            }
            tx.update_post_content(event.post_id, &content).await?;
            tx.commit().await?;
            ServiceResult::Ok(())
        }
        .await;

        let new_paths: Vec<&str> = prepared
            .iter()
            .map(|item| item.attachment.path.as_str())
            .collect();

        match replaced {
            Ok(()) => {
                let stale: Vec<PathBuf> = previous
                    .iter()
                    .filter(|old| !new_paths.contains(&old.path.as_str()))
                    .flat_map(attachment_files)
                    .collect();
                remove_files(&stale).await;

                info!(attachments = prepared.len(), "Post edited");
                Ok(EditOutcome::Edited)
            }
            Err(error) => {
                // The old rows still stand; drop only files the old
                // version does not reference
                let old_paths: Vec<&str> =
                    previous.iter().map(|old| old.path.as_str()).collect();
                let orphaned: Vec<PathBuf> = prepared
                    .iter()
                    .filter(|item| !old_paths.contains(&item.attachment.path.as_str()))
                    .flat_map(|item| item.written.iter().cloned())
                    .collect();
                remove_files(&orphaned).await;
                Err(error)
            }
        }
    }

    /// Re-align the bot's keyword reactions with edited content
    ///
    /// Sweeps the bot's own reactions whose keyword no longer matches,
    /// then applies the current matches. Runs after the edit committed.
    pub async fn refresh_auto_reactions(&self, event: &PostEditedEvent) -> ServiceResult<()> {
        let tags = TagService::new(self.ctx);
        tags.sweep_stale_reactions(event.channel_id, event.post_id, &event.content)
            .await?;
        tags.apply_auto_reactions(event.channel_id, event.post_id, &event.content)
            .await?;
        Ok(())
    }

    /// Remove an archived post, its files, and an orphaned author profile
    ///
    /// The streak record deliberately survives; only the profile goes
    /// when its last post does. Deleting a post the archive never
    /// accepted is a no-op.
    #[instrument(skip(self, event), fields(post_id = %event.post_id))]
    pub async fn delete(&self, event: &PostDeletedEvent) -> ServiceResult<()> {
        let mut tx = self.ctx.store().begin().await?;

        let Some(post) = tx.find_post(event.post_id).await? else {
            tx.rollback().await?;
            debug!("Deletion of unarchived post, ignoring");
            return Ok(());
        };

        let attachments = tx.attachments_for_post(event.post_id).await?;
        tx.delete_post(event.post_id).await?;

        if tx.author_post_count(post.author_id).await? == 0 {
            tx.delete_profile(post.author_id).await?;
            info!(author_id = %post.author_id, "Removed profile with its last post");
        }

        tx.commit().await?;

        let files: Vec<PathBuf> = attachments.iter().flat_map(attachment_files).collect();
        remove_files(&files).await;

        info!(attachments = attachments.len(), "Post deleted");
        Ok(())
    }

    /// The transactional half of ingestion
    async fn archive(
        &self,
        event: &PostCreatedEvent,
        prepared: &[PreparedAttachment],
    ) -> ServiceResult<StreakOutcome> {
        let profiles = ProfileService::new(self.ctx);
        let avatar_path = profiles.mirror_avatar(&event.author).await;
        let profile = profiles.to_profile(&event.author, avatar_path);
        let content = render::render_markdown(&event.content);
        let today = self.ctx.today();

        let mut tx = self.ctx.store().begin().await?;
        tx.upsert_profile(&profile).await?;
        tx.insert_post(&Post::new(
            event.post_id,
            event.author.id,
            content,
            event.timestamp,
        ))
        .await?;
        for item in prepared {
            tx.insert_attachment(&item.attachment).await?;
        }
        let outcome = streak::advance(tx.as_mut(), event.author.id, today).await?;
        tx.commit().await?;

        Ok(outcome)
    }

    /// Mirror every attachment concurrently, preserving declaration order
    ///
    /// `refresh` clears previously derived files first so an edit gets
    /// fresh artifacts even when a filename repeats. On any hard failure
    /// the files of the successful siblings are removed before the first
    /// error returns.
    async fn prepare_attachments(
        &self,
        post_id: Snowflake,
        incoming: &[IncomingAttachment],
        refresh: bool,
    ) -> ServiceResult<Vec<PreparedAttachment>> {
        let mut handles: Vec<JoinHandle<ServiceResult<PreparedAttachment>>> =
            Vec::with_capacity(incoming.len());

        for item in incoming {
            let ctx = self.ctx.clone();
            let item = item.clone();
            handles.push(tokio::spawn(async move {
                prepare_one(&ctx, post_id, &item, refresh).await
            }));
        }

        let mut prepared = Vec::with_capacity(handles.len());
        let mut failure = None;

        for handle in handles {
            let result = match handle.await {
                Ok(result) => result,
                Err(error) => Err(ServiceError::internal(format!(
                    "attachment task failed: {error}"
                ))),
            };
            match result {
                Ok(item) => prepared.push(item),
                Err(error) => {
                    if failure.is_none() {
                        failure = Some(error);
                    }
                }
            }
        }

        if let Some(error) = failure {
            for item in &prepared {
                remove_files(&item.written).await;
            }
            return Err(error);
        }

        Ok(prepared)
    }
}

/// Mirror one attachment and derive its thumbnail
///
/// An unreachable source or a failed derivation degrades to an
/// artifact-less attachment row; only local I/O problems are errors.
async fn prepare_one(
    ctx: &ServiceContext,
    post_id: Snowflake,
    incoming: &IncomingAttachment,
    refresh: bool,
) -> ServiceResult<PreparedAttachment> {
    let kind = ctx.media().extensions.classify(&incoming.filename);
    let path = Path::new(&ctx.storage().attachments_dir)
        .join(format!("{post_id}_{}", incoming.filename));
    let attachment = Attachment::new(
        incoming.id,
        post_id,
        path.to_string_lossy().into_owned(),
        kind,
    );
    let mut written = Vec::new();

    if refresh {
        remove_files(&attachment_files(&attachment)).await;
    }

    let fetched = ctx.fetcher().mirror(&incoming.url, &path).await?;
    if !fetched {
        warn!(url = %incoming.url, "Attachment unreachable, archiving without artifact");
        return Ok(PreparedAttachment { attachment, written });
    }
    written.push(path.clone());

    if let Some(thumb) = attachment.thumbnail_path() {
        let thumb = PathBuf::from(thumb);
        match derive_thumbnail(ctx, kind, &path, &thumb).await {
            Ok(()) => written.push(thumb),
            Err(error) => {
                warn!(%error, path = %path.display(), "Thumbnail derivation failed");
            }
        }
    }

    Ok(PreparedAttachment { attachment, written })
}

/// Derive the 500x500-bounded thumbnail for an image or video
async fn derive_thumbnail(
    ctx: &ServiceContext,
    kind: AttachmentKind,
    source: &Path,
    thumb: &Path,
) -> ServiceResult<()> {
    match kind {
        AttachmentKind::Image => {
            let source = source.to_path_buf();
            let thumb = thumb.to_path_buf();
            spawn_derivation(move || gram_media::derive_image_thumbnail(&source, &thumb)).await
        }
        AttachmentKind::Video => {
            // First frame lands in a sidecar file so the downscale pass
            // can treat it like any image source
            let frame = PathBuf::from(format!("{}.frame.jpg", source.display()));
            gram_media::extract_first_frame(&ctx.media().ffmpeg_path, source, &frame).await?;

            let thumb_owned = thumb.to_path_buf();
            let frame_owned = frame.clone();
            let derived = spawn_derivation(move || {
                gram_media::derive_image_thumbnail(&frame_owned, &thumb_owned)?;
                gram_media::composite_play_glyph(&thumb_owned)
            })
            .await;

            remove_files(std::slice::from_ref(&frame)).await;
            derived
        }
        AttachmentKind::Audio | AttachmentKind::Unknown => Ok(()),
    }
}

/// Run a blocking image derivation off the async runtime
async fn spawn_derivation<F>(work: F) -> ServiceResult<()>
where
    F: FnOnce() -> Result<(), gram_media::MediaError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|error| ServiceError::internal(format!("derivation task failed: {error}")))??;
    Ok(())
}

/// The on-disk files belonging to an attachment row
fn attachment_files(attachment: &Attachment) -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from(&attachment.path)];
    if let Some(thumb) = attachment.thumbnail_path() {
        files.push(PathBuf::from(thumb));
    }
    files
}

/// Remove files best effort; ones already gone are fine
async fn remove_files(paths: &[PathBuf]) {
    for path in paths {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
            Err(error) => warn!(path = %path.display(), %error, "Could not remove file"),
        }
    }
}
