//! Comment thread refresh coordination

use crate::comment::{
    comments_from_records, CommentForest, CommentRecord, CommentTreeBuilder, CommentValidator,
    NewComment, TreeReport,
};
use crate::config::ThreadConfig;
use crate::error::{Result, ThreadlineError};
use crate::store::{CommentSink, CommentSource};
use crate::types::{Author, CommentId, PostId};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Handle for one in-flight fetch
///
/// Tickets are ordered by issue time. A fetch result is only installed if its
/// ticket is newer than the one behind the forest currently shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RefreshTicket {
    generation: u64,
}

impl RefreshTicket {
    /// Issue order of this ticket, starting at 1
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// The comment section of one post
///
/// Holds the last built forest and rebuilds it from scratch on every refresh.
pub struct CommentThread<S> {
    store: S,
    post_id: PostId,
    builder: CommentTreeBuilder,
    validator: CommentValidator,
    forest: CommentForest,
    report: TreeReport,
    /// Last ticket issued
    issued: u64,
    /// Ticket behind the current forest; 0 before the first fetch
    applied: u64,
    /// Tickets up to this one were issued before the last invalidation
    invalidated_at: u64,
    stale: bool,
    refreshed_at: Option<Instant>,
    refresh_interval: Duration,
}

impl<S> CommentThread<S> {
    /// Create a thread for a post with default settings
    pub fn new(store: S, post_id: PostId) -> Self {
        Self::with_config(store, post_id, &ThreadConfig::default())
    }

    /// Create a thread for a post
    pub fn with_config(store: S, post_id: PostId, config: &ThreadConfig) -> Self {
        Self {
            store,
            post_id,
            builder: CommentTreeBuilder::new(),
            validator: CommentValidator::with_max_length(config.max_comment_length),
            forest: CommentForest::new(),
            report: TreeReport::default(),
            issued: 0,
            applied: 0,
            invalidated_at: 0,
            stale: true,
            refreshed_at: None,
            refresh_interval: config.refresh_interval(),
        }
    }

    /// Post this thread belongs to
    pub fn post_id(&self) -> PostId {
        self.post_id
    }

    /// Last built forest
    pub fn forest(&self) -> &CommentForest {
        &self.forest
    }

    /// Report of the last build
    pub fn report(&self) -> &TreeReport {
        &self.report
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Check if the forest may be missing known writes
    pub fn is_stale(&self) -> bool {
        self.stale
    }

    /// Check if a fetch has ever been applied
    pub fn is_loaded(&self) -> bool {
        self.applied > 0
    }

    /// When the current forest was installed
    pub fn refreshed_at(&self) -> Option<Instant> {
        self.refreshed_at
    }

    /// Mark the forest as outdated
    pub fn invalidate(&mut self) {
        self.stale = true;
        self.invalidated_at = self.issued;
        debug!("Invalidated comment thread for post {}", self.post_id);
    }

    /// Check if a poll at `now` should fetch again
    pub fn needs_refresh(&self, now: Instant) -> bool {
        if self.stale {
            return true;
        }
        match self.refreshed_at {
            Some(at) => now.saturating_duration_since(at) >= self.refresh_interval,
            None => true,
        }
    }

    /// Issue a ticket for a fetch about to start
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket {
            generation: self.issued,
        }
    }

    /// Install the result of a fetch unless a newer one is already shown
    ///
    /// Returns `false` when the result was superseded and discarded.
    pub fn apply(&mut self, ticket: RefreshTicket, records: Vec<CommentRecord>) -> bool {
        if ticket.generation <= self.applied {
            debug!(
                "Discarding stale fetch {} for post {} (showing {})",
                ticket.generation, self.post_id, self.applied
            );
            return false;
        }

        let comments = comments_from_records(self.post_id, records);
        let (forest, report) = self.builder.build_with_report(&comments);

        self.forest = forest;
        self.report = report;
        self.applied = ticket.generation;
        self.refreshed_at = Some(Instant::now());
        if ticket.generation > self.invalidated_at {
            self.stale = false;
        }

        debug!(
            "Applied fetch {} for post {}: {} comments",
            ticket.generation,
            self.post_id,
            self.forest.len()
        );
        true
    }
}

impl<S: CommentSource> CommentThread<S> {
    /// Fetch the post's comments and rebuild the forest
    ///
    /// On fetch failure the previous forest stays in place.
    pub fn refresh(&mut self) -> Result<&CommentForest> {
        let ticket = self.begin_refresh();
        let records = self
            .store
            .fetch(self.post_id)
            .map_err(|e| {
                e.with_context(format!("Failed to fetch comments for post {}", self.post_id))
            })?;
        self.apply(ticket, records);
        Ok(&self.forest)
    }

    /// Refresh only if [`needs_refresh`](Self::needs_refresh) says so
    ///
    /// Returns whether a fetch was made.
    pub fn poll(&mut self, now: Instant) -> Result<bool> {
        if !self.needs_refresh(now) {
            return Ok(false);
        }
        self.refresh()?;
        Ok(true)
    }
}

impl<S: CommentSource + CommentSink> CommentThread<S> {
    /// Write a new comment or reply, then refresh the thread
    ///
    /// A reply is checked against a fresh fetch and rejected with
    /// [`ThreadlineError::CommentNotFound`] unless its parent is in the forest.
    /// A failed write leaves the thread untouched. A failed refresh after a
    /// successful write leaves the thread stale for the next poll.
    pub fn post(&mut self, author: Option<&Author>, comment: NewComment) -> Result<CommentId> {
        let author = self.validator.validate_author(author)?;
        self.validator.validate_content(&comment.content)?;

        if comment.post_id != self.post_id {
            return Err(ThreadlineError::Validation(format!(
                "Comment targets post {}, thread is for post {}",
                comment.post_id, self.post_id
            )));
        }

        // Replies must target a comment readers can see
        if let Some(parent) = comment.parent_id {
            self.refresh()?;
            if self.forest.find(parent).is_none() {
                return Err(ThreadlineError::CommentNotFound(parent));
            }
        }

        let id = self.store.create(&comment, author)?;
        info!(
            "Posted {} {} on post {} as {}",
            if comment.is_reply() { "reply" } else { "comment" },
            id,
            self.post_id,
            author.name
        );

        self.invalidate();
        if let Err(e) = self.refresh() {
            warn!("Refresh after posting comment {} failed: {}", id, e);
        }

        Ok(id)
    }
}
