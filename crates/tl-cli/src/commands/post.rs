//! Post command
//!
//! Write a comment or a reply to a post.

use anyhow::{Context as _, Result};
use clap::Args;
use std::collections::BTreeMap;
use tracing::info;

use super::Context;
use tl_core::comment::{CommentValidator, NewCommentBuilder};
use tl_core::thread::CommentThread;
use tl_core::types::{Author, AuthorId, CommentId, PostId};

/// Arguments for the post command
#[derive(Debug, Args)]
pub struct PostArgs {
    /// Post to comment on
    pub post_id: PostId,

    /// Comment content
    pub content: String,

    /// Reply to this comment instead of posting a root comment
    #[arg(long, short)]
    pub reply_to: Option<CommentId>,

    /// Display name of the signed-in author
    #[arg(long, short, env = "THREADLINE_AUTHOR")]
    pub author: Option<String>,

    /// User id of the signed-in author (UUID)
    #[arg(long, env = "THREADLINE_AUTHOR_ID")]
    pub author_id: Option<String>,
}

impl PostArgs {
    /// Resolve the author identity; `None` when nobody is signed in
    ///
    /// Without `--author-id` the id remembered for the name is reused. The
    /// flag is `true` when a fresh id had to be assigned.
    fn author(&self, known: &BTreeMap<String, AuthorId>) -> Result<Option<(Author, bool)>> {
        let Some(name) = &self.author else {
            return Ok(None);
        };
        let (id, assigned) = match (&self.author_id, known.get(name)) {
            (Some(raw), _) => {
                let id = AuthorId::from_string(raw)
                    .with_context(|| format!("Invalid author id: {}", raw))?;
                (id, false)
            }
            (None, Some(id)) => (*id, false),
            (None, None) => (AuthorId::new(), true),
        };
        Ok(Some((Author::new(id, name.clone()), assigned)))
    }
}

/// Save a newly assigned author id so later posts reuse it
fn remember_author(ctx: &Context, author: &Author) -> Result<()> {
    let mut config = ctx.config.clone();
    config.authors.insert(author.name.clone(), author.id);
    config
        .save(&ctx.config_path)
        .with_context(|| format!("Failed to save author id to {}", ctx.config_path.display()))?;
    info!("Assigned author id {} to {}", author.id, author.name);
    Ok(())
}

/// Execute the post command
pub fn execute(args: PostArgs, ctx: &Context) -> Result<()> {
    use colored::Colorize;

    let author = match args.author(&ctx.config.authors)? {
        Some((author, true)) => {
            remember_author(ctx, &author)?;
            Some(author)
        }
        Some((author, false)) => Some(author),
        None => None,
    };
    let validator = CommentValidator::with_max_length(ctx.config.thread.max_comment_length);

    let builder = match args.reply_to {
        Some(parent) => NewCommentBuilder::reply(args.post_id, parent),
        None => NewCommentBuilder::root(args.post_id),
    };
    let comment = builder
        .validator(validator)
        .content(args.content.as_str())
        .build()?;

    let storage = ctx.open_storage()?;
    let mut thread = CommentThread::with_config(storage, args.post_id, &ctx.config.thread);

    let id = thread
        .post(author.as_ref(), comment)
        .context(if args.reply_to.is_some() {
            "Failed to post reply"
        } else {
            "Failed to post comment"
        })?;

    let kind = if args.reply_to.is_some() { "reply" } else { "comment" };
    eprintln!(
        "{} Posted {} {} on post {} ({} in thread)",
        "✓".green(),
        kind,
        format!("#{}", id).cyan(),
        args.post_id.to_string().yellow(),
        thread.forest().len()
    );

    Ok(())
}
