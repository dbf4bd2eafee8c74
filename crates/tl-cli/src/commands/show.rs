//! Show command
//!
//! Render the comment tree of a post.

use anyhow::{bail, Context as _, Result};
use clap::{Args, ValueEnum};
use std::io::Write;
use std::path::PathBuf;

use super::Context;
use tl_core::export::{ExportManager, RenderOptions, ThreadSnapshot};
use tl_core::store::CommentSource;
use tl_core::thread::CommentThread;
use tl_core::types::{CommentId, PostId};

/// Output format options
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ShowFormat {
    /// Indented plain text
    Text,
    /// Markdown nested list
    Markdown,
    /// JSON tree
    Json,
    /// Single-line JSON tree
    JsonCompact,
}

impl ShowFormat {
    /// Exporter name of this format
    pub fn format_name(self) -> &'static str {
        match self {
            ShowFormat::Text => "text",
            ShowFormat::Markdown => "markdown",
            ShowFormat::Json => "json",
            ShowFormat::JsonCompact => "json-compact",
        }
    }
}

/// Arguments for the show command
#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Post whose comments to show
    pub post_id: PostId,

    /// Output format (defaults to render.default_format)
    #[arg(long, short, value_enum)]
    pub format: Option<ShowFormat>,

    #[command(flatten)]
    pub layout: LayoutArgs,

    /// Output file path (stdout if not specified)
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

/// Layout flags shared by show and watch
#[derive(Debug, Clone, Args)]
pub struct LayoutArgs {
    /// Hide the replies of this comment (repeatable)
    #[arg(long = "collapse", value_name = "COMMENT_ID")]
    pub collapse: Vec<CommentId>,

    /// Deepest reply level to show; roots are level 0
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Do not show reply counts
    #[arg(long)]
    pub no_reply_counts: bool,
}

impl LayoutArgs {
    /// Merge the flags into the configured render options
    pub fn render_options(&self, ctx: &Context) -> RenderOptions {
        let mut options = RenderOptions::from_config(&ctx.config.render);
        options.collapsed.extend(self.collapse.iter().copied());
        options.max_depth = self.max_depth;
        if self.no_reply_counts {
            options.show_reply_counts = false;
        }
        options
    }
}

/// Pick the exporter name from the flag or the configuration
pub fn resolve_format(
    format: Option<ShowFormat>,
    ctx: &Context,
    manager: &ExportManager,
) -> Result<String> {
    let name = match format {
        Some(format) => format.format_name().to_string(),
        None => ctx.config.render.default_format.clone(),
    };
    if !manager.has_format(&name) {
        bail!(
            "Unknown output format '{}' (available: {})",
            name,
            manager.available_formats().join(", ")
        );
    }
    Ok(name)
}

fn snapshot<S>(thread: &CommentThread<S>) -> ThreadSnapshot<'_> {
    ThreadSnapshot::new(thread.post_id(), thread.forest()).with_report(thread.report())
}

/// Render the current forest of a thread
pub fn render<S: CommentSource>(
    thread: &CommentThread<S>,
    manager: &ExportManager,
    format: &str,
) -> Result<String> {
    Ok(manager.export(&snapshot(thread), format)?)
}

/// Execute the show command
pub fn execute(args: ShowArgs, ctx: &Context) -> Result<()> {
    use colored::Colorize;

    let manager = ExportManager::with_options(args.layout.render_options(ctx));
    let format = resolve_format(args.format, ctx, &manager)?;

    let storage = ctx.open_storage()?;
    let mut thread = CommentThread::with_config(storage, args.post_id, &ctx.config.thread);
    thread.refresh()?;

    let dropped = thread.report().dropped();
    if dropped > 0 {
        eprintln!(
            "{} {} comments are not shown (replies to missing comments or broken reply chains)",
            "⚠".yellow(),
            dropped
        );
    }

    // Write output
    if let Some(output_path) = args.output {
        manager
            .export_to_file(&snapshot(&thread), &format, &output_path)
            .with_context(|| format!("Failed to write to {}", output_path.display()))?;
        eprintln!("{} Exported thread to {}", "✓".green(), output_path.display());
    } else {
        let output = render(&thread, &manager, &format)?;
        std::io::stdout()
            .write_all(output.as_bytes())
            .context("Failed to write to stdout")?;
    }

    Ok(())
}
