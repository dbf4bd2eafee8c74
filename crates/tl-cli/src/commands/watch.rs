//! Watch command
//!
//! Keep a post's comment tree on screen, re-fetching it periodically and
//! re-rendering whenever it changes.

use anyhow::{bail, Result};
use clap::Args;
use std::time::Instant;

use super::show::{render, resolve_format, LayoutArgs, ShowFormat};
use super::Context;
use tl_core::config::ThreadConfig;
use tl_core::export::ExportManager;
use tl_core::thread::CommentThread;
use tl_core::types::PostId;

/// Arguments for the watch command
#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Post whose comments to watch
    pub post_id: PostId,

    /// Seconds between refreshes (defaults to thread.refresh_interval_secs)
    #[arg(long, short)]
    pub interval: Option<u64>,

    /// Stop after this many polls
    #[arg(long)]
    pub iterations: Option<u64>,

    /// Output format (defaults to render.default_format)
    #[arg(long, short, value_enum)]
    pub format: Option<ShowFormat>,

    #[command(flatten)]
    pub layout: LayoutArgs,
}

/// Execute the watch command
pub fn execute(args: WatchArgs, ctx: &Context) -> Result<()> {
    use colored::Colorize;

    let thread_config = ThreadConfig {
        refresh_interval_secs: args
            .interval
            .unwrap_or(ctx.config.thread.refresh_interval_secs),
        ..ctx.config.thread.clone()
    };
    if thread_config.refresh_interval_secs == 0 {
        bail!("Refresh interval must be at least one second");
    }

    let manager = ExportManager::with_options(args.layout.render_options(ctx));
    let format = resolve_format(args.format, ctx, &manager)?;

    let storage = ctx.open_storage()?;
    let mut thread = CommentThread::with_config(storage, args.post_id, &thread_config);

    eprintln!(
        "Watching post {} every {}s (Ctrl-C to stop)",
        args.post_id.to_string().yellow(),
        thread_config.refresh_interval_secs
    );

    let mut last_output: Option<String> = None;
    let mut polls = 0u64;

    loop {
        match thread.poll(Instant::now()) {
            Ok(true) => {
                let output = render(&thread, &manager, &format)?;
                if last_output.as_deref() != Some(output.as_str()) {
                    if last_output.is_some() {
                        println!("{}", "─".repeat(40).dimmed());
                    }
                    print!("{}", output);
                    last_output = Some(output);
                }
            }
            Ok(false) => {}
            Err(e) => {
                // Keep the last tree on screen and try again next tick
                eprintln!("{} {}", "✗".red(), e);
            }
        }

        polls += 1;
        if args.iterations.is_some_and(|max| polls >= max) {
            break;
        }
        std::thread::sleep(thread_config.refresh_interval());
    }

    Ok(())
}
