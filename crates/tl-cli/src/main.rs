//! threadline - threaded comment sections from the terminal
//!
//! Posts comments and replies to a local comment store and renders each
//! post's comments as a reply tree.
//!
//! ## Quick Start
//!
//! ```bash
//! # Write a default configuration
//! threadline config init
//!
//! # Comment on post 1, then reply to comment 1
//! threadline post 1 "Great write-up" --author alice
//! threadline post 1 "Agreed" --author bob --reply-to 1
//!
//! # Show the thread
//! threadline show 1
//!
//! # Keep it on screen, refreshing every 5 seconds
//! threadline watch 1
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
