//! Comment thread module
//!
//! A thread is the comment section of one post as a client sees it: the
//! last built forest plus the bookkeeping needed to refresh it.
//!
//! # Overview
//!
//! Every refresh re-fetches the full flat list and rebuilds the whole tree.
//! Posting writes through the store, invalidates the thread and refreshes.
//! When several fetches overlap, [`RefreshTicket`]s make sure the newest
//! result wins over one that completes late.
//!
//! # Example
//!
//! ```ignore
//! use tl_core::thread::CommentThread;
//! use tl_core::comment::NewCommentBuilder;
//!
//! let mut thread = CommentThread::new(storage, post_id);
//! thread.refresh()?;
//!
//! let reply = NewCommentBuilder::reply(post_id, parent_id)
//!     .content("Agreed")
//!     .build()?;
//! thread.post(Some(&author), reply)?;
//! ```

mod manager;

pub use manager::{CommentThread, RefreshTicket};
