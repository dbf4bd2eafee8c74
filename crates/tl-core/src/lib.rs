//! tl-core - Core library for threadline
//!
//! This crate provides the core logic for threaded comment sections,
//! including the comment schema, tree construction, refresh coordination,
//! store contracts and export functionality.

pub mod error;
pub mod types;
pub mod config;
pub mod comment;
pub mod store;
pub mod thread;
pub mod export;

pub use error::{Result, ThreadlineError};
pub use types::*;
