//! tl-storage - Storage library for threadline
//!
//! This crate provides a local comment store standing in for the hosted
//! backend: it honours the comment source and sink contracts of `tl-core`.

mod comment_store;

pub use comment_store::FileSystemStorage;
