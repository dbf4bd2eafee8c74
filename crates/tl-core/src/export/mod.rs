//! Export functionality for comment threads
//!
//! This module provides exporters for turning a built comment forest into
//! JSON, indented plain text, or Markdown.
//!
//! # Overview
//!
//! - JSON format (compact and pretty-printed), always the full tree
//! - Text format, one header line per comment with reply counts
//! - Markdown format, nested lists
//!
//! Text and Markdown honour [`RenderOptions`]: collapsed sub-threads and a
//! maximum depth hide replies while still showing how many there are.
//!
//! # Example
//!
//! ```ignore
//! use tl_core::export::{ExportManager, ThreadSnapshot};
//!
//! let manager = ExportManager::new();
//! let snapshot = ThreadSnapshot::new(post_id, thread.forest());
//! let text = manager.export(&snapshot, "text")?;
//! ```

mod exporter;
mod json;
mod markdown;
mod options;
mod text;

pub use exporter::{ExportManager, ThreadExporter, ThreadSnapshot};
pub use json::{ExportData, JsonExporter};
pub use markdown::MarkdownExporter;
pub use options::{visible_nodes, RenderOptions, VisibleNode};
pub use text::TextExporter;
