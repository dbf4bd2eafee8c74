//! JSON exporter for comment threads
//!
//! Documents are written through serde_json's formatters from an explicit
//! work-list rather than derived `Serialize` impls, so reply chains of any
//! depth export without growing the call stack.

use super::exporter::{ThreadExporter, ThreadSnapshot};
use crate::comment::{Comment, CommentForest, CommentNode, TreeReport};
use crate::error::Result;
use crate::types::{CommentId, PostId};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::ser::{CompactFormatter, Formatter, PrettyFormatter};
use std::io;

/// Export envelope
#[derive(Debug)]
pub struct ExportData<'a> {
    /// Post the comments belong to
    pub post_id: PostId,
    /// When the export was produced
    pub exported_at: DateTime<Utc>,
    /// Comments in the tree, replies included
    pub total: usize,
    /// Root comments with nested children
    pub comments: &'a CommentForest,
    /// What the build left out
    pub report: Option<&'a TreeReport>,
}

impl<'a> ExportData<'a> {
    /// Wrap a snapshot
    pub fn from_snapshot(snapshot: &ThreadSnapshot<'a>) -> Self {
        Self {
            post_id: snapshot.post_id,
            exported_at: Utc::now(),
            total: snapshot.forest.len(),
            comments: snapshot.forest,
            report: snapshot.report,
        }
    }

    /// Render the envelope with the given formatter
    pub fn to_json<F: Formatter>(&self, formatter: F) -> Result<String> {
        let mut out = JsonWriter::new(formatter);
        out.begin_object()?;
        out.field(true, "post_id", &self.post_id)?;
        out.field(false, "exported_at", &self.exported_at)?;
        out.field(false, "total", &self.total)?;
        out.key(false, "comments")?;
        out.forest(self.comments)?;
        out.end_value()?;
        if let Some(report) = self.report {
            out.key(false, "report")?;
            out.report(report)?;
            out.end_value()?;
        }
        out.end_object()?;
        out.finish()
    }
}

enum Step<'a> {
    Open(&'a CommentNode, bool),
    Close,
}

struct JsonWriter<F> {
    out: Vec<u8>,
    formatter: F,
}

impl<F: Formatter> JsonWriter<F> {
    fn new(formatter: F) -> Self {
        Self {
            out: Vec::new(),
            formatter,
        }
    }

    fn begin_object(&mut self) -> Result<()> {
        self.formatter.begin_object(&mut self.out)?;
        Ok(())
    }

    fn end_object(&mut self) -> Result<()> {
        self.formatter.end_object(&mut self.out)?;
        Ok(())
    }

    /// Write a key; the caller writes the value, then calls `end_value`
    fn key(&mut self, first: bool, key: &str) -> Result<()> {
        self.formatter.begin_object_key(&mut self.out, first)?;
        serde_json::to_writer(&mut self.out, key)?;
        self.formatter.end_object_key(&mut self.out)?;
        self.formatter.begin_object_value(&mut self.out)?;
        Ok(())
    }

    fn end_value(&mut self) -> Result<()> {
        self.formatter.end_object_value(&mut self.out)?;
        Ok(())
    }

    /// Key plus a scalar value
    fn field<T: Serialize + ?Sized>(&mut self, first: bool, key: &str, value: &T) -> Result<()> {
        self.key(first, key)?;
        serde_json::to_writer(&mut self.out, value)?;
        self.end_value()
    }

    fn id_list(&mut self, key: &str, ids: &[CommentId]) -> Result<()> {
        self.key(false, key)?;
        self.formatter.begin_array(&mut self.out)?;
        for (i, id) in ids.iter().enumerate() {
            self.formatter.begin_array_value(&mut self.out, i == 0)?;
            self.formatter.write_i64(&mut self.out, id.get())?;
            self.formatter.end_array_value(&mut self.out)?;
        }
        self.formatter.end_array(&mut self.out)?;
        self.end_value()
    }

    fn report(&mut self, report: &TreeReport) -> Result<()> {
        self.begin_object()?;
        self.field(true, "placed", &report.placed)?;
        self.id_list("dangling", &report.dangling)?;
        self.id_list("self_referencing", &report.self_referencing)?;
        self.id_list("duplicates", &report.duplicates)?;
        self.id_list("unreachable", &report.unreachable)?;
        self.end_object()
    }

    /// Comment fields, leaving the object open for `children`
    fn comment_fields(&mut self, comment: &Comment) -> Result<()> {
        self.begin_object()?;
        self.field(true, "id", &comment.id)?;
        self.field(false, "post_id", &comment.post_id)?;
        self.field(false, "parent_id", &comment.parent_id)?;
        self.field(false, "content", &comment.content)?;
        self.field(false, "author_id", &comment.author_id)?;
        self.field(false, "author_name", &comment.author_name)?;
        self.field(false, "created_at", &comment.created_at)
    }

    fn forest(&mut self, forest: &CommentForest) -> Result<()> {
        let mut steps: Vec<Step<'_>> = Vec::new();
        push_siblings(&mut steps, forest.roots());

        self.formatter.begin_array(&mut self.out)?;
        while let Some(step) = steps.pop() {
            match step {
                Step::Open(node, first) => {
                    self.formatter.begin_array_value(&mut self.out, first)?;
                    self.comment_fields(&node.comment)?;
                    self.key(false, "children")?;
                    self.formatter.begin_array(&mut self.out)?;
                    steps.push(Step::Close);
                    push_siblings(&mut steps, &node.children);
                }
                Step::Close => {
                    self.formatter.end_array(&mut self.out)?;
                    self.end_value()?;
                    self.end_object()?;
                    self.formatter.end_array_value(&mut self.out)?;
                }
            }
        }
        self.formatter.end_array(&mut self.out)?;
        Ok(())
    }

    fn finish(self) -> Result<String> {
        let json = String::from_utf8(self.out)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(json)
    }
}

/// Queue siblings so the first one is popped first
fn push_siblings<'a>(steps: &mut Vec<Step<'a>>, nodes: &'a [CommentNode]) {
    steps.extend(
        nodes
            .iter()
            .enumerate()
            .rev()
            .map(|(i, node)| Step::Open(node, i == 0)),
    );
}

/// JSON exporter
pub struct JsonExporter {
    compact: bool,
}

impl JsonExporter {
    /// Create a JSON exporter; `compact` selects single-line output
    pub fn new(compact: bool) -> Self {
        Self { compact }
    }

    /// Create a single-line JSON exporter
    pub fn compact() -> Self {
        Self::new(true)
    }
}

impl ThreadExporter for JsonExporter {
    fn export(&self, snapshot: &ThreadSnapshot<'_>) -> Result<String> {
        let data = ExportData::from_snapshot(snapshot);
        if self.compact {
            data.to_json(CompactFormatter)
        } else {
            data.to_json(PrettyFormatter::new())
        }
    }

    fn format_name(&self) -> &str {
        if self.compact {
            "json-compact"
        } else {
            "json"
        }
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
