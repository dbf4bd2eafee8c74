//! Exporter trait and manager

use super::options::RenderOptions;
use crate::comment::{CommentForest, TreeReport};
use crate::error::{Result, ThreadlineError};
use crate::types::PostId;
use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::Path;

/// A built thread handed to exporters
#[derive(Debug, Clone, Copy)]
pub struct ThreadSnapshot<'a> {
    /// Post the comments belong to
    pub post_id: PostId,
    /// Built forest
    pub forest: &'a CommentForest,
    /// Build report, when the caller kept one
    pub report: Option<&'a TreeReport>,
}

impl<'a> ThreadSnapshot<'a> {
    /// Create a snapshot without a build report
    pub fn new(post_id: PostId, forest: &'a CommentForest) -> Self {
        Self {
            post_id,
            forest,
            report: None,
        }
    }

    /// Attach the build report
    pub fn with_report(mut self, report: &'a TreeReport) -> Self {
        self.report = Some(report);
        self
    }
}

/// Trait for thread exporters
pub trait ThreadExporter: Send + Sync {
    /// Export a thread to string
    fn export(&self, snapshot: &ThreadSnapshot<'_>) -> Result<String>;

    /// Get the format name
    fn format_name(&self) -> &str;

    /// Get the file extension
    fn file_extension(&self) -> &str;
}

/// Manager for handling multiple export formats
pub struct ExportManager {
    exporters: HashMap<String, Box<dyn ThreadExporter>>,
}

impl ExportManager {
    /// Create a new export manager with default exporters
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    /// Create a manager whose text exporters use the given options
    pub fn with_options(options: RenderOptions) -> Self {
        let mut manager = Self {
            exporters: HashMap::new(),
        };

        // Register default exporters
        manager.register(Box::new(super::json::JsonExporter::new(false)));
        manager.register(Box::new(super::json::JsonExporter::compact()));
        manager.register(Box::new(super::text::TextExporter::new(options.clone())));
        manager.register(Box::new(super::markdown::MarkdownExporter::new(options)));

        manager
    }

    /// Register a new exporter
    pub fn register(&mut self, exporter: Box<dyn ThreadExporter>) {
        self.exporters
            .insert(exporter.format_name().to_string(), exporter);
    }

    /// Export a thread to the specified format
    pub fn export(&self, snapshot: &ThreadSnapshot<'_>, format: &str) -> Result<String> {
        self.lookup(format)?.export(snapshot)
    }

    /// Export a thread to a file
    pub fn export_to_file(
        &self,
        snapshot: &ThreadSnapshot<'_>,
        format: &str,
        path: &Path,
    ) -> Result<()> {
        let exporter = self.lookup(format)?;
        let content = exporter.export(snapshot)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        // Add extension if needed
        let final_path = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(exporter.file_extension())
        };

        // Atomic write using temp file
        let temp_path = final_path.with_extension("tmp");
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(content.as_bytes())?;
            file.flush()?;
        }

        fs::rename(&temp_path, &final_path)?;
        Ok(())
    }

    /// Get list of available format names
    pub fn available_formats(&self) -> Vec<String> {
        let mut formats: Vec<_> = self.exporters.keys().cloned().collect();
        formats.sort();
        formats
    }

    /// Check if a format is available
    pub fn has_format(&self, format: &str) -> bool {
        self.exporters.contains_key(format)
    }

    /// Get an exporter by format name
    pub fn get(&self, format: &str) -> Option<&dyn ThreadExporter> {
        self.exporters.get(format).map(|e| e.as_ref())
    }

    fn lookup(&self, format: &str) -> Result<&dyn ThreadExporter> {
        self.get(format).ok_or_else(|| {
            ThreadlineError::Validation(format!("Unknown export format: {}", format))
        })
    }
}

impl Default for ExportManager {
    fn default() -> Self {
        Self::new()
    }
}
