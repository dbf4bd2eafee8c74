//! Markdown exporter for comment threads

use super::exporter::{ThreadExporter, ThreadSnapshot};
use super::options::{visible_nodes, RenderOptions};
use crate::error::Result;

/// Markdown exporter rendering threads as nested lists
pub struct MarkdownExporter {
    options: RenderOptions,
}

impl MarkdownExporter {
    /// Create a Markdown exporter
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render the report header
    fn render_header(&self, snapshot: &ThreadSnapshot<'_>) -> String {
        let mut header = format!("# Comments on post {}\n\n", snapshot.post_id);

        header.push_str(&format!(
            "**Comments:** {} · **Threads:** {}\n",
            snapshot.forest.len(),
            snapshot.forest.roots().len()
        ));

        if let Some(report) = snapshot.report {
            if report.dropped() > 0 {
                header.push_str(&format!(
                    "**Not shown:** {} (replies to missing comments or broken reply chains)\n",
                    report.dropped()
                ));
            }
        }

        header.push('\n');
        header
    }
}

impl ThreadExporter for MarkdownExporter {
    fn export(&self, snapshot: &ThreadSnapshot<'_>) -> Result<String> {
        let mut output = self.render_header(snapshot);

        if snapshot.forest.is_empty() {
            output.push_str("_No comments yet._\n");
            return Ok(output);
        }

        // Markdown needs two spaces per list level regardless of text indent
        for visible in visible_nodes(snapshot.forest.roots(), &self.options) {
            let comment = &visible.node.comment;
            let pad = "  ".repeat(visible.depth);

            output.push_str(&format!(
                "{}- **{}** · {} · `#{}`",
                pad,
                comment.author_name,
                self.options.format_date(&comment.created_at)?,
                comment.id
            ));

            let replies = visible.node.reply_count();
            if self.options.show_reply_counts && replies > 0 {
                output.push_str(&format!(" · {}", RenderOptions::reply_label(replies)));
                if visible.replies_hidden {
                    output.push_str(" _(hidden)_");
                }
            }
            output.push('\n');

            for line in comment.content.lines() {
                output.push_str(&pad);
                output.push_str("  > ");
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    fn format_name(&self) -> &str {
        "markdown"
    }

    fn file_extension(&self) -> &str {
        "md"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{Comment, CommentTreeBuilder};
    use crate::types::{AuthorId, CommentId, PostId};
    use chrono::{TimeZone, Utc};

    fn create_test_comment(id: i64, parent: Option<i64>) -> Comment {
        Comment {
            id: CommentId(id),
            post_id: PostId(1),
            parent_id: parent.map(CommentId),
            content: format!("comment {}", id),
            author_id: AuthorId::default(),
            author_name: "alice".to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, id as u32).unwrap(),
        }
    }

    #[test]
    fn test_markdown_nested_list() {
        let input = vec![
            create_test_comment(1, None),
            create_test_comment(2, Some(1)),
            create_test_comment(3, None),
        ];
        let forest = CommentTreeBuilder::new().build(&input);
        let md = MarkdownExporter::new(RenderOptions::default())
            .export(&ThreadSnapshot::new(PostId(1), &forest))
            .unwrap();

        assert!(md.starts_with("# Comments on post 1\n"));
        assert!(md.contains("**Comments:** 3 · **Threads:** 2"));
        assert!(md.contains("- **alice** · 2024-05-01 · `#1` · 1 reply\n  > comment 1\n"));
        assert!(md.contains("  - **alice** · 2024-05-01 · `#2`\n    > comment 2\n"));
    }

    #[test]
    fn test_markdown_reports_dropped() {
        let input = vec![create_test_comment(1, None), create_test_comment(2, Some(8))];
        let (forest, report) = CommentTreeBuilder::new().build_with_report(&input);
        let md = MarkdownExporter::new(RenderOptions::default())
            .export(&ThreadSnapshot::new(PostId(1), &forest).with_report(&report))
            .unwrap();

        assert!(md.contains("**Not shown:** 1"));
    }

    #[test]
    fn test_markdown_empty() {
        let forest = CommentTreeBuilder::new().build(&[]);
        let md = MarkdownExporter::new(RenderOptions::default())
            .export(&ThreadSnapshot::new(PostId(1), &forest))
            .unwrap();

        assert!(md.contains("_No comments yet._"));
    }
}
