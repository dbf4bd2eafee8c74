//! Plain-text exporter for comment threads

use super::exporter::{ThreadExporter, ThreadSnapshot};
use super::options::{visible_nodes, RenderOptions};
use crate::error::Result;

/// Indented plain-text exporter
pub struct TextExporter {
    options: RenderOptions,
}

impl TextExporter {
    /// Create a text exporter
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl ThreadExporter for TextExporter {
    fn export(&self, snapshot: &ThreadSnapshot<'_>) -> Result<String> {
        let mut output = String::new();

        if snapshot.forest.is_empty() {
            output.push_str("No comments yet.\n");
            return Ok(output);
        }

        for visible in visible_nodes(snapshot.forest.roots(), &self.options) {
            let comment = &visible.node.comment;
            let pad = " ".repeat(visible.depth * self.options.indent);

            let mut header = format!(
                "{}#{} {} · {}",
                pad,
                comment.id,
                comment.author_name,
                self.options.format_date(&comment.created_at)?
            );
            let replies = visible.node.reply_count();
            if self.options.show_reply_counts && replies > 0 {
                header.push_str(" · ");
                header.push_str(&RenderOptions::reply_label(replies));
                if visible.replies_hidden {
                    header.push_str(" (hidden)");
                }
            }
            output.push_str(&header);
            output.push('\n');

            let body_pad = " ".repeat(visible.depth * self.options.indent + self.options.indent);
            for line in comment.content.lines() {
                output.push_str(&body_pad);
                output.push_str(line);
                output.push('\n');
            }
        }

        Ok(output)
    }

    fn format_name(&self) -> &str {
        "text"
    }

    fn file_extension(&self) -> &str {
        "txt"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{build_tree, Comment};
    use crate::types::{AuthorId, CommentId, PostId};
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn create_test_comment(id: i64, parent: Option<i64>, author: &str, content: &str) -> Comment {
        Comment {
            id: CommentId(id),
            post_id: PostId(1),
            parent_id: parent.map(CommentId),
            content: content.to_string(),
            author_id: AuthorId::default(),
            author_name: author.to_string(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, id as u32).unwrap(),
        }
    }

    fn sample() -> Vec<Comment> {
        vec![
            create_test_comment(1, None, "alice", "Great post"),
            create_test_comment(2, Some(1), "bob", "Agreed\nFully"),
            create_test_comment(3, Some(1), "carol", "Same"),
        ]
    }

    #[test]
    fn test_text_layout() {
        let forest = build_tree(&sample());
        let exporter = TextExporter::new(RenderOptions::default());
        let text = exporter.export(&ThreadSnapshot::new(PostId(1), &forest)).unwrap();

        let expected = "\
#1 alice · 2024-05-01 · 2 replies
  Great post
  #2 bob · 2024-05-01
    Agreed
    Fully
  #3 carol · 2024-05-01
    Same
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_text_collapsed() {
        let forest = build_tree(&sample());
        let exporter = TextExporter::new(RenderOptions::default().collapse(CommentId(1)));
        let text = exporter.export(&ThreadSnapshot::new(PostId(1), &forest)).unwrap();

        assert_eq!(text, "#1 alice · 2024-05-01 · 2 replies (hidden)\n  Great post\n");
    }

    #[test]
    fn test_text_without_reply_counts() {
        let forest = build_tree(&sample());
        let options = RenderOptions {
            show_reply_counts: false,
            ..RenderOptions::default()
        };
        let text = TextExporter::new(options)
            .export(&ThreadSnapshot::new(PostId(1), &forest))
            .unwrap();

        assert!(!text.contains("replies"));
    }

    #[test]
    fn test_text_empty_thread() {
        let forest = build_tree(&[]);
        let text = TextExporter::new(RenderOptions::default())
            .export(&ThreadSnapshot::new(PostId(1), &forest))
            .unwrap();

        assert_eq!(text, "No comments yet.\n");
    }
}
