//! Render options shared by the human-readable exporters

use crate::comment::CommentNode;
use crate::config::RenderConfig;
use crate::error::{Result, ThreadlineError};
use crate::types::CommentId;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::fmt::Write;

/// How a forest is laid out for reading
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Comments whose replies are hidden
    pub collapsed: HashSet<CommentId>,
    /// Deepest level shown; roots are level 0
    pub max_depth: Option<usize>,
    /// Show "N replies" next to comments with replies
    pub show_reply_counts: bool,
    /// Spaces per nesting level
    pub indent: usize,
    /// chrono format string for dates
    pub date_format: String,
}

impl RenderOptions {
    /// Create options from the render configuration
    pub fn from_config(config: &RenderConfig) -> Self {
        Self {
            collapsed: HashSet::new(),
            max_depth: None,
            show_reply_counts: config.show_reply_counts,
            indent: config.indent,
            date_format: config.date_format.clone(),
        }
    }

    /// Hide the replies of a comment
    pub fn collapse(mut self, id: CommentId) -> Self {
        self.collapsed.insert(id);
        self
    }

    /// Limit the depth shown
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Format a timestamp with the configured date format
    pub fn format_date(&self, date: &DateTime<Utc>) -> Result<String> {
        let mut out = String::new();
        write!(out, "{}", date.format(&self.date_format)).map_err(|_| {
            ThreadlineError::Config(format!("Invalid date format: {}", self.date_format))
        })?;
        Ok(out)
    }

    /// "1 reply" / "N replies"
    pub fn reply_label(count: usize) -> String {
        if count == 1 {
            "1 reply".to_string()
        } else {
            format!("{} replies", count)
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::from_config(&RenderConfig::default())
    }
}

/// A node as it appears in rendered output
#[derive(Debug, Clone, Copy)]
pub struct VisibleNode<'a> {
    /// Nesting level, roots at 0
    pub depth: usize,
    pub node: &'a CommentNode,
    /// Replies exist but are not shown
    pub replies_hidden: bool,
}

/// Walk the forest in display order, skipping hidden replies
pub fn visible_nodes<'a>(
    roots: &'a [CommentNode],
    options: &RenderOptions,
) -> Vec<VisibleNode<'a>> {
    let mut visible = Vec::new();
    let mut stack: Vec<(usize, &CommentNode)> = roots.iter().rev().map(|node| (0, node)).collect();

    while let Some((depth, node)) = stack.pop() {
        let expand = !options.collapsed.contains(&node.id())
            && options.max_depth.map_or(true, |max| depth < max);

        visible.push(VisibleNode {
            depth,
            node,
            replies_hidden: !expand && !node.children.is_empty(),
        });

        if expand {
            stack.extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        }
    }

    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::comment::{build_tree, Comment};
    use crate::types::{AuthorId, PostId};
    use chrono::TimeZone;

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

    fn sample() -> Vec<Comment> {
        vec![
            create_test_comment(1, None),
            create_test_comment(2, Some(1)),
            create_test_comment(3, Some(2)),
            create_test_comment(4, None),
        ]
    }

    #[test]
    fn test_all_visible_by_default() {
        let forest = build_tree(&sample());
        let visible = visible_nodes(forest.roots(), &RenderOptions::default());

        let walk: Vec<_> = visible.iter().map(|v| (v.depth, v.node.id().get())).collect();
        assert_eq!(walk, vec![(0, 1), (1, 2), (2, 3), (0, 4)]);
        assert!(visible.iter().all(|v| !v.replies_hidden));
    }

    #[test]
    fn test_collapsed_hides_replies() {
        let forest = build_tree(&sample());
        let options = RenderOptions::default().collapse(CommentId(1));
        let visible = visible_nodes(forest.roots(), &options);

        let ids: Vec<_> = visible.iter().map(|v| v.node.id().get()).collect();
        assert_eq!(ids, vec![1, 4]);
        assert!(visible[0].replies_hidden);
        assert!(!visible[1].replies_hidden);
    }

    #[test]
    fn test_max_depth() {
        let forest = build_tree(&sample());
        let options = RenderOptions::default().with_max_depth(1);
        let visible = visible_nodes(forest.roots(), &options);

        let ids: Vec<_> = visible.iter().map(|v| v.node.id().get()).collect();
        assert_eq!(ids, vec![1, 2, 4]);
        assert!(visible[1].replies_hidden);
    }

    #[test]
    fn test_reply_label() {
        assert_eq!(RenderOptions::reply_label(1), "1 reply");
        assert_eq!(RenderOptions::reply_label(3), "3 replies");
    }

    #[test]
    fn test_format_date() {
        let options = RenderOptions::default();
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert_eq!(options.format_date(&date).unwrap(), "2024-05-01");
    }

    #[test]
    fn test_invalid_date_format() {
        let options = RenderOptions {
            date_format: "%Q".to_string(),
            ..RenderOptions::default()
        };
        let date = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        assert!(options.format_date(&date).is_err());
    }
}
