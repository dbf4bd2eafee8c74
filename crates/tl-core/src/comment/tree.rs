//! Threaded comment tree construction
//!
//! Turns the flat, chronologically ordered list a post's comments are fetched
//! as into a forest of root comments with nested replies. The input order is
//! kept at every level, so roots and siblings stay in `created_at` order.
//!
//! Construction never recurses: links are resolved by index and owned nodes
//! are assembled from an explicit work-list, so arbitrarily long reply chains
//! do not grow the call stack. Comparing and dropping nodes walk the same way.
//! Serialization lives in the JSON exporter, which writes nodes from a
//! work-list as well.

use super::model::Comment;
use crate::types::CommentId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A comment together with its direct replies
#[derive(Debug, Clone)]
pub struct CommentNode {
    pub comment: Comment,
    pub children: Vec<CommentNode>,
}

impl CommentNode {
    /// Create a node with no replies
    pub fn leaf(comment: Comment) -> Self {
        Self {
            comment,
            children: Vec::new(),
        }
    }

    /// Comment identifier
    pub fn id(&self) -> CommentId {
        self.comment.id
    }

    /// Number of direct replies
    pub fn reply_count(&self) -> usize {
        self.children.len()
    }

    /// Number of replies at any depth below this node
    pub fn descendant_count(&self) -> usize {
        let mut count = 0;
        let mut stack: Vec<&CommentNode> = self.children.iter().collect();
        while let Some(node) = stack.pop() {
            count += 1;
            stack.extend(node.children.iter());
        }
        count
    }
}

impl PartialEq for CommentNode {
    fn eq(&self, other: &Self) -> bool {
        same_shape(std::slice::from_ref(self), std::slice::from_ref(other))
    }
}

impl Eq for CommentNode {}

impl Drop for CommentNode {
    fn drop(&mut self) {
        // Detach descendants so each node is dropped with no children left
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}

/// Pre-order walk comparing depth and comment at every step
fn same_shape(left: &[CommentNode], right: &[CommentNode]) -> bool {
    fn walk(roots: &[CommentNode]) -> impl Iterator<Item = (usize, &Comment)> + '_ {
        ForestIter::over(roots).map(|(depth, node)| (depth, &node.comment))
    }
    walk(left).eq(walk(right))
}

/// Ordered root comments of one post
#[derive(Debug, Clone, Default)]
pub struct CommentForest {
    roots: Vec<CommentNode>,
}

impl CommentForest {
    /// Create an empty forest
    pub fn new() -> Self {
        Self::default()
    }

    /// Root comments in order
    pub fn roots(&self) -> &[CommentNode] {
        &self.roots
    }

    /// Take ownership of the root comments
    pub fn into_roots(self) -> Vec<CommentNode> {
        self.roots
    }

    /// Total number of comments in the forest, replies included
    pub fn len(&self) -> usize {
        self.roots.len() + self.roots.iter().map(CommentNode::descendant_count).sum::<usize>()
    }

    /// Check if the forest holds no comments
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Depth-first pre-order walk yielding `(depth, node)`, roots at depth 0
    pub fn iter(&self) -> ForestIter<'_> {
        ForestIter::over(&self.roots)
    }

    /// Find a comment anywhere in the forest
    pub fn find(&self, id: CommentId) -> Option<&CommentNode> {
        self.iter().map(|(_, node)| node).find(|node| node.id() == id)
    }

    /// Depth of the deepest reply; 0 when only roots exist, `None` when empty
    pub fn max_depth(&self) -> Option<usize> {
        self.iter().map(|(depth, _)| depth).max()
    }
}

impl PartialEq for CommentForest {
    fn eq(&self, other: &Self) -> bool {
        same_shape(&self.roots, &other.roots)
    }
}

impl Eq for CommentForest {}

impl<'a> IntoIterator for &'a CommentForest {
    type Item = (usize, &'a CommentNode);
    type IntoIter = ForestIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a forest in display order
pub struct ForestIter<'a> {
    stack: Vec<(usize, &'a CommentNode)>,
}

impl<'a> ForestIter<'a> {
    fn over(roots: &'a [CommentNode]) -> Self {
        Self {
            stack: roots.iter().rev().map(|node| (0, node)).collect(),
        }
    }
}

impl<'a> Iterator for ForestIter<'a> {
    type Item = (usize, &'a CommentNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children.iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

/// What a build left out of the forest, and why
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeReport {
    /// Comments placed in the forest
    pub placed: usize,
    /// Comments whose parent is not in the input
    pub dangling: Vec<CommentId>,
    /// Comments listing themselves as parent
    pub self_referencing: Vec<CommentId>,
    /// Ids that occurred more than once; the last record won
    pub duplicates: Vec<CommentId>,
    /// Comments whose ancestor chain loops without reaching a root
    pub unreachable: Vec<CommentId>,
}

impl TreeReport {
    /// Number of comments left out of the forest
    pub fn dropped(&self) -> usize {
        self.dangling.len() + self.self_referencing.len() + self.unreachable.len()
    }

    /// Check if every input comment was placed once
    pub fn is_clean(&self) -> bool {
        self.dropped() == 0 && self.duplicates.is_empty()
    }
}

/// Builds comment forests from flat comment lists
#[derive(Debug, Clone, Copy, Default)]
pub struct CommentTreeBuilder;

impl CommentTreeBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self
    }

    /// Build the forest for a list of comments
    pub fn build(&self, comments: &[Comment]) -> CommentForest {
        self.build_with_report(comments).0
    }

    /// Build the forest and report what was left out
    pub fn build_with_report(&self, comments: &[Comment]) -> (CommentForest, TreeReport) {
        let mut report = TreeReport::default();

        // Indexing pass: id -> position of the record owning it
        let mut lookup: HashMap<CommentId, usize> = HashMap::with_capacity(comments.len());
        for (pos, comment) in comments.iter().enumerate() {
            if lookup.insert(comment.id, pos).is_some() && !report.duplicates.contains(&comment.id)
            {
                report.duplicates.push(comment.id);
            }
        }

        // Linking pass, in input order
        let mut roots: Vec<usize> = Vec::new();
        let mut children: Vec<Vec<usize>> = vec![Vec::new(); comments.len()];
        let mut linked = vec![false; comments.len()];

        for (pos, comment) in comments.iter().enumerate() {
            if lookup.get(&comment.id) != Some(&pos) {
                continue;
            }

            match comment.parent_id {
                None => {
                    roots.push(pos);
                    linked[pos] = true;
                }
                Some(parent) if parent == comment.id => {
                    warn!("Comment {} lists itself as parent, dropping", comment.id);
                    report.self_referencing.push(comment.id);
                }
                Some(parent) => match lookup.get(&parent) {
                    Some(&parent_pos) => {
                        children[parent_pos].push(pos);
                        linked[pos] = true;
                    }
                    None => {
                        warn!(
                            "Comment {} replies to unknown comment {}, dropping",
                            comment.id, parent
                        );
                        report.dangling.push(comment.id);
                    }
                },
            }
        }

        // Assembly: post-order work-list so children are built before parents
        let mut built: Vec<Option<CommentNode>> = comments.iter().map(|_| None).collect();
        let mut placed = vec![false; comments.len()];
        let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&pos| (pos, false)).collect();

        while let Some((pos, expanded)) = stack.pop() {
            if expanded {
                let replies = children[pos]
                    .iter()
                    .filter_map(|&child| built[child].take())
                    .collect();
                built[pos] = Some(CommentNode {
                    comment: comments[pos].clone(),
                    children: replies,
                });
                placed[pos] = true;
            } else {
                stack.push((pos, true));
                stack.extend(children[pos].iter().rev().map(|&child| (child, false)));
            }
        }

        let forest = CommentForest {
            roots: roots.iter().filter_map(|&pos| built[pos].take()).collect(),
        };

        for (pos, comment) in comments.iter().enumerate() {
            if linked[pos] && !placed[pos] {
                report.unreachable.push(comment.id);
            }
        }
        if !report.unreachable.is_empty() {
            warn!(
                "{} comments form a reply cycle and were dropped",
                report.unreachable.len()
            );
        }

        report.placed = placed.iter().filter(|p| **p).count();
        debug!(
            "Built comment tree: {} roots, {} placed, {} dropped",
            forest.roots.len(),
            report.placed,
            report.dropped()
        );

        (forest, report)
    }
}

/// Build the forest for a list of comments
pub fn build_tree(comments: &[Comment]) -> CommentForest {
    CommentTreeBuilder::new().build(comments)
}
