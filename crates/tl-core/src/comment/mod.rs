//! Comment system module
//!
//! Handles the comment schema, tree construction, and validation of new
//! comments.

pub mod builder;
pub mod model;
pub mod tree;
pub mod validator;

pub use builder::NewCommentBuilder;
pub use model::*;
pub use tree::{build_tree, CommentForest, CommentNode, CommentTreeBuilder, ForestIter, TreeReport};
pub use validator::CommentValidator;
