//! CI host integration
//!
//! - [`actions`]: workflow commands and console progress
//! - [`github`]: pull request comments

pub mod actions;
pub mod github;

pub use actions::{error_annotation, group, is_github_actions, Spinner};
pub use github::{
    create_or_update_comment, CommentAction, CommentHost, GitHubClient, IssueComment,
};
