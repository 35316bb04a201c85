//! Filesystem and GitHub helpers for oli.
//!
//! These are the operator-facing side effects: reading, listing and writing
//! files, keeping generated paths inside the working root, and talking to
//! GitHub through the `gh` CLI.

pub mod files;
pub mod github;
pub mod path;

pub use files::{list_dir, read_file, write_file};
pub use github::{GitHubCli, RepoInfo, format_repo_info};
pub use path::resolve_within;
