//! Content module - project files, front-matter and markdown rendering

mod frontmatter;
pub mod loader;
mod markdown;
mod project;

pub use frontmatter::ProjectMatter;
pub use loader::{ProjectError, ProjectStore};
pub use markdown::MarkdownRenderer;
pub use project::Project;
