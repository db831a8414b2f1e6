//! Project model

use serde::{Deserialize, Serialize};

use super::ProjectMatter;

/// A single project write-up
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// File name without the `.md` suffix
    pub slug: String,

    /// Raw markdown body (front-matter stripped)
    pub content: String,

    /// Parsed front-matter
    pub data: ProjectMatter,
}

impl Project {
    /// Publication date formatted with a chrono format string
    pub fn display_date(&self, format: &str) -> Option<String> {
        self.data.date.map(|d| d.format(format).to_string())
    }

    /// Publication date in `YYYY-MM-DD` form
    pub fn iso_date(&self) -> Option<String> {
        self.display_date("%Y-%m-%d")
    }

    /// Title to show, falling back to the slug when the front-matter has none
    pub fn display_title(&self) -> &str {
        if self.data.title.trim().is_empty() {
            &self.slug
        } else {
            &self.data.title
        }
    }
}
