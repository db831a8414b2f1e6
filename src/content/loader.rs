//! Project loader - reads project files from a flat directory
//!
//! Every call goes back to the filesystem, so results always reflect the
//! directory as it is right now.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

use super::{Project, ProjectMatter};

/// Extension of project files
const PROJECT_EXT: &str = ".md";

/// Why a project could not be loaded
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Project not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid front-matter in {path:?}: {source}")]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Slugs name files inside the directory and single pages below
/// `projects/`, never paths out of either
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\', '\0'])
}

/// Read-only view over a directory of `<slug>.md` project files
#[derive(Debug, Clone)]
pub struct ProjectStore {
    dir: PathBuf,
}

impl ProjectStore {
    /// Create a store rooted at `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Directory the store reads from
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path a slug maps to
    pub fn path_for(&self, slug: &str) -> PathBuf {
        self.dir.join(format!("{}{}", slug, PROJECT_EXT))
    }

    /// Load a project, reporting why it failed
    pub fn load(&self, slug: &str) -> Result<Project, ProjectError> {
        if !is_valid_slug(slug) {
            return Err(ProjectError::NotFound(slug.to_string()));
        }

        let path = self.path_for(slug);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ProjectError::NotFound(slug.to_string()),
            _ => ProjectError::Io {
                path: path.clone(),
                source: e,
            },
        })?;

        let (data, body) = ProjectMatter::parse(&content)
            .map_err(|source| ProjectError::FrontMatter { path, source })?;

        Ok(Project {
            slug: slug.to_string(),
            content: body.to_string(),
            data,
        })
    }

    /// Look up a project by slug. Any failure yields `None`.
    pub fn get_by_slug(&self, slug: &str) -> Option<Project> {
        match self.load(slug) {
            Ok(project) => Some(project),
            Err(ProjectError::NotFound(_)) => {
                tracing::debug!("No project named {:?} in {:?}", slug, self.dir);
                None
            }
            Err(e) => {
                tracing::warn!("Skipping project {:?}: {}", slug, e);
                None
            }
        }
    }

    /// All loadable projects, newest first.
    ///
    /// Projects sharing a date keep directory order; undated ones go last.
    pub fn all(&self) -> Vec<Project> {
        let mut projects: Vec<Project> = self
            .slugs()
            .iter()
            .filter_map(|slug| self.get_by_slug(slug))
            .collect();

        projects.sort_by(|a, b| b.data.date.cmp(&a.data.date));
        projects
    }

    /// Slugs of every project file, in directory order
    pub fn slugs(&self) -> Vec<String> {
        WalkDir::new(&self.dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::debug!("Cannot list {:?}: {}", self.dir, e);
                    None
                }
            })
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .file_name()
                    .to_str()
                    .and_then(|name| name.strip_suffix(PROJECT_EXT))
                    .filter(|slug| is_valid_slug(slug))
                    .map(str::to_string)
            })
            .collect()
    }

    /// Featured projects in `all()` order, at most `limit` of them
    pub fn featured(&self, limit: usize) -> Vec<Project> {
        self.all()
            .into_iter()
            .filter(|p| p.data.featured)
            .take(limit)
            .collect()
    }

    /// Tag usage counts, most used first (ties by name)
    pub fn tags(&self) -> Vec<(String, usize)> {
        count_tags(&self.all())
    }
}

/// Tag usage counts across `projects`, most used first (ties by name)
pub fn count_tags(projects: &[Project]) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for project in projects {
        for tag in &project.data.tags {
            *counts.entry(tag.as_str()).or_insert(0) += 1;
        }
    }

    let mut tags: Vec<_> = counts
        .into_iter()
        .map(|(tag, count)| (tag.to_string(), count))
        .collect();
    tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    tags
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn write_project(dir: &Path, slug: &str, date: &str, featured: bool, body: &str) {
        let content = format!(
            "---\ntitle: {slug} title\ndescription: About {slug}\ndate: {date}\ntags:\n  - Rust\n  - {slug}\nfeatured: {featured}\n---\n{body}"
        );
        fs::write(dir.join(format!("{}.md", slug)), content).unwrap();
    }

    #[test]
    fn test_get_by_slug() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "gateway", "2024-03-10", true, "## Stack\n\nLaravel.\n");
        let store = ProjectStore::new(dir.path());

        let project = store.get_by_slug("gateway").unwrap();
        assert_eq!(project.slug, "gateway");
        assert_eq!(project.data.title, "gateway title");
        assert_eq!(project.data.description, "About gateway");
        assert_eq!(project.data.date, NaiveDate::from_ymd_opt(2024, 3, 10));
        assert_eq!(project.data.tags, vec!["Rust", "gateway"]);
        assert!(project.data.featured);
        assert_eq!(project.content, "## Stack\n\nLaravel.\n");
    }

    #[test]
    fn test_missing_project_is_none() {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path());
        assert!(store.get_by_slug("nonexistent").is_none());
        assert!(matches!(
            store.load("nonexistent"),
            Err(ProjectError::NotFound(_))
        ));
    }

    #[test]
    fn test_malformed_frontmatter_is_none() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("broken.md"), "---\ntitle: [oops\n---\nBody").unwrap();
        let store = ProjectStore::new(dir.path());

        assert!(store.get_by_slug("broken").is_none());
        assert!(matches!(
            store.load("broken"),
            Err(ProjectError::FrontMatter { .. })
        ));
        // Still listed, just not loadable
        assert_eq!(store.slugs(), vec!["broken"]);
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_slug_cannot_escape_directory() {
        let root = TempDir::new().unwrap();
        let projects = root.path().join("projects");
        fs::create_dir(&projects).unwrap();
        write_project(root.path(), "secret", "2024-01-01", false, "hidden");

        let store = ProjectStore::new(&projects);
        assert!(store.get_by_slug("../secret").is_none());
    }

    #[test]
    fn test_dot_slugs_are_not_projects() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "real", "2024-01-01", false, "r");
        fs::write(dir.path().join("...md"), "---\ntitle: Dots\n---\nx").unwrap();
        fs::write(dir.path().join("..md"), "---\ntitle: Dot\n---\nx").unwrap();
        fs::write(dir.path().join(".md"), "---\ntitle: Empty\n---\nx").unwrap();
        let store = ProjectStore::new(dir.path());

        assert_eq!(store.slugs(), vec!["real"]);
        assert!(store.get_by_slug("..").is_none());
        assert!(store.get_by_slug(".").is_none());
        assert!(store.get_by_slug("").is_none());
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn test_wrong_shaped_field_keeps_project() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("listed.md"),
            "---\ntitle: [A, B]\nfeatured: [x]\ndate: 2024-01-01\n---\nBody",
        )
        .unwrap();
        let store = ProjectStore::new(dir.path());

        let project = store.get_by_slug("listed").unwrap();
        assert_eq!(project.display_title(), "listed");
        assert!(!project.data.featured);
        assert_eq!(project.content, "Body");
        assert_eq!(store.all().len(), 1);
    }

    #[test]
    fn test_all_sorted_newest_first() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "a", "2023-01-01", false, "A");
        write_project(dir.path(), "b", "2024-06-01", false, "B");
        let store = ProjectStore::new(dir.path());

        let slugs: Vec<_> = store.all().into_iter().map(|p| p.slug).collect();
        assert_eq!(slugs, vec!["b", "a"]);
    }

    #[test]
    fn test_all_is_non_increasing_and_stable() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "one", "2022-05-01", false, "1");
        write_project(dir.path(), "two", "2024-02-01", false, "2");
        write_project(dir.path(), "three", "2023-09-15", true, "3");
        write_project(dir.path(), "four", "2024-02-01", true, "4");
        fs::write(dir.path().join("undated.md"), "---\ntitle: Undated\n---\nx").unwrap();
        let store = ProjectStore::new(dir.path());

        let all = store.all();
        assert_eq!(all.len(), 5);
        for pair in all.windows(2) {
            assert!(pair[0].data.date >= pair[1].data.date);
        }
        assert_eq!(all.last().unwrap().slug, "undated");
        assert_eq!(store.all(), all);
    }

    #[test]
    fn test_slugs_only_markdown_files() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "alpha", "2024-01-01", false, "a");
        write_project(dir.path(), "beta", "2024-01-02", false, "b");
        fs::write(dir.path().join("notes.txt"), "not a project").unwrap();
        fs::write(dir.path().join("README.MD"), "wrong case").unwrap();
        fs::create_dir(dir.path().join("nested.md")).unwrap();

        let store = ProjectStore::new(dir.path());
        let mut slugs = store.slugs();
        slugs.sort();
        assert_eq!(slugs, vec!["alpha", "beta"]);
    }

    #[test]
    fn test_empty_directory() {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path());
        assert!(store.all().is_empty());
        assert!(store.slugs().is_empty());
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path().join("does-not-exist"));
        assert!(store.all().is_empty());
        assert!(store.slugs().is_empty());
        assert!(store.get_by_slug("anything").is_none());
    }

    #[test]
    fn test_reflects_filesystem_changes() {
        let dir = TempDir::new().unwrap();
        let store = ProjectStore::new(dir.path());
        assert!(store.get_by_slug("late").is_none());

        write_project(dir.path(), "late", "2024-01-01", false, "Arrived");
        assert_eq!(store.get_by_slug("late").unwrap().content, "Arrived");

        fs::remove_file(store.path_for("late")).unwrap();
        assert!(store.get_by_slug("late").is_none());
    }

    #[test]
    fn test_featured_and_tags() {
        let dir = TempDir::new().unwrap();
        write_project(dir.path(), "old", "2021-01-01", true, "o");
        write_project(dir.path(), "mid", "2022-01-01", false, "m");
        write_project(dir.path(), "new", "2023-01-01", true, "n");
        let store = ProjectStore::new(dir.path());

        let featured: Vec<_> = store.featured(4).into_iter().map(|p| p.slug).collect();
        assert_eq!(featured, vec!["new", "old"]);
        assert_eq!(store.featured(1).len(), 1);

        let tags = store.tags();
        assert_eq!(tags[0], ("Rust".to_string(), 3));
        assert_eq!(tags.len(), 4);
        assert_eq!(tags[1].0, "mid");
    }
}
