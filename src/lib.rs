//! folio: a static portfolio site generator
//!
//! Project write-ups live as markdown files with YAML front-matter in a flat
//! directory. This crate loads them, renders them with embedded Tera
//! templates and serves the result for local preview.

pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

use content::ProjectStore;

/// The main site application
#[derive(Clone)]
pub struct Folio {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Directory holding the project markdown files
    pub projects_dir: std::path::PathBuf,
    /// Public (output) directory
    pub public_dir: std::path::PathBuf,
}

impl Folio {
    /// Create a new instance from a site directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        let projects_dir = base_dir.join(&config.projects_dir);
        let public_dir = base_dir.join(&config.public_dir);

        Ok(Self {
            config,
            base_dir,
            projects_dir,
            public_dir,
        })
    }

    /// Project store rooted at the configured projects directory
    pub fn projects(&self) -> ProjectStore {
        ProjectStore::new(&self.projects_dir)
    }

    /// Existing inputs whose changes require a rebuild
    pub fn watched_paths(&self) -> Vec<std::path::PathBuf> {
        [
            self.projects_dir.clone(),
            self.base_dir.join("static"),
            self.base_dir.join("_config.yml"),
        ]
        .into_iter()
        .filter(|p| p.exists())
        .collect()
    }

    /// Generate the static site
    pub fn generate(&self) -> Result<()> {
        commands::generate::run(self)
    }

    /// Clean the public directory
    pub fn clean(&self) -> Result<()> {
        commands::clean::run(self)
    }
}
