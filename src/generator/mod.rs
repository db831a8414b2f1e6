//! Generator module - renders the portfolio to static HTML with the built-in templates

use anyhow::Result;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::config::MenuItem;
use crate::content::loader::count_tags;
use crate::content::{MarkdownRenderer, Project};
use crate::helpers::{self, full_url_for, project_path, url_for};
use crate::templates::{ConfigData, PageMeta, ProjectData, TagData, TemplateRenderer};
use crate::Folio;

/// Default stylesheet, written unless `static/css/style.css` overrides it
const DEFAULT_STYLESHEET: &str = include_str!("../templates/site/style.css");

/// Length of descriptions derived from the project body
const DESCRIPTION_LENGTH: usize = 160;

/// Static site generator using Tera templates
pub struct Generator {
    folio: Folio,
    renderer: TemplateRenderer,
    markdown: MarkdownRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new(folio: &Folio) -> Result<Self> {
        let renderer = TemplateRenderer::new()?;
        let markdown = MarkdownRenderer::from_config(&folio.config.highlight);

        Ok(Self {
            folio: folio.clone(),
            renderer,
            markdown,
        })
    }

    /// Generate the entire site from projects already sorted newest first
    pub fn generate(&self, projects: &[Project]) -> Result<()> {
        fs::create_dir_all(&self.folio.public_dir)?;

        // Pages of deleted or unloadable projects must not outlive a rebuild
        let projects_out = self.folio.public_dir.join("projects");
        if projects_out.exists() {
            fs::remove_dir_all(&projects_out)?;
        }

        self.write_stylesheet()?;
        self.copy_static_assets()?;

        let config_data = self.build_config_data();
        let project_data = projects
            .iter()
            .map(|p| self.build_project_data(p))
            .collect::<Result<Vec<_>>>()?;

        self.generate_home_page(&project_data, &config_data)?;
        self.generate_projects_page(&project_data, &count_tags(projects), &config_data)?;
        self.generate_project_pages(&project_data, &config_data)?;
        self.generate_not_found_page(&config_data)?;
        self.generate_projects_json(projects)?;

        tracing::info!("Generated {} project pages", project_data.len());
        Ok(())
    }

    /// Build config data for templates
    fn build_config_data(&self) -> ConfigData {
        let config = &self.folio.config;
        ConfigData {
            title: config.title.clone(),
            description: config.description.clone(),
            author: config.author.clone(),
            url: config.url.clone(),
            root: url_for(config, "/"),
            language: config.language.clone(),
            date_format: config.date_format.clone(),
            menu: config
                .menu
                .iter()
                .map(|item| MenuItem {
                    name: item.name.clone(),
                    path: resolve_link(config, &item.path),
                })
                .collect(),
        }
    }

    /// Build template data for a project, rendering its markdown body
    fn build_project_data(&self, project: &Project) -> Result<ProjectData> {
        let config = &self.folio.config;
        let path = project_path(&project.slug);
        let content = self.markdown.render(&project.content)?;

        Ok(ProjectData {
            slug: project.slug.clone(),
            title: project.display_title().to_string(),
            description: project.data.description.clone(),
            date: project.iso_date().unwrap_or_default(),
            date_display: project
                .display_date(&config.date_format)
                .unwrap_or_default(),
            tags: project.data.tags.clone(),
            featured: project.data.featured,
            path: url_for(config, &path),
            permalink: full_url_for(config, &path),
            content,
        })
    }

    /// Create a base context with common variables
    fn create_base_context(&self, config_data: &ConfigData, current_path: &str) -> Context {
        let mut context = Context::new();
        context.insert("config", config_data);
        context.insert("current_path", current_path);
        context.insert("projects_url", &url_for(&self.folio.config, "projects/"));
        context.insert(
            "current_year",
            &chrono::Local::now().format("%Y").to_string(),
        );
        context
    }

    /// Metadata for pages that are not a single project
    fn site_meta(&self, title: &str, path: &str) -> PageMeta {
        let config = &self.folio.config;
        PageMeta {
            title: title.to_string(),
            og_title: title.to_string(),
            description: config.description.clone(),
            og_type: "website".to_string(),
            url: full_url_for(config, path),
            published_time: String::new(),
            tags: Vec::new(),
        }
    }

    /// Generate the home page with featured projects
    fn generate_home_page(&self, projects: &[ProjectData], config_data: &ConfigData) -> Result<()> {
        let featured: Vec<&ProjectData> = projects
            .iter()
            .filter(|p| p.featured)
            .take(self.folio.config.featured_limit)
            .collect();

        let mut context = self.create_base_context(config_data, &url_for(&self.folio.config, "/"));
        context.insert("meta", &self.site_meta(&self.folio.config.title, "/"));
        context.insert("featured", &featured);

        let html = self.renderer.render("index.html", &context)?;
        self.write_page("index.html", &html)
    }

    /// Generate the listing of all projects
    fn generate_projects_page(
        &self,
        projects: &[ProjectData],
        tags: &[(String, usize)],
        config_data: &ConfigData,
    ) -> Result<()> {
        let config = &self.folio.config;
        let title = format!("Projects - {}", config.author);

        let mut context = self.create_base_context(config_data, &url_for(config, "projects/"));
        context.insert("meta", &self.site_meta(&title, "projects/"));
        context.insert("projects", projects);
        let tags: Vec<TagData> = tags
            .iter()
            .map(|(name, count)| TagData {
                name: name.clone(),
                count: *count,
            })
            .collect();
        context.insert("tags", &tags);

        let html = self.renderer.render("projects.html", &context)?;
        self.write_page("projects/index.html", &html)
    }

    /// Generate one page per project
    fn generate_project_pages(
        &self,
        projects: &[ProjectData],
        config_data: &ConfigData,
    ) -> Result<()> {
        let config = &self.folio.config;

        for project in projects {
            let description = if project.description.trim().is_empty() {
                helpers::truncate(
                    helpers::strip_html(&project.content).trim(),
                    DESCRIPTION_LENGTH,
                    None,
                )
            } else {
                project.description.clone()
            };

            let meta = PageMeta {
                title: format!("{} - {}", project.title, config.author),
                og_title: project.title.clone(),
                description,
                og_type: "article".to_string(),
                url: project.permalink.clone(),
                published_time: project.date.clone(),
                tags: project.tags.clone(),
            };

            // Project pages highlight the "Projects" menu entry
            let mut context = self.create_base_context(config_data, &url_for(config, "projects/"));
            context.insert("meta", &meta);
            context.insert("project", project);

            let html = self.renderer.render("project.html", &context)?;
            let output = format!("{}index.html", project_path(&project.slug));
            self.write_page(&output, &html)?;
        }

        Ok(())
    }

    /// Generate the not-found page served for unknown paths
    fn generate_not_found_page(&self, config_data: &ConfigData) -> Result<()> {
        let mut context = self.create_base_context(config_data, "");
        context.insert("meta", &self.site_meta("Project Not Found", "404.html"));

        let html = self.renderer.render("404.html", &context)?;
        self.write_page("404.html", &html)
    }

    /// Export project records as JSON for other consumers
    fn generate_projects_json(&self, projects: &[Project]) -> Result<()> {
        let config = &self.folio.config;
        let data: Vec<serde_json::Value> = projects
            .iter()
            .map(|p| {
                serde_json::json!({
                    "slug": p.slug,
                    "url": full_url_for(config, &project_path(&p.slug)),
                    "data": p.data,
                    "content": p.content,
                })
            })
            .collect();

        let json = serde_json::to_string_pretty(&data)?;
        self.write_page("projects.json", &json)?;
        tracing::debug!("Generated projects.json");
        Ok(())
    }

    /// Write the bundled stylesheet
    fn write_stylesheet(&self) -> Result<()> {
        self.write_page("css/style.css", DEFAULT_STYLESHEET)
    }

    /// Copy files from `static/` into the public directory verbatim
    fn copy_static_assets(&self) -> Result<()> {
        let static_dir = self.folio.base_dir.join("static");
        if !static_dir.is_dir() {
            return Ok(());
        }

        for entry in WalkDir::new(&static_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }

            let relative = path.strip_prefix(&static_dir)?;
            let dest = self.folio.public_dir.join(relative);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(path, &dest)?;
            tracing::debug!("Copied: {:?}", relative);
        }

        Ok(())
    }

    /// Write a file below the public directory
    fn write_page(&self, relative: &str, contents: &str) -> Result<()> {
        let output_path = self.folio.public_dir.join(Path::new(relative));
        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&output_path, contents)?;
        tracing::debug!("Generated: {:?}", output_path);
        Ok(())
    }
}

/// Site-internal menu links get the root prefix; external ones stay as they are
fn resolve_link(config: &crate::config::SiteConfig, link: &str) -> String {
    if link.contains("://") || link.starts_with("mailto:") {
        link.to_string()
    } else {
        url_for(config, link)
    }
}
