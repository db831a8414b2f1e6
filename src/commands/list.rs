//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::Project;
use crate::Folio;

/// List site content by type
pub fn run(folio: &Folio, content_type: &str) -> Result<()> {
    print!("{}", render(folio, content_type)?);
    Ok(())
}

/// Build the listing text for a content type
pub fn render(folio: &Folio, content_type: &str) -> Result<String> {
    let store = folio.projects();
    let mut out = String::new();

    match content_type {
        "project" | "projects" => {
            let projects = store.all();
            writeln!(out, "Projects ({}):", projects.len())?;
            for project in &projects {
                writeln!(out, "  {}", project_line(project))?;
            }
        }
        "featured" => {
            let projects = store.featured(folio.config.featured_limit);
            writeln!(out, "Featured ({}):", projects.len())?;
            for project in &projects {
                writeln!(out, "  {}", project_line(project))?;
            }
        }
        "slug" | "slugs" => {
            let slugs = store.slugs();
            writeln!(out, "Slugs ({}):", slugs.len())?;
            for slug in slugs {
                writeln!(out, "  {}", slug)?;
            }
        }
        "tag" | "tags" => {
            let tags = store.tags();
            writeln!(out, "Tags ({}):", tags.len())?;
            for (tag, count) in tags {
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: projects, featured, slugs, tags",
                content_type
            );
        }
    }

    Ok(out)
}

fn project_line(project: &Project) -> String {
    format!(
        "{} - {}{} [{}]",
        project.iso_date().unwrap_or_else(|| "----------".to_string()),
        project.display_title(),
        if project.data.featured { " ★" } else { "" },
        project.slug
    )
}
