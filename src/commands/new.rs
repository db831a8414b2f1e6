//! Create a new project file

use anyhow::Result;
use std::fs;
use std::path::PathBuf;

use crate::content::ProjectMatter;
use crate::Folio;

/// Options for a new project
#[derive(Debug, Default)]
pub struct NewProject<'a> {
    pub title: &'a str,
    /// File name without extension; slugified title when absent
    pub slug: Option<&'a str>,
    pub tags: Vec<String>,
    pub featured: bool,
}

/// Write a new `<slug>.md` into the projects directory
pub fn create_project(folio: &Folio, options: &NewProject) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();

    let slug = match options.slug {
        Some(s) => s.to_string(),
        None => slug::slugify(options.title),
    };
    if slug.is_empty() || slug.contains(['/', '\\']) {
        anyhow::bail!("Invalid project slug: {:?}", slug);
    }

    fs::create_dir_all(&folio.projects_dir)?;
    let file_path = folio.projects().path_for(&slug);
    if file_path.exists() {
        anyhow::bail!("File already exists: {:?}", file_path);
    }

    let scaffold_path = folio.base_dir.join("scaffolds").join("project.md");
    let content = if scaffold_path.exists() {
        fs::read_to_string(&scaffold_path)?
            .replace("{{ title }}", &yaml_inline(&options.title)?)
            .replace("{{ date }}", &today.format("%Y-%m-%d").to_string())
            .replace("{{ tags }}", &yaml_inline(&options.tags)?)
            .replace("{{ featured }}", &options.featured.to_string())
    } else {
        let matter = ProjectMatter {
            title: options.title.to_string(),
            description: String::new(),
            date: Some(today),
            tags: options.tags.clone(),
            featured: options.featured,
            ..Default::default()
        };
        format!(
            "---\n{}---\n\n## Overview\n",
            serde_yaml::to_string(&matter)?
        )
    };

    fs::write(&file_path, content)?;
    tracing::info!("Created: {:?}", file_path);

    Ok(file_path)
}

/// Single-line YAML for a scaffold placeholder.
///
/// JSON strings and arrays are valid YAML flow nodes, and they stay quoted
/// wherever the placeholder sits in the scaffold.
fn yaml_inline<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_project_round_trips() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        let path = create_project(
            &folio,
            &NewProject {
                title: "Inventory: Sync & Reports",
                tags: vec!["Laravel".to_string(), "Excel".to_string()],
                featured: true,
                ..Default::default()
            },
        )
        .unwrap();
        assert!(path.ends_with("inventory-sync-reports.md"));

        let project = folio.projects().get_by_slug("inventory-sync-reports").unwrap();
        assert_eq!(project.data.title, "Inventory: Sync & Reports");
        assert_eq!(project.data.tags, vec!["Laravel", "Excel"]);
        assert!(project.data.featured);
        assert_eq!(project.data.date, Some(chrono::Local::now().date_naive()));
        assert!(project.content.contains("## Overview"));
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        let folio = Folio::new(dir.path()).unwrap();
        let options = NewProject {
            title: "Tracker",
            slug: Some("tracker"),
            ..Default::default()
        };

        create_project(&folio, &options).unwrap();
        assert!(create_project(&folio, &options).is_err());
    }

    #[test]
    fn test_uses_scaffold() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("scaffolds")).unwrap();
        fs::write(
            dir.path().join("scaffolds/project.md"),
            "---\ntitle: {{ title }}\ndate: {{ date }}\ntags: {{ tags }}\nfeatured: {{ featured }}\n---\nScaffolded\n",
        )
        .unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        create_project(
            &folio,
            &NewProject {
                title: "Blog Bridge",
                tags: vec!["WordPress".to_string()],
                ..Default::default()
            },
        )
        .unwrap();

        let project = folio.projects().get_by_slug("blog-bridge").unwrap();
        assert_eq!(project.data.tags, vec!["WordPress"]);
        assert!(!project.data.featured);
        assert_eq!(project.content, "Scaffolded\n");
    }

    #[test]
    fn test_scaffold_values_are_yaml_quoted() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("scaffolds")).unwrap();
        fs::write(
            dir.path().join("scaffolds/project.md"),
            "---\ntitle: {{ title }}\ntags: {{ tags }}\n---\n",
        )
        .unwrap();
        let folio = Folio::new(dir.path()).unwrap();

        let path = create_project(
            &folio,
            &NewProject {
                title: "Inventory: Sync",
                tags: vec!["C#, .NET".to_string(), "yes".to_string()],
                ..Default::default()
            },
        )
        .unwrap();
        assert!(path.ends_with("inventory-sync.md"));

        let project = folio.projects().get_by_slug("inventory-sync").unwrap();
        assert_eq!(project.data.title, "Inventory: Sync");
        assert_eq!(project.data.tags, vec!["C#, .NET", "yes"]);
    }

    #[test]
    fn test_yaml_inline() {
        assert_eq!(yaml_inline("a: b").unwrap(), r#""a: b""#);
        assert_eq!(
            yaml_inline(&vec!["x, y".to_string()]).unwrap(),
            r#"["x, y"]"#
        );
        assert_eq!(yaml_inline(&Vec::<String>::new()).unwrap(), "[]");
    }
}
