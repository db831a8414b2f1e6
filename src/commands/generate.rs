//! Generate static files

use anyhow::Result;
use notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::new_debouncer;
use std::path::Path;
use std::time::{Duration, Instant};

use crate::generator::Generator;
use crate::Folio;

/// Generate the static site
pub fn run(folio: &Folio) -> Result<()> {
    let start = Instant::now();

    let store = folio.projects();
    let projects = store.all();
    if projects.is_empty() {
        tracing::warn!("No projects found in {:?}", store.dir());
    } else {
        tracing::info!("Loaded {} projects", projects.len());
    }

    let generator = Generator::new(folio)?;
    generator.generate(&projects)?;

    let duration = start.elapsed();
    tracing::info!("Generated in {:.2}s", duration.as_secs_f64());

    Ok(())
}

/// Reload the site from disk and regenerate it.
///
/// `_config.yml` may have changed since `folio` was built, so the returned
/// site replaces it.
pub fn rebuild(folio: &Folio) -> Result<Folio> {
    let folio = Folio::new(&folio.base_dir)?;
    run(&folio)?;
    Ok(folio)
}

/// Block on debounced changes to the site inputs, rebuilding after each
/// burst and handing the fresh site to `on_rebuilt`
pub fn watch_changes<F>(folio: &Folio, mut on_rebuilt: F) -> Result<()>
where
    F: FnMut(&Folio),
{
    let (tx, rx) = std::sync::mpsc::channel();
    let mut debouncer = new_debouncer(Duration::from_millis(500), tx)?;

    for path in folio.watched_paths() {
        debouncer.watcher().watch(&path, RecursiveMode::Recursive)?;
        tracing::debug!("Watching: {:?}", path);
    }

    let mut current = folio.clone();
    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let changed: Vec<_> = events
                    .iter()
                    .filter(|e| is_relevant_change(&e.path))
                    .collect();
                if changed.is_empty() {
                    continue;
                }
                for event in &changed {
                    tracing::info!("File changed: {}", event.path.display());
                }

                match rebuild(&current) {
                    Ok(folio) => {
                        tracing::info!("Regenerated successfully");
                        on_rebuilt(&folio);
                        current = folio;
                    }
                    Err(e) => tracing::error!("Generation failed: {}", e),
                }
            }
            Ok(Err(e)) => tracing::error!("Watch error: {:?}", e),
            Err(e) => {
                tracing::error!("Channel error: {:?}", e);
                break;
            }
        }
    }

    Ok(())
}

/// Watch for file changes and regenerate
pub async fn watch(folio: &Folio) -> Result<()> {
    tracing::info!("Watching for changes. Press Ctrl+C to stop.");

    let folio = folio.clone();
    // The debouncer blocks on a std channel, keep it off the async workers
    tokio::task::spawn_blocking(move || watch_changes(&folio, |_| {})).await?
}

/// Editor swap files and VCS noise do not trigger rebuilds
fn is_relevant_change(path: &Path) -> bool {
    let path_str = path.to_string_lossy();
    !path_str.contains(".git")
        && !path_str.contains(".DS_Store")
        && !path_str.ends_with('~')
        && !path_str.ends_with(".swp")
}
