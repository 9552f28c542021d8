use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::APP_NAME;

/// Compute a slug that uniquely identifies a library directory.
/// Format: `<md5_first_12>_<slugified_last_2_path_components>`
///
/// Book ids restart at `001` in every library, so the store is kept per
/// library to keep bookmarks from colliding.
pub fn library_slug(abs_path: &Path) -> String {
    let digest = md5::compute(abs_path.to_string_lossy().as_bytes());
    let hash_prefix = &format!("{digest:x}")[..12];

    let components: Vec<&str> = abs_path
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(s) => s.to_str(),
            _ => None,
        })
        .collect();

    let tail = match components.len() {
        0 => vec!["root"],
        1 => components.clone(),
        n => components[n - 2..].to_vec(),
    };

    let slugified: Vec<String> = tail
        .iter()
        .map(|s| {
            s.chars()
                .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
                .collect::<String>()
                .to_lowercase()
        })
        .collect();

    format!("{hash_prefix}_{}", slugified.join("_"))
}

fn absolute(dir: &Path) -> Result<PathBuf> {
    if dir.is_absolute() {
        Ok(dir.to_path_buf())
    } else {
        Ok(std::env::current_dir()
            .context("Failed to get current directory")?
            .join(dir))
    }
}

/// Location of the bookmark/settings store for a library directory.
/// Creates the parent directory if needed.
pub fn resolve_store_path(library_dir: &Path) -> Result<PathBuf> {
    let slug = library_slug(&absolute(library_dir)?);
    let data_dir = dirs::data_dir()
        .context("Could not determine data directory")?
        .join(APP_NAME)
        .join("libraries")
        .join(slug);
    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory: {data_dir:?}"))?;
    Ok(data_dir.join("store.json"))
}

/// Log file path. Uses `state_dir` where the platform has one, else
/// `cache_dir`.
pub fn resolve_log_path() -> Result<PathBuf> {
    let base = dirs::state_dir()
        .or_else(dirs::cache_dir)
        .context("Could not determine state or cache directory")?;

    let log_dir = base.join(APP_NAME);
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory: {log_dir:?}"))?;

    Ok(log_dir.join("komaread.log"))
}
