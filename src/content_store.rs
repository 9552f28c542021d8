//! Access to the on-disk comic library.
//!
//! The library is a directory of zero-padded, 3-digit book folders
//! (`001`, `002`, ...), each holding zero-padded page images
//! (`001.png`, `002.png`, ...), an optional `cover.<ext>` and an optional
//! `meta.json`. Everything above this module only talks to [`ContentStore`],
//! so discovery can be exercised against an in-memory store in tests.

use std::path::{Path, PathBuf};

/// Width of every book and page sequence number.
pub const SEQUENCE_WIDTH: usize = 3;
/// Largest sequence number representable in [`SEQUENCE_WIDTH`] digits.
pub const MAX_SEQUENCE: usize = 999;

pub const METADATA_FILENAME: &str = "meta.json";
pub const COVER_STEM: &str = "cover";

/// Read-only view over the resources of a library.
pub trait ContentStore {
    /// Whether the resource at `rel_path` can be fetched.
    fn exists(&self, rel_path: &str) -> bool;

    /// Fetch a text resource. `None` means missing or unreadable.
    fn read_to_string(&self, rel_path: &str) -> Option<String>;

    /// Reference handed to the renderer for a resource.
    fn resolve(&self, rel_path: &str) -> String;
}

/// Zero-padded sequence id, `1 -> "001"`.
///
/// Returns `None` outside `1..=999`; the padding width is a hard limit.
pub fn sequence_id(n: usize) -> Option<String> {
    if n == 0 || n > MAX_SEQUENCE {
        return None;
    }
    Some(format!("{n:0width$}", width = SEQUENCE_WIDTH))
}

pub fn page_path(book_id: &str, page_number: usize, extension: &str) -> Option<String> {
    sequence_id(page_number).map(|page| format!("{book_id}/{page}.{extension}"))
}

pub fn cover_path(book_id: &str, extension: &str) -> String {
    format!("{book_id}/{COVER_STEM}.{extension}")
}

pub fn metadata_path(book_id: &str) -> String {
    format!("{book_id}/{METADATA_FILENAME}")
}

/// Library rooted at a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn full_path(&self, rel_path: &str) -> PathBuf {
        rel_path
            .split('/')
            .filter(|part| !part.is_empty())
            .fold(self.root.clone(), |acc, part| acc.join(part))
    }
}

impl ContentStore for DirectoryStore {
    fn exists(&self, rel_path: &str) -> bool {
        self.full_path(rel_path).is_file()
    }

    fn read_to_string(&self, rel_path: &str) -> Option<String> {
        let path = self.full_path(rel_path);
        match std::fs::read_to_string(&path) {
            Ok(content) => Some(content),
            Err(e) => {
                log::debug!("Could not read {path:?}: {e}");
                None
            }
        }
    }

    fn resolve(&self, rel_path: &str) -> String {
        self.full_path(rel_path).to_string_lossy().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn sequence_ids_are_three_digits() {
        assert_eq!(sequence_id(1).as_deref(), Some("001"));
        assert_eq!(sequence_id(42).as_deref(), Some("042"));
        assert_eq!(sequence_id(999).as_deref(), Some("999"));
        assert_eq!(sequence_id(0), None);
        assert_eq!(sequence_id(1000), None);
    }

    #[test]
    fn resource_paths() {
        assert_eq!(page_path("002", 7, "png").as_deref(), Some("002/007.png"));
        assert_eq!(cover_path("002", "jpg"), "002/cover.jpg");
        assert_eq!(metadata_path("010"), "010/meta.json");
    }

    #[test]
    fn directory_store_reads_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("001")).unwrap();
        std::fs::write(dir.path().join("001/001.png"), b"png").unwrap();
        std::fs::write(dir.path().join("001/meta.json"), "{}").unwrap();

        let store = DirectoryStore::new(dir.path());
        assert!(store.exists("001/001.png"));
        assert!(!store.exists("001/002.png"));
        assert!(!store.exists("001"));
        assert_eq!(store.read_to_string("001/meta.json").as_deref(), Some("{}"));
        assert_eq!(store.read_to_string("001/missing.json"), None);
        assert!(store.resolve("001/001.png").ends_with("001.png"));
    }
}
