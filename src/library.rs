//! Catalog discovery.
//!
//! Books are found by probing `001`, `002`, ... until the first id whose
//! first page is missing, so the catalog is always a contiguous prefix of
//! the positive integers. Missing resources are never errors; they only end
//! the relevant enumeration.

use crate::bookmark::Bookmarks;
use crate::content_store::{
    ContentStore, MAX_SEQUENCE, cover_path, metadata_path, page_path, sequence_id,
};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    /// Zero-padded folder name, e.g. `"002"`.
    pub id: String,
    pub title: String,
    pub cover_ref: String,
    pub page_count: usize,
    /// 1-based index of the bookmarked page, 0 if never opened.
    pub progress: usize,
    pub last_read: Option<DateTime<Utc>>,
}

impl Book {
    /// Renderer references for every page of the book, in reading order.
    pub fn page_refs(&self, store: &dyn ContentStore, extension: &str) -> Vec<String> {
        (1..=self.page_count)
            .filter_map(|n| page_path(&self.id, n, extension))
            .map(|path| store.resolve(&path))
            .collect()
    }

    pub fn is_started(&self) -> bool {
        self.progress > 0
    }

    pub fn is_finished(&self) -> bool {
        self.page_count > 0 && self.progress >= self.page_count
    }

    fn refresh_progress(&mut self, bookmarks: &Bookmarks) {
        let bookmark = bookmarks.get_bookmark(&self.id);
        self.progress = progress_for(bookmark.as_ref().map(|b| b.page), self.page_count);
        self.last_read = bookmark.and_then(|b| b.last_read);
    }
}

/// Optional per-book `meta.json`. Fields that are missing, blank or of the
/// wrong type are ignored individually.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BookMetadata {
    pub title: Option<String>,
    pub page_count: Option<usize>,
}

impl BookMetadata {
    pub fn parse(raw: &str) -> Option<Self> {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!("Ignoring malformed book metadata: {e}");
                return None;
            }
        };
        let object = value.as_object()?;
        let title = object
            .get("title")
            .and_then(|t| t.as_str())
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty());
        let page_count = object
            .get("pageCount")
            .and_then(|c| c.as_u64())
            .filter(|c| *c > 0)
            .map(|c| (c as usize).min(MAX_SEQUENCE));
        Some(Self { title, page_count })
    }

    fn load(store: &dyn ContentStore, book_id: &str) -> Self {
        store
            .read_to_string(&metadata_path(book_id))
            .and_then(|raw| Self::parse(&raw))
            .unwrap_or_default()
    }
}

/// Ordered, gap-free list of discovered books.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<Book>,
}

impl Catalog {
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Book> {
        self.books.get(index)
    }

    pub fn find(&self, book_id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id == book_id)
    }

    pub fn position(&self, book_id: &str) -> Option<usize> {
        self.books.iter().position(|book| book.id == book_id)
    }

    /// Re-read every book's progress from the bookmark store.
    pub fn refresh_progress(&mut self, bookmarks: &Bookmarks) {
        for book in &mut self.books {
            book.refresh_progress(bookmarks);
        }
    }
}

fn progress_for(bookmarked_page: Option<usize>, page_count: usize) -> usize {
    match bookmarked_page {
        Some(page) => (page + 1).min(page_count),
        None => 0,
    }
}

/// Count pages by probing `001`, `002`, ... up to the first missing one.
pub fn count_pages(store: &dyn ContentStore, book_id: &str, extension: &str) -> usize {
    let mut count = 0;
    for n in 1..=MAX_SEQUENCE {
        let Some(path) = page_path(book_id, n, extension) else {
            break;
        };
        if !store.exists(&path) {
            break;
        }
        count = n;
    }
    count
}

fn describe_book(
    store: &dyn ContentStore,
    bookmarks: &Bookmarks,
    book_id: String,
    extension: &str,
) -> Book {
    let metadata = BookMetadata::load(store, &book_id);

    let page_count = match metadata.page_count {
        Some(count) => count,
        None => {
            debug!("No declared page count for {book_id}, probing pages");
            count_pages(store, &book_id, extension)
        }
    };

    let cover = cover_path(&book_id, extension);
    let cover_ref = if store.exists(&cover) {
        store.resolve(&cover)
    } else {
        page_path(&book_id, 1, extension)
            .map(|first| store.resolve(&first))
            .unwrap_or_default()
    };

    let title = metadata.title.unwrap_or_else(|| book_id.clone());

    let mut book = Book {
        id: book_id,
        title,
        cover_ref,
        page_count,
        progress: 0,
        last_read: None,
    };
    book.refresh_progress(bookmarks);
    book
}

/// Build the catalog. A book exists iff its first page can be fetched;
/// enumeration stops at the first id that does not resolve.
pub fn discover(store: &dyn ContentStore, bookmarks: &Bookmarks, extension: &str) -> Catalog {
    let mut books = Vec::new();
    for n in 1..=MAX_SEQUENCE {
        let Some(book_id) = sequence_id(n) else {
            break;
        };
        let Some(first_page) = page_path(&book_id, 1, extension) else {
            break;
        };
        if !store.exists(&first_page) {
            debug!("No book at {book_id}, discovery finished");
            break;
        }
        books.push(describe_book(store, bookmarks, book_id, extension));
    }
    info!("Discovered {} books", books.len());
    Catalog { books }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, shared};
    use crate::test_utils::test_helpers::MemoryContentStore;

    fn bookmarks() -> Bookmarks {
        Bookmarks::new(shared(MemoryStore::new()))
    }

    #[test]
    fn discovery_stops_at_first_gap() {
        let store = MemoryContentStore::new()
            .with_book("001", 2)
            .with_book("002", 2)
            .with_book("003", 2)
            .with_book("005", 2)
            .with_book("006", 2);
        let catalog = discover(&store, &bookmarks(), "png");
        let ids: Vec<&str> = catalog.books().iter().map(|b| b.id.as_str()).collect();
        assert_eq!(ids, vec!["001", "002", "003"]);
    }

    #[test]
    fn empty_library_gives_empty_catalog() {
        let catalog = discover(&MemoryContentStore::new(), &bookmarks(), "png");
        assert!(catalog.is_empty());
    }

    #[test]
    fn declared_page_count_skips_page_probe() {
        let store = MemoryContentStore::new()
            .with_book("001", 3)
            .with_file("001/meta.json", r#"{"title": "Volume 1", "pageCount": 10}"#);
        let catalog = discover(&store, &bookmarks(), "png");
        let book = catalog.get(0).unwrap();
        assert_eq!(book.page_count, 10);
        assert_eq!(book.title, "Volume 1");
        // Only the first-page probes of 001 and 002 and the cover check.
        assert!(!store.probed("001/002.png"));
        assert!(!store.probed("001/004.png"));
    }

    #[test]
    fn page_count_falls_back_to_probing() {
        let store = MemoryContentStore::new()
            .with_book("001", 4)
            .with_file("001/meta.json", r#"{"pageCount": 0, "title": "   "}"#);
        let book = discover(&store, &bookmarks(), "png").get(0).cloned().unwrap();
        assert_eq!(book.page_count, 4);
        assert_eq!(book.title, "001");
        assert!(store.probed("001/005.png"));
        assert!(!store.probed("001/006.png"));
    }

    #[test]
    fn malformed_metadata_is_treated_as_absent() {
        let store = MemoryContentStore::new()
            .with_book("001", 2)
            .with_file("001/meta.json", "{ title: nope");
        let book = discover(&store, &bookmarks(), "png").get(0).cloned().unwrap();
        assert_eq!(book.title, "001");
        assert_eq!(book.page_count, 2);
    }

    #[test]
    fn wrongly_typed_field_does_not_hide_the_other() {
        let meta = BookMetadata::parse(r#"{"title": "Kept", "pageCount": "12"}"#).unwrap();
        assert_eq!(meta.title.as_deref(), Some("Kept"));
        assert_eq!(meta.page_count, None);
    }

    #[test]
    fn cover_prefers_dedicated_resource() {
        let store = MemoryContentStore::new()
            .with_book("001", 1)
            .with_file("001/cover.png", "")
            .with_book("002", 1);
        let catalog = discover(&store, &bookmarks(), "png");
        assert_eq!(catalog.get(0).unwrap().cover_ref, "mem://001/cover.png");
        assert_eq!(catalog.get(1).unwrap().cover_ref, "mem://002/001.png");
    }

    #[test]
    fn progress_comes_from_bookmarks_and_refreshes() {
        let store = MemoryContentStore::new().with_book("001", 5).with_book("002", 5);
        let marks = bookmarks();
        marks.update_bookmark("002", 2);

        let mut catalog = discover(&store, &marks, "png");
        assert_eq!(catalog.get(0).unwrap().progress, 0);
        assert_eq!(catalog.get(1).unwrap().progress, 3);
        assert!(catalog.get(1).unwrap().last_read.is_some());

        marks.update_bookmark("001", 9);
        catalog.refresh_progress(&marks);
        assert_eq!(catalog.get(0).unwrap().progress, 5);
        assert!(catalog.get(0).unwrap().is_finished());
    }

    #[test]
    fn page_refs_follow_page_count() {
        let store = MemoryContentStore::new().with_book("003", 3);
        let book = Book {
            id: "003".to_string(),
            title: "003".to_string(),
            cover_ref: String::new(),
            page_count: 3,
            progress: 0,
            last_read: None,
        };
        assert_eq!(
            book.page_refs(&store, "png"),
            vec!["mem://003/001.png", "mem://003/002.png", "mem://003/003.png"]
        );
    }
}
