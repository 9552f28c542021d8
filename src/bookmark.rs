use crate::storage::{KEY_PREFIX, SharedStore};
use chrono::{DateTime, Utc};

/// Last-read position of one book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bookmark {
    /// 0-based page index.
    pub page: usize,
    pub last_read: Option<DateTime<Utc>>,
}

/// Typed view of the per-book bookmark entries in the shared store.
#[derive(Clone)]
pub struct Bookmarks {
    store: SharedStore,
}

impl Bookmarks {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    fn page_key(book_id: &str) -> String {
        format!("{KEY_PREFIX}:bookmark:{book_id}")
    }

    fn last_read_key(book_id: &str) -> String {
        format!("{KEY_PREFIX}:last_read:{book_id}")
    }

    pub fn get_bookmark(&self, book_id: &str) -> Option<Bookmark> {
        let store = self.store.borrow();
        let raw = store.get(&Self::page_key(book_id))?;
        let page = match raw.trim().parse::<usize>() {
            Ok(page) => page,
            Err(e) => {
                log::warn!("Ignoring malformed bookmark for {book_id} ({raw:?}): {e}");
                return None;
            }
        };
        let last_read = store
            .get(&Self::last_read_key(book_id))
            .and_then(|ts| DateTime::parse_from_rfc3339(&ts).ok())
            .map(|ts| ts.with_timezone(&Utc));
        Some(Bookmark { page, last_read })
    }

    pub fn get_page(&self, book_id: &str) -> Option<usize> {
        self.get_bookmark(book_id).map(|bookmark| bookmark.page)
    }

    pub fn update_bookmark(&self, book_id: &str, page: usize) {
        let Ok(mut store) = self.store.try_borrow_mut() else {
            log::error!("Store busy, bookmark for {book_id} not saved");
            return;
        };
        store.set(&Self::page_key(book_id), &page.to_string());
        store.set(&Self::last_read_key(book_id), &Utc::now().to_rfc3339());
        log::debug!("Saved bookmark for {book_id}: page index {page}");
    }

    pub fn reset(&self, book_id: &str) {
        let Ok(mut store) = self.store.try_borrow_mut() else {
            log::error!("Store busy, bookmark for {book_id} not reset");
            return;
        };
        store.remove(&Self::page_key(book_id));
        store.remove(&Self::last_read_key(book_id));
        log::info!("Reset bookmark for {book_id}");
    }
}
