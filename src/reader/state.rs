use super::types::{ViewMode, Viewport};
use super::zoom::Zoom;

/// Default narrowest surface that shows a two-page spread.
pub const SPREAD_MIN_WIDTH_PX: u32 = 768;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("book {0} has no pages")]
    EmptyBook(String),
}

/// Navigation, view and zoom state of one open book.
///
/// `current_page` always lies in `0..pages.len()` and is the only source of
/// truth for both rendering and the bookmark.
#[derive(Debug)]
pub struct ReaderState {
    pub book_id: String,
    pub pages: Vec<String>,
    pub(crate) current_page: usize,
    pub view_mode: ViewMode,
    pub zoom: Zoom,
    pub viewport: Viewport,
    pub spread_min_width: u32,
}

impl ReaderState {
    pub fn new(
        book_id: impl Into<String>,
        pages: Vec<String>,
        start_page: usize,
        view_mode: ViewMode,
        viewport: Viewport,
    ) -> Result<Self, SessionError> {
        let book_id = book_id.into();
        if pages.is_empty() {
            return Err(SessionError::EmptyBook(book_id));
        }
        let current_page = start_page.min(pages.len() - 1);
        Ok(Self {
            book_id,
            pages,
            current_page,
            view_mode,
            zoom: Zoom::default(),
            viewport,
            spread_min_width: SPREAD_MIN_WIDTH_PX,
        })
    }

    pub fn with_spread_min_width(mut self, width: u32) -> Self {
        self.spread_min_width = width;
        self
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }
}
