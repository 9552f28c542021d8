//! Page stepping rules.
//!
//! The step is re-derived from the view mode and the current viewport every
//! time it is needed, so a resize between two page turns changes how far the
//! next turn goes.

use super::state::ReaderState;
use super::types::{PageDirection, ViewMode};

/// Pages shown for the current position. In a spread the leading page is
/// the one read first (the right-hand side of a right-to-left book).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisiblePages {
    pub leading: usize,
    pub trailing: Option<usize>,
}

impl ReaderState {
    /// Whether two pages are shown side by side right now.
    pub fn is_spread_active(&self) -> bool {
        self.view_mode == ViewMode::Spread && self.viewport.width >= self.spread_min_width
    }

    /// Pages moved by one navigation step.
    pub fn step(&self) -> usize {
        if self.is_spread_active() { 2 } else { 1 }
    }

    pub fn can_advance(&self) -> bool {
        self.current_page + self.step() < self.page_count()
    }

    pub fn can_retreat(&self) -> bool {
        self.current_page > 0
    }

    pub fn can_move(&self, direction: PageDirection) -> bool {
        match direction {
            PageDirection::Forward => self.can_advance(),
            PageDirection::Backward => self.can_retreat(),
        }
    }

    /// Destination of one step, or `None` when the step is refused.
    pub fn step_target(&self, direction: PageDirection) -> Option<usize> {
        if !self.can_move(direction) {
            return None;
        }
        let target = match direction {
            PageDirection::Forward => (self.current_page + self.step()).min(self.last_page()),
            PageDirection::Backward => self.current_page.saturating_sub(self.step()),
        };
        Some(target)
    }

    pub fn last_page(&self) -> usize {
        self.page_count() - 1
    }

    pub fn clamp_page(&self, page: usize) -> usize {
        page.min(self.last_page())
    }

    pub fn visible_pages(&self) -> VisiblePages {
        let leading = self.current_page;
        let trailing = if self.is_spread_active() && leading + 1 < self.page_count() {
            Some(leading + 1)
        } else {
            None
        };
        VisiblePages { leading, trailing }
    }

    /// Page references to display, leading page first.
    pub fn visible_refs(&self) -> Vec<&str> {
        let visible = self.visible_pages();
        std::iter::once(visible.leading)
            .chain(visible.trailing)
            .map(|index| self.pages[index].as_str())
            .collect()
    }

    /// Fraction of the book read, counting the current page.
    pub fn progress_ratio(&self) -> f64 {
        (self.current_page + 1) as f64 / self.page_count() as f64
    }

    /// `"3/20"` style counter, 1-based.
    pub fn page_label(&self) -> String {
        format!("{}/{}", self.current_page + 1, self.page_count())
    }

    /// Page under a click on the progress bar. The bar runs right to left:
    /// the right edge is the first page.
    pub fn progress_bar_target(&self, x: f32, width: f32) -> usize {
        if width.is_nan() || width <= 0.0 || !x.is_finite() {
            return self.current_page;
        }
        let ratio = (1.0 - x / width).clamp(0.0, 1.0);
        let page = (ratio * self.page_count() as f32).floor() as usize;
        self.clamp_page(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::types::Viewport;

    fn state(pages: usize, mode: ViewMode, width: u32) -> ReaderState {
        let pages = (1..=pages).map(|n| format!("{n:03}.png")).collect();
        ReaderState::new("001", pages, 0, mode, Viewport::new(width, 600)).unwrap()
    }

    #[test]
    fn single_mode_steps_one_page() {
        let mut s = state(3, ViewMode::Single, 1200);
        assert_eq!(s.step(), 1);
        assert_eq!(s.step_target(PageDirection::Forward), Some(1));
        s.current_page = 2;
        assert!(!s.can_advance());
        assert_eq!(s.step_target(PageDirection::Forward), None);
    }

    #[test]
    fn wide_spread_steps_two_pages() {
        let mut s = state(6, ViewMode::Spread, 1024);
        assert_eq!(s.step_target(PageDirection::Forward), Some(2));
        s.current_page = 2;
        assert_eq!(s.step_target(PageDirection::Backward), Some(0));
        s.current_page = 4;
        // 4 + 2 == 6 pages: nothing left to turn to.
        assert!(!s.can_advance());
    }

    #[test]
    fn narrow_spread_falls_back_to_single_step() {
        let mut s = state(6, ViewMode::Spread, 500);
        assert_eq!(s.step(), 1);
        assert_eq!(s.visible_pages().trailing, None);
        s.viewport = Viewport::new(768, 600);
        assert_eq!(s.step(), 2);
    }

    #[test]
    fn retreat_from_odd_page_in_spread_stops_at_zero() {
        let mut s = state(6, ViewMode::Spread, 1024);
        s.current_page = 1;
        assert_eq!(s.step_target(PageDirection::Backward), Some(0));
    }

    #[test]
    fn spread_pairing_omits_missing_trailing_page() {
        let mut s = state(5, ViewMode::Spread, 1024);
        assert_eq!(
            s.visible_pages(),
            VisiblePages {
                leading: 0,
                trailing: Some(1)
            }
        );
        s.current_page = 4;
        assert_eq!(
            s.visible_pages(),
            VisiblePages {
                leading: 4,
                trailing: None
            }
        );
        assert_eq!(s.visible_refs(), vec!["005.png"]);
    }

    #[test]
    fn progress_bar_is_right_to_left() {
        let s = state(10, ViewMode::Single, 800);
        assert_eq!(s.progress_bar_target(100.0, 100.0), 0);
        assert_eq!(s.progress_bar_target(0.0, 100.0), 9);
        assert_eq!(s.progress_bar_target(75.0, 100.0), 2);
        assert_eq!(s.progress_bar_target(10.0, 0.0), 0);
    }

    #[test]
    fn labels_and_ratio() {
        let mut s = state(4, ViewMode::Single, 800);
        s.current_page = 1;
        assert_eq!(s.page_label(), "2/4");
        assert!((s.progress_ratio() - 0.5).abs() < f64::EPSILON);
    }
}
