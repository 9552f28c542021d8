pub mod test_helpers {
    use crate::content_store::{ContentStore, page_path};
    use crate::event_source::{Event, KeyCode, SimulatedEventSource};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};
    use std::path::Path;

    /// In-memory library that remembers every path it was asked about.
    #[derive(Default)]
    pub struct MemoryContentStore {
        files: BTreeMap<String, String>,
        probes: RefCell<BTreeSet<String>>,
    }

    impl MemoryContentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Add `pages` empty `.png` pages to `book_id`.
        pub fn with_book(mut self, book_id: &str, pages: usize) -> Self {
            for n in 1..=pages {
                if let Some(path) = page_path(book_id, n, "png") {
                    self.files.insert(path, String::new());
                }
            }
            self
        }

        pub fn with_file(mut self, path: &str, content: &str) -> Self {
            self.files.insert(path.to_string(), content.to_string());
            self
        }

        pub fn probed(&self, path: &str) -> bool {
            self.probes.borrow().contains(path)
        }
    }

    impl ContentStore for MemoryContentStore {
        fn exists(&self, rel_path: &str) -> bool {
            self.probes.borrow_mut().insert(rel_path.to_string());
            self.files.contains_key(rel_path)
        }

        fn read_to_string(&self, rel_path: &str) -> Option<String> {
            self.files.get(rel_path).cloned()
        }

        fn resolve(&self, rel_path: &str) -> String {
            format!("mem://{rel_path}")
        }
    }

    /// Lay out a library on disk: one folder per `(book_id, pages)` holding
    /// empty `.png` pages.
    pub fn write_library(root: &Path, books: &[(&str, usize)]) {
        for (book_id, pages) in books {
            let dir = root.join(book_id);
            std::fs::create_dir_all(&dir).unwrap();
            for n in 1..=*pages {
                std::fs::write(dir.join(format!("{n:03}.png")), b"").unwrap();
            }
        }
    }

    /// Builder for creating test scenarios with simulated user input
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl Default for TestScenarioBuilder {
        fn default() -> Self {
            Self::new()
        }
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self { events: Vec::new() }
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key(code));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press_key(KeyCode::Enter)
        }

        /// Move the library selection down n times (press 'j' n times)
        pub fn navigate_down(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('j'));
            }
            self
        }

        pub fn navigate_up(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::char_key('k'));
            }
            self
        }

        /// Turn forward n times (left arrow)
        pub fn next_page(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::key(KeyCode::Left));
            }
            self
        }

        /// Turn back n times (right arrow)
        pub fn prev_page(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::key(KeyCode::Right));
            }
            self
        }

        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events.extend(SimulatedEventSource::click(column, row));
            self
        }

        pub fn drag(mut self, from: (u16, u16), to: (u16, u16)) -> Self {
            self.events.extend(SimulatedEventSource::drag(from, to));
            self
        }

        pub fn scroll_up(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::scroll_up(column, row));
            self
        }

        pub fn resize(mut self, columns: u16, rows: u16) -> Self {
            self.events.push(Event::Resize(columns, rows));
            self
        }

        /// Close the open book (press 'q')
        pub fn close_book(self) -> Self {
            self.press_char('q')
        }

        /// Quit the application (press 'q')
        pub fn quit(self) -> Self {
            self.press_char('q')
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    /// Create a test terminal for snapshot testing
    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// Capture the current terminal buffer as a string
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().map(|l| l.is_empty()).unwrap_or(false) {
            lines.pop();
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use crate::content_store::ContentStore;

    #[test]
    fn test_scenario_builder() {
        let scenario = TestScenarioBuilder::new()
            .navigate_down(2)
            .press_enter()
            .next_page(3)
            .click(10, 10)
            .close_book()
            .quit()
            .build();

        assert_eq!(scenario.events.len(), 10);
    }

    #[test]
    fn memory_store_records_probes() {
        let store = MemoryContentStore::new().with_book("001", 1);
        assert!(store.exists("001/001.png"));
        assert!(!store.exists("001/002.png"));
        assert!(store.probed("001/002.png"));
        assert!(!store.probed("002/001.png"));
    }
}
