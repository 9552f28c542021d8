use anyhow::Result;
pub use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};
use std::time::Duration;

/// Trait for abstracting event sources to enable testing
pub trait EventSource {
    /// Poll for events with a timeout
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next event
    fn read(&mut self) -> Result<Event>;
}

/// Real terminal event source using crossterm
pub struct KeyboardEventSource;

impl EventSource for KeyboardEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

/// Simulated event source for testing
pub struct SimulatedEventSource {
    pub(crate) events: Vec<Event>,
    current_index: usize,
}

impl SimulatedEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            current_index: 0,
        }
    }

    pub fn key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: crossterm::event::KeyEventState::empty(),
        })
    }

    pub fn key(code: KeyCode) -> Event {
        Self::key_event(code, KeyModifiers::empty())
    }

    pub fn char_key(c: char) -> Event {
        Self::key(KeyCode::Char(c))
    }

    pub fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        })
    }

    pub fn click(column: u16, row: u16) -> Vec<Event> {
        vec![
            Self::mouse(MouseEventKind::Down(MouseButton::Left), column, row),
            Self::mouse(MouseEventKind::Up(MouseButton::Left), column, row),
        ]
    }

    /// Press at `from`, drag to `to`, release there.
    pub fn drag(from: (u16, u16), to: (u16, u16)) -> Vec<Event> {
        vec![
            Self::mouse(MouseEventKind::Down(MouseButton::Left), from.0, from.1),
            Self::mouse(MouseEventKind::Drag(MouseButton::Left), to.0, to.1),
            Self::mouse(MouseEventKind::Up(MouseButton::Left), to.0, to.1),
        ]
    }

    pub fn scroll_up(column: u16, row: u16) -> Event {
        Self::mouse(MouseEventKind::ScrollUp, column, row)
    }

    pub fn scroll_down(column: u16, row: u16) -> Event {
        Self::mouse(MouseEventKind::ScrollDown, column, row)
    }
}

impl SimulatedEventSource {
    /// The whole script, including events already read.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_exhausted(&self) -> bool {
        self.current_index >= self.events.len()
    }
}

impl EventSource for SimulatedEventSource {
    // Always ready: once the script runs out every read is a quit key, so an
    // app driven by a scenario always terminates.
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(true)
    }

    fn read(&mut self) -> Result<Event> {
        if self.current_index < self.events.len() {
            let event = self.events[self.current_index].clone();
            self.current_index += 1;
            Ok(event)
        } else {
            // Exhausted: behave as if the user quit
            Ok(SimulatedEventSource::char_key('q'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simulated_event_source() {
        let mut events = vec![
            SimulatedEventSource::char_key('s'),
            SimulatedEventSource::key(KeyCode::Left),
        ];
        events.extend(SimulatedEventSource::drag((10, 5), (30, 6)));

        let mut source = SimulatedEventSource::new(events);
        assert!(source.poll(Duration::from_millis(0)).unwrap());

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('s'));
        }
        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Left);
        }
        match source.read().unwrap() {
            Event::Mouse(mouse) => {
                assert_eq!(mouse.kind, MouseEventKind::Down(MouseButton::Left));
                assert_eq!((mouse.column, mouse.row), (10, 5));
            }
            other => panic!("unexpected event {other:?}"),
        }
        source.read().unwrap();
        source.read().unwrap();

        assert!(source.is_exhausted());
        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('q'));
        }
    }
}
