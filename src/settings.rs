//! Persisted user preferences.
//!
//! Two independent JSON records live in the shared key/value store: one for
//! the library screen and one for the reader. Each is read once when its
//! screen starts and rewritten on every user change.

use crate::reader::ViewMode;
use crate::storage::{KEY_PREFIX, SharedStore};
use log::{debug, error};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

pub const DEFAULT_ANIMATION_SPEED: f32 = 0.3;
/// Animation speeds offered by the speed toggle, in seconds.
pub const ANIMATION_SPEEDS: [f32; 5] = [0.0, 0.15, 0.3, 0.5, 0.8];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReaderSettings {
    pub dark_mode: bool,
    pub view_mode: ViewMode,
    /// Page-turn animation length in seconds.
    pub animation_speed: f32,
    /// `#rrggbb`, or `None` for the theme background.
    pub background_color: Option<String>,
    pub panel_minimized: bool,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            dark_mode: false,
            view_mode: ViewMode::Single,
            animation_speed: DEFAULT_ANIMATION_SPEED,
            background_color: None,
            panel_minimized: false,
        }
    }
}

impl ReaderSettings {
    pub const KEY: &'static str = "settings:reader";

    pub fn animation_delay_ms(&self) -> u64 {
        if self.animation_speed.is_finite() && self.animation_speed > 0.0 {
            (self.animation_speed * 1000.0).round() as u64
        } else {
            0
        }
    }

    /// Next entry of [`ANIMATION_SPEEDS`] after the current speed.
    pub fn next_animation_speed(&self) -> f32 {
        ANIMATION_SPEEDS
            .iter()
            .copied()
            .find(|speed| *speed > self.animation_speed + f32::EPSILON)
            .unwrap_or(ANIMATION_SPEEDS[0])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LibrarySettings {
    pub dark_mode: bool,
    pub panel_minimized: bool,
}

impl LibrarySettings {
    pub const KEY: &'static str = "settings:library";
}

fn full_key(key: &str) -> String {
    format!("{KEY_PREFIX}:{key}")
}

/// Read a settings record, substituting defaults for anything missing or
/// malformed.
pub fn load_record<T: DeserializeOwned + Default>(store: &SharedStore, key: &str) -> T {
    let Some(raw) = store.borrow().get(&full_key(key)) else {
        debug!("No persisted {key}, using defaults");
        return T::default();
    };
    match serde_json::from_str::<T>(&raw) {
        Ok(record) => record,
        Err(e) => {
            error!("Failed to parse persisted {key}, using defaults: {e}");
            T::default()
        }
    }
}

pub fn save_record<T: Serialize>(store: &SharedStore, key: &str, record: &T) {
    match serde_json::to_string(record) {
        Ok(raw) => store.borrow_mut().set(&full_key(key), &raw),
        Err(e) => error!("Failed to serialize {key}: {e}"),
    }
}

pub fn load_reader_settings(store: &SharedStore) -> ReaderSettings {
    load_record(store, ReaderSettings::KEY)
}

pub fn save_reader_settings(store: &SharedStore, settings: &ReaderSettings) {
    save_record(store, ReaderSettings::KEY, settings);
}

pub fn load_library_settings(store: &SharedStore) -> LibrarySettings {
    load_record(store, LibrarySettings::KEY)
}

pub fn save_library_settings(store: &SharedStore, settings: &LibrarySettings) {
    save_record(store, LibrarySettings::KEY, settings);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, shared};

    #[test]
    fn reader_settings_round_trip() {
        let store = shared(MemoryStore::new());
        let settings = ReaderSettings {
            dark_mode: true,
            view_mode: ViewMode::Spread,
            animation_speed: 0.5,
            background_color: Some("#202020".to_string()),
            panel_minimized: true,
        };
        save_reader_settings(&store, &settings);
        assert_eq!(load_reader_settings(&store), settings);
        // The library record is independent.
        assert_eq!(load_library_settings(&store), LibrarySettings::default());
    }

    #[test]
    fn malformed_record_yields_defaults() {
        let store = shared(MemoryStore::new());
        store
            .borrow_mut()
            .set("komaread:settings:reader", "{\"viewMode\": 12");
        assert_eq!(load_reader_settings(&store), ReaderSettings::default());
    }

    #[test]
    fn partial_record_fills_missing_fields() {
        let store = shared(MemoryStore::new());
        store
            .borrow_mut()
            .set("komaread:settings:reader", "{\"viewMode\": \"spread\"}");
        let settings = load_reader_settings(&store);
        assert_eq!(settings.view_mode, ViewMode::Spread);
        assert_eq!(settings.animation_speed, DEFAULT_ANIMATION_SPEED);
    }

    #[test]
    fn animation_speed_cycles() {
        let mut settings = ReaderSettings::default();
        assert_eq!(settings.animation_delay_ms(), 300);
        settings.animation_speed = settings.next_animation_speed();
        assert_eq!(settings.animation_speed, 0.5);
        settings.animation_speed = 0.8;
        assert_eq!(settings.next_animation_speed(), 0.0);
        settings.animation_speed = 0.0;
        assert_eq!(settings.animation_delay_ms(), 0);
    }
}
