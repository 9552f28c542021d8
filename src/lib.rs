pub mod bookmark;
pub mod config;
pub mod content_store;
pub mod event_source;
pub mod hud;
pub mod library;
pub mod library_view;
pub mod main_app;
pub mod panels;
pub mod panic_handler;
pub mod paths;
pub mod reader;
pub mod reader_view;
pub mod settings;
pub mod storage;
pub mod theme;

pub mod test_utils;

pub use main_app::{App, AppAction, run_app_with_event_source};
