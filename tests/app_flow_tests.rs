//! End-to-end runs of the app over an on-disk library, driven by simulated
//! terminal input and rendered into a ratatui `TestBackend`.

use komaread::bookmark::Bookmarks;
use komaread::config::Config;
use komaread::content_store::DirectoryStore;
use komaread::event_source::SimulatedEventSource;
use komaread::settings::{ReaderSettings, save_reader_settings};
use komaread::storage::{JsonFileStore, SharedStore, shared};
use komaread::test_utils::test_helpers::*;
use komaread::{App, run_app_with_event_source};
use std::path::Path;
use std::time::Instant;
use tempfile::TempDir;

/// Store with page turns committing immediately.
fn instant_store(path: &Path) -> SharedStore {
    let store = shared(JsonFileStore::load_or_ephemeral(Some(path)));
    save_reader_settings(
        &store,
        &ReaderSettings {
            animation_speed: 0.0,
            ..ReaderSettings::default()
        },
    );
    store
}

fn new_app(library: &Path, store: SharedStore) -> App {
    App::new(
        Config::default(),
        Box::new(DirectoryStore::new(library)),
        library.display().to_string(),
        store,
    )
}

#[test]
fn reading_position_survives_restart() {
    let library = TempDir::new().unwrap();
    write_library(library.path(), &[("001", 4), ("002", 6)]);
    let data = TempDir::new().unwrap();
    let store_path = data.path().join("store.json");

    {
        let mut app = new_app(library.path(), instant_store(&store_path));
        let mut terminal = create_test_terminal(120, 40);
        let mut events = TestScenarioBuilder::new()
            .navigate_down(1)
            .press_enter()
            .next_page(3)
            .prev_page(1)
            .close_book()
            .quit()
            .build();
        run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();
        assert!(events.is_exhausted());
        assert_eq!(app.catalog.get(1).unwrap().progress, 3);
    }

    let reloaded = shared(JsonFileStore::load_from_file(&store_path).unwrap());
    assert_eq!(Bookmarks::new(reloaded.clone()).get_page("002"), Some(2));

    let mut app = new_app(library.path(), reloaded);
    app.open_book("002").unwrap();
    assert_eq!(app.session().unwrap().current_page(), 2);
}

#[test]
fn spread_view_puts_leading_page_on_the_right() {
    let library = TempDir::new().unwrap();
    write_library(library.path(), &[("001", 6)]);
    let data = TempDir::new().unwrap();
    let mut app = new_app(library.path(), instant_store(&data.path().join("store.json")));
    let mut terminal = create_test_terminal(120, 40);
    terminal.draw(|f| app.draw(f)).unwrap();

    let now = Instant::now();
    app.open_book("001").unwrap();
    for event in TestScenarioBuilder::new()
        .press_char('s')
        .next_page(1)
        .build()
        .events()
    {
        app.handle_event(event.clone(), now);
    }
    terminal.draw(|f| app.draw(f)).unwrap();
    assert_eq!(app.session().unwrap().current_page(), 2);

    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("3/6"), "{screen}");
    assert!(screen.contains("Spread"), "{screen}");
    let row = screen
        .lines()
        .find(|line| line.contains("003.png") && line.contains("004.png"))
        .unwrap_or_else(|| panic!("no row with both pages:\n{screen}"));
    assert!(row.find("004.png").unwrap() < row.find("003.png").unwrap());
}

#[test]
fn narrow_terminal_falls_back_to_single_steps() {
    let library = TempDir::new().unwrap();
    write_library(library.path(), &[("001", 6)]);
    let data = TempDir::new().unwrap();
    let mut app = new_app(library.path(), instant_store(&data.path().join("store.json")));
    let mut terminal = create_test_terminal(80, 30);
    let script = TestScenarioBuilder::new()
        .press_enter()
        .press_char('s')
        .next_page(1)
        .build();

    let now = Instant::now();
    terminal.draw(|f| app.draw(f)).unwrap();
    for event in script.events().to_vec() {
        app.handle_event(event, now);
        terminal.draw(|f| app.draw(f)).unwrap();
    }
    // 80 cells at 8 px is below the 768 px spread threshold.
    assert_eq!(app.session().unwrap().current_page(), 1);

    terminal.backend_mut().resize(120, 30);
    terminal.draw(|f| app.draw(f)).unwrap();
    app.handle_event(SimulatedEventSource::char_key(' '), now);
    assert_eq!(app.session().unwrap().current_page(), 3);
}

#[test]
fn empty_library_shows_hint_and_quits() {
    let library = TempDir::new().unwrap();
    let mut app = new_app(library.path(), shared(JsonFileStore::ephemeral()));
    let mut terminal = create_test_terminal(100, 20);
    let mut events = TestScenarioBuilder::new().press_enter().quit().build();
    run_app_with_event_source(&mut terminal, &mut app, &mut events).unwrap();

    assert!(!app.is_reading());
    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("No books found"), "{screen}");
}

#[test]
fn library_lists_titles_and_progress() {
    let library = TempDir::new().unwrap();
    write_library(library.path(), &[("001", 3), ("002", 2)]);
    std::fs::write(
        library.path().join("001/meta.json"),
        r#"{"title": "The First Volume"}"#,
    )
    .unwrap();
    let store = shared(JsonFileStore::ephemeral());
    Bookmarks::new(store.clone()).update_bookmark("002", 1);

    let mut app = new_app(library.path(), store);
    let mut terminal = create_test_terminal(120, 20);
    terminal.draw(|f| app.draw(f)).unwrap();

    let screen = capture_terminal_state(&terminal);
    assert!(screen.contains("The First Volume"), "{screen}");
    assert!(screen.contains("[new]"), "{screen}");
    assert!(screen.contains("[done]"), "{screen}");
}
