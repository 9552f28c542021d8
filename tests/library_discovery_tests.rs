use komaread::bookmark::Bookmarks;
use komaread::content_store::DirectoryStore;
use komaread::library::discover;
use komaread::storage::{MemoryStore, shared};
use komaread::test_utils::test_helpers::write_library;
use tempfile::TempDir;

fn bookmarks() -> Bookmarks {
    Bookmarks::new(shared(MemoryStore::new()))
}

#[test]
fn directory_library_stops_at_first_missing_book() {
    let root = TempDir::new().unwrap();
    write_library(root.path(), &[("001", 2), ("002", 5), ("004", 3)]);

    let catalog = discover(&DirectoryStore::new(root.path()), &bookmarks(), "png");
    let summary: Vec<(&str, usize)> = catalog
        .books()
        .iter()
        .map(|book| (book.id.as_str(), book.page_count))
        .collect();
    assert_eq!(summary, vec![("001", 2), ("002", 5)]);
}

#[test]
fn folder_without_first_page_is_not_a_book() {
    let root = TempDir::new().unwrap();
    write_library(root.path(), &[("001", 1)]);
    std::fs::create_dir_all(root.path().join("002")).unwrap();
    std::fs::write(root.path().join("002/002.png"), b"").unwrap();

    let catalog = discover(&DirectoryStore::new(root.path()), &bookmarks(), "png");
    assert_eq!(catalog.len(), 1);
}

#[test]
fn other_extensions_are_invisible() {
    let root = TempDir::new().unwrap();
    write_library(root.path(), &[("001", 2)]);

    let store = DirectoryStore::new(root.path());
    assert!(discover(&store, &bookmarks(), "jpg").is_empty());
    assert_eq!(discover(&store, &bookmarks(), "png").len(), 1);
}

#[test]
fn metadata_and_cover_are_picked_up() {
    let root = TempDir::new().unwrap();
    write_library(root.path(), &[("001", 3)]);
    std::fs::write(
        root.path().join("001/meta.json"),
        r#"{"title": "Prologue", "pageCount": 2}"#,
    )
    .unwrap();
    std::fs::write(root.path().join("001/cover.png"), b"").unwrap();

    let catalog = discover(&DirectoryStore::new(root.path()), &bookmarks(), "png");
    let book = catalog.get(0).unwrap();
    assert_eq!(book.title, "Prologue");
    assert_eq!(book.page_count, 2);
    assert!(book.cover_ref.ends_with("cover.png"));
}
