use super::*;
use std::fs;
use tempfile::TempDir;

fn setup() -> (TempDir, StateStore) {
    let temp = TempDir::new().expect("Should create temp dir");
    let store = StateStore::open(temp.path().join("config.json")).expect("Should open store");
    (temp, store)
}

fn make_book(root: &Path, name: &str) -> PathBuf {
    let folder = root.join(name);
    fs::create_dir_all(&folder).expect("Should create book folder");
    fs::write(folder.join("01.mp3"), b"").expect("Should write audio file");
    folder
}

#[test]
fn test_register_uses_folder_name_as_title() {
    let (temp, mut store) = setup();
    let folder = make_book(temp.path(), "Treasure Island");

    let registration = register(&mut store, CardId::new("card1"), &folder, None, false)
        .expect("Should register");
    assert_eq!(registration.title, "Treasure Island");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_register_prefers_explicit_title() {
    let (temp, mut store) = setup();
    let folder = make_book(temp.path(), "book-01");

    let registration = register(
        &mut store,
        CardId::new("card1"),
        &folder,
        Some("Kidnapped".to_string()),
        false,
    )
    .expect("Should register");
    assert_eq!(registration.title, "Kidnapped");
}

#[test]
fn test_register_refuses_overwrite_without_force() {
    let (temp, mut store) = setup();
    let first = make_book(temp.path(), "First");
    let second = make_book(temp.path(), "Second");

    register(&mut store, CardId::new("card1"), &first, None, false).expect("Should register");
    assert!(register(&mut store, CardId::new("card1"), &second, None, false).is_err());

    let replaced = register(&mut store, CardId::new("card1"), &second, None, true)
        .expect("Should replace with force");
    assert_eq!(replaced.title, "Second");
    assert_eq!(store.len(), 1);
}

#[test]
fn test_register_rejects_missing_or_empty_folder() {
    let (temp, mut store) = setup();
    let missing = temp.path().join("nope");
    assert!(register(&mut store, CardId::new("card1"), &missing, None, false).is_err());

    let empty = temp.path().join("empty");
    fs::create_dir(&empty).expect("Should create folder");
    assert!(register(&mut store, CardId::new("card1"), &empty, None, false).is_err());
    assert!(store.is_empty());
}

#[test]
fn test_check_cards_reports_missing_folder() {
    let (temp, mut store) = setup();
    let folder = make_book(temp.path(), "Gone");
    register(&mut store, CardId::new("card1"), &folder, None, false).expect("Should register");
    assert!(check_cards(&store));

    fs::remove_dir_all(&folder).expect("Should remove folder");
    assert!(!check_cards(&store));
}

#[test]
fn test_unregistered_folders_skips_registered_and_empty() {
    let (temp, mut store) = setup();
    let library = temp.path().join("AudioBooks");
    let registered = make_book(&library, "Registered");
    make_book(&library, "Unregistered");
    fs::create_dir_all(library.join("Empty")).expect("Should create folder");

    register(&mut store, CardId::new("card1"), &registered, None, false).expect("Should register");

    let folders = unregistered_folders(&store, &library).expect("Should scan");
    assert_eq!(folders.len(), 1);
    assert!(folders[0].ends_with("Unregistered"));
}

#[test]
fn test_resolve_folder_falls_back_to_library() {
    let temp = TempDir::new().expect("Should create temp dir");
    let library = temp.path().join("AudioBooks");
    make_book(&library, "Moby Dick");

    assert_eq!(resolve_folder("Moby Dick", &library), library.join("Moby Dick"));
    assert_eq!(resolve_folder("Elsewhere", &library), PathBuf::from("Elsewhere"));
}

#[test]
fn test_format_position() {
    assert_eq!(format_position(0, 0.0), "not started");
    assert_eq!(format_position(2, 3725.4), "file 3, 1:02:05");
    assert_eq!(format_position(0, 59.0), "file 1, 0:00:59");
}

#[test]
fn test_format_last_played() {
    assert_eq!(format_last_played(None), "never");
    let t = NaiveDateTime::parse_from_str("2024-05-01 19:30:12", "%Y-%m-%d %H:%M:%S")
        .expect("Should parse timestamp");
    assert_eq!(format_last_played(Some(t)), "2024-05-01 19:30");
}
