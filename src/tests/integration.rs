use super::TestUtils;
use crate::history::EntryFilter;
use crate::storage::Store;
use crate::tree::{build_tree, render::render};
use pretty_assertions::assert_eq;

#[test]
fn record_then_browse_as_tree() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    let mut entries = vec![
        TestUtils::entry("s1", "/a", "ls"),
        TestUtils::entry("s1", "/a/b", "go build"),
        TestUtils::entry("s1", "/a", "ls"),
    ];
    for e in entries.iter_mut() {
        store.save(e).unwrap();
    }

    let loaded = store.load(&EntryFilter::default()).unwrap();
    assert_eq!(loaded.len(), 3);

    let root = build_tree(&loaded, 0);
    let expected = "\
/a
└── ls
└── b/
    └── go build
";
    assert_eq!(render(&root, "", 0), expected);
}

#[test]
fn browse_scoped_to_a_recorded_directory() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    let mut entries = vec![
        TestUtils::entry("s1", "/home/u/proj", "cargo build"),
        TestUtils::entry("s2", "/home/u/other", "ls"),
    ];
    for e in entries.iter_mut() {
        store.save(e).unwrap();
    }

    let loaded = store.load(&EntryFilter::default()).unwrap();
    let root = build_tree(&loaded, 0);

    assert_eq!(render(&root, "/home/u/proj", 0), "└── cargo build\n");
    assert_eq!(
        render(&root, "/nowhere", 0),
        "No history found for path: /nowhere\n"
    );
}

#[test]
fn session_filter_drives_the_flat_view() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    let mut entries = vec![
        TestUtils::entry("s1", "/a", "one"),
        TestUtils::entry("s2", "/a", "two"),
        TestUtils::entry("s1", "/b", "three"),
    ];
    for e in entries.iter_mut() {
        store.save(e).unwrap();
    }

    let filter = EntryFilter {
        session_id: Some("s1".to_string()),
        ..Default::default()
    };
    let loaded = store.load(&filter).unwrap();
    let commands: Vec<&str> = loaded.iter().map(|e| e.command.as_str()).collect();
    assert_eq!(commands, vec!["one", "three"]);

    assert_eq!(store.list_sessions().unwrap(), vec!["s1", "s2"]);
    assert_eq!(store.list_directories().unwrap(), vec!["/a", "/b"]);
}

#[test]
fn model_and_display_caps_compose() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();

    let mut entries = vec![
        TestUtils::entry("s1", "/d", "a"),
        TestUtils::entry("s1", "/d", "b"),
        TestUtils::entry("s1", "/d", "a"),
        TestUtils::entry("s1", "/d", "c"),
    ];
    for e in entries.iter_mut() {
        store.save(e).unwrap();
    }

    let loaded = store.load(&EntryFilter::default()).unwrap();

    // Model cap 2: dedup to [a, b, c], keep the last two.
    let root = build_tree(&loaded, 2);
    assert_eq!(root.children["d"].commands, vec!["b", "c"]);

    // Display cap 1 on top keeps only the most recent.
    let expected = "\
/d
└── c
";
    assert_eq!(render(&root, "", 1), expected);
}
