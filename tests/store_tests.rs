use std::fs;

use listly::core::error::Error;
use listly::core::store::{DB_FILE, Store};
use listly::core::task_list::TaskList;

// ============================================================================
// Helper Functions
// ============================================================================

fn list_with(name: &str, tasks: &[(&str, bool)]) -> TaskList {
    let mut list = TaskList::new(name);
    for (description, done) in tasks {
        list.add_new_task(*description, *done).unwrap();
    }
    list
}

fn descriptions(list: &TaskList) -> Vec<String> {
    list.tasks_in_order().map(|t| t.description.clone()).collect()
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_lists_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = Store::open(dir.path()).unwrap();
        let list = list_with("Groceries", &[("Milk", true), ("Eggs", false), ("Bread", false)]);
        store.save_list(&list).unwrap();
        store.set_current_list_name("Groceries").unwrap();
    }
    assert!(dir.path().join(DB_FILE).exists());

    let store = Store::open(dir.path()).unwrap();
    assert_eq!(store.current_list_name().unwrap(), "Groceries");

    let list = store.get_list("Groceries").unwrap();
    assert_eq!(descriptions(&list), ["Milk", "Eggs", "Bread"]);
    assert_eq!(list.num_done(), 1);
    assert_eq!(list.num_pending(), 2);
    list.check_invariants().unwrap();

    let infos = store.info().unwrap();
    let info = &infos["Groceries"];
    assert_eq!(info.num_tasks, 3);
    assert_eq!(info.num_done, 1);
}

#[test]
fn test_saving_again_replaces_old_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(dir.path()).unwrap();
    let mut list = list_with("Work", &[("a", false), ("b", false)]);
    store.save_list(&list).unwrap();

    let first = list.order()[0];
    list.remove_task(first).unwrap();
    store.save_list(&list).unwrap();

    let loaded = store.get_list("Work").unwrap();
    assert_eq!(descriptions(&loaded), ["b"]);
    assert!(!loaded.contains(first));
}

#[test]
fn test_missing_list_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(dir.path()).unwrap();
    assert!(matches!(store.get_list("Nope"), Err(Error::NotFound(_))));
    assert_eq!(store.current_list_name().unwrap(), "");
}

// ============================================================================
// Rename / Delete
// ============================================================================

#[test]
fn test_rename_moves_records_and_current() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(dir.path()).unwrap();
    store.save_list(&list_with("Old", &[("x", false)])).unwrap();
    store.set_current_list_name("Old").unwrap();

    store.rename_list("Old", "New").unwrap();
    assert!(!store.list_exists("Old").unwrap());
    assert_eq!(store.get_list("New").unwrap().name(), "New");
    assert_eq!(store.current_list_name().unwrap(), "New");
}

#[test]
fn test_failed_rename_leaves_store_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(dir.path()).unwrap();
    store.save_list(&list_with("A", &[("x", false)])).unwrap();
    store.save_list(&list_with("B", &[("y", true)])).unwrap();
    store.set_current_list_name("A").unwrap();

    assert!(matches!(store.rename_list("A", "B"), Err(Error::AlreadyExists(_))));
    assert!(store.rename_list("A", "").is_err());
    assert!(matches!(store.rename_list("C", "D"), Err(Error::NotFound(_))));

    let names: Vec<String> = store.list_names().unwrap().into_iter().collect();
    assert_eq!(names, ["A", "B"]);
    assert_eq!(descriptions(&store.get_list("A").unwrap()), ["x"]);
    assert_eq!(store.current_list_name().unwrap(), "A");
}

#[test]
fn test_delete_current_list_clears_current() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(dir.path()).unwrap();
    store.save_list(&list_with("A", &[])).unwrap();
    store.save_list(&list_with("B", &[])).unwrap();
    store.set_current_list_name("A").unwrap();

    assert_eq!(store.delete_lists(&["A", "missing"]).unwrap(), 1);
    assert_eq!(store.current_list_name().unwrap(), "");
    assert!(store.list_exists("B").unwrap());

    assert_eq!(store.delete_all_lists().unwrap(), 1);
    assert!(store.list_names().unwrap().is_empty());
}

// ============================================================================
// Clean
// ============================================================================

#[test]
fn test_clean_current_list_removes_done_tasks() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(dir.path()).unwrap();
    let list = list_with(
        "Chores",
        &[
            ("dishes", true),
            ("laundry", false),
            ("trash", true),
            ("vacuum", false),
            ("mail", true),
        ],
    );
    store.save_list(&list).unwrap();
    store.set_current_list_name("Chores").unwrap();

    assert_eq!(store.clean_current_list().unwrap(), 3);

    let cleaned = store.get_list("Chores").unwrap();
    assert_eq!(cleaned.len(), 2);
    assert_eq!(cleaned.num_done(), 0);
    assert_eq!(cleaned.num_pending(), 2);
    assert_eq!(descriptions(&cleaned), ["laundry", "vacuum"]);
}

#[test]
fn test_merge_is_all_or_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = Store::open(dir.path()).unwrap();
    store.save_list(&list_with("Taken", &[])).unwrap();

    let batch = [list_with("Fresh", &[("a", false)]), list_with("Taken", &[])];
    assert!(matches!(store.merge_generated(&batch), Err(Error::AlreadyExists(_))));
    assert!(!store.list_exists("Fresh").unwrap());

    store.merge_generated(&batch[..1]).unwrap();
    assert!(store.list_exists("Fresh").unwrap());
}

#[test]
fn test_stored_keymap_path() {
    let dir = tempfile::tempdir().unwrap();
    let keys = dir.path().join("keys.toml");
    fs::write(&keys, "").unwrap();

    let mut store = Store::open(dir.path()).unwrap();
    assert!(store.keymap_path().unwrap().is_none());
    store.set_keymap_path(keys.to_str().unwrap()).unwrap();
    assert_eq!(store.keymap_path().unwrap(), Some(keys));
    store.set_keymap_path("").unwrap();
    assert!(store.keymap_path().unwrap().is_none());
}
