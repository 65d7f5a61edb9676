use sheetnotes_core::{
    open_store_in_memory, CategoryManager, CategoryPatch, MemoryFlagStore, NoteError, NoteKey,
    NoteManager, NotePatch,
};
use uuid::Uuid;

const PARENT: &str = "actor-1";
const USER: &str = "gm";

#[test]
fn create_without_sort_appends_after_current_maximum() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);

    for (name, sort) in [("First", 1), ("Second", 2)] {
        manager
            .create(
                PARENT,
                NotePatch {
                    name: Some(name.to_string()),
                    sort: Some(sort),
                    ..NotePatch::default()
                },
            )
            .unwrap();
    }

    let appended = manager.create(PARENT, NotePatch::named("Third")).unwrap();
    assert_eq!(appended.sort, 3);
}

#[test]
fn create_on_empty_list_uses_entity_default_sort() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let note = manager.create(PARENT, NotePatch::named("Only")).unwrap();
    assert_eq!(note.sort, 100_000);
}

#[test]
fn get_and_get_all_and_count_reflect_persisted_records() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let first = manager.create(PARENT, NotePatch::named("First")).unwrap();
    manager.create(PARENT, NotePatch::named("Second")).unwrap();

    assert_eq!(manager.count(PARENT).unwrap(), 2);
    let fetched = manager.get(PARENT, first.key).unwrap().unwrap();
    assert_eq!(fetched, first);
    assert!(manager.get(PARENT, Uuid::new_v4()).unwrap().is_none());

    let nil = manager.get(PARENT, Uuid::nil());
    assert!(matches!(nil, Err(NoteError::InvalidArgument("key"))));

    let names: Vec<String> = manager
        .get_all(PARENT)
        .unwrap()
        .into_iter()
        .map(|note| note.name)
        .collect();
    assert_eq!(names, vec!["First", "Second"]);
}

#[test]
fn update_restamps_audit_fields_and_persists() {
    let mut store = open_store_in_memory().unwrap();

    let key = {
        let mut manager = NoteManager::new(&mut store, USER);
        manager.create(PARENT, NotePatch::named("Draft")).unwrap().key
    };

    let mut manager = NoteManager::new(&mut store, "player");
    let updated = manager
        .update(PARENT, key, NotePatch::named("Final"))
        .unwrap();
    assert_eq!(updated.name, "Final");
    assert_eq!(updated.stats.last_modified_by, "player");

    let stored = manager.get(PARENT, key).unwrap().unwrap();
    assert_eq!(stored, updated);

    let missing = manager.update(PARENT, Uuid::new_v4(), NotePatch::named("X"));
    assert!(matches!(missing, Err(NoteError::NotFound(_))));
}

#[test]
fn failed_update_leaves_persisted_state_untouched() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let note = manager.create(PARENT, NotePatch::named("Keep")).unwrap();

    let err = manager.update(PARENT, note.key, NotePatch::named("  "));
    assert!(matches!(err, Err(NoteError::Validation(_))));
    assert_eq!(manager.get(PARENT, note.key).unwrap().unwrap(), note);
}

#[test]
fn delete_and_delete_all_clear_records() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let first = manager.create(PARENT, NotePatch::named("First")).unwrap();
    manager.create(PARENT, NotePatch::named("Second")).unwrap();

    manager.delete(PARENT, first.key).unwrap();
    assert_eq!(manager.count(PARENT).unwrap(), 1);

    let missing = manager.delete(PARENT, first.key);
    assert!(matches!(missing, Err(NoteError::NotFound(_))));

    manager.delete_all(PARENT).unwrap();
    assert_eq!(manager.count(PARENT).unwrap(), 0);
}

#[test]
fn reorder_assigns_sequence_and_appends_unnamed_notes() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let k1 = manager.create(PARENT, NotePatch::named("One")).unwrap().key;
    let k2 = manager.create(PARENT, NotePatch::named("Two")).unwrap().key;
    let k3 = manager.create(PARENT, NotePatch::named("Three")).unwrap().key;

    manager.reorder(PARENT, &[k3, k1]).unwrap();

    let sort_of = |key: NoteKey, manager: &NoteManager<'_, _>| {
        manager.get(PARENT, key).unwrap().unwrap().sort
    };
    assert_eq!(sort_of(k3, &manager), 1);
    assert_eq!(sort_of(k1, &manager), 2);
    assert_eq!(sort_of(k2, &manager), 3);
}

#[test]
fn reorder_rejects_unknown_keys_without_writing() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let known = manager.create(PARENT, NotePatch::named("Known")).unwrap();

    let err = manager.reorder(PARENT, &[known.key, Uuid::new_v4()]);
    assert!(matches!(err, Err(NoteError::NotFound(_))));
    assert_eq!(
        manager.get(PARENT, known.key).unwrap().unwrap().sort,
        known.sort
    );
}

#[test]
fn reconcile_clears_dangling_references_and_skips_rewrites_when_clean() {
    let mut store = MemoryFlagStore::new();

    let (dangling_note, valid_note) = {
        let mut categories = CategoryManager::new(&mut store);
        let lore = categories.create(PARENT, CategoryPatch::named("Lore")).unwrap();

        let mut notes = NoteManager::new(&mut store, USER);
        let dangling = notes
            .create(
                PARENT,
                NotePatch {
                    name: Some("Dangling".to_string()),
                    category: Some(Some(Uuid::new_v4())),
                    ..NotePatch::default()
                },
            )
            .unwrap();
        let valid = notes
            .create(
                PARENT,
                NotePatch {
                    name: Some("Valid".to_string()),
                    category: Some(Some(lore.key)),
                    ..NotePatch::default()
                },
            )
            .unwrap();
        (dangling, valid)
    };

    let mut manager = NoteManager::new(&mut store, USER);
    assert_eq!(manager.reconcile_category_references(PARENT).unwrap(), 1);
    assert!(manager
        .get(PARENT, dangling_note.key)
        .unwrap()
        .unwrap()
        .category
        .is_none());
    assert!(manager
        .get(PARENT, valid_note.key)
        .unwrap()
        .unwrap()
        .category
        .is_some());

    let writes_before = store.write_count();
    let mut manager = NoteManager::new(&mut store, USER);
    assert_eq!(manager.reconcile_category_references(PARENT).unwrap(), 0);
    assert_eq!(store.write_count(), writes_before);
}
