use sheetnotes_core::{
    open_store_in_memory, HostError, JournalCollection, JournalPage, NewJournalPage, NoteError,
    NoteManager, NotePatch, NoteText, TextFormat, ValidationError, FLAG_SCOPE,
};
use serde_json::{Map, Value};
use uuid::Uuid;

const PARENT: &str = "actor-1";
const USER: &str = "gm";

/// In-memory journal collection recording created pages.
#[derive(Default)]
struct MockJournal {
    created: Vec<(String, JournalPage)>,
    fail_next: bool,
}

impl JournalCollection for MockJournal {
    fn create_page(
        &mut self,
        container: &str,
        page: NewJournalPage,
    ) -> Result<JournalPage, HostError> {
        if self.fail_next {
            return Err(HostError::ContainerNotFound(container.to_string()));
        }

        let created = JournalPage {
            id: format!("page-{}", self.created.len() + 1),
            name: page.name,
            kind: page.kind,
            sort: page.sort,
            text: page.text,
            metadata: page.metadata,
        };
        self.created.push((container.to_string(), created.clone()));
        Ok(created)
    }
}

fn markdown_text(source: &str) -> NoteText {
    NoteText {
        content: format!("<p>{source}</p>"),
        format: TextFormat::Markdown,
        markdown: Some(source.to_string()),
    }
}

#[test]
fn import_appends_a_note_with_back_reference_metadata() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);

    let mut metadata = Map::new();
    metadata.insert("origin".to_string(), Value::String("module-x".to_string()));
    let page = JournalPage {
        id: "journal-7".to_string(),
        name: "Imported".to_string(),
        kind: "text".to_string(),
        sort: 12,
        text: markdown_text("imported body"),
        metadata,
    };

    let note = manager.import_from_journal(PARENT, &page).unwrap();
    assert_eq!(manager.count(PARENT).unwrap(), 1);
    assert_eq!(note.name, "Imported");
    assert_eq!(note.sort, 12);
    assert_eq!(note.flags[FLAG_SCOPE]["sourceId"], "journal-7");

    let stored = manager.get(PARENT, note.key).unwrap().unwrap();
    assert_eq!(stored, note);
}

#[test]
fn import_rejects_non_text_pages_without_persisting() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let page = JournalPage {
        id: "journal-8".to_string(),
        name: "Picture".to_string(),
        kind: "image".to_string(),
        sort: 0,
        text: NoteText::default(),
        metadata: Map::new(),
    };

    let err = manager.import_from_journal(PARENT, &page).unwrap_err();
    assert!(matches!(
        err,
        NoteError::Validation(ValidationError::UnexpectedPageKind(_))
    ));
    assert_eq!(manager.count(PARENT).unwrap(), 0);
}

#[test]
fn export_creates_one_page_in_the_requested_container() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let note = manager
        .create(
            PARENT,
            NotePatch {
                name: Some("Export me".to_string()),
                sort: Some(5),
                text: Some(markdown_text("export body")),
                ..NotePatch::default()
            },
        )
        .unwrap();

    let mut journal = MockJournal::default();
    let created = manager
        .export_to_journal(PARENT, note.key, &mut journal, "journal-entry-1")
        .unwrap();

    assert_eq!(journal.created.len(), 1);
    let (container, page) = &journal.created[0];
    assert_eq!(container, "journal-entry-1");
    assert_eq!(page.name, "Export me");
    assert_eq!(page.kind, "text");
    assert_eq!(page.sort, 5);
    assert_eq!(page.text, note.text);
    assert_eq!(created.id, "page-1");
}

#[test]
fn export_validates_container_and_note_key() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let note = manager.create(PARENT, NotePatch::named("Only")).unwrap();
    let mut journal = MockJournal::default();

    let blank = manager.export_to_journal(PARENT, note.key, &mut journal, "  ");
    assert!(matches!(blank, Err(NoteError::InvalidArgument("container"))));

    let missing = manager.export_to_journal(PARENT, Uuid::new_v4(), &mut journal, "journal-1");
    assert!(matches!(missing, Err(NoteError::NotFound(_))));
    assert!(journal.created.is_empty());
}

#[test]
fn host_rejections_surface_as_host_errors() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let note = manager.create(PARENT, NotePatch::named("Doomed")).unwrap();

    let mut journal = MockJournal {
        fail_next: true,
        ..MockJournal::default()
    };
    let err = manager
        .export_to_journal(PARENT, note.key, &mut journal, "journal-1")
        .unwrap_err();
    assert!(matches!(err, NoteError::Host(HostError::ContainerNotFound(_))));
}

#[test]
fn export_then_import_round_trips_note_fields() {
    let mut store = open_store_in_memory().unwrap();
    let mut manager = NoteManager::new(&mut store, USER);
    let note = manager
        .create(
            PARENT,
            NotePatch {
                name: Some("Round trip".to_string()),
                text: Some(markdown_text("same body")),
                ..NotePatch::default()
            },
        )
        .unwrap();

    let mut journal = MockJournal::default();
    let page = manager
        .export_to_journal(PARENT, note.key, &mut journal, "journal-1")
        .unwrap();
    let imported = manager.import_from_journal(PARENT, &page).unwrap();

    assert_ne!(imported.key, note.key);
    assert_eq!(imported.name, note.name);
    assert_eq!(imported.sort, note.sort);
    assert_eq!(imported.text, note.text);
    assert_eq!(imported.flags[FLAG_SCOPE]["sourceId"], "page-1");
}
