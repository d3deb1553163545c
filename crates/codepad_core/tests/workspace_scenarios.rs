use std::{cell::RefCell, rc::Rc};

use codepad_core::{
    persistence::FILES_KEY, preview::VIEWPORT_META, FileId, FileSystemState, NodeKind, Notice,
    NoticeLevel, Workspace, WorkspaceError, WorkspaceEvent, WorkspaceServices,
    DEFAULT_ENTRY_CONTENT, PREVIEW_DEBOUNCE_MS,
};
use futures::executor::block_on;
use platform_host::{ManualTimerService, MemoryPrefsStore, PrefsStore, PrefsStoreFuture};
use pretty_assertions::assert_eq;

struct FailingStore;

impl PrefsStore for FailingStore {
    fn load_pref<'a>(
        &'a self,
        _key: &'a str,
    ) -> PrefsStoreFuture<'a, Result<Option<String>, String>> {
        Box::pin(async { Err("storage offline".to_string()) })
    }

    fn save_pref<'a>(
        &'a self,
        _key: &'a str,
        _raw_json: &'a str,
    ) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Err("quota exceeded".to_string()) })
    }

    fn delete_pref<'a>(&'a self, _key: &'a str) -> PrefsStoreFuture<'a, Result<(), String>> {
        Box::pin(async { Ok(()) })
    }
}

fn workspace_with(
    prefs: Rc<dyn PrefsStore>,
) -> (Workspace, Rc<ManualTimerService>, Rc<RefCell<Vec<WorkspaceEvent>>>) {
    let timers = Rc::new(ManualTimerService::default());
    let workspace = Workspace::new(WorkspaceServices {
        prefs,
        timers: timers.clone(),
    });
    let events = Rc::new(RefCell::new(Vec::new()));
    let sink = events.clone();
    workspace.subscribe(move |event| sink.borrow_mut().push(event.clone()));
    (workspace, timers, events)
}

fn notices(events: &RefCell<Vec<WorkspaceEvent>>) -> Vec<Notice> {
    events
        .borrow()
        .iter()
        .filter_map(|event| match event {
            WorkspaceEvent::Notice(notice) => Some(notice.clone()),
            _ => None,
        })
        .collect()
}

fn content(workspace: &Workspace, id: FileId) -> String {
    workspace
        .get_file(id)
        .and_then(|node| node.content().map(str::to_string))
        .unwrap_or_default()
}

#[test]
fn default_project_previews_entry_with_viewport() {
    let (workspace, _, _) = workspace_with(Rc::new(MemoryPrefsStore::default()));

    let html = workspace.current_preview_html();

    assert!(html.contains("<div><h1>Hello World!</h1></div>"));
    assert!(html.contains(VIEWPORT_META));
    assert!(!html.contains("<style>"));
    assert!(!html.contains("<script>"));
}

#[test]
fn css_and_js_files_are_injected_into_the_entry_document() {
    let (workspace, timers, _) = workspace_with(Rc::new(MemoryPrefsStore::default()));
    workspace
        .edit_content(
            FileId(1),
            "<html><head></head><body><div><h1>Hello World!</h1></div></body></html>",
        )
        .expect("edit");
    let css = workspace
        .create_file("style.css", NodeKind::File, None)
        .expect("css");
    workspace.edit_content(css, "body{color:red}").expect("css edit");
    let js = workspace.create_file("app.js", NodeKind::File, None).expect("js");
    workspace.edit_content(js, "console.log(1)").expect("js edit");
    timers.advance(u64::from(PREVIEW_DEBOUNCE_MS));

    let html = workspace.current_preview_html();

    assert!(html.contains("<style>body{color:red}</style></head>"));
    assert!(html.contains("<script>console.log(1)</script></body>"));
}

#[test]
fn css_and_js_reach_the_default_entry_without_a_body_tag() {
    let (workspace, timers, _) = workspace_with(Rc::new(MemoryPrefsStore::default()));
    workspace
        .upload_file("style.css", "body{color:red}")
        .expect("css");
    workspace.upload_file("app.js", "console.log(1)").expect("js");
    workspace.set_active_file(Some(FileId(1))).expect("activate entry");
    timers.advance(u64::from(PREVIEW_DEBOUNCE_MS));

    let html = workspace.current_preview_html();

    assert!(html.starts_with("<head>"));
    assert!(html.contains("<style>body{color:red}</style></head>"));
    assert!(html.contains("<div><h1>Hello World!</h1></div>"));
    assert!(html.ends_with("<script>console.log(1)</script>"));
}

#[test]
fn undo_twice_then_redo_walks_edit_history() {
    let (workspace, _, events) = workspace_with(Rc::new(MemoryPrefsStore::default()));
    let id = workspace
        .create_file("notes.txt", NodeKind::File, None)
        .expect("create");
    for text in ["a", "ab", "abc"] {
        workspace.edit_content(id, text).expect("edit");
    }

    workspace.undo(id).expect("undo");
    workspace.undo(id).expect("undo");
    assert_eq!(content(&workspace, id), "a");
    workspace.redo(id).expect("redo");
    assert_eq!(content(&workspace, id), "ab");

    workspace.edit_content(id, "x").expect("branch");
    assert_eq!(workspace.redo(id), Err(WorkspaceError::NothingToRedo));
    assert_eq!(
        notices(&events).last(),
        Some(&Notice::warning("Nothing to redo"))
    );
}

#[test]
fn deleting_a_folder_removes_its_children_only() {
    let (workspace, _, _) = workspace_with(Rc::new(MemoryPrefsStore::default()));
    let folder = workspace
        .create_file("F", NodeKind::Folder, None)
        .expect("folder");
    let child = workspace
        .create_file("g.js", NodeKind::File, Some(folder))
        .expect("child");
    let before_entry = workspace.get_file(FileId(1));

    workspace.delete_file(folder).expect("delete");

    assert!(workspace.get_file(folder).is_none());
    assert!(workspace.get_file(child).is_none());
    assert_eq!(workspace.get_file(FileId(1)), before_entry);
    assert_eq!(workspace.list_files().len(), 1);
}

#[test]
fn moving_a_folder_into_its_child_is_rejected() {
    let (workspace, _, events) = workspace_with(Rc::new(MemoryPrefsStore::default()));
    let folder = workspace
        .create_file("F", NodeKind::Folder, None)
        .expect("folder");
    let child = workspace
        .create_file("G", NodeKind::Folder, Some(folder))
        .expect("child");
    let before = workspace.snapshot();

    assert_eq!(
        workspace.move_file(folder, Some(child)),
        Err(WorkspaceError::MoveRejected)
    );
    assert_eq!(workspace.snapshot(), before);
    assert_eq!(
        notices(&events).last().map(|notice| notice.level),
        Some(NoticeLevel::Warning)
    );
}

#[test]
fn saved_project_is_restored_by_a_new_session() {
    let store = MemoryPrefsStore::default();
    let (first, timers, _) = workspace_with(Rc::new(store.clone()));
    let id = first
        .create_file("main.css", NodeKind::File, None)
        .expect("create");
    first.edit_content(id, "h1{}").expect("edit");
    first.save();
    timers.run_until_stalled();
    first.shutdown();

    let (second, _, _) = workspace_with(Rc::new(store.clone()));
    block_on(second.hydrate());

    assert_eq!(second.snapshot(), first.snapshot());
    assert_eq!(content(&second, id), "h1{}");
    assert!(store.raw(FILES_KEY).is_some());
}

#[test]
fn corrupt_snapshot_keeps_default_project_and_reports() {
    let store = MemoryPrefsStore::with_raw(FILES_KEY, "{\"files\": 7}");
    let (workspace, _, events) = workspace_with(Rc::new(store));

    block_on(workspace.hydrate());

    assert_eq!(workspace.snapshot(), FileSystemState::initial());
    assert_eq!(content(&workspace, FileId(1)), DEFAULT_ENTRY_CONTENT);
    assert_eq!(
        notices(&events),
        vec![Notice::error("Failed to load saved files")]
    );
}

#[test]
fn snapshot_with_maximal_id_keeps_default_project() {
    let raw = format!(
        r#"{{"files":[{{"id":{},"name":"a.js","parent_id":null,"body":{{"kind":"file","content":"x","history":{{"entries":["x"],"index":0}}}}}}],"next_id":1}}"#,
        u64::MAX
    );
    let (workspace, _, events) = workspace_with(Rc::new(MemoryPrefsStore::with_raw(FILES_KEY, &raw)));

    block_on(workspace.hydrate());

    assert_eq!(workspace.snapshot(), FileSystemState::initial());
    assert_eq!(
        notices(&events),
        vec![Notice::error("Failed to load saved files")]
    );
}

#[test]
fn storage_failures_become_error_notices() {
    let (workspace, timers, events) = workspace_with(Rc::new(FailingStore));

    block_on(workspace.hydrate());
    workspace.save();
    timers.run_until_stalled();

    assert_eq!(
        notices(&events),
        vec![
            Notice::error("Failed to load saved files"),
            Notice::error("Failed to save file"),
        ]
    );
    assert_eq!(workspace.last_saved_at_ms(), None);
}

#[test]
fn save_timestamps_increase() {
    let (workspace, timers, events) = workspace_with(Rc::new(MemoryPrefsStore::default()));

    workspace.save();
    timers.run_until_stalled();
    let first = workspace.last_saved_at_ms().expect("first save");
    workspace.save();
    timers.run_until_stalled();
    let second = workspace.last_saved_at_ms().expect("second save");

    assert!(second > first);
    let saved = events
        .borrow()
        .iter()
        .filter(|event| matches!(event, WorkspaceEvent::Saved { .. }))
        .count();
    assert_eq!(saved, 2);
}

#[test]
fn export_covers_single_and_multi_file_projects() {
    let (workspace, _, _) = workspace_with(Rc::new(MemoryPrefsStore::default()));
    let single = workspace.export_project().expect("single");
    assert_eq!(single.file_name, "index.html");

    workspace
        .upload_file("extra.js", "run()")
        .expect("upload");
    let archive = workspace.export_project().expect("archive");
    assert_eq!(archive.file_name, "project-export.md");
    assert!(archive.contents.contains("## File: extra.js\n```js\nrun()\n```"));
}
