//! Reducer actions, side-effect intents, and transition logic for the workspace.

use thiserror::Error;

use crate::{
    model::{FileId, FileSystemState, NodeKind, SnapshotError},
    ops::{self, HistoryStep, UpdateOptions},
    search::{self, SearchQuery},
    templates,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// User-facing status message.
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
/// File tree plus the file currently open in the editor.
pub struct WorkspaceState {
    pub files: FileSystemState,
    pub active_file: Option<FileId>,
}

impl WorkspaceState {
    pub fn initial() -> Self {
        Self {
            files: FileSystemState::initial(),
            active_file: Some(FileId(1)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_workspace`].
pub enum WorkspaceAction {
    /// Create a file or folder. Files become active.
    Create {
        name: String,
        kind: NodeKind,
        content: Option<String>,
        parent_id: Option<FileId>,
    },
    Rename {
        id: FileId,
        name: String,
    },
    /// Delete a node and everything below it.
    Delete {
        id: FileId,
    },
    Duplicate {
        id: FileId,
    },
    Move {
        id: FileId,
        new_parent: Option<FileId>,
    },
    /// Replace a file's content, recording it in history.
    EditContent {
        id: FileId,
        content: String,
    },
    Undo {
        id: FileId,
    },
    Redo {
        id: FileId,
    },
    SetActive {
        id: Option<FileId>,
    },
    /// Add an uploaded `.html`, `.css` or `.js` file at the root.
    Upload {
        name: String,
        content: String,
    },
    ClearContent {
        id: FileId,
    },
    ReplaceInFile {
        id: FileId,
        query: SearchQuery,
        replacement: String,
    },
    /// Replace the whole tree with a restored snapshot.
    Hydrate(FileSystemState),
}

#[derive(Debug, Clone, PartialEq)]
/// Side-effect intents emitted by [`reduce_workspace`] for the controller to execute.
pub enum WorkspaceEffect {
    /// Recompose the preview after the debounce window.
    SchedulePreview,
    /// Recompose the preview right away, dropping any pending debounced recomposition.
    RecomposePreviewNow,
    /// Persist the file tree after the auto-save delay.
    SchedulePersist,
    Notify(Notice),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Rejected actions. State is unchanged whenever one of these is returned.
pub enum WorkspaceError {
    #[error("Cannot delete the only file")]
    LastFileDeletion,
    #[error("Invalid file type: {name}. Please upload .html, .css, or .js files")]
    UnsupportedUpload { name: String },
    #[error("File name cannot be empty")]
    EmptyName,
    #[error("Nothing to undo")]
    NothingToUndo,
    #[error("Nothing to redo")]
    NothingToRedo,
    #[error("Cannot move a folder into itself or into a file")]
    MoveRejected,
    #[error("No room for new files in this project")]
    IdSpaceExhausted,
    #[error("Saved project is unusable: {0}")]
    Snapshot(#[from] SnapshotError),
}

impl WorkspaceError {
    /// Severity used when the error is shown to the user.
    pub fn notice_level(&self) -> NoticeLevel {
        match self {
            Self::NothingToUndo | Self::NothingToRedo | Self::MoveRejected | Self::EmptyName => {
                NoticeLevel::Warning
            }
            Self::LastFileDeletion
            | Self::UnsupportedUpload { .. }
            | Self::IdSpaceExhausted
            | Self::Snapshot(_) => NoticeLevel::Error,
        }
    }

    pub fn to_notice(&self) -> Notice {
        Notice {
            level: self.notice_level(),
            message: self.to_string(),
        }
    }
}

/// Applies a [`WorkspaceAction`] and collects the resulting side effects.
///
/// Actions naming an unknown node are silent no-ops and return no effects.
///
/// # Errors
///
/// Returns a [`WorkspaceError`] for actions the user should be told were refused.
pub fn reduce_workspace(
    state: &mut WorkspaceState,
    action: WorkspaceAction,
) -> Result<Vec<WorkspaceEffect>, WorkspaceError> {
    let mut effects = Vec::new();
    match action {
        WorkspaceAction::Create {
            name,
            kind,
            content,
            parent_id,
        } => {
            let name = valid_name(&name)?;
            let parent_id = parent_id.filter(|parent| {
                state
                    .files
                    .get_by_id(*parent)
                    .is_some_and(|node| node.is_folder())
            });
            let (files, id) = ops::create(take(state), name.clone(), kind, content, parent_id);
            state.files = files;
            let id = id.ok_or(WorkspaceError::IdSpaceExhausted)?;
            if kind == NodeKind::File {
                state.active_file = Some(id);
            }
            effects.push(WorkspaceEffect::RecomposePreviewNow);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success(format!(
                "Created {name}"
            ))));
        }
        WorkspaceAction::Rename { id, name } => {
            let name = valid_name(&name)?;
            let unchanged = match state.files.get_by_id(id) {
                None => return Ok(effects),
                Some(node) => node.name == name,
            };
            if unchanged {
                return Ok(effects);
            }
            state.files = ops::rename(take(state), id, name);
            effects.push(WorkspaceEffect::RecomposePreviewNow);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success("File renamed")));
        }
        WorkspaceAction::Delete { id } => {
            let Some(name) = state.files.get_by_id(id).map(|node| node.name.clone()) else {
                return Ok(effects);
            };
            let before = state.files.file_count();
            let next = ops::delete(state.files.clone(), id);
            if before > 0 && next.file_count() == 0 {
                return Err(WorkspaceError::LastFileDeletion);
            }
            state.files = next;
            if state
                .active_file
                .is_some_and(|active| state.files.get_by_id(active).is_none())
            {
                state.active_file = first_file(&state.files);
            }
            effects.push(WorkspaceEffect::RecomposePreviewNow);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success(format!(
                "Deleted {name}"
            ))));
        }
        WorkspaceAction::Duplicate { id } => {
            let exists = state.files.get_by_id(id).is_some();
            let (files, copy) = ops::duplicate(take(state), id);
            state.files = files;
            let Some(copy) = copy else {
                return if exists {
                    Err(WorkspaceError::IdSpaceExhausted)
                } else {
                    Ok(effects)
                };
            };
            if state.files.get_by_id(copy).is_some_and(|node| node.is_file()) {
                state.active_file = Some(copy);
            }
            effects.push(WorkspaceEffect::RecomposePreviewNow);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success("File duplicated")));
        }
        WorkspaceAction::Move { id, new_parent } => {
            let Some(node) = state.files.get_by_id(id) else {
                return Ok(effects);
            };
            if node.parent_id == new_parent {
                return Ok(effects);
            }
            if !ops::can_move(&state.files, id, new_parent) {
                return Err(WorkspaceError::MoveRejected);
            }
            state.files = ops::move_node(take(state), id, new_parent);
            effects.push(WorkspaceEffect::RecomposePreviewNow);
            effects.push(WorkspaceEffect::SchedulePersist);
        }
        WorkspaceAction::EditContent { id, content } => {
            let changed = state
                .files
                .get_by_id(id)
                .and_then(|node| node.content())
                .is_some_and(|current| current != content);
            if !changed {
                return Ok(effects);
            }
            state.files = ops::update_content(take(state), id, content, UpdateOptions::default());
            effects.push(WorkspaceEffect::SchedulePreview);
            effects.push(WorkspaceEffect::SchedulePersist);
        }
        WorkspaceAction::Undo { id } => {
            let (files, step) = ops::undo(take(state), id);
            state.files = files;
            match step {
                HistoryStep::NotFound => return Ok(effects),
                HistoryStep::AtBoundary => return Err(WorkspaceError::NothingToUndo),
                HistoryStep::Applied => {}
            }
            effects.push(WorkspaceEffect::SchedulePreview);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success("Undone")));
        }
        WorkspaceAction::Redo { id } => {
            let (files, step) = ops::redo(take(state), id);
            state.files = files;
            match step {
                HistoryStep::NotFound => return Ok(effects),
                HistoryStep::AtBoundary => return Err(WorkspaceError::NothingToRedo),
                HistoryStep::Applied => {}
            }
            effects.push(WorkspaceEffect::SchedulePreview);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success("Redone")));
        }
        WorkspaceAction::SetActive { id } => {
            let valid = id.map_or(true, |id| {
                state.files.get_by_id(id).is_some_and(|node| node.is_file())
            });
            if !valid || state.active_file == id {
                return Ok(effects);
            }
            state.active_file = id;
            effects.push(WorkspaceEffect::RecomposePreviewNow);
        }
        WorkspaceAction::Upload { name, content } => {
            if templates::upload_language(&name).is_none() {
                return Err(WorkspaceError::UnsupportedUpload { name });
            }
            let (files, id) =
                ops::create(take(state), name.clone(), NodeKind::File, Some(content), None);
            state.files = files;
            let id = id.ok_or(WorkspaceError::IdSpaceExhausted)?;
            state.active_file = Some(id);
            effects.push(WorkspaceEffect::RecomposePreviewNow);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success(format!(
                "File {name} uploaded successfully"
            ))));
        }
        WorkspaceAction::ClearContent { id } => {
            let has_content = state
                .files
                .get_by_id(id)
                .and_then(|node| node.content())
                .is_some_and(|current| !current.is_empty());
            if !has_content {
                return Ok(effects);
            }
            state.files = ops::update_content(take(state), id, "", UpdateOptions::default());
            effects.push(WorkspaceEffect::SchedulePreview);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success("Content cleared")));
        }
        WorkspaceAction::ReplaceInFile {
            id,
            query,
            replacement,
        } => {
            let Some(current) = state.files.get_by_id(id).and_then(|node| node.content()) else {
                return Ok(effects);
            };
            let (replaced, count) = search::replace_all(current, &query, &replacement);
            if count == 0 {
                effects.push(WorkspaceEffect::Notify(Notice::warning("No matches found")));
                return Ok(effects);
            }
            state.files = ops::update_content(take(state), id, replaced, UpdateOptions::default());
            effects.push(WorkspaceEffect::SchedulePreview);
            effects.push(WorkspaceEffect::SchedulePersist);
            effects.push(WorkspaceEffect::Notify(Notice::success(format!(
                "Replaced {count} occurrence{}",
                if count == 1 { "" } else { "s" }
            ))));
        }
        WorkspaceAction::Hydrate(snapshot) => {
            state.files = snapshot.sanitized()?;
            let active_alive = state
                .active_file
                .and_then(|id| state.files.get_by_id(id))
                .is_some_and(|node| node.is_file());
            if !active_alive {
                state.active_file = first_file(&state.files);
            }
            effects.push(WorkspaceEffect::RecomposePreviewNow);
        }
    }
    Ok(effects)
}

fn take(state: &mut WorkspaceState) -> FileSystemState {
    std::mem::take(&mut state.files)
}

fn valid_name(name: &str) -> Result<String, WorkspaceError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(WorkspaceError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn first_file(files: &FileSystemState) -> Option<FileId> {
    files.files.iter().find(|node| node.is_file()).map(|node| node.id)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::{FileNode, DEFAULT_ENTRY_CONTENT};

    fn create(state: &mut WorkspaceState, name: &str, kind: NodeKind, parent: Option<FileId>) -> FileId {
        let _ = reduce_workspace(
            state,
            WorkspaceAction::Create {
                name: name.to_string(),
                kind,
                content: None,
                parent_id: parent,
            },
        )
        .expect("create");
        state.files.files.last().expect("node").id
    }

    fn content(state: &WorkspaceState, id: FileId) -> Option<&str> {
        state.files.get_by_id(id).and_then(FileNode::content)
    }

    #[test]
    fn create_file_activates_it_and_recomposes_immediately() {
        let mut state = WorkspaceState::initial();
        let effects = reduce_workspace(
            &mut state,
            WorkspaceAction::Create {
                name: "  style.css ".to_string(),
                kind: NodeKind::File,
                content: Some("p{}".to_string()),
                parent_id: None,
            },
        )
        .expect("create");

        assert_eq!(state.active_file, Some(FileId(2)));
        assert_eq!(state.files.get_by_id(FileId(2)).map(|n| n.name.as_str()), Some("style.css"));
        assert_eq!(
            effects,
            vec![
                WorkspaceEffect::RecomposePreviewNow,
                WorkspaceEffect::SchedulePersist,
                WorkspaceEffect::Notify(Notice::success("Created style.css")),
            ]
        );
    }

    #[test]
    fn create_under_file_falls_back_to_root_and_folders_keep_active() {
        let mut state = WorkspaceState::initial();
        let folder = create(&mut state, "src", NodeKind::Folder, Some(FileId(1)));

        assert_eq!(state.files.get_by_id(folder).and_then(|n| n.parent_id), None);
        assert_eq!(state.active_file, Some(FileId(1)));
        assert_eq!(
            reduce_workspace(
                &mut state,
                WorkspaceAction::Create {
                    name: "   ".into(),
                    kind: NodeKind::File,
                    content: None,
                    parent_id: None
                }
            ),
            Err(WorkspaceError::EmptyName)
        );
    }

    #[test]
    fn deleting_last_file_is_rejected() {
        let mut state = WorkspaceState::initial();
        let folder = create(&mut state, "empty", NodeKind::Folder, None);
        let before = state.clone();

        let err = reduce_workspace(&mut state, WorkspaceAction::Delete { id: FileId(1) })
            .expect_err("last file");
        assert_eq!(err, WorkspaceError::LastFileDeletion);
        assert_eq!(err.to_notice(), Notice::error("Cannot delete the only file"));
        assert_eq!(state, before);

        reduce_workspace(&mut state, WorkspaceAction::Delete { id: folder }).expect("folder");
        assert!(state.files.get_by_id(folder).is_none());
    }

    #[test]
    fn deleting_folder_with_the_only_file_is_rejected_too() {
        let mut state = WorkspaceState::default();
        let folder = create(&mut state, "src", NodeKind::Folder, None);
        create(&mut state, "a.html", NodeKind::File, Some(folder));

        assert_eq!(
            reduce_workspace(&mut state, WorkspaceAction::Delete { id: folder }),
            Err(WorkspaceError::LastFileDeletion)
        );
    }

    #[test]
    fn deleting_active_file_selects_first_remaining() {
        let mut state = WorkspaceState::initial();
        let css = create(&mut state, "a.css", NodeKind::File, None);
        assert_eq!(state.active_file, Some(css));

        let effects =
            reduce_workspace(&mut state, WorkspaceAction::Delete { id: css }).expect("delete");
        assert_eq!(state.active_file, Some(FileId(1)));
        assert!(effects.contains(&WorkspaceEffect::Notify(Notice::success("Deleted a.css"))));
    }

    #[test]
    fn unknown_ids_are_silent_noops() {
        let mut state = WorkspaceState::initial();
        let before = state.clone();
        let ghost = FileId(404);
        for action in [
            WorkspaceAction::Delete { id: ghost },
            WorkspaceAction::Duplicate { id: ghost },
            WorkspaceAction::Rename { id: ghost, name: "x".into() },
            WorkspaceAction::Undo { id: ghost },
            WorkspaceAction::Move { id: ghost, new_parent: None },
            WorkspaceAction::EditContent { id: ghost, content: "x".into() },
            WorkspaceAction::SetActive { id: Some(ghost) },
        ] {
            assert_eq!(reduce_workspace(&mut state, action), Ok(Vec::new()));
        }
        assert_eq!(state, before);
    }

    #[test]
    fn edits_debounce_and_history_boundaries_report_errors() {
        let mut state = WorkspaceState::initial();
        let id = FileId(1);

        let effects = reduce_workspace(
            &mut state,
            WorkspaceAction::EditContent { id, content: "x".into() },
        )
        .expect("edit");
        assert_eq!(
            effects,
            vec![WorkspaceEffect::SchedulePreview, WorkspaceEffect::SchedulePersist]
        );

        reduce_workspace(&mut state, WorkspaceAction::Undo { id }).expect("undo");
        assert_eq!(content(&state, id), Some(DEFAULT_ENTRY_CONTENT));
        let err = reduce_workspace(&mut state, WorkspaceAction::Undo { id }).expect_err("boundary");
        assert_eq!(err.to_notice(), Notice::warning("Nothing to undo"));

        reduce_workspace(&mut state, WorkspaceAction::Redo { id }).expect("redo");
        assert_eq!(
            reduce_workspace(&mut state, WorkspaceAction::Redo { id }),
            Err(WorkspaceError::NothingToRedo)
        );
    }

    #[test]
    fn move_into_descendant_is_rejected() {
        let mut state = WorkspaceState::initial();
        let outer = create(&mut state, "outer", NodeKind::Folder, None);
        let inner = create(&mut state, "inner", NodeKind::Folder, Some(outer));
        let before = state.clone();

        assert_eq!(
            reduce_workspace(&mut state, WorkspaceAction::Move { id: outer, new_parent: Some(inner) }),
            Err(WorkspaceError::MoveRejected)
        );
        assert_eq!(state, before);

        reduce_workspace(&mut state, WorkspaceAction::Move { id: FileId(1), new_parent: Some(inner) })
            .expect("move");
        assert_eq!(state.files.path_of(FileId(1)), "outer/inner/index.html");
    }

    #[test]
    fn uploads_validate_extension() {
        let mut state = WorkspaceState::initial();
        let err = reduce_workspace(
            &mut state,
            WorkspaceAction::Upload { name: "logo.png".into(), content: String::new() },
        )
        .expect_err("png");
        assert_eq!(
            err.to_string(),
            "Invalid file type: logo.png. Please upload .html, .css, or .js files"
        );
        assert_eq!(err.notice_level(), NoticeLevel::Error);

        reduce_workspace(
            &mut state,
            WorkspaceAction::Upload { name: "Main.JS".into(), content: "go()".into() },
        )
        .expect("js upload");
        let uploaded = state.active_file.expect("active");
        assert_eq!(content(&state, uploaded), Some("go()"));
        assert_eq!(state.files.get_by_id(uploaded).and_then(|n| n.parent_id), None);
    }

    #[test]
    fn clear_and_replace_record_history() {
        let mut state = WorkspaceState::initial();
        let id = FileId(1);

        let effects = reduce_workspace(
            &mut state,
            WorkspaceAction::ReplaceInFile {
                id,
                query: SearchQuery::new("Hello"),
                replacement: "Bye".into(),
            },
        )
        .expect("replace");
        assert!(effects.contains(&WorkspaceEffect::Notify(Notice::success("Replaced 1 occurrence"))));
        assert!(content(&state, id).is_some_and(|c| c.contains("<h1>Bye World!</h1>")));

        reduce_workspace(&mut state, WorkspaceAction::ClearContent { id }).expect("clear");
        assert_eq!(content(&state, id), Some(""));
        reduce_workspace(&mut state, WorkspaceAction::Undo { id }).expect("undo clear");
        assert!(content(&state, id).is_some_and(|c| c.contains("Bye")));

        let effects = reduce_workspace(
            &mut state,
            WorkspaceAction::ReplaceInFile {
                id,
                query: SearchQuery::new("absent"),
                replacement: "x".into(),
            },
        )
        .expect("no match");
        assert_eq!(effects, vec![WorkspaceEffect::Notify(Notice::warning("No matches found"))]);
    }

    #[test]
    fn hydrate_sanitizes_and_repairs_active_file() {
        let mut state = WorkspaceState {
            files: FileSystemState::default(),
            active_file: Some(FileId(9)),
        };
        let mut snapshot = FileSystemState::initial();
        snapshot.next_id = 0;

        let effects =
            reduce_workspace(&mut state, WorkspaceAction::Hydrate(snapshot)).expect("hydrate");

        assert_eq!(effects, vec![WorkspaceEffect::RecomposePreviewNow]);
        assert_eq!(state.files.next_id, 2);
        assert_eq!(state.active_file, Some(FileId(1)));
    }

    #[test]
    fn exhausted_id_space_refuses_new_nodes_without_touching_state() {
        let mut state = WorkspaceState::initial();
        state.files.files[0].id = FileId(u64::MAX - 1);
        state.files.next_id = u64::MAX;
        state.active_file = Some(FileId(u64::MAX - 1));
        let before = state.clone();

        let upload = reduce_workspace(
            &mut state,
            WorkspaceAction::Upload {
                name: "a.js".into(),
                content: "x".into(),
            },
        );
        assert_eq!(upload, Err(WorkspaceError::IdSpaceExhausted));
        assert_eq!(
            reduce_workspace(&mut state, WorkspaceAction::Duplicate { id: FileId(u64::MAX - 1) }),
            Err(WorkspaceError::IdSpaceExhausted)
        );
        assert_eq!(state, before);
        assert_eq!(
            WorkspaceError::IdSpaceExhausted.notice_level(),
            NoticeLevel::Error
        );
    }

    #[test]
    fn hydrate_rejects_unrepairable_snapshot() {
        let mut state = WorkspaceState::initial();
        let before = state.clone();
        let mut snapshot = FileSystemState::initial();
        snapshot.files[0].id = FileId(u64::MAX);

        assert_eq!(
            reduce_workspace(&mut state, WorkspaceAction::Hydrate(snapshot)),
            Err(WorkspaceError::Snapshot(SnapshotError::IdSpaceExhausted { id: u64::MAX }))
        );
        assert_eq!(state, before);
    }
}
