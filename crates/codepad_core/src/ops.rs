//! Pure tree operations over [`FileSystemState`].
//!
//! Every operation consumes a state and returns the next one. Unknown ids degrade to returning the
//! input unchanged; policy checks that need to report failure live in the reducer.

use crate::{
    history::History,
    model::{extension, FileBody, FileId, FileNode, FileSystemState, NodeBody, NodeKind},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Options for [`update_content`].
pub struct UpdateOptions {
    /// Move the history cursor to this snapshot instead of recording the content, leaving the
    /// history array untouched. The content must equal the snapshot at that index; otherwise the
    /// file is left as it was.
    pub skip_history: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Outcome of [`undo`] and [`redo`].
pub enum HistoryStep {
    /// The cursor moved and content was restored.
    Applied,
    /// The cursor was already at the oldest (undo) or newest (redo) snapshot.
    AtBoundary,
    /// No file with that id exists.
    NotFound,
}

/// Appends a new node and returns the updated state together with the assigned id.
///
/// Returns the state unchanged and no id when the id space is exhausted.
pub fn create(
    mut state: FileSystemState,
    name: impl Into<String>,
    kind: NodeKind,
    initial_content: Option<String>,
    parent_id: Option<FileId>,
) -> (FileSystemState, Option<FileId>) {
    let id = FileId(state.next_id);
    let Some(next_id) = state.next_id.checked_add(1) else {
        return (state, None);
    };
    let body = match kind {
        NodeKind::File => NodeBody::File(FileBody::new(initial_content.unwrap_or_default())),
        NodeKind::Folder => NodeBody::Folder,
    };
    state.files.push(FileNode {
        id,
        name: name.into(),
        parent_id,
        body,
    });
    state.next_id = next_id;
    (state, Some(id))
}

/// Replaces the name of `id`.
pub fn rename(mut state: FileSystemState, id: FileId, new_name: impl Into<String>) -> FileSystemState {
    if let Some(node) = state.files.iter_mut().find(|node| node.id == id) {
        node.name = new_name.into();
    }
    state
}

/// Removes `id` and all of its transitive descendants.
pub fn delete(mut state: FileSystemState, id: FileId) -> FileSystemState {
    if state.get_by_id(id).is_none() {
        return state;
    }
    let mut doomed = state.descendants_of(id);
    doomed.insert(id);
    state.files.retain(|node| !doomed.contains(&node.id));
    state
}

/// Returns the name a duplicate of `name` receives.
///
/// `_copy` goes before the last extension (`style.css` becomes `style_copy.css`); names without an
/// extension get it appended.
pub fn copy_name(name: &str) -> String {
    match extension(name) {
        Some(ext) => {
            let stem = &name[..name.len() - ext.len() - 1];
            format!("{stem}_copy.{ext}")
        }
        None => format!("{name}_copy"),
    }
}

/// Copies `id` next to itself under a fresh id. Folders are copied without their children.
pub fn duplicate(state: FileSystemState, id: FileId) -> (FileSystemState, Option<FileId>) {
    let Some(source) = state.get_by_id(id) else {
        return (state, None);
    };
    let name = copy_name(&source.name);
    let parent_id = source.parent_id;
    let (kind, content) = match &source.body {
        NodeBody::File(file) => (NodeKind::File, Some(file.content.clone())),
        NodeBody::Folder => (NodeKind::Folder, None),
    };
    create(state, name, kind, content, parent_id)
}

/// Whether `id` may be re-parented under `new_parent`.
///
/// Moving to the root is always allowed. Moving under itself, under one of its descendants, under
/// a file, or under a node whose ancestry cannot be resolved is refused.
pub fn can_move(state: &FileSystemState, id: FileId, new_parent: Option<FileId>) -> bool {
    let Some(parent_id) = new_parent else {
        return true;
    };
    if parent_id == id {
        return false;
    }
    match state.get_by_id(parent_id) {
        Some(parent) if parent.is_folder() => {}
        _ => return false,
    }
    state.chain_contains(parent_id, id) == Some(false)
}

/// Re-parents `id`. Returns the state unchanged when the move is refused or `id` is unknown.
pub fn move_node(
    mut state: FileSystemState,
    id: FileId,
    new_parent: Option<FileId>,
) -> FileSystemState {
    if !can_move(&state, id, new_parent) {
        return state;
    }
    if let Some(node) = state.files.iter_mut().find(|node| node.id == id) {
        node.parent_id = new_parent;
    }
    state
}

/// Replaces the content of file `id`.
pub fn update_content(
    mut state: FileSystemState,
    id: FileId,
    content: impl Into<String>,
    options: UpdateOptions,
) -> FileSystemState {
    let content = content.into();
    let Some(file) = file_body_mut(&mut state, id) else {
        return state;
    };
    match options.skip_history {
        None => {
            file.history.record(&content);
            file.content = content;
        }
        Some(index) => {
            if file.history.entries().get(index) == Some(&content) {
                file.history.seek(index);
                file.content = content;
            }
        }
    }
    state
}

/// Steps the history of `id` back one snapshot.
pub fn undo(state: FileSystemState, id: FileId) -> (FileSystemState, HistoryStep) {
    step_history(state, id, |history| history.index().checked_sub(1))
}

/// Steps the history of `id` forward one snapshot.
pub fn redo(state: FileSystemState, id: FileId) -> (FileSystemState, HistoryStep) {
    step_history(state, id, |history| {
        history.can_redo().then(|| history.index() + 1)
    })
}

fn step_history(
    state: FileSystemState,
    id: FileId,
    target: fn(&History) -> Option<usize>,
) -> (FileSystemState, HistoryStep) {
    let Some(history) = state.get_by_id(id).and_then(FileNode::history) else {
        return (state, HistoryStep::NotFound);
    };
    let Some((index, restored)) =
        target(history).and_then(|index| Some((index, history.entries().get(index)?.clone())))
    else {
        return (state, HistoryStep::AtBoundary);
    };
    let state = update_content(
        state,
        id,
        restored,
        UpdateOptions {
            skip_history: Some(index),
        },
    );
    (state, HistoryStep::Applied)
}

fn file_body_mut(state: &mut FileSystemState, id: FileId) -> Option<&mut FileBody> {
    state
        .files
        .iter_mut()
        .find(|node| node.id == id)
        .and_then(|node| match &mut node.body {
            NodeBody::File(file) => Some(file),
            NodeBody::Folder => None,
        })
}
