use std::collections::BTreeSet;

use codepad_core::{FileId, FileSystemState, NodeKind, Workspace};
use leptos::*;

use crate::EditorContext;

#[derive(Debug, Clone, PartialEq, Eq)]
/// One visible line of the file explorer.
pub struct TreeRow {
    pub id: FileId,
    pub name: String,
    pub path: String,
    pub depth: usize,
    pub is_folder: bool,
}

/// Flattens the tree depth-first in store order, children directly under their parent.
pub fn tree_rows(state: &FileSystemState) -> Vec<TreeRow> {
    let mut rows = Vec::with_capacity(state.files.len());
    let mut visited = BTreeSet::new();
    let mut stack: Vec<(FileId, usize)> = state
        .children_of(None)
        .iter()
        .rev()
        .map(|node| (node.id, 0))
        .collect();

    while let Some((id, depth)) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(node) = state.get_by_id(id) else {
            continue;
        };
        rows.push(TreeRow {
            id,
            name: node.name.clone(),
            path: state.path_of(id),
            depth,
            is_folder: node.is_folder(),
        });
        stack.extend(
            state
                .children_of(Some(id))
                .iter()
                .rev()
                .map(|child| (child.id, depth + 1)),
        );
    }
    rows
}

/// Folders a node may be moved under, as `(id, path)` pairs.
fn move_targets(rows: &[TreeRow], state: &FileSystemState, id: FileId) -> Vec<(FileId, String)> {
    let blocked = state.descendants_of(id);
    rows.iter()
        .filter(|row| row.is_folder && row.id != id && !blocked.contains(&row.id))
        .map(|row| (row.id, row.path.clone()))
        .collect()
}

#[component]
pub(crate) fn FileExplorer(ctx: EditorContext) -> impl IntoView {
    let new_name = create_rw_signal(String::new());
    let new_kind = create_rw_signal(NodeKind::File);
    let target_folder = create_rw_signal::<Option<FileId>>(None);
    let renaming = create_rw_signal::<Option<FileId>>(None);

    let snapshot = create_memo(move |_| {
        ctx.track();
        ctx.with(Workspace::snapshot)
    });
    let rows = move || snapshot.with(tree_rows);

    let create = move || {
        let name = new_name.get_untracked();
        let parent = target_folder
            .get_untracked()
            .filter(|id| snapshot.with_untracked(|state| state.get_by_id(*id).is_some()));
        if ctx
            .with(|w| w.create_file(&name, new_kind.get_untracked(), parent))
            .is_ok()
        {
            new_name.set(String::new());
        }
    };

    view! {
        <nav class="codepad-explorer" aria-label="Files">
            <div class="codepad-explorer-create">
                <input
                    type="text"
                    placeholder="name.html"
                    prop:value=move || new_name.get()
                    on:input=move |ev| new_name.set(event_target_value(&ev))
                    on:keydown=move |ev| {
                        if ev.key() == "Enter" {
                            create();
                        }
                    }
                />
                <select on:change=move |ev| {
                    new_kind
                        .set(
                            if event_target_value(&ev) == "folder" {
                                NodeKind::Folder
                            } else {
                                NodeKind::File
                            },
                        )
                }>
                    <option value="file">"File"</option>
                    <option value="folder">"Folder"</option>
                </select>
                <button type="button" on:click=move |_| create()>"Add"</button>
            </div>
            <button
                type="button"
                class="codepad-explorer-root"
                class:selected=move || target_folder.get().is_none()
                on:click=move |_| target_folder.set(None)
            >
                "/"
            </button>
            <ul role="tree">
                <For
                    each=rows
                    key=|row| (row.id, row.name.clone(), row.depth)
                    let:row
                >
                    <ExplorerRow
                        ctx=ctx
                        row=row
                        snapshot=snapshot
                        target_folder=target_folder
                        renaming=renaming
                    />
                </For>
            </ul>
        </nav>
    }
}

#[component]
fn ExplorerRow(
    ctx: EditorContext,
    row: TreeRow,
    snapshot: Memo<FileSystemState>,
    target_folder: RwSignal<Option<FileId>>,
    renaming: RwSignal<Option<FileId>>,
) -> impl IntoView {
    let TreeRow {
        id,
        name,
        depth,
        is_folder,
        ..
    } = row;
    let rename_value = name.clone();
    let selected = move || {
        if is_folder {
            target_folder.get() == Some(id)
        } else {
            ctx.active_file() == Some(id)
        }
    };
    let current_parent = move || {
        snapshot.with(|state| {
            state
                .get_by_id(id)
                .and_then(|node| node.parent_id)
                .map_or_else(|| "root".to_string(), |parent| parent.to_string())
        })
    };
    let targets = move || snapshot.with(|state| move_targets(&tree_rows(state), state, id));

    let commit_rename = move |name: String| {
        renaming.set(None);
        let _ = ctx.with(|w| w.rename_file(id, &name));
    };
    let on_delete = move |_| {
        let confirmed = window()
            .confirm_with_message(&format!("Delete {}?", snapshot.with(|s| s.path_of(id))))
            .unwrap_or(false);
        if confirmed {
            let _ = ctx.with(|w| w.delete_file(id));
        }
    };

    view! {
        <li
            role="treeitem"
            class="codepad-explorer-row"
            class:folder=is_folder
            class:selected=selected
            style=format!("padding-left: {}px;", 8 + depth * 14)
        >
            <Show
                when=move || renaming.get() == Some(id)
                fallback=move || {
                    let name = name.clone();
                    view! {
                        <button
                            type="button"
                            class="codepad-explorer-name"
                            on:click=move |_| {
                                if is_folder {
                                    target_folder.set(Some(id));
                                } else {
                                    let _ = ctx.with(|w| w.set_active_file(Some(id)));
                                }
                            }
                            on:dblclick=move |_| renaming.set(Some(id))
                        >
                            {if is_folder { format!("{name}/") } else { name }}
                        </button>
                    }
                }
            >
                <input
                    type="text"
                    class="codepad-explorer-rename"
                    value=rename_value.clone()
                    on:keydown=move |ev| match ev.key().as_str() {
                        "Enter" => commit_rename(event_target_value(&ev)),
                        "Escape" => renaming.set(None),
                        _ => {}
                    }
                    on:blur=move |ev| {
                        if renaming.get_untracked() == Some(id) {
                            commit_rename(event_target_value(&ev));
                        }
                    }
                />
            </Show>
            <span class="codepad-explorer-actions">
                <button type="button" title="Rename" on:click=move |_| renaming.set(Some(id))>
                    "✎"
                </button>
                <button
                    type="button"
                    title="Duplicate"
                    on:click=move |_| {
                        let _ = ctx.with(|w| w.duplicate_file(id));
                    }
                >
                    "⧉"
                </button>
                <button type="button" title="Delete" on:click=on_delete>"✕"</button>
                <select
                    title="Move to"
                    prop:value=current_parent
                    on:change=move |ev| {
                        let parent = event_target_value(&ev).parse::<u64>().ok().map(FileId);
                        let _ = ctx.with(|w| w.move_file(id, parent));
                    }
                >
                    <option value="root">"/"</option>
                    {move || {
                        targets()
                            .into_iter()
                            .map(|(folder, path)| {
                                view! { <option value=folder.to_string()>{path}</option> }
                            })
                            .collect_view()
                    }}
                </select>
            </span>
        </li>
    }
}

#[cfg(test)]
mod tests {
    use codepad_core::ops::{create, move_node};
    use pretty_assertions::assert_eq;

    use super::*;

    fn summary(rows: &[TreeRow]) -> Vec<(String, usize)> {
        rows.iter().map(|row| (row.path.clone(), row.depth)).collect()
    }

    #[test]
    fn rows_nest_children_under_their_folder() {
        let state = FileSystemState::initial();
        let (state, src) = create(state, "src", NodeKind::Folder, None, None);
        let src = src.expect("id available");
        let (state, _) = create(state, "app.js", NodeKind::File, None, Some(src));
        let (state, _) = create(state, "style.css", NodeKind::File, None, None);

        assert_eq!(
            summary(&tree_rows(&state)),
            vec![
                ("index.html".to_string(), 0),
                ("src".to_string(), 0),
                ("src/app.js".to_string(), 1),
                ("style.css".to_string(), 0),
            ]
        );
    }

    #[test]
    fn move_targets_exclude_self_and_descendants() {
        let state = FileSystemState::initial();
        let (state, a) = create(state, "a", NodeKind::Folder, None, None);
        let a = a.expect("id available");
        let (state, b) = create(state, "b", NodeKind::Folder, None, Some(a));
        let b = b.expect("id available");
        let (state, c) = create(state, "c", NodeKind::Folder, None, None);
        let c = c.expect("id available");
        let state = move_node(state, c, Some(b));

        let rows = tree_rows(&state);
        assert_eq!(move_targets(&rows, &state, a), Vec::new());
        assert_eq!(
            move_targets(&rows, &state, c),
            vec![(a, "a".to_string()), (b, "a/b".to_string())]
        );
    }
}
