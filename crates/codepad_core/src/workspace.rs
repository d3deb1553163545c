//! The workspace controller: owns live state, runs reducer effects, and talks to the host.
//!
//! All state lives behind one `RefCell`. Borrows are scoped to plain reads and writes; none is
//! held across an `.await` or while listeners run, so listeners may call back into the workspace.

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};

use leptos::logging::{log, warn};
use platform_host::{next_monotonic_timestamp_ms, PrefsStore, TimerService};

use crate::{
    export::{self, ExportArtifact, ExportError},
    model::{FileId, FileNode, FileSystemState, NodeKind},
    persistence,
    preview::compose_preview,
    reducer::{
        reduce_workspace, Notice, WorkspaceAction, WorkspaceEffect, WorkspaceError, WorkspaceState,
    },
    search::{self, SearchHit, SearchQuery},
    settings::EditorSettings,
    sync::{Debouncer, SyncKey, PREVIEW_DEBOUNCE_MS},
    templates,
};

#[derive(Clone)]
/// Host services the workspace depends on.
pub struct WorkspaceServices {
    pub prefs: Rc<dyn PrefsStore>,
    pub timers: Rc<dyn TimerService>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Change notifications delivered to subscribers.
pub enum WorkspaceEvent {
    /// Files, active file or settings changed.
    StateChanged,
    /// [`Workspace::current_preview_html`] has a new value.
    PreviewChanged,
    Notice(Notice),
    /// A snapshot write completed.
    Saved { at_unix_ms: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Rc<dyn Fn(&WorkspaceEvent)>;

struct WorkspaceInner {
    state: WorkspaceState,
    settings: EditorSettings,
    preview_html: String,
    last_saved_at_ms: Option<u64>,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

struct Shared {
    inner: RefCell<WorkspaceInner>,
    services: WorkspaceServices,
    debouncer: Debouncer,
}

#[derive(Clone)]
/// Handle to the single workspace of the page. Clones share state.
pub struct Workspace {
    shared: Rc<Shared>,
}

impl Workspace {
    /// Creates a workspace holding the built-in single-file project with default settings.
    pub fn new(services: WorkspaceServices) -> Self {
        let state = WorkspaceState::initial();
        let settings = EditorSettings::default();
        let preview_html = compose_preview(&state.files, state.active_file, settings.theme);
        let debouncer = Debouncer::new(services.timers.clone());
        Self {
            shared: Rc::new(Shared {
                inner: RefCell::new(WorkspaceInner {
                    state,
                    settings,
                    preview_html,
                    last_saved_at_ms: None,
                    listeners: Vec::new(),
                    next_listener: 1,
                }),
                services,
                debouncer,
            }),
        }
    }

    fn downgrade(&self) -> Weak<Shared> {
        Rc::downgrade(&self.shared)
    }

    fn from_weak(weak: &Weak<Shared>) -> Option<Self> {
        weak.upgrade().map(|shared| Self { shared })
    }

    // Queries

    pub fn list_files(&self) -> Vec<FileNode> {
        self.shared.inner.borrow().state.files.files.clone()
    }

    pub fn get_file(&self, id: FileId) -> Option<FileNode> {
        self.shared.inner.borrow().state.files.get_by_id(id).cloned()
    }

    pub fn get_children(&self, parent: Option<FileId>) -> Vec<FileNode> {
        self.shared
            .inner
            .borrow()
            .state
            .files
            .children_of(parent)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn path_of(&self, id: FileId) -> String {
        self.shared.inner.borrow().state.files.path_of(id)
    }

    /// Full file tree, as it would be persisted.
    pub fn snapshot(&self) -> FileSystemState {
        self.shared.inner.borrow().state.files.clone()
    }

    pub fn current_preview_html(&self) -> String {
        self.shared.inner.borrow().preview_html.clone()
    }

    pub fn active_file(&self) -> Option<FileId> {
        self.shared.inner.borrow().state.active_file
    }

    pub fn settings(&self) -> EditorSettings {
        self.shared.inner.borrow().settings.clone()
    }

    /// Unix milliseconds of the last completed write, `None` before the first one.
    pub fn last_saved_at_ms(&self) -> Option<u64> {
        self.shared.inner.borrow().last_saved_at_ms
    }

    pub fn search(&self, query: &SearchQuery) -> Vec<SearchHit> {
        search::search_project(&self.shared.inner.borrow().state.files, query)
    }

    // Listeners

    /// Registers `listener` for every subsequent [`WorkspaceEvent`].
    pub fn subscribe(&self, listener: impl Fn(&WorkspaceEvent) + 'static) -> ListenerId {
        let mut inner = self.shared.inner.borrow_mut();
        let id = ListenerId(inner.next_listener);
        inner.next_listener += 1;
        inner.listeners.push((id, Rc::new(listener)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) {
        self.shared
            .inner
            .borrow_mut()
            .listeners
            .retain(|(listener_id, _)| *listener_id != id);
    }

    fn emit(&self, event: WorkspaceEvent) {
        let listeners: Vec<Listener> = self
            .shared
            .inner
            .borrow()
            .listeners
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&event);
        }
    }

    /// Surfaces a host-side outcome (for example a finished download) to subscribers.
    pub fn notify(&self, notice: Notice) {
        self.emit(WorkspaceEvent::Notice(notice));
    }

    // Commands

    /// Creates a file or folder. New files start from their language template and become active.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::EmptyName`] for blank names.
    pub fn create_file(
        &self,
        name: &str,
        kind: NodeKind,
        parent: Option<FileId>,
    ) -> Result<FileId, WorkspaceError> {
        let content = match kind {
            NodeKind::File => templates::template_for(name.trim()).map(str::to_string),
            NodeKind::Folder => None,
        };
        let id = FileId(self.shared.inner.borrow().state.files.next_id);
        self.dispatch(WorkspaceAction::Create {
            name: name.to_string(),
            kind,
            content,
            parent_id: parent,
        })?;
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`WorkspaceError::EmptyName`] for blank names.
    pub fn rename_file(&self, id: FileId, name: &str) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::Rename {
            id,
            name: name.to_string(),
        })
    }

    /// Deletes a node and its descendants.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::LastFileDeletion`] when no file would remain.
    pub fn delete_file(&self, id: FileId) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::Delete { id })
    }

    pub fn duplicate_file(&self, id: FileId) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::Duplicate { id })
    }

    /// # Errors
    ///
    /// Returns [`WorkspaceError::MoveRejected`] when the move would create a cycle or targets a
    /// file.
    pub fn move_file(&self, id: FileId, new_parent: Option<FileId>) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::Move { id, new_parent })
    }

    pub fn edit_content(&self, id: FileId, content: &str) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::EditContent {
            id,
            content: content.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`WorkspaceError::NothingToUndo`] at the oldest snapshot.
    pub fn undo(&self, id: FileId) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::Undo { id })
    }

    /// # Errors
    ///
    /// Returns [`WorkspaceError::NothingToRedo`] at the newest snapshot.
    pub fn redo(&self, id: FileId) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::Redo { id })
    }

    pub fn set_active_file(&self, id: Option<FileId>) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::SetActive { id })
    }

    /// # Errors
    ///
    /// Returns [`WorkspaceError::UnsupportedUpload`] for anything but `.html`, `.css` and `.js`.
    pub fn upload_file(&self, name: &str, content: &str) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::Upload {
            name: name.to_string(),
            content: content.to_string(),
        })
    }

    pub fn clear_content(&self, id: FileId) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::ClearContent { id })
    }

    pub fn replace_in_file(
        &self,
        id: FileId,
        query: &SearchQuery,
        replacement: &str,
    ) -> Result<(), WorkspaceError> {
        self.dispatch(WorkspaceAction::ReplaceInFile {
            id,
            query: query.clone(),
            replacement: replacement.to_string(),
        })
    }

    /// Recomposes the preview now and confirms it to the user.
    pub fn run_preview(&self) {
        self.shared.debouncer.cancel(SyncKey::Preview);
        self.recompose_preview();
        self.notify(Notice::success("Code executed and preview updated!"));
    }

    /// Applies and persists new editor settings.
    pub fn update_settings(&self, settings: EditorSettings) {
        let settings = settings.normalized();
        let theme_changed = {
            let mut inner = self.shared.inner.borrow_mut();
            if inner.settings == settings {
                return;
            }
            let changed = inner.settings.theme != settings.theme;
            inner.settings = settings.clone();
            changed
        };
        if !settings.auto_save {
            self.shared.debouncer.cancel(SyncKey::Persist);
        }
        if theme_changed {
            self.recompose_preview();
        }
        self.emit(WorkspaceEvent::StateChanged);

        let prefs = self.shared.services.prefs.clone();
        let weak = self.downgrade();
        self.shared.services.timers.spawn_local(Box::pin(async move {
            if let Err(err) = persistence::save_settings(&*prefs, &settings).await {
                warn!("editor settings save failed: {err}");
                if let Some(workspace) = Self::from_weak(&weak) {
                    workspace.notify(Notice::error("Failed to save settings"));
                }
            }
        }));
    }

    /// Builds the download artifact for the project.
    ///
    /// # Errors
    ///
    /// Returns [`ExportError::Empty`] (also reported as an error notice) when there are no files.
    pub fn export_project(&self) -> Result<ExportArtifact, ExportError> {
        let result = export::export_project(&self.shared.inner.borrow().state.files);
        if let Err(err) = &result {
            self.notify(Notice::error(err.to_string()));
        }
        result
    }

    /// Cancels any pending auto-save and writes the snapshot now.
    pub fn save(&self) {
        self.shared.debouncer.cancel(SyncKey::Persist);
        self.spawn_persist(true);
    }

    /// Restores settings and the saved project from the store.
    ///
    /// A missing snapshot keeps the built-in project; an unreadable one keeps it too and reports
    /// an error notice.
    pub async fn hydrate(&self) {
        let prefs = self.shared.services.prefs.clone();
        let settings = persistence::load_settings(&*prefs).await;
        let files = persistence::load_files(&*prefs).await;

        self.shared.inner.borrow_mut().settings = settings;
        match files {
            Ok(Some(snapshot)) => {
                log!("codepad restored {} saved nodes", snapshot.files.len());
                let _ = self.dispatch(WorkspaceAction::Hydrate(snapshot));
            }
            Ok(None) => {
                self.recompose_preview();
                self.emit(WorkspaceEvent::StateChanged);
            }
            Err(err) => {
                warn!("codepad snapshot load failed: {err}");
                self.recompose_preview();
                self.emit(WorkspaceEvent::StateChanged);
                self.notify(Notice::error("Failed to load saved files"));
            }
        }
    }

    /// Cancels pending timers and drops listeners. In-flight writes still complete.
    pub fn shutdown(&self) {
        self.shared.debouncer.cancel_all();
        self.shared.inner.borrow_mut().listeners.clear();
    }

    // Effects

    fn dispatch(&self, action: WorkspaceAction) -> Result<(), WorkspaceError> {
        let result = reduce_workspace(&mut self.shared.inner.borrow_mut().state, action);
        match result {
            Ok(effects) => {
                if effects
                    .iter()
                    .any(|effect| !matches!(effect, WorkspaceEffect::Notify(_)))
                {
                    self.emit(WorkspaceEvent::StateChanged);
                }
                for effect in effects {
                    self.run_effect(effect);
                }
                Ok(())
            }
            Err(err) => {
                self.notify(err.to_notice());
                Err(err)
            }
        }
    }

    fn run_effect(&self, effect: WorkspaceEffect) {
        match effect {
            WorkspaceEffect::SchedulePreview => {
                let weak = self.downgrade();
                self.shared
                    .debouncer
                    .schedule(SyncKey::Preview, PREVIEW_DEBOUNCE_MS, move || {
                        if let Some(workspace) = Self::from_weak(&weak) {
                            workspace.recompose_preview();
                        }
                    });
            }
            WorkspaceEffect::RecomposePreviewNow => {
                self.shared.debouncer.cancel(SyncKey::Preview);
                self.recompose_preview();
            }
            WorkspaceEffect::SchedulePersist => {
                let (auto_save, delay_ms) = {
                    let inner = self.shared.inner.borrow();
                    (inner.settings.auto_save, inner.settings.auto_save_delay_ms)
                };
                if !auto_save {
                    return;
                }
                let weak = self.downgrade();
                self.shared
                    .debouncer
                    .schedule(SyncKey::Persist, delay_ms, move || {
                        if let Some(workspace) = Self::from_weak(&weak) {
                            workspace.spawn_persist(false);
                        }
                    });
            }
            WorkspaceEffect::Notify(notice) => self.notify(notice),
        }
    }

    fn recompose_preview(&self) {
        let changed = {
            let mut inner = self.shared.inner.borrow_mut();
            let html = compose_preview(
                &inner.state.files,
                inner.state.active_file,
                inner.settings.theme,
            );
            if html == inner.preview_html {
                false
            } else {
                inner.preview_html = html;
                true
            }
        };
        if changed {
            self.emit(WorkspaceEvent::PreviewChanged);
        }
    }

    /// Writes the live snapshot on the host's local executor.
    fn spawn_persist(&self, explicit: bool) {
        let (snapshot, label) = {
            let inner = self.shared.inner.borrow();
            let label = inner
                .state
                .active_file
                .and_then(|id| inner.state.files.get_by_id(id))
                .map_or_else(|| "Project".to_string(), |node| node.name.clone());
            (inner.state.files.clone(), label)
        };
        let prefs = self.shared.services.prefs.clone();
        let weak = self.downgrade();
        self.shared.services.timers.spawn_local(Box::pin(async move {
            let result = persistence::save_files(&*prefs, &snapshot).await;
            if let Some(workspace) = Self::from_weak(&weak) {
                workspace.finish_persist(result, explicit, &label);
            }
        }));
    }

    fn finish_persist(&self, result: Result<(), String>, explicit: bool, label: &str) {
        match result {
            Ok(()) => {
                let at_unix_ms = next_monotonic_timestamp_ms();
                self.shared.inner.borrow_mut().last_saved_at_ms = Some(at_unix_ms);
                self.emit(WorkspaceEvent::Saved { at_unix_ms });
                if explicit {
                    self.notify(Notice::success(format!("{label} saved successfully!")));
                }
            }
            Err(err) => {
                warn!("codepad snapshot save failed: {err}");
                self.notify(Notice::error("Failed to save file"));
            }
        }
    }
}
