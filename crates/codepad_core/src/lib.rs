//! Core of the Codepad editor: the virtual file tree, per-file history, preview composition and
//! the debounced sync pipeline, independent of any UI.

pub mod editing;
pub mod export;
pub mod history;
pub mod model;
pub mod ops;
pub mod persistence;
pub mod preview;
pub mod reducer;
pub mod search;
pub mod settings;
pub mod sync;
pub mod templates;
pub mod workspace;

pub use export::{export_project, ExportArtifact, ExportError};
pub use history::{History, MAX_HISTORY_ENTRIES};
pub use model::*;
pub use preview::compose_preview;
pub use reducer::{
    reduce_workspace, Notice, NoticeLevel, WorkspaceAction, WorkspaceEffect, WorkspaceError,
    WorkspaceState,
};
pub use search::{SearchHit, SearchQuery};
pub use settings::{EditorSettings, EditorTheme};
pub use sync::{Debouncer, SyncKey, PREVIEW_DEBOUNCE_MS};
pub use workspace::{ListenerId, Workspace, WorkspaceEvent, WorkspaceServices};
