//! Snapshot and settings persistence through the host [`PrefsStore`].

use leptos::logging::warn;
use platform_host::{load_pref_with, save_pref_with, PrefsStore};

use crate::{model::FileSystemState, settings::EditorSettings};

/// Storage key of the serialized file tree.
pub const FILES_KEY: &str = "codepad.files.v1";
/// Storage key of the serialized editor settings.
pub const SETTINGS_KEY: &str = "codepad.settings.v1";

/// Loads and sanitizes the saved file tree. `Ok(None)` means nothing was saved yet.
///
/// # Errors
///
/// Returns an error when the store read fails, the payload is not a valid snapshot, or the
/// snapshot cannot be repaired.
pub async fn load_files(store: &dyn PrefsStore) -> Result<Option<FileSystemState>, String> {
    let state = load_pref_with::<_, FileSystemState>(store, FILES_KEY).await?;
    state
        .map(FileSystemState::sanitized)
        .transpose()
        .map_err(|err| err.to_string())
}

/// Writes the file tree.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_files(store: &dyn PrefsStore, state: &FileSystemState) -> Result<(), String> {
    save_pref_with(store, FILES_KEY, state).await
}

/// Loads editor settings, falling back to defaults when absent or unreadable.
pub async fn load_settings(store: &dyn PrefsStore) -> EditorSettings {
    match load_pref_with::<_, EditorSettings>(store, SETTINGS_KEY).await {
        Ok(settings) => settings.unwrap_or_default().normalized(),
        Err(err) => {
            warn!("editor settings load failed, using defaults: {err}");
            EditorSettings::default()
        }
    }
}

/// Writes editor settings.
///
/// # Errors
///
/// Returns an error when serialization or the store write fails.
pub async fn save_settings(store: &dyn PrefsStore, settings: &EditorSettings) -> Result<(), String> {
    save_pref_with(store, SETTINGS_KEY, settings).await
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use platform_host::MemoryPrefsStore;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        model::{FileId, NodeKind},
        ops::create,
        settings::EditorTheme,
    };

    #[test]
    fn files_survive_a_save_load_cycle() {
        let store = MemoryPrefsStore::default();
        let (state, _) = create(FileSystemState::initial(), "a.css", NodeKind::File, None, None);

        block_on(save_files(&store, &state)).expect("save");
        assert!(store.raw(FILES_KEY).is_some_and(|raw| raw.contains("\"next_id\":3")));
        assert_eq!(block_on(load_files(&store)).expect("load"), Some(state));
    }

    #[test]
    fn missing_snapshot_is_not_an_error() {
        let store = MemoryPrefsStore::default();
        assert_eq!(block_on(load_files(&store)).expect("load"), None);
    }

    #[test]
    fn corrupt_snapshot_is_reported() {
        let store = MemoryPrefsStore::with_raw(FILES_KEY, "{not json");
        assert!(block_on(load_files(&store)).is_err());
    }

    #[test]
    fn loaded_snapshot_is_sanitized() {
        let raw = r#"{"files":[{"id":4,"name":"a.js","parent_id":99,"body":{"kind":"file","content":"x","history":{"entries":[],"index":3}}}],"next_id":1}"#;
        let store = MemoryPrefsStore::with_raw(FILES_KEY, raw);

        let state = block_on(load_files(&store)).expect("load").expect("snapshot");
        assert_eq!(state.next_id, 5);
        let node = state.get_by_id(FileId(4)).expect("node");
        assert_eq!(node.parent_id, None);
        assert_eq!(node.history().map(|h| h.len()), Some(1));
    }

    #[test]
    fn snapshot_with_exhausted_ids_is_reported() {
        let raw = format!(
            r#"{{"files":[{{"id":{},"name":"a.js","parent_id":null,"body":{{"kind":"file","content":"x","history":{{"entries":["x"],"index":0}}}}}}],"next_id":1}}"#,
            u64::MAX
        );
        let store = MemoryPrefsStore::with_raw(FILES_KEY, &raw);

        let err = block_on(load_files(&store)).expect_err("rejected");
        assert!(err.contains("no room for new ids"));
    }

    #[test]
    fn settings_default_on_absent_or_corrupt_payloads() {
        let empty = MemoryPrefsStore::default();
        assert_eq!(block_on(load_settings(&empty)), EditorSettings::default());

        let corrupt = MemoryPrefsStore::with_raw(SETTINGS_KEY, "[1,2");
        assert_eq!(block_on(load_settings(&corrupt)), EditorSettings::default());

        let partial = MemoryPrefsStore::with_raw(SETTINGS_KEY, r#"{"theme":"dark","font_size":99}"#);
        let settings = block_on(load_settings(&partial));
        assert_eq!(settings.theme, EditorTheme::Dark);
        assert_eq!(settings.font_size, 24);
        assert!(settings.auto_save);
    }

    #[test]
    fn settings_round_trip() {
        let store = MemoryPrefsStore::default();
        let settings = EditorSettings {
            tab_size: 4,
            word_wrap: false,
            ..EditorSettings::default()
        };
        block_on(save_settings(&store, &settings)).expect("save");
        assert_eq!(block_on(load_settings(&store)), settings);
    }
}
