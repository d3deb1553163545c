//! Text-area editing assistance and keyboard shortcut mapping.
//!
//! Positions are character offsets into the text (what a browser `<textarea>` reports), not byte
//! offsets.

use crate::settings::EditorSettings;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of an assisted edit.
pub struct TextEdit {
    pub text: String,
    /// Caret position (character offset) after the edit.
    pub caret: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Tab,
    Enter,
    Char(char),
}

/// Applies editing assistance for `key` on `text` with the selection `start..end`.
///
/// Returns `None` when the key is not assisted and the browser default should apply. Reversed or
/// out-of-range selections are clamped to the text.
pub fn apply_key(
    text: &str,
    start: usize,
    end: usize,
    key: EditKey,
    settings: &EditorSettings,
) -> Option<TextEdit> {
    let len = text.chars().count();
    let (start, end) = (start.min(end).min(len), start.max(end).min(len));

    match key {
        EditKey::Tab => Some(replace_range(text, start, end, &settings.indent_unit(), None)),
        EditKey::Enter => {
            let before: String = text.chars().take(start).collect();
            let line = before.rsplit('\n').next().unwrap_or_default();
            let mut indent: String = line.chars().take_while(|c| c.is_whitespace()).collect();
            if line.trim_end().ends_with(['{', ':', '(']) {
                indent.push_str(&settings.indent_unit());
            }
            Some(replace_range(text, start, end, &format!("\n{indent}"), None))
        }
        EditKey::Char(open) if settings.auto_complete && start == end => {
            let close = closing_pair(open)?;
            let inserted = format!("{open}{close}");
            Some(replace_range(text, start, end, &inserted, Some(start + 1)))
        }
        EditKey::Char(_) => None,
    }
}

/// Closing character auto-inserted after `open`.
pub fn closing_pair(open: char) -> Option<char> {
    match open {
        '(' => Some(')'),
        '[' => Some(']'),
        '{' => Some('}'),
        '"' => Some('"'),
        '\'' => Some('\''),
        '`' => Some('`'),
        _ => None,
    }
}

fn replace_range(
    text: &str,
    start: usize,
    end: usize,
    insert: &str,
    caret: Option<usize>,
) -> TextEdit {
    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end);
    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..start_byte]);
    out.push_str(insert);
    out.push_str(&text[end_byte..]);
    TextEdit {
        text: out,
        caret: caret.unwrap_or(start + insert.chars().count()),
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx)
}

/// Converts a DOM selection offset (UTF-16 code units) into a character offset.
pub fn char_offset_from_utf16(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (idx, ch) in text.chars().enumerate() {
        if units >= utf16 {
            return idx;
        }
        units += ch.len_utf16();
    }
    text.chars().count()
}

/// Converts a character offset into a DOM selection offset (UTF-16 code units).
pub fn utf16_offset_from_char(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Editor-wide keyboard commands.
pub enum Shortcut {
    Save,
    Undo,
    Redo,
    ClearContent,
    Search,
    NewFile,
    ZoomIn,
    ZoomOut,
    ResetZoom,
}

/// Maps a key press to a shortcut. Only Ctrl/Cmd combinations are shortcuts.
pub fn shortcut_for(key: &str, ctrl_or_meta: bool, shift: bool) -> Option<Shortcut> {
    if !ctrl_or_meta {
        return None;
    }
    match (key.to_ascii_lowercase().as_str(), shift) {
        ("s", _) => Some(Shortcut::Save),
        ("z", false) => Some(Shortcut::Undo),
        ("z", true) | ("y", _) => Some(Shortcut::Redo),
        ("d", true) => Some(Shortcut::ClearContent),
        ("f", _) => Some(Shortcut::Search),
        ("n", _) => Some(Shortcut::NewFile),
        ("=" | "+", _) => Some(Shortcut::ZoomIn),
        ("-", _) => Some(Shortcut::ZoomOut),
        ("0", _) => Some(Shortcut::ResetZoom),
        _ => None,
    }
}
