//! Preview document composition.
//!
//! The entry HTML file is normalized and every CSS and JS file of the project is spliced into it.
//! Tag lookups are ASCII case-insensitive; lowering ASCII keeps byte offsets stable, so matches
//! found in a lowered copy are spliced into the original text.

use crate::{
    model::{ContentType, FileId, FileNode, FileSystemState, DEFAULT_ENTRY_NAME},
    settings::EditorTheme,
};

/// Viewport tag inserted into documents that lack one.
pub const VIEWPORT_META: &str =
    r#"<meta name="viewport" content="width=device-width, initial-scale=1.0">"#;

/// Picks the HTML file the preview is built from.
///
/// The active file wins when it is HTML, then a file named exactly `index.html`, then the first
/// HTML file in store order.
pub fn select_entry_point(
    state: &FileSystemState,
    active: Option<FileId>,
) -> Option<&FileNode> {
    active
        .and_then(|id| state.get_by_id(id))
        .filter(|node| node.has_type(ContentType::Html))
        .or_else(|| {
            state
                .files
                .iter()
                .find(|node| node.is_file() && node.name == DEFAULT_ENTRY_NAME)
        })
        .or_else(|| state.files_of_type(ContentType::Html).next())
}

/// Builds the full preview document for the current project.
///
/// Projects without any HTML file get a fixed placeholder page styled for `theme`. The output is a
/// pure function of its inputs.
pub fn compose_preview(
    state: &FileSystemState,
    active: Option<FileId>,
    theme: EditorTheme,
) -> String {
    let Some(entry) = select_entry_point(state, active) else {
        return placeholder_document(theme);
    };

    let styles: Vec<String> = state
        .files_of_type(ContentType::Css)
        .map(|node| format!("<style>{}</style>", node.content().unwrap_or_default()))
        .collect();
    let scripts: Vec<String> = state
        .files_of_type(ContentType::Js)
        .map(|node| format!("<script>{}</script>", node.content().unwrap_or_default()))
        .collect();

    let document = normalize_viewport(entry.content().unwrap_or_default());
    let document = inject_styles(&document, &styles);
    inject_scripts(&document, &scripts)
}

/// Ensures the document carries a viewport meta tag.
pub fn normalize_viewport(document: &str) -> String {
    let lower = document.to_ascii_lowercase();
    if has_viewport_meta(&lower) {
        return document.to_string();
    }
    if let Some(head_end) = find_open_tag(&lower, "head") {
        return splice(document, head_end, VIEWPORT_META);
    }
    let head = format!("<head>{VIEWPORT_META}</head>");
    match find_open_tag(&lower, "html") {
        Some(html_end) => splice(document, html_end, &head),
        None => format!("{head}{document}"),
    }
}

/// Inserts `blocks` (joined by newlines) before `</head>`, after `<head>`, or in a new leading head.
pub fn inject_styles(document: &str, blocks: &[String]) -> String {
    if blocks.is_empty() {
        return document.to_string();
    }
    let joined = blocks.join("\n");
    let lower = document.to_ascii_lowercase();
    if let Some(close) = lower.find("</head>") {
        return splice(document, close, &joined);
    }
    match find_open_tag(&lower, "head") {
        Some(head_end) => splice(document, head_end, &joined),
        None => format!("<head>{joined}</head>{document}"),
    }
}

/// Inserts `blocks` (joined by newlines) before the last `</body>`, or appends them.
pub fn inject_scripts(document: &str, blocks: &[String]) -> String {
    if blocks.is_empty() {
        return document.to_string();
    }
    let joined = blocks.join("\n");
    match document.to_ascii_lowercase().rfind("</body>") {
        Some(close) => splice(document, close, &joined),
        None => format!("{document}{joined}"),
    }
}

fn has_viewport_meta(lower: &str) -> bool {
    ["name=\"viewport\"", "name='viewport'", "name=viewport"]
        .iter()
        .any(|needle| lower.contains(needle))
}

/// Byte offset just past the `>` of the first `<tag ...>` opening tag. `<header>` does not match
/// `head`.
fn find_open_tag(lower: &str, tag: &str) -> Option<usize> {
    let needle = format!("<{tag}");
    let mut from = 0;
    while let Some(rel) = lower[from..].find(&needle) {
        let after = from + rel + needle.len();
        let boundary = lower[after..].chars().next();
        if matches!(boundary, Some(c) if c == '>' || c == '/' || c.is_ascii_whitespace()) {
            return lower[after..].find('>').map(|gt| after + gt + 1);
        }
        from = after;
    }
    None
}

fn splice(document: &str, at: usize, insert: &str) -> String {
    let mut out = String::with_capacity(document.len() + insert.len());
    out.push_str(&document[..at]);
    out.push_str(insert);
    out.push_str(&document[at..]);
    out
}

/// Page shown when the project holds no HTML file.
pub fn placeholder_document(theme: EditorTheme) -> String {
    let (background, foreground) = match theme {
        EditorTheme::Light => ("#F8FAFC", "#334155"),
        EditorTheme::Dark => ("#0F172A", "#E2E8F0"),
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
{VIEWPORT_META}
<meta charset="UTF-8">
<title>No Preview</title>
<style>
body {{ display: flex; align-items: center; justify-content: center; height: 100vh; margin: 0; padding: 20px; text-align: center; font-family: system-ui, -apple-system, sans-serif; background: {background}; color: {foreground}; }}
.message {{ max-width: 400px; }}
h3 {{ margin: 0 0 10px 0; font-size: 18px; font-weight: 600; }}
p {{ margin: 0; opacity: 0.7; }}
</style>
</head>
<body>
<div class="message">
<h3>No HTML file found</h3>
<p>Create an HTML file to see the preview</p>
</div>
</body>
</html>"#
    )
}
