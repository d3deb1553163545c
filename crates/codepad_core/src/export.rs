//! Project export to a single downloadable artifact.

use thiserror::Error;

use crate::model::{ContentType, FileSystemState};

/// File name used when several files are bundled together.
pub const ARCHIVE_FILE_NAME: &str = "project-export.md";

#[derive(Debug, Clone, PartialEq, Eq)]
/// A file ready to hand to the browser download helper.
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub contents: String,
    /// Number of project files included.
    pub file_count: usize,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExportError {
    #[error("No files to export")]
    Empty,
}

/// Exports the project's files (folders are skipped).
///
/// A single file is exported as itself; several files become a Markdown archive with one fenced
/// section per file, headed by the file's path.
///
/// # Errors
///
/// Returns [`ExportError::Empty`] when the project holds no files.
pub fn export_project(state: &FileSystemState) -> Result<ExportArtifact, ExportError> {
    let files: Vec<_> = state.files.iter().filter(|node| node.is_file()).collect();
    match files.as_slice() {
        [] => Err(ExportError::Empty),
        [single] => Ok(ExportArtifact {
            file_name: single.name.clone(),
            mime: mime_for(ContentType::from_name(&single.name)),
            contents: single.content().unwrap_or_default().to_string(),
            file_count: 1,
        }),
        many => {
            let mut contents = String::from("# Code Editor Project Export\n\n");
            for node in many {
                let language = ContentType::from_name(&node.name).as_str();
                contents.push_str(&format!(
                    "## File: {}\n```{language}\n{}\n```\n\n",
                    state.path_of(node.id),
                    node.content().unwrap_or_default()
                ));
            }
            Ok(ExportArtifact {
                file_name: ARCHIVE_FILE_NAME.to_string(),
                mime: "text/markdown",
                contents,
                file_count: many.len(),
            })
        }
    }
}

fn mime_for(content_type: ContentType) -> &'static str {
    match content_type {
        ContentType::Html => "text/html",
        ContentType::Css => "text/css",
        ContentType::Js => "text/javascript",
        ContentType::Plaintext => "text/plain",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        model::{FileId, NodeKind, DEFAULT_ENTRY_CONTENT},
        ops::{create, delete},
    };

    #[test]
    fn empty_project_cannot_be_exported() {
        let (state, _) = create(FileSystemState::default(), "only-folder", NodeKind::Folder, None, None);
        assert_eq!(export_project(&state), Err(ExportError::Empty));
        assert_eq!(ExportError::Empty.to_string(), "No files to export");
    }

    #[test]
    fn single_file_exports_as_itself() {
        let artifact = export_project(&FileSystemState::initial()).expect("export");
        assert_eq!(artifact.file_name, "index.html");
        assert_eq!(artifact.mime, "text/html");
        assert_eq!(artifact.contents, DEFAULT_ENTRY_CONTENT);
    }

    #[test]
    fn several_files_become_markdown_archive() {
        let state = delete(FileSystemState::initial(), FileId(1));
        let (state, folder) = create(state, "css", NodeKind::Folder, None, None);
        let folder = folder.expect("id available");
        let (state, _) = create(state, "a.css", NodeKind::File, Some("p{}".into()), Some(folder));
        let (state, _) = create(state, "b.js", NodeKind::File, Some("go()".into()), None);

        let artifact = export_project(&state).expect("export");

        assert_eq!(artifact.file_name, ARCHIVE_FILE_NAME);
        assert_eq!(artifact.file_count, 2);
        assert_eq!(
            artifact.contents,
            "# Code Editor Project Export\n\n\
             ## File: css/a.css\n```css\np{}\n```\n\n\
             ## File: b.js\n```js\ngo()\n```\n\n"
        );
    }
}
