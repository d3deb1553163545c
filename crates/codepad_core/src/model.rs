//! File node store: the arena of file/folder records and its read-only queries.

use std::{
    collections::{BTreeSet, HashSet},
    fmt,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history::History;

/// Content of the built-in project's entry file.
pub const DEFAULT_ENTRY_CONTENT: &str =
    "<!-- Write your HTML here -->\n<div><h1>Hello World!</h1></div>";
/// Name of the built-in project's entry file.
pub const DEFAULT_ENTRY_NAME: &str = "index.html";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// Store-assigned node id. Never reused within one state lineage.
pub struct FileId(pub u64);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Language of a file, derived from its extension.
pub enum ContentType {
    /// `.html`
    Html,
    /// `.css`
    Css,
    /// `.js`
    Js,
    /// Anything else.
    Plaintext,
}

impl ContentType {
    /// Derives the content type from a file name's last extension (case-insensitive).
    pub fn from_name(name: &str) -> Self {
        match extension(name).map(str::to_ascii_lowercase).as_deref() {
            Some("html") => Self::Html,
            Some("css") => Self::Css,
            Some("js") => Self::Js,
            _ => Self::Plaintext,
        }
    }

    /// Stable lowercase token (`html`, `css`, `js`, `plaintext`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Css => "css",
            Self::Js => "js",
            Self::Plaintext => "plaintext",
        }
    }
}

/// Returns the text after the last `.` of `name`, when there is a non-empty stem before it.
pub(crate) fn extension(name: &str) -> Option<&str> {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => Some(ext),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Node kind requested at creation time.
pub enum NodeKind {
    /// A file with content and history.
    File,
    /// A grouping node.
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Content and undo history of a file node.
pub struct FileBody {
    /// Current text.
    pub content: String,
    /// Snapshots for undo/redo.
    pub history: History,
}

impl FileBody {
    /// Creates a body whose history starts at `content`.
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            history: History::new(content.clone()),
            content,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
/// Kind-specific payload of a node.
pub enum NodeBody {
    /// File payload.
    File(FileBody),
    /// Folders carry nothing.
    Folder,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One file or folder record.
pub struct FileNode {
    /// Unique id.
    pub id: FileId,
    /// Display name; includes the extension for files.
    pub name: String,
    /// Containing folder, `None` for root-level nodes.
    pub parent_id: Option<FileId>,
    /// File or folder payload.
    pub body: NodeBody,
}

impl FileNode {
    /// Node kind.
    pub fn kind(&self) -> NodeKind {
        match self.body {
            NodeBody::File(_) => NodeKind::File,
            NodeBody::Folder => NodeKind::Folder,
        }
    }

    /// `true` for file nodes.
    pub fn is_file(&self) -> bool {
        matches!(self.body, NodeBody::File(_))
    }

    /// `true` for folder nodes.
    pub fn is_folder(&self) -> bool {
        matches!(self.body, NodeBody::Folder)
    }

    /// File content, `None` for folders.
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            NodeBody::File(file) => Some(&file.content),
            NodeBody::Folder => None,
        }
    }

    /// File history, `None` for folders.
    pub fn history(&self) -> Option<&History> {
        match &self.body {
            NodeBody::File(file) => Some(&file.history),
            NodeBody::Folder => None,
        }
    }

    /// Content type derived from the current name, `None` for folders.
    pub fn content_type(&self) -> Option<ContentType> {
        self.is_file().then(|| ContentType::from_name(&self.name))
    }

    /// `true` when this is a file of the given content type.
    pub fn has_type(&self, content_type: ContentType) -> bool {
        self.content_type() == Some(content_type)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// The whole virtual file system.
///
/// `files` keeps insertion order, which is the iteration order used for display and preview
/// composition. `next_id` is strictly greater than every id in `files`.
pub struct FileSystemState {
    /// All nodes.
    pub files: Vec<FileNode>,
    /// Id the next created node receives.
    pub next_id: u64,
}

impl Default for FileSystemState {
    fn default() -> Self {
        Self {
            files: Vec::new(),
            next_id: 1,
        }
    }
}

impl FileSystemState {
    /// The built-in single-file project used on first start and after a failed load.
    pub fn initial() -> Self {
        Self {
            files: vec![FileNode {
                id: FileId(1),
                name: DEFAULT_ENTRY_NAME.to_string(),
                parent_id: None,
                body: NodeBody::File(FileBody::new(DEFAULT_ENTRY_CONTENT)),
            }],
            next_id: 2,
        }
    }

    /// Looks a node up by id.
    pub fn get_by_id(&self, id: FileId) -> Option<&FileNode> {
        self.files.iter().find(|node| node.id == id)
    }

    /// Direct children of `parent_id` (root level for `None`) in store order.
    pub fn children_of(&self, parent_id: Option<FileId>) -> Vec<&FileNode> {
        self.files
            .iter()
            .filter(|node| node.parent_id == parent_id)
            .collect()
    }

    /// Slash-joined names from the outermost resolvable ancestor down to `id`.
    ///
    /// A missing parent ends the walk, so a node whose parent vanished reports only its own
    /// name. Unknown ids yield an empty string. Corrupted (cyclic) chains stop after visiting
    /// every node once.
    pub fn path_of(&self, id: FileId) -> String {
        let Some(node) = self.get_by_id(id) else {
            return String::new();
        };

        let mut names = vec![node.name.as_str()];
        let mut cursor = node.parent_id;
        let mut steps = 0;
        while let Some(parent_id) = cursor {
            let Some(parent) = self.get_by_id(parent_id) else {
                break;
            };
            steps += 1;
            if steps > self.files.len() {
                break;
            }
            names.push(parent.name.as_str());
            cursor = parent.parent_id;
        }
        names.reverse();
        names.join("/")
    }

    /// Ids of every transitive descendant of `id` (excluding `id` itself).
    pub fn descendants_of(&self, id: FileId) -> BTreeSet<FileId> {
        let mut found = BTreeSet::new();
        let mut frontier = vec![id];
        while let Some(current) = frontier.pop() {
            for child in self
                .files
                .iter()
                .filter(|node| node.parent_id == Some(current))
            {
                if child.id != id && found.insert(child.id) {
                    frontier.push(child.id);
                }
            }
        }
        found
    }

    /// Whether `ancestor` appears on the parent chain starting at `node` (inclusive).
    ///
    /// Returns `None` when the chain cannot be resolved: an id on it is missing, or it does not
    /// reach the root within `files.len()` steps.
    pub fn chain_contains(&self, node: FileId, ancestor: FileId) -> Option<bool> {
        chain_contains_in(&self.files, node, ancestor)
    }

    /// Number of file (non-folder) nodes.
    pub fn file_count(&self) -> usize {
        self.files.iter().filter(|node| node.is_file()).count()
    }

    /// Files of one content type in store order.
    pub fn files_of_type(&self, content_type: ContentType) -> impl Iterator<Item = &FileNode> {
        self.files
            .iter()
            .filter(move |node| node.has_type(content_type))
    }

    /// Repairs a snapshot restored from storage so every store invariant holds.
    ///
    /// Duplicate ids keep their first record, histories are made consistent with content,
    /// parents that are missing or are files move the node to the root, parent cycles are broken
    /// at the node that closes them, and `next_id` is raised above every id.
    ///
    /// # Errors
    ///
    /// Returns [`SnapshotError::IdSpaceExhausted`] when an id leaves no room for a next id.
    pub fn sanitized(self) -> Result<Self, SnapshotError> {
        let mut seen = HashSet::new();
        let mut files: Vec<FileNode> = self
            .files
            .into_iter()
            .filter(|node| seen.insert(node.id))
            .map(|mut node| {
                if let NodeBody::File(file) = &mut node.body {
                    let history = std::mem::replace(&mut file.history, History::new(""));
                    file.history = history.repaired(&file.content);
                }
                node
            })
            .collect();

        let folders: HashSet<FileId> = files
            .iter()
            .filter(|node| node.is_folder())
            .map(|node| node.id)
            .collect();
        for node in &mut files {
            if node.parent_id.is_some_and(|parent| !folders.contains(&parent)) {
                node.parent_id = None;
            }
        }

        for idx in 0..files.len() {
            let node = &files[idx];
            let closes_cycle = node
                .parent_id
                .is_some_and(|parent| chain_contains_in(&files, parent, node.id) != Some(false));
            if closes_cycle {
                files[idx].parent_id = None;
            }
        }

        let max_id = files.iter().map(|node| node.id.0).max().unwrap_or(0);
        let next_id = max_id
            .checked_add(1)
            .ok_or(SnapshotError::IdSpaceExhausted { id: max_id })?;
        Ok(Self {
            next_id: self.next_id.max(next_id),
            files,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Reasons a restored snapshot cannot be repaired.
pub enum SnapshotError {
    #[error("node id {id} leaves no room for new ids")]
    IdSpaceExhausted { id: u64 },
}

fn chain_contains_in(files: &[FileNode], node: FileId, ancestor: FileId) -> Option<bool> {
    let mut cursor = Some(node);
    for _ in 0..=files.len() {
        let Some(current) = cursor else {
            return Some(false);
        };
        if current == ancestor {
            return Some(true);
        }
        cursor = files.iter().find(|n| n.id == current)?.parent_id;
    }
    None
}
