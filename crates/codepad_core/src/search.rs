//! Project-wide search and single-file replace.

use regex::{NoExpand, Regex, RegexBuilder};

use crate::model::{FileId, FileSystemState};

/// Longest snippet reported per hit, in characters.
pub const MAX_SNIPPET_CHARS: usize = 180;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    /// Regular expression; patterns that fail to compile are matched literally.
    pub pattern: String,
    pub case_sensitive: bool,
    pub whole_word: bool,
}

impl SearchQuery {
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    /// Compiles the query. Returns `None` for blank patterns.
    pub fn compile(&self) -> Option<Regex> {
        if self.pattern.trim().is_empty() {
            return None;
        }
        build(&self.pattern, self).or_else(|| build(&regex::escape(&self.pattern), self))
    }
}

fn build(source: &str, query: &SearchQuery) -> Option<Regex> {
    let source = if query.whole_word {
        format!(r"\b(?:{source})\b")
    } else {
        source.to_string()
    };
    RegexBuilder::new(&source)
        .case_insensitive(!query.case_sensitive)
        .build()
        .ok()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub file_id: FileId,
    pub path: String,
    /// 1-based line number.
    pub line: usize,
    pub snippet: String,
}

/// Every matching line across all files, in store order then line order.
pub fn search_project(state: &FileSystemState, query: &SearchQuery) -> Vec<SearchHit> {
    let Some(regex) = query.compile() else {
        return Vec::new();
    };
    let mut hits = Vec::new();
    for node in &state.files {
        let Some(content) = node.content() else {
            continue;
        };
        for (idx, line) in content.lines().enumerate() {
            if regex.is_match(line) {
                hits.push(SearchHit {
                    file_id: node.id,
                    path: state.path_of(node.id),
                    line: idx + 1,
                    snippet: line.trim().chars().take(MAX_SNIPPET_CHARS).collect(),
                });
            }
        }
    }
    hits
}

/// Number of non-overlapping matches in `text`.
pub fn count_matches(text: &str, query: &SearchQuery) -> usize {
    query
        .compile()
        .map_or(0, |regex| regex.find_iter(text).count())
}

/// Replaces every match in `text` with `replacement` taken literally (no `$` expansion).
///
/// Returns the new text and the number of replacements.
pub fn replace_all(text: &str, query: &SearchQuery, replacement: &str) -> (String, usize) {
    let Some(regex) = query.compile() else {
        return (text.to_string(), 0);
    };
    let count = regex.find_iter(text).count();
    if count == 0 {
        return (text.to_string(), 0);
    }
    (regex.replace_all(text, NoExpand(replacement)).into_owned(), count)
}
