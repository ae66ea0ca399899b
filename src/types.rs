use std::collections::BTreeMap;

use serde::Serialize;

/// A discovered file whose bytes decoded cleanly to UTF-8.
///
/// Paths are always relative to their root, use forward slashes, and contain
/// no `..` components.
#[derive(Debug, Clone)]
pub struct RawFile {
    pub path: String,
    pub content: String,
}

/// Why a discovered file was dropped during collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    SizeLimit,
    BinaryExtension,
    BinaryContent,
    EncodingError,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SizeLimit => "size-limit",
            Self::BinaryExtension => "binary-extension",
            Self::BinaryContent => "binary-content",
            Self::EncodingError => "encoding-error",
        }
    }
}

/// Truncation metadata recorded when a per-file line limit applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Truncation {
    pub truncated: bool,
    pub original_line_count: usize,
    pub truncated_line_count: usize,
    pub line_limit: usize,
}

/// A file after the transformation stage, ready for rendering.
#[derive(Debug, Clone)]
pub struct ProcessedFile {
    pub path: String,
    pub content: String,
    /// Pre-truncation content, kept only when a line limit applied.
    pub original_content: Option<String>,
    pub truncation: Option<Truncation>,
}

impl ProcessedFile {
    pub fn new(path: String, content: String) -> Self {
        Self {
            path,
            content,
            original_content: None,
            truncation: None,
        }
    }
}

/// What a suspicious finding was raised against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FindingKind {
    File,
    GitDiff,
}

/// A secret-scan hit: the file (or synthetic diff) path plus rule messages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuspiciousFinding {
    pub file_path: String,
    pub messages: Vec<String>,
    pub kind: FindingKind,
}

/// Aggregate result of one packaging run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PackResult {
    pub total_files: usize,
    pub total_characters: usize,
    /// Token count of the full rendered output.
    pub total_tokens: usize,
    pub file_char_counts: BTreeMap<String, usize>,
    pub file_token_counts: BTreeMap<String, usize>,
    #[serde(skip)]
    pub processed_files: Vec<ProcessedFile>,
    pub suspicious_files_results: Vec<SuspiciousFinding>,
    pub suspicious_git_diff_results: Vec<SuspiciousFinding>,
    pub safe_file_paths: Vec<String>,
    pub git_diff_token_count: usize,
    pub git_log_token_count: usize,
}

/// Git diff material gathered for rendering and secret scanning.
#[derive(Debug, Clone, Default)]
pub struct GitDiffs {
    pub work_tree: String,
    pub staged: String,
}

impl GitDiffs {
    pub fn is_empty(&self) -> bool {
        self.work_tree.is_empty() && self.staged.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skip_reason_strings() {
        assert_eq!(SkipReason::SizeLimit.as_str(), "size-limit");
        assert_eq!(SkipReason::BinaryExtension.as_str(), "binary-extension");
        assert_eq!(SkipReason::BinaryContent.as_str(), "binary-content");
        assert_eq!(SkipReason::EncodingError.as_str(), "encoding-error");
    }

    #[test]
    fn processed_file_new_has_no_truncation() {
        let f = ProcessedFile::new("a.rs".into(), "fn main() {}".into());
        assert!(f.original_content.is_none());
        assert!(f.truncation.is_none());
    }

    #[test]
    fn git_diffs_empty() {
        assert!(GitDiffs::default().is_empty());
        let d = GitDiffs {
            work_tree: "diff".into(),
            staged: String::new(),
        };
        assert!(!d.is_empty());
    }
}
