use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Default maximum size (bytes) of a single input file: 50 MiB.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 52_428_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputStyle {
    Xml,
    Markdown,
    Json,
    Plain,
}

impl OutputStyle {
    /// Default output file name for each style.
    pub fn default_file_path(&self) -> &'static str {
        match self {
            Self::Xml => "repomix-output.xml",
            Self::Markdown => "repomix-output.md",
            Self::Json => "repomix-output.json",
            Self::Plain => "repomix-output.txt",
        }
    }
}

/// `tokenCountTree` accepts `boolean | number | string` in config files.
/// Numeric values (or numeric strings) act as a minimum-token display
/// threshold; any other truthy value simply enables the annotations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenCountTree {
    Enabled(bool),
    Threshold(u64),
    Text(String),
}

impl Default for TokenCountTree {
    fn default() -> Self {
        Self::Enabled(false)
    }
}

impl TokenCountTree {
    pub fn is_enabled(&self) -> bool {
        match self {
            Self::Enabled(b) => *b,
            Self::Threshold(_) => true,
            Self::Text(s) => !s.is_empty() && s != "false",
        }
    }

    /// Minimum token count an entry must reach to be annotated.
    pub fn threshold(&self) -> u64 {
        match self {
            Self::Threshold(n) => *n,
            Self::Text(s) => s.parse().unwrap_or(0),
            Self::Enabled(_) => 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InputConfig {
    pub max_file_size: u64,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutputConfig {
    pub style: OutputStyle,
    pub file_path: Option<PathBuf>,
    pub parsable_style: bool,
    pub header_text: Option<String>,
    pub instruction_file_path: Option<PathBuf>,
    pub file_summary: bool,
    pub directory_structure: bool,
    pub files: bool,
    pub remove_comments: bool,
    pub remove_empty_lines: bool,
    pub compress: bool,
    pub top_files_length: usize,
    pub show_line_numbers: bool,
    pub truncate_base64: bool,
    pub copy_to_clipboard: bool,
    pub include_empty_directories: bool,
    pub include_full_directory_structure: bool,
    pub file_line_limit: Option<usize>,
    pub token_count_tree: TokenCountTree,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            style: OutputStyle::Xml,
            file_path: None,
            parsable_style: false,
            header_text: None,
            instruction_file_path: None,
            file_summary: true,
            directory_structure: true,
            files: true,
            remove_comments: false,
            remove_empty_lines: false,
            compress: false,
            top_files_length: 5,
            show_line_numbers: false,
            truncate_base64: false,
            copy_to_clipboard: false,
            include_empty_directories: false,
            include_full_directory_structure: false,
            file_line_limit: None,
            token_count_tree: TokenCountTree::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IgnoreConfig {
    pub use_gitignore: bool,
    pub use_default_patterns: bool,
    pub custom_patterns: Vec<String>,
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            use_gitignore: true,
            use_default_patterns: true,
            custom_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
    pub enable_security_check: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            enable_security_check: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenCountConfig {
    pub encoding: String,
}

impl Default for TokenCountConfig {
    fn default() -> Self {
        Self {
            encoding: "o200k_base".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GitConfig {
    pub sort_by_changes: bool,
    pub sort_by_changes_max_commits: usize,
    pub include_diffs: bool,
    pub include_logs: bool,
    pub include_logs_count: usize,
    pub show_blame: bool,
}

impl Default for GitConfig {
    fn default() -> Self {
        Self {
            sort_by_changes: true,
            sort_by_changes_max_commits: 100,
            include_diffs: false,
            include_logs: false,
            include_logs_count: 50,
            show_blame: false,
        }
    }
}

/// Merged, immutable configuration for one packaging run, camelCase on disk
/// as `repopack.config.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub include: Vec<String>,
    pub ignore: IgnoreConfig,
    pub security: SecurityConfig,
    pub token_count: TokenCountConfig,
    pub git: GitConfig,
    /// Absolute base directory; output paths resolve against it.
    pub cwd: PathBuf,
}

impl Config {
    /// Load a JSON config file. A missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| Error::config("configFile", e.to_string()))
    }

    /// Output path resolved against `cwd`, falling back to the style default.
    pub fn resolved_output_path(&self) -> PathBuf {
        let file = self
            .output
            .file_path
            .clone()
            .unwrap_or_else(|| PathBuf::from(self.output.style.default_file_path()));
        if file.is_absolute() {
            file
        } else {
            self.cwd.join(file)
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.input.max_file_size == 0 {
            return Err(Error::config("input.maxFileSize", "must be greater than 0"));
        }
        if self.git.include_logs_count == 0 {
            return Err(Error::config(
                "git.includeLogsCount",
                "must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// Split a comma-separated pattern list, honouring brace expansion: commas
/// inside `{...}` do not separate patterns.
pub fn split_patterns(raw: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();
    for c in raw.chars() {
        match c {
            '{' => {
                depth += 1;
                current.push(c);
            }
            '}' => {
                depth = depth.saturating_sub(1);
                current.push(c);
            }
            ',' if depth == 0 => {
                let trimmed = current.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        out.push(trimmed.to_string());
    }
    out
}
