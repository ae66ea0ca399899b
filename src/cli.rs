use std::path::PathBuf;

use clap::Parser;

use crate::config::{Config, OutputStyle, TokenCountTree, split_patterns};

#[derive(Parser, Debug)]
#[command(
    name = "repopack",
    about = "Package a repository into a single LLM-ready artifact",
    version
)]
pub struct Args {
    /// Directories to pack
    #[arg(default_value = ".")]
    pub directories: Vec<PathBuf>,

    /// Remote repository (owner/repo shorthand or Git URL)
    #[arg(long)]
    pub remote: Option<String>,

    /// Branch, tag, or commit for the remote repository
    #[arg(long)]
    pub remote_branch: Option<String>,

    /// Config file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output file path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write the artifact to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,

    /// Output style
    #[arg(long, value_enum)]
    pub style: Option<OutputStyle>,

    /// Strict escaping instead of CDATA in the XML style
    #[arg(long)]
    pub parsable_style: bool,

    /// Include patterns (comma-separated, braces preserved)
    #[arg(long)]
    pub include: Option<String>,

    /// Additional ignore patterns (comma-separated)
    #[arg(short = 'i', long)]
    pub ignore: Option<String>,

    /// Do not read .gitignore files
    #[arg(long)]
    pub no_gitignore: bool,

    /// Do not apply the built-in ignore patterns
    #[arg(long)]
    pub no_default_patterns: bool,

    /// Maximum input file size in bytes
    #[arg(long)]
    pub max_file_size: Option<u64>,

    /// Remove comments from supported file types
    #[arg(long)]
    pub remove_comments: bool,

    /// Remove empty lines
    #[arg(long)]
    pub remove_empty_lines: bool,

    /// Reduce files to signatures and documentation via tree-sitter
    #[arg(long)]
    pub compress: bool,

    /// Truncate embedded base64 data
    #[arg(long)]
    pub truncate_base64: bool,

    /// Prefix each line with its line number
    #[arg(long)]
    pub output_show_line_numbers: bool,

    /// Cap each file at this many lines, recording truncation metadata
    #[arg(long)]
    pub file_line_limit: Option<usize>,

    /// Text prepended to the artifact as a user header
    #[arg(long)]
    pub header_text: Option<String>,

    /// File whose contents become the trailing instruction section
    #[arg(long)]
    pub instruction_file_path: Option<PathBuf>,

    /// Omit the file summary section
    #[arg(long)]
    pub no_file_summary: bool,

    /// Omit the directory structure section
    #[arg(long)]
    pub no_directory_structure: bool,

    /// Omit file contents (metadata-only artifact)
    #[arg(long)]
    pub no_files: bool,

    /// Include directories that contain no packed files
    #[arg(long)]
    pub include_empty_directories: bool,

    /// Render the directory structure from the full discovery set
    #[arg(long)]
    pub include_full_directory_structure: bool,

    /// Annotate the directory tree with token counts, optionally only for
    /// entries of at least the given count
    #[arg(long, value_name = "THRESHOLD", num_args = 0..=1)]
    pub token_count_tree: Option<Option<u64>>,

    /// Number of largest files reported in the console summary
    #[arg(long)]
    pub top_files_len: Option<usize>,

    /// Disable the secret scanner
    #[arg(long)]
    pub no_security_check: bool,

    /// Token counting encoding (o200k_base, cl100k_base, ...)
    #[arg(long)]
    pub token_count_encoding: Option<String>,

    /// Include work-tree and staged diffs
    #[arg(long)]
    pub include_diffs: bool,

    /// Include recent commit logs
    #[arg(long)]
    pub include_logs: bool,

    /// Number of commits for --include-logs
    #[arg(long)]
    pub include_logs_count: Option<usize>,

    /// Do not sort files by git change count
    #[arg(long)]
    pub no_git_sort_by_changes: bool,

    /// Annotate lines with git blame author and date
    #[arg(long)]
    pub show_blame: bool,

    /// Copy the artifact to the system clipboard as well
    #[arg(long)]
    pub copy: bool,
}

impl Args {
    /// Overlay command-line flags onto a loaded config. Flags win; absent
    /// flags leave the config value alone.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(style) = self.style {
            config.output.style = style;
        }
        if let Some(output) = &self.output {
            config.output.file_path = Some(output.clone());
        }
        if self.parsable_style {
            config.output.parsable_style = true;
        }
        if let Some(include) = &self.include {
            config.include = split_patterns(include);
        }
        if let Some(ignore) = &self.ignore {
            config.ignore.custom_patterns.extend(split_patterns(ignore));
        }
        if self.no_gitignore {
            config.ignore.use_gitignore = false;
        }
        if self.no_default_patterns {
            config.ignore.use_default_patterns = false;
        }
        if let Some(size) = self.max_file_size {
            config.input.max_file_size = size;
        }
        if self.remove_comments {
            config.output.remove_comments = true;
        }
        if self.remove_empty_lines {
            config.output.remove_empty_lines = true;
        }
        if self.compress {
            config.output.compress = true;
        }
        if self.truncate_base64 {
            config.output.truncate_base64 = true;
        }
        if self.output_show_line_numbers {
            config.output.show_line_numbers = true;
        }
        if let Some(limit) = self.file_line_limit {
            config.output.file_line_limit = Some(limit);
        }
        if let Some(header) = &self.header_text {
            config.output.header_text = Some(header.clone());
        }
        if let Some(path) = &self.instruction_file_path {
            config.output.instruction_file_path = Some(path.clone());
        }
        if self.no_file_summary {
            config.output.file_summary = false;
        }
        if self.no_directory_structure {
            config.output.directory_structure = false;
        }
        if self.no_files {
            config.output.files = false;
        }
        if self.include_empty_directories {
            config.output.include_empty_directories = true;
        }
        if self.include_full_directory_structure {
            config.output.include_full_directory_structure = true;
        }
        if let Some(tree) = self.token_count_tree {
            config.output.token_count_tree = match tree {
                Some(threshold) => TokenCountTree::Threshold(threshold),
                None => TokenCountTree::Enabled(true),
            };
        }
        if let Some(n) = self.top_files_len {
            config.output.top_files_length = n;
        }
        if self.no_security_check {
            config.security.enable_security_check = false;
        }
        if let Some(encoding) = &self.token_count_encoding {
            config.token_count.encoding = encoding.clone();
        }
        if self.include_diffs {
            config.git.include_diffs = true;
        }
        if self.include_logs {
            config.git.include_logs = true;
        }
        if let Some(n) = self.include_logs_count {
            config.git.include_logs_count = n;
        }
        if self.no_git_sort_by_changes {
            config.git.sort_by_changes = false;
        }
        if self.show_blame {
            config.git.show_blame = true;
        }
        if self.copy {
            config.output.copy_to_clipboard = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_overlay_config() {
        let args = Args::parse_from([
            "repopack",
            "--style",
            "markdown",
            "--remove-comments",
            "--include",
            "src/**,*.md",
            "--ignore",
            "vendor/",
            "--no-security-check",
            "--include-logs-count",
            "7",
        ]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.output.style, OutputStyle::Markdown);
        assert!(config.output.remove_comments);
        assert_eq!(config.include, vec!["src/**", "*.md"]);
        assert_eq!(config.ignore.custom_patterns, vec!["vendor/"]);
        assert!(!config.security.enable_security_check);
        assert_eq!(config.git.include_logs_count, 7);
    }

    #[test]
    fn absent_flags_leave_defaults() {
        let args = Args::parse_from(["repopack"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.output.style, OutputStyle::Xml);
        assert!(config.security.enable_security_check);
        assert!(config.git.sort_by_changes);
    }

    #[test]
    fn token_count_tree_flag_variants() {
        let args = Args::parse_from(["repopack", "--token-count-tree"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert!(config.output.token_count_tree.is_enabled());
        assert_eq!(config.output.token_count_tree.threshold(), 0);

        let args = Args::parse_from(["repopack", "--token-count-tree", "100"]);
        let mut config = Config::default();
        args.apply_to(&mut config);
        assert_eq!(config.output.token_count_tree.threshold(), 100);
    }

    #[test]
    fn default_directory_is_cwd() {
        let args = Args::parse_from(["repopack"]);
        assert_eq!(args.directories, vec![PathBuf::from(".")]);
    }
}
