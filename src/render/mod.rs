pub mod json;
pub mod markdown;
pub mod plain;
pub mod tree;
pub mod xml;

use crate::config::{Config, OutputStyle};
use crate::types::{GitDiffs, ProcessedFile};

/// Everything rendering may look at. Rendering is a pure function of this
/// context: no filesystem, no clocks.
pub struct RenderContext<'a> {
    pub config: &'a Config,
    pub files: &'a [ProcessedFile],
    pub tree_text: &'a str,
    pub diffs: Option<&'a GitDiffs>,
    pub logs: Option<&'a str>,
    pub instruction: Option<&'a str>,
}

/// Render the full artifact in the configured style.
pub fn render(ctx: &RenderContext) -> String {
    match ctx.config.output.style {
        OutputStyle::Xml => xml::render(ctx),
        OutputStyle::Markdown => markdown::render(ctx),
        OutputStyle::Json => json::render(ctx),
        OutputStyle::Plain => plain::render(ctx),
    }
}

/// Opening line of the generated artifact.
pub(crate) const GENERATION_HEADER: &str =
    "This file is a merged representation of the entire codebase, combined into a single document.";

/// The file-summary paragraph shared by all styles.
pub(crate) fn summary_purpose() -> String {
    "This file contains a packed representation of the repository's contents.\n\
     It is designed to be easily consumable by AI systems for analysis, code review,\n\
     or other automated processes."
        .to_string()
}

/// Config-dependent notes appended to the file summary.
pub(crate) fn summary_notes(config: &Config) -> Vec<String> {
    let mut notes = vec![
        "Some files may have been excluded based on ignore rules.".to_string(),
        "Binary files are not included in this packed representation.".to_string(),
    ];
    if config.security.enable_security_check {
        notes.push("Files matching secret-scanning rules are excluded.".to_string());
    }
    if config.output.remove_comments {
        notes.push("Code comments have been removed from supported file types.".to_string());
    }
    if config.output.remove_empty_lines {
        notes.push("Empty lines have been removed from all files.".to_string());
    }
    if config.output.compress {
        notes.push(
            "Content has been compressed: code blocks are reduced to essential signatures and documentation."
                .to_string(),
        );
    }
    if config.output.show_line_numbers {
        notes.push("Line numbers have been added to the beginning of each line.".to_string());
    }
    if config.output.truncate_base64 {
        notes.push("Long base64 data strings have been truncated.".to_string());
    }
    notes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ProcessedFile;

    pub(crate) fn sample_files() -> Vec<ProcessedFile> {
        vec![
            ProcessedFile::new("README.md".into(), "# Sample".into()),
            ProcessedFile::new("src/a.ts".into(), "export const x = 1;".into()),
        ]
    }

    pub(crate) fn context_with<'a>(
        config: &'a Config,
        files: &'a [ProcessedFile],
        tree_text: &'a str,
    ) -> RenderContext<'a> {
        RenderContext {
            config,
            files,
            tree_text,
            diffs: None,
            logs: None,
            instruction: None,
        }
    }

    #[test]
    fn notes_follow_config() {
        let mut config = Config::default();
        let base = summary_notes(&config).len();
        config.output.remove_comments = true;
        config.output.compress = true;
        assert_eq!(summary_notes(&config).len(), base + 2);
    }

    #[test]
    fn style_dispatch_produces_distinct_output() {
        let files = sample_files();
        let mut config = Config::default();
        let xml = render(&context_with(&config, &files, "README.md"));
        assert!(xml.starts_with("<repomix>") || xml.contains("<repomix>"));

        config.output.style = OutputStyle::Markdown;
        let md = render(&context_with(&config, &files, "README.md"));
        assert!(md.contains("## File: README.md"));

        config.output.style = OutputStyle::Json;
        let json = render(&context_with(&config, &files, "README.md"));
        assert!(serde_json::from_str::<serde_json::Value>(&json).is_ok());

        config.output.style = OutputStyle::Plain;
        let plain = render(&context_with(&config, &files, "README.md"));
        assert!(plain.contains("================"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let files = sample_files();
        let config = Config::default();
        let a = render(&context_with(&config, &files, "tree"));
        let b = render(&context_with(&config, &files, "tree"));
        assert_eq!(a, b);
    }
}
