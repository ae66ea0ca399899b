use super::{GENERATION_HEADER, RenderContext, summary_notes, summary_purpose};
use crate::transform::lang::fence_hint;

/// A fence long enough to contain the content: one backtick more than the
/// longest backtick run inside it, minimum three.
fn fence_for(content: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for c in content.chars() {
        if c == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

pub fn render(ctx: &RenderContext) -> String {
    let mut out = String::new();

    if ctx.config.output.file_summary {
        out.push_str(&format!("{GENERATION_HEADER}\n\n"));
    }

    if let Some(header) = &ctx.config.output.header_text {
        out.push_str("# User Provided Header\n\n");
        out.push_str(header);
        out.push_str("\n\n");
    }

    if ctx.config.output.file_summary {
        out.push_str("# File Summary\n\n");
        out.push_str("## Purpose\n\n");
        out.push_str(&summary_purpose());
        out.push_str("\n\n## Notes\n\n");
        for note in summary_notes(ctx.config) {
            out.push_str(&format!("- {note}\n"));
        }
        out.push('\n');
    }

    if ctx.config.output.directory_structure {
        out.push_str("# Directory Structure\n\n```\n");
        out.push_str(ctx.tree_text);
        out.push_str("\n```\n\n");
    }

    if ctx.config.output.files {
        out.push_str("# Files\n\n");
        for file in ctx.files {
            let fence = fence_for(&file.content);
            let hint = fence_hint(&file.path);
            out.push_str(&format!("## File: {}\n\n", file.path));
            out.push_str(&format!("{fence}{hint}\n{}\n{fence}\n\n", file.content));
        }
    }

    if let Some(diffs) = ctx.diffs {
        out.push_str("# Git Diffs\n\n## Work Tree\n\n```diff\n");
        out.push_str(&diffs.work_tree);
        out.push_str("\n```\n\n## Staged\n\n```diff\n");
        out.push_str(&diffs.staged);
        out.push_str("\n```\n\n");
    }

    if let Some(logs) = ctx.logs {
        out.push_str("# Git Logs\n\n```\n");
        out.push_str(logs);
        out.push_str("\n```\n\n");
    }

    if let Some(instruction) = ctx.instruction {
        out.push_str("# Instruction\n\n");
        out.push_str(instruction);
        out.push('\n');
    }

    out.trim_end().to_string() + "\n"
}

#[cfg(test)]
mod tests {
    use super::super::tests::{context_with, sample_files};
    use super::*;
    use crate::config::Config;
    use crate::types::ProcessedFile;

    #[test]
    fn file_headers_and_fences() {
        let files = sample_files();
        let config = Config::default();
        let out = render(&context_with(&config, &files, "README.md"));
        assert!(out.contains("## File: README.md\n\n```markdown\n# Sample\n```"));
        assert!(out.contains("## File: src/a.ts\n\n```typescript\nexport const x = 1;\n```"));
    }

    #[test]
    fn fence_grows_past_embedded_backticks() {
        assert_eq!(fence_for("no backticks"), "```");
        assert_eq!(fence_for("a ``` b"), "````");
        assert_eq!(fence_for("x `````"), "``````");
    }

    #[test]
    fn embedded_fence_does_not_break_block() {
        let files = vec![ProcessedFile::new(
            "doc.md".into(),
            "```rust\nfn main() {}\n```".into(),
        )];
        let config = Config::default();
        let out = render(&context_with(&config, &files, "doc.md"));
        assert!(out.contains("````markdown\n```rust\nfn main() {}\n```\n````"));
    }

    #[test]
    fn sections_in_order() {
        let files = sample_files();
        let mut config = Config::default();
        config.output.header_text = Some("HDR".into());
        let out = render(&context_with(&config, &files, "tree"));
        let header = out.find("# User Provided Header").unwrap();
        let summary = out.find("# File Summary").unwrap();
        let structure = out.find("# Directory Structure").unwrap();
        let files_idx = out.find("# Files").unwrap();
        assert!(header < summary && summary < structure && structure < files_idx);
    }

    #[test]
    fn directory_structure_toggle() {
        let files = sample_files();
        let mut config = Config::default();
        config.output.directory_structure = false;
        let out = render(&context_with(&config, &files, "tree"));
        assert!(!out.contains("# Directory Structure"));
    }
}
