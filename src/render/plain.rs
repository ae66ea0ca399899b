use super::{GENERATION_HEADER, RenderContext, summary_notes, summary_purpose};

const SECTION_BANNER: &str = "================";
const FILE_BANNER: &str = "----------------";

fn section(out: &mut String, title: &str) {
    out.push_str(SECTION_BANNER);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(SECTION_BANNER);
    out.push('\n');
}

pub fn render(ctx: &RenderContext) -> String {
    let mut out = String::new();

    if ctx.config.output.file_summary {
        out.push_str(&format!("{GENERATION_HEADER}\n\n"));
    }

    if let Some(header) = &ctx.config.output.header_text {
        section(&mut out, "User Provided Header");
        out.push_str(header);
        out.push_str("\n\n");
    }

    if ctx.config.output.file_summary {
        section(&mut out, "File Summary");
        out.push_str(&summary_purpose());
        out.push_str("\n\nNotes:\n");
        for note in summary_notes(ctx.config) {
            out.push_str(&format!("- {note}\n"));
        }
        out.push('\n');
    }

    if ctx.config.output.directory_structure {
        section(&mut out, "Directory Structure");
        out.push_str(ctx.tree_text);
        out.push_str("\n\n");
    }

    if ctx.config.output.files {
        section(&mut out, "Files");
        for file in ctx.files {
            out.push_str(FILE_BANNER);
            out.push('\n');
            out.push_str(&format!("File: {}\n", file.path));
            out.push_str(FILE_BANNER);
            out.push('\n');
            out.push_str(&file.content);
            out.push_str("\n\n");
        }
    }

    if let Some(diffs) = ctx.diffs {
        section(&mut out, "Git Diffs");
        out.push_str("Work tree:\n");
        out.push_str(&diffs.work_tree);
        out.push_str("\n\nStaged:\n");
        out.push_str(&diffs.staged);
        out.push_str("\n\n");
    }

    if let Some(logs) = ctx.logs {
        section(&mut out, "Git Logs");
        out.push_str(logs);
        out.push_str("\n\n");
    }

    if let Some(instruction) = ctx.instruction {
        section(&mut out, "Instruction");
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

    #[test]
    fn banners_wrap_sections() {
        let files = sample_files();
        let config = Config::default();
        let out = render(&context_with(&config, &files, "README.md"));
        assert!(out.contains("================\nFile Summary\n================"));
        assert!(out.contains("================\nFiles\n================"));
        assert!(out.contains("----------------\nFile: README.md\n----------------"));
    }

    #[test]
    fn file_contents_follow_their_banner() {
        let files = sample_files();
        let config = Config::default();
        let out = render(&context_with(&config, &files, "tree"));
        let banner = out.find("File: src/a.ts").unwrap();
        let content = out.find("export const x = 1;").unwrap();
        assert!(banner < content);
    }

    #[test]
    fn summary_toggle_removes_preamble() {
        let files = sample_files();
        let mut config = Config::default();
        config.output.file_summary = false;
        let out = render(&context_with(&config, &files, "tree"));
        assert!(!out.contains("File Summary"));
        assert!(!out.contains(GENERATION_HEADER));
    }
}
