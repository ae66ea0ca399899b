use super::{GENERATION_HEADER, RenderContext, summary_notes, summary_purpose};

pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;").replace('\'', "&apos;")
}

/// Wrap content in CDATA, splitting the section whenever the content itself
/// contains the `]]>` terminator.
pub(crate) fn cdata(content: &str) -> String {
    format!("<![CDATA[{}]]>", content.replace("]]>", "]]]]><![CDATA[>"))
}

pub fn render(ctx: &RenderContext) -> String {
    let parsable = ctx.config.output.parsable_style;
    let body = |text: &str| {
        if parsable {
            escape_text(text)
        } else {
            text.to_string()
        }
    };

    let mut out = String::new();
    if ctx.config.output.file_summary {
        out.push_str(&format!("<!-- {GENERATION_HEADER} -->\n"));
    }
    out.push_str("<repomix>\n");

    if let Some(header) = &ctx.config.output.header_text {
        out.push_str("<user_provided_header>\n");
        out.push_str(&body(header));
        out.push_str("\n</user_provided_header>\n\n");
    }

    if ctx.config.output.file_summary {
        out.push_str("<file_summary>\n");
        out.push_str("<purpose>\n");
        out.push_str(&body(&summary_purpose()));
        out.push_str("\n</purpose>\n");
        out.push_str("<notes>\n");
        for note in summary_notes(ctx.config) {
            out.push_str(&format!("- {}\n", body(&note)));
        }
        out.push_str("</notes>\n");
        out.push_str("</file_summary>\n\n");
    }

    if ctx.config.output.directory_structure {
        out.push_str("<directory_structure>\n");
        out.push_str(&body(ctx.tree_text));
        out.push_str("\n</directory_structure>\n\n");
    }

    if ctx.config.output.files {
        out.push_str("<files>\n");
        for file in ctx.files {
            out.push_str(&format!("<file path=\"{}\">\n", escape_attr(&file.path)));
            if parsable {
                out.push_str(&escape_text(&file.content));
            } else {
                out.push_str(&cdata(&file.content));
            }
            out.push_str("\n</file>\n");
        }
        out.push_str("</files>\n");
    }

    if let Some(diffs) = ctx.diffs {
        out.push_str("\n<git_diffs>\n");
        out.push_str("<git_diff_work_tree>\n");
        out.push_str(&body(&diffs.work_tree));
        out.push_str("\n</git_diff_work_tree>\n");
        out.push_str("<git_diff_staged>\n");
        out.push_str(&body(&diffs.staged));
        out.push_str("\n</git_diff_staged>\n");
        out.push_str("</git_diffs>\n");
    }

    if let Some(logs) = ctx.logs {
        out.push_str("\n<git_logs>\n");
        out.push_str(&body(logs));
        out.push_str("\n</git_logs>\n");
    }

    if let Some(instruction) = ctx.instruction {
        out.push_str("\n<instruction>\n");
        out.push_str(&body(instruction));
        out.push_str("\n</instruction>\n");
    }

    out.push_str("</repomix>\n");
    out
}

#[cfg(test)]
mod tests {
    use super::super::tests::{context_with, sample_files};
    use super::*;
    use crate::config::Config;
    use crate::types::{GitDiffs, ProcessedFile};

    #[test]
    fn root_element_and_file_blocks() {
        let files = sample_files();
        let config = Config::default();
        let out = render(&context_with(&config, &files, "README.md\nsrc/\n  a.ts"));
        assert!(out.contains("<repomix>"));
        assert!(out.ends_with("</repomix>\n"));
        assert!(out.contains("<file path=\"README.md\">"));
        assert!(out.contains("<file path=\"src/a.ts\">"));
        assert!(out.contains("<![CDATA[# Sample]]>"));
    }

    #[test]
    fn cdata_split_on_terminator() {
        assert_eq!(cdata("plain"), "<![CDATA[plain]]>");
        let tricky = cdata("a]]>b");
        assert_eq!(tricky, "<![CDATA[a]]]]><![CDATA[>b]]>");
    }

    #[test]
    fn attr_escaping() {
        assert_eq!(escape_attr("a\"b<c>&'d"), "a&quot;b&lt;c&gt;&amp;&apos;d");
    }

    #[test]
    fn parsable_style_escapes_instead_of_cdata() {
        let files = vec![ProcessedFile::new(
            "a.rs".into(),
            "if a < b && b > c {}".into(),
        )];
        let mut config = Config::default();
        config.output.parsable_style = true;
        let out = render(&context_with(&config, &files, "a.rs"));
        assert!(!out.contains("CDATA"));
        assert!(out.contains("if a &lt; b &amp;&amp; b &gt; c {}"));
    }

    #[test]
    fn sections_respect_toggles() {
        let files = sample_files();
        let mut config = Config::default();
        config.output.file_summary = false;
        config.output.directory_structure = false;
        let out = render(&context_with(&config, &files, "tree"));
        assert!(!out.contains("<file_summary>"));
        assert!(!out.contains("<directory_structure>"));
        assert!(out.contains("<files>"));
    }

    #[test]
    fn header_text_rendered() {
        let files = sample_files();
        let mut config = Config::default();
        config.output.header_text = Some("Internal use only.".into());
        let out = render(&context_with(&config, &files, "tree"));
        assert!(out.contains("<user_provided_header>\nInternal use only.\n</user_provided_header>"));
    }

    #[test]
    fn git_sections_rendered_when_present() {
        let files = sample_files();
        let config = Config::default();
        let diffs = GitDiffs {
            work_tree: "diff --git a/x b/x".into(),
            staged: String::new(),
        };
        let mut ctx = context_with(&config, &files, "tree");
        ctx.diffs = Some(&diffs);
        ctx.logs = Some("2024-03-10 | init");
        let out = render(&ctx);
        assert!(out.contains("<git_diffs>"));
        assert!(out.contains("diff --git a/x b/x"));
        assert!(out.contains("<git_logs>\n2024-03-10 | init\n</git_logs>"));
    }
}
