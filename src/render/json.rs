use serde_json::{Map, Value, json};

use super::{RenderContext, summary_notes, summary_purpose};

/// Render a single JSON object with stable key order (insertion order):
/// `fileSummary`, `userProvidedHeader?`, `directoryStructure`, `files`,
/// `gitDiffs?`, `gitLogs?`, `instruction?`.
pub fn render(ctx: &RenderContext) -> String {
    let mut root = Map::new();

    if ctx.config.output.file_summary {
        let mut summary = String::from(summary_purpose());
        summary.push_str("\n\nNotes:\n");
        for note in summary_notes(ctx.config) {
            summary.push_str(&format!("- {note}\n"));
        }
        root.insert("fileSummary".to_string(), Value::String(summary));
    }

    if let Some(header) = &ctx.config.output.header_text {
        root.insert(
            "userProvidedHeader".to_string(),
            Value::String(header.clone()),
        );
    }

    if ctx.config.output.directory_structure {
        root.insert(
            "directoryStructure".to_string(),
            Value::String(ctx.tree_text.to_string()),
        );
    }

    if ctx.config.output.files {
        let mut files = Map::new();
        for file in ctx.files {
            files.insert(file.path.clone(), Value::String(file.content.clone()));
        }
        root.insert("files".to_string(), Value::Object(files));
    }

    if let Some(diffs) = ctx.diffs {
        root.insert(
            "gitDiffs".to_string(),
            json!({
                "workTree": diffs.work_tree,
                "staged": diffs.staged,
            }),
        );
    }

    if let Some(logs) = ctx.logs {
        root.insert("gitLogs".to_string(), Value::String(logs.to_string()));
    }

    if let Some(instruction) = ctx.instruction {
        root.insert(
            "instruction".to_string(),
            Value::String(instruction.to_string()),
        );
    }

    let mut out = serde_json::to_string_pretty(&Value::Object(root))
        .expect("serializing strings cannot fail");
    out.push('\n');
    out
}
