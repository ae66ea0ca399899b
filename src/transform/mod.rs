pub mod comments;
pub mod compress;
pub mod lang;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::collect::worker_count;
use crate::config::Config;
use crate::error::Error;
use crate::types::{ProcessedFile, RawFile, Truncation};
use compress::Compressed;
use lang::Lang;

/// Minimum run length treated as an embedded base64 blob.
const BASE64_MIN_RUN: usize = 60;
const BASE64_MARKER: &str = "[base64 omitted]";

static BASE64_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!("[A-Za-z0-9+/=]{{{BASE64_MIN_RUN},}}")).expect("base64 regex"));

/// Replace long base64-alphabet runs with a short marker. Plain hex digests
/// and identifiers lack `+`, `/`, and `=` and are left alone.
pub fn truncate_base64(content: &str) -> String {
    BASE64_RUN
        .replace_all(content, |caps: &regex::Captures| {
            let run = &caps[0];
            if run.contains(['+', '/', '=']) {
                BASE64_MARKER.to_string()
            } else {
                run.to_string()
            }
        })
        .into_owned()
}

fn remove_empty_lines(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Prefix each line with its 1-based number, right-aligned to the width of
/// the final line count.
fn number_lines(content: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let width = lines.len().max(1).to_string().len();
    lines
        .iter()
        .enumerate()
        .map(|(i, line)| format!("{:>width$}: {line}", i + 1))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply every configured transformation to one file, in stage order.
pub fn transform_file(
    raw: &RawFile,
    config: &Config,
    blame: Option<&str>,
) -> Result<ProcessedFile, Error> {
    let language = Lang::from_path(&raw.path);
    let blame_applied = blame.is_some();
    let mut content = match blame {
        Some(annotated) => annotated.to_string(),
        None => raw.content.clone(),
    };

    if config.output.truncate_base64 {
        content = truncate_base64(&content);
    }

    if config.output.remove_comments
        && !blame_applied
        && let Some(syntax) = language.and_then(|l| l.comment_syntax())
    {
        content = comments::strip_comments(&content, &syntax);
    }

    if config.output.remove_empty_lines && !blame_applied {
        content = remove_empty_lines(&content);
    }

    content.truncate(content.trim_end().len());

    let mut compressed = false;
    if config.output.compress
        && !blame_applied
        && let Some(lang) = language
    {
        match compress::compress_content(lang, &content).map_err(|message| Error::Parse {
            path: PathBuf::from(&raw.path),
            message,
        })? {
            Compressed::Done(out) => {
                content = out;
                compressed = true;
            }
            Compressed::Unsupported => {
                trace!("no compression for {}, keeping original content", raw.path);
            }
        }
    }

    if !compressed && config.output.show_line_numbers {
        content = number_lines(&content);
    }

    let mut processed = ProcessedFile::new(raw.path.clone(), content);
    if let Some(limit) = config.output.file_line_limit {
        apply_line_limit(&mut processed, limit);
    }
    Ok(processed)
}

fn apply_line_limit(processed: &mut ProcessedFile, limit: usize) {
    let original_line_count = processed.content.lines().count();
    if original_line_count <= limit {
        processed.truncation = Some(Truncation {
            truncated: false,
            original_line_count,
            truncated_line_count: original_line_count,
            line_limit: limit,
        });
        return;
    }
    let truncated: String = processed
        .content
        .lines()
        .take(limit)
        .collect::<Vec<_>>()
        .join("\n");
    processed.original_content = Some(std::mem::replace(&mut processed.content, truncated));
    processed.truncation = Some(Truncation {
        truncated: true,
        original_line_count,
        truncated_line_count: limit,
        line_limit: limit,
    });
}

/// Transform raw files in parallel (bounded), preserving input order.
/// `blame_contents` carries pre-rendered blame annotations keyed by path.
pub async fn transform_files(
    raw_files: &[RawFile],
    config: &Config,
    blame_contents: &HashMap<String, String>,
    cancel: &CancellationToken,
) -> Result<Vec<ProcessedFile>, Error> {
    let permits = worker_count(raw_files.len());
    let semaphore = Arc::new(Semaphore::new(permits));
    let config = Arc::new(config.clone());

    let mut set: JoinSet<(usize, Result<ProcessedFile, Error>)> = JoinSet::new();
    for (index, raw) in raw_files.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let sem = Arc::clone(&semaphore);
        let config = Arc::clone(&config);
        let raw = raw.clone();
        let blame = blame_contents.get(&raw.path).cloned();
        set.spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            (index, transform_file(&raw, &config, blame.as_deref()))
        });
    }

    let mut results: Vec<(usize, ProcessedFile)> = Vec::new();
    while let Some(joined) = set.join_next().await {
        let (index, result) = joined.map_err(|e| Error::Precondition(e.to_string()))?;
        results.push((index, result?));
    }
    results.sort_by_key(|(index, _)| *index);
    Ok(results.into_iter().map(|(_, p)| p).collect())
}
