//! # repopack
//!
//! Package the contents of a repository into a single LLM-ready artifact.
//!
//! The main entry point is [`run()`], which executes the full pipeline:
//! file discovery, raw collection, content transformation, secret scanning,
//! git enrichment, tokenization, rendering, and the final write.

pub mod cli;
pub mod collect;
pub mod config;
pub mod defaults;
pub mod discover;
pub mod error;
pub mod git;
pub mod output;
pub mod remote;
pub mod render;
pub mod security;
pub mod tokens;
pub mod transform;
pub mod types;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::PathBuf;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::error::Error;
use crate::types::{GitDiffs, PackResult, RawFile};

/// The rendered artifact plus the aggregate metrics behind it.
pub struct PackOutput {
    pub result: PackResult,
    pub rendered: String,
}

/// One discovered file: which root it came from, its path relative to that
/// root, and the path it is displayed under in the artifact.
struct DiscoveredEntry {
    root_index: usize,
    rel_path: String,
    display_path: String,
}

fn display_prefix(root: &std::path::Path, multi_root: bool) -> String {
    if !multi_root {
        return String::new();
    }
    let text = root.to_string_lossy().replace('\\', "/");
    let trimmed = text.trim_start_matches("./").trim_matches('/');
    if trimmed == "." {
        String::new()
    } else {
        trimmed.to_string()
    }
}

fn join_display(prefix: &str, rel: &str) -> String {
    if prefix.is_empty() {
        rel.to_string()
    } else {
        format!("{prefix}/{rel}")
    }
}

/// Execute the packaging pipeline and return the rendered artifact together
/// with its [`PackResult`]. Pure with respect to the output sink: nothing is
/// written.
pub async fn pack(
    roots: &[PathBuf],
    config: &Config,
    cancel: &CancellationToken,
) -> Result<PackOutput, Error> {
    config.validate()?;
    if roots.is_empty() {
        return Err(Error::config("directories", "at least one root is required"));
    }

    let multi_root = roots.len() > 1;
    let mut abs_roots: Vec<PathBuf> = Vec::new();
    let mut prefixes: Vec<String> = Vec::new();
    for root in roots {
        let abs = root
            .canonicalize()
            .map_err(|_| Error::Precondition(format!("{}: path not found", root.display())))?;
        prefixes.push(display_prefix(root, multi_root));
        abs_roots.push(abs);
    }

    // Discovery: deterministic sorted set per root, roots in caller order.
    let mut entries: Vec<DiscoveredEntry> = Vec::new();
    let mut empty_dirs: Vec<String> = Vec::new();
    for (root_index, abs) in abs_roots.iter().enumerate() {
        let discovered = discover::discover_files(abs, config)?;
        for rel_path in discovered.file_paths {
            entries.push(DiscoveredEntry {
                root_index,
                rel_path: rel_path.clone(),
                display_path: join_display(&prefixes[root_index], &rel_path),
            });
        }
        for dir in discovered.empty_dir_paths {
            empty_dirs.push(join_display(&prefixes[root_index], &dir));
        }
    }
    debug!("discovered {} candidate files", entries.len());

    // Raw collection, per root, results re-ordered to discovery order.
    let mut raw_files: Vec<RawFile> = Vec::new();
    for (root_index, abs) in abs_roots.iter().enumerate() {
        let rel_paths: Vec<String> = entries
            .iter()
            .filter(|e| e.root_index == root_index)
            .map(|e| e.rel_path.clone())
            .collect();
        let collected = collect::collect_files(abs, &rel_paths, config, cancel).await?;
        raw_files.extend(collected.into_iter().map(|raw| RawFile {
            path: join_display(&prefixes[root_index], &raw.path),
            content: raw.content,
        }));
    }
    debug!("collected {} readable files", raw_files.len());

    // Security filter: drop suspicious files before anything downstream.
    let suspicious_files_results = if config.security.enable_security_check {
        security::scan_files(&raw_files, cancel).await
    } else {
        Vec::new()
    };
    let suspicious_paths: HashSet<&str> = suspicious_files_results
        .iter()
        .map(|f| f.file_path.as_str())
        .collect();
    let safe_raws: Vec<RawFile> = raw_files
        .into_iter()
        .filter(|raw| !suspicious_paths.contains(raw.path.as_str()))
        .collect();
    let safe_file_paths: Vec<String> = safe_raws.iter().map(|r| r.path.clone()).collect();

    // Blame annotations are fetched up front so transformation stays local
    // to one file.
    let blame_contents: HashMap<String, String> = if config.git.show_blame {
        let mut map = HashMap::new();
        for (root_index, abs) in abs_roots.iter().enumerate() {
            let rel_paths: Vec<String> = entries
                .iter()
                .filter(|e| {
                    e.root_index == root_index
                        && safe_file_paths.iter().any(|p| p == &e.display_path)
                })
                .map(|e| e.rel_path.clone())
                .collect();
            for (rel, annotated) in git::blame_files(abs, &rel_paths).await {
                map.insert(join_display(&prefixes[root_index], &rel), annotated);
            }
        }
        map
    } else {
        HashMap::new()
    };

    let mut processed =
        transform::transform_files(&safe_raws, config, &blame_contents, cancel).await?;
    debug!("transformed {} files", processed.len());

    // Sort by git churn, least-changed first; input order is the tiebreak.
    if config.git.sort_by_changes {
        let counts = git::change_counts(&abs_roots[0], config.git.sort_by_changes_max_commits).await;
        if !counts.is_empty() {
            processed.sort_by_key(|file| counts.get(&file.path).copied().unwrap_or(0));
        }
    }

    // Git enrichment sections.
    let diffs: Option<GitDiffs> = if config.git.include_diffs {
        let d = git::diffs(&abs_roots[0]).await;
        (!d.is_empty()).then_some(d)
    } else {
        None
    };
    let mut suspicious_git_diff_results = Vec::new();
    if let Some(d) = &diffs {
        if let Some(finding) = security::scan_diff("workTree", &d.work_tree) {
            suspicious_git_diff_results.push(finding);
        }
        if let Some(finding) = security::scan_diff("staged", &d.staged) {
            suspicious_git_diff_results.push(finding);
        }
    }
    let logs: Option<String> = if config.git.include_logs {
        git::simple_log(&abs_roots[0], config.git.include_logs_count).await
    } else {
        None
    };

    let instruction: Option<String> = match &config.output.instruction_file_path {
        Some(path) => {
            let resolved = if path.is_absolute() {
                path.clone()
            } else {
                config.cwd.join(path)
            };
            Some(std::fs::read_to_string(&resolved).map_err(|e| {
                Error::config(
                    "output.instructionFilePath",
                    format!("{}: {e}", resolved.display()),
                )
            })?)
        }
        None => None,
    };

    // Tokenization: one shared counter per encoding for the whole process.
    let counter = tokens::TokenCounter::new(&config.token_count.encoding)?;
    let mut file_char_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut file_token_counts: BTreeMap<String, usize> = BTreeMap::new();
    for file in &processed {
        file_char_counts.insert(file.path.clone(), file.content.chars().count());
        file_token_counts.insert(file.path.clone(), counter.count(&file.content));
    }

    // Directory structure comes from the post-filter set, or the full
    // discovery set when configured. Suspicious paths never appear either way.
    let tree_paths: Vec<String> = if config.output.include_full_directory_structure {
        entries
            .iter()
            .filter(|e| !suspicious_paths.contains(e.display_path.as_str()))
            .map(|e| e.display_path.clone())
            .collect()
    } else {
        processed.iter().map(|f| f.path.clone()).collect()
    };
    let annotations = config
        .output
        .token_count_tree
        .is_enabled()
        .then(|| (&file_token_counts, config.output.token_count_tree.threshold()));
    let tree_text = render::tree::generate_tree_text(&tree_paths, &empty_dirs, annotations);

    let ctx = render::RenderContext {
        config,
        files: &processed,
        tree_text: &tree_text,
        diffs: diffs.as_ref(),
        logs: logs.as_deref(),
        instruction: instruction.as_deref(),
    };
    let rendered = render::render(&ctx);

    let git_diff_token_count = diffs
        .as_ref()
        .map(|d| counter.count(&d.work_tree) + counter.count(&d.staged))
        .unwrap_or(0);
    let git_log_token_count = logs.as_deref().map(|l| counter.count(l)).unwrap_or(0);

    let result = PackResult {
        total_files: processed.len(),
        total_characters: file_char_counts.values().sum(),
        total_tokens: counter.count(&rendered),
        file_char_counts,
        file_token_counts,
        processed_files: processed,
        suspicious_files_results,
        suspicious_git_diff_results,
        safe_file_paths,
        git_diff_token_count,
        git_log_token_count,
    };

    Ok(PackOutput { result, rendered })
}

/// Run the full pipeline and write the artifact to its destination.
pub async fn run(
    roots: &[PathBuf],
    config: &Config,
    to_stdout: bool,
    cancel: &CancellationToken,
) -> Result<PackResult, Error> {
    let out = pack(roots, config, cancel).await?;
    output::write_output(&out.rendered, config, to_stdout).await?;
    Ok(out.result)
}

/// The `topFilesLength` largest files by token count, for console summaries.
pub fn top_files(result: &PackResult, limit: usize) -> Vec<(String, usize)> {
    let mut ranked: Vec<(String, usize)> = result
        .file_token_counts
        .iter()
        .map(|(path, count)| (path.clone(), *count))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn top_files_ranks_by_tokens_descending() {
        let mut result = PackResult::default();
        result.file_token_counts.insert("small.rs".into(), 5);
        result.file_token_counts.insert("large.rs".into(), 50);
        result.file_token_counts.insert("mid.rs".into(), 20);
        let top = top_files(&result, 2);
        assert_eq!(top[0].0, "large.rs");
        assert_eq!(top[1].0, "mid.rs");
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn display_prefix_only_for_multi_root() {
        assert_eq!(display_prefix(std::path::Path::new("src"), false), "");
        assert_eq!(display_prefix(std::path::Path::new("src"), true), "src");
        assert_eq!(display_prefix(std::path::Path::new("./src/"), true), "src");
        assert_eq!(display_prefix(std::path::Path::new("."), true), "");
    }

    #[test]
    fn join_display_paths() {
        assert_eq!(join_display("", "a.rs"), "a.rs");
        assert_eq!(join_display("lib", "src/a.rs"), "lib/src/a.rs");
    }
}
