use std::path::Path;

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use tracing::debug;

use crate::config::Config;
use crate::defaults::{BINARY_EXTENSIONS, DEFAULT_IGNORE_PATTERNS};
use crate::error::Error;

/// Discovery output for one root: sorted relative file paths plus (when
/// configured) directories left with no surviving files.
#[derive(Debug, Clone, Default)]
pub struct DiscoveredFiles {
    pub file_paths: Vec<String>,
    pub empty_dir_paths: Vec<String>,
}

/// Glob metacharacters that distinguish a pattern from a literal path.
const GLOB_META: &[char] = &['*', '?', '[', ']', '{', '}', '!', '+', '@', '|'];

fn is_literal(pattern: &str) -> bool {
    !pattern.contains(GLOB_META)
}

/// Expand literal include inputs against the filesystem: a directory becomes
/// `dir/**/*`, a file becomes its escaped literal path, and a non-existent
/// literal passes through unchanged. Escaping keeps route-group style names
/// like `(site)` matching literally.
fn expand_include_pattern(root: &Path, pattern: &str) -> String {
    if !is_literal(pattern) {
        return pattern.to_string();
    }
    let normalized = pattern.trim_end_matches('/');
    let on_disk = root.join(normalized);
    if on_disk.is_dir() {
        format!("{}/**/*", globset::escape(normalized))
    } else if on_disk.is_file() {
        globset::escape(normalized)
    } else {
        pattern.to_string()
    }
}

/// Normalize a user ignore pattern: a gitignore-style trailing slash means
/// "everything under this directory".
fn normalize_ignore_pattern(pattern: &str) -> String {
    if let Some(dir) = pattern.strip_suffix('/') {
        format!("{dir}/**")
    } else {
        pattern.to_string()
    }
}

fn build_globset(patterns: &[String], field: &str) -> Result<GlobSet, Error> {
    let mut builder = GlobSetBuilder::new();
    for p in patterns {
        let glob = Glob::new(p)
            .map_err(|e| Error::config(field, format!("invalid glob pattern '{p}': {e}")))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::config(field, format!("failed to build glob set: {e}")))
}

/// Include/ignore matcher layered per the configuration.
///
/// The ignore set is the union, in order, of: defaults, custom patterns, the
/// output file path, and the binary/non-text extension set. `.gitignore` and
/// `.git/info/exclude` rules are applied by the directory walker itself, not
/// by this matcher.
pub struct PathMatcher {
    include_set: Option<GlobSet>,
    ignore_set: GlobSet,
}

impl PathMatcher {
    pub fn new(root: &Path, config: &Config) -> Result<Self, Error> {
        let include_patterns: Vec<String> = config
            .include
            .iter()
            .map(|p| expand_include_pattern(root, p))
            .collect();
        let include_set = if include_patterns.is_empty() {
            None
        } else {
            Some(build_globset(&include_patterns, "include")?)
        };

        let mut ignore_patterns: Vec<String> = Vec::new();
        if config.ignore.use_default_patterns {
            ignore_patterns.extend(DEFAULT_IGNORE_PATTERNS.iter().map(|p| p.to_string()));
        }
        ignore_patterns.extend(
            config
                .ignore
                .custom_patterns
                .iter()
                .map(|p| normalize_ignore_pattern(p)),
        );
        // The artifact we are about to write must never package itself.
        if let Ok(rel) = config.resolved_output_path().strip_prefix(root) {
            ignore_patterns.push(globset::escape(&rel.to_string_lossy().replace('\\', "/")));
        }
        ignore_patterns.extend(BINARY_EXTENSIONS.iter().map(|ext| format!("*.{ext}")));

        let ignore_set = build_globset(&ignore_patterns, "ignore.customPatterns")?;

        Ok(Self {
            include_set,
            ignore_set,
        })
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        if self.ignore_set.is_match(rel_path) {
            return false;
        }
        self.include_set
            .as_ref()
            .is_none_or(|set| set.is_match(rel_path))
    }
}

/// Walk `root`, applying layered ignore rules, and return the canonical
/// sorted set of relative paths (plus empty directories when configured).
pub fn discover_files(root: &Path, config: &Config) -> Result<DiscoveredFiles, Error> {
    let matcher = PathMatcher::new(root, config)?;

    let mut walker = WalkBuilder::new(root);
    walker
        .hidden(false)
        .parents(false)
        .ignore(false)
        .git_global(false)
        .git_ignore(config.ignore.use_gitignore)
        .git_exclude(config.ignore.use_gitignore)
        .require_git(false)
        .follow_links(false)
        .filter_entry(|entry| entry.file_name().to_str() != Some(".git"));

    let mut files: Vec<String> = Vec::new();
    let mut dirs: Vec<String> = Vec::new();

    for entry in walker.build() {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                debug!("walk error under {}: {e}", root.display());
                continue;
            }
        };
        let Ok(rel) = entry.path().strip_prefix(root) else {
            continue;
        };
        if rel.as_os_str().is_empty() {
            continue;
        }
        let rel_str = rel.to_string_lossy().replace('\\', "/");
        match entry.file_type() {
            Some(ft) if ft.is_file() => {
                if matcher.matches(&rel_str) {
                    files.push(rel_str);
                }
            }
            Some(ft) if ft.is_dir() => dirs.push(rel_str),
            _ => {}
        }
    }

    files.sort();
    files.dedup();

    let empty_dir_paths = if config.output.include_empty_directories {
        let mut empties: Vec<String> = dirs
            .into_iter()
            .filter(|d| !files.iter().any(|f| f.starts_with(&format!("{d}/"))))
            .filter(|d| matcher.matches(d))
            .collect();
        empties.sort();
        empties
    } else {
        Vec::new()
    };

    debug!(
        "discovered {} files, {} empty dirs under {}",
        files.len(),
        empty_dir_paths.len(),
        root.display()
    );

    Ok(DiscoveredFiles {
        file_paths: files,
        empty_dir_paths,
    })
}
