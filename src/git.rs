use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex};

use tokio::process::Command;
use tracing::debug;

use crate::error::Error;
use crate::types::GitDiffs;

/// Record and field separators used by the structured `git log` template.
const RECORD_SEP: char = '\u{1e}';
const FIELD_SEP: char = '\u{1f}';

pub async fn run_git(repo_path: &Path, args: &[&str]) -> Result<String, Error> {
    let output = Command::new("git")
        .args(["-C", &repo_path.to_string_lossy()])
        .args(args)
        .output()
        .await
        .map_err(|e| Error::Precondition(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Git(stderr.trim().to_string()));
    }

    Ok(String::from_utf8(output.stdout)
        .unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Returns `true` when a `git` binary is on PATH.
pub async fn is_git_installed() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Returns `true` when `dir` is inside a git working tree. Every enrichment
/// operation checks this first and degrades to empty output otherwise.
pub async fn is_work_tree(dir: &Path) -> bool {
    run_git(dir, &["rev-parse", "--git-dir"]).await.is_ok()
}

type ChangeCountCache = Mutex<HashMap<(PathBuf, usize), Arc<HashMap<String, usize>>>>;

static CHANGE_COUNT_CACHE: LazyLock<ChangeCountCache> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Number of commits that touched each path within the last `max_commits`
/// commits. Cached per `(canonical root, max_commits)` across calls.
pub async fn change_counts(root: &Path, max_commits: usize) -> Arc<HashMap<String, usize>> {
    let key_root = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());
    let key = (key_root, max_commits);
    if let Some(cached) = CHANGE_COUNT_CACHE.lock().expect("cache lock").get(&key) {
        return Arc::clone(cached);
    }

    let n = max_commits.to_string();
    let counts: HashMap<String, usize> = match run_git(
        root,
        &["log", "--name-only", "--pretty=format:", "-n", &n],
    )
    .await
    {
        Ok(output) => {
            let mut map = HashMap::new();
            for line in output.lines().filter(|l| !l.is_empty()) {
                *map.entry(line.to_string()).or_insert(0) += 1;
            }
            map
        }
        Err(e) => {
            debug!("change counts unavailable for {}: {e}", root.display());
            HashMap::new()
        }
    };

    let counts = Arc::new(counts);
    CHANGE_COUNT_CACHE
        .lock()
        .expect("cache lock")
        .insert(key, Arc::clone(&counts));
    counts
}

/// Worktree and staged diffs, each empty when the directory is not a work
/// tree or the diff fails.
pub async fn diffs(root: &Path) -> GitDiffs {
    if !is_work_tree(root).await {
        return GitDiffs::default();
    }
    let work_tree = run_git(root, &["diff", "--no-color"]).await.unwrap_or_default();
    let staged = run_git(root, &["diff", "--no-color", "--cached"])
        .await
        .unwrap_or_default();
    GitDiffs { work_tree, staged }
}

/// Simple log: one record per commit (`date | subject`) followed by the
/// files it touched, for the last `count` commits.
pub async fn simple_log(root: &Path, count: usize) -> Option<String> {
    if !is_work_tree(root).await {
        return None;
    }
    let n = count.to_string();
    let output = run_git(
        root,
        &[
            "log",
            "--pretty=format:%x1e%ad|%s",
            "--date=iso",
            "--name-only",
            "-n",
            &n,
        ],
    )
    .await
    .ok()?;

    let mut rendered = String::new();
    for record in output.split(RECORD_SEP).filter(|r| !r.trim().is_empty()) {
        let mut lines = record.trim().lines();
        let Some(header) = lines.next() else { continue };
        let (date, subject) = header.split_once('|').unwrap_or((header, ""));
        rendered.push_str(&format!("{} | {}\n", date.trim(), subject.trim()));
        for file in lines.filter(|l| !l.trim().is_empty()) {
            rendered.push_str(&format!("  {file}\n"));
        }
        rendered.push('\n');
    }
    let rendered = rendered.trim_end().to_string();
    (!rendered.is_empty()).then_some(rendered)
}

/// One commit in the comprehensive log.
#[derive(Debug, Clone)]
pub struct Commit {
    pub hash: String,
    pub short_hash: String,
    pub parents: Vec<String>,
    pub author: String,
    pub email: String,
    pub date: String,
    pub subject: String,
    pub body: String,
}

impl Commit {
    pub fn is_merge(&self) -> bool {
        self.parents.len() > 1
    }
}

/// Comprehensive log output: parsed commits plus a Mermaid `gitGraph`.
#[derive(Debug, Clone)]
pub struct CommitGraph {
    pub commits: Vec<Commit>,
    pub mermaid: String,
}

/// Extra detail flags for the comprehensive log. Their output attaches to
/// the preceding commit record and is carried in its `body`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOptions {
    pub patch: bool,
    pub stat: bool,
    pub numstat: bool,
    pub name_only: bool,
    pub graph: bool,
}

/// Fetch the comprehensive history in a single `git log` call using the
/// fixed `%H…%b` template with `\x1e` record and `\x1f` field separators.
pub async fn comprehensive_log(root: &Path, count: usize) -> Option<CommitGraph> {
    comprehensive_log_with(root, count, LogOptions::default()).await
}

pub async fn comprehensive_log_with(
    root: &Path,
    count: usize,
    options: LogOptions,
) -> Option<CommitGraph> {
    if !is_work_tree(root).await {
        return None;
    }
    let n = count.to_string();
    let mut args: Vec<&str> = vec![
        "log",
        "--all",
        "--date=iso",
        "--pretty=format:%x1e%H%x1f%h%x1f%P%x1f%an%x1f%ae%x1f%ad%x1f%s%x1f%b",
        "-n",
        &n,
    ];
    if options.patch {
        args.push("--patch");
    }
    if options.stat {
        args.push("--stat");
    }
    if options.numstat {
        args.push("--numstat");
    }
    if options.name_only {
        args.push("--name-only");
    }
    if options.graph {
        args.push("--graph");
    }
    let output = run_git(root, &args).await.ok()?;

    let commits = parse_commit_records(&output);
    if commits.is_empty() {
        return None;
    }
    let mermaid = mermaid_git_graph(&commits);
    Some(CommitGraph { commits, mermaid })
}

fn parse_commit_records(output: &str) -> Vec<Commit> {
    output
        .split(RECORD_SEP)
        .filter(|r| !r.trim().is_empty())
        .filter_map(|record| {
            let fields: Vec<&str> = record.trim_matches('\n').split(FIELD_SEP).collect();
            if fields.len() < 7 {
                return None;
            }
            Some(Commit {
                hash: fields[0].to_string(),
                short_hash: fields[1].to_string(),
                parents: fields[2].split_whitespace().map(str::to_string).collect(),
                author: fields[3].to_string(),
                email: fields[4].to_string(),
                date: fields[5].to_string(),
                subject: fields[6].to_string(),
                body: fields.get(7).map(|b| b.trim().to_string()).unwrap_or_default(),
            })
        })
        .collect()
}

fn escape_mermaid_id(id: &str) -> String {
    id.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect()
}

/// Render commits (oldest first) as a Mermaid `gitGraph`; merge commits are
/// tagged `type: HIGHLIGHT`.
pub fn mermaid_git_graph(commits: &[Commit]) -> String {
    let mut out = String::from("gitGraph\n");
    for commit in commits.iter().rev() {
        let id = escape_mermaid_id(&commit.short_hash);
        if commit.is_merge() {
            out.push_str(&format!("   commit id: \"{id}\" type: HIGHLIGHT\n"));
        } else {
            out.push_str(&format!("   commit id: \"{id}\"\n"));
        }
    }
    out.trim_end().to_string()
}

/// Converts Unix timestamp (seconds since epoch) to (year, month, day).
/// Uses Howard Hinnant's date algorithm.
fn unix_secs_to_ymd(secs: u64) -> (u32, u32, u32) {
    let z = (secs / 86400) as i64 + 719_468;
    let era = if z >= 0 { z } else { z - 146_096 } / 146_097;
    let doe = (z - era * 146_097) as u32;
    let yoe = (doe - doe / 1460 + doe / 36524 - doe / 146096) / 365;
    let y = yoe as i64 + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let d = doy - (153 * mp + 2) / 5 + 1;
    let m = if mp < 10 { mp + 3 } else { mp - 9 };
    let y = if m <= 2 { y + 1 } else { y };
    (y as u32, m, d)
}

/// Annotate a file with `git blame --porcelain`: each source line prefixed
/// with `[author YYYY-MM-DD]`. Returns `None` when blame is unavailable.
pub async fn blame_file(root: &Path, rel_path: &str) -> Option<String> {
    let output = run_git(root, &["blame", "--porcelain", "--", rel_path])
        .await
        .ok()?;
    let annotated = parse_porcelain_blame(&output);
    (!annotated.is_empty()).then_some(annotated)
}

/// Parse porcelain blame output. Commit headers (`author`, `author-time`)
/// appear once per commit; later lines reference the commit by hash alone,
/// so author metadata is accumulated per hash.
fn parse_porcelain_blame(output: &str) -> String {
    struct CommitMeta {
        author: String,
        date: String,
    }
    let mut meta: HashMap<String, CommitMeta> = HashMap::new();
    let mut current_hash = String::new();
    let mut lines_out: Vec<String> = Vec::new();

    for line in output.lines() {
        if let Some(code) = line.strip_prefix('\t') {
            let (author, date) = meta
                .get(&current_hash)
                .map(|m| (m.author.as_str(), m.date.as_str()))
                .unwrap_or(("unknown", ""));
            lines_out.push(format!("[{author} {date}] {code}"));
        } else if let Some(author) = line.strip_prefix("author ") {
            meta.entry(current_hash.clone())
                .or_insert_with(|| CommitMeta {
                    author: String::new(),
                    date: String::new(),
                })
                .author = author.to_string();
        } else if let Some(time) = line.strip_prefix("author-time ") {
            let secs: u64 = time.trim().parse().unwrap_or(0);
            let (y, m, d) = unix_secs_to_ymd(secs);
            meta.entry(current_hash.clone())
                .or_insert_with(|| CommitMeta {
                    author: String::new(),
                    date: String::new(),
                })
                .date = format!("{y:04}-{m:02}-{d:02}");
        } else if !line.starts_with(' ')
            && let Some(first) = line.split_whitespace().next()
            && first.len() == 40
            && first.chars().all(|c| c.is_ascii_hexdigit())
        {
            current_hash = first.to_string();
        }
    }

    lines_out.join("\n")
}

/// Blame every path, bounded by the shared worker count. Paths that cannot
/// be blamed (new files, non-git roots) are simply absent from the map.
pub async fn blame_files(root: &Path, paths: &[String]) -> HashMap<String, String> {
    if !is_work_tree(root).await {
        return HashMap::new();
    }
    let permits = crate::collect::worker_count(paths.len());
    let semaphore = Arc::new(tokio::sync::Semaphore::new(permits));
    let root = Arc::new(root.to_path_buf());

    let mut set = tokio::task::JoinSet::new();
    for path in paths {
        let sem = Arc::clone(&semaphore);
        let root = Arc::clone(&root);
        let path = path.clone();
        set.spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            let annotated = blame_file(&root, &path).await?;
            Some((path, annotated))
        });
    }

    let mut map = HashMap::new();
    while let Some(joined) = set.join_next().await {
        if let Ok(Some((path, annotated))) = joined {
            map.insert(path, annotated);
        }
    }
    map
}
