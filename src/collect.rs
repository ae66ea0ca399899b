use std::path::Path;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::Config;
use crate::defaults::has_binary_extension;
use crate::error::Error;
use crate::types::{RawFile, SkipReason};

/// Bounded worker count for the parallel stages:
/// `min(availableParallelism, ceil(tasks / 100))`, minimum 1.
pub fn worker_count(tasks: usize) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    cores.min(tasks.div_ceil(100)).max(1)
}

/// Ratio of control characters (excluding tab/newline/CR) above which decoded
/// text is treated as binary.
const CONTROL_RATIO_LIMIT: f64 = 0.3;
/// Only the head of the file is sampled for the control-character scan.
const CONTROL_SCAN_LIMIT: usize = 8192;

fn control_heavy(text: &str) -> bool {
    let sample: Vec<char> = text.chars().take(CONTROL_SCAN_LIMIT).collect();
    if sample.is_empty() {
        return false;
    }
    let controls = sample
        .iter()
        .filter(|c| c.is_control() && !matches!(c, '\n' | '\r' | '\t'))
        .count();
    controls as f64 / sample.len() as f64 > CONTROL_RATIO_LIMIT
}

/// Classify one file's bytes, returning decoded BOM-stripped text or the
/// reason it must be skipped.
fn decode_bytes(bytes: Vec<u8>) -> Result<String, SkipReason> {
    if content_inspector::inspect(&bytes).is_binary() {
        return Err(SkipReason::BinaryContent);
    }
    let bytes = match bytes.strip_prefix(b"\xef\xbb\xbf") {
        Some(rest) => rest.to_vec(),
        None => bytes,
    };
    // Strict decoding: a file that needs U+FFFD substitution is skipped, a
    // file that genuinely contains U+FFFD passes through unchanged.
    let text = String::from_utf8(bytes).map_err(|_| SkipReason::EncodingError)?;
    if text.contains('\0') || control_heavy(&text) {
        return Err(SkipReason::BinaryContent);
    }
    Ok(text)
}

async fn read_one(root: &Path, rel_path: &str, max_file_size: u64) -> Result<RawFile, SkipReason> {
    let abs = root.join(rel_path);

    let meta = tokio::fs::metadata(&abs)
        .await
        .map_err(|_| SkipReason::BinaryContent)?;
    if meta.len() > max_file_size {
        return Err(SkipReason::SizeLimit);
    }
    if has_binary_extension(rel_path) {
        return Err(SkipReason::BinaryExtension);
    }

    let bytes = tokio::fs::read(&abs)
        .await
        .map_err(|_| SkipReason::BinaryContent)?;
    let content = decode_bytes(bytes)?;
    Ok(RawFile {
        path: rel_path.to_string(),
        content,
    })
}

/// Read every discovered path in parallel (bounded), skipping files that are
/// too large, binary, or undecodable. Results come back in discovery order.
pub async fn collect_files(
    root: &Path,
    paths: &[String],
    config: &Config,
    cancel: &CancellationToken,
) -> Result<Vec<RawFile>, Error> {
    let permits = worker_count(paths.len());
    let semaphore = Arc::new(Semaphore::new(permits));
    let root = Arc::new(root.to_path_buf());
    let max_file_size = config.input.max_file_size;

    let mut set: JoinSet<(usize, Result<RawFile, SkipReason>)> = JoinSet::new();
    for (index, rel_path) in paths.iter().enumerate() {
        if cancel.is_cancelled() {
            break;
        }
        let sem = Arc::clone(&semaphore);
        let root = Arc::clone(&root);
        let rel_path = rel_path.clone();
        set.spawn(async move {
            let _permit = sem.acquire().await.expect("semaphore closed");
            (index, read_one(&root, &rel_path, max_file_size).await)
        });
    }

    let mut collected: Vec<(usize, RawFile)> = Vec::new();
    while let Some(joined) = set.join_next().await {
        let (index, result) = joined.map_err(|e| Error::Precondition(e.to_string()))?;
        match result {
            Ok(raw) => collected.push((index, raw)),
            Err(reason) => debug!("skipped {} ({})", paths[index], reason.as_str()),
        }
    }

    collected.sort_by_key(|(index, _)| *index);
    Ok(collected.into_iter().map(|(_, raw)| raw).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config() -> Config {
        Config::default()
    }

    async fn collect_in(dir: &TempDir, paths: &[&str], config: &Config) -> Vec<RawFile> {
        let paths: Vec<String> = paths.iter().map(|p| p.to_string()).collect();
        collect_files(dir.path(), &paths, config, &CancellationToken::new())
            .await
            .unwrap()
    }

    #[test]
    fn worker_count_bounds() {
        assert_eq!(worker_count(0), 1);
        assert_eq!(worker_count(1), 1);
        assert_eq!(worker_count(100), 1);
        let cores = std::thread::available_parallelism().unwrap().get();
        assert_eq!(worker_count(100_000), cores.min(1000));
    }

    #[tokio::test]
    async fn reads_files_in_discovery_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        fs::write(dir.path().join("b.rs"), "fn b() {}").unwrap();
        fs::write(dir.path().join("c.rs"), "fn c() {}").unwrap();
        let raws = collect_in(&dir, &["a.rs", "b.rs", "c.rs"], &config()).await;
        let paths: Vec<&str> = raws.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["a.rs", "b.rs", "c.rs"]);
        assert_eq!(raws[0].content, "fn a() {}");
    }

    #[tokio::test]
    async fn skips_oversized_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("big.txt"), "x".repeat(1024)).unwrap();
        fs::write(dir.path().join("small.txt"), "ok").unwrap();
        let mut config = config();
        config.input.max_file_size = 100;
        let raws = collect_in(&dir, &["big.txt", "small.txt"], &config).await;
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].path, "small.txt");
    }

    #[tokio::test]
    async fn skips_binary_extension_without_reading() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("img.png"), "actually text").unwrap();
        let raws = collect_in(&dir, &["img.png"], &config()).await;
        assert!(raws.is_empty());
    }

    #[tokio::test]
    async fn skips_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("latin1.txt"), b"caf\xe9 au lait").unwrap();
        let raws = collect_in(&dir, &["latin1.txt"], &config()).await;
        assert!(raws.is_empty());
    }

    #[tokio::test]
    async fn preserves_legitimate_replacement_char() {
        let dir = TempDir::new().unwrap();
        let text = "literal \u{fffd} in source\n";
        fs::write(dir.path().join("odd.txt"), text).unwrap();
        let raws = collect_in(&dir, &["odd.txt"], &config()).await;
        assert_eq!(raws.len(), 1);
        assert_eq!(raws[0].content, text);
    }

    #[tokio::test]
    async fn strips_utf8_bom() {
        let dir = TempDir::new().unwrap();
        let mut bytes = b"\xef\xbb\xbf".to_vec();
        bytes.extend_from_slice(b"hello\n");
        fs::write(dir.path().join("bom.txt"), &bytes).unwrap();
        let raws = collect_in(&dir, &["bom.txt"], &config()).await;
        assert_eq!(raws[0].content, "hello\n");
    }

    #[tokio::test]
    async fn skips_nul_bytes() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("data.txt"), b"abc\x00def").unwrap();
        let raws = collect_in(&dir, &["data.txt"], &config()).await;
        assert!(raws.is_empty());
    }

    #[tokio::test]
    async fn cancelled_token_dispatches_nothing() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.rs"), "fn a() {}").unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let raws = collect_files(
            dir.path(),
            &["a.rs".to_string()],
            &config(),
            &cancel,
        )
        .await
        .unwrap();
        assert!(raws.is_empty());
    }

    #[test]
    fn control_heavy_detection() {
        assert!(!control_heavy("normal text\nwith lines\n"));
        let noisy: String = (0..100).map(|_| '\u{1}').collect();
        assert!(control_heavy(&noisy));
        assert!(!control_heavy(""));
    }
}
