use std::path::PathBuf;

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("REPOPACK_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = repopack::cli::Args::parse();
    let cancel = CancellationToken::new();

    // Load the config file (explicit path or repopack.config.json in cwd),
    // then let flags override it.
    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("repopack.config.json"));
    let mut config = match repopack::config::Config::load(&config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    };
    args.apply_to(&mut config);
    config.cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    // Remote mode clones into a temp dir that lives until the run finishes.
    let remote_value = args.remote.clone().or_else(|| {
        // A single positional that looks like a remote reference is one.
        (args.directories.len() == 1)
            .then(|| args.directories[0].to_string_lossy().to_string())
            .filter(|value| repopack::remote::looks_remote(value))
    });

    let temp_dir = match &remote_value {
        Some(value) => {
            let reference = match &args.remote_branch {
                Some(branch) => format!("{value}#{branch}"),
                None => value.clone(),
            };
            eprintln!("Fetching {value}...");
            match repopack::remote::fetch_remote(&reference, &cancel).await {
                Ok(t) => Some(t),
                Err(e) => {
                    eprintln!("error: {e}");
                    std::process::exit(1);
                }
            }
        }
        None => None,
    };

    let roots: Vec<PathBuf> = match &temp_dir {
        Some(t) => vec![t.path().to_path_buf()],
        None => args.directories.clone(),
    };

    match repopack::run(&roots, &config, args.stdout, &cancel).await {
        Ok(result) => {
            if !args.stdout {
                print_summary(&result, config.output.top_files_length);
            }
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}

fn print_summary(result: &repopack::types::PackResult, top_files_length: usize) {
    eprintln!(
        "packed {} files ({} chars, {} tokens)",
        result.total_files, result.total_characters, result.total_tokens
    );
    if !result.suspicious_files_results.is_empty() {
        eprintln!(
            "excluded {} suspicious file(s):",
            result.suspicious_files_results.len()
        );
        for finding in &result.suspicious_files_results {
            eprintln!("  {} ({})", finding.file_path, finding.messages.join("; "));
        }
    }
    let top = repopack::top_files(result, top_files_length);
    if !top.is_empty() {
        eprintln!("top {} files by token count:", top.len());
        for (path, count) in top {
            eprintln!("  {count:>8}  {path}");
        }
    }
}
