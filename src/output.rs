use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::Error;

/// Write the rendered artifact to its destination: stdout when requested,
/// otherwise the resolved output path (parent directories created first).
pub async fn write_output(content: &str, config: &Config, to_stdout: bool) -> Result<(), Error> {
    if to_stdout {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(content.as_bytes()).await?;
        stdout.flush().await?;
    } else {
        let path = config.resolved_output_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, content).await?;
        debug!("wrote output to {}", path.display());
    }

    if config.output.copy_to_clipboard {
        copy_to_clipboard(content);
    }
    Ok(())
}

/// Clipboard push is best-effort: headless environments have no clipboard
/// and that must not fail the run.
fn copy_to_clipboard(content: &str) {
    match arboard::Clipboard::new() {
        Ok(mut clipboard) => {
            if let Err(e) = clipboard.set_text(content.to_string()) {
                warn!("could not copy output to clipboard: {e}");
            }
        }
        Err(e) => warn!("clipboard unavailable: {e}"),
    }
}
