use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration for `{field}`: {message}")]
    Config { field: String, message: String },

    #[error("invalid remote URL: {0}")]
    UrlValidation(String),

    #[error("{0}")]
    Precondition(String),

    #[error("clone failed for {url}: {message}")]
    Clone { url: String, message: String },

    #[error("download failed for {url}: {message}")]
    Network { url: String, message: String },

    #[error("git command failed: {0}")]
    Git(String),

    #[error("parse failed for {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(field: &str, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.to_string(),
            message: message.into(),
        }
    }
}
