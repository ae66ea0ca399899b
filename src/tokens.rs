use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Mutex};

use tiktoken_rs::CoreBPE;

use crate::error::Error;

/// Loaded encoders, shared process-wide: building a BPE ranks table is
/// expensive, so each encoding is constructed at most once.
static ENCODERS: LazyLock<Mutex<HashMap<String, Arc<CoreBPE>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// Token counter over a shared BPE encoder. Cheap to clone; counting takes
/// `&self` and is safe to use from parallel tasks.
#[derive(Clone)]
pub struct TokenCounter {
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for TokenCounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCounter").finish_non_exhaustive()
    }
}

impl TokenCounter {
    pub fn new(encoding: &str) -> Result<Self, Error> {
        if let Some(bpe) = ENCODERS.lock().expect("encoder lock").get(encoding) {
            return Ok(Self {
                bpe: Arc::clone(bpe),
            });
        }

        let built = match encoding {
            "o200k_base" => tiktoken_rs::o200k_base(),
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "p50k_edit" => tiktoken_rs::p50k_edit(),
            "r50k_base" | "gpt2" => tiktoken_rs::r50k_base(),
            other => {
                return Err(Error::config(
                    "tokenCount.encoding",
                    format!("unknown encoding '{other}'"),
                ));
            }
        };
        let bpe = Arc::new(
            built.map_err(|e| Error::config("tokenCount.encoding", e.to_string()))?,
        );
        ENCODERS
            .lock()
            .expect("encoder lock")
            .insert(encoding.to_string(), Arc::clone(&bpe));
        Ok(Self { bpe })
    }

    pub fn count(&self, text: &str) -> usize {
        self.bpe.encode_with_special_tokens(text).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_are_positive_for_text() {
        let counter = TokenCounter::new("o200k_base").unwrap();
        assert_eq!(counter.count(""), 0);
        assert!(counter.count("hello world") > 0);
        assert!(counter.count("hello world") < 10);
    }

    #[test]
    fn longer_text_has_more_tokens() {
        let counter = TokenCounter::new("o200k_base").unwrap();
        let short = counter.count("fn main() {}");
        let long = counter.count(&"fn main() {}\n".repeat(50));
        assert!(long > short);
    }

    #[test]
    fn encoder_instances_are_shared() {
        let a = TokenCounter::new("o200k_base").unwrap();
        let b = TokenCounter::new("o200k_base").unwrap();
        assert!(Arc::ptr_eq(&a.bpe, &b.bpe));
    }

    #[test]
    fn cl100k_supported() {
        let counter = TokenCounter::new("cl100k_base").unwrap();
        assert!(counter.count("hello") > 0);
    }

    #[test]
    fn unknown_encoding_is_config_error() {
        let err = TokenCounter::new("bogus").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
