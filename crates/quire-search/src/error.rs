use std::io;

use thiserror::Error;

/// Error type for search index operations
#[derive(Debug, Error)]
pub enum SearchError {
  #[error("I/O error: {0}")]
  Io(#[from] io::Error),

  #[error("Serde error: {0}")]
  Serde(#[from] serde_json::Error),

  #[error("Malformed search index: {0}")]
  Format(String),
}
