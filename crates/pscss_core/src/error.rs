use std::path::{Path, PathBuf};

use thiserror::Error;

/// Per-file failure surface of the pscss transformers.
///
/// Every variant carries the originating file path and a human-readable
/// message wrapping the underlying tool's diagnostic; the underlying error
/// type itself is never rethrown. A failure is fatal for its file only;
/// whether the host stream continues is the host's decision.
#[derive(Debug, Error)]
pub enum StyleError {
  /// The file arrived with streaming contents, which this core does not
  /// support.
  #[error("streaming contents are not supported: {}", path.display())]
  UnsupportedPayload { path: PathBuf },

  /// The Sass-family compiler rejected the file.
  #[error("sass compiler failed for {}: {message}", path.display())]
  PreCompilation { path: PathBuf, message: String },

  /// A stage of the CSS processing chain failed.
  #[error("{stage} stage failed for {}: {message}", path.display())]
  Processing {
    stage: &'static str,
    path: PathBuf,
    message: String,
  },

  /// The rename transformer was invoked with invalid parameters. Recoverable
  /// at the pipeline level: the file is reported and dropped, the stream
  /// keeps going.
  #[error("rename failed for {}: {message}", path.display())]
  Rename { path: PathBuf, message: String },
}

impl StyleError {
  /// The stage family responsible for the failure.
  pub fn stage_tag(&self) -> &'static str {
    match self {
      StyleError::UnsupportedPayload { .. } => "input",
      StyleError::PreCompilation { .. } => "pre-compilation",
      StyleError::Processing { .. } => "processing",
      StyleError::Rename { .. } => "rename",
    }
  }

  /// The file that failed.
  pub fn path(&self) -> &Path {
    match self {
      StyleError::UnsupportedPayload { path }
      | StyleError::PreCompilation { path, .. }
      | StyleError::Processing { path, .. }
      | StyleError::Rename { path, .. } => path,
    }
  }
}
