use std::fmt::Debug;

use async_trait::async_trait;

use crate::error::StyleError;
use crate::types::StyleFile;

/// What a transformer did with a file.
#[derive(Debug, PartialEq)]
pub enum TransformOutcome {
  /// The (possibly mutated or cloned) file continues downstream.
  Emitted(StyleFile),
  /// The file was deliberately consumed without output. Used for
  /// partial/private files; a skip is a successful no-op, not an error.
  Skipped,
}

impl TransformOutcome {
  pub fn into_file(self) -> Option<StyleFile> {
    match self {
      TransformOutcome::Emitted(file) => Some(file),
      TransformOutcome::Skipped => None,
    }
  }
}

/// A per-file transform driven by the host pipeline.
///
/// Implementations hold no mutable state across files; the host may have any
/// number of files in flight concurrently and makes no ordering guarantee
/// for completions. Within one call the work is strictly sequential.
#[async_trait]
pub trait TransformerPlugin: Debug + Send + Sync {
  async fn transform(&self, file: StyleFile) -> Result<TransformOutcome, StyleError>;
}
