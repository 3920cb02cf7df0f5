use lightningcss::targets::Targets;

use crate::plan::{Stage, StageContext, StageError, StageOutput};

use super::lightning;

/// Compact output printing. Strips all comments and whitespace but skips the
/// structural minifier, so longhand declarations are never merged into
/// shorthands.
pub(crate) struct MinifyStage;

impl Stage for MinifyStage {
  fn name(&self) -> &'static str {
    "minify"
  }

  fn process(&self, css: &str, ctx: &StageContext) -> Result<StageOutput, StageError> {
    lightning::transform(css, ctx, Targets::default(), false, true)
  }
}
