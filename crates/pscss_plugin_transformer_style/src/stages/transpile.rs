use lightningcss::targets::{Browsers, Features, Targets};

use crate::plan::{Stage, StageContext, StageError, StageOutput};

use super::lightning;

/// Browserslist query driving vendor prefixing and modern-syntax lowering.
const DEFAULT_BROWSERS: [&str; 1] = ["defaults"];

fn default_browsers() -> Result<Option<Browsers>, StageError> {
  Browsers::from_browserslist(DEFAULT_BROWSERS).map_err(|err| StageError::new(err.to_string()))
}

/// Flattens nested rules into flat selectors, unconditionally.
pub(crate) struct NestingStage;

impl Stage for NestingStage {
  fn name(&self) -> &'static str {
    "nesting"
  }

  fn process(&self, css: &str, ctx: &StageContext) -> Result<StageOutput, StageError> {
    let targets = Targets {
      browsers: None,
      include: Features::Nesting,
      exclude: Features::empty(),
    };
    lightning::transform(css, ctx, targets, true, false)
  }
}

/// Adds vendor prefixes for the default browser set.
pub(crate) struct PrefixStage;

impl Stage for PrefixStage {
  fn name(&self) -> &'static str {
    "prefix"
  }

  fn process(&self, css: &str, ctx: &StageContext) -> Result<StageOutput, StageError> {
    let targets = Targets {
      browsers: default_browsers()?,
      include: Features::empty(),
      exclude: Features::empty(),
    };
    lightning::transform(css, ctx, targets, true, false)
  }
}

/// Lowers forward-looking CSS syntax to what the default browser set
/// supports, prefixes included. Supersedes the nesting + prefix pair; the
/// two chains are never combined.
pub(crate) struct ModernSyntaxStage;

impl Stage for ModernSyntaxStage {
  fn name(&self) -> &'static str {
    "modern-syntax"
  }

  fn process(&self, css: &str, ctx: &StageContext) -> Result<StageOutput, StageError> {
    let targets = Targets {
      browsers: default_browsers()?,
      include: Features::empty(),
      exclude: Features::empty(),
    };
    lightning::transform(css, ctx, targets, true, false)
  }
}
