use std::path::{Path, PathBuf};

use parcel_sourcemap::SourceMap;
use pscss_core::error::StyleError;
use pscss_core::types::ResolvedOptions;

use crate::stages::import_inline::ImportInlineStage;
use crate::stages::minify::MinifyStage;
use crate::stages::purge::PurgeStage;
use crate::stages::transpile::{ModernSyntaxStage, NestingStage, PrefixStage};

/// Per-file inputs shared by every stage.
pub(crate) struct StageContext<'a> {
  pub file_path: &'a Path,
  pub base: &'a Path,
  pub load_paths: &'a [PathBuf],
  pub source_maps: bool,
}

pub(crate) struct StageOutput {
  pub code: String,
  /// Map for this stage's output only; the executor composes it over the
  /// maps of earlier stages.
  pub map: Option<SourceMap>,
}

#[derive(Debug)]
pub(crate) struct StageError {
  pub message: String,
}

impl StageError {
  pub fn new(message: impl Into<String>) -> Self {
    Self {
      message: message.into(),
    }
  }
}

/// One discrete CSS-text transformation step.
pub(crate) trait Stage: Send + Sync {
  fn name(&self) -> &'static str;

  fn process(&self, css: &str, ctx: &StageContext) -> Result<StageOutput, StageError>;
}

/// The ordered stage list selected for one file. Built once per file from
/// the resolved options, so the conditionals live here and nowhere else.
pub(crate) struct PipelinePlan {
  stages: Vec<Box<dyn Stage>>,
}

impl PipelinePlan {
  pub fn build(options: &ResolvedOptions) -> Self {
    let mut stages: Vec<Box<dyn Stage>> = vec![Box::new(ImportInlineStage)];

    if options.modern_syntax {
      stages.push(Box::new(ModernSyntaxStage));
    } else {
      stages.push(Box::new(NestingStage));
      stages.push(Box::new(PrefixStage));
    }

    if let Some(purge) = &options.purge {
      stages.push(Box::new(PurgeStage::new(purge.clone())));
    }

    if options.minify {
      stages.push(Box::new(MinifyStage));
    }

    Self { stages }
  }

  /// Runs the stages strictly sequentially. Maps are chained: each stage's
  /// map is extended over the previous one, seeded with the pre-compilation
  /// (or incoming) map, so the final map points at original positions.
  pub fn execute(
    &self,
    css: String,
    seed_map: Option<SourceMap>,
    ctx: &StageContext,
  ) -> Result<(String, Option<SourceMap>), StyleError> {
    let mut css = css;
    let mut map = seed_map;

    for stage in &self.stages {
      tracing::debug!(
        stage = stage.name(),
        file = %ctx.file_path.display(),
        "running stage"
      );

      let output = stage
        .process(&css, ctx)
        .map_err(|err| StyleError::Processing {
          stage: stage.name(),
          path: ctx.file_path.to_path_buf(),
          message: err.message,
        })?;

      css = output.code;
      map = compose_maps(output.map, map).map_err(|message| StyleError::Processing {
        stage: stage.name(),
        path: ctx.file_path.to_path_buf(),
        message,
      })?;
    }

    Ok((css, map))
  }

  #[cfg(test)]
  pub fn stage_names(&self) -> Vec<&'static str> {
    self.stages.iter().map(|stage| stage.name()).collect()
  }
}

fn compose_maps(
  next: Option<SourceMap>,
  previous: Option<SourceMap>,
) -> Result<Option<SourceMap>, String> {
  match (next, previous) {
    (Some(mut next), Some(mut previous)) => {
      next
        .extends(&mut previous)
        .map_err(|err| format!("{err:?}"))?;
      Ok(Some(next))
    }
    (Some(next), None) => Ok(Some(next)),
    (None, previous) => Ok(previous),
  }
}

#[cfg(test)]
mod tests {
  use pretty_assertions::assert_eq;
  use pscss_core::types::{CompilationOptions, PurgeOptions};

  use super::*;

  fn resolved(options: CompilationOptions) -> ResolvedOptions {
    use pscss_core::types::{Code, FileContents, StyleFile};
    let file = StyleFile::new(
      "/project/src/style.css",
      "/project/src",
      FileContents::Buffer(Code::from("")),
    );
    ResolvedOptions::resolve(&options, &file)
  }

  #[test]
  fn classic_defaults_build_the_classic_chain() {
    let plan = PipelinePlan::build(&resolved(CompilationOptions::default()));

    assert_eq!(
      plan.stage_names(),
      vec!["import-inline", "nesting", "prefix", "minify"]
    );
  }

  #[test]
  fn modern_syntax_supersedes_the_classic_pair() {
    let plan = PipelinePlan::build(&resolved(CompilationOptions {
      modern_syntax: Some(true),
      ..CompilationOptions::default()
    }));

    assert_eq!(
      plan.stage_names(),
      vec!["import-inline", "modern-syntax", "minify"]
    );
  }

  #[test]
  fn purge_is_appended_before_minify_when_configured() {
    let plan = PipelinePlan::build(&resolved(CompilationOptions {
      purge: Some(PurgeOptions::default()),
      ..CompilationOptions::default()
    }));

    assert_eq!(
      plan.stage_names(),
      vec!["import-inline", "nesting", "prefix", "purge", "minify"]
    );
  }

  #[test]
  fn minify_can_be_disabled() {
    let plan = PipelinePlan::build(&resolved(CompilationOptions {
      minify: Some(false),
      ..CompilationOptions::default()
    }));

    assert_eq!(plan.stage_names(), vec!["import-inline", "nesting", "prefix"]);
  }
}
