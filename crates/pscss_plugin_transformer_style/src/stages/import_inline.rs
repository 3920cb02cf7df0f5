use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use lightningcss::printer::PrinterOptions;
use lightningcss::rules::CssRule;
use lightningcss::traits::ToCss;

use crate::plan::{Stage, StageContext, StageError, StageOutput};

use super::lightning;

const MAX_IMPORT_DEPTH: usize = 64;

/// Flattens `@import` of plain CSS files, recursively, before the rest of
/// the chain runs. Imports resolve against the importing file's directory
/// first, then the configured load paths. Media conditions on an import are
/// preserved by wrapping the inlined text in an `@media` block.
///
/// A file imported more than once (a diamond graph) is inlined on first
/// encounter and silently skipped after that; only an import that is already
/// on the current recursion path is a cycle.
///
/// Runs on every file, independent of whether the Sass-family stage already
/// resolved its own import graph.
pub(crate) struct ImportInlineStage;

/// Bookkeeping for one flattening run.
struct ImportWalk {
  /// Canonical paths on the current recursion path, pushed on descent and
  /// popped on return. Membership means a true cycle.
  path_stack: Vec<PathBuf>,
  /// Every file inlined so far, across branches. Membership means the text
  /// is already in the output and the import is dropped without error.
  inlined: HashSet<PathBuf>,
}

impl Stage for ImportInlineStage {
  fn name(&self) -> &'static str {
    "import-inline"
  }

  fn process(&self, css: &str, ctx: &StageContext) -> Result<StageOutput, StageError> {
    let dir = ctx
      .file_path
      .parent()
      .unwrap_or_else(|| Path::new("."))
      .to_path_buf();
    let mut walk = ImportWalk {
      path_stack: vec![canonical(ctx.file_path)],
      inlined: HashSet::new(),
    };

    let (code, inlined_any) = inline(css, &dir, ctx, &mut walk, 0)?;
    if !inlined_any {
      // Nothing to do; pass the text through untouched.
      return Ok(StageOutput {
        code: css.to_string(),
        map: None,
      });
    }

    Ok(StageOutput { code, map: None })
  }
}

fn inline(
  css: &str,
  dir: &Path,
  ctx: &StageContext,
  walk: &mut ImportWalk,
  depth: usize,
) -> Result<(String, bool), StageError> {
  if depth > MAX_IMPORT_DEPTH {
    return Err(StageError::new("@import nesting is too deep"));
  }

  let mut stylesheet =
    lightning::parse_with_filename(css, dir.join("<import>").to_string_lossy().into_owned())?;

  let mut imports = Vec::new();
  for rule in &stylesheet.rules.0 {
    if let CssRule::Import(import) = rule {
      let media = if import.media.media_queries.is_empty() {
        None
      } else {
        Some(
          import
            .media
            .to_css_string(PrinterOptions::default())
            .map_err(|err| StageError::new(err.to_string()))?,
        )
      };
      imports.push((import.url.to_string(), media));
    }
  }

  if imports.is_empty() {
    return Ok((css.to_string(), false));
  }

  let mut out = String::new();
  for (url, media) in &imports {
    let target = resolve_import(url, dir, ctx.load_paths)
      .ok_or_else(|| StageError::new(format!("could not resolve @import {url:?}")))?;

    let canonical_target = canonical(&target);
    if walk.path_stack.contains(&canonical_target) {
      return Err(StageError::new(format!(
        "circular @import of {}",
        target.display()
      )));
    }
    if !walk.inlined.insert(canonical_target.clone()) {
      // Already inlined through another branch; drop the repeat.
      continue;
    }
    walk.path_stack.push(canonical_target);

    let imported = fs::read_to_string(&target)
      .map_err(|err| StageError::new(format!("failed to read {}: {err}", target.display())))?;
    let nested_dir = target.parent().unwrap_or(dir);
    let (inlined, _) = inline(&imported, nested_dir, ctx, walk, depth + 1)?;
    walk.path_stack.pop();

    match media {
      Some(media) => {
        out.push_str(&format!("@media {media} {{\n{inlined}\n}}\n"));
      }
      None => {
        out.push_str(&inlined);
        out.push('\n');
      }
    }
  }

  stylesheet
    .rules
    .0
    .retain(|rule| !matches!(rule, CssRule::Import(_)));
  let remainder = stylesheet
    .to_css(PrinterOptions::default())
    .map_err(|err| StageError::new(err.to_string()))?;
  out.push_str(&remainder.code);

  Ok((out, true))
}

/// Remote imports are left to the browser; only filesystem imports inline.
fn resolve_import(url: &str, dir: &Path, load_paths: &[PathBuf]) -> Option<PathBuf> {
  if url.contains("://") {
    return None;
  }

  let mut candidates = Vec::new();
  for root in std::iter::once(dir.to_path_buf()).chain(load_paths.iter().cloned()) {
    candidates.push(root.join(url));
    if Path::new(url).extension().is_none() {
      candidates.push(root.join(format!("{url}.css")));
    }
  }

  candidates.into_iter().find(|candidate| candidate.is_file())
}

fn canonical(path: &Path) -> PathBuf {
  path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
