use std::path::{Path, PathBuf};

use grass::{InputSyntax, Options, OutputStyle};
use pscss_core::error::StyleError;
use pscss_core::types::Dialect;

/// Compiles Sass-family source to flat CSS, resolving the `@import`/`@use`
/// graph against the file's own directory first and the configured load
/// paths after. The syntax is chosen from the dialect: `.sass` means the
/// indented syntax, everything else in the family is SCSS.
///
/// The compiler's diagnostics are wrapped into [`StyleError::PreCompilation`]
/// and never rethrown as the compiler's own error type. A compiler-emitted
/// source map would be normalized before use; the current compiler does not
/// produce one, so callers seed the processing chain from the file's
/// incoming map instead.
pub(crate) fn precompile(
  source: &str,
  dialect: &Dialect,
  load_paths: &[PathBuf],
  path: &Path,
) -> Result<String, StyleError> {
  let syntax = match dialect {
    Dialect::Sass => InputSyntax::Sass,
    _ => InputSyntax::Scss,
  };

  let mut options = Options::default()
    .style(OutputStyle::Expanded)
    .input_syntax(syntax);
  if let Some(parent) = path.parent() {
    options = options.load_path(parent);
  }
  for load_path in load_paths {
    options = options.load_path(load_path);
  }

  grass::from_string(source.to_string(), &options).map_err(|err| StyleError::PreCompilation {
    path: path.to_path_buf(),
    message: err.to_string(),
  })
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn compiles_scss() {
    let css = precompile(
      ".a { .b { color: red; } }",
      &Dialect::Scss,
      &[],
      Path::new("/project/src/style.scss"),
    )
    .unwrap();

    assert!(css.contains(".a .b"), "got: {css}");
  }

  #[test]
  fn compiles_indented_sass() {
    let css = precompile(
      ".a\n  color: red\n",
      &Dialect::Sass,
      &[],
      Path::new("/project/src/style.sass"),
    )
    .unwrap();

    assert!(css.contains("color: red"), "got: {css}");
  }

  #[test]
  fn resolves_imports_through_load_paths() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("_partial.scss"), "$accent: red;").unwrap();

    let css = precompile(
      "@use \"partial\";\n.a { color: partial.$accent; }",
      &Dialect::Scss,
      &[dir.path().to_path_buf()],
      Path::new("/project/src/style.scss"),
    )
    .unwrap();

    assert!(css.contains("color: red"), "got: {css}");
  }

  #[test]
  fn syntax_errors_become_pre_compilation_errors() {
    let error = precompile(
      ".a { color: ",
      &Dialect::Scss,
      &[],
      Path::new("/project/src/style.scss"),
    )
    .unwrap_err();

    assert_eq!(error.stage_tag(), "pre-compilation");
  }
}
