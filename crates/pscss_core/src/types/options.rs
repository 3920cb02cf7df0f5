use std::path::PathBuf;

use serde::Deserialize;

use super::StyleFile;

/// Caller-facing configuration for the style transformer. Every field is
/// optional; defaults are applied per file by [`ResolvedOptions::resolve`].
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompilationOptions {
  /// Run the minification stage. Defaults to true.
  pub minify: Option<bool>,
  /// Use the forward-looking-syntax chain instead of the classic
  /// nesting + prefixing chain.
  pub modern_syntax: Option<bool>,
  /// Import search directories for Sass-family pre-compilation.
  pub load_paths: Option<Vec<PathBuf>>,
  /// Presence enables the dead-code-elimination stage.
  pub purge: Option<PurgeOptions>,
}

/// Dead-code-elimination configuration, modeled on PurgeCSS.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PurgeOptions {
  /// Glob patterns for the content files that define which selectors are
  /// actually used.
  pub content: Vec<String>,
  /// Selector tokens that are always retained.
  pub safelist: Vec<String>,
  /// Also drop `@keyframes` rules whose name never occurs in the content.
  pub keyframes: bool,
  /// Also drop `@font-face` rules whose family never occurs in the content.
  pub font_face: bool,
  /// Also drop custom-property declarations that are never referenced
  /// through `var()`.
  pub variables: bool,
}

/// Output path rewriting for the rename transformer. See the precedence
/// rules on the transformer itself.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenameOptions {
  /// Replaces the filename stem.
  pub basename: Option<String>,
  /// Replaces the extension outright, unless combined with `suffix`.
  pub extname: Option<String>,
  /// Inserted before the extension, e.g. `".min"`.
  pub suffix: Option<String>,
}

/// Per-file snapshot of [`CompilationOptions`] with all defaults applied.
///
/// Default policy lives here and nowhere else.
#[derive(Clone, Debug)]
pub struct ResolvedOptions {
  pub minify: bool,
  pub modern_syntax: bool,
  pub load_paths: Vec<PathBuf>,
  pub purge: Option<PurgeOptions>,
  /// Derived from the file, not configured: a file arriving with a source
  /// map attached is requesting maps on the way out.
  pub source_maps: bool,
}

impl ResolvedOptions {
  pub fn resolve(options: &CompilationOptions, file: &StyleFile) -> Self {
    let load_paths = options.load_paths.clone().unwrap_or_else(|| {
      vec![file.base.clone(), file.cwd.join("node_modules")]
    });

    Self {
      minify: options.minify.unwrap_or(true),
      modern_syntax: options.modern_syntax.unwrap_or(false),
      load_paths,
      purge: options.purge.clone(),
      source_maps: file.source_map.is_some(),
    }
  }
}
