/// The style-sheet source syntaxes the transformer distinguishes.
///
/// Only the Sass family routes through pre-compilation; everything else goes
/// straight to the CSS processing chain.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Dialect {
  #[default]
  Css,
  /// Brace-style Sass.
  Scss,
  /// Indented-style Sass.
  Sass,
  Other(String),
}

impl Dialect {
  /// Matches on the trailing extension segment, case-insensitively.
  pub fn from_extension(ext: &str) -> Self {
    match ext.to_lowercase().as_str() {
      "css" => Dialect::Css,
      "scss" => Dialect::Scss,
      "sass" => Dialect::Sass,
      other => Dialect::Other(other.to_string()),
    }
  }

  pub fn is_sass_family(&self) -> bool {
    matches!(self, Dialect::Scss | Dialect::Sass)
  }
}
