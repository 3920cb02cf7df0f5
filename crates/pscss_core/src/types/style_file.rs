use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::path::{Path, PathBuf};

use path_slash::PathExt;
use pscss_sourcemap::SourceMapJson;

/// The byte payload of a style file.
#[derive(Clone, Default, PartialEq)]
pub struct Code {
  inner: Vec<u8>,
}

impl Code {
  pub fn new(bytes: Vec<u8>) -> Self {
    Self { inner: bytes }
  }

  pub fn bytes(&self) -> &[u8] {
    &self.inner
  }

  /// Lossy UTF-8 view of the payload. Style sources are text; invalid byte
  /// sequences are replaced rather than treated as a failure.
  pub fn as_str_lossy(&self) -> Cow<'_, str> {
    String::from_utf8_lossy(&self.inner)
  }

  pub fn size(&self) -> u32 {
    self.inner.len() as u32
  }
}

impl Display for Code {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.as_str_lossy())
  }
}

impl Debug for Code {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{:?}", self.as_str_lossy())
  }
}

impl From<String> for Code {
  fn from(value: String) -> Self {
    Self {
      inner: value.into_bytes(),
    }
  }
}

impl From<&str> for Code {
  fn from(value: &str) -> Self {
    Self {
      inner: value.to_owned().into_bytes(),
    }
  }
}

/// The payload kinds a file can carry through the pipeline.
///
/// Explicit so every consumer has to make a decision for each kind: `Empty`
/// files pass through untouched, `Stream` files are rejected. The `Stream`
/// variant is a marker; the host pipeline owns the actual handle and this
/// crate never reads from it.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FileContents {
  #[default]
  Empty,
  Buffer(Code),
  Stream,
}

impl FileContents {
  pub fn is_empty(&self) -> bool {
    matches!(self, FileContents::Empty)
  }

  pub fn as_buffer(&self) -> Option<&Code> {
    match self {
      FileContents::Buffer(code) => Some(code),
      _ => None,
    }
  }
}

/// A unit flowing through the host pipeline: identity, payload and optional
/// source-map metadata. Mutated in place by the style transformer, cloned by
/// the rename transformer.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleFile {
  /// Absolute location of the file.
  pub path: PathBuf,
  /// Root used for relative-path computation.
  pub base: PathBuf,
  /// Working directory the file was sourced from.
  pub cwd: PathBuf,
  pub contents: FileContents,
  pub source_map: Option<SourceMapJson>,
}

impl StyleFile {
  pub fn new<P: Into<PathBuf>, B: Into<PathBuf>>(
    path: P,
    base: B,
    contents: FileContents,
  ) -> Self {
    let base = base.into();
    Self {
      path: path.into(),
      cwd: base.clone(),
      base,
      contents,
      source_map: None,
    }
  }

  pub fn with_source_map(mut self, source_map: SourceMapJson) -> Self {
    self.source_map = Some(source_map);
    self
  }

  /// Filename without its trailing extension segment.
  pub fn stem(&self) -> Cow<'_, str> {
    self
      .path
      .file_stem()
      .map(|stem| stem.to_string_lossy())
      .unwrap_or_default()
  }

  /// Trailing extension segment with its dot (`".scss"`), or empty.
  pub fn extname(&self) -> String {
    self
      .path
      .extension()
      .map(|ext| format!(".{}", ext.to_string_lossy()))
      .unwrap_or_default()
  }

  /// Trailing extension segment, lower-cased, without the dot. This is the
  /// segment dialect dispatch looks at, so `.module.scss` yields `scss`.
  pub fn dialect_extension(&self) -> String {
    self
      .path
      .extension()
      .map(|ext| ext.to_string_lossy().to_lowercase())
      .unwrap_or_default()
  }

  /// Path relative to `base`, with forward-slash separators.
  pub fn relative_path(&self) -> String {
    self
      .path
      .strip_prefix(&self.base)
      .unwrap_or(&self.path)
      .to_slash_lossy()
      .replace('\\', "/")
  }

  /// Replaces the trailing extension segment. The new extension may span
  /// multiple segments, e.g. `".min.css"`.
  pub fn set_extname(&mut self, extname: &str) {
    let stem = self
      .path
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_default();
    self.path.set_file_name(format!("{stem}{extname}"));
  }

  /// Replaces the filename stem, keeping the extension.
  pub fn set_stem(&mut self, stem: &str) {
    let extname = self.extname();
    self.path.set_file_name(format!("{stem}{extname}"));
  }

  pub fn file_name(&self) -> Cow<'_, str> {
    self
      .path
      .file_name()
      .map(|name| name.to_string_lossy())
      .unwrap_or_default()
  }
}

impl AsRef<Path> for StyleFile {
  fn as_ref(&self) -> &Path {
    &self.path
  }
}
