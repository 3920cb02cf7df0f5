use std::path::Path;
use std::path::PathBuf;

use path_slash::PathExt;
use url::Url;

use crate::SourceMapJson;

/// Rewrites a compiler-emitted source map so it stays portable after file
/// relocation: `file` becomes the output path relative to `base`, and every
/// `sources` entry is converted from `file:` URL form where necessary, made
/// relative to `base`, and switched to forward slashes.
pub fn normalize(map: &mut SourceMapJson, base: &Path, output_path: &Path) {
  map.file = Some(relative_slash_path(base, output_path));

  for source in &mut map.sources {
    *source = normalize_source(source, base);
  }
}

fn normalize_source(source: &str, base: &Path) -> String {
  let path = if source.starts_with("file:") {
    Url::parse(source)
      .ok()
      .and_then(|url| url.to_file_path().ok())
      .unwrap_or_else(|| PathBuf::from(source))
  } else {
    PathBuf::from(source)
  };

  relative_slash_path(base, &path)
}

/// `path` relative to `base`, with forward-slash separators regardless of
/// platform. Falls back to the path unchanged when no relative form exists.
pub fn relative_slash_path(base: &Path, path: &Path) -> String {
  let relative = match path.strip_prefix(base) {
    Ok(stripped) => stripped.to_path_buf(),
    Err(_) => pathdiff::diff_paths(path, base).unwrap_or_else(|| path.to_path_buf()),
  };

  relative.to_slash_lossy().replace('\\', "/")
}
