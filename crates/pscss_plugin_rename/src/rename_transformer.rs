use async_trait::async_trait;
use pscss_core::error::StyleError;
use pscss_core::plugin::{TransformOutcome, TransformerPlugin};
use pscss_core::types::{FileContents, RenameOptions, StyleFile};

/// Rewrites a file's output path and re-stamps its source map accordingly.
///
/// Emits a clone of the input; the byte payload is carried over untouched.
/// Extension composition precedence:
///
/// 1. `suffix` and `extname` given: new extension is `suffix + extname`.
/// 2. `suffix` alone: new extension is `suffix + <original extension>`.
/// 3. `extname` alone: full replacement.
/// 4. Neither: extension unchanged.
///
/// Invalid parameters fail with [`StyleError::Rename`], which is recoverable
/// per file: the host reports the failure and keeps the stream going.
#[derive(Debug, Default)]
pub struct PscssRenameTransformerPlugin {
  options: RenameOptions,
}

impl PscssRenameTransformerPlugin {
  pub fn new(options: RenameOptions) -> Self {
    Self { options }
  }

  fn validate(&self) -> Result<(), String> {
    if let Some(basename) = &self.options.basename {
      if basename.is_empty() {
        return Err("basename must not be empty".into());
      }
    }
    for (name, value) in [
      ("extname", &self.options.extname),
      ("suffix", &self.options.suffix),
    ] {
      if let Some(value) = value {
        if value.len() < 2 || !value.starts_with('.') {
          return Err(format!("{name} must start with a dot, got {value:?}"));
        }
      }
    }
    Ok(())
  }

  fn apply(&self, file: &StyleFile) -> Result<StyleFile, String> {
    self.validate()?;

    if file.path.file_name().is_none() {
      return Err(format!("path has no file name: {}", file.path.display()));
    }

    let mut renamed = file.clone();

    if let Some(basename) = &self.options.basename {
      renamed.set_stem(basename);
    }

    let original_extname = renamed.extname();
    match (&self.options.suffix, &self.options.extname) {
      (Some(suffix), Some(extname)) => renamed.set_extname(&format!("{suffix}{extname}")),
      (Some(suffix), None) => renamed.set_extname(&format!("{suffix}{original_extname}")),
      (None, Some(extname)) => renamed.set_extname(extname),
      (None, None) => {}
    }

    // Keep the map/file linkage consistent with the new path.
    let relative = renamed.relative_path();
    if let Some(map) = renamed.source_map.as_mut() {
      map.file = Some(relative);
    }

    tracing::debug!(
      from = %file.path.display(),
      to = %renamed.path.display(),
      "renamed file"
    );

    Ok(renamed)
  }
}

#[async_trait]
impl TransformerPlugin for PscssRenameTransformerPlugin {
  async fn transform(&self, file: StyleFile) -> Result<TransformOutcome, StyleError> {
    match &file.contents {
      FileContents::Empty => Ok(TransformOutcome::Emitted(file)),
      FileContents::Stream => Err(StyleError::UnsupportedPayload {
        path: file.path.clone(),
      }),
      FileContents::Buffer(_) => {
        let renamed = self.apply(&file).map_err(|message| StyleError::Rename {
          path: file.path.clone(),
          message,
        })?;
        Ok(TransformOutcome::Emitted(renamed))
      }
    }
  }
}
