use parcel_sourcemap::SourceMap as ParcelSourceMap;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceMapError {
  #[error("failed to serialize source map: {0}")]
  Json(#[from] serde_json::Error),

  #[error("source map conversion failed: {0}")]
  Conversion(String),
}

/// A V3 source map in its JSON shape.
///
/// The mapping data itself is opaque to the transformers; only `file` and
/// `sources` are ever rewritten. Composition of mapping data happens through
/// [`parcel_sourcemap::SourceMap`], see [`SourceMapJson::to_parcel`].
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMapJson {
  #[serde(default = "default_version")]
  pub version: u8,

  /// The declared output file, relative to the consuming file's base.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub file: Option<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_root: Option<String>,

  #[serde(default)]
  pub sources: Vec<String>,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub sources_content: Option<Vec<Option<String>>>,

  #[serde(default)]
  pub names: Vec<String>,

  #[serde(default)]
  pub mappings: String,
}

fn default_version() -> u8 {
  3
}

impl SourceMapJson {
  /// A map with no mapping data carries no position information worth
  /// composing over; callers use this to decide whether to seed a chain.
  pub fn has_mappings(&self) -> bool {
    !self.mappings.is_empty()
  }

  pub fn to_parcel(&self, project_root: &str) -> Result<ParcelSourceMap, SourceMapError> {
    let json = serde_json::to_string(self)?;
    ParcelSourceMap::from_json(project_root, &json)
      .map_err(|err| SourceMapError::Conversion(format!("{err:?}")))
  }

  pub fn from_parcel(map: &mut ParcelSourceMap) -> Result<Self, SourceMapError> {
    let json = map
      .to_json(None)
      .map_err(|err| SourceMapError::Conversion(format!("{err:?}")))?;
    Ok(serde_json::from_str(&json)?)
  }
}
