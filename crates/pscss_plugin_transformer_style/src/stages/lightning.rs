use lightningcss::printer::PrinterOptions;
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, StyleSheet};
use lightningcss::targets::Targets;
use parcel_sourcemap::SourceMap;

use crate::plan::{StageContext, StageError, StageOutput};

/// Parses stage input. Comment text does not survive this parse, so every
/// stage's output is comment-free even when minification is disabled; the
/// parser offers no way to retain them.
pub(crate) fn parse<'i>(
  css: &'i str,
  ctx: &StageContext,
) -> Result<StyleSheet<'i, 'i>, StageError> {
  parse_with_filename(css, ctx.file_path.to_string_lossy().into_owned())
}

pub(crate) fn parse_with_filename<'i>(
  css: &'i str,
  filename: String,
) -> Result<StyleSheet<'i, 'i>, StageError> {
  StyleSheet::parse(
    css,
    ParserOptions {
      filename,
      ..ParserOptions::default()
    },
  )
  .map_err(|err| StageError::new(err.to_string()))
}

/// Serializes a stylesheet, generating a map over the stage's input when the
/// file requested source maps.
pub(crate) fn print(
  stylesheet: &StyleSheet,
  css_input: &str,
  ctx: &StageContext,
  targets: Targets,
  minify_output: bool,
) -> Result<StageOutput, StageError> {
  let mut source_map = if ctx.source_maps {
    let mut map = SourceMap::new(&ctx.base.to_string_lossy());
    let source_index = map.add_source(&ctx.file_path.to_string_lossy());
    map
      .set_source_content(source_index as usize, css_input)
      .map_err(|err| StageError::new(format!("{err:?}")))?;
    Some(map)
  } else {
    None
  };

  let result = stylesheet
    .to_css(PrinterOptions {
      minify: minify_output,
      source_map: source_map.as_mut(),
      project_root: ctx.base.to_str(),
      targets,
      analyze_dependencies: None,
      pseudo_classes: None,
    })
    .map_err(|err| StageError::new(err.to_string()))?;

  Ok(StageOutput {
    code: result.code,
    map: source_map,
  })
}

/// The parse / transform / print cycle shared by the transpilation and
/// minification stages.
pub(crate) fn transform(
  css: &str,
  ctx: &StageContext,
  targets: Targets,
  structural_minify: bool,
  minify_output: bool,
) -> Result<StageOutput, StageError> {
  let mut stylesheet = parse(css, ctx)?;

  if structural_minify {
    stylesheet
      .minify(MinifyOptions {
        targets,
        ..MinifyOptions::default()
      })
      .map_err(|err| StageError::new(err.to_string()))?;
  }

  print(&stylesheet, css, ctx, targets, minify_output)
}
