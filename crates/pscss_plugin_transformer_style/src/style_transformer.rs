use async_trait::async_trait;
use pscss_core::error::StyleError;
use pscss_core::plugin::{TransformOutcome, TransformerPlugin};
use pscss_core::types::{
  Code, CompilationOptions, Dialect, FileContents, ResolvedOptions, StyleFile,
};
use pscss_sourcemap::{normalize, SourceMapJson};

use crate::plan::{PipelinePlan, StageContext};
use crate::sass;

/// The style-compilation transformer.
///
/// Dispatch inspects the file's trailing extension segment: the Sass family
/// ({`scss`, `sass`}, case-insensitive) is pre-compiled before the CSS
/// processing chain, anything else goes straight to the chain. The output
/// extension is always `.css`.
///
/// Options are a read-only snapshot resolved once per file; nothing is
/// carried between files, so the host may process any number of files
/// concurrently.
#[derive(Debug, Default)]
pub struct PscssStyleTransformerPlugin {
  options: CompilationOptions,
}

impl PscssStyleTransformerPlugin {
  pub fn new(options: CompilationOptions) -> Self {
    Self { options }
  }
}

#[async_trait]
impl TransformerPlugin for PscssStyleTransformerPlugin {
  async fn transform(&self, file: StyleFile) -> Result<TransformOutcome, StyleError> {
    let mut file = file;

    let source = match &file.contents {
      FileContents::Empty => return Ok(TransformOutcome::Emitted(file)),
      FileContents::Stream => {
        return Err(StyleError::UnsupportedPayload {
          path: file.path.clone(),
        })
      }
      FileContents::Buffer(code) => code.as_str_lossy().into_owned(),
    };

    // Partials only exist to be imported by other files.
    if file.stem().starts_with('_') {
      tracing::debug!(file = %file.path.display(), "skipping partial");
      return Ok(TransformOutcome::Skipped);
    }

    let options = ResolvedOptions::resolve(&self.options, &file);
    let dialect = Dialect::from_extension(&file.dialect_extension());

    let css = if dialect.is_sass_family() {
      tracing::debug!(
        file = %file.path.display(),
        dialect = ?dialect,
        "pre-compiling sass-family source"
      );
      sass::precompile(&source, &dialect, &options.load_paths, &file.path)?
    } else {
      source
    };

    // Seed the map chain from the incoming map, when it carries mapping
    // data worth composing over.
    let seed_map = match &file.source_map {
      Some(map) if options.source_maps && map.has_mappings() => Some(
        map
          .to_parcel(&file.base.to_string_lossy())
          .map_err(|err| StyleError::Processing {
            stage: "source-map",
            path: file.path.clone(),
            message: err.to_string(),
          })?,
      ),
      _ => None,
    };

    let plan = PipelinePlan::build(&options);
    let ctx = StageContext {
      file_path: &file.path,
      base: &file.base,
      load_paths: &options.load_paths,
      source_maps: options.source_maps,
    };
    let (css, map) = plan.execute(css, seed_map, &ctx)?;

    file.contents = FileContents::Buffer(Code::from(css));
    file.set_extname(".css");

    if options.source_maps {
      if let Some(mut parcel_map) = map {
        let mut json =
          SourceMapJson::from_parcel(&mut parcel_map).map_err(|err| StyleError::Processing {
            stage: "source-map",
            path: file.path.clone(),
            message: err.to_string(),
          })?;
        normalize(&mut json, &file.base, &file.path);
        file.source_map = Some(json);
      }
    }

    Ok(TransformOutcome::Emitted(file))
  }
}

#[cfg(test)]
mod tests {
  use std::path::{Path, PathBuf};

  use pretty_assertions::assert_eq;
  use pscss_core::types::PurgeOptions;

  use super::*;

  fn buffer_file(path: &str, base: &str, contents: &str) -> StyleFile {
    StyleFile::new(path, base, FileContents::Buffer(Code::from(contents)))
  }

  async fn run(options: CompilationOptions, file: StyleFile) -> Result<TransformOutcome, StyleError> {
    PscssStyleTransformerPlugin::new(options).transform(file).await
  }

  async fn run_to_css(options: CompilationOptions, file: StyleFile) -> String {
    let file = run(options, file).await.unwrap().into_file().unwrap();
    file
      .contents
      .as_buffer()
      .expect("expected buffer contents")
      .as_str_lossy()
      .into_owned()
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn empty_files_pass_through_unchanged() {
    let file = StyleFile::new("/project/src/style.css", "/project/src", FileContents::Empty);

    let outcome = run(CompilationOptions::default(), file.clone()).await.unwrap();

    assert_eq!(outcome, TransformOutcome::Emitted(file));
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn streaming_files_are_rejected() {
    let file = StyleFile::new(
      "/project/src/style.css",
      "/project/src",
      FileContents::Stream,
    );

    let error = run(CompilationOptions::default(), file).await.unwrap_err();

    assert_eq!(error.stage_tag(), "input");
    assert_eq!(error.path(), Path::new("/project/src/style.css"));
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn partials_are_silently_skipped() {
    let file = buffer_file("/project/src/_mixins.scss", "/project/src", "$x: 1;");

    let outcome = run(CompilationOptions::default(), file).await.unwrap();

    assert_eq!(outcome, TransformOutcome::Skipped);
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn scss_is_precompiled_and_extension_rewritten() {
    let file = buffer_file(
      "/project/src/style.scss",
      "/project/src",
      ".a { .b { color: red; } }",
    );

    let file = run(CompilationOptions::default(), file)
      .await
      .unwrap()
      .into_file()
      .unwrap();

    assert_eq!(file.path, PathBuf::from("/project/src/style.css"));
    let css = file.contents.as_buffer().unwrap().as_str_lossy().into_owned();
    assert!(css.contains(".a .b"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn dispatch_is_case_insensitive() {
    let file = buffer_file("/project/src/STYLE.SCSS", "/project/src", ".a { .b { color: red; } }");

    let file = run(CompilationOptions::default(), file)
      .await
      .unwrap()
      .into_file()
      .unwrap();

    assert_eq!(file.extname(), ".css");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn indented_sass_is_precompiled() {
    let file = buffer_file("/project/src/style.sass", "/project/src", ".a\n  color: red\n");

    let css = run_to_css(CompilationOptions::default(), file).await;

    assert!(css.contains(".a"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn plain_css_skips_precompilation_but_flattens_nesting() {
    let file = buffer_file(
      "/project/src/style.css",
      "/project/src",
      ".a { &:hover { color: red; } }",
    );

    let css = run_to_css(CompilationOptions::default(), file).await;

    assert!(css.contains(".a:hover"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn minify_strips_comments_and_preserves_longhands() {
    let file = buffer_file(
      "/project/src/style.css",
      "/project/src",
      "a { margin-top: 4px; margin-bottom: 8px; } /* c */",
    );

    let css = run_to_css(CompilationOptions::default(), file).await;

    assert!(!css.contains("/*"), "got: {css}");
    assert!(css.contains("margin-top"), "got: {css}");
    assert!(css.contains("margin-bottom"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn classic_end_to_end_scenario() {
    let file = buffer_file("/project/src/style.css", "/project/src", "a{color:red} /* c */");

    let css = run_to_css(CompilationOptions::default(), file).await;

    assert_eq!(css, "a{color:red}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn minify_can_be_disabled() {
    let file = buffer_file(
      "/project/src/style.css",
      "/project/src",
      "a{color:red} /* c */",
    );

    let css = run_to_css(
      CompilationOptions {
        minify: Some(false),
        ..CompilationOptions::default()
      },
      file,
    )
    .await;

    assert!(css.contains('\n'), "expected expanded output, got: {css}");
    assert!(css.contains("color: red;"), "got: {css}");
    // Comments never survive a parse, minified or not.
    assert!(!css.contains("/*"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn modern_syntax_path_flattens_nesting_too() {
    let file = buffer_file(
      "/project/src/style.css",
      "/project/src",
      ".a { &:hover { color: red; } }",
    );

    let css = run_to_css(
      CompilationOptions {
        modern_syntax: Some(true),
        ..CompilationOptions::default()
      },
      file,
    )
    .await;

    assert!(css.contains(".a:hover"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn purge_absent_retains_unreferenced_selectors() {
    let file = buffer_file(
      "/project/src/style.css",
      "/project/src",
      ".never-used { color: red; }",
    );

    let css = run_to_css(CompilationOptions::default(), file).await;

    assert!(css.contains(".never-used"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn purge_present_drops_unreferenced_selectors() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<div class=\"used\"></div>").unwrap();
    let file = buffer_file(
      "/project/src/style.css",
      "/project/src",
      ".used { color: red; } .unused { color: blue; }",
    );

    let css = run_to_css(
      CompilationOptions {
        purge: Some(PurgeOptions {
          content: vec![dir.path().join("*.html").to_string_lossy().into_owned()],
          ..PurgeOptions::default()
        }),
        ..CompilationOptions::default()
      },
      file,
    )
    .await;

    assert!(css.contains(".used"), "got: {css}");
    assert!(!css.contains(".unused"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn imports_are_inlined_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let entry = dir.path().join("a.css");
    std::fs::write(&entry, "@import \"b.css\";\n.a { color: red; }").unwrap();
    std::fs::write(dir.path().join("b.css"), ".b { color: blue; }").unwrap();

    let file = StyleFile::new(
      &entry,
      dir.path(),
      FileContents::Buffer(Code::from(std::fs::read_to_string(&entry).unwrap())),
    );

    let css = run_to_css(CompilationOptions::default(), file).await;

    assert!(css.contains(".b"), "got: {css}");
    assert!(!css.contains("@import"), "got: {css}");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn unresolved_imports_fail_with_a_processing_error() {
    let dir = tempfile::tempdir().unwrap();
    let entry = dir.path().join("a.css");
    std::fs::write(&entry, "@import \"missing.css\";").unwrap();

    let file = StyleFile::new(
      &entry,
      dir.path(),
      FileContents::Buffer(Code::from("@import \"missing.css\";")),
    );

    let error = run(CompilationOptions::default(), file).await.unwrap_err();

    assert_eq!(error.stage_tag(), "processing");
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn scss_errors_fail_with_a_pre_compilation_error() {
    let file = buffer_file("/project/src/style.scss", "/project/src", ".a { color: ");

    let error = run(CompilationOptions::default(), file).await.unwrap_err();

    assert_eq!(error.stage_tag(), "pre-compilation");
    assert_eq!(error.path(), Path::new("/project/src/style.scss"));
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn a_requested_source_map_is_attached_and_normalized() {
    let file = buffer_file(
      "/project/src/style.scss",
      "/project/src",
      ".a { color: red; }",
    )
    .with_source_map(SourceMapJson::default());

    let file = run(CompilationOptions::default(), file)
      .await
      .unwrap()
      .into_file()
      .unwrap();

    let map = file.source_map.expect("expected a source map");
    assert_eq!(map.file.as_deref(), Some("style.css"));
    assert!(
      map.sources.iter().any(|source| source == "style.scss"),
      "got sources: {:?}",
      map.sources
    );
  }

  #[tokio::test(flavor = "multi_thread")]
  async fn no_source_map_is_attached_without_a_request() {
    let file = buffer_file("/project/src/style.css", "/project/src", "a{color:red}");

    let file = run(CompilationOptions::default(), file)
      .await
      .unwrap()
      .into_file()
      .unwrap();

    assert_eq!(file.source_map, None);
  }
}
