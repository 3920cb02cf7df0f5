use std::collections::HashSet;
use std::fs;

use lightningcss::printer::PrinterOptions;
use lightningcss::properties::custom::CustomPropertyName;
use lightningcss::properties::Property;
use lightningcss::rules::font_face::FontFaceProperty;
use lightningcss::rules::{CssRule, CssRuleList};
use lightningcss::targets::Targets;
use lightningcss::traits::ToCss;
use once_cell::sync::Lazy;
use pscss_core::types::PurgeOptions;
use regex::Regex;

use crate::plan::{Stage, StageContext, StageError, StageOutput};

use super::lightning;

/// PurgeCSS-style default extractor: runs of word characters and hyphens.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-z0-9_-]+").unwrap());

/// Class and id references inside a serialized selector.
static SELECTOR_TOKEN_RE: Lazy<Regex> =
  Lazy::new(|| Regex::new(r"[.#]([A-Za-z0-9_\\-]+)").unwrap());

/// `var(--name)` references inside CSS text.
static VAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"var\(\s*(--[A-Za-z0-9_-]+)").unwrap());

/// Dead-code elimination: drops style-rule selectors whose class/id tokens
/// never occur in the configured content files. Selectors without class or
/// id parts (element and pseudo selectors) are always retained, as is
/// anything on the safelist.
pub(crate) struct PurgeStage {
  options: PurgeOptions,
}

impl PurgeStage {
  pub fn new(options: PurgeOptions) -> Self {
    Self { options }
  }
}

struct PurgeIndex {
  /// Tokens extracted from the content files.
  tokens: HashSet<String>,
  /// Raw content text, lower-cased, for whole-name checks (font families).
  raw_content: String,
  /// Custom properties referenced through `var()` in the CSS itself.
  used_variables: HashSet<String>,
  safelist: Vec<String>,
}

impl PurgeIndex {
  fn build(options: &PurgeOptions, css: &str) -> Result<Self, StageError> {
    let mut tokens = HashSet::new();
    let mut raw_content = String::new();

    for pattern in &options.content {
      let paths = glob::glob(pattern)
        .map_err(|err| StageError::new(format!("bad content pattern {pattern:?}: {err}")))?;
      for path in paths.flatten() {
        // Binary content files are simply not a token source.
        if let Ok(text) = fs::read_to_string(&path) {
          for token in TOKEN_RE.find_iter(&text) {
            tokens.insert(token.as_str().to_string());
          }
          raw_content.push_str(&text.to_lowercase());
          raw_content.push('\n');
        }
      }
    }

    let used_variables = VAR_RE
      .captures_iter(css)
      .map(|capture| capture[1].to_string())
      .collect();

    Ok(Self {
      tokens,
      raw_content,
      used_variables,
      safelist: options.safelist.clone(),
    })
  }

  fn is_safelisted(&self, selector: &str) -> bool {
    self.safelist.iter().any(|entry| selector.contains(entry))
  }

  fn selector_is_used(&self, selector: &str) -> bool {
    if self.is_safelisted(selector) {
      return true;
    }

    // Element/pseudo-only selectors are kept; content scanning cannot prove
    // them unused.
    for capture in SELECTOR_TOKEN_RE.captures_iter(selector) {
      if !self.tokens.contains(&capture[1]) {
        return false;
      }
    }

    true
  }

  fn name_is_used(&self, name: &str) -> bool {
    self.tokens.contains(name) || self.safelist.iter().any(|entry| entry == name)
  }

  fn family_is_used(&self, family: &str) -> bool {
    self.raw_content.contains(&family.to_lowercase())
  }

  fn variable_is_used(&self, name: &str) -> bool {
    self.used_variables.contains(name) || self.safelist.iter().any(|entry| entry == name)
  }
}

impl Stage for PurgeStage {
  fn name(&self) -> &'static str {
    "purge"
  }

  fn process(&self, css: &str, ctx: &StageContext) -> Result<StageOutput, StageError> {
    let index = PurgeIndex::build(&self.options, css)?;
    let mut stylesheet = lightning::parse(css, ctx)?;

    prune_rules(&mut stylesheet.rules, &self.options, &index)?;

    lightning::print(&stylesheet, css, ctx, Targets::default(), false)
  }
}

fn prune_rules(
  rules: &mut CssRuleList,
  options: &PurgeOptions,
  index: &PurgeIndex,
) -> Result<(), StageError> {
  let mut error = None;

  rules.0.retain_mut(|rule| match rule {
    CssRule::Style(style) => {
      style.selectors.0.retain(|selector| {
        match selector.to_css_string(PrinterOptions::default()) {
          Ok(serialized) => index.selector_is_used(&serialized),
          Err(err) => {
            error = Some(StageError::new(err.to_string()));
            true
          }
        }
      });

      if options.variables {
        let keep = |property: &mut Property| match custom_property_name(property) {
          Some(name) => index.variable_is_used(&name),
          None => true,
        };
        style.declarations.declarations.retain_mut(keep);
        style.declarations.important_declarations.retain_mut(keep);
      }

      !style.selectors.0.is_empty()
    }
    CssRule::Media(media) => {
      if let Err(err) = prune_rules(&mut media.rules, options, index) {
        error = Some(err);
      }
      !media.rules.0.is_empty()
    }
    CssRule::Supports(supports) => {
      if let Err(err) = prune_rules(&mut supports.rules, options, index) {
        error = Some(err);
      }
      !supports.rules.0.is_empty()
    }
    CssRule::Keyframes(keyframes) if options.keyframes => {
      match keyframes.name.to_css_string(PrinterOptions::default()) {
        Ok(name) => index.name_is_used(name.trim_matches('"')),
        Err(err) => {
          error = Some(StageError::new(err.to_string()));
          true
        }
      }
    }
    CssRule::FontFace(font_face) if options.font_face => {
      font_face.properties.iter().all(|property| match property {
        FontFaceProperty::FontFamily(family) => {
          match family.to_css_string(PrinterOptions::default()) {
            Ok(serialized) => index.family_is_used(serialized.trim_matches('"')),
            Err(err) => {
              error = Some(StageError::new(err.to_string()));
              true
            }
          }
        }
        _ => true,
      })
    }
    _ => true,
  });

  match error {
    Some(error) => Err(error),
    None => Ok(()),
  }
}

fn custom_property_name(property: &Property) -> Option<String> {
  match property {
    Property::Custom(custom) => match &custom.name {
      CustomPropertyName::Custom(name) => Some(name.0.to_string()),
      CustomPropertyName::Unknown(name) => Some(name.0.to_string()),
    },
    _ => None,
  }
}
