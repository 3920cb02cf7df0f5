mod plan;
mod sass;
mod stages;
mod style_transformer;

pub use style_transformer::PscssStyleTransformerPlugin;
