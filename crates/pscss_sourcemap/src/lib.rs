mod normalize;
mod source_map;

pub use normalize::{normalize, relative_slash_path};
pub use source_map::{SourceMapError, SourceMapJson};
