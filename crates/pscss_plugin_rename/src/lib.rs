mod rename_transformer;

pub use rename_transformer::PscssRenameTransformerPlugin;
