pub(crate) mod import_inline;
pub(crate) mod lightning;
pub(crate) mod minify;
pub(crate) mod purge;
pub(crate) mod transpile;
