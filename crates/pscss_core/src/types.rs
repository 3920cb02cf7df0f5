pub use self::dialect::*;
pub use self::options::*;
pub use self::style_file::*;

mod dialect;
mod options;
mod style_file;
