pub mod flatfile;

#[cfg(feature = "sheets")]
pub mod sheets;

pub use flatfile::FlatFileSink;

#[cfg(feature = "sheets")]
pub use sheets::{SheetsConfig, SheetsSink};
