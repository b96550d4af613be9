use std::path::PathBuf;

use nw_core::{ArticleSink, Result};

pub mod backends;

pub use backends::*;

/// Output destinations a run can deliver to.
#[derive(Debug, Clone)]
pub enum SinkConfig {
    FlatFile { path: PathBuf },
    #[cfg(feature = "sheets")]
    Sheets(SheetsConfig),
}

pub fn create_sink(config: SinkConfig) -> Result<Box<dyn ArticleSink>> {
    match config {
        SinkConfig::FlatFile { path } => Ok(Box::new(FlatFileSink::new(path))),
        #[cfg(feature = "sheets")]
        SinkConfig::Sheets(config) => Ok(Box::new(SheetsSink::new(config)?)),
    }
}

pub mod prelude {
    pub use super::backends::*;
    pub use super::{create_sink, SinkConfig};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_flat_file_sink() {
        let sink = create_sink(SinkConfig::FlatFile {
            path: PathBuf::from("articles.txt"),
        })
        .unwrap();
        assert_eq!(sink.name(), "flat file");
    }
}
