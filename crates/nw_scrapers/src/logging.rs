use tracing::Level;
use std::sync::Once;
use std::collections::VecDeque;

static INIT: Once = Once::new();

/// Prefixes every message, e.g. with the id of the site being scraped.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self {
            prefixes: VecDeque::new(),
        }
    }

    pub fn with_prefix(mut self, prefix: String) -> Self {
        self.prefixes.push_back(prefix);
        self
    }

    fn render(&self, message: &str) -> String {
        let prefix = self.prefixes.iter().map(|p| format!("{} ", p)).collect::<String>();
        format!("{}{}", prefix, message)
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}", self.render(message));
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}", self.render(message));
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}", self.render(message));
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}", self.render(message));
    }
}

/// Installs the fmt subscriber once; later calls only hand back a logger.
pub fn init_logging(verbose: bool) -> Logger {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let _ = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_target(false)
                .try_init();
        });
    }
    Logger::new()
}
