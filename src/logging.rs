//! Terminal logger setup.

use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Parse a `[log] level` value. Unknown names are rejected during config validation.
pub fn parse_level(level: &str) -> Option<LevelFilter> {
    level.trim().parse().ok()
}

/// Install the global logger. Only this crate's records are shown; a second
/// call is a no-op.
pub fn init_logger(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .add_filter_allow_str("scaneq")
        .build();
    if TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto).is_err() {
        log::debug!("logger already initialised");
    }
}
