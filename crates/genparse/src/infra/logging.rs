//! Tracing subscriber setup for the command-line binary.

use std::env;
use std::io;

use tracing::Level;

/// Overrides the verbosity flags when set to a level name such as `debug`.
pub const LOG_ENV: &str = "GENPARSE_LOG";

/// Install the global fmt subscriber. Logs go to stderr so stdout carries
/// only command output. Repeated calls are ignored.
pub fn init(verbosity: u8) {
    let level = env::var(LOG_ENV)
        .ok()
        .and_then(|value| value.parse::<Level>().ok())
        .unwrap_or_else(|| level_for(verbosity));

    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

/// Map a `-v` count to a level, starting at warnings.
pub fn level_for(verbosity: u8) -> Level {
    match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        assert_eq!(level_for(0), Level::WARN);
        assert_eq!(level_for(2), Level::DEBUG);
        assert_eq!(level_for(9), Level::TRACE);
    }
}
