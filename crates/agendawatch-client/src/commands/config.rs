//! Configuration commands.

use std::path::Path;

use agendawatch_server::AppConfig;

use crate::config::redacted_lines;
use crate::error::ClientResult;

/// Report that the configuration loaded and its secrets resolved.
pub fn validate(path: &Path, config: &AppConfig) -> ClientResult<()> {
    println!("{}: configuration is valid.", path.display());
    println!(
        "Checking every {}s, logging in at {}",
        config.check_interval.as_secs(),
        config.start_url
    );
    Ok(())
}

/// Dump the effective configuration to stdout.
pub fn dump(path: &Path, config: &AppConfig) -> ClientResult<()> {
    println!("# {}", path.display());
    for line in redacted_lines(config) {
        println!("{}", line);
    }
    Ok(())
}
