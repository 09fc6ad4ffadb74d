//! Config command - show the effective configuration.

use std::path::Path;
use std::time::Duration;

use querycache::{CacheConfig, ConfigFile};

use crate::error::CliError;

/// Run the config command.
pub fn run(path: &Path) -> Result<(), CliError> {
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not found, using defaults)", path.display())
    };
    let config = ConfigFile::load_or_default(path)?;

    println!("Configuration file: {}", source);
    println!();
    print!("{}", render(&config.cache));
    Ok(())
}

/// Render the `[cache]` section the way it reads in the file.
fn render(config: &CacheConfig) -> String {
    let mut out = String::from("[cache]\n");
    out.push_str(&format!("  engine = {}\n", config.engine));
    out.push_str(&format!("  max_entries = {}\n", config.max_entries));
    out.push_str(&format!(
        "  time_to_live_secs = {}\n",
        describe(config.time_to_live)
    ));
    out.push_str(&format!(
        "  refresh_period_secs = {}\n",
        describe(config.refresh_period)
    ));
    out
}

fn describe(value: Option<Duration>) -> String {
    match value {
        Some(d) => d.as_secs().to_string(),
        None => "0 (disabled)".to_string(),
    }
}
