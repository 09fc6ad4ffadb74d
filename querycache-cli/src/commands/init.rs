//! Init command - write the configuration file.

use std::path::Path;

use querycache::ConfigFile;

use crate::error::CliError;

/// Run the init command.
///
/// Values already present in an existing file are kept; missing keys are
/// filled in with defaults.
pub fn run(path: &Path) -> Result<(), CliError> {
    let existed = path.exists();
    let config = ConfigFile::load_or_default(path)?;
    config.save_to(path)?;

    if existed {
        println!("Updated configuration file: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }
    println!();
    println!("Edit the [cache] section to choose the engine, capacity and refresh period.");
    Ok(())
}
