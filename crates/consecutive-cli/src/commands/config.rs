use std::path::Path;

use anyhow::{bail, Result};

use consecutive_core::AppConfig;

pub fn show(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn init(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!(
            "{} already exists.\nUse --force to overwrite it with the defaults.",
            path.display()
        );
    }

    AppConfig::default().save_to(path)?;

    println!("Wrote default configuration to {}", path.display());
    Ok(())
}

pub fn path(path: &Path) -> Result<()> {
    println!("{}", path.display());
    Ok(())
}
