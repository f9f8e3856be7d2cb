//! Configuration file commands

use colored::Colorize;

use crate::cli::{CommandContext, GlobalOptions, OutputFormat};
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::output::json::format_json;

/// Write the default configuration
pub fn init(opts: &GlobalOptions, force: bool) -> Result<()> {
    let path = Config::resolve_path(opts.config_ref())?;
    if path.exists() && !force {
        return Err(ConfigError::Invalid(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        ))
        .into());
    }

    Config::default().save_to(&path)?;
    println!(
        "{} Configuration saved to: {}",
        "✓".green(),
        path.display()
    );
    println!("  Set endpoints.market_share_url and endpoints.charts_url before fetching.");
    Ok(())
}

/// Print the effective configuration, overrides applied
pub fn show(opts: &GlobalOptions) -> Result<()> {
    let config = CommandContext::effective_config(opts)?;
    match opts.format {
        OutputFormat::Json => println!("{}", format_json(&config)?),
        OutputFormat::Table => {
            let yaml = serde_yaml::to_string(&config).map_err(ConfigError::from)?;
            print!("{}", yaml);
        }
    }
    Ok(())
}
