use anyhow::Result;
use clap::Subcommand;
use std::path::Path;
use strata_core::StoreConfig;

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,
    /// Write the default configuration to the config path
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },
    /// Check the configuration file
    Validate,
}

pub fn execute_config_command(
    config: &StoreConfig,
    path: &Path,
    command: ConfigCommands,
) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", toml::to_string_pretty(config)?);
        }
        ConfigCommands::Init { force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            StoreConfig::default().save(path)?;
            println!("Wrote default configuration to {}", path.display());
        }
        ConfigCommands::Validate => {
            config.validate()?;
            println!("Configuration is valid");
            println!("  Prefix: {}", config.prefix);
            println!("  Id field: {}", config.id_field);
            println!("  Default index kind: {}", config.default_index_kind);
            for definition in &config.indexes {
                let kind = definition.kind.unwrap_or(config.default_index_kind);
                println!("  Index {} on {} ({})", definition.name, definition.field, kind);
            }
        }
    }
    Ok(())
}
