use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use strata_core::{MemoryBackend, Store, StoreConfig};
use tracing::info;

use super::read_records;

#[derive(Args)]
pub struct SyncArgs {
    /// Current record set
    pub base: PathBuf,

    /// Desired record set
    pub incoming: PathBuf,

    /// Id field, overriding the configuration
    #[arg(long)]
    pub id_field: Option<String>,

    /// Keep base records missing from the incoming set
    #[arg(long)]
    pub keep_missing: bool,

    /// Only print the plan
    #[arg(long)]
    pub dry_run: bool,

    /// Pretty print JSON
    #[arg(long)]
    pub pretty: bool,
}

/// Reconcile `base` with `incoming` and print what changed
pub fn execute_sync(config: &StoreConfig, args: SyncArgs) -> Result<()> {
    let mut config = config.clone();
    if let Some(id_field) = args.id_field.clone() {
        config.id_field = id_field;
    }

    let mut store = Store::from_config(MemoryBackend::new(), &config)
        .context("Failed to create store from configuration")?;
    for record in read_records(&args.base)? {
        store.add_or_update(&record)?;
    }
    let incoming = read_records(&args.incoming)?;

    let keep_missing = args.keep_missing;
    let output = if args.dry_run {
        store
            .plan_sync(&incoming, &config.id_field, |a, b| a != b, |_| !keep_missing)?
            .to_json()
    } else {
        let summary = store.sync(&incoming, &config.id_field, |a, b| a != b, |_| !keep_missing)?;
        info!("Store holds {} records after sync", store.len()?);
        summary.to_json()
    };

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);
    Ok(())
}

