use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use strata_core::{IndexDefinition, IndexKind, MemoryBackend, Record, Store, StoreConfig};
use tracing::info;

use super::{parse_bound, read_records};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum KindArg {
    Tree,
    SkipList,
}

impl From<KindArg> for IndexKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Tree => IndexKind::Tree,
            KindArg::SkipList => IndexKind::SkipList,
        }
    }
}

#[derive(Args)]
pub struct ImportArgs {
    /// JSON file holding an array of records
    pub input: PathBuf,

    /// Field to order the output by (dotted path)
    #[arg(short, long)]
    pub field: Option<String>,

    /// Index name; defaults to idx_<field>, or the first configured index
    #[arg(short, long)]
    pub index: Option<String>,

    /// Engine backing the index created for --field
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Id field, overriding the configuration
    #[arg(long)]
    pub id_field: Option<String>,

    /// Inclusive lower bound (parsed as JSON, else a string)
    #[arg(long, requires = "end")]
    pub start: Option<String>,

    /// Inclusive upper bound (parsed as JSON, else a string)
    #[arg(long, requires = "start")]
    pub end: Option<String>,

    /// Pretty print JSON
    #[arg(long)]
    pub pretty: bool,

    /// Print write and lookup counters to stderr after the output
    #[arg(long)]
    pub stats: bool,
}

/// Load records into an in-memory store and print them in index order
pub fn execute_import(config: &StoreConfig, args: ImportArgs) -> Result<()> {
    let (store, index) = load(config, &args)?;

    let ordered = select(&store, index.as_deref(), &args)?;
    print_records(&ordered, args.pretty)?;

    if args.stats {
        let stats = serde_json::to_string_pretty(&store.index_statistics())?;
        eprintln!("{}", stats);
    }
    Ok(())
}

/// Build the store and return it with the name of the index to order by
fn load(config: &StoreConfig, args: &ImportArgs) -> Result<(Store<MemoryBackend>, Option<String>)> {
    let mut config = config.clone();
    if let Some(id_field) = args.id_field.clone() {
        config.id_field = id_field;
    }

    let mut store = Store::from_config(MemoryBackend::new(), &config)
        .context("Failed to create store from configuration")?;

    let index = match &args.field {
        Some(field) => {
            let mut definition = match &args.index {
                Some(name) => IndexDefinition::new(name.clone(), field.clone()),
                None => IndexDefinition::single(field.clone()),
            };
            if let Some(kind) = args.kind {
                definition = definition.kind(kind.into());
            }
            let name = definition.name.clone();
            store.add_index(definition)?;
            Some(name)
        }
        None => args
            .index
            .clone()
            .or_else(|| config.indexes.first().map(|d| d.name.clone())),
    };

    let records = read_records(&args.input)?;
    for record in &records {
        store
            .add_or_update(record)
            .with_context(|| format!("Failed to import {}", record.to_json()))?;
    }
    info!("Imported {} records into '{}'", store.len()?, store.prefix());

    Ok((store, index))
}

fn select(store: &Store<MemoryBackend>, index: Option<&str>, args: &ImportArgs) -> Result<Vec<Record>> {
    let Some(index) = index else {
        if args.start.is_some() {
            anyhow::bail!("--start/--end need an index: pass --field or --index");
        }
        return Ok(store.records()?);
    };

    match (&args.start, &args.end) {
        (Some(start), Some(end)) => {
            Ok(store.get_range_by_index(index, &parse_bound(start), &parse_bound(end))?)
        }
        _ => Ok(store.get_all_by_index(index)?),
    }
}

fn print_records(records: &[Record], pretty: bool) -> Result<()> {
    let json = serde_json::Value::Array(records.iter().map(Record::to_json).collect());
    let text = if pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    println!("{}", text);
    Ok(())
}
