use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use gnc_document::{Document, Variables};
use gnc_mutation::MutationDirective;
use gnc_sdk::{CacheConfig, MutationOutcome, NormalizedCache, ReadOutcome, WriteReport};
use gnc_store::{DanglingReference, NormalizedStore, RecordStore};
use gnc_types::StoreKey;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Inspect(args) => cmd_inspect(args, format),
        Command::Check(args) => cmd_check(args, format),
        Command::Read(args) => cmd_read(args, format),
        Command::Write(args) => cmd_write(args, format),
        Command::Mutate(args) => cmd_mutate(args, format),
    }
}

// ---- File helpers ----

fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_store(path: &Path) -> anyhow::Result<NormalizedStore> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    NormalizedStore::from_json(&text)
        .with_context(|| format!("loading snapshot {}", path.display()))
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CacheConfig> {
    match path {
        Some(path) => CacheConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(CacheConfig::default()),
    }
}

fn load_variables(path: Option<&Path>) -> anyhow::Result<Variables> {
    match path {
        Some(path) => load_json(path),
        None => Ok(Variables::new()),
    }
}

/// Open a cache seeded from `snapshot`. A missing snapshot file is an empty
/// store when `allow_missing` is set.
fn open_cache(
    snapshot: &Path,
    config: Option<&Path>,
    allow_missing: bool,
) -> anyhow::Result<NormalizedCache> {
    let cache = NormalizedCache::new(load_config(config)?)?;
    if snapshot.exists() || !allow_missing {
        cache.restore(load_store(snapshot)?)?;
    } else {
        info!(path = %snapshot.display(), "snapshot not found; starting empty");
    }
    Ok(cache)
}

fn save_snapshot(cache: &NormalizedCache, path: &Path) -> anyhow::Result<()> {
    std::fs::write(path, cache.extract_json()?)
        .with_context(|| format!("writing snapshot {}", path.display()))?;
    info!(path = %path.display(), "snapshot saved");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ---- Commands ----

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<()> {
    let store = load_store(&args.snapshot)?;
    match args.key {
        Some(key) => {
            let key = StoreKey::parse(&key)?;
            let record = store.record(&key)?;
            match format {
                OutputFormat::Json => print_json(record)?,
                OutputFormat::Text => {
                    println!("{}", key.to_string().yellow().bold());
                    for (field, value) in record {
                        println!("  {}: {}", field.bold(), serde_json::to_string(value)?);
                    }
                }
            }
        }
        None => match format {
            OutputFormat::Json => print_json(&store.keys())?,
            OutputFormat::Text => {
                println!("{} records", store.len().to_string().bold());
                for (key, record) in store.records() {
                    println!("  {} ({} fields)", key.to_string().yellow(), record.len());
                }
            }
        },
    }
    Ok(())
}

fn check_snapshot(path: &Path) -> anyhow::Result<Vec<DanglingReference>> {
    Ok(load_store(path)?.dangling_references())
}

fn cmd_check(args: CheckArgs, format: OutputFormat) -> anyhow::Result<()> {
    let dangling = check_snapshot(&args.snapshot)?;
    match format {
        OutputFormat::Json => print_json(&dangling)?,
        OutputFormat::Text => {
            if dangling.is_empty() {
                println!("{} No dangling references.", "✓".green().bold());
            }
            for d in &dangling {
                println!(
                    "  {} {}.{} -> {}",
                    "dangling:".red(),
                    d.holder.to_string().yellow(),
                    d.field,
                    d.target.to_string().bold()
                );
            }
        }
    }
    if !dangling.is_empty() {
        bail!("{} dangling reference(s)", dangling.len());
    }
    Ok(())
}

fn read_snapshot(args: &ReadArgs) -> anyhow::Result<ReadOutcome> {
    let cache = open_cache(&args.snapshot, args.op.config.as_deref(), false)?;
    let document: Document = load_json(&args.op.document)?;
    let variables = load_variables(args.op.variables.as_deref())?;
    Ok(cache.read_query(&document, args.op.operation.as_deref(), &variables)?)
}

fn cmd_read(args: ReadArgs, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = read_snapshot(&args)?;
    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(&outcome.data)?);
            if outcome.complete {
                println!("{} complete", "✓".green().bold());
            } else {
                println!("{} incomplete", "✗".red().bold());
                for missing in &outcome.missing {
                    println!("  {} {}", "missing:".red(), missing);
                }
            }
            for dropped in &outcome.dropped {
                println!(
                    "  {} {} ({})",
                    "dropped:".yellow(),
                    dropped.path,
                    dropped.key
                );
            }
        }
    }
    Ok(())
}

fn write_snapshot(args: &WriteArgs) -> anyhow::Result<WriteReport> {
    let cache = open_cache(&args.snapshot, args.op.config.as_deref(), true)?;
    let document: Document = load_json(&args.op.document)?;
    let variables = load_variables(args.op.variables.as_deref())?;
    let response: Value = load_json(&args.response)?;
    let report = cache.write_query(&document, args.op.operation.as_deref(), &variables, &response)?;
    save_snapshot(&cache, args.out.as_deref().unwrap_or(&args.snapshot))?;
    Ok(report)
}

fn print_write_report(report: &WriteReport) {
    println!(
        "{} Wrote {} records ({} changed)",
        "✓".green().bold(),
        report.patch.touched.len().to_string().bold(),
        report.patch.changed.len()
    );
    for missing in &report.missing {
        println!("  {} {}", "missing:".red(), missing);
    }
}

fn cmd_write(args: WriteArgs, format: OutputFormat) -> anyhow::Result<()> {
    let report = write_snapshot(&args)?;
    match format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => print_write_report(&report),
    }
    Ok(())
}

fn mutate_snapshot(args: &MutateArgs) -> anyhow::Result<MutationOutcome> {
    let write = &args.write;
    let cache = open_cache(&write.snapshot, write.op.config.as_deref(), true)?;
    let document: Document = load_json(&write.op.document)?;
    let variables = load_variables(write.op.variables.as_deref())?;
    let response: Value = load_json(&write.response)?;
    let directives: Vec<MutationDirective> = match &args.directives {
        Some(path) => load_json(path)?,
        None => Vec::new(),
    };
    let outcome = cache.mutate(
        &document,
        write.op.operation.as_deref(),
        &variables,
        &response,
        &directives,
    )?;
    save_snapshot(&cache, write.out.as_deref().unwrap_or(&write.snapshot))?;
    Ok(outcome)
}

fn cmd_mutate(args: MutateArgs, format: OutputFormat) -> anyhow::Result<()> {
    let outcome = mutate_snapshot(&args)?;
    match format {
        OutputFormat::Json => print_json(&outcome)?,
        OutputFormat::Text => {
            print_write_report(&outcome.write);
            println!(
                "{} Applied {} directive(s)",
                "✓".green().bold(),
                outcome.integration.applied.to_string().bold()
            );
            for failure in &outcome.integration.failures {
                println!(
                    "  {} #{}: {}",
                    "skipped:".yellow(),
                    failure.index,
                    failure.error
                );
            }
        }
    }
    Ok(())
}
