//! # botsift CLI
//!
//! Flag-driven binary for triaging botnet check-in dumps.
//!
//! ## Usage
//!
//! ```bash
//! # Search every dump under the data root for a bank name
//! botsift --data-path ./dumps --find targetbank
//!
//! # Terms from a file, one per line, parsing files on a worker pool
//! botsift --data-path ./dumps --find terms.txt --concurrent
//!
//! # Aggregate statistics for check-ins since a date
//! botsift --data-path ./dumps --stats --timespan 01.03.2014
//!
//! # Force re-ingestion and refresh the cache
//! botsift --data-path ./dumps --initialize
//! ```
//!
//! The parsed index is cached in a JSON file keyed by (data root, cutoff);
//! later runs with the same pair skip parsing entirely.

use anyhow::{bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::Parser;
use std::path::PathBuf;

use botsift::cache::CacheManager;
use botsift::config::{self, Config};
use botsift::models::{CorpusIndex, DATE_FORMAT};
use botsift::progress::{Diagnostics, ProgressMode};
use botsift::{ingest, output, query};

/// Parse, search, and summarize botnet check-in log dumps.
///
/// Settings may also come from a TOML file via `--config`; every flag
/// given on the command line overrides its file counterpart.
#[derive(Parser)]
#[command(
    name = "botsift",
    about = "Parse, search, and summarize botnet check-in log dumps",
    version
)]
struct Cli {
    /// Path to an optional configuration file (TOML).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Dump root: a single file, or a directory walked recursively.
    #[arg(short = 'd', long)]
    data_path: Option<PathBuf>,

    /// Search term, or a path to a file containing one term per line.
    #[arg(short = 'f', long)]
    find: Option<String>,

    /// Collect aggregate statistics.
    #[arg(short = 's', long)]
    stats: bool,

    /// Ignore check-ins reporting before this date (dd.mm.yyyy).
    #[arg(short = 't', long)]
    timespan: Option<String>,

    /// Parse dump files on a bounded worker pool.
    #[arg(short = 'm', long)]
    concurrent: bool,

    /// Worker count for --concurrent.
    #[arg(long)]
    workers: Option<usize>,

    /// Cache file path.
    #[arg(short = 'c', long)]
    cache_file: Option<PathBuf>,

    /// Force re-ingestion, bypassing any cached index (the fresh result
    /// is stored back into the cache).
    #[arg(short = 'i', long)]
    initialize: bool,

    /// Keep raw check-in lines verbatim. Loud warning: this exports
    /// sensitive raw content into the cache and output files and uses
    /// much more memory.
    #[arg(short = 'x', long)]
    debug_mode: bool,

    /// Write search results as JSON dumps instead of readable reports.
    #[arg(short = 'j', long)]
    json: bool,

    /// Output directory for search and statistics files.
    #[arg(short = 'o', long)]
    output_dir: Option<PathBuf>,

    /// Print verbose diagnostics.
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Progress reporting: auto, off, human, or json.
    #[arg(long, default_value = "auto")]
    progress: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = resolve_config(&cli)?;
    let diag = Diagnostics::new(config.verbose);

    if cli.find.is_none() && !cli.stats && !cli.initialize {
        bail!("nothing to do: pass --find and/or --stats (or --initialize to refresh the cache)");
    }

    if config.debug_mode {
        diag.warn(
            "debug mode on: raw check-in lines will be kept, exported to \
             output files, and persisted into the cache; memory use grows \
             accordingly",
        );
    }

    let cutoff = parse_cutoff(cli.timespan.as_deref())?;

    let progress_mode = match cli.progress.as_str() {
        "auto" => ProgressMode::default_for_tty(),
        "off" => ProgressMode::Off,
        "human" => ProgressMode::Human,
        "json" => ProgressMode::Json,
        other => bail!("unknown progress mode: {}. Use auto, off, human, or json.", other),
    };
    let reporter = progress_mode.reporter();

    let root_key = config.data_path.display().to_string();
    let mut cache = CacheManager::load(&config.cache_file, diag);
    let mut debug_mode = config.debug_mode;

    let index: CorpusIndex = if cli.initialize {
        let index = ingest::build_index(&config, cutoff, reporter.as_ref(), diag).await?;
        cache.store(&root_key, cutoff, index.clone(), debug_mode)?;
        index
    } else if let Some(entry) = cache.lookup(&root_key, cutoff) {
        diag.debug(format!(
            "initializing from cache {}",
            config.cache_file.display()
        ));
        // Warned on every restore of a debug-built entry, even when the
        // current run is already in debug mode: the provenance matters.
        if entry.debug_mode {
            debug_mode = true;
            diag.warn(
                "cache was built with debug mode on: restored data carries \
                 raw check-in lines and they will reach the output files",
            );
        }
        entry.data.clone()
    } else {
        diag.debug(format!(
            "no cache entry for {} and {}, initializing",
            root_key,
            CacheManager::cutoff_label(cutoff)
        ));
        let index = ingest::build_index(&config, cutoff, reporter.as_ref(), diag).await?;
        cache.store(&root_key, cutoff, index.clone(), debug_mode)?;
        index
    };

    if let Some(find) = &cli.find {
        let terms = load_search_terms(find, diag)?;
        if terms.is_empty() {
            bail!("search requested but the term set is empty");
        }

        let results = query::search_source_lines(&index, &terms, reporter.as_ref());
        for (term, files) in &results {
            diag.debug(format!(
                "{} file(s) matched search term {}",
                files.len(),
                term
            ));
        }

        let out_dir = output::write_search_results(
            &config.output_dir,
            &results,
            config.json_output,
            debug_mode,
        )?;
        println!("search results written to {}", out_dir.display());
    }

    if cli.stats {
        let stats = query::collect_stats(&index, reporter.as_ref());
        let stats_dir = output::write_stats(&config.output_dir, &stats)?;
        println!("statistics written to {}", stats_dir.display());
        println!(
            "  bots: {}  emails: {}  ips: {}  cards: {}",
            stats.summary.bot_count,
            stats.summary.email_count,
            stats.summary.ip_count,
            stats.summary.credit_card_count
        );
    }

    Ok(())
}

/// Load the optional TOML config and layer CLI flags over it.
fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => config::load_config(path)?,
        None => Config::default(),
    };

    if let Some(data_path) = &cli.data_path {
        config.data_path = data_path.clone();
    }
    if let Some(output_dir) = &cli.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(cache_file) = &cli.cache_file {
        config.cache_file = cache_file.clone();
    }
    if let Some(workers) = cli.workers {
        config.workers = workers;
    }
    config.concurrent |= cli.concurrent;
    config.debug_mode |= cli.debug_mode;
    config.json_output |= cli.json;
    config.verbose |= cli.verbose;

    config::validate(&config)?;
    Ok(config)
}

/// `--timespan dd.mm.yyyy` → midnight cutoff.
fn parse_cutoff(timespan: Option<&str>) -> Result<Option<NaiveDateTime>> {
    match timespan {
        None => Ok(None),
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, DATE_FORMAT)
                .with_context(|| format!("invalid --timespan '{}': expected dd.mm.yyyy", raw))?;
            Ok(date.and_hms_opt(0, 0, 0))
        }
    }
}

/// A literal term, or every non-empty line of a term file.
fn load_search_terms(find: &str, diag: Diagnostics) -> Result<Vec<String>> {
    let path = std::path::Path::new(find);
    if path.is_file() {
        diag.debug(format!("reading search terms from {}", find));
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read term list: {}", find))?;
        Ok(content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    } else {
        diag.debug(format!("using {} as a literal search term", find));
        let term = find.trim();
        if term.is_empty() {
            Ok(Vec::new())
        } else {
            Ok(vec![term.to_string()])
        }
    }
}
