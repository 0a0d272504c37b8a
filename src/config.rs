use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Runtime configuration, loadable from a TOML file with every field
/// optional. CLI flags override file values field by field (see the
/// binary); components receive the resolved value at construction instead
/// of consulting global state.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Root of the dump corpus: a single file or a directory walked
    /// recursively (no extension filtering).
    pub data_path: PathBuf,
    /// Directory search and statistics output files are written under.
    pub output_dir: PathBuf,
    /// On-disk cache document.
    pub cache_file: PathBuf,
    /// Use the bounded worker pool for ingestion.
    pub concurrent: bool,
    /// Worker count for concurrent ingestion.
    pub workers: usize,
    /// Keep raw block lines verbatim. Multiplies memory use and persists
    /// sensitive content into the cache and output files.
    pub debug_mode: bool,
    /// Write search results as JSON dumps instead of human-readable
    /// reports.
    pub json_output: bool,
    pub verbose: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("/extraspace/botnet-data"),
            output_dir: PathBuf::from("."),
            cache_file: PathBuf::from(".botsift-cache.json"),
            concurrent: false,
            workers: 10,
            debug_mode: false,
            json_output: false,
            verbose: false,
        }
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

pub fn validate(config: &Config) -> Result<()> {
    if config.workers == 0 {
        anyhow::bail!("workers must be >= 1");
    }
    Ok(())
}
