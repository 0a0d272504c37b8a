//! Cache manager: persistence of parsed indexes between runs.
//!
//! The cache is one pretty-printed JSON document, human-diffable rather
//! than a database. Top-level keys are data root paths, second-level keys are
//! cutoff labels (`ALL`, or the cutoff date at day granularity), values
//! are the serialized index plus the debug-mode flag it was built under.
//! The flag is an explicit metadata field on the entry, not a sentinel key
//! spliced into the bot map.
//!
//! A missing or unparsable cache file degrades to an empty cache; it is
//! warned about, never fatal.

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::models::{CorpusIndex, DATE_FORMAT};
use crate::progress::Diagnostics;

/// Cutoff label used when no cutoff is active.
pub const NO_CUTOFF_LABEL: &str = "ALL";

/// One cached ingestion result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Whether the index was built with raw block retention on. Restoring
    /// such an entry re-enables debug mode for the current run.
    pub debug_mode: bool,
    pub data: CorpusIndex,
}

/// root path → cutoff label → entry.
type CacheDocument = BTreeMap<String, BTreeMap<String, CacheEntry>>;

pub struct CacheManager {
    path: PathBuf,
    document: CacheDocument,
}

impl CacheManager {
    /// Load the cache document from disk. Absent or malformed files yield
    /// an empty cache.
    pub fn load(path: &Path, diag: Diagnostics) -> Self {
        let document = match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(document) => document,
                Err(err) => {
                    diag.warn(format!(
                        "unable to read cache file {}: {}",
                        path.display(),
                        err
                    ));
                    CacheDocument::new()
                }
            },
            Err(_) => {
                diag.debug(format!("cache file {} doesn't exist yet", path.display()));
                CacheDocument::new()
            }
        };

        Self {
            path: path.to_path_buf(),
            document,
        }
    }

    /// The label a cutoff is keyed under: `ALL`, or the day it falls on.
    pub fn cutoff_label(cutoff: Option<NaiveDateTime>) -> String {
        match cutoff {
            None => NO_CUTOFF_LABEL.to_string(),
            Some(cutoff) => cutoff.format(DATE_FORMAT).to_string(),
        }
    }

    /// Find the cached entry for this exact (root, cutoff) pair. Any key
    /// mismatch is a miss; there is no partial reuse.
    pub fn lookup(&self, root: &str, cutoff: Option<NaiveDateTime>) -> Option<&CacheEntry> {
        self.document.get(root)?.get(&Self::cutoff_label(cutoff))
    }

    /// Replace the entry for this exact (root, cutoff) key and rewrite the
    /// document. Unrelated entries persist untouched.
    pub fn store(
        &mut self,
        root: &str,
        cutoff: Option<NaiveDateTime>,
        index: CorpusIndex,
        debug_mode: bool,
    ) -> Result<()> {
        self.document.entry(root.to_string()).or_default().insert(
            Self::cutoff_label(cutoff),
            CacheEntry {
                debug_mode,
                data: index,
            },
        );

        let content = serde_json::to_string_pretty(&self.document)
            .context("failed to serialize cache document")?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("failed to write cache file: {}", self.path.display()))?;
        Ok(())
    }
}
