//! Ingestion engine: corpus enumeration and index construction.
//!
//! Enumerates every regular file under the data root (or the root itself
//! when it is a file), parses each with the record parser, and merges the
//! per-file results into the path-keyed index. Two modes: sequential, and
//! a bounded worker pool draining a shared queue. Each file owns a
//! disjoint index key, so both modes produce an identical index.
//!
//! An unreadable file is fatal for the run and surfaced with context; it
//! never silently yields an incomplete index.

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use walkdir::WalkDir;

use crate::config::Config;
use crate::models::{CorpusIndex, FileData};
use crate::parser;
use crate::progress::{Diagnostics, ProgressEvent, ProgressReporter};

/// Build the in-memory index for the configured data root.
pub async fn build_index(
    config: &Config,
    cutoff: Option<NaiveDateTime>,
    progress: &dyn ProgressReporter,
    diag: Diagnostics,
) -> Result<CorpusIndex> {
    progress.report(ProgressEvent::Enumerating {
        root: config.data_path.display().to_string(),
    });
    let files = enumerate_dump_files(&config.data_path)?;
    diag.debug(format!(
        "found {} dump files under {}",
        files.len(),
        config.data_path.display()
    ));

    if config.concurrent {
        build_index_concurrent(
            files,
            cutoff,
            config.debug_mode,
            config.workers,
            progress,
            diag,
        )
        .await
    } else {
        build_index_sequential(files, cutoff, config.debug_mode, progress, diag)
    }
}

/// Every regular file under `root`, recursively, in sorted order; or the
/// root itself when it is a file. No extension filtering.
pub fn enumerate_dump_files(root: &Path) -> Result<Vec<PathBuf>> {
    if root.is_file() {
        return Ok(vec![root.to_path_buf()]);
    }
    if !root.is_dir() {
        bail!("data path does not exist: {}", root.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.with_context(|| format!("walking {}", root.display()))?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    // Sort for deterministic enumeration order.
    files.sort();
    Ok(files)
}

fn build_index_sequential(
    files: Vec<PathBuf>,
    cutoff: Option<NaiveDateTime>,
    debug_mode: bool,
    progress: &dyn ProgressReporter,
    diag: Diagnostics,
) -> Result<CorpusIndex> {
    let total = files.len() as u64;
    let mut index = CorpusIndex::new();

    for (i, path) in files.into_iter().enumerate() {
        let data = parse_one(&path, cutoff, debug_mode, diag)?;
        index.insert(path.display().to_string(), data);
        progress.report(ProgressEvent::Completed {
            phase: "parsing",
            done: i as u64 + 1,
            total,
        });
    }

    Ok(index)
}

/// Bounded worker pool: `workers` tasks drain a shared queue of paths,
/// parse on blocking threads, and send `(path, parsed)` back. Each path is
/// a disjoint index key, so the only synchronized structure is the queue;
/// the engine drains fully before returning.
async fn build_index_concurrent(
    files: Vec<PathBuf>,
    cutoff: Option<NaiveDateTime>,
    debug_mode: bool,
    workers: usize,
    progress: &dyn ProgressReporter,
    diag: Diagnostics,
) -> Result<CorpusIndex> {
    let total = files.len() as u64;
    let capacity = files.len().max(1);

    let (work_tx, work_rx) = mpsc::channel::<PathBuf>(capacity);
    let work_rx = Arc::new(Mutex::new(work_rx));
    let (result_tx, mut result_rx) = mpsc::channel::<(String, FileData)>(capacity);

    let mut pool = JoinSet::new();
    for _ in 0..workers.max(1) {
        let work_rx = Arc::clone(&work_rx);
        let result_tx = result_tx.clone();
        pool.spawn(async move {
            loop {
                let path = { work_rx.lock().await.recv().await };
                let Some(path) = path else { break };

                let key = path.display().to_string();
                let data = tokio::task::spawn_blocking(move || {
                    parse_one(&path, cutoff, debug_mode, diag)
                })
                .await
                .context("parser task panicked")??;

                if result_tx.send((key, data)).await.is_err() {
                    break;
                }
            }
            Ok::<(), anyhow::Error>(())
        });
    }
    drop(result_tx);

    for path in files {
        // Capacity covers the whole queue; a send only fails once every
        // worker has already exited, which join_next surfaces below.
        let _ = work_tx.send(path).await;
    }
    drop(work_tx);

    let mut index = CorpusIndex::new();
    let mut done = 0u64;
    while let Some((key, data)) = result_rx.recv().await {
        done += 1;
        index.insert(key, data);
        progress.report(ProgressEvent::Completed {
            phase: "parsing",
            done,
            total,
        });
    }

    while let Some(joined) = pool.join_next().await {
        joined.context("ingest worker failed")??;
    }

    Ok(index)
}

/// Read and parse one dump file. Undecodable bytes never abort the file:
/// the content is decoded lossily. An unreadable file is an error.
fn parse_one(
    path: &Path,
    cutoff: Option<NaiveDateTime>,
    debug_mode: bool,
    diag: Diagnostics,
) -> Result<FileData> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read dump: {}", path.display()))?;
    let text = String::from_utf8_lossy(&bytes);
    let data = parser::parse_dump(&text, cutoff, debug_mode);
    diag.debug(format!(
        "{}: {} bot reports",
        path.display(),
        data.len()
    ));
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::fs;

    fn write_corpus(dir: &Path) {
        fs::write(
            dir.join("dump-a.txt"),
            "Bot ID: BOT_A\nReport time: 02.03.2014 10:00:00\nType: HTTPS request\nSource: https://secure.targetbank.com/login\n",
        )
        .unwrap();
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(
            dir.join("nested").join("dump-b.txt"),
            "Bot ID: BOT_B\nReport time: 03.03.2014 09:00:00\nIPv4: 10.0.0.2\n",
        )
        .unwrap();
        fs::write(dir.join("empty.txt"), "").unwrap();
    }

    fn test_config(root: &Path, concurrent: bool) -> Config {
        Config {
            data_path: root.to_path_buf(),
            concurrent,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn sequential_and_concurrent_agree() {
        let tmp = tempfile::tempdir().unwrap();
        write_corpus(tmp.path());

        let seq = build_index(
            &test_config(tmp.path(), false),
            None,
            &NoProgress,
            Diagnostics::default(),
        )
        .await
        .unwrap();
        let conc = build_index(
            &test_config(tmp.path(), true),
            None,
            &NoProgress,
            Diagnostics::default(),
        )
        .await
        .unwrap();

        assert_eq!(seq, conc);
        assert_eq!(seq.len(), 3);
    }

    #[tokio::test]
    async fn ingesting_twice_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        write_corpus(tmp.path());
        let config = test_config(tmp.path(), false);

        let first = build_index(&config, None, &NoProgress, Diagnostics::default())
            .await
            .unwrap();
        let second = build_index(&config, None, &NoProgress, Diagnostics::default())
            .await
            .unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn single_file_root_is_ingested() {
        let tmp = tempfile::tempdir().unwrap();
        write_corpus(tmp.path());
        let file = tmp.path().join("dump-a.txt");

        let index = build_index(
            &test_config(&file, false),
            None,
            &NoProgress,
            Diagnostics::default(),
        )
        .await
        .unwrap();
        assert_eq!(index.len(), 1);
        assert!(index[&file.display().to_string()].contains_key("BOT_A"));
    }

    #[tokio::test]
    async fn missing_root_is_an_error() {
        let result = build_index(
            &test_config(Path::new("/nonexistent/botsift-root"), false),
            None,
            &NoProgress,
            Diagnostics::default(),
        )
        .await;
        assert!(result.is_err());
    }

    #[test]
    fn enumeration_is_sorted_and_recursive() {
        let tmp = tempfile::tempdir().unwrap();
        write_corpus(tmp.path());

        let files = enumerate_dump_files(tmp.path()).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["dump-a.txt", "empty.txt", "nested/dump-b.txt"]);
    }
}
