//! Result formatter: serializes query output to dated files.
//!
//! Search results land in one directory per term; statistics land in a
//! `stats/` directory with one file per category. Filenames carry the
//! current date, and a `_DEBUG` suffix when debug mode is on so exports
//! containing raw block text are obvious at a glance.

use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

use crate::models::DATE_FORMAT;
use crate::query::{SearchResults, Stats};

/// Write per-term search result files. Returns the output directory.
pub fn write_search_results(
    output_dir: &Path,
    results: &SearchResults,
    json_output: bool,
    debug_mode: bool,
) -> Result<PathBuf> {
    let current_date = Local::now().format(DATE_FORMAT).to_string();

    for (term, files) in results {
        let dir_path = output_dir.join(term);
        std::fs::create_dir_all(&dir_path)
            .with_context(|| format!("failed to create {}", dir_path.display()))?;

        let file_name = if debug_mode {
            format!("{}_{}_DEBUG.txt", current_date, term)
        } else {
            format!("{}_{}.txt", current_date, term)
        };
        let output_path = dir_path.join(file_name);

        let content = if json_output {
            serde_json::to_string_pretty(files)?
        } else {
            let mut out = String::new();
            for (report_file, matches) in files {
                // Dump filenames encode the C2 URL with dashes for slashes.
                let c2 = Path::new(report_file)
                    .file_name()
                    .map(|n| n.to_string_lossy().replace('-', "/"))
                    .unwrap_or_else(|| report_file.clone());
                let heart_beats = serde_json::to_string_pretty(&matches.heart_beats)?;
                out.push_str(&format!(
                    "C2: {}\tIP Addresses: {:?}\tUser IDs: {:?}\nHeartbeats: {}\n",
                    c2, matches.ip_addresses, matches.user_ids, heart_beats
                ));
            }
            out
        };

        std::fs::write(&output_path, content)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
    }

    Ok(output_dir.to_path_buf())
}

/// Write one JSON file per statistic category under `<output_dir>/stats/`.
pub fn write_stats(output_dir: &Path, stats: &Stats) -> Result<PathBuf> {
    let current_date = Local::now().format(DATE_FORMAT).to_string();

    let stats_dir = output_dir.join("stats");
    std::fs::create_dir_all(&stats_dir)
        .with_context(|| format!("failed to create {}", stats_dir.display()))?;

    let categories: [(&str, serde_json::Value); 5] = [
        ("summary", serde_json::to_value(&stats.summary)?),
        ("ips", serde_json::to_value(&stats.ips)?),
        ("all_bots", serde_json::to_value(&stats.all_bots)?),
        ("email_records", serde_json::to_value(&stats.email_records)?),
        ("domain_records", serde_json::to_value(&stats.domain_records)?),
    ];

    for (category, value) in categories {
        let output_path = stats_dir.join(format!("{}_{}.txt", current_date, category));
        std::fs::write(&output_path, serde_json::to_string_pretty(&value)?)
            .with_context(|| format!("failed to write {}", output_path.display()))?;
    }

    Ok(stats_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CorpusIndex;
    use crate::parser::parse_dump;
    use crate::progress::NoProgress;
    use crate::query;

    fn sample_results() -> (SearchResults, Stats) {
        let text = "\
Bot ID: BOT_1
Type: HTTPS request
Source: https://secure.targetbank.com/login
IPv4: 10.0.0.1
";
        let mut index = CorpusIndex::new();
        index.insert("/data/c2-host-a".to_string(), parse_dump(text, None, false));
        let results =
            query::search_source_lines(&index, &["targetbank".to_string()], &NoProgress);
        let stats = query::collect_stats(&index, &NoProgress);
        (results, stats)
    }

    #[test]
    fn search_output_writes_one_dir_per_term() {
        let tmp = tempfile::tempdir().unwrap();
        let (results, _) = sample_results();

        write_search_results(tmp.path(), &results, false, false).unwrap();

        let term_dir = tmp.path().join("targetbank");
        let entries: Vec<_> = std::fs::read_dir(&term_dir).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let content =
            std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        // The dump filename's dashes read back as slashes in the report.
        assert!(content.contains("C2: c2/host/a"));
        assert!(content.contains("10.0.0.1"));
    }

    #[test]
    fn json_output_is_parseable() {
        let tmp = tempfile::tempdir().unwrap();
        let (results, _) = sample_results();

        write_search_results(tmp.path(), &results, true, false).unwrap();

        let term_dir = tmp.path().join("targetbank");
        let entry = std::fs::read_dir(&term_dir).unwrap().next().unwrap().unwrap();
        let content = std::fs::read_to_string(entry.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&content).unwrap();
        assert!(value.get("/data/c2-host-a").is_some());
    }

    #[test]
    fn debug_mode_marks_filenames() {
        let tmp = tempfile::tempdir().unwrap();
        let (results, _) = sample_results();

        write_search_results(tmp.path(), &results, false, true).unwrap();

        let term_dir = tmp.path().join("targetbank");
        let entry = std::fs::read_dir(&term_dir).unwrap().next().unwrap().unwrap();
        assert!(entry
            .file_name()
            .to_string_lossy()
            .ends_with("_DEBUG.txt"));
    }

    #[test]
    fn stats_output_writes_one_file_per_category() {
        let tmp = tempfile::tempdir().unwrap();
        let (_, stats) = sample_results();

        let stats_dir = write_stats(tmp.path(), &stats).unwrap();

        let names: Vec<String> = std::fs::read_dir(&stats_dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names.len(), 5);
        for category in ["summary", "ips", "all_bots", "email_records", "domain_records"] {
            assert!(
                names.iter().any(|n| n.contains(category)),
                "missing {} in {:?}",
                category,
                names
            );
        }
    }
}
