//! # botsift
//!
//! Parse, search, and summarize botnet check-in log dumps.
//!
//! botsift ingests collections of semi-structured text dumps produced by
//! compromised-host check-ins, normalizes them into an in-memory index,
//! and answers two kinds of questions over that index: substring searches
//! across observed request lines, and aggregate statistics (bot counts,
//! credential sightings, observed IPs, target-domain tallies, payment-card
//! sighting counts). Parsed indexes are cached on disk keyed by data root
//! and time cutoff, so repeated runs against an unchanged corpus skip
//! re-parsing.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌───────────────┐   ┌───────────┐
//! │ dump files │──▶│   Ingestion    │──▶│ in-memory │
//! │ (dir walk) │   │ (worker pool)  │   │   index   │
//! └────────────┘   └───────────────┘   └─────┬─────┘
//!                        ▲                   │
//!                  ┌─────┴─────┐       ┌─────▼─────┐
//!                  │   cache   │◀──────│   query   │
//!                  │  (JSON)   │       │search/stat│
//!                  └───────────┘       └─────┬─────┘
//!                                            ▼
//!                                      output files
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with CLI overrides |
//! | [`models`] | Core data types and the index |
//! | [`parser`] | Dump text → per-bot check-in records |
//! | [`ingest`] | Corpus enumeration, sequential/concurrent ingestion |
//! | [`cache`] | Path+cutoff-keyed index snapshots on disk |
//! | [`query`] | Term search and aggregate statistics |
//! | [`domain`] | Registrable-domain extraction for the tally |
//! | [`output`] | Dated result and statistics files |
//! | [`progress`] | Injected progress reporting and diagnostics |

pub mod cache;
pub mod config;
pub mod domain;
pub mod ingest;
pub mod models;
pub mod output;
pub mod parser;
pub mod progress;
pub mod query;
