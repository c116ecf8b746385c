//! # wikidex
//!
//! An offline encyclopedia: download a Wikipedia dump once, index it into
//! SQLite FTS5, and answer questions against it without a network.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │  Dump fetch  │──▶│    Parse     │──▶│  SQLite    │
//! │  gzip dumps  │   │ JSON / XML   │   │ FTS5       │
//! └──────────────┘   └──────────────┘   └────┬──────┘
//!                                            │
//!                        ┌───────────────────┤
//!                        ▼                   ▼
//!                  ┌───────────┐      ┌────────────┐
//!                  │  Search   │      │  Context + │
//!                  │  engine   │─────▶│  generator │
//!                  └───────────┘      └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! wdx init                               # create database
//! wdx datasets                           # list downloadable dumps
//! wdx ingest minimal                     # download and index a dump
//! wdx search "What is photosynthesis?"
//! wdx ask "What is photosynthesis?"      # search + generated answer
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types |
//! | [`datasets`] | Downloadable dump registry |
//! | [`download`] | Dump fetch and gzip decompression |
//! | [`parse`] | JSON-lines and XML abstract dump parsers |
//! | [`ingest`] | The ingestion pipeline |
//! | [`store`] | SQLite article store and FTS5 queries |
//! | [`planner`] | Keyword extraction and query expansion |
//! | [`engine`] | Multi-query search, fusion, and review |
//! | [`context`] | Context assembly for answer generation |
//! | [`generator`] | Optional text-generation backends |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema setup |

pub mod ask;
pub mod config;
pub mod context;
pub mod datasets;
pub mod db;
pub mod download;
pub mod engine;
pub mod generator;
pub mod get;
pub mod ingest;
pub mod migrate;
pub mod models;
pub mod parse;
pub mod planner;
pub mod progress;
pub mod search;
pub mod stats;
pub mod store;
