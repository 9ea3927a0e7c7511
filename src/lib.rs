//! News-article ETL pipeline.
//!
//! `warta` ingests article metadata from heterogeneous remote sources (an
//! HTML-indexed site and several RSS/Atom feeds), normalizes locale-mixed
//! publication timestamps into canonical naive ISO-8601 values, deduplicates
//! by canonical URL, and idempotently persists new articles into SQLite
//! keyed by URL uniqueness.
//!
//! # Architecture
//!
//! One run flows through four stages, each passing typed values to the next:
//!
//! 1. [`pipeline::extract_all`] - every configured [`source`] adapter runs
//!    to completion, merging candidates
//! 2. [`dedup::dedup_by_url`] - stable first-seen dedup across the batch
//! 3. [`normalize::normalize_all`] - total date normalization with a
//!    current-time fallback
//! 4. [`storage::Database::insert_articles`] - insert-if-absent load
//!
//! Failures are contained at the smallest possible scope (per page, per
//! entry, per row); nothing escalates to abort the run except total input
//! absence.

pub mod config;
pub mod dedup;
pub mod export;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod source;
pub mod storage;
