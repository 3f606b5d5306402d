// src/specs/mod.rs
//! # Source "specs"
//!
//! Each spec knows how to read one remote source: where its events are
//! listed, how an event or fight body becomes a structured record, and how
//! those records flatten into the source's fixed column list.
//!
//! ## What lives here
//! - **Payload reading**: JSON feeds decoded into typed serde structs
//!   (`fightmetric`) or HTML pages reduced to small JSON records (`ufcstats`).
//! - **Column lists**: one fixed, ordered schema per source.
//! - **Corner normalization** into `R_` / `B_` prefixes via [`crate::assemble`].
//!
//! ## What does **not** live here
//! - **Caching**: records pass through [`crate::cache::RecordCache`] in
//!   `scrape`; specs never see the cache.
//! - **Link bookkeeping and merging**: `links` and `store`.
//!
//! ## Typical call chain
//! ```text
//! runner → scrape::collect_links → Source::list_events / fetch_event / fight_links
//!        → scrape::collect_rows  → Source::fetch_fight / assemble
//! ```
//!
//! A fetch that returns a body of the wrong shape is a `FetchError`, so it is
//! never cached. Once a record is cached, any later shape problem is an
//! `AssembleError` for that one fight.
use serde_json::Value;

use crate::assemble::FlatRecord;
use crate::config::SourceKind;
use crate::core::Fetch;
use crate::error::{AssembleError, FetchError};

pub mod fightmetric;
pub mod ufcstats;

pub use fightmetric::FightMetric;
pub use ufcstats::UfcStats;

pub trait Source {
    fn kind(&self) -> SourceKind;

    /// Fixed output schema, in column order.
    fn columns(&self) -> &'static [&'static str];

    /// Every event link currently published, newest first, so a batch is
    /// already in the order the historical file keeps.
    fn list_events(&self, net: &dyn Fetch) -> Result<Vec<String>, FetchError>;

    /// One request for the event resource, parsed into its record.
    fn fetch_event(&self, net: &dyn Fetch, event: &str) -> Result<Value, FetchError>;

    /// Fight links listed in a cached event record.
    fn fight_links(&self, event: &Value) -> Result<Vec<String>, AssembleError>;

    /// One request for the fight resource, parsed into its record.
    fn fetch_fight(&self, net: &dyn Fetch, event: &str, fight: &str) -> Result<Value, FetchError>;

    /// Flatten one fight into a row.
    fn assemble(&self, event: &Value, fight: &str, record: &Value) -> Result<FlatRecord, AssembleError>;
}

/// Boxed source for a CLI choice.
pub fn for_kind(kind: SourceKind, fightmetric_events: &[u32]) -> Box<dyn Source> {
    match kind {
        SourceKind::Fightmetric => Box::new(FightMetric::new(fightmetric_events.to_vec())),
        SourceKind::Ufcstats => Box::new(UfcStats::new()),
    }
}

/// Fetch `url` and decode it as JSON; undecodable bodies are malformed.
pub(crate) fn get_json(net: &dyn Fetch, url: &str) -> Result<Value, FetchError> {
    let body = net.get(url)?;
    serde_json::from_str(&body).map_err(|e| FetchError::malformed(url, e))
}
