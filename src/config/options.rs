// src/config/options.rs
use std::path::{Path, PathBuf};

use super::consts::*;
use crate::csv::Delim;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SourceKind {
    /// FightMetric live JSON feed
    Fightmetric,
    /// ufcstats.com HTML pages
    Ufcstats,
}

impl SourceKind {
    /// Subdirectory of the data dir holding this source's state.
    pub fn dir_name(&self) -> &'static str {
        match self {
            SourceKind::Fightmetric => "fightmetric",
            SourceKind::Ufcstats => "ufcstats",
        }
    }

    pub fn default_delim(&self) -> Delim {
        match self {
            SourceKind::Fightmetric => Delim::Comma,
            SourceKind::Ufcstats => Delim::Semicolon,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub source: SourceKind,
    pub data_dir: PathBuf,
    /// FightMetric event ids to enumerate. Ignored by ufcstats.
    pub events: Vec<u32>,
    /// Reassemble everything listed, not just new links, and merge it in.
    pub rebuild: bool,
    /// None → the source's default.
    pub delim: Option<Delim>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            source: SourceKind::Fightmetric,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            events: (FIGHTMETRIC_FIRST_EVENT..=FIGHTMETRIC_LAST_EVENT).collect(),
            rebuild: false,
            delim: None,
        }
    }
}

impl RunOptions {
    pub fn delim(&self) -> Delim {
        self.delim.unwrap_or_else(|| self.source.default_delim())
    }

    pub fn paths(&self) -> Paths {
        Paths::under(&self.data_dir.join(self.source.dir_name()))
    }
}

/// Every durable file one source touches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Paths {
    pub dir: PathBuf,
    pub events_cache: PathBuf,
    pub fights_cache: PathBuf,
    pub seen_links: PathBuf,
    /// Transient batch of rows from this run; removed once merged.
    pub new_rows: PathBuf,
    /// Canonical historical dataset.
    pub total_rows: PathBuf,
}

impl Paths {
    pub fn under(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            events_cache: dir.join(EVENTS_CACHE_FILE),
            fights_cache: dir.join(FIGHTS_CACHE_FILE),
            seen_links: dir.join(SEEN_LINKS_FILE),
            new_rows: dir.join(NEW_ROWS_FILE),
            total_rows: dir.join(TOTAL_ROWS_FILE),
        }
    }
}
