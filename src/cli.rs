// src/cli.rs
use std::path::PathBuf;

use clap::Parser;

use crate::config::consts::{DATA_DIR_ENV, DEFAULT_DATA_DIR};
use crate::config::{RunOptions, SourceKind};
use crate::core::Fetch;
use crate::csv::Delim;
use crate::error::Result;
use crate::progress::{ConsoleProgress, Progress};
use crate::runner::{self, RunSummary};

/// Incrementally scrape MMA fight statistics into one CSV dataset per source.
#[derive(Debug, Parser)]
#[command(name = "ufc_scrape", version)]
pub struct Cli {
    /// Where fights are read from.
    #[arg(long, value_enum, default_value = "fightmetric")]
    pub source: SourceKind,

    /// Root of caches, link snapshots and datasets.
    #[arg(long, env = DATA_DIR_ENV, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// FightMetric event ids, e.g. `900-1004,1010`.
    #[arg(long, value_parser = parse_event_list)]
    pub events: Option<EventList>,

    /// Reassemble every listed fight, not just new ones, and merge them in.
    #[arg(long)]
    pub rebuild: bool,

    /// Field separator for both CSV files [default: per source].
    #[arg(long, value_enum)]
    pub delimiter: Option<Delim>,

    /// Also append log lines to this file.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// No progress bar.
    #[arg(long, short)]
    pub quiet: bool,
}

/// Sorted, deduplicated event ids.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EventList(pub Vec<u32>);

impl Cli {
    pub fn options(&self) -> RunOptions {
        let mut opts = RunOptions {
            source: self.source,
            data_dir: self.data_dir.clone(),
            rebuild: self.rebuild,
            delim: self.delimiter,
            ..RunOptions::default()
        };
        if let Some(EventList(ids)) = &self.events {
            opts.events = ids.clone();
        }
        opts
    }
}

pub fn run(cli: &Cli, net: &dyn Fetch) -> Result<RunSummary> {
    let opts = cli.options();
    let mut bar = ConsoleProgress::new();
    let progress: Option<&mut dyn Progress> = if cli.quiet { None } else { Some(&mut bar) };
    runner::run(&opts, net, progress)
}

/// `"900-902,1010"` → `[900, 901, 902, 1010]`. Ranges are inclusive.
fn parse_event_list(s: &str) -> Result<EventList, String> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if part.is_empty() { continue; }
        if let Some((a, b)) = part.split_once('-') {
            let a: u32 = a.trim().parse().map_err(|e| format!("{part}: {e}"))?;
            let b: u32 = b.trim().parse().map_err(|e| format!("{part}: {e}"))?;
            if a > b { return Err(format!("Invalid range: {part}")); }
            out.extend(a..=b);
        } else {
            out.push(part.parse().map_err(|e| format!("{part}: {e}"))?);
        }
    }
    if out.is_empty() { return Err(s!("no event ids given")); }
    out.sort_unstable();
    out.dedup();
    Ok(EventList(out))
}
