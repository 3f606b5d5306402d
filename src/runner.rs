// src/runner.rs
use std::path::{Path, PathBuf};

use tracing::info;

use crate::{
    cache::RecordCache,
    config::{consts::KEY_COLUMNS, RunOptions},
    core::Fetch,
    csv::Delim,
    error::{Error, Result},
    file::{ensure_directory, remove_if_exists},
    links::{self, LinkSet},
    progress::Progress,
    scrape::{self, Harvest},
    specs,
    store::{self, Dataset},
};

/// Which branch a run took.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunMode {
    /// No historical file: everything listed was scraped into a fresh one.
    Bootstrap,
    /// `--rebuild`: everything listed was reassembled and merged into the
    /// historical file. Rows already there are kept as they are.
    Rebuild,
    /// New links were scraped and merged ahead of the historical rows.
    Incremental,
    /// Nothing new and the historical file exists; nothing was written.
    UpToDate,
}

/// Summary of what was produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub mode: RunMode,
    /// Rows assembled in this run.
    pub new_rows: usize,
    /// Rows in the historical file after the run.
    pub total_rows: usize,
    pub fetch_failures: usize,
    pub assemble_failures: usize,
    /// Historical file, when it was (re)written.
    pub written: Option<PathBuf>,
}

impl RunSummary {
    fn up_to_date(total_rows: usize) -> Self {
        Self {
            mode: RunMode::UpToDate,
            new_rows: 0,
            total_rows,
            fetch_failures: 0,
            assemble_failures: 0,
            written: None,
        }
    }
}

/// One full scrape for `opts.source`.
///
/// Order of effects: caches are flushed once scraping is done; the historical
/// file is replaced next; seen links are saved last, so a failure anywhere
/// before them leaves this run's links new for the next one.
///
/// Neither the historical rows nor the seen links ever shrink, rebuild
/// included.
pub fn run(opts: &RunOptions, net: &dyn Fetch, progress: Option<&mut dyn Progress>) -> Result<RunSummary> {
    let paths = opts.paths();
    ensure_directory(&paths.dir)?;
    let source = specs::for_kind(opts.source, &opts.events);
    let delim = opts.delim();

    let mut events = RecordCache::open(&paths.events_cache)?;
    let mut fights = RecordCache::open(&paths.fights_cache)?;
    let mut seen = LinkSet::load(&paths.seen_links)?;

    info!("Scraping links!");
    let all = scrape::collect_links(&*source, net, &mut events)?;
    let (new_links, all) = links::discover(all, &seen);
    let mode = if !paths.total_rows.exists() {
        RunMode::Bootstrap
    } else if opts.rebuild {
        RunMode::Rebuild
    } else if new_links.is_empty() {
        RunMode::UpToDate
    } else {
        RunMode::Incremental
    };

    if mode == RunMode::UpToDate {
        events.close()?;
        fights.close()?;
        let total = Dataset::read(&paths.total_rows, delim)?.map_or(0, |d| d.len());
        info!("No new fight data to scrape at the moment!");
        return Ok(RunSummary::up_to_date(total));
    }

    let todo = if mode == RunMode::Incremental { &new_links } else { &all };
    info!(events = todo.event_count(), fights = todo.fight_count(), ?mode, "Now, scraping event and fight data!");
    let harvest = scrape::collect_rows(&*source, net, &mut events, &mut fights, todo, progress);
    events.close()?;
    fights.close()?;

    let Harvest { records, processed, fetch_failures, assemble_failures } = harvest;
    let new_rows = records.len();
    let batch = Dataset::from_records(source.columns(), records);

    let total_rows = if mode == RunMode::Bootstrap {
        batch.write(&paths.total_rows, delim)?;
        new_rows
    } else {
        merge_into_total(&batch, &paths.new_rows, &paths.total_rows, delim)?
    };

    seen.absorb(&processed);
    seen.save(&paths.seen_links)?;
    info!(new_rows, total_rows, path = %paths.total_rows.display(), "Successfully scraped and saved fight data!");

    Ok(RunSummary {
        mode,
        new_rows,
        total_rows,
        fetch_failures,
        assemble_failures,
        written: Some(paths.total_rows),
    })
}

/// Transient file → read historical → merge → replace historical → drop
/// transient. A schema mismatch stops before the historical file is touched
/// and leaves the transient file for inspection.
fn merge_into_total(
    batch: &Dataset,
    new_path: &Path,
    total_path: &Path,
    delim: Delim,
) -> Result<usize> {
    batch.write(new_path, delim)?;

    let existing = Dataset::read(total_path, delim)?.ok_or_else(|| Error::Dataset {
        path: total_path.to_path_buf(),
        reason: s!("historical file disappeared during the run"),
    })?;
    let merged = store::merge(batch.clone(), existing, &KEY_COLUMNS)?;
    merged.write(total_path, delim)?;

    remove_if_exists(new_path)?;
    info!("Removed new event and fight files");
    Ok(merged.len())
}
