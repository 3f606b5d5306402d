// src/scrape.rs
//! The two passes over a source: enumerate links, then turn links into rows.
//!
//! Every remote read goes through a [`RecordCache`]. A resource that fails to
//! fetch is logged and skipped; the pass carries on with the next one.

use tracing::{info, warn};

use crate::assemble::FlatRecord;
use crate::cache::{RecordCache, ResourceId};
use crate::core::Fetch;
use crate::error::{Error, Result};
use crate::links::LinkSet;
use crate::progress::Progress;
use crate::specs::Source;

/// Every event the source lists, with the fights its (cached) record names.
///
/// Only the event index itself is fatal. An event whose record cannot be
/// fetched is left out, so the next run tries it again.
pub fn collect_links(source: &dyn Source, net: &dyn Fetch, events: &mut RecordCache) -> Result<LinkSet> {
    let listed = source.list_events(net).map_err(Error::Index)?;
    info!(source = source.kind().dir_name(), events = listed.len(), "enumerating events");

    let mut all = LinkSet::new();
    let mut failed = 0usize;
    for event in &listed {
        let id = ResourceId::event(event);
        let record = match events.get_or_fetch(&id, || source.fetch_event(net, event)) {
            Ok(r) => r,
            Err(e) => {
                warn!(%id, "event skipped: {e}");
                failed += 1;
                continue;
            }
        };

        all.insert_event(event);
        match source.fight_links(record) {
            Ok(fights) => {
                for fight in &fights {
                    all.record(event, fight);
                }
            }
            Err(e) => warn!(%id, "event record has no usable fight list: {e}"),
        }
    }

    info!(events = all.event_count(), fights = all.fight_count(), failed, "links collected");
    Ok(all)
}

/// Rows produced from one pass, plus the links that pass may mark seen.
#[derive(Debug, Default)]
pub struct Harvest {
    pub records: Vec<FlatRecord>,
    /// Fights that either produced a row or failed on a cached payload.
    /// Fights whose fetch failed are absent and stay new.
    pub processed: LinkSet,
    pub fetch_failures: usize,
    pub assemble_failures: usize,
}

/// Fetch (or reuse) every fight in `links` and assemble its row.
pub fn collect_rows(
    source: &dyn Source,
    net: &dyn Fetch,
    events: &mut RecordCache,
    fights: &mut RecordCache,
    links: &LinkSet,
    mut progress: Option<&mut dyn Progress>,
) -> Harvest {
    let mut out = Harvest::default();
    if let Some(p) = progress.as_deref_mut() {
        p.begin(links.event_count());
    }

    for (event, fight_links) in links.events() {
        let event_id = ResourceId::event(event);
        let event_record = match events.get_or_fetch(&event_id, || source.fetch_event(net, event)) {
            Ok(r) => r,
            Err(e) => {
                warn!(id = %event_id, "event skipped: {e}");
                out.fetch_failures += fight_links.len();
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(event);
                }
                continue;
            }
        };
        out.processed.insert_event(event);

        for fight in fight_links {
            let id = ResourceId::fight(event, fight);
            let record = match fights.get_or_fetch(&id, || source.fetch_fight(net, event, fight)) {
                Ok(r) => r,
                Err(e) => {
                    warn!(%id, "fight skipped: {e}");
                    out.fetch_failures += 1;
                    continue;
                }
            };

            out.processed.record(event, fight);
            match source.assemble(event_record, fight, record) {
                Ok(row) => out.records.push(row),
                Err(e) => {
                    warn!(%id, "fight not assembled: {e}");
                    out.assemble_failures += 1;
                }
            }
        }

        if let Some(p) = progress.as_deref_mut() {
            p.item_done(event);
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    info!(
        rows = out.records.len(),
        fetch_failures = out.fetch_failures,
        assemble_failures = out.assemble_failures,
        "fight data scraped"
    );
    out
}
