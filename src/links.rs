// src/links.rs
//! Event → fight link bookkeeping and the new-vs-seen diff.

use std::path::Path;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::file;

/// Ordered event link → ordered fight links.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkSet {
    events: IndexMap<String, IndexSet<String>>,
}

impl LinkSet {
    pub fn new() -> Self { Self::default() }

    /// Make sure `event` is present, even with no fights.
    pub fn insert_event(&mut self, event: &str) {
        if !self.events.contains_key(event) {
            self.events.insert(s!(event), IndexSet::new());
        }
    }

    pub fn record(&mut self, event: &str, fight: &str) {
        self.insert_event(event);
        if let Some(fights) = self.events.get_mut(event) {
            fights.insert(s!(fight));
        }
    }

    /// Union `other` into `self`. Never removes anything.
    pub fn absorb(&mut self, other: &LinkSet) {
        for (event, fights) in &other.events {
            self.insert_event(event);
            for fight in fights {
                self.record(event, fight);
            }
        }
    }

    pub fn contains_event(&self, event: &str) -> bool {
        self.events.contains_key(event)
    }

    pub fn contains_fight(&self, event: &str, fight: &str) -> bool {
        self.events.get(event).is_some_and(|f| f.contains(fight))
    }

    /// `(event, fights)` in insertion order.
    pub fn events(&self) -> impl Iterator<Item = (&str, Vec<&str>)> {
        self.events
            .iter()
            .map(|(e, f)| (e.as_str(), f.iter().map(String::as_str).collect()))
    }

    pub fn fights(&self, event: &str) -> Vec<&str> {
        self.events
            .get(event)
            .map(|f| f.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    pub fn event_count(&self) -> usize { self.events.len() }

    pub fn fight_count(&self) -> usize {
        self.events.values().map(IndexSet::len).sum()
    }

    pub fn is_empty(&self) -> bool { self.events.is_empty() }

    /// Missing file → empty set (first run).
    pub fn load(path: &Path) -> Result<Self> {
        match file::read_lossy(path)? {
            Some(text) => serde_json::from_str(&text)
                .map_err(|source| Error::Snapshot { path: path.to_path_buf(), source }),
            None => Ok(Self::new()),
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        file::write_atomic(path, |w| {
            serde_json::to_writer_pretty(&mut *w, self).map_err(std::io::Error::from)
        })
    }
}

/// Split `all` into what `seen` has not covered yet.
///
/// Fight granularity: an event whose key is unseen comes back whole; a seen
/// event comes back only with its unseen fights, and not at all when every
/// fight is seen. Order follows `all`. `all` is handed back unchanged for
/// callers that need the full set (bootstrap).
pub fn discover(all: LinkSet, seen: &LinkSet) -> (LinkSet, LinkSet) {
    let mut new_links = LinkSet::new();

    for (event, fights) in &all.events {
        if !seen.contains_event(event) {
            new_links.events.insert(event.clone(), fights.clone());
            continue;
        }
        let unseen: IndexSet<String> = fights
            .iter()
            .filter(|f| !seen.contains_fight(event, f))
            .cloned()
            .collect();
        if !unseen.is_empty() {
            new_links.events.insert(event.clone(), unseen);
        }
    }

    (new_links, all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(pairs: &[(&str, &[&str])]) -> LinkSet {
        let mut s = LinkSet::new();
        for (e, fights) in pairs {
            s.insert_event(e);
            for f in *fights { s.record(e, f); }
        }
        s
    }

    #[test]
    fn partially_seen_event_keeps_only_new_fights() {
        let all = set(&[("E1", &["F1", "F2"]), ("E2", &["F3"])]);
        let seen = set(&[("E1", &["F1"])]);

        let (new_links, all_back) = discover(all.clone(), &seen);

        assert_eq!(new_links, set(&[("E1", &["F2"]), ("E2", &["F3"])]));
        assert_eq!(all_back, all);
    }

    #[test]
    fn nothing_seen_returns_everything() {
        let all = set(&[("E2", &["F3"]), ("E1", &["F1", "F2"]), ("E0", &[])]);
        let (new_links, _) = discover(all.clone(), &LinkSet::new());
        assert_eq!(new_links, all);
        let order: Vec<_> = new_links.events().map(|(e, _)| e).collect();
        assert_eq!(order, ["E2", "E1", "E0"]);
    }

    #[test]
    fn fully_seen_is_empty() {
        let all = set(&[("E1", &["F1"]), ("E2", &[])]);
        let (new_links, _) = discover(all.clone(), &all);
        assert!(new_links.is_empty());
    }

    #[test]
    fn diff_is_set_difference_in_all_order() {
        let all = set(&[("A", &["1", "2", "3"]), ("B", &["4"]), ("C", &["5", "6"])]);
        let seen = set(&[("A", &["2"]), ("C", &["5", "6"])]);
        let (new_links, _) = discover(all, &seen);
        let flat: Vec<_> = new_links
            .events()
            .flat_map(|(e, f)| f.into_iter().map(move |f| join!(e, "/", f)))
            .collect();
        assert_eq!(flat, ["A/1", "A/3", "B/4"]);
    }

    #[test]
    fn absorb_only_grows() {
        let mut seen = set(&[("E1", &["F1"])]);
        seen.absorb(&set(&[("E1", &["F2"]), ("E2", &[])]));
        assert_eq!(seen, set(&[("E1", &["F1", "F2"]), ("E2", &[])]));
        assert_eq!(seen.fight_count(), 2);
        assert_eq!(seen.event_count(), 2);
    }

    #[test]
    fn snapshot_round_trip_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("seen.json");
        let s = set(&[("z", &["3", "1"]), ("a", &["2"])]);
        s.save(&p).unwrap();
        assert_eq!(LinkSet::load(&p).unwrap(), s);
        assert!(LinkSet::load(&dir.path().join("none.json")).unwrap().is_empty());
    }
}
