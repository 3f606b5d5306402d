// src/cache.rs
//! Durable ResourceID → record cache.
//!
//! Loaded wholesale when opened, flushed wholesale when dropped. A record is
//! written once per id and never replaced, so anything present here is never
//! fetched again. Fetch failures leave no trace and are retried next run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use serde_json::Value;
use tracing::{debug, error};

use crate::core::sanitize::link_id;
use crate::error::{Error, Result};
use crate::file;

/// Opaque key of one fetchable resource.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ResourceId(String);

impl ResourceId {
    pub fn event(event_link: &str) -> Self {
        Self(s!(link_id(event_link)))
    }

    /// Composite `"{event}_{fight}"`.
    pub fn fight(event_link: &str, fight_link: &str) -> Self {
        Self(join!(link_id(event_link), "_", link_id(fight_link)))
    }

    pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

pub struct RecordCache {
    path: PathBuf,
    entries: BTreeMap<String, Value>,
    dirty: bool,
}

impl RecordCache {
    /// Load the snapshot at `path`; a missing file is an empty cache.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = match file::read_lossy(&path)? {
            Some(text) => serde_json::from_str(&text)
                .map_err(|source| Error::Snapshot { path: path.clone(), source })?,
            None => BTreeMap::new(),
        };
        debug!(path = %path.display(), entries = entries.len(), "cache loaded");
        Ok(Self { path, entries, dirty: false })
    }

    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.entries.contains_key(id.as_str())
    }

    pub fn get(&self, id: &ResourceId) -> Option<&Value> {
        self.entries.get(id.as_str())
    }

    /// Cached record for `id`, or the result of `fetch` stored under `id`.
    /// A failed fetch is handed back untouched and nothing is stored.
    pub fn get_or_fetch<E, F>(&mut self, id: &ResourceId, fetch: F) -> Result<&Value, E>
    where
        F: FnOnce() -> Result<Value, E>,
    {
        if self.entries.contains_key(id.as_str()) {
            debug!(%id, "cache hit");
        } else {
            let record = fetch()?;
            self.entries.insert(s!(id.as_str()), record);
            self.dirty = true;
        }
        Ok(&self.entries[id.as_str()])
    }

    /// Overwrite the snapshot if anything was added since the last flush.
    pub fn flush(&mut self) -> Result<()> {
        if !self.dirty { return Ok(()); }
        file::write_atomic(&self.path, |w| {
            serde_json::to_writer(&mut *w, &self.entries).map_err(std::io::Error::from)
        })?;
        self.dirty = false;
        debug!(path = %self.path.display(), entries = self.entries.len(), "cache flushed");
        Ok(())
    }

    /// Flush and release, surfacing any write error.
    pub fn close(mut self) -> Result<()> {
        self.flush()
    }
}

impl Drop for RecordCache {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            error!("cache flush failed: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_ids_use_link_ids() {
        assert_eq!(ResourceId::event("901").as_str(), "901");
        assert_eq!(ResourceId::fight("901", "7").as_str(), "901_7");
        assert_eq!(
            ResourceId::fight("http://ufcstats.com/event-details/e1", "http://ufcstats.com/fight-details/f9").as_str(),
            "e1_f9"
        );
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = RecordCache::open(dir.path().join("c.json")).unwrap();
        let id = ResourceId::event("901");
        let mut calls = 0;

        for _ in 0..2 {
            let v = cache
                .get_or_fetch(&id, || { calls += 1; Ok::<_, ()>(json!({"n": 1})) })
                .unwrap();
            assert_eq!(v["n"], 1);
        }
        assert_eq!(calls, 1);
    }

    #[test]
    fn failure_is_not_stored() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = RecordCache::open(dir.path().join("c.json")).unwrap();
        let id = ResourceId::event("404");

        let r = cache.get_or_fetch(&id, || Err::<Value, _>("gone"));
        assert_eq!(r.err(), Some("gone"));
        assert!(!cache.contains(&id));
        assert!(cache.is_empty());
    }

    #[test]
    fn first_record_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut cache = RecordCache::open(dir.path().join("c.json")).unwrap();
        let id = ResourceId::event("1");
        cache.get_or_fetch(&id, || Ok::<_, ()>(json!("first"))).unwrap();
        let v = cache.get_or_fetch(&id, || Ok::<_, ()>(json!("second"))).unwrap();
        assert_eq!(v, &json!("first"));
    }

    #[test]
    fn drop_flushes_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        {
            let mut cache = RecordCache::open(&path).unwrap();
            cache.get_or_fetch(&ResourceId::event("1"), || Ok::<_, ()>(json!({"a": [1, 2]}))).unwrap();
        }
        let reopened = RecordCache::open(&path).unwrap();
        assert_eq!(reopened.get(&ResourceId::event("1")), Some(&json!({"a": [1, 2]})));
    }

    #[test]
    fn clean_cache_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        RecordCache::open(&path).unwrap().close().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_snapshot_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(RecordCache::open(&path), Err(Error::Snapshot { .. })));
    }
}
