// src/store.rs
use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::warn;

use crate::assemble::FlatRecord;
use crate::csv::{self, parse_rows, Delim};
use crate::error::{Error, Result, SchemaMismatch};
use crate::file;

/// Header + rows, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Dataset {
    pub fn new(headers: Vec<String>) -> Self {
        Self { headers, rows: Vec::new() }
    }

    pub fn from_records(columns: &[&str], records: Vec<FlatRecord>) -> Self {
        Self {
            headers: columns.iter().map(|c| s!(*c)).collect(),
            rows: records.into_iter().map(FlatRecord::into_row).collect(),
        }
    }

    pub fn len(&self) -> usize { self.rows.len() }
    pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// `Ok(None)` when the file does not exist. First row is the header.
    pub fn read(path: &Path, delim: Delim) -> Result<Option<Self>> {
        let Some(text) = file::read_lossy(path)? else { return Ok(None) };
        let mut rows = parse_rows(&text, delim.sep()).into_iter();
        let headers = rows.next().ok_or_else(|| Error::Dataset {
            path: path.to_path_buf(),
            reason: s!("file has no header row"),
        })?;

        let rows: Vec<Vec<String>> = rows.collect();
        if let Some((i, bad)) = rows.iter().enumerate().find(|(_, r)| r.len() != headers.len()) {
            return Err(Error::Dataset {
                path: path.to_path_buf(),
                reason: format!("row {} has {} cells, header has {}", i + 1, bad.len(), headers.len()),
            });
        }
        Ok(Some(Self { headers, rows }))
    }

    /// Replace `path` atomically.
    pub fn write(&self, path: &Path, delim: Delim) -> Result<()> {
        let sep = delim.sep();
        file::write_atomic(path, |w| {
            csv::write_row(&mut *w, &self.headers, sep)?;
            for row in &self.rows {
                csv::write_row(&mut *w, row, sep)?;
            }
            Ok(())
        })
    }
}

/// Put `new` ahead of `existing` (newest first).
///
/// Column sets must be identical; `new` is reordered to `existing`'s order.
/// When every `key` column exists, a new row whose key is already in
/// `existing`, or earlier in `new`, is dropped. Existing rows are never
/// touched.
pub fn merge(new: Dataset, existing: Dataset, key: &[&str]) -> Result<Dataset, SchemaMismatch> {
    check_schema(&new.headers, &existing.headers)?;

    // new column index for each existing column
    let order: Vec<usize> = existing
        .headers
        .iter()
        .filter_map(|h| new.headers.iter().position(|n| n == h))
        .collect();

    let key_ix: Option<Vec<usize>> = key.iter().map(|k| existing.column_index(k)).collect();
    let mut seen: HashSet<Vec<String>> = match &key_ix {
        Some(ix) => existing.rows.iter().map(|r| project(r, ix)).collect(),
        None => HashSet::new(),
    };

    let mut rows = Vec::with_capacity(new.rows.len() + existing.rows.len());
    let mut dropped = 0usize;
    for row in new.rows {
        let aligned: Vec<String> = order.iter().map(|&i| row[i].clone()).collect();
        if let Some(ix) = &key_ix {
            if !seen.insert(project(&aligned, ix)) {
                dropped += 1;
                continue;
            }
        }
        rows.push(aligned);
    }
    if dropped > 0 {
        warn!(dropped, "merge skipped rows already present in the historical dataset");
    }

    rows.extend(existing.rows);
    Ok(Dataset { headers: existing.headers, rows })
}

fn project(row: &[String], ix: &[usize]) -> Vec<String> {
    ix.iter().map(|&i| row[i].clone()).collect()
}

fn counts(cols: &[String]) -> HashMap<&str, usize> {
    let mut m: HashMap<&str, usize> = HashMap::new();
    for c in cols { *m.entry(c.as_str()).or_default() += 1; }
    m
}

fn check_schema(new: &[String], existing: &[String]) -> Result<(), SchemaMismatch> {
    let new_c = counts(new);
    let old_c = counts(existing);

    let missing: Vec<String> = existing.iter().filter(|c| !new_c.contains_key(c.as_str())).cloned().collect();
    let unexpected: Vec<String> = new.iter().filter(|c| !old_c.contains_key(c.as_str())).cloned().collect();
    let mut duplicated: Vec<String> = new_c
        .iter()
        .chain(old_c.iter())
        .filter(|(_, n)| **n > 1)
        .map(|(c, _)| s!(*c))
        .collect();
    duplicated.sort();
    duplicated.dedup();

    if missing.is_empty() && unexpected.is_empty() && duplicated.is_empty() {
        Ok(())
    } else {
        Err(SchemaMismatch { missing, unexpected, duplicated })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ds(headers: &[&str], rows: &[&[&str]]) -> Dataset {
        Dataset {
            headers: headers.iter().map(|h| s!(*h)).collect(),
            rows: rows.iter().map(|r| r.iter().map(|c| s!(*c)).collect()).collect(),
        }
    }

    const KEY: &[&str] = &["event_id", "fight_id"];

    #[test]
    fn new_rows_go_first_in_existing_column_order() {
        let existing = ds(&["event_id", "fight_id", "w"], &[&["1", "1", "a"]]);
        let new = ds(&["w", "fight_id", "event_id"], &[&["b", "2", "1"]]);

        let merged = merge(new, existing, KEY).unwrap();
        assert_eq!(merged, ds(&["event_id", "fight_id", "w"], &[&["1", "2", "b"], &["1", "1", "a"]]));
    }

    #[test]
    fn extra_column_is_rejected() {
        let existing = ds(&["A", "B"], &[]);
        let new = ds(&["A", "B", "C"], &[]);
        let err = merge(new, existing, KEY).unwrap_err();
        assert_eq!(err.unexpected, ["C"]);
        assert!(err.missing.is_empty());
    }

    #[test]
    fn missing_and_duplicate_columns_are_rejected() {
        let err = merge(ds(&["A"], &[]), ds(&["A", "B"], &[]), KEY).unwrap_err();
        assert_eq!(err.missing, ["B"]);

        let err = merge(ds(&["A", "A"], &[]), ds(&["A"], &[]), KEY).unwrap_err();
        assert_eq!(err.duplicated, ["A"]);
    }

    #[test]
    fn duplicate_keys_keep_the_existing_row() {
        let existing = ds(&["event_id", "fight_id", "w"], &[&["1", "1", "old"]]);
        let new = ds(&["event_id", "fight_id", "w"], &[&["1", "1", "new"], &["1", "2", "x"], &["1", "2", "y"]]);
        let merged = merge(new, existing, KEY).unwrap();
        assert_eq!(merged.rows, vec![vec!["1", "2", "x"], vec!["1", "1", "old"]]);
    }

    #[test]
    fn no_key_columns_means_plain_concat() {
        let existing = ds(&["a"], &[&["1"]]);
        let new = ds(&["a"], &[&["1"]]);
        assert_eq!(merge(new, existing, KEY).unwrap().len(), 2);
    }

    #[test]
    fn grouping_does_not_change_the_row_multiset() {
        let h = &["event_id", "fight_id", "v"];
        let oo = ds(h, &[&["1", "1", "a"], &["1", "2", "b"]]);
        let on = ds(h, &[&["2", "1", "c"], &["1", "2", "dup"]]);
        let nw = ds(h, &[&["3", "1", "d"], &["2", "1", "dup2"]]);

        let left = merge(nw.clone(), merge(on.clone(), oo.clone(), KEY).unwrap(), KEY).unwrap();
        let right = merge(merge(nw, on, KEY).unwrap(), oo, KEY).unwrap();

        let mut l = left.rows.clone();
        let mut r = right.rows.clone();
        l.sort();
        r.sort();
        assert_eq!(l, r);
        assert_eq!(left.rows, right.rows);
    }

    #[test]
    fn read_rejects_ragged_rows() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("t.csv");
        std::fs::write(&p, "a,b\n1,2\n3\n").unwrap();
        assert!(matches!(Dataset::read(&p, Delim::Comma), Err(Error::Dataset { .. })));
        assert!(Dataset::read(&dir.path().join("none.csv"), Delim::Comma).unwrap().is_none());
    }

    #[test]
    fn write_then_read_preserves_non_ascii() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("t.csv");
        let d = ds(&["R_fighter", "location"], &[&["José Aldo", "Rio de Janeiro; Brasil"]]);
        d.write(&p, Delim::Semicolon).unwrap();
        assert_eq!(Dataset::read(&p, Delim::Semicolon).unwrap().unwrap(), d);
    }
}
