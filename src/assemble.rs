// src/assemble.rs
//! Flat rows and the pieces every source uses to build them.

use std::fmt;

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::error::AssembleError;

/// Logical side of a fight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Corner {
    Red,
    Blue,
}

impl Corner {
    pub const BOTH: [Corner; 2] = [Corner::Red, Corner::Blue];

    /// Column prefix: `R` / `B`.
    pub fn prefix(self) -> &'static str {
        match self {
            Corner::Red => "R",
            Corner::Blue => "B",
        }
    }

    /// Feed tag as it appears in FightMetric payloads.
    pub fn tag(self) -> &'static str {
        match self {
            Corner::Red => "Red",
            Corner::Blue => "Blue",
        }
    }

    /// `Red`/`R` and `Blue`/`B`, any case.
    pub fn from_tag(tag: &str) -> Option<Corner> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "red" | "r" => Some(Corner::Red),
            "blue" | "b" => Some(Corner::Blue),
            _ => None,
        }
    }

    /// `R_` + stem
    pub fn column(self, stem: &str) -> String {
        join!(self.prefix(), "_", stem)
    }
}

/// Pair each item with its corner, requiring exactly one per side.
/// Result is always `[red, blue]` whatever order the payload used.
pub fn by_corner<T, F>(items: impl IntoIterator<Item = T>, tag: F) -> Result<[T; 2], AssembleError>
where
    F: Fn(&T) -> &str,
{
    let mut red = Vec::with_capacity(1);
    let mut blue = Vec::with_capacity(1);
    for item in items {
        let t = tag(&item);
        match Corner::from_tag(t) {
            Some(Corner::Red) => red.push(item),
            Some(Corner::Blue) => blue.push(item),
            None => return Err(AssembleError::BadCorner(s!(t))),
        }
    }
    if red.len() != 1 { return Err(AssembleError::CornerCount("red", red.len())); }
    if blue.len() != 1 { return Err(AssembleError::CornerCount("blue", blue.len())); }
    match (red.pop(), blue.pop()) {
        (Some(r), Some(b)) => Ok([r, b]),
        _ => Err(AssembleError::CornerCount("red", 0)),
    }
}

/// Any JSON scalar, rendered as cell text. `null` → empty.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scalar(pub String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        match Value::deserialize(d)? {
            Value::Null => Ok(Scalar(s!())),
            Value::String(s) => Ok(Scalar(s)),
            Value::Bool(b) => Ok(Scalar(b.to_string())),
            Value::Number(n) => Ok(Scalar(n.to_string())),
            other => Err(D::Error::custom(format!("expected a scalar, got {other}"))),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<Scalar> for String {
    fn from(s: Scalar) -> String { s.0 }
}

/// `deserialize_with` for `Option<Scalar>` fields marked `#[serde(default)]`:
/// an absent key stays `None`, a present `null` becomes an empty cell.
pub fn present<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Scalar>, D::Error> {
    Scalar::deserialize(d).map(Some)
}

/// Unwrap an optional payload field or name its path in the error.
pub fn require<T>(v: Option<T>, path: &str) -> Result<T, AssembleError> {
    v.ok_or_else(|| AssembleError::MissingField(s!(path)))
}

/// One fight, one value per schema column. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlatRecord {
    columns: &'static [&'static str],
    values: Vec<String>,
}

impl FlatRecord {
    pub fn builder(columns: &'static [&'static str]) -> RecordBuilder {
        RecordBuilder { columns, values: vec![None; columns.len()] }
    }

    pub fn columns(&self) -> &'static [&'static str] { self.columns }

    pub fn get(&self, column: &str) -> Option<&str> {
        let i = self.columns.iter().position(|c| *c == column)?;
        Some(self.values[i].as_str())
    }

    pub fn into_row(self) -> Vec<String> { self.values }
}

/// Fills a [`FlatRecord`] column by column. Refuses columns outside the
/// schema and refuses to finish while any column is unset.
pub struct RecordBuilder {
    columns: &'static [&'static str],
    values: Vec<Option<String>>,
}

impl RecordBuilder {
    pub fn set(&mut self, column: &str, value: impl Into<String>) -> Result<&mut Self, AssembleError> {
        let i = self
            .columns
            .iter()
            .position(|c| *c == column)
            .ok_or_else(|| AssembleError::UnknownColumn(s!(column)))?;
        self.values[i] = Some(value.into());
        Ok(self)
    }

    pub fn set_corner(&mut self, corner: Corner, stem: &str, value: impl Into<String>) -> Result<&mut Self, AssembleError> {
        self.set(&corner.column(stem), value)
    }

    pub fn finish(self) -> Result<FlatRecord, AssembleError> {
        let mut values = Vec::with_capacity(self.values.len());
        for (col, v) in self.columns.iter().zip(self.values) {
            values.push(v.ok_or(AssembleError::UnsetColumn(*col))?);
        }
        Ok(FlatRecord { columns: self.columns, values })
    }
}
