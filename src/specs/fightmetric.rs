// src/specs/fightmetric.rs
//! Scraping *spec* for the FightMetric live feed.
//!
//! Purpose:
//! - Event feed `V1/{event}/Fnt.json`: event metadata plus the fight list
//!   (weight class, status, method, both fighters with their `Color`).
//! - Fight feed `V2/{event}/{fight}/Stats.json`: per-corner grappling, strike
//!   and time-in-position totals.
//! - Flatten both into the fixed [`COLUMNS`] list.
//!
//! Payloads are cached exactly as the feed returns them; the typed views below
//! are only built when a row is assembled.

use serde::Deserialize;
use serde_json::Value;

use crate::assemble::{by_corner, present, require, Corner, FlatRecord, RecordBuilder, Scalar};
use crate::config::consts::FIGHTMETRIC_BASE;
use crate::config::SourceKind;
use crate::core::sanitize::link_id;
use crate::core::Fetch;
use crate::error::{AssembleError, FetchError};

use super::{get_json, Source};

pub const COLUMNS: &[&str] = &[
    "event_id", "date", "gmt", "venue", "city", "country", "fight_id", "weight_class", "status",
    "possible_rounds", "final_round", "last_round_time", "win_by", "R_fighter", "B_fighter",
    "R_fighter_id", "B_fighter_id", "R_outcome", "B_outcome", "R_knock_down", "B_knock_down",
    "R_standups", "B_standups", "R_takedowns_attempts", "R_takedowns_landed",
    "B_takedowns_attempts", "B_takedowns_landed", "R_submissions_attempts",
    "B_submissions_attempts", "R_reversals_landed", "B_reversals_landed", "R_sig_str_attempts",
    "R_sig_str_landed", "B_sig_str_attempts", "B_sig_str_landed", "R_total_str_attempts",
    "R_total_str_landed", "B_total_str_attempts", "B_total_str_landed",
    "R_distance_str_attempts", "R_distance_str_landed", "B_distance_str_attempts",
    "B_distance_str_landed", "R_clinch_sig_str_attempts", "R_clinch_sig_str_landed",
    "B_clinch_sig_str_attempts", "B_clinch_sig_str_landed", "R_ground_sig_str_attempts",
    "R_ground_sig_str_landed", "B_ground_sig_str_attempts", "B_ground_sig_str_landed",
    "R_clinch_total_str_attempts", "R_clinch_total_str_landed", "B_clinch_total_str_attempts",
    "B_clinch_total_str_landed", "R_ground_total_str_attempts", "R_ground_total_str_landed",
    "B_ground_total_str_attempts", "B_ground_total_str_landed", "R_head_sig_str_attempts",
    "R_head_sig_str_landed", "B_head_sig_str_attempts", "B_head_sig_str_landed",
    "R_body_sig_str_attempts", "R_body_sig_str_landed", "B_body_sig_str_attempts",
    "B_body_sig_str_landed", "R_legs_sig_str_attempts", "R_legs_sig_str_landed",
    "B_legs_sig_str_attempts", "B_legs_sig_str_landed", "R_head_total_str_attempts",
    "R_head_total_str_landed", "B_head_total_str_attempts", "B_head_total_str_landed",
    "R_body_total_str_attempts", "R_body_total_str_landed", "B_body_total_str_attempts",
    "B_body_total_str_landed", "R_legs_total_str_attempts", "R_legs_total_str_landed",
    "B_legs_total_str_attempts", "B_legs_total_str_landed", "R_distance_head_str_attempts",
    "R_distance_head_str_landed", "B_distance_head_str_attempts", "B_distance_head_str_landed",
    "R_distance_body_str_attempts", "R_distance_body_str_landed",
    "B_distance_body_str_attempts", "B_distance_body_str_landed", "R_distance_leg_str_attempts",
    "R_distance_leg_str_landed", "B_distance_leg_str_attempts", "B_distance_leg_str_landed",
    "R_clinch_head_str_attempts", "R_clinch_head_str_landed", "B_clinch_head_str_attempts",
    "B_clinch_head_str_landed", "R_clinch_body_str_attempts", "R_clinch_body_str_landed",
    "B_clinch_body_str_attempts", "B_clinch_body_str_landed", "R_clinch_leg_str_attempts",
    "R_clinch_leg_str_landed", "B_clinch_leg_str_attempts", "B_clinch_leg_str_landed",
    "R_ground_head_str_attempts", "R_ground_head_str_landed", "B_ground_head_str_attempts",
    "B_ground_head_str_landed", "R_ground_body_str_attempts", "R_ground_body_str_landed",
    "B_ground_body_str_attempts", "B_ground_body_str_landed", "R_ground_leg_str_attempts",
    "R_ground_leg_str_landed", "B_ground_leg_str_attempts", "B_ground_leg_str_landed",
    "R_standing_time", "B_standing_time", "R_control_time", "B_control_time", "R_ground_time",
    "B_ground_time", "R_neutral_time", "B_neutral_time", "R_ground_control_time",
    "B_ground_control_time", "R_distance_time", "B_distance_time", "R_clinch_time",
    "B_clinch_time",
];

/// Which counter of a `{ "Attempts", "Landed" }` pair a column takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tally {
    Attempts,
    Landed,
}

// (feed key, counter, column stem)
pub const GRAPPLING: &[(&str, Tally, &str)] = &[
    ("Standups", Tally::Landed, "standups"),
    ("Takedowns", Tally::Attempts, "takedowns_attempts"),
    ("Takedowns", Tally::Landed, "takedowns_landed"),
    ("Submissions", Tally::Attempts, "submissions_attempts"),
    ("Reversals", Tally::Landed, "reversals_landed"),
];

pub const STRIKES: &[(&str, Tally, &str)] = &[
    ("Knock Down", Tally::Landed, "knock_down"),
    ("Significant Strikes", Tally::Attempts, "sig_str_attempts"),
    ("Significant Strikes", Tally::Landed, "sig_str_landed"),
    ("Total Strikes", Tally::Attempts, "total_str_attempts"),
    ("Total Strikes", Tally::Landed, "total_str_landed"),
    ("Distance Strikes", Tally::Attempts, "distance_str_attempts"),
    ("Distance Strikes", Tally::Landed, "distance_str_landed"),
    ("Clinch Significant Strikes", Tally::Attempts, "clinch_sig_str_attempts"),
    ("Clinch Significant Strikes", Tally::Landed, "clinch_sig_str_landed"),
    ("Ground Significant Strikes", Tally::Attempts, "ground_sig_str_attempts"),
    ("Ground Significant Strikes", Tally::Landed, "ground_sig_str_landed"),
    ("Clinch Total Strikes", Tally::Attempts, "clinch_total_str_attempts"),
    ("Clinch Total Strikes", Tally::Landed, "clinch_total_str_landed"),
    ("Ground Total Strikes", Tally::Attempts, "ground_total_str_attempts"),
    ("Ground Total Strikes", Tally::Landed, "ground_total_str_landed"),
    ("Head Significant Strikes", Tally::Attempts, "head_sig_str_attempts"),
    ("Head Significant Strikes", Tally::Landed, "head_sig_str_landed"),
    ("Body Significant Strikes", Tally::Attempts, "body_sig_str_attempts"),
    ("Body Significant Strikes", Tally::Landed, "body_sig_str_landed"),
    ("Legs Significant Strikes", Tally::Attempts, "legs_sig_str_attempts"),
    ("Legs Significant Strikes", Tally::Landed, "legs_sig_str_landed"),
    ("Head Total Strikes", Tally::Attempts, "head_total_str_attempts"),
    ("Head Total Strikes", Tally::Landed, "head_total_str_landed"),
    ("Body Total Strikes", Tally::Attempts, "body_total_str_attempts"),
    ("Body Total Strikes", Tally::Landed, "body_total_str_landed"),
    ("Legs Total Strikes", Tally::Attempts, "legs_total_str_attempts"),
    ("Legs Total Strikes", Tally::Landed, "legs_total_str_landed"),
    ("Distance Head Strikes", Tally::Attempts, "distance_head_str_attempts"),
    ("Distance Head Strikes", Tally::Landed, "distance_head_str_landed"),
    ("Distance Body Strikes", Tally::Attempts, "distance_body_str_attempts"),
    ("Distance Body Strikes", Tally::Landed, "distance_body_str_landed"),
    ("Distance Leg Strikes", Tally::Attempts, "distance_leg_str_attempts"),
    ("Distance Leg Strikes", Tally::Landed, "distance_leg_str_landed"),
    ("Clinch Head Strikes", Tally::Attempts, "clinch_head_str_attempts"),
    ("Clinch Head Strikes", Tally::Landed, "clinch_head_str_landed"),
    ("Clinch Body Strikes", Tally::Attempts, "clinch_body_str_attempts"),
    ("Clinch Body Strikes", Tally::Landed, "clinch_body_str_landed"),
    ("Clinch Leg Strikes", Tally::Attempts, "clinch_leg_str_attempts"),
    ("Clinch Leg Strikes", Tally::Landed, "clinch_leg_str_landed"),
    ("Ground Head Strikes", Tally::Attempts, "ground_head_str_attempts"),
    ("Ground Head Strikes", Tally::Landed, "ground_head_str_landed"),
    ("Ground Body Strikes", Tally::Attempts, "ground_body_str_attempts"),
    ("Ground Body Strikes", Tally::Landed, "ground_body_str_landed"),
    ("Ground Leg Strikes", Tally::Attempts, "ground_leg_str_attempts"),
    ("Ground Leg Strikes", Tally::Landed, "ground_leg_str_landed"),
];

pub const TIP: &[(&str, &str)] = &[
    ("Standing Time", "standing_time"),
    ("Control Time", "control_time"),
    ("Ground Time", "ground_time"),
    ("Neutral Time", "neutral_time"),
    ("Ground Control Time", "ground_control_time"),
    ("Distance Time", "distance_time"),
    ("Clinch Time", "clinch_time"),
];

pub struct FightMetric {
    events: Vec<u32>,
}

impl FightMetric {
    /// Ids are kept highest first; FightMetric numbers events in date order.
    pub fn new(mut events: Vec<u32>) -> Self {
        events.sort_unstable_by(|a, b| b.cmp(a));
        events.dedup();
        Self { events }
    }

    fn event_url(event: &str) -> String {
        format!("{FIGHTMETRIC_BASE}/V1/{}/Fnt.json", link_id(event))
    }

    fn fight_url(event: &str, fight: &str) -> String {
        format!("{FIGHTMETRIC_BASE}/V2/{}/{}/Stats.json", link_id(event), link_id(fight))
    }
}

impl Source for FightMetric {
    fn kind(&self) -> SourceKind { SourceKind::Fightmetric }

    fn columns(&self) -> &'static [&'static str] { COLUMNS }

    fn list_events(&self, _net: &dyn Fetch) -> Result<Vec<String>, FetchError> {
        Ok(self.events.iter().map(u32::to_string).collect())
    }

    fn fetch_event(&self, net: &dyn Fetch, event: &str) -> Result<Value, FetchError> {
        let url = Self::event_url(event);
        let body = get_json(net, &url)?;
        feed_object(&url, body, "Fights")
    }

    fn fight_links(&self, event: &Value) -> Result<Vec<String>, AssembleError> {
        let feed = EventFeed::deserialize(event)?.live;
        require(feed.fights, "FMLiveFeed.Fights")?
            .into_iter()
            .map(|f| require(f.fight_id, "FMLiveFeed.Fights[].FightID").map(String::from))
            .collect()
    }

    fn fetch_fight(&self, net: &dyn Fetch, event: &str, fight: &str) -> Result<Value, FetchError> {
        let url = Self::fight_url(event, fight);
        let body = get_json(net, &url)?;
        feed_object(&url, body, "FightStats")
    }

    fn assemble(&self, event: &Value, fight: &str, record: &Value) -> Result<FlatRecord, AssembleError> {
        let feed = EventFeed::deserialize(event)?.live;
        let fight_id = link_id(fight);
        let meta = require(feed.fights, "FMLiveFeed.Fights")?
            .into_iter()
            .find(|f| f.fight_id.as_ref().is_some_and(|id| id.0 == fight_id))
            .ok_or_else(|| AssembleError::FightNotInEvent(s!(fight_id)))?;
        let stats = StatsFeed::deserialize(record)?.live;

        let mut b = FlatRecord::builder(COLUMNS);
        b.set("event_id", text(feed.event_id, "FMLiveFeed.EventID")?)?
            .set("date", text(feed.date, "FMLiveFeed.Date")?)?
            .set("gmt", text(feed.gmt, "FMLiveFeed.GMT")?)?
            .set("venue", text(feed.venue, "FMLiveFeed.Venue")?)?
            .set("city", text(feed.city, "FMLiveFeed.City")?)?
            .set("country", text(feed.country, "FMLiveFeed.Country")?)?
            .set("fight_id", fight_id)?
            .set("weight_class", text(meta.weight_class, "Fights[].WeightClassName")?)?
            .set("status", text(meta.status, "Fights[].Status")?)?
            .set("possible_rounds", text(meta.possible_rounds, "Fights[].PossibleRds")?)?
            .set("final_round", text(meta.ending_round, "Fights[].EndingRoundNum")?)?
            .set("win_by", text(meta.method, "Fights[].Method")?)?
            .set("last_round_time", text(stats.current_round_time, "FMLiveFeed.CurrentRoundTime")?)?;

        let fighters = require(meta.fighters, "Fights[].Fighters")?;
        let fighters = by_corner(fighters, |f| f.color.as_deref().unwrap_or(""))?;
        for (corner, f) in Corner::BOTH.into_iter().zip(fighters) {
            b.set_corner(corner, "fighter", text(f.full_name, "Fighters[].FullName")?)?
                .set_corner(corner, "fighter_id", text(f.fighter_id, "Fighters[].FighterID")?)?
                .set_corner(corner, "outcome", text(f.outcome, "Fighters[].Outcome")?)?;
        }

        let sides = require(stats.fight_stats, "FMLiveFeed.FightStats")?;
        let sides = by_corner(sides, |(tag, _)| tag.as_str())?;
        for (corner, (_, side)) in Corner::BOTH.into_iter().zip(sides) {
            corner_stats(&mut b, corner, side)?;
        }

        b.finish()
    }
}

/// The feed answers unknown ids with a body that is valid JSON but not an
/// `FMLiveFeed` carrying `key`; treat that as a failed fetch so it is not cached.
fn feed_object(url: &str, body: Value, key: &str) -> Result<Value, FetchError> {
    let ok = body
        .get("FMLiveFeed")
        .and_then(|f| f.get(key))
        .is_some_and(|v| !v.is_null());
    if ok {
        Ok(body)
    } else {
        Err(FetchError::malformed(url, format!("no FMLiveFeed.{key}")))
    }
}

fn text(v: Option<Scalar>, path: &str) -> Result<String, AssembleError> {
    require(v, path).map(String::from)
}

fn corner_stats(b: &mut RecordBuilder, corner: Corner, side: CornerStats) -> Result<(), AssembleError> {
    let tag = corner.tag();

    let grappling = require(side.grappling, &format!("FightStats.{tag}.Grappling"))?;
    tally(b, corner, &grappling, GRAPPLING, &format!("FightStats.{tag}.Grappling"))?;

    let strikes = require(side.strikes, &format!("FightStats.{tag}.Strikes"))?;
    tally(b, corner, &strikes, STRIKES, &format!("FightStats.{tag}.Strikes"))?;

    let tip = require(side.tip, &format!("FightStats.{tag}.TIP"))?;
    for (key, stem) in TIP {
        let v = require(tip.get(*key), &format!("FightStats.{tag}.TIP.{key}"))?;
        b.set_corner(corner, stem, v.0.as_str())?;
    }
    Ok(())
}

fn tally(
    b: &mut RecordBuilder,
    corner: Corner,
    group: &Counters,
    table: &[(&str, Tally, &str)],
    path: &str,
) -> Result<(), AssembleError> {
    for (key, which, stem) in table {
        let count = require(group.get(*key), &format!("{path}.{key}"))?;
        let (v, field) = match which {
            Tally::Attempts => (&count.attempts, "Attempts"),
            Tally::Landed => (&count.landed, "Landed"),
        };
        let v = require(v.as_ref(), &format!("{path}.{key}.{field}"))?;
        b.set_corner(corner, stem, v.0.as_str())?;
    }
    Ok(())
}

/* ---------------- payload views ---------------- */

type Counters = std::collections::BTreeMap<String, Count>;

#[derive(Deserialize)]
struct EventFeed {
    #[serde(rename = "FMLiveFeed")]
    live: EventLive,
}

#[derive(Deserialize)]
struct EventLive {
    #[serde(rename = "EventID", default, deserialize_with = "present")]
    event_id: Option<Scalar>,
    #[serde(rename = "Date", default, deserialize_with = "present")]
    date: Option<Scalar>,
    #[serde(rename = "GMT", default, deserialize_with = "present")]
    gmt: Option<Scalar>,
    #[serde(rename = "Venue", default, deserialize_with = "present")]
    venue: Option<Scalar>,
    #[serde(rename = "City", default, deserialize_with = "present")]
    city: Option<Scalar>,
    #[serde(rename = "Country", default, deserialize_with = "present")]
    country: Option<Scalar>,
    #[serde(rename = "Fights", default)]
    fights: Option<Vec<FightMeta>>,
}

#[derive(Deserialize)]
struct FightMeta {
    #[serde(rename = "FightID", default, deserialize_with = "present")]
    fight_id: Option<Scalar>,
    #[serde(rename = "WeightClassName", default, deserialize_with = "present")]
    weight_class: Option<Scalar>,
    #[serde(rename = "Status", default, deserialize_with = "present")]
    status: Option<Scalar>,
    #[serde(rename = "PossibleRds", default, deserialize_with = "present")]
    possible_rounds: Option<Scalar>,
    #[serde(rename = "EndingRoundNum", default, deserialize_with = "present")]
    ending_round: Option<Scalar>,
    #[serde(rename = "Method", default, deserialize_with = "present")]
    method: Option<Scalar>,
    #[serde(rename = "Fighters", default)]
    fighters: Option<Vec<Fighter>>,
}

#[derive(Deserialize)]
struct Fighter {
    #[serde(rename = "Color", default)]
    color: Option<String>,
    #[serde(rename = "FullName", default, deserialize_with = "present")]
    full_name: Option<Scalar>,
    #[serde(rename = "FighterID", default, deserialize_with = "present")]
    fighter_id: Option<Scalar>,
    #[serde(rename = "Outcome", default, deserialize_with = "present")]
    outcome: Option<Scalar>,
}

#[derive(Deserialize)]
struct StatsFeed {
    #[serde(rename = "FMLiveFeed")]
    live: StatsLive,
}

#[derive(Deserialize)]
struct StatsLive {
    #[serde(rename = "CurrentRoundTime", default, deserialize_with = "present")]
    current_round_time: Option<Scalar>,
    #[serde(rename = "FightStats", default)]
    fight_stats: Option<std::collections::BTreeMap<String, CornerStats>>,
}

#[derive(Deserialize)]
struct CornerStats {
    #[serde(rename = "Grappling", default)]
    grappling: Option<Counters>,
    #[serde(rename = "Strikes", default)]
    strikes: Option<Counters>,
    #[serde(rename = "TIP", default)]
    tip: Option<std::collections::BTreeMap<String, Scalar>>,
}

#[derive(Deserialize)]
struct Count {
    #[serde(rename = "Attempts", default, deserialize_with = "present")]
    attempts: Option<Scalar>,
    #[serde(rename = "Landed", default, deserialize_with = "present")]
    landed: Option<Scalar>,
}
