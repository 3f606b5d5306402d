// tests/common/mod.rs
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;

use serde_json::{json, Map, Value};

use ufc_scrape::config::consts::FIGHTMETRIC_BASE;
use ufc_scrape::config::{RunOptions, SourceKind};
use ufc_scrape::core::Fetch;
use ufc_scrape::error::FetchError;
use ufc_scrape::specs::fightmetric::{GRAPPLING, STRIKES, TIP};

/// Scripted remote: served urls answer 200 with their body, everything else 404.
#[derive(Default)]
pub struct MockNet {
    bodies: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl MockNet {
    pub fn new() -> Self { Self::default() }

    pub fn serve(&mut self, url: impl Into<String>, body: impl Into<String>) {
        self.bodies.insert(url.into(), body.into());
    }

    pub fn calls(&self) -> Vec<String> { self.calls.borrow().clone() }

    pub fn reset_calls(&self) { self.calls.borrow_mut().clear(); }
}

impl Fetch for MockNet {
    fn get(&self, url: &str) -> Result<String, FetchError> {
        self.calls.borrow_mut().push(url.to_string());
        self.bodies
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status { url: url.to_string(), status: 404 })
    }
}

pub fn options(dir: &Path, source: SourceKind, events: Vec<u32>) -> RunOptions {
    RunOptions { source, data_dir: dir.to_path_buf(), events, rebuild: false, delim: None }
}

/* ---------------- FightMetric fixtures ---------------- */

pub fn fm_event_url(event: u32) -> String {
    format!("{FIGHTMETRIC_BASE}/V1/{event}/Fnt.json")
}

pub fn fm_fight_url(event: u32, fight: u32) -> String {
    format!("{FIGHTMETRIC_BASE}/V2/{event}/{fight}/Stats.json")
}

pub fn fm_event(event: u32, fights: &[u32]) -> String {
    let fights: Vec<Value> = fights
        .iter()
        .map(|f| {
            json!({
                "FightID": f, "WeightClassName": "Welterweight", "Status": "Final",
                "PossibleRds": 3, "EndingRoundNum": 3, "Method": "Decision",
                "Fighters": [
                    { "Color": "Blue", "FullName": format!("Blue {f}"), "FighterID": f * 2 + 1, "Outcome": "Loss" },
                    { "Color": "Red", "FullName": format!("Red {f}"), "FighterID": f * 2, "Outcome": "Win" }
                ]
            })
        })
        .collect();
    json!({ "FMLiveFeed": {
        "EventID": event, "Date": "2019-01-01", "GMT": 0, "Venue": "Arena",
        "City": "São Paulo", "Country": "Brazil", "Fights": fights
    }})
    .to_string()
}

fn fm_side(n: u32) -> Value {
    let counters = |table: &[(&str, ufc_scrape::specs::fightmetric::Tally, &str)]| {
        let mut m = Map::new();
        for (key, _, _) in table {
            m.insert(key.to_string(), json!({ "Attempts": n, "Landed": n }));
        }
        Value::Object(m)
    };
    let mut tip = Map::new();
    for (key, _) in TIP {
        tip.insert(key.to_string(), json!("1:00"));
    }
    json!({ "Grappling": counters(GRAPPLING), "Strikes": counters(STRIKES), "TIP": tip })
}

pub fn fm_stats() -> String {
    json!({ "FMLiveFeed": {
        "CurrentRoundTime": "5:00",
        "FightStats": { "Red": fm_side(3), "Blue": fm_side(4) }
    }})
    .to_string()
}

/// Serve `event` and every one of its fights.
pub fn fm_serve_event(net: &mut MockNet, event: u32, fights: &[u32]) {
    net.serve(fm_event_url(event), fm_event(event, fights));
    for f in fights {
        net.serve(fm_fight_url(event, *f), fm_stats());
    }
}
