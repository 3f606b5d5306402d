// src/specs/ufcstats.rs
//! Scraping *spec* for ufcstats.com.
//!
//! Purpose:
//! - Completed-events page: every `event-details` link, newest first as listed.
//! - Event page: date, location and the fight links (`tr[data-link]`).
//! - Fight page: the totals table and the significant-strike breakdown, one
//!   cell pair per column (red corner first), plus method / round / time /
//!   format / referee, the bout title and the winner.
//!
//! Pages are reduced to [`EventPage`] / [`FightPage`] JSON before they are
//! cached, so re-assembling a row never needs the HTML again.
//!
//! A page without the expected skeleton is a fetch failure, and so is a fight
//! page with no totals table (a bout listed before its stats are published),
//! so it stays new until the stats appear. A fight page that has the totals
//! but lacks the breakdown (older bouts) still caches; assembly then reports
//! the missing field for that one fight.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::assemble::{by_corner, require, Corner, FlatRecord};
use crate::config::consts::UFCSTATS_EVENTS_URL;
use crate::config::SourceKind;
use crate::core::sanitize::{link_id, normalize_ws, split_label};
use crate::core::Fetch;
use crate::error::{AssembleError, FetchError};

use super::Source;

pub const COLUMNS: &[&str] = &[
    "event_id", "fight_id",
    "R_fighter", "B_fighter", "R_KD", "B_KD", "R_SIG_STR.", "B_SIG_STR.",
    "R_SIG_STR_pct", "B_SIG_STR_pct", "R_TOTAL_STR.", "B_TOTAL_STR.", "R_TD", "B_TD",
    "R_TD_pct", "B_TD_pct", "R_SUB_ATT", "B_SUB_ATT", "R_REV", "B_REV", "R_CTRL", "B_CTRL",
    "R_HEAD", "B_HEAD", "R_BODY", "B_BODY", "R_LEG", "B_LEG",
    "R_DISTANCE", "B_DISTANCE", "R_CLINCH", "B_CLINCH", "R_GROUND", "B_GROUND",
    "win_by", "last_round", "last_round_time", "Format", "Referee",
    "date", "location", "Fight_type", "Winner",
];

/// Totals table, one stem per `<td>` from the first.
pub const TOTALS: &[&str] = &[
    "fighter", "KD", "SIG_STR.", "SIG_STR_pct", "TOTAL_STR.", "TD", "TD_pct", "SUB_ATT", "REV", "CTRL",
];

/// Significant-strike table: fighter, sig. str. and sig. str. % repeat the
/// totals, so reading starts at this cell.
pub const BREAKDOWN_FROM: usize = 3;
pub const BREAKDOWN: &[&str] = &["HEAD", "BODY", "LEG", "DISTANCE", "CLINCH", "GROUND"];

// details label → column
const DETAILS: &[(&str, &str)] = &[
    ("method", "win_by"),
    ("round", "last_round"),
    ("time", "last_round_time"),
    ("time format", "Format"),
    ("referee", "Referee"),
];

fn sel(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

static EVENT_LINK: LazyLock<Selector> = LazyLock::new(|| sel(r#"a[href*="event-details"]"#));
static EVENT_INFO: LazyLock<Selector> = LazyLock::new(|| sel("li.b-list__box-list-item"));
static FIGHT_ROW: LazyLock<Selector> = LazyLock::new(|| sel("tr[data-link]"));
static FIGHT_CONTENT: LazyLock<Selector> = LazyLock::new(|| sel("div.b-fight-details"));
static TBODY: LazyLock<Selector> = LazyLock::new(|| sel("tbody"));
static TR: LazyLock<Selector> = LazyLock::new(|| sel("tr"));
static TD: LazyLock<Selector> = LazyLock::new(|| sel("td"));
static CELL_TEXT: LazyLock<Selector> = LazyLock::new(|| sel("p.b-fight-details__table-text"));
static DETAIL_ITEM: LazyLock<Selector> =
    LazyLock::new(|| sel("i.b-fight-details__text-item_first, i.b-fight-details__text-item"));
static FIGHT_TITLE: LazyLock<Selector> = LazyLock::new(|| sel("i.b-fight-details__fight-title"));
static PERSON: LazyLock<Selector> = LazyLock::new(|| sel("div.b-fight-details__person"));
static PERSON_WON: LazyLock<Selector> =
    LazyLock::new(|| sel("i.b-fight-details__person-status_style_green"));
static PERSON_NAME: LazyLock<Selector> = LazyLock::new(|| sel("h3.b-fight-details__person-name"));

/// Cached form of an event page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPage {
    pub id: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub fights: Vec<String>,
}

/// Cached form of a fight page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightPage {
    #[serde(default)]
    pub corners: Vec<CornerLine>,
    /// Lowercased detail label → value (`"method"`, `"time format"`, ...).
    #[serde(default)]
    pub details: BTreeMap<String, String>,
    #[serde(default)]
    pub fight_type: Option<String>,
    /// Empty for draws and no contests.
    #[serde(default)]
    pub winner: String,
}

/// One fighter's cells, keyed by column stem.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CornerLine {
    pub color: String,
    #[serde(default)]
    pub stats: BTreeMap<String, String>,
}

pub struct UfcStats;

impl UfcStats {
    pub fn new() -> Self {
        UfcStats
    }
}

impl Default for UfcStats {
    fn default() -> Self { Self::new() }
}

impl Source for UfcStats {
    fn kind(&self) -> SourceKind { SourceKind::Ufcstats }

    fn columns(&self) -> &'static [&'static str] { COLUMNS }

    fn list_events(&self, net: &dyn Fetch) -> Result<Vec<String>, FetchError> {
        let html = net.get(UFCSTATS_EVENTS_URL)?;
        let links = parse_event_list(&html);
        if links.is_empty() {
            return Err(FetchError::malformed(UFCSTATS_EVENTS_URL, "no event links"));
        }
        Ok(links)
    }

    fn fetch_event(&self, net: &dyn Fetch, event: &str) -> Result<Value, FetchError> {
        let html = net.get(event)?;
        let page = parse_event_page(event, &html).ok_or_else(|| FetchError::malformed(event, "no event date"))?;
        serde_json::to_value(page).map_err(|e| FetchError::malformed(event, e))
    }

    fn fight_links(&self, event: &Value) -> Result<Vec<String>, AssembleError> {
        Ok(EventPage::deserialize(event)?.fights)
    }

    fn fetch_fight(&self, net: &dyn Fetch, _event: &str, fight: &str) -> Result<Value, FetchError> {
        let html = net.get(fight)?;
        let page = parse_fight_page(&html).ok_or_else(|| FetchError::malformed(fight, "no fight statistics"))?;
        serde_json::to_value(page).map_err(|e| FetchError::malformed(fight, e))
    }

    fn assemble(&self, event: &Value, fight: &str, record: &Value) -> Result<FlatRecord, AssembleError> {
        let event = EventPage::deserialize(event)?;
        let page = FightPage::deserialize(record)?;

        let mut b = FlatRecord::builder(COLUMNS);
        b.set("event_id", event.id)?.set("fight_id", link_id(fight))?;

        let corners = by_corner(page.corners, |c| c.color.as_str())?;
        for (corner, line) in Corner::BOTH.into_iter().zip(corners) {
            for stem in TOTALS.iter().chain(BREAKDOWN) {
                let v = require(line.stats.get(*stem), &format!("corners.{}.{stem}", corner.tag()))?;
                b.set_corner(corner, stem, v.as_str())?;
            }
        }

        for (label, column) in DETAILS {
            let v = require(page.details.get(*label), &format!("details.{label}"))?;
            b.set(column, v.as_str())?;
        }

        b.set("date", require(event.date, "event.date")?)?
            .set("location", require(event.location, "event.location")?)?
            .set("Fight_type", require(page.fight_type, "fight_type")?)?
            .set("Winner", page.winner)?;

        b.finish()
    }
}

fn text_of(el: ElementRef<'_>) -> String {
    normalize_ws(&el.text().collect::<String>())
}

/// Event-detail links in page order (newest first), deduplicated.
pub fn parse_event_list(html: &str) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut links: indexmap::IndexSet<String> = indexmap::IndexSet::new();
    for a in doc.select(&EVENT_LINK) {
        if let Some(href) = a.value().attr("href") {
            links.insert(s!(href.trim()));
        }
    }
    links.into_iter().collect()
}

/// `None` when the page carries no `Date:` item.
pub fn parse_event_page(link: &str, html: &str) -> Option<EventPage> {
    let doc = Html::parse_document(html);

    let mut info: BTreeMap<String, String> = BTreeMap::new();
    for li in doc.select(&EVENT_INFO) {
        if let Some((label, value)) = split_label(&text_of(li)) {
            info.entry(label).or_insert(value);
        }
    }
    let date = info.remove("date")?;

    let mut fights: indexmap::IndexSet<String> = indexmap::IndexSet::new();
    for tr in doc.select(&FIGHT_ROW) {
        if let Some(href) = tr.value().attr("data-link") {
            fights.insert(s!(href.trim()));
        }
    }

    Some(EventPage {
        id: s!(link_id(link)),
        date: Some(date),
        location: info.remove("location"),
        fights: fights.into_iter().collect(),
    })
}

/// `None` when the page is not a fight-details page at all.
pub fn parse_fight_page(html: &str) -> Option<FightPage> {
    let doc = Html::parse_document(html);
    doc.select(&FIGHT_CONTENT).next()?;

    let mut red = CornerLine { color: s!(Corner::Red.tag()), ..Default::default() };
    let mut blue = CornerLine { color: s!(Corner::Blue.tag()), ..Default::default() };

    let tables: Vec<ElementRef<'_>> = doc.select(&TBODY).collect();
    read_pairs(*tables.first()?, 0, TOTALS, &mut red, &mut blue);
    if let Some(breakdown) = tables.get(2) {
        read_pairs(*breakdown, BREAKDOWN_FROM, BREAKDOWN, &mut red, &mut blue);
    }

    let mut details = BTreeMap::new();
    for item in doc.select(&DETAIL_ITEM) {
        if let Some((label, value)) = split_label(&text_of(item)) {
            details.entry(label).or_insert(value);
        }
    }

    let fight_type = doc.select(&FIGHT_TITLE).next().map(text_of);

    let winner = doc
        .select(&PERSON)
        .find(|p| p.select(&PERSON_WON).next().is_some())
        .and_then(|p| p.select(&PERSON_NAME).next())
        .map(text_of)
        .unwrap_or_default();

    Some(FightPage { corners: vec![red, blue], details, fight_type, winner })
}

/// First row of `table`; each cell from `from` holds a red/blue `<p>` pair.
fn read_pairs(table: ElementRef<'_>, from: usize, stems: &[&str], red: &mut CornerLine, blue: &mut CornerLine) {
    let Some(row) = table.select(&TR).next() else { return };
    let cells: Vec<ElementRef<'_>> = row.select(&TD).skip(from).collect();
    for (stem, td) in stems.iter().zip(cells) {
        let pair: Vec<String> = td.select(&CELL_TEXT).map(text_of).collect();
        if let [r, b] = pair.as_slice() {
            red.stats.insert(s!(*stem), r.clone());
            blue.stats.insert(s!(*stem), b.clone());
        }
    }
}
