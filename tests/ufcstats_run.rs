// tests/ufcstats_run.rs
mod common;

use common::{options, MockNet};
use ufc_scrape::config::consts::UFCSTATS_EVENTS_URL;
use ufc_scrape::config::SourceKind;
use ufc_scrape::csv::Delim;
use ufc_scrape::runner::{self, RunMode};
use ufc_scrape::store::Dataset;

const EVENT: &str = "http://ufcstats.com/event-details/e1";
const FIGHT_OK: &str = "http://ufcstats.com/fight-details/f1";
const FIGHT_BARE: &str = "http://ufcstats.com/fight-details/f2";

fn events_page() -> String {
    format!(r#"<table><tr><td><a class="b-link" href="{EVENT}">UFC 1</a></td></tr></table>"#)
}

fn event_page() -> String {
    format!(
        r#"<ul>
          <li class="b-list__box-list-item"><i>Date:</i> November 12, 1993</li>
          <li class="b-list__box-list-item"><i>Location:</i> Denver, Colorado, USA</li>
        </ul>
        <table><tbody>
          <tr data-link="{FIGHT_OK}"><td></td></tr>
          <tr data-link="{FIGHT_BARE}"><td></td></tr>
        </tbody></table>"#
    )
}

fn pairs(cells: &[(&str, &str)]) -> String {
    let tds: String = cells
        .iter()
        .map(|(r, b)| {
            format!(
                r#"<td><p class="b-fight-details__table-text">{r}</p><p class="b-fight-details__table-text">{b}</p></td>"#
            )
        })
        .collect();
    format!("<table><tbody><tr>{tds}</tr></tbody></table>")
}

fn fight_page() -> String {
    let totals = pairs(&[
        ("Royce Gracie", "Gerard Gordeau"), ("0", "0"), ("1 of 2", "0 of 1"), ("50%", "0%"),
        ("3 of 4", "1 of 2"), ("1 of 1", "0 of 0"), ("100%", "---"), ("1", "0"), ("0", "0"), ("1:10", "0:00"),
    ]);
    let breakdown = pairs(&[
        ("Royce Gracie", "Gerard Gordeau"), ("1 of 2", "0 of 1"), ("50%", "0%"),
        ("1 of 1", "0 of 0"), ("0 of 1", "0 of 1"), ("0 of 0", "0 of 0"),
        ("0 of 1", "0 of 1"), ("1 of 1", "0 of 0"), ("0 of 0", "0 of 0"),
    ]);
    format!(
        r#"<div class="b-fight-details">
          <div class="b-fight-details__person">
            <i class="b-fight-details__person-status b-fight-details__person-status_style_green">W</i>
            <h3 class="b-fight-details__person-name">Royce Gracie</h3>
          </div>
          <i class="b-fight-details__fight-title">Open Weight Bout</i>
          <p class="b-fight-details__text">
            <i class="b-fight-details__text-item_first"><i class="b-fight-details__label">Method:</i> Submission</i>
            <i class="b-fight-details__text-item"><i class="b-fight-details__label">Round:</i> 1</i>
            <i class="b-fight-details__text-item"><i class="b-fight-details__label">Time:</i> 1:44</i>
            <i class="b-fight-details__text-item"><i class="b-fight-details__label">Time format:</i> No Time Limit</i>
            <i class="b-fight-details__text-item"><i class="b-fight-details__label">Referee:</i> Helio Vigio</i>
          </p>
          {totals}{totals}{breakdown}
        </div>"#
    )
}

#[test]
fn bootstrap_writes_semicolon_rows_and_retries_fight_without_stats() {
    let dir = tempfile::tempdir().unwrap();
    let mut net = MockNet::new();
    net.serve(UFCSTATS_EVENTS_URL, events_page());
    net.serve(EVENT, event_page());
    net.serve(FIGHT_OK, fight_page());
    net.serve(FIGHT_BARE, r#"<div class="b-fight-details"></div>"#);
    let opts = options(dir.path(), SourceKind::Ufcstats, vec![]);

    let summary = runner::run(&opts, &net, None).unwrap();
    assert_eq!(summary.mode, RunMode::Bootstrap);
    assert_eq!(summary.new_rows, 1);
    assert_eq!(summary.fetch_failures, 1);
    assert_eq!(summary.assemble_failures, 0);
    assert_eq!(summary.written.as_deref(), Some(opts.paths().total_rows.as_path()));

    let total = Dataset::read(&opts.paths().total_rows, Delim::Semicolon).unwrap().unwrap();
    let row = &total.rows[0];
    let get = |c: &str| row[total.column_index(c).unwrap()].as_str();
    assert_eq!(get("event_id"), "e1");
    assert_eq!(get("fight_id"), "f1");
    assert_eq!(get("R_fighter"), "Royce Gracie");
    assert_eq!(get("B_TD_pct"), "---");
    assert_eq!(get("R_DISTANCE"), "0 of 1");
    assert_eq!(get("win_by"), "Submission");
    assert_eq!(get("location"), "Denver, Colorado, USA");
    assert_eq!(get("Winner"), "Royce Gracie");

    // the bout without stats was not cached; once they are published it lands
    net.serve(FIGHT_BARE, fight_page());
    net.reset_calls();
    let again = runner::run(&opts, &net, None).unwrap();
    assert_eq!(again.mode, RunMode::Incremental);
    assert_eq!(again.new_rows, 1);
    assert_eq!(again.total_rows, 2);
    assert_eq!(net.calls(), [UFCSTATS_EVENTS_URL, FIGHT_BARE]);

    net.reset_calls();
    let last = runner::run(&opts, &net, None).unwrap();
    assert_eq!(last.mode, RunMode::UpToDate);
    assert!(last.written.is_none());
    assert_eq!(net.calls(), [UFCSTATS_EVENTS_URL]);
}
