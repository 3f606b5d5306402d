// src/config/consts.rs

// Net config
pub const USER_AGENT: &str = "ufc_scrape/0.1";
pub const REQUEST_TIMEOUT_SECS: u64 = 15;

// FightMetric live feed
pub const FIGHTMETRIC_BASE: &str = "http://liveapiorigin.fightmetric.com";
pub const FIGHTMETRIC_FIRST_EVENT: u32 = 900;
pub const FIGHTMETRIC_LAST_EVENT: u32 = 1004;

// UFCStats pages
pub const UFCSTATS_EVENTS_URL: &str = "http://ufcstats.com/statistics/events/completed?page=all";

// Local state
pub const DEFAULT_DATA_DIR: &str = "data";
pub const DATA_DIR_ENV: &str = "UFC_SCRAPE_DATA_DIR";
pub const EVENTS_CACHE_FILE: &str = "events_cache.json";
pub const FIGHTS_CACHE_FILE: &str = "fights_cache.json";
pub const SEEN_LINKS_FILE: &str = "seen_links.json";

// Output
pub const NEW_ROWS_FILE: &str = "new_fight_data.csv";
pub const TOTAL_ROWS_FILE: &str = "total_fight_data.csv";

// Columns forming the dedupe key of a row
pub const KEY_COLUMNS: [&str; 2] = ["event_id", "fight_id"];
