// src/core/sanitize.rs

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Split `"Label: value"` into `("label", "value")`.
/// Label is lowercased; both sides whitespace-normalized.
pub fn split_label(s: &str) -> Option<(String, String)> {
    let (label, value) = s.split_once(':')?;
    let label = normalize_ws(label).to_ascii_lowercase();
    if label.is_empty() { return None; }
    Some((label, normalize_ws(value)))
}

/// Identifier of a link: its last non-empty path segment, query dropped.
/// Bare ids (`"901"`) come back unchanged.
pub fn link_id(link: &str) -> &str {
    let no_query = link.split(['?', '#']).next().unwrap_or(link);
    no_query
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(no_query)
}
