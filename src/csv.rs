// src/csv.rs
use std::io::{self, Write};
use std::mem::take;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum Delim {
    Comma,
    Semicolon,
    Tab,
}

impl Delim {
    pub fn sep(self) -> char {
        match self {
            Delim::Comma => ',',
            Delim::Semicolon => ';',
            Delim::Tab => '\t',
        }
    }
}

/* ---------------- Parsing ---------------- */

/// Minimal CSV parser (quotes + CRLF tolerant).
/// Blank lines are skipped; a quoted field may span lines.
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = s!();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if matches!(chars.peek(), Some('"')) {
                        chars.next(); // double-quote escape
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            c if c == sep && !in_quotes => {
                // move the field without cloning
                row.push(take(&mut field));
            }
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && matches!(chars.peek(), Some('\n')) { chars.next(); }
                row.push(take(&mut field));
                flush_row(&mut rows, &mut row);
            }
            _ => field.push(ch),
        }
    }

    // Trailing row without newline, even if quotes were unterminated.
    row.push(field);
    flush_row(&mut rows, &mut row);

    rows
}

fn flush_row(rows: &mut Vec<Vec<String>>, row: &mut Vec<String>) {
    if row.len() == 1 && row[0].is_empty() {
        row.clear();
    } else {
        rows.push(take(row));
    }
}

/* ---------------- Writing ---------------- */

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single row to any writer.
pub fn write_row<W: Write, S: AsRef<str>>(mut w: W, row: &[S], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        let cell = cell.as_ref();
        if !first { write!(w, "{}", sep)?; } else { first = false; }
        if needs_quotes(cell, sep) {
            let escaped = cell.replace('"', "\"\"");
            write!(w, "\"{}\"", escaped)?;
        } else {
            write!(w, "{}", cell)?;
        }
    }
    writeln!(w)
}

/// Header + rows as one string.
pub fn rows_to_string(headers: &[String], rows: &[Vec<String>], sep: char) -> String {
    let mut buf: Vec<u8> = Vec::new();

    let _ = write_row(&mut buf, headers, sep);
    for r in rows {
        let _ = write_row(&mut buf, r, sep);
    }

    match String::from_utf8(buf) {
        Ok(s) => s,
        Err(e) => String::from_utf8_lossy(&e.into_bytes()).into_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quotes_crlf_and_trailing_newline() {
        let text = "a;b\r\n\"x;y\";\"say \"\"hi\"\"\"\r\n";
        let rows = parse_rows(text, ';');
        assert_eq!(rows, vec![
            vec![s!("a"), s!("b")],
            vec![s!("x;y"), s!("say \"hi\"")],
        ]);
    }

    #[test]
    fn keeps_empty_trailing_cells() {
        let rows = parse_rows("a,,\n", ',');
        assert_eq!(rows, vec![vec![s!("a"), s!(), s!()]]);
    }

    #[test]
    fn quoted_field_spans_lines() {
        let rows = parse_rows("\"line1\nline2\",z\n", ',');
        assert_eq!(rows, vec![vec![s!("line1\nline2"), s!("z")]]);
    }

    #[test]
    fn write_quotes_only_when_needed() {
        let mut buf = Vec::new();
        write_row(&mut buf, &["Zé Ramalho", "a,b", "\"q\""], ',').unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "Zé Ramalho,\"a,b\",\"\"\"q\"\"\"\n");
    }

    #[test]
    fn written_text_parses_back() {
        let headers = vec![s!("name"), s!("city")];
        let rows = vec![vec![s!("Jiří Procházka"), s!("Praha; CZ")]];
        let text = rows_to_string(&headers, &rows, ';');
        let parsed = parse_rows(&text, ';');
        assert_eq!(parsed[0], headers);
        assert_eq!(parsed[1], rows[0]);
    }
}
