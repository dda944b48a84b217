use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use super::classify::GameResult;
use crate::error::{PgnError, Result};

/// One `[Name "Value"]` tag pair; the value may contain `\"` and `\\`.
static TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"\[\s*([A-Za-z0-9_+#=:-]+)\s+"((?:[^"\\]|\\.)*)"\s*\]"#).unwrap());

/// Tag pairs of one game, in the order they appeared.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Headers {
    tags: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Headers::default()
    }

    /// Set a tag, replacing an earlier value with the same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.tags.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = value,
            None => self.tags.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Value of a tag unless it is missing, empty or the `?` placeholder.
    fn known(&self, name: &str) -> Option<&str> {
        self.get(name)
            .map(str::trim)
            .filter(|value| !value.is_empty() && *value != "?")
    }

    pub fn result(&self) -> Option<GameResult> {
        self.get("Result").and_then(|value| GameResult::from_token(value.trim()))
    }

    pub fn fen(&self) -> Option<&str> {
        self.known("FEN")
    }

    /// `Title Name (Elo)` for one side.
    fn player(&self, title: &str, name: &str, elo: &str) -> String {
        let elo = self.known(elo).map(|elo| format!("({})", elo));
        [self.known(title), self.known(name), elo.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `White - Black` with titles and ratings, if any player tag is set.
    pub fn players_line(&self) -> Option<String> {
        let white = self.player("WhiteTitle", "White", "WhiteElo");
        let black = self.player("BlackTitle", "Black", "BlackElo");
        if white.is_empty() && black.is_empty() {
            return None;
        }
        Some(format!("{} - {}", white, black).trim().to_string())
    }

    /// `Event, Date`, leaving out unknown parts.
    pub fn event_line(&self) -> Option<String> {
        let date = self.known("Date").map(trim_unknown_date).filter(|d| !d.is_empty());
        let parts: Vec<&str> = [self.known("Event"), date].into_iter().flatten().collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }

    /// Single title line: players, then event and date.
    pub fn title_line(&self) -> String {
        [self.players_line(), self.event_line()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Drop trailing unknown date parts: `2024.??.??` becomes `2024`.
fn trim_unknown_date(date: &str) -> &str {
    let mut date = date;
    while let Some(idx) = date.rfind('.') {
        if date[idx + 1..].chars().all(|c| c == '?') {
            date = &date[..idx];
        } else {
            break;
        }
    }
    if date.chars().all(|c| c == '?') {
        ""
    } else {
        date
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Read every tag pair on one header line.
fn parse_tag_line(line: &str, line_no: usize, headers: &mut Headers) -> Result<()> {
    let mut pos = 0;
    loop {
        let rest = &line[pos..];
        let skipped = rest.len() - rest.trim_start().len();
        pos += skipped;
        if pos >= line.len() {
            return Ok(());
        }

        let caps = TAG_REGEX
            .captures_at(line, pos)
            .filter(|caps| caps.get(0).map(|m| m.start()) == Some(pos))
            .ok_or_else(|| PgnError::HeaderInvalid {
                line: line_no,
                reason: format!("expected a tag pair, found `{}`", line[pos..].trim()),
            })?;

        let whole = caps.get(0).map(|m| m.end()).unwrap_or(line.len());
        headers.insert(&caps[1], unescape(&caps[2]));
        pos = whole;
    }
}

/// Split a game into its tag pairs and the movetext that follows them.
///
/// Header lines are the lines before the movetext that start with `[`; a
/// `[D]` diagram marker starts the movetext instead. Blank lines and `%`
/// escape lines are skipped.
pub fn split_headers(text: &str) -> Result<(Headers, &str)> {
    let mut headers = Headers::new();
    let mut offset = 0;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let trimmed = line.trim();
        let is_header = trimmed.starts_with('[') && !trimmed.starts_with("[D]");

        if trimmed.is_empty() || trimmed.starts_with('%') {
            offset += line.len();
            continue;
        }
        if !is_header {
            break;
        }

        parse_tag_line(trimmed, idx + 1, &mut headers)?;
        offset += line.len();
    }

    Ok((headers, &text[offset..]))
}
