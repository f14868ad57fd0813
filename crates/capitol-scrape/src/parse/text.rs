//! Text normalization and small extraction helpers

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;

/// Compile a pattern literal
#[allow(clippy::expect_used)]
fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("regex literal")
}

static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| re(r"\s+"));
static ACT_NUMBER: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Act\s+(\d+)"));
static GOV_MSG: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)Gov\.?\s*Msg\.?\s*No\.?\s*(\d+)"));
static CONF_REPORT: LazyLock<Regex> =
    LazyLock::new(|| re(r"(?i)Conf\.?\s*Com\.?\s*Rep\.?\s*No\.?\s*(\d+)"));
static PARTY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| re(r"\(([^)]+)\)$"));
static DISTRICT: LazyLock<Regex> = LazyLock::new(|| re(r"(?i)(House|Senate)\s+District\s+(\d+)"));
static VERSION_CODE: LazyLock<Regex> = LazyLock::new(|| re(r"_(SD\d+|HD\d+|CD\d+)$"));
static LOOSE_DATE: LazyLock<Regex> = LazyLock::new(|| re(r"(\d{1,2})/(\d{1,2})/(\d{4})"));

/// Collapse whitespace and strip troublesome unicode punctuation
pub fn clean_text(text: &str) -> Option<String> {
    let text = text
        .replace('\u{00a0}', " ")
        .replace('\u{2019}', "'")
        .replace(['\u{201c}', '\u{201d}'], "\"");
    let text = WHITESPACE.replace_all(text.trim(), " ").trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Parse a date from the formats the site uses
///
/// Tries `m/d/Y`, ISO, and long-form month names in order, then falls back
/// to pulling the first `m/d/Y` shape out of a longer string.
pub fn parse_date(text: &str) -> Option<NaiveDateTime> {
    let text = clean_text(text)?;

    for format in ["%m/%d/%Y", "%Y-%m-%d", "%B %d, %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(&text, format) {
            return date.and_hms_opt(0, 0, 0);
        }
    }

    let caps = LOOSE_DATE.captures(&text)?;
    let month: u32 = caps.get(1)?.as_str().parse().ok()?;
    let day: u32 = caps.get(2)?.as_str().parse().ok()?;
    let year: i32 = caps.get(3)?.as_str().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

/// Extract "Act 123" from a status action
pub fn extract_act_number(text: &str) -> Option<u32> {
    ACT_NUMBER
        .captures(text)
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Extract "Gov. Msg. No. 123" from a status action
pub fn extract_governor_message_number(text: &str) -> Option<u32> {
    GOV_MSG
        .captures(text)
        .and_then(|caps| caps.get(1)?.as_str().parse().ok())
}

/// Extract "Conf. Com. Rep. No. 123" from a status action
pub fn extract_conference_report(text: &str) -> Option<String> {
    CONF_REPORT
        .captures(text)
        .and_then(|caps| Some(caps.get(1)?.as_str().to_string()))
}

/// Split `"Name (D)"` into name and party
pub fn parse_party_from_name(text: &str) -> (Option<String>, String) {
    if let Some(caps) = PARTY_SUFFIX.captures(text.trim()) {
        if let (Some(whole), Some(party)) = (caps.get(0), caps.get(1)) {
            let name = text.trim()[..whole.start()].trim().to_string();
            return (Some(party.as_str().to_string()), name);
        }
    }
    (None, text.trim().to_string())
}

/// Parse `"House District 23"` into (district type, district number)
pub fn parse_district_info(text: &str) -> (Option<String>, Option<u32>) {
    if let Some(caps) = DISTRICT.captures(text) {
        let chamber = caps.get(1).map(|m| format!("{} District", m.as_str()));
        let number = caps.get(2).and_then(|m| m.as_str().parse().ok());
        return (chamber, number);
    }
    (None, None)
}

/// Extract the draft code suffix from a version name, e.g.
/// `"SB1300_CD1"` -> `"CD1"`
pub fn version_code(version_name: &str) -> Option<String> {
    VERSION_CODE
        .captures(version_name)
        .and_then(|caps| Some(caps.get(1)?.as_str().to_string()))
}

/// Resolve a possibly-relative URL against the site base
pub fn normalize_url(url: &str, base_url: &str) -> Option<String> {
    let url = url.trim();
    if url.is_empty() {
        return None;
    }
    if url.starts_with("http") {
        return Some(url.to_string());
    }
    Some(format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        url.trim_start_matches('/')
    ))
}
