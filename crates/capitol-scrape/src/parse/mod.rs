//! Field extraction for fetched pages
//!
//! This is the `Parse(RawContent, key) -> Record` collaborator: given the
//! raw HTML for a key, it produces the aggregate to ingest, or a parse
//! error when the page's structural anchors are missing. The engine treats
//! a parse error as a task-level failure; nothing here touches the network
//! or the store.

pub mod measure;
pub mod member;

mod text;

pub use text::{
    clean_text, extract_act_number, extract_conference_report, extract_governor_message_number,
    normalize_url, parse_date, parse_district_info, parse_party_from_name, version_code,
};

use capitol_common::types::{Key, ParsedRecord};
use capitol_common::Result;

/// Parse the page body for `key` into an ingestable aggregate
pub fn extract(key: &Key, html: &str, base_url: &str) -> Result<ParsedRecord> {
    match key {
        Key::Measure {
            measure_type,
            number,
            year,
        } => measure::parse(*measure_type, *number, *year, html, base_url)
            .map(ParsedRecord::Measure),
        Key::Member { member_id, year } => {
            member::parse(*member_id, *year, html, base_url).map(ParsedRecord::Member)
        },
    }
}

/// Build a [`scraper::Selector`] from a literal
///
/// Selector strings in this module are compile-time literals, so a failure
/// is a programming error caught by the parser tests.
#[allow(clippy::expect_used)]
pub(crate) fn selector(s: &str) -> scraper::Selector {
    scraper::Selector::parse(s).expect("selector literal")
}
