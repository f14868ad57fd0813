//! Domain types shared across the workspace
//!
//! Keys identify resources on the remote site, fetch outcomes classify a
//! single probe, and the record structs are the parsed aggregates handed
//! to the store.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

// ============================================================================
// Keys
// ============================================================================

/// Legislative measure categories published by the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeasureType {
    /// Senate Bill
    SB,
    /// House Bill
    HB,
    /// Senate Resolution
    SR,
    /// House Resolution
    HR,
    /// Senate Concurrent Resolution
    SCR,
    /// House Concurrent Resolution
    HCR,
    /// Governor's Message
    GM,
}

impl MeasureType {
    /// All measure types, in the order full scans walk them
    pub const ALL: [MeasureType; 7] = [
        MeasureType::SB,
        MeasureType::HB,
        MeasureType::SR,
        MeasureType::HR,
        MeasureType::SCR,
        MeasureType::HCR,
        MeasureType::GM,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureType::SB => "SB",
            MeasureType::HB => "HB",
            MeasureType::SR => "SR",
            MeasureType::HR => "HR",
            MeasureType::SCR => "SCR",
            MeasureType::HCR => "HCR",
            MeasureType::GM => "GM",
        }
    }
}

impl std::fmt::Display for MeasureType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MeasureType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SB" => Ok(MeasureType::SB),
            "HB" => Ok(MeasureType::HB),
            "SR" => Ok(MeasureType::SR),
            "HR" => Ok(MeasureType::HR),
            "SCR" => Ok(MeasureType::SCR),
            "HCR" => Ok(MeasureType::HCR),
            "GM" => Ok(MeasureType::GM),
            _ => Err(format!("unknown measure type: {}", s)),
        }
    }
}

/// Natural key of one probeable resource
///
/// Keys are totally ordered within a scan dimension by their numeric
/// component (`number` / `member_id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A measure page: `(type, number, year)`
    Measure {
        measure_type: MeasureType,
        number: u32,
        year: u16,
    },
    /// A member page: `(member_id, year)`
    Member { member_id: u32, year: u16 },
}

impl Key {
    pub fn measure(measure_type: MeasureType, number: u32, year: u16) -> Self {
        Key::Measure {
            measure_type,
            number,
            year,
        }
    }

    pub fn member(member_id: u32, year: u16) -> Self {
        Key::Member { member_id, year }
    }

    /// The ascending numeric component within the key's scan dimension
    pub fn sequence(&self) -> u32 {
        match self {
            Key::Measure { number, .. } => *number,
            Key::Member { member_id, .. } => *member_id,
        }
    }
}

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Key::Measure {
                measure_type,
                number,
                year,
            } => write!(f, "{}{}-{}", measure_type, number, year),
            Key::Member { member_id, year } => write!(f, "member {}-{}", member_id, year),
        }
    }
}

// ============================================================================
// Fetch Outcomes
// ============================================================================

/// Classified result of probing one key
#[derive(Debug, Clone)]
pub enum FetchOutcome {
    /// 2xx response with page content
    Found(String),
    /// Definitive not-found (404); never retried
    Absent,
    /// Retries exhausted on transient trouble (non-2xx/404 status,
    /// timeout, or connection error)
    PermanentFailure(String),
}

// ============================================================================
// Parsed Records
// ============================================================================

/// A parsed aggregate ready for ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ParsedRecord {
    Measure(MeasureRecord),
    Member(MemberRecord),
}

impl ParsedRecord {
    /// The natural key of the aggregate
    pub fn key(&self) -> Key {
        match self {
            ParsedRecord::Measure(m) => Key::measure(m.measure_type, m.number, m.year),
            ParsedRecord::Member(m) => Key::member(m.member_id, m.year),
        }
    }
}

/// A measure (bill, resolution, or governor's message) with its owned
/// child collections
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureRecord {
    pub measure_type: MeasureType,
    pub number: u32,
    pub year: u16,

    /// e.g. "SB1300 SD1 HD1 CD1"
    pub current_version: Option<String>,
    pub description: Option<String>,
    pub introducer: Option<String>,
    pub companion: Option<String>,
    pub package: Option<String>,
    pub current_referral: Option<String>,

    /// Set when the measure was signed into law
    pub act_number: Option<u32>,
    pub governor_message_number: Option<u32>,

    pub page_url: Option<String>,
    pub pdf_url: Option<String>,

    pub status_events: Vec<StatusEvent>,
    pub versions: Vec<MeasureVersion>,
    pub committee_reports: Vec<CommitteeReport>,
}

/// One row of the measure status table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEvent {
    pub date: NaiveDateTime,
    /// 'H' for House, 'S' for Senate
    pub chamber: Option<String>,
    pub action: String,
    pub conference_report_number: Option<String>,
}

/// One published draft of a measure, keyed by `(measure, version_name)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeasureVersion {
    /// e.g. "SB1300_CD1"
    pub version_name: String,
    /// e.g. "CD1"
    pub version_code: Option<String>,
    pub html_url: Option<String>,
    pub pdf_url: Option<String>,
}

/// A committee report filed against a measure, keyed by
/// `(measure, report_name)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeReport {
    /// e.g. "SB1300_SD1_SSCR96_"
    pub report_name: String,
    pub html_url: Option<String>,
    pub pdf_url: Option<String>,
}

/// A member aggregate: the base person plus one yearly term
///
/// The base row is keyed by `member_id` alone and accumulates a term per
/// scanned year; the term carries everything year-specific.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRecord {
    pub member_id: u32,
    pub year: u16,

    pub name: Option<String>,
    pub bio: Option<String>,

    pub term: MemberTerm,
    pub committees: Vec<CommitteeMembership>,
}

/// Year-specific member data, keyed by `(member_id, year)`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemberTerm {
    /// "Senator" or "Representative"
    pub title: Option<String>,
    /// "D", "R", or "I"
    pub party: Option<String>,

    pub district_type: Option<String>,
    pub district_number: Option<u32>,
    pub district_description: Option<String>,
    pub district_map_url: Option<String>,

    pub email: Option<String>,
    pub phone: Option<String>,
    pub photo_url: Option<String>,

    pub current_experience: Option<String>,
    pub previous_experience: Option<String>,
}

/// A committee seat held during a term, keyed by
/// `(term, committee_name, year)`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitteeMembership {
    pub committee_name: String,
    /// "Chair", "Vice Chair", or "Member"
    pub position: String,
}

// ============================================================================
// Ingestion Results
// ============================================================================

/// Result of handing an aggregate to the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The aggregate was written as one unit
    Inserted,
    /// The natural key already existed; nothing was touched
    AlreadyExists,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_type_round_trip() {
        for t in MeasureType::ALL {
            assert_eq!(t.as_str().parse::<MeasureType>().unwrap(), t);
        }
        assert!("XX".parse::<MeasureType>().is_err());
    }

    #[test]
    fn test_key_display() {
        let key = Key::measure(MeasureType::SB, 1300, 2025);
        assert_eq!(key.to_string(), "SB1300-2025");

        let key = Key::member(253, 2025);
        assert_eq!(key.to_string(), "member 253-2025");
    }

    #[test]
    fn test_key_sequence() {
        assert_eq!(Key::measure(MeasureType::HB, 42, 2024).sequence(), 42);
        assert_eq!(Key::member(7, 2025).sequence(), 7);
    }
}
