//! Candidate-key enumeration
//!
//! A [`Dimension`] is one scan's address space: an explicit key list, a
//! closed numeric range of member IDs, or an open-ended measure counter
//! bounded only by the safety ceiling. Keys ascend numerically within a
//! dimension.

use capitol_common::types::{Key, MeasureType};

/// One scan dimension
#[derive(Debug, Clone)]
pub enum Dimension {
    /// A closed, explicit key list; scanned to exhaustion
    Explicit(Vec<Key>),

    /// A closed member-ID range for one year; scanned to exhaustion
    MemberRange { year: u16, start: u32, end: u32 },

    /// An open-ended measure counter; termination is miss-driven, with
    /// `ceiling` as the hard stop
    OpenMeasures {
        measure_type: MeasureType,
        year: u16,
        start: u32,
        ceiling: u32,
    },
}

impl Dimension {
    /// Whether termination is miss-driven rather than exhaustion-driven
    pub fn is_open(&self) -> bool {
        matches!(self, Dimension::OpenMeasures { .. })
    }

    /// Human-readable label for reports and logs
    pub fn label(&self) -> String {
        match self {
            Dimension::Explicit(keys) => format!("explicit list of {} keys", keys.len()),
            Dimension::MemberRange { year, start, end } => {
                format!("members {}-{} for {}", start, end, year)
            },
            Dimension::OpenMeasures {
                measure_type,
                year,
                start,
                ..
            } => format!("{} measures for {} from {}", measure_type, year, start),
        }
    }

    /// The ordered candidate keys
    ///
    /// Open dimensions stop at the safety ceiling; the controller usually
    /// terminates the walk long before that.
    pub fn keys(&self) -> Box<dyn Iterator<Item = Key> + Send + '_> {
        match self {
            Dimension::Explicit(keys) => Box::new(keys.iter().copied()),
            Dimension::MemberRange { year, start, end } => {
                let year = *year;
                Box::new((*start..=*end).map(move |id| Key::member(id, year)))
            },
            Dimension::OpenMeasures {
                measure_type,
                year,
                start,
                ceiling,
            } => {
                let (measure_type, year) = (*measure_type, *year);
                Box::new((*start..=*ceiling).map(move |n| Key::measure(measure_type, n, year)))
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_member_range_is_inclusive_and_ordered() {
        let dim = Dimension::MemberRange {
            year: 2025,
            start: 1,
            end: 3,
        };
        let keys: Vec<Key> = dim.keys().collect();
        assert_eq!(
            keys,
            vec![
                Key::member(1, 2025),
                Key::member(2, 2025),
                Key::member(3, 2025)
            ]
        );
        assert!(!dim.is_open());
    }

    #[test]
    fn test_open_measures_bounded_by_ceiling() {
        let dim = Dimension::OpenMeasures {
            measure_type: MeasureType::SB,
            year: 2025,
            start: 9_998,
            ceiling: 10_000,
        };
        let keys: Vec<Key> = dim.keys().collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(keys[2], Key::measure(MeasureType::SB, 10_000, 2025));
        assert!(dim.is_open());
    }

    #[test]
    fn test_explicit_preserves_order() {
        let list = vec![
            Key::measure(MeasureType::SB, 1300, 2025),
            Key::measure(MeasureType::HB, 1, 2025),
        ];
        let dim = Dimension::Explicit(list.clone());
        let keys: Vec<Key> = dim.keys().collect();
        assert_eq!(keys, list);
    }
}
