//! Break ledger policy.
//!
//! Pure read/derive operations over a shift's break intervals. The clock
//! engine is the only writer; it loads the shift's ledger rows and delegates
//! the break-specific invariants to the functions here:
//!
//! - at most one interval may be open (null end) at a time;
//! - at most one `obligatorio` interval may exist per calendar day.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::Timestamp;

/// Kind of a break interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BreakKind {
    /// The once-per-day mandatory break.
    Obligatorio,
    /// A voluntary additional pause.
    Adicional,
}

impl BreakKind {
    /// Wire/storage name, e.g. `"obligatorio"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Obligatorio => "obligatorio",
            Self::Adicional => "adicional",
        }
    }

    /// Parse a storage name back to a kind.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "obligatorio" => Some(Self::Obligatorio),
            "adicional" => Some(Self::Adicional),
            _ => None,
        }
    }
}

impl std::fmt::Display for BreakKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One break interval, open while `ended_at` is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakInterval {
    pub kind: BreakKind,
    pub started_at: Timestamp,
    pub ended_at: Option<Timestamp>,
}

/// The single open interval, if any.
pub fn open_break(intervals: &[BreakInterval]) -> Option<&BreakInterval> {
    intervals.iter().find(|b| b.ended_at.is_none())
}

/// Whether an open `obligatorio` interval exists.
pub fn has_open_mandatory_break(intervals: &[BreakInterval]) -> bool {
    matches!(open_break(intervals), Some(b) if b.kind == BreakKind::Obligatorio)
}

/// Whether any `obligatorio` interval (open or closed) started on `day`.
pub fn mandatory_taken_on(intervals: &[BreakInterval], day: NaiveDate) -> bool {
    intervals
        .iter()
        .any(|b| b.kind == BreakKind::Obligatorio && b.started_at.date_naive() == day)
}

/// Whole minutes between start and end; 0 while the interval is open.
pub fn duration_minutes(interval: &BreakInterval) -> i64 {
    match interval.ended_at {
        Some(end) => (end - interval.started_at).num_minutes(),
        None => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn at(h: u32, m: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap()
    }

    fn closed(kind: BreakKind, start: Timestamp, end: Timestamp) -> BreakInterval {
        BreakInterval {
            kind,
            started_at: start,
            ended_at: Some(end),
        }
    }

    fn open(kind: BreakKind, start: Timestamp) -> BreakInterval {
        BreakInterval {
            kind,
            started_at: start,
            ended_at: None,
        }
    }

    #[test]
    fn open_break_finds_the_unclosed_interval() {
        let ledger = vec![
            closed(BreakKind::Adicional, at(10, 0), at(10, 15)),
            open(BreakKind::Obligatorio, at(13, 0)),
        ];
        let found = open_break(&ledger).expect("one open interval");
        assert_eq!(found.kind, BreakKind::Obligatorio);
        assert_eq!(found.started_at, at(13, 0));
    }

    #[test]
    fn open_break_none_when_all_closed() {
        let ledger = vec![closed(BreakKind::Adicional, at(10, 0), at(10, 15))];
        assert!(open_break(&ledger).is_none());
        assert!(open_break(&[]).is_none());
    }

    #[test]
    fn has_open_mandatory_break_checks_kind() {
        let adicional = vec![open(BreakKind::Adicional, at(11, 0))];
        assert!(!has_open_mandatory_break(&adicional));

        let obligatorio = vec![open(BreakKind::Obligatorio, at(13, 0))];
        assert!(has_open_mandatory_break(&obligatorio));
    }

    #[test]
    fn mandatory_taken_counts_open_and_closed() {
        let day = at(13, 0).date_naive();

        let open_one = vec![open(BreakKind::Obligatorio, at(13, 0))];
        assert!(mandatory_taken_on(&open_one, day));

        let closed_one = vec![closed(BreakKind::Obligatorio, at(13, 0), at(13, 30))];
        assert!(mandatory_taken_on(&closed_one, day));
    }

    #[test]
    fn mandatory_taken_ignores_other_days_and_kinds() {
        let day = at(13, 0).date_naive();

        let adicional = vec![closed(BreakKind::Adicional, at(13, 0), at(13, 30))];
        assert!(!mandatory_taken_on(&adicional, day));

        let yesterday = vec![closed(
            BreakKind::Obligatorio,
            at(13, 0) - chrono::Duration::days(1),
            at(13, 30) - chrono::Duration::days(1),
        )];
        assert!(!mandatory_taken_on(&yesterday, day));
    }

    #[test]
    fn duration_is_zero_while_open() {
        assert_eq!(duration_minutes(&open(BreakKind::Adicional, at(10, 0))), 0);
    }

    #[test]
    fn duration_in_whole_minutes() {
        let b = closed(BreakKind::Obligatorio, at(13, 0), at(13, 42));
        assert_eq!(duration_minutes(&b), 42);
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in [BreakKind::Obligatorio, BreakKind::Adicional] {
            assert_eq!(BreakKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(BreakKind::parse("siesta"), None);
    }
}
