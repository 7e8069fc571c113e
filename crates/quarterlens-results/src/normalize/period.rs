//! Period labels and their chronological ordering

use chrono::{Datelike, Months, NaiveDate};
use std::cmp::Ordering;
use std::fmt;

/// Sort and merge key for a reporting period
///
/// Labels that parse as a date (ISO dates, "Mar 2024", "Q1 2024", "2024Q1",
/// "1Q2024") order chronologically by period end. Anything else is kept as
/// an opaque label and sorts after every dated period.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PeriodKey {
    Date(NaiveDate),
    Label(String),
}

impl PeriodKey {
    /// Parse a raw period label
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        parse_iso(label)
            .or_else(|| parse_month_year(label))
            .or_else(|| parse_quarter(label))
            .map_or_else(|| Self::Label(label.to_string()), Self::Date)
    }

    /// Period end date, when the label carried one
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Date(date) => Some(*date),
            Self::Label(_) => None,
        }
    }
}

impl Ord for PeriodKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::Date(_), Self::Label(_)) => Ordering::Less,
            (Self::Label(_), Self::Date(_)) => Ordering::Greater,
            (Self::Label(a), Self::Label(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for PeriodKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Date(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Label(label) => f.write_str(label),
        }
    }
}

// "2024-03-31", "2024-03-31T00:00:00", "2024-03-31 00:00:00+00:00"
fn parse_iso(label: &str) -> Option<NaiveDate> {
    let prefix = label.get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}

// "Mar 2024", "Mar-2024", "March 2024"
fn parse_month_year(label: &str) -> Option<NaiveDate> {
    let normalized = label.replace('-', " ");
    let first = NaiveDate::parse_from_str(&format!("1 {normalized}"), "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(&format!("1 {normalized}"), "%d %B %Y"))
        .ok()?;
    month_end(first.year(), first.month())
}

// "Q1 2024", "2024Q1", "2024-Q1", "1Q2024"
fn parse_quarter(label: &str) -> Option<NaiveDate> {
    let compact: String = label
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .collect::<String>()
        .to_ascii_uppercase();
    if compact.len() != 6 || !compact.is_ascii() {
        return None;
    }

    let (quarter, year) = if let Some(rest) = compact.strip_prefix('Q') {
        (rest.get(..1)?, rest.get(1..)?)
    } else if compact.get(4..5) == Some("Q") {
        (compact.get(5..)?, compact.get(..4)?)
    } else if compact.get(1..2) == Some("Q") {
        (compact.get(..1)?, compact.get(2..)?)
    } else {
        return None;
    };

    let quarter: u32 = quarter.parse().ok()?;
    let year: i32 = year.parse().ok()?;
    if !(1..=4).contains(&quarter) {
        return None;
    }
    month_end(year, quarter * 3)
}

fn month_end(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)?
        .checked_add_months(Months::new(1))?
        .pred_opt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> PeriodKey {
        PeriodKey::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn test_iso_labels() {
        assert_eq!(PeriodKey::parse("2024-03-31"), date(2024, 3, 31));
        assert_eq!(PeriodKey::parse("2024-03-31T00:00:00"), date(2024, 3, 31));
        assert_eq!(
            PeriodKey::parse(" 2024-06-30 00:00:00+00:00 "),
            date(2024, 6, 30)
        );
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(PeriodKey::parse("Mar 2024"), date(2024, 3, 31));
        assert_eq!(PeriodKey::parse("Feb-2024"), date(2024, 2, 29));
        assert_eq!(PeriodKey::parse("December 2023"), date(2023, 12, 31));
    }

    #[test]
    fn test_quarter_labels() {
        assert_eq!(PeriodKey::parse("Q1 2024"), date(2024, 3, 31));
        assert_eq!(PeriodKey::parse("2024Q2"), date(2024, 6, 30));
        assert_eq!(PeriodKey::parse("2024-Q3"), date(2024, 9, 30));
        assert_eq!(PeriodKey::parse("4Q2023"), date(2023, 12, 31));
        assert_eq!(PeriodKey::parse("Q5 2024"), PeriodKey::Label("Q5 2024".into()));
    }

    #[test]
    fn test_opaque_labels_sort_after_dates() {
        let mut keys = vec![
            PeriodKey::parse("Q2"),
            PeriodKey::parse("2024-06-30"),
            PeriodKey::parse("Q1"),
            PeriodKey::parse("2023-12-31"),
        ];
        keys.sort();
        let shown: Vec<_> = keys.iter().map(ToString::to_string).collect();
        assert_eq!(shown, ["2023-12-31", "2024-06-30", "Q1", "Q2"]);
    }

    #[test]
    fn test_mixed_formats_merge() {
        assert_eq!(PeriodKey::parse("Q1 2024"), PeriodKey::parse("2024-03-31"));
        assert!(PeriodKey::parse("Q1 2024").date().is_some());
        assert!(PeriodKey::parse("TTM").date().is_none());
    }
}
