//! Record models for the source export and the aggregated output rows.

use crate::money::Amount;
use std::fmt;
use std::str::FromStr;

/// Expense category of a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Diagnosis and treatment.
    Medical,

    /// Over-the-counter medicine purchases.
    Otc,

    /// Anything else the notice lists (transport, care services, ...).
    Other,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Medical, Category::Otc, Category::Other];

    pub fn name(self) -> &'static str {
        match self {
            Category::Medical => "medical",
            Category::Otc => "otc",
            Category::Other => "other",
        }
    }
}

/// Calendar month of a visit, as printed on the notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: u16,
    pub month: u8,
}

impl YearMonth {
    /// Creates a `YearMonth`, returning `None` outside 1..=9999 / 1..=12.
    pub fn new(year: u16, month: u8) -> Option<Self> {
        if (1..=9999).contains(&year) && (1..=12).contains(&month) {
            Some(YearMonth { year, month })
        } else {
            None
        }
    }
}

impl FromStr for YearMonth {
    type Err = ();

    /// Accepts `YYYY-MM`, `YYYY/MM` and `YYYYMM`.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if !s.is_ascii() {
            return Err(());
        }
        let (year, month) = match s.find(&['-', '/'][..]) {
            Some(idx) => (&s[..idx], &s[idx + 1..]),
            None if s.len() == 6 => s.split_at(4),
            None => return Err(()),
        };

        let digits = |part: &str| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit());
        if year.len() != 4 || !(1..=2).contains(&month.len()) || !digits(year) || !digits(month)
        {
            return Err(());
        }

        let year = year.parse::<u16>().map_err(|_| ())?;
        let month = month.parse::<u8>().map_err(|_| ())?;
        YearMonth::new(year, month).ok_or(())
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// One row of the source export.
///
/// String fields are trimmed once, at parse time. `amount_refunded` may
/// exceed `amount_paid`; the value is carried through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputRecord {
    pub recipient_name: String,
    pub provider_name: String,
    pub category: Category,
    pub amount_paid: Amount,
    pub amount_refunded: Amount,
    pub period: YearMonth,
}

impl InputRecord {
    pub fn group_key(&self) -> GroupKey {
        GroupKey {
            recipient_name: self.recipient_name.clone(),
            provider_name: self.provider_name.clone(),
            category: self.category,
        }
    }
}

/// Identity of an output row. Compared exactly: no case folding.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupKey {
    pub recipient_name: String,
    pub provider_name: String,
    pub category: Category,
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {})",
            self.recipient_name,
            self.provider_name,
            self.category.name()
        )
    }
}

/// One output row: the totals of every input row sharing a `GroupKey`.
///
/// # Invariants
///
/// - `total_paid` and `total_refunded` are exact sums of the group's rows
/// - `payment_month` is the period of the last row seen for the group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedRecord {
    pub key: GroupKey,
    pub total_paid: Amount,
    pub total_refunded: Amount,
    pub payment_month: YearMonth,
}

impl AggregatedRecord {
    /// Representative payment date, `MM/01/YYYY`.
    pub fn payment_date(&self) -> String {
        format!(
            "{:02}/01/{:04}",
            self.payment_month.month, self.payment_month.year
        )
    }

    /// The aggregated row expressed as a single source row.
    pub fn to_input_record(&self) -> InputRecord {
        InputRecord {
            recipient_name: self.key.recipient_name.clone(),
            provider_name: self.key.provider_name.clone(),
            category: self.key.category,
            amount_paid: self.total_paid,
            amount_refunded: self.total_refunded,
            period: self.payment_month,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ym(s: &str) -> Option<YearMonth> {
        YearMonth::from_str(s).ok()
    }

    #[test]
    fn test_year_month_accepts_supported_layouts() {
        let expected = YearMonth::new(2023, 4);
        assert_eq!(ym("2023-04"), expected);
        assert_eq!(ym("2023/04"), expected);
        assert_eq!(ym("2023/4"), expected);
        assert_eq!(ym("202304"), expected);
        assert_eq!(ym(" 2023-04 "), expected);
    }

    #[test]
    fn test_year_month_rejects_bad_values() {
        assert_eq!(ym(""), None);
        assert_eq!(ym("2023-13"), None);
        assert_eq!(ym("2023-00"), None);
        assert_eq!(ym("0000-01"), None);
        assert_eq!(ym("23-04"), None);
        assert_eq!(ym("2023-004"), None);
        assert_eq!(ym("2023-+4"), None);
        assert_eq!(ym("2023"), None);
        assert_eq!(ym("April 2023"), None);
    }

    #[test]
    fn test_year_month_display() {
        assert_eq!(YearMonth::new(2023, 5).unwrap().to_string(), "2023-05");
    }

    #[test]
    fn test_payment_date_uses_first_day() {
        let record = AggregatedRecord {
            key: GroupKey {
                recipient_name: "A".to_string(),
                provider_name: "ClinicX".to_string(),
                category: Category::Medical,
            },
            total_paid: Amount::new(1500),
            total_refunded: Amount::new(200),
            payment_month: YearMonth::new(2023, 5).unwrap(),
        };

        assert_eq!(record.payment_date(), "05/01/2023");
        let back = record.to_input_record();
        assert_eq!(back.group_key(), record.key);
        assert_eq!(back.amount_paid, Amount::new(1500));
    }

    #[test]
    fn test_group_key_is_case_sensitive() {
        let a = GroupKey {
            recipient_name: "a".to_string(),
            provider_name: "Clinic".to_string(),
            category: Category::Otc,
        };
        let mut b = a.clone();
        b.recipient_name = "A".to_string();
        assert_ne!(a, b);
    }
}
