//! Common types shared by the parser and the OFX writer.

use crate::error::{Error, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

/// Format a date as an OFX timestamp (`YYYYMMDDHHMMSS`, always midnight).
pub fn ofx_timestamp(date: &NaiveDate) -> String {
    date.format("%Y%m%d000000").to_string()
}

/// Order of the components in a slash-separated date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    /// `day/month/year`, profile value `1`.
    DayMonthYear,
    /// `month/day/year`, profile value `2`.
    MonthDayYear,
}

impl FromStr for DateOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "dmy" => Ok(DateOrder::DayMonthYear),
            "2" | "mdy" => Ok(DateOrder::MonthDayYear),
            _ => Err(format!("Invalid date order: {}", s)),
        }
    }
}

impl DateOrder {
    /// Split date text into its components, read in this order.
    ///
    /// Returns `None` unless the text has exactly three `/`-separated parts.
    pub fn split<'a>(&self, text: &'a str) -> Option<DateParts<'a>> {
        let mut parts = text.split('/');
        let (first, second, year) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() {
            return None;
        }

        let (day, month) = match self {
            DateOrder::DayMonthYear => (first, second),
            DateOrder::MonthDayYear => (second, first),
        };

        Some(DateParts {
            day: day.trim(),
            month: month.trim(),
            year: year.trim(),
        })
    }

    /// Join components back into slash-separated text in this order.
    pub fn join(&self, parts: &DateParts<'_>) -> String {
        match self {
            DateOrder::DayMonthYear => format!("{}/{}/{}", parts.day, parts.month, parts.year),
            DateOrder::MonthDayYear => format!("{}/{}/{}", parts.month, parts.day, parts.year),
        }
    }
}

/// Day, month and year text of a date as written in the data file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateParts<'a> {
    pub day: &'a str,
    pub month: &'a str,
    pub year: &'a str,
}

impl DateParts<'_> {
    /// Validate the components as a calendar date with a four-digit year.
    pub fn to_date(&self) -> Option<NaiveDate> {
        let year = self.year.parse::<i32>().ok()?;
        if !(1000..=9999).contains(&year) {
            return None;
        }
        let month = self.month.parse::<u32>().ok()?;
        let day = self.day.parse::<u32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    }
}

/// OFX transaction type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionType {
    /// Money in (amount zero or positive).
    Credit,
    /// Money out (negative amount).
    Debit,
}

impl TransactionType {
    /// Classify an amount by its sign.
    pub fn from_amount(amount: &Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            TransactionType::Debit
        } else {
            TransactionType::Credit
        }
    }

    /// Value of the `<TRNTYPE>` element.
    pub fn as_ofx(&self) -> &'static str {
        match self {
            TransactionType::Credit => "CREDIT",
            TransactionType::Debit => "DEBIT",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ofx())
    }
}

/// One parsed line of the data file.
///
/// The transaction type is derived from the amount when the record is built,
/// so the two can never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionRecord {
    date: NaiveDate,
    display_date: String,
    description: String,
    amount: Decimal,
    transaction_type: TransactionType,
    reference: Option<String>,
}

impl TransactionRecord {
    /// Create a record; the type follows the sign of `amount`.
    pub fn new(
        date: NaiveDate,
        display_date: String,
        description: String,
        amount: Decimal,
        reference: Option<String>,
    ) -> Self {
        Self {
            date,
            display_date,
            description,
            transaction_type: TransactionType::from_amount(&amount),
            amount,
            reference,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Date re-joined in the profile's output order.
    pub fn display_date(&self) -> &str {
        &self.display_date
    }

    /// Posted-date stamp, `YYYYMMDD000000`.
    pub fn posted_stamp(&self) -> String {
        ofx_timestamp(&self.date)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }
}

/// Running earliest/latest transaction dates.
///
/// Starts at sentinel extremes and narrows as dates are observed. Ties keep
/// the first-seen date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementDateRange {
    earliest: NaiveDate,
    latest: NaiveDate,
}

impl Default for StatementDateRange {
    fn default() -> Self {
        Self::new()
    }
}

impl StatementDateRange {
    pub fn new() -> Self {
        Self {
            earliest: NaiveDate::MAX,
            latest: NaiveDate::MIN,
        }
    }

    /// Narrow the range to include `date`.
    pub fn observe(&mut self, date: NaiveDate) {
        if date < self.earliest {
            self.earliest = date;
        }
        if date > self.latest {
            self.latest = date;
        }
    }

    /// Whether no date has been observed yet.
    pub fn is_empty(&self) -> bool {
        self.earliest > self.latest
    }

    /// Close the range, failing with `EmptyStatement` if it never narrowed.
    pub fn finalize(self) -> Result<StatementPeriod> {
        if self.is_empty() {
            return Err(Error::EmptyStatement);
        }
        Ok(StatementPeriod {
            start: self.earliest,
            end: self.latest,
        })
    }
}

/// Dates covered by a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatementPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl StatementPeriod {
    /// `<DTSTART>` value.
    pub fn start_stamp(&self) -> String {
        ofx_timestamp(&self.start)
    }

    /// `<DTEND>` value.
    pub fn end_stamp(&self) -> String {
        ofx_timestamp(&self.end)
    }
}
