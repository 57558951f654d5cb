//! Delimited transaction file parser.
//!
//! Bank exports are plain text, one transaction per line, with fields split
//! by the profile's separator. The separator cannot be escaped inside a
//! field.

use crate::error::{Error, Result};
use crate::profile::Profile;
use crate::types::{DateOrder, StatementDateRange, StatementPeriod, TransactionRecord};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Transactions parsed from a delimited data file.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedStatement {
    /// Records in input order.
    pub transactions: Vec<TransactionRecord>,

    /// Earliest and latest transaction dates.
    pub period: StatementPeriod,

    /// Lines skipped because they did not contain the separator, blank
    /// lines included.
    pub skipped_lines: usize,
}

/// Profile values needed to read a line, resolved once.
#[derive(Debug)]
struct LineLayout {
    enclosed_in_quotes: bool,
    date_position: usize,
    description_position: usize,
    amount_position: usize,
    reference_position: Option<usize>,
    input_order: DateOrder,
    output_order: DateOrder,
}

impl LineLayout {
    fn from_profile(profile: &Profile) -> Result<Self> {
        Ok(LineLayout {
            enclosed_in_quotes: profile.enclosed_in_quotes()?,
            date_position: profile.position("TransactionDatePosition")?,
            description_position: profile.position("DescriptionPosition")?,
            amount_position: profile.position("TransactionAmountPosition")?,
            reference_position: profile.optional_position("ReferenceNumberPosition")?,
            input_order: profile.date_order("inputdateformat")?,
            output_order: profile.date_order("outputdateformat")?,
        })
    }

    fn field<'a>(
        &self,
        fields: &[&'a str],
        line: usize,
        name: &'static str,
        position: usize,
    ) -> Result<&'a str> {
        let value = fields.get(position).copied().ok_or(Error::FieldOutOfRange {
            line,
            field: name,
            position,
            available: fields.len(),
        })?;

        Ok(if self.enclosed_in_quotes {
            strip_quotes(value)
        } else {
            value
        })
    }
}

impl DelimitedStatement {
    /// Parse a data file.
    ///
    /// Fails with `DataFileNotFound` if the file does not exist.
    pub fn from_path<P: AsRef<Path>>(path: P, profile: &Profile) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::DataFileNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;
        debug!(path = %path.display(), "reading datafile");

        Self::from_read(&mut file, profile)
    }

    /// Parse transactions from any source implementing `Read`.
    ///
    /// Bytes that are not valid UTF-8 are dropped. Lines may end in `\n`,
    /// `\r\n` or a lone `\r`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ofxgen::delimited_format::DelimitedStatement;
    /// use ofxgen::profile::Profile;
    ///
    /// let profile: Profile = "[DEFAULT]\nseparator = ,\n\
    ///     [Position Information]\nTransactionDatePosition = 0\n\
    ///     DescriptionPosition = 1\nTransactionAmountPosition = 2\n\
    ///     [Date Information]\ninputdateformat = 2\noutputdateformat = 1\n"
    ///     .parse()?;
    ///
    /// let mut data = "12/31/2020,Coffee Shop,-4.50\n".as_bytes();
    /// let statement = DelimitedStatement::from_read(&mut data, &profile)?;
    /// assert_eq!(statement.transactions[0].display_date(), "31/12/2020");
    /// # Ok::<(), ofxgen::Error>(())
    /// ```
    pub fn from_read<R: Read>(reader: &mut R, profile: &Profile) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        let text = decode_lossy(&bytes);

        Self::parse_lines(&text, profile)
    }

    fn parse_lines(text: &str, profile: &Profile) -> Result<Self> {
        let separator = profile.separator();
        let mut resolved: Option<LineLayout> = None;
        let mut range = StatementDateRange::new();
        let mut transactions = Vec::new();
        let mut skipped_lines = 0;

        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim_end();
            debug!(line = line_no, "read data from datafile: \"{}\"", line);

            let fields = match split_fields(line, line_no, separator) {
                Ok(fields) => fields,
                Err(e) => {
                    warn!("{}", e);
                    skipped_lines += 1;
                    continue;
                }
            };

            let layout = match resolved {
                Some(ref layout) => layout,
                None => &*resolved.insert(LineLayout::from_profile(profile)?),
            };

            let record = Self::parse_record(&fields, line_no, layout)?;
            range.observe(record.date());
            transactions.push(record);
        }

        let period = range.finalize()?;
        info!(
            skipped = skipped_lines,
            "found {} transactions",
            transactions.len()
        );

        Ok(DelimitedStatement {
            transactions,
            period,
            skipped_lines,
        })
    }

    fn parse_record(fields: &[&str], line: usize, layout: &LineLayout) -> Result<TransactionRecord> {
        let date_text = layout.field(fields, line, "transaction date", layout.date_position)?;
        let malformed_date = || Error::MalformedDate {
            line,
            value: date_text.to_string(),
        };
        let parts = layout
            .input_order
            .split(date_text)
            .ok_or_else(malformed_date)?;
        let date = parts.to_date().ok_or_else(malformed_date)?;
        let display_date = layout.output_order.join(&parts);
        debug!(line = line, "Transaction Date=\"{}\"", display_date);

        let description = layout.field(fields, line, "description", layout.description_position)?;
        debug!(line = line, "Transaction Description=\"{}\"", description);

        let amount_text = layout.field(fields, line, "amount", layout.amount_position)?;
        debug!(line = line, "Transaction Amount=\"{}\"", amount_text);
        let amount = Decimal::from_str(amount_text.trim()).map_err(|_| Error::MalformedAmount {
            line,
            value: amount_text.to_string(),
        })?;

        let reference = layout
            .reference_position
            .map(|position| layout.field(fields, line, "reference number", position))
            .transpose()?
            .map(str::to_string);

        Ok(TransactionRecord::new(
            date,
            display_date,
            description.to_string(),
            amount,
            reference,
        ))
    }
}

fn split_fields<'a>(line: &'a str, line_no: usize, separator: &str) -> Result<Vec<&'a str>> {
    if !line.contains(separator) {
        return Err(Error::MalformedLine {
            line: line_no,
            separator: separator.to_string(),
        });
    }
    Ok(line.split(separator).collect())
}

/// Remove one leading and one trailing double quote, each only if present.
fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix('"').unwrap_or(value);
    value.strip_suffix('"').unwrap_or(value)
}

fn decode_lossy(bytes: &[u8]) -> String {
    let text: String = String::from_utf8_lossy(bytes)
        .trim_start_matches('\u{feff}')
        .chars()
        .filter(|&c| c != char::REPLACEMENT_CHARACTER)
        .collect();
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TransactionType;

    const PROFILE: &str = "\
[DEFAULT]
separator = ,
enclosedinquotes = no

[Position Information]
TransactionDatePosition = 0
DescriptionPosition = 1
TransactionAmountPosition = 2
ReferenceNumberPosition = 3

[Date Information]
inputdateformat = 2
outputdateformat = 1
";

    fn profile() -> Profile {
        PROFILE.parse().unwrap()
    }

    fn parse(profile: &Profile, data: &str) -> Result<DelimitedStatement> {
        DelimitedStatement::from_read(&mut data.as_bytes(), profile)
    }

    #[test]
    fn test_parse_lines() {
        let data = "12/31/2020,Salary,2500.00,R1\r\n01/02/2021,Rent,-900.00,R2\n";
        let statement = parse(&profile(), data).unwrap();

        assert_eq!(statement.transactions.len(), 2);
        let first = &statement.transactions[0];
        assert_eq!(first.display_date(), "31/12/2020");
        assert_eq!(first.posted_stamp(), "20201231000000");
        assert_eq!(first.description(), "Salary");
        assert_eq!(first.transaction_type(), TransactionType::Credit);
        assert_eq!(first.reference(), Some("R1"));

        let second = &statement.transactions[1];
        assert_eq!(second.amount().to_string(), "-900.00");
        assert_eq!(second.transaction_type(), TransactionType::Debit);
        assert_eq!(statement.period.start_stamp(), "20201231000000");
        assert_eq!(statement.period.end_stamp(), "20210102000000");
    }

    #[test]
    fn test_lines_without_separator_are_skipped() {
        let data = "Account export\n01/05/2020,A,1,X\nfooter line\n03/10/2020,B,2,Y\n";
        let statement = parse(&profile(), data).unwrap();
        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.skipped_lines, 2);
    }

    #[test]
    fn test_blank_lines_are_counted_as_skipped() {
        let data = "01/05/2020,A,1,X\n\n   \n03/10/2020,B,2,Y\n";
        let statement = parse(&profile(), data).unwrap();
        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.skipped_lines, 2);
    }

    #[test]
    fn test_carriage_return_line_endings() {
        let statement = parse(&profile(), "01/05/2020,A,1.00,X\r01/06/2020,B,-2.00,Y\r").unwrap();
        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.transactions[1].amount().to_string(), "-2.00");

        assert!(matches!(
            parse(&profile(), "01/05/2020,A,1.00,X\r01/06/2020,B,oops,Y\r"),
            Err(Error::MalformedAmount { line: 2, .. })
        ));

        let mixed = "01/05/2020,A,1.00,X\r\nheader\r01/06/2020,B,-2.00,Y\n";
        let statement = parse(&profile(), mixed).unwrap();
        assert_eq!(statement.transactions.len(), 2);
        assert_eq!(statement.skipped_lines, 1);
    }

    #[test]
    fn test_two_digit_year_is_malformed() {
        assert!(matches!(
            parse(&profile(), "01/05/20,A,1,X\n"),
            Err(Error::MalformedDate { line: 1, ref value }) if value == "01/05/20"
        ));
    }

    #[test]
    fn test_date_range_ignores_input_order() {
        let data = "01/05/2020,A,1,X\n03/10/2020,B,2,Y\n12/25/2019,C,3,Z\n";
        let statement = parse(&profile(), data).unwrap();
        assert_eq!(statement.period.start_stamp(), "20191225000000");
        assert_eq!(statement.period.end_stamp(), "20200310000000");
        assert_eq!(statement.transactions[2].description(), "C");
    }

    #[test]
    fn test_quote_stripping() {
        let data = "\"12/31/2020\",\"Coffee Shop\",\"-4.50\",\"77\"\n";

        let quoted: Profile = PROFILE.replace("enclosedinquotes = no", "enclosedinquotes = yes").parse().unwrap();
        let statement = parse(&quoted, data).unwrap();
        let record = &statement.transactions[0];
        assert_eq!(record.description(), "Coffee Shop");
        assert_eq!(record.reference(), Some("77"));
        assert_eq!(record.amount().to_string(), "-4.50");

        let unquoted: Profile = "\
[DEFAULT]
separator = ,
[Position Information]
TransactionDatePosition = 0
DescriptionPosition = 1
TransactionAmountPosition = 2
[Date Information]
inputdateformat = 2
outputdateformat = 2
"
        .parse()
        .unwrap();
        let statement = parse(&unquoted, "12/31/2020,\"Coffee Shop\",5\n").unwrap();
        assert_eq!(statement.transactions[0].description(), "\"Coffee Shop\"");
        assert_eq!(statement.transactions[0].display_date(), "12/31/2020");
        assert_eq!(statement.transactions[0].reference(), None);
    }

    #[test]
    fn test_strip_quotes_only_once() {
        assert_eq!(strip_quotes("\"\"x\"\""), "\"x\"");
        assert_eq!(strip_quotes("\"open"), "open");
        assert_eq!(strip_quotes("plain"), "plain");
    }

    #[test]
    fn test_empty_statement() {
        assert!(matches!(parse(&profile(), ""), Err(Error::EmptyStatement)));
        assert!(matches!(
            parse(&profile(), "no separators here\n\n"),
            Err(Error::EmptyStatement)
        ));
    }

    #[test]
    fn test_malformed_amount_aborts() {
        let data = "01/05/2020,A,1,X\n01/06/2020,B,abc,Y\n";
        assert!(matches!(
            parse(&profile(), data),
            Err(Error::MalformedAmount { line: 2, ref value }) if value == "abc"
        ));
    }

    #[test]
    fn test_malformed_date_aborts() {
        assert!(matches!(
            parse(&profile(), "2020-01-05,A,1,X\n"),
            Err(Error::MalformedDate { line: 1, .. })
        ));
        assert!(matches!(
            parse(&profile(), "02/30/2020,A,1,X\n"),
            Err(Error::MalformedDate { line: 1, .. })
        ));
    }

    #[test]
    fn test_short_line() {
        assert!(matches!(
            parse(&profile(), "01/05/2020,A\n"),
            Err(Error::FieldOutOfRange { line: 1, position: 2, available: 2, .. })
        ));
    }

    #[test]
    fn test_invalid_utf8_is_dropped() {
        let mut data: &[u8] = b"01/05/2020,Caf\xe9,1,X\n";
        let statement = DelimitedStatement::from_read(&mut data, &profile()).unwrap();
        assert_eq!(statement.transactions[0].description(), "Caf");
    }

    #[test]
    fn test_multi_character_separator() {
        let profile: Profile = PROFILE.replace("separator = ,", "separator = ::").parse().unwrap();
        let statement = parse(&profile, "01/05/2020::A, B::1::X\n").unwrap();
        assert_eq!(statement.transactions[0].description(), "A, B");
    }

    #[test]
    fn test_missing_positions_fail_lazily() {
        let profile: Profile = "[DEFAULT]\nseparator = ,\n".parse().unwrap();
        assert!(matches!(parse(&profile, "no data\n"), Err(Error::EmptyStatement)));
        assert!(matches!(
            parse(&profile, "01/05/2020,A,1\n"),
            Err(Error::MissingProfileKey { .. })
        ));
    }

    #[test]
    fn test_missing_data_file() {
        assert!(matches!(
            DelimitedStatement::from_path("/nonexistent/data.csv", &profile()),
            Err(Error::DataFileNotFound(_))
        ));
    }
}
