//! Institution profile loader.
//!
//! A profile is an INI-like text file describing how a bank's export is laid
//! out:
//!
//! ```text
//! [DEFAULT]
//! separator = ,
//! language = ENG
//! enclosedinquotes = yes
//! currency = USD
//!
//! [Position Information]
//! TransactionDatePosition = 0
//! DescriptionPosition = 1
//! TransactionAmountPosition = 2
//! ReferenceNumberPosition = 3
//!
//! [Date Information]
//! inputdateformat = 2
//! outputdateformat = 1
//!
//! [Account Information]
//! accountnumber = 000000000
//! accountid = 111111111
//! accounttype = CHECKING
//! ```
//!
//! Only `separator` is checked when the profile is loaded. Every other key is
//! looked up when it is first needed.

use crate::error::{Error, Result};
use crate::types::DateOrder;
use ini::Ini;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Section holding keys shared by every other section.
pub const DEFAULT_SECTION: &str = "DEFAULT";
/// Section holding zero-based column indices.
pub const POSITION_SECTION: &str = "Position Information";
/// Section holding the input and output date orders.
pub const DATE_SECTION: &str = "Date Information";
/// Section holding the account block of the statement.
pub const ACCOUNT_SECTION: &str = "Account Information";

/// Parsed profile.
#[derive(Debug, Clone)]
pub struct Profile {
    ini: Ini,
    separator: String,
}

/// Account block of the statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountInfo {
    /// Emitted as `<BANKID>`.
    pub account_number: String,
    pub account_id: String,
    pub account_type: String,
}

impl Profile {
    /// Load a profile from a file.
    ///
    /// Fails with `ConfigNotFound` if the file does not exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        debug!(path = %path.display(), "reading profile");

        let text = fs::read_to_string(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::ConfigNotFound(path.to_path_buf()),
            _ => Error::Io(e),
        })?;

        text.parse()
    }

    fn parse_ini(text: &str) -> Result<Self> {
        let ini = Ini::load_from_str(text).map_err(|e| Error::ProfileSyntax {
            line: e.line,
            message: e.to_string(),
        })?;

        let separator = match ini.get_from(Some(DEFAULT_SECTION), "separator") {
            Some(value) if !value.is_empty() => value.to_string(),
            _ => return Err(Error::MissingMandatoryField("separator".to_string())),
        };
        debug!(separator = %separator, "separator will be used");

        Ok(Profile { ini, separator })
    }

    /// Field separator of the data file.
    pub fn separator(&self) -> &str {
        &self.separator
    }

    /// Look up a key, falling back to the DEFAULT section.
    ///
    /// Keys and section names are case-insensitive.
    pub fn get(&self, section: &str, key: &str) -> Option<&str> {
        self.ini
            .section(Some(section))
            .and_then(|properties| properties.get(key))
            .or_else(|| {
                self.ini
                    .section(Some(DEFAULT_SECTION))
                    .and_then(|properties| properties.get(key))
            })
    }

    /// Look up a key that must be present.
    pub fn require(&self, section: &str, key: &str) -> Result<&str> {
        self.get(section, key).ok_or_else(|| Error::MissingProfileKey {
            section: section.to_string(),
            key: key.to_string(),
        })
    }

    /// Whether fields are wrapped in double quotes. Defaults to `false`.
    pub fn enclosed_in_quotes(&self) -> Result<bool> {
        match self.get(DEFAULT_SECTION, "enclosedinquotes") {
            None => Ok(false),
            Some(value) => parse_bool(value).ok_or_else(|| {
                invalid_value(DEFAULT_SECTION, "enclosedinquotes", value)
            }),
        }
    }

    /// Zero-based column index from the `Position Information` section.
    pub fn position(&self, key: &str) -> Result<usize> {
        let value = self.require(POSITION_SECTION, key)?;
        value
            .parse::<usize>()
            .map_err(|_| invalid_value(POSITION_SECTION, key, value))
    }

    /// Column index that may be left out of the profile.
    pub fn optional_position(&self, key: &str) -> Result<Option<usize>> {
        match self.get(POSITION_SECTION, key) {
            None => Ok(None),
            Some(_) => self.position(key).map(Some),
        }
    }

    /// Date order from the `Date Information` section.
    pub fn date_order(&self, key: &str) -> Result<DateOrder> {
        let value = self.require(DATE_SECTION, key)?;
        value
            .parse::<DateOrder>()
            .map_err(|_| invalid_value(DATE_SECTION, key, value))
    }

    /// Language reported in the sign-on response.
    pub fn language(&self) -> Result<&str> {
        self.require(DEFAULT_SECTION, "language")
    }

    /// Statement currency, taken from `Account Information` or DEFAULT.
    pub fn currency(&self) -> Result<&str> {
        self.require(ACCOUNT_SECTION, "currency")
    }

    /// Account block of the statement.
    pub fn account(&self) -> Result<AccountInfo> {
        Ok(AccountInfo {
            account_number: self.require(ACCOUNT_SECTION, "accountnumber")?.to_string(),
            account_id: self.require(ACCOUNT_SECTION, "accountid")?.to_string(),
            account_type: self.require(ACCOUNT_SECTION, "accounttype")?.to_string(),
        })
    }
}

impl std::str::FromStr for Profile {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_ini(s)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "1" | "yes" | "true" | "on" => Some(true),
        "0" | "no" | "false" | "off" => Some(false),
        _ => None,
    }
}

fn invalid_value(section: &str, key: &str, value: &str) -> Error {
    Error::InvalidProfileValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
    }
}
