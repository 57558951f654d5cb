//! Error types for the ofxgen library.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while loading a profile, parsing a data file
/// or writing the OFX document.
#[derive(Debug, Error)]
pub enum Error {
    /// The profile file does not exist.
    #[error("unable to read profile file \"{}\"", .0.display())]
    ConfigNotFound(PathBuf),

    /// A key the profile cannot do without is absent from the DEFAULT section.
    #[error("\"{0}\" is a mandatory item in the profile and it was not found")]
    MissingMandatoryField(String),

    /// The profile text is not valid INI.
    #[error("profile syntax error at line {line}: {message}")]
    ProfileSyntax { line: usize, message: String },

    /// A key needed at this stage is missing from the profile.
    #[error("profile key \"{key}\" not found in section [{section}]")]
    MissingProfileKey { section: String, key: String },

    /// A profile key holds a value of the wrong shape.
    #[error("invalid value \"{value}\" for profile key \"{key}\" in section [{section}]")]
    InvalidProfileValue {
        section: String,
        key: String,
        value: String,
    },

    /// The transaction data file does not exist.
    #[error("unable to read datafile \"{}\"", .0.display())]
    DataFileNotFound(PathBuf),

    /// A data line does not contain the configured separator.
    #[error("invalid line of transaction data at line {line}: \"{separator}\" separator not found")]
    MalformedLine { line: usize, separator: String },

    /// A date field is not a valid slash-separated calendar date.
    #[error("invalid date \"{value}\" at line {line}")]
    MalformedDate { line: usize, value: String },

    /// A configured column lies beyond the fields present on the line.
    #[error("line {line} has {available} fields, {field} expected at position {position}")]
    FieldOutOfRange {
        line: usize,
        field: &'static str,
        position: usize,
        available: usize,
    },

    /// An amount field is not a decimal number.
    #[error("invalid amount \"{value}\" at line {line}")]
    MalformedAmount { line: usize, value: String },

    /// No transaction could be parsed from the data file.
    #[error("no transactions found in datafile")]
    EmptyStatement,

    /// The output sink could not be opened or written.
    #[error("unable to write OFX output: {0}")]
    OutputWriteFailure(#[source] io::Error),

    /// I/O error occurred while reading input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
