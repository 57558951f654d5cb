//! OFX Generator Library
//!
//! Converts delimited bank-transaction exports into OFX (Open Financial
//! Exchange) SGML statements. How a bank lays out its export is described by
//! an institution profile: the field separator, the column of each field,
//! whether fields are quoted, and the order of day, month and year in dates.
//!
//! # Pipeline
//!
//! 1. [`Profile::load`] reads the profile.
//! 2. [`DelimitedStatement::from_path`] parses the data file into
//!    [`TransactionRecord`]s and the statement period.
//! 3. [`DelimitedStatement::into_ofx`] attaches the profile's account data.
//! 4. [`OfxStatement::write_to`] emits the document.
//!
//! # Examples
//!
//! ```no_run
//! use std::fs::File;
//! use ofxgen::{DelimitedStatement, Profile};
//!
//! let profile = Profile::load("mybank.ini")?;
//! let parsed = DelimitedStatement::from_path("export.csv", &profile)?;
//! let ofx = parsed.into_ofx(&profile)?;
//!
//! let mut output = File::create("statement.ofx")?;
//! ofx.write_to(&mut output)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod types;
pub mod profile;
pub mod delimited_format;
pub mod ofx_format;
pub mod conversion;

// Re-export commonly used types
pub use delimited_format::DelimitedStatement;
pub use error::{Error, Result};
pub use ofx_format::OfxStatement;
pub use profile::Profile;
pub use types::{DateOrder, StatementPeriod, TransactionRecord, TransactionType};
