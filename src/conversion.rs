//! Conversion from parsed transactions to an OFX statement.
//!
//! The delimited file carries no account metadata, so the statement-level
//! fields come from the profile.

use crate::delimited_format::DelimitedStatement;
use crate::error::Result;
use crate::ofx_format::OfxStatement;
use crate::profile::Profile;

impl DelimitedStatement {
    /// Attach the profile's language, currency and account block.
    ///
    /// Every profile lookup happens here, so a missing key is reported
    /// before any output is written.
    pub fn into_ofx(self, profile: &Profile) -> Result<OfxStatement> {
        Ok(OfxStatement {
            language: profile.language()?.to_string(),
            currency: profile.currency()?.to_string(),
            account: profile.account()?,
            period: self.period,
            transactions: self.transactions,
        })
    }
}
