//! OFX SGML statement writer.
//!
//! Produces an OFX 2.2 header block followed by an SGML body holding one
//! bank statement. Elements are indented with one tab per nesting level and
//! leaf elements have no closing tag, as SGML allows.

use crate::error::{Error, Result};
use crate::profile::AccountInfo;
use crate::types::{StatementPeriod, TransactionRecord};
use std::io::{self, Write};

/// Header fields, in output order.
const HEADER: [(&str, &str); 9] = [
    ("OFXHEADER", "200"),
    ("DATA", "OFXSGML"),
    ("VERSION", "220"),
    ("SECURITY", "NONE"),
    ("ENCODING", "USASCII"),
    ("CHARSET", "1252"),
    ("COMPRESSION", "NONE"),
    ("OLDFILEUID", "NONE"),
    ("NEWFILEUID", "NONE"),
];

/// Placeholder `<FITID>` emitted for every transaction.
pub const PLACEHOLDER_FITID: &str = "133";

/// Placeholder `<TRNUID>` of the statement response.
pub const PLACEHOLDER_TRNUID: &str = "0";

/// A complete single-account OFX statement.
#[derive(Debug, Clone, PartialEq)]
pub struct OfxStatement {
    /// `<LANGUAGE>` of the sign-on response.
    pub language: String,

    /// `<CURDEF>` of the statement.
    pub currency: String,

    pub account: AccountInfo,

    /// Bounds of `<BANKTRANLIST>`; the end date doubles as `<DTSERVER>`.
    pub period: StatementPeriod,

    pub transactions: Vec<TransactionRecord>,
}

impl OfxStatement {
    /// Write the OFX document to any destination implementing `Write`.
    ///
    /// The writer is flushed before returning. Any write failure is reported
    /// as `OutputWriteFailure`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.serialize_ofx(writer)
            .and_then(|()| writer.flush())
            .map_err(Error::OutputWriteFailure)
    }

    fn serialize_ofx<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (key, value) in HEADER {
            writeln!(writer, "{}:{}", key, value)?;
        }
        writeln!(writer)?;

        let mut sgml = SgmlWriter::new(writer);
        sgml.open("OFX")?;

        sgml.open("SIGNONMSGSRSV1")?;
        sgml.open("SONRS")?;
        sgml.status()?;
        sgml.element("DTSERVER", &self.period.end_stamp())?;
        sgml.element("LANGUAGE", &self.language)?;
        sgml.close("SONRS")?;
        sgml.close("SIGNONMSGSRSV1")?;

        sgml.open("BANKMSGSRSV1")?;
        sgml.open("STMTTRNRS")?;
        sgml.element("TRNUID", PLACEHOLDER_TRNUID)?;
        sgml.status()?;
        sgml.open("STMTRS")?;
        sgml.element("CURDEF", &self.currency)?;

        sgml.open("BANKACCTFROM")?;
        sgml.element("BANKID", &self.account.account_number)?;
        sgml.element("ACCTID", &self.account.account_id)?;
        sgml.element("ACCTTYPE", &self.account.account_type)?;
        sgml.close("BANKACCTFROM")?;

        sgml.open("BANKTRANLIST")?;
        sgml.element("DTSTART", &self.period.start_stamp())?;
        sgml.element("DTEND", &self.period.end_stamp())?;
        for transaction in &self.transactions {
            sgml.transaction(transaction)?;
        }
        sgml.close("BANKTRANLIST")?;

        sgml.close("STMTRS")?;
        sgml.close("STMTTRNRS")?;
        sgml.close("BANKMSGSRSV1")?;
        sgml.close("OFX")
    }
}

/// Indenting SGML emitter.
struct SgmlWriter<'w, W: Write> {
    writer: &'w mut W,
    depth: usize,
}

impl<'w, W: Write> SgmlWriter<'w, W> {
    fn new(writer: &'w mut W) -> Self {
        Self { writer, depth: 0 }
    }

    fn indent(&mut self) -> io::Result<()> {
        for _ in 0..self.depth {
            self.writer.write_all(b"\t")?;
        }
        Ok(())
    }

    fn open(&mut self, tag: &str) -> io::Result<()> {
        self.indent()?;
        writeln!(self.writer, "<{}>", tag)?;
        self.depth += 1;
        Ok(())
    }

    fn close(&mut self, tag: &str) -> io::Result<()> {
        self.depth = self.depth.saturating_sub(1);
        self.indent()?;
        writeln!(self.writer, "</{}>", tag)
    }

    fn element(&mut self, tag: &str, value: &str) -> io::Result<()> {
        self.indent()?;
        writeln!(self.writer, "<{}>{}", tag, escape(value))
    }

    fn status(&mut self) -> io::Result<()> {
        self.open("STATUS")?;
        self.element("CODE", "0")?;
        self.element("SEVERITY", "INFO")?;
        self.close("STATUS")
    }

    fn transaction(&mut self, transaction: &TransactionRecord) -> io::Result<()> {
        self.open("STMTTRN")?;
        self.element("TRNTYPE", transaction.transaction_type().as_ofx())?;
        self.element("DTPOSTED", &transaction.posted_stamp())?;
        self.element("TRNAMT", &transaction.amount().to_string())?;
        self.element("FITID", PLACEHOLDER_FITID)?;
        if let Some(reference) = transaction.reference() {
            self.element("REFNUM", reference)?;
        }
        self.element("NAME", transaction.description())?;
        self.close("STMTTRN")
    }
}

/// Replace the characters SGML reserves with their entities.
fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
