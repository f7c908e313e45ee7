// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow};
use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use tasklist_app::Record;
use thiserror::Error;

pub const TASK_HEADER: [&str; 2] = ["Task", "Status"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("line {line}: expected 2 fields, found {found}")]
    MissingField { line: u64, found: usize },
    #[error("header {found:?} does not match expected {expected:?}")]
    HeaderMismatch {
        expected: [String; 2],
        found: Vec<String>,
    },
    #[error("line {line}: {message}")]
    Csv { line: u64, message: String },
}

/// How the first line of a file is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderPolicy {
    Skip,
    Require([String; 2]),
}

impl HeaderPolicy {
    pub fn require(header: [&str; 2]) -> Self {
        Self::Require(header.map(str::to_owned))
    }

    fn check(&self, found: &csv::StringRecord) -> Result<(), DecodeError> {
        let Self::Require(expected) = self else {
            return Ok(());
        };
        let matches = found.len() >= 2
            && found.get(0).map(str::trim) == Some(expected[0].as_str())
            && found.get(1).map(str::trim) == Some(expected[1].as_str());
        if !matches {
            return Err(DecodeError::HeaderMismatch {
                expected: expected.clone(),
                found: found.iter().map(str::to_owned).collect(),
            });
        }
        Ok(())
    }
}

/// Decodes every row after the header. Rows need at least two fields; any
/// further fields are dropped, and a blank line counts as a row with none.
/// Blank lines after the last row are ignored. Nothing is returned unless
/// every row decodes.
pub fn decode(text: &str, policy: &HeaderPolicy) -> Result<Vec<Record>, DecodeError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut records = Vec::new();
    let mut saw_header = false;
    for result in reader.records() {
        let row = result.map_err(|error| DecodeError::Csv {
            line: error.position().map_or(0, csv::Position::line),
            message: error.to_string(),
        })?;

        let start = row.position().map_or_else(RowStart::default, |position| {
            RowStart::locate(text.as_bytes(), position)
        });
        if start.blank {
            return Err(DecodeError::MissingField {
                line: start.line,
                found: 0,
            });
        }

        if !saw_header {
            saw_header = true;
            policy.check(&row)?;
            continue;
        }

        let line = start.line;
        match (row.get(0), row.get(1)) {
            (Some(primary), Some(secondary)) => records.push(Record::new(primary, secondary)),
            _ => {
                return Err(DecodeError::MissingField {
                    line,
                    found: row.len(),
                });
            }
        }
    }

    Ok(records)
}

#[derive(Debug, Default)]
struct RowStart {
    line: u64,
    blank: bool,
}

impl RowStart {
    /// The reader drops empty lines before handing back a record, and the
    /// record's position is where that skipping began. Finds the line the
    /// record really starts on and whether a blank line was skipped first.
    fn locate(text: &[u8], position: &csv::Position) -> Self {
        let mut line = position.line();
        let start = usize::try_from(position.byte()).unwrap_or(usize::MAX);
        let mut rest = text.get(start..).unwrap_or_default();

        // The LF of a CRLF is consumed at the start of the following record.
        if rest.first() == Some(&b'\n') && start > 0 && text[start - 1] == b'\r' {
            rest = &rest[1..];
            line += 1;
        }

        Self {
            line,
            blank: matches!(rest.first(), Some(b'\n' | b'\r')),
        }
    }
}

/// Writes the header and one line per record, quoting only fields that need it.
pub fn encode(header: [&str; 2], records: &[Record]) -> Result<String> {
    let mut writer = WriterBuilder::new()
        .has_headers(false)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(header).context("write CSV header")?;
    for (index, record) in records.iter().enumerate() {
        writer
            .write_record([record.primary.as_str(), record.secondary.as_str()])
            .with_context(|| format!("write CSV row {index}"))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| anyhow!("flush CSV buffer: {}", error.error()))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
