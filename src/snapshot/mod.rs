//! Market figures from the shared sheet and the message built from them.

pub mod message;
pub mod sheet;

pub use message::format_message;
pub use sheet::fetch_snapshot;

use crate::{Error, Result};

/// Number of columns (A through I) the data row must carry.
pub const COLUMNS: usize = 9;

/// One day's figures, verbatim cell text in sheet column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarketSnapshot {
    pub date: String,
    pub sp500: String,
    pub nasdaq: String,
    pub tsx: String,
    /// Magnificent 7.
    pub mags: String,
    pub btc: String,
    pub eth: String,
    pub usdcad: String,
    pub gold: String,
}

impl MarketSnapshot {
    /// Build from a row of cells. Columns past the ninth are ignored.
    pub fn from_row<S: AsRef<str>>(row: &[S]) -> Result<Self> {
        if row.len() < COLUMNS {
            return Err(Error::MalformedRow {
                expected: COLUMNS,
                got: row.len(),
                row: row.iter().map(|c| c.as_ref().to_string()).collect(),
            });
        }
        let cell = |i: usize| row[i].as_ref().to_string();
        Ok(Self {
            date: cell(0),
            sp500: cell(1),
            nasdaq: cell(2),
            tsx: cell(3),
            mags: cell(4),
            btc: cell(5),
            eth: cell(6),
            usdcad: cell(7),
            gold: cell(8),
        })
    }
}

/// Parse the CSV export: row 1 is the header, row 2 the data.
pub fn parse_snapshot(csv_text: &str) -> Result<MarketSnapshot> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let Some(record) = reader.records().next() else {
        return Err(Error::MalformedRow {
            expected: COLUMNS,
            got: 0,
            row: Vec::new(),
        });
    };
    let record = record?;
    let row: Vec<&str> = record.iter().collect();
    MarketSnapshot::from_row(&row)
}
