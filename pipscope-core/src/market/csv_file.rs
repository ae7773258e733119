//! CSV bar import.
//!
//! Expected header: `time,open,high,low,close`, with `time` in epoch seconds.
//! Rows are sorted by time; a repeated timestamp keeps the later row. Rows
//! failing the OHLC sanity check are skipped with a warning.

use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use super::{DataError, MarketDataSource, Timeframe};
use crate::domain::Bar;

#[derive(Debug, Deserialize)]
struct CsvRow {
    time: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

/// Bars from a single CSV file, regardless of the requested pair.
#[derive(Debug, Clone)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse bars from any reader.
    pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut bars = Vec::new();

        for (index, record) in rdr.deserialize::<CsvRow>().enumerate() {
            // header is row 1
            let row = index + 2;
            let record = record.map_err(|e| DataError::Parse {
                row,
                message: e.to_string(),
            })?;
            let bar = Bar::new(record.time, record.open, record.high, record.low, record.close);
            if bar.is_sane() {
                bars.push(bar);
            } else {
                warn!(row, time = bar.time, "skipping insane OHLC row");
            }
        }

        bars.sort_by_key(|b| b.time);
        // stable sort keeps file order within a timestamp; keep the last of each run
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(prev) if prev.time == bar.time => *prev = bar,
                _ => deduped.push(bar),
            }
        }
        Ok(deduped)
    }
}

impl MarketDataSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_bars(&self, pair: &str, timeframe: Timeframe) -> Result<Vec<Bar>, DataError> {
        let file = std::fs::File::open(&self.path).map_err(|e| DataError::Io {
            path: self.path.display().to_string(),
            message: e.to_string(),
        })?;
        let bars = Self::read_bars(file)?;
        if bars.is_empty() {
            return Err(DataError::Empty {
                pair: pair.to_string(),
                timeframe,
            });
        }
        Ok(bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV: &str = "time,open,high,low,close
300,1.1010,1.1030,1.1000,1.1020
100,1.1000,1.1020,1.0990,1.1010
200,1.1010,1.1005,1.1020,1.1015
300,1.1020,1.1040,1.1010,1.1035
";

    #[test]
    fn sorts_dedupes_and_skips_insane_rows() {
        let bars = CsvSource::read_bars(CSV.as_bytes()).unwrap();
        // row at 200 has high < low
        assert_eq!(bars.iter().map(|b| b.time).collect::<Vec<_>>(), vec![100, 300]);
        assert_eq!(bars[1].close, 1.1035);
    }

    #[test]
    fn malformed_row_reports_row_number() {
        let data = "time,open,high,low,close\n100,1.1,1.2,1.0,1.1\n200,abc,1.2,1.0,1.1\n";
        match CsvSource::read_bars(data.as_bytes()) {
            Err(DataError::Parse { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(CSV.as_bytes()).unwrap();
        let source = CsvSource::new(file.path());
        let bars = source.fetch_bars("EUR/USD", Timeframe::H1).unwrap();
        assert_eq!(bars.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let source = CsvSource::new("/nonexistent/bars.csv");
        assert!(matches!(
            source.fetch_bars("EUR/USD", Timeframe::H1),
            Err(DataError::Io { .. })
        ));
    }

    #[test]
    fn header_only_is_empty_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"time,open,high,low,close\n").unwrap();
        let source = CsvSource::new(file.path());
        assert!(matches!(
            source.fetch_bars("EUR/USD", Timeframe::H1),
            Err(DataError::Empty { .. })
        ));
    }
}
