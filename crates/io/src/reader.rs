//! CSV price reader.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::error::IoError;
use crate::query::PriceQuery;

/// Dated closing prices in ascending date order.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    /// Trading days.
    pub dates: Vec<NaiveDate>,
    /// Value on each day, aligned with `dates`.
    pub closes: Vec<f64>,
}

impl PriceSeries {
    /// Number of rows.
    pub fn len(&self) -> usize {
        self.closes.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }
}

/// Reads a price history from a CSV file with a header row.
///
/// Rows whose value cell is empty, `null`, `NA`, or non-finite are skipped,
/// as are rows outside the query's date window or ticker. Dates are
/// `YYYY-MM-DD`; a trailing time part (`2024-01-02 00:00:00-05:00`) is
/// ignored. The result is sorted by date.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`IoError::InvalidRange`] | query window is empty |
/// | [`IoError::FileNotFound`] | `path` does not exist |
/// | [`IoError::Csv`] | malformed CSV or read failure |
/// | [`IoError::MissingColumn`] | date or value column absent |
/// | [`IoError::InvalidDate`] | unparsable date cell |
/// | [`IoError::InvalidValue`] | unparsable value cell |
/// | [`IoError::DuplicateDate`] | two kept rows share a date |
/// | [`IoError::Empty`] | no rows kept |
pub fn read_prices(path: &Path, query: &PriceQuery) -> Result<PriceSeries, IoError> {
    query.validate()?;

    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|e| IoError::Csv {
        reason: format!("cannot open {}: {e}", path.display()),
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(BufReader::new(file));

    let headers = reader.headers()?.clone();
    let column = |name: &str| -> Result<usize, IoError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| IoError::MissingColumn {
                name: name.to_string(),
                path: path.to_path_buf(),
            })
    };
    let date_idx = column(query.date_column())?;
    let value_idx = column(query.value_column())?;
    let symbol_idx = query
        .symbol()
        .and_then(|_| headers.iter().position(|h| h == query.symbol_column()));

    let mut rows: Vec<(NaiveDate, f64)> = Vec::new();
    let mut skipped = 0usize;

    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());

        if let (Some(idx), Some(symbol)) = (symbol_idx, query.symbol())
            && record.get(idx) != Some(symbol)
        {
            continue;
        }

        let date_cell = record.get(date_idx).unwrap_or_default();
        let date = parse_date(date_cell).ok_or_else(|| IoError::InvalidDate {
            value: date_cell.to_string(),
            line,
        })?;
        if !query.contains(date) {
            continue;
        }

        let value_cell = record.get(value_idx).unwrap_or_default();
        match parse_value(value_cell) {
            Cell::Value(v) => rows.push((date, v)),
            Cell::Missing => skipped += 1,
            Cell::Invalid => {
                return Err(IoError::InvalidValue {
                    value: value_cell.to_string(),
                    line,
                });
            }
        }
    }

    if rows.is_empty() {
        return Err(IoError::Empty {
            path: path.to_path_buf(),
        });
    }

    rows.sort_by_key(|&(date, _)| date);
    if let Some(w) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(IoError::DuplicateDate { date: w[0].0 });
    }

    if skipped > 0 {
        debug!(skipped, "skipped rows without a value");
    }
    let (dates, closes): (Vec<_>, Vec<_>) = rows.into_iter().unzip();
    info!(
        path = %path.display(),
        rows = closes.len(),
        first = %dates[0],
        last = %dates[dates.len() - 1],
        "read price history"
    );

    Ok(PriceSeries { dates, closes })
}

enum Cell {
    Value(f64),
    Missing,
    Invalid,
}

fn parse_value(cell: &str) -> Cell {
    if cell.is_empty() || cell.eq_ignore_ascii_case("null") || cell.eq_ignore_ascii_case("na") {
        return Cell::Missing;
    }
    match cell.parse::<f64>() {
        Ok(v) if v.is_finite() => Cell::Value(v),
        Ok(_) => Cell::Missing,
        Err(_) => Cell::Invalid,
    }
}

fn parse_date(cell: &str) -> Option<NaiveDate> {
    let day = match cell.get(..10) {
        Some(prefix) if cell.len() == 10 || matches!(cell.as_bytes()[10], b' ' | b'T') => prefix,
        _ => return None,
    };
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}
