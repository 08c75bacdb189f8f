//! Integration tests: reading price CSVs from disk.

use std::io::Write;
use std::path::Path;

use chrono::NaiveDate;
use kca_io::{IoError, PriceQuery, read_prices};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn csv_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

const DAILY: &str = "\
Date,Open,High,Low,Close,Volume
2024-01-02,187.15,188.44,183.89,185.64,82488700
2024-01-03,184.22,185.88,183.43,184.25,58414500
2024-01-04,182.15,183.09,180.88,181.91,71983600
2024-01-05,181.99,182.76,180.17,181.18,62303300
2024-01-08,182.09,185.60,181.50,185.56,59144500
";

#[test]
fn reads_whole_file() {
    let file = csv_file(DAILY);
    let prices = read_prices(file.path(), &PriceQuery::default()).unwrap();
    assert_eq!(prices.len(), 5);
    assert_eq!(prices.dates[0], d("2024-01-02"));
    assert_eq!(prices.closes[4], 185.56);
}

#[test]
fn end_date_is_exclusive() {
    let file = csv_file(DAILY);
    let query = PriceQuery::default()
        .with_start(Some(d("2024-01-03")))
        .with_end(Some(d("2024-01-08")));
    let prices = read_prices(file.path(), &query).unwrap();
    assert_eq!(
        prices.dates,
        vec![d("2024-01-03"), d("2024-01-04"), d("2024-01-05")]
    );
}

#[test]
fn skips_null_rows_and_sorts() {
    let file = csv_file(
        "Date,Close\n2024-01-05,3.0\n2024-01-04,null\n2024-01-02,1.0\n2024-01-03,\n",
    );
    let prices = read_prices(file.path(), &PriceQuery::default()).unwrap();
    assert_eq!(prices.dates, vec![d("2024-01-02"), d("2024-01-05")]);
    assert_eq!(prices.closes, vec![1.0, 3.0]);
}

#[test]
fn custom_columns_and_symbol_filter() {
    let file = csv_file(
        "day,ticker,adj\n2024-01-02,AAPL,1.0\n2024-01-02,MSFT,9.0\n2024-01-03,AAPL,2.0\n",
    );
    let query = PriceQuery::default()
        .with_date_column("day")
        .with_value_column("adj")
        .with_symbol_column("ticker")
        .with_symbol(Some("AAPL"));
    let prices = read_prices(file.path(), &query).unwrap();
    assert_eq!(prices.closes, vec![1.0, 2.0]);
}

#[test]
fn file_not_found() {
    let err = read_prices(
        Path::new("/tmp/kca_test_nonexistent_prices.csv"),
        &PriceQuery::default(),
    )
    .unwrap_err();
    assert!(matches!(err, IoError::FileNotFound { .. }), "got {err:?}");
}

#[test]
fn missing_column() {
    let file = csv_file("Date,Open\n2024-01-02,1.0\n");
    let err = read_prices(file.path(), &PriceQuery::default()).unwrap_err();
    assert!(
        matches!(err, IoError::MissingColumn { ref name, .. } if name == "Close"),
        "got {err:?}"
    );
}

#[test]
fn invalid_cells_report_line() {
    let file = csv_file("Date,Close\n2024-01-02,1.0\n2024-13-01,2.0\n");
    let err = read_prices(file.path(), &PriceQuery::default()).unwrap_err();
    assert!(matches!(err, IoError::InvalidDate { line: 3, .. }), "got {err:?}");

    let file = csv_file("Date,Close\n2024-01-02,abc\n");
    let err = read_prices(file.path(), &PriceQuery::default()).unwrap_err();
    assert!(matches!(err, IoError::InvalidValue { line: 2, .. }), "got {err:?}");
}

#[test]
fn duplicate_dates_rejected() {
    let file = csv_file("Date,Close\n2024-01-02,1.0\n2024-01-02,2.0\n");
    let err = read_prices(file.path(), &PriceQuery::default()).unwrap_err();
    assert!(matches!(err, IoError::DuplicateDate { .. }), "got {err:?}");
}

#[test]
fn empty_window_and_empty_result() {
    let file = csv_file(DAILY);
    let query = PriceQuery::default()
        .with_start(Some(d("2024-02-01")))
        .with_end(Some(d("2024-01-01")));
    let err = read_prices(file.path(), &query).unwrap_err();
    assert!(matches!(err, IoError::InvalidRange { .. }), "got {err:?}");

    let query = PriceQuery::default().with_start(Some(d("2025-01-01")));
    let err = read_prices(file.path(), &query).unwrap_err();
    assert!(matches!(err, IoError::Empty { .. }), "got {err:?}");
}
