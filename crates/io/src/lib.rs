//! # kca-io
//!
//! Reads daily price histories from CSV into the `&[f64]` closes (plus
//! dates) consumed by `kca-prep` and the kinetic component fit.
//!
//! The expected layout is the one financial data providers export:
//!
//! ```text
//! Date,Open,High,Low,Close,Volume
//! 2024-01-02,187.15,188.44,183.89,185.64,82488700
//! 2024-01-03,184.22,185.88,183.43,184.25,58414500
//! ```
//!
//! Column names, an optional ticker filter and a `[start, end)` date window
//! are set through [`PriceQuery`].

mod error;
mod query;
mod reader;

pub use error::IoError;
pub use query::PriceQuery;
pub use reader::{PriceSeries, read_prices};
