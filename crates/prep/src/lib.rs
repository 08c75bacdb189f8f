//! # kca-prep
//!
//! Turns a raw price series into the inputs of a kinetic component fit: an
//! evenly spaced time grid and a standardized observation series.
//!
//! ```text
//! closes ─▶ Standardizer::fit ─▶ z = (x - mean) / scale
//!    n   ─▶ time_grid(n, span) ─▶ t = [0, span / (n - 1), ..., span]
//! ```
//!
//! The [`Standardizer`] is kept alongside the prepared series so fitted
//! positions can be mapped back to price units with
//! [`Standardizer::inverse()`].

mod error;
mod grid;
mod prepare;
mod scale;

pub use error::PrepError;
pub use grid::{DEFAULT_TIME_SPAN, time_grid};
pub use prepare::{Prepared, prepare};
pub use scale::Standardizer;
