//! Row selection for price files.

use chrono::NaiveDate;

use crate::error::IoError;

/// Which rows and columns [`read_prices`](crate::read_prices) extracts.
///
/// Defaults: date column `Date`, value column `Close`, ticker column
/// `Symbol`, no ticker filter, no date window.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceQuery {
    date_column: String,
    value_column: String,
    symbol_column: String,
    symbol: Option<String>,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
}

impl Default for PriceQuery {
    fn default() -> Self {
        Self {
            date_column: "Date".into(),
            value_column: "Close".into(),
            symbol_column: "Symbol".into(),
            symbol: None,
            start: None,
            end: None,
        }
    }
}

impl PriceQuery {
    /// Set the date column name.
    pub fn with_date_column(mut self, name: impl Into<String>) -> Self {
        self.date_column = name.into();
        self
    }

    /// Set the value column name.
    pub fn with_value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = name.into();
        self
    }

    /// Set the ticker column name.
    pub fn with_symbol_column(mut self, name: impl Into<String>) -> Self {
        self.symbol_column = name.into();
        self
    }

    /// Keep only rows for `symbol`.
    ///
    /// Applied only when the file has a ticker column; a single-ticker file
    /// without one is read whole.
    pub fn with_symbol(mut self, symbol: Option<impl Into<String>>) -> Self {
        self.symbol = symbol.map(Into::into);
        self
    }

    /// Keep rows on or after `start`.
    pub fn with_start(mut self, start: Option<NaiveDate>) -> Self {
        self.start = start;
        self
    }

    /// Keep rows strictly before `end`.
    pub fn with_end(mut self, end: Option<NaiveDate>) -> Self {
        self.end = end;
        self
    }

    pub(crate) fn date_column(&self) -> &str {
        &self.date_column
    }

    pub(crate) fn value_column(&self) -> &str {
        &self.value_column
    }

    pub(crate) fn symbol_column(&self) -> &str {
        &self.symbol_column
    }

    pub(crate) fn symbol(&self) -> Option<&str> {
        self.symbol.as_deref()
    }

    /// Returns `true` if `date` falls in `[start, end)`.
    pub(crate) fn contains(&self, date: NaiveDate) -> bool {
        self.start.is_none_or(|s| date >= s) && self.end.is_none_or(|e| date < e)
    }

    /// Checks that the window, when fully given, is non-empty.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::InvalidRange`] if `start >= end`.
    pub fn validate(&self) -> Result<(), IoError> {
        if let (Some(start), Some(end)) = (self.start, self.end)
            && start >= end
        {
            return Err(IoError::InvalidRange { start, end });
        }
        Ok(())
    }
}
