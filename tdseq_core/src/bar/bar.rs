use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::common::enums::{DataField, REQUIRED_FIELDS};
use crate::common::error::{ErrCode, SeqError};
use crate::common::time::Date;

/// One OHLCV bar. Volume is optional in source data and defaults to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Bar {
    pub fn new(date: Date, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self { date, open, high, low, close, volume }
    }

    /// Builds a bar from a column-name keyed row, e.g. one parsed CSV record.
    pub fn from_fields(date: Date, fields: &HashMap<DataField, f64>) -> Result<Self, SeqError> {
        for field in REQUIRED_FIELDS {
            if !fields.contains_key(field) {
                return Err(SeqError::new(
                    format!("{} column not found", field),
                    ErrCode::MissingField,
                ));
            }
        }
        Ok(Self {
            date,
            open: fields[&DataField::Open],
            high: fields[&DataField::High],
            low: fields[&DataField::Low],
            close: fields[&DataField::Close],
            volume: fields.get(&DataField::Volume).copied().unwrap_or(0.0),
        })
    }

    /// Validates OHLC consistency. With `autofix` the band is widened so that
    /// low <= min(open, close) <= max(open, close) <= high; otherwise a
    /// violation is an error. Non-finite prices are always an error.
    pub fn check(&mut self, autofix: bool) -> Result<(), SeqError> {
        for value in [self.open, self.high, self.low, self.close] {
            if !value.is_finite() {
                return Err(SeqError::new(
                    format!("{}: non-finite price in bar", self.date),
                    ErrCode::BarDataInvalid,
                ));
            }
        }
        let min_price = self.low.min(self.open).min(self.high).min(self.close);
        let max_price = self.low.max(self.open).max(self.high).max(self.close);
        if self.low > min_price {
            if autofix {
                self.low = min_price;
            } else {
                return Err(SeqError::new(
                    format!(
                        "{} low={} is not min of [open={}, high={}, low={}, close={}]",
                        self.date, self.low, self.open, self.high, self.low, self.close
                    ),
                    ErrCode::BarDataInvalid,
                ));
            }
        }
        if self.high < max_price {
            if autofix {
                self.high = max_price;
            } else {
                return Err(SeqError::new(
                    format!(
                        "{} high={} is not max of [open={}, high={}, low={}, close={}]",
                        self.date, self.high, self.open, self.high, self.low, self.close
                    ),
                    ErrCode::BarDataInvalid,
                ));
            }
        }
        Ok(())
    }

    pub fn is_up(&self) -> bool {
        self.close > self.open
    }

    pub fn is_down(&self) -> bool {
        self.close < self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> Date {
        s.parse().unwrap()
    }

    #[test]
    fn test_from_fields() {
        let mut fields = HashMap::new();
        fields.insert(DataField::Open, 10.0);
        fields.insert(DataField::High, 11.0);
        fields.insert(DataField::Low, 9.5);
        fields.insert(DataField::Close, 10.5);
        let bar = Bar::from_fields(date("2024-01-02"), &fields).unwrap();
        assert_eq!(bar.close, 10.5);
        assert_eq!(bar.volume, 0.0);
    }

    #[test]
    fn test_from_fields_missing_column() {
        let mut fields = HashMap::new();
        fields.insert(DataField::Open, 10.0);
        fields.insert(DataField::High, 11.0);
        fields.insert(DataField::Low, 9.5);
        let err = Bar::from_fields(date("2024-01-02"), &fields).unwrap_err();
        assert_eq!(err.code, ErrCode::MissingField);
        assert!(err.msg.contains("close"));
    }

    #[test]
    fn test_check_autofix_widens_band() {
        let mut bar = Bar::new(date("2024-01-02"), 10.0, 10.2, 9.9, 10.5, 0.0);
        bar.check(true).unwrap();
        assert_eq!(bar.high, 10.5);
        assert_eq!(bar.low, 9.9);

        let mut bar = Bar::new(date("2024-01-03"), 10.0, 10.5, 10.2, 10.1, 0.0);
        bar.check(true).unwrap();
        assert_eq!(bar.low, 10.0);
    }

    #[test]
    fn test_check_strict_rejects() {
        let mut bar = Bar::new(date("2024-01-02"), 10.0, 10.2, 9.9, 10.5, 0.0);
        let err = bar.check(false).unwrap_err();
        assert_eq!(err.code, ErrCode::BarDataInvalid);
    }

    #[test]
    fn test_check_rejects_non_finite() {
        let mut bar = Bar::new(date("2024-01-02"), 10.0, f64::NAN, 9.9, 10.0, 0.0);
        assert!(bar.check(true).is_err());
    }

    #[test]
    fn test_direction_helpers() {
        let up = Bar::new(date("2024-01-02"), 10.0, 11.0, 9.0, 10.5, 0.0);
        assert!(up.is_up() && !up.is_down());
        let down = Bar::new(date("2024-01-03"), 10.5, 11.0, 9.0, 10.0, 0.0);
        assert!(down.is_down());
    }
}
