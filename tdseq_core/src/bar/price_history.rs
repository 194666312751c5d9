use std::ops::Index;

use crate::bar::bar::Bar;
use crate::common::enums::Period;
use crate::common::error::{ErrCode, SeqError};
use crate::common::time::Date;

/// An ordered, validated series of bars for one symbol and one period.
///
/// Construction sorts by date, rejects duplicate dates and runs the OHLC
/// consistency check on every bar, so downstream scans can index freely.
#[derive(Debug, Clone)]
pub struct PriceHistory {
    bars: Vec<Bar>,
    period: Period,
}

impl PriceHistory {
    pub fn new(mut bars: Vec<Bar>, period: Period, autofix: bool) -> Result<Self, SeqError> {
        if bars.is_empty() {
            return Err(SeqError::new("price history has no bars", ErrCode::InputEmpty));
        }
        bars.sort_by_key(|bar| bar.date);
        for pair in bars.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(SeqError::new(
                    format!("duplicate bar date {}", pair[0].date),
                    ErrCode::BarDataInvalid,
                ));
            }
        }
        for bar in bars.iter_mut() {
            bar.check(autofix)?;
        }
        Ok(Self { bars, period })
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Bar> {
        self.bars.iter()
    }

    /// Most recent bar. The constructor guarantees at least one.
    pub fn current(&self) -> &Bar {
        &self.bars[self.bars.len() - 1]
    }

    pub fn bar_at(&self, idx: usize) -> Option<&Bar> {
        self.bars.get(idx)
    }

    /// Bar on exactly this date.
    pub fn on(&self, date: Date) -> Option<&Bar> {
        self.position_of(date).ok().map(|i| &self.bars[i])
    }

    /// Latest bar dated on or before `date`.
    pub fn asof(&self, date: Date) -> Option<&Bar> {
        let idx = self.bars.partition_point(|bar| bar.date <= date);
        if idx == 0 {
            None
        } else {
            Some(&self.bars[idx - 1])
        }
    }

    /// Bars with start <= date <= end.
    pub fn between(&self, start: Date, end: Date) -> &[Bar] {
        let lo = self.bars.partition_point(|bar| bar.date < start);
        let hi = self.bars.partition_point(|bar| bar.date <= end);
        &self.bars[lo..hi.max(lo)]
    }

    pub fn has_date(&self, date: Date) -> bool {
        self.position_of(date).is_ok()
    }

    pub fn start_date(&self) -> Date {
        self.bars[0].date
    }

    pub fn end_date(&self) -> Date {
        self.bars[self.bars.len() - 1].date
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|bar| bar.close).collect()
    }

    pub fn dates(&self) -> Vec<Date> {
        self.bars.iter().map(|bar| bar.date).collect()
    }

    fn position_of(&self, date: Date) -> Result<usize, usize> {
        self.bars.binary_search_by(|bar| bar.date.cmp(&date))
    }
}

impl Index<usize> for PriceHistory {
    type Output = Bar;

    fn index(&self, idx: usize) -> &Bar {
        &self.bars[idx]
    }
}
