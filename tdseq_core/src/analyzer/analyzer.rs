use std::collections::BTreeMap;

use crate::bar::price_history::PriceHistory;
use crate::common::error::{ErrCode, SeqError};
use crate::config::seq_config::SeqConfig;
use crate::math::crossover::{self, MaAboveRow, MaCross, MacdCross};
use crate::math::demark::{self, TdMark};
use crate::math::ma;
use crate::math::macd::{self, MacdItem};
use crate::rules::Signal;

/// One symbol's full analysis: the validated history plus every indicator
/// table the config asks for, computed once up front.
#[derive(Debug, Clone)]
pub struct Analyzer {
    history: PriceHistory,
    config: SeqConfig,
    ma: BTreeMap<usize, Vec<f64>>,
    ema: BTreeMap<usize, Vec<f64>>,
    macd: Vec<MacdItem>,
    demark: Vec<TdMark>,
}

impl Analyzer {
    pub fn new(history: PriceHistory, config: SeqConfig) -> Result<Self, SeqError> {
        config.validate()?;
        let closes = history.closes();
        let mut ma_tables = BTreeMap::new();
        for &period in &config.ma_periods {
            ma_tables.insert(period, ma::sma(&closes, period)?);
        }
        let mut ema_tables = BTreeMap::new();
        for &period in &config.ema_periods {
            ema_tables.insert(period, ma::ema(&closes, period)?);
        }
        let macd = if config.cal_macd {
            macd::macd_series(&closes, config.macd)?
        } else {
            Vec::new()
        };
        let demark = if config.cal_demark {
            demark::sequential(history.bars())
        } else {
            Vec::new()
        };
        Ok(Self { history, config, ma: ma_tables, ema: ema_tables, macd, demark })
    }

    pub fn history(&self) -> &PriceHistory {
        &self.history
    }

    pub fn config(&self) -> &SeqConfig {
        &self.config
    }

    pub fn ma(&self) -> &BTreeMap<usize, Vec<f64>> {
        &self.ma
    }

    pub fn ema(&self) -> &BTreeMap<usize, Vec<f64>> {
        &self.ema
    }

    pub fn ma_series(&self, period: usize) -> Option<&[f64]> {
        self.ma.get(&period).map(Vec::as_slice)
    }

    pub fn ema_series(&self, period: usize) -> Option<&[f64]> {
        self.ema.get(&period).map(Vec::as_slice)
    }

    /// Empty unless `cal_macd` is set.
    pub fn macd_rows(&self) -> &[MacdItem] {
        &self.macd
    }

    /// Empty unless `cal_demark` is set.
    pub fn demark_marks(&self) -> &[TdMark] {
        &self.demark
    }

    pub fn find_macd_crossovers(&self) -> Result<Vec<MacdCross>, SeqError> {
        if self.macd.is_empty() {
            return Err(SeqError::new(
                "macd table not computed; enable cal_macd",
                ErrCode::MissingField,
            ));
        }
        crossover::find_macd_crossovers(&self.history.dates(), &self.macd)
    }

    pub fn find_ma_crossovers(
        &self,
        fast_period: usize,
        slow_period: usize,
    ) -> Result<Vec<MaCross>, SeqError> {
        let fast = self.require_ma(fast_period)?;
        let slow = self.require_ma(slow_period)?;
        crossover::find_ma_crossovers(&self.history.dates(), fast, slow, fast_period, slow_period)
    }

    pub fn find_ma_above(
        &self,
        fast_periods: &[usize],
        base_period: usize,
    ) -> Result<Vec<MaAboveRow>, SeqError> {
        let base = self.require_ma(base_period)?;
        let mut fast = Vec::with_capacity(fast_periods.len());
        for &period in fast_periods {
            fast.push((period, self.require_ma(period)?));
        }
        crossover::find_ma_above(&self.history.dates(), base, &fast)
    }

    /// Runs the configured rule set and keeps whatever fires.
    pub fn signals(&self) -> Vec<Signal> {
        self.config.rules().iter().filter_map(|rule| rule.evaluate(self)).collect()
    }

    fn require_ma(&self, period: usize) -> Result<&[f64], SeqError> {
        self.ma_series(period).ok_or_else(|| {
            SeqError::new(format!("ma{} not computed", period), ErrCode::MissingField)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bar::bar::Bar;
    use crate::common::enums::{CrossType, Period, Severity};
    use crate::common::time::Date;

    fn history(closes: &[f64], period: Period) -> PriceHistory {
        let start: Date = "2024-01-01".parse().unwrap();
        let bars: Vec<Bar> = closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                let date = Date::from(start.inner() + chrono::Days::new(i as u64));
                Bar::new(date, c, c + 1.0, c - 1.0, c, 0.0)
            })
            .collect();
        PriceHistory::new(bars, period, false).unwrap()
    }

    #[test]
    fn test_new_computes_configured_tables() {
        let analyzer =
            Analyzer::new(history(&[1.0, 2.0, 3.0], Period::Daily), SeqConfig::default())
                .unwrap();
        assert_eq!(analyzer.ma().len(), 5);
        assert_eq!(analyzer.ema().len(), 5);
        assert_eq!(analyzer.macd_rows().len(), 3);
        assert_eq!(analyzer.demark_marks().len(), 3);
        assert!(analyzer.ma_series(5).is_some());
        assert!(analyzer.ma_series(7).is_none());
    }

    #[test]
    fn test_disabled_scans_stay_empty() {
        let config = SeqConfig { cal_macd: false, cal_demark: false, ..Default::default() };
        let analyzer = Analyzer::new(history(&[1.0, 2.0, 3.0], Period::Daily), config).unwrap();
        assert!(analyzer.macd_rows().is_empty());
        assert!(analyzer.demark_marks().is_empty());
        let err = analyzer.find_macd_crossovers().unwrap_err();
        assert_eq!(err.code, ErrCode::MissingField);
    }

    #[test]
    fn test_new_rejects_bad_config() {
        let config = SeqConfig { ma_periods: vec![0], ..Default::default() };
        let err = Analyzer::new(history(&[1.0], Period::Daily), config).unwrap_err();
        assert_eq!(err.code, ErrCode::ParaError);
    }

    #[test]
    fn test_find_ma_crossovers_between_tables() {
        let config = SeqConfig { ma_periods: vec![1, 2], ..Default::default() };
        let analyzer = Analyzer::new(history(&[10.0, 1.0, 10.0], Period::Daily), config).unwrap();
        let crosses = analyzer.find_ma_crossovers(1, 2).unwrap();
        assert_eq!(crosses.len(), 2);
        assert_eq!(crosses[0].kind, CrossType::Death);
        assert_eq!(crosses[1].kind, CrossType::Golden);

        let err = analyzer.find_ma_crossovers(1, 60).unwrap_err();
        assert_eq!(err.code, ErrCode::MissingField);
        assert!(err.msg.contains("ma60"));
    }

    #[test]
    fn test_find_ma_above_base() {
        let config = SeqConfig { ma_periods: vec![1, 2], ..Default::default() };
        let analyzer = Analyzer::new(history(&[10.0, 1.0, 10.0], Period::Daily), config).unwrap();
        let rows = analyzer.find_ma_above(&[1], 2).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].periods_above, vec![1]);
    }

    #[test]
    fn test_signals_from_daily_downtrend() {
        let analyzer = Analyzer::new(
            history(&[100.0, 90.0, 80.0], Period::Daily),
            SeqConfig::for_period(Period::Daily),
        )
        .unwrap();
        let signals = analyzer.signals();
        assert_eq!(signals.len(), 2);
        assert!(signals.iter().all(|s| s.severity == Severity::Warning));
    }

    #[test]
    fn test_signals_from_daily_uptrend() {
        let analyzer = Analyzer::new(
            history(&[80.0, 90.0, 100.0], Period::Daily),
            SeqConfig::for_period(Period::Daily),
        )
        .unwrap();
        let signals = analyzer.signals();
        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].severity, Severity::Action);
    }
}
