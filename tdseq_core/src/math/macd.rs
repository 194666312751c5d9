use serde::{Deserialize, Serialize};

use crate::common::error::{ErrCode, SeqError};

/// MACD parameters. The histogram column is `multiplier * (dif - dea)`;
/// mainland charting platforms print it with multiplier 2.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MacdConfig {
    pub fast: usize,
    pub slow: usize,
    pub signal: usize,
    pub multiplier: f64,
}

impl Default for MacdConfig {
    fn default() -> Self {
        Self { fast: 12, slow: 26, signal: 9, multiplier: 2.0 }
    }
}

impl MacdConfig {
    pub fn validate(&self) -> Result<(), SeqError> {
        if self.fast == 0 || self.slow == 0 || self.signal == 0 {
            return Err(SeqError::new("macd periods must be >= 1", ErrCode::ParaError));
        }
        Ok(())
    }
}

/// One output row of the MACD scan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdItem {
    pub dif: f64,
    pub dea: f64,
    pub macd: f64,
}

/// Streaming MACD over a close series. EMAs are seeded with the first
/// value they see, so the first row is always all zero.
#[derive(Debug, Clone)]
pub struct MacdEngine {
    config: MacdConfig,
    fast_ema: Option<f64>,
    slow_ema: Option<f64>,
    dea: Option<f64>,
}

impl MacdEngine {
    pub fn new(config: MacdConfig) -> Result<Self, SeqError> {
        config.validate()?;
        Ok(Self { config, fast_ema: None, slow_ema: None, dea: None })
    }

    pub fn add(&mut self, price: f64) -> MacdItem {
        let fast = next_ema(self.fast_ema, price, self.config.fast as f64);
        let slow = next_ema(self.slow_ema, price, self.config.slow as f64);
        let dif = fast - slow;
        let dea = next_ema(self.dea, dif, self.config.signal as f64);
        self.fast_ema = Some(fast);
        self.slow_ema = Some(slow);
        self.dea = Some(dea);
        MacdItem { dif, dea, macd: self.config.multiplier * (dif - dea) }
    }
}

fn next_ema(prev: Option<f64>, value: f64, n: f64) -> f64 {
    match prev {
        None => value,
        Some(p) => (2.0 * value + (n - 1.0) * p) / (n + 1.0),
    }
}

/// Runs the full MACD scan over a close series.
pub fn macd_series(closes: &[f64], config: MacdConfig) -> Result<Vec<MacdItem>, SeqError> {
    let mut engine = MacdEngine::new(config)?;
    Ok(closes.iter().map(|&c| engine.add(c)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_row_is_zero() {
        let mut engine = MacdEngine::new(MacdConfig::default()).unwrap();
        let item = engine.add(37.5);
        assert_eq!(item.dif, 0.0);
        assert_eq!(item.dea, 0.0);
        assert_eq!(item.macd, 0.0);
    }

    #[test]
    fn test_constant_series_stays_flat() {
        let rows = macd_series(&[5.0; 30], MacdConfig::default()).unwrap();
        assert_eq!(rows.len(), 30);
        for row in rows {
            assert_eq!(row.dif, 0.0);
            assert_eq!(row.dea, 0.0);
            assert_eq!(row.macd, 0.0);
        }
    }

    #[test]
    fn test_rising_series_turns_dif_positive() {
        let closes: Vec<f64> = (1..=20).map(|i| i as f64).collect();
        let rows = macd_series(&closes, MacdConfig::default()).unwrap();
        let last = rows.last().unwrap();
        assert!(last.dif > 0.0);
        assert!(last.macd > 0.0);
    }

    #[test]
    fn test_multiplier_scales_histogram_only() {
        let closes: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let doubled = macd_series(&closes, MacdConfig::default()).unwrap();
        let plain =
            macd_series(&closes, MacdConfig { multiplier: 1.0, ..Default::default() }).unwrap();
        for (a, b) in doubled.iter().zip(&plain) {
            assert_eq!(a.dif, b.dif);
            assert_eq!(a.dea, b.dea);
            assert!((a.macd - 2.0 * b.macd).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_period_rejected() {
        let config = MacdConfig { signal: 0, ..Default::default() };
        assert_eq!(MacdEngine::new(config).unwrap_err().code, ErrCode::ParaError);
    }

    #[test]
    fn test_config_defaults_from_empty_json() {
        let config: MacdConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, MacdConfig::default());
    }
}
