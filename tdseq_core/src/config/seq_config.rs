use serde::{Deserialize, Serialize};

use crate::common::enums::Period;
use crate::common::error::{ErrCode, SeqError};
use crate::math::macd::MacdConfig;
use crate::rules::{Ma250NoAction, MaTrendAlignment, Rule};

/// Analysis switches and indicator parameters.
///
/// Unknown keys in a config document are rejected rather than ignored, so a
/// typo cannot silently fall back to a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SeqConfig {
    pub ma_periods: Vec<usize>,
    pub ema_periods: Vec<usize>,
    pub macd: MacdConfig,
    pub cal_macd: bool,
    pub cal_demark: bool,
    pub autofix: bool,
    pub trend_lookback_bars: usize,
}

impl Default for SeqConfig {
    fn default() -> Self {
        Self {
            ma_periods: vec![5, 10, 20, 30, 60],
            ema_periods: vec![5, 10, 20, 30, 60],
            macd: MacdConfig::default(),
            cal_macd: true,
            cal_demark: true,
            autofix: false,
            trend_lookback_bars: 1,
        }
    }
}

impl SeqConfig {
    /// Stock parameter set for a bar period. Daily adds the MA250 screen
    /// line; weekly swaps in the long averages and skips MACD, as do the
    /// coarser periods.
    pub fn for_period(period: Period) -> Self {
        match period {
            Period::Daily => {
                Self { ma_periods: vec![5, 10, 20, 30, 60, 250], ..Default::default() }
            }
            Period::Weekly => Self {
                ma_periods: vec![20, 30, 60, 120, 250],
                ema_periods: vec![],
                cal_macd: false,
                ..Default::default()
            },
            Period::Monthly | Period::Quarterly => {
                Self { cal_macd: false, ..Default::default() }
            }
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SeqError> {
        let config: Self = serde_json::from_str(text).map_err(|e| {
            SeqError::new(format!("cannot parse config: {}", e), ErrCode::ConfigError)
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), SeqError> {
        for &period in self.ma_periods.iter().chain(self.ema_periods.iter()) {
            if period == 0 {
                return Err(SeqError::new(
                    "moving average period must be >= 1",
                    ErrCode::ParaError,
                ));
            }
        }
        self.macd.validate()
    }

    /// Screening rules to run after the indicator scans.
    pub fn rules(&self) -> Vec<Box<dyn Rule>> {
        let mut res: Vec<Box<dyn Rule>> = Vec::new();
        res.push(Box::new(Ma250NoAction::default()));
        res.push(Box::new(MaTrendAlignment {
            lookback_bars: self.trend_lookback_bars,
            ..Default::default()
        }));
        res
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SeqConfig::default();
        assert_eq!(config.ma_periods, vec![5, 10, 20, 30, 60]);
        assert!(config.cal_macd && config.cal_demark);
        assert!(!config.autofix);
        assert_eq!(config.macd.fast, 12);
    }

    #[test]
    fn test_json_round_trip() {
        let config = SeqConfig::for_period(Period::Weekly);
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(SeqConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_for_period_daily_adds_long_ma() {
        let config = SeqConfig::for_period(Period::Daily);
        assert!(config.ma_periods.contains(&250));
        assert!(config.cal_macd);
    }

    #[test]
    fn test_for_period_weekly() {
        let config = SeqConfig::for_period(Period::Weekly);
        assert_eq!(config.ma_periods, vec![20, 30, 60, 120, 250]);
        assert!(config.ema_periods.is_empty());
        assert!(!config.cal_macd);
        assert!(config.cal_demark);
    }

    #[test]
    fn test_from_json_partial_override() {
        let config = SeqConfig::from_json(r#"{"cal_macd": false, "ma_periods": [7]}"#).unwrap();
        assert!(!config.cal_macd);
        assert_eq!(config.ma_periods, vec![7]);
        assert_eq!(config.ema_periods, vec![5, 10, 20, 30, 60]);
    }

    #[test]
    fn test_from_json_rejects_unknown_key() {
        let err = SeqConfig::from_json(r#"{"cal_mcad": true}"#).unwrap_err();
        assert_eq!(err.code, ErrCode::ConfigError);
    }

    #[test]
    fn test_from_json_rejects_zero_period() {
        let err = SeqConfig::from_json(r#"{"ema_periods": [0]}"#).unwrap_err();
        assert_eq!(err.code, ErrCode::ParaError);
    }

    #[test]
    fn test_rule_roster() {
        let rules = SeqConfig::default().rules();
        let names: Vec<&str> = rules.iter().map(|rule| rule.name()).collect();
        assert_eq!(names, vec!["ma250_no_action", "ma_trend_alignment"]);
    }
}
