use crate::analyzer::analyzer::Analyzer;
use crate::common::enums::Severity;
use crate::rules::{Rule, Signal};

#[derive(Debug, Clone, Copy, PartialEq)]
enum Trend {
    Up,
    Down,
    Flat,
}

/// Fires when every configured moving average slopes the same way over the
/// lookback window. All rising is an action signal, all falling a warning,
/// anything mixed stays quiet.
#[derive(Debug, Clone)]
pub struct MaTrendAlignment {
    pub periods: Vec<usize>,
    pub lookback_bars: usize,
}

impl Default for MaTrendAlignment {
    fn default() -> Self {
        Self { periods: vec![5, 10, 20, 30, 60], lookback_bars: 1 }
    }
}

impl Rule for MaTrendAlignment {
    fn name(&self) -> &'static str {
        "ma_trend_alignment"
    }

    fn evaluate(&self, analyzer: &Analyzer) -> Option<Signal> {
        if self.periods.is_empty() || self.lookback_bars == 0 {
            return None;
        }
        let mut trends = Vec::with_capacity(self.periods.len());
        let mut currents = Vec::with_capacity(self.periods.len());
        let mut slopes = Vec::new();
        for &period in &self.periods {
            let series = analyzer.ma_series(period)?;
            if series.len() < self.lookback_bars + 1 {
                return None;
            }
            let current = series[series.len() - 1];
            let prev = series[series.len() - 1 - self.lookback_bars];
            let trend = if current > prev {
                Trend::Up
            } else if current < prev {
                Trend::Down
            } else {
                Trend::Flat
            };
            trends.push(trend);
            currents.push((period, current));
            if prev > 0.0 {
                slopes.push((current / prev - 1.0) * 100.0);
            }
        }

        let (severity, direction, message) = if trends.iter().all(|t| *t == Trend::Up) {
            (
                Severity::Action,
                "up",
                format!("Strong uptrend: All {} MAs trending up", self.periods.len()),
            )
        } else if trends.iter().all(|t| *t == Trend::Down) {
            (
                Severity::Warning,
                "down",
                format!("Strong downtrend: All {} MAs trending down", self.periods.len()),
            )
        } else {
            return None;
        };

        let avg_slope_pct = if slopes.is_empty() {
            0.0
        } else {
            slopes.iter().sum::<f64>() / slopes.len() as f64
        };
        let mut signal = Signal::new(message, severity)
            .with_date(analyzer.history().end_date())
            .with_detail("direction", direction)
            .with_detail("avg_slope_pct", format!("{:.4}", avg_slope_pct));
        for (period, value) in currents {
            signal = signal.with_detail(format!("ma{}", period), format!("{:.4}", value));
        }
        Some(signal)
    }
}
