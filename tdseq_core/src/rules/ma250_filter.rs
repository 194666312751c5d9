use crate::analyzer::analyzer::Analyzer;
use crate::common::enums::{Period, Severity};
use crate::math::crossover;
use crate::rules::{Rule, Signal};

/// Flags daily bars closing below the long moving average. A close under
/// MA250 disqualifies the symbol from further screening, so the signal is a
/// warning rather than an action.
#[derive(Debug, Clone)]
pub struct Ma250NoAction {
    pub period: usize,
}

impl Default for Ma250NoAction {
    fn default() -> Self {
        Self { period: 250 }
    }
}

impl Rule for Ma250NoAction {
    fn name(&self) -> &'static str {
        "ma250_no_action"
    }

    fn evaluate(&self, analyzer: &Analyzer) -> Option<Signal> {
        let history = analyzer.history();
        if history.period() != Period::Daily {
            return None;
        }
        let ma = analyzer.ma_series(self.period)?;
        let closes = history.closes();
        if !crossover::is_below(&closes, ma, 1) {
            return None;
        }
        let close = history.current().close;
        let level = ma[ma.len() - 1];
        let distance_pct = (close / level - 1.0) * 100.0;
        Some(
            Signal::new(
                format!(
                    "Daily close is below MA{} - no further action should be taken.",
                    self.period
                ),
                Severity::Warning,
            )
            .with_date(history.end_date())
            .with_detail("close", format!("{:.4}", close))
            .with_detail(format!("ma{}", self.period), format!("{:.4}", level))
            .with_detail("distance_pct", format!("{:.4}", distance_pct)),
        )
    }
}
