pub mod ma250_filter;
pub mod trend_alignment;

pub use ma250_filter::Ma250NoAction;
pub use trend_alignment::MaTrendAlignment;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::analyzer::analyzer::Analyzer;
use crate::common::enums::Severity;
use crate::common::time::Date;

/// A rule verdict attached to the most recent bar of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub message: String,
    pub severity: Severity,
    pub date: Option<Date>,
    pub details: BTreeMap<String, String>,
}

impl Signal {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self { message: message.into(), severity, date: None, details: BTreeMap::new() }
    }

    pub fn with_date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// A screening rule evaluated against a finished analysis. Returning `None`
/// means the rule has nothing to say about the current bar.
pub trait Rule {
    fn name(&self) -> &'static str;

    fn evaluate(&self, analyzer: &Analyzer) -> Option<Signal>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signal_builder() {
        let signal = Signal::new("close below ma250", Severity::Warning)
            .with_date("2024-05-06".parse().unwrap())
            .with_detail("close", "12.3400");
        assert_eq!(signal.severity, Severity::Warning);
        assert_eq!(signal.details["close"], "12.3400");
        assert_eq!(signal.date.unwrap().to_string(), "2024-05-06");
    }

    #[test]
    fn test_signal_serializes_flat() {
        let signal = Signal::new("note", Severity::Info).with_detail("k", "v");
        let json = serde_json::to_value(&signal).unwrap();
        assert_eq!(json["severity"], "info");
        assert_eq!(json["details"]["k"], "v");
        assert!(json["date"].is_null());
    }
}
