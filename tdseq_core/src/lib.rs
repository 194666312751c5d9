pub mod analyzer;
pub mod bar;
pub mod common;
pub mod config;
pub mod math;
pub mod rules;

pub use analyzer::analyzer::Analyzer;
pub use bar::bar::Bar;
pub use bar::price_history::PriceHistory;
pub use common::enums::{CrossType, DataField, Period, Severity, TdPhase};
pub use common::error::{ErrCode, SeqError};
pub use common::time::Date;
pub use config::seq_config::SeqConfig;
pub use math::crossover::{MaAboveRow, MaCross, MacdCross};
pub use math::demark::TdMark;
pub use math::macd::{MacdConfig, MacdItem};
pub use rules::{Rule, Signal};
