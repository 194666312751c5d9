use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

/// Bar timeframe types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Daily,
    Weekly,
    Monthly,
    Quarterly,
}

/// TD Sequential phase tags as emitted in output rows.
///
/// The two perfect variants only ever label the bar that completes a setup;
/// the live scan itself never dwells in them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[repr(i32)]
pub enum TdPhase {
    #[strum(serialize = "None")]
    None = 0,
    #[strum(serialize = "Buy Setup")]
    BuySetup = 1,
    #[strum(serialize = "Sell Setup")]
    SellSetup = 2,
    #[strum(serialize = "Buy Countdown")]
    BuyCountdown = 3,
    #[strum(serialize = "Sell Countdown")]
    SellCountdown = 4,
    #[strum(serialize = "Buy Setup Perfect")]
    BuySetupPerfect = 5,
    #[strum(serialize = "Sell Setup Perfect")]
    SellSetupPerfect = 6,
}

impl Default for TdPhase {
    fn default() -> Self {
        TdPhase::None
    }
}

impl TdPhase {
    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn is_buy_side(&self) -> bool {
        matches!(
            self,
            TdPhase::BuySetup | TdPhase::BuyCountdown | TdPhase::BuySetupPerfect
        )
    }

    pub fn is_sell_side(&self) -> bool {
        matches!(
            self,
            TdPhase::SellSetup | TdPhase::SellCountdown | TdPhase::SellSetupPerfect
        )
    }
}

/// Crossover direction types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CrossType {
    Golden,
    Death,
}

/// Signal severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Action,
}

/// Named OHLCV input fields used when building bars from loose records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum DataField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// Fields a bar cannot be built without; volume is optional.
pub const REQUIRED_FIELDS: &[DataField] = &[
    DataField::Open,
    DataField::High,
    DataField::Low,
    DataField::Close,
];
