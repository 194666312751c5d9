use strum_macros::{Display, EnumString};
use thiserror::Error;

/// Error codes for the analysis pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[repr(i32)]
pub enum ErrCode {
    // General errors (0-99)
    #[strum(serialize = "COMMON_ERROR")]
    CommonError = 1,
    #[strum(serialize = "PARA_ERROR")]
    ParaError = 2,
    #[strum(serialize = "CONFIG_ERROR")]
    ConfigError = 3,

    // Bar data errors (100-199)
    #[strum(serialize = "INPUT_EMPTY")]
    InputEmpty = 100,
    #[strum(serialize = "MISSING_FIELD")]
    MissingField = 101,
    #[strum(serialize = "BAR_DATA_INVALID")]
    BarDataInvalid = 102,
    #[strum(serialize = "TIME_PARSE_ERROR")]
    TimeParseError = 103,
    #[strum(serialize = "SERIES_NOT_ALIGNED")]
    SeriesNotAligned = 104,
}

impl ErrCode {
    pub fn is_data_err(&self) -> bool {
        *self as i32 >= Self::InputEmpty as i32
    }
}

#[derive(Debug, Error)]
#[error("{code}: {msg}")]
pub struct SeqError {
    pub code: ErrCode,
    pub msg: String,
}

impl SeqError {
    pub fn new(message: impl Into<String>, code: ErrCode) -> Self {
        Self {
            code,
            msg: message.into(),
        }
    }

    pub fn is_data_err(&self) -> bool {
        self.code.is_data_err()
    }
}
