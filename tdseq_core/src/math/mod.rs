pub mod crossover;
pub mod demark;
pub mod ma;
pub mod macd;
