use serde::Serialize;

use crate::common::enums::CrossType;
use crate::common::error::{ErrCode, SeqError};
use crate::common::time::Date;
use crate::math::macd::MacdItem;

/// A DIF/DEA crossover event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MacdCross {
    pub date: Date,
    #[serde(rename = "type")]
    pub kind: CrossType,
    pub dif: f64,
    pub dea: f64,
}

/// A moving-average pair crossover event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MaCross {
    pub date: Date,
    #[serde(rename = "type")]
    pub kind: CrossType,
    pub fast_period: usize,
    pub slow_period: usize,
    pub fast_value: f64,
    pub slow_value: f64,
}

/// One bar on which at least one fast average sits above the base average.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaAboveRow {
    pub date: Date,
    pub periods_above: Vec<usize>,
}

/// Classifies the move from one bar to the next. Golden when the fast line
/// ends strictly above after being at or below, death when it ends strictly
/// below after being at or above.
pub fn cross_at(prev_fast: f64, prev_slow: f64, fast: f64, slow: f64) -> Option<CrossType> {
    if fast > slow && prev_fast <= prev_slow {
        Some(CrossType::Golden)
    } else if fast < slow && prev_fast >= prev_slow {
        Some(CrossType::Death)
    } else {
        None
    }
}

pub fn find_macd_crossovers(
    dates: &[Date],
    rows: &[MacdItem],
) -> Result<Vec<MacdCross>, SeqError> {
    check_aligned(dates.len(), rows.len())?;
    let mut out = Vec::new();
    for i in 1..rows.len() {
        if let Some(kind) = cross_at(rows[i - 1].dif, rows[i - 1].dea, rows[i].dif, rows[i].dea)
        {
            out.push(MacdCross { date: dates[i], kind, dif: rows[i].dif, dea: rows[i].dea });
        }
    }
    Ok(out)
}

pub fn find_ma_crossovers(
    dates: &[Date],
    fast: &[f64],
    slow: &[f64],
    fast_period: usize,
    slow_period: usize,
) -> Result<Vec<MaCross>, SeqError> {
    check_aligned(dates.len(), fast.len())?;
    check_aligned(dates.len(), slow.len())?;
    let mut out = Vec::new();
    for i in 1..dates.len() {
        if let Some(kind) = cross_at(fast[i - 1], slow[i - 1], fast[i], slow[i]) {
            out.push(MaCross {
                date: dates[i],
                kind,
                fast_period,
                slow_period,
                fast_value: fast[i],
                slow_value: slow[i],
            });
        }
    }
    Ok(out)
}

/// Collects the bars on which any of the given fast averages is strictly
/// above the base series. Bars with none above are skipped.
pub fn find_ma_above(
    dates: &[Date],
    base: &[f64],
    fast: &[(usize, &[f64])],
) -> Result<Vec<MaAboveRow>, SeqError> {
    check_aligned(dates.len(), base.len())?;
    for (_, series) in fast {
        check_aligned(dates.len(), series.len())?;
    }
    let mut out = Vec::new();
    for i in 0..dates.len() {
        let periods_above: Vec<usize> = fast
            .iter()
            .filter(|(_, series)| series[i] > base[i])
            .map(|(period, _)| *period)
            .collect();
        if !periods_above.is_empty() {
            out.push(MaAboveRow { date: dates[i], periods_above });
        }
    }
    Ok(out)
}

/// True when the last `bars` values all sit strictly above the reference.
/// Series are compared tail-aligned.
pub fn is_above(values: &[f64], reference: &[f64], bars: usize) -> bool {
    if bars == 0 || values.len() < bars || reference.len() < bars {
        return false;
    }
    values[values.len() - bars..]
        .iter()
        .zip(&reference[reference.len() - bars..])
        .all(|(v, r)| v > r)
}

pub fn is_below(values: &[f64], reference: &[f64], bars: usize) -> bool {
    if bars == 0 || values.len() < bars || reference.len() < bars {
        return false;
    }
    values[values.len() - bars..]
        .iter()
        .zip(&reference[reference.len() - bars..])
        .all(|(v, r)| v < r)
}

/// True when the series sat strictly below the reference `within_bars` bars
/// ago and sits strictly above it now. Only the window endpoints are
/// inspected, so a dip and recovery inside the window does not count.
pub fn crossed_above(values: &[f64], reference: &[f64], within_bars: usize) -> bool {
    let need = within_bars + 1;
    if values.len() < need || reference.len() < need {
        return false;
    }
    let v0 = values[values.len() - need];
    let r0 = reference[reference.len() - need];
    let v1 = values[values.len() - 1];
    let r1 = reference[reference.len() - 1];
    v0 < r0 && v1 > r1
}

pub fn crossed_below(values: &[f64], reference: &[f64], within_bars: usize) -> bool {
    let need = within_bars + 1;
    if values.len() < need || reference.len() < need {
        return false;
    }
    let v0 = values[values.len() - need];
    let r0 = reference[reference.len() - need];
    let v1 = values[values.len() - 1];
    let r1 = reference[reference.len() - 1];
    v0 > r0 && v1 < r1
}

pub(crate) fn check_aligned(expected: usize, actual: usize) -> Result<(), SeqError> {
    if expected != actual {
        return Err(SeqError::new(
            format!("series length mismatch: {} vs {}", expected, actual),
            ErrCode::SeriesNotAligned,
        ));
    }
    Ok(())
}
