use serde::Serialize;

use crate::bar::bar::Bar;
use crate::common::enums::TdPhase;

/// Setup completes on its 9th qualifying bar.
pub const MAX_SETUP_COUNT: u32 = 9;
/// Countdown completes on its 13th qualifying bar.
pub const MAX_COUNTDOWN_COUNT: u32 = 13;
/// Bars consumed before the scan starts comparing closes.
pub const REQUIRED_SAMPLES: usize = 6;

/// Per-bar output row of the sequential scan.
///
/// `support` guards an armed sell countdown, `resistance` an armed buy
/// countdown; at most one of the two is ever set on a row.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TdMark {
    pub phase: TdPhase,
    pub setup_count: u32,
    pub countdown_count: u32,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum ScanPhase {
    #[default]
    None,
    BuySetup,
    SellSetup,
    BuyCountdown,
    SellCountdown,
}

#[derive(Debug, Default)]
struct Scan {
    phase: ScanPhase,
    setup_count: u32,
    countdown_count: u32,
    support: Option<f64>,
    resistance: Option<f64>,
}

/// Runs the TomDeMark Sequential scan over an ordered bar series and returns
/// one row per input bar.
///
/// The scan is a single forward pass. A price flip starts a setup; nine
/// qualifying bars complete it, publish the setup window's extreme as the
/// guard level and arm the countdown on the same bar. The countdown then
/// accumulates qualifying bars until 13, and is cancelled outright if the
/// close crosses its guard level.
pub fn sequential(bars: &[Bar]) -> Vec<TdMark> {
    let mut rows = Vec::with_capacity(bars.len());
    let mut scan = Scan::default();
    for i in 0..bars.len() {
        if i < REQUIRED_SAMPLES {
            rows.push(TdMark::default());
            continue;
        }
        let row = match scan.phase {
            ScanPhase::None => scan.flip(bars, i),
            ScanPhase::BuySetup => scan.buy_setup_step(bars, i),
            ScanPhase::SellSetup => scan.sell_setup_step(bars, i),
            ScanPhase::BuyCountdown => scan.buy_countdown_step(bars, i),
            ScanPhase::SellCountdown => scan.sell_countdown_step(bars, i),
        };
        rows.push(row);
    }
    rows
}

impl Scan {
    fn reset(&mut self) {
        *self = Scan::default();
    }

    /// A buy price flip needs the prior close above the close four bars
    /// before it and the current close below the close four bars back;
    /// the sell flip mirrors both comparisons. The conditions on the prior
    /// close are mutually exclusive, so a bar starts at most one side.
    fn flip(&mut self, bars: &[Bar], i: usize) -> TdMark {
        let close = bars[i].close;
        if bars[i - 1].close > bars[i - 5].close && close < bars[i - 4].close {
            self.phase = ScanPhase::BuySetup;
            self.setup_count = 1;
            TdMark { phase: TdPhase::BuySetup, setup_count: 1, ..Default::default() }
        } else if bars[i - 1].close < bars[i - 5].close && close > bars[i - 4].close {
            self.phase = ScanPhase::SellSetup;
            self.setup_count = 1;
            TdMark { phase: TdPhase::SellSetup, setup_count: 1, ..Default::default() }
        } else {
            TdMark::default()
        }
    }

    fn buy_setup_step(&mut self, bars: &[Bar], i: usize) -> TdMark {
        let close = bars[i].close;
        if close < bars[i - 4].close {
            self.setup_count += 1;
            debug_assert!(self.setup_count <= MAX_SETUP_COUNT);
            if self.setup_count < MAX_SETUP_COUNT {
                return TdMark {
                    phase: TdPhase::BuySetup,
                    setup_count: self.setup_count,
                    ..Default::default()
                };
            }
            let window = &bars[i + 1 - MAX_SETUP_COUNT as usize..=i];
            let resistance = highest_high(window);
            let phase = if is_buy_setup_perfect(window) {
                TdPhase::BuySetupPerfect
            } else {
                TdPhase::BuySetup
            };
            self.phase = ScanPhase::BuyCountdown;
            self.resistance = Some(resistance);
            self.setup_count = 0;
            // Completion bar may already count as the first countdown bar.
            self.countdown_count = u32::from(close < bars[i - 2].low);
            TdMark {
                phase,
                setup_count: MAX_SETUP_COUNT,
                countdown_count: self.countdown_count,
                support: None,
                resistance: Some(resistance),
            }
        } else {
            self.reset();
            TdMark::default()
        }
    }

    fn sell_setup_step(&mut self, bars: &[Bar], i: usize) -> TdMark {
        let close = bars[i].close;
        if close > bars[i - 4].close {
            self.setup_count += 1;
            debug_assert!(self.setup_count <= MAX_SETUP_COUNT);
            if self.setup_count < MAX_SETUP_COUNT {
                return TdMark {
                    phase: TdPhase::SellSetup,
                    setup_count: self.setup_count,
                    ..Default::default()
                };
            }
            let window = &bars[i + 1 - MAX_SETUP_COUNT as usize..=i];
            let support = lowest_low(window);
            let phase = if is_sell_setup_perfect(window) {
                TdPhase::SellSetupPerfect
            } else {
                TdPhase::SellSetup
            };
            self.phase = ScanPhase::SellCountdown;
            self.support = Some(support);
            self.setup_count = 0;
            self.countdown_count = u32::from(close > bars[i - 2].high);
            TdMark {
                phase,
                setup_count: MAX_SETUP_COUNT,
                countdown_count: self.countdown_count,
                support: Some(support),
                resistance: None,
            }
        } else {
            self.reset();
            TdMark::default()
        }
    }

    fn buy_countdown_step(&mut self, bars: &[Bar], i: usize) -> TdMark {
        let close = bars[i].close;
        let resistance =
            self.resistance.expect("buy countdown active without a resistance level");
        if close > resistance {
            self.reset();
            return TdMark::default();
        }
        if close <= bars[i - 2].low {
            self.countdown_count += 1;
            debug_assert!(self.countdown_count <= MAX_COUNTDOWN_COUNT);
            let row = TdMark {
                phase: TdPhase::BuyCountdown,
                countdown_count: self.countdown_count,
                resistance: Some(resistance),
                ..Default::default()
            };
            if self.countdown_count == MAX_COUNTDOWN_COUNT {
                self.reset();
            }
            return row;
        }
        // The countdown stays armed across non-qualifying bars even though
        // the emitted phase reverts to none; the guard level is still
        // reported so callers can chart it.
        TdMark { resistance: Some(resistance), ..Default::default() }
    }

    fn sell_countdown_step(&mut self, bars: &[Bar], i: usize) -> TdMark {
        let close = bars[i].close;
        let support = self.support.expect("sell countdown active without a support level");
        if close < support {
            self.reset();
            return TdMark::default();
        }
        if close >= bars[i - 2].high {
            self.countdown_count += 1;
            debug_assert!(self.countdown_count <= MAX_COUNTDOWN_COUNT);
            let row = TdMark {
                phase: TdPhase::SellCountdown,
                countdown_count: self.countdown_count,
                support: Some(support),
                ..Default::default()
            };
            if self.countdown_count == MAX_COUNTDOWN_COUNT {
                self.reset();
            }
            return row;
        }
        TdMark { support: Some(support), ..Default::default() }
    }
}

fn highest_high(window: &[Bar]) -> f64 {
    window.iter().map(|bar| bar.high).fold(f64::NEG_INFINITY, f64::max)
}

fn lowest_low(window: &[Bar]) -> f64 {
    window.iter().map(|bar| bar.low).fold(f64::INFINITY, f64::min)
}

/// A completed buy setup is perfect when the low of its 8th or 9th bar
/// undercuts the lows of both its 6th and 7th bars.
fn is_buy_setup_perfect(window: &[Bar]) -> bool {
    if window.len() < MAX_SETUP_COUNT as usize {
        return false;
    }
    let (low6, low7) = (window[5].low, window[6].low);
    (window[7].low < low6 && window[7].low < low7)
        || (window[8].low < low6 && window[8].low < low7)
}

/// Mirror of the buy check: the 8th or 9th bar's high must exceed the highs
/// of both the 6th and 7th bars.
fn is_sell_setup_perfect(window: &[Bar]) -> bool {
    if window.len() < MAX_SETUP_COUNT as usize {
        return false;
    }
    let (high6, high7) = (window[5].high, window[6].high);
    (window[7].high > high6 && window[7].high > high7)
        || (window[8].high > high6 && window[8].high > high7)
}
