use crate::common::error::{ErrCode, SeqError};

/// Simple moving average. The first `period - 1` entries average whatever
/// prefix is available, so the output has no warm-up holes and is the same
/// length as the input.
pub fn sma(values: &[f64], period: usize) -> Result<Vec<f64>, SeqError> {
    check_period(period)?;
    let mut out = Vec::with_capacity(values.len());
    let mut sum = 0.0;
    for (i, &value) in values.iter().enumerate() {
        sum += value;
        if i >= period {
            sum -= values[i - period];
        }
        let window = (i + 1).min(period);
        out.push(sum / window as f64);
    }
    Ok(out)
}

/// Exponential moving average seeded with the first value,
/// smoothing factor 2 / (period + 1).
pub fn ema(values: &[f64], period: usize) -> Result<Vec<f64>, SeqError> {
    check_period(period)?;
    let n = period as f64;
    let mut out: Vec<f64> = Vec::with_capacity(values.len());
    for (i, &value) in values.iter().enumerate() {
        let next = if i == 0 {
            value
        } else {
            (2.0 * value + (n - 1.0) * out[i - 1]) / (n + 1.0)
        };
        out.push(next);
    }
    Ok(out)
}

fn check_period(period: usize) -> Result<(), SeqError> {
    if period == 0 {
        Err(SeqError::new("moving average period must be >= 1", ErrCode::ParaError))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_averages_partial_prefix() {
        let out = sma(&[1.0, 2.0, 3.0, 4.0, 5.0], 3).unwrap();
        assert_eq!(out, vec![1.0, 1.5, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_sma_period_one_is_identity() {
        let values = [3.0, 1.0, 4.0];
        assert_eq!(sma(&values, 1).unwrap(), values.to_vec());
    }

    #[test]
    fn test_ema_seeded_with_first_value() {
        let out = ema(&[1.0, 2.0, 2.0], 3).unwrap();
        assert_eq!(out, vec![1.0, 1.5, 1.75]);
    }

    #[test]
    fn test_ema_period_one_is_identity() {
        let values = [3.0, 1.0, 4.0];
        assert_eq!(ema(&values, 1).unwrap(), values.to_vec());
    }

    #[test]
    fn test_zero_period_rejected() {
        assert_eq!(sma(&[1.0], 0).unwrap_err().code, ErrCode::ParaError);
        assert_eq!(ema(&[1.0], 0).unwrap_err().code, ErrCode::ParaError);
    }

    #[test]
    fn test_empty_input_gives_empty_output() {
        assert!(sma(&[], 5).unwrap().is_empty());
        assert!(ema(&[], 5).unwrap().is_empty());
    }
}
