// =============================================================================
// MACD - Moving Average Convergence Divergence
// =============================================================================
//
//   MACD   = EMA(close, fast) - EMA(close, slow)
//   Signal = EMA(MACD, signal)
//
// Both EMAs are seeded with the first close, so MACD and its signal line are
// defined at every index.

use super::moving_average::ema;

/// Full MACD output. All four vectors have the input's length.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdLines {
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
}

/// Compute MACD with the given fast / slow / signal spans (12 / 26 / 9 by
/// default in the dashboard).
pub fn macd(closes: &[f64], fast: usize, slow: usize, signal: usize) -> MacdLines {
    let ema_fast = ema(closes, fast);
    let ema_slow = ema(closes, slow);
    let macd: Vec<f64> = ema_fast
        .iter()
        .zip(&ema_slow)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema(&macd, signal);

    MacdLines {
        ema_fast,
        ema_slow,
        macd,
        signal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn macd_empty_input() {
        let out = macd(&[], 12, 26, 9);
        assert!(out.macd.is_empty());
        assert!(out.signal.is_empty());
    }

    #[test]
    fn macd_is_exact_ema_difference() {
        let closes: Vec<f64> = (0..60).map(|i| 50.0 + (i as f64 * 0.7).sin() * 5.0).collect();
        let out = macd(&closes, 12, 26, 9);
        let e12 = ema(&closes, 12);
        let e26 = ema(&closes, 26);
        assert_eq!(out.macd.len(), closes.len());
        for i in 0..closes.len() {
            assert_eq!(out.macd[i], e12[i] - e26[i]);
        }
        assert_eq!(out.signal, ema(&out.macd, 9));
    }

    #[test]
    fn macd_flat_series_is_zero() {
        let out = macd(&[42.0; 40], 12, 26, 9);
        assert!(out.macd.iter().all(|v| v.abs() < 1e-12));
        assert!(out.signal.iter().all(|v| v.abs() < 1e-12));
    }

    #[test]
    fn macd_starts_at_zero() {
        let out = macd(&[10.0, 12.0, 15.0], 12, 26, 9);
        assert_eq!(out.macd[0], 0.0);
        assert_eq!(out.signal[0], 0.0);
    }
}
