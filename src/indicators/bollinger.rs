// =============================================================================
// Bollinger Bands
// =============================================================================
//
// Bollinger Bands consist of a middle band (SMA), an upper band (SMA + k*σ),
// and a lower band (SMA - k*σ), where σ is the rolling sample standard
// deviation (n - 1 denominator) over the same window.
//
// All bands share the SMA warm-up gap: undefined before index `window - 1`.

use super::moving_average::{mean, rolling, sma};

/// Per-index Bollinger output. All vectors have the input's length.
#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub middle: Vec<Option<f64>>,
    pub upper: Vec<Option<f64>>,
    pub lower: Vec<Option<f64>>,
    pub std_dev: Vec<Option<f64>>,
}

/// Sample standard deviation of a full window. Needs at least two values.
fn sample_std(window: &[f64]) -> Option<f64> {
    if window.len() < 2 {
        return None;
    }
    let m = mean(window)?;
    let ss: f64 = window.iter().map(|x| (x - m).powi(2)).sum();
    let sd = (ss / (window.len() - 1) as f64).sqrt();
    sd.is_finite().then_some(sd)
}

/// Rolling sample standard deviation of closing prices.
pub fn rolling_std(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    rolling(&values, window, sample_std)
}

/// Calculate Bollinger Bands over `window` closes with `num_std` deviations.
pub fn bollinger(closes: &[f64], window: usize, num_std: f64) -> BollingerBands {
    let middle = sma(closes, window);
    let std_dev = rolling_std(closes, window);

    let (upper, lower): (Vec<_>, Vec<_>) = middle
        .iter()
        .zip(&std_dev)
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => (Some(m + num_std * s), Some(m - num_std * s)),
            _ => (None, None),
        })
        .unzip();

    BollingerBands {
        middle,
        upper,
        lower,
        std_dev,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bollinger_empty_input() {
        let bb = bollinger(&[], 20, 2.0);
        assert!(bb.middle.is_empty());
        assert!(bb.upper.is_empty());
    }

    #[test]
    fn bollinger_insufficient_data() {
        let bb = bollinger(&[1.0, 2.0, 3.0], 20, 2.0);
        assert_eq!(bb.upper.len(), 3);
        assert!(bb.upper.iter().all(Option::is_none));
        assert!(bb.lower.iter().all(Option::is_none));
    }

    #[test]
    fn bollinger_warm_up_and_width() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + ((i * 13) % 7) as f64).collect();
        let bb = bollinger(&closes, 20, 2.0);
        assert!(bb.middle[..19].iter().all(Option::is_none));
        for i in 19..closes.len() {
            let width = bb.upper[i].unwrap() - bb.lower[i].unwrap();
            let sd = bb.std_dev[i].unwrap();
            assert!((width - 4.0 * sd).abs() < 1e-9);
            assert!(bb.upper[i].unwrap() > bb.middle[i].unwrap());
        }
    }

    #[test]
    fn bollinger_uses_sample_std() {
        // [1, 2, 3, 4]: mean 2.5, squared deviations sum 5, sample var 5/3.
        let bb = bollinger(&[1.0, 2.0, 3.0, 4.0], 4, 2.0);
        let sd = bb.std_dev[3].unwrap();
        assert!((sd - (5.0f64 / 3.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn bollinger_flat_collapses_to_middle() {
        let bb = bollinger(&[100.0; 25], 20, 2.0);
        for i in 19..25 {
            assert_eq!(bb.std_dev[i], Some(0.0));
            assert_eq!(bb.upper[i], bb.middle[i]);
            assert_eq!(bb.lower[i], bb.middle[i]);
        }
    }
}
