// =============================================================================
// Relative Strength Index (RSI) - rolling-mean variant
// =============================================================================
//
// Step 1: delta_i = close_i - close_{i-1}         (undefined at i = 0)
// Step 2: gain_i = max(delta_i, 0), loss_i = max(-delta_i, 0)
// Step 3: avg_gain / avg_loss = simple rolling mean over `period`
//          (NOT Wilder's exponential smoothing)
// Step 4: RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Division policy:
//   avg_loss == 0, avg_gain > 0  => RSI = 100
//   avg_loss == 0, avg_gain == 0 => undefined (flat window, 0/0)
//
// Because delta is undefined at index 0, the first `period` indices are
// undefined.
// =============================================================================

use super::moving_average::sma_of;

/// Compute the RSI series, one value per close.
///
/// Every defined value lies in `[0, 100]`; undefined values are `None`,
/// never NaN.
pub fn rsi(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut gains = Vec::with_capacity(closes.len());
    let mut losses = Vec::with_capacity(closes.len());

    for (i, &close) in closes.iter().enumerate() {
        if i == 0 {
            gains.push(None);
            losses.push(None);
            continue;
        }
        let delta = close - closes[i - 1];
        gains.push(Some(delta.max(0.0)));
        losses.push(Some((-delta).max(0.0)));
    }

    let avg_gain = sma_of(&gains, period);
    let avg_loss = sma_of(&losses, period);

    avg_gain
        .into_iter()
        .zip(avg_loss)
        .map(|(g, l)| match (g, l) {
            (Some(g), Some(l)) => rsi_from_averages(g, l),
            _ => None,
        })
        .collect()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 {
        return (avg_gain > 0.0).then_some(100.0);
    }
    let rs = avg_gain / avg_loss;
    let value = 100.0 - 100.0 / (1.0 + rs);
    value.is_finite().then(|| value.clamp(0.0, 100.0))
}
