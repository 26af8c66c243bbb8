// =============================================================================
// Moving Averages - SMA and EMA
// =============================================================================
//
// Simple Moving Average over a window `w`:
//   SMA_i = mean(x_{i-w+1} .. x_i)          defined for i >= w - 1
//
// Exponential Moving Average over a span `s` (recursive, "adjust = false"):
//   alpha  = 2 / (s + 1)
//   EMA_0  = x_0
//   EMA_i  = alpha * x_i + (1 - alpha) * EMA_{i-1}
//
// The EMA is seeded with the first value, not with an SMA, so it has no
// warm-up gap: every input index has an output.
// =============================================================================

/// Apply `f` to every full trailing window of `values`.
///
/// The output has one element per input. Index `i` is `None` while fewer than
/// `window` values are available, or when any value inside the window is
/// undefined. `window == 0` yields `None` everywhere.
pub(crate) fn rolling<F>(values: &[Option<f64>], window: usize, f: F) -> Vec<Option<f64>>
where
    F: Fn(&[f64]) -> Option<f64>,
{
    let mut out = vec![None; values.len()];
    if window == 0 || values.len() < window {
        return out;
    }

    let mut buf = Vec::with_capacity(window);
    for (i, slot) in out.iter_mut().enumerate().skip(window - 1) {
        buf.clear();
        buf.extend(values[i + 1 - window..=i].iter().map_while(|v| *v));
        if buf.len() == window {
            *slot = f(&buf);
        }
    }
    out
}

pub(crate) fn mean(window: &[f64]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    let m = window.iter().sum::<f64>() / window.len() as f64;
    m.is_finite().then_some(m)
}

/// Simple moving average of an optional-valued series.
pub fn sma_of(values: &[Option<f64>], window: usize) -> Vec<Option<f64>> {
    rolling(values, window, mean)
}

/// Simple moving average of closing prices.
///
/// # Edge cases
/// - empty input => empty output
/// - `closes.len() < window` => all `None`
pub fn sma(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    let values: Vec<Option<f64>> = closes.iter().copied().map(Some).collect();
    sma_of(&values, window)
}

/// Exponential moving average with span `span`, defined at every index.
///
/// A span of zero is treated as one (no smoothing).
pub fn ema(values: &[f64], span: usize) -> Vec<f64> {
    let alpha = 2.0 / (span.max(1) as f64 + 1.0);

    let mut out = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &x in values {
        let next = match prev {
            None => x,
            Some(p) => alpha * x + (1.0 - alpha) * p,
        };
        out.push(next);
        prev = Some(next);
    }
    out
}
