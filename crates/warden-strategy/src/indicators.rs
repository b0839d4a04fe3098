//! Indicator computation on decimal series.
//!
//! All functions are total over their inputs: insufficient history yields
//! an empty (or short) output vector, never a panic.

use rust_decimal::Decimal;

/// Exponential moving average.
///
/// Seeded with the simple average of the first `period` samples, then
/// smoothed with alpha = 2 / (period + 1). The output is aligned to the
/// input tail: `out[i]` corresponds to `values[period - 1 + i]`, so the
/// last elements of fast and slow series computed over the same input
/// refer to the same bar.
///
/// Returns an empty vector when `period` is zero or there are fewer than
/// `period` samples.
pub fn ema(values: &[Decimal], period: usize) -> Vec<Decimal> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let alpha = Decimal::TWO / Decimal::from(period + 1);
    let one_minus = Decimal::ONE - alpha;

    let seed: Decimal = values[..period].iter().sum::<Decimal>() / Decimal::from(period);

    let mut out = Vec::with_capacity(values.len() - period + 1);
    out.push(seed);

    let mut prev = seed;
    for v in &values[period..] {
        prev = alpha * *v + one_minus * prev;
        out.push(prev);
    }

    out
}

/// Relative strength index (Wilder smoothing).
///
/// Needs at least `period + 1` samples to produce one value. The output is
/// aligned to the input tail: `out.last()` is the RSI at the last bar.
pub fn rsi(values: &[Decimal], period: usize) -> Vec<Decimal> {
    if period == 0 || values.len() < period + 1 {
        return Vec::new();
    }

    let hundred = Decimal::from(100);
    let p = Decimal::from(period);

    let mut gains = Vec::with_capacity(values.len() - 1);
    let mut losses = Vec::with_capacity(values.len() - 1);
    for w in values.windows(2) {
        let change = w[1] - w[0];
        if change.is_sign_positive() {
            gains.push(change);
            losses.push(Decimal::ZERO);
        } else {
            gains.push(Decimal::ZERO);
            losses.push(-change);
        }
    }

    let mut avg_gain: Decimal = gains[..period].iter().sum::<Decimal>() / p;
    let mut avg_loss: Decimal = losses[..period].iter().sum::<Decimal>() / p;

    let rsi_of = |avg_gain: Decimal, avg_loss: Decimal| -> Decimal {
        if avg_loss.is_zero() {
            return hundred;
        }
        let rs = avg_gain / avg_loss;
        hundred - hundred / (Decimal::ONE + rs)
    };

    let mut out = Vec::with_capacity(values.len() - period);
    out.push(rsi_of(avg_gain, avg_loss));

    for i in period..gains.len() {
        avg_gain = (avg_gain * (p - Decimal::ONE) + gains[i]) / p;
        avg_loss = (avg_loss * (p - Decimal::ONE) + losses[i]) / p;
        out.push(rsi_of(avg_gain, avg_loss));
    }

    out
}

/// Highest value in a window.
pub fn highest(values: &[Decimal]) -> Option<Decimal> {
    values.iter().copied().max()
}

/// Lowest value in a window.
pub fn lowest(values: &[Decimal]) -> Option<Decimal> {
    values.iter().copied().min()
}

/// Arithmetic mean of a window.
pub fn mean(values: &[Decimal]) -> Option<Decimal> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<Decimal>() / Decimal::from(values.len()))
}
