//! Rolling statistics over price windows.

/// Arithmetic mean (0 for an empty slice).
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (0 for fewer than two values).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Mean of the last `window` values (or of all values if fewer).
pub fn sma(values: &[f64], window: usize) -> f64 {
    mean(tail(values, window))
}

/// Recursive EMA with smoothing factor `2 / (span + 1)`, seeded by `values[0]`.
pub fn ema(values: &[f64], span: usize) -> f64 {
    let Some((&first, rest)) = values.split_first() else {
        return 0.0;
    };
    let alpha = 2.0 / (span as f64 + 1.0);
    rest.iter().fold(first, |acc, &v| alpha * v + (1.0 - alpha) * acc)
}

/// Day-over-day relative returns. Non-positive denominators yield 0.
pub fn pct_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| if w[0] > 0.0 { (w[1] - w[0]) / w[0] } else { 0.0 })
        .collect()
}

/// Last `n` elements of a slice.
pub fn tail(values: &[f64], n: usize) -> &[f64] {
    &values[values.len().saturating_sub(n)..]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sma_uses_trailing_window() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sma(&v, 2), 4.5);
        assert_eq!(sma(&v, 10), 3.0);
    }

    #[test]
    fn ema_is_seeded_by_first_value() {
        assert_eq!(ema(&[10.0], 7), 10.0);
        // alpha = 0.25 for span 7
        let e = ema(&[10.0, 14.0], 7);
        assert!((e - 11.0).abs() < 1e-12);
        assert_eq!(ema(&[], 7), 0.0);
    }

    #[test]
    fn returns_and_std_dev() {
        let r = pct_returns(&[100.0, 110.0, 99.0]);
        assert!((r[0] - 0.1).abs() < 1e-12);
        assert!((r[1] + 0.1).abs() < 1e-12);
        assert!((std_dev(&r) - 0.1).abs() < 1e-12);
        assert_eq!(std_dev(&[0.3]), 0.0);
    }
}
