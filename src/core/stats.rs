// Arithmetic helpers used by the per-chunk and cross-chunk stages

use crate::core::constants::ROUND_DECIMALS;

/// Rounds the exact binary value of `value` to `decimals` places.
///
/// Exact ties (only possible for multiples of `2^-(decimals + 1)`) go to the
/// even neighbour. Scaling by `10^decimals` first is not enough: the product
/// itself can round onto a `.5` that the input never had.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() || decimals < 0 {
        return value;
    }

    let factor = 10f64.powi(decimals);
    let halves = value * 2f64.powi(decimals + 1);
    if value.abs() < TIE_EXACT_LIMIT && halves.fract() == 0.0 && halves % 2.0 != 0.0 {
        // value * factor is exact here
        return (value * factor).round_ties_even() / factor;
    }

    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}

// Below this, `value * 10^5` of a tie needs fewer than 53 mantissa bits.
const TIE_EXACT_LIMIT: f64 = 1.0e7;

pub fn round5(value: f64) -> f64 {
    round_to(value, ROUND_DECIMALS)
}

/// Mean of `values`, NaN for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divides by n).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Mean of the first `window` values; a short slice divides by its own length.
pub fn head_mean(values: &[f64], window: usize) -> f64 {
    let n = window.min(values.len());
    mean(&values[..n])
}

/// Mean of the last `window` values; a short slice divides by its own length.
pub fn tail_mean(values: &[f64], window: usize) -> f64 {
    let n = window.min(values.len());
    mean(&values[values.len() - n..])
}

/// Column-wise rounded mean over equally long rows.
///
/// Returns `Err((row_index, row_len))` for the first row whose length differs
/// from the first row. No rows gives an empty result.
pub fn column_means<'a, I>(rows: I) -> std::result::Result<Vec<f64>, (usize, usize)>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut sums: Vec<f64> = Vec::new();
    let mut count = 0usize;

    for (idx, row) in rows.into_iter().enumerate() {
        if idx == 0 {
            sums = row.to_vec();
        } else if row.len() != sums.len() {
            return Err((idx, row.len()));
        } else {
            for (acc, v) in sums.iter_mut().zip(row) {
                *acc += v;
            }
        }
        count += 1;
    }

    Ok(sums.into_iter().map(|s| round5(s / count as f64)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round5() {
        assert_eq!(round5(0.123456), 0.12346);
        assert_eq!(round5(-0.123454), -0.12345);
        assert_eq!(round5(2.0), 2.0);
        assert_eq!(round5(0.15000000000000002), 0.15);
    }

    #[test]
    fn test_round5_uses_exact_binary_value() {
        // 1.389735 is stored just below the midpoint but scales onto it.
        assert_eq!(round5(1.389735), 1.38973);
        assert_eq!(round5(0.372735), 0.37273);
        assert_eq!(round5(-1.389735), -1.38973);
    }

    #[test]
    fn test_round5_exact_ties_go_to_even() {
        assert_eq!(round5(0.015625), 0.01562);
        assert_eq!(round5(0.046875), 0.04688);
        assert_eq!(round5(-0.015625), -0.01562);
        assert!(round5(f64::NAN).is_nan());
    }

    #[test]
    fn test_mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), 5.0);
        assert_eq!(std_dev(&v), 2.0);
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn test_short_windows_use_available_rows() {
        let v = [1.0, 3.0];
        assert_eq!(head_mean(&v, 10), 2.0);
        assert_eq!(tail_mean(&v, 10), 2.0);
        assert_eq!(head_mean(&v, 1), 1.0);
        assert_eq!(tail_mean(&v, 1), 3.0);
    }

    #[test]
    fn test_column_means() {
        let a = [1.0, 2.0];
        let b = [3.0, 4.0];
        let means = column_means([&a[..], &b[..]]).unwrap();
        assert_eq!(means, vec![2.0, 3.0]);

        let c = [1.0];
        assert_eq!(column_means([&a[..], &c[..]]), Err((1, 1)));
        assert!(column_means(std::iter::empty()).unwrap().is_empty());
    }
}
