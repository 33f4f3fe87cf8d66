//! Small numeric helpers shared by the models.

/// Index of the `p`-th percentile in a sorted slice of length `len`,
/// computed as `floor(p * (len - 1))`.
pub fn percentile_index(len: usize, p: f64) -> usize {
    if len == 0 {
        return 0;
    }
    let p = p.clamp(0.0, 1.0);
    let index = (p * (len - 1) as f64).floor() as usize;
    index.min(len - 1)
}

/// Percentile of an ascending slice, `None` when empty.
pub fn percentile<T: Copy>(sorted: &[T], p: f64) -> Option<T> {
    if sorted.is_empty() {
        None
    } else {
        Some(sorted[percentile_index(sorted.len(), p)])
    }
}

/// Rounds to a fixed number of decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentile_index_floors_into_range() {
        assert_eq!(percentile_index(0, 0.5), 0);
        assert_eq!(percentile_index(1, 0.95), 0);
        assert_eq!(percentile_index(10, 0.5), 4);
        assert_eq!(percentile_index(10, 0.9), 8);
        assert_eq!(percentile_index(10, 1.0), 9);
        assert_eq!(percentile_index(200, 0.05), 9);
        assert_eq!(percentile_index(200, 0.95), 189);
    }

    #[test]
    fn percentile_is_monotonic_in_p() {
        let sorted: Vec<u32> = (0..37).map(|v| v * 3).collect();
        let mut last = 0;
        for step in 0..=100 {
            let value = percentile(&sorted, step as f64 / 100.0).expect("non-empty");
            assert!(value >= last);
            last = value;
        }
    }

    #[test]
    fn round_to_handles_precision() {
        assert_eq!(round_to(3.14159, 2), 3.14);
        assert_eq!(round_to(2.25, 1), 2.3);
        assert_eq!(round_to(-1.005, 0), -1.0);
    }
}
