// SPDX-License-Identifier: MIT
//! # Weighted Random Amounts
//!
//! Produces dollar strings such as `$482,913` by first choosing a magnitude bucket by
//! weight, then drawing uniformly inside it.
//!
//! Bucket selection subtracts each weight from the draw in order and stops at the first
//! bucket where the remainder is `<= 0`. A draw sitting exactly on a cumulative edge
//! therefore selects the earlier bucket.
//!
//! The random source is always passed in. Production code uses `rand::thread_rng()`,
//! tests use a seeded `StdRng` or call [`select_bucket`] with a fixed draw.

use rand::Rng;

/// Inclusive integer range with a relative selection weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bucket {
    pub min: u64,
    pub max: u64,
    pub weight: u32,
}

impl Bucket {
    pub const fn new(min: u64, max: u64, weight: u32) -> Self {
        Self { min, max, weight }
    }
}

/// Default buckets: five figures (40), six figures (45), one to three million (15).
pub const DEFAULT_BUCKETS: [Bucket; 3] = [
    Bucket::new(10_000, 99_999, 40),
    Bucket::new(100_000, 999_999, 45),
    Bucket::new(1_000_000, 3_000_000, 15),
];

/// Pick a bucket index for a draw in `[0, total_weight)`.
///
/// Draws at or beyond the total fall through to the last bucket.
pub fn select_bucket(weights: &[u32], draw: f64) -> usize {
    let mut remainder = draw;
    for (i, &w) in weights.iter().enumerate() {
        remainder -= f64::from(w);
        if remainder <= 0.0 {
            return i;
        }
    }
    weights.len().saturating_sub(1)
}

/// Draw an amount from `buckets` using `rng`.
///
/// # Panics
/// Panics if `buckets` is empty or a bucket has `min > max`.
pub fn generate_amount<R: Rng + ?Sized>(rng: &mut R, buckets: &[Bucket]) -> u64 {
    assert!(!buckets.is_empty(), "at least one bucket is required");
    let weights: Vec<u32> = buckets.iter().map(|b| b.weight).collect();
    let total: u32 = weights.iter().sum();

    let draw = if total == 0 {
        0.0
    } else {
        rng.gen::<f64>() * f64::from(total)
    };
    let bucket = buckets[select_bucket(&weights, draw)];
    rng.gen_range(bucket.min..=bucket.max)
}

/// Format whole dollars with thousands separators: `1234567` → `$1,234,567`.
pub fn format_dollars(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    out.push('$');
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Draw from the default buckets and format the result.
pub fn generate_money<R: Rng + ?Sized>(rng: &mut R) -> String {
    format_dollars(generate_amount(rng, &DEFAULT_BUCKETS))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const WEIGHTS: [u32; 3] = [40, 45, 15];

    #[test]
    fn test_select_bucket_interiors() {
        assert_eq!(select_bucket(&WEIGHTS, 0.0), 0);
        assert_eq!(select_bucket(&WEIGHTS, 39.999), 0);
        assert_eq!(select_bucket(&WEIGHTS, 40.001), 1);
        assert_eq!(select_bucket(&WEIGHTS, 84.5), 1);
        assert_eq!(select_bucket(&WEIGHTS, 99.999), 2);
    }

    #[test]
    fn test_cumulative_edge_selects_earlier_bucket() {
        assert_eq!(select_bucket(&WEIGHTS, 40.0), 0);
        assert_eq!(select_bucket(&WEIGHTS, 85.0), 1);
        assert_eq!(select_bucket(&WEIGHTS, 100.0), 2);
    }

    #[test]
    fn test_out_of_range_draw_falls_to_last_bucket() {
        assert_eq!(select_bucket(&WEIGHTS, 250.0), 2);
        assert_eq!(select_bucket(&[], 1.0), 0);
    }

    #[test]
    fn test_generated_amounts_stay_in_buckets() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..2_000 {
            let v = generate_amount(&mut rng, &DEFAULT_BUCKETS);
            assert!((10_000..=3_000_000).contains(&v), "{v}");
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let a = generate_money(&mut StdRng::seed_from_u64(42));
        let b = generate_money(&mut StdRng::seed_from_u64(42));
        assert_eq!(a, b);
        assert!(a.starts_with('$'));
    }

    #[test]
    fn test_single_point_bucket() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(generate_amount(&mut rng, &[Bucket::new(5, 5, 1)]), 5);
    }

    #[test]
    fn test_format_dollars() {
        assert_eq!(format_dollars(0), "$0");
        assert_eq!(format_dollars(999), "$999");
        assert_eq!(format_dollars(1_000), "$1,000");
        assert_eq!(format_dollars(99_999), "$99,999");
        assert_eq!(format_dollars(3_000_000), "$3,000,000");
    }
}
