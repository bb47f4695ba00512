//! Distribution helpers shared by the rating engines.
//!
//! The normal distribution comes from [`statrs`], the logistic CDF is small enough to write out.

use rand::Rng;
use rand::distributions::Distribution;
use statrs::distribution::{ContinuousCDF, Normal};

use crate::RatingError;

/// Quantile (inverse CDF) of the standard normal distribution.
///
/// # Errors
/// Returns [`RatingError::InvalidParameter`] unless `0 < p < 1`.
///
/// # Examples
/// ```rust
/// # use assert_eq_float::assert_eq_float;
/// use skillrank::stats::normal_quantile;
///
/// assert_eq_float!((normal_quantile(0.975).unwrap() * 100.0).round(), 196.0);
/// assert!(normal_quantile(1.0).is_err());
/// ```
pub fn normal_quantile(p: f64) -> Result<f64, RatingError> {
    if p.is_nan() || p <= 0.0 || p >= 1.0 {
        return Err(RatingError::invalid(format!(
            "quantile probability must be within (0, 1), got {p}"
        )));
    }
    let standard = Normal::new(0.0, 1.0).map_err(|err| RatingError::invalid(err.to_string()))?;
    Ok(standard.inverse_cdf(p))
}

#[must_use]
/// CDF of a logistic distribution centred on zero, `1 / (1 + exp(-x / scale))`.
///
/// `scale` must be positive.
pub fn logistic_cdf(x: f64, scale: f64) -> f64 {
    1.0 / (1.0 + (-x / scale).exp())
}

/// Draws one sample from `N(mean, std_dev)` using the caller's random source.
///
/// Seed the source to get reproducible draws.
///
/// # Errors
/// Returns [`RatingError::InvalidParameter`] if `mean` is not finite or `std_dev` is not positive.
pub fn sample_normal<R: Rng + ?Sized>(
    mean: f64,
    std_dev: f64,
    rng: &mut R,
) -> Result<f64, RatingError> {
    if !mean.is_finite() {
        return Err(RatingError::invalid(format!("mean must be finite, got {mean}")));
    }
    if !std_dev.is_finite() || std_dev <= 0.0 {
        return Err(RatingError::invalid(format!(
            "standard deviation must be positive, got {std_dev}"
        )));
    }
    let normal = Normal::new(mean, std_dev).map_err(|err| RatingError::invalid(err.to_string()))?;
    Ok(normal.sample(rng))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_normal_quantile() {
        assert_abs_diff_eq!(normal_quantile(0.5).unwrap(), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(normal_quantile(0.975).unwrap(), 1.959_964, epsilon = 1e-5);
        assert_abs_diff_eq!(
            normal_quantile(0.025).unwrap(),
            -normal_quantile(0.975).unwrap(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_normal_quantile_rejects_bounds() {
        assert!(normal_quantile(0.0).is_err());
        assert!(normal_quantile(1.0).is_err());
        assert!(normal_quantile(-0.2).is_err());
        assert!(normal_quantile(f64::NAN).is_err());
    }

    #[test]
    fn test_logistic_cdf() {
        assert_abs_diff_eq!(logistic_cdf(0.0, 350.0), 0.5);
        assert_abs_diff_eq!(logistic_cdf(-100.0, 350.0), 0.429, epsilon = 1e-3);
        assert_abs_diff_eq!(
            logistic_cdf(120.0, 350.0) + logistic_cdf(-120.0, 350.0),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_sample_normal_is_seeded() {
        let mut first = ChaCha8Rng::seed_from_u64(42);
        let mut second = ChaCha8Rng::seed_from_u64(42);

        let a = sample_normal(1500.0, 350.0, &mut first).unwrap();
        let b = sample_normal(1500.0, 350.0, &mut second).unwrap();

        assert!(a.is_finite());
        assert!((a - b).abs() < f64::EPSILON);
    }

    #[test]
    fn test_sample_normal_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let samples: Vec<f64> = (0..4000)
            .map(|_| sample_normal(25.0, 2.0, &mut rng).unwrap())
            .collect();
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;

        assert_abs_diff_eq!(mean, 25.0, epsilon = 0.2);
    }

    #[test]
    fn test_sample_normal_rejects_bad_spread() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(sample_normal(0.0, 0.0, &mut rng).is_err());
        assert!(sample_normal(0.0, -1.0, &mut rng).is_err());
        assert!(sample_normal(f64::NAN, 1.0, &mut rng).is_err());
    }
}
