use super::sampler::Sampler;
use super::stats::{percentile, round_to};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Relative variability applied to the point score on every draw.
pub const RELATIVE_STD_DEV: f64 = 0.05;
pub const DEFAULT_ITERATIONS: u32 = 200;
pub const MAX_ITERATIONS: u32 = 20_000;

const LOWER_PERCENTILE: f64 = 0.05;
const UPPER_PERCENTILE: f64 = 0.95;

#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceRequest {
    /// Pre-computed automation-potential score. The estimator never invents
    /// one, so a missing value is rejected.
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub iterations: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
    pub iterations: u32,
}

impl ConfidenceInterval {
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfidenceResponse {
    pub score: f64,
    pub ci: ConfidenceInterval,
}

/// Wraps an existing point score with a sampled 90% interval.
#[derive(Debug, Clone)]
pub struct ConfidenceEstimator {
    default_iterations: u32,
}

impl Default for ConfidenceEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_ITERATIONS)
    }
}

impl ConfidenceEstimator {
    pub fn new(default_iterations: u32) -> Self {
        Self {
            default_iterations: default_iterations.clamp(1, MAX_ITERATIONS),
        }
    }

    pub fn evaluate<S: Sampler>(
        &self,
        request: &ConfidenceRequest,
        sampler: &mut S,
    ) -> Result<ConfidenceResponse, ValidationError> {
        let score = request
            .score
            .ok_or(ValidationError::Missing { field: "score" })?;
        let score = ValidationError::check_range("score", score, 0.0, 100.0)?;
        let iterations = request.iterations.unwrap_or(self.default_iterations);
        ValidationError::check_range("iterations", iterations as f64, 1.0, MAX_ITERATIONS as f64)?;

        let ci = self.interval(score, iterations, sampler);
        Ok(ConfidenceResponse { score, ci })
    }

    /// Samples `score * (1 + Z * 0.05)`, clamped to [0, 100], and reads the
    /// 5th and 95th percentiles.
    pub fn interval<S: Sampler>(
        &self,
        score: f64,
        iterations: u32,
        sampler: &mut S,
    ) -> ConfidenceInterval {
        let iterations = iterations.max(1);
        let mut samples: Vec<f64> = (0..iterations)
            .map(|_| (score * (1.0 + sampler.gaussian(RELATIVE_STD_DEV))).clamp(0.0, 100.0))
            .collect();
        samples.sort_by(f64::total_cmp);

        let lower = percentile(&samples, LOWER_PERCENTILE).unwrap_or(score);
        let upper = percentile(&samples, UPPER_PERCENTILE).unwrap_or(score);

        ConfidenceInterval {
            lower: round_to(lower, 2),
            upper: round_to(upper, 2),
            iterations,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::sampler::{RngSampler, SequenceSampler};

    fn request(score: Option<f64>, iterations: Option<u32>) -> ConfidenceRequest {
        ConfidenceRequest { score, iterations }
    }

    #[test]
    fn interval_brackets_point_score() {
        let estimator = ConfidenceEstimator::default();
        let mut sampler = RngSampler::seeded(11);
        let response = estimator
            .evaluate(&request(Some(62.0), Some(500)), &mut sampler)
            .expect("valid request");

        let ci = response.ci;
        assert_eq!(ci.iterations, 500);
        assert!(ci.lower <= 62.0 && 62.0 <= ci.upper, "{ci:?}");
        assert!(ci.lower >= 0.0 && ci.upper <= 100.0);

        // 90% band of a normal with sd 62 * 0.05 is about 2 * 1.645 * 3.1.
        let expected = 62.0 * RELATIVE_STD_DEV * 1.645 * 2.0;
        assert!(
            (ci.width() - expected).abs() < expected * 0.25,
            "width {} vs expected {}",
            ci.width(),
            expected
        );
    }

    #[test]
    fn bounds_clamp_at_ceiling() {
        let estimator = ConfidenceEstimator::default();
        let mut sampler = RngSampler::seeded(5);
        let ci = estimator.interval(99.5, 400, &mut sampler);
        assert!(ci.upper <= 100.0);
        assert!(ci.lower <= ci.upper);
    }

    #[test]
    fn single_iteration_produces_degenerate_interval() {
        let estimator = ConfidenceEstimator::default();
        let mut sampler = SequenceSampler::new(vec![0.5]);
        let ci = estimator.interval(40.0, 1, &mut sampler);
        assert_eq!(ci.lower, ci.upper);
        assert_eq!(ci.iterations, 1);
    }

    #[test]
    fn zero_score_stays_zero() {
        let estimator = ConfidenceEstimator::default();
        let mut sampler = RngSampler::seeded(1);
        let ci = estimator.interval(0.0, 200, &mut sampler);
        assert_eq!((ci.lower, ci.upper), (0.0, 0.0));
    }

    #[test]
    fn missing_score_is_rejected_not_fabricated() {
        let estimator = ConfidenceEstimator::default();
        let mut sampler = RngSampler::seeded(1);
        let err = estimator
            .evaluate(&request(None, None), &mut sampler)
            .expect_err("score is required");
        assert_eq!(err, ValidationError::Missing { field: "score" });
    }

    #[test]
    fn rejects_out_of_range_inputs() {
        let estimator = ConfidenceEstimator::default();
        let mut sampler = RngSampler::seeded(1);
        assert!(estimator
            .evaluate(&request(Some(140.0), None), &mut sampler)
            .is_err());
        assert!(estimator
            .evaluate(&request(Some(50.0), Some(0)), &mut sampler)
            .is_err());
        assert!(estimator
            .evaluate(&request(Some(50.0), Some(MAX_ITERATIONS + 1)), &mut sampler)
            .is_err());
    }

    #[test]
    fn configured_default_iterations_apply() {
        let estimator = ConfidenceEstimator::new(64);
        let mut sampler = RngSampler::seeded(9);
        let response = estimator
            .evaluate(&request(Some(30.0), None), &mut sampler)
            .expect("valid request");
        assert_eq!(response.ci.iterations, 64);
    }
}
