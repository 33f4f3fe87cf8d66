//! Expected calibration error of predicted versus observed automation scores.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BIN_COUNT: usize = 10;
pub const MAX_BIN_COUNT: usize = 50;

/// One prediction paired with its later observation, both on a 0..100 scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationPair {
    pub predicted: f64,
    pub observed: f64,
}

fn default_bin_count() -> usize {
    DEFAULT_BIN_COUNT
}

#[derive(Debug, Clone, Deserialize)]
pub struct CalibrationRequest {
    #[serde(default)]
    pub pairs: Vec<CalibrationPair>,
    #[serde(default = "default_bin_count")]
    pub bin_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CalibrationStatus {
    Evaluated,
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationBin {
    pub bin_lower: f64,
    pub bin_upper: f64,
    pub predicted_avg: f64,
    pub observed_avg: f64,
    pub count: usize,
    pub ece_component: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalibrationReport {
    pub status: CalibrationStatus,
    pub ece: Option<f64>,
    pub pairs_count: usize,
    pub bins: Vec<CalibrationBin>,
}

#[derive(Debug, Clone, Default)]
pub struct CalibrationEvaluator;

impl CalibrationEvaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(
        &self,
        request: &CalibrationRequest,
    ) -> Result<CalibrationReport, ValidationError> {
        ValidationError::check_range(
            "bin_count",
            request.bin_count as f64,
            1.0,
            MAX_BIN_COUNT as f64,
        )?;
        for pair in &request.pairs {
            ValidationError::check_range("predicted", pair.predicted, 0.0, 100.0)?;
            ValidationError::check_range("observed", pair.observed, 0.0, 100.0)?;
        }

        if request.pairs.is_empty() {
            return Ok(CalibrationReport {
                status: CalibrationStatus::InsufficientData,
                ece: None,
                pairs_count: 0,
                bins: Vec::new(),
            });
        }

        let (ece, bins) = expected_calibration_error(&request.pairs, request.bin_count);
        Ok(CalibrationReport {
            status: CalibrationStatus::Evaluated,
            ece: Some(ece),
            pairs_count: request.pairs.len(),
            bins,
        })
    }
}

/// Bins pairs by predicted probability into equal-width buckets and sums
/// `|observed_avg − predicted_avg| · count / N` across them.
pub fn expected_calibration_error(
    pairs: &[CalibrationPair],
    bin_count: usize,
) -> (f64, Vec<CalibrationBin>) {
    let bin_count = bin_count.max(1);
    let mut counts = vec![0usize; bin_count];
    let mut predicted_sums = vec![0.0; bin_count];
    let mut observed_sums = vec![0.0; bin_count];

    for pair in pairs {
        let predicted = (pair.predicted / 100.0).clamp(0.0, 1.0);
        let observed = (pair.observed / 100.0).clamp(0.0, 1.0);
        let index = ((predicted * bin_count as f64).floor() as usize).min(bin_count - 1);
        counts[index] += 1;
        predicted_sums[index] += predicted;
        observed_sums[index] += observed;
    }

    let total = pairs.len().max(1) as f64;
    let mut ece = 0.0;
    let bins = (0..bin_count)
        .map(|index| {
            let count = counts[index];
            let divisor = count.max(1) as f64;
            let predicted_avg = predicted_sums[index] / divisor;
            let observed_avg = observed_sums[index] / divisor;
            let ece_component = (observed_avg - predicted_avg).abs() * count as f64 / total;
            ece += ece_component;
            CalibrationBin {
                bin_lower: index as f64 / bin_count as f64,
                bin_upper: (index + 1) as f64 / bin_count as f64,
                predicted_avg,
                observed_avg,
                count,
                ece_component,
            }
        })
        .collect();

    (ece, bins)
}
