use super::stats::round_to;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CORRELATION: f64 = 0.2;
pub const MIN_ITEMS: usize = 2;
/// Returns and risks are annualised fractions. These bounds keep every
/// variance term finite.
pub const MAX_ABS_RETURN: f64 = 10.0;
pub const MAX_RISK: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItem {
    pub skill: String,
    pub expected_return: f64,
    pub risk: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortfolioRequest {
    pub items: Vec<PortfolioItem>,
    #[serde(default)]
    pub correlation: Option<f64>,
    #[serde(default)]
    pub target_risk: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedItem {
    pub skill: String,
    pub weight: f64,
}

/// Non-negative weights summing to one, with derived statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioAllocation {
    pub expected_return: f64,
    pub risk: f64,
    pub weights: Vec<WeightedItem>,
    pub diversification_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub within_target_risk: Option<bool>,
    pub rationale: Vec<String>,
}

/// Return/risk weighting heuristic. Not a frontier solver.
#[derive(Debug, Clone, Default)]
pub struct PortfolioOptimizer;

impl PortfolioOptimizer {
    pub fn new() -> Self {
        Self
    }

    pub fn allocate(
        &self,
        request: &PortfolioRequest,
    ) -> Result<PortfolioAllocation, ValidationError> {
        let items = &request.items;
        if items.len() < MIN_ITEMS {
            return Err(ValidationError::TooFew {
                field: "items",
                min: MIN_ITEMS,
            });
        }
        for item in items {
            if item.skill.trim().is_empty() {
                return Err(ValidationError::TooShort {
                    field: "skill",
                    min: 1,
                });
            }
            ValidationError::check_range(
                "expected_return",
                item.expected_return,
                -MAX_ABS_RETURN,
                MAX_ABS_RETURN,
            )?;
            ValidationError::check_range("risk", item.risk, 0.0, MAX_RISK)?;
        }
        let rho = match request.correlation {
            Some(value) => ValidationError::check_range("correlation", value, -1.0, 1.0)?,
            None => DEFAULT_CORRELATION,
        };
        let target_risk = request
            .target_risk
            .map(|value| ValidationError::check_range("target_risk", value, 0.0, f64::MAX))
            .transpose()?;

        let weights = heuristic_weights(items);
        let expected_return = weights
            .iter()
            .zip(items)
            .map(|(weight, item)| weight * item.expected_return)
            .sum::<f64>();
        let risk = portfolio_variance(items, &weights, rho).sqrt();
        let diversification_score = diversification_score(&weights, rho);

        Ok(PortfolioAllocation {
            expected_return: round_to(expected_return, 4),
            risk: round_to(risk, 4),
            weights: items
                .iter()
                .zip(&weights)
                .map(|(item, weight)| WeightedItem {
                    skill: item.skill.clone(),
                    weight: round_to(*weight, 4),
                })
                .collect(),
            diversification_score,
            within_target_risk: target_risk.map(|target| risk <= target),
            rationale: vec![
                "Weights favor higher return/risk skills (heuristic tangency)".to_string(),
                format!("Assumed equal correlation rho={rho}"),
                "Frontier optimization deferred; this is a fast, deterministic baseline"
                    .to_string(),
            ],
        })
    }
}

/// Weights proportional to return/risk (floored at zero), normalised to one.
/// Ratios that overflow to infinity share all of the weight between them.
/// Falls back to equal weights when nothing scores above zero.
pub fn heuristic_weights(items: &[PortfolioItem]) -> Vec<f64> {
    let raw: Vec<f64> = items
        .iter()
        .map(|item| {
            if item.risk > 0.0 {
                (item.expected_return / item.risk).max(0.0)
            } else {
                0.0
            }
        })
        .collect();

    let unbounded = raw.iter().filter(|ratio| ratio.is_infinite()).count();
    if unbounded > 0 {
        let share = 1.0 / unbounded as f64;
        return raw
            .iter()
            .map(|ratio| if ratio.is_infinite() { share } else { 0.0 })
            .collect();
    }

    let total: f64 = raw.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        let equal = 1.0 / items.len().max(1) as f64;
        return vec![equal; items.len()];
    }
    raw.into_iter().map(|value| value / total).collect()
}

/// Own variances plus `2·wᵢ·wⱼ·ρ·σᵢ·σⱼ` for every unordered pair.
pub fn portfolio_variance(items: &[PortfolioItem], weights: &[f64], rho: f64) -> f64 {
    let diagonal: f64 = items
        .iter()
        .zip(weights)
        .map(|(item, weight)| weight.powi(2) * item.risk.powi(2))
        .sum();

    let mut cross = 0.0;
    for i in 0..items.len() {
        for j in (i + 1)..items.len() {
            cross += 2.0 * weights[i] * weights[j] * rho * items[i].risk * items[j].risk;
        }
    }

    (diagonal + cross).max(0.0)
}

/// 60% from how far the correlation sits below one, 40% from how close the
/// weights are to an equal split.
pub fn diversification_score(weights: &[f64], rho: f64) -> u8 {
    if weights.is_empty() {
        return 0;
    }
    let equal = 1.0 / weights.len() as f64;
    let deviation: f64 = weights.iter().map(|weight| (weight - equal).abs()).sum();
    let evenness = 1.0 - deviation / 2.0;
    let blended = (1.0 - rho.max(0.0)) * 0.6 + evenness * 0.4;
    (blended * 100.0).round().clamp(0.0, 100.0) as u8
}
