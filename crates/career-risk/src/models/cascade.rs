//! Automation risk inherited from upstream occupations.
//!
//! Contributors combine as a weighted probabilistic OR,
//! `100 · (1 − Π(1 − wᵢ·pᵢ))`, which is monotone in every `wᵢ·pᵢ` and bounded
//! to [0, 100]. A target with no contributors and a target whose every
//! probability lookup failed are reported as distinct states so neither can be
//! mistaken for a genuine zero-risk result.
//!
//! A contributor carries either an explicit dependency weight or a raw
//! similarity score; similarities are scaled by the largest one in the request.

use super::stats::round_to;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

const TOP_CONTRIBUTORS: usize = 5;
const MAX_TIMELINE_MONTHS: f64 = 60.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CascadeContributor {
    pub occupation_code: String,
    pub title: String,
    /// Dependency weight in [0, 1]. Wins over `similarity` when both are set.
    #[serde(default)]
    pub weight: Option<f64>,
    /// Raw non-negative similarity to the target occupation.
    #[serde(default)]
    pub similarity: Option<f64>,
    /// Automation probability in [0, 1]; absent when the upstream lookup failed.
    #[serde(default)]
    pub automation_prob: Option<f64>,
}

/// A contributor paired with its resolved dependency weight.
#[derive(Debug, Clone, Copy)]
struct Weighted<'a> {
    source: &'a CascadeContributor,
    weight: f64,
}

impl Weighted<'_> {
    fn contribution(&self) -> Option<f64> {
        self.source
            .automation_prob
            .map(|probability| self.weight * probability)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CascadeRequest {
    #[serde(default)]
    pub occupation_code: Option<String>,
    #[serde(default)]
    pub upstream: Vec<CascadeContributor>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CascadeStatus {
    Scored,
    /// No upstream contributors were supplied.
    InsufficientData,
    /// Contributors were supplied but none carried an automation probability.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedContributor {
    pub occupation_code: String,
    pub title: String,
    pub weight: f64,
    pub automation_prob: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CascadeResult {
    pub occupation_code: Option<String>,
    pub status: CascadeStatus,
    pub cascade_score: Option<f64>,
    pub top_contributors: Vec<RankedContributor>,
    pub timeline_months: Option<u32>,
    pub unavailable_contributors: Vec<String>,
    pub recommendations: Vec<&'static str>,
}

/// Scales raw similarity scores by their maximum into dependency weights.
pub fn weights_from_similarity(similarities: &[f64]) -> Vec<f64> {
    let max = similarities
        .iter()
        .copied()
        .filter(|value| value.is_finite())
        .fold(0.0_f64, f64::max);
    similarities
        .iter()
        .map(|value| {
            if max > 0.0 && value.is_finite() {
                (value / max).clamp(0.0, 1.0)
            } else {
                0.0
            }
        })
        .collect()
}

/// `1 − Π(1 − wᵢ·pᵢ)` scaled to [0, 100].
pub fn combine(contributions: &[f64]) -> f64 {
    let survival: f64 = contributions
        .iter()
        .map(|contribution| 1.0 - contribution.clamp(0.0, 1.0))
        .product();
    ((1.0 - survival) * 100.0).clamp(0.0, 100.0)
}

#[derive(Debug, Clone, Default)]
pub struct CascadeRiskPropagator;

impl CascadeRiskPropagator {
    pub fn new() -> Self {
        Self
    }

    pub fn propagate(&self, request: &CascadeRequest) -> Result<CascadeResult, ValidationError> {
        for contributor in &request.upstream {
            if contributor.occupation_code.trim().is_empty() {
                return Err(ValidationError::TooShort {
                    field: "occupation_code",
                    min: 1,
                });
            }
            match (contributor.weight, contributor.similarity) {
                (Some(weight), _) => {
                    ValidationError::check_range("weight", weight, 0.0, 1.0)?;
                }
                (None, Some(similarity)) => {
                    ValidationError::check_range("similarity", similarity, 0.0, f64::MAX)?;
                }
                (None, None) => return Err(ValidationError::Missing { field: "weight" }),
            }
            if let Some(probability) = contributor.automation_prob {
                ValidationError::check_range("automation_prob", probability, 0.0, 1.0)?;
            }
        }

        let occupation_code = request.occupation_code.clone();
        if request.upstream.is_empty() {
            return Ok(CascadeResult {
                occupation_code,
                status: CascadeStatus::InsufficientData,
                cascade_score: Some(0.0),
                top_contributors: Vec::new(),
                timeline_months: None,
                unavailable_contributors: Vec::new(),
                recommendations: Vec::new(),
            });
        }

        let (mut scored, missing): (Vec<_>, Vec<_>) = resolve_weights(&request.upstream)
            .into_iter()
            .partition(|entry| entry.source.automation_prob.is_some());
        let unavailable_contributors: Vec<String> = missing
            .iter()
            .map(|entry| entry.source.occupation_code.clone())
            .collect();

        if scored.is_empty() {
            return Ok(CascadeResult {
                occupation_code,
                status: CascadeStatus::Unavailable,
                cascade_score: None,
                top_contributors: Vec::new(),
                timeline_months: None,
                unavailable_contributors,
                recommendations: Vec::new(),
            });
        }

        scored.sort_by(|a, b| {
            let left = a.contribution().unwrap_or(0.0);
            let right = b.contribution().unwrap_or(0.0);
            right.total_cmp(&left)
        });

        let contributions: Vec<f64> = scored
            .iter()
            .filter_map(|entry| entry.contribution())
            .collect();
        let score = round_to(combine(&contributions), 2);

        let top_contributors = scored
            .iter()
            .take(TOP_CONTRIBUTORS)
            .map(|entry| RankedContributor {
                occupation_code: entry.source.occupation_code.clone(),
                title: entry.source.title.clone(),
                weight: round_to(entry.weight, 3),
                automation_prob: round_to(entry.source.automation_prob.unwrap_or(0.0), 3),
            })
            .collect();

        Ok(CascadeResult {
            occupation_code,
            status: CascadeStatus::Scored,
            cascade_score: Some(score),
            top_contributors,
            timeline_months: timeline_months(&scored),
            unavailable_contributors,
            recommendations: vec![
                "Reduce dependency weight on high-automation upstream roles",
                "Increase links to high-resistance roles to buffer cascades",
                "Stagger adoption timelines to avoid synchronized shocks",
            ],
        })
    }
}

/// Explicit weights pass through; the rest come from similarity scaled by
/// the request-wide maximum.
fn resolve_weights(upstream: &[CascadeContributor]) -> Vec<Weighted<'_>> {
    let similarities: Vec<f64> = upstream
        .iter()
        .map(|contributor| contributor.similarity.unwrap_or(0.0))
        .collect();
    upstream
        .iter()
        .zip(weights_from_similarity(&similarities))
        .map(|(source, scaled)| Weighted {
            source,
            weight: source.weight.unwrap_or(scaled),
        })
        .collect()
}

/// Weight-averaged `12 + (1 − p)·24` months, clamped to [0, 60]. `None` when
/// every weight is zero.
fn timeline_months(scored: &[Weighted<'_>]) -> Option<u32> {
    let total_weight: f64 = scored.iter().map(|entry| entry.weight).sum();
    if total_weight <= 0.0 {
        return None;
    }
    let weighted: f64 = scored
        .iter()
        .map(|entry| {
            let probability = entry.source.automation_prob.unwrap_or(0.0);
            entry.weight * (12.0 + (1.0 - probability) * 24.0)
        })
        .sum();
    Some((weighted / total_weight).round().clamp(0.0, MAX_TIMELINE_MONTHS) as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contributor(code: &str, weight: f64, probability: Option<f64>) -> CascadeContributor {
        CascadeContributor {
            occupation_code: code.to_string(),
            title: format!("Occupation {code}"),
            weight: Some(weight),
            similarity: None,
            automation_prob: probability,
        }
    }

    fn similar(code: &str, similarity: f64, probability: f64) -> CascadeContributor {
        CascadeContributor {
            weight: None,
            similarity: Some(similarity),
            ..contributor(code, 0.0, Some(probability))
        }
    }

    fn request(upstream: Vec<CascadeContributor>) -> CascadeRequest {
        CascadeRequest {
            occupation_code: Some("15-1252".to_string()),
            upstream,
        }
    }

    #[test]
    fn no_contributors_is_insufficient_data() {
        let result = CascadeRiskPropagator::new()
            .propagate(&request(Vec::new()))
            .expect("valid request");
        assert_eq!(result.status, CascadeStatus::InsufficientData);
        assert_eq!(result.cascade_score, Some(0.0));
    }

    #[test]
    fn zero_risk_contributors_are_scored_not_insufficient() {
        let result = CascadeRiskPropagator::new()
            .propagate(&request(vec![contributor("43-9021", 0.8, Some(0.0))]))
            .expect("valid request");
        assert_eq!(result.status, CascadeStatus::Scored);
        assert_eq!(result.cascade_score, Some(0.0));
        assert_eq!(result.timeline_months, Some(36));
    }

    #[test]
    fn failed_lookups_are_unavailable() {
        let result = CascadeRiskPropagator::new()
            .propagate(&request(vec![
                contributor("43-9021", 0.8, None),
                contributor("43-4051", 0.4, None),
            ]))
            .expect("valid request");
        assert_eq!(result.status, CascadeStatus::Unavailable);
        assert_eq!(result.cascade_score, None);
        assert_eq!(result.unavailable_contributors, vec!["43-9021", "43-4051"]);
    }

    #[test]
    fn partial_lookups_score_the_remainder() {
        let result = CascadeRiskPropagator::new()
            .propagate(&request(vec![
                contributor("43-9021", 0.5, Some(0.8)),
                contributor("43-4051", 0.4, None),
            ]))
            .expect("valid request");
        assert_eq!(result.status, CascadeStatus::Scored);
        assert_eq!(result.cascade_score, Some(40.0));
        assert_eq!(result.unavailable_contributors, vec!["43-4051"]);
    }

    #[test]
    fn combines_as_probabilistic_or_and_ranks_contributors() {
        let result = CascadeRiskPropagator::new()
            .propagate(&request(vec![
                contributor("a", 0.5, Some(0.2)),
                contributor("b", 1.0, Some(0.5)),
                contributor("c", 0.2, Some(0.9)),
            ]))
            .expect("valid request");

        // 1 - (0.9 * 0.5 * 0.82) = 0.631
        assert_eq!(result.cascade_score, Some(63.1));
        let codes: Vec<_> = result
            .top_contributors
            .iter()
            .map(|entry| entry.occupation_code.as_str())
            .collect();
        assert_eq!(codes, vec!["b", "c", "a"]);
    }

    #[test]
    fn top_contributors_are_capped() {
        let upstream = (0..8)
            .map(|index| contributor(&format!("c{index}"), 0.1, Some(0.5)))
            .collect();
        let result = CascadeRiskPropagator::new()
            .propagate(&request(upstream))
            .expect("valid request");
        assert_eq!(result.top_contributors.len(), 5);
    }

    #[test]
    fn rejects_out_of_range_contributors() {
        let propagator = CascadeRiskPropagator::new();
        assert!(propagator
            .propagate(&request(vec![contributor("a", 1.5, Some(0.5))]))
            .is_err());
        assert!(propagator
            .propagate(&request(vec![contributor("a", 0.5, Some(-0.1))]))
            .is_err());
        assert!(propagator
            .propagate(&request(vec![contributor(" ", 0.5, Some(0.5))]))
            .is_err());
    }

    #[test]
    fn similarity_normalises_against_maximum() {
        assert_eq!(weights_from_similarity(&[2.0, 1.0, 0.0]), vec![1.0, 0.5, 0.0]);
        assert_eq!(weights_from_similarity(&[0.0, 0.0]), vec![0.0, 0.0]);
        assert_eq!(weights_from_similarity(&[f64::NAN, 4.0]), vec![0.0, 1.0]);
    }

    #[test]
    fn similarities_become_weights_relative_to_the_maximum() {
        let result = CascadeRiskPropagator::new()
            .propagate(&request(vec![
                similar("a", 8.0, 0.5),
                similar("b", 4.0, 0.5),
                contributor("c", 0.1, Some(1.0)),
            ]))
            .expect("valid request");

        let weights: Vec<_> = result
            .top_contributors
            .iter()
            .map(|entry| (entry.occupation_code.as_str(), entry.weight))
            .collect();
        assert_eq!(weights, vec![("a", 1.0), ("b", 0.5), ("c", 0.1)]);
        // 1 - (0.5 * 0.75 * 0.9) = 0.6625
        assert_eq!(result.cascade_score, Some(66.25));
    }

    #[test]
    fn contributor_without_weight_or_similarity_is_rejected() {
        let mut bare = contributor("a", 0.5, Some(0.5));
        bare.weight = None;
        assert!(matches!(
            CascadeRiskPropagator::new().propagate(&request(vec![bare])),
            Err(ValidationError::Missing { field: "weight" })
        ));
        assert!(CascadeRiskPropagator::new()
            .propagate(&request(vec![similar("a", -1.0, 0.5)]))
            .is_err());
    }

    #[test]
    fn combine_is_bounded() {
        assert_eq!(combine(&[]), 0.0);
        assert_eq!(combine(&[1.0, 0.3]), 100.0);
        assert!(combine(&[0.3]) < combine(&[0.3, 0.01]));
    }
}
