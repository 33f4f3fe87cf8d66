//! Deterministic keyword heuristic scoring how well a task resists automation.

mod vocabulary;

pub use vocabulary::{
    Dimension, MatchTarget, VocabularyRule, STANDARD_VOCABULARY, VOCABULARY_VERSION,
};

use super::stats::round_to;
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

pub const MIN_TASK_CHARS: usize = 5;
const BASELINE: f64 = 5.0;

#[derive(Debug, Clone, Deserialize)]
pub struct ResistanceRequest {
    pub task: String,
    #[serde(default)]
    pub hints: Vec<String>,
}

/// Four bounded dimensions, each in [0, 10].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SubFactorScores {
    pub complexity: f64,
    pub tacit_knowledge: f64,
    pub human_touch: f64,
    pub adversarial: f64,
}

impl SubFactorScores {
    fn baseline() -> Self {
        Self {
            complexity: BASELINE,
            tacit_knowledge: BASELINE,
            human_touch: BASELINE,
            adversarial: BASELINE,
        }
    }

    fn adjust(&mut self, dimension: Dimension, delta: f64) {
        let slot = match dimension {
            Dimension::Complexity => &mut self.complexity,
            Dimension::TacitKnowledge => &mut self.tacit_knowledge,
            Dimension::HumanTouch => &mut self.human_touch,
            Dimension::Adversarial => &mut self.adversarial,
        };
        *slot += delta;
    }

    fn clamped(self) -> Self {
        Self {
            complexity: self.complexity.clamp(0.0, 10.0),
            tacit_knowledge: self.tacit_knowledge.clamp(0.0, 10.0),
            human_touch: self.human_touch.clamp(0.0, 10.0),
            adversarial: self.adversarial.clamp(0.0, 10.0),
        }
    }

    /// `0.30·complexity + 0.25·tacit + 0.25·human + 0.20·adversarial`.
    pub fn weighted(&self) -> f64 {
        let score = 0.30 * self.complexity
            + 0.25 * self.tacit_knowledge
            + 0.25 * self.human_touch
            + 0.20 * self.adversarial;
        score.clamp(0.0, 10.0)
    }

    fn rounded(&self) -> Self {
        Self {
            complexity: round_to(self.complexity, 1),
            tacit_knowledge: round_to(self.tacit_knowledge, 1),
            human_touch: round_to(self.human_touch, 1),
            adversarial: round_to(self.adversarial, 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResistanceCategory {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl ResistanceCategory {
    pub fn from_score(score: f64) -> Self {
        if score < 3.0 {
            Self::Low
        } else if score < 6.0 {
            Self::Medium
        } else if score < 8.0 {
            Self::High
        } else {
            Self::VeryHigh
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResistanceCategory::Low => "low",
            ResistanceCategory::Medium => "medium",
            ResistanceCategory::High => "high",
            ResistanceCategory::VeryHigh => "very_high",
        }
    }
}

/// Years until automation; lower resistance means a shorter horizon.
pub fn timeline_years(score: f64) -> f64 {
    (2.0 + (10.0 - score) * 1.2).clamp(0.0, 30.0)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResistanceResult {
    pub task: String,
    pub subscores: SubFactorScores,
    pub resistance_score: f64,
    pub category: ResistanceCategory,
    pub timeline_years: f64,
    pub explanation: String,
    /// Keys of the vocabulary rules that fired, in table order.
    pub signals: Vec<&'static str>,
    pub vocabulary_version: &'static str,
}

#[derive(Debug, Clone)]
pub struct ResistanceScorer {
    vocabulary: &'static [VocabularyRule],
}

impl Default for ResistanceScorer {
    fn default() -> Self {
        Self::new(STANDARD_VOCABULARY)
    }
}

impl ResistanceScorer {
    pub fn new(vocabulary: &'static [VocabularyRule]) -> Self {
        Self { vocabulary }
    }

    pub fn score(&self, request: &ResistanceRequest) -> Result<ResistanceResult, ValidationError> {
        if request.task.trim().chars().count() < MIN_TASK_CHARS {
            return Err(ValidationError::TooShort {
                field: "task",
                min: MIN_TASK_CHARS,
            });
        }

        let (subscores, signals) = self.subscores(&request.task, &request.hints);
        let score = subscores.weighted();

        Ok(ResistanceResult {
            task: request.task.clone(),
            subscores: subscores.rounded(),
            resistance_score: round_to(score, 2),
            category: ResistanceCategory::from_score(score),
            timeline_years: round_to(timeline_years(score), 1),
            explanation: "Deterministic heuristic scoring based on task wording and hints"
                .to_string(),
            signals,
            vocabulary_version: VOCABULARY_VERSION,
        })
    }

    /// Clamped sub-factor scores plus the rule keys that fired.
    pub fn subscores(&self, task: &str, hints: &[String]) -> (SubFactorScores, Vec<&'static str>) {
        let task = task.to_lowercase();
        let hints: Vec<String> = hints.iter().map(|hint| hint.to_lowercase()).collect();
        let mut scores = SubFactorScores::baseline();
        let mut signals = Vec::new();

        for rule in self.vocabulary {
            let hits = match rule.target {
                MatchTarget::Task => usize::from(rule.matches(&task)),
                MatchTarget::Hint => hints.iter().filter(|hint| rule.matches(hint)).count(),
            };
            if hits == 0 {
                continue;
            }
            for (dimension, delta) in rule.adjustments {
                scores.adjust(*dimension, delta * hits as f64);
            }
            signals.push(rule.key);
        }

        (scores.clamped(), signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(task: &str, hints: &[&str]) -> ResistanceRequest {
        ResistanceRequest {
            task: task.to_string(),
            hints: hints.iter().map(|hint| hint.to_string()).collect(),
        }
    }

    #[test]
    fn negotiation_under_scrutiny_scores_high() {
        let scorer = ResistanceScorer::default();
        let result = scorer
            .score(&request(
                "negotiate contract terms with external vendor under regulatory scrutiny",
                &["regulatory"],
            ))
            .expect("valid task");

        assert!(result.subscores.adversarial > 5.0);
        assert!(result.subscores.human_touch > 5.0);
        assert!(matches!(
            result.category,
            ResistanceCategory::High | ResistanceCategory::VeryHigh
        ));
        assert!(result.signals.contains(&"hint_regulatory"));
    }

    #[test]
    fn routine_data_entry_scores_low_resistance() {
        let scorer = ResistanceScorer::default();
        let result = scorer
            .score(&request(
                "routine data entry into a batch pipeline following a checklist",
                &["repeatable"],
            ))
            .expect("valid task");

        assert!(result.subscores.complexity < 5.0);
        assert!(result.subscores.human_touch < 5.0);
        assert_eq!(result.category, ResistanceCategory::Medium);
        assert!(result.timeline_years > 2.0);
    }

    #[test]
    fn neutral_text_stays_at_baseline() {
        let scorer = ResistanceScorer::default();
        let result = scorer
            .score(&request("water the plants", &[]))
            .expect("valid task");
        assert_eq!(result.resistance_score, 5.0);
        assert_eq!(result.category, ResistanceCategory::Medium);
        assert_eq!(result.timeline_years, 8.0);
        assert!(result.signals.is_empty());
    }

    #[test]
    fn rejects_trivially_short_task() {
        let scorer = ResistanceScorer::default();
        assert!(matches!(
            scorer.score(&request(" abc ", &[])),
            Err(ValidationError::TooShort { field: "task", .. })
        ));
    }

    #[test]
    fn repeated_hints_stack_and_clamp() {
        let scorer = ResistanceScorer::default();
        let hints = vec!["compliance".to_string(); 10];
        let (scores, _) = scorer.subscores("review fraud reports", &hints);
        assert_eq!(scores.adversarial, 10.0);
    }

    #[test]
    fn categories_follow_thresholds() {
        assert_eq!(ResistanceCategory::from_score(2.99), ResistanceCategory::Low);
        assert_eq!(ResistanceCategory::from_score(3.0), ResistanceCategory::Medium);
        assert_eq!(ResistanceCategory::from_score(6.0), ResistanceCategory::High);
        assert_eq!(ResistanceCategory::from_score(8.0), ResistanceCategory::VeryHigh);
    }

    #[test]
    fn timeline_shrinks_as_resistance_falls() {
        assert_eq!(timeline_years(10.0), 2.0);
        assert!((timeline_years(0.0) - 14.0).abs() < 1e-9);
        assert!(timeline_years(3.0) > timeline_years(7.0));
    }

    #[test]
    fn scoring_is_idempotent() {
        let scorer = ResistanceScorer::default();
        let input = request("investigate customer fraud disputes", &["high-stakes"]);
        let first = scorer.score(&input).expect("valid");
        let second = scorer.score(&input).expect("valid");
        assert_eq!(first, second);
    }
}
