use serde::Serialize;

/// Bumped whenever a rule below changes so clients can tell scores apart.
pub const VOCABULARY_VERSION: &str = "2024.1";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Complexity,
    TacitKnowledge,
    HumanTouch,
    Adversarial,
}

impl Dimension {
    pub fn label(&self) -> &'static str {
        match self {
            Dimension::Complexity => "complexity",
            Dimension::TacitKnowledge => "tacit_knowledge",
            Dimension::HumanTouch => "human_touch",
            Dimension::Adversarial => "adversarial",
        }
    }
}

/// Which input text a rule is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
    /// Applied at most once against the task description.
    Task,
    /// Applied once per matching hint.
    Hint,
}

/// One scoring rule: if any phrase occurs, every adjustment fires.
#[derive(Debug, Clone, Copy)]
pub struct VocabularyRule {
    pub key: &'static str,
    pub target: MatchTarget,
    pub phrases: &'static [&'static str],
    pub adjustments: &'static [(Dimension, f64)],
}

impl VocabularyRule {
    pub(crate) fn matches(&self, lowered: &str) -> bool {
        self.phrases.iter().any(|phrase| lowered.contains(phrase))
    }
}

use Dimension::{Adversarial, Complexity, HumanTouch, TacitKnowledge};
use MatchTarget::{Hint, Task};

pub static STANDARD_VOCABULARY: &[VocabularyRule] = &[
    VocabularyRule {
        key: "strategic_synthesis",
        target: Task,
        phrases: &[
            "strategy",
            "strategic",
            "architecture",
            "design document",
            "synthesis",
            "tradeoff",
        ],
        adjustments: &[(Complexity, 2.0)],
    },
    VocabularyRule {
        key: "diagnostic_work",
        target: Task,
        phrases: &["debug", "investigate", "diagnose", "triage", "interpret"],
        adjustments: &[(Complexity, 1.5)],
    },
    VocabularyRule {
        key: "contractual_terms",
        target: Task,
        phrases: &["contract", "legal terms", "liability"],
        adjustments: &[(Complexity, 1.0)],
    },
    VocabularyRule {
        key: "routine_processing",
        target: Task,
        phrases: &["routine", "data entry", "copy", "extract", "template", "form"],
        adjustments: &[(Complexity, -2.0)],
    },
    VocabularyRule {
        key: "scripted_procedure",
        target: Task,
        phrases: &[
            "checklist",
            "standard operating procedure",
            "sop",
            "step-by-step",
        ],
        adjustments: &[(Complexity, -1.0)],
    },
    VocabularyRule {
        key: "judgment_calls",
        target: Task,
        phrases: &[
            "you'll know it when you see it",
            "judgment",
            "intuition",
            "taste",
            "context",
        ],
        adjustments: &[(TacitKnowledge, 2.0)],
    },
    VocabularyRule {
        key: "rule_based",
        target: Task,
        phrases: &["follow procedure", "rule-based", "structured"],
        adjustments: &[(TacitKnowledge, -1.5)],
    },
    VocabularyRule {
        key: "interpersonal",
        target: Task,
        phrases: &[
            "negotiate",
            "mediate",
            "empathy",
            "counsel",
            "relationship",
            "trust",
            "lead",
        ],
        adjustments: &[(HumanTouch, 2.5)],
    },
    VocabularyRule {
        key: "counterparty_facing",
        target: Task,
        phrases: &["customer", "patient", "client", "stakeholder", "vendor"],
        adjustments: &[(HumanTouch, 1.0)],
    },
    VocabularyRule {
        key: "unattended_pipeline",
        target: Task,
        phrases: &["batch", "pipeline", "etl", "cron"],
        adjustments: &[(HumanTouch, -1.5)],
    },
    VocabularyRule {
        key: "adversarial_pressure",
        target: Task,
        phrases: &["fraud", "spam", "adversary", "attack", "game", "competition"],
        adjustments: &[(Adversarial, 2.0)],
    },
    VocabularyRule {
        key: "regulatory_scrutiny",
        target: Task,
        phrases: &["regulatory", "regulator", "audit", "scrutiny"],
        adjustments: &[(Adversarial, 1.5)],
    },
    VocabularyRule {
        key: "static_environment",
        target: Task,
        phrases: &["static rules", "deterministic"],
        adjustments: &[(Adversarial, -1.0)],
    },
    VocabularyRule {
        key: "hint_regulatory",
        target: Hint,
        phrases: &["regulatory", "compliance"],
        adjustments: &[(Adversarial, 1.5)],
    },
    VocabularyRule {
        key: "hint_high_stakes",
        target: Hint,
        phrases: &["high-stakes", "safety"],
        adjustments: &[(HumanTouch, 1.5)],
    },
    VocabularyRule {
        key: "hint_creative",
        target: Hint,
        phrases: &["creative", "novel"],
        adjustments: &[(TacitKnowledge, 1.0)],
    },
    VocabularyRule {
        key: "hint_repeatable",
        target: Hint,
        phrases: &["repeatable", "routine"],
        adjustments: &[(TacitKnowledge, -1.0), (Complexity, -1.0)],
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn rule_keys_are_unique() {
        let keys: HashSet<_> = STANDARD_VOCABULARY.iter().map(|rule| rule.key).collect();
        assert_eq!(keys.len(), STANDARD_VOCABULARY.len());
    }

    #[test]
    fn phrases_are_lowercase() {
        for rule in STANDARD_VOCABULARY {
            for phrase in rule.phrases {
                assert_eq!(*phrase, phrase.to_lowercase(), "rule {}", rule.key);
            }
        }
    }

    #[test]
    fn adversarial_hints_only_raise_adversarial() {
        for rule in STANDARD_VOCABULARY.iter().filter(|rule| rule.target == Hint) {
            for (dimension, delta) in rule.adjustments {
                if *dimension == Adversarial {
                    assert!(*delta > 0.0, "rule {}", rule.key);
                }
            }
        }
    }
}
