pub mod calibration;
pub mod cascade;
pub mod confidence;
pub mod freshness;
pub mod portfolio;
pub mod resistance;
pub mod sampler;
pub mod stats;
pub mod trajectory;

pub use calibration::{CalibrationEvaluator, CalibrationReport, CalibrationRequest};
pub use cascade::{
    CascadeContributor, CascadeRequest, CascadeResult, CascadeRiskPropagator, CascadeStatus,
};
pub use confidence::{
    ConfidenceEstimator, ConfidenceInterval, ConfidenceRequest, ConfidenceResponse,
};
pub use freshness::{
    FreshnessReport, FreshnessRequest, SkillFreshnessModel, SkillProfile, SkillTrend,
};
pub use portfolio::{PortfolioAllocation, PortfolioItem, PortfolioOptimizer, PortfolioRequest};
pub use resistance::{
    ResistanceCategory, ResistanceRequest, ResistanceResult, ResistanceScorer, SubFactorScores,
};
pub use sampler::{ModelSampler, RngSampler, Sampler, SequenceSampler};
pub use trajectory::{
    RiskTolerance, TrajectoryRequest, TrajectorySimulator, TrajectorySummary, TrajectoryTrial,
};
