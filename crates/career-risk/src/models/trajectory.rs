//! Monte Carlo simulation of learning-completion time and resulting salary.

use super::sampler::Sampler;
use super::stats::{percentile, round_to};
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};

/// Abstract units of learning needed to complete a transition.
const COMPLETION_THRESHOLD: f64 = 10.0;
const LEARNING_NOISE_STD: f64 = 0.2;
const SALARY_NOISE_STD: f64 = 0.1;
const SALARY_CAPTURE: f64 = 0.7;
const MIN_SPEED: f64 = 0.2;
const MAX_SPEED: f64 = 3.0;
const CHECKPOINTS: [u32; 3] = [12, 18, 24];
pub const MAX_SALARY: f64 = 100_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskTolerance {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl RiskTolerance {
    pub fn speed_multiplier(&self) -> f64 {
        match self {
            RiskTolerance::Conservative => 0.8,
            RiskTolerance::Balanced => 1.0,
            RiskTolerance::Aggressive => 1.2,
        }
    }

    pub fn market_noise_std(&self) -> f64 {
        match self {
            RiskTolerance::Conservative => 0.1,
            RiskTolerance::Balanced => 0.2,
            RiskTolerance::Aggressive => 0.3,
        }
    }
}

fn default_hours() -> f64 {
    10.0
}

fn default_horizon() -> u32 {
    36
}

fn default_iterations() -> u32 {
    2_000
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrajectoryRequest {
    #[serde(default = "default_hours")]
    pub hours_per_week: f64,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
    #[serde(default)]
    pub current_salary: Option<f64>,
    #[serde(default)]
    pub target_salary: Option<f64>,
    #[serde(default = "default_horizon")]
    pub duration_months_max: u32,
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for TrajectoryRequest {
    fn default() -> Self {
        Self {
            hours_per_week: default_hours(),
            risk_tolerance: RiskTolerance::default(),
            current_salary: None,
            target_salary: None,
            duration_months_max: default_horizon(),
            iterations: default_iterations(),
        }
    }
}

impl TrajectoryRequest {
    pub fn validate(&self) -> Result<(), ValidationError> {
        ValidationError::check_range("hours_per_week", self.hours_per_week, 1.0, 60.0)?;
        ValidationError::check_range(
            "duration_months_max",
            self.duration_months_max as f64,
            6.0,
            60.0,
        )?;
        ValidationError::check_range("iterations", self.iterations as f64, 200.0, 20_000.0)?;
        if let Some(current) = self.current_salary {
            ValidationError::check_range("current_salary", current, 0.0, MAX_SALARY)?;
        }
        if let Some(target) = self.target_salary {
            ValidationError::check_range("target_salary", target, 0.0, MAX_SALARY)?;
        }
        Ok(())
    }
}

/// One sampled future. `months` is capped at one and a half horizons;
/// `completed` is false when the trial needed longer than that.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrajectoryTrial {
    pub months: u32,
    pub completed: bool,
    pub success: bool,
    pub salary: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectorySummary {
    pub p_success_12m: f64,
    pub p_success_18m: f64,
    pub p_success_24m: f64,
    pub p_success_horizon: f64,
    pub months_p50: u32,
    pub months_p90: u32,
    pub median_salary_at_completion: Option<f64>,
    pub iterations: u32,
    pub notes: Vec<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct TrajectorySimulator;

impl TrajectorySimulator {
    pub fn new() -> Self {
        Self
    }

    pub fn simulate<S: Sampler>(
        &self,
        request: &TrajectoryRequest,
        sampler: &mut S,
    ) -> Result<TrajectorySummary, ValidationError> {
        request.validate()?;
        let mut trials: Vec<TrajectoryTrial> = (0..request.iterations)
            .map(|_| self.trial(request, sampler))
            .collect();
        Ok(summarize(&mut trials))
    }

    pub fn trial<S: Sampler>(
        &self,
        request: &TrajectoryRequest,
        sampler: &mut S,
    ) -> TrajectoryTrial {
        let horizon = request.duration_months_max;
        let tolerance = request.risk_tolerance;

        let learning_noise = 1.0 + sampler.gaussian(LEARNING_NOISE_STD);
        let market_noise = 1.0 + sampler.gaussian(tolerance.market_noise_std());
        let speed = (request.hours_per_week / 10.0
            * tolerance.speed_multiplier()
            * learning_noise
            * market_noise)
            .clamp(MIN_SPEED, MAX_SPEED);

        let needed = (COMPLETION_THRESHOLD / speed).ceil() as u32;
        let cap = horizon + horizon / 2;
        let months = needed.clamp(1, cap);

        let salary = match (request.current_salary, request.target_salary) {
            (Some(current), Some(target)) => {
                let delta = (target - current).max(0.0);
                let noise = 1.0 + sampler.gaussian(SALARY_NOISE_STD);
                Some((current + delta * SALARY_CAPTURE * noise).round())
            }
            _ => None,
        };

        TrajectoryTrial {
            months,
            completed: needed <= cap,
            success: needed <= horizon,
            salary,
        }
    }
}

/// Aggregates trials; sorts them by months in place. Checkpoints only count
/// trials that actually completed.
pub fn summarize(trials: &mut [TrajectoryTrial]) -> TrajectorySummary {
    trials.sort_by_key(|trial| trial.months);
    let months: Vec<u32> = trials.iter().map(|trial| trial.months).collect();
    let total = trials.len().max(1) as f64;

    let within = |limit: u32| {
        let count = trials
            .iter()
            .filter(|trial| trial.completed && trial.months <= limit)
            .count();
        round_to(count as f64 / total, 4)
    };
    let [m12, m18, m24] = CHECKPOINTS;
    let successes = trials.iter().filter(|trial| trial.success).count();

    let mut salaries: Vec<f64> = trials.iter().filter_map(|trial| trial.salary).collect();
    salaries.sort_by(f64::total_cmp);

    TrajectorySummary {
        p_success_12m: within(m12),
        p_success_18m: within(m18),
        p_success_24m: within(m24),
        p_success_horizon: round_to(successes as f64 / total, 4),
        months_p50: percentile(&months, 0.5).unwrap_or(0),
        months_p90: percentile(&months, 0.9).unwrap_or(0),
        median_salary_at_completion: percentile(&salaries, 0.5),
        iterations: trials.len() as u32,
        notes: vec!["Monte Carlo-lite with stochastic learning and market factors"],
    }
}
