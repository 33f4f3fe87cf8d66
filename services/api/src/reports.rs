use crate::infra::{parse_contributor, parse_date, parse_portfolio_item};
use career_risk::error::AppError;
use career_risk::models::{
    CascadeContributor, CascadeRequest, CascadeResult, CascadeRiskPropagator, CascadeStatus,
    ConfidenceEstimator, ConfidenceRequest, ConfidenceResponse, FreshnessReport,
    FreshnessRequest, ModelSampler, PortfolioAllocation, PortfolioItem, PortfolioOptimizer,
    PortfolioRequest, ResistanceRequest, ResistanceResult, ResistanceScorer, RiskTolerance,
    SkillFreshnessModel, SkillTrend, TrajectoryRequest, TrajectorySimulator, TrajectorySummary,
};
use chrono::{Local, NaiveDate};
use clap::{Args, ValueEnum};

#[derive(Args, Debug)]
pub(crate) struct ResistanceArgs {
    /// Task description to score
    pub(crate) task: String,
    /// Context hint such as "regulatory" or "repeatable" (repeatable)
    #[arg(long = "hint")]
    pub(crate) hints: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct HalfLifeArgs {
    /// Skill name
    pub(crate) skill: String,
    /// Year the skill was acquired (defaults to the current year)
    #[arg(long)]
    pub(crate) acquired_year: Option<i32>,
    /// Acquisition date as YYYY or YYYY-MM; ignored when --acquired-year is set
    #[arg(long)]
    pub(crate) acquired_date: Option<String>,
    /// Market trend for the skill
    #[arg(long, value_enum, default_value_t = TrendArg::Stable)]
    pub(crate) trend: TrendArg,
    /// Explicit half-life in years, bypassing the trend adjustment
    #[arg(long)]
    pub(crate) half_life_years: Option<f64>,
    /// Freshness percentage that triggers the critical alert
    #[arg(long)]
    pub(crate) critical_threshold: Option<f64>,
    /// Evaluation date (YYYY-MM-DD). Defaults to today.
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct PortfolioArgs {
    /// Portfolio entry formatted as skill:expected_return:risk (repeatable)
    #[arg(long = "item", value_parser = parse_portfolio_item, required = true)]
    pub(crate) items: Vec<PortfolioItem>,
    /// Assumed pairwise correlation in [-1, 1]
    #[arg(long, allow_hyphen_values = true)]
    pub(crate) correlation: Option<f64>,
    /// Maximum acceptable portfolio risk
    #[arg(long)]
    pub(crate) target_risk: Option<f64>,
}

#[derive(Args, Debug)]
pub(crate) struct TrajectoryArgs {
    /// Weekly study hours
    #[arg(long, default_value_t = 10.0)]
    pub(crate) hours_per_week: f64,
    /// Appetite for market risk
    #[arg(long, value_enum, default_value_t = ToleranceArg::Balanced)]
    pub(crate) risk_tolerance: ToleranceArg,
    #[arg(long)]
    pub(crate) current_salary: Option<f64>,
    #[arg(long)]
    pub(crate) target_salary: Option<f64>,
    /// Planning horizon in months
    #[arg(long, default_value_t = 36)]
    pub(crate) duration_months_max: u32,
    /// Number of Monte Carlo trials
    #[arg(long, default_value_t = 2_000)]
    pub(crate) iterations: u32,
    /// Seed for reproducible runs
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Args, Debug)]
pub(crate) struct CascadeArgs {
    /// Code of the occupation being assessed
    #[arg(long)]
    pub(crate) occupation_code: Option<String>,
    /// Upstream dependency formatted as code:title:weight[:probability] (repeatable)
    #[arg(long = "upstream", value_parser = parse_contributor)]
    pub(crate) upstream: Vec<CascadeContributor>,
}

#[derive(Args, Debug)]
pub(crate) struct ConfidenceArgs {
    /// Point automation score in [0, 100]
    pub(crate) score: f64,
    /// Number of samples (defaults to the configured iteration count)
    #[arg(long)]
    pub(crate) iterations: Option<u32>,
    /// Seed for reproducible runs
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum TrendArg {
    Growing,
    Stable,
    Declining,
}

impl From<TrendArg> for SkillTrend {
    fn from(value: TrendArg) -> Self {
        match value {
            TrendArg::Growing => SkillTrend::Growing,
            TrendArg::Stable => SkillTrend::Stable,
            TrendArg::Declining => SkillTrend::Declining,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub(crate) enum ToleranceArg {
    Conservative,
    Balanced,
    Aggressive,
}

impl From<ToleranceArg> for RiskTolerance {
    fn from(value: ToleranceArg) -> Self {
        match value {
            ToleranceArg::Conservative => RiskTolerance::Conservative,
            ToleranceArg::Balanced => RiskTolerance::Balanced,
            ToleranceArg::Aggressive => RiskTolerance::Aggressive,
        }
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

pub(crate) fn run_resistance(args: ResistanceArgs) -> Result<(), AppError> {
    let result = ResistanceScorer::default().score(&ResistanceRequest {
        task: args.task,
        hints: args.hints,
    })?;
    print_lines(resistance_lines(&result));
    Ok(())
}

pub(crate) fn run_half_life(args: HalfLifeArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let request = FreshnessRequest {
        skill: args.skill,
        acquired_year: args.acquired_year,
        acquired_date: args.acquired_date,
        trend: Some(args.trend.into()),
        half_life_years: args.half_life_years,
        critical_threshold: args.critical_threshold,
    };
    let report = SkillFreshnessModel::new().evaluate(&request, as_of)?;
    print_lines(half_life_lines(&report, as_of));
    Ok(())
}

pub(crate) fn run_portfolio(args: PortfolioArgs) -> Result<(), AppError> {
    let allocation = PortfolioOptimizer::new().allocate(&PortfolioRequest {
        items: args.items,
        correlation: args.correlation,
        target_risk: args.target_risk,
    })?;
    print_lines(portfolio_lines(&allocation));
    Ok(())
}

pub(crate) fn run_trajectory(args: TrajectoryArgs) -> Result<(), AppError> {
    let request = TrajectoryRequest {
        hours_per_week: args.hours_per_week,
        risk_tolerance: args.risk_tolerance.into(),
        current_salary: args.current_salary,
        target_salary: args.target_salary,
        duration_months_max: args.duration_months_max,
        iterations: args.iterations,
    };
    let mut sampler = ModelSampler::from_seed(args.seed);
    let summary = TrajectorySimulator::new().simulate(&request, &mut sampler)?;
    print_lines(trajectory_lines(&request, &summary));
    Ok(())
}

pub(crate) fn run_cascade(args: CascadeArgs) -> Result<(), AppError> {
    let result = CascadeRiskPropagator::new().propagate(&CascadeRequest {
        occupation_code: args.occupation_code,
        upstream: args.upstream,
    })?;
    print_lines(cascade_lines(&result));
    Ok(())
}

pub(crate) fn run_confidence(
    args: ConfidenceArgs,
    default_iterations: u32,
) -> Result<(), AppError> {
    let request = ConfidenceRequest {
        score: Some(args.score),
        iterations: args.iterations,
    };
    let mut sampler = ModelSampler::from_seed(args.seed);
    let estimator = ConfidenceEstimator::new(default_iterations);
    let response = estimator.evaluate(&request, &mut sampler)?;
    print_lines(confidence_lines(&response));
    Ok(())
}

pub(crate) fn resistance_lines(result: &ResistanceResult) -> Vec<String> {
    let mut lines = vec![
        format!("Automation resistance for \"{}\"", result.task),
        format!(
            "Score {:.2}/10 ({}) | est. {:.1} years until automation",
            result.resistance_score,
            result.category.label(),
            result.timeline_years
        ),
        "Sub-factors".to_string(),
        format!("- complexity: {:.1}", result.subscores.complexity),
        format!("- tacit knowledge: {:.1}", result.subscores.tacit_knowledge),
        format!("- human touch: {:.1}", result.subscores.human_touch),
        format!("- adversarial: {:.1}", result.subscores.adversarial),
    ];
    if result.signals.is_empty() {
        lines.push("Signals: none matched".to_string());
    } else {
        lines.push(format!("Signals: {}", result.signals.join(", ")));
    }
    lines.push(format!("Vocabulary version {}", result.vocabulary_version));
    lines
}

pub(crate) fn half_life_lines(report: &FreshnessReport, as_of: NaiveDate) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Skill freshness for {} (acquired {}, evaluated {})",
            report.skill, report.acquired_year, as_of
        ),
        format!(
            "Half-life {:.2} years ({:?} trend) | decay rate {:.3}/year",
            report.assumptions.half_life_years, report.assumptions.trend, report.decay_lambda
        ),
        format!("Freshness {:.2}%", report.freshness_score),
        format!(
            "Months to 80%: {} from acquisition, {} from now",
            report.months_to_80, report.months_to_80_from_now
        ),
        format!(
            "Months to 60%: {} from acquisition, {} from now",
            report.months_to_60, report.months_to_60_from_now
        ),
    ];
    if report.below_critical {
        lines.push(format!(
            "ALERT: freshness is at or below the {:.1}% critical threshold",
            report.critical_threshold
        ));
    } else {
        lines.push(format!(
            "Critical threshold {:.1}% reached in {} months",
            report.critical_threshold, report.months_to_critical_from_now
        ));
    }
    lines.push(format!(
        "Recommended maintenance: {:.1} hours/month",
        report.recommended_hours_per_month
    ));
    lines
}

pub(crate) fn portfolio_lines(allocation: &PortfolioAllocation) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Portfolio expected return {:.4} | risk {:.4} | diversification {}/100",
            allocation.expected_return, allocation.risk, allocation.diversification_score
        ),
        "Weights".to_string(),
    ];
    for item in &allocation.weights {
        lines.push(format!("- {}: {:.1}%", item.skill, item.weight * 100.0));
    }
    match allocation.within_target_risk {
        Some(true) => lines.push("Within target risk".to_string()),
        Some(false) => lines.push("Exceeds target risk".to_string()),
        None => {}
    }
    lines.extend(allocation.rationale.iter().map(|note| format!("Note: {note}")));
    lines
}

pub(crate) fn trajectory_lines(
    request: &TrajectoryRequest,
    summary: &TrajectorySummary,
) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Career trajectory: {} h/week, {:?} tolerance, {} trials",
            request.hours_per_week, request.risk_tolerance, summary.iterations
        ),
        format!(
            "Success by 12m {:.1}% | 18m {:.1}% | 24m {:.1}% | {}m horizon {:.1}%",
            summary.p_success_12m * 100.0,
            summary.p_success_18m * 100.0,
            summary.p_success_24m * 100.0,
            request.duration_months_max,
            summary.p_success_horizon * 100.0
        ),
        format!(
            "Completion months p50 {} | p90 {}",
            summary.months_p50, summary.months_p90
        ),
    ];
    if let Some(salary) = summary.median_salary_at_completion {
        lines.push(format!("Median salary at completion: {salary:.0}"));
    }
    lines
}

pub(crate) fn cascade_lines(result: &CascadeResult) -> Vec<String> {
    let subject = result.occupation_code.as_deref().unwrap_or("occupation");
    let mut lines = Vec::new();
    match (result.status, result.cascade_score) {
        (CascadeStatus::Scored, Some(score)) => {
            lines.push(format!("Cascade risk for {subject}: {score:.2}/100"));
        }
        (CascadeStatus::InsufficientData, _) => {
            lines.push(format!(
                "Cascade risk for {subject}: insufficient data (no upstream contributors)"
            ));
        }
        _ => {
            lines.push(format!(
                "Cascade risk for {subject}: unavailable (no contributor probabilities)"
            ));
        }
    }
    if let Some(months) = result.timeline_months {
        lines.push(format!("Estimated cascade timeline: {months} months"));
    }
    if !result.top_contributors.is_empty() {
        lines.push("Top contributors".to_string());
        for contributor in &result.top_contributors {
            lines.push(format!(
                "- {} {}: weight {:.3} x probability {:.3}",
                contributor.occupation_code,
                contributor.title,
                contributor.weight,
                contributor.automation_prob
            ));
        }
    }
    if !result.unavailable_contributors.is_empty() {
        lines.push(format!(
            "Missing probabilities: {}",
            result.unavailable_contributors.join(", ")
        ));
    }
    for recommendation in &result.recommendations {
        lines.push(format!("- {recommendation}"));
    }
    lines
}

pub(crate) fn confidence_lines(response: &ConfidenceResponse) -> Vec<String> {
    vec![
        format!("Point score {:.2}", response.score),
        format!(
            "90% interval [{:.2}, {:.2}] from {} samples",
            response.ci.lower, response.ci.upper, response.ci.iterations
        ),
    ]
}
