use super::{CallerId, Endpoint, RiskApiState};
use crate::error::ApiError;
use crate::models::{
    CalibrationReport, CalibrationRequest, CascadeRequest, CascadeResult, ConfidenceRequest,
    ConfidenceResponse, FreshnessReport, FreshnessRequest, PortfolioAllocation, PortfolioRequest,
    ResistanceRequest, ResistanceResult, TrajectoryRequest, TrajectorySummary,
};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use chrono::Local;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::debug;

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Bodies are read as raw bytes so the rate limit is settled before any
/// parsing happens.
fn parse_body<T: DeserializeOwned>(endpoint: Endpoint, body: &Bytes) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        debug!(endpoint = endpoint.as_str(), error = %err, "rejected request body");
        ApiError::InvalidRequest
    })
}

pub(crate) async fn confidence_interval(
    State(state): State<Arc<RiskApiState>>,
    caller: CallerId,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<ConfidenceResponse> {
    state.admit(Endpoint::Confidence, &caller)?;
    state.authorize(&headers)?;
    let request: ConfidenceRequest = parse_body(Endpoint::Confidence, &body)?;

    let mut sampler = state.sampler();
    let response = state.confidence.evaluate(&request, &mut sampler)?;
    debug!(
        score = response.score,
        lower = response.ci.lower,
        upper = response.ci.upper,
        iterations = response.ci.iterations,
        "confidence interval computed"
    );
    Ok(Json(response))
}

pub(crate) async fn automation_resistance(
    State(state): State<Arc<RiskApiState>>,
    caller: CallerId,
    body: Bytes,
) -> ApiResult<ResistanceResult> {
    state.admit(Endpoint::Resistance, &caller)?;
    let request: ResistanceRequest = parse_body(Endpoint::Resistance, &body)?;

    let result = state.resistance.score(&request)?;
    debug!(
        score = result.resistance_score,
        category = result.category.label(),
        signals = result.signals.len(),
        "automation resistance scored"
    );
    Ok(Json(result))
}

pub(crate) async fn skill_half_life(
    State(state): State<Arc<RiskApiState>>,
    caller: CallerId,
    body: Bytes,
) -> ApiResult<FreshnessReport> {
    state.admit(Endpoint::Freshness, &caller)?;
    let request: FreshnessRequest = parse_body(Endpoint::Freshness, &body)?;

    let report = state
        .freshness
        .evaluate(&request, Local::now().date_naive())?;
    debug!(
        half_life_years = report.assumptions.half_life_years,
        freshness = report.freshness_score,
        below_critical = report.below_critical,
        "skill freshness evaluated"
    );
    Ok(Json(report))
}

pub(crate) async fn portfolio(
    State(state): State<Arc<RiskApiState>>,
    caller: CallerId,
    body: Bytes,
) -> ApiResult<PortfolioAllocation> {
    state.admit(Endpoint::Portfolio, &caller)?;
    let request: PortfolioRequest = parse_body(Endpoint::Portfolio, &body)?;

    let allocation = state.portfolio.allocate(&request)?;
    debug!(
        items = allocation.weights.len(),
        expected_return = allocation.expected_return,
        risk = allocation.risk,
        "portfolio allocated"
    );
    Ok(Json(allocation))
}

pub(crate) async fn career_trajectory(
    State(state): State<Arc<RiskApiState>>,
    caller: CallerId,
    body: Bytes,
) -> ApiResult<TrajectorySummary> {
    state.admit(Endpoint::Trajectory, &caller)?;
    let request: TrajectoryRequest = parse_body(Endpoint::Trajectory, &body)?;

    let mut sampler = state.sampler();
    let summary = state.trajectory.simulate(&request, &mut sampler)?;
    debug!(
        iterations = summary.iterations,
        p_success_horizon = summary.p_success_horizon,
        months_p50 = summary.months_p50,
        "career trajectory simulated"
    );
    Ok(Json(summary))
}

pub(crate) async fn cascade_risk(
    State(state): State<Arc<RiskApiState>>,
    caller: CallerId,
    body: Bytes,
) -> ApiResult<CascadeResult> {
    state.admit(Endpoint::Cascade, &caller)?;
    let request: CascadeRequest = parse_body(Endpoint::Cascade, &body)?;

    let result = state.cascade.propagate(&request)?;
    debug!(
        status = ?result.status,
        score = ?result.cascade_score,
        unavailable = result.unavailable_contributors.len(),
        "cascade risk propagated"
    );
    Ok(Json(result))
}

pub(crate) async fn calibration(
    State(state): State<Arc<RiskApiState>>,
    caller: CallerId,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<CalibrationReport> {
    state.admit(Endpoint::Calibration, &caller)?;
    state.authorize(&headers)?;
    let request: CalibrationRequest = parse_body(Endpoint::Calibration, &body)?;

    let report = state.calibration.evaluate(&request)?;
    debug!(
        pairs = report.pairs_count,
        ece = ?report.ece,
        "calibration evaluated"
    );
    Ok(Json(report))
}
