//! JSON surface over the models: routing, CORS, rate limiting and error
//! envelopes.

pub mod caller;
pub mod cors;
mod handlers;
pub mod rate_limit;

pub use caller::CallerId;
pub use cors::OriginPolicy;
pub use rate_limit::{Endpoint, FixedWindowRateLimiter, RateLimitDecision};

use crate::config::AppConfig;
use crate::error::ApiError;
use crate::models::{
    CalibrationEvaluator, CascadeRiskPropagator, ConfidenceEstimator, ModelSampler,
    PortfolioOptimizer, ResistanceScorer, SkillFreshnessModel, TrajectorySimulator,
};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;

pub const CONFIDENCE_PATH: &str = "/api/v1/confidence-interval";
pub const RESISTANCE_PATH: &str = "/api/v1/automation-resistance";
pub const HALF_LIFE_PATH: &str = "/api/v1/skill-half-life";
pub const PORTFOLIO_PATH: &str = "/api/v1/portfolio";
pub const TRAJECTORY_PATH: &str = "/api/v1/career-trajectory";
pub const CASCADE_PATH: &str = "/api/v1/cascade-risk";
pub const CALIBRATION_PATH: &str = "/api/v1/calibration";

/// Shared, read-mostly state behind every model route.
#[derive(Debug)]
pub struct RiskApiState {
    pub resistance: ResistanceScorer,
    pub freshness: SkillFreshnessModel,
    pub portfolio: PortfolioOptimizer,
    pub trajectory: TrajectorySimulator,
    pub cascade: CascadeRiskPropagator,
    pub confidence: ConfidenceEstimator,
    pub calibration: CalibrationEvaluator,
    pub limiter: FixedWindowRateLimiter,
    pub origins: OriginPolicy,
    api_key: Option<String>,
    sampler_seed: Option<u64>,
}

impl RiskApiState {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            resistance: ResistanceScorer::default(),
            freshness: SkillFreshnessModel::new(),
            portfolio: PortfolioOptimizer::new(),
            trajectory: TrajectorySimulator::new(),
            cascade: CascadeRiskPropagator::new(),
            confidence: ConfidenceEstimator::new(config.models.ci_iterations),
            calibration: CalibrationEvaluator::new(),
            limiter: FixedWindowRateLimiter::new(config.rate_limit.clone()),
            origins: OriginPolicy::from_config(&config.cors),
            api_key: config.auth.api_key.clone(),
            sampler_seed: config.models.sampler_seed,
        }
    }

    /// Fresh sampler per request; seeded runs replay the same sequence.
    pub fn sampler(&self) -> ModelSampler {
        ModelSampler::from_seed(self.sampler_seed)
    }

    pub fn admit(&self, endpoint: Endpoint, caller: &CallerId) -> Result<(), ApiError> {
        match self.limiter.check(endpoint, caller.as_str()) {
            RateLimitDecision::Allowed { .. } => Ok(()),
            RateLimitDecision::Denied { retry_after } => {
                tracing::warn!(
                    endpoint = endpoint.as_str(),
                    caller = caller.as_str(),
                    retry_after_secs = retry_after.as_secs(),
                    "rate limit exceeded"
                );
                Err(ApiError::RateLimited)
            }
        }
    }

    /// Passes when no key is configured or the `x-api-key` header matches it.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(expected) = self.api_key.as_deref() else {
            return Ok(());
        };
        match caller::presented_api_key(headers) {
            Some(presented) if presented == expected => Ok(()),
            _ => {
                tracing::warn!("rejected request with missing or invalid api key");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

pub fn risk_router(state: Arc<RiskApiState>) -> Router {
    let cors = state.origins.layer();
    Router::new()
        .route(CONFIDENCE_PATH, post(handlers::confidence_interval))
        .route(RESISTANCE_PATH, post(handlers::automation_resistance))
        .route(HALF_LIFE_PATH, post(handlers::skill_half_life))
        .route(PORTFOLIO_PATH, post(handlers::portfolio))
        .route(TRAJECTORY_PATH, post(handlers::career_trajectory))
        .route(CASCADE_PATH, post(handlers::cascade_risk))
        .route(CALIBRATION_PATH, post(handlers::calibration))
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(cors)
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "handler panicked");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": ApiError::Internal.message() })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, RateLimitConfig};

    fn config_with_key(key: Option<&str>) -> AppConfig {
        let mut config = AppConfig::from_lookup(|_| None).expect("defaults load");
        config.auth = AuthConfig {
            api_key: key.map(str::to_string),
        };
        config
    }

    #[test]
    fn authorize_is_open_without_configured_key() {
        let state = RiskApiState::from_config(&config_with_key(None));
        assert!(state.authorize(&HeaderMap::new()).is_ok());
    }

    #[test]
    fn authorize_requires_matching_header() {
        let state = RiskApiState::from_config(&config_with_key(Some("s3cret")));
        let mut headers = HeaderMap::new();
        assert!(matches!(
            state.authorize(&headers),
            Err(ApiError::Unauthorized)
        ));
        headers.insert(caller::API_KEY_HEADER, "wrong".parse().expect("header"));
        assert!(state.authorize(&headers).is_err());
        headers.insert(caller::API_KEY_HEADER, "s3cret".parse().expect("header"));
        assert!(state.authorize(&headers).is_ok());
    }

    #[test]
    fn admit_maps_denial_to_rate_limited() {
        let mut config = config_with_key(None);
        config.rate_limit = RateLimitConfig {
            cascade: 1,
            ..RateLimitConfig::default()
        };
        let state = RiskApiState::from_config(&config);
        let caller = CallerId("198.51.100.3".to_string());
        assert!(state.admit(Endpoint::Cascade, &caller).is_ok());
        assert!(matches!(
            state.admit(Endpoint::Cascade, &caller),
            Err(ApiError::RateLimited)
        ));
    }

    #[test]
    fn panic_response_is_generic_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
