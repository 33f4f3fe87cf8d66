//! Exponential half-life model for how quickly a skill loses market relevance.

use super::stats::round_to;
use crate::error::ValidationError;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

pub const DEFAULT_HALF_LIFE_YEARS: f64 = 3.0;
pub const MIN_HALF_LIFE_YEARS: f64 = 0.5;
pub const MAX_HALF_LIFE_YEARS: f64 = 12.0;
pub const DEFAULT_CRITICAL_THRESHOLD: f64 = 80.0;
pub const EARLIEST_ACQUIRED_YEAR: i32 = 1970;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillTrend {
    Growing,
    #[default]
    Stable,
    Declining,
}

impl SkillTrend {
    fn half_life_adjustment(&self) -> f64 {
        match self {
            SkillTrend::Growing => 1.0,
            SkillTrend::Stable => 0.0,
            SkillTrend::Declining => -0.5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FreshnessRequest {
    pub skill: String,
    #[serde(default)]
    pub acquired_year: Option<i32>,
    #[serde(default)]
    pub acquired_date: Option<String>,
    #[serde(default)]
    pub trend: Option<SkillTrend>,
    #[serde(default)]
    pub half_life_years: Option<f64>,
    #[serde(default)]
    pub critical_threshold: Option<f64>,
}

/// Validated skill description with its derived decay constant.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillProfile {
    pub skill: String,
    pub acquired_year: i32,
    pub acquired_month: u32,
    pub half_life_years: f64,
    pub trend: SkillTrend,
}

impl SkillProfile {
    pub fn decay_lambda(&self) -> f64 {
        std::f64::consts::LN_2 / self.half_life_years
    }

    /// Fractional years from the acquisition month to the month of `as_of`,
    /// floored at zero.
    pub fn years_elapsed(&self, as_of: NaiveDate) -> f64 {
        let now = as_of.year() as f64 + as_of.month() as f64 / 12.0;
        let acquired = self.acquired_year as f64 + self.acquired_month as f64 / 12.0;
        (now - acquired).max(0.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreshnessAssumptions {
    pub half_life_years: f64,
    pub trend: SkillTrend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FreshnessReport {
    pub skill: String,
    pub acquired_year: i32,
    pub assumptions: FreshnessAssumptions,
    pub decay_lambda: f64,
    pub freshness_score: f64,
    pub remaining_percent: f64,
    pub months_to_80: u32,
    pub months_to_60: u32,
    pub months_to_80_from_now: u32,
    pub months_to_60_from_now: u32,
    pub critical_threshold: f64,
    pub months_to_critical_from_now: u32,
    pub below_critical: bool,
    pub recommended_hours_per_month: f64,
    pub notes: Vec<&'static str>,
}

/// Percentage of relevance left after `years` with the given half-life.
pub fn freshness_percent(half_life_years: f64, years: f64) -> f64 {
    let lambda = std::f64::consts::LN_2 / half_life_years;
    100.0 * (-lambda * years.max(0.0)).exp()
}

/// Months for a brand-new skill to decay to `threshold_pct`.
pub fn months_from_zero(lambda: f64, threshold_pct: f64) -> f64 {
    let fraction = (threshold_pct / 100.0).clamp(0.0001, 0.9999);
    -fraction.ln() / lambda * 12.0
}

/// Months from the current freshness until `threshold_pct` is reached;
/// zero once already at or below it.
pub fn months_until(lambda: f64, current_pct: f64, threshold_pct: f64) -> u32 {
    if current_pct <= threshold_pct || current_pct <= 0.0 {
        return 0;
    }
    let years = (threshold_pct / current_pct).ln() / -lambda;
    (years * 12.0).round().max(0.0) as u32
}

/// Monthly refresh effort: faster-decaying skills need more hours.
pub fn maintenance_hours(half_life_years: f64) -> f64 {
    (20.0 / half_life_years).clamp(1.0, 12.0)
}

#[derive(Debug, Clone, Default)]
pub struct SkillFreshnessModel;

impl SkillFreshnessModel {
    pub fn new() -> Self {
        Self
    }

    pub fn profile(
        &self,
        request: &FreshnessRequest,
        as_of: NaiveDate,
    ) -> Result<SkillProfile, ValidationError> {
        if request.skill.trim().is_empty() {
            return Err(ValidationError::TooShort {
                field: "skill",
                min: 1,
            });
        }

        let current_year = as_of.year();
        let acquired = (request.acquired_year, request.acquired_date.as_deref());
        let (acquired_year, acquired_month) = match acquired {
            (Some(year), _) => (year, 1),
            (None, Some(raw)) => parse_acquired_date(raw)?,
            (None, None) => (current_year, 1),
        };

        ValidationError::check_range(
            "acquired_year",
            acquired_year as f64,
            EARLIEST_ACQUIRED_YEAR as f64,
            current_year as f64,
        )?;
        if acquired_year == current_year && acquired_month > as_of.month() {
            return Err(ValidationError::OutOfRange {
                field: "acquired_date",
                min: 1.0,
                max: as_of.month() as f64,
                found: acquired_month as f64,
            });
        }

        let trend = request.trend.unwrap_or_default();
        let half_life_years = match request.half_life_years {
            Some(explicit) => ValidationError::check_range(
                "half_life_years",
                explicit,
                MIN_HALF_LIFE_YEARS,
                MAX_HALF_LIFE_YEARS,
            )?,
            None => (DEFAULT_HALF_LIFE_YEARS + trend.half_life_adjustment())
                .clamp(MIN_HALF_LIFE_YEARS, MAX_HALF_LIFE_YEARS),
        };

        Ok(SkillProfile {
            skill: request.skill.clone(),
            acquired_year,
            acquired_month,
            half_life_years,
            trend,
        })
    }

    pub fn evaluate(
        &self,
        request: &FreshnessRequest,
        as_of: NaiveDate,
    ) -> Result<FreshnessReport, ValidationError> {
        let critical_threshold = match request.critical_threshold {
            Some(value) => ValidationError::check_range("critical_threshold", value, 1.0, 99.9)?,
            None => DEFAULT_CRITICAL_THRESHOLD,
        };
        let profile = self.profile(request, as_of)?;
        Ok(self.report(&profile, critical_threshold, as_of))
    }

    pub fn report(
        &self,
        profile: &SkillProfile,
        critical_threshold: f64,
        as_of: NaiveDate,
    ) -> FreshnessReport {
        let lambda = profile.decay_lambda();
        let elapsed = profile.years_elapsed(as_of);
        let freshness = round_to(freshness_percent(profile.half_life_years, elapsed), 2);

        FreshnessReport {
            skill: profile.skill.clone(),
            acquired_year: profile.acquired_year,
            assumptions: FreshnessAssumptions {
                half_life_years: round_to(profile.half_life_years, 2),
                trend: profile.trend,
            },
            decay_lambda: round_to(lambda, 3),
            freshness_score: freshness,
            remaining_percent: freshness,
            months_to_80: months_from_zero(lambda, 80.0).round() as u32,
            months_to_60: months_from_zero(lambda, 60.0).round() as u32,
            months_to_80_from_now: months_until(lambda, freshness, 80.0),
            months_to_60_from_now: months_until(lambda, freshness, 60.0),
            critical_threshold,
            months_to_critical_from_now: months_until(lambda, freshness, critical_threshold),
            below_critical: freshness <= critical_threshold,
            recommended_hours_per_month: round_to(maintenance_hours(profile.half_life_years), 1),
            notes: vec![
                "Exponential half-life model with bounded priors",
                "Trend-adjusted half-life; consider updating with market signals",
                "Includes maintenance hours and critical threshold alert",
            ],
        }
    }
}

/// Reads `YYYY` or `YYYY-MM...` into a year and month (January when absent).
fn parse_acquired_date(raw: &str) -> Result<(i32, u32), ValidationError> {
    let raw = raw.trim();
    let invalid = ValidationError::Unparseable {
        field: "acquired_date",
    };

    let year_digits = raw.get(..4).ok_or(invalid.clone())?;
    if !year_digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid);
    }
    let year: i32 = year_digits.parse().map_err(|_| invalid.clone())?;

    let rest = &raw[4..];
    let month = match rest.strip_prefix('-') {
        Some(tail) => {
            let digits: String = tail.chars().take_while(|c| c.is_ascii_digit()).collect();
            match digits.parse::<u32>() {
                Ok(month) if (1..=12).contains(&month) => month,
                _ => return Err(invalid),
            }
        }
        None if rest.is_empty() || rest.starts_with('T') => 1,
        None => return Err(invalid),
    };

    Ok((year, month))
}
