use career_risk::models::{CascadeContributor, PortfolioItem};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

fn parse_number(raw: &str, field: &str) -> Result<f64, String> {
    raw.trim()
        .parse::<f64>()
        .map_err(|err| format!("{field} '{raw}' is not a number ({err})"))
}

/// `skill:expected_return:risk`; the skill itself may not contain `:`.
pub(crate) fn parse_portfolio_item(raw: &str) -> Result<PortfolioItem, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let [skill, expected_return, risk] = parts.as_slice() else {
        return Err(format!(
            "expected skill:expected_return:risk, got '{raw}'"
        ));
    };
    Ok(PortfolioItem {
        skill: skill.trim().to_string(),
        expected_return: parse_number(expected_return, "expected_return")?,
        risk: parse_number(risk, "risk")?,
    })
}

/// `code:title:weight[:probability]`; a missing probability marks a failed
/// lookup.
pub(crate) fn parse_contributor(raw: &str) -> Result<CascadeContributor, String> {
    let parts: Vec<&str> = raw.split(':').collect();
    let (code, title, weight, probability) = match parts.as_slice() {
        [code, title, weight] => (code, title, weight, None),
        [code, title, weight, probability] => (code, title, weight, Some(probability)),
        _ => {
            return Err(format!(
                "expected code:title:weight[:probability], got '{raw}'"
            ))
        }
    };
    Ok(CascadeContributor {
        occupation_code: code.trim().to_string(),
        title: title.trim().to_string(),
        weight: Some(parse_number(weight, "weight")?),
        similarity: None,
        automation_prob: probability
            .map(|probability| parse_number(probability, "probability"))
            .transpose()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_portfolio_items() {
        let item = parse_portfolio_item("data engineering:0.12:0.25").expect("valid item");
        assert_eq!(item.skill, "data engineering");
        assert_eq!(item.expected_return, 0.12);
        assert_eq!(item.risk, 0.25);
        assert!(parse_portfolio_item("rust:0.1").is_err());
        assert!(parse_portfolio_item("rust:high:0.1").is_err());
    }

    #[test]
    fn parses_contributors_with_optional_probability() {
        let scored = parse_contributor("43-9061:Office Clerks:0.8:0.65").expect("valid");
        assert_eq!(scored.automation_prob, Some(0.65));
        let missing = parse_contributor("43-4051:Customer Service:0.4").expect("valid");
        assert_eq!(missing.automation_prob, None);
        assert!(parse_contributor("43-4051").is_err());
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("2026-02-30").is_err());
        assert_eq!(
            parse_date(" 2026-02-28 "),
            Ok(NaiveDate::from_ymd_opt(2026, 2, 28).expect("valid date"))
        );
    }
}
