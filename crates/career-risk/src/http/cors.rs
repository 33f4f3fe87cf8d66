use crate::config::CorsConfig;
use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

pub const ALLOWED_HEADERS: [&str; 5] = [
    "authorization",
    "x-client-info",
    "apikey",
    "x-api-key",
    "content-type",
];

const LOCAL_DEV_PREFIXES: [&str; 4] = [
    "http://localhost:",
    "http://127.0.0.1:",
    "https://localhost:",
    "https://127.0.0.1:",
];

/// Decides which browser origins may read responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OriginPolicy {
    allowed: Option<Vec<String>>,
}

impl OriginPolicy {
    pub fn from_config(config: &CorsConfig) -> Self {
        Self {
            allowed: config
                .allowed_origins
                .as_ref()
                .map(|origins| origins.iter().map(|origin| normalize(origin)).collect()),
        }
    }

    pub fn permits(&self, origin: &str) -> bool {
        let Some(allowed) = &self.allowed else {
            return true;
        };
        if origin.is_empty() {
            return false;
        }
        if LOCAL_DEV_PREFIXES
            .iter()
            .any(|prefix| origin.starts_with(prefix))
        {
            return true;
        }
        let origin = normalize(origin);
        allowed.iter().any(|candidate| *candidate == origin)
    }

    pub fn layer(&self) -> CorsLayer {
        let allow_origin = match &self.allowed {
            None => AllowOrigin::any(),
            Some(_) => {
                let policy = self.clone();
                AllowOrigin::predicate(move |origin: &HeaderValue, _| {
                    origin
                        .to_str()
                        .map(|origin| policy.permits(origin))
                        .unwrap_or(false)
                })
            }
        };

        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods([Method::POST, Method::OPTIONS])
            .allow_headers(allowed_headers())
    }
}

fn allowed_headers() -> Vec<HeaderName> {
    ALLOWED_HEADERS
        .iter()
        .copied()
        .map(HeaderName::from_static)
        .collect()
}

fn normalize(origin: &str) -> String {
    origin.trim().trim_end_matches('/').to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listed(origins: &[&str]) -> OriginPolicy {
        OriginPolicy::from_config(&CorsConfig {
            allowed_origins: Some(origins.iter().map(|origin| origin.to_string()).collect()),
        })
    }

    #[test]
    fn wildcard_permits_everything() {
        let policy = OriginPolicy::from_config(&CorsConfig::default());
        assert!(policy.permits("https://anywhere.example"));
        assert!(policy.permits(""));
    }

    #[test]
    fn listed_origins_match_after_normalisation() {
        let policy = listed(&["https://App.Example.com/"]);
        assert!(policy.permits("https://app.example.com"));
        assert!(policy.permits("https://APP.example.com/"));
        assert!(!policy.permits("https://evil.example.com"));
        assert!(!policy.permits(""));
    }

    #[test]
    fn localhost_is_always_permitted() {
        let policy = listed(&["https://app.example.com"]);
        assert!(policy.permits("http://localhost:5173"));
        assert!(policy.permits("https://127.0.0.1:8443"));
        assert!(!policy.permits("http://localhost.evil.example"));
    }
}
