use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

pub const FORWARDED_FOR: &str = "x-forwarded-for";
pub const API_KEY_HEADER: &str = "x-api-key";

/// Rate-limit identity of the caller: first forwarded address, else the
/// socket peer, else `unknown`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerId(pub String);

impl CallerId {
    pub fn resolve(headers: &HeaderMap, peer: Option<IpAddr>) -> Self {
        let forwarded = headers
            .get(FORWARDED_FOR)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(',').next())
            .map(str::trim)
            .filter(|value| !value.is_empty());

        match (forwarded, peer) {
            (Some(forwarded), _) => Self(forwarded.to_string()),
            (None, Some(peer)) => Self(peer.to_string()),
            (None, None) => Self("unknown".to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CallerId
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());
        Ok(Self::resolve(&parts.headers, peer))
    }
}

/// Header-supplied API key, if any.
pub fn presented_api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn first_forwarded_entry_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(
            FORWARDED_FOR,
            HeaderValue::from_static("203.0.113.7, 10.0.0.2"),
        );
        let caller = CallerId::resolve(&headers, Some(IpAddr::from([10, 0, 0, 9])));
        assert_eq!(caller.as_str(), "203.0.113.7");
    }

    #[test]
    fn falls_back_to_peer_then_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(
            CallerId::resolve(&headers, Some(IpAddr::from([192, 168, 1, 4]))).as_str(),
            "192.168.1.4"
        );
        assert_eq!(CallerId::resolve(&headers, None).as_str(), "unknown");
    }

    #[test]
    fn blank_forwarded_header_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(FORWARDED_FOR, HeaderValue::from_static(" , 10.0.0.2"));
        assert_eq!(CallerId::resolve(&headers, None).as_str(), "unknown");
    }
}
