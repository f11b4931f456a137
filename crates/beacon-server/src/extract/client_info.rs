//! Caller metadata taken from request headers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::USER_AGENT;
use axum::http::request::Parts;
use axum::http::{HeaderMap, Method, Uri};

/// Address reported when no forwarding header names the caller.
pub const UNKNOWN_IP: &str = "unknown";

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Method, URI, user agent and address of the caller.
///
/// The address is the first `x-forwarded-for` entry, then `x-real-ip`, and
/// [`UNKNOWN_IP`] otherwise. Extraction never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub method: Method,
    pub uri: Uri,
    pub user_agent: Option<String>,
    pub ip: String,
}

impl ClientInfo {
    /// Resolves the caller address from forwarding headers.
    pub fn resolve_ip(headers: &HeaderMap) -> String {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        header(X_FORWARDED_FOR)
            .and_then(|list| list.split(',').next())
            .map(str::trim)
            .filter(|first| !first.is_empty())
            .or_else(|| header(X_REAL_IP))
            .unwrap_or(UNKNOWN_IP)
            .to_owned()
    }
}

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        Ok(Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            user_agent,
            ip: Self::resolve_ip(&parts.headers),
        })
    }
}
