use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use beacon_core::{Error, Result};

/// Shared secret guarding the log and metrics maintenance routes.
///
/// Requests present it as `Authorization: Bearer <token>`. Without a
/// configured token every guarded request is rejected.
#[derive(Clone, Default)]
pub struct AdminToken(Option<Arc<str>>);

impl AdminToken {
    /// Creates a token; `None` or a blank value leaves it unconfigured.
    pub fn new(token: Option<&str>) -> Self {
        let token = token.map(str::trim).filter(|token| !token.is_empty());
        Self(token.map(Arc::from))
    }

    /// Returns `true` if a token is configured.
    pub fn is_configured(&self) -> bool {
        self.0.is_some()
    }

    /// Checks the bearer credential carried by `headers`.
    pub fn verify(&self, headers: &HeaderMap) -> Result<()> {
        let Some(expected) = self.0.as_deref() else {
            return Err(Error::authentication("Admin routes are disabled"));
        };

        let provided = headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim);

        match provided {
            Some(token) if constant_time_eq(token.as_bytes(), expected.as_bytes()) => Ok(()),
            Some(_) => Err(Error::authentication("Invalid admin token")),
            None => Err(Error::authentication("Missing admin token")),
        }
    }
}

impl fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AdminToken")
            .field(&self.0.as_ref().map(|_| "***"))
            .finish()
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
