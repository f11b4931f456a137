//! Bearer token guard for maintenance routes.

use axum::Router;
use axum::extract::{Request, State};
use axum::middleware::{Next, from_fn_with_state};
use axum::response::Response;
use beacon_core::Environment;

use super::TRACING_TARGET_ADMIN;
use crate::handler::{Error, Result};
use crate::service::{AdminToken, ServiceState};

/// Rejects requests without the configured admin bearer token.
///
/// Responds with 401 when the token is missing, wrong or not configured.
pub async fn require_admin_token(
    State(admin_token): State<AdminToken>,
    State(environment): State<Environment>,
    request: Request,
    next: Next,
) -> Result<Response> {
    if let Err(error) = admin_token.verify(request.headers()) {
        tracing::warn!(
            target: TRACING_TARGET_ADMIN,
            method = %request.method(),
            path = %request.uri().path(),
            reason = error.message(),
            "Admin request rejected"
        );
        return Err(Error::from_app_error(&error, environment));
    }

    Ok(next.run(request).await)
}

/// Extension trait for `axum::`[`Router`] to guard maintenance routes.
pub trait RouterAdminExt<S> {
    /// Layers [`require_admin_token`] over every route added so far.
    ///
    /// Unmatched requests still fall through to the not-found handler.
    fn with_admin_authentication(self, state: ServiceState) -> Self;
}

impl<S> RouterAdminExt<S> for Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn with_admin_authentication(self, state: ServiceState) -> Self {
        self.route_layer(from_fn_with_state(state, require_admin_token))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::routing::get;
    use serde_json::Value;

    use super::*;
    use crate::handler::test::{admin_bearer, create_test_server_with_state, create_test_state};

    fn guarded(state: ServiceState) -> Router<ServiceState> {
        Router::new()
            .route("/maintenance", get(|| async { "done" }))
            .with_admin_authentication(state)
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let server = create_test_server_with_state(guarded(state.clone()), state)?;

        let response = server.get("/maintenance").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body = response.json::<Value>();
        assert_eq!(body["success"], false);
        assert_eq!(body["error"]["code"], "AUTHENTICATION_ERROR");
        assert_eq!(body["error"]["message"], "Missing admin token");
        Ok(())
    }

    #[tokio::test]
    async fn wrong_token_is_unauthorized() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let server = create_test_server_with_state(guarded(state.clone()), state)?;

        server
            .get("/maintenance")
            .add_header("authorization", "Bearer not-the-token")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        Ok(())
    }

    #[tokio::test]
    async fn matching_token_passes() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let state = create_test_state(dir.path())?;
        let server = create_test_server_with_state(guarded(state.clone()), state)?;

        let response = server
            .get("/maintenance")
            .add_header("authorization", admin_bearer())
            .await;
        response.assert_status_ok();
        response.assert_text("done");
        Ok(())
    }
}
