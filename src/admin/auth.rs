use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request},
    middleware::Next,
    response::Response,
};

use crate::http::response::ApiError;
use crate::http::server::AppState;

/// Admin role check: the request must carry `Bearer <admin.api_key>`.
///
/// Both the switch and the key are read from the live policy state, so a
/// reload can turn the admin API on or off and rotate the key. While it is
/// off the routes answer 404.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let policy = state.policy();
    if !policy.config.admin.enabled {
        return Err(ApiError::NotFound);
    }

    let expected = format!("Bearer {}", policy.config.admin.api_key);

    let authorized = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .is_some_and(|value| value == expected);

    if authorized {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "Rejected admin request");
        Err(ApiError::Unauthorized)
    }
}
