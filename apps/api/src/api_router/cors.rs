use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use engeserv_core::AppError;
use tower_http::cors::CorsLayer;

/// Credentialed CORS for the dashboard origin only.
pub(super) fn build_cors_layer(allowed_origin: &str) -> Result<CorsLayer, AppError> {
    Ok(CorsLayer::new()
        .allow_origin(
            HeaderValue::from_str(allowed_origin)
                .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}
