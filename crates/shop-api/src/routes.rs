//! # Routes
//!
//! Axum router configuration for the storefront API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing::warn;

/// CORS for the single storefront origin, with cookies allowed
pub fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = match HeaderValue::from_str(origin) {
        Ok(value) => AllowOrigin::exact(value),
        Err(_) => {
            warn!("Ignoring invalid CORS origin {:?}", origin);
            AllowOrigin::list(Vec::<HeaderValue>::new())
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static("sec-ch-ua"),
            HeaderName::from_static("sec-ch-ua-mobile"),
            HeaderName::from_static("sec-ch-ua-platform"),
            header::USER_AGENT,
            header::REFERER,
            HeaderName::from_static("stripe-signature"),
        ])
        .allow_credentials(true)
}

/// Create the main application router
///
/// Routes:
/// - GET  / - Plain-text greeting
/// - GET  /health - Health check
/// - POST /create-checkout-session - Stripe checkout for one product
/// - POST /send-purchase - Purchase confirmation mails
/// - POST /send-reservation - Reservation confirmation mails
/// - POST /send-email - Contact form
/// - POST /webhook - Stripe webhook
/// - GET  /api/data - Rows of the backing table
/// - anything else - files under `STATIC_DIR`, when configured
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    let mut router = Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route(
            "/create-checkout-session",
            post(handlers::create_checkout_session),
        )
        .route("/send-purchase", post(handlers::send_purchase))
        .route("/send-reservation", post(handlers::send_reservation))
        .route("/send-email", post(handlers::send_email))
        .route("/webhook", post(handlers::webhook))
        .route("/api/data", get(handlers::api_data));

    if let Some(dir) = &state.config.static_dir {
        router = router.fallback_service(ServeDir::new(dir));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::*, Request, StatusCode};
    use tower::ServiceExt;

    const ORIGIN_URL: &str = "https://salone-new-flower.vercel.app";

    fn preflight(origin: &str) -> Request<Body> {
        Request::builder()
            .method(Method::OPTIONS)
            .uri("/send-email")
            .header(ORIGIN, origin)
            .header(ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .header(ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
            .body(Body::empty())
            .unwrap()
    }

    fn app() -> Router {
        Router::new()
            .route("/send-email", post(|| async { "ok" }))
            .layer(cors_layer(ORIGIN_URL))
    }

    #[tokio::test]
    async fn test_preflight_from_storefront() {
        let response = app().oneshot(preflight(ORIGIN_URL)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], ORIGIN_URL);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
        assert!(headers[ACCESS_CONTROL_ALLOW_METHODS]
            .to_str()
            .unwrap()
            .contains("POST"));
    }

    #[tokio::test]
    async fn test_preflight_from_other_origin() {
        let response = app()
            .oneshot(preflight("https://evil.example.com"))
            .await
            .unwrap();

        assert!(response.headers().get(ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
