//! API route definitions.

use axum::http::{HeaderValue, Method, header, request::Parts};
use axum::{
    Router,
    routing::{get, post, put},
};
use once_cell::sync::Lazy;
use regex::Regex;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;

use super::handlers;
use super::state::{AppState, CorsSettings};

/// Origins accepted in dev mode when none are configured: scheme plus a
/// local host (localhost, 127.0.0.1 or 192.168.x.y) and an optional port.
static DEV_ORIGIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://(localhost|127\.0\.0\.1|192\.168\.\d{1,3}\.\d{1,3})(:\d+)?$")
        .expect("Invalid regex pattern for dev origins")
});

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = build_cors_layer(&state.cors);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let user_routes = Router::new()
        .route("/register", post(handlers::register))
        .route("/me", get(handlers::me));

    let personal_details_routes = Router::new()
        .route("/", post(handlers::save_personal_details))
        .route("/me", get(handlers::my_personal_details))
        .route("/all", get(handlers::all_personal_details));

    let admin_routes = Router::new()
        .route("/users", get(handlers::list_users))
        .route("/users/{id}/role", put(handlers::update_user_role))
        .route("/edit-user", post(handlers::edit_user))
        .route("/personal-details", get(handlers::list_personal_details));

    let announcement_routes = Router::new()
        .route(
            "/",
            get(handlers::list_announcements).post(handlers::create_announcement),
        )
        .route(
            "/{id}",
            put(handlers::update_announcement).delete(handlers::delete_announcement),
        );

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/check-role", get(handlers::check_role))
        .nest("/api/users", user_routes)
        .nest("/api/personal-details", personal_details_routes)
        .nest("/api/admin", admin_routes)
        .nest("/api/announcements", announcement_routes)
        .with_state(state)
        .layer(trace_layer)
        .layer(cors)
}

/// Whether a cross-origin request from `origin` is allowed.
///
/// A configured entry admits the origin equal to it and every origin that
/// starts with it, so `https://app.example.org` also admits
/// `https://app.example.org.preview.host` and
/// `https://app.example.org.evil.com`. Configure entries with that in mind;
/// an entry ending in a port (`https://app.example.org:443`) narrows the
/// match. The dev-mode fallback is anchored and only admits local hosts.
pub fn origin_allowed(origin: &str, settings: &CorsSettings) -> bool {
    if settings.allowed_origins.is_empty() {
        settings.dev_mode && DEV_ORIGIN.is_match(origin)
    } else {
        settings
            .allowed_origins
            .iter()
            .any(|allowed| origin == allowed || origin.starts_with(allowed.as_str()))
    }
}

fn build_cors_layer(settings: &CorsSettings) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let headers = [header::CONTENT_TYPE, header::AUTHORIZATION];

    if settings.allowed_origins.is_empty() {
        if settings.dev_mode {
            tracing::warn!("CORS: No origins configured in dev mode, allowing local origins");
        } else {
            tracing::warn!(
                "CORS: No origins configured in production mode, denying all cross-origin requests"
            );
        }
    } else {
        tracing::info!(
            "CORS: Allowing {} origin prefix(es)",
            settings.allowed_origins.len()
        );
    }

    let settings = settings.clone();
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin
                    .to_str()
                    .map(|origin| origin_allowed(origin, &settings))
                    .unwrap_or(false)
            },
        ))
        .allow_methods(methods)
        .allow_headers(headers)
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(origins: &[&str], dev_mode: bool) -> CorsSettings {
        CorsSettings {
            allowed_origins: origins.iter().map(|o| o.to_string()).collect(),
            dev_mode,
        }
    }

    #[test]
    fn test_configured_origins_match_exactly_or_by_prefix() {
        let s = settings(&["https://srn.example.org"], false);
        assert!(origin_allowed("https://srn.example.org", &s));
        assert!(origin_allowed("https://srn.example.org.preview.app", &s));
        assert!(origin_allowed("https://srn.example.org.evil.com", &s));
        assert!(!origin_allowed("https://evil.example.com", &s));
        assert!(!origin_allowed("http://localhost:3000", &s));
    }

    #[test]
    fn test_dev_mode_allows_local_origins() {
        let s = settings(&[], true);
        assert!(origin_allowed("http://localhost:5173", &s));
        assert!(origin_allowed("http://127.0.0.1:3000", &s));
        assert!(origin_allowed("http://192.168.1.20:3000", &s));
        assert!(!origin_allowed("https://example.com", &s));
        assert!(!origin_allowed("http://localhost.evil.com", &s));
        assert!(!origin_allowed("https://evil.com/?localhost", &s));
        assert!(!origin_allowed("http://192.168.evil.com", &s));
    }

    #[test]
    fn test_production_without_origins_denies() {
        let s = settings(&[], false);
        assert!(!origin_allowed("http://localhost:5173", &s));
    }
}
