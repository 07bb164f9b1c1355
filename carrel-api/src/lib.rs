use axum::{
    extract::State,
    http::Method,
    response::IntoResponse,
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod admin;
pub mod attendance;
pub mod auth;
pub mod bookings;
pub mod error;
pub mod financial;
pub mod middleware;
pub mod operations;
pub mod reports;
pub mod seats;
pub mod state;
pub mod students;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    // CORS Middleware
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::USER_AGENT,
        ]);

    Router::new()
        .merge(auth::routes())
        .merge(seats::routes(state.clone()))
        .merge(bookings::routes(state.clone()))
        .merge(students::routes(state.clone()))
        .merge(attendance::routes(state.clone()))
        .merge(financial::routes(state.clone()))
        .merge(operations::routes(state.clone()))
        .merge(reports::routes(state.clone()))
        .merge(admin::routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(state.clone(), maintenance_middleware))
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .with_state(state)
}

async fn rate_limit_middleware(
    State(state): State<AppState>,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<SocketAddr>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let ip = addr.ip().to_string();
    let key = format!("ratelimit:{}", ip);

    match state
        .redis
        .check_rate_limit(&key, state.rate_limit.max_requests, state.rate_limit.window_seconds)
        .await
    {
        Ok(true) => Ok(next.run(req).await),
        Ok(false) => Err((axum::http::StatusCode::TOO_MANY_REQUESTS, "Rate limit exceeded")),
        Err(_) => Ok(next.run(req).await), // Fail open
    }
}

/// While maintenance mode is on, everything except auth and the admin
/// surface answers 503 with the configured message.
async fn maintenance_middleware(
    State(state): State<AppState>,
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> Result<impl IntoResponse, impl IntoResponse> {
    let path = req.uri().path();
    if path.starts_with("/v1/auth") || path.starts_with("/v1/admin") {
        return Ok(next.run(req).await);
    }

    let (maintenance_mode, message) = {
        let settings = state.settings.read().await;
        (settings.maintenance_mode, settings.maintenance_message.clone())
    };

    if maintenance_mode {
        let body = axum::Json(serde_json::json!({
            "error": message.unwrap_or_else(|| "service is under maintenance".to_string()),
        }));
        return Err((axum::http::StatusCode::SERVICE_UNAVAILABLE, body));
    }

    Ok(next.run(req).await)
}
