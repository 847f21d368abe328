use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};
use quizcraft_backend::{
    config::{get_config, init_config},
    database::pool::create_pool,
    middleware, routes, AppState,
};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    init_config()?;
    let config = get_config();

    let pool = create_pool().await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let app_state = AppState::new(pool);

    let base_routes = Router::new().route("/health", get(routes::health::health));

    let quiz_api = Router::new()
        .route(
            "/api/quiz/generate",
            post(routes::generate::generate_from_text),
        )
        .route(
            "/api/quiz/generate-from-topic",
            post(routes::generate::generate_from_topic),
        )
        .route("/api/quiz/sessions", post(routes::session::create_session))
        .route(
            "/api/quiz/sessions/:id",
            get(routes::session::get_session).delete(routes::session::discard_session),
        )
        .route(
            "/api/quiz/sessions/:id/answer",
            patch(routes::session::record_answer),
        )
        .route(
            "/api/quiz/sessions/:id/advance",
            post(routes::session::advance_session),
        )
        .route(
            "/api/quiz/sessions/:id/retreat",
            post(routes::session::retreat_session),
        )
        .route("/api/quiz/results", get(routes::results::list_results))
        .route("/api/quiz/results/:id", get(routes::results::get_result))
        .layer(axum::middleware::from_fn(
            middleware::auth::require_bearer_auth,
        ))
        .layer(axum::middleware::from_fn_with_state(
            middleware::rate_limit::new_rps_state(config.public_rps),
            middleware::rate_limit::rps_middleware,
        ));

    let app = base_routes
        .merge(quiz_api)
        .with_state(app_state)
        .layer(middleware::cors::permissive_cors())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(2 * 1024 * 1024));

    let addr: SocketAddr = config.server_address.parse()?;
    info!("Server listening on {}", addr);
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
