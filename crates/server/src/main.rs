use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use server_api::{
    db_status, health_check, list_activities, seed_activities, signup_for_activity,
    unregister_participant, ApiContext, SeedOutcome,
};
use shared::{
    domain::Catalog,
    error::{ApiError, ErrorBody, ErrorCode},
    protocol::{activities_route, DbStatus, EmailRequest, MessageResponse},
};
use storage::{read_seed_file, Storage};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config;

use config::{load_settings, prepare_database_url};

#[derive(Clone)]
struct AppState {
    api: ApiContext,
}

type HttpError = (StatusCode, Json<ErrorBody>);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;
    let api = ApiContext { storage };

    let seed = if settings.seed_file.exists() {
        read_seed_file(&settings.seed_file)?
    } else {
        warn!(seed_file = %settings.seed_file.display(), "seed file missing; starting without seed data");
        Catalog::new()
    };
    match seed_activities(&api, &seed, settings.duplicate_threshold).await? {
        SeedOutcome::Kept { existing } => info!(existing, "keeping stored activities"),
        SeedOutcome::Populated { inserted, wiped } => {
            info!(inserted, wiped, "seeded activities")
        }
    }

    let app = build_router(Arc::new(AppState { api }));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
    }
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/db-status", get(http_db_status))
        .route(activities_route(), get(http_list_activities))
        .route("/activities/:activity_name/signup", post(http_signup))
        .route("/activities/:activity_name/unregister", post(http_unregister))
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Conflict => StatusCode::BAD_REQUEST,
        ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn http_error(err: ApiError) -> HttpError {
    (status_for(err.code), Json(ErrorBody::from(err)))
}

fn email_from(body: Result<Json<EmailRequest>, JsonRejection>) -> Result<String, HttpError> {
    match body {
        Ok(Json(req)) => Ok(req.email),
        Err(rejection) => Err(http_error(ApiError::new(
            ErrorCode::Validation,
            rejection.body_text(),
        ))),
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> Result<&'static str, HttpError> {
    health_check(&state.api).await.map_err(http_error)?;
    Ok("ok")
}

async fn http_db_status(State(state): State<Arc<AppState>>) -> Result<Json<DbStatus>, HttpError> {
    db_status(&state.api).await.map(Json).map_err(http_error)
}

async fn http_list_activities(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Catalog>, HttpError> {
    list_activities(&state.api)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_signup(
    State(state): State<Arc<AppState>>,
    Path(activity_name): Path<String>,
    body: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let email = email_from(body)?;
    signup_for_activity(&state.api, &activity_name, &email)
        .await
        .map(Json)
        .map_err(http_error)
}

async fn http_unregister(
    State(state): State<Arc<AppState>>,
    Path(activity_name): Path<String>,
    body: Result<Json<EmailRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, HttpError> {
    let email = email_from(body)?;
    unregister_participant(&state.api, &activity_name, &email)
        .await
        .map(Json)
        .map_err(http_error)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
