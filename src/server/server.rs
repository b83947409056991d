use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tower_http::services::ServeDir;
use tracing::info;

use super::session::{Session, COOKIE_SESSION_TOKEN_KEY};
use super::state::*;
use super::{build_cors_layer, log_requests};
use crate::catalog::CatalogPage;
use crate::catalog_store::ItemWithStats;
use crate::error::ServiceError;
use crate::metadata::Work;
use crate::review::{Review, ReviewWithItem};

#[derive(Serialize)]
struct ServerStats {
    pub status: &'static str,
    pub uptime: String,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

async fn home(State(state): State<ServerState>) -> Json<ServerStats> {
    Json(ServerStats {
        status: "ok",
        uptime: format_uptime(state.start_time.elapsed()),
    })
}

#[derive(Deserialize, Debug)]
struct RegisterBody {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    pub email: String,
    pub password: String,
}

fn session_cookie(token: &str) -> String {
    Cookie::build((COOKIE_SESSION_TOKEN_KEY, token.to_string()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
        .to_string()
}

async fn register(
    State(authenticator): State<GuardedAuthenticator>,
    Json(body): Json<RegisterBody>,
) -> Result<Response, ServiceError> {
    let session = authenticator.register(&body.username, &body.email, &body.password)?;
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&session.token))],
        Json(session),
    )
        .into_response())
}

async fn login(
    State(authenticator): State<GuardedAuthenticator>,
    Json(body): Json<LoginBody>,
) -> Result<Response, ServiceError> {
    let session = authenticator.login(&body.email, &body.password)?;
    Ok((
        [(header::SET_COOKIE, session_cookie(&session.token))],
        Json(session),
    )
        .into_response())
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
struct CatalogParams {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

async fn list_catalog(
    State(catalog_query): State<GuardedCatalogQuery>,
    Query(params): Query<CatalogParams>,
) -> Result<Json<CatalogPage>, ServiceError> {
    Ok(Json(catalog_query.list(params.page, params.page_size)?))
}

#[derive(Deserialize, Debug, Default)]
struct SearchParams {
    pub q: Option<String>,
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchResponse {
    pub data: Vec<Work>,
    pub next_cursor: Option<String>,
}

async fn search_catalog(
    State(catalog_search): State<GuardedCatalogSearch>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, ServiceError> {
    let page = catalog_search
        .search(
            params.q.as_deref().unwrap_or_default(),
            params.limit,
            params.cursor.as_deref(),
        )
        .await?;
    Ok(Json(SearchResponse {
        data: page.works,
        next_cursor: page.next_cursor,
    }))
}

async fn get_item_detail(
    State(resolver): State<GuardedItemResolver>,
    Path(external_id): Path<i64>,
) -> Result<Json<ItemWithStats>, ServiceError> {
    Ok(Json(resolver.resolve_detail(external_id).await?))
}

async fn get_item_reviews(
    State(review_ledger): State<GuardedReviewLedger>,
    Path(external_id): Path<i64>,
) -> Result<Json<Vec<Review>>, ServiceError> {
    Ok(Json(review_ledger.list_reviews_for_item(external_id)?))
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CreateReviewBody {
    pub external_id: i64,
    pub score: i64,
    pub comment: Option<String>,
}

async fn post_review(
    session: Session,
    State(review_ledger): State<GuardedReviewLedger>,
    Json(body): Json<CreateReviewBody>,
) -> Result<(StatusCode, Json<Review>), ServiceError> {
    let review = review_ledger
        .create_review(
            session.account_id,
            body.external_id,
            body.score,
            body.comment.as_deref(),
        )
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}

async fn get_user_reviews(
    session: Session,
    State(review_ledger): State<GuardedReviewLedger>,
) -> Result<Json<Vec<ReviewWithItem>>, ServiceError> {
    Ok(Json(
        review_ledger.list_reviews_for_account(session.account_id)?,
    ))
}

pub fn make_app(state: ServerState) -> Router {
    let auth_routes: Router = Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .with_state(state.clone());

    let catalog_routes: Router = Router::new()
        .route("/v1/catalog", get(list_catalog))
        .route("/v1/catalog/search", get(search_catalog))
        .route("/v1/catalog/{external_id}", get(get_item_detail))
        .route("/v1/catalog/{external_id}/reviews", get(get_item_reviews))
        .route("/v1/reviews", post(post_review))
        .with_state(state.clone());

    let user_routes: Router = Router::new()
        .route("/reviews", get(get_user_reviews))
        .with_state(state.clone());

    let home_router: Router = match state.config.frontend_dir_path.clone() {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new()
                .route("/health", get(home))
                .with_state(state.clone())
                .fallback_service(static_files_service)
        }
        None => Router::new()
            .route("/", get(home))
            .route("/health", get(home))
            .with_state(state.clone()),
    };

    home_router
        .merge(catalog_routes)
        .nest("/v1/auth", auth_routes)
        .nest("/v1/user", user_routes)
        .layer(middleware::from_fn_with_state(state.clone(), log_requests))
        .layer(build_cors_layer(&state.config.cors_allowed_origins))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Could not listen for shutdown signal: {}", err);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

pub async fn run_server(state: ServerState) -> Result<()> {
    let port = state.config.port;
    let app = make_app(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Could not bind port {}", port))?;
    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("Server stopped");
    Ok(())
}
