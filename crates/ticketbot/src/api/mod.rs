//! The http api used by the order form of the website.

use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, Method},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use serenity::model::id::UserId;
use ticketbot_intake::{OrderIntakeService, OrderRequest};
use tower_http::cors::{Any, CorsLayer};

pub mod error;
pub mod feedbacks;

pub use error::ApiError;
use feedbacks::FeedbackEntry;

/// Guild operations the website needs besides placing orders.
#[async_trait]
pub trait Community: Send + Sync {
    async fn assign_customer_role(&self, user_id: UserId) -> anyhow::Result<()>;
    async fn is_member(&self, user_id: UserId) -> anyhow::Result<bool>;
    /// The most recent feedbacks, newest first.
    async fn recent_feedbacks(&self, limit: u8) -> anyhow::Result<Vec<FeedbackEntry>>;
}

#[derive(Clone)]
pub struct ApiState {
    pub intake: Arc<OrderIntakeService>,
    pub community: Arc<dyn Community>,
}

type ApiResult = Result<Json<Value>, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiscordIdRequest {
    discord_id: Option<String>,
}

impl DiscordIdRequest {
    fn user_id(&self) -> Option<UserId> {
        self.discord_id
            .as_deref()
            .and_then(|x| x.trim().parse::<u64>().ok())
            .filter(|&x| x != 0)
            .map(UserId::new)
    }
}

pub fn router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/order", post(order))
        .route("/assign-role", post(assign_role))
        .route("/check-membership", post(check_membership))
        .route("/feedbacks", get(list_feedbacks))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

#[tracing::instrument(skip_all, fields(api.port = %port))]
pub async fn serve(state: ApiState, port: u16) -> anyhow::Result<()> {
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind http api to {addr}"))?;
    tracing::info!("HTTP api listening on {addr}");
    serve_on(listener, state).await
}

pub async fn serve_on(listener: tokio::net::TcpListener, state: ApiState) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await.context("HTTP api failed")
}

#[tracing::instrument(skip_all)]
async fn order(
    State(state): State<ApiState>,
    body: Result<Json<OrderRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let created = state.intake.submit_order(request).await?;
    Ok(Json(json!({ "success": true, "channelId": created.channel })))
}

#[tracing::instrument(skip_all)]
async fn assign_role(
    State(state): State<ApiState>,
    body: Result<Json<DiscordIdRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    let user_id = request.user_id().ok_or(ApiError::BadRequest("discordId is required"))?;
    state
        .community
        .assign_customer_role(user_id)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to assign role: {e:#}")))?;
    Ok(Json(json!({ "success": true })))
}

#[tracing::instrument(skip_all)]
async fn check_membership(
    State(state): State<ApiState>,
    body: Result<Json<DiscordIdRequest>, JsonRejection>,
) -> ApiResult {
    let Json(request) = body?;
    if request.discord_id.as_deref().map_or(true, |x| x.trim().is_empty()) {
        return Err(ApiError::BadRequest("discordId is required"));
    }
    let in_guild = match request.user_id() {
        Some(user_id) => match state.community.is_member(user_id).await {
            Ok(is_member) => is_member,
            Err(err) => {
                tracing::info!(
                    user.id = %user_id,
                    error.message = %err,
                    "Membership lookup failed, treating as not in guild"
                );
                false
            }
        },
        None => false,
    };
    Ok(Json(json!({ "inGuild": in_guild })))
}

#[tracing::instrument(skip_all)]
async fn list_feedbacks(State(state): State<ApiState>) -> ApiResult {
    let entries = state
        .community
        .recent_feedbacks(feedbacks::FEEDBACK_LIMIT)
        .await
        .map_err(|e| ApiError::Internal(format!("{e:#}")))?;
    Ok(Json(json!({ "feedbacks": entries })))
}

async fn health() -> Json<Value> {
    Json(json!({ "ok": true }))
}
