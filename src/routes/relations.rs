use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::EngineError;
use crate::models::{ConnectionStatusQuery, HealthResponse, LikeResponse, RelationRequest};
use crate::routes::AppState;

/// Configure relationship routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/relations/status", web::get().to(connection_status))
        .route("/relations/like", web::post().to(like_user))
        .route("/relations/unlike", web::post().to(unlike_user))
        .route("/relations/block", web::post().to(block_user));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let store_healthy = state.store.health_check().await.unwrap_or(false);
    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Connection status endpoint
///
/// GET /api/v1/relations/status?viewerId=...&targetId=...
async fn connection_status(
    state: web::Data<AppState>,
    query: web::Query<ConnectionStatusQuery>,
) -> Result<HttpResponse, EngineError> {
    query
        .validate()
        .map_err(|e| EngineError::Validation(e.to_string()))?;

    ensure_user_exists(&state, &query.viewer_id).await?;
    ensure_user_exists(&state, &query.target_id).await?;

    let status = state.engine.resolve(&query.viewer_id, &query.target_id).await?;
    Ok(HttpResponse::Ok().json(status))
}

/// Like endpoint
///
/// POST /api/v1/relations/like
///
/// Request body:
/// ```json
/// { "fromUserId": "string", "toUserId": "string" }
/// ```
async fn like_user(
    state: web::Data<AppState>,
    req: web::Json<RelationRequest>,
) -> Result<HttpResponse, EngineError> {
    req.validate()
        .map_err(|e| EngineError::Validation(e.to_string()))?;

    // The photo gate reads the liker fresh from the store; a cached profile
    // could report a photo that was just deleted.
    let liker = state
        .store
        .get_user(&req.from_user_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("user {}", req.from_user_id)))?;

    ensure_user_exists(&state, &req.to_user_id).await?;

    let outcome = state
        .engine
        .like(&req.from_user_id, &req.to_user_id, liker.has_main_photo())
        .await?;

    tracing::info!(
        "like processed: {} -> {} (matched: {})",
        req.from_user_id,
        req.to_user_id,
        outcome.matched
    );

    Ok(HttpResponse::Ok().json(LikeResponse {
        matched: outcome.matched,
    }))
}

/// Unlike endpoint
///
/// POST /api/v1/relations/unlike
async fn unlike_user(
    state: web::Data<AppState>,
    req: web::Json<RelationRequest>,
) -> Result<HttpResponse, EngineError> {
    req.validate()
        .map_err(|e| EngineError::Validation(e.to_string()))?;

    ensure_user_exists(&state, &req.from_user_id).await?;
    ensure_user_exists(&state, &req.to_user_id).await?;

    state.engine.unlike(&req.from_user_id, &req.to_user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// Block endpoint
///
/// POST /api/v1/relations/block
async fn block_user(
    state: web::Data<AppState>,
    req: web::Json<RelationRequest>,
) -> Result<HttpResponse, EngineError> {
    req.validate()
        .map_err(|e| EngineError::Validation(e.to_string()))?;

    ensure_user_exists(&state, &req.from_user_id).await?;
    ensure_user_exists(&state, &req.to_user_id).await?;

    state.engine.block(&req.from_user_id, &req.to_user_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

async fn ensure_user_exists(state: &AppState, user_id: &str) -> Result<(), EngineError> {
    match state.store.get_user(user_id).await? {
        Some(_) => Ok(()),
        None => Err(EngineError::NotFound(format!("user {}", user_id))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }
}
