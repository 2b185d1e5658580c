use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::EngineError;
use crate::models::{BrowseRequest, BrowseResponse, UserProfile};
use crate::routes::AppState;
use crate::services::CacheKey;

/// Configure browse routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/browse", web::post().to(browse));
}

/// Browse endpoint
///
/// POST /api/v1/browse
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "limit": 20,
///   "filters": { "ageMin": 18, "ageMax": 35, "interests": ["hiking"] },
///   "sort": "recommended"
/// }
/// ```
async fn browse(
    state: web::Data<AppState>,
    req: web::Json<BrowseRequest>,
) -> Result<HttpResponse, EngineError> {
    req.validate()
        .map_err(|e| EngineError::Validation(e.to_string()))?;

    let limit = req.limit.min(state.max_limit) as usize;

    tracing::info!("browse for user: {}, limit: {}", req.user_id, limit);

    let viewer = load_viewer(&state, &req.user_id).await?;

    if let Some(location) = viewer.location {
        if !location.in_range() {
            return Err(EngineError::Validation(
                "viewer coordinates out of range".to_string(),
            ));
        }
    }

    // One round trip each for the block set and the candidate pool; the
    // ranker works from these without going back to the store.
    let blocked = state.store.blocked_ids(&req.user_id).await?;
    let candidates = state.store.browse_candidates(&req.user_id).await?;
    let total_candidates = candidates.len();

    tracing::debug!(
        "ranking {} candidates for {} ({} blocked)",
        total_candidates,
        req.user_id,
        blocked.len()
    );

    let mut ranked = state.ranker.rank(
        &viewer,
        candidates,
        &req.filters,
        req.sort,
        &blocked,
        chrono::Utc::now(),
    )?;
    ranked.truncate(limit);

    tracing::info!(
        "returning {} candidates for user {} (from {})",
        ranked.len(),
        req.user_id,
        total_candidates
    );

    Ok(HttpResponse::Ok().json(BrowseResponse {
        candidates: ranked,
        total_candidates,
    }))
}

/// Viewer lookup with cache read-through; cache failures degrade to the
/// store, they never fail the request.
async fn load_viewer(state: &AppState, user_id: &str) -> Result<UserProfile, EngineError> {
    let key = CacheKey::profile(user_id);

    match state.cache.get::<UserProfile>(&key).await {
        Ok(Some(profile)) => return Ok(profile),
        Ok(None) => {}
        Err(e) => tracing::warn!("cache read failed for {}: {}", user_id, e),
    }

    let profile = state
        .store
        .get_user(user_id)
        .await?
        .ok_or_else(|| EngineError::NotFound(format!("user {}", user_id)))?;

    if let Err(e) = state.cache.set(&key, &profile).await {
        tracing::warn!("cache write failed for {}: {}", user_id, e);
    }

    Ok(profile)
}
