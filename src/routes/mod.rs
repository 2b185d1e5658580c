// Route exports
pub mod browse;
pub mod relations;

use std::sync::Arc;

use actix_web::{http::StatusCode, web, HttpResponse};

use crate::core::{EngineError, Ranker, RelationshipEngine};
use crate::models::ErrorResponse;
use crate::services::{ProfileCache, RelationStore};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RelationStore>,
    pub cache: Arc<ProfileCache>,
    pub engine: Arc<RelationshipEngine>,
    pub ranker: Ranker,
    /// Hard cap on how many candidates a single browse may return
    pub max_limit: u16,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(relations::configure)
            .configure(browse::configure),
    );
}

/// One place maps engine error kinds onto HTTP statuses, so every endpoint
/// answers consistently: blocked pairs get a bare 403 with no relationship
/// detail, unmet requirements and bad filters get 400.
impl actix_web::error::ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Blocked => StatusCode::FORBIDDEN,
            EngineError::RequirementNotMet(_) | EngineError::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            EngineError::NotFound(_) => StatusCode::NOT_FOUND,
            EngineError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        HttpResponse::build(status).json(ErrorResponse {
            error: self.kind().to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}
