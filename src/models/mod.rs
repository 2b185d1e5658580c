// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    BrowseFilters, ConnectionStatus, Gender, GeoPoint, LikeOutcome, Preference, ScoredCandidate,
    ScoringWeights, SortKey, UserProfile,
};
pub use requests::{BrowseRequest, ConnectionStatusQuery, RelationRequest};
pub use responses::{BrowseResponse, ErrorResponse, HealthResponse, LikeResponse};
