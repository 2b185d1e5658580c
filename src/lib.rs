//! Amoura Engine - relationship & compatibility engine for the Amoura dating platform
//!
//! Decides whether two users may see and like each other, tracks the
//! like/match/block state of every pair, and scores and ranks candidate
//! profiles for discovery. Matches are never stored: they are derived from
//! the two directed like edges on every read.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use core::{
    distance::haversine_km, is_compatible, score_candidate, EngineError, Ranker,
    RelationshipEngine,
};
pub use models::{
    BrowseFilters, ConnectionStatus, Gender, GeoPoint, Preference, ScoredCandidate,
    ScoringWeights, SortKey, UserProfile,
};
