//! Server crate for the CineCircle recommendation engine.
//!
//! This crate contains the orchestrator that coordinates all components
//! of the recommendation pipeline, the friend activity feed and the
//! service configuration.

pub mod activity;
pub mod config;
pub mod orchestrator;

pub use activity::{ActivityEntry, UNKNOWN_USERNAME, get_friend_activity};
pub use config::{Config, RecommenderConfig};
pub use orchestrator::{RecommendationOrchestrator, RecommendationRun};
