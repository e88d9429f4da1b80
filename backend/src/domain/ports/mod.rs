//! Domain ports: trait seams between the domain and its adapters.
//!
//! Inbound adapters (HTTP handlers) depend on these traits only; outbound
//! adapters (Diesel persistence) implement them. The in-memory
//! implementation lives alongside its port so tests and the database-less
//! fallback share one deterministic reference implementation.

mod feedback_repository;

pub use feedback_repository::{
    FeedbackPage, FeedbackRepository, InMemoryFeedbackRepository, RepositoryError,
};
