//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::FeedbackRepository;
use crate::domain::profanity::ProfanityFilter;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Store the submission endpoint writes to and the read endpoints query.
    pub feedback: Arc<dyn FeedbackRepository>,
    /// Text transform applied to feedback bodies before persistence.
    pub profanity: Arc<dyn ProfanityFilter>,
}

impl HttpState {
    /// Bundle the ports the handlers depend on.
    pub fn new(feedback: Arc<dyn FeedbackRepository>, profanity: Arc<dyn ProfanityFilter>) -> Self {
        Self {
            feedback,
            profanity,
        }
    }
}
