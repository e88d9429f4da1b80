//! Domain layer: entities, validation, the query pipeline, and ports.
//!
//! Everything here is transport and storage agnostic. The HTTP adapter maps
//! these types onto the wire; the persistence adapters implement the ports.

pub mod error;
pub mod feedback;
pub mod ports;
pub mod profanity;
pub mod query;
pub mod submission;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::feedback::{Feedback, NewFeedback};
pub use self::profanity::{NoProfanityFilter, ProfanityFilter, WordListFilter};
pub use self::query::{FeedbackQuery, Sort, SortDirection, SortField};
pub use self::submission::{FeedbackSubmission, ValidationErrors};
