//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{Feedback, NewFeedback};

use super::schema::feedback;

/// Row struct for reading from the feedback table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = feedback)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct FeedbackRow {
    pub id: i64,
    pub experiment: String,
    #[diesel(column_name = feedback_text)]
    pub feedback: String,
    pub php_version: String,
    pub vanguard_version: String,
    pub email_address: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<FeedbackRow> for Feedback {
    fn from(row: FeedbackRow) -> Self {
        Self::from_parts(
            row.id,
            NewFeedback {
                experiment: row.experiment,
                feedback: row.feedback,
                php_version: row.php_version,
                vanguard_version: row.vanguard_version,
                email_address: row.email_address,
            },
            row.created_at,
            row.updated_at,
        )
    }
}

/// Insertable struct for creating new feedback records.
///
/// Id and timestamps come from the database (`BIGSERIAL`, `DEFAULT now()`).
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = feedback)]
pub(crate) struct NewFeedbackRow<'a> {
    pub experiment: &'a str,
    #[diesel(column_name = feedback_text)]
    pub feedback: &'a str,
    pub php_version: &'a str,
    pub vanguard_version: &'a str,
    pub email_address: Option<&'a str>,
}

impl<'a> From<&'a NewFeedback> for NewFeedbackRow<'a> {
    fn from(new_feedback: &'a NewFeedback) -> Self {
        Self {
            experiment: &new_feedback.experiment,
            feedback: &new_feedback.feedback,
            php_version: &new_feedback.php_version,
            vanguard_version: &new_feedback.vanguard_version,
            email_address: new_feedback.email_address.as_deref(),
        }
    }
}
