//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.

diesel::table! {
    /// Feedback submissions, one row per accepted submission.
    ///
    /// Rows are insert-only: nothing in the service updates or deletes them.
    feedback (id) {
        /// Primary key, assigned by the database.
        id -> Int8,
        /// Experiment the feedback pertains to (max 255 characters).
        experiment -> Varchar,
        /// Submitted feedback text, profanity-filtered before insert.
        #[sql_name = "feedback"]
        feedback_text -> Text,
        /// PHP version reported by the submitter (max 20 characters).
        php_version -> Varchar,
        /// Vanguard version reported by the submitter (max 20 characters).
        vanguard_version -> Varchar,
        /// Optional contact address.
        email_address -> Nullable<Varchar>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp; equals `created_at` for this surface.
        updated_at -> Timestamptz,
    }
}
