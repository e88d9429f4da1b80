//! Feedback entity and its derived, non-stored computations.
//!
//! A [`Feedback`] record is created exactly once by the submission endpoint
//! and is never mutated or deleted afterwards. Everything beyond the stored
//! columns (summary, email domain, age) is computed on read.

use chrono::{DateTime, Utc};

/// Marker appended to a summary when the feedback text was truncated.
const SUMMARY_ELLIPSIS: &str = "...";

/// A persisted feedback record.
///
/// ## Invariants
/// - `experiment`, `feedback`, `php_version`, and `vanguard_version` are
///   never empty strings.
/// - `email_address` is either a syntactically valid address or absent,
///   never an empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Feedback {
    id: i64,
    experiment: String,
    feedback: String,
    php_version: String,
    vanguard_version: String,
    email_address: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Feedback {
    /// Reassemble a record from stored parts.
    ///
    /// Used by repository adapters when mapping rows back into the domain;
    /// new records enter the system through a repository `insert` with a
    /// validated [`NewFeedback`].
    pub fn from_parts(
        id: i64,
        new_feedback: NewFeedback,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        let NewFeedback {
            experiment,
            feedback,
            php_version,
            vanguard_version,
            email_address,
        } = new_feedback;
        Self {
            id,
            experiment,
            feedback,
            php_version,
            vanguard_version,
            email_address,
            created_at,
            updated_at,
        }
    }

    /// Unique record identifier.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Experiment the feedback pertains to.
    pub fn experiment(&self) -> &str {
        &self.experiment
    }

    /// Submitted feedback text (already profanity-filtered at submission).
    pub fn feedback(&self) -> &str {
        &self.feedback
    }

    /// PHP version reported by the submitter.
    pub fn php_version(&self) -> &str {
        &self.php_version
    }

    /// Vanguard version reported by the submitter.
    pub fn vanguard_version(&self) -> &str {
        &self.vanguard_version
    }

    /// Optional contact address supplied with the submission.
    pub fn email_address(&self) -> Option<&str> {
        self.email_address.as_deref()
    }

    /// Creation timestamp.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last-modified timestamp; equals `created_at` for this surface.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// First `max_len` characters of the feedback text.
    ///
    /// When truncation occurs the cut text is right-trimmed and an ellipsis
    /// marker is appended, so the result may slightly exceed `max_len`.
    /// Truncation counts characters, not bytes.
    pub fn summary(&self, max_len: usize) -> String {
        let total_chars = self.feedback.chars().count();
        if total_chars <= max_len {
            return self.feedback.clone();
        }
        let truncated: String = self.feedback.chars().take(max_len).collect();
        let mut summary = truncated.trim_end().to_owned();
        summary.push_str(SUMMARY_ELLIPSIS);
        summary
    }

    /// Whether an email address was supplied with the submission.
    pub fn has_email_address(&self) -> bool {
        self.email_address.is_some()
    }

    /// Domain part of the email address (after the first `@`), if present.
    pub fn email_domain(&self) -> Option<&str> {
        self.email_address
            .as_deref()
            .and_then(|address| address.split_once('@'))
            .map(|(_, domain)| domain)
    }

    /// Whole days elapsed since creation, truncated (floor), never rounded.
    pub fn age_in_days(&self) -> i64 {
        self.age_in_days_at(Utc::now())
    }

    /// Whether the record is strictly older than `days` whole days.
    pub fn is_older_than(&self, days: i64) -> bool {
        self.age_in_days() > days
    }

    /// Whether the feedback pertains to exactly the named experiment.
    pub fn is_for_experiment(&self, experiment: &str) -> bool {
        self.experiment == experiment
    }

    fn age_in_days_at(&self, now: DateTime<Utc>) -> i64 {
        now.signed_duration_since(self.created_at).num_days()
    }
}

/// A validated, normalized record ready for insertion.
///
/// Produced by submission validation; the `feedback` text is expected to be
/// profanity-filtered before the value reaches a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFeedback {
    /// Experiment the feedback pertains to.
    pub experiment: String,
    /// Submitted feedback text.
    pub feedback: String,
    /// PHP version reported by the submitter.
    pub php_version: String,
    /// Vanguard version reported by the submitter.
    pub vanguard_version: String,
    /// Optional contact address; never an empty string.
    pub email_address: Option<String>,
}
