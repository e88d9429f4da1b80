//! Submission validation and normalization.
//!
//! Raw request fields become a [`FeedbackSubmission`] draft: every field is
//! trimmed, and whitespace-only input collapses to absent so required-field
//! validation fires on it. Validation reports every failing field together,
//! keyed by field name, rather than stopping at the first failure.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::json;

use super::error::Error;
use super::feedback::NewFeedback;

/// Maximum accepted length for the experiment name, in characters.
pub const EXPERIMENT_MAX_LEN: usize = 255;
/// Maximum accepted length for the feedback text, in characters.
pub const FEEDBACK_MAX_LEN: usize = 10_000;
/// Maximum accepted length for the PHP and Vanguard versions, in characters.
pub const VERSION_MAX_LEN: usize = 20;
/// Maximum accepted length for the email address, in characters.
pub const EMAIL_MAX_LEN: usize = 255;

/// Field keys used in validation error payloads.
pub mod fields {
    /// Experiment name field.
    pub const EXPERIMENT: &str = "experiment";
    /// Feedback text field.
    pub const FEEDBACK: &str = "feedback";
    /// PHP version field.
    pub const PHP_VERSION: &str = "php_version";
    /// Vanguard version field.
    pub const VANGUARD_VERSION: &str = "vanguard_version";
    /// Email address field.
    pub const EMAIL_ADDRESS: &str = "email_address";
}

const EXPERIMENT_REQUIRED: &str = "The experiment name is required.";
const EXPERIMENT_TOO_LONG: &str = "The experiment name must not exceed 255 characters.";
const FEEDBACK_REQUIRED: &str = "The feedback content is required.";
const FEEDBACK_TOO_LONG: &str = "The feedback must not exceed 10000 characters.";
const PHP_VERSION_REQUIRED: &str = "The PHP version is required.";
const PHP_VERSION_TOO_LONG: &str = "The PHP version must not exceed 20 characters.";
const VANGUARD_VERSION_REQUIRED: &str = "The Vanguard version is required.";
const VANGUARD_VERSION_TOO_LONG: &str = "The Vanguard version must not exceed 20 characters.";
const EMAIL_INVALID: &str = "Please provide a valid email address.";
const EMAIL_TOO_LONG: &str = "The email address must not exceed 255 characters.";

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // local@domain with at least one dot in the domain, no whitespace.
        Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex compiles")
    })
}

/// All validation failures for one submission, keyed by field.
///
/// Keys are ordered (`BTreeMap`) so serialized payloads are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    errors: BTreeMap<&'static str, Vec<String>>,
}

impl ValidationErrors {
    /// Record a failure message against a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.entry(field).or_default().push(message.into());
    }

    /// Whether any failure was recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether the named field has at least one failure.
    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    /// Messages recorded against the named field.
    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map_or(&[], Vec::as_slice)
    }

    /// Convert into the domain error carried to the HTTP layer.
    ///
    /// The resulting payload lists every failing field under
    /// `details.errors`, each with its human-readable messages.
    pub fn into_error(self) -> Error {
        Error::validation_failed("The given data was invalid.")
            .with_details(json!({ "errors": self.errors }))
    }
}

/// Normalized draft of a submission, ready for validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackSubmission {
    experiment: Option<String>,
    feedback: Option<String>,
    php_version: Option<String>,
    vanguard_version: Option<String>,
    email_address: Option<String>,
}

impl FeedbackSubmission {
    /// Normalize raw request fields: trim surrounding whitespace and treat
    /// fields that trim to nothing as absent.
    pub fn from_raw(
        experiment: Option<String>,
        feedback: Option<String>,
        php_version: Option<String>,
        vanguard_version: Option<String>,
        email_address: Option<String>,
    ) -> Self {
        Self {
            experiment: normalize(experiment),
            feedback: normalize(feedback),
            php_version: normalize(php_version),
            vanguard_version: normalize(vanguard_version),
            email_address: normalize(email_address),
        }
    }

    /// Validate the draft, producing a record ready for persistence or the
    /// full set of field failures.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationErrors`] naming every failing field; nothing is
    /// persisted in that case.
    pub fn validate(self) -> Result<NewFeedback, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let experiment = required(
            &mut errors,
            fields::EXPERIMENT,
            self.experiment,
            EXPERIMENT_REQUIRED,
            EXPERIMENT_MAX_LEN,
            EXPERIMENT_TOO_LONG,
        );
        let feedback = required(
            &mut errors,
            fields::FEEDBACK,
            self.feedback,
            FEEDBACK_REQUIRED,
            FEEDBACK_MAX_LEN,
            FEEDBACK_TOO_LONG,
        );
        let php_version = required(
            &mut errors,
            fields::PHP_VERSION,
            self.php_version,
            PHP_VERSION_REQUIRED,
            VERSION_MAX_LEN,
            PHP_VERSION_TOO_LONG,
        );
        let vanguard_version = required(
            &mut errors,
            fields::VANGUARD_VERSION,
            self.vanguard_version,
            VANGUARD_VERSION_REQUIRED,
            VERSION_MAX_LEN,
            VANGUARD_VERSION_TOO_LONG,
        );

        let email_address = match self.email_address {
            None => None,
            Some(address) => {
                let mut valid = true;
                if address.chars().count() > EMAIL_MAX_LEN {
                    errors.add(fields::EMAIL_ADDRESS, EMAIL_TOO_LONG);
                    valid = false;
                }
                if !email_regex().is_match(&address) {
                    errors.add(fields::EMAIL_ADDRESS, EMAIL_INVALID);
                    valid = false;
                }
                valid.then_some(address)
            }
        };

        match (experiment, feedback, php_version, vanguard_version) {
            (Some(experiment), Some(feedback), Some(php_version), Some(vanguard_version))
                if errors.is_empty() =>
            {
                Ok(NewFeedback {
                    experiment,
                    feedback,
                    php_version,
                    vanguard_version,
                    email_address,
                })
            }
            _ => Err(errors),
        }
    }
}

fn normalize(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_owned())
        .filter(|trimmed| !trimmed.is_empty())
}

fn required(
    errors: &mut ValidationErrors,
    field: &'static str,
    value: Option<String>,
    required_message: &'static str,
    max_len: usize,
    too_long_message: &'static str,
) -> Option<String> {
    match value {
        None => {
            errors.add(field, required_message);
            None
        }
        Some(value) => {
            if value.chars().count() > max_len {
                errors.add(field, too_long_message);
                None
            } else {
                Some(value)
            }
        }
    }
}
