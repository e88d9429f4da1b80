//! Repository port for feedback records, plus the in-memory implementation.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::error::Error;
use crate::domain::feedback::{Feedback, NewFeedback};
use crate::domain::query::FeedbackQuery;

/// Failures raised by repository implementations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    /// The backing store could not be reached.
    #[error("repository connection failed: {message}")]
    Connection {
        /// Human-readable cause.
        message: String,
    },

    /// A query or insert against the store failed.
    #[error("repository query failed: {message}")]
    Query {
        /// Human-readable cause.
        message: String,
    },
}

impl RepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

impl From<RepositoryError> for Error {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Connection { message } => Self::service_unavailable(message),
            RepositoryError::Query { message } => Self::internal(message),
        }
    }
}

/// One page of a filtered result set together with the total match count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackPage {
    /// Records on this page, in query order.
    pub records: Vec<Feedback>,
    /// Total number of records matching the query across all pages.
    pub total: u64,
}

/// Persistence port for feedback records.
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Persist a validated record, assigning its id and timestamps.
    async fn insert(&self, new_feedback: NewFeedback) -> Result<Feedback, RepositoryError>;

    /// Apply the full filter/sort/paginate spec and return one page.
    async fn search(&self, query: &FeedbackQuery) -> Result<FeedbackPage, RepositoryError>;
}

#[derive(Debug, Default)]
struct InMemoryState {
    records: Vec<Feedback>,
    next_id: i64,
}

/// Deterministic in-memory repository.
///
/// Backs the unit and HTTP tests, and serves as the store when no database
/// is configured. Applies the reference semantics from
/// [`FeedbackQuery::matches`] and [`FeedbackQuery::compare`] over a vector.
#[derive(Debug, Default)]
pub struct InMemoryFeedbackRepository {
    state: Mutex<InMemoryState>,
}

impl InMemoryFeedbackRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record with an explicit creation timestamp.
    ///
    /// Deterministic seeding hook for tests and fixtures; the trait
    /// [`FeedbackRepository::insert`] stamps records with the current time.
    pub fn seed(&self, new_feedback: NewFeedback, created_at: DateTime<Utc>) -> Feedback {
        let mut state = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        state.next_id += 1;
        let record = Feedback::from_parts(state.next_id, new_feedback, created_at, created_at);
        state.records.push(record.clone());
        record
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryFeedbackRepository {
    async fn insert(&self, new_feedback: NewFeedback) -> Result<Feedback, RepositoryError> {
        Ok(self.seed(new_feedback, Utc::now()))
    }

    async fn search(&self, query: &FeedbackQuery) -> Result<FeedbackPage, RepositoryError> {
        let state = self
            .state
            .lock()
            .map_err(|_| RepositoryError::query("repository lock poisoned"))?;

        let mut matched: Vec<Feedback> = state
            .records
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect();
        matched.sort_by(|a, b| query.compare(a, b));

        let total = u64::try_from(matched.len()).unwrap_or(u64::MAX);
        let page = query.page();
        let records = matched
            .into_iter()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(usize::try_from(page.per_page()).unwrap_or(usize::MAX))
            .collect();

        Ok(FeedbackPage { records, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::query::{Sort, SortDirection, SortField};
    use pagination::PageRequest;
    use rstest::rstest;

    fn new_feedback(experiment: &str, email: Option<&str>) -> NewFeedback {
        NewFeedback {
            experiment: experiment.to_owned(),
            feedback: format!("feedback about {experiment}"),
            php_version: "8.1".to_owned(),
            vanguard_version: "1.0.0".to_owned(),
            email_address: email.map(str::to_owned),
        }
    }

    #[tokio::test]
    async fn insert_assigns_sequential_ids_and_timestamps() {
        let repository = InMemoryFeedbackRepository::new();

        let first = repository
            .insert(new_feedback("Alpha", None))
            .await
            .expect("insert succeeds");
        let second = repository
            .insert(new_feedback("Beta", None))
            .await
            .expect("insert succeeds");

        assert_eq!(first.id(), 1);
        assert_eq!(second.id(), 2);
        assert_eq!(first.created_at(), first.updated_at());
    }

    #[tokio::test]
    async fn search_filters_sorts_and_counts() {
        let repository = InMemoryFeedbackRepository::new();
        repository
            .insert(new_feedback("B Experiment", Some("a@example.com")))
            .await
            .expect("insert succeeds");
        repository
            .insert(new_feedback("A Experiment", None))
            .await
            .expect("insert succeeds");

        let query = FeedbackQuery::new().sorted(Sort {
            field: SortField::Experiment,
            direction: SortDirection::Asc,
        });
        let page = repository.search(&query).await.expect("search succeeds");

        assert_eq!(page.total, 2);
        let names: Vec<&str> = page.records.iter().map(Feedback::experiment).collect();
        assert_eq!(names, vec!["A Experiment", "B Experiment"]);
    }

    #[tokio::test]
    async fn search_pages_beyond_the_end_are_empty_but_keep_totals() {
        let repository = InMemoryFeedbackRepository::new();
        for index in 0..3 {
            repository
                .insert(new_feedback(&format!("Experiment {index}"), None))
                .await
                .expect("insert succeeds");
        }

        let query = FeedbackQuery::new().paged(PageRequest::new(5, 2));
        let page = repository.search(&query).await.expect("search succeeds");

        assert_eq!(page.total, 3);
        assert!(page.records.is_empty());
    }

    #[rstest]
    fn repository_errors_map_to_domain_codes() {
        use crate::domain::error::ErrorCode;

        let connection: Error = RepositoryError::connection("down").into();
        assert_eq!(connection.code(), ErrorCode::ServiceUnavailable);

        let query: Error = RepositoryError::query("boom").into();
        assert_eq!(query.code(), ErrorCode::InternalError);
    }
}
