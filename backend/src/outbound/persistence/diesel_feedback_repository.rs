//! PostgreSQL-backed `FeedbackRepository` implementation using Diesel ORM.
//!
//! Translates a [`FeedbackQuery`] spec into SQL: conditional `WHERE`
//! clauses, an `ILIKE` disjunction for the free-text term, ordering with a
//! stable `id` tie-break, and a count query alongside the page query.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{FeedbackPage, FeedbackRepository, RepositoryError};
use crate::domain::query::{SortDirection, SortField};
use crate::domain::{Feedback, FeedbackQuery, NewFeedback};

use super::models::{FeedbackRow, NewFeedbackRow};
use super::pool::{DbPool, PoolError};
use super::schema::feedback;

/// Diesel-backed implementation of the `FeedbackRepository` port.
#[derive(Clone)]
pub struct DieselFeedbackRepository {
    pool: DbPool,
}

impl DieselFeedbackRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to repository errors.
fn map_pool_error(error: PoolError) -> RepositoryError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RepositoryError::connection(message)
        }
    }
}

/// Map Diesel errors to repository errors.
fn map_diesel_error(error: diesel::result::Error) -> RepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RepositoryError::connection("database connection error")
        }
        _ => RepositoryError::query("database error"),
    }
}

/// Escape LIKE metacharacters so user input matches as a plain substring.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for ch in term.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// Apply every active filter of the spec to a fresh boxed query.
///
/// Called twice per search: once for the count, once for the page. The two
/// must stay identical, which is the point of funnelling both through here.
fn filtered(spec: &FeedbackQuery) -> feedback::BoxedQuery<'static, diesel::pg::Pg> {
    let mut query = feedback::table.into_boxed();

    if let Some(term) = spec.term() {
        let pattern = format!("%{}%", escape_like(term));
        query = query.filter(
            feedback::experiment
                .ilike(pattern.clone())
                .nullable()
                .or(feedback::feedback_text.ilike(pattern.clone()).nullable())
                .or(feedback::php_version.ilike(pattern.clone()).nullable())
                .or(feedback::vanguard_version.ilike(pattern.clone()).nullable())
                .or(feedback::email_address.ilike(pattern)),
        );
    }
    if let Some(experiment) = spec.experiment() {
        query = query.filter(feedback::experiment.eq(experiment.to_owned()));
    }
    if let Some(version) = spec.php_version() {
        query = query.filter(feedback::php_version.eq(version.to_owned()));
    }
    if let Some(version) = spec.vanguard_version() {
        query = query.filter(feedback::vanguard_version.eq(version.to_owned()));
    }
    if let Some(domain) = spec.email_domain() {
        let pattern = format!("%@{}", escape_like(domain));
        query = query.filter(feedback::email_address.like(pattern));
    }
    if let Some(has_email) = spec.has_email() {
        query = if has_email {
            query.filter(feedback::email_address.is_not_null())
        } else {
            query.filter(feedback::email_address.is_null())
        };
    }
    if let Some(from) = spec.from_date() {
        query = query.filter(feedback::created_at.ge(from));
    }
    if let Some(to) = spec.to_date() {
        query = query.filter(feedback::created_at.le(to));
    }

    query
}

/// Apply the spec's sort clause with the stable `id` tie-break.
fn ordered<'a>(
    query: feedback::BoxedQuery<'a, diesel::pg::Pg>,
    spec: &FeedbackQuery,
) -> feedback::BoxedQuery<'a, diesel::pg::Pg> {
    let sort = spec.sort();
    let query = match (sort.field, sort.direction) {
        (SortField::CreatedAt, SortDirection::Asc) => query.order(feedback::created_at.asc()),
        (SortField::CreatedAt, SortDirection::Desc) => query.order(feedback::created_at.desc()),
        (SortField::Experiment, SortDirection::Asc) => query.order(feedback::experiment.asc()),
        (SortField::Experiment, SortDirection::Desc) => query.order(feedback::experiment.desc()),
        (SortField::PhpVersion, SortDirection::Asc) => query.order(feedback::php_version.asc()),
        (SortField::PhpVersion, SortDirection::Desc) => query.order(feedback::php_version.desc()),
        (SortField::VanguardVersion, SortDirection::Asc) => {
            query.order(feedback::vanguard_version.asc())
        }
        (SortField::VanguardVersion, SortDirection::Desc) => {
            query.order(feedback::vanguard_version.desc())
        }
    };
    query.then_order_by(feedback::id.asc())
}

#[async_trait]
impl FeedbackRepository for DieselFeedbackRepository {
    async fn insert(&self, new_feedback: NewFeedback) -> Result<Feedback, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewFeedbackRow::from(&new_feedback);
        let inserted: FeedbackRow = diesel::insert_into(feedback::table)
            .values(row)
            .returning(FeedbackRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(inserted.into())
    }

    async fn search(&self, query: &FeedbackQuery) -> Result<FeedbackPage, RepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let total: i64 = filtered(query)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let page = query.page();
        let limit = i64::try_from(page.per_page()).unwrap_or(i64::MAX);
        let offset = i64::try_from(page.offset()).unwrap_or(i64::MAX);
        let rows: Vec<FeedbackRow> = ordered(filtered(query), query)
            .select(FeedbackRow::as_select())
            .limit(limit)
            .offset(offset)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(FeedbackPage {
            records: rows.into_iter().map(Into::into).collect(),
            total: u64::try_from(total).unwrap_or(0),
        })
    }
}
