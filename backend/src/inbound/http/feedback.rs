//! Feedback endpoints: submission, listing, and search.
//!
//! ```text
//! POST /api/feedback
//! GET  /api/feedback
//! GET  /api/feedback/search
//! ```
//!
//! The two read endpoints share one query pipeline but expose deliberately
//! different filter sets: the listing offers structured filtering including
//! `email_domain`; the search offers the free-text `query` instead.

use actix_web::{HttpRequest, HttpResponse, web};
use pagination::{PageRequest, Paginated};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::FeedbackPage;
use crate::domain::{Error, Feedback, FeedbackQuery, FeedbackSubmission, Sort};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_date_param;

/// Number of characters the `feedback_summary` field keeps.
const SUMMARY_LENGTH: usize = 100;

/// Request body for `POST /api/feedback`.
///
/// Every field is optional at the wire level so that missing and
/// whitespace-only values flow into validation and come back as
/// field-keyed 422 errors rather than deserialization failures.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SubmitFeedbackRequest {
    /// Experiment the feedback pertains to.
    pub experiment: Option<String>,
    /// Feedback text.
    pub feedback: Option<String>,
    /// PHP version the submitter runs.
    pub php_version: Option<String>,
    /// Vanguard version the submitter runs.
    pub vanguard_version: Option<String>,
    /// Optional contact address.
    pub email_address: Option<String>,
}

/// Acknowledgement body for a stored submission.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmitFeedbackResponse {
    /// Human-readable confirmation.
    pub message: String,
    /// Machine-readable outcome marker.
    pub status: String,
}

impl SubmitFeedbackResponse {
    fn success() -> Self {
        Self {
            message: "Experiment feedback successfully submitted".to_owned(),
            status: "success".to_owned(),
        }
    }
}

/// Wire representation of one feedback record.
///
/// `email_address` and `email_domain` are omitted entirely — not null —
/// when the record has no email, so consumers can distinguish "no email"
/// without string sentinels.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FeedbackResponse {
    /// Unique record identifier.
    pub id: i64,
    /// Experiment the feedback pertains to.
    pub experiment: String,
    /// Stored (profanity-filtered) feedback text.
    pub feedback: String,
    /// First 100 characters of the feedback text.
    pub feedback_summary: String,
    /// PHP version reported by the submitter.
    pub php_version: String,
    /// Vanguard version reported by the submitter.
    pub vanguard_version: String,
    /// Contact address; omitted when the record has none.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email_address: Option<String>,
    /// Domain of the contact address; omitted when the record has none.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email_domain: Option<String>,
    /// Whether the record carries a contact address.
    pub has_email: bool,
    /// Whole days since the record was created.
    pub age_in_days: i64,
    /// Creation timestamp, ISO 8601.
    pub created_at: String,
    /// Last-modified timestamp, ISO 8601.
    pub updated_at: String,
}

impl From<&Feedback> for FeedbackResponse {
    fn from(record: &Feedback) -> Self {
        Self {
            id: record.id(),
            experiment: record.experiment().to_owned(),
            feedback: record.feedback().to_owned(),
            feedback_summary: record.summary(SUMMARY_LENGTH),
            php_version: record.php_version().to_owned(),
            vanguard_version: record.vanguard_version().to_owned(),
            email_address: record.email_address().map(str::to_owned),
            email_domain: record.email_domain().map(str::to_owned),
            has_email: record.has_email_address(),
            age_in_days: record.age_in_days(),
            created_at: record.created_at().to_rfc3339(),
            updated_at: record.updated_at().to_rfc3339(),
        }
    }
}

/// Query parameters accepted by `GET /api/feedback`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListFeedbackParams {
    /// Exact experiment name to match.
    pub experiment: Option<String>,
    /// Exact PHP version to match.
    pub php_version: Option<String>,
    /// Exact Vanguard version to match.
    pub vanguard_version: Option<String>,
    /// Email domain the address must end with.
    pub email_domain: Option<String>,
    /// Email-presence filter (permissive boolean).
    pub has_email: Option<String>,
    /// Lower creation-date bound (inclusive).
    pub from_date: Option<String>,
    /// Upper creation-date bound (inclusive).
    pub to_date: Option<String>,
    /// Sort column; unknown values fall back to `created_at` descending.
    pub sort_by: Option<String>,
    /// Sort direction; `asc` or anything else for descending.
    pub sort_direction: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size, clamped to at most 100.
    pub per_page: Option<String>,
}

/// Query parameters accepted by `GET /api/feedback/search`.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct SearchFeedbackParams {
    /// Free-text term matched case-insensitively across all searchable
    /// fields.
    pub query: Option<String>,
    /// Exact experiment name to match.
    pub experiment: Option<String>,
    /// Exact PHP version to match.
    pub php_version: Option<String>,
    /// Exact Vanguard version to match.
    pub vanguard_version: Option<String>,
    /// Email-presence filter (permissive boolean).
    pub has_email: Option<String>,
    /// Lower creation-date bound (inclusive).
    pub from_date: Option<String>,
    /// Upper creation-date bound (inclusive).
    pub to_date: Option<String>,
    /// Sort column; unknown values fall back to `created_at` descending.
    pub sort_by: Option<String>,
    /// Sort direction; `asc` or anything else for descending.
    pub sort_direction: Option<String>,
    /// 1-based page number.
    pub page: Option<String>,
    /// Page size, clamped to at most 100.
    pub per_page: Option<String>,
}

/// Accept a feedback submission.
#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = SubmitFeedbackResponse),
        (status = 422, description = "Validation failed", body = crate::inbound::http::error::ApiError),
        (status = 429, description = "Rate limit exceeded", body = crate::inbound::http::error::ApiError),
        (status = 500, description = "Internal server error")
    ),
    tags = ["feedback"],
    operation_id = "submitFeedback"
)]
pub async fn submit_feedback(
    state: web::Data<HttpState>,
    payload: web::Json<SubmitFeedbackRequest>,
) -> ApiResult<HttpResponse> {
    let SubmitFeedbackRequest {
        experiment,
        feedback,
        php_version,
        vanguard_version,
        email_address,
    } = payload.into_inner();

    let submission = FeedbackSubmission::from_raw(
        experiment,
        feedback,
        php_version,
        vanguard_version,
        email_address,
    );
    let mut new_feedback = submission
        .validate()
        .map_err(crate::domain::ValidationErrors::into_error)?;
    new_feedback.feedback = state.profanity.filter(&new_feedback.feedback);
    state.feedback.insert(new_feedback).await.map_err(Error::from)?;

    Ok(HttpResponse::Created().json(SubmitFeedbackResponse::success()))
}

/// List feedback with structured filters, sorting, and pagination.
#[utoipa::path(
    get,
    path = "/api/feedback",
    params(ListFeedbackParams),
    responses(
        (status = 200, description = "One page of feedback records"),
        (status = 401, description = "Missing or invalid API key", body = crate::inbound::http::error::ApiError),
        (status = 422, description = "Unparseable date parameter", body = crate::inbound::http::error::ApiError),
        (status = 500, description = "Internal server error")
    ),
    tags = ["feedback"],
    operation_id = "listFeedback",
    security(("ApiKey" = []))
)]
pub async fn list_feedback(
    req: HttpRequest,
    state: web::Data<HttpState>,
    params: web::Query<ListFeedbackParams>,
) -> ApiResult<HttpResponse> {
    let params = params.into_inner();
    let query = FeedbackQuery::new()
        .for_experiment(params.experiment.as_deref())
        .for_php_version(params.php_version.as_deref())
        .for_vanguard_version(params.vanguard_version.as_deref())
        .from_email_domain(params.email_domain.as_deref())
        .with_email_presence(params.has_email.as_deref())
        .created_from(parse_date_filter("from_date", params.from_date.as_deref())?)
        .created_until(parse_date_filter("to_date", params.to_date.as_deref())?)
        .sorted(Sort::from_params(
            params.sort_by.as_deref(),
            params.sort_direction.as_deref(),
        ))
        .paged(PageRequest::from_params(
            params.page.as_deref(),
            params.per_page.as_deref(),
        ));

    let page = state.feedback.search(&query).await.map_err(Error::from)?;
    respond_with_page(&req, query.page(), &page)
}

/// Search feedback by free text, with the shared filters and pagination.
#[utoipa::path(
    get,
    path = "/api/feedback/search",
    params(SearchFeedbackParams),
    responses(
        (status = 200, description = "One page of matching feedback records"),
        (status = 401, description = "Missing or invalid API key", body = crate::inbound::http::error::ApiError),
        (status = 422, description = "Unparseable date parameter", body = crate::inbound::http::error::ApiError),
        (status = 500, description = "Internal server error")
    ),
    tags = ["feedback"],
    operation_id = "searchFeedback",
    security(("ApiKey" = []))
)]
pub async fn search_feedback(
    req: HttpRequest,
    state: web::Data<HttpState>,
    params: web::Query<SearchFeedbackParams>,
) -> ApiResult<HttpResponse> {
    let params = params.into_inner();
    let query = FeedbackQuery::new()
        .search_term(params.query.as_deref())
        .for_experiment(params.experiment.as_deref())
        .for_php_version(params.php_version.as_deref())
        .for_vanguard_version(params.vanguard_version.as_deref())
        .with_email_presence(params.has_email.as_deref())
        .created_from(parse_date_filter("from_date", params.from_date.as_deref())?)
        .created_until(parse_date_filter("to_date", params.to_date.as_deref())?)
        .sorted(Sort::from_params(
            params.sort_by.as_deref(),
            params.sort_direction.as_deref(),
        ))
        .paged(PageRequest::from_params(
            params.page.as_deref(),
            params.per_page.as_deref(),
        ));

    let page = state.feedback.search(&query).await.map_err(Error::from)?;
    respond_with_page(&req, query.page(), &page)
}

/// Parse an optional date-range parameter, ignoring empty values.
fn parse_date_filter(
    field: &'static str,
    raw: Option<&str>,
) -> Result<Option<chrono::DateTime<chrono::Utc>>, Error> {
    raw.filter(|value| !value.trim().is_empty())
        .map(|value| parse_date_param(field, value))
        .transpose()
}

fn respond_with_page(
    req: &HttpRequest,
    page_request: PageRequest,
    page: &FeedbackPage,
) -> ApiResult<HttpResponse> {
    let data: Vec<FeedbackResponse> = page.records.iter().map(FeedbackResponse::from).collect();
    let envelope = Paginated::new(data, page.total, page_request, &request_url(req))
        .map_err(|err| Error::internal(format!("pagination links failed: {err}")))?;
    Ok(HttpResponse::Ok().json(envelope))
}

/// Reconstruct the absolute request URL the pagination links derive from.
fn request_url(req: &HttpRequest) -> String {
    let connection_info = req.connection_info();
    let scheme = connection_info.scheme();
    let host = connection_info.host();
    let path = req.path();
    let query = req.query_string();
    if query.is_empty() {
        format!("{scheme}://{host}{path}")
    } else {
        format!("{scheme}://{host}{path}?{query}")
    }
}
