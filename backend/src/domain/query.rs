//! Filter, sort, and pagination spec for feedback queries.
//!
//! Both read endpoints build a [`FeedbackQuery`] from their request
//! parameters and hand it to a repository. The spec is accumulated step by
//! step (builder style); repositories interpret it — the Diesel adapter
//! translates it to SQL, the in-memory repository applies [`FeedbackQuery::matches`]
//! and [`FeedbackQuery::compare`] directly. Keeping the reference semantics
//! here is what stops the two endpoints (and the two stores) drifting apart.

use chrono::{DateTime, Duration, Utc};
use pagination::PageRequest;

use super::feedback::Feedback;

/// Columns a result set may be sorted by. Exact, case-sensitive allow-list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    /// Sort by creation timestamp.
    CreatedAt,
    /// Sort by experiment name.
    Experiment,
    /// Sort by reported PHP version.
    PhpVersion,
    /// Sort by reported Vanguard version.
    VanguardVersion,
}

impl SortField {
    /// Parse a raw `sort_by` value against the allow-list.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created_at" => Some(Self::CreatedAt),
            "experiment" => Some(Self::Experiment),
            "php_version" => Some(Self::PhpVersion),
            "vanguard_version" => Some(Self::VanguardVersion),
            _ => None,
        }
    }
}

/// Direction applied to the sort column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// Ascending order.
    Asc,
    /// Descending order.
    Desc,
}

/// A resolved sort clause: column plus direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    /// Column to sort by.
    pub field: SortField,
    /// Direction to apply.
    pub direction: SortDirection,
}

impl Sort {
    /// Resolve raw `sort_by`/`sort_direction` parameters.
    ///
    /// A `sort_by` outside the allow-list (or absent) falls back to
    /// `created_at` descending, ignoring any `sort_direction`. Otherwise the
    /// direction is ascending only when `sort_direction` case-insensitively
    /// equals `asc`.
    pub fn from_params(sort_by: Option<&str>, sort_direction: Option<&str>) -> Self {
        match sort_by.and_then(SortField::parse) {
            Some(field) => Self {
                field,
                direction: parse_direction(sort_direction),
            },
            None => Self::default(),
        }
    }
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

fn parse_direction(raw: Option<&str>) -> SortDirection {
    if raw.is_some_and(|value| value.trim().eq_ignore_ascii_case("asc")) {
        SortDirection::Asc
    } else {
        SortDirection::Desc
    }
}

/// Permissive boolean grammar used by the `has_email` parameter.
///
/// `1`, `true`, `yes`, and `on` (case-insensitive, surrounding whitespace
/// tolerated) parse true; everything else, including the empty string,
/// parses false.
pub fn parse_bool_param(raw: &str) -> bool {
    matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

/// Accumulated filter/sort/pagination spec for one feedback query.
///
/// Filters combine as one conjunction; the free-text term is a disjunction
/// across the five searchable fields that joins the conjunction as a single
/// clause. Setters accepting raw parameters ignore absent or empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackQuery {
    search_term: Option<String>,
    experiment: Option<String>,
    php_version: Option<String>,
    vanguard_version: Option<String>,
    email_domain: Option<String>,
    has_email: Option<bool>,
    from_date: Option<DateTime<Utc>>,
    to_date: Option<DateTime<Utc>>,
    sort: Sort,
    page: PageRequest,
}

impl FeedbackQuery {
    /// Start an empty spec: no filters, default sort, first page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Spec matching records created within the last `days` days.
    pub fn recent(days: i64) -> Self {
        let mut query = Self::new();
        query.from_date = Some(Utc::now() - Duration::days(days));
        query
    }

    /// Restrict to records containing `term` as a case-insensitive substring
    /// of any searchable field. Empty or absent terms are ignored.
    pub fn search_term(mut self, term: Option<&str>) -> Self {
        self.search_term = non_empty(term);
        self
    }

    /// Restrict to records with exactly this experiment name.
    pub fn for_experiment(mut self, experiment: Option<&str>) -> Self {
        self.experiment = non_empty(experiment);
        self
    }

    /// Restrict to records with exactly this PHP version.
    pub fn for_php_version(mut self, version: Option<&str>) -> Self {
        self.php_version = non_empty(version);
        self
    }

    /// Restrict to records with exactly this Vanguard version.
    pub fn for_vanguard_version(mut self, version: Option<&str>) -> Self {
        self.vanguard_version = non_empty(version);
        self
    }

    /// Restrict to records whose email address ends with `@<domain>`.
    pub fn from_email_domain(mut self, domain: Option<&str>) -> Self {
        self.email_domain = non_empty(domain);
        self
    }

    /// Restrict on email presence from a raw `has_email` parameter.
    ///
    /// Applied whenever the parameter is present: a true value keeps only
    /// records with an email address, anything else keeps only records
    /// without one.
    pub fn with_email_presence(mut self, raw: Option<&str>) -> Self {
        self.has_email = raw.map(parse_bool_param);
        self
    }

    /// Restrict to records created at or after `from`.
    pub fn created_from(mut self, from: Option<DateTime<Utc>>) -> Self {
        self.from_date = from;
        self
    }

    /// Restrict to records created at or before `to`.
    pub fn created_until(mut self, to: Option<DateTime<Utc>>) -> Self {
        self.to_date = to;
        self
    }

    /// Apply a resolved sort clause.
    pub fn sorted(mut self, sort: Sort) -> Self {
        self.sort = sort;
        self
    }

    /// Apply a page request.
    pub fn paged(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Active free-text term, if any.
    pub fn term(&self) -> Option<&str> {
        self.search_term.as_deref()
    }

    /// Active exact experiment filter, if any.
    pub fn experiment(&self) -> Option<&str> {
        self.experiment.as_deref()
    }

    /// Active exact PHP version filter, if any.
    pub fn php_version(&self) -> Option<&str> {
        self.php_version.as_deref()
    }

    /// Active exact Vanguard version filter, if any.
    pub fn vanguard_version(&self) -> Option<&str> {
        self.vanguard_version.as_deref()
    }

    /// Active email-domain filter, if any.
    pub fn email_domain(&self) -> Option<&str> {
        self.email_domain.as_deref()
    }

    /// Active email-presence filter, if any.
    pub fn has_email(&self) -> Option<bool> {
        self.has_email
    }

    /// Active lower creation-time bound, if any.
    pub fn from_date(&self) -> Option<DateTime<Utc>> {
        self.from_date
    }

    /// Active upper creation-time bound, if any.
    pub fn to_date(&self) -> Option<DateTime<Utc>> {
        self.to_date
    }

    /// Resolved sort clause.
    pub fn sort(&self) -> Sort {
        self.sort
    }

    /// Resolved page request.
    pub fn page(&self) -> PageRequest {
        self.page
    }

    /// Reference filter semantics: whether one record satisfies every active
    /// filter of this spec.
    pub fn matches(&self, record: &Feedback) -> bool {
        self.matches_term(record)
            && matches_exact(self.experiment.as_deref(), record.experiment())
            && matches_exact(self.php_version.as_deref(), record.php_version())
            && matches_exact(self.vanguard_version.as_deref(), record.vanguard_version())
            && self.matches_email_domain(record)
            && self.matches_email_presence(record)
            && self.matches_date_range(record)
    }

    /// Reference sort semantics: ordering of two records under this spec,
    /// with a stable ascending `id` tie-break.
    pub fn compare(&self, a: &Feedback, b: &Feedback) -> std::cmp::Ordering {
        let ordering = match self.sort.field {
            SortField::CreatedAt => a.created_at().cmp(&b.created_at()),
            SortField::Experiment => a.experiment().cmp(b.experiment()),
            SortField::PhpVersion => a.php_version().cmp(b.php_version()),
            SortField::VanguardVersion => a.vanguard_version().cmp(b.vanguard_version()),
        };
        let ordering = match self.sort.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        };
        ordering.then_with(|| a.id().cmp(&b.id()))
    }

    fn matches_term(&self, record: &Feedback) -> bool {
        let Some(term) = self.search_term.as_deref() else {
            return true;
        };
        let needle = term.to_lowercase();
        let mut haystacks = [
            Some(record.experiment()),
            Some(record.feedback()),
            Some(record.php_version()),
            Some(record.vanguard_version()),
            record.email_address(),
        ]
        .into_iter()
        .flatten();
        haystacks.any(|value| value.to_lowercase().contains(&needle))
    }

    fn matches_email_domain(&self, record: &Feedback) -> bool {
        let Some(domain) = self.email_domain.as_deref() else {
            return true;
        };
        let suffix = format!("@{domain}");
        record
            .email_address()
            .is_some_and(|address| address.ends_with(&suffix))
    }

    fn matches_email_presence(&self, record: &Feedback) -> bool {
        self.has_email
            .is_none_or(|wanted| record.has_email_address() == wanted)
    }

    fn matches_date_range(&self, record: &Feedback) -> bool {
        let after_from = self
            .from_date
            .is_none_or(|from| record.created_at() >= from);
        let before_to = self.to_date.is_none_or(|to| record.created_at() <= to);
        after_from && before_to
    }
}

fn matches_exact(filter: Option<&str>, value: &str) -> bool {
    filter.is_none_or(|wanted| wanted == value)
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.filter(|raw| !raw.is_empty()).map(str::to_owned)
}
