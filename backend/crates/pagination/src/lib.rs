//! Page-number pagination primitives shared by the feedback API's read
//! endpoints.
//!
//! The endpoints paginate with `page`/`per_page` query parameters and return
//! a `data`/`links`/`meta` envelope. This crate owns the parameter parsing
//! (including the clamp rules), the page metadata arithmetic, and the
//! construction of adjacent-page links so both endpoints stay in lockstep.

use serde::{Deserialize, Serialize};
use url::Url;

/// Page size applied when `per_page` is absent or unusable.
pub const DEFAULT_PER_PAGE: u64 = 15;

/// Upper bound for `per_page`; larger requests are clamped to this value.
pub const MAX_PER_PAGE: u64 = 100;

/// Requested slice of a result set: a 1-based page number and a page size.
///
/// Construction clamps the values so downstream code never sees a page below
/// 1 or a page size outside `[1, MAX_PER_PAGE]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    per_page: u64,
}

impl PageRequest {
    /// Build a request from already-numeric values, applying the clamp rules.
    ///
    /// A `per_page` of zero falls back to [`DEFAULT_PER_PAGE`]; values above
    /// [`MAX_PER_PAGE`] clamp down to it. A `page` of zero becomes 1.
    #[must_use]
    pub fn new(page: u64, per_page: u64) -> Self {
        let per_page = if per_page == 0 {
            DEFAULT_PER_PAGE
        } else {
            per_page.min(MAX_PER_PAGE)
        };
        Self {
            page: page.max(1),
            per_page,
        }
    }

    /// Parse raw query-string values.
    ///
    /// `per_page` values that are absent, non-numeric, or below 1 fall back
    /// to [`DEFAULT_PER_PAGE`]; values above [`MAX_PER_PAGE`] clamp to it.
    /// `page` values that are absent, non-numeric, or below 1 become 1.
    #[must_use]
    pub fn from_params(page: Option<&str>, per_page: Option<&str>) -> Self {
        let per_page = per_page
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|value| *value >= 1)
            .map_or(DEFAULT_PER_PAGE, |value| value.min(MAX_PER_PAGE));
        let page = page
            .and_then(|raw| raw.trim().parse::<u64>().ok())
            .filter(|value| *value >= 1)
            .unwrap_or(1);
        Self { page, per_page }
    }

    /// 1-based page number.
    #[must_use]
    pub fn page(&self) -> u64 {
        self.page
    }

    /// Number of records per page.
    #[must_use]
    pub fn per_page(&self) -> u64 {
        self.per_page
    }

    /// Number of records to skip before this page starts.
    #[must_use]
    pub fn offset(&self) -> u64 {
        (self.page - 1) * self.per_page
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

/// Count metadata accompanying a page of records.
///
/// `from`/`to` are 1-based positions of the first and last record on the
/// page within the full filtered set, or `null` for an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// 1-based page number of this page.
    pub current_page: u64,
    /// Page size the response was sliced with.
    pub per_page: u64,
    /// Total number of records matching the query across all pages.
    pub total: u64,
    /// Number of the final page (at least 1, even for an empty set).
    pub last_page: u64,
    /// Position of the first record on this page, if any.
    pub from: Option<u64>,
    /// Position of the last record on this page, if any.
    pub to: Option<u64>,
}

impl PageMeta {
    /// Derive metadata from the request, the total match count, and the
    /// number of records actually on this page.
    #[must_use]
    pub fn new(request: PageRequest, total: u64, items_on_page: u64) -> Self {
        let last_page = total.div_ceil(request.per_page()).max(1);
        let offset = request.offset();
        Self {
            current_page: request.page(),
            per_page: request.per_page(),
            total,
            last_page,
            from: (items_on_page > 0).then(|| offset + 1),
            to: (items_on_page > 0).then(|| offset + items_on_page),
        }
    }
}

/// Failure to construct pagination links.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The request URL the links derive from could not be parsed.
    #[error("invalid pagination base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
}

/// Absolute links to the first, last, and adjacent pages.
///
/// Every link reuses the base URL's query string with only the `page`
/// parameter replaced, so active filters survive page navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    /// Link to page 1.
    pub first: String,
    /// Link to the final page.
    pub last: String,
    /// Link to the previous page, absent on the first page.
    pub prev: Option<String>,
    /// Link to the next page, absent on the final page.
    pub next: Option<String>,
}

impl PageLinks {
    /// Build links for the given metadata from the request URL.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidBaseUrl`] when `base_url` is not an
    /// absolute URL.
    pub fn build(base_url: &str, meta: &PageMeta) -> Result<Self, LinkError> {
        let base = Url::parse(base_url)?;
        let prev = (meta.current_page > 1).then(|| with_page(&base, meta.current_page - 1));
        let next =
            (meta.current_page < meta.last_page).then(|| with_page(&base, meta.current_page + 1));
        Ok(Self {
            first: with_page(&base, 1),
            last: with_page(&base, meta.last_page),
            prev,
            next,
        })
    }
}

/// Envelope returned by paginated endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    /// Records on this page.
    pub data: Vec<T>,
    /// Navigation links for this result set.
    pub links: PageLinks,
    /// Count metadata for this result set.
    pub meta: PageMeta,
}

impl<T> Paginated<T> {
    /// Assemble an envelope from a page of records and the total match count.
    ///
    /// # Errors
    ///
    /// Returns [`LinkError::InvalidBaseUrl`] when `base_url` cannot be
    /// parsed into links.
    pub fn new(
        data: Vec<T>,
        total: u64,
        request: PageRequest,
        base_url: &str,
    ) -> Result<Self, LinkError> {
        let items_on_page = u64::try_from(data.len()).unwrap_or(u64::MAX);
        let meta = PageMeta::new(request, total, items_on_page);
        let links = PageLinks::build(base_url, &meta)?;
        Ok(Self { data, links, meta })
    }
}

/// Clone the base URL with the `page` query parameter set to `page`,
/// preserving every other query parameter.
fn with_page(base: &Url, page: u64) -> String {
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key.as_ref() != "page")
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();
    let mut url = base.clone();
    url.set_query(None);
    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in &retained {
            pairs.append_pair(key, value);
        }
        pairs.append_pair("page", &page.to_string());
    }
    url.to_string()
}
