//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the feedback API: the three feedback endpoints, the health probes, the
//! root metadata payload, and the `X-API-Key` security scheme. The
//! generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode};
use crate::inbound::http::error::ApiError;
use crate::inbound::http::feedback::{
    FeedbackResponse, SubmitFeedbackRequest, SubmitFeedbackResponse,
};

/// Enrich the generated document with the API key security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "ApiKey",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "X-API-Key",
                "Shared secret required by the feedback read endpoints.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Experiment feedback API",
        description = "Collects, filters, and paginates user feedback on experiments."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::feedback::submit_feedback,
        crate::inbound::http::feedback::list_feedback,
        crate::inbound::http::feedback::search_feedback,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
        crate::inbound::http::service_info::service_info,
    ),
    components(schemas(
        SubmitFeedbackRequest,
        SubmitFeedbackResponse,
        FeedbackResponse,
        ApiError,
        Error,
        ErrorCode,
    )),
    tags(
        (name = "feedback", description = "Submitting and exploring experiment feedback"),
        (name = "health", description = "Endpoints for health checks"),
        (name = "meta", description = "Service metadata")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_registers_the_feedback_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;

        assert!(paths.contains_key("/api/feedback"));
        assert!(paths.contains_key("/api/feedback/search"));
        assert!(paths.contains_key("/health/ready"));
    }

    #[test]
    fn openapi_document_registers_the_response_schema() {
        let doc = ApiDoc::openapi();
        let components = doc.components.as_ref().expect("components");

        assert!(components.schemas.contains_key("FeedbackResponse"));
        assert!(components.schemas.contains_key("SubmitFeedbackRequest"));
    }
}
