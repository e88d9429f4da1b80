//! Feedback API library modules.
//!
//! A small REST service collecting, filtering, and paginating user feedback
//! on experiments. Layout is hexagonal: `domain` holds entities, validation,
//! the query pipeline, and ports; `inbound::http` adapts HTTP onto the
//! domain; `outbound::persistence` implements the repository port over
//! PostgreSQL; `server` wires everything together.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request tracing middleware re-exported for app assembly.
pub use middleware::Trace;
