//! API key authentication for the protected read endpoints.
//!
//! The key arrives in the `X-API-Key` header and is compared by exact string
//! equality against the configured secret. The middleware rejects before any
//! handler or query work happens. The secret itself never reaches the logs;
//! a truncated SHA-256 fingerprint is logged at startup so operators can
//! tell which key is active.

use std::task::{Context, Poll};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::domain::Error;
use crate::inbound::http::error::ApiError;

/// Header clients present the key in.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Length of the key fingerprint in bytes before hex encoding.
const FINGERPRINT_BYTES: usize = 8;

/// Configured API key secret.
///
/// The secret is zeroized on drop. Comparison requires a non-empty provided
/// value so an empty configured key can never be satisfied by an absent
/// header.
#[derive(Clone)]
pub struct ApiKey {
    secret: Zeroizing<String>,
}

impl ApiKey {
    /// Wrap a configured secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Zeroizing::new(secret.into()),
        }
    }

    /// Whether a provided header value matches the configured secret.
    pub fn matches(&self, provided: Option<&str>) -> bool {
        provided.is_some_and(|value| !value.is_empty() && value == self.secret.as_str())
    }

    /// Truncated SHA-256 fingerprint of the secret as a 16-character hex
    /// string, for startup logs and runbooks.
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        let digest = hasher.finalize();
        let truncated: Vec<u8> = digest.into_iter().take(FINGERPRINT_BYTES).collect();
        hex::encode(truncated)
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKey")
            .field("fingerprint", &self.fingerprint())
            .finish()
    }
}

/// Middleware rejecting requests without the configured API key.
#[derive(Clone)]
pub struct RequireApiKey {
    key: ApiKey,
}

impl RequireApiKey {
    /// Guard a resource with the given key.
    pub fn new(key: ApiKey) -> Self {
        Self { key }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequireApiKey
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type InitError = ();
    type Transform = RequireApiKeyMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequireApiKeyMiddleware {
            service,
            key: self.key.clone(),
        }))
    }
}

/// Service wrapper produced by [`RequireApiKey`].
///
/// Applications should not use this type directly.
pub struct RequireApiKeyMiddleware<S> {
    service: S,
    key: ApiKey,
}

impl<S, B> Service<ServiceRequest> for RequireApiKeyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let provided = req
            .headers()
            .get(API_KEY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);

        if !self.key.matches(provided.as_deref()) {
            let response = ApiError::from(Error::unauthorized("Unauthorized"))
                .error_response()
                .map_into_right_body();
            let (req, _payload) = req.into_parts();
            return Box::pin(ready(Ok(ServiceResponse::new(req, response))));
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
