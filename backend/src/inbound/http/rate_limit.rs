//! Fixed-window rate limiting for the public submission endpoint.
//!
//! Counters are kept in process memory, keyed by client IP, and pruned
//! opportunistically whenever a request is checked. Requests beyond the
//! limit are rejected with the 429 envelope before validation runs.

use std::collections::HashMap;
use std::env;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{Error as ActixError, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::warn;

use crate::domain::Error;
use crate::inbound::http::error::ApiError;

/// Fallback client key when no peer address is known.
const UNKNOWN_CLIENT: &str = "unknown";

/// Policy for the submission rate limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Accepted requests per client per window.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    /// Build a policy from explicit values.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }

    /// Load the policy from `RATE_LIMIT_RPM` and `RATE_LIMIT_PERIOD`
    /// (seconds), falling back to 5 requests per 60-second window.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let max_requests = env::var("RATE_LIMIT_RPM")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(defaults.max_requests);
        let window = env::var("RATE_LIMIT_PERIOD")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map_or(defaults.window, Duration::from_secs);
        Self {
            max_requests,
            window,
        }
    }
}

/// Middleware enforcing a fixed-window limit per client identity.
///
/// Clone the value into each worker's app factory: clones share one counter
/// map, so the limit holds across workers in the same process.
#[derive(Clone)]
pub struct RateLimit {
    config: RateLimitConfig,
    counters: Arc<Mutex<HashMap<String, (u32, Instant)>>>,
}

impl RateLimit {
    /// Create a limiter with the given policy.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            counters: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Record an attempt for `key` and report whether it is allowed.
    ///
    /// Expired windows are pruned on every call so the map stays bounded by
    /// the number of distinct clients seen within one window.
    fn check(&self, key: &str) -> bool {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let now = Instant::now();
        let window = self.config.window;
        counters.retain(|_, (_, started)| now.duration_since(*started) < window);

        match counters.get_mut(key) {
            Some((count, _)) if *count >= self.config.max_requests => false,
            Some((count, _)) => {
                *count += 1;
                true
            }
            None => {
                counters.insert(key.to_owned(), (1, now));
                true
            }
        }
    }
}

fn client_key(req: &ServiceRequest) -> String {
    let connection_info = req.connection_info();
    connection_info
        .realip_remote_addr()
        .map_or_else(|| UNKNOWN_CLIENT.to_owned(), str::to_owned)
}

impl<S, B> Transform<S, ServiceRequest> for RateLimit
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type InitError = ();
    type Transform = RateLimitMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddleware {
            service,
            limiter: self.clone(),
        }))
    }
}

/// Service wrapper produced by [`RateLimit`].
///
/// Applications should not use this type directly.
pub struct RateLimitMiddleware<S> {
    service: S,
    limiter: RateLimit,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddleware<S>
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
        let key = client_key(&req);
        if !self.limiter.check(&key) {
            warn!(client = %key, "submission rate limit exceeded");
            let response = ApiError::from(Error::too_many_requests(
                "Too many feedback submissions. Please retry later.",
            ))
            .error_response()
            .map_into_right_body();
            let (req, _payload) = req.into_parts();
            return Box::pin(ready(Ok(ServiceResponse::new(req, response))));
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
