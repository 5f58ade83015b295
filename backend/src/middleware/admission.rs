//! Per-client admission control.
//!
//! Requests are keyed by the IP address of the connected peer. Forwarding
//! headers (`Forwarded`, `X-Forwarded-For`) are client-controlled and only
//! consulted when the service runs behind a trusted proxy, see
//! [`Admission::trust_forwarded_headers`]. Denied requests never reach the
//! wrapped service; they receive `429 Too Many Requests` with a
//! `Retry-After` header in whole seconds.

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::RETRY_AFTER;
use actix_web::{Error, ResponseError};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::debug;

use crate::domain::{AdmissionDecision, Error as DomainError, FixedWindowLimiter};

/// Key used when the peer address is unavailable.
const UNKNOWN_CLIENT: &str = "unknown";

/// Admission middleware backed by a [`FixedWindowLimiter`].
///
/// # Examples
/// ```
/// use std::sync::Arc;
/// use actix_web::App;
/// use social_backend::Admission;
/// use social_backend::domain::{FixedWindowLimiter, LimiterConfig};
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let limiter = Arc::new(FixedWindowLimiter::new(LimiterConfig::default()));
/// let _app = App::new().wrap(Admission::new(limiter));
/// # });
/// ```
#[derive(Clone, Default)]
pub struct Admission {
    limiter: Option<Arc<FixedWindowLimiter>>,
    trust_forwarded: bool,
}

impl Admission {
    pub fn new(limiter: Arc<FixedWindowLimiter>) -> Self {
        Self {
            limiter: Some(limiter),
            trust_forwarded: false,
        }
    }

    /// Admit every request.
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Key clients on the address reported by forwarding headers.
    ///
    /// Only safe when a reverse proxy in front of the service overwrites
    /// those headers; otherwise any client can pick its own key.
    #[must_use]
    pub fn trust_forwarded_headers(mut self, trust: bool) -> Self {
        self.trust_forwarded = trust;
        self
    }
}

impl<S, B> Transform<S, ServiceRequest> for Admission
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AdmissionMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AdmissionMiddleware {
            service,
            limiter: self.limiter.clone(),
            trust_forwarded: self.trust_forwarded,
        }))
    }
}

/// Service wrapper produced by [`Admission`].
pub struct AdmissionMiddleware<S> {
    service: S,
    limiter: Option<Arc<FixedWindowLimiter>>,
    trust_forwarded: bool,
}

/// Client key for `req`: the IP of the connected peer, or of the
/// forwarded client when forwarding headers are trusted.
fn client_key(req: &ServiceRequest, trust_forwarded: bool) -> String {
    if trust_forwarded {
        let info = req.connection_info();
        if let Some(raw) = info.realip_remote_addr() {
            return normalise_address(raw);
        }
    }
    req.peer_addr()
        .map_or_else(|| UNKNOWN_CLIENT.to_owned(), |addr| addr.ip().to_string())
}

/// Strip the port from `raw` when it parses as an address.
fn normalise_address(raw: &str) -> String {
    if let Ok(addr) = raw.parse::<SocketAddr>() {
        return addr.ip().to_string();
    }
    raw.parse::<IpAddr>()
        .map_or_else(|_| raw.to_owned(), |ip| ip.to_string())
}

/// Whole seconds for the `Retry-After` header, never less than one.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

impl<S, B> Service<ServiceRequest> for AdmissionMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let decision = self.limiter.as_ref().map(|limiter| {
            let client = client_key(&req, self.trust_forwarded);
            (limiter.allow(&client), client)
        });

        if let Some((AdmissionDecision::Denied { retry_after }, client)) = decision {
            let seconds = retry_after_secs(retry_after);
            debug!(%client, retry_after = seconds, "request denied");
            return Box::pin(async move {
                let error = DomainError::too_many_requests("rate limit exceeded");
                let mut response = error.error_response();
                response
                    .headers_mut()
                    .insert(RETRY_AFTER, seconds.into());
                Ok(req.into_response(response).map_into_right_body())
            });
        }

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
