//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::sync::Arc;

use social_backend::domain::FixedWindowLimiter;
use social_backend::inbound::http::state::HttpState;

/// Everything the HTTP server needs besides its health state.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) http_state: HttpState,
    pub(crate) limiter: Option<Arc<FixedWindowLimiter>>,
    pub(crate) trust_forwarded_headers: bool,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, http_state: HttpState) -> Self {
        Self {
            bind_addr,
            http_state,
            limiter: None,
            trust_forwarded_headers: false,
        }
    }

    /// Apply admission control in front of the API scope.
    #[must_use]
    pub fn with_limiter(mut self, limiter: Option<Arc<FixedWindowLimiter>>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Key admission on forwarding headers set by a trusted proxy.
    #[must_use]
    pub fn with_trusted_forwarding(mut self, trust: bool) -> Self {
        self.trust_forwarded_headers = trust;
        self
    }
}
