//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::info;

use social_backend::domain::FixedWindowLimiter;
use social_backend::inbound::http::health::{HealthState, live, ready};
use social_backend::inbound::http::state::HttpState;
use social_backend::inbound::http::users::{activate_user, get_user, json_config, register_user};
use social_backend::{Admission, Trace};

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    limiter: Option<Arc<FixedWindowLimiter>>,
    trust_forwarded_headers: bool,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        limiter,
        trust_forwarded_headers,
    } = deps;

    let admission = limiter
        .map_or_else(Admission::disabled, Admission::new)
        .trust_forwarded_headers(trust_forwarded_headers);
    let api = web::scope("/v1")
        .wrap(admission)
        .app_data(json_config())
        .service(register_user)
        .service(activate_user)
        .service(get_user);

    App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live)
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// Readiness is marked once the listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let ServerConfig {
        bind_addr,
        http_state,
        limiter,
        trust_forwarded_headers,
    } = config;
    let deps = AppDependencies {
        health_state: health_state.clone(),
        http_state: web::Data::new(http_state),
        limiter,
        trust_forwarded_headers,
    };

    let server = HttpServer::new(move || build_app(deps.clone()))
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    info!(%bind_addr, "http server listening");
    Ok(server)
}
