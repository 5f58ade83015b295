//! Backend entry-point: loads settings, wires adapters, and serves the REST API.

mod server;

use std::sync::Arc;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultClock;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use social_backend::config::AppSettings;
use social_backend::domain::ports::{InvitationMailer, UserCache, UserLifecycleRepository};
use social_backend::domain::{AccountService, FixedWindowLimiter, InvitationPolicy, UserQueryService};
use social_backend::inbound::http::health::HealthState;
use social_backend::inbound::http::state::HttpState;
use social_backend::outbound::cache::{
    InMemoryKeyValueStore, KeyValueStore, KeyValueUserCache, RedisKeyValueStore,
};
use social_backend::outbound::mailer::LoggingInvitationMailer;
use social_backend::outbound::persistence::{DbPool, DieselUserLifecycleRepository};

use server::{ServerConfig, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = AppSettings::load().wrap_err("failed to load settings")?;
    let bind_addr = settings.bind_addr()?;

    let pool = DbPool::new(settings.pool_config())
        .await
        .wrap_err("failed to build database pool")?;
    let repository: Arc<dyn UserLifecycleRepository> = Arc::new(
        DieselUserLifecycleRepository::new(pool)
            .with_clock(Arc::new(DefaultClock))
            .with_query_timeout(settings.query_timeout()),
    );

    let cache = build_user_cache(&settings).await?;
    let users = UserQueryService::new(repository.clone()).with_cache(cache);

    let mailer: Arc<dyn InvitationMailer> =
        Arc::new(LoggingInvitationMailer::new(settings.mail_sender()));
    let accounts = AccountService::new(
        repository,
        mailer,
        InvitationPolicy::new(settings.invitation_ttl(), settings.frontend_url()),
    );

    let limiter = settings
        .limiter_config()?
        .map(|config| Arc::new(FixedWindowLimiter::new(config)));
    if limiter.is_none() {
        info!("admission control disabled");
    }

    let config = ServerConfig::new(bind_addr, HttpState::new(Arc::new(users), Arc::new(accounts)))
        .with_limiter(limiter)
        .with_trusted_forwarding(settings.trust_forwarded_headers());
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state.clone(), config)?;
    let outcome = server.await;
    health_state.mark_draining();
    outcome.wrap_err("http server failed")
}

async fn build_user_cache(settings: &AppSettings) -> Result<Arc<dyn UserCache>> {
    let store: Arc<dyn KeyValueStore> = if settings.redis_enabled() {
        Arc::new(
            RedisKeyValueStore::connect(settings.redis_url(), settings.redis_pool_size())
                .await
                .wrap_err("failed to connect to redis")?,
        )
    } else {
        info!("redis disabled; caching users in process memory");
        Arc::new(InMemoryKeyValueStore::new())
    };
    Ok(Arc::new(
        KeyValueUserCache::new(store).with_ttl(settings.user_cache_ttl()),
    ))
}
