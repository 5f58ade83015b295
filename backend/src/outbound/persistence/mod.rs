//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repositories translate between Diesel rows and domain types and nothing
//! more. Row structs (`models.rs`) and table definitions (`schema.rs`) stay
//! private to this module; callers only see the port implementations and
//! the pool.
//!
//! # Example
//!
//! ```no_run
//! use social_backend::outbound::persistence::{
//!     DbPool, DieselUserLifecycleRepository, PoolConfig,
//! };
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/social")).await?;
//! let repository = DieselUserLifecycleRepository::new(pool);
//! # let _ = repository;
//! # Ok(())
//! # }
//! ```

mod diesel_error_mapping;
mod diesel_user_lifecycle_repository;
mod models;
mod pool;
mod schema;

pub use diesel_user_lifecycle_repository::{DEFAULT_QUERY_TIMEOUT, DieselUserLifecycleRepository};
pub use pool::{DbPool, PoolConfig, PoolError};
