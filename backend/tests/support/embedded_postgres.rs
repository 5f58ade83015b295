//! Database helpers for suites running against embedded PostgreSQL.
//!
//! Database creation and out-of-band inspection go through the synchronous
//! `postgres` client so they never share a transaction with the code under
//! test. Schemas come from the embedded Diesel migrations.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use pg_embedded_setup_unpriv::TestCluster;
use postgres::{Client, NoTls};
use uuid::Uuid;

use super::format_postgres_error;

/// Embedded migrations from the backend/migrations directory.
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Create an empty, uniquely named database and return its URL.
pub fn create_database(cluster: &TestCluster) -> Result<String, String> {
    let name = format!("test_{}", Uuid::new_v4().simple());
    let admin_url = cluster.connection().database_url("postgres");
    let mut client = Client::connect(&admin_url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute(&format!("CREATE DATABASE \"{name}\""))
        .map_err(|err| format_postgres_error(&err))?;
    Ok(cluster.connection().database_url(&name))
}

/// Run all pending Diesel migrations against `url`.
pub fn migrate_schema(url: &str) -> Result<(), String> {
    let mut conn = PgConnection::establish(url).map_err(|err| format!("{err:?}"))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|err| format!("migration: {err:?}"))?;
    Ok(())
}

/// Open an inspection client.
pub fn inspector(url: &str) -> Client {
    Client::connect(url, NoTls)
        .unwrap_or_else(|err| panic!("connect inspector: {}", format_postgres_error(&err)))
}

/// Run `sql` out of band, panicking with the database message on failure.
pub fn execute(url: &str, sql: &str) {
    inspector(url)
        .batch_execute(sql)
        .unwrap_or_else(|err| panic!("execute {sql}: {}", format_postgres_error(&err)));
}

/// `SELECT COUNT(*)` over `table` with an optional `WHERE` clause.
pub fn count_rows(url: &str, table: &str, filter: Option<&str>) -> i64 {
    let sql = match filter {
        Some(filter) => format!("SELECT COUNT(*) FROM {table} WHERE {filter}"),
        None => format!("SELECT COUNT(*) FROM {table}"),
    };
    inspector(url)
        .query_one(sql.as_str(), &[])
        .map(|row| row.get::<_, i64>(0))
        .unwrap_or_else(|err| panic!("count {table}: {}", format_postgres_error(&err)))
}
