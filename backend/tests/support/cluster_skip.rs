//! Policy for suites that need an embedded PostgreSQL cluster.
//!
//! Clusters are optional by default: when one cannot be started the suite
//! prints a `SKIP-TEST-CLUSTER` marker and returns early. Setting
//! `REQUIRE_TEST_CLUSTER` to a truthy value turns setup failures into test
//! failures, which is what CI should do.

/// Truthy values: "1", "true", "yes" (case-insensitive).
pub fn test_cluster_required() -> bool {
    std::env::var("REQUIRE_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Report a setup failure according to the cluster policy.
///
/// Returns `None` after printing the skip marker, or panics when a cluster
/// is required.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if test_cluster_required() {
        panic!("Test cluster setup failed: {reason}. Unset REQUIRE_TEST_CLUSTER to skip.");
    }
    eprintln!("SKIP-TEST-CLUSTER: {reason}");
    None
}
