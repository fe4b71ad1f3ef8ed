//! Embedded PostgreSQL helpers shared by the Diesel adapter suites.
//!
//! Each test gets a fresh database on one shared cluster, migrated with the
//! same embedded migrations the server runs at startup. Set
//! `SKIP_TEST_CLUSTER=1` where the cluster cannot start.

use std::time::Duration;

use grievances::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use pg_embedded_setup_unpriv::{ClusterHandle, TemporaryDatabase};
use tokio::runtime::Runtime;

const SHARED_CLUSTER_RETRIES: usize = 5;
const SHARED_CLUSTER_RETRY_DELAY: Duration = Duration::from_millis(500);

/// A migrated scratch database plus the runtime that drives its pool.
pub struct MigratedDatabase {
    pub runtime: Runtime,
    pub pool: DbPool,
    pub url: String,
    _database: TemporaryDatabase,
}

fn should_skip_test_cluster() -> bool {
    std::env::var("SKIP_TEST_CLUSTER")
        .map(|value| matches!(value.to_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

/// Print a skip marker under `SKIP_TEST_CLUSTER`, otherwise fail loudly.
pub fn handle_cluster_setup_failure<T>(reason: impl std::fmt::Display) -> Option<T> {
    if should_skip_test_cluster() {
        eprintln!("SKIP-TEST-CLUSTER: {reason}");
        None
    } else {
        panic!("Test cluster setup failed: {reason}. Set SKIP_TEST_CLUSTER=1 to skip.");
    }
}

fn shared_cluster() -> Result<&'static ClusterHandle, String> {
    if std::env::var_os("PG_PASSWORD").is_none() {
        // SAFETY: runs before the cluster bootstrap spawns any threads.
        unsafe {
            std::env::set_var("PG_PASSWORD", "grievances_embedded_test");
        }
    }
    let mut attempt = 1;
    loop {
        match pg_embedded_setup_unpriv::test_support::shared_cluster_handle() {
            Ok(handle) => return Ok(handle),
            Err(error) if attempt >= SHARED_CLUSTER_RETRIES => return Err(error.to_string()),
            Err(_) => {
                std::thread::sleep(SHARED_CLUSTER_RETRY_DELAY);
                attempt += 1;
            }
        }
    }
}

/// Create a scratch database, apply migrations, and open a small pool.
pub fn migrated_database(max_connections: u32) -> Result<MigratedDatabase, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = cluster
        .temporary_database(format!("grievances_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|err| format!("create database: {err:?}"))?;
    let url = database.url().to_owned();

    let pool = runtime.block_on(async {
        run_pending_migrations(&url)
            .await
            .map_err(|err| format!("migrate: {err}"))?;
        DbPool::new(
            PoolConfig::new(url.as_str())
                .with_max_size(max_connections)
                .with_min_idle(Some(1)),
        )
        .await
        .map_err(|err| format!("pool: {err}"))
    })?;

    Ok(MigratedDatabase {
        runtime,
        pool,
        url,
        _database: database,
    })
}
