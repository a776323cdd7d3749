//! Shared test utilities.
//!
//! This module provides helpers for setting up test databases, fixtures with sensible
//! defaults, and test doubles for the cache tier and the notifier.

use crate::{
    cache::{CacheError, CacheTier, MemoryCache},
    config::settings::AssignmentSettings,
    core::{AssignmentEngine, NewComputer, NewEmployee, employee},
    entities,
    errors::{Error, Result},
    notification::{NotificationError, Notifier},
};
use sea_orm::DatabaseConnection;
use std::{
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};
use tempfile::TempDir;
use tokio::sync::Notify;
use tracing_subscriber::EnvFilter;

/// Engine wired with the in-memory cache and a recording notifier.
pub type TestEngine = AssignmentEngine<MemoryCache, RecordingNotifier>;

pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a file-backed `SQLite` database in a temporary directory.
///
/// Unlike `sqlite::memory:`, which is limited to a single pooled connection, this pool
/// hands out several connections, so transactions from concurrent tasks really overlap.
/// The returned [`TempDir`] must be kept alive for as long as the database is used.
pub async fn setup_file_test_db() -> Result<(TempDir, DatabaseConnection)> {
    let dir = TempDir::new().map_err(|e| Error::Config {
        message: format!("Failed to create temp dir: {e}"),
    })?;
    let url = format!(
        "sqlite://{}?mode=rwc",
        dir.path().join("inventory.sqlite").display()
    );
    let db = sea_orm::Database::connect(url).await?;
    crate::config::database::create_tables(&db).await?;
    Ok((dir, db))
}

/// Sets up an engine over a fresh database with default settings.
pub async fn setup_test_engine() -> Result<TestEngine> {
    let db = setup_test_db().await?;
    Ok(AssignmentEngine::new(
        db,
        MemoryCache::new(),
        RecordingNotifier::default(),
        AssignmentSettings::default(),
    ))
}

/// Employee input derived from an abbreviation.
///
/// # Defaults
/// * `first_name`: "Test"
/// * `last_name`: the abbreviation
/// * `email`: `<abbreviation lowercased>@example.com`
pub fn new_test_employee(abbreviation: &str) -> NewEmployee {
    NewEmployee {
        first_name: "Test".to_string(),
        last_name: abbreviation.to_string(),
        email: format!("{}@example.com", abbreviation.to_lowercase()),
        abbreviation: abbreviation.to_string(),
    }
}

pub async fn create_test_employee(
    db: &DatabaseConnection,
    abbreviation: &str,
) -> Result<entities::employee::Model> {
    employee::create_employee(db, new_test_employee(abbreviation)).await
}

/// Computer input owned by `employee_abbrev`.
///
/// # Defaults
/// * `computer_name`: "Desk <mac>"
/// * `ip_address`: "10.0.0.5"
/// * `description`: "Custom-built PC"
pub fn new_test_computer(mac_address: &str, employee_abbrev: &str) -> NewComputer {
    NewComputer {
        mac_address: mac_address.to_string(),
        computer_name: format!("Desk {mac_address}"),
        ip_address: "10.0.0.5".to_string(),
        employee_abbrev: employee_abbrev.to_string(),
        description: Some("Custom-built PC".to_string()),
    }
}

/// Notifier that records every call and optionally fails them.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<Mutex<Vec<(String, String)>>>,
    fail: bool,
}

impl RecordingNotifier {
    /// A notifier whose deliveries fail with a 500 status.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// `(abbreviation, message)` pairs in call order.
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn notify_system_administrator(
        &self,
        employee_abbreviation: &str,
        message: &str,
    ) -> std::result::Result<(), NotificationError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((employee_abbreviation.to_string(), message.to_string()));
        if self.fail {
            return Err(NotificationError::UnexpectedStatus { status: 500 });
        }
        Ok(())
    }
}

/// Notifier that blocks every delivery until the test releases it.
#[derive(Debug, Clone, Default)]
pub struct GatedNotifier {
    entered: Arc<Notify>,
    gate: Arc<Notify>,
}

impl GatedNotifier {
    /// Waits until a delivery is in progress.
    pub async fn wait_until_called(&self) {
        self.entered.notified().await;
    }

    /// Lets one blocked delivery succeed.
    pub fn release(&self) {
        self.gate.notify_one();
    }
}

impl Notifier for GatedNotifier {
    async fn notify_system_administrator(
        &self,
        _employee_abbreviation: &str,
        _message: &str,
    ) -> std::result::Result<(), NotificationError> {
        self.entered.notify_one();
        self.gate.notified().await;
        Ok(())
    }
}

fn backend_down() -> CacheError {
    CacheError::Backend {
        message: "connection refused".to_string(),
    }
}

/// Cache whose every operation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingCache;

impl CacheTier for FailingCache {
    async fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError> {
        Err(backend_down())
    }

    async fn set(
        &self,
        _key: &str,
        _value: Vec<u8>,
        _ttl: Duration,
    ) -> std::result::Result<(), CacheError> {
        Err(backend_down())
    }

    async fn delete(&self, _key: &str) -> std::result::Result<(), CacheError> {
        Err(backend_down())
    }
}

/// Cache that always misses and rejects writes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOnlyCache;

impl CacheTier for ReadOnlyCache {
    async fn get(&self, _key: &str) -> std::result::Result<Option<Vec<u8>>, CacheError> {
        Ok(None)
    }

    async fn set(
        &self,
        _key: &str,
        _value: Vec<u8>,
        _ttl: Duration,
    ) -> std::result::Result<(), CacheError> {
        Err(backend_down())
    }

    async fn delete(&self, _key: &str) -> std::result::Result<(), CacheError> {
        Err(backend_down())
    }
}
