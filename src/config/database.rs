//! Database configuration module.
//!
//! This module handles the `SQLite` connection and table creation using `SeaORM`.
//! Tables are generated from the entity definitions with `Schema::create_table_from_entity`,
//! so the unique constraints declared on the entities (MAC address, email, abbreviation,
//! one ownership link per computer) are enforced by the store itself.

use crate::entities::{Computer, Employee, EmployeeComputer};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/computer_inventory.sqlite?mode=rwc";

/// Gets the database URL from the `DATABASE_URL` environment variable, falling back to
/// a local `SQLite` file.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
}

/// Establishes a connection to the database named by [`get_database_url`].
///
/// The returned connection is a pool; it is created once at startup and handed to
/// everything that needs the store.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    debug!("Connecting to database at {}", database_url);
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates the employee, computer, and ownership-link tables if they do not exist yet.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    // Link table last: it references the other two.
    let mut employee_table = schema.create_table_from_entity(Employee);
    let mut computer_table = schema.create_table_from_entity(Computer);
    let mut link_table = schema.create_table_from_entity(EmployeeComputer);

    employee_table.if_not_exists();
    computer_table.if_not_exists();
    link_table.if_not_exists();

    db.execute(builder.build(&employee_table)).await?;
    db.execute(builder.build(&computer_table)).await?;
    db.execute(builder.build(&link_table)).await?;

    info!("Database tables ready");
    Ok(())
}
