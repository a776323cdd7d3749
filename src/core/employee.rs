//! Employee business logic - Creation, lookup, and quota counting.
//!
//! Lookups are generic over [`ConnectionTrait`] so the assignment engine can run them
//! inside its transactions.

use crate::{
    config::settings::EmployeeConfig,
    entities::{Computer, Employee, computer, employee},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, Set, prelude::*};
use serde::Deserialize;
use tracing::info;

/// Input for creating an employee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewEmployee {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Unique email address
    pub email: String,
    /// Unique short code used to assign computers
    pub abbreviation: String,
}

impl From<&EmployeeConfig> for NewEmployee {
    fn from(config: &EmployeeConfig) -> Self {
        Self {
            first_name: config.first_name.clone(),
            last_name: config.last_name.clone(),
            email: config.email.clone(),
            abbreviation: config.abbreviation.clone(),
        }
    }
}

/// Checks that every required field is present and non-blank.
pub fn validate_new_employee(new: &NewEmployee) -> Result<()> {
    let required = [
        ("first_name", &new.first_name),
        ("last_name", &new.last_name),
        ("email", &new.email),
        ("abbreviation", &new.abbreviation),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Error::Validation {
                message: format!("missing required field '{field}'"),
            });
        }
    }
    Ok(())
}

/// Validates and inserts a new employee.
///
/// # Errors
/// Returns `Validation` for blank fields and `DuplicateKey` when the email or
/// abbreviation is already taken.
pub async fn create_employee<C>(db: &C, new: NewEmployee) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    validate_new_employee(&new)?;

    let now = chrono::Utc::now();
    let employee = employee::ActiveModel {
        first_name: Set(new.first_name.trim().to_string()),
        last_name: Set(new.last_name.trim().to_string()),
        email: Set(new.email.trim().to_string()),
        abbreviation: Set(new.abbreviation.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let result = employee.insert(db).await?;
    info!(
        employee_id = result.id,
        "Created employee {}", result.abbreviation
    );
    Ok(result)
}

/// Finds an employee by abbreviation, returning None if absent.
pub async fn get_employee_by_abbreviation<C>(
    db: &C,
    abbreviation: &str,
) -> Result<Option<employee::Model>>
where
    C: ConnectionTrait,
{
    Employee::find()
        .filter(employee::Column::Abbreviation.eq(abbreviation))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds an employee by abbreviation, failing with `EmployeeNotFound` if absent.
pub async fn require_employee_by_abbreviation<C>(
    db: &C,
    abbreviation: &str,
) -> Result<employee::Model>
where
    C: ConnectionTrait,
{
    get_employee_by_abbreviation(db, abbreviation)
        .await?
        .ok_or_else(|| Error::EmployeeNotFound {
            abbreviation: abbreviation.to_string(),
        })
}

/// Looks up an employee by id.
pub async fn get_employee_by_id<C>(db: &C, employee_id: i64) -> Result<Option<employee::Model>>
where
    C: ConnectionTrait,
{
    Employee::find_by_id(employee_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Counts computers whose owner hint names `abbreviation`.
pub async fn count_computers_by_employee_abbreviation<C>(db: &C, abbreviation: &str) -> Result<u64>
where
    C: ConnectionTrait,
{
    Computer::find()
        .filter(computer::Column::EmployeeAbbrev.eq(abbreviation))
        .count(db)
        .await
        .map_err(Into::into)
}

/// Inserts every roster employee whose abbreviation is not present yet.
///
/// Returns the number of employees inserted.
pub async fn seed_employees(db: &DatabaseConnection, roster: &[EmployeeConfig]) -> Result<usize> {
    let mut inserted = 0;
    for entry in roster {
        if get_employee_by_abbreviation(db, entry.abbreviation.trim())
            .await?
            .is_some()
        {
            continue;
        }
        create_employee(db, NewEmployee::from(entry)).await?;
        inserted += 1;
    }
    info!(
        "Seeded {} of {} configured employees",
        inserted,
        roster.len()
    );
    Ok(inserted)
}
