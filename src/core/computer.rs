//! Computer business logic - Store operations for computers and their ownership links.
//!
//! Nothing here touches the cache; these helpers are the store half of the assignment
//! engine's workflows. All of them are generic over [`ConnectionTrait`] so they can run
//! against a pooled connection or inside a transaction.

use crate::{
    entities::{Computer, EmployeeComputer, computer, employee, employee_computer},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*, sea_query::OnConflict};
use serde::Deserialize;

/// Input for creating a computer and assigning it to an employee.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewComputer {
    /// Unique hardware address
    pub mac_address: String,
    /// Host name shown in listings
    pub computer_name: String,
    /// Last known IP address
    pub ip_address: String,
    /// Abbreviation of the employee who will own the computer
    pub employee_abbrev: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Checks that every required field is present and non-blank.
pub fn validate_new_computer(new: &NewComputer) -> Result<()> {
    let required = [
        ("mac_address", &new.mac_address),
        ("computer_name", &new.computer_name),
        ("ip_address", &new.ip_address),
        ("employee_abbrev", &new.employee_abbrev),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            return Err(Error::Validation {
                message: format!("{field} is required"),
            });
        }
    }
    Ok(())
}

/// Inserts a computer row, returning the stored model.
///
/// Fails with `DuplicateKey` when the MAC address is already in use.
pub async fn insert_computer<C>(db: &C, new: &NewComputer) -> Result<computer::Model>
where
    C: ConnectionTrait,
{
    let now = chrono::Utc::now();
    let description = new
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(ToString::to_string);

    let computer = computer::ActiveModel {
        mac_address: Set(new.mac_address.trim().to_string()),
        computer_name: Set(new.computer_name.trim().to_string()),
        ip_address: Set(new.ip_address.trim().to_string()),
        employee_abbrev: Set(Some(new.employee_abbrev.trim().to_string())),
        description: Set(description),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    computer.insert(db).await.map_err(Into::into)
}

/// Looks up a computer by id.
pub async fn get_computer_by_id<C>(db: &C, computer_id: i64) -> Result<Option<computer::Model>>
where
    C: ConnectionTrait,
{
    Computer::find_by_id(computer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every computer, ordered by id.
pub async fn get_all_computers<C>(db: &C) -> Result<Vec<computer::Model>>
where
    C: ConnectionTrait,
{
    Computer::find()
        .order_by_asc(computer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the computers linked to `owner` through the ownership table, ordered by id.
pub async fn get_computers_for_employee<C>(
    db: &C,
    owner: &employee::Model,
) -> Result<Vec<computer::Model>>
where
    C: ConnectionTrait,
{
    owner
        .find_related(Computer)
        .order_by_asc(computer::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Rewrites the denormalized owner hint of a computer.
pub async fn set_employee_abbrev<C>(
    db: &C,
    computer_id: i64,
    abbreviation: Option<&str>,
) -> Result<()>
where
    C: ConnectionTrait,
{
    Computer::update_many()
        .col_expr(
            computer::Column::EmployeeAbbrev,
            Expr::value(abbreviation.map(ToString::to_string)),
        )
        .col_expr(computer::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(computer::Column::Id.eq(computer_id))
        .exec(db)
        .await?;
    Ok(())
}

/// Hard-deletes a computer row. Returns the number of rows removed.
pub async fn delete_computer_row<C>(db: &C, computer_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = Computer::delete_by_id(computer_id).exec(db).await?;
    Ok(result.rows_affected)
}

// --- Ownership links ---

/// Returns the canonical ownership link of a computer, if it has an owner.
pub async fn get_owner_link<C>(
    db: &C,
    computer_id: i64,
) -> Result<Option<employee_computer::Model>>
where
    C: ConnectionTrait,
{
    EmployeeComputer::find_by_id(computer_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Points the computer's canonical link at `employee_id`, inserting it if missing.
///
/// The upsert is keyed on `computer_id`, so concurrent callers converge on a single row.
pub async fn upsert_owner_link<C>(db: &C, computer_id: i64, employee_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    let link = employee_computer::ActiveModel {
        computer_id: Set(computer_id),
        employee_id: Set(employee_id),
    };
    EmployeeComputer::insert(link)
        .on_conflict(
            OnConflict::column(employee_computer::Column::ComputerId)
                .update_column(employee_computer::Column::EmployeeId)
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Moves an existing canonical link to `employee_id` in place.
pub async fn update_owner_link<C>(db: &C, computer_id: i64, employee_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = EmployeeComputer::update_many()
        .col_expr(
            employee_computer::Column::EmployeeId,
            Expr::value(employee_id),
        )
        .filter(employee_computer::Column::ComputerId.eq(computer_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Removes the computer's link if it points at `employee_id`. Returns rows removed.
pub async fn delete_owner_link_for<C>(db: &C, computer_id: i64, employee_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = EmployeeComputer::delete_many()
        .filter(employee_computer::Column::ComputerId.eq(computer_id))
        .filter(employee_computer::Column::EmployeeId.eq(employee_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Removes the computer's link regardless of owner. Returns rows removed.
pub async fn delete_owner_link<C>(db: &C, computer_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = EmployeeComputer::delete_by_id(computer_id).exec(db).await?;
    Ok(result.rows_affected)
}

/// Number of link rows referencing `computer_id`.
pub async fn count_owner_links<C>(db: &C, computer_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    EmployeeComputer::find()
        .filter(employee_computer::Column::ComputerId.eq(computer_id))
        .count(db)
        .await
        .map_err(Into::into)
}
