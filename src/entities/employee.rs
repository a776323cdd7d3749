//! Employee entity - A person who may own computers.
//!
//! Employees are looked up externally by their abbreviation; both the abbreviation and
//! the email address are unique.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Employee database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    /// Unique identifier for the employee
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address, unique across employees
    #[sea_orm(unique)]
    pub email: String,
    /// Short external lookup key (e.g., "JAD"), unique across employees
    #[sea_orm(unique)]
    pub abbreviation: String,
    /// When the employee was created
    pub created_at: DateTimeUtc,
    /// When the employee was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Employee and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One employee owns many computers through ownership links
    #[sea_orm(has_many = "super::employee_computer::Entity")]
    EmployeeComputer,
}

impl Related<super::employee_computer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeComputer.def()
    }
}

impl Related<super::computer::Entity> for Entity {
    fn to() -> RelationDef {
        super::employee_computer::Relation::Computer.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::employee_computer::Relation::Employee.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
