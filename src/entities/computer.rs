//! Computer entity - Represents one physical machine tracked by the inventory.
//!
//! The `employee_abbrev` column is a denormalized owner hint used for quota counting;
//! the authoritative owner is the row in `employee_computers` keyed by this computer's id.
//! Serialized models are what the cache tier stores, so the serde field names are part
//! of the cached payload format.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Computer database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "computers")]
pub struct Model {
    /// Store-assigned unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Hardware MAC address, unique across all computers
    #[sea_orm(unique)]
    pub mac_address: String,
    /// Human-readable machine name (e.g., "Desk1")
    pub computer_name: String,
    /// IP address of the machine
    pub ip_address: String,
    /// Abbreviation of the owning employee, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employee_abbrev: Option<String>,
    /// Free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When the computer was created
    pub created_at: DateTimeUtc,
    /// When the computer was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Computer and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One computer has at most one canonical ownership link
    #[sea_orm(has_many = "super::employee_computer::Entity")]
    EmployeeComputer,
}

impl Related<super::employee_computer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployeeComputer.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        super::employee_computer::Relation::Employee.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::employee_computer::Relation::Computer.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
