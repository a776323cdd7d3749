//! Ownership link entity - Points a computer at its current owner.
//!
//! The primary key is `computer_id`, so the table holds at most one row per computer.
//! Reassignment updates that row in place instead of appending a new one.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ownership link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employee_computers")]
pub struct Model {
    /// The owned computer; one canonical link per computer
    #[sea_orm(primary_key, auto_increment = false)]
    pub computer_id: i64,
    /// The current owner
    pub employee_id: i64,
}

/// Defines relationships between the link and the rows it joins
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one employee
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_delete = "Cascade"
    )]
    Employee,
    /// Each link belongs to one computer
    #[sea_orm(
        belongs_to = "super::computer::Entity",
        from = "Column::ComputerId",
        to = "super::computer::Column::Id",
        on_delete = "Cascade"
    )]
    Computer,
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl Related<super::computer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Computer.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
