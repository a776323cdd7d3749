//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod computer;
pub mod employee;
pub mod employee_computer;

// Re-export specific types to avoid conflicts
pub use computer::{Column as ComputerColumn, Entity as Computer, Model as ComputerModel};
pub use employee::{Column as EmployeeColumn, Entity as Employee, Model as EmployeeModel};
pub use employee_computer::{
    Column as EmployeeComputerColumn, Entity as EmployeeComputer, Model as EmployeeComputerModel,
};
