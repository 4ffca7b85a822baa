//! Document models persisted in the employee collection.

pub mod employee;

pub use bson::oid::ObjectId;
pub use employee::{Employee, EmployeeChanges, NewEmployee};
