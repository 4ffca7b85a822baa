use async_trait::async_trait;
use bson::oid::ObjectId;
use entity::{Employee, EmployeeChanges, NewEmployee};

use crate::DbResult;

/// Operations the HTTP layer needs from the employee collection.
#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Insert a document and return it as stored, including the new id.
    async fn insert(&self, employee: NewEmployee) -> DbResult<Employee>;

    async fn find(&self, id: ObjectId) -> DbResult<Option<Employee>>;

    async fn list(&self) -> DbResult<Vec<Employee>>;

    /// Apply `changes` and return the document after the update, or `None`
    /// when no document has this id.
    async fn update(&self, id: ObjectId, changes: EmployeeChanges) -> DbResult<Option<Employee>>;

    /// Returns `false` when no document has this id.
    async fn delete(&self, id: ObjectId) -> DbResult<bool>;

    /// Round trip to the backing store.
    async fn ping(&self) -> DbResult<()>;
}
