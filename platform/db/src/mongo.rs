use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use entity::{Employee, EmployeeChanges, NewEmployee};
use futures::TryStreamExt;
use mongodb::{Collection, options::ReturnDocument};
use tracing::instrument;

use crate::{DbError, DbPool, DbResult, EmployeeStore};

/// Employee store backed by a MongoDB collection.
#[derive(Clone, Debug)]
pub struct MongoEmployeeStore {
    db: DbPool,
    employees: Collection<Employee>,
}

impl MongoEmployeeStore {
    pub fn new(db: &DbPool, collection: &str) -> Self {
        Self {
            db: db.clone(),
            employees: db.collection(collection),
        }
    }
}

#[async_trait]
impl EmployeeStore for MongoEmployeeStore {
    #[instrument(name = "db.employees.insert", skip_all)]
    async fn insert(&self, employee: NewEmployee) -> DbResult<Employee> {
        let result = self
            .employees
            .clone_with_type::<NewEmployee>()
            .insert_one(&employee)
            .await?;
        let id = result.inserted_id.as_object_id().ok_or(DbError::UnexpectedId)?;
        self.find(id).await?.ok_or(DbError::MissingAfterInsert(id))
    }

    #[instrument(name = "db.employees.find", skip(self))]
    async fn find(&self, id: ObjectId) -> DbResult<Option<Employee>> {
        Ok(self.employees.find_one(doc! { "_id": id }).await?)
    }

    #[instrument(name = "db.employees.list", skip(self))]
    async fn list(&self) -> DbResult<Vec<Employee>> {
        let cursor = self.employees.find(doc! {}).await?;
        Ok(cursor.try_collect::<Vec<_>>().await?)
    }

    #[instrument(name = "db.employees.update", skip(self, changes))]
    async fn update(&self, id: ObjectId, changes: EmployeeChanges) -> DbResult<Option<Employee>> {
        if changes.is_empty() {
            return self.find(id).await;
        }
        let updated = self
            .employees
            .find_one_and_update(
                doc! { "_id": id },
                doc! { "$set": changes.to_set_document() },
            )
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    #[instrument(name = "db.employees.delete", skip(self))]
    async fn delete(&self, id: ObjectId) -> DbResult<bool> {
        let result = self.employees.delete_one(doc! { "_id": id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> DbResult<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }
}
