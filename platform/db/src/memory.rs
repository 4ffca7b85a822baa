use std::collections::BTreeMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use entity::{Employee, EmployeeChanges, NewEmployee};
use tokio::sync::RwLock;

use crate::{DbResult, EmployeeStore};

/// In-process employee store for tests and `serve --in-memory`.
///
/// Timestamps are truncated to milliseconds on write so documents read back the
/// same way they would from MongoDB.
#[derive(Debug, Default)]
pub struct MemoryEmployeeStore {
    employees: RwLock<BTreeMap<ObjectId, Employee>>,
}

impl MemoryEmployeeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.employees.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.employees.read().await.is_empty()
    }
}

fn truncate_millis(value: chrono::DateTime<chrono::Utc>) -> chrono::DateTime<chrono::Utc> {
    bson::DateTime::from_chrono(value).to_chrono()
}

#[async_trait]
impl EmployeeStore for MemoryEmployeeStore {
    async fn insert(&self, mut employee: NewEmployee) -> DbResult<Employee> {
        employee.hire_date = truncate_millis(employee.hire_date);
        let stored = employee.into_employee(ObjectId::new());
        self.employees
            .write()
            .await
            .insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find(&self, id: ObjectId) -> DbResult<Option<Employee>> {
        Ok(self.employees.read().await.get(&id).cloned())
    }

    async fn list(&self) -> DbResult<Vec<Employee>> {
        Ok(self.employees.read().await.values().cloned().collect())
    }

    async fn update(&self, id: ObjectId, mut changes: EmployeeChanges) -> DbResult<Option<Employee>> {
        changes.hire_date = changes.hire_date.map(truncate_millis);
        let mut employees = self.employees.write().await;
        Ok(employees.get_mut(&id).map(|employee| {
            changes.apply(employee);
            employee.clone()
        }))
    }

    async fn delete(&self, id: ObjectId) -> DbResult<bool> {
        Ok(self.employees.write().await.remove(&id).is_some())
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}
