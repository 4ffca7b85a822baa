use bson::{Document, doc, oid::ObjectId, serde_helpers::chrono_datetime_as_bson_datetime};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored employee document.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct Employee {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub email: String,
    pub salary: f64,
    pub position: String,
    pub department: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub hire_date: DateTime<Utc>,
}

/// Insert payload. The identifier is left to the store.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct NewEmployee {
    pub name: String,
    pub email: String,
    pub salary: f64,
    pub position: String,
    pub department: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub hire_date: DateTime<Utc>,
}

impl NewEmployee {
    pub fn into_employee(self, id: ObjectId) -> Employee {
        Employee {
            id,
            name: self.name,
            email: self.email,
            salary: self.salary,
            position: self.position,
            department: self.department,
            hire_date: self.hire_date,
        }
    }
}

/// Partial update. `None` fields are left untouched.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EmployeeChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub salary: Option<f64>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
}

impl EmployeeChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.salary.is_none()
            && self.position.is_none()
            && self.department.is_none()
            && self.hire_date.is_none()
    }

    pub fn apply(&self, employee: &mut Employee) {
        if let Some(name) = &self.name {
            employee.name = name.clone();
        }
        if let Some(email) = &self.email {
            employee.email = email.clone();
        }
        if let Some(salary) = self.salary {
            employee.salary = salary;
        }
        if let Some(position) = &self.position {
            employee.position = position.clone();
        }
        if let Some(department) = &self.department {
            employee.department = department.clone();
        }
        if let Some(hire_date) = self.hire_date {
            employee.hire_date = hire_date;
        }
    }

    /// Body of the `$set` operator for this change set.
    pub fn to_set_document(&self) -> Document {
        let mut set = doc! {};
        if let Some(name) = &self.name {
            set.insert("name", name.as_str());
        }
        if let Some(email) = &self.email {
            set.insert("email", email.as_str());
        }
        if let Some(salary) = self.salary {
            set.insert("salary", salary);
        }
        if let Some(position) = &self.position {
            set.insert("position", position.as_str());
        }
        if let Some(department) = &self.department {
            set.insert("department", department.as_str());
        }
        if let Some(hire_date) = self.hire_date {
            set.insert("hire_date", bson::DateTime::from_chrono(hire_date));
        }
        set
    }
}
