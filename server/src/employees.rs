//! `/employees` resource: request/response bodies and handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use entity::{Employee, EmployeeChanges, NewEmployee, ObjectId};
use platform_api::{ApiError, ApiResult, ValidatedJson};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use validator::Validate;

use crate::http::AppState;

pub const DELETED_MESSAGE: &str = "Employee deleted successfully";
const NOT_FOUND_MESSAGE: &str = "Employee not found";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route(
            "/employees/{id}",
            get(get_employee).put(update_employee).delete(delete_employee),
        )
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEmployee {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    pub email: String,
    pub salary: f64,
    pub position: String,
    pub department: String,
    pub hire_date: Option<DateTime<Utc>>,
}

impl CreateEmployee {
    fn into_new(self, now: DateTime<Utc>) -> NewEmployee {
        NewEmployee {
            name: self.name,
            email: self.email,
            salary: self.salary,
            position: self.position,
            department: self.department,
            hire_date: self.hire_date.unwrap_or(now),
        }
    }
}

/// Partial update body. Absent and `null` fields are left unchanged.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateEmployee {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: Option<String>,
    pub email: Option<String>,
    pub salary: Option<f64>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
}

impl From<UpdateEmployee> for EmployeeChanges {
    fn from(body: UpdateEmployee) -> Self {
        Self {
            name: body.name,
            email: body.email,
            salary: body.salary,
            position: body.position,
            department: body.department,
            hire_date: body.hire_date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EmployeeResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub salary: f64,
    pub position: String,
    pub department: String,
    pub hire_date: DateTime<Utc>,
}

impl From<Employee> for EmployeeResponse {
    fn from(employee: Employee) -> Self {
        Self {
            id: employee.id.to_hex(),
            name: employee.name,
            email: employee.email,
            salary: employee.salary,
            position: employee.position,
            department: employee.department,
            hire_date: employee.hire_date,
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

fn not_found() -> ApiError {
    ApiError::not_found(NOT_FOUND_MESSAGE)
}

// A malformed id cannot name a stored document.
fn parse_id(raw: &str) -> ApiResult<ObjectId> {
    ObjectId::parse_str(raw).map_err(|_| not_found())
}

#[instrument(name = "employees.create", skip_all)]
async fn create_employee(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateEmployee>,
) -> ApiResult<(StatusCode, Json<EmployeeResponse>)> {
    let employee = state
        .store
        .insert(body.into_new(Utc::now()))
        .await
        .map_err(ApiError::internal)?;
    info!(employee_id = %employee.id, "employee created");
    Ok((StatusCode::CREATED, Json(employee.into())))
}

#[instrument(name = "employees.get", skip_all)]
async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<EmployeeResponse>> {
    let id = parse_id(&id)?;
    let employee = state
        .store
        .find(id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(not_found)?;
    Ok(Json(employee.into()))
}

#[instrument(name = "employees.list", skip_all)]
async fn list_employees(State(state): State<AppState>) -> ApiResult<Json<Vec<EmployeeResponse>>> {
    let employees = state.store.list().await.map_err(ApiError::internal)?;
    Ok(Json(employees.into_iter().map(Into::into).collect()))
}

#[instrument(name = "employees.update", skip_all)]
async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(body): ValidatedJson<UpdateEmployee>,
) -> ApiResult<Json<EmployeeResponse>> {
    let id = parse_id(&id)?;
    let changes = EmployeeChanges::from(body);
    let updated = if changes.is_empty() {
        state.store.find(id).await
    } else {
        state.store.update(id, changes).await
    }
    .map_err(ApiError::internal)?
    .ok_or_else(not_found)?;
    info!(employee_id = %updated.id, "employee updated");
    Ok(Json(updated.into()))
}

#[instrument(name = "employees.delete", skip_all)]
async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<MessageResponse>> {
    let id = parse_id(&id)?;
    if !state.store.delete(id).await.map_err(ApiError::internal)? {
        return Err(not_found());
    }
    info!(employee_id = %id, "employee deleted");
    Ok(Json(MessageResponse {
        message: DELETED_MESSAGE.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn create_defaults_hire_date_to_now() {
        let body: CreateEmployee = serde_json::from_value(json!({
            "name": "A", "email": "a@x.com", "salary": 60000,
            "position": "Tester", "department": "QA"
        }))
        .unwrap();
        let now = Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap();
        let new = body.into_new(now);
        assert_eq!(new.hire_date, now);
        assert_eq!(new.salary, 60_000.0);
    }

    #[test]
    fn create_keeps_supplied_hire_date() {
        let body: CreateEmployee = serde_json::from_value(json!({
            "name": "A", "email": "a@x.com", "salary": 1.5,
            "position": "Tester", "department": "QA",
            "hire_date": "2020-05-01T00:00:00Z"
        }))
        .unwrap();
        let new = body.into_new(Utc::now());
        assert_eq!(new.hire_date, Utc.with_ymd_and_hms(2020, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn create_rejects_empty_name() {
        let body: CreateEmployee = serde_json::from_value(json!({
            "name": "", "email": "a@x.com", "salary": 1,
            "position": "Tester", "department": "QA"
        }))
        .unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn update_treats_null_as_absent() {
        let body: UpdateEmployee =
            serde_json::from_value(json!({"name": null, "salary": 65000})).unwrap();
        assert!(body.validate().is_ok());
        let changes = EmployeeChanges::from(body);
        assert_eq!(changes.name, None);
        assert_eq!(changes.salary, Some(65_000.0));
    }

    #[test]
    fn update_rejects_empty_name_when_present() {
        let body: UpdateEmployee = serde_json::from_value(json!({"name": ""})).unwrap();
        assert!(body.validate().is_err());
    }

    #[test]
    fn response_renders_hex_id() {
        let id = ObjectId::new();
        let response = EmployeeResponse::from(Employee {
            id,
            name: "A".into(),
            email: "a@x.com".into(),
            salary: 1.0,
            position: "P".into(),
            department: "D".into(),
            hire_date: Utc::now(),
        });
        assert_eq!(response.id, id.to_hex());
        assert_eq!(response.id.len(), 24);
    }

    #[test]
    fn malformed_ids_are_not_found() {
        let err = parse_id("not-an-object-id").unwrap_err();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(parse_id(&ObjectId::new().to_hex()).is_ok());
    }
}
