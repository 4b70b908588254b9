//! Student endpoints: paginated listing, CRUD, and aggregate reconciliation.

use crate::{
    api::{
        AppState,
        auth::CurrentUser,
        response::{Envelope, success, success_empty},
    },
    core::{accounting, parse_date, student},
    entities::student as student_entity,
    errors::{Error, Result},
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const DEFAULT_PER_PAGE: u64 = 10;
const MAX_PER_PAGE: u64 = 100;

/// Student fields exposed over the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentView {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub total_hours: f64,
    pub used_hours: f64,
    pub remaining_hours: f64,
    pub register_date: NaiveDate,
    pub last_class_date: Option<NaiveDate>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub status: String,
}

impl From<student_entity::Model> for StudentView {
    fn from(row: student_entity::Model) -> Self {
        Self {
            id: row.id,
            name: row.name,
            phone: row.phone,
            email: row.email,
            birthdate: row.birthdate,
            total_hours: row.total_hours,
            used_hours: row.used_hours,
            remaining_hours: row.remaining_hours,
            register_date: row.register_date,
            last_class_date: row.last_class_date,
            address: row.address,
            notes: row.notes,
            status: row.status,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub page: Option<u64>,
    #[serde(default)]
    pub per_page: Option<u64>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Pagination block attached to list responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u64,
    pub per_page: u64,
    pub total: u64,
    pub pages: u64,
}

#[derive(Debug, Serialize)]
pub struct StudentPage {
    pub items: Vec<StudentView>,
    pub pagination: Pagination,
}

/// `GET /api/students?page=&per_page=&status=`
pub async fn list_students(
    State(state): State<AppState>,
    _current: CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Envelope<StudentPage>>> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PER_PAGE)
        .clamp(1, MAX_PER_PAGE);

    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(
            status @ (student_entity::STATUS_ACTIVE
            | student_entity::STATUS_INACTIVE
            | student_entity::STATUS_NEW),
        ) => Some(status),
        Some(other) => {
            return Err(Error::InvalidArgument {
                message: format!("Unknown student status filter: '{other}'"),
            });
        }
    };

    let (rows, total) = student::list_students(&state.db, page, per_page, status).await?;
    Ok(success(StudentPage {
        items: rows.into_iter().map(StudentView::from).collect(),
        pagination: Pagination {
            page,
            per_page,
            total,
            pages: total.div_ceil(per_page),
        },
    }))
}

/// `GET /api/students/{id}`
pub async fn get_student(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(student_id): Path<i64>,
) -> Result<Json<Envelope<StudentView>>> {
    let row = student::get_student_by_id(&state.db, student_id)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;
    Ok(success(StudentView::from(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentBody {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    /// `YYYY-MM-DD`
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

fn parse_optional_date(value: Option<String>) -> Result<Option<NaiveDate>> {
    value
        .filter(|raw| !raw.is_empty())
        .map(|raw| parse_date(&raw))
        .transpose()
}

/// `POST /api/students/add`
pub async fn add_student(
    State(state): State<AppState>,
    _current: CurrentUser,
    Json(body): Json<StudentBody>,
) -> Result<Json<Envelope<StudentView>>> {
    let row = student::create_student(
        &state.db,
        student::NewStudent {
            name: body.name.unwrap_or_default(),
            phone: body.phone,
            email: body.email,
            birthdate: parse_optional_date(body.birthdate)?,
            address: body.address,
            notes: body.notes,
            status: body.status,
        },
    )
    .await?;
    tracing::info!(student_id = row.id, "student registered");
    Ok(success(StudentView::from(row)))
}

/// `PUT /api/students/{id}`
pub async fn update_student(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(student_id): Path<i64>,
    Json(body): Json<StudentBody>,
) -> Result<Json<Envelope<StudentView>>> {
    let row = student::update_student(
        &state.db,
        student_id,
        student::StudentChanges {
            name: body.name,
            phone: body.phone,
            email: body.email,
            birthdate: parse_optional_date(body.birthdate)?,
            address: body.address,
            notes: body.notes,
            status: body.status,
        },
    )
    .await?;
    Ok(success(StudentView::from(row)))
}

/// `DELETE /api/students/{id}`
pub async fn delete_student(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(student_id): Path<i64>,
) -> Result<Json<Envelope<()>>> {
    student::delete_student(&state.db, student_id).await?;
    tracing::info!(student_id, "student deleted");
    Ok(success_empty())
}

/// `POST /api/students/{id}/recalculate-hours` - rebuilds the stored hour
/// aggregates from the package table.
pub async fn recalculate_hours(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(student_id): Path<i64>,
) -> Result<Json<Envelope<StudentView>>> {
    let row = accounting::recalculate_student_aggregates(&state.db, student_id).await?;
    Ok(success(StudentView::from(row)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_optional_date() {
        assert_eq!(parse_optional_date(None).unwrap(), None);
        // Empty string means "not provided"
        assert_eq!(parse_optional_date(Some(String::new())).unwrap(), None);
        assert_eq!(
            parse_optional_date(Some("2024-03-05".to_string())).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 5)
        );
        assert!(parse_optional_date(Some("bogus".to_string())).is_err());
    }

    #[test]
    fn test_student_view_uses_camel_case() {
        let view = StudentView {
            id: 1,
            name: "Alice".to_string(),
            phone: None,
            email: None,
            birthdate: None,
            total_hours: 10.0,
            used_hours: 4.0,
            remaining_hours: 6.0,
            register_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            last_class_date: None,
            address: None,
            notes: None,
            status: "active".to_string(),
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["totalHours"], 10.0);
        assert_eq!(value["remainingHours"], 6.0);
        assert_eq!(value["registerDate"], "2024-01-01");
        assert!(value.get("total_hours").is_none());
    }
}
