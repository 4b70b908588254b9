//! Record endpoints: class attendance logs and the consumption ledger.

use crate::{
    api::{
        AppState,
        auth::CurrentUser,
        response::{Envelope, success},
    },
    core::{accounting, parse_date, records},
    entities::{class_record, consumption_record},
    errors::Result,
};
use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::NaiveDate;
use sea_orm::prelude::DateTimeUtc;
use serde::{Deserialize, Serialize};

/// Class record fields exposed over the API.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecordView {
    pub id: i64,
    pub student_id: i64,
    pub date: NaiveDate,
    pub content: String,
    pub operator_id: Option<i64>,
}

impl From<class_record::Model> for ClassRecordView {
    fn from(row: class_record::Model) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            date: row.date,
            content: row.content,
            operator_id: row.operator_id,
        }
    }
}

/// Consumption ledger entry exposed over the API. The hour fields are the
/// post-deduction snapshots taken when the entry was written.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionView {
    pub id: i64,
    pub student_id: i64,
    pub package_id: i64,
    pub consumption_hours: f64,
    pub remaining_hours: f64,
    pub used_hours: f64,
    pub operation_time: DateTimeUtc,
    pub operator_name: Option<String>,
}

impl From<consumption_record::Model> for ConsumptionView {
    fn from(row: consumption_record::Model) -> Self {
        Self {
            id: row.id,
            student_id: row.student_id,
            package_id: row.package_id,
            consumption_hours: row.consumption_hours,
            remaining_hours: row.remaining_hours,
            used_hours: row.used_hours,
            operation_time: row.operation_time,
            operator_name: row.operator_name,
        }
    }
}

/// `GET /api/students/{id}/records`
pub async fn get_student_records(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(student_id): Path<i64>,
) -> Result<Json<Envelope<Vec<ClassRecordView>>>> {
    let rows = records::get_class_records(&state.db, student_id).await?;
    Ok(success(rows.into_iter().map(ClassRecordView::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddClassRecordRequest {
    pub student_id: i64,
    /// `YYYY-MM-DD`, defaults to today
    pub date: Option<String>,
    pub content: String,
}

/// `POST /api/records`
pub async fn add_class_record(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<AddClassRecordRequest>,
) -> Result<Json<Envelope<ClassRecordView>>> {
    let date = match request.date.filter(|raw| !raw.is_empty()) {
        Some(raw) => Some(parse_date(&raw)?),
        None => None,
    };

    let row = records::add_class_record(
        &state.db,
        request.student_id,
        date,
        &request.content,
        Some(current.id),
    )
    .await?;
    Ok(success(ClassRecordView::from(row)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionQuery {
    pub package_id: Option<i64>,
}

/// `GET /api/students/{id}/consumption-records?package_id=`
pub async fn get_consumption_records(
    State(state): State<AppState>,
    _current: CurrentUser,
    Path(student_id): Path<i64>,
    Query(query): Query<ConsumptionQuery>,
) -> Result<Json<Envelope<Vec<ConsumptionView>>>> {
    let rows = records::get_consumption_records(&state.db, student_id, query.package_id).await?;
    Ok(success(rows.into_iter().map(ConsumptionView::from).collect()))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddConsumptionRequest {
    pub student_id: i64,
    /// Explicit package to deduct from; omitted means auto-select
    pub package_id: Option<i64>,
    pub consumption_hours: f64,
    /// Defaults to the logged-in user's name
    pub operator_name: Option<String>,
    /// Defaults to now
    pub operation_time: Option<DateTimeUtc>,
}

/// `POST /api/consumption-records` - deducts hours and appends a ledger
/// entry.
pub async fn add_consumption_record(
    State(state): State<AppState>,
    current: CurrentUser,
    Json(request): Json<AddConsumptionRequest>,
) -> Result<Json<Envelope<ConsumptionView>>> {
    let operator_name = request
        .operator_name
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| current.username.clone());

    let row = accounting::record_consumption(
        &state.db,
        request.student_id,
        request.package_id,
        request.consumption_hours,
        Some(operator_name),
        request.operation_time,
    )
    .await?;
    tracing::info!(
        student_id = request.student_id,
        hours = request.consumption_hours,
        "hours deducted"
    );
    Ok(success(ConsumptionView::from(row)))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_consumption_view_uses_camel_case() {
        let view = ConsumptionView {
            id: 1,
            student_id: 2,
            package_id: 3,
            consumption_hours: 1.5,
            remaining_hours: 8.5,
            used_hours: 1.5,
            operation_time: Utc::now(),
            operator_name: Some("admin".to_string()),
        };
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(value["consumptionHours"], 1.5);
        assert_eq!(value["operatorName"], "admin");
        assert!(value.get("consumption_hours").is_none());
    }
}
