//! Record keeping - class attendance records and consumption-ledger queries.

use crate::{
    entities::{ClassRecord, ConsumptionRecord, Student, class_record, consumption_record, student},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Logs one tutoring session for a student.
///
/// The student's `last_class_date` advances only when the new record's date
/// is strictly later than the stored one (or none was stored), so backfilled
/// records never move it backwards.
///
/// # Errors
/// * [`Error::StudentNotFound`] if the student does not exist
/// * [`Error::EmptyContent`] if `content` is blank
pub async fn add_class_record(
    db: &DatabaseConnection,
    student_id: i64,
    date: Option<NaiveDate>,
    content: &str,
    operator_id: Option<i64>,
) -> Result<class_record::Model> {
    if content.trim().is_empty() {
        return Err(Error::EmptyContent);
    }

    let txn = db.begin().await?;

    let owner = Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    let now = Utc::now();
    let class_date = date.unwrap_or_else(|| now.date_naive());

    let record = class_record::ActiveModel {
        student_id: Set(student_id),
        date: Set(class_date),
        content: Set(content.trim().to_string()),
        operator_id: Set(operator_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let record = record.insert(&txn).await?;

    if owner.last_class_date.is_none_or(|last| class_date > last) {
        let mut owner: student::ActiveModel = owner.into();
        owner.last_class_date = Set(Some(class_date));
        owner.updated_at = Set(now);
        owner.update(&txn).await?;
    }

    txn.commit().await?;
    Ok(record)
}

/// Retrieves a student's class records, most recent class first.
pub async fn get_class_records(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<class_record::Model>> {
    ClassRecord::find()
        .filter(class_record::Column::StudentId.eq(student_id))
        .order_by_desc(class_record::Column::Date)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a student's consumption ledger, newest entry first, optionally
/// narrowed to one package.
pub async fn get_consumption_records(
    db: &DatabaseConnection,
    student_id: i64,
    package_id: Option<i64>,
) -> Result<Vec<consumption_record::Model>> {
    let mut query =
        ConsumptionRecord::find().filter(consumption_record::Column::StudentId.eq(student_id));
    if let Some(package_id) = package_id {
        query = query.filter(consumption_record::Column::PackageId.eq(package_id));
    }
    query
        .order_by_desc(consumption_record::Column::OperationTime)
        .all(db)
        .await
        .map_err(Into::into)
}
