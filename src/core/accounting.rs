//! Hour-accounting engine - Handles the package ↔ consumption ↔ aggregate
//! bookkeeping.
//!
//! This module owns the only invariants in the system: for every purchased
//! package, `used_hours + remaining_hours` equals the catalog total; a
//! deduction may never drive `remaining_hours` negative; and the student's
//! denormalized totals equal the sum over the student's packages. Every
//! operation here runs inside a single database transaction, so a failure at
//! any step leaves no partial writes behind.

use crate::{
    entities::{
        ConsumptionRecord, CoursePackage, Student, StudentCoursePackage, consumption_record,
        course_package, student, student_course_package,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};

/// Field-wise changes for [`update_package`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct PackageChanges {
    /// New consumed-hours value; `remaining_hours` is recomputed from it
    pub used_hours: Option<f64>,
    /// New purchase date
    pub purchase_date: Option<NaiveDate>,
    /// New expiry date; `Some(None)` clears it
    pub expire_date: Option<Option<NaiveDate>>,
    /// New status string
    pub status: Option<String>,
    /// New notes
    pub notes: Option<String>,
}

/// Sells a catalog package to a student.
///
/// The new package starts untouched (`used_hours = 0`, `remaining_hours` =
/// catalog total, status `"active"`); the student's `total_hours` and
/// `remaining_hours` grow by the catalog total in the same transaction.
///
/// # Errors
/// * [`Error::StudentNotFound`] / [`Error::CatalogPackageNotFound`] if either
///   side of the purchase does not exist
/// * [`Error::Database`] if a statement fails (transaction rolls back)
pub async fn create_package(
    db: &DatabaseConnection,
    student_id: i64,
    course_package_id: i64,
    purchase_date: Option<NaiveDate>,
    expire_date: Option<NaiveDate>,
    notes: Option<String>,
) -> Result<student_course_package::Model> {
    let txn = db.begin().await?;

    let owner = Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    let catalog = CoursePackage::find_by_id(course_package_id)
        .one(&txn)
        .await?
        .ok_or(Error::CatalogPackageNotFound {
            id: course_package_id,
        })?;

    let now = Utc::now();
    let package = student_course_package::ActiveModel {
        student_id: Set(student_id),
        course_package_id: Set(course_package_id),
        used_hours: Set(0.0),
        remaining_hours: Set(catalog.total_hours),
        purchase_date: Set(purchase_date.unwrap_or_else(|| now.date_naive())),
        expire_date: Set(expire_date),
        status: Set(student_course_package::STATUS_ACTIVE.to_string()),
        notes: Set(notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let package = package.insert(&txn).await?;

    // Nothing consumed yet, so used_hours stays put
    let new_total = owner.total_hours + catalog.total_hours;
    let new_remaining = owner.remaining_hours + catalog.total_hours;
    let mut owner: student::ActiveModel = owner.into();
    owner.total_hours = Set(new_total);
    owner.remaining_hours = Set(new_remaining);
    owner.updated_at = Set(now);
    owner.update(&txn).await?;

    txn.commit().await?;
    Ok(package)
}

/// Updates a purchased package and keeps the owner's aggregates in step.
///
/// When `used_hours` changes, `remaining_hours` is recomputed against the
/// catalog total and the used/remaining delta is applied incrementally to the
/// student row, all in one transaction.
///
/// # Errors
/// * [`Error::PackageNotFound`] / [`Error::CatalogPackageNotFound`] if the
///   package or its catalog template is missing
/// * [`Error::InvalidHours`] if `used_hours` is negative, not finite, or
///   exceeds the catalog total (which would leave a negative remainder)
pub async fn update_package(
    db: &DatabaseConnection,
    package_id: i64,
    changes: PackageChanges,
) -> Result<student_course_package::Model> {
    let txn = db.begin().await?;

    let package = StudentCoursePackage::find_by_id(package_id)
        .one(&txn)
        .await?
        .ok_or(Error::PackageNotFound { id: package_id })?;

    let catalog = CoursePackage::find_by_id(package.course_package_id)
        .one(&txn)
        .await?
        .ok_or(Error::CatalogPackageNotFound {
            id: package.course_package_id,
        })?;

    let student_id = package.student_id;
    let old_used = package.used_hours;
    let old_remaining = package.remaining_hours;
    let mut new_used = old_used;
    let mut new_remaining = old_remaining;

    let mut active: student_course_package::ActiveModel = package.into();

    if let Some(used) = changes.used_hours {
        if !used.is_finite() || used < 0.0 || used > catalog.total_hours {
            return Err(Error::InvalidHours { hours: used });
        }
        new_used = used;
        new_remaining = catalog.total_hours - used;
        active.used_hours = Set(new_used);
        active.remaining_hours = Set(new_remaining);
    }
    if let Some(date) = changes.purchase_date {
        active.purchase_date = Set(date);
    }
    if let Some(expire) = changes.expire_date {
        active.expire_date = Set(expire);
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    if let Some(notes) = changes.notes {
        active.notes = Set(Some(notes));
    }

    let now = Utc::now();
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    let used_diff = new_used - old_used;
    let remaining_diff = new_remaining - old_remaining;
    if used_diff != 0.0 || remaining_diff != 0.0 {
        if let Some(owner) = Student::find_by_id(student_id).one(&txn).await? {
            let new_student_used = owner.used_hours + used_diff;
            let new_student_remaining = owner.remaining_hours + remaining_diff;
            let mut owner: student::ActiveModel = owner.into();
            owner.used_hours = Set(new_student_used);
            owner.remaining_hours = Set(new_student_remaining);
            owner.updated_at = Set(now);
            owner.update(&txn).await?;
        }
    }

    txn.commit().await?;
    Ok(updated)
}

/// Deletes a purchased package, reversing its full contribution to the
/// owner's aggregates and cascading its consumption ledger.
///
/// # Errors
/// Returns [`Error::PackageNotFound`] if the package does not exist.
pub async fn delete_package(db: &DatabaseConnection, package_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let package = StudentCoursePackage::find_by_id(package_id)
        .one(&txn)
        .await?
        .ok_or(Error::PackageNotFound { id: package_id })?;

    // A dangling catalog reference contributes zero, same as the system this
    // replaces
    let catalog_total = CoursePackage::find_by_id(package.course_package_id)
        .one(&txn)
        .await?
        .map_or(0.0, |catalog| catalog.total_hours);

    if let Some(owner) = Student::find_by_id(package.student_id).one(&txn).await? {
        let new_total = owner.total_hours - catalog_total;
        let new_used = owner.used_hours - package.used_hours;
        let new_remaining = owner.remaining_hours - package.remaining_hours;
        let mut owner: student::ActiveModel = owner.into();
        owner.total_hours = Set(new_total);
        owner.used_hours = Set(new_used);
        owner.remaining_hours = Set(new_remaining);
        owner.updated_at = Set(Utc::now());
        owner.update(&txn).await?;
    }

    ConsumptionRecord::delete_many()
        .filter(consumption_record::Column::PackageId.eq(package_id))
        .exec(&txn)
        .await?;
    package.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Deducts hours from a student's package and appends a ledger entry.
///
/// With no explicit `package_id`, the student's active package with the
/// smallest remaining balance is chosen (use-the-scarcest-first). An explicit
/// `package_id` must belong to the student. The balance check, the package
/// mutation, the ledger insert, and the aggregate update commit as one unit.
///
/// # Errors
/// * [`Error::InvalidHours`] unless `consumption_hours` is a finite positive
///   number
/// * [`Error::StudentNotFound`] / [`Error::PackageNotFound`]
/// * [`Error::PackageOwnershipMismatch`] if the package belongs to someone
///   else
/// * [`Error::NoActivePackage`] if auto-selection finds nothing
/// * [`Error::InsufficientHours`] if the balance is short; nothing is written
pub async fn record_consumption(
    db: &DatabaseConnection,
    student_id: i64,
    package_id: Option<i64>,
    consumption_hours: f64,
    operator_name: Option<String>,
    operation_time: Option<DateTimeUtc>,
) -> Result<consumption_record::Model> {
    if !consumption_hours.is_finite() || consumption_hours <= 0.0 {
        return Err(Error::InvalidHours {
            hours: consumption_hours,
        });
    }

    let txn = db.begin().await?;

    let owner = Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    let package = match package_id {
        Some(id) => {
            let package = StudentCoursePackage::find_by_id(id)
                .one(&txn)
                .await?
                .ok_or(Error::PackageNotFound { id })?;
            if package.student_id != student_id {
                return Err(Error::PackageOwnershipMismatch {
                    package_id: id,
                    student_id,
                });
            }
            package
        }
        None => StudentCoursePackage::find()
            .filter(student_course_package::Column::StudentId.eq(student_id))
            .filter(student_course_package::Column::Status.eq(student_course_package::STATUS_ACTIVE))
            .order_by_asc(student_course_package::Column::RemainingHours)
            .one(&txn)
            .await?
            .ok_or(Error::NoActivePackage { student_id })?,
    };

    if package.remaining_hours < consumption_hours {
        return Err(Error::InsufficientHours {
            remaining: package.remaining_hours,
            requested: consumption_hours,
        });
    }

    let package_row_id = package.id;
    let new_used = package.used_hours + consumption_hours;
    let new_remaining = package.remaining_hours - consumption_hours;
    let now = Utc::now();

    let mut active: student_course_package::ActiveModel = package.into();
    active.used_hours = Set(new_used);
    active.remaining_hours = Set(new_remaining);
    if new_remaining <= 0.0 {
        active.status = Set(student_course_package::STATUS_USED.to_string());
    }
    active.updated_at = Set(now);
    active.update(&txn).await?;

    // Snapshot the post-deduction balances into the append-only ledger
    let record = consumption_record::ActiveModel {
        student_id: Set(student_id),
        package_id: Set(package_row_id),
        consumption_hours: Set(consumption_hours),
        remaining_hours: Set(new_remaining),
        used_hours: Set(new_used),
        operation_time: Set(operation_time.unwrap_or(now)),
        operator_name: Set(operator_name),
        created_at: Set(now),
        ..Default::default()
    };
    let record = record.insert(&txn).await?;

    // Aggregates move in the same unit as the package mutation, so they can
    // never drift from a committed deduction
    let new_student_used = owner.used_hours + consumption_hours;
    let new_student_remaining = owner.remaining_hours - consumption_hours;
    let mut owner: student::ActiveModel = owner.into();
    owner.used_hours = Set(new_student_used);
    owner.remaining_hours = Set(new_student_remaining);
    owner.updated_at = Set(now);
    owner.update(&txn).await?;

    txn.commit().await?;
    Ok(record)
}

/// Rebuilds a student's hour aggregates from scratch off the package table.
///
/// This is the reconciliation path: it produces the same numbers no matter
/// how the incremental updates got there, and running it twice in a row is a
/// no-op.
///
/// # Errors
/// Returns [`Error::StudentNotFound`] if the student does not exist.
pub async fn recalculate_student_aggregates(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<student::Model> {
    let txn = db.begin().await?;

    let owner = Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    let packages = StudentCoursePackage::find()
        .filter(student_course_package::Column::StudentId.eq(student_id))
        .all(&txn)
        .await?;

    let mut total_hours = 0.0;
    let mut used_hours = 0.0;
    let mut remaining_hours = 0.0;
    for package in &packages {
        if let Some(catalog) = CoursePackage::find_by_id(package.course_package_id)
            .one(&txn)
            .await?
        {
            total_hours += catalog.total_hours;
            used_hours += package.used_hours;
            remaining_hours += package.remaining_hours;
        }
    }

    let mut owner: student::ActiveModel = owner.into();
    owner.total_hours = Set(total_hours);
    owner.used_hours = Set(used_hours);
    owner.remaining_hours = Set(remaining_hours);
    owner.updated_at = Set(Utc::now());
    let updated = owner.update(&txn).await?;

    txn.commit().await?;
    Ok(updated)
}

/// Retrieves a student's purchased packages together with their catalog
/// templates, newest purchase first. `active_only` keeps just the
/// `"active"`-status packages (the pool consumption can draw from).
pub async fn get_student_packages(
    db: &DatabaseConnection,
    student_id: i64,
    active_only: bool,
) -> Result<Vec<(student_course_package::Model, Option<course_package::Model>)>> {
    let mut query = StudentCoursePackage::find()
        .filter(student_course_package::Column::StudentId.eq(student_id));
    if active_only {
        query = query.filter(
            student_course_package::Column::Status.eq(student_course_package::STATUS_ACTIVE),
        );
    }
    query
        .order_by_desc(student_course_package::Column::PurchaseDate)
        .find_also_related(CoursePackage)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a purchased package by ID.
pub async fn get_package_by_id(
    db: &DatabaseConnection,
    package_id: i64,
) -> Result<Option<student_course_package::Model>> {
    StudentCoursePackage::find_by_id(package_id)
        .one(db)
        .await
        .map_err(Into::into)
}
