//! Student business logic - CRUD, pagination, and cascading deletes.
//!
//! The hour aggregate fields are owned by the accounting engine; nothing here
//! writes them except `create_student`, which starts them at zero.

use crate::{
    entities::{
        ClassRecord, ConsumptionRecord, Student, StudentCoursePackage, class_record,
        consumption_record, student, student_course_package,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};

/// Input for [`create_student`].
#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    /// Student name, required
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub notes: Option<String>,
    /// Defaults to `"new"` when unset
    pub status: Option<String>,
}

/// Field-wise changes for [`update_student`]. `None` leaves a field alone.
/// Hour fields are deliberately absent: they belong to the accounting engine.
#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub birthdate: Option<NaiveDate>,
    pub address: Option<String>,
    pub notes: Option<String>,
    pub status: Option<String>,
}

/// Retrieves one page of students, newest first, optionally filtered by
/// status. Returns the page plus the total row count for the filter.
pub async fn list_students(
    db: &DatabaseConnection,
    page: u64,
    per_page: u64,
    status: Option<&str>,
) -> Result<(Vec<student::Model>, u64)> {
    let mut query = Student::find();
    if let Some(status) = status {
        query = query.filter(student::Column::Status.eq(status));
    }

    let paginator = query
        .order_by_desc(student::Column::Id)
        .paginate(db, per_page.max(1));
    let total = paginator.num_items().await?;
    let items = paginator.fetch_page(page.saturating_sub(1)).await?;
    Ok((items, total))
}

/// Retrieves a student by ID.
pub async fn get_student_by_id(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Option<student::Model>> {
    Student::find_by_id(student_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Registers a new student with zeroed hour aggregates.
///
/// # Errors
/// Returns an error if the name is empty or the insert fails.
pub async fn create_student(db: &DatabaseConnection, input: NewStudent) -> Result<student::Model> {
    if input.name.trim().is_empty() {
        return Err(Error::InvalidArgument {
            message: "Student name cannot be empty".to_string(),
        });
    }

    let now = Utc::now();
    let row = student::ActiveModel {
        name: Set(input.name.trim().to_string()),
        phone: Set(input.phone),
        email: Set(input.email),
        birthdate: Set(input.birthdate),
        total_hours: Set(0.0),
        used_hours: Set(0.0),
        remaining_hours: Set(0.0),
        register_date: Set(now.date_naive()),
        last_class_date: Set(None),
        address: Set(input.address),
        notes: Set(input.notes),
        status: Set(input
            .status
            .unwrap_or_else(|| student::STATUS_NEW.to_string())),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Updates a student's profile fields.
///
/// # Errors
/// Returns [`Error::StudentNotFound`] if the student does not exist.
pub async fn update_student(
    db: &DatabaseConnection,
    student_id: i64,
    changes: StudentChanges,
) -> Result<student::Model> {
    let row = Student::find_by_id(student_id)
        .one(db)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    let mut active: student::ActiveModel = row.into();
    if let Some(name) = changes.name {
        if name.trim().is_empty() {
            return Err(Error::InvalidArgument {
                message: "Student name cannot be empty".to_string(),
            });
        }
        active.name = Set(name.trim().to_string());
    }
    if let Some(phone) = changes.phone {
        active.phone = Set(Some(phone));
    }
    if let Some(email) = changes.email {
        active.email = Set(Some(email));
    }
    if let Some(birthdate) = changes.birthdate {
        active.birthdate = Set(Some(birthdate));
    }
    if let Some(address) = changes.address {
        active.address = Set(Some(address));
    }
    if let Some(notes) = changes.notes {
        active.notes = Set(Some(notes));
    }
    if let Some(status) = changes.status {
        active.status = Set(status);
    }
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a student and everything hanging off them: class records,
/// purchased packages, and the consumption ledger (cascade, so no orphaned
/// foreign keys survive).
///
/// # Errors
/// Returns [`Error::StudentNotFound`] if the student does not exist.
pub async fn delete_student(db: &DatabaseConnection, student_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let row = Student::find_by_id(student_id)
        .one(&txn)
        .await?
        .ok_or(Error::StudentNotFound { id: student_id })?;

    ConsumptionRecord::delete_many()
        .filter(consumption_record::Column::StudentId.eq(student_id))
        .exec(&txn)
        .await?;
    ClassRecord::delete_many()
        .filter(class_record::Column::StudentId.eq(student_id))
        .exec(&txn)
        .await?;
    StudentCoursePackage::delete_many()
        .filter(student_course_package::Column::StudentId.eq(student_id))
        .exec(&txn)
        .await?;
    row.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::accounting;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_student_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        let row = create_student(
            &db,
            NewStudent {
                name: "  Alice  ".to_string(),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(row.name, "Alice");
        assert_eq!(row.status, student::STATUS_NEW);
        assert_eq!(row.total_hours, 0.0);
        assert_eq!(row.used_hours, 0.0);
        assert_eq!(row.remaining_hours, 0.0);
        assert!(row.last_class_date.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_student_requires_name() -> Result<()> {
        let db = setup_test_db().await?;
        let result = create_student(
            &db,
            NewStudent {
                name: "   ".to_string(),
                ..Default::default()
            },
        )
        .await;
        let error = result.unwrap_err();
        assert!(matches!(error, Error::InvalidArgument { .. }));
        // The message names the bad input, not a server problem
        assert_eq!(
            error.to_string(),
            "Invalid argument: Student name cannot be empty"
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_update_student_patches_fields() -> Result<()> {
        let db = setup_test_db().await?;
        let row = create_test_student(&db, "Alice").await?;

        let updated = update_student(
            &db,
            row.id,
            StudentChanges {
                phone: Some("555-0101".to_string()),
                status: Some(student::STATUS_INACTIVE.to_string()),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(updated.phone.as_deref(), Some("555-0101"));
        assert_eq!(updated.status, student::STATUS_INACTIVE);
        // Untouched fields survive
        assert_eq!(updated.name, "Alice");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_student_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = update_student(&db, 999, StudentChanges::default()).await;
        assert!(matches!(result, Err(Error::StudentNotFound { id: 999 })));
        Ok(())
    }

    #[tokio::test]
    async fn test_list_students_pagination_and_filter() -> Result<()> {
        let db = setup_test_db().await?;
        for i in 0..5 {
            create_test_student(&db, &format!("Student {i}")).await?;
        }
        let inactive = create_test_student(&db, "Quit").await?;
        update_student(
            &db,
            inactive.id,
            StudentChanges {
                status: Some(student::STATUS_INACTIVE.to_string()),
                ..Default::default()
            },
        )
        .await?;

        let (page_one, total) = list_students(&db, 1, 4, None).await?;
        assert_eq!(total, 6);
        assert_eq!(page_one.len(), 4);
        // Newest first
        assert_eq!(page_one[0].name, "Quit");

        let (page_two, _) = list_students(&db, 2, 4, None).await?;
        assert_eq!(page_two.len(), 2);

        let (filtered, filtered_total) =
            list_students(&db, 1, 10, Some(student::STATUS_INACTIVE)).await?;
        assert_eq!(filtered_total, 1);
        assert_eq!(filtered[0].id, inactive.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_student_cascades_everything() -> Result<()> {
        let (db, alice, _catalog, package) = setup_with_package().await?;
        accounting::record_consumption(&db, alice.id, Some(package.id), 2.0, None, None).await?;
        crate::core::records::add_class_record(&db, alice.id, None, "Fractions", None).await?;

        delete_student(&db, alice.id).await?;

        assert!(get_student_by_id(&db, alice.id).await?.is_none());
        assert!(ConsumptionRecord::find().all(&db).await?.is_empty());
        assert!(ClassRecord::find().all(&db).await?.is_empty());
        assert!(StudentCoursePackage::find().all(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_student_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let result = delete_student(&db, 999).await;
        assert!(matches!(result, Err(Error::StudentNotFound { id: 999 })));
        Ok(())
    }
}
