//! Catalog business logic - the package templates sold to students.

use crate::{
    entities::{CoursePackage, course_package},
    errors::{Error, Result},
};
use chrono::Utc;
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all catalog packages, newest first.
pub async fn list_catalog_packages(db: &DatabaseConnection) -> Result<Vec<course_package::Model>> {
    CoursePackage::find()
        .order_by_desc(course_package::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a catalog package by ID.
pub async fn get_catalog_package(
    db: &DatabaseConnection,
    package_id: i64,
) -> Result<Option<course_package::Model>> {
    CoursePackage::find_by_id(package_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates a catalog package template.
///
/// # Errors
/// Returns an error if the name is empty or `total_hours` is not a finite
/// positive number.
pub async fn create_catalog_package(
    db: &DatabaseConnection,
    name: String,
    total_hours: f64,
    notes: Option<String>,
) -> Result<course_package::Model> {
    if name.trim().is_empty() {
        return Err(Error::InvalidArgument {
            message: "Catalog package name cannot be empty".to_string(),
        });
    }
    if !total_hours.is_finite() || total_hours <= 0.0 {
        return Err(Error::InvalidHours { hours: total_hours });
    }

    let now = Utc::now();
    let row = course_package::ActiveModel {
        name: Set(name.trim().to_string()),
        total_hours: Set(total_hours),
        status: Set(course_package::STATUS_ACTIVE.to_string()),
        notes: Set(notes),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}
