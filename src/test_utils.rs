//! Shared helpers for unit tests: an in-memory database plus factory
//! functions for the rows most tests need.

use crate::{
    config::database::create_tables,
    core::{accounting, catalog, student},
    entities::{course_package, student as student_entity, student_course_package},
    errors::Result,
};
use sea_orm::{Database, DatabaseConnection};

/// Creates a fresh in-memory `SQLite` database with all tables.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = Database::connect("sqlite::memory:").await?;
    create_tables(&db).await?;
    Ok(db)
}

/// Registers a student with default fields.
pub async fn create_test_student(
    db: &DatabaseConnection,
    name: &str,
) -> Result<student_entity::Model> {
    student::create_student(
        db,
        student::NewStudent {
            name: name.to_string(),
            ..Default::default()
        },
    )
    .await
}

/// Creates a catalog package template.
pub async fn create_test_catalog_package(
    db: &DatabaseConnection,
    name: &str,
    total_hours: f64,
) -> Result<course_package::Model> {
    catalog::create_catalog_package(db, name.to_string(), total_hours, None).await
}

/// One-call fixture: a database, a student named Alice, a ten-hour catalog
/// template, and one purchased package from it.
pub async fn setup_with_package() -> Result<(
    DatabaseConnection,
    student_entity::Model,
    course_package::Model,
    student_course_package::Model,
)> {
    let db = setup_test_db().await?;
    let alice = create_test_student(&db, "Alice").await?;
    let catalog_row = create_test_catalog_package(&db, "10-pack", 10.0).await?;
    let package = accounting::create_package(&db, alice.id, catalog_row.id, None, None, None).await?;
    Ok((db, alice, catalog_row, package))
}
