//! Database connection and table creation using `SeaORM`.
//!
//! Tables are generated from the entity definitions via
//! `Schema::create_table_from_entity`, so the schema always matches the Rust
//! struct definitions without hand-written SQL.

use crate::entities::{
    ClassRecord, ConsumptionRecord, CoursePackage, Session, Student, StudentCoursePackage, User,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Establishes a connection to the database.
///
/// # Errors
/// Returns an error if the connection cannot be established.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all tables from the entity definitions, ignoring ones that already
/// exist.
///
/// # Errors
/// Returns an error if a create-table statement fails.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let statements = [
        schema.create_table_from_entity(Student),
        schema.create_table_from_entity(CoursePackage),
        schema.create_table_from_entity(StudentCoursePackage),
        schema.create_table_from_entity(ClassRecord),
        schema.create_table_from_entity(ConsumptionRecord),
        schema.create_table_from_entity(User),
        schema.create_table_from_entity(Session),
    ];

    for mut statement in statements {
        statement.if_not_exists();
        db.execute(builder.build(&statement)).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{StudentModel, UserModel};
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Querying each table proves it exists
        let _: Vec<StudentModel> = Student::find().limit(1).all(&db).await?;
        let _: Vec<UserModel> = User::find().limit(1).all(&db).await?;
        let _ = CoursePackage::find().limit(1).all(&db).await?;
        let _ = StudentCoursePackage::find().limit(1).all(&db).await?;
        let _ = ClassRecord::find().limit(1).all(&db).await?;
        let _ = ConsumptionRecord::find().limit(1).all(&db).await?;
        let _ = Session::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;
        Ok(())
    }
}
