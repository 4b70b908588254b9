//! Consumption record entity - Append-only ledger of hour deductions.
//!
//! Each row snapshots the owning package's `remaining_hours` and `used_hours`
//! *after* the deduction was applied. Rows are never mutated; they are the
//! audit trail for package balance changes.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Consumption record database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "consumption_records")]
pub struct Model {
    /// Unique identifier for the ledger entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the student whose package was consumed
    pub student_id: i64,
    /// ID of the student course package the hours were deducted from
    pub package_id: i64,
    /// Hours deducted by this entry
    pub consumption_hours: f64,
    /// Package `remaining_hours` after the deduction
    pub remaining_hours: f64,
    /// Package `used_hours` after the deduction
    pub used_hours: f64,
    /// When the deduction happened
    pub operation_time: DateTimeUtc,
    /// Name of the operator who performed the deduction
    pub operator_name: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between ConsumptionRecord and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each ledger entry references one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    /// Each ledger entry references one student course package
    #[sea_orm(
        belongs_to = "super::student_course_package::Entity",
        from = "Column::PackageId",
        to = "super::student_course_package::Column::Id"
    )]
    StudentCoursePackage,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::student_course_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCoursePackage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
