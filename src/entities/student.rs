//! Student entity - One row per student/customer of the tutoring business.
//!
//! The three hour fields (`total_hours`, `used_hours`, `remaining_hours`) are
//! denormalized sums over the student's course packages. The accounting engine
//! updates them inside the same transaction as every package mutation;
//! `recalculate_student_aggregates` rebuilds them from scratch.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Student status: currently taking classes.
pub const STATUS_ACTIVE: &str = "active";
/// Student status: finished all classes.
pub const STATUS_INACTIVE: &str = "inactive";
/// Student status: newly registered customer.
pub const STATUS_NEW: &str = "new";

/// Student database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    /// Unique identifier for the student
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Student name
    pub name: String,
    /// Contact phone number
    pub phone: Option<String>,
    /// Contact email address
    pub email: Option<String>,
    /// Date of birth
    pub birthdate: Option<Date>,
    /// Sum of catalog totals across all owned packages
    pub total_hours: f64,
    /// Sum of consumed hours across all owned packages
    pub used_hours: f64,
    /// Sum of remaining hours across all owned packages
    pub remaining_hours: f64,
    /// Date the student registered
    pub register_date: Date,
    /// Date of the most recent class record, advanced monotonically
    pub last_class_date: Option<Date>,
    /// Home address
    pub address: Option<String>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Status: `"active"`, `"inactive"`, or `"new"`
    pub status: String,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Student and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One student has many class records
    #[sea_orm(has_many = "super::class_record::Entity")]
    ClassRecords,
    /// One student owns many purchased course packages
    #[sea_orm(has_many = "super::student_course_package::Entity")]
    StudentCoursePackages,
    /// One student has many consumption ledger entries
    #[sea_orm(has_many = "super::consumption_record::Entity")]
    ConsumptionRecords,
}

impl Related<super::class_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClassRecords.def()
    }
}

impl Related<super::student_course_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCoursePackages.def()
    }
}

impl Related<super::consumption_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConsumptionRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
