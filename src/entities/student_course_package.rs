//! Student course package entity - One student's purchased instance of a
//! catalog package.
//!
//! Invariant: `used_hours + remaining_hours` equals the catalog package's
//! `total_hours` outside of an in-flight engine transaction.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Package status: hours remain and the package may be consumed against.
pub const STATUS_ACTIVE: &str = "active";
/// Package status: past its expire date.
pub const STATUS_EXPIRED: &str = "expired";
/// Package status: all hours consumed.
pub const STATUS_USED: &str = "used";

/// Student course package database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "student_course_packages")]
pub struct Model {
    /// Unique identifier for the purchased package
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning student
    pub student_id: i64,
    /// ID of the catalog package this purchase instantiates
    pub course_package_id: i64,
    /// Hours consumed so far
    pub used_hours: f64,
    /// Hours still available
    pub remaining_hours: f64,
    /// Date of purchase
    pub purchase_date: Date,
    /// Optional expiry date
    pub expire_date: Option<Date>,
    /// Status: `"active"`, `"expired"`, or `"used"`
    pub status: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between the student package and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each purchased package belongs to one student
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,
    /// Each purchased package instantiates one catalog package
    #[sea_orm(
        belongs_to = "super::course_package::Entity",
        from = "Column::CoursePackageId",
        to = "super::course_package::Column::Id"
    )]
    CoursePackage,
    /// One purchased package has many consumption ledger entries
    #[sea_orm(has_many = "super::consumption_record::Entity")]
    ConsumptionRecords,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::course_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CoursePackage.def()
    }
}

impl Related<super::consumption_record::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ConsumptionRecords.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
