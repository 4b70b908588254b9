//! Catalog course package entity - A sellable package template.
//!
//! A catalog package defines a name and a fixed hour quantity. Purchases are
//! recorded as `student_course_package` rows that reference it; the catalog
//! row itself is never consumed against.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Catalog package status: available for sale.
pub const STATUS_ACTIVE: &str = "active";
/// Catalog package status: retired from sale.
pub const STATUS_INACTIVE: &str = "inactive";

/// Catalog course package database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "course_packages")]
pub struct Model {
    /// Unique identifier for the catalog package
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Package name (e.g., "10-hour starter")
    pub name: String,
    /// Total hours granted by one purchase of this package
    pub total_hours: f64,
    /// Status: `"active"` or `"inactive"`
    pub status: String,
    /// Free-form notes
    pub notes: Option<String>,
    /// When the row was created
    pub created_at: DateTimeUtc,
    /// When the row was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between the catalog package and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One catalog package is purchased as many student packages
    #[sea_orm(has_many = "super::student_course_package::Entity")]
    StudentCoursePackages,
}

impl Related<super::student_course_package::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StudentCoursePackages.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
