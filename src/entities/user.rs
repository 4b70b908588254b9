//! User entity - Staff accounts for the admin backend.
//!
//! Username lookups are case-insensitive. The first login attempt against an
//! empty user table auto-provisions a default admin account.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// User database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Unique identifier for the user
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Login name, unique
    #[sea_orm(unique)]
    pub username: String,
    /// Salted password hash, never the cleartext password
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Whether this user may manage other users
    pub is_admin: bool,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between User and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One user has many login sessions
    #[sea_orm(has_many = "super::session::Entity")]
    Sessions,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Sessions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
