//! Session entity - Server-side login sessions keyed by an opaque token.
//!
//! The token travels in a cookie; the row pins it to a user and an expiry.
//! Expired rows are treated as absent on lookup.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Session database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    /// Unique identifier for the session
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Opaque random token presented by the client
    #[sea_orm(unique)]
    pub token: String,
    /// ID of the logged-in user
    pub user_id: i64,
    /// When the session was created
    pub created_at: DateTimeUtc,
    /// When the session stops being honored
    pub expires_at: DateTimeUtc,
}

/// Defines relationships between Session and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each session belongs to one user
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
