//! Users, password hashing, and login sessions.
//!
//! Username lookups are case-insensitive. Sessions are server-side rows keyed
//! by a random token; the API layer turns the token into a request-scoped
//! operator identity instead of keeping ambient login state.

use crate::{
    entities::{Session, User, session, user},
    errors::{Error, Result},
};
use chrono::{Duration, Utc};
use rand::RngCore;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{Set, prelude::*};
use sha2::{Digest, Sha256};

/// Username of the auto-provisioned first account.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
/// Initial password of the auto-provisioned account. Operators are expected
/// to change it immediately.
const DEFAULT_ADMIN_PASSWORD: &str = "admin";

/// Hashes a password with a fresh random salt, `salt$digest` format.
#[must_use]
pub fn hash_password(password: &str) -> String {
    let mut salt = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut salt);
    let salt = hex::encode(salt);
    let digest = digest_with_salt(&salt, password);
    format!("{salt}${digest}")
}

/// Checks a password against a stored `salt$digest` hash.
#[must_use]
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt, digest)) = stored.split_once('$') else {
        return false;
    };
    digest_with_salt(salt, password) == digest
}

fn digest_with_salt(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Finds a user by username, ignoring case.
pub async fn find_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(user::Column::Username)))
                .eq(username.to_lowercase()),
        )
        .one(db)
        .await
        .map_err(Into::into)
}

/// Creates the default admin account when no admin user exists yet.
///
/// Called on every login attempt so a freshly deployed instance can be
/// entered with admin/admin.
pub async fn ensure_default_admin(db: &DatabaseConnection) -> Result<()> {
    if find_user_by_username(db, DEFAULT_ADMIN_USERNAME)
        .await?
        .is_some()
    {
        return Ok(());
    }

    tracing::info!("no admin account found, provisioning default admin");
    let row = user::ActiveModel {
        username: Set(DEFAULT_ADMIN_USERNAME.to_string()),
        password_hash: Set(hash_password(DEFAULT_ADMIN_PASSWORD)),
        is_admin: Set(true),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    row.insert(db).await?;
    Ok(())
}

/// Authenticates a username/password pair.
///
/// # Errors
/// Returns [`Error::InvalidCredentials`] when either the user is unknown or
/// the password does not match; callers cannot distinguish the two.
pub async fn verify_login(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    ensure_default_admin(db).await?;

    let found = find_user_by_username(db, username).await?;
    match found {
        Some(row) if verify_password(password, &row.password_hash) => Ok(row),
        _ => Err(Error::InvalidCredentials),
    }
}

/// Retrieves all user accounts.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find().all(db).await.map_err(Into::into)
}

/// Creates a staff account.
///
/// # Errors
/// Returns [`Error::UsernameTaken`] if the name is already in use
/// (case-insensitive), or a validation error for empty inputs.
pub async fn create_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
    is_admin: bool,
) -> Result<user::Model> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(Error::InvalidArgument {
            message: "Username and password cannot be empty".to_string(),
        });
    }
    if find_user_by_username(db, username).await?.is_some() {
        return Err(Error::UsernameTaken {
            username: username.to_string(),
        });
    }

    let row = user::ActiveModel {
        username: Set(username.to_string()),
        password_hash: Set(hash_password(password)),
        is_admin: Set(is_admin),
        created_at: Set(Utc::now()),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Deletes a staff account and its sessions.
///
/// # Errors
/// Refuses to delete the acting user's own account; returns
/// [`Error::UserNotFound`] for unknown IDs.
pub async fn delete_user(db: &DatabaseConnection, user_id: i64, acting_user_id: i64) -> Result<()> {
    if user_id == acting_user_id {
        return Err(Error::InvalidArgument {
            message: "Cannot delete the currently logged-in user".to_string(),
        });
    }

    let row = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    Session::delete_many()
        .filter(session::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    row.delete(db).await?;
    Ok(())
}

/// Replaces a user's password.
///
/// # Errors
/// Returns [`Error::UserNotFound`] for unknown IDs or a validation error for
/// an empty password.
pub async fn change_password(
    db: &DatabaseConnection,
    user_id: i64,
    new_password: &str,
) -> Result<()> {
    if new_password.is_empty() {
        return Err(Error::InvalidArgument {
            message: "Password cannot be empty".to_string(),
        });
    }

    let row = User::find_by_id(user_id)
        .one(db)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;

    let mut active: user::ActiveModel = row.into();
    active.password_hash = Set(hash_password(new_password));
    active.update(db).await?;
    Ok(())
}

/// Opens a login session for a user, returning the row with its fresh token.
pub async fn create_session(
    db: &DatabaseConnection,
    user_id: i64,
    ttl_seconds: i64,
) -> Result<session::Model> {
    let mut token = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut token);

    let now = Utc::now();
    let row = session::ActiveModel {
        token: Set(hex::encode(token)),
        user_id: Set(user_id),
        created_at: Set(now),
        expires_at: Set(now + Duration::seconds(ttl_seconds)),
        ..Default::default()
    };
    row.insert(db).await.map_err(Into::into)
}

/// Resolves a session token to its user, treating expired sessions as absent.
pub async fn resolve_session(
    db: &DatabaseConnection,
    token: &str,
) -> Result<Option<user::Model>> {
    let found = Session::find()
        .filter(session::Column::Token.eq(token))
        .filter(session::Column::ExpiresAt.gt(Utc::now()))
        .one(db)
        .await?;

    let Some(session_row) = found else {
        return Ok(None);
    };

    User::find_by_id(session_row.user_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Removes a session (logout). Unknown tokens are a no-op.
pub async fn delete_session(db: &DatabaseConnection, token: &str) -> Result<()> {
    Session::delete_many()
        .filter(session::Column::Token.eq(token))
        .exec(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::setup_test_db;

    #[test]
    fn test_password_hash_roundtrip() {
        let stored = hash_password("hunter2");
        assert!(verify_password("hunter2", &stored));
        assert!(!verify_password("hunter3", &stored));
        assert!(!verify_password("hunter2", "not-a-valid-hash"));

        // Fresh salt every time
        assert_ne!(stored, hash_password("hunter2"));
    }

    #[tokio::test]
    async fn test_first_login_provisions_default_admin() -> Result<()> {
        let db = setup_test_db().await?;

        let admin = verify_login(&db, "admin", "admin").await?;
        assert!(admin.is_admin);
        assert_eq!(admin.username, DEFAULT_ADMIN_USERNAME);

        // Lookup is case-insensitive
        let again = verify_login(&db, "ADMIN", "admin").await?;
        assert_eq!(again.id, admin.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_login_rejects_bad_credentials() -> Result<()> {
        let db = setup_test_db().await?;

        let result = verify_login(&db, "admin", "wrong").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));

        let result = verify_login(&db, "nobody", "admin").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_user_uniqueness() -> Result<()> {
        let db = setup_test_db().await?;
        create_user(&db, "teacher", "secret", false).await?;

        let result = create_user(&db, "Teacher", "other", false).await;
        assert!(matches!(result, Err(Error::UsernameTaken { .. })));

        let result = create_user(&db, "", "secret", false).await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_user_guards() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = verify_login(&db, "admin", "admin").await?;
        let teacher = create_user(&db, "teacher", "secret", false).await?;

        let result = delete_user(&db, admin.id, admin.id).await;
        assert!(matches!(result, Err(Error::InvalidArgument { .. })));

        delete_user(&db, teacher.id, admin.id).await?;
        let result = delete_user(&db, teacher.id, admin.id).await;
        assert!(matches!(result, Err(Error::UserNotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn test_change_password() -> Result<()> {
        let db = setup_test_db().await?;
        let teacher = create_user(&db, "teacher", "secret", false).await?;

        change_password(&db, teacher.id, "better-secret").await?;
        let result = verify_login(&db, "teacher", "secret").await;
        assert!(matches!(result, Err(Error::InvalidCredentials)));
        verify_login(&db, "teacher", "better-secret").await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_session_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = verify_login(&db, "admin", "admin").await?;

        let session_row = create_session(&db, admin.id, 3600).await?;
        let resolved = resolve_session(&db, &session_row.token).await?.unwrap();
        assert_eq!(resolved.id, admin.id);

        assert!(resolve_session(&db, "bogus-token").await?.is_none());

        delete_session(&db, &session_row.token).await?;
        assert!(resolve_session(&db, &session_row.token).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_expired_session_is_ignored() -> Result<()> {
        let db = setup_test_db().await?;
        let admin = verify_login(&db, "admin", "admin").await?;

        let session_row = create_session(&db, admin.id, -60).await?;
        assert!(resolve_session(&db, &session_row.token).await?.is_none());

        Ok(())
    }
}
