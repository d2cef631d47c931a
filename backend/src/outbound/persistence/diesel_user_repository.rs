//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserRepository, UserRepositoryError};
use crate::domain::user::User;

use super::diesel_error::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the user repository port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserRepositoryError {
    map_basic_pool_error(error, UserRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> UserRepositoryError {
    map_basic_diesel_error(
        error,
        UserRepositoryError::query,
        UserRepositoryError::connection,
    )
}

/// Like [`map_diesel_error`], but turns the unique-email violation into the
/// conflict the registration flow reports to the caller.
fn map_create_error(error: diesel::result::Error, email: &str) -> UserRepositoryError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    if let DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) = &error {
        return UserRepositoryError::duplicate_email(email);
    }
    map_diesel_error(error)
}

fn user_to_new_row(user: &User) -> NewUserRow<'_> {
    NewUserRow {
        id: user.id,
        email: &user.email,
        password_hash: &user.password_hash,
        full_name: &user.full_name,
        phone: user.phone.as_deref(),
        role: &user.role,
        verified: user.verified,
        created_at: user.created_at,
        updated_at: user.updated_at,
    }
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: row.id,
        email: row.email,
        password_hash: row.password_hash,
        full_name: row.full_name,
        phone: row.phone,
        role: row.role,
        verified: row.verified,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        diesel::insert_into(users::table)
            .values(user_to_new_row(user))
            .execute(&mut conn)
            .await
            .map_err(|err| map_create_error(err, &user.email))?;

        Ok(())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, UserRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(row_to_user))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rstest::rstest;
    use uuid::Uuid;

    use super::*;

    #[rstest]
    fn unique_violation_maps_to_duplicate_email() {
        let diesel_err = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key value".to_owned()),
        );

        let repo_err = map_create_error(diesel_err, "ada@example.com");
        assert_eq!(
            repo_err,
            UserRepositoryError::duplicate_email("ada@example.com")
        );
    }

    #[rstest]
    fn other_errors_fall_through_to_basic_mapping() {
        let repo_err = map_create_error(diesel::result::Error::NotFound, "ada@example.com");
        assert!(matches!(repo_err, UserRepositoryError::Query { .. }));
    }

    #[rstest]
    fn row_conversion_preserves_account_fields() {
        let now = Utc::now();
        let row = UserRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".to_owned(),
            password_hash: "$argon2id$stub".to_owned(),
            full_name: "Ada Osei".to_owned(),
            phone: None,
            role: "user".to_owned(),
            verified: false,
            created_at: now,
            updated_at: now,
        };

        let user = row_to_user(row);
        assert_eq!(user.email, "ada@example.com");
        assert_eq!(user.role, "user");
        assert!(!user.verified);
    }
}
