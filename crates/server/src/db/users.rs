//! User, token, and group membership repository.

use bistro_core::types::{StaffGroup, UserId};
use chrono::Utc;
use sqlx::SqlitePool;

use super::RepositoryError;
use crate::models::User;

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            username: row.username,
            email: row.email,
        }
    }
}

/// Repository for accounts, auth tokens, and staff group membership.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email FROM users WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Get a user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, email FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// Resolve an auth token to its owner.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_token(&self, token_key: &str) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.username, u.email
            FROM users u
            JOIN auth_tokens t ON t.user_id = u.id
            WHERE t.token_key = ?
            ",
        )
        .bind(token_key)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(User::from))
    }

    /// All group names the user belongs to.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn group_names(&self, user_id: UserId) -> Result<Vec<String>, RepositoryError> {
        let names = sqlx::query_scalar::<_, String>(
            "SELECT group_name FROM user_groups WHERE user_id = ?",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(names)
    }

    /// Members of one staff group, ordered by user id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_in_group(&self, group: StaffGroup) -> Result<Vec<User>, RepositoryError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r"
            SELECT u.id, u.username, u.email
            FROM users u
            JOIN user_groups g ON g.user_id = u.id
            WHERE g.group_name = ?
            ORDER BY u.id
            ",
        )
        .bind(group.group_name())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(User::from).collect())
    }

    /// Add a user to a staff group. Adding an existing member is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_to_group(
        &self,
        user_id: UserId,
        group: StaffGroup,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT OR IGNORE INTO user_groups (user_id, group_name) VALUES (?, ?)")
            .bind(user_id.as_i64())
            .bind(group.group_name())
            .execute(self.pool)
            .await?;

        Ok(())
    }

    /// Remove a user from a staff group.
    ///
    /// Returns `true` if a membership row was deleted, `false` if the user
    /// was not in the group.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn remove_from_group(
        &self,
        user_id: UserId,
        group: StaffGroup,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM user_groups WHERE user_id = ? AND group_name = ?")
            .bind(user_id.as_i64())
            .bind(group.group_name())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Create a new account.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, username: &str, email: &str) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO users (username, email, created_at)
            VALUES (?, ?, ?)
            RETURNING id, username, email
            ",
        )
        .bind(username)
        .bind(email)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(User::from(row))
    }

    /// Store an auth token for a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the token value collides with
    /// an existing one.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn store_token(
        &self,
        user_id: UserId,
        token_key: &str,
    ) -> Result<(), RepositoryError> {
        sqlx::query("INSERT INTO auth_tokens (token_key, user_id, created_at) VALUES (?, ?, ?)")
            .bind(token_key)
            .bind(user_id.as_i64())
            .bind(Utc::now())
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_unique_violation()
                {
                    return RepositoryError::Conflict("token already exists".to_owned());
                }
                RepositoryError::Database(e)
            })?;

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::db::test_pool;

    #[tokio::test]
    async fn test_create_and_lookup() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let created = repo.create("ada", "ada@example.com").await.unwrap();
        let by_name = repo.get_by_username("ada").await.unwrap().unwrap();
        assert_eq!(by_name, created);

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "ada");
        assert!(repo.get_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        repo.create("ada", "").await.unwrap();
        let err = repo.create("ada", "other@example.com").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_token_resolution() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo.create("ada", "").await.unwrap();
        repo.store_token(user.id, "abc123").await.unwrap();

        let resolved = repo.get_by_token("abc123").await.unwrap().unwrap();
        assert_eq!(resolved.id, user.id);
        assert!(repo.get_by_token("wrong").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_group_membership_round_trip() {
        let pool = test_pool().await;
        let repo = UserRepository::new(&pool);

        let user = repo.create("ada", "").await.unwrap();
        repo.add_to_group(user.id, StaffGroup::Manager).await.unwrap();
        // Second add is a no-op, not an error.
        repo.add_to_group(user.id, StaffGroup::Manager).await.unwrap();

        let names = repo.group_names(user.id).await.unwrap();
        assert_eq!(names, vec!["Manager".to_owned()]);

        let members = repo.list_in_group(StaffGroup::Manager).await.unwrap();
        assert_eq!(members.len(), 1);
        assert_eq!(members[0].username, "ada");

        assert!(repo.remove_from_group(user.id, StaffGroup::Manager).await.unwrap());
        assert!(!repo.remove_from_group(user.id, StaffGroup::Manager).await.unwrap());
        assert!(repo.group_names(user.id).await.unwrap().is_empty());
    }
}
