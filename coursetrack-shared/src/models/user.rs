/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user accounts.
/// A user owns courses and tasks; both are removed by `ON DELETE CASCADE` when
/// the user row is deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id SERIAL PRIMARY KEY,
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     first_name TEXT NOT NULL,
///     last_name TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use coursetrack_shared::models::user::{User, CreateUser};
/// use coursetrack_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "ada@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: "Ada".to_string(),
///     last_name: "Lovelace".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// println!("Created user: {}", user.id);
///
/// let found = User::find_by_email(&pool, "ada@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Server-generated user ID
    pub id: i32,

    /// Email address, stored trimmed and lower-cased
    ///
    /// Must be unique across all users
    pub email: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Normalized email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,
}

/// Input for updating an existing user
///
/// All fields are optional. Only `Some` fields are written.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub email: Option<String>,

    /// New password hash
    pub password_hash: Option<String>,

    pub first_name: Option<String>,

    pub last_name: Option<String>,
}

impl UpdateUser {
    /// Returns true if no field would change
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.password_hash.is_none()
            && self.first_name.is_none()
            && self.last_name.is_none()
    }

    /// Applies the present fields to `user` in place
    pub fn apply_to(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(first_name) = self.first_name {
            user.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            user.last_name = last_name;
        }
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, created_at";

impl User {
    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint `users_email_key`)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name)
            VALUES ($1, $2, $3, $4)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use coursetrack_shared::models::user::User;
    /// # use sqlx::PgPool;
    /// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
    /// if let Some(user) = User::find_by_id(&pool, 1).await? {
    ///     println!("Found user: {}", user.email);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by (already normalized) email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only `Some` fields in `data` are written. Absent fields keep their
    /// stored values.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if user doesn't exist
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists for another user
    /// - Database connection fails
    pub async fn update(
        pool: &PgPool,
        id: i32,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        if data.is_empty() {
            return Self::find_by_id(pool, id).await;
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE users SET ");
        let mut assignments = builder.separated(", ");

        if let Some(email) = data.email {
            assignments.push("email = ").push_bind_unseparated(email);
        }
        if let Some(password_hash) = data.password_hash {
            assignments.push("password_hash = ").push_bind_unseparated(password_hash);
        }
        if let Some(first_name) = data.first_name {
            assignments.push("first_name = ").push_bind_unseparated(first_name);
        }
        if let Some(last_name) = data.last_name {
            assignments.push("last_name = ").push_bind_unseparated(last_name);
        }

        builder.push(" WHERE id = ").push_bind(id);
        builder.push(format!(" RETURNING {USER_COLUMNS}"));

        let user = builder
            .build_query_as::<User>()
            .fetch_optional(pool)
            .await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Courses and tasks owned by the user are removed by the foreign key
    /// cascades.
    ///
    /// # Returns
    ///
    /// The deleted row, or None if the user didn't exist
    pub async fn delete(pool: &PgPool, id: i32) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "DELETE FROM users WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }
}
