/// User model and database operations
///
/// A user is either a candidate or a recruiter. The role is fixed at
/// registration and drives every authorization decision downstream.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     role user_role NOT NULL,
///     company VARCHAR(255),
///     phone VARCHAR(50),
///     skills TEXT[] NOT NULL DEFAULT '{}',
///     resume_url VARCHAR(512),
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use talenthub_shared::models::user::{CreateUser, User, UserRole};
/// use talenthub_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(&pool, CreateUser {
///     email: "candidate@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: "Sam".to_string(),
///     last_name: "Lee".to_string(),
///     role: UserRole::Candidate,
///     company: None,
///     phone: Some("+1 555 0100".to_string()),
///     skills: vec!["rust".to_string()],
///     resume_url: Some("https://cdn.example.com/resumes/abc.pdf".to_string()),
/// }).await?;
///
/// let found = User::find_by_email(&pool, "candidate@example.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Account role, immutable after registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Applies to jobs, owns applications
    Candidate,

    /// Posts jobs, reviews applications
    Recruiter,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Candidate => "candidate",
            UserRole::Recruiter => "recruiter",
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "candidate" => Ok(UserRole::Candidate),
            "recruiter" => Ok(UserRole::Recruiter),
            other => Err(format!("Invalid role: {}", other)),
        }
    }
}

/// User account
///
/// The password hash is never serialized into responses.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, unique across all users
    pub email: String,

    /// Argon2id password hash
    #[serde(skip_serializing)]
    pub password_hash: String,

    pub first_name: String,

    pub last_name: String,

    /// Candidate or recruiter
    pub role: UserRole,

    /// Employer name, recruiters only
    pub company: Option<String>,

    pub phone: Option<String>,

    /// Free-form skill tags
    pub skills: Vec<String>,

    /// Stored resume URL; set at registration for candidates and reused
    /// when an application supplies no new file
    pub resume_url: Option<String>,

    /// Inactive accounts cannot log in
    pub is_active: bool,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,

    /// Argon2id password hash (NOT a plaintext password)
    pub password_hash: String,

    pub first_name: String,
    pub last_name: String,
    pub role: UserRole,
    pub company: Option<String>,
    pub phone: Option<String>,
    pub skills: Vec<String>,
    pub resume_url: Option<String>,
}

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, role, company, phone, \
                            skills, resume_url, is_active, created_at, updated_at";

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Returns an error if the email already exists (unique constraint
    /// violation) or the database is unreachable.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, password_hash, first_name, last_name, role, company, phone, skills, resume_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(data.email)
        .bind(data.password_hash)
        .bind(data.first_name)
        .bind(data.last_name)
        .bind(data.role)
        .bind(data.company)
        .bind(data.phone)
        .bind(data.skills)
        .bind(data.resume_url)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// Used as the duplicate-email pre-check at registration; the unique
    /// constraint on `email` remains the backstop under races.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1",
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds an active user matching both email and role
    ///
    /// The login lookup. A missing user, a role mismatch, and an inactive
    /// account all come back as `None` so the caller cannot tell them apart.
    pub async fn find_active_by_email_and_role(
        pool: &PgPool,
        email: &str,
        role: UserRole,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1 AND role = $2 AND is_active = TRUE",
        ))
        .bind(email)
        .bind(role)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Deletes a user by ID
    ///
    /// Returns true if a row was deleted. Jobs posted by the user and
    /// applications submitted by the user are removed via cascading
    /// constraints; applications to the user's jobs survive as orphans.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Full display name
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
