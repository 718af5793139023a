/// Database models for TalentHub
///
/// This module contains all database models and their CRUD/query operations.
///
/// # Models
///
/// - `user`: Candidate and recruiter accounts
/// - `job`: Job postings with public search and owner-scoped mutation
/// - `application`: Candidate applications with status lifecycle
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
/// let new_user = CreateUser {
///     email: "jane@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
///     first_name: "Jane".to_string(),
///     last_name: "Doe".to_string(),
///     role: UserRole::Recruiter,
///     company: Some("Acme".to_string()),
///     phone: None,
///     skills: vec![],
///     resume_url: None,
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod application;
pub mod job;
pub mod user;
