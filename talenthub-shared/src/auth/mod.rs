/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`session`]: signed session tokens carrying the authenticated principal
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations
/// - **Session Tokens**: HS256 signing with configurable expiration
/// - **Constant-time Comparison**: password verification is constant-time
///
/// # Example
///
/// ```no_run
/// use talenthub_shared::auth::password::{hash_password, verify_password};
/// use talenthub_shared::auth::session::{create_session_token, Claims};
/// use talenthub_shared::models::user::UserRole;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Password authentication
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// // Session token generation
/// let claims = Claims::new(
///     uuid::Uuid::new_v4(),
///     "jane@example.com".to_string(),
///     UserRole::Candidate,
///     chrono::Duration::hours(24),
/// );
/// let token = create_session_token(&claims, "secret-key")?;
/// # Ok(())
/// # }
/// ```

pub mod password;
pub mod session;
