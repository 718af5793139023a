/// Session token generation and validation
///
/// Sessions are stateless: a session is a signed token carrying the
/// authenticated principal (user ID, email, role). Tokens are signed using
/// HS256 (HMAC-SHA256); validating a token is reading the session, with no
/// store lookup behind it. The trade-offs follow from that:
///
/// - logout cannot revoke anything and is a client-side discard
/// - profile fields captured in the claims (email, role) go stale until the
///   token is reissued
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: configurable, default 24 hours
/// - **Validation**: signature, expiration, and issuer checks
/// - **Secret Management**: secrets should be at least 32 bytes (256 bits)
///
/// # Example
///
/// ```
/// use talenthub_shared::auth::session::{create_session_token, validate_session_token, Claims};
/// use talenthub_shared::models::user::UserRole;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let user_id = Uuid::new_v4();
///
/// let claims = Claims::new(
///     user_id,
///     "jane@example.com".to_string(),
///     UserRole::Candidate,
///     chrono::Duration::hours(24),
/// );
/// let token = create_session_token(&claims, "your-secret-key")?;
///
/// let validated = validate_session_token(&token, "your-secret-key")?;
/// assert_eq!(validated.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::UserRole;

/// Issuer claim stamped into every session token
pub const SESSION_ISSUER: &str = "talenthub";

/// Error type for session token operations
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Failed to create token
    #[error("Failed to create session token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Session has expired")]
    Expired,

    /// Token failed validation (bad signature, issuer, or format)
    #[error("Invalid session token: {0}")]
    Invalid(String),
}

/// Session token claims
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "talenthub")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `email`: user email at login time
/// - `role`: user role at login time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "talenthub"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Email snapshot (custom claim)
    pub email: String,

    /// Role snapshot (custom claim)
    pub role: UserRole,
}

impl Claims {
    /// Creates new session claims
    pub fn new(user_id: Uuid, email: String, role: UserRole, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: SESSION_ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            email,
            role,
        }
    }

    /// Checks if the session has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Authenticated identity extracted from a validated session
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl Principal {
    pub fn is_recruiter(&self) -> bool {
        self.role == UserRole::Recruiter
    }

    pub fn is_candidate(&self) -> bool {
        self.role == UserRole::Candidate
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}

/// Signs session claims into a token
///
/// # Security
///
/// The secret should be:
/// - At least 32 bytes (256 bits) for HS256
/// - Randomly generated
/// - Stored securely (environment variable or secret manager)
///
/// # Errors
///
/// Returns `SessionError::CreateError` if encoding fails
pub fn create_session_token(claims: &Claims, secret: &str) -> Result<String, SessionError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| SessionError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a session token and extracts its claims
///
/// Verifies:
/// - Signature is valid
/// - Token hasn't expired
/// - Issuer is "talenthub"
/// - Token is not used before nbf time
///
/// # Errors
///
/// Returns `SessionError::Expired` for an expired session and
/// `SessionError::Invalid` for every other validation failure.
pub fn validate_session_token(token: &str, secret: &str) -> Result<Claims, SessionError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[SESSION_ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => SessionError::Expired,
        _ => SessionError::Invalid(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn sample_claims(expires_in: Duration) -> Claims {
        Claims::new(
            Uuid::new_v4(),
            "jane@example.com".to_string(),
            UserRole::Candidate,
            expires_in,
        )
    }

    #[test]
    fn test_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = Claims::new(
            user_id,
            "rex@example.com".to_string(),
            UserRole::Recruiter,
            Duration::hours(24),
        );

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.iss, SESSION_ISSUER);
        assert_eq!(claims.role, UserRole::Recruiter);
        assert!(!claims.is_expired());
    }

    #[test]
    fn test_create_and_validate_token() {
        let claims = sample_claims(Duration::hours(24));
        let token = create_session_token(&claims, SECRET).expect("Should create token");

        let validated = validate_session_token(&token, SECRET).expect("Should validate token");
        assert_eq!(validated.sub, claims.sub);
        assert_eq!(validated.email, "jane@example.com");
        assert_eq!(validated.role, UserRole::Candidate);
        assert_eq!(validated.iss, SESSION_ISSUER);
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let claims = sample_claims(Duration::hours(24));
        let token = create_session_token(&claims, SECRET).expect("Should create token");

        let result = validate_session_token(&token, "wrong-secret");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_expired_token() {
        // Expired an hour ago
        let claims = sample_claims(Duration::seconds(-3600));
        assert!(claims.is_expired());

        let token = create_session_token(&claims, SECRET).expect("Should create token");
        let result = validate_session_token(&token, SECRET);

        assert!(matches!(result, Err(SessionError::Expired)));
    }

    #[test]
    fn test_validate_wrong_issuer() {
        let mut claims = sample_claims(Duration::hours(1));
        claims.iss = "someone-else".to_string();

        let token = create_session_token(&claims, SECRET).expect("Should create token");
        let result = validate_session_token(&token, SECRET);

        assert!(matches!(result, Err(SessionError::Invalid(_))));
    }

    #[test]
    fn test_principal_role_checks() {
        let claims = sample_claims(Duration::hours(1));
        let principal = Principal::from(claims);

        assert!(principal.is_candidate());
        assert!(!principal.is_recruiter());
    }
}
