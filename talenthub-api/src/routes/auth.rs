/// Authentication endpoints
///
/// This module provides user authentication endpoints:
/// - Registration (multipart, candidates attach a resume)
/// - Login
/// - Logout
/// - Session check
/// - Profile
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user
/// - `POST /v1/auth/login` - Login and get a session token
/// - `POST /v1/auth/logout` - End the session (client-side discard)
/// - `GET /v1/auth/check` - Report session validity without failing
/// - `GET /v1/auth/profile` - Current user's full profile

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::json;
use talenthub_shared::{
    auth::{password, session},
    models::user::{CreateUser, User, UserRole},
    storage::validate_resume,
};
use validator::Validate;

/// Registration fields collected from the multipart form
#[derive(Debug, Validate)]
pub struct RegisterForm {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(length(min = 1, max = 50, message = "First name must be 1-50 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name must be 1-50 characters"))]
    pub last_name: String,

    pub role: UserRole,

    #[validate(length(max = 100, message = "Company must be at most 100 characters"))]
    pub company: Option<String>,

    #[validate(length(max = 30, message = "Phone must be at most 30 characters"))]
    pub phone: Option<String>,

    pub skills: Vec<String>,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,

    /// Account type to log in as
    pub role: UserRole,
}

/// Register/login response: the user plus their session token
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
}

/// Splits a comma-separated skills field into trimmed, non-empty entries
fn parse_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// An uploaded file pulled out of the multipart form
struct UploadedFile {
    bytes: Bytes,
    content_type: String,
}

/// Accumulates multipart fields for registration
#[derive(Default)]
struct RegisterParts {
    email: Option<String>,
    password: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    role: Option<String>,
    company: Option<String>,
    phone: Option<String>,
    skills: Option<String>,
    resume: Option<UploadedFile>,
}

async fn read_register_parts(mut multipart: Multipart) -> ApiResult<RegisterParts> {
    let mut parts = RegisterParts::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        if name == "resume" {
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::BadRequest(format!("Failed to read resume: {}", e)))?;
            parts.resume = Some(UploadedFile {
                bytes,
                content_type,
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read field {}: {}", name, e)))?;

        match name.as_str() {
            "email" => parts.email = Some(value),
            "password" => parts.password = Some(value),
            "first_name" => parts.first_name = Some(value),
            "last_name" => parts.last_name = Some(value),
            "role" => parts.role = Some(value),
            "company" => parts.company = Some(value),
            "phone" => parts.phone = Some(value),
            "skills" => parts.skills = Some(value),
            // Unknown fields are ignored
            _ => {}
        }
    }

    Ok(parts)
}

fn require_field(value: Option<String>, field: &str) -> ApiResult<String> {
    value.ok_or_else(|| ApiError::validation(field, &format!("{} is required", field)))
}

/// Register a new user
///
/// Accepts a multipart form so candidates can attach their resume in the
/// same request. Candidates must attach one; recruiters must not need one.
/// The resume is uploaded to blob storage before the user row is written,
/// so a failed upload never leaves a user without their required resume.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: multipart/form-data
///
/// email=jane@example.com
/// password=secret1
/// first_name=Jane
/// last_name=Doe
/// role=candidate
/// skills=rust, sql
/// resume=@resume.pdf
/// ```
///
/// # Response
///
/// `201 Created` with the user and a session token:
///
/// ```json
/// { "user": { "id": "...", "email": "...", ... }, "token": "eyJ..." }
/// ```
///
/// # Errors
///
/// - `409 Conflict`: Email already in use
/// - `413 Payload Too Large`: Resume over the size limit
/// - `415 Unsupported Media Type`: Resume is not PDF/DOC/DOCX
/// - `422 Unprocessable Entity`: Validation failed, or candidate without resume
/// - `502 Bad Gateway`: Resume upload failed
pub async fn register(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let parts = read_register_parts(multipart).await?;

    let role_raw = require_field(parts.role, "role")?;
    let role: UserRole = role_raw
        .parse()
        .map_err(|_| ApiError::validation("role", "Role must be candidate or recruiter"))?;

    let form = RegisterForm {
        email: require_field(parts.email, "email")?,
        password: require_field(parts.password, "password")?,
        first_name: require_field(parts.first_name, "first_name")?,
        last_name: require_field(parts.last_name, "last_name")?,
        role,
        // Company is a recruiter-only field; drop whatever candidates send
        company: match role {
            UserRole::Recruiter => parts.company.filter(|c| !c.is_empty()),
            UserRole::Candidate => None,
        },
        phone: parts.phone.filter(|p| !p.is_empty()),
        skills: parts.skills.as_deref().map(parse_skills).unwrap_or_default(),
    };
    form.validate()?;

    // Reject taken emails before touching storage, so a duplicate
    // registration never leaves an orphaned resume in the bucket. The unique
    // constraint on users.email still backstops the race.
    if User::find_by_email(&state.db, &form.email).await?.is_some() {
        return Err(ApiError::Conflict("Email already in use".to_string()));
    }

    // Candidates register with a resume; recruiters don't carry one
    let resume_url = match (form.role, parts.resume) {
        (UserRole::Candidate, Some(file)) => {
            validate_resume(&file.bytes, &file.content_type)?;
            let url = state
                .storage
                .upload(file.bytes, &file.content_type)
                .await?;
            Some(url)
        }
        (UserRole::Candidate, None) => {
            return Err(ApiError::validation("resume", "Resume is required"));
        }
        (UserRole::Recruiter, _) => None,
    };

    let password_hash = password::hash_password(&form.password)?;

    let user = User::create(
        &state.db,
        CreateUser {
            email: form.email,
            password_hash,
            first_name: form.first_name,
            last_name: form.last_name,
            role: form.role,
            company: form.company,
            phone: form.phone,
            skills: form.skills,
            resume_url,
        },
    )
    .await?;

    let token = issue_session(&state, &user)?;

    Ok((
        StatusCode::CREATED,
        Json(SessionResponse { user, token }),
    ))
}

/// Login endpoint
///
/// Authenticates by email, password, and role. A wrong password, unknown
/// email, deactivated account, or role mismatch all produce the same 401
/// so the response can't be used to probe which accounts exist.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// { "email": "jane@example.com", "password": "secret1", "role": "candidate" }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Invalid credentials
/// - `422 Unprocessable Entity`: Validation failed
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    req.validate()?;

    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    let user = User::find_active_by_email_and_role(&state.db, &req.email, req.role)
        .await?
        .ok_or_else(invalid)?;

    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(invalid());
    }

    let token = issue_session(&state, &user)?;

    Ok(Json(SessionResponse { user, token }))
}

/// Logout endpoint
///
/// Sessions are stateless tokens, so there is nothing to revoke server-side;
/// the client discards its token. Logging out twice is fine.
pub async fn logout() -> Json<serde_json::Value> {
    Json(json!({ "message": "Logged out" }))
}

/// Session check endpoint
///
/// Reports whether the request carries a valid session. Never fails: a
/// missing, malformed, or expired token is an `authenticated: false`
/// answer, not an error. The reported identity comes from the token
/// itself and may lag behind the database.
pub async fn check(
    principal: Option<session::Principal>,
) -> Json<serde_json::Value> {
    match principal {
        Some(principal) => Json(json!({
            "authenticated": true,
            "user": {
                "id": principal.user_id,
                "email": principal.email,
                "role": principal.role,
            },
        })),
        None => Json(json!({ "authenticated": false })),
    }
}

/// Profile endpoint
///
/// Returns the current user's full database record, unlike `check` which
/// only echoes the session claims.
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid session
/// - `404 Not Found`: The account behind the session no longer exists
pub async fn profile(
    State(state): State<AppState>,
    principal: session::Principal,
) -> ApiResult<Json<User>> {
    let user = User::find_by_id(&state.db, principal.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

fn issue_session(state: &AppState, user: &User) -> ApiResult<String> {
    let claims = session::Claims::new(
        user.id,
        user.email.clone(),
        user.role,
        state.config.session_ttl(),
    );
    let token = session::create_session_token(&claims, state.session_secret())?;
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_skills() {
        assert_eq!(parse_skills("rust, sql ,  axum"), vec!["rust", "sql", "axum"]);
        assert_eq!(parse_skills(""), Vec::<String>::new());
        assert_eq!(parse_skills(" , ,"), Vec::<String>::new());
    }

    #[test]
    fn test_register_form_validation() {
        let form = RegisterForm {
            email: "not-an-email".to_string(),
            password: "short".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            role: UserRole::Candidate,
            company: None,
            phone: None,
            skills: vec![],
        };

        let errors = form.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("password"));
    }
}
