/// Common test utilities for integration tests
///
/// This module provides shared infrastructure for integration tests:
/// - Test database setup and cleanup
/// - Test user creation (candidates and recruiters)
/// - Session token generation
/// - Multipart body construction
///
/// Integration tests need a running PostgreSQL; when `DATABASE_URL` is not
/// set, [`TestContext::new`] returns `None` and each test skips itself.

use axum::body::Body;
use axum::http::Request;
use std::sync::Arc;

use sqlx::PgPool;
use talenthub_api::app::{build_router, AppState};
use talenthub_api::config::{ApiConfig, AuthConfig, Config, DatabaseConfig, StorageConfig};
use talenthub_shared::auth::session::{create_session_token, Claims};
use talenthub_shared::models::job::{CreateJob, ExperienceLevel, Job, JobType};
use talenthub_shared::models::user::{CreateUser, User, UserRole};
use talenthub_shared::storage::MemoryResumeStore;
use uuid::Uuid;

const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";

/// Test context containing the app, database, and cleanup bookkeeping
pub struct TestContext {
    pub db: PgPool,
    pub app: axum::Router,
    pub storage: Arc<MemoryResumeStore>,
    created_users: Vec<Uuid>,
}

impl TestContext {
    /// Creates a new test context, or `None` when no database is configured
    pub async fn new() -> anyhow::Result<Option<Self>> {
        let Ok(database_url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set; skipping integration test");
            return Ok(None);
        };

        let db = PgPool::connect(&database_url).await?;

        // Path relative to Cargo.toml, not this file
        sqlx::migrate!("../migrations").run(&db).await?;

        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["http://localhost:3000".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: 5,
            },
            auth: AuthConfig {
                session_secret: TEST_SECRET.to_string(),
                session_ttl_hours: 1,
            },
            storage: StorageConfig {
                bucket: "test".to_string(),
                endpoint: None,
                public_base_url: "memory://".to_string(),
            },
        };

        let storage = Arc::new(MemoryResumeStore::new());
        let state = AppState::new(db.clone(), storage.clone(), config);
        let app = build_router(state);

        Ok(Some(TestContext {
            db,
            app,
            storage,
            created_users: Vec::new(),
        }))
    }

    /// Creates a candidate with a profile resume already on file
    pub async fn create_candidate(&mut self) -> anyhow::Result<User> {
        self.create_candidate_with_resume(Some("memory://resumes/seed".to_string()))
            .await
    }

    /// Creates a candidate, optionally leaving the profile resume empty
    pub async fn create_candidate_with_resume(
        &mut self,
        resume_url: Option<String>,
    ) -> anyhow::Result<User> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("candidate-{}@example.com", Uuid::new_v4()),
                password_hash: "$argon2id$unused".to_string(),
                first_name: "Casey".to_string(),
                last_name: "Candidate".to_string(),
                role: UserRole::Candidate,
                company: None,
                phone: None,
                skills: vec!["rust".to_string()],
                resume_url,
            },
        )
        .await?;
        self.created_users.push(user.id);
        Ok(user)
    }

    /// Creates a recruiter
    pub async fn create_recruiter(&mut self) -> anyhow::Result<User> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("recruiter-{}@example.com", Uuid::new_v4()),
                password_hash: "$argon2id$unused".to_string(),
                first_name: "Riley".to_string(),
                last_name: "Recruiter".to_string(),
                role: UserRole::Recruiter,
                company: Some("Acme".to_string()),
                phone: None,
                skills: vec![],
                resume_url: None,
            },
        )
        .await?;
        self.created_users.push(user.id);
        Ok(user)
    }

    /// Creates a job owned by the given recruiter
    pub async fn create_job(&self, recruiter: &User, title: &str) -> anyhow::Result<Job> {
        let job = Job::create(
            &self.db,
            CreateJob {
                title: title.to_string(),
                description: "Build things".to_string(),
                location: "Berlin".to_string(),
                company: "Acme".to_string(),
                required_skills: vec!["rust".to_string()],
                tech_stack: vec!["axum".to_string()],
                experience_level: ExperienceLevel::Mid,
                job_type: JobType::FullTime,
                salary_min: Some(60_000),
                salary_max: Some(90_000),
                salary_currency: "EUR".to_string(),
                deadline: chrono::Utc::now() + chrono::Duration::days(30),
                posted_by: recruiter.id,
            },
        )
        .await?;
        Ok(job)
    }

    /// Issues a session token for a user
    pub fn token_for(&self, user: &User) -> anyhow::Result<String> {
        let claims = Claims::new(
            user.id,
            user.email.clone(),
            user.role,
            chrono::Duration::hours(1),
        );
        Ok(create_session_token(&claims, TEST_SECRET)?)
    }

    /// Returns an authorization header value for a user
    pub fn auth_header(&self, user: &User) -> anyhow::Result<String> {
        Ok(format!("Bearer {}", self.token_for(user)?))
    }

    /// Cleans up created test data
    ///
    /// Deleting users cascades to jobs and applications; orphaned
    /// applications (whose job is gone) still cascade via the candidate.
    pub async fn cleanup(&self) -> anyhow::Result<()> {
        for user_id in &self.created_users {
            User::delete(&self.db, *user_id).await?;
        }
        Ok(())
    }
}

/// Builds a `multipart/form-data` request body from text fields and an
/// optional file part
pub fn multipart_body(
    boundary: &str,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((name, content_type, bytes)) = file {
        body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"resume.pdf\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}

/// Builds a multipart request with the standard test boundary
pub fn multipart_request(
    uri: &str,
    auth: Option<&str>,
    fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Request<Body> {
    let boundary = "testboundary";
    let body = multipart_body(boundary, fields, file);

    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={boundary}"),
        );

    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }

    builder.body(Body::from(body)).expect("request build")
}
