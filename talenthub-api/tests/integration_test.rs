/// Integration tests for the TalentHub API
///
/// These tests verify the full system works end-to-end:
/// - Registration and login with session tokens
/// - Job posting CRUD with ownership enforcement
/// - Application lifecycle (apply → review → status decision)
/// - Catalog search and pagination
///
/// They require a running PostgreSQL and skip themselves when
/// `DATABASE_URL` is not set.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{multipart_request, TestContext};
use serde_json::json;
use talenthub_shared::models::job::Job;
use talenthub_shared::models::user::User;
use tower::Service as _;
use uuid::Uuid;

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: serde_json::Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_request(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(auth) = auth {
        builder = builder.header("authorization", auth);
    }
    builder.body(Body::empty()).unwrap()
}

/// Candidate registration through the multipart endpoint
#[tokio::test]
async fn test_register_candidate_with_resume() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let email = format!("reg-{}@example.com", Uuid::new_v4());
    let request = multipart_request(
        "/v1/auth/register",
        None,
        &[
            ("email", &email),
            ("password", "secret1"),
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("role", "candidate"),
            ("skills", "rust, sql"),
        ],
        Some(("resume", "application/pdf", b"%PDF-1.7 test")),
    );

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert_eq!(body["user"]["email"], email);
    assert_eq!(body["user"]["role"], "candidate");
    assert!(body["user"]["resume_url"].is_string());
    assert!(body["token"].is_string());
    // The hash never leaves the server
    assert!(body["user"].get("password_hash").is_none());

    let user_id: Uuid = serde_json::from_value(body["user"]["id"].clone()).unwrap();
    User::delete(&ctx.db, user_id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Candidate registration without an attached resume is rejected
#[tokio::test]
async fn test_register_candidate_requires_resume() {
    let Some(ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let email = format!("reg-{}@example.com", Uuid::new_v4());
    let request = multipart_request(
        "/v1/auth/register",
        None,
        &[
            ("email", &email),
            ("password", "secret1"),
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("role", "candidate"),
        ],
        None,
    );

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

/// Registering a taken email conflicts before the resume reaches storage
#[tokio::test]
async fn test_register_duplicate_email_skips_upload() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let email = format!("reg-{}@example.com", Uuid::new_v4());
    let fields: &[(&str, &str)] = &[
        ("email", &email),
        ("password", "secret1"),
        ("first_name", "Jane"),
        ("last_name", "Doe"),
        ("role", "candidate"),
    ];
    let resume: Option<(&str, &str, &[u8])> = Some(("resume", "application/pdf", b"%PDF-1.7 test"));

    let response = ctx
        .app
        .clone()
        .call(multipart_request("/v1/auth/register", None, fields, resume))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(ctx.storage.upload_count(), 1);
    let body = body_json(response).await;
    let user_id: Uuid = serde_json::from_value(body["user"]["id"].clone()).unwrap();

    // Same email again: 409, and no orphaned object in the store
    let response = ctx
        .app
        .clone()
        .call(multipart_request("/v1/auth/register", None, fields, resume))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = body_json(response).await;
    assert_eq!(body["message"], "Email already in use");
    assert_eq!(ctx.storage.upload_count(), 1);

    User::delete(&ctx.db, user_id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Company is a recruiter field; candidates who send one get null back
#[tokio::test]
async fn test_register_candidate_drops_company() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let email = format!("reg-{}@example.com", Uuid::new_v4());
    let request = multipart_request(
        "/v1/auth/register",
        None,
        &[
            ("email", &email),
            ("password", "secret1"),
            ("first_name", "Jane"),
            ("last_name", "Doe"),
            ("role", "candidate"),
            ("company", "Acme"),
        ],
        Some(("resume", "application/pdf", b"%PDF-1.7 test")),
    );

    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert!(body["user"]["company"].is_null());

    let user_id: Uuid = serde_json::from_value(body["user"]["id"].clone()).unwrap();
    User::delete(&ctx.db, user_id).await.unwrap();
    ctx.cleanup().await.unwrap();
}

/// Logging in with the wrong role produces the same 401 as a bad password
#[tokio::test]
async fn test_login_role_mismatch() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let candidate = ctx.create_candidate().await.unwrap();

    // Role mismatch: account is a candidate
    let request = json_request(
        "POST",
        "/v1/auth/login",
        None,
        json!({ "email": candidate.email, "password": "anything", "role": "recruiter" }),
    );
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

/// Session check reports validity without ever failing
#[tokio::test]
async fn test_check_session() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    // No token: anonymous, not an error
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/auth/check", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["authenticated"], false);

    // Valid token: echoes the session identity
    let candidate = ctx.create_candidate().await.unwrap();
    let auth = ctx.auth_header(&candidate).unwrap();
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/auth/check", Some(&auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["authenticated"], true);
    assert_eq!(body["user"]["email"], candidate.email);

    // Garbage token: still a clean answer
    let response = ctx
        .app
        .clone()
        .call(get_request("/v1/auth/check", Some("Bearer not-a-token")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["authenticated"], false);

    ctx.cleanup().await.unwrap();
}

/// Applying twice to the same job is a conflict
#[tokio::test]
async fn test_apply_twice_conflicts() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let recruiter = ctx.create_recruiter().await.unwrap();
    let candidate = ctx.create_candidate().await.unwrap();
    let job = ctx.create_job(&recruiter, "Backend Engineer").await.unwrap();
    let auth = ctx.auth_header(&candidate).unwrap();

    let uri = format!("/v1/applications/apply/{}", job.id);
    let request = multipart_request(&uri, Some(&auth), &[("cover_letter", "Hello")], None);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Applied");

    let request = multipart_request(&uri, Some(&auth), &[], None);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    ctx.cleanup().await.unwrap();
}

/// A candidate with no profile resume and no upload cannot apply
#[tokio::test]
async fn test_apply_without_any_resume() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let recruiter = ctx.create_recruiter().await.unwrap();
    let candidate = ctx.create_candidate_with_resume(None).await.unwrap();
    let job = ctx.create_job(&recruiter, "Backend Engineer").await.unwrap();
    let auth = ctx.auth_header(&candidate).unwrap();

    let uri = format!("/v1/applications/apply/{}", job.id);
    let request = multipart_request(&uri, Some(&auth), &[], None);
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    ctx.cleanup().await.unwrap();
}

/// Only the owning recruiter may update or delete a job
#[tokio::test]
async fn test_job_ownership_enforced() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let owner = ctx.create_recruiter().await.unwrap();
    let other = ctx.create_recruiter().await.unwrap();
    let job = ctx.create_job(&owner, "Platform Engineer").await.unwrap();
    let other_auth = ctx.auth_header(&other).unwrap();

    let update_body = json!({
        "title": "Hijacked",
        "description": "x",
        "location": "Berlin",
        "company": "Acme",
        "experience_level": "Mid",
        "job_type": "Full-time",
        "deadline": chrono::Utc::now() + chrono::Duration::days(5),
    });

    let uri = format!("/v1/jobs/{}", job.id);
    let response = ctx
        .app
        .clone()
        .call(json_request("PUT", &uri, Some(&other_auth), update_body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let mut builder = Request::builder().method("DELETE").uri(&uri);
    builder = builder.header("authorization", &other_auth);
    let response = ctx
        .app
        .clone()
        .call(builder.body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Catalog filters are exact for experience level and paginate correctly
#[tokio::test]
async fn test_catalog_filter_and_pagination() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let recruiter = ctx.create_recruiter().await.unwrap();
    // A unique search term keeps this test isolated from other rows
    let marker = format!("needle{}", Uuid::new_v4().simple());
    for i in 0..3 {
        ctx.create_job(&recruiter, &format!("{} role {}", marker, i))
            .await
            .unwrap();
    }

    // All three jobs are Mid; a Senior filter must not loosely match
    let uri = format!("/v1/jobs?search={}&experience_level=Senior", marker);
    let response = ctx.app.clone().call(get_request(&uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pagination"]["total"], 0);

    // Page 2 of limit 2 holds the remaining item, with the real total
    let uri = format!("/v1/jobs?search={}&page=2&limit=2", marker);
    let response = ctx.app.clone().call(get_request(&uri, None)).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["pagination"]["total"], 3);
    assert_eq!(body["pagination"]["pages"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    // A page past the end is empty, not an error
    let uri = format!("/v1/jobs?search={}&page=9&limit=2", marker);
    let response = ctx.app.clone().call(get_request(&uri, None)).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["items"].as_array().unwrap().len(), 0);
    assert_eq!(body["pagination"]["total"], 3);

    ctx.cleanup().await.unwrap();
}

/// Recruiters only see applications to their own jobs
#[tokio::test]
async fn test_application_visibility_per_recruiter() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let owner = ctx.create_recruiter().await.unwrap();
    let other = ctx.create_recruiter().await.unwrap();
    let candidate = ctx.create_candidate().await.unwrap();
    let job = ctx.create_job(&owner, "Data Engineer").await.unwrap();

    let candidate_auth = ctx.auth_header(&candidate).unwrap();
    let apply_uri = format!("/v1/applications/apply/{}", job.id);
    let response = ctx
        .app
        .clone()
        .call(multipart_request(&apply_uri, Some(&candidate_auth), &[], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let list_uri = format!("/v1/applications/job/{}", job.id);

    // Owner sees the application
    let owner_auth = ctx.auth_header(&owner).unwrap();
    let response = ctx
        .app
        .clone()
        .call(get_request(&list_uri, Some(&owner_auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["items"][0]["candidate"]["email"], candidate.email);

    // Another recruiter is refused
    let other_auth = ctx.auth_header(&other).unwrap();
    let response = ctx
        .app
        .clone()
        .call(get_request(&list_uri, Some(&other_auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    ctx.cleanup().await.unwrap();
}

/// Status decisions update the application and record the reviewer
#[tokio::test]
async fn test_status_decision_flow() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let recruiter = ctx.create_recruiter().await.unwrap();
    let candidate = ctx.create_candidate().await.unwrap();
    let job = ctx.create_job(&recruiter, "SRE").await.unwrap();

    let candidate_auth = ctx.auth_header(&candidate).unwrap();
    let apply_uri = format!("/v1/applications/apply/{}", job.id);
    let response = ctx
        .app
        .clone()
        .call(multipart_request(&apply_uri, Some(&candidate_auth), &[], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let application = body_json(response).await;
    let application_id = application["id"].as_str().unwrap().to_string();

    let recruiter_auth = ctx.auth_header(&recruiter).unwrap();
    let status_uri = format!("/v1/applications/{}/status", application_id);
    let response = ctx
        .app
        .clone()
        .call(json_request(
            "PATCH",
            &status_uri,
            Some(&recruiter_auth),
            json!({ "status": "Shortlisted", "notes": "Strong CV" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Shortlisted");
    assert_eq!(body["notes"], "Strong CV");
    assert_eq!(body["status_updated_by"], recruiter.id.to_string());

    // Candidate sees the decision, including the reviewer's name
    let detail_uri = format!("/v1/applications/{}", application_id);
    let response = ctx
        .app
        .clone()
        .call(get_request(&detail_uri, Some(&candidate_auth)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "Shortlisted");
    assert_eq!(body["status_updated_by_name"], "Riley Recruiter");

    ctx.cleanup().await.unwrap();
}

/// Candidate listings survive job deletion, with a null job summary
#[tokio::test]
async fn test_orphaned_application_listing() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let recruiter = ctx.create_recruiter().await.unwrap();
    let candidate = ctx.create_candidate().await.unwrap();
    let job = ctx.create_job(&recruiter, "Ephemeral role").await.unwrap();

    let candidate_auth = ctx.auth_header(&candidate).unwrap();
    let apply_uri = format!("/v1/applications/apply/{}", job.id);
    let response = ctx
        .app
        .clone()
        .call(multipart_request(&apply_uri, Some(&candidate_auth), &[], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Owner deletes the posting
    let recruiter_auth = ctx.auth_header(&recruiter).unwrap();
    let delete_uri = format!("/v1/jobs/{}", job.id);
    let request = Request::builder()
        .method("DELETE")
        .uri(&delete_uri)
        .header("authorization", &recruiter_auth)
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The application survives with job: null
    let response = ctx
        .app
        .clone()
        .call(get_request(
            "/v1/applications/my-applications",
            Some(&candidate_auth),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pagination"]["total"], 1);
    assert!(body["items"][0]["job"].is_null());

    ctx.cleanup().await.unwrap();
}

/// Deactivated postings stop taking applications
#[tokio::test]
async fn test_apply_to_inactive_job_not_found() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let recruiter = ctx.create_recruiter().await.unwrap();
    let candidate = ctx.create_candidate().await.unwrap();
    let job = ctx.create_job(&recruiter, "Paused role").await.unwrap();

    sqlx::query("UPDATE jobs SET is_active = FALSE WHERE id = $1")
        .bind(job.id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let candidate_auth = ctx.auth_header(&candidate).unwrap();
    let apply_uri = format!("/v1/applications/apply/{}", job.id);
    let response = ctx
        .app
        .clone()
        .call(multipart_request(&apply_uri, Some(&candidate_auth), &[], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    ctx.cleanup().await.unwrap();
}

/// Reconciliation restores a drifted applications counter from actual rows
#[tokio::test]
async fn test_applications_count_reconciliation() {
    let Some(mut ctx) = TestContext::new().await.unwrap() else {
        return;
    };

    let recruiter = ctx.create_recruiter().await.unwrap();
    let candidate = ctx.create_candidate().await.unwrap();
    let job = ctx.create_job(&recruiter, "Counted role").await.unwrap();

    let candidate_auth = ctx.auth_header(&candidate).unwrap();
    let apply_uri = format!("/v1/applications/apply/{}", job.id);
    let response = ctx
        .app
        .clone()
        .call(multipart_request(&apply_uri, Some(&candidate_auth), &[], None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    // Simulate drift, e.g. a lost increment after a crash
    sqlx::query("UPDATE jobs SET applications_count = 41 WHERE id = $1")
        .bind(job.id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let changed = Job::reconcile_applications_counts(&ctx.db).await.unwrap();
    assert!(changed >= 1);

    let reconciled = Job::find_by_id(&ctx.db, job.id).await.unwrap().unwrap();
    assert_eq!(reconciled.applications_count, 1);

    ctx.cleanup().await.unwrap();
}
