/// Application endpoints
///
/// Candidates submit applications and read back their own; recruiters review
/// applications to jobs they own and move them through the status pipeline.
/// As with jobs, ownership checks come after the fetch so a missing resource
/// reads as 404.
///
/// # Endpoints
///
/// - `POST /v1/applications/apply/:job_id` - Apply to a job (candidate, multipart)
/// - `GET /v1/applications/my-applications` - Own applications (candidate)
/// - `GET /v1/applications/job/:job_id` - Applications to one job (owning recruiter)
/// - `GET /v1/applications/recruiter/all` - Applications across all owned jobs
/// - `PATCH /v1/applications/:id/status` - Status decision (owning recruiter)
/// - `GET /v1/applications/:id` - Single application (candidate or owning recruiter)

use crate::{
    app::{require_candidate, require_recruiter, AppState},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Deserialize;
use talenthub_shared::{
    auth::session::Principal,
    models::{
        application::{
            Application, ApplicationDetail, ApplicationStatus, ApplicationWithCandidate,
            ApplicationWithJob, CreateApplication,
        },
        job::Job,
        user::User,
    },
    pagination::{PageQuery, Paginated},
    storage::validate_resume,
};
use uuid::Uuid;
use validator::Validate;

const MAX_COVER_LETTER_CHARS: usize = 1000;

/// Pagination plus an optional status filter
#[derive(Debug, Default, Deserialize)]
pub struct ApplicationListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub status: Option<ApplicationStatus>,
}

/// Status decision request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    pub status: ApplicationStatus,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Fields collected from the apply multipart form
#[derive(Default)]
struct ApplyParts {
    cover_letter: Option<String>,
    resume: Option<(Bytes, String)>,
}

async fn read_apply_parts(mut multipart: Multipart) -> ApiResult<ApplyParts> {
    let mut parts = ApplyParts::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart body: {}", e)))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "resume" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("Failed to read resume: {}", e)))?;
                parts.resume = Some((bytes, content_type));
            }
            "cover_letter" => {
                let value = field.text().await.map_err(|e| {
                    ApiError::BadRequest(format!("Failed to read cover letter: {}", e))
                })?;
                parts.cover_letter = Some(value).filter(|v| !v.is_empty());
            }
            _ => {}
        }
    }

    Ok(parts)
}

/// Apply to a job
///
/// The resume attached to the application is resolved in order: a file
/// uploaded with this request, then the resume stored on the candidate's
/// profile. If neither exists the request fails validation.
///
/// The duplicate pre-check gives the common case a friendly message; the
/// composite unique index catches the race it can miss, and that database
/// error maps to the same 409.
///
/// # Endpoint
///
/// ```text
/// POST /v1/applications/apply/:job_id
/// Content-Type: multipart/form-data
///
/// cover_letter=...      (optional)
/// resume=@resume.pdf    (optional when the profile has one)
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a candidate
/// - `404 Not Found`: Job missing or inactive
/// - `409 Conflict`: Already applied to this job
/// - `413 / 415 / 502`: Resume size, type, or upload failure
/// - `422 Unprocessable Entity`: No resume available, or cover letter too long
pub async fn apply(
    State(state): State<AppState>,
    principal: Principal,
    Path(job_id): Path<Uuid>,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<Application>)> {
    require_candidate(&principal)?;

    // Inactive jobs are closed to new applications and read as missing
    let job = Job::find_by_id(&state.db, job_id)
        .await?
        .filter(|job| job.is_active)
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    if Application::exists_for(&state.db, job.id, principal.user_id).await? {
        return Err(ApiError::Conflict(
            "You have already applied to this job".to_string(),
        ));
    }

    let parts = read_apply_parts(multipart).await?;

    if let Some(cover_letter) = &parts.cover_letter {
        if cover_letter.chars().count() > MAX_COVER_LETTER_CHARS {
            return Err(ApiError::validation(
                "cover_letter",
                "Cover letter must be at most 1000 characters",
            ));
        }
    }

    let resume_url = match parts.resume {
        Some((bytes, content_type)) => {
            validate_resume(&bytes, &content_type)?;
            state.storage.upload(bytes, &content_type).await?
        }
        None => {
            let candidate = User::find_by_id(&state.db, principal.user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
            candidate
                .resume_url
                .ok_or_else(|| ApiError::validation("resume", "Resume is required"))?
        }
    };

    let application = Application::create(
        &state.db,
        CreateApplication {
            job_id: job.id,
            candidate_id: principal.user_id,
            resume_url,
            cover_letter: parts.cover_letter,
        },
    )
    .await?;

    // Display counter only; a failure here must not undo the application
    if let Err(e) = Job::increment_applications_count(&state.db, job.id).await {
        tracing::warn!(job_id = %job.id, "Failed to bump applications count: {}", e);
    }

    Ok((StatusCode::CREATED, Json(application)))
}

/// A candidate's own applications with job summaries
///
/// Applications to since-deleted jobs still appear, with `job` null.
pub async fn my_applications(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<ApplicationWithJob>>> {
    require_candidate(&principal)?;

    let params = query.params();
    let total = Application::count_by_candidate(&state.db, principal.user_id).await?;
    let applications = Application::list_by_candidate(
        &state.db,
        principal.user_id,
        params.limit,
        params.offset(),
    )
    .await?;

    Ok(Json(Paginated::new(applications, params, total)))
}

/// Applications to one job, for its owning recruiter
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own this job
/// - `404 Not Found`: No such job
pub async fn job_applications(
    State(state): State<AppState>,
    principal: Principal,
    Path(job_id): Path<Uuid>,
    Query(query): Query<ApplicationListQuery>,
) -> ApiResult<Json<Paginated<ApplicationWithCandidate>>> {
    require_recruiter(&principal)?;

    let job = Job::find_by_id(&state.db, job_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;
    if job.posted_by != principal.user_id {
        return Err(ApiError::Forbidden(
            "You can only view applications for your own jobs".to_string(),
        ));
    }

    let params = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .params();
    let total = Application::count_for_job(&state.db, job.id, query.status).await?;
    let applications = Application::list_for_job(
        &state.db,
        job.id,
        query.status,
        params.limit,
        params.offset(),
    )
    .await?;

    Ok(Json(Paginated::new(applications, params, total)))
}

/// Applications across every job the recruiter owns
pub async fn recruiter_applications(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<ApplicationListQuery>,
) -> ApiResult<Json<Paginated<ApplicationDetail>>> {
    require_recruiter(&principal)?;

    let params = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .params();
    let total =
        Application::count_for_recruiter(&state.db, principal.user_id, query.status).await?;
    let applications = Application::list_for_recruiter(
        &state.db,
        principal.user_id,
        query.status,
        params.limit,
        params.offset(),
    )
    .await?;

    Ok(Json(Paginated::new(applications, params, total)))
}

/// Apply a status decision to an application
///
/// Notes are replaced wholesale with each decision. The status timestamp
/// refreshes only when the status value actually changes.
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own the job applied to, or the job
///   has been deleted (ownership can no longer be established)
/// - `404 Not Found`: No such application
/// - `422 Unprocessable Entity`: Notes too long
pub async fn update_status(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> ApiResult<Json<Application>> {
    require_recruiter(&principal)?;
    req.validate()?;

    let application = Application::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    let owns_job = match Job::find_by_id(&state.db, application.job_id).await? {
        Some(job) => job.posted_by == principal.user_id,
        // Orphaned application: no owner exists anymore
        None => false,
    };
    if !owns_job {
        return Err(ApiError::Forbidden(
            "You can only review applications for your own jobs".to_string(),
        ));
    }

    if !application.status.can_transition(req.status) {
        return Err(ApiError::BadRequest(format!(
            "Cannot move application from {} to {}",
            application.status.as_str(),
            req.status.as_str(),
        )));
    }

    let updated = Application::update_status(
        &state.db,
        id,
        req.status,
        req.notes,
        principal.user_id,
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    Ok(Json(updated))
}

/// Single application with job, candidate, and reviewer details
///
/// Visible to the applying candidate and to the recruiter owning the job.
/// When the job has been deleted, only the candidate can still see it.
///
/// # Errors
///
/// - `403 Forbidden`: Caller is neither
/// - `404 Not Found`: No such application
pub async fn get_application(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApplicationDetail>> {
    let detail = Application::find_detail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Application not found".to_string()))?;

    let allowed = if detail.application.candidate_id == principal.user_id {
        true
    } else if principal.is_recruiter() {
        match Job::find_by_id(&state.db, detail.application.job_id).await? {
            Some(job) => job.posted_by == principal.user_id,
            None => false,
        }
    } else {
        false
    };

    if !allowed {
        return Err(ApiError::Forbidden(
            "You are not allowed to view this application".to_string(),
        ));
    }

    Ok(Json(detail))
}
