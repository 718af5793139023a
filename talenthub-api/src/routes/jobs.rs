/// Job posting endpoints
///
/// The public catalog (list and single read) requires no session. Writes
/// require a recruiter, and mutating an existing posting requires being its
/// owner. Ownership is checked after the fetch so a missing job reads as
/// 404 rather than leaking into a 403.
///
/// # Endpoints
///
/// - `GET /v1/jobs` - Search the public catalog
/// - `POST /v1/jobs` - Create a posting (recruiter)
/// - `GET /v1/jobs/recruiter/my-jobs` - Own postings, active or not
/// - `GET /v1/jobs/:id` - Single posting
/// - `PUT /v1/jobs/:id` - Replace a posting (owner)
/// - `DELETE /v1/jobs/:id` - Delete a posting (owner)

use crate::{
    app::{require_recruiter, AppState},
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use talenthub_shared::{
    auth::session::Principal,
    models::job::{CreateJob, ExperienceLevel, Job, JobFilters, JobType, JobWithPoster, UpdateJob},
    pagination::{PageQuery, Paginated},
};
use uuid::Uuid;
use validator::Validate;

/// Catalog query parameters: pagination plus filters
#[derive(Debug, Default, Deserialize)]
pub struct JobListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub search: Option<String>,
    pub location: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub job_type: Option<JobType>,
}

impl JobListQuery {
    fn filters(&self) -> JobFilters {
        JobFilters {
            search: self.search.clone().filter(|s| !s.is_empty()),
            location: self.location.clone().filter(|s| !s.is_empty()),
            experience_level: self.experience_level,
            job_type: self.job_type,
        }
    }
}

/// Create/update request body
///
/// The same shape serves both operations; updates are full replacements.
#[derive(Debug, Deserialize, Validate)]
pub struct JobRequest {
    #[validate(length(min = 1, max = 100, message = "Title must be 1-100 characters"))]
    pub title: String,

    #[validate(length(min = 1, max = 2000, message = "Description must be 1-2000 characters"))]
    pub description: String,

    #[validate(length(min = 1, max = 100, message = "Location must be 1-100 characters"))]
    pub location: String,

    #[validate(length(min = 1, max = 100, message = "Company must be 1-100 characters"))]
    pub company: String,

    #[serde(default)]
    pub required_skills: Vec<String>,

    #[serde(default)]
    pub tech_stack: Vec<String>,

    pub experience_level: ExperienceLevel,

    #[serde(default)]
    pub job_type: JobType,

    pub salary_min: Option<i64>,

    pub salary_max: Option<i64>,

    #[serde(default = "default_currency")]
    pub salary_currency: String,

    pub deadline: DateTime<Utc>,

    /// Only honored on update; postings are created active
    pub is_active: Option<bool>,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl JobRequest {
    fn check(&self) -> ApiResult<()> {
        self.validate()?;

        if let (Some(min), Some(max)) = (self.salary_min, self.salary_max) {
            if min > max {
                return Err(ApiError::validation(
                    "salary_min",
                    "salary_min must not exceed salary_max",
                ));
            }
        }
        if self.salary_min.is_some_and(|min| min < 0) || self.salary_max.is_some_and(|max| max < 0)
        {
            return Err(ApiError::validation("salary_min", "Salary must not be negative"));
        }

        Ok(())
    }
}

/// Search the public catalog
///
/// Only active postings appear. All filters combine with AND; `search`
/// matches title, description, or company case-insensitively.
///
/// # Endpoint
///
/// ```text
/// GET /v1/jobs?search=rust&location=berlin&experience_level=Senior&page=1&limit=10
/// ```
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobListQuery>,
) -> ApiResult<Json<Paginated<JobWithPoster>>> {
    let params = PageQuery {
        page: query.page,
        limit: query.limit,
    }
    .params();
    let filters = query.filters();

    let total = Job::count_search(&state.db, &filters).await?;
    let jobs = Job::search(&state.db, &filters, params.limit, params.offset()).await?;

    Ok(Json(Paginated::new(jobs, params, total)))
}

/// Single posting with its poster's contact details
///
/// # Errors
///
/// - `404 Not Found`: No such job
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<JobWithPoster>> {
    let job = Job::find_by_id_with_poster(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    Ok(Json(job))
}

/// Create a posting
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or invalid session
/// - `403 Forbidden`: Caller is not a recruiter
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_job(
    State(state): State<AppState>,
    principal: Principal,
    Json(req): Json<JobRequest>,
) -> ApiResult<(StatusCode, Json<Job>)> {
    require_recruiter(&principal)?;
    req.check()?;

    let job = Job::create(
        &state.db,
        CreateJob {
            title: req.title,
            description: req.description,
            location: req.location,
            company: req.company,
            required_skills: req.required_skills,
            tech_stack: req.tech_stack,
            experience_level: req.experience_level,
            job_type: req.job_type,
            salary_min: req.salary_min,
            salary_max: req.salary_max,
            salary_currency: req.salary_currency,
            deadline: req.deadline,
            posted_by: principal.user_id,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(job)))
}

/// Replace a posting
///
/// Full replacement: omitted list fields become empty, not kept. The one
/// exception is `is_active`, which keeps its current value when omitted.
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own this job
/// - `404 Not Found`: No such job
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_job(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(req): Json<JobRequest>,
) -> ApiResult<Json<Job>> {
    require_recruiter(&principal)?;

    let existing = Job::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;
    if existing.posted_by != principal.user_id {
        return Err(ApiError::Forbidden(
            "You can only update your own jobs".to_string(),
        ));
    }

    req.check()?;

    let job = Job::update(
        &state.db,
        id,
        UpdateJob {
            title: req.title,
            description: req.description,
            location: req.location,
            company: req.company,
            required_skills: req.required_skills,
            tech_stack: req.tech_stack,
            experience_level: req.experience_level,
            job_type: req.job_type,
            salary_min: req.salary_min,
            salary_max: req.salary_max,
            salary_currency: req.salary_currency,
            deadline: req.deadline,
            is_active: req.is_active,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;

    Ok(Json(job))
}

/// Delete a posting
///
/// Existing applications to the job are kept and become orphans; candidate
/// views surface them with a null job.
///
/// # Errors
///
/// - `403 Forbidden`: Caller does not own this job
/// - `404 Not Found`: No such job
pub async fn delete_job(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    require_recruiter(&principal)?;

    let existing = Job::find_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Job not found".to_string()))?;
    if existing.posted_by != principal.user_id {
        return Err(ApiError::Forbidden(
            "You can only delete your own jobs".to_string(),
        ));
    }

    Job::delete(&state.db, id).await?;

    Ok(Json(json!({ "message": "Job deleted" })))
}

/// A recruiter's own postings, including inactive ones
///
/// # Errors
///
/// - `403 Forbidden`: Caller is not a recruiter
pub async fn my_jobs(
    State(state): State<AppState>,
    principal: Principal,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<Paginated<Job>>> {
    require_recruiter(&principal)?;

    let params = query.params();
    let total = Job::count_by_owner(&state.db, principal.user_id).await?;
    let jobs = Job::list_by_owner(&state.db, principal.user_id, params.limit, params.offset())
        .await?;

    Ok(Json(Paginated::new(jobs, params, total)))
}
