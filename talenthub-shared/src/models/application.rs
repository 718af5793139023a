/// Application model and database operations
///
/// An application joins a candidate to a job. At most one application may
/// exist per `(job, candidate)` pair; the composite unique index enforces
/// this at insert time, so a concurrent duplicate apply fails at the write
/// rather than slipping past the pre-check.
///
/// # Status machine
///
/// ```text
/// Applied → {Shortlisted, Interview, Rejected, Hired}
/// ```
///
/// and freely among the four review statuses. No ordering is enforced:
/// [`ApplicationStatus::can_transition`] is the single seam where ordering
/// rules would go, and it currently accepts every enumerated target.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE applications (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     job_id UUID NOT NULL,                -- no FK: orphans survive job deletion
///     candidate_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     status application_status NOT NULL DEFAULT 'Applied',
///     resume_url VARCHAR(512) NOT NULL,
///     cover_letter VARCHAR(1000),
///     notes TEXT,
///     status_updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     status_updated_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE UNIQUE INDEX uq_applications_job_candidate ON applications (job_id, candidate_id);
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use super::job::{ExperienceLevel, JobType};

/// Review status of an application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "PascalCase")]
pub enum ApplicationStatus {
    /// Initial status on creation
    Applied,
    Shortlisted,
    Interview,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "Applied",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Interview => "Interview",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Hired => "Hired",
        }
    }

    /// Whether a recruiter may move an application from `self` to `target`
    ///
    /// Every enumerated target is legal today. Ordering constraints would be
    /// a product decision and belong here if one is ever made.
    pub fn can_transition(&self, _target: ApplicationStatus) -> bool {
        true
    }
}

/// Candidate application to a job
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Application {
    /// Unique application ID
    pub id: Uuid,

    /// Referenced job; may point at a deleted job (orphan)
    pub job_id: Uuid,

    /// Candidate who applied; immutable, as is everything else from the
    /// candidate's point of view after creation
    pub candidate_id: Uuid,

    pub status: ApplicationStatus,

    /// Resume snapshot at apply time (uploaded file or profile resume)
    pub resume_url: String,

    pub cover_letter: Option<String>,

    /// Recruiter notes, set alongside status updates
    pub notes: Option<String>,

    /// Refreshed only when the status value actually changes
    pub status_updated_at: DateTime<Utc>,

    /// Recruiter who last changed the status
    pub status_updated_by: Option<Uuid>,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new application
#[derive(Debug, Clone)]
pub struct CreateApplication {
    pub job_id: Uuid,
    pub candidate_id: Uuid,
    pub resume_url: String,
    pub cover_letter: Option<String>,
}

/// Job summary embedded in candidate-facing listings
#[derive(Debug, Clone, Serialize)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: String,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
    pub deadline: DateTime<Utc>,
}

/// Candidate summary embedded in recruiter-facing listings
#[derive(Debug, Clone, Serialize)]
pub struct CandidateSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub skills: Vec<String>,
}

/// Application expanded with its job summary (candidate view)
///
/// `job` is null when the posting has since been deleted.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithJob {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<JobSummary>,
}

/// Application expanded with its candidate summary (recruiter view)
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationWithCandidate {
    #[serde(flatten)]
    pub application: Application,
    pub candidate: CandidateSummary,
}

/// Fully expanded application: job summary, candidate summary, and the name
/// of whoever last updated the status
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationDetail {
    #[serde(flatten)]
    pub application: Application,
    pub job: Option<JobSummary>,
    pub candidate: CandidateSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_updated_by_name: Option<String>,
}

const APPLICATION_COLUMNS: &str =
    "id, job_id, candidate_id, status, resume_url, cover_letter, notes, \
     status_updated_at, status_updated_by, created_at, updated_at";

const APPLICATION_COLUMNS_QUALIFIED: &str =
    "a.id, a.job_id, a.candidate_id, a.status, a.resume_url, a.cover_letter, a.notes, \
     a.status_updated_at, a.status_updated_by, a.created_at, a.updated_at";

const JOB_SUMMARY_COLUMNS: &str =
    "j.id AS job_row_id, j.title AS job_title, j.company AS job_company, \
     j.location AS job_location, j.experience_level AS job_experience_level, \
     j.job_type AS job_job_type, j.deadline AS job_deadline";

const CANDIDATE_SUMMARY_COLUMNS: &str =
    "c.first_name AS candidate_first_name, c.last_name AS candidate_last_name, \
     c.email AS candidate_email, c.phone AS candidate_phone, c.skills AS candidate_skills";

#[derive(sqlx::FromRow)]
struct WithJobRow {
    #[sqlx(flatten)]
    application: Application,
    job_row_id: Option<Uuid>,
    job_title: Option<String>,
    job_company: Option<String>,
    job_location: Option<String>,
    job_experience_level: Option<ExperienceLevel>,
    job_job_type: Option<JobType>,
    job_deadline: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct WithCandidateRow {
    #[sqlx(flatten)]
    application: Application,
    candidate_first_name: String,
    candidate_last_name: String,
    candidate_email: String,
    candidate_phone: Option<String>,
    candidate_skills: Vec<String>,
}

#[derive(sqlx::FromRow)]
struct DetailRow {
    #[sqlx(flatten)]
    application: Application,
    job_row_id: Option<Uuid>,
    job_title: Option<String>,
    job_company: Option<String>,
    job_location: Option<String>,
    job_experience_level: Option<ExperienceLevel>,
    job_job_type: Option<JobType>,
    job_deadline: Option<DateTime<Utc>>,
    candidate_first_name: String,
    candidate_last_name: String,
    candidate_email: String,
    candidate_phone: Option<String>,
    candidate_skills: Vec<String>,
    updater_first_name: Option<String>,
    updater_last_name: Option<String>,
}

/// Rebuilds an optional job summary from LEFT JOIN columns
///
/// All columns are non-null in the jobs table, so either the whole set is
/// present (job still exists) or the whole set is absent (orphan).
#[allow(clippy::too_many_arguments)]
fn job_summary(
    id: Option<Uuid>,
    title: Option<String>,
    company: Option<String>,
    location: Option<String>,
    experience_level: Option<ExperienceLevel>,
    job_type: Option<JobType>,
    deadline: Option<DateTime<Utc>>,
) -> Option<JobSummary> {
    match (id, title, company, location, experience_level, job_type, deadline) {
        (
            Some(id),
            Some(title),
            Some(company),
            Some(location),
            Some(experience_level),
            Some(job_type),
            Some(deadline),
        ) => Some(JobSummary {
            id,
            title,
            company,
            location,
            experience_level,
            job_type,
            deadline,
        }),
        _ => None,
    }
}

impl WithJobRow {
    fn into_view(self) -> ApplicationWithJob {
        let job = job_summary(
            self.job_row_id,
            self.job_title,
            self.job_company,
            self.job_location,
            self.job_experience_level,
            self.job_job_type,
            self.job_deadline,
        );
        ApplicationWithJob {
            application: self.application,
            job,
        }
    }
}

impl WithCandidateRow {
    fn into_view(self) -> ApplicationWithCandidate {
        let candidate = CandidateSummary {
            id: self.application.candidate_id,
            first_name: self.candidate_first_name,
            last_name: self.candidate_last_name,
            email: self.candidate_email,
            phone: self.candidate_phone,
            skills: self.candidate_skills,
        };
        ApplicationWithCandidate {
            application: self.application,
            candidate,
        }
    }
}

impl DetailRow {
    fn into_view(self) -> ApplicationDetail {
        let job = job_summary(
            self.job_row_id,
            self.job_title,
            self.job_company,
            self.job_location,
            self.job_experience_level,
            self.job_job_type,
            self.job_deadline,
        );
        let candidate = CandidateSummary {
            id: self.application.candidate_id,
            first_name: self.candidate_first_name,
            last_name: self.candidate_last_name,
            email: self.candidate_email,
            phone: self.candidate_phone,
            skills: self.candidate_skills,
        };
        let status_updated_by_name = match (self.updater_first_name, self.updater_last_name) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            _ => None,
        };
        ApplicationDetail {
            application: self.application,
            job,
            candidate,
            status_updated_by_name,
        }
    }
}

impl Application {
    /// Inserts a new application at status `Applied`
    ///
    /// # Errors
    ///
    /// A duplicate `(job_id, candidate_id)` pair violates
    /// `uq_applications_job_candidate` and surfaces as a database error for
    /// the caller to map to a conflict. This is the authoritative duplicate
    /// check; the pre-read in the apply flow only exists for a friendlier
    /// common path.
    pub async fn create(pool: &PgPool, data: CreateApplication) -> Result<Self, sqlx::Error> {
        let application = sqlx::query_as::<_, Application>(&format!(
            r#"
            INSERT INTO applications (job_id, candidate_id, resume_url, cover_letter)
            VALUES ($1, $2, $3, $4)
            RETURNING {APPLICATION_COLUMNS}
            "#,
        ))
        .bind(data.job_id)
        .bind(data.candidate_id)
        .bind(data.resume_url)
        .bind(data.cover_letter)
        .fetch_one(pool)
        .await?;

        Ok(application)
    }

    /// Whether an application already exists for `(job, candidate)`
    pub async fn exists_for(
        pool: &PgPool,
        job_id: Uuid,
        candidate_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS (SELECT 1 FROM applications WHERE job_id = $1 AND candidate_id = $2)",
        )
        .bind(job_id)
        .bind(candidate_id)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Finds an application by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let application = sqlx::query_as::<_, Application>(&format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(application)
    }

    /// Fully expanded single-application view
    pub async fn find_detail(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<ApplicationDetail>, sqlx::Error> {
        let row = sqlx::query_as::<_, DetailRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS_QUALIFIED}, {JOB_SUMMARY_COLUMNS}, {CANDIDATE_SUMMARY_COLUMNS},
                   ub.first_name AS updater_first_name,
                   ub.last_name AS updater_last_name
            FROM applications a
            LEFT JOIN jobs j ON j.id = a.job_id
            JOIN users c ON c.id = a.candidate_id
            LEFT JOIN users ub ON ub.id = a.status_updated_by
            WHERE a.id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(DetailRow::into_view))
    }

    /// A candidate's own applications with job summaries, newest-first
    pub async fn list_by_candidate(
        pool: &PgPool,
        candidate_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApplicationWithJob>, sqlx::Error> {
        let rows = sqlx::query_as::<_, WithJobRow>(&format!(
            r#"
            SELECT {APPLICATION_COLUMNS_QUALIFIED}, {JOB_SUMMARY_COLUMNS}
            FROM applications a
            LEFT JOIN jobs j ON j.id = a.job_id
            WHERE a.candidate_id = $1
            ORDER BY a.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(candidate_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(rows.into_iter().map(WithJobRow::into_view).collect())
    }

    /// Counts a candidate's applications
    pub async fn count_by_candidate(
        pool: &PgPool,
        candidate_id: Uuid,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM applications WHERE candidate_id = $1")
                .bind(candidate_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Applications for one job with candidate summaries, newest-first
    ///
    /// Job existence and ownership are checked by the caller.
    pub async fn list_for_job(
        pool: &PgPool,
        job_id: Uuid,
        status: Option<ApplicationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApplicationWithCandidate>, sqlx::Error> {
        let status_clause = if status.is_some() {
            " AND a.status = $4"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT {APPLICATION_COLUMNS_QUALIFIED}, {CANDIDATE_SUMMARY_COLUMNS}
            FROM applications a
            JOIN users c ON c.id = a.candidate_id
            WHERE a.job_id = $1{status_clause}
            ORDER BY a.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        );

        let mut query = sqlx::query_as::<_, WithCandidateRow>(&sql)
            .bind(job_id)
            .bind(limit)
            .bind(offset);
        if let Some(status) = status {
            query = query.bind(status);
        }
        let rows = query.fetch_all(pool).await?;

        Ok(rows.into_iter().map(WithCandidateRow::into_view).collect())
    }

    /// Counts applications for one job, optionally by status
    pub async fn count_for_job(
        pool: &PgPool,
        job_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> Result<i64, sqlx::Error> {
        let count: i64 = if let Some(status) = status {
            sqlx::query_scalar(
                "SELECT COUNT(*) FROM applications WHERE job_id = $1 AND status = $2",
            )
            .bind(job_id)
            .bind(status)
            .fetch_one(pool)
            .await?
        } else {
            sqlx::query_scalar("SELECT COUNT(*) FROM applications WHERE job_id = $1")
                .bind(job_id)
                .fetch_one(pool)
                .await?
        };

        Ok(count)
    }

    /// Applications across every job owned by a recruiter, newest-first
    ///
    /// The owned-job set is computed inside the query rather than as a
    /// separate id fetch.
    pub async fn list_for_recruiter(
        pool: &PgPool,
        recruiter_id: Uuid,
        status: Option<ApplicationStatus>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApplicationDetail>, sqlx::Error> {
        let status_clause = if status.is_some() {
            " AND a.status = $4"
        } else {
            ""
        };
        let sql = format!(
            r#"
            SELECT {APPLICATION_COLUMNS_QUALIFIED}, {JOB_SUMMARY_COLUMNS}, {CANDIDATE_SUMMARY_COLUMNS},
                   ub.first_name AS updater_first_name,
                   ub.last_name AS updater_last_name
            FROM applications a
            JOIN jobs j ON j.id = a.job_id
            JOIN users c ON c.id = a.candidate_id
            LEFT JOIN users ub ON ub.id = a.status_updated_by
            WHERE j.posted_by = $1{status_clause}
            ORDER BY a.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        );

        let mut query = sqlx::query_as::<_, DetailRow>(&sql)
            .bind(recruiter_id)
            .bind(limit)
            .bind(offset);
        if let Some(status) = status {
            query = query.bind(status);
        }
        let rows = query.fetch_all(pool).await?;

        Ok(rows.into_iter().map(DetailRow::into_view).collect())
    }

    /// Counts applications across a recruiter's jobs, optionally by status
    pub async fn count_for_recruiter(
        pool: &PgPool,
        recruiter_id: Uuid,
        status: Option<ApplicationStatus>,
    ) -> Result<i64, sqlx::Error> {
        let count: i64 = if let Some(status) = status {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM applications a
                JOIN jobs j ON j.id = a.job_id
                WHERE j.posted_by = $1 AND a.status = $2
                "#,
            )
            .bind(recruiter_id)
            .bind(status)
            .fetch_one(pool)
            .await?
        } else {
            sqlx::query_scalar(
                r#"
                SELECT COUNT(*)
                FROM applications a
                JOIN jobs j ON j.id = a.job_id
                WHERE j.posted_by = $1
                "#,
            )
            .bind(recruiter_id)
            .fetch_one(pool)
            .await?
        };

        Ok(count)
    }

    /// Applies a recruiter's status decision
    ///
    /// Sets status, notes, and the updating recruiter. `status_updated_at`
    /// refreshes only when the status value actually changes, never on a
    /// notes-only edit or a same-status resubmission.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        status: ApplicationStatus,
        notes: Option<String>,
        updated_by: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let application = sqlx::query_as::<_, Application>(&format!(
            r#"
            UPDATE applications
            SET status_updated_at = CASE
                    WHEN status IS DISTINCT FROM $2 THEN NOW()
                    ELSE status_updated_at
                END,
                status = $2,
                notes = $3,
                status_updated_by = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING {APPLICATION_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(status)
        .bind(notes)
        .bind(updated_by)
        .fetch_optional(pool)
        .await?;

        Ok(application)
    }
}
