/// Job posting model and database operations
///
/// Jobs are created by recruiters and mutated only by their owner
/// (`posted_by`). The public catalog search covers active postings with
/// case-insensitive substring filters and exact enum filters, newest-first.
///
/// `applications_count` is a best-effort display counter incremented after
/// each successful application insert; it can drift under partial failure.
/// [`Job::reconcile_applications_counts`] recomputes it from ground truth,
/// and an authoritative count must always come from counting application
/// rows.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE jobs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(100) NOT NULL,
///     description VARCHAR(2000) NOT NULL,
///     location VARCHAR(255) NOT NULL,
///     company VARCHAR(255) NOT NULL,
///     required_skills TEXT[] NOT NULL DEFAULT '{}',
///     tech_stack TEXT[] NOT NULL DEFAULT '{}',
///     experience_level experience_level NOT NULL,
///     job_type job_type NOT NULL DEFAULT 'Full-time',
///     salary_min BIGINT,
///     salary_max BIGINT,
///     salary_currency VARCHAR(10) NOT NULL DEFAULT 'USD',
///     deadline TIMESTAMPTZ NOT NULL,
///     posted_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     applications_count INTEGER NOT NULL DEFAULT 0,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Seniority bracket for a posting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "experience_level", rename_all = "PascalCase")]
pub enum ExperienceLevel {
    Entry,
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "Entry",
            ExperienceLevel::Mid => "Mid",
            ExperienceLevel::Senior => "Senior",
            ExperienceLevel::Lead => "Lead",
        }
    }
}

/// Employment type for a posting
///
/// Wire and database labels use the hyphenated forms ("Full-time").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "job_type")]
pub enum JobType {
    #[sqlx(rename = "Full-time")]
    #[serde(rename = "Full-time")]
    FullTime,

    #[sqlx(rename = "Part-time")]
    #[serde(rename = "Part-time")]
    PartTime,

    Contract,

    Internship,
}

impl JobType {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobType::FullTime => "Full-time",
            JobType::PartTime => "Part-time",
            JobType::Contract => "Contract",
            JobType::Internship => "Internship",
        }
    }
}

impl Default for JobType {
    fn default() -> Self {
        JobType::FullTime
    }
}

/// Job posting
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Job {
    /// Unique job ID
    pub id: Uuid,

    pub title: String,

    pub description: String,

    pub location: String,

    pub company: String,

    pub required_skills: Vec<String>,

    pub tech_stack: Vec<String>,

    pub experience_level: ExperienceLevel,

    pub job_type: JobType,

    pub salary_min: Option<i64>,

    pub salary_max: Option<i64>,

    pub salary_currency: String,

    /// Informational application deadline; listings do not filter on it
    pub deadline: DateTime<Utc>,

    /// Owning recruiter; the only principal allowed to mutate this job
    pub posted_by: Uuid,

    /// Inactive jobs are hidden from the public catalog but still visible
    /// to their owner
    pub is_active: bool,

    /// Best-effort counter of applications received (display only)
    pub applications_count: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new job
#[derive(Debug, Clone)]
pub struct CreateJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub company: String,
    pub required_skills: Vec<String>,
    pub tech_stack: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub deadline: DateTime<Utc>,
    pub posted_by: Uuid,
}

/// Input for replacing a job's editable fields
///
/// Skill lists default to empty when the caller omits them; `is_active`
/// keeps its current value when `None`.
#[derive(Debug, Clone)]
pub struct UpdateJob {
    pub title: String,
    pub description: String,
    pub location: String,
    pub company: String,
    pub required_skills: Vec<String>,
    pub tech_stack: Vec<String>,
    pub experience_level: ExperienceLevel,
    pub job_type: JobType,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub deadline: DateTime<Utc>,
    pub is_active: Option<bool>,
}

/// Public catalog filters
///
/// `search` and `location` are case-insensitive substring matches;
/// `experience_level` and `job_type` are exact.
#[derive(Debug, Clone, Default)]
pub struct JobFilters {
    /// Matches title OR description OR company
    pub search: Option<String>,
    pub location: Option<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub job_type: Option<JobType>,
}

/// Poster summary joined onto catalog results
#[derive(Debug, Clone, Serialize)]
pub struct PosterSummary {
    pub first_name: String,
    pub last_name: String,
    pub company: Option<String>,

    /// Only populated on single-job reads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Job joined with its poster's summary
#[derive(Debug, Clone, Serialize)]
pub struct JobWithPoster {
    #[serde(flatten)]
    pub job: Job,
    pub posted_by_user: PosterSummary,
}

#[derive(sqlx::FromRow)]
struct JobWithPosterRow {
    #[sqlx(flatten)]
    job: Job,
    poster_first_name: String,
    poster_last_name: String,
    poster_company: Option<String>,
    poster_email: Option<String>,
}

impl JobWithPosterRow {
    fn into_view(self, include_email: bool) -> JobWithPoster {
        JobWithPoster {
            job: self.job,
            posted_by_user: PosterSummary {
                first_name: self.poster_first_name,
                last_name: self.poster_last_name,
                company: self.poster_company,
                email: if include_email { self.poster_email } else { None },
            },
        }
    }
}

const JOB_COLUMNS: &str = "id, title, description, location, company, required_skills, tech_stack, \
                           experience_level, job_type, salary_min, salary_max, salary_currency, \
                           deadline, posted_by, is_active, applications_count, created_at, updated_at";

const JOB_COLUMNS_QUALIFIED: &str =
    "j.id, j.title, j.description, j.location, j.company, j.required_skills, j.tech_stack, \
     j.experience_level, j.job_type, j.salary_min, j.salary_max, j.salary_currency, \
     j.deadline, j.posted_by, j.is_active, j.applications_count, j.created_at, j.updated_at";

/// Escapes LIKE wildcards in user-supplied search input
fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Builds the WHERE clause for the public catalog search
///
/// Returns the clause and the number of bind parameters it consumes, so the
/// data query and the count query share identical filtering.
fn filter_clause(filters: &JobFilters) -> (String, usize) {
    let mut clause = String::from("j.is_active = TRUE");
    let mut binds = 0;

    if filters.search.is_some() {
        binds += 1;
        clause.push_str(&format!(
            " AND (j.title ILIKE ${0} OR j.description ILIKE ${0} OR j.company ILIKE ${0})",
            binds
        ));
    }
    if filters.location.is_some() {
        binds += 1;
        clause.push_str(&format!(" AND j.location ILIKE ${}", binds));
    }
    if filters.experience_level.is_some() {
        binds += 1;
        clause.push_str(&format!(" AND j.experience_level = ${}", binds));
    }
    if filters.job_type.is_some() {
        binds += 1;
        clause.push_str(&format!(" AND j.job_type = ${}", binds));
    }

    (clause, binds)
}

impl Job {
    /// Creates a new posting owned by `data.posted_by`
    ///
    /// Starts active with a zero applications counter.
    pub async fn create(pool: &PgPool, data: CreateJob) -> Result<Self, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            INSERT INTO jobs (title, description, location, company, required_skills, tech_stack,
                              experience_level, job_type, salary_min, salary_max, salary_currency,
                              deadline, posted_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {JOB_COLUMNS}
            "#,
        ))
        .bind(data.title)
        .bind(data.description)
        .bind(data.location)
        .bind(data.company)
        .bind(data.required_skills)
        .bind(data.tech_stack)
        .bind(data.experience_level)
        .bind(data.job_type)
        .bind(data.salary_min)
        .bind(data.salary_max)
        .bind(data.salary_currency)
        .bind(data.deadline)
        .bind(data.posted_by)
        .fetch_one(pool)
        .await?;

        Ok(job)
    }

    /// Finds a job by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(&format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(job)
    }

    /// Finds a job with its poster's summary (including email)
    pub async fn find_by_id_with_poster(
        pool: &PgPool,
        id: Uuid,
    ) -> Result<Option<JobWithPoster>, sqlx::Error> {
        let row = sqlx::query_as::<_, JobWithPosterRow>(&format!(
            r#"
            SELECT {JOB_COLUMNS_QUALIFIED},
                   u.first_name AS poster_first_name,
                   u.last_name AS poster_last_name,
                   u.company AS poster_company,
                   u.email AS poster_email
            FROM jobs j
            JOIN users u ON u.id = j.posted_by
            WHERE j.id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|r| r.into_view(true)))
    }

    /// Public catalog search over active postings, newest-first
    ///
    /// Filtering matches the count returned by [`Job::count_search`] exactly:
    /// both use the same WHERE clause.
    pub async fn search(
        pool: &PgPool,
        filters: &JobFilters,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<JobWithPoster>, sqlx::Error> {
        let (clause, binds) = filter_clause(filters);
        let sql = format!(
            r#"
            SELECT {JOB_COLUMNS_QUALIFIED},
                   u.first_name AS poster_first_name,
                   u.last_name AS poster_last_name,
                   u.company AS poster_company,
                   u.email AS poster_email
            FROM jobs j
            JOIN users u ON u.id = j.posted_by
            WHERE {clause}
            ORDER BY j.created_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            binds + 1,
            binds + 2,
        );

        let mut query = sqlx::query_as::<_, JobWithPosterRow>(&sql);
        query = bind_filters(query, filters);
        let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;

        Ok(rows.into_iter().map(|r| r.into_view(false)).collect())
    }

    /// Counts postings matching the catalog filters
    pub async fn count_search(pool: &PgPool, filters: &JobFilters) -> Result<i64, sqlx::Error> {
        let (clause, _) = filter_clause(filters);
        let sql = format!("SELECT COUNT(*) FROM jobs j WHERE {clause}");

        let mut query = sqlx::query_as::<_, (i64,)>(&sql);
        query = bind_filters(query, filters);
        let (count,) = query.fetch_one(pool).await?;

        Ok(count)
    }

    /// Replaces a job's editable fields
    ///
    /// Returns the updated job, or `None` if the job does not exist.
    /// Ownership is checked by the caller before this runs.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateJob,
    ) -> Result<Option<Self>, sqlx::Error> {
        let job = sqlx::query_as::<_, Job>(&format!(
            r#"
            UPDATE jobs
            SET title = $2, description = $3, location = $4, company = $5,
                required_skills = $6, tech_stack = $7, experience_level = $8,
                job_type = $9, salary_min = $10, salary_max = $11,
                salary_currency = $12, deadline = $13,
                is_active = COALESCE($14, is_active),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {JOB_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(data.title)
        .bind(data.description)
        .bind(data.location)
        .bind(data.company)
        .bind(data.required_skills)
        .bind(data.tech_stack)
        .bind(data.experience_level)
        .bind(data.job_type)
        .bind(data.salary_min)
        .bind(data.salary_max)
        .bind(data.salary_currency)
        .bind(data.deadline)
        .bind(data.is_active)
        .fetch_optional(pool)
        .await?;

        Ok(job)
    }

    /// Hard-deletes a job
    ///
    /// Applications referencing the job are left in place as orphans; their
    /// listings surface a null job summary.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM jobs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists a recruiter's own postings, active or not, newest-first
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let jobs = sqlx::query_as::<_, Job>(&format!(
            r#"
            SELECT {JOB_COLUMNS}
            FROM jobs
            WHERE posted_by = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(owner_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(jobs)
    }

    /// Counts a recruiter's own postings
    pub async fn count_by_owner(pool: &PgPool, owner_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE posted_by = $1")
            .bind(owner_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Increments the best-effort applications counter
    ///
    /// Runs as a separate statement after the application insert; a crash
    /// between the two leaves the counter low, which is acceptable for a
    /// display value.
    pub async fn increment_applications_count(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE jobs SET applications_count = applications_count + 1, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Recomputes every job's applications counter from actual rows
    ///
    /// Returns the number of jobs whose counter changed.
    pub async fn reconcile_applications_counts(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE jobs j
            SET applications_count = counted.actual
            FROM (
                SELECT j2.id, COUNT(a.id)::int AS actual
                FROM jobs j2
                LEFT JOIN applications a ON a.job_id = j2.id
                GROUP BY j2.id
            ) counted
            WHERE counted.id = j.id
              AND j.applications_count <> counted.actual
            "#,
        )
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }
}

/// Binds filter values in the same order `filter_clause` numbered them
fn bind_filters<'q, O>(
    mut query: sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments>,
    filters: &'q JobFilters,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, O, sqlx::postgres::PgArguments> {
    if let Some(search) = &filters.search {
        query = query.bind(format!("%{}%", escape_like(search)));
    }
    if let Some(location) = &filters.location {
        query = query.bind(format!("%{}%", escape_like(location)));
    }
    if let Some(level) = filters.experience_level {
        query = query.bind(level);
    }
    if let Some(job_type) = filters.job_type {
        query = query.bind(job_type);
    }
    query
}
