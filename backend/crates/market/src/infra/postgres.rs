//! PostgreSQL Repository Implementations
//!
//! Read-modify-write operations lock the bounty (or submission) row with
//! `SELECT ... FOR UPDATE`, run the domain rule on the locked copy and write
//! it back before committing. Returning early drops the transaction, which
//! rolls it back.
//!
//! Lock order is bounty, then submission, then `users` rows by ascending id.

use chrono::{DateTime, Utc};
use kernel::id::{BountyId, CommentId, SubmissionId, UserId};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::domain::entities::{Bounty, Comment, Submission};
use crate::domain::repository::{
    AwardOutcome, AwardRepository, BountyFilter, BountyRepository, CommentRepository, Page, Paged,
    SubmissionRepository,
};
use crate::domain::services::{AwardSettlement, settle_award};
use crate::domain::value_objects::{
    BountyStatus, Category, Difficulty, SubmissionStatus, Visibility,
};
use crate::error::{MarketError, MarketResult};

/// PostgreSQL-backed market repository
#[derive(Clone)]
pub struct PgMarketRepository {
    pool: PgPool,
}

impl PgMarketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const BOUNTY_COLUMNS: &str = r#"
    id,
    poster_id,
    title,
    brief,
    detailed_spec,
    budget_min,
    budget_max,
    deadline,
    category,
    difficulty,
    tags,
    tech_stack,
    max_submissions,
    submission_count,
    visibility,
    status,
    winner_id,
    awarded_amount,
    created_at,
    updated_at
"#;

const SUBMISSION_COLUMNS: &str = r#"
    id,
    bounty_id,
    builder_id,
    title,
    description,
    repo_url,
    preview_url,
    tech_used,
    status,
    score,
    feedback,
    reviewed_at,
    deployed_at,
    created_at,
    updated_at
"#;

/// Shared by the page query and the count query; binds $1..$6
const BOUNTY_FILTER: &str = r#"
    WHERE ($1::text IS NULL OR status = $1)
      AND ($2::text IS NULL OR category = $2)
      AND ($3::text IS NULL OR difficulty = $3)
      AND ($4::uuid IS NULL OR poster_id = $4)
      AND ($5::text IS NULL OR title ILIKE $5 ESCAPE '\' OR brief ILIKE $5 ESCAPE '\')
      AND ($6 OR visibility = 'public')
"#;

/// `%term%` with LIKE metacharacters escaped
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for c in search.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

fn duplicate_submission(err: sqlx::Error) -> MarketError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => MarketError::DuplicateSubmission,
        _ => MarketError::Database(err),
    }
}

// ============================================================================
// Row helpers
// ============================================================================

async fn lock_bounty(conn: &mut PgConnection, id: BountyId) -> MarketResult<Option<Bounty>> {
    let row = sqlx::query_as::<_, BountyRow>(&format!(
        "SELECT {BOUNTY_COLUMNS} FROM bounties WHERE id = $1 FOR UPDATE"
    ))
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(BountyRow::into_bounty).transpose()
}

async fn lock_submission(
    conn: &mut PgConnection,
    id: SubmissionId,
) -> MarketResult<Option<Submission>> {
    let row = sqlx::query_as::<_, SubmissionRow>(&format!(
        "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1 FOR UPDATE"
    ))
    .bind(id.as_uuid())
    .fetch_optional(&mut *conn)
    .await?;

    row.map(SubmissionRow::into_submission).transpose()
}

/// Write back every mutable bounty column
async fn save_bounty(conn: &mut PgConnection, bounty: &Bounty) -> MarketResult<()> {
    sqlx::query(
        r#"
        UPDATE bounties SET
            title = $2,
            brief = $3,
            detailed_spec = $4,
            budget_min = $5,
            budget_max = $6,
            deadline = $7,
            category = $8,
            difficulty = $9,
            tags = $10,
            tech_stack = $11,
            max_submissions = $12,
            submission_count = $13,
            visibility = $14,
            status = $15,
            winner_id = $16,
            awarded_amount = $17,
            updated_at = $18
        WHERE id = $1
        "#,
    )
    .bind(bounty.id.as_uuid())
    .bind(&bounty.title)
    .bind(&bounty.brief)
    .bind(&bounty.detailed_spec)
    .bind(bounty.budget_min)
    .bind(bounty.budget_max)
    .bind(bounty.deadline)
    .bind(bounty.category.map(|c| c.code()))
    .bind(bounty.difficulty.map(|d| d.code()))
    .bind(&bounty.tags)
    .bind(&bounty.tech_stack)
    .bind(bounty.max_submissions)
    .bind(bounty.submission_count)
    .bind(bounty.visibility.code())
    .bind(bounty.status.code())
    .bind(bounty.winner_id.map(|id| id.into_uuid()))
    .bind(bounty.awarded_amount)
    .bind(bounty.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Write back every mutable submission column
async fn save_submission(conn: &mut PgConnection, submission: &Submission) -> MarketResult<()> {
    sqlx::query(
        r#"
        UPDATE submissions SET
            title = $2,
            description = $3,
            repo_url = $4,
            preview_url = $5,
            tech_used = $6,
            status = $7,
            score = $8,
            feedback = $9,
            reviewed_at = $10,
            deployed_at = $11,
            updated_at = $12
        WHERE id = $1
        "#,
    )
    .bind(submission.id.as_uuid())
    .bind(&submission.title)
    .bind(&submission.description)
    .bind(&submission.repo_url)
    .bind(&submission.preview_url)
    .bind(&submission.tech_used)
    .bind(submission.status.code())
    .bind(submission.score)
    .bind(&submission.feedback)
    .bind(submission.reviewed_at)
    .bind(submission.deployed_at)
    .bind(submission.updated_at)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Winner and poster aggregates for a settled award.
///
/// Both `users` rows are locked in ascending id order first, so two awards
/// whose poster and builder are swapped cannot deadlock on each other.
async fn credit_award(
    conn: &mut PgConnection,
    settlement: &AwardSettlement,
    now: DateTime<Utc>,
) -> MarketResult<()> {
    sqlx::query("SELECT id FROM users WHERE id IN ($1, $2) ORDER BY id FOR UPDATE")
        .bind(settlement.builder_id.as_uuid())
        .bind(settlement.poster_id.as_uuid())
        .fetch_all(&mut *conn)
        .await?;

    sqlx::query(
        r#"
        UPDATE users
        SET total_earned = total_earned + CASE WHEN id = $1 THEN $3 ELSE 0 END,
            reputation = reputation + CASE WHEN id = $1 THEN $4 ELSE 0 END,
            total_posted = total_posted + CASE WHEN id = $2 THEN $3 ELSE 0 END,
            updated_at = $5
        WHERE id IN ($1, $2)
        "#,
    )
    .bind(settlement.builder_id.as_uuid())
    .bind(settlement.poster_id.as_uuid())
    .bind(settlement.amount)
    .bind(settlement.reputation_bonus)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

// ============================================================================
// Bounty Repository Implementation
// ============================================================================

impl BountyRepository for PgMarketRepository {
    async fn create_bounty(&self, bounty: &Bounty) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO bounties (
                id,
                poster_id,
                title,
                brief,
                detailed_spec,
                budget_min,
                budget_max,
                deadline,
                category,
                difficulty,
                tags,
                tech_stack,
                max_submissions,
                submission_count,
                visibility,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(bounty.id.as_uuid())
        .bind(bounty.poster_id.as_uuid())
        .bind(&bounty.title)
        .bind(&bounty.brief)
        .bind(&bounty.detailed_spec)
        .bind(bounty.budget_min)
        .bind(bounty.budget_max)
        .bind(bounty.deadline)
        .bind(bounty.category.map(|c| c.code()))
        .bind(bounty.difficulty.map(|d| d.code()))
        .bind(&bounty.tags)
        .bind(&bounty.tech_stack)
        .bind(bounty.max_submissions)
        .bind(bounty.submission_count)
        .bind(bounty.visibility.code())
        .bind(bounty.status.code())
        .bind(bounty.created_at)
        .bind(bounty.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_bounty(&self, id: BountyId) -> MarketResult<Option<Bounty>> {
        let row = sqlx::query_as::<_, BountyRow>(&format!(
            "SELECT {BOUNTY_COLUMNS} FROM bounties WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(BountyRow::into_bounty).transpose()
    }

    async fn list_bounties(
        &self,
        filter: &BountyFilter,
        page: Page,
    ) -> MarketResult<Paged<Bounty>> {
        let status = filter.status.map(|s| s.code());
        let category = filter.category.map(|c| c.code());
        let difficulty = filter.difficulty.map(|d| d.code());
        let poster_id = filter.poster_id.map(|id| id.into_uuid());
        let search = filter.search.as_deref().map(like_pattern);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM bounties {BOUNTY_FILTER}"
        ))
        .bind(status)
        .bind(category)
        .bind(difficulty)
        .bind(poster_id)
        .bind(search.as_deref())
        .bind(filter.include_private)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, BountyRow>(&format!(
            "SELECT {BOUNTY_COLUMNS} FROM bounties {BOUNTY_FILTER} \
             ORDER BY created_at DESC, id LIMIT $7 OFFSET $8"
        ))
        .bind(status)
        .bind(category)
        .bind(difficulty)
        .bind(poster_id)
        .bind(search.as_deref())
        .bind(filter.include_private)
        .bind(page.limit)
        .bind(page.offset)
        .fetch_all(&self.pool)
        .await?;

        let items = rows
            .into_iter()
            .map(BountyRow::into_bounty)
            .collect::<MarketResult<Vec<_>>>()?;

        Ok(Paged { items, total, page })
    }

    async fn update_bounty<F>(&self, id: BountyId, change: F) -> MarketResult<Bounty>
    where
        F: FnOnce(&mut Bounty) -> MarketResult<()> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let mut bounty = lock_bounty(&mut tx, id)
            .await?
            .ok_or(MarketError::BountyNotFound)?;
        change(&mut bounty)?;
        save_bounty(&mut tx, &bounty).await?;

        tx.commit().await?;

        Ok(bounty)
    }

    async fn expire_overdue(&self, now: DateTime<Utc>) -> MarketResult<u64> {
        // Same predicate as Bounty::is_overdue
        let expired = sqlx::query(
            r#"
            UPDATE bounties
            SET status = 'expired', updated_at = $1
            WHERE status IN ('open', 'in_review')
              AND deadline IS NOT NULL
              AND deadline < $1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(expired)
    }
}

// ============================================================================
// Submission Repository Implementation
// ============================================================================

impl SubmissionRepository for PgMarketRepository {
    async fn create_submission(&self, submission: &Submission) -> MarketResult<Bounty> {
        let mut tx = self.pool.begin().await?;

        let mut bounty = lock_bounty(&mut tx, submission.bounty_id)
            .await?
            .ok_or(MarketError::BountyNotFound)?;

        let already_submitted = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM submissions WHERE bounty_id = $1 AND builder_id = $2)",
        )
        .bind(submission.bounty_id.as_uuid())
        .bind(submission.builder_id.as_uuid())
        .fetch_one(&mut *tx)
        .await?;

        if bounty.expire_if_overdue(submission.created_at) {
            // Keep the expiry even though the submission is refused
            save_bounty(&mut tx, &bounty).await?;
            tx.commit().await?;
            tracing::info!(bounty_id = %bounty.id, "Bounty expired on late submission");
            return Err(MarketError::BountyNotOpen {
                status: bounty.status.to_string(),
            });
        }
        bounty.accept_submission(already_submitted, submission.created_at)?;

        sqlx::query(
            r#"
            INSERT INTO submissions (
                id,
                bounty_id,
                builder_id,
                title,
                description,
                repo_url,
                preview_url,
                tech_used,
                status,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(submission.id.as_uuid())
        .bind(submission.bounty_id.as_uuid())
        .bind(submission.builder_id.as_uuid())
        .bind(&submission.title)
        .bind(&submission.description)
        .bind(&submission.repo_url)
        .bind(&submission.preview_url)
        .bind(&submission.tech_used)
        .bind(submission.status.code())
        .bind(submission.created_at)
        .bind(submission.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(duplicate_submission)?;

        sqlx::query("UPDATE bounties SET submission_count = $2 WHERE id = $1")
            .bind(bounty.id.as_uuid())
            .bind(bounty.submission_count)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(bounty)
    }

    async fn find_submission(&self, id: SubmissionId) -> MarketResult<Option<Submission>> {
        let row = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(SubmissionRow::into_submission).transpose()
    }

    async fn list_submissions_for_bounty(
        &self,
        bounty_id: BountyId,
    ) -> MarketResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE bounty_id = $1 \
             ORDER BY created_at ASC, id"
        ))
        .bind(bounty_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SubmissionRow::into_submission).collect()
    }

    async fn list_submissions_by_builder(
        &self,
        builder_id: UserId,
    ) -> MarketResult<Vec<Submission>> {
        let rows = sqlx::query_as::<_, SubmissionRow>(&format!(
            "SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE builder_id = $1 \
             ORDER BY created_at DESC, id"
        ))
        .bind(builder_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SubmissionRow::into_submission).collect()
    }

    async fn update_submission<F>(&self, id: SubmissionId, change: F) -> MarketResult<Submission>
    where
        F: FnOnce(&mut Submission, &Bounty) -> MarketResult<()> + Send,
    {
        let mut tx = self.pool.begin().await?;

        let mut submission = lock_submission(&mut tx, id)
            .await?
            .ok_or(MarketError::SubmissionNotFound)?;

        // Unlocked read: the closure only needs the immutable poster_id
        let bounty = sqlx::query_as::<_, BountyRow>(&format!(
            "SELECT {BOUNTY_COLUMNS} FROM bounties WHERE id = $1"
        ))
        .bind(submission.bounty_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await?
        .map(BountyRow::into_bounty)
        .transpose()?
        .ok_or_else(|| MarketError::Internal(format!("submission {id} has no bounty")))?;

        change(&mut submission, &bounty)?;
        save_submission(&mut tx, &submission).await?;

        tx.commit().await?;

        Ok(submission)
    }
}

// ============================================================================
// Award Repository Implementation
// ============================================================================

impl AwardRepository for PgMarketRepository {
    async fn award(
        &self,
        bounty_id: BountyId,
        submission_id: SubmissionId,
        caller: UserId,
        reputation_bonus: i64,
        now: DateTime<Utc>,
    ) -> MarketResult<AwardOutcome> {
        let mut tx = self.pool.begin().await?;

        let mut bounty = lock_bounty(&mut tx, bounty_id)
            .await?
            .ok_or(MarketError::BountyNotFound)?;
        // Fail fast before touching the submission row
        bounty.authorize_award(caller)?;

        let mut submission = lock_submission(&mut tx, submission_id).await?;
        let settlement = settle_award(
            &mut bounty,
            submission.as_mut(),
            caller,
            reputation_bonus,
            now,
        )?;
        let submission = submission.ok_or(MarketError::SubmissionNotFound)?;

        save_bounty(&mut tx, &bounty).await?;
        save_submission(&mut tx, &submission).await?;

        credit_award(&mut tx, &settlement, now).await?;

        tx.commit().await?;

        Ok(AwardOutcome {
            bounty,
            submission,
            settlement,
        })
    }
}

// ============================================================================
// Comment Repository Implementation
// ============================================================================

impl CommentRepository for PgMarketRepository {
    async fn create_comment(&self, comment: &Comment) -> MarketResult<()> {
        sqlx::query(
            r#"
            INSERT INTO comments (id, bounty_id, submission_id, author_id, content, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(comment.id.as_uuid())
        .bind(comment.bounty_id.as_uuid())
        .bind(comment.submission_id.map(|id| id.into_uuid()))
        .bind(comment.author_id.as_uuid())
        .bind(&comment.content)
        .bind(comment.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_comment(&self, id: CommentId) -> MarketResult<Option<Comment>> {
        let row = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, bounty_id, submission_id, author_id, content, created_at
            FROM comments
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(CommentRow::into_comment))
    }

    async fn list_comments(&self, bounty_id: BountyId) -> MarketResult<Vec<Comment>> {
        let rows = sqlx::query_as::<_, CommentRow>(
            r#"
            SELECT id, bounty_id, submission_id, author_id, content, created_at
            FROM comments
            WHERE bounty_id = $1
            ORDER BY created_at ASC, id
            "#,
        )
        .bind(bounty_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(CommentRow::into_comment).collect())
    }

    async fn delete_comment(&self, id: CommentId, author_id: UserId) -> MarketResult<bool> {
        let deleted = sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
            .bind(id.as_uuid())
            .bind(author_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

// ============================================================================
// Row types
// ============================================================================

/// A stored code outside the enumeration means the row was written by
/// something other than this crate
fn decode<T>(column: &str, code: &str, parse: fn(&str) -> Option<T>) -> MarketResult<T> {
    parse(code).ok_or_else(|| MarketError::Internal(format!("invalid {column} in database: {code}")))
}

#[derive(sqlx::FromRow)]
struct BountyRow {
    id: Uuid,
    poster_id: Uuid,
    title: String,
    brief: String,
    detailed_spec: Option<String>,
    budget_min: i64,
    budget_max: i64,
    deadline: Option<DateTime<Utc>>,
    category: Option<String>,
    difficulty: Option<String>,
    tags: Vec<String>,
    tech_stack: Vec<String>,
    max_submissions: i32,
    submission_count: i32,
    visibility: String,
    status: String,
    winner_id: Option<Uuid>,
    awarded_amount: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BountyRow {
    fn into_bounty(self) -> MarketResult<Bounty> {
        Ok(Bounty {
            id: BountyId::from_uuid(self.id),
            poster_id: UserId::from_uuid(self.poster_id),
            title: self.title,
            brief: self.brief,
            detailed_spec: self.detailed_spec,
            budget_min: self.budget_min,
            budget_max: self.budget_max,
            deadline: self.deadline,
            category: self
                .category
                .as_deref()
                .map(|c| decode("category", c, Category::from_code))
                .transpose()?,
            difficulty: self
                .difficulty
                .as_deref()
                .map(|d| decode("difficulty", d, Difficulty::from_code))
                .transpose()?,
            tags: self.tags,
            tech_stack: self.tech_stack,
            max_submissions: self.max_submissions,
            submission_count: self.submission_count,
            visibility: decode("visibility", &self.visibility, Visibility::from_code)?,
            status: decode("status", &self.status, BountyStatus::from_code)?,
            winner_id: self.winner_id.map(SubmissionId::from_uuid),
            awarded_amount: self.awarded_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SubmissionRow {
    id: Uuid,
    bounty_id: Uuid,
    builder_id: Uuid,
    title: String,
    description: Option<String>,
    repo_url: Option<String>,
    preview_url: String,
    tech_used: Vec<String>,
    status: String,
    score: Option<i16>,
    feedback: Option<String>,
    reviewed_at: Option<DateTime<Utc>>,
    deployed_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl SubmissionRow {
    fn into_submission(self) -> MarketResult<Submission> {
        Ok(Submission {
            id: SubmissionId::from_uuid(self.id),
            bounty_id: BountyId::from_uuid(self.bounty_id),
            builder_id: UserId::from_uuid(self.builder_id),
            title: self.title,
            description: self.description,
            repo_url: self.repo_url,
            preview_url: self.preview_url,
            tech_used: self.tech_used,
            status: decode("submission status", &self.status, SubmissionStatus::from_code)?,
            score: self.score,
            feedback: self.feedback,
            reviewed_at: self.reviewed_at,
            deployed_at: self.deployed_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    bounty_id: Uuid,
    submission_id: Option<Uuid>,
    author_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl CommentRow {
    fn into_comment(self) -> Comment {
        Comment {
            id: CommentId::from_uuid(self.id),
            bounty_id: BountyId::from_uuid(self.bounty_id),
            submission_id: self.submission_id.map(SubmissionId::from_uuid),
            author_id: UserId::from_uuid(self.author_id),
            content: self.content,
            created_at: self.created_at,
        }
    }
}
