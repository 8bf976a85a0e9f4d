use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::db::DatabaseProxy;
use crate::store::QuestionStatistic;

/// Records one attempt in a single statement.
///
/// The conflict branch adds to the stored counters instead of overwriting
/// them, so concurrent submissions for the same pair cannot lose updates.
pub async fn increment_counts(
    proxy: &DatabaseProxy,
    user_id: &str,
    question_id: &str,
    is_correct: bool,
) -> Result<Option<QuestionStatistic>, sqlx::Error> {
    let now = Utc::now();
    let (correct, incorrect): (i64, i64) = if is_correct { (1, 0) } else { (0, 1) };

    let row = sqlx::query(
        r#"
        INSERT INTO "question_statistics" (
            "id", "userId", "questionId", "totalAttempts", "correctCount",
            "incorrectCount", "lastAttemptedAt", "createdAt", "updatedAt"
        ) VALUES ($1, $2, $3, 1, $4, $5, $6, $6, $6)
        ON CONFLICT ("userId", "questionId") DO UPDATE SET
            "totalAttempts" = "question_statistics"."totalAttempts" + 1,
            "correctCount" = "question_statistics"."correctCount" + EXCLUDED."correctCount",
            "incorrectCount" = "question_statistics"."incorrectCount" + EXCLUDED."incorrectCount",
            "lastAttemptedAt" = EXCLUDED."lastAttemptedAt",
            "updatedAt" = EXCLUDED."updatedAt"
        RETURNING "userId", "questionId", "totalAttempts", "correctCount",
                  "incorrectCount", "lastAttemptedAt"
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(question_id)
    .bind(correct)
    .bind(incorrect)
    .bind(now)
    .fetch_optional(proxy.pool())
    .await?;

    row.as_ref().map(map_statistic).transpose()
}

pub async fn find_by_user_and_question_ids(
    proxy: &DatabaseProxy,
    user_id: &str,
    question_ids: &[String],
) -> Result<Vec<QuestionStatistic>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query(
        r#"
        SELECT "userId", "questionId", "totalAttempts", "correctCount",
               "incorrectCount", "lastAttemptedAt"
        FROM "question_statistics"
        WHERE "userId" = $1
          AND "questionId" = ANY($2)
        "#,
    )
    .bind(user_id)
    .bind(question_ids)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter().map(map_statistic).collect()
}

fn map_statistic(row: &PgRow) -> Result<QuestionStatistic, sqlx::Error> {
    Ok(QuestionStatistic {
        user_id: row.try_get("userId")?,
        question_id: row.try_get("questionId")?,
        total_attempts: row.try_get("totalAttempts")?,
        correct_count: row.try_get("correctCount")?,
        incorrect_count: row.try_get("incorrectCount")?,
        last_attempted_at: row.try_get("lastAttemptedAt")?,
    })
}
