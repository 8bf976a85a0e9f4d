use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::services::{require_account, ServiceError};
use crate::store::{ContentReader, QuestionStatistic, StatisticsStore};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticSnapshot {
    pub question_id: String,
    pub total_attempts: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub accuracy: Option<f64>,
    pub last_attempted_at: Option<DateTime<Utc>>,
}

impl From<QuestionStatistic> for StatisticSnapshot {
    fn from(stat: QuestionStatistic) -> Self {
        Self {
            accuracy: stat.accuracy(),
            question_id: stat.question_id,
            total_attempts: stat.total_attempts,
            correct_count: stat.correct_count,
            incorrect_count: stat.incorrect_count,
            last_attempted_at: stat.last_attempted_at,
        }
    }
}

/// Records one answer submission and returns the post-update counters.
pub async fn record_attempt<S>(
    store: &S,
    account_id: Option<&str>,
    question_id: &str,
    is_correct: bool,
) -> Result<StatisticSnapshot, ServiceError>
where
    S: ContentReader + StatisticsStore,
{
    let account_id = require_account(account_id)?;

    let question_id = question_id.trim();
    if question_id.is_empty() {
        return Err(ServiceError::Validation("questionId must not be empty".to_string()));
    }

    if store.get_question(question_id).await?.is_none() {
        return Err(ServiceError::NotFound(format!("question {question_id}")));
    }

    let stat = store
        .increment_counts(account_id, question_id, is_correct)
        .await?;

    tracing::debug!(
        question_id,
        is_correct,
        total_attempts = stat.total_attempts,
        "attempt recorded"
    );

    Ok(stat.into())
}
