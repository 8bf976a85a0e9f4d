use std::collections::HashMap;

use serde::Serialize;

use crate::services::statistics::StatisticSnapshot;
use crate::services::ServiceError;
use crate::store::{ContentReader, QuestionStatistic, StatisticsStore};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyQuestion {
    pub id: String,
    pub order: i32,
    pub japanese: String,
    pub hint: Option<String>,
    pub explanation: Option<String>,
    pub acceptable_answers: Vec<String>,
    pub statistic: Option<StatisticSnapshot>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitSession {
    pub unit_id: String,
    pub unit_name: String,
    pub chapter_id: String,
    pub questions: Vec<StudyQuestion>,
}

/// A unit's questions in study order. With an account, each question carries
/// that account's counters (zero-state when never answered).
pub async fn unit_session<S>(
    store: &S,
    account_id: Option<&str>,
    unit_id: &str,
) -> Result<UnitSession, ServiceError>
where
    S: ContentReader + StatisticsStore,
{
    let unit = store
        .get_unit(unit_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("unit {unit_id}")))?;

    let questions = store
        .list_questions_for_units(std::slice::from_ref(&unit.id))
        .await?;
    let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();

    let answers = store.list_acceptable_answers(&question_ids).await?;
    let mut answers_by_question: HashMap<String, Vec<String>> = HashMap::new();
    for answer in answers {
        answers_by_question
            .entry(answer.question_id)
            .or_default()
            .push(answer.text);
    }

    let mut statistics: Option<HashMap<String, QuestionStatistic>> = None;
    if let Some(account_id) = account_id {
        let rows = store
            .find_by_user_and_question_ids(account_id, &question_ids)
            .await?;
        statistics = Some(
            rows.into_iter()
                .map(|stat| (stat.question_id.clone(), stat))
                .collect(),
        );
    }

    let questions = questions
        .into_iter()
        .map(|question| {
            let statistic = match (&statistics, account_id) {
                (Some(stats), Some(account_id)) => Some(
                    stats
                        .get(&question.id)
                        .cloned()
                        .unwrap_or_else(|| QuestionStatistic::empty(account_id, &question.id))
                        .into(),
                ),
                _ => None,
            };
            StudyQuestion {
                acceptable_answers: answers_by_question
                    .remove(&question.id)
                    .unwrap_or_default(),
                id: question.id,
                order: question.order,
                japanese: question.japanese,
                hint: question.hint,
                explanation: question.explanation,
                statistic,
            }
        })
        .collect();

    Ok(UnitSession {
        unit_id: unit.id,
        unit_name: unit.name,
        chapter_id: unit.chapter_id,
        questions,
    })
}
