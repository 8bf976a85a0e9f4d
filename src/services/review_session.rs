use std::collections::HashMap;

use serde::Serialize;

use crate::services::review::{
    classify_material, ReviewBucketEntry, ReviewGroup, ReviewThresholds,
};
use crate::services::{require_account, ServiceError};
use crate::store::{ContentReader, StatisticsStore};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSessionQuestion {
    #[serde(flatten)]
    pub entry: ReviewBucketEntry,
    pub hint: Option<String>,
    pub explanation: Option<String>,
    pub acceptable_answers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSession {
    pub material: MaterialRef,
    pub group: ReviewGroup,
    pub questions: Vec<ReviewSessionQuestion>,
}

/// Builds a review session for one group of a material.
///
/// The group keeps the order the classifier produced; hint, explanation and
/// answers are merged onto each entry without re-sorting.
pub async fn assemble_review_session<S>(
    store: &S,
    account_id: Option<&str>,
    material_id: &str,
    group: ReviewGroup,
    thresholds: &ReviewThresholds,
) -> Result<ReviewSession, ServiceError>
where
    S: ContentReader + StatisticsStore,
{
    let account_id = require_account(account_id)?;

    let material = store
        .get_material(material_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("material {material_id}")))?;

    let entries = classify_material(store, account_id, material_id, thresholds)
        .await?
        .groups
        .into_group(group);

    if entries.is_empty() {
        return Ok(ReviewSession {
            material: MaterialRef {
                id: material.id,
                name: material.name,
            },
            group,
            questions: Vec::new(),
        });
    }

    let question_ids: Vec<String> = entries.iter().map(|e| e.question_id.clone()).collect();
    let (questions, answers) = futures::try_join!(
        store.list_questions_by_ids(&question_ids),
        store.list_acceptable_answers(&question_ids),
    )?;

    let mut details: HashMap<String, (Option<String>, Option<String>)> = questions
        .into_iter()
        .map(|q| (q.id, (q.hint, q.explanation)))
        .collect();

    let mut answers_by_question: HashMap<String, Vec<String>> = HashMap::new();
    for answer in answers {
        answers_by_question
            .entry(answer.question_id)
            .or_default()
            .push(answer.text);
    }

    let questions = entries
        .into_iter()
        .map(|entry| {
            let (hint, explanation) = details.remove(&entry.question_id).unwrap_or_default();
            let acceptable_answers = answers_by_question
                .remove(&entry.question_id)
                .unwrap_or_default();
            ReviewSessionQuestion {
                entry,
                hint,
                explanation,
                acceptable_answers,
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        material_id,
        group = group.as_str(),
        questions = questions.len(),
        "review session assembled"
    );

    Ok(ReviewSession {
        material: MaterialRef {
            id: material.id,
            name: material.name,
        },
        group,
        questions,
    })
}
