//! Review classification: splits a learner's question history for a material
//! into weak, low-attempt and unattempted groups.
//!
//! Weak and low-attempt membership overlap on purpose (a question answered
//! once and wrong is both); unattempted is exclusive of the other two.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};

use crate::services::{require_account, ServiceError};
use crate::store::{ContentReader, Material, QuestionStatistic, StatisticsStore, StoreError};

pub const WEAK_ACCURACY_THRESHOLD: f64 = 0.6;
pub const LOW_ATTEMPT_THRESHOLD: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewThresholds {
    /// Accuracy strictly below this marks a question weak.
    pub weak_accuracy: f64,
    /// Attempt counts strictly below this (and above zero) mark a question under-practiced.
    pub low_attempt: i64,
}

impl Default for ReviewThresholds {
    fn default() -> Self {
        Self {
            weak_accuracy: WEAK_ACCURACY_THRESHOLD,
            low_attempt: LOW_ATTEMPT_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewGroup {
    #[serde(rename = "weak")]
    Weak,
    #[serde(rename = "lowAttempts")]
    LowAttempts,
    #[serde(rename = "unattempted")]
    Unattempted,
}

impl ReviewGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewGroup::Weak => "weak",
            ReviewGroup::LowAttempts => "lowAttempts",
            ReviewGroup::Unattempted => "unattempted",
        }
    }
}

impl FromStr for ReviewGroup {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "weak" => Ok(ReviewGroup::Weak),
            "lowAttempts" => Ok(ReviewGroup::LowAttempts),
            "unattempted" => Ok(ReviewGroup::Unattempted),
            other => Err(ServiceError::Validation(format!(
                "unknown review group: {other}"
            ))),
        }
    }
}

/// A question of a material with the structural context the review UI shows.
#[derive(Debug, Clone)]
pub struct ReviewCandidate {
    pub question_id: String,
    pub unit_id: String,
    pub unit_name: String,
    pub unit_order: i32,
    pub question_order: i32,
    pub japanese: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBucketEntry {
    pub question_id: String,
    pub unit_id: String,
    pub unit_name: String,
    pub unit_order: i32,
    pub question_order: i32,
    pub japanese: String,
    pub total_attempts: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub accuracy: Option<f64>,
    pub last_attempted_at: Option<DateTime<Utc>>,
}

impl ReviewBucketEntry {
    fn new(candidate: &ReviewCandidate, stat: Option<&QuestionStatistic>) -> Self {
        let (total_attempts, correct_count, incorrect_count, accuracy, last_attempted_at) =
            match stat {
                Some(stat) => (
                    stat.total_attempts,
                    stat.correct_count,
                    stat.incorrect_count,
                    stat.accuracy(),
                    stat.last_attempted_at,
                ),
                None => (0, 0, 0, None, None),
            };

        Self {
            question_id: candidate.question_id.clone(),
            unit_id: candidate.unit_id.clone(),
            unit_name: candidate.unit_name.clone(),
            unit_order: candidate.unit_order,
            question_order: candidate.question_order,
            japanese: candidate.japanese.clone(),
            total_attempts,
            correct_count,
            incorrect_count,
            accuracy,
            last_attempted_at,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewGroups {
    pub weak: Vec<ReviewBucketEntry>,
    pub low_attempts: Vec<ReviewBucketEntry>,
    pub unattempted: Vec<ReviewBucketEntry>,
}

impl ReviewGroups {
    pub fn group(&self, group: ReviewGroup) -> &[ReviewBucketEntry] {
        match group {
            ReviewGroup::Weak => &self.weak,
            ReviewGroup::LowAttempts => &self.low_attempts,
            ReviewGroup::Unattempted => &self.unattempted,
        }
    }

    pub fn into_group(self, group: ReviewGroup) -> Vec<ReviewBucketEntry> {
        match group {
            ReviewGroup::Weak => self.weak,
            ReviewGroup::LowAttempts => self.low_attempts,
            ReviewGroup::Unattempted => self.unattempted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialReviewSummary {
    pub id: String,
    pub name: String,
    pub total_question_count: i64,
    pub weak_count: i64,
    pub low_attempt_count: i64,
    pub unattempted_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewData {
    pub materials: Vec<MaterialReviewSummary>,
    pub selected_material_id: Option<String>,
    pub groups: ReviewGroups,
    pub thresholds: ReviewThresholds,
}

/// Classified groups of one material together with its question total.
#[derive(Debug, Clone, Default)]
pub struct MaterialClassification {
    pub total_question_count: i64,
    pub groups: ReviewGroups,
}

impl MaterialClassification {
    pub fn summary(&self, material: &Material) -> MaterialReviewSummary {
        MaterialReviewSummary {
            id: material.id.clone(),
            name: material.name.clone(),
            total_question_count: self.total_question_count,
            weak_count: self.groups.weak.len() as i64,
            low_attempt_count: self.groups.low_attempts.len() as i64,
            unattempted_count: self.groups.unattempted.len() as i64,
        }
    }
}

pub fn is_weak(entry: &ReviewBucketEntry, thresholds: &ReviewThresholds) -> bool {
    entry.total_attempts > 0
        && entry
            .accuracy
            .is_some_and(|accuracy| accuracy < thresholds.weak_accuracy)
}

pub fn is_low_attempt(entry: &ReviewBucketEntry, thresholds: &ReviewThresholds) -> bool {
    entry.total_attempts > 0 && entry.total_attempts < thresholds.low_attempt
}

pub fn is_unattempted(entry: &ReviewBucketEntry) -> bool {
    entry.total_attempts == 0
}

/// Worst accuracy first, then oldest attempt first. Missing accuracy sorts
/// as perfect; a missing attempt time sorts before any timestamp.
pub fn compare_weak(a: &ReviewBucketEntry, b: &ReviewBucketEntry) -> Ordering {
    let accuracy_a = a.accuracy.unwrap_or(1.0);
    let accuracy_b = b.accuracy.unwrap_or(1.0);
    accuracy_a
        .total_cmp(&accuracy_b)
        .then_with(|| a.last_attempted_at.cmp(&b.last_attempted_at))
}

/// Fewest attempts first, then oldest attempt first.
pub fn compare_low_attempts(a: &ReviewBucketEntry, b: &ReviewBucketEntry) -> Ordering {
    a.total_attempts
        .cmp(&b.total_attempts)
        .then_with(|| a.last_attempted_at.cmp(&b.last_attempted_at))
}

/// Structural order only.
pub fn compare_unattempted(a: &ReviewBucketEntry, b: &ReviewBucketEntry) -> Ordering {
    a.unit_order
        .cmp(&b.unit_order)
        .then_with(|| a.question_order.cmp(&b.question_order))
}

/// Partitions candidates into the three review groups and sorts each one.
///
/// Candidates are expected in hierarchy order; sorting is stable, so entries
/// that tie on every comparator key keep that order.
pub fn classify(
    candidates: &[ReviewCandidate],
    statistics: &HashMap<String, QuestionStatistic>,
    thresholds: &ReviewThresholds,
) -> ReviewGroups {
    let mut groups = ReviewGroups::default();

    for candidate in candidates {
        let entry = ReviewBucketEntry::new(candidate, statistics.get(&candidate.question_id));

        if is_unattempted(&entry) {
            groups.unattempted.push(entry);
            continue;
        }

        let weak = is_weak(&entry, thresholds);
        let low_attempt = is_low_attempt(&entry, thresholds);
        match (weak, low_attempt) {
            (true, true) => {
                groups.weak.push(entry.clone());
                groups.low_attempts.push(entry);
            }
            (true, false) => groups.weak.push(entry),
            (false, true) => groups.low_attempts.push(entry),
            (false, false) => {}
        }
    }

    groups.weak.sort_by(compare_weak);
    groups.low_attempts.sort_by(compare_low_attempts);
    groups.unattempted.sort_by(compare_unattempted);

    groups
}

/// Loads every question of a material in hierarchy order with its unit context.
/// Any empty level short-circuits to an empty list.
pub async fn load_candidates<S>(
    store: &S,
    material_id: &str,
) -> Result<Vec<ReviewCandidate>, StoreError>
where
    S: ContentReader,
{
    let chapters = store.list_chapters_for_material(material_id).await?;
    if chapters.is_empty() {
        return Ok(Vec::new());
    }

    let chapter_ids: Vec<String> = chapters.iter().map(|c| c.id.clone()).collect();
    let units = store.list_units_for_chapters(&chapter_ids).await?;
    if units.is_empty() {
        return Ok(Vec::new());
    }

    let unit_ids: Vec<String> = units.iter().map(|u| u.id.clone()).collect();
    let questions = store.list_questions_for_units(&unit_ids).await?;

    let units_by_id: HashMap<&str, _> = units.iter().map(|u| (u.id.as_str(), u)).collect();

    Ok(questions
        .into_iter()
        .filter_map(|question| {
            let unit = units_by_id.get(question.unit_id.as_str())?;
            Some(ReviewCandidate {
                question_id: question.id,
                unit_id: unit.id.clone(),
                unit_name: unit.name.clone(),
                unit_order: unit.order,
                question_order: question.order,
                japanese: question.japanese,
            })
        })
        .collect())
}

/// Classifies one material for one account.
pub async fn classify_material<S>(
    store: &S,
    account_id: &str,
    material_id: &str,
    thresholds: &ReviewThresholds,
) -> Result<MaterialClassification, StoreError>
where
    S: ContentReader + StatisticsStore,
{
    let candidates = load_candidates(store, material_id).await?;
    if candidates.is_empty() {
        return Ok(MaterialClassification::default());
    }

    let question_ids: Vec<String> = candidates.iter().map(|c| c.question_id.clone()).collect();
    let statistics: HashMap<String, QuestionStatistic> = store
        .find_by_user_and_question_ids(account_id, &question_ids)
        .await?
        .into_iter()
        .map(|stat| (stat.question_id.clone(), stat))
        .collect();

    let groups = classify(&candidates, &statistics, thresholds);

    tracing::debug!(
        material_id,
        questions = candidates.len(),
        weak = groups.weak.len(),
        low_attempts = groups.low_attempts.len(),
        unattempted = groups.unattempted.len(),
        "review classification computed"
    );

    Ok(MaterialClassification {
        total_question_count: candidates.len() as i64,
        groups,
    })
}

/// Summaries for every material plus the groups of the selected one.
///
/// An absent or unknown `material_id` selects the first material.
pub async fn review_data<S>(
    store: &S,
    account_id: Option<&str>,
    material_id: Option<&str>,
    thresholds: &ReviewThresholds,
) -> Result<ReviewData, ServiceError>
where
    S: ContentReader + StatisticsStore,
{
    let account_id = require_account(account_id)?;

    let materials = store.list_materials().await?;
    let classifications = try_join_all(
        materials
            .iter()
            .map(|material| classify_material(store, account_id, &material.id, thresholds)),
    )
    .await?;

    let selected_index = material_id
        .and_then(|id| materials.iter().position(|m| m.id == id))
        .or(if materials.is_empty() { None } else { Some(0) });

    let summaries = materials
        .iter()
        .zip(&classifications)
        .map(|(material, classification)| classification.summary(material))
        .collect();

    let (selected_material_id, groups) = match selected_index {
        Some(index) => (
            Some(materials[index].id.clone()),
            classifications
                .into_iter()
                .nth(index)
                .map(|c| c.groups)
                .unwrap_or_default(),
        ),
        None => (None, ReviewGroups::default()),
    };

    Ok(ReviewData {
        materials: summaries,
        selected_material_id,
        groups,
        thresholds: *thresholds,
    })
}
