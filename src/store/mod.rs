//! Storage seams consumed by the progress and review services.
//!
//! `ContentReader` covers the material → chapter → unit → question hierarchy,
//! `StatisticsStore` the per-(user, question) attempt counters. Every list
//! operation returns rows ordered by `order`, then creation time, then id, so
//! repeated reads over unchanged data yield identical sequences.

pub mod memory;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("persistence error: {0}")]
    Persistence(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    pub id: String,
    pub name: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub material_id: String,
    pub parent_chapter_id: Option<String>,
    pub name: String,
    pub order: i32,
    pub level: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: String,
    pub chapter_id: String,
    pub name: String,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: String,
    pub unit_id: String,
    pub japanese: String,
    pub hint: Option<String>,
    pub explanation: Option<String>,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptableAnswer {
    pub id: String,
    pub question_id: String,
    pub text: String,
    pub order: i32,
}

/// Attempt counters for one (user, question) pair.
///
/// `correct_count + incorrect_count == total_attempts` holds for every row a
/// store hands out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionStatistic {
    pub user_id: String,
    pub question_id: String,
    pub total_attempts: i64,
    pub correct_count: i64,
    pub incorrect_count: i64,
    pub last_attempted_at: Option<DateTime<Utc>>,
}

impl QuestionStatistic {
    /// Zero-state for a question the user never answered.
    pub fn empty(user_id: &str, question_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            question_id: question_id.to_string(),
            total_attempts: 0,
            correct_count: 0,
            incorrect_count: 0,
            last_attempted_at: None,
        }
    }

    pub fn accuracy(&self) -> Option<f64> {
        if self.total_attempts > 0 {
            Some(self.correct_count as f64 / self.total_attempts as f64)
        } else {
            None
        }
    }

    pub fn is_solved(&self) -> bool {
        self.correct_count > 0
    }
}

/// Read-only access to the content hierarchy.
pub trait ContentReader: Send + Sync {
    fn list_materials(&self) -> impl Future<Output = Result<Vec<Material>, StoreError>> + Send;

    fn get_material(
        &self,
        material_id: &str,
    ) -> impl Future<Output = Result<Option<Material>, StoreError>> + Send;

    fn list_chapters_for_material(
        &self,
        material_id: &str,
    ) -> impl Future<Output = Result<Vec<Chapter>, StoreError>> + Send;

    fn list_units_for_chapter(
        &self,
        chapter_id: &str,
    ) -> impl Future<Output = Result<Vec<Unit>, StoreError>> + Send;

    /// Units of several chapters, grouped by chapter in the given id order.
    ///
    /// Defaults to one `list_units_for_chapter` call per chapter; stores that
    /// can batch the lookup override it.
    fn list_units_for_chapters(
        &self,
        chapter_ids: &[String],
    ) -> impl Future<Output = Result<Vec<Unit>, StoreError>> + Send {
        async move {
            let per_chapter = try_join_all(
                chapter_ids
                    .iter()
                    .map(|chapter_id| self.list_units_for_chapter(chapter_id)),
            )
            .await?;
            Ok(per_chapter.into_iter().flatten().collect())
        }
    }

    /// Every unit of a material in hierarchy order: chapter position first,
    /// unit position second.
    fn list_units_for_material(
        &self,
        material_id: &str,
    ) -> impl Future<Output = Result<Vec<Unit>, StoreError>> + Send;

    fn get_unit(&self, unit_id: &str) -> impl Future<Output = Result<Option<Unit>, StoreError>> + Send;

    /// Questions of several units, grouped by unit in the given id order.
    fn list_questions_for_units(
        &self,
        unit_ids: &[String],
    ) -> impl Future<Output = Result<Vec<Question>, StoreError>> + Send;

    /// Questions with the given ids; missing ids are skipped, order unspecified.
    fn list_questions_by_ids(
        &self,
        question_ids: &[String],
    ) -> impl Future<Output = Result<Vec<Question>, StoreError>> + Send;

    fn get_question(
        &self,
        question_id: &str,
    ) -> impl Future<Output = Result<Option<Question>, StoreError>> + Send;

    /// Answers ordered by question id, then answer `order`.
    fn list_acceptable_answers(
        &self,
        question_ids: &[String],
    ) -> impl Future<Output = Result<Vec<AcceptableAnswer>, StoreError>> + Send;

    /// Question counts keyed by unit id; units without questions are absent.
    fn count_questions_by_unit(
        &self,
        unit_ids: &[String],
    ) -> impl Future<Output = Result<HashMap<String, i64>, StoreError>> + Send;

    /// Distinct questions per unit that `user_id` answered correctly at least once.
    fn count_solved_by_unit(
        &self,
        user_id: &str,
        unit_ids: &[String],
    ) -> impl Future<Output = Result<HashMap<String, i64>, StoreError>> + Send;
}

/// Per-(user, question) attempt counters.
pub trait StatisticsStore: Send + Sync {
    /// Atomically records one attempt and returns the post-update row.
    fn increment_counts(
        &self,
        user_id: &str,
        question_id: &str,
        is_correct: bool,
    ) -> impl Future<Output = Result<QuestionStatistic, StoreError>> + Send;

    /// Rows that exist for the given questions; absent pairs are zero-state.
    fn find_by_user_and_question_ids(
        &self,
        user_id: &str,
        question_ids: &[String],
    ) -> impl Future<Output = Result<Vec<QuestionStatistic>, StoreError>> + Send;
}

pub trait StoreHealth: Send + Sync {
    fn backend_name(&self) -> &'static str;

    fn ping(&self) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Everything the HTTP facades need from a backing store.
pub trait LearningStore: ContentReader + StatisticsStore + StoreHealth + 'static {}

impl<T> LearningStore for T where T: ContentReader + StatisticsStore + StoreHealth + 'static {}

/// Sibling ordering shared by every store: `order`, then creation time, then id.
pub fn sibling_order(
    a: (i32, &DateTime<Utc>, &str),
    b: (i32, &DateTime<Utc>, &str),
) -> Ordering {
    a.0.cmp(&b.0)
        .then_with(|| a.1.cmp(b.1))
        .then_with(|| a.2.cmp(b.2))
}

impl Chapter {
    pub fn sort_key(&self) -> (i32, &DateTime<Utc>, &str) {
        (self.order, &self.created_at, &self.id)
    }
}

impl Unit {
    pub fn sort_key(&self) -> (i32, &DateTime<Utc>, &str) {
        (self.order, &self.created_at, &self.id)
    }
}

impl Question {
    pub fn sort_key(&self) -> (i32, &DateTime<Utc>, &str) {
        (self.order, &self.created_at, &self.id)
    }
}

impl Material {
    pub fn sort_key(&self) -> (i32, &DateTime<Utc>, &str) {
        (self.order, &self.created_at, &self.id)
    }
}
