use std::collections::HashMap;

use chrono::Utc;
use parking_lot::RwLock;

use super::{
    sibling_order, AcceptableAnswer, Chapter, ContentReader, Material, Question,
    QuestionStatistic, StatisticsStore, StoreError, StoreHealth, Unit,
};

#[derive(Debug, Default)]
struct MemoryData {
    materials: Vec<Material>,
    chapters: Vec<Chapter>,
    units: Vec<Unit>,
    questions: Vec<Question>,
    answers: Vec<AcceptableAnswer>,
    statistics: HashMap<(String, String), QuestionStatistic>,
}

impl MemoryData {
    fn chapters_of(&self, material_id: &str) -> Vec<&Chapter> {
        let mut chapters: Vec<&Chapter> = self
            .chapters
            .iter()
            .filter(|c| c.material_id == material_id)
            .collect();
        chapters.sort_by(|a, b| sibling_order(a.sort_key(), b.sort_key()));
        chapters
    }

    fn units_of(&self, chapter_id: &str) -> Vec<&Unit> {
        let mut units: Vec<&Unit> = self
            .units
            .iter()
            .filter(|u| u.chapter_id == chapter_id)
            .collect();
        units.sort_by(|a, b| sibling_order(a.sort_key(), b.sort_key()));
        units
    }

    fn questions_of(&self, unit_id: &str) -> Vec<&Question> {
        let mut questions: Vec<&Question> = self
            .questions
            .iter()
            .filter(|q| q.unit_id == unit_id)
            .collect();
        questions.sort_by(|a, b| sibling_order(a.sort_key(), b.sort_key()));
        questions
    }
}

/// In-process store guarded by a single lock.
///
/// Increments run inside one write-lock critical section, so concurrent
/// submissions for the same (user, question) never lose updates.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_material(&self, material: Material) {
        self.data.write().materials.push(material);
    }

    pub fn insert_chapter(&self, chapter: Chapter) {
        self.data.write().chapters.push(chapter);
    }

    pub fn insert_unit(&self, unit: Unit) {
        self.data.write().units.push(unit);
    }

    pub fn insert_question(&self, question: Question) {
        self.data.write().questions.push(question);
    }

    pub fn insert_answer(&self, answer: AcceptableAnswer) {
        self.data.write().answers.push(answer);
    }

    /// Replaces the counters for one pair wholesale. Seeding only.
    pub fn put_statistic(&self, statistic: QuestionStatistic) {
        let key = (statistic.user_id.clone(), statistic.question_id.clone());
        self.data.write().statistics.insert(key, statistic);
    }

    pub fn statistic(&self, user_id: &str, question_id: &str) -> Option<QuestionStatistic> {
        self.data
            .read()
            .statistics
            .get(&(user_id.to_string(), question_id.to_string()))
            .cloned()
    }
}

impl ContentReader for MemoryStore {
    async fn list_materials(&self) -> Result<Vec<Material>, StoreError> {
        let data = self.data.read();
        let mut materials = data.materials.clone();
        materials.sort_by(|a, b| sibling_order(a.sort_key(), b.sort_key()));
        Ok(materials)
    }

    async fn get_material(&self, material_id: &str) -> Result<Option<Material>, StoreError> {
        let data = self.data.read();
        Ok(data.materials.iter().find(|m| m.id == material_id).cloned())
    }

    async fn list_chapters_for_material(
        &self,
        material_id: &str,
    ) -> Result<Vec<Chapter>, StoreError> {
        let data = self.data.read();
        Ok(data.chapters_of(material_id).into_iter().cloned().collect())
    }

    async fn list_units_for_chapter(&self, chapter_id: &str) -> Result<Vec<Unit>, StoreError> {
        let data = self.data.read();
        Ok(data.units_of(chapter_id).into_iter().cloned().collect())
    }

    async fn list_units_for_material(&self, material_id: &str) -> Result<Vec<Unit>, StoreError> {
        let data = self.data.read();
        Ok(data
            .chapters_of(material_id)
            .into_iter()
            .flat_map(|chapter| data.units_of(&chapter.id))
            .cloned()
            .collect())
    }

    async fn get_unit(&self, unit_id: &str) -> Result<Option<Unit>, StoreError> {
        let data = self.data.read();
        Ok(data.units.iter().find(|u| u.id == unit_id).cloned())
    }

    async fn list_questions_for_units(
        &self,
        unit_ids: &[String],
    ) -> Result<Vec<Question>, StoreError> {
        let data = self.data.read();
        Ok(unit_ids
            .iter()
            .flat_map(|id| data.questions_of(id))
            .cloned()
            .collect())
    }

    async fn list_questions_by_ids(
        &self,
        question_ids: &[String],
    ) -> Result<Vec<Question>, StoreError> {
        let data = self.data.read();
        Ok(data
            .questions
            .iter()
            .filter(|q| question_ids.contains(&q.id))
            .cloned()
            .collect())
    }

    async fn get_question(&self, question_id: &str) -> Result<Option<Question>, StoreError> {
        let data = self.data.read();
        Ok(data.questions.iter().find(|q| q.id == question_id).cloned())
    }

    async fn list_acceptable_answers(
        &self,
        question_ids: &[String],
    ) -> Result<Vec<AcceptableAnswer>, StoreError> {
        let data = self.data.read();
        let mut answers: Vec<AcceptableAnswer> = data
            .answers
            .iter()
            .filter(|a| question_ids.contains(&a.question_id))
            .cloned()
            .collect();
        answers.sort_by(|a, b| {
            a.question_id
                .cmp(&b.question_id)
                .then_with(|| a.order.cmp(&b.order))
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(answers)
    }

    async fn count_questions_by_unit(
        &self,
        unit_ids: &[String],
    ) -> Result<HashMap<String, i64>, StoreError> {
        let data = self.data.read();
        let mut counts = HashMap::new();
        for question in data.questions.iter().filter(|q| unit_ids.contains(&q.unit_id)) {
            *counts.entry(question.unit_id.clone()).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn count_solved_by_unit(
        &self,
        user_id: &str,
        unit_ids: &[String],
    ) -> Result<HashMap<String, i64>, StoreError> {
        let data = self.data.read();
        let mut counts = HashMap::new();
        for question in data.questions.iter().filter(|q| unit_ids.contains(&q.unit_id)) {
            let solved = data
                .statistics
                .get(&(user_id.to_string(), question.id.clone()))
                .is_some_and(QuestionStatistic::is_solved);
            if solved {
                *counts.entry(question.unit_id.clone()).or_insert(0) += 1;
            }
        }
        Ok(counts)
    }
}

impl StatisticsStore for MemoryStore {
    async fn increment_counts(
        &self,
        user_id: &str,
        question_id: &str,
        is_correct: bool,
    ) -> Result<QuestionStatistic, StoreError> {
        let mut data = self.data.write();
        let entry = data
            .statistics
            .entry((user_id.to_string(), question_id.to_string()))
            .or_insert_with(|| QuestionStatistic::empty(user_id, question_id));

        entry.total_attempts += 1;
        if is_correct {
            entry.correct_count += 1;
        } else {
            entry.incorrect_count += 1;
        }
        entry.last_attempted_at = Some(Utc::now());

        Ok(entry.clone())
    }

    async fn find_by_user_and_question_ids(
        &self,
        user_id: &str,
        question_ids: &[String],
    ) -> Result<Vec<QuestionStatistic>, StoreError> {
        let data = self.data.read();
        Ok(question_ids
            .iter()
            .filter_map(|qid| {
                data.statistics
                    .get(&(user_id.to_string(), qid.clone()))
                    .cloned()
            })
            .collect())
    }
}

impl StoreHealth for MemoryStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
