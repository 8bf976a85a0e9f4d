pub mod config;
pub mod migrate;
pub mod operations;

use std::collections::HashMap;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use thiserror::Error;

use crate::db::config::{DbConfig, DbConfigError};
use crate::db::migrate::MigrationError;
use crate::store::{
    AcceptableAnswer, Chapter, ContentReader, Material, Question, QuestionStatistic,
    StatisticsStore, StoreError, StoreHealth, Unit,
};

/// Postgres-backed store.
#[derive(Clone)]
pub struct DatabaseProxy {
    config: DbConfig,
    pool: PgPool,
}

impl DatabaseProxy {
    pub async fn from_env() -> Result<Arc<Self>, DbInitError> {
        let config = DbConfig::from_env()?;
        Self::connect(config).await
    }

    pub async fn connect(config: DbConfig) -> Result<Arc<Self>, DbInitError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(&config.primary_url)
            .await?;

        if config.run_migrations {
            migrate::run_migrations(&pool).await?;
        }

        Ok(Arc::new(Self { config, pool }))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }
}

#[derive(Debug, Error)]
pub enum DbInitError {
    #[error(transparent)]
    Config(#[from] DbConfigError),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migration(#[from] MigrationError),
}

impl ContentReader for DatabaseProxy {
    async fn list_materials(&self) -> Result<Vec<Material>, StoreError> {
        Ok(operations::list_materials(self).await?)
    }

    async fn get_material(&self, material_id: &str) -> Result<Option<Material>, StoreError> {
        Ok(operations::get_material(self, material_id).await?)
    }

    async fn list_chapters_for_material(
        &self,
        material_id: &str,
    ) -> Result<Vec<Chapter>, StoreError> {
        Ok(operations::list_chapters_for_material(self, material_id).await?)
    }

    async fn list_units_for_chapter(&self, chapter_id: &str) -> Result<Vec<Unit>, StoreError> {
        Ok(operations::list_units_for_chapter(self, chapter_id).await?)
    }

    async fn list_units_for_chapters(
        &self,
        chapter_ids: &[String],
    ) -> Result<Vec<Unit>, StoreError> {
        Ok(operations::list_units_for_chapters(self, chapter_ids).await?)
    }

    async fn list_units_for_material(&self, material_id: &str) -> Result<Vec<Unit>, StoreError> {
        Ok(operations::list_units_for_material(self, material_id).await?)
    }

    async fn get_unit(&self, unit_id: &str) -> Result<Option<Unit>, StoreError> {
        Ok(operations::get_unit(self, unit_id).await?)
    }

    async fn list_questions_for_units(
        &self,
        unit_ids: &[String],
    ) -> Result<Vec<Question>, StoreError> {
        Ok(operations::list_questions_for_units(self, unit_ids).await?)
    }

    async fn list_questions_by_ids(
        &self,
        question_ids: &[String],
    ) -> Result<Vec<Question>, StoreError> {
        Ok(operations::list_questions_by_ids(self, question_ids).await?)
    }

    async fn get_question(&self, question_id: &str) -> Result<Option<Question>, StoreError> {
        Ok(operations::get_question(self, question_id).await?)
    }

    async fn list_acceptable_answers(
        &self,
        question_ids: &[String],
    ) -> Result<Vec<AcceptableAnswer>, StoreError> {
        Ok(operations::list_acceptable_answers(self, question_ids).await?)
    }

    async fn count_questions_by_unit(
        &self,
        unit_ids: &[String],
    ) -> Result<HashMap<String, i64>, StoreError> {
        Ok(operations::count_questions_by_unit(self, unit_ids).await?)
    }

    async fn count_solved_by_unit(
        &self,
        user_id: &str,
        unit_ids: &[String],
    ) -> Result<HashMap<String, i64>, StoreError> {
        Ok(operations::count_solved_by_unit(self, user_id, unit_ids).await?)
    }
}

impl StatisticsStore for DatabaseProxy {
    async fn increment_counts(
        &self,
        user_id: &str,
        question_id: &str,
        is_correct: bool,
    ) -> Result<QuestionStatistic, StoreError> {
        operations::increment_counts(self, user_id, question_id, is_correct)
            .await?
            .ok_or_else(|| {
                StoreError::Persistence(format!(
                    "statistic upsert returned no row for user {user_id}, question {question_id}"
                ))
            })
    }

    async fn find_by_user_and_question_ids(
        &self,
        user_id: &str,
        question_ids: &[String],
    ) -> Result<Vec<QuestionStatistic>, StoreError> {
        Ok(operations::find_by_user_and_question_ids(self, user_id, question_ids).await?)
    }
}

impl StoreHealth for DatabaseProxy {
    fn backend_name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
