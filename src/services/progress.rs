//! Unit/chapter/material progress roll-ups and "next unit" selection.
//!
//! The material list and the material detail view load their data through
//! different queries (counting helpers versus the full tree) but both feed the
//! same [`select_next_unit`] walk, so they always agree on the next unit.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use serde::Serialize;

use crate::services::ServiceError;
use crate::store::{ContentReader, Material, StatisticsStore, StoreError, Unit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitProgress {
    pub unit_id: String,
    pub question_count: i64,
    pub solved_question_count: i64,
}

/// Picks the unit a learner should study next from units in hierarchy order.
///
/// Units without questions are skipped. The first unit with unsolved questions
/// wins; when everything is solved the first unit with questions is returned.
/// `None` only when no unit has any questions.
pub fn select_next_unit<'a, I>(units: I) -> Option<String>
where
    I: IntoIterator<Item = &'a UnitProgress>,
{
    let mut fallback: Option<&str> = None;

    for unit in units {
        if unit.question_count <= 0 {
            continue;
        }
        if fallback.is_none() {
            fallback = Some(unit.unit_id.as_str());
        }
        if unit.solved_question_count < unit.question_count {
            return Some(unit.unit_id.clone());
        }
    }

    fallback.map(str::to_string)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialListItem {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub unit_count: i64,
    pub question_count: i64,
    pub solved_question_count: i64,
    pub next_unit_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDetail {
    pub id: String,
    pub name: String,
    pub order: i32,
    pub question_count: i64,
    pub solved_question_count: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDetail {
    pub id: String,
    pub name: String,
    pub order: i32,
    pub level: i32,
    pub parent_chapter_id: Option<String>,
    pub unit_count: i64,
    pub question_count: i64,
    pub units: Vec<UnitDetail>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialDetail {
    pub id: String,
    pub name: String,
    pub updated_at: DateTime<Utc>,
    pub unit_count: i64,
    pub question_count: i64,
    pub solved_question_count: i64,
    pub next_unit_id: Option<String>,
    pub chapters: Vec<ChapterDetail>,
}

/// Lightweight progress for one material, built from counting queries only.
pub async fn material_summary<S>(
    store: &S,
    material: &Material,
    account_id: Option<&str>,
) -> Result<MaterialListItem, StoreError>
where
    S: ContentReader,
{
    let units = store.list_units_for_material(&material.id).await?;
    let unit_ids: Vec<String> = units.iter().map(|u| u.id.clone()).collect();

    let (question_counts, solved_counts) = futures::try_join!(
        store.count_questions_by_unit(&unit_ids),
        solved_counts_by_unit(store, account_id, &unit_ids),
    )?;

    let progress = unit_progress(&units, &question_counts, &solved_counts);
    let next_unit_id = select_next_unit(&progress);

    tracing::debug!(
        material_id = %material.id,
        units = units.len(),
        next_unit_id = ?next_unit_id,
        "material summary computed"
    );

    Ok(MaterialListItem {
        id: material.id.clone(),
        name: material.name.clone(),
        updated_at: material.updated_at,
        unit_count: units.len() as i64,
        question_count: progress.iter().map(|p| p.question_count).sum(),
        solved_question_count: progress.iter().map(|p| p.solved_question_count).sum(),
        next_unit_id,
    })
}

/// Every material with its progress, one concurrent summary per material.
pub async fn list_materials_with_progress<S>(
    store: &S,
    account_id: Option<&str>,
) -> Result<Vec<MaterialListItem>, StoreError>
where
    S: ContentReader,
{
    let materials = store.list_materials().await?;
    try_join_all(
        materials
            .iter()
            .map(|material| material_summary(store, material, account_id)),
    )
    .await
}

/// Full chapter/unit tree of a material with per-unit solved counts.
pub async fn material_detail<S>(
    store: &S,
    material_id: &str,
    account_id: Option<&str>,
) -> Result<MaterialDetail, ServiceError>
where
    S: ContentReader + StatisticsStore,
{
    let material = store
        .get_material(material_id)
        .await?
        .ok_or_else(|| ServiceError::NotFound(format!("material {material_id}")))?;

    let chapters = store.list_chapters_for_material(material_id).await?;
    let chapter_ids: Vec<String> = chapters.iter().map(|c| c.id.clone()).collect();
    let units = store.list_units_for_chapters(&chapter_ids).await?;
    let unit_ids: Vec<String> = units.iter().map(|u| u.id.clone()).collect();
    let questions = store.list_questions_for_units(&unit_ids).await?;

    let solved_question_ids: HashSet<String> = match account_id {
        Some(account_id) if !questions.is_empty() => {
            let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
            store
                .find_by_user_and_question_ids(account_id, &question_ids)
                .await?
                .into_iter()
                .filter(|stat| stat.is_solved())
                .map(|stat| stat.question_id)
                .collect()
        }
        _ => HashSet::new(),
    };

    let mut question_counts: HashMap<&str, i64> = HashMap::new();
    let mut solved_counts: HashMap<&str, i64> = HashMap::new();
    for question in &questions {
        *question_counts.entry(question.unit_id.as_str()).or_insert(0) += 1;
        if solved_question_ids.contains(&question.id) {
            *solved_counts.entry(question.unit_id.as_str()).or_insert(0) += 1;
        }
    }

    let mut units_by_chapter: HashMap<&str, Vec<&Unit>> = HashMap::new();
    for unit in &units {
        units_by_chapter
            .entry(unit.chapter_id.as_str())
            .or_default()
            .push(unit);
    }

    let mut walk: Vec<UnitProgress> = Vec::with_capacity(units.len());
    let chapter_details: Vec<ChapterDetail> = chapters
        .iter()
        .map(|chapter| {
            let unit_details: Vec<UnitDetail> = units_by_chapter
                .get(chapter.id.as_str())
                .map(|units| {
                    units
                        .iter()
                        .map(|unit| UnitDetail {
                            id: unit.id.clone(),
                            name: unit.name.clone(),
                            order: unit.order,
                            question_count: question_counts
                                .get(unit.id.as_str())
                                .copied()
                                .unwrap_or(0),
                            solved_question_count: solved_counts
                                .get(unit.id.as_str())
                                .copied()
                                .unwrap_or(0),
                        })
                        .collect()
                })
                .unwrap_or_default();

            walk.extend(unit_details.iter().map(|unit| UnitProgress {
                unit_id: unit.id.clone(),
                question_count: unit.question_count,
                solved_question_count: unit.solved_question_count,
            }));

            ChapterDetail {
                id: chapter.id.clone(),
                name: chapter.name.clone(),
                order: chapter.order,
                level: chapter.level,
                parent_chapter_id: chapter.parent_chapter_id.clone(),
                unit_count: unit_details.len() as i64,
                question_count: unit_details.iter().map(|u| u.question_count).sum(),
                units: unit_details,
            }
        })
        .collect();

    let next_unit_id = select_next_unit(&walk);

    tracing::debug!(
        material_id,
        chapters = chapter_details.len(),
        next_unit_id = ?next_unit_id,
        "material detail computed"
    );

    Ok(MaterialDetail {
        id: material.id,
        name: material.name,
        updated_at: material.updated_at,
        unit_count: walk.len() as i64,
        question_count: walk.iter().map(|p| p.question_count).sum(),
        solved_question_count: walk.iter().map(|p| p.solved_question_count).sum(),
        next_unit_id,
        chapters: chapter_details,
    })
}

async fn solved_counts_by_unit<S>(
    store: &S,
    account_id: Option<&str>,
    unit_ids: &[String],
) -> Result<HashMap<String, i64>, StoreError>
where
    S: ContentReader,
{
    match account_id {
        Some(account_id) if !unit_ids.is_empty() => {
            store.count_solved_by_unit(account_id, unit_ids).await
        }
        _ => Ok(HashMap::new()),
    }
}

fn unit_progress(
    units: &[Unit],
    question_counts: &HashMap<String, i64>,
    solved_counts: &HashMap<String, i64>,
) -> Vec<UnitProgress> {
    units
        .iter()
        .map(|unit| UnitProgress {
            unit_id: unit.id.clone(),
            question_count: question_counts.get(&unit.id).copied().unwrap_or(0),
            solved_question_count: solved_counts.get(&unit.id).copied().unwrap_or(0),
        })
        .collect()
}
