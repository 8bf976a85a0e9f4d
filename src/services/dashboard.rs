use serde::Serialize;

use crate::services::progress::{list_materials_with_progress, MaterialListItem};
use crate::store::ContentReader;

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub material_count: i64,
    pub total_question_count: i64,
    pub solved_question_count: i64,
    pub materials: Vec<MaterialListItem>,
}

/// Material progress for the landing page.
///
/// Best effort: a store failure yields an empty dashboard instead of an error.
pub async fn dashboard<S>(store: &S, account_id: Option<&str>) -> Dashboard
where
    S: ContentReader,
{
    match list_materials_with_progress(store, account_id).await {
        Ok(materials) => Dashboard {
            material_count: materials.len() as i64,
            total_question_count: materials.iter().map(|m| m.question_count).sum(),
            solved_question_count: materials.iter().map(|m| m.solved_question_count).sum(),
            materials,
        },
        Err(err) => {
            tracing::warn!(error = %err, "dashboard degraded to empty result");
            Dashboard::default()
        }
    }
}
