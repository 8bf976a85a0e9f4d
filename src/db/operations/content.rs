use std::collections::HashMap;

use sqlx::postgres::PgRow;
use sqlx::Row;

use crate::db::DatabaseProxy;
use crate::store::{AcceptableAnswer, Chapter, Material, Question, Unit};

const MATERIAL_COLUMNS: &str = r#""id", "name", "order", "createdAt", "updatedAt""#;
const QUESTION_COLUMNS: &str =
    r#"q."id", q."unitId", q."japanese", q."hint", q."explanation", q."order", q."createdAt""#;

pub async fn list_materials(proxy: &DatabaseProxy) -> Result<Vec<Material>, sqlx::Error> {
    let rows = sqlx::query(&format!(
        r#"SELECT {MATERIAL_COLUMNS} FROM "materials" ORDER BY "order" ASC, "createdAt" ASC, "id" ASC"#
    ))
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_material).collect()
}

pub async fn get_material(
    proxy: &DatabaseProxy,
    material_id: &str,
) -> Result<Option<Material>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"SELECT {MATERIAL_COLUMNS} FROM "materials" WHERE "id" = $1 LIMIT 1"#
    ))
    .bind(material_id)
    .fetch_optional(proxy.pool())
    .await?;
    row.as_ref().map(map_material).transpose()
}

pub async fn list_chapters_for_material(
    proxy: &DatabaseProxy,
    material_id: &str,
) -> Result<Vec<Chapter>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id", "materialId", "parentChapterId", "name", "order", "level", "createdAt"
        FROM "chapters"
        WHERE "materialId" = $1
        ORDER BY "order" ASC, "createdAt" ASC, "id" ASC
        "#,
    )
    .bind(material_id)
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_chapter).collect()
}

pub async fn list_units_for_chapter(
    proxy: &DatabaseProxy,
    chapter_id: &str,
) -> Result<Vec<Unit>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT "id", "chapterId", "name", "order", "createdAt"
        FROM "units"
        WHERE "chapterId" = $1
        ORDER BY "order" ASC, "createdAt" ASC, "id" ASC
        "#,
    )
    .bind(chapter_id)
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_unit).collect()
}

pub async fn list_units_for_chapters(
    proxy: &DatabaseProxy,
    chapter_ids: &[String],
) -> Result<Vec<Unit>, sqlx::Error> {
    if chapter_ids.is_empty() {
        return Ok(Vec::new());
    }

    // array_position keeps the caller's chapter order.
    let rows = sqlx::query(
        r#"
        SELECT "id", "chapterId", "name", "order", "createdAt"
        FROM "units"
        WHERE "chapterId" = ANY($1)
        ORDER BY array_position($1, "chapterId") ASC, "order" ASC, "createdAt" ASC, "id" ASC
        "#,
    )
    .bind(chapter_ids)
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_unit).collect()
}

pub async fn list_units_for_material(
    proxy: &DatabaseProxy,
    material_id: &str,
) -> Result<Vec<Unit>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT u."id", u."chapterId", u."name", u."order", u."createdAt"
        FROM "units" u
        JOIN "chapters" c ON c."id" = u."chapterId"
        WHERE c."materialId" = $1
        ORDER BY c."order" ASC, c."createdAt" ASC, c."id" ASC,
                 u."order" ASC, u."createdAt" ASC, u."id" ASC
        "#,
    )
    .bind(material_id)
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_unit).collect()
}

pub async fn get_unit(proxy: &DatabaseProxy, unit_id: &str) -> Result<Option<Unit>, sqlx::Error> {
    let row = sqlx::query(
        r#"SELECT "id", "chapterId", "name", "order", "createdAt" FROM "units" WHERE "id" = $1 LIMIT 1"#,
    )
    .bind(unit_id)
    .fetch_optional(proxy.pool())
    .await?;
    row.as_ref().map(map_unit).transpose()
}

pub async fn list_questions_for_units(
    proxy: &DatabaseProxy,
    unit_ids: &[String],
) -> Result<Vec<Question>, sqlx::Error> {
    if unit_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query(&format!(
        r#"
        SELECT {QUESTION_COLUMNS}
        FROM "questions" q
        WHERE q."unitId" = ANY($1)
        ORDER BY array_position($1, q."unitId") ASC, q."order" ASC, q."createdAt" ASC, q."id" ASC
        "#
    ))
    .bind(unit_ids)
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_question).collect()
}

pub async fn list_questions_by_ids(
    proxy: &DatabaseProxy,
    question_ids: &[String],
) -> Result<Vec<Question>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query(&format!(
        r#"SELECT {QUESTION_COLUMNS} FROM "questions" q WHERE q."id" = ANY($1)"#
    ))
    .bind(question_ids)
    .fetch_all(proxy.pool())
    .await?;
    rows.iter().map(map_question).collect()
}

pub async fn get_question(
    proxy: &DatabaseProxy,
    question_id: &str,
) -> Result<Option<Question>, sqlx::Error> {
    let row = sqlx::query(&format!(
        r#"SELECT {QUESTION_COLUMNS} FROM "questions" q WHERE q."id" = $1 LIMIT 1"#
    ))
    .bind(question_id)
    .fetch_optional(proxy.pool())
    .await?;
    row.as_ref().map(map_question).transpose()
}

pub async fn list_acceptable_answers(
    proxy: &DatabaseProxy,
    question_ids: &[String],
) -> Result<Vec<AcceptableAnswer>, sqlx::Error> {
    if question_ids.is_empty() {
        return Ok(Vec::new());
    }

    let rows = sqlx::query(
        r#"
        SELECT "id", "questionId", "text", "order"
        FROM "question_answers"
        WHERE "questionId" = ANY($1)
        ORDER BY "questionId" ASC, "order" ASC, "id" ASC
        "#,
    )
    .bind(question_ids)
    .fetch_all(proxy.pool())
    .await?;

    rows.iter()
        .map(|row| {
            Ok(AcceptableAnswer {
                id: row.try_get("id")?,
                question_id: row.try_get("questionId")?,
                text: row.try_get("text")?,
                order: row.try_get("order")?,
            })
        })
        .collect()
}

pub async fn count_questions_by_unit(
    proxy: &DatabaseProxy,
    unit_ids: &[String],
) -> Result<HashMap<String, i64>, sqlx::Error> {
    if unit_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT "unitId", COUNT(*)::bigint
        FROM "questions"
        WHERE "unitId" = ANY($1)
        GROUP BY "unitId"
        "#,
    )
    .bind(unit_ids)
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.into_iter().collect())
}

pub async fn count_solved_by_unit(
    proxy: &DatabaseProxy,
    user_id: &str,
    unit_ids: &[String],
) -> Result<HashMap<String, i64>, sqlx::Error> {
    if unit_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows: Vec<(String, i64)> = sqlx::query_as(
        r#"
        SELECT q."unitId", COUNT(DISTINCT q."id")::bigint
        FROM "questions" q
        JOIN "question_statistics" s ON s."questionId" = q."id"
        WHERE q."unitId" = ANY($1)
          AND s."userId" = $2
          AND s."correctCount" > 0
        GROUP BY q."unitId"
        "#,
    )
    .bind(unit_ids)
    .bind(user_id)
    .fetch_all(proxy.pool())
    .await?;
    Ok(rows.into_iter().collect())
}

fn map_material(row: &PgRow) -> Result<Material, sqlx::Error> {
    Ok(Material {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        order: row.try_get("order")?,
        created_at: row.try_get("createdAt")?,
        updated_at: row.try_get("updatedAt")?,
    })
}

fn map_chapter(row: &PgRow) -> Result<Chapter, sqlx::Error> {
    Ok(Chapter {
        id: row.try_get("id")?,
        material_id: row.try_get("materialId")?,
        parent_chapter_id: row.try_get("parentChapterId")?,
        name: row.try_get("name")?,
        order: row.try_get("order")?,
        level: row.try_get("level")?,
        created_at: row.try_get("createdAt")?,
    })
}

fn map_unit(row: &PgRow) -> Result<Unit, sqlx::Error> {
    Ok(Unit {
        id: row.try_get("id")?,
        chapter_id: row.try_get("chapterId")?,
        name: row.try_get("name")?,
        order: row.try_get("order")?,
        created_at: row.try_get("createdAt")?,
    })
}

fn map_question(row: &PgRow) -> Result<Question, sqlx::Error> {
    Ok(Question {
        id: row.try_get("id")?,
        unit_id: row.try_get("unitId")?,
        japanese: row.try_get("japanese")?,
        hint: row.try_get("hint")?,
        explanation: row.try_get("explanation")?,
        order: row.try_get("order")?,
        created_at: row.try_get("createdAt")?,
    })
}
