use sqlx::PgPool;
use thiserror::Error;

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_init_schema",
    include_str!("../../sql/001_init_schema.sql"),
)];

pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrationError> {
    tracing::info!("running database migrations");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS "_migrations" (
            "id" SERIAL PRIMARY KEY,
            "name" TEXT NOT NULL UNIQUE,
            "applied_at" TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    )
    .execute(pool)
    .await?;

    let applied: Vec<String> =
        sqlx::query_scalar(r#"SELECT "name" FROM "_migrations" ORDER BY "id""#)
            .fetch_all(pool)
            .await?;

    for (name, sql) in MIGRATIONS {
        if applied.iter().any(|done| done == name) {
            continue;
        }

        let mut tx = pool.begin().await?;
        for statement in split_statements(sql) {
            sqlx::query(&statement)
                .execute(&mut *tx)
                .await
                .map_err(|source| MigrationError::Statement {
                    migration: *name,
                    source,
                })?;
        }
        sqlx::query(r#"INSERT INTO "_migrations" ("name") VALUES ($1)"#)
            .bind(*name)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(migration = *name, "migration applied");
    }

    Ok(())
}

/// Splits a script on `;`, dropping `--` comment lines and empty statements.
fn split_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|chunk| {
            chunk
                .lines()
                .filter(|line| !line.trim_start().starts_with("--"))
                .collect::<Vec<_>>()
                .join("\n")
        })
        .map(|stmt| stmt.trim().to_string())
        .filter(|stmt| !stmt.is_empty())
        .collect()
}

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error("migration {migration} failed: {source}")]
    Statement {
        migration: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_statements_skips_comments_and_blanks() {
        let sql = "-- header\nCREATE TABLE a (id TEXT);\n\n-- note\nCREATE INDEX i ON a (id);\n";
        let statements = split_statements(sql);
        assert_eq!(
            statements,
            vec![
                "CREATE TABLE a (id TEXT)".to_string(),
                "CREATE INDEX i ON a (id)".to_string()
            ]
        );
    }

    #[test]
    fn bundled_schema_creates_statistics_table() {
        let statements = split_statements(MIGRATIONS[0].1);
        assert!(statements
            .iter()
            .any(|s| s.contains(r#"CREATE TABLE IF NOT EXISTS "question_statistics""#)));
    }
}
