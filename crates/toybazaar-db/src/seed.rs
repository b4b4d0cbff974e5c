use chrono::Utc;
use sqlx::PgPool;
use toybazaar_core::ToySeed;
use uuid::Uuid;

use crate::DbError;

/// Insert seed products whose slug is not already stored.
///
/// Returns the number of products inserted. All inserts run inside a single
/// transaction; if any fails the batch is rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_toys(pool: &PgPool, toys: &[ToySeed]) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    let created = Utc::now();

    for toy in toys {
        let result = sqlx::query(
            "INSERT INTO toys (id, doc) \
             SELECT $1, $2 \
             WHERE NOT EXISTS ( \
                 SELECT 1 FROM toys \
                 WHERE jsonb_typeof(doc->'slug') = 'string' AND doc->>'slug' = $3 \
             )",
        )
        .bind(Uuid::now_v7())
        .bind(toy.to_document(created))
        .bind(toy.slug())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() > 0 {
            count += 1;
        } else {
            tracing::debug!(slug = %toy.slug(), "seed product already stored; skipping");
        }
    }

    tx.commit().await?;
    tracing::info!(inserted = count, total = toys.len(), "seeded toys");
    Ok(count)
}
