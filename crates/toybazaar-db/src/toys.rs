//! Postgres operations for the `toys` table.
//!
//! Each row is `(id UUID, doc JSONB)`. Ordering and matching rules here must
//! agree with [`crate::memory`], which implements the same operations over a
//! process-local map.

use serde_json::Value;
use sqlx::PgPool;
use toybazaar_core::{CatalogQuery, Lookup, SortMode, ToyUpdate, CATALOG_LIMIT};
use uuid::Uuid;

use crate::DbError;

// ---------------------------------------------------------------------------
// Row type
// ---------------------------------------------------------------------------

/// A stored product document with its key.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct ToyRow {
    pub id: Uuid,
    pub doc: Value,
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Price coerced to a number: strings are trimmed and parsed (empty means 0),
/// booleans become 1/0, JSON null becomes 0. Anything else is SQL NULL.
const COERCED_PRICE: &str = r#"CASE jsonb_typeof(doc->'price')
    WHEN 'number' THEN (doc->>'price')::numeric
    WHEN 'string' THEN CASE
        WHEN btrim(doc->>'price', E' \t\n\r') = '' THEN 0
        WHEN btrim(doc->>'price', E' \t\n\r') ~ '^[+-]?([0-9]+\.?[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?$'
            THEN btrim(doc->>'price', E' \t\n\r')::numeric
        ELSE NULL
    END
    WHEN 'boolean' THEN CASE WHEN (doc->'price')::boolean THEN 1 ELSE 0 END
    WHEN 'null' THEN 0
    ELSE NULL
END"#;

fn order_by(sort: SortMode) -> String {
    match sort {
        SortMode::PriceLow => format!("{COERCED_PRICE} ASC NULLS FIRST, id DESC"),
        SortMode::PriceHigh => format!("{COERCED_PRICE} DESC NULLS LAST, id DESC"),
        SortMode::Newest => "doc->'created' DESC NULLS LAST, \
                             doc->'createdAt' DESC NULLS LAST, id DESC"
            .to_string(),
        SortMode::Popularity => "doc->'popularity' DESC NULLS LAST, id DESC".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

/// Returns up to [`CATALOG_LIMIT`] products matching `query`, in its sort order.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_toys(pool: &PgPool, query: &CatalogQuery) -> Result<Vec<ToyRow>, DbError> {
    let sql = format!(
        "SELECT id, doc FROM toys \
         WHERE ($1::text IS NULL \
                OR (jsonb_typeof(doc->'category') IN ('array', 'string') \
                    AND doc->'category' ? $1::text)) \
         ORDER BY {} \
         LIMIT $2",
        order_by(query.sort)
    );

    let rows = sqlx::query_as::<_, ToyRow>(&sql)
        .bind(query.category.as_deref())
        .bind(i64::try_from(CATALOG_LIMIT).unwrap_or(i64::MAX))
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Returns the first product (in key order) matched by `lookup`.
///
/// Name patterns are matched case-insensitively against string names only.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn find_toy(pool: &PgPool, lookup: &Lookup) -> Result<Option<ToyRow>, DbError> {
    let row = match lookup {
        Lookup::PrimaryKey(id) => {
            sqlx::query_as::<_, ToyRow>("SELECT id, doc FROM toys WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?
        }
        Lookup::Slug(slug) => {
            sqlx::query_as::<_, ToyRow>(
                "SELECT id, doc FROM toys \
                 WHERE jsonb_typeof(doc->'slug') = 'string' AND doc->>'slug' = $1 \
                 ORDER BY id \
                 LIMIT 1",
            )
            .bind(slug)
            .fetch_optional(pool)
            .await?
        }
        Lookup::NamePattern(pattern) => {
            sqlx::query_as::<_, ToyRow>(
                "SELECT id, doc FROM toys \
                 WHERE jsonb_typeof(doc->'name') = 'string' AND doc->>'name' ~* $1 \
                 ORDER BY id \
                 LIMIT 1",
            )
            .bind(pattern)
            .fetch_optional(pool)
            .await?
        }
    };

    Ok(row)
}

/// Atomically adds one to `popularity` and returns the new value, or `None`
/// if no product has this id. A non-numeric counter restarts from zero.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn increment_popularity(pool: &PgPool, id: Uuid) -> Result<Option<i64>, DbError> {
    let popularity = sqlx::query_scalar::<_, i64>(
        "UPDATE toys \
         SET doc = jsonb_set(doc, '{popularity}', to_jsonb( \
             CASE WHEN jsonb_typeof(doc->'popularity') = 'number' \
                  THEN (doc->>'popularity')::numeric ELSE 0 END + 1)) \
         WHERE id = $1 \
         RETURNING trunc((doc->>'popularity')::numeric)::bigint",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(popularity)
}

/// Merges the recognized fields of `update` into the stored document and
/// returns the refreshed row, or `None` if no product has this id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn update_toy(
    pool: &PgPool,
    id: Uuid,
    update: &ToyUpdate,
) -> Result<Option<ToyRow>, DbError> {
    let row = sqlx::query_as::<_, ToyRow>(
        "UPDATE toys SET doc = doc || $2 WHERE id = $1 RETURNING id, doc",
    )
    .bind(id)
    .bind(update.to_set_document())
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Inserts a new product under a fresh time-ordered key.
///
/// # Errors
///
/// Returns [`DbError::InvalidDocument`] if `doc` is not an object, or
/// [`DbError::Sqlx`] if the insert fails.
pub async fn insert_toy(pool: &PgPool, doc: &Value) -> Result<Uuid, DbError> {
    if !doc.is_object() {
        return Err(DbError::InvalidDocument);
    }

    let id = Uuid::now_v7();
    sqlx::query("INSERT INTO toys (id, doc) VALUES ($1, $2)")
        .bind(id)
        .bind(doc)
        .execute(pool)
        .await?;

    Ok(id)
}

/// Appends `url` to the product's `images`, replacing a non-array value.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn append_image(pool: &PgPool, id: Uuid, url: &str) -> Result<Option<ToyRow>, DbError> {
    let row = sqlx::query_as::<_, ToyRow>(
        "UPDATE toys \
         SET doc = jsonb_set(doc, '{images}', \
             CASE WHEN jsonb_typeof(doc->'images') = 'array' THEN doc->'images' ELSE '[]'::jsonb END \
             || jsonb_build_array($2::text)) \
         WHERE id = $1 \
         RETURNING id, doc",
    )
    .bind(id)
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_order_ends_with_id_desc() {
        for sort in [
            SortMode::PriceLow,
            SortMode::PriceHigh,
            SortMode::Newest,
            SortMode::Popularity,
        ] {
            assert!(order_by(sort).ends_with("id DESC"), "{sort}");
        }
    }

    #[test]
    fn price_orders_place_unpriced_items() {
        assert!(order_by(SortMode::PriceLow).contains("ASC NULLS FIRST"));
        assert!(order_by(SortMode::PriceHigh).contains("DESC NULLS LAST"));
    }
}
