//! Live integration tests for toybazaar-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/toybazaar-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use serde_json::{json, Value};
use toybazaar_core::{
    CatalogQuery, ItemKey, Lookup, SortMode, ToySeed, ToyUpdate, CATALOG_LIMIT, RESOLUTION_ORDER,
};
use toybazaar_db::{ToyRow, ToyStore};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn insert(store: &ToyStore, doc: Value) -> Uuid {
    store
        .insert(doc)
        .await
        .unwrap_or_else(|e| panic!("insert failed: {e}"))
}

async fn resolve(store: &ToyStore, identifier: &str) -> Option<ToyRow> {
    let key = ItemKey::parse(identifier);
    for strategy in RESOLUTION_ORDER {
        let Some(lookup) = strategy.lookup(&key) else {
            continue;
        };
        if let Some(row) = store.find(&lookup).await.expect("find failed") {
            return Some(row);
        }
    }
    None
}

fn ids(rows: &[ToyRow]) -> Vec<Uuid> {
    rows.iter().map(|r| r.id).collect()
}

// ---------------------------------------------------------------------------
// Section 1: Catalog listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_price_low_coerces_and_places_unpriced_first(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let a = insert(&store, json!({ "name": "a", "price": 300 })).await;
    let b = insert(&store, json!({ "name": "b", "price": " 150 " })).await;
    let c = insert(&store, json!({ "name": "c", "price": "n/a" })).await;
    let d = insert(&store, json!({ "name": "d", "price": 150 })).await;
    let e = insert(&store, json!({ "name": "e", "price": true })).await;

    let query = CatalogQuery {
        category: None,
        sort: SortMode::PriceLow,
    };
    let rows = store.list(&query).await.expect("list failed");
    assert_eq!(ids(&rows), vec![c, e, d, b, a]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_price_high_places_unpriced_last(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let a = insert(&store, json!({ "name": "a", "price": 300 })).await;
    let b = insert(&store, json!({ "name": "b" })).await;
    let c = insert(&store, json!({ "name": "c", "price": "999.5" })).await;

    let query = CatalogQuery {
        category: None,
        sort: SortMode::PriceHigh,
    };
    let rows = store.list(&query).await.expect("list failed");
    assert_eq!(ids(&rows), vec![c, a, b]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_newest_and_popularity_orders(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let a = insert(&store, json!({ "created": "2024-01-01T00:00:00Z", "popularity": 5 })).await;
    let b = insert(&store, json!({ "created": "2025-06-01T00:00:00Z", "popularity": 5 })).await;
    let c = insert(&store, json!({ "createdAt": "2030-01-01T00:00:00Z", "popularity": 9 })).await;
    let d = insert(&store, json!({})).await;

    let newest = store
        .list(&CatalogQuery::from_params(None, Some("newest")))
        .await
        .expect("list failed");
    assert_eq!(ids(&newest), vec![b, a, c, d]);

    let popular = store
        .list(&CatalogQuery::from_params(None, Some("popularity")))
        .await
        .expect("list failed");
    assert_eq!(ids(&popular), vec![c, b, a, d]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_filters_category_and_caps_results(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    for i in 0..(CATALOG_LIMIT + 3) {
        insert(&store, json!({ "name": format!("Block {i}"), "category": ["Blocks"] })).await;
    }
    let kite = insert(&store, json!({ "name": "Kite", "category": "Outdoor" })).await;
    let ball = insert(&store, json!({ "name": "Ball", "category": ["Outdoor", "Sports"] })).await;
    insert(&store, json!({ "name": "Tent", "category": { "Outdoor": 1 } })).await;

    let all = store
        .list(&CatalogQuery::from_params(Some("All"), None))
        .await
        .expect("list failed");
    assert_eq!(all.len(), CATALOG_LIMIT);

    let outdoor = store
        .list(&CatalogQuery::from_params(Some("Outdoor"), Some("newest")))
        .await
        .expect("list failed");
    assert_eq!(ids(&outdoor), vec![ball, kite]);
}

// ---------------------------------------------------------------------------
// Section 2: Item resolution
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn resolution_falls_back_from_slug_to_name_patterns(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let loose = insert(&store, json!({ "name": "My Blue Toy Dump Truck" })).await;
    let strict = insert(&store, json!({ "name": "  Blue Dump-Truck " })).await;
    let slugged = insert(&store, json!({ "name": "Kite", "slug": "sky-kite" })).await;

    assert_eq!(resolve(&store, "sky-kite").await.map(|r| r.id), Some(slugged));
    assert_eq!(resolve(&store, "blue-dump-truck").await.map(|r| r.id), Some(strict));
    assert_eq!(resolve(&store, "toy-dump").await.map(|r| r.id), Some(loose));
    assert_eq!(resolve(&store, &slugged.to_string()).await.map(|r| r.id), Some(slugged));
    assert!(resolve(&store, "fire-engine").await.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn unknown_primary_key_does_not_fall_back(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let missing = Uuid::now_v7();
    insert(&store, json!({ "name": missing.to_string(), "slug": missing.to_string() })).await;

    assert!(resolve(&store, &missing.to_string()).await.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn name_pattern_ignores_non_string_names(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    insert(&store, json!({ "name": 42 })).await;

    let found = store
        .find(&Lookup::NamePattern("42".to_string()))
        .await
        .expect("find failed");
    assert!(found.is_none());
}

// ---------------------------------------------------------------------------
// Section 3: Writes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn concurrent_increments_do_not_lose_updates(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let id = insert(&store, json!({ "name": "Kite", "popularity": 5 })).await;

    let (a, b) = tokio::join!(store.increment_popularity(id), store.increment_popularity(id));
    let mut seen = vec![
        a.expect("increment failed").expect("row exists"),
        b.expect("increment failed").expect("row exists"),
    ];
    seen.sort_unstable();
    assert_eq!(seen, vec![6, 7]);

    let row = store
        .find(&Lookup::PrimaryKey(id))
        .await
        .expect("find failed")
        .expect("row exists");
    assert_eq!(row.doc["popularity"], json!(7));
}

#[sqlx::test(migrations = "../../migrations")]
async fn increment_restarts_non_numeric_counter(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let id = insert(&store, json!({ "popularity": "lots" })).await;

    assert_eq!(store.increment_popularity(id).await.expect("increment failed"), Some(1));
    assert_eq!(
        store
            .increment_popularity(Uuid::now_v7())
            .await
            .expect("increment failed"),
        None
    );
}

#[sqlx::test(migrations = "../../migrations")]
async fn update_merges_only_recognized_fields(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let id = insert(&store, json!({ "name": "Kite", "price": "150", "popularity": 4 })).await;

    let update = ToyUpdate::from_json(&json!({ "name": " Sky Kite ", "popularity": 99 }))
        .expect("has a valid field");
    let row = store
        .update(id, &update)
        .await
        .expect("update failed")
        .expect("row exists");
    assert_eq!(row.doc, json!({ "name": "Sky Kite", "price": "150", "popularity": 4 }));

    assert!(store
        .update(Uuid::now_v7(), &update)
        .await
        .expect("update failed")
        .is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn append_image_extends_images(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let id = insert(&store, json!({ "name": "Kite" })).await;

    store.append_image(id, "a.png").await.expect("append failed");
    let row = store
        .append_image(id, "b.png")
        .await
        .expect("append failed")
        .expect("row exists");
    assert_eq!(row.doc["images"], json!(["a.png", "b.png"]));
}

#[sqlx::test(migrations = "../../migrations")]
async fn seed_skips_existing_slugs(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    let toys: Vec<ToySeed> = seed_fixture();

    assert_eq!(store.seed(&toys).await.expect("seed failed"), 2);
    assert_eq!(store.seed(&toys).await.expect("seed failed"), 0);

    let row = resolve(&store, "teddy-bear").await.expect("seeded by slug");
    assert_eq!(row.doc["popularity"], json!(0));
    assert!(row.doc["created"].is_string());
}

#[sqlx::test(migrations = "../../migrations")]
async fn health_check_pings(pool: sqlx::PgPool) {
    let store = ToyStore::from(pool);
    store.health_check().await.expect("health check failed");
}

fn seed_fixture() -> Vec<ToySeed> {
    vec![
        ToySeed {
            name: "Teddy Bear".to_string(),
            price: 799.0,
            description: None,
            images: vec![],
            category: vec!["Soft Toys".to_string()],
            stock: None,
            slug: None,
        },
        ToySeed {
            name: "Kite".to_string(),
            price: 150.0,
            description: Some("Diamond kite.".to_string()),
            images: vec![],
            category: vec![],
            stock: Some("3".to_string()),
            slug: Some("sky-kite".to_string()),
        },
    ]
}
