use bson::{Bson, Document, doc};
use pretty_assertions::assert_eq;

use ormem_core::{
    config::Configuration,
    driver::{Driver, DriverBuilder},
    error::DriverError,
    metadata::{EntityMetadata, EntityProperty},
    query::{Filter, FindOptions},
};
use ormem_memory::InMemoryDriver;

async fn driver() -> InMemoryDriver {
    let config = Configuration::builder()
        .db_name("test")
        .metadata(EntityMetadata::new("TestEntity").primary_key("id").property(EntityProperty::new("value")))
        .metadata(
            EntityMetadata::new("Post")
                .primary_key("id")
                .property(EntityProperty::new("title"))
                .property(EntityProperty::new("created_at").with_default_raw("current_timestamp")),
        )
        .build()
        .unwrap();

    InMemoryDriver::builder(config).build().await.unwrap()
}

async fn seed(driver: &InMemoryDriver, documents: Vec<Document>) {
    for document in documents {
        driver.native_insert("TestEntity", document).await.unwrap();
    }
}

fn ids(documents: &[Document]) -> Vec<i32> {
    documents
        .iter()
        .map(|doc| doc.get_i32("id").unwrap())
        .collect()
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let driver = driver().await;

    let inserted = driver.native_insert("TestEntity", doc! { "id": 1, "value": "test" }).await.unwrap();
    assert_eq!(inserted.insert_id, Some(Bson::Int32(1)));

    let found = driver
        .find_one("TestEntity", doc! { "id": 1 }, FindOptions::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.get_str("value").unwrap(), "test");

    driver.native_insert("TestEntity", doc! { "id": 2, "value": "test 2" }).await.unwrap();

    let sorted = driver
        .find("TestEntity", doc! {}, FindOptions::builder().order_by("id", "DESC").build())
        .await
        .unwrap();
    assert_eq!(ids(&sorted), vec![2, 1]);

    let deleted = driver.native_delete("TestEntity", doc! { "id": 1 }).await.unwrap();
    assert_eq!(deleted.affected_rows, 1);

    let remaining = driver.find("TestEntity", doc! {}, FindOptions::default()).await.unwrap();
    assert_eq!(remaining, vec![doc! { "id": 2, "value": "test 2" }]);
}

#[tokio::test]
async fn test_duplicate_insert_is_rejected() {
    let driver = driver().await;
    seed(&driver, vec![doc! { "id": 1, "value": "a" }]).await;

    let err = driver
        .native_insert("TestEntity", doc! { "id": 1, "value": "b" })
        .await
        .unwrap_err();

    assert!(matches!(err, DriverError::DuplicateKey(_, ref collection) if collection == "TestEntity"));
    assert_eq!(driver.count("TestEntity", doc! {}).await.unwrap(), 1);
}

#[tokio::test]
async fn test_timestamp_default_is_filled_on_insert() {
    let driver = driver().await;
    let before = bson::DateTime::now();

    driver.native_insert("Post", doc! { "id": 1, "title": "Hello" }).await.unwrap();

    let post = driver.find_one("Post", doc! { "id": 1 }, FindOptions::default()).await.unwrap().unwrap();
    let created_at = *post.get_datetime("created_at").unwrap();
    assert!(created_at >= before);
    assert!(created_at <= bson::DateTime::now());
}

#[tokio::test]
async fn test_like_matches_prefix_only() {
    let driver = driver().await;
    seed(&driver, vec![
        doc! { "id": 1, "value": "test" },
        doc! { "id": 2, "value": "tester" },
        doc! { "id": 3, "value": "a test" },
        doc! { "id": 4, "value": "Test" },
    ]).await;

    let found = driver
        .find("TestEntity", Filter::like("value", "tes%"), FindOptions::default())
        .await
        .unwrap();
    let insensitive = driver.count("TestEntity", Filter::ilike("value", "tes%")).await.unwrap();

    assert_eq!(ids(&found), vec![1, 2]);
    assert_eq!(insensitive, 3);
}

#[tokio::test]
async fn test_like_matches_multi_line_values() {
    let driver = driver().await;
    seed(&driver, vec![
        doc! { "id": 1, "value": "test\nline two" },
        doc! { "id": 2, "value": "line one\ntest" },
    ]).await;

    let found = driver
        .find("TestEntity", Filter::like("value", "tes%"), FindOptions::default())
        .await
        .unwrap();

    assert_eq!(ids(&found), vec![1]);
    assert_eq!(driver.count("TestEntity", Filter::like("value", "%test")).await.unwrap(), 1);
}

#[tokio::test]
async fn test_large_integer_keys_stay_distinct() {
    let driver = driver().await;
    let first = 9_007_199_254_740_992_i64;
    let second = 9_007_199_254_740_993_i64;

    driver.native_insert("TestEntity", doc! { "id": first, "value": "a" }).await.unwrap();
    driver.native_insert("TestEntity", doc! { "id": second, "value": "b" }).await.unwrap();

    let found = driver.find_one("TestEntity", Filter::eq("id", second), FindOptions::default()).await.unwrap().unwrap();

    assert_eq!(found.get_str("value").unwrap(), "b");
    assert_eq!(driver.count("TestEntity", Filter::eq("id", first)).await.unwrap(), 1);
    assert_eq!(driver.count("TestEntity", doc! {}).await.unwrap(), 2);
}

#[tokio::test]
async fn test_sort_tolerates_nan_and_missing_values() {
    let driver = driver().await;
    seed(&driver, vec![
        doc! { "id": 1, "value": 2.5 },
        doc! { "id": 2, "value": f64::NAN },
        doc! { "id": 3 },
        doc! { "id": 4, "value": 1_i64 },
        doc! { "id": 5, "value": 2 },
    ]).await;

    let found = driver
        .find("TestEntity", doc! {}, FindOptions::builder().order_by("value", "asc").build())
        .await
        .unwrap();

    assert_eq!(ids(&found), vec![3, 2, 4, 5, 1]);
}

#[tokio::test]
async fn test_pagination_slices_sorted_matches() {
    let driver = driver().await;
    seed(&driver, (1..=7).map(|id| doc! { "id": id, "value": format!("v{id}") }).collect()).await;

    for (offset, limit, expected) in [(0, 3, vec![7, 6, 5]), (5, 3, vec![2, 1]), (7, 3, vec![]), (2, 0, vec![5, 4, 3, 2, 1])] {
        let options = FindOptions::builder()
            .order_by("id", "desc")
            .offset(offset)
            .limit(limit)
            .build();

        assert_eq!(ids(&driver.find("TestEntity", doc! {}, options).await.unwrap()), expected);
    }
}

#[tokio::test]
async fn test_count_equals_find_len() {
    let driver = driver().await;
    let parity = |id: i32| if id % 2 == 0 { "even" } else { "odd" };
    seed(&driver, (1..=5).map(|id| doc! { "id": id, "value": parity(id) }).collect()).await;

    for filter in [
        doc! {},
        doc! { "value": "even" },
        doc! { "id": { "$gte": 2, "$lt": 5 } },
        Filter::or([Filter::eq("id", 1), Filter::eq("value", "even")]),
        doc! { "missing": { "$exists": true } },
    ] {
        let found = driver.find("TestEntity", filter.clone(), FindOptions::default()).await.unwrap();

        assert_eq!(driver.count("TestEntity", filter).await.unwrap(), found.len());
    }
}

#[tokio::test]
async fn test_update_patches_matching_documents_only() {
    let driver = driver().await;
    seed(&driver, vec![doc! { "id": 1, "value": "a" }, doc! { "id": 2, "value": "b" }]).await;

    let result = driver
        .native_update("TestEntity", doc! { "id": 1 }, doc! { "value": "update-test" })
        .await
        .unwrap();

    assert_eq!(result.affected_rows, 1);
    assert_eq!(result.insert_id, Some(Bson::Int32(1)));

    let documents = driver.find("TestEntity", doc! {}, FindOptions::default()).await.unwrap();
    assert_eq!(documents, vec![doc! { "id": 1, "value": "update-test" }, doc! { "id": 2, "value": "b" }]);
}

#[tokio::test]
async fn test_delete_leaves_no_matches() {
    let driver = driver().await;
    seed(&driver, (1..=6).map(|id| doc! { "id": id, "value": "x" }).collect()).await;
    let filter = doc! { "id": { "$in": [2, 4, 6, 8] } };

    let result = driver.native_delete("TestEntity", filter.clone()).await.unwrap();

    assert_eq!(result.affected_rows, 3);
    assert_eq!(result.inserted_ids, vec![Bson::Int32(2), Bson::Int32(4), Bson::Int32(6)]);
    assert_eq!(driver.count("TestEntity", filter).await.unwrap(), 0);
    assert_eq!(driver.count("TestEntity", doc! {}).await.unwrap(), 3);
}

#[tokio::test]
async fn test_reads_of_untouched_collections_are_empty() {
    let driver = driver().await;

    assert!(driver.find_one("Nothing", doc! {}, FindOptions::default()).await.unwrap().is_none());
    assert!(driver.find("Nothing", doc! {}, FindOptions::default()).await.unwrap().is_empty());
    assert_eq!(driver.count("Nothing", doc! {}).await.unwrap(), 0);
    assert!(driver.collection_names().await.is_empty());
}

#[tokio::test]
async fn test_writes_require_metadata() {
    let driver = driver().await;

    let err = driver.native_insert("Unknown", doc! { "id": 1 }).await.unwrap_err();

    assert!(matches!(err, DriverError::MetadataNotFound(ref name) if name == "Unknown"));
}

#[tokio::test]
async fn test_invalid_filters_are_rejected() {
    let driver = driver().await;

    let err = driver.count("TestEntity", doc! { "id": { "$near": 1 } }).await.unwrap_err();

    assert!(matches!(err, DriverError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_bulk_insert_is_unsupported() {
    let driver = driver().await;

    let err = driver
        .native_insert_many("TestEntity", vec![doc! { "id": 1 }, doc! { "id": 2 }])
        .await
        .unwrap_err();

    assert!(err.is_unsupported());
    assert_eq!(driver.count("TestEntity", doc! {}).await.unwrap(), 0);
}

#[tokio::test]
async fn test_clear_database_empties_every_collection() {
    let driver = driver().await;
    seed(&driver, vec![doc! { "id": 1, "value": "a" }]).await;
    driver.native_insert("Post", doc! { "id": 1, "title": "Hello" }).await.unwrap();

    driver.schema_generator().clear_database().await.unwrap();

    assert_eq!(driver.count("TestEntity", doc! {}).await.unwrap(), 0);
    assert_eq!(driver.count("Post", doc! {}).await.unwrap(), 0);
    assert_eq!(driver.collection_names().await, vec!["Post".to_string(), "TestEntity".to_string()]);
}

#[tokio::test]
async fn test_clones_share_the_store() {
    let driver = driver().await;
    let clone = driver.clone();

    clone.native_insert("TestEntity", doc! { "id": 1, "value": "a" }).await.unwrap();

    assert_eq!(driver.count("TestEntity", doc! {}).await.unwrap(), 1);
}

#[tokio::test]
async fn test_connection_stub() {
    let driver = driver().await;

    driver.connection().connect().await.unwrap();
    assert!(driver.connection().is_connected().await);
    assert_eq!(driver.connection().client_url(), "memory://test");
    assert_eq!(driver.metadata().len(), 2);

    let value = driver
        .connection()
        .transactional(|_| async { Ok("done") })
        .await
        .unwrap();
    assert_eq!(value, "done");

    driver.close(false).await.unwrap();
}
