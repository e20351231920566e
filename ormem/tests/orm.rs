use bson::doc;
use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};

use ormem::{memory::InMemoryDriver, prelude::*};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct TestEntity {
    id: i32,
    value: String,
}

impl Entity for TestEntity {
    fn entity_name() -> &'static str {
        "TestEntity"
    }

    fn metadata() -> EntityMetadata {
        EntityMetadata::new(Self::entity_name())
            .primary_key("id")
            .property(EntityProperty::new("value"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Post {
    id: i32,
    title: String,
    created_at: Option<bson::DateTime>,
}

impl Entity for Post {
    fn entity_name() -> &'static str {
        "Post"
    }

    fn metadata() -> EntityMetadata {
        EntityMetadata::new(Self::entity_name())
            .primary_key("id")
            .property(EntityProperty::new("title"))
            .property(EntityProperty::new("created_at").with_default_raw("current_timestamp"))
    }
}

async fn orm() -> Orm<InMemoryDriver> {
    let config = Configuration::builder()
        .db_name("test")
        .entity::<TestEntity>()
        .entity::<Post>()
        .build()
        .unwrap();
    let orm = Orm::init(InMemoryDriver::builder(config)).await.unwrap();

    orm.schema_generator().clear_database().await.unwrap();
    orm
}

fn entity(id: i32, value: &str) -> TestEntity {
    TestEntity { id, value: value.to_string() }
}

#[tokio::test]
async fn test_basic_insert_one() {
    let orm = orm().await;

    let result = orm.em().fork().insert(&entity(1, "test")).await.unwrap();

    assert_eq!(result.insert_id, Some(bson::Bson::Int32(1)));
    orm.close(false).await.unwrap();
}

#[tokio::test]
async fn test_basic_find_one() {
    let orm = orm().await;
    orm.em().fork().insert(&entity(1, "test")).await.unwrap();

    let found = orm
        .em()
        .fork()
        .find_one::<TestEntity>(Filter::eq("id", 1))
        .await
        .unwrap();

    assert_eq!(found, Some(entity(1, "test")));
}

#[tokio::test]
async fn test_basic_find() {
    let orm = orm().await;
    orm.em().fork().insert(&entity(1, "test")).await.unwrap();

    let found = orm
        .em()
        .fork()
        .find::<TestEntity>(Filter::all(), FindOptions::default())
        .await
        .unwrap();

    assert_eq!(found, vec![entity(1, "test")]);
}

#[tokio::test]
async fn test_physical_removing() {
    let orm = orm().await;
    let em = orm.em();
    em.fork().insert(&entity(1, "test")).await.unwrap();

    let result = em.fork().native_delete::<TestEntity>(Filter::eq("id", 1)).await.unwrap();

    assert_eq!(result.affected_rows, 1);
    assert!(em.fork().find::<TestEntity>(Filter::all(), FindOptions::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_basic_count() {
    let orm = orm().await;
    orm.em().fork().insert(&entity(1, "test")).await.unwrap();

    assert_eq!(orm.em().fork().count::<TestEntity>(Filter::eq("id", 1)).await.unwrap(), 1);
}

#[tokio::test]
async fn test_basic_update() {
    let orm = orm().await;
    let em = orm.em();
    em.fork().insert(&entity(1, "test")).await.unwrap();

    let result = em
        .fork()
        .native_update::<TestEntity>(Filter::eq("id", 1), doc! { "value": "update-test" })
        .await
        .unwrap();
    let found = em.fork().find_one::<TestEntity>(Filter::eq("id", 1)).await.unwrap();

    assert_eq!(result.affected_rows, 1);
    assert_eq!(found.map(|e| e.value), Some("update-test".to_string()));
}

#[tokio::test]
async fn test_duplicate_insert_fails() {
    let orm = orm().await;
    let repository = orm.em().repository::<TestEntity>();
    repository.insert(&entity(1, "a")).await.unwrap();

    let err = repository.insert(&entity(1, "b")).await.unwrap_err();

    assert!(err.is_duplicate_key());
    assert_eq!(repository.count(Filter::all()).await.unwrap(), 1);
}

#[tokio::test]
async fn test_timestamp_default_round_trips_through_entity() {
    let orm = orm().await;
    let em = orm.em();

    em.insert(&Post { id: 1, title: "Hello".into(), created_at: None }).await.unwrap();
    let post = em.find_one::<Post>(Filter::eq("id", 1)).await.unwrap().unwrap();

    assert!(post.created_at.is_some());
}

#[tokio::test]
async fn test_find_and_count_pages_sorted_matches() {
    let orm = orm().await;
    let em = orm.em();
    for id in 1..=5 {
        em.insert(&entity(id, &format!("value {id}"))).await.unwrap();
    }

    let options = FindOptions::builder().order_by("id", SortDirection::Desc).build();
    let page = em
        .find_and_count::<TestEntity>(Filter::like("value", "value%"), options, &PaginationParams::new(2, 2))
        .await
        .unwrap();

    assert_eq!(page.items, vec![entity(3, "value 3"), entity(2, "value 2")]);
    assert_eq!(page.count, 5);
    assert_eq!(page.next_page, Some(3));
    assert_eq!(page.previous_page, Some(1));
}

#[tokio::test]
async fn test_find_and_count_rejects_empty_pages() {
    let orm = orm().await;
    let em = orm.em();
    for id in 1..=3 {
        em.insert(&entity(id, "test")).await.unwrap();
    }

    let err = em
        .find_and_count::<TestEntity>(Filter::all(), FindOptions::default(), &PaginationParams::new(1, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, DriverError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_untyped_collection_handle() {
    let orm = orm().await;
    let collection = orm.em().collection("TestEntity");

    collection.insert(doc! { "id": 1, "value": "raw" }).await.unwrap();

    let found = orm.em().find_one::<TestEntity>(Filter::all()).await.unwrap();
    assert_eq!(found, Some(entity(1, "raw")));
    assert!(collection.insert_many(vec![doc! { "id": 2 }]).await.unwrap_err().is_unsupported());
}

#[tokio::test]
async fn test_forks_share_data_until_cleared() {
    let orm = orm().await;
    orm.em().insert(&entity(1, "test")).await.unwrap();

    assert_eq!(orm.em().fork().count::<TestEntity>(Filter::all()).await.unwrap(), 1);

    orm.schema_generator().clear_database().await.unwrap();

    assert_eq!(orm.em().count::<TestEntity>(Filter::all()).await.unwrap(), 0);
}
