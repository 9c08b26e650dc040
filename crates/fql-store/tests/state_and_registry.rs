//! State-machine manager transitions and the manager registry.

mod common;
use common::*;

use fql_store::{
    integer, text, Filter, Registry, SchemaError, StateTableManager, TableSchema, Value,
};

#[tokio::test]
async fn state_manager_requires_a_state_column() {
    let db = test_db().await;

    // test_table has no state column at all
    let err = StateTableManager::new(db.manager("test_table").unwrap()).unwrap_err();
    assert!(matches!(err, SchemaError::MissingState(name) if name == "test_table"));

    assert!(StateTableManager::new(db.manager("jobs").unwrap()).is_ok());
}

#[tokio::test]
async fn change_state_moves_matching_rows_and_stamps_the_time() {
    let db = test_db().await;
    let jobs = StateTableManager::new(db.manager("jobs").unwrap()).unwrap();
    let mut session = db.session().await.unwrap();

    let id = jobs
        .manager()
        .create(
            &mut session,
            &record([("state", "new".into()), ("payload", "p1".into())]),
        )
        .await
        .unwrap();

    let affected = jobs
        .change_state(&mut session, &Filter::All, "new", "running", None)
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let row = jobs.manager().read_by_id(&mut session, id, None).await.unwrap();
    assert_eq!(row["state"], Value::from("running"));
    assert!(matches!(row["last_state_change"], Value::DateTime(_)));
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn change_state_only_touches_rows_in_the_old_state() {
    let db = test_db().await;
    let jobs = StateTableManager::new(db.manager("jobs").unwrap()).unwrap();
    let mut session = db.session().await.unwrap();

    jobs.manager()
        .create_many(
            &mut session,
            &[
                record([("state", "new".into()), ("payload", "p1".into())]),
                record([("state", "done".into()), ("payload", "p2".into())]),
            ],
        )
        .await
        .unwrap();

    let affected = jobs
        .change_state(&mut session, &Filter::All, "new", "running", None)
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let done = jobs
        .manager()
        .count(&mut session, &Filter::fql("state == 'done'"))
        .await
        .unwrap();
    assert_eq!(done, 1);
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn change_state_applies_extra_values_and_filter() {
    let db = test_db().await;
    let jobs = StateTableManager::new(db.manager("jobs").unwrap()).unwrap();
    let mut session = db.session().await.unwrap();

    jobs.manager()
        .create_many(
            &mut session,
            &[
                record([("state", "new".into()), ("payload", "keep".into())]),
                record([("state", "new".into()), ("payload", "skip".into())]),
            ],
        )
        .await
        .unwrap();

    let affected = jobs
        .change_state(
            &mut session,
            &Filter::fql("payload == 'keep'"),
            "new",
            "running",
            Some(&record([("payload", "kept".into())])),
        )
        .await
        .unwrap();
    assert_eq!(affected, 1);

    let running = jobs
        .manager()
        .read(
            &mut session,
            &fql_store::ReadQuery::new().filter("state == 'running'"),
        )
        .await
        .unwrap();
    assert_eq!(texts(&running, "payload"), vec!["kept"]);
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn change_state_by_id_enforces_the_affected_count() {
    let db = test_db().await;
    let jobs = StateTableManager::new(db.manager("jobs").unwrap()).unwrap();
    let mut session = db.session().await.unwrap();

    let id = jobs
        .manager()
        .create(&mut session, &record([("state", "done".into())]))
        .await
        .unwrap();

    // the row exists but is not in the expected state
    let err = jobs
        .change_state_by_id(&mut session, id, "new", "running", None)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "UNRECOVERABLE");
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn registry_locates_managers_by_name() {
    let db = test_db().await;
    let mut registry = Registry::new();
    registry.register("test_table", db.manager("test_table").unwrap());
    registry.register("jobs", db.manager("jobs").unwrap());

    let manager = registry.get("test_table").unwrap();
    assert_eq!(manager.table_name(), "test_table");
    assert!(registry.get("missing").is_none());

    let mut names: Vec<&str> = registry.names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["jobs", "test_table"]);
}

#[test]
fn state_validation_catches_wrong_types() {
    // a nullable state column is rejected
    let mut catalog = fql_store::Catalog::new();
    catalog
        .register(
            TableSchema::new("loose")
                .column(integer("id").primary_key())
                .column(text("state")),
        )
        .unwrap();
    // managers can be built directly from catalog parts in tests
    let schema = std::sync::Arc::clone(catalog.lookup_table("loose").unwrap());
    let manager = fql_store::TableManager::new(
        std::sync::Arc::new(catalog),
        schema,
        std::sync::Arc::new(fql_store::AstCache::default()),
    );
    assert!(matches!(
        StateTableManager::new(manager),
        Err(SchemaError::MissingState(_))
    ));
}
