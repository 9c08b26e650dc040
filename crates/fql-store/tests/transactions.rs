//! Transaction-scope behavior: commit and rollback visibility, the
//! closure helper, and the unrecoverable-error contract.

mod common;
use common::*;

use fql_store::{Filter, ReadQuery, Session};

#[tokio::test]
async fn committed_writes_are_visible_to_later_sessions() {
    let db = test_db().await;
    let manager = db.manager("test_table").unwrap();

    let mut session = db.session().await.unwrap();
    manager
        .create(&mut session, &record([("key", "a".into()), ("value", "b".into())]))
        .await
        .unwrap();
    session.commit().await.unwrap();

    let mut session = db.session().await.unwrap();
    assert_eq!(manager.count(&mut session, &Filter::All).await.unwrap(), 1);
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn rolled_back_writes_are_gone() {
    let db = test_db().await;
    let manager = db.manager("test_table").unwrap();

    let mut session = db.session().await.unwrap();
    manager
        .create(&mut session, &record([("key", "a".into())]))
        .await
        .unwrap();
    session.rollback().await.unwrap();

    let mut session = db.session().await.unwrap();
    assert_eq!(manager.count(&mut session, &Filter::All).await.unwrap(), 0);
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn writes_are_observed_in_program_order_within_a_session() {
    let db = test_db().await;
    let manager = db.manager("test_table").unwrap();

    let mut session = db.session().await.unwrap();
    let id = manager
        .create(&mut session, &record([("key", "a".into()), ("value", "b".into())]))
        .await
        .unwrap();
    manager
        .update_by_id(&mut session, id, &record([("value", "c".into())]))
        .await
        .unwrap();
    let row = manager.read_by_id(&mut session, id, None).await.unwrap();
    assert_eq!(row["value"], fql_store::Value::from("c"));
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn transaction_helper_commits_on_success() {
    let db = test_db().await;
    let manager = db.manager("test_table").unwrap();

    let created = manager.clone();
    let id = db
        .transaction(move |session: &mut Session| {
            Box::pin(async move {
                created
                    .create(session, &record([("key", "a".into()), ("value", "b".into())]))
                    .await
            })
        })
        .await
        .unwrap();

    let mut session = db.session().await.unwrap();
    let row = manager.read_by_id(&mut session, id, None).await.unwrap();
    assert_eq!(row["key"], fql_store::Value::from("a"));
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn transaction_helper_rolls_back_on_error() {
    let db = test_db().await;
    let manager = db.manager("test_table").unwrap();

    let inner = manager.clone();
    let result: fql_store::Result<()> = db
        .transaction(move |session: &mut Session| {
            Box::pin(async move {
                let id = inner.create(session, &record([("key", "a".into())])).await?;
                // addressing a missing id makes the whole scope fail
                inner
                    .update_many_by_id(session, &[id, 999], &record([("value", "x".into())]))
                    .await
            })
        })
        .await;

    let err = result.unwrap_err();
    assert_eq!(err.code(), "UNRECOVERABLE");

    // the create above must not have survived
    let mut session = db.session().await.unwrap();
    assert_eq!(manager.count(&mut session, &Filter::All).await.unwrap(), 0);
    session.rollback().await.unwrap();
}

#[tokio::test]
async fn recoverable_errors_leave_the_session_usable() {
    let db = test_db().await;
    let manager = db.manager("test_table").unwrap();

    let mut session = db.session().await.unwrap();
    manager
        .create(&mut session, &record([("key", "a".into())]))
        .await
        .unwrap();

    // a parse error mutates nothing and the scope can continue
    let err = manager
        .read(&mut session, &ReadQuery::new().filter("not valid ("))
        .await
        .unwrap_err();
    assert!(err.is_recoverable());

    manager
        .create(&mut session, &record([("key", "b".into())]))
        .await
        .unwrap();
    session.commit().await.unwrap();

    let mut session = db.session().await.unwrap();
    assert_eq!(manager.count(&mut session, &Filter::All).await.unwrap(), 2);
    session.rollback().await.unwrap();
}
