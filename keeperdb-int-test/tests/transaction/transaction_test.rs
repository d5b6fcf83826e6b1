use keeperdb::errors::{DbError, ErrorKind};
use keeperdb::store::memory::InMemoryStoreConfig;
use keeperdb::store::FieldUpdates;
use keeperdb_int_test::test_util::{
    cleanup, create_test_context, create_test_context_with, run_test, Pricing, PRICING,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn test_read_modify_write() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("p1", &Pricing::new("gold", 10)).await?;

            repo.transaction("p1", |doc, tx| async move {
                let current = tx.get(&doc).await?;
                let price = current.map(|p| p.price).unwrap_or(0);
                tx.update_fields(&doc, FieldUpdates::new().set("price", price * 2))
            })
            .await?;

            let stored = repo.get_by_id("p1").await?.expect("p1 should exist");
            assert_eq!(stored.price, 20);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_transaction_creates_missing_document() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.transaction("fresh", |doc, tx| async move {
                if tx.get(&doc).await?.is_none() {
                    tx.set(&doc, &Pricing::new("trial", 0))?;
                }
                Ok(())
            })
            .await?;

            let stored = repo.get_by_id("fresh").await?.expect("fresh should exist");
            assert_eq!(stored.tier, "trial");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failed_function_commits_nothing() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("p1", &Pricing::new("gold", 10)).await?;

            let err = repo
                .transaction("p1", |doc, tx| async move {
                    tx.delete(&doc)?;
                    Err::<(), _>(DbError::new("price rule violated", ErrorKind::InvalidArgument))
                })
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
            assert_eq!(err.message(), "price rule violated");

            assert!(repo.get_by_id("p1").await?.is_some());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_conflicting_write_triggers_retry() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("p1", &Pricing::new("gold", 10)).await?;

            let attempts = Arc::new(AtomicUsize::new(0));
            let counter = attempts.clone();
            let outside = repo.clone();
            repo.transaction("p1", move |doc, tx| {
                let counter = counter.clone();
                let outside = outside.clone();
                async move {
                    let current = tx.get(&doc).await?;
                    let price = current.map(|p| p.price).unwrap_or(0);
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        // a concurrent writer changes the document after our read
                        outside.upsert("p1", &serde_json::json!({"price": 100})).await?;
                    }
                    tx.update_fields(&doc, FieldUpdates::new().set("price", price + 1))
                }
            })
            .await?;

            assert_eq!(attempts.load(Ordering::SeqCst), 2);
            let stored = repo.get_by_id("p1").await?.expect("p1 should exist");
            assert_eq!(stored.price, 101);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_persistent_conflict_surfaces() {
    run_test(
        || {
            let config = InMemoryStoreConfig::new();
            config.set_max_transaction_attempts(3)?;
            create_test_context_with(config)
        },
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("p1", &Pricing::new("gold", 10)).await?;

            let attempts = Arc::new(AtomicUsize::new(0));
            let counter = attempts.clone();
            let outside = repo.clone();
            let err = repo
                .transaction("p1", move |doc, tx| {
                    let counter = counter.clone();
                    let outside = outside.clone();
                    async move {
                        let n = counter.fetch_add(1, Ordering::SeqCst) as i64;
                        tx.get(&doc).await?;
                        outside.upsert("p1", &serde_json::json!({"price": n})).await?;
                        tx.update_fields(&doc, FieldUpdates::new().set("tier", "platinum"))
                    }
                })
                .await
                .unwrap_err();

            assert_eq!(err.kind(), &ErrorKind::TransactionConflict);
            assert_eq!(attempts.load(Ordering::SeqCst), 3);

            let stored = repo.get_by_id("p1").await?.expect("p1 should exist");
            assert_eq!(stored.tier, "gold");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_concurrent_increments_are_serialized() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("counter", &Pricing::new("meter", 0)).await?;

            let increments = (0..4).map(|_| {
                repo.transaction("counter", |doc, tx| async move {
                    let current = tx.get(&doc).await?;
                    let price = current.map(|p| p.price).unwrap_or(0);
                    tx.update_fields(&doc, FieldUpdates::new().set("price", price + 1))
                })
            });
            futures::future::try_join_all(increments).await?;

            let stored = repo.get_by_id("counter").await?.expect("counter should exist");
            assert_eq!(stored.price, 4);
            Ok(())
        },
        cleanup,
    )
}
