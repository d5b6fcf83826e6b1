use keeperdb::store::FieldUpdates;
use keeperdb_int_test::test_util::{cleanup, create_test_context, run_test, Pricing, PRICING};
use serde_json::json;

#[test]
fn test_batch_applies_all_writes() {
    run_test(
        create_test_context,
        |ctx| async move {
            let db = ctx.db();
            let repo = db.repository(&PRICING);
            repo.replace("old", &Pricing::new("legacy", 1)).await?;
            repo.replace("p1", &Pricing::new("gold", 10)).await?;

            let fresh = repo.add_ref();
            let mut batch = db.create_batch();
            batch
                .set(&fresh, &Pricing::new("silver", 5))?
                .merge(&repo.get_ref("p1")?, &json!({"currency": "USD"}))?;
            batch
                .update_fields(&repo.get_ref("p2")?, FieldUpdates::new().set("tier", "bronze").increment("price", 2))?
                .delete(&repo.get_ref("old")?);
            assert_eq!(batch.len(), 4);
            batch.commit().await?;

            let silver = repo.get_by_id(fresh.id()).await?.expect("fresh should exist");
            assert_eq!(silver.tier, "silver");

            let gold = repo.get_by_id("p1").await?.expect("p1 should exist");
            assert_eq!(gold.currency.as_deref(), Some("USD"));
            assert_eq!(gold.price, 10);

            let bronze = repo.get_by_id("p2").await?.expect("p2 should exist");
            assert_eq!(bronze.into_inner(), Pricing::new("bronze", 2));

            assert!(repo.get_by_id("old").await?.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_empty_batch_commits() {
    run_test(
        create_test_context,
        |ctx| async move {
            let batch = ctx.db().create_batch();
            assert!(batch.is_empty());
            batch.commit().await?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_failed_batch_writes_nothing() {
    run_test(
        create_test_context,
        |ctx| async move {
            let db = ctx.db();
            let repo = db.repository(&PRICING);
            let mut batch = db.create_batch();
            batch.set(&repo.get_ref("p1")?, &Pricing::new("gold", 10))?;
            ctx.store().close();

            assert!(batch.commit().await.is_err());
            Ok(())
        },
        cleanup,
    )
}
