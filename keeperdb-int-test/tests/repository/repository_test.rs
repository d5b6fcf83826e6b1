use keeperdb::collection::Document;
use keeperdb::query::{where_field, FilterOperator};
use keeperdb_int_test::test_util::{
    cleanup, create_test_context, run_test, Pricing, Task, PRICING, TASKS,
};
use serde_json::{json, Value};

#[test]
fn test_pricing_scenario() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("p1", &Pricing::new("gold", 10)).await?;
            repo.replace("p2", &Pricing::new("silver", 5)).await?;

            let gold = repo.get(vec![("tier", FilterOperator::Equal, "gold")]).await?;
            assert_eq!(gold, vec![Document::new("p1", Pricing::new("gold", 10))]);

            let as_json = serde_json::to_value(&gold)?;
            assert_eq!(as_json, json!([{"id": "p1", "tier": "gold", "price": 10}]));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_get_by_id_after_add() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            let pricing = Pricing {
                tier: "bronze".to_string(),
                price: 3,
                currency: Some("EUR".to_string()),
            };

            let reference = repo.add(&pricing).await?;
            assert_eq!(reference.id().len(), 20);

            let found = repo.get_by_id(reference.id()).await?;
            let found = found.expect("added document should exist");
            assert_eq!(found.id(), reference.id());
            assert_eq!(found.into_inner(), pricing);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_add_generates_distinct_ids() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            let a = repo.add(&Pricing::new("gold", 1)).await?;
            let b = repo.add(&Pricing::new("gold", 1)).await?;
            assert_ne!(a.id(), b.id());
            assert_eq!(repo.get_all().await?.len(), 2);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_merges_fields() {
    run_test(
        create_test_context,
        |ctx| async move {
            let raw = ctx.db().collection::<Value>("raw");
            raw.upsert("doc", &json!({"a": 1})).await?;
            raw.upsert("doc", &json!({"b": 2})).await?;

            let stored = raw.get_by_id("doc").await?.expect("doc should exist");
            assert_eq!(stored.data, json!({"a": 1, "b": 2}));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_upsert_merges_nested_maps() {
    run_test(
        create_test_context,
        |ctx| async move {
            let raw = ctx.db().collection::<Value>("raw");
            raw.upsert("doc", &json!({"geocoding": {"latitude": 1.0, "hash": "s0"}}))
                .await?;
            raw.upsert("doc", &json!({"geocoding": {"hash": "s00"}})).await?;

            let stored = raw.get_by_id("doc").await?.expect("doc should exist");
            assert_eq!(stored.data, json!({"geocoding": {"latitude": 1.0, "hash": "s00"}}));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_replace_drops_previous_fields() {
    run_test(
        create_test_context,
        |ctx| async move {
            let raw = ctx.db().collection::<Value>("raw");
            raw.replace("doc", &json!({"a": 1})).await?;
            raw.replace("doc", &json!({"b": 2})).await?;

            let stored = raw.get_by_id("doc").await?.expect("doc should exist");
            assert_eq!(stored.data, json!({"b": 2}));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_partial_upsert_on_typed_repository() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("p1", &Pricing::new("gold", 10)).await?;
            repo.upsert("p1", &json!({"price": 12})).await?;

            let stored = repo.get_by_id("p1").await?.expect("p1 should exist");
            assert_eq!(stored.tier, "gold");
            assert_eq!(stored.price, 12);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_delete_then_lookup_is_absent() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("p1", &Pricing::new("gold", 10)).await?;
            repo.delete("p1").await?;
            assert!(repo.get_by_id("p1").await?.is_none());

            // deleting again is not an error
            repo.delete("p1").await?;
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_get_without_filters_returns_everything() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&TASKS);
            for (id, task) in [
                ("t3", Task::new("wash", true, 1)),
                ("t1", Task::new("feed", false, 2)),
                ("t2", Task::new("walk", true, 3)),
            ] {
                repo.replace(id, &task).await?;
            }

            let all = repo.get(Vec::<(String, FilterOperator, Value)>::new()).await?;
            let ids: Vec<&str> = all.iter().map(|d| d.id()).collect();
            assert_eq!(ids, vec!["t1", "t2", "t3"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_get_single() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&TASKS);
            repo.replace("t1", &Task::new("feed", true, 2)).await?;
            repo.replace("t2", &Task::new("walk", true, 3)).await?;

            let first = repo
                .get_single(vec![where_field("active", FilterOperator::Equal, true)])
                .await?;
            assert_eq!(first.map(|d| d.id), Some("t1".to_string()));

            let none = repo
                .get_single(vec![where_field("priority", FilterOperator::GreaterThan, 10)])
                .await?;
            assert!(none.is_none());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_conjunctive_filters() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&TASKS);
            repo.replace("t1", &Task::new("feed", true, 2).tagged(&["home"])).await?;
            repo.replace("t2", &Task::new("walk", true, 5).tagged(&["outside"])).await?;
            repo.replace("t3", &Task::new("shop", false, 5).tagged(&["outside"])).await?;

            let hits = repo
                .get(vec![
                    where_field("active", FilterOperator::Equal, true),
                    where_field("tags", FilterOperator::ArrayContains, "outside"),
                ])
                .await?;
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].title, "walk");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_null_fields_are_not_written_by_default() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            repo.replace("p1", &json!({"tier": "gold", "price": 1, "currency": null}))
                .await?;

            let raw = ctx.db().collection::<Value>("pricing");
            let stored = raw.get_by_id("p1").await?.expect("p1 should exist");
            assert_eq!(stored.data, json!({"tier": "gold", "price": 1}));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_references_read_current_state() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&PRICING);
            let reference = repo.get_ref("p9")?;
            assert!(reference.get().await?.is_none());

            repo.replace("p9", &Pricing::new("gold", 9)).await?;
            let current = reference.get().await?.expect("p9 should exist");
            assert_eq!(current.price, 9);

            let fresh = repo.add_ref();
            assert!(fresh.get().await?.is_none());
            Ok(())
        },
        cleanup,
    )
}
