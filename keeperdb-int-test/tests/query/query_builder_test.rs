use keeperdb::common::OrderDirection;
use keeperdb::query::FilterOperator;
use keeperdb::repository::CollectionRepository;
use keeperdb::store::DocumentStoreProvider;
use keeperdb_int_test::test_util::{cleanup, create_test_context, run_test, Task, TestContext, TASKS};

async fn seed(ctx: &TestContext) -> keeperdb::errors::DbResult<CollectionRepository<Task>> {
    let repo = ctx.db().repository(&TASKS);
    let tasks = [
        ("t1", Task::new("feed", true, 2)),
        ("t2", Task::new("walk", true, 5)),
        ("t3", Task::new("shop", false, 5)),
        ("t4", Task::new("cook", true, 1)),
        ("t5", Task::new("read", true, 3)),
    ];
    for (id, task) in tasks {
        repo.replace(id, &task).await?;
    }
    Ok(repo)
}

fn titles(docs: &[keeperdb::collection::Document<Task>]) -> Vec<&str> {
    docs.iter().map(|d| d.title.as_str()).collect()
}

#[test]
fn test_filter_with_limit() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let results = repo
                .query_builder()
                .filter("active", FilterOperator::Equal, true)
                .limit(2)
                .query()
                .await?;

            assert!(results.len() <= 2);
            assert!(results.iter().all(|d| d.active));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_compound_ordering() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let results = repo
                .query_builder()
                .order_by_with("priority", OrderDirection::Descending)
                .order_by("title")
                .query()
                .await?;

            assert_eq!(titles(&results), vec!["shop", "walk", "read", "feed", "cook"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_limit_to_last() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let results = repo
                .query_builder()
                .order_by("priority")
                .limit_to_last(2)
                .query()
                .await?;

            // ties on priority fall back to document id order
            assert_eq!(titles(&results), vec!["walk", "shop"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_last_page_cap_wins() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let ordered = repo.query_builder().order_by("priority");

            let first = ordered.limit_to_last(1).limit(3).query().await?;
            assert_eq!(titles(&first), vec!["cook", "feed", "read"]);

            let last = ordered.limit(3).limit_to_last(1).query().await?;
            assert_eq!(titles(&last), vec!["shop"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_cursor_pagination() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let ordered = repo.query_builder().order_by("priority").order_by("title");

            let first_page = ordered.limit(2).query().await?;
            assert_eq!(titles(&first_page), vec!["cook", "feed"]);

            let last = &first_page[1];
            let next_page = ordered
                .start_after([serde_json::json!(last.priority), serde_json::json!(last.title)])
                .limit(2)
                .query()
                .await?;
            assert_eq!(titles(&next_page), vec!["read", "shop"]);

            let window = ordered.start_at([3]).end_before([5]).query().await?;
            assert_eq!(titles(&window), vec!["read"]);

            let inclusive = ordered.start_at([3]).end_at([5]).query().await?;
            assert_eq!(titles(&inclusive), vec!["read", "shop", "walk"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_branches_do_not_share_clauses() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let active = repo.query_builder().filter("active", FilterOperator::Equal, true);
            let urgent = active.filter("priority", FilterOperator::GreaterThanOrEqual, 3);
            let calm = active.filter("priority", FilterOperator::LessThan, 3);

            assert_eq!(active.query().await?.len(), 4);
            assert_eq!(titles(&urgent.query().await?), vec!["walk", "read"]);
            assert_eq!(titles(&calm.query().await?), vec!["feed", "cook"]);

            // executing does not consume the builder
            assert_eq!(active.query().await?.len(), 4);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_get_returns_raw_snapshot() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let snapshot = repo
                .query_builder()
                .filter("priority", FilterOperator::In, vec![1, 2])
                .get()
                .await?;

            let ids: Vec<&str> = snapshot.iter().map(|s| s.id()).collect();
            assert_eq!(ids, vec!["t1", "t4"]);
            assert_eq!(snapshot.docs()[0].get("title"), Some(&serde_json::json!("feed")));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_build_and_run_through_the_store() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let typed = repo
                .query_builder()
                .filter("active", FilterOperator::NotEqual, true)
                .build();

            assert_eq!(typed.query().collection(), "tasks");
            let snapshot = ctx.db().store().run_query(typed.query()).await?;
            let decoded = typed.decode(snapshot)?;
            assert_eq!(titles(&decoded), vec!["shop"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_typed_field_paths() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = seed(&ctx).await?;
            let typed = repo
                .query_builder()
                .filter(Task::ACTIVE, FilterOperator::Equal, true)
                .order_by_with(Task::PRIORITY, OrderDirection::Descending)
                .order_by(&Task::TITLE)
                .query()
                .await?;
            let untyped = repo
                .query_builder()
                .filter("active", FilterOperator::Equal, true)
                .order_by_with("priority", OrderDirection::Descending)
                .order_by("title")
                .query()
                .await?;
            assert_eq!(titles(&typed), vec!["walk", "read", "feed", "cook"]);
            assert_eq!(titles(&typed), titles(&untyped));

            let urgent = repo
                .get([
                    (Task::ACTIVE, FilterOperator::Equal, serde_json::json!(true)),
                    (Task::PRIORITY, FilterOperator::GreaterThanOrEqual, serde_json::json!(3)),
                ])
                .await?;
            assert_eq!(titles(&urgent), vec!["walk", "read"]);

            let walk = repo
                .get_single([Task::TITLE.filter(FilterOperator::Equal, "walk")])
                .await?
                .expect("walk should exist");
            assert_eq!(walk.id(), "t2");
            Ok(())
        },
        cleanup,
    )
}
