use keeperdb::errors::ErrorKind;
use keeperdb::query::FilterOperator;
use keeperdb_int_test::test_util::{cleanup, create_test_context, run_test, Task, TASKS};

#[test]
fn test_cursor_with_more_values_than_orderings() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&TASKS);
            repo.replace("t1", &Task::new("feed", true, 2)).await?;

            let err = repo
                .query_builder()
                .order_by("priority")
                .start_at([serde_json::json!(1), serde_json::json!("feed")])
                .query()
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_limit_to_last_without_ordering() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&TASKS);
            let err = repo.query_builder().limit_to_last(1).get().await.unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_list_operator_with_scalar_operand() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&TASKS);
            let err = repo
                .query_builder()
                .filter("priority", FilterOperator::NotIn, 3)
                .query()
                .await
                .unwrap_err();
            assert_eq!(err.kind(), &ErrorKind::InvalidQuery);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unknown_field_matches_nothing() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&TASKS);
            repo.replace("t1", &Task::new("feed", true, 2)).await?;

            let hits = repo
                .query_builder()
                .filter("owner", FilterOperator::Equal, "nobody")
                .query()
                .await?;
            assert!(hits.is_empty());

            let ordered = repo.query_builder().order_by("owner").query().await?;
            assert!(ordered.is_empty());
            Ok(())
        },
        cleanup,
    )
}
