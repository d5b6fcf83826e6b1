use keeperdb::errors::ErrorKind;
use keeperdb_geo::{
    distance_between, geohash_for_location, GeoPoint, GeoQueryOptions, GeoRangeQuery,
    GEOHASH_PRECISION,
};
use keeperdb_int_test::test_util::{cleanup, create_test_context, run_test, Keeper, KEEPERS};
use serde_json::{json, Value};

fn london() -> GeoPoint {
    GeoPoint::new(51.5074, -0.1278).unwrap()
}

fn names(keepers: &[keeperdb::collection::Document<Keeper>]) -> Vec<String> {
    let mut names: Vec<String> = keepers.iter().map(|k| k.name.clone()).collect();
    names.sort();
    names
}

#[test]
fn test_results_lie_within_radius() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&KEEPERS);
            repo.replace("center", &Keeper::at("center", 51.5074, -0.1278)?).await?;
            repo.replace("near", &Keeper::at("near", 51.55, -0.10)?).await?;
            repo.replace("edge", &Keeper::at("edge", 51.6, -0.1278)?).await?;
            repo.replace("paris", &Keeper::at("paris", 48.8566, 2.3522)?).await?;

            let found = repo
                .get_within_range(london(), 10.0, GeoQueryOptions::default())
                .await?;
            assert_eq!(names(&found), vec!["center", "near"]);

            for keeper in &found {
                let location =
                    GeoPoint::new(keeper.geocoding.latitude, keeper.geocoding.longitude)?;
                assert!(distance_between(&london(), &location) <= 10.0);
            }

            let wider = repo
                .get_within_range(london(), 500.0, GeoQueryOptions::default())
                .await?;
            assert_eq!(names(&wider), vec!["center", "edge", "near", "paris"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_document_just_outside_radius_is_excluded() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&KEEPERS);
            let north = Keeper::at("north", 52.5074, -0.1278)?;
            repo.replace("north", &north).await?;

            let distance = distance_between(&london(), &GeoPoint::new(52.5074, -0.1278)?);
            let exact = repo
                .get_within_range(london(), distance, GeoQueryOptions::default())
                .await?;
            assert_eq!(names(&exact), vec!["north"]);

            let short = repo
                .get_within_range(london(), distance - 1e-6, GeoQueryOptions::default())
                .await?;
            assert!(short.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_document_on_shared_range_boundary_is_returned_twice() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&KEEPERS);
            // "gcpv" ends one query range and starts the next one
            let boundary = Keeper::at("boundary", 51.5074, -0.1278)?.with_hash("gcpv");
            repo.replace("boundary", &boundary).await?;

            let found = repo
                .get_within_range(london(), 10.0, GeoQueryOptions::default())
                .await?;
            let ids: Vec<&str> = found.iter().map(|d| d.id()).collect();
            assert_eq!(ids, vec!["boundary", "boundary"]);

            let unique = repo
                .get_within_range(london(), 10.0, GeoQueryOptions::default().deduplicate(true))
                .await?;
            assert_eq!(unique.len(), 1);
            assert_eq!(unique[0].id(), "boundary");
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_inactive_keeper_is_excluded() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&KEEPERS);
            repo.replace("on", &Keeper::at("on", 51.51, -0.13)?).await?;
            repo.replace("off", &Keeper::at("off", 51.51, -0.13)?.keeper_active(false))
                .await?;

            let options = GeoQueryOptions::default()
                .only_keepers(true)
                .only_keeper_active(true);
            let found = repo.get_within_range(london(), 5.0, options).await?;
            assert_eq!(names(&found), vec!["on"]);

            let any_keeper = GeoQueryOptions::default().only_keeper_active(false);
            let found = repo.get_within_range(london(), 5.0, any_keeper).await?;
            assert_eq!(names(&found), vec!["off", "on"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_active_filter_without_keeper_filter() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&KEEPERS);
            repo.replace("user", &Keeper::at("user", 51.51, -0.13)?.not_keeper()).await?;
            repo.replace(
                "idle",
                &Keeper::at("idle", 51.51, -0.13)?.not_keeper().active(false),
            )
            .await?;

            let keepers_only = repo
                .get_within_range(london(), 5.0, GeoQueryOptions::default())
                .await?;
            assert!(keepers_only.is_empty());

            let active = GeoQueryOptions::default().only_keepers(false);
            let found = repo.get_within_range(london(), 5.0, active.clone()).await?;
            assert_eq!(names(&found), vec!["user"]);

            let everyone = active.only_active(false);
            let found = repo.get_within_range(london(), 5.0, everyone).await?;
            assert_eq!(names(&found), vec!["idle", "user"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_raw_documents_with_text_coordinates() {
    run_test(
        create_test_context,
        |ctx| async move {
            let raw = ctx.db().collection::<Value>("venues");
            let hash = geohash_for_location(&GeoPoint::new(51.509, -0.126)?, GEOHASH_PRECISION)?;
            raw.replace(
                "text",
                &json!({
                    "geocoding": {"hash": hash, "latitude": "51.509", "longitude": "-0.126"},
                    "active": true,
                }),
            )
            .await?;
            raw.replace(
                "unhashed",
                &json!({
                    "geocoding": {"latitude": 51.509, "longitude": -0.126},
                    "active": true,
                }),
            )
            .await?;

            let options = GeoQueryOptions::default().only_keepers(false);
            let found = raw.get_within_range(london(), 2.0, options).await?;
            let ids: Vec<&str> = found.iter().map(|d| d.id()).collect();
            assert_eq!(ids, vec!["text"]);
            assert_eq!(found[0].data["geocoding"]["latitude"], json!("51.509"));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_invalid_radius_is_rejected() {
    run_test(
        create_test_context,
        |ctx| async move {
            let repo = ctx.db().repository(&KEEPERS);
            for radius in [0.0, -1.0, f64::NAN, f64::INFINITY] {
                let err = repo
                    .get_within_range(london(), radius, GeoQueryOptions::default())
                    .await
                    .unwrap_err();
                assert_eq!(err.kind(), &ErrorKind::InvalidArgument);
            }
            Ok(())
        },
        cleanup,
    )
}
