use crate::distance::distance_between;
use crate::error::GeoError;
use crate::geo_point::GeoPoint;
use crate::geohash::geohash_query_bounds;
use async_trait::async_trait;
use futures::future::try_join_all;
use itertools::Itertools;
use keeperdb::collection::{Document, DocumentSnapshot, QuerySnapshot};
use keeperdb::common::{as_f64_lenient, is_truthy};
use keeperdb::errors::{DbError, DbResult};
use keeperdb::repository::CollectionRepository;

/// Field paths the range query reads from each document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoFields {
    pub hash: String,
    pub latitude: String,
    pub longitude: String,
    pub keeper: String,
    pub keeper_active: String,
    pub active: String,
}

impl Default for GeoFields {
    fn default() -> Self {
        GeoFields {
            hash: "geocoding.hash".to_string(),
            latitude: "geocoding.latitude".to_string(),
            longitude: "geocoding.longitude".to_string(),
            keeper: "keeperAccount".to_string(),
            keeper_active: "keeperAccountActive".to_string(),
            active: "active".to_string(),
        }
    }
}

/// Options of [`GeoRangeQuery::get_within_range`].
///
/// The role filter and the activity filter are exclusive: with
/// `only_keepers` set, `only_active` is not consulted.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoQueryOptions {
    only_keepers: bool,
    only_active: bool,
    only_keeper_active: bool,
    deduplicate: bool,
    fields: GeoFields,
}

impl Default for GeoQueryOptions {
    fn default() -> Self {
        GeoQueryOptions {
            only_keepers: true,
            only_active: true,
            only_keeper_active: true,
            deduplicate: false,
            fields: GeoFields::default(),
        }
    }
}

impl GeoQueryOptions {
    pub fn new() -> Self {
        GeoQueryOptions::default()
    }

    /// Keeps only documents flagged as keeper accounts.
    pub fn only_keepers(mut self, value: bool) -> Self {
        self.only_keepers = value;
        self
    }

    /// Keeps only active documents. Ignored when `only_keepers` is set.
    pub fn only_active(mut self, value: bool) -> Self {
        self.only_active = value;
        self
    }

    /// With `only_keepers`, additionally requires the keeper-active flag.
    pub fn only_keeper_active(mut self, value: bool) -> Self {
        self.only_keeper_active = value;
        self
    }

    /// Returns a document found by several geohash ranges only once.
    pub fn deduplicate(mut self, value: bool) -> Self {
        self.deduplicate = value;
        self
    }

    pub fn fields(mut self, fields: GeoFields) -> Self {
        self.fields = fields;
        self
    }

    pub fn field_paths(&self) -> &GeoFields {
        &self.fields
    }

    fn admits(&self, snapshot: &DocumentSnapshot) -> bool {
        if self.only_keepers {
            is_truthy(snapshot.get(&self.fields.keeper))
                && (!self.only_keeper_active || is_truthy(snapshot.get(&self.fields.keeper_active)))
        } else if self.only_active {
            is_truthy(snapshot.get(&self.fields.active))
        } else {
            true
        }
    }

    fn location_of(&self, snapshot: &DocumentSnapshot) -> Option<GeoPoint> {
        let latitude = as_f64_lenient(snapshot.get(&self.fields.latitude))?;
        let longitude = as_f64_lenient(snapshot.get(&self.fields.longitude))?;
        GeoPoint::new(latitude, longitude).ok()
    }
}

/// Proximity search over a collection whose documents carry a geohash.
#[async_trait]
pub trait GeoRangeQuery<T> {
    /// Finds documents within `radius_km` kilometers of `center`.
    ///
    /// # Arguments
    ///
    /// * `center` - Center of the search circle
    /// * `radius_km` - Radius in kilometers, must be positive
    /// * `options` - Role and activity filters, field paths, dedup switch
    ///
    /// # Returns
    ///
    /// The matching documents with their ids attached. Order across
    /// geohash ranges is unspecified. Unless `options.deduplicate` is set,
    /// a document matched by two ranges is returned twice.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` for a non-positive or non-finite radius
    /// * Any store or codec error, unchanged
    async fn get_within_range(
        &self,
        center: GeoPoint,
        radius_km: f64,
        options: GeoQueryOptions,
    ) -> DbResult<Vec<Document<T>>>;
}

#[async_trait]
impl<T> GeoRangeQuery<T> for CollectionRepository<T>
where
    T: Send + 'static,
{
    async fn get_within_range(
        &self,
        center: GeoPoint,
        radius_km: f64,
        options: GeoQueryOptions,
    ) -> DbResult<Vec<Document<T>>> {
        if !radius_km.is_finite() || radius_km <= 0.0 {
            log::error!("Invalid range query radius {}", radius_km);
            return Err(DbError::from(GeoError::InvalidRadius(radius_km)));
        }

        let bounds = geohash_query_bounds(&center, radius_km * 1000.0)?;
        let base = self.query_builder().order_by(options.fields.hash.as_str());
        let shards: Vec<_> = bounds
            .iter()
            .map(|range| {
                base.start_at([range.start.as_str()])
                    .end_at([range.end.as_str()])
            })
            .collect();

        log::debug!(
            "Range query around {} within {} km over {} geohash ranges",
            center,
            radius_km,
            shards.len()
        );

        let snapshots = try_join_all(shards.iter().map(|shard| shard.get())).await?;
        let hits = collect_within_range(snapshots, &center, radius_km, &options);
        base.build().decode(QuerySnapshot::new(hits))
    }
}

/// Merges the per-range results, keeping documents inside the circle that
/// pass the role and activity filters.
///
/// Documents without a parseable location are dropped.
pub fn collect_within_range(
    snapshots: Vec<QuerySnapshot>,
    center: &GeoPoint,
    radius_km: f64,
    options: &GeoQueryOptions,
) -> Vec<DocumentSnapshot> {
    let radius_meters = radius_km * 1000.0;
    let hits = snapshots
        .into_iter()
        .flatten()
        .filter(|snapshot| match options.location_of(snapshot) {
            Some(location) => distance_between(center, &location) * 1000.0 <= radius_meters,
            None => false,
        })
        .filter(|snapshot| options.admits(snapshot));

    if options.deduplicate {
        hits.unique_by(|snapshot| snapshot.id().to_string()).collect()
    } else {
        hits.collect()
    }
}
