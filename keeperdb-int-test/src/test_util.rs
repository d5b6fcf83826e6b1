use keeperdb::collection::Collection;
use keeperdb::database::Database;
use keeperdb::errors::DbResult;
use keeperdb::query::Field;
use keeperdb::store::memory::{InMemoryStore, InMemoryStoreConfig};
use keeperdb_geo::{geohash_for_location, GeoPoint, GeoResult, GEOHASH_PRECISION};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

pub const PRICING: Collection<Pricing> = Collection::new("pricing");
pub const KEEPERS: Collection<Keeper> = Collection::new("keepers");
pub const TASKS: Collection<Task> = Collection::new("tasks");

/// Runs an async test against a fresh context.
///
/// Each test gets its own current-thread runtime, so tests stay independent
/// when the harness runs them in parallel. `after` runs whether the test
/// body returned an error, panicked on a failed assertion, or passed. A
/// panic is re-raised once `after` has run.
pub fn run_test<B, T, A, Fut>(before: B, test: T, after: A)
where
    B: Fn() -> DbResult<TestContext>,
    T: Fn(TestContext) -> Fut,
    Fut: Future<Output = DbResult<()>>,
    A: Fn(TestContext) -> DbResult<()>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("Failed to build test runtime");

    let start_time = Instant::now();
    let ctx = match before() {
        Ok(ctx) => ctx,
        Err(e) => panic!("Before run failed: {:?}", e),
    };

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| runtime.block_on(test(ctx.clone()))));
    let after_result = after(ctx);
    let elapsed = start_time.elapsed();

    let result = match outcome {
        Ok(result) => result,
        Err(payload) => {
            if let Err(e) = after_result {
                eprintln!("After run failed: {:?}", e);
            }
            panic::resume_unwind(payload);
        }
    };

    if let Err(e) = result {
        eprintln!("\n==================== TEST FAILED ====================");
        eprintln!("Took {:?}", elapsed);
        eprintln!("Error: {:?}", e);
        eprintln!("=====================================================\n");
        panic!("Test failed: {}", e);
    }
    if let Err(e) = after_result {
        panic!("After run failed: {:?}", e);
    }
}

#[derive(Clone)]
pub struct TestContext {
    db: Database,
    store: InMemoryStore,
}

impl TestContext {
    pub fn new(db: Database, store: InMemoryStore) -> Self {
        Self { db, store }
    }

    pub fn db(&self) -> Database {
        self.db.clone()
    }

    pub fn store(&self) -> InMemoryStore {
        self.store.clone()
    }
}

pub fn create_test_context() -> DbResult<TestContext> {
    create_test_context_with(InMemoryStoreConfig::new())
}

pub fn create_test_context_with(config: InMemoryStoreConfig) -> DbResult<TestContext> {
    let store = InMemoryStore::new(config);
    let db = Database::builder().store(store.clone()).open()?;
    Ok(TestContext::new(db, store))
}

pub fn cleanup(ctx: TestContext) -> DbResult<()> {
    ctx.store().close();
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pricing {
    pub tier: String,
    pub price: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl Pricing {
    pub const TIER: Field<Pricing> = Field::new("tier");
    pub const PRICE: Field<Pricing> = Field::new("price");

    pub fn new(tier: &str, price: i64) -> Self {
        Pricing {
            tier: tier.to_string(),
            price,
            currency: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geocoding {
    pub hash: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keeper {
    pub name: String,
    pub geocoding: Geocoding,
    pub keeper_account: bool,
    pub keeper_account_active: bool,
    pub active: bool,
}

impl Keeper {
    /// An active keeper whose stored geohash matches its location.
    pub fn at(name: &str, latitude: f64, longitude: f64) -> GeoResult<Self> {
        let point = GeoPoint::new(latitude, longitude)?;
        Ok(Keeper {
            name: name.to_string(),
            geocoding: Geocoding {
                hash: geohash_for_location(&point, GEOHASH_PRECISION)?,
                latitude,
                longitude,
            },
            keeper_account: true,
            keeper_account_active: true,
            active: true,
        })
    }

    pub fn with_hash(mut self, hash: &str) -> Self {
        self.geocoding.hash = hash.to_string();
        self
    }

    pub fn keeper_active(mut self, active: bool) -> Self {
        self.keeper_account_active = active;
        self
    }

    pub fn not_keeper(mut self) -> Self {
        self.keeper_account = false;
        self.keeper_account_active = false;
        self
    }

    pub fn active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub title: String,
    pub active: bool,
    pub priority: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Task {
    pub const TITLE: Field<Task> = Field::new("title");
    pub const ACTIVE: Field<Task> = Field::new("active");
    pub const PRIORITY: Field<Task> = Field::new("priority");
    pub const TAGS: Field<Task> = Field::new("tags");

    pub fn new(title: &str, active: bool, priority: i64) -> Self {
        Task {
            title: title.to_string(),
            active,
            priority,
            tags: vec![],
        }
    }

    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}
