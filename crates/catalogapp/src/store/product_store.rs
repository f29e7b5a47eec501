use super::backend::StorageBackend;
use super::{Database, RecordStore, SCHEMA_VERSION};
use crate::error::{EngineError, StoreError, StoreResult};
use crate::model::{Product, ProductId, ProductPatch};
use async_trait::async_trait;
use std::collections::HashSet;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct ProductStore<B: StorageBackend> {
    /// The underlying storage backend.
    /// Exposed as pub(crate) for testing and internal access only.
    pub(crate) backend: B,
    name: String,
    txn: Mutex<()>,
}

impl<B: StorageBackend> ProductStore<B> {
    /// Open the named database, creating or upgrading it as needed.
    ///
    /// This is the only way to obtain a store: a returned handle is ready for every
    /// [`RecordStore`] operation.
    pub async fn open(backend: B, name: impl Into<String>) -> StoreResult<Self> {
        let name = name.into();

        let db = match backend.load().await.map_err(StoreError::Open)? {
            None => {
                let db = Database::new(&name);
                backend.commit(&db).await.map_err(StoreError::Open)?;
                info!(database = %name, location = %backend.location(), "Database created");
                db
            }
            Some(mut db) => {
                if db.name != name {
                    return Err(StoreError::Open(EngineError::Corrupt(format!(
                        "expected database '{}', found '{}'",
                        name, db.name
                    ))));
                }
                if db.version > SCHEMA_VERSION {
                    return Err(StoreError::Open(EngineError::VersionConflict {
                        found: db.version,
                        supported: SCHEMA_VERSION,
                    }));
                }
                if normalize(&mut db) {
                    backend.commit(&db).await.map_err(StoreError::Open)?;
                }
                db
            }
        };

        debug!(
            database = %name,
            version = db.version,
            products = db.products.len(),
            "Database opened successfully"
        );

        Ok(Self {
            backend,
            name,
            txn: Mutex::new(()),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> String {
        self.backend.location()
    }

    /// Load the current document inside a transaction. A database removed behind our back
    /// is recreated empty on the next commit.
    async fn load(&self, on_error: fn(EngineError) -> StoreError) -> StoreResult<Database> {
        let db = self.backend.load().await.map_err(on_error)?;
        Ok(db.unwrap_or_else(|| {
            warn!(database = %self.name, "Database missing, starting empty");
            Database::new(&self.name)
        }))
    }
}

/// Bring an older or hand-edited document up to the current schema.
/// Returns true if anything changed.
fn normalize(db: &mut Database) -> bool {
    let mut changed = false;

    if db.version < SCHEMA_VERSION {
        info!(from = db.version, to = SCHEMA_VERSION, "Upgrading database schema");
        db.version = SCHEMA_VERSION;
        changed = true;
    }

    let max_id = db.products.iter().filter_map(|p| p.id).map(ProductId::get).max();
    let floor = max_id.map_or(1, |max| max + 1);
    if db.next_id < floor {
        db.next_id = floor;
        changed = true;
    }

    // Records without a key, and every repeat of a key already seen, get a fresh one
    // the same way create would have assigned it. The first holder keeps the key.
    let mut seen = HashSet::new();
    for product in db.products.iter_mut() {
        let keep = product.id.is_some_and(|id| seen.insert(id));
        if !keep {
            if let Some(id) = product.id {
                warn!(%id, name = %product.name, "Duplicate product id, assigning a new one");
            }
            let id = ProductId::new(db.next_id);
            seen.insert(id);
            product.id = Some(id);
            db.next_id += 1;
            changed = true;
        }
    }

    if !db.products.windows(2).all(|w| w[0].id < w[1].id) {
        db.products.sort_by_key(|p| p.id);
        changed = true;
    }

    changed
}

#[async_trait]
impl<B: StorageBackend> RecordStore for ProductStore<B> {
    async fn create(&self, product: &Product) -> StoreResult<ProductId> {
        let _txn = self.txn.lock().await;
        let mut db = self.load(StoreError::Write).await?;

        if let Some(existing) = product.id {
            debug!(ignored = %existing, "Create ignores caller supplied id");
        }

        let id = ProductId::new(db.next_id);
        db.next_id = db.next_id.checked_add(1).ok_or_else(|| {
            StoreError::Write(EngineError::Corrupt("key generator exhausted".to_string()))
        })?;
        // Keys only grow, so pushing keeps the list sorted.
        db.products.push(product.clone().with_id(id));

        self.backend.commit(&db).await.map_err(StoreError::Write)?;
        debug!(%id, name = %product.name, "Product added");
        Ok(id)
    }

    async fn read_all(&self) -> StoreResult<Vec<Product>> {
        let _txn = self.txn.lock().await;
        let db = self.load(StoreError::Read).await?;
        debug!(count = db.products.len(), "All products read");
        Ok(db.products)
    }

    async fn update(&self, id: ProductId, patch: &ProductPatch) -> StoreResult<Product> {
        let _txn = self.txn.lock().await;
        let mut db = self.load(StoreError::Write).await?;

        let pos = db.position(id).ok_or(StoreError::NotFound(id))?;
        patch.apply(&mut db.products[pos]);
        let updated = db.products[pos].clone();

        self.backend.commit(&db).await.map_err(StoreError::Write)?;
        debug!(%id, "Product updated");
        Ok(updated)
    }

    async fn delete(&self, id: ProductId) -> StoreResult<()> {
        let _txn = self.txn.lock().await;
        let mut db = self.load(StoreError::Write).await?;

        let Some(pos) = db.position(id) else {
            debug!(%id, "Delete of unknown product is a no-op");
            return Ok(());
        };
        db.products.remove(pos);

        self.backend.commit(&db).await.map_err(StoreError::Write)?;
        debug!(%id, "Product deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Field;
    use crate::store::mem_backend::MemBackend;
    use crate::store::DEFAULT_DATABASE_NAME;

    async fn make_store() -> ProductStore<MemBackend> {
        ProductStore::open(MemBackend::new(), DEFAULT_DATABASE_NAME)
            .await
            .unwrap()
    }

    fn bag() -> Product {
        Product::new("Bag", "10", "d", "c", "")
    }

    // --- Open ---

    #[tokio::test]
    async fn open_creates_missing_database() {
        let backend = MemBackend::new();
        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();

        let db = backend.snapshot().unwrap();
        assert_eq!(db.name, "shop");
        assert_eq!(db.version, SCHEMA_VERSION);
        assert_eq!(db.next_id, 1);
        assert_eq!(store.name(), "shop");
    }

    #[tokio::test]
    async fn open_is_idempotent() {
        let backend = MemBackend::new();
        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        store.create(&bag()).await.unwrap();
        drop(store);

        let commits = backend.commit_count();
        let reopened = ProductStore::open(backend.clone(), "shop").await.unwrap();

        assert_eq!(backend.commit_count(), commits, "clean reopen must not write");
        assert_eq!(reopened.read_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn open_rejects_newer_schema() {
        let mut db = Database::new("shop");
        db.version = SCHEMA_VERSION + 1;
        let backend = MemBackend::with_database(db);

        let result = ProductStore::open(backend, "shop").await;
        assert!(matches!(
            result,
            Err(StoreError::Open(EngineError::VersionConflict { .. }))
        ));
    }

    #[tokio::test]
    async fn open_rejects_foreign_database() {
        let backend = MemBackend::with_database(Database::new("other"));
        let result = ProductStore::open(backend, "shop").await;
        assert!(matches!(
            result,
            Err(StoreError::Open(EngineError::Corrupt(_)))
        ));
    }

    #[tokio::test]
    async fn open_fails_when_engine_unreadable() {
        let backend = MemBackend::new();
        backend.set_simulate_read_error(true);
        let result = ProductStore::open(backend, "shop").await;
        assert!(matches!(result, Err(StoreError::Open(_))));
    }

    #[tokio::test]
    async fn open_fails_when_creation_cannot_commit() {
        let backend = MemBackend::new();
        backend.set_simulate_write_error(true);
        let result = ProductStore::open(backend, "shop").await;
        assert!(matches!(result, Err(StoreError::Open(_))));
    }

    #[tokio::test]
    async fn open_upgrades_and_repairs_old_documents() {
        let mut db = Database::new("shop");
        db.version = 0;
        db.next_id = 1;
        db.products = vec![
            bag().with_id(ProductId::new(5)),
            Product::new("Loose", "1", "", "", ""),
            bag().with_id(ProductId::new(2)),
        ];
        let backend = MemBackend::with_database(db);

        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        let repaired = backend.snapshot().unwrap();

        assert_eq!(repaired.version, SCHEMA_VERSION);
        let ids: Vec<u64> = repaired
            .products
            .iter()
            .map(|p| p.id.unwrap().get())
            .collect();
        assert_eq!(ids, vec![2, 5, 6]);
        assert_eq!(repaired.next_id, 7);

        let id = store.create(&bag()).await.unwrap();
        assert_eq!(id, ProductId::new(7));
    }

    #[tokio::test]
    async fn open_keeps_every_record_sharing_an_id() {
        let mut db = Database::new("shop");
        db.next_id = 2;
        db.products = vec![
            Product::new("Bag", "10", "d", "c", "").with_id(ProductId::new(1)),
            Product::new("Hat", "5", "d", "c", "").with_id(ProductId::new(1)),
        ];
        let backend = MemBackend::with_database(db);

        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();

        let all = store.read_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Bag");
        assert_eq!(all[0].id, Some(ProductId::new(1)));
        assert_eq!(all[1].name, "Hat");
        assert_eq!(all[1].id, Some(ProductId::new(2)));

        let repaired = backend.snapshot().unwrap();
        assert_eq!(repaired.products.len(), 2);
        assert_eq!(repaired.next_id, 3);
    }

    #[tokio::test]
    async fn open_raises_a_zero_key_generator() {
        let mut db = Database::new("shop");
        db.next_id = 0;
        let backend = MemBackend::with_database(db);

        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        assert_eq!(backend.snapshot().unwrap().next_id, 1);

        let id = store.create(&bag()).await.unwrap();
        assert_eq!(id, ProductId::new(1));
    }

    // --- Create / ReadAll ---

    #[tokio::test]
    async fn create_assigns_strictly_increasing_ids() {
        let store = make_store().await;
        let mut last = 0;
        for _ in 0..5 {
            let id = store.create(&bag()).await.unwrap().get();
            assert!(id > last);
            last = id;
        }
    }

    #[tokio::test]
    async fn ids_are_not_reused_after_delete() {
        let store = make_store().await;
        let first = store.create(&bag()).await.unwrap();
        let second = store.create(&bag()).await.unwrap();
        store.delete(second).await.unwrap();
        store.delete(first).await.unwrap();

        let third = store.create(&bag()).await.unwrap();
        assert!(third > second);
    }

    #[tokio::test]
    async fn create_then_read_all_round_trips() {
        let store = make_store().await;
        let product = Product::new("Lamp", "19.99", "desk lamp", "home", "data:image/png;base64,AA==");
        let id = store.create(&product).await.unwrap();

        let all = store.read_all().await.unwrap();
        assert_eq!(all, vec![product.with_id(id)]);
    }

    #[tokio::test]
    async fn create_ignores_supplied_id() {
        let store = make_store().await;
        let id = store
            .create(&bag().with_id(ProductId::new(99)))
            .await
            .unwrap();
        assert_eq!(id, ProductId::new(1));
    }

    #[tokio::test]
    async fn create_fails_on_write_error_and_persists_nothing() {
        let backend = MemBackend::new();
        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        backend.set_simulate_write_error(true);

        let result = store.create(&bag()).await;
        assert!(matches!(result, Err(StoreError::Write(_))));

        backend.set_simulate_write_error(false);
        assert!(store.read_all().await.unwrap().is_empty());
        // The failed transaction did not consume a key.
        assert_eq!(store.create(&bag()).await.unwrap(), ProductId::new(1));
    }

    #[tokio::test]
    async fn read_all_fails_on_read_error() {
        let backend = MemBackend::new();
        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        backend.set_simulate_read_error(true);

        assert!(matches!(store.read_all().await, Err(StoreError::Read(_))));
    }

    // --- Update ---

    #[tokio::test]
    async fn update_merges_partial_fields() {
        let store = make_store().await;
        let id = store.create(&bag()).await.unwrap();

        let patch = ProductPatch::new().set(Field::Price, "12.5");
        let updated = store.update(id, &patch).await.unwrap();

        let expected = Product::new("Bag", "12.5", "d", "c", "").with_id(id);
        assert_eq!(updated, expected);
        assert_eq!(store.read_all().await.unwrap(), vec![expected]);
    }

    #[tokio::test]
    async fn update_missing_id_is_not_found_and_creates_nothing() {
        let store = make_store().await;
        let patch = ProductPatch::from(bag());

        let result = store.update(ProductId::new(42), &patch).await;
        assert!(matches!(result, Err(StoreError::NotFound(id)) if id == ProductId::new(42)));
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_read_half_failure_is_write_error() {
        let backend = MemBackend::new();
        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        let id = store.create(&bag()).await.unwrap();
        backend.set_simulate_read_error(true);

        let result = store.update(id, &ProductPatch::new()).await;
        assert!(matches!(result, Err(StoreError::Write(_))));
    }

    #[tokio::test]
    async fn update_write_half_failure_leaves_record_unchanged() {
        let backend = MemBackend::new();
        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        let id = store.create(&bag()).await.unwrap();
        backend.set_simulate_write_error(true);

        let patch = ProductPatch::new().set(Field::Name, "Sack");
        assert!(matches!(
            store.update(id, &patch).await,
            Err(StoreError::Write(_))
        ));

        backend.set_simulate_write_error(false);
        assert_eq!(store.read_all().await.unwrap()[0].name, "Bag");
    }

    // --- Delete ---

    #[tokio::test]
    async fn delete_missing_id_is_a_noop() {
        let backend = MemBackend::new();
        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        store.create(&bag()).await.unwrap();
        let before = store.read_all().await.unwrap();
        let commits = backend.commit_count();

        store.delete(ProductId::new(1000)).await.unwrap();

        assert_eq!(store.read_all().await.unwrap(), before);
        assert_eq!(backend.commit_count(), commits);
    }

    #[tokio::test]
    async fn delete_fails_on_write_error() {
        let backend = MemBackend::new();
        let store = ProductStore::open(backend.clone(), "shop").await.unwrap();
        let id = store.create(&bag()).await.unwrap();
        backend.set_simulate_write_error(true);

        assert!(matches!(store.delete(id).await, Err(StoreError::Write(_))));
    }

    // --- Scenario ---

    #[tokio::test]
    async fn create_update_delete_scenario() {
        let store = make_store().await;

        let id = store.create(&bag()).await.unwrap();
        assert_eq!(id, ProductId::new(1));

        store
            .update(id, &ProductPatch::new().set(Field::Price, "15"))
            .await
            .unwrap();
        assert_eq!(
            store.read_all().await.unwrap(),
            vec![Product::new("Bag", "15", "d", "c", "").with_id(ProductId::new(1))]
        );

        store.delete(id).await.unwrap();
        assert!(store.read_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_updates_do_not_lose_writes() {
        let store = make_store().await;
        let id = store.create(&bag()).await.unwrap();

        let rename = ProductPatch::new().set(Field::Name, "Sack");
        let reprice = ProductPatch::new().set(Field::Price, "99");
        let (a, b) = tokio::join!(store.update(id, &rename), store.update(id, &reprice));
        a.unwrap();
        b.unwrap();

        let stored = &store.read_all().await.unwrap()[0];
        assert_eq!(stored.name, "Sack");
        assert_eq!(stored.price, "99");
    }
}
