use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::{CategoryId, ProductId, SupplierId};
use domain::{Category, Entity, Product, ProductRecord, Supplier};
use tokio::sync::RwLock;

use crate::{
    PersistenceError, Result,
    store::{Change, ChangeSet, EntityStore},
    tracker::{EntityState, TrackedEntity},
};

#[derive(Debug, Clone, Default)]
struct State {
    products: HashMap<ProductId, ProductRecord>,
    categories: HashMap<CategoryId, Category>,
    suppliers: HashMap<SupplierId, Supplier>,
}

/// In-memory entity store for tests and local runs.
///
/// Commits are staged on a copy of the current state and swapped in only
/// when every change applied, so a rejected commit leaves nothing behind.
#[derive(Clone, Default)]
pub struct InMemoryEntityStore {
    state: Arc<RwLock<State>>,
    fail_on_commit: Arc<RwLock<Option<String>>>,
}

impl InMemoryEntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following commit fail with the given reason. `None` restores normal behaviour.
    pub async fn set_fail_on_commit(&self, reason: Option<&str>) {
        *self.fail_on_commit.write().await = reason.map(str::to_string);
    }

    pub async fn product_count(&self) -> usize {
        self.state.read().await.products.len()
    }

    pub async fn category_count(&self) -> usize {
        self.state.read().await.categories.len()
    }

    pub async fn supplier_count(&self) -> usize {
        self.state.read().await.suppliers.len()
    }
}

impl State {
    fn apply(&mut self, change: Change) -> Result<()> {
        match (change.state, change.entity) {
            (EntityState::Deleted, TrackedEntity::Product(product)) => {
                self.products.remove(&product.id());
            }
            (EntityState::Deleted, TrackedEntity::Category(category)) => {
                self.delete_category(category.id())?;
            }
            (EntityState::Deleted, TrackedEntity::Supplier(supplier)) => {
                self.delete_supplier(supplier.id())?;
            }
            (_, TrackedEntity::Product(product)) => self.upsert_product(&product)?,
            (_, TrackedEntity::Category(mut category)) => {
                category.clear_events();
                self.upsert_category(category)?;
            }
            (_, TrackedEntity::Supplier(mut supplier)) => {
                supplier.clear_events();
                self.upsert_supplier(supplier)?;
            }
        }
        Ok(())
    }

    fn upsert_product(&mut self, product: &Product) -> Result<()> {
        let record = product.to_record();
        if !self.suppliers.contains_key(&record.supplier.id) {
            return Err(PersistenceError::NotFound {
                entity: "Supplier",
                id: record.supplier.id.to_string(),
            });
        }
        if !self.categories.contains_key(&record.category.id) {
            return Err(PersistenceError::NotFound {
                entity: "Category",
                id: record.category.id.to_string(),
            });
        }
        self.products.insert(record.id, record);
        Ok(())
    }

    fn upsert_category(&mut self, category: Category) -> Result<()> {
        let id = category.id();
        if let Some(parent_id) = category.parent_id()
            && !self.categories.contains_key(&parent_id)
        {
            return Err(PersistenceError::NotFound {
                entity: "Category",
                id: parent_id.to_string(),
            });
        }

        for other in self.categories.values().filter(|c| c.id() != id) {
            if other.name() == category.name() {
                return Err(PersistenceError::UniqueViolation {
                    entity: "Category",
                    field: "name",
                    value: category.name().to_string(),
                });
            }
            if other.shortcode() == category.shortcode() {
                return Err(PersistenceError::UniqueViolation {
                    entity: "Category",
                    field: "shortcode",
                    value: category.shortcode().to_string(),
                });
            }
        }

        self.categories.insert(id, category);
        Ok(())
    }

    fn upsert_supplier(&mut self, supplier: Supplier) -> Result<()> {
        let id = supplier.id();
        let email = supplier.email().as_str();
        if self
            .suppliers
            .values()
            .any(|s| s.id() != id && s.email().as_str() == email)
        {
            return Err(PersistenceError::UniqueViolation {
                entity: "Supplier",
                field: "email",
                value: email.to_string(),
            });
        }

        self.suppliers.insert(id, supplier);
        Ok(())
    }

    fn delete_category(&mut self, id: CategoryId) -> Result<()> {
        let referenced_by = if self.products.values().any(|p| p.category.id == id) {
            Some("Product")
        } else if self.categories.values().any(|c| c.parent_id() == Some(id)) {
            Some("Category")
        } else {
            None
        };

        if let Some(referenced_by) = referenced_by {
            return Err(PersistenceError::ForeignKeyViolation {
                entity: "Category",
                id: id.to_string(),
                referenced_by,
            });
        }
        self.categories.remove(&id);
        Ok(())
    }

    fn delete_supplier(&mut self, id: SupplierId) -> Result<()> {
        if self.products.values().any(|p| p.supplier.id == id) {
            return Err(PersistenceError::ForeignKeyViolation {
                entity: "Supplier",
                id: id.to_string(),
                referenced_by: "Product",
            });
        }
        self.suppliers.remove(&id);
        Ok(())
    }
}

/// Orders entities oldest first, breaking ties by id.
fn sort_oldest_first<E: Entity>(entities: &mut [E])
where
    E::Id: Ord,
{
    entities.sort_by(|a, b| {
        a.created_at()
            .cmp(&b.created_at())
            .then_with(|| a.id().cmp(&b.id()))
    });
}

#[async_trait]
impl EntityStore for InMemoryEntityStore {
    async fn commit(&self, changes: ChangeSet) -> Result<usize> {
        if let Some(reason) = self.fail_on_commit.read().await.clone() {
            return Err(PersistenceError::CommitRejected(reason));
        }

        let mut state = self.state.write().await;
        let mut staged = state.clone();
        let written = changes.len();
        for change in changes {
            staged.apply(change)?;
        }
        *state = staged;

        Ok(written)
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.get(&id).cloned().map(Product::restore))
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        let mut products: Vec<_> = state
            .products
            .values()
            .cloned()
            .map(Product::restore)
            .collect();
        sort_oldest_first(&mut products);
        Ok(products)
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        Ok(self.state.read().await.categories.get(&id).cloned())
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let mut categories: Vec<_> = self.state.read().await.categories.values().cloned().collect();
        sort_oldest_first(&mut categories);
        Ok(categories)
    }

    async fn category_name_exists(&self, name: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.categories.values().any(|c| c.name() == name))
    }

    async fn category_shortcode_exists(&self, shortcode: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.categories.values().any(|c| c.shortcode() == shortcode))
    }

    async fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>> {
        Ok(self.state.read().await.suppliers.get(&id).cloned())
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        let mut suppliers: Vec<_> = self.state.read().await.suppliers.values().cloned().collect();
        sort_oldest_first(&mut suppliers);
        Ok(suppliers)
    }

    async fn supplier_email_exists(&self, email: &str) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state.suppliers.values().any(|s| s.email().as_str() == email))
    }
}
