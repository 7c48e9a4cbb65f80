use async_trait::async_trait;
use common::{CategoryId, ProductId, SupplierId};
use domain::{Category, Product, Supplier};

use crate::{
    PersistenceError, Result,
    tracker::{EntityState, TrackedEntity},
};

/// One write a commit has to apply.
#[derive(Debug, Clone)]
pub struct Change {
    pub state: EntityState,
    pub entity: TrackedEntity,
}

/// The writes of one commit, in tracking order.
pub type ChangeSet = Vec<Change>;

/// Storage collaborator for inventory entities.
///
/// A commit applies the whole change set or nothing. Both implementations
/// enforce the same constraints:
/// - supplier emails, category names and category shortcodes are unique
/// - products must reference an existing supplier and category
/// - a category parent must exist
/// - suppliers and categories still referenced elsewhere cannot be deleted
///
/// Deleting an entity that is not stored is a no-op.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Applies a change set atomically and returns the number of entities written.
    async fn commit(&self, changes: ChangeSet) -> Result<usize>;

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>>;

    /// Lists products, oldest first.
    async fn list_products(&self) -> Result<Vec<Product>>;

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>>;

    /// Lists categories, oldest first.
    async fn list_categories(&self) -> Result<Vec<Category>>;

    async fn category_name_exists(&self, name: &str) -> Result<bool>;

    async fn category_shortcode_exists(&self, shortcode: &str) -> Result<bool>;

    async fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>>;

    /// Lists suppliers, oldest first.
    async fn list_suppliers(&self) -> Result<Vec<Supplier>>;

    async fn supplier_email_exists(&self, email: &str) -> Result<bool>;
}

/// Lookups that turn a missing entity into [`PersistenceError::NotFound`].
#[async_trait]
pub trait EntityStoreExt: EntityStore {
    async fn require_product(&self, id: ProductId) -> Result<Product> {
        self.get_product(id)
            .await?
            .ok_or_else(|| PersistenceError::NotFound {
                entity: "Product",
                id: id.to_string(),
            })
    }

    async fn require_category(&self, id: CategoryId) -> Result<Category> {
        self.get_category(id)
            .await?
            .ok_or_else(|| PersistenceError::NotFound {
                entity: "Category",
                id: id.to_string(),
            })
    }

    async fn require_supplier(&self, id: SupplierId) -> Result<Supplier> {
        self.get_supplier(id)
            .await?
            .ok_or_else(|| PersistenceError::NotFound {
                entity: "Supplier",
                id: id.to_string(),
            })
    }
}

impl<T: EntityStore + ?Sized> EntityStoreExt for T {}
