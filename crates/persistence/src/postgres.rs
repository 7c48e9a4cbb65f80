use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CategoryId, ProductId, SupplierId};
use domain::{
    Category, CategoryLink, Country, Currency, Email, Entity, Price, Product, ProductRecord,
    ProductStatus, Supplier, SupplierLink,
};
use sqlx::{PgPool, Postgres, Row, Transaction, postgres::PgRow};
use uuid::Uuid;

use crate::{
    PersistenceError, Result,
    store::{Change, ChangeSet, EntityStore},
    tracker::{EntityState, TrackedEntity},
};

const PRODUCT_SELECT: &str = r#"
    SELECT p.id, p.description, p.acquisition_cost_cents, p.acquisition_currency,
           p.acquisition_cost_usd_cents, p.status, p.acquire_date, p.sold_date,
           p.cancel_date, p.return_date, p.wms_product_id, p.created_at,
           s.id AS supplier_id, s.name AS supplier_name, s.email AS supplier_email,
           c.id AS category_id, c.name AS category_name, c.shortcode AS category_shortcode
    FROM products p
    JOIN suppliers s ON s.id = p.supplier_id
    JOIN categories c ON c.id = p.category_id
"#;

/// PostgreSQL-backed entity store.
#[derive(Clone)]
pub struct PostgresEntityStore {
    pool: PgPool,
}

impl PostgresEntityStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn write(tx: &mut Transaction<'_, Postgres>, change: &Change) -> Result<()> {
        let result = match (&change.state, &change.entity) {
            (EntityState::Deleted, TrackedEntity::Product(p)) => {
                sqlx::query("DELETE FROM products WHERE id = $1")
                    .bind(p.id().as_uuid())
                    .execute(&mut **tx)
                    .await
            }
            (EntityState::Deleted, TrackedEntity::Category(c)) => {
                sqlx::query("DELETE FROM categories WHERE id = $1")
                    .bind(c.id().as_uuid())
                    .execute(&mut **tx)
                    .await
            }
            (EntityState::Deleted, TrackedEntity::Supplier(s)) => {
                sqlx::query("DELETE FROM suppliers WHERE id = $1")
                    .bind(s.id().as_uuid())
                    .execute(&mut **tx)
                    .await
            }
            (_, TrackedEntity::Product(p)) => {
                let record = p.to_record();
                sqlx::query(
                    r#"
                    INSERT INTO products (id, description, supplier_id, category_id,
                        acquisition_cost_cents, acquisition_currency, acquisition_cost_usd_cents,
                        status, acquire_date, sold_date, cancel_date, return_date,
                        wms_product_id, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
                    ON CONFLICT (id) DO UPDATE SET
                        status = EXCLUDED.status,
                        sold_date = EXCLUDED.sold_date,
                        cancel_date = EXCLUDED.cancel_date,
                        return_date = EXCLUDED.return_date,
                        wms_product_id = EXCLUDED.wms_product_id
                    "#,
                )
                .bind(record.id.as_uuid())
                .bind(&record.description)
                .bind(record.supplier.id.as_uuid())
                .bind(record.category.id.as_uuid())
                .bind(record.acquisition_cost.amount_cents())
                .bind(record.acquisition_cost.currency().code())
                .bind(record.acquisition_cost_usd.amount_cents())
                .bind(record.status.as_str())
                .bind(record.acquire_date)
                .bind(record.sold_date)
                .bind(record.cancel_date)
                .bind(record.return_date)
                .bind(&record.wms_product_id)
                .bind(record.created_at)
                .execute(&mut **tx)
                .await
            }
            (_, TrackedEntity::Category(c)) => {
                sqlx::query(
                    r#"
                    INSERT INTO categories (id, name, shortcode, parent_id, created_at)
                    VALUES ($1, $2, $3, $4, $5)
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        shortcode = EXCLUDED.shortcode
                    "#,
                )
                .bind(c.id().as_uuid())
                .bind(c.name())
                .bind(c.shortcode())
                .bind(c.parent_id().map(|id| id.as_uuid()))
                .bind(c.created_at())
                .execute(&mut **tx)
                .await
            }
            (_, TrackedEntity::Supplier(s)) => {
                sqlx::query(
                    r#"
                    INSERT INTO suppliers (id, name, email, currency_code, country_code, created_at)
                    VALUES ($1, $2, $3, $4, $5, $6)
                    ON CONFLICT (id) DO UPDATE SET
                        name = EXCLUDED.name,
                        email = EXCLUDED.email
                    "#,
                )
                .bind(s.id().as_uuid())
                .bind(s.name())
                .bind(s.email().as_str())
                .bind(s.currency().code())
                .bind(s.country().code())
                .bind(s.created_at())
                .execute(&mut **tx)
                .await
            }
        };

        result.map(|_| ()).map_err(|e| map_write_error(e, change))
    }

    fn row_to_product(row: PgRow) -> Result<Product> {
        let status: String = row.try_get("status")?;
        let status = ProductStatus::parse(&status).ok_or_else(|| corrupt("Product", status))?;
        let currency = currency(row.try_get("acquisition_currency")?, "Product")?;
        let cost = |column: &str, currency: Currency| -> Result<Price> {
            Price::new(row.try_get(column)?, currency)
                .map_err(|e| corrupt("Product", e.to_string()))
        };

        Ok(Product::restore(ProductRecord {
            id: ProductId::from_uuid(row.try_get::<Uuid, _>("id")?),
            description: row.try_get("description")?,
            supplier: SupplierLink {
                id: SupplierId::from_uuid(row.try_get::<Uuid, _>("supplier_id")?),
                name: row.try_get("supplier_name")?,
                email: email(row.try_get("supplier_email")?, "Product")?,
            },
            category: CategoryLink {
                id: CategoryId::from_uuid(row.try_get::<Uuid, _>("category_id")?),
                name: row.try_get("category_name")?,
                shortcode: row.try_get("category_shortcode")?,
            },
            acquisition_cost: cost("acquisition_cost_cents", currency)?,
            acquisition_cost_usd: cost("acquisition_cost_usd_cents", Currency::usd())?,
            status,
            acquire_date: row.try_get("acquire_date")?,
            sold_date: row.try_get("sold_date")?,
            cancel_date: row.try_get("cancel_date")?,
            return_date: row.try_get("return_date")?,
            wms_product_id: row.try_get("wms_product_id")?,
            created_at: row.try_get("created_at")?,
        }))
    }

    fn row_to_category(row: PgRow) -> Result<Category> {
        let parent_id: Option<Uuid> = row.try_get("parent_id")?;
        Ok(Category::restore(
            CategoryId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get("name")?,
            row.try_get("shortcode")?,
            parent_id.map(CategoryId::from_uuid),
            row.try_get::<DateTime<Utc>, _>("created_at")?,
        ))
    }

    fn row_to_supplier(row: PgRow) -> Result<Supplier> {
        let country: String = row.try_get("country_code")?;
        Ok(Supplier::restore(
            SupplierId::from_uuid(row.try_get::<Uuid, _>("id")?),
            row.try_get("name")?,
            email(row.try_get("email")?, "Supplier")?,
            currency(row.try_get("currency_code")?, "Supplier")?,
            Country::from_code(&country).map_err(|e| corrupt("Supplier", e.to_string()))?,
            row.try_get("created_at")?,
        ))
    }

    async fn exists(&self, sql: &str, value: &str) -> Result<bool> {
        let exists: bool = sqlx::query_scalar(sql)
            .bind(value)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

fn corrupt(entity: &'static str, reason: impl Into<String>) -> PersistenceError {
    PersistenceError::Serialization {
        entity,
        reason: reason.into(),
    }
}

fn email(value: String, entity: &'static str) -> Result<Email> {
    Email::new(value).map_err(|e| corrupt(entity, e.to_string()))
}

fn currency(value: String, entity: &'static str) -> Result<Currency> {
    Currency::from_code(&value).map_err(|e| corrupt(entity, e.to_string()))
}

/// Translates constraint violations into typed errors for the change that caused them.
fn map_write_error(e: sqlx::Error, change: &Change) -> PersistenceError {
    let constraint = match &e {
        sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_owned),
        _ => None,
    };
    let id = change.entity.key().as_uuid().to_string();

    match (constraint.as_deref(), &change.entity) {
        (Some("unique_supplier_email"), TrackedEntity::Supplier(s)) => {
            PersistenceError::UniqueViolation {
                entity: "Supplier",
                field: "email",
                value: s.email().as_str().to_string(),
            }
        }
        (Some("unique_category_name"), TrackedEntity::Category(c)) => {
            PersistenceError::UniqueViolation {
                entity: "Category",
                field: "name",
                value: c.name().to_string(),
            }
        }
        (Some("unique_category_shortcode"), TrackedEntity::Category(c)) => {
            PersistenceError::UniqueViolation {
                entity: "Category",
                field: "shortcode",
                value: c.shortcode().to_string(),
            }
        }
        (Some(constraint), entity) if change.state == EntityState::Deleted => {
            let referenced_by = if constraint.starts_with("fk_product_") {
                "Product"
            } else {
                "Category"
            };
            PersistenceError::ForeignKeyViolation {
                entity: entity.entity_type(),
                id,
                referenced_by,
            }
        }
        (Some("fk_product_supplier"), TrackedEntity::Product(p)) => PersistenceError::NotFound {
            entity: "Supplier",
            id: p.supplier().id.to_string(),
        },
        (Some("fk_product_category"), TrackedEntity::Product(p)) => PersistenceError::NotFound {
            entity: "Category",
            id: p.category().id.to_string(),
        },
        (Some("fk_category_parent"), TrackedEntity::Category(c)) => PersistenceError::NotFound {
            entity: "Category",
            id: c.parent_id().map(|p| p.to_string()).unwrap_or_default(),
        },
        _ => PersistenceError::Database(e),
    }
}

#[async_trait]
impl EntityStore for PostgresEntityStore {
    #[tracing::instrument(skip(self, changes), fields(changes = changes.len()))]
    async fn commit(&self, changes: ChangeSet) -> Result<usize> {
        let mut tx = self.pool.begin().await?;
        for change in &changes {
            Self::write(&mut tx, change).await?;
        }
        tx.commit().await?;
        Ok(changes.len())
    }

    async fn get_product(&self, id: ProductId) -> Result<Option<Product>> {
        let row = sqlx::query(&format!("{PRODUCT_SELECT} WHERE p.id = $1"))
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;
        row.map(Self::row_to_product).transpose()
    }

    async fn list_products(&self) -> Result<Vec<Product>> {
        let rows = sqlx::query(&format!("{PRODUCT_SELECT} ORDER BY p.created_at, p.id"))
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(Self::row_to_product).collect()
    }

    async fn get_category(&self, id: CategoryId) -> Result<Option<Category>> {
        let row = sqlx::query(
            "SELECT id, name, shortcode, parent_id, created_at FROM categories WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_category).transpose()
    }

    async fn list_categories(&self) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT id, name, shortcode, parent_id, created_at FROM categories ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_category).collect()
    }

    async fn category_name_exists(&self, name: &str) -> Result<bool> {
        self.exists("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)", name)
            .await
    }

    async fn category_shortcode_exists(&self, shortcode: &str) -> Result<bool> {
        self.exists(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE shortcode = $1)",
            shortcode,
        )
        .await
    }

    async fn get_supplier(&self, id: SupplierId) -> Result<Option<Supplier>> {
        let row = sqlx::query(
            "SELECT id, name, email, currency_code, country_code, created_at FROM suppliers WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Self::row_to_supplier).transpose()
    }

    async fn list_suppliers(&self) -> Result<Vec<Supplier>> {
        let rows = sqlx::query(
            "SELECT id, name, email, currency_code, country_code, created_at FROM suppliers ORDER BY created_at, id",
        )
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Self::row_to_supplier).collect()
    }

    async fn supplier_email_exists(&self, email: &str) -> Result<bool> {
        self.exists("SELECT EXISTS(SELECT 1 FROM suppliers WHERE email = $1)", email)
            .await
    }
}
