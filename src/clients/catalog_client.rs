use tracing::{debug, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::auth::Identity;
use crate::domain::{Category, LineItem, Product, ProductCreate, ProductPatch, StorefrontFilter};
use crate::error::ProductError;
use crate::product_actor::{ProductAction, ProductActionResult};

/// Products selling at or above this count surface as trending even without
/// the manual flag.
const TRENDING_MIN_SOLD: u32 = 5;
const TRENDING_LIMIT: usize = 6;
const FEATURED_LIMIT: usize = 4;

/// Client for the catalog store: admin product management plus the
/// storefront queries.
#[derive(Clone)]
pub struct CatalogClient {
    inner: ResourceClient<Product>,
}

impl CatalogClient {
    pub fn new(inner: ResourceClient<Product>) -> Self {
        Self { inner }
    }

    #[instrument(skip(self, identity, params), fields(name = %params.name))]
    pub async fn add_product(
        &self,
        identity: &Identity,
        params: ProductCreate,
    ) -> Result<Product, ProductError> {
        identity.require_admin()?;
        debug!("Sending request");
        let id = self.inner.create(params).await.map_err(|e| match e {
            FrameworkError::Rejected(msg) => ProductError::ValidationError(msg),
            other => comm(other),
        })?;
        self.inner
            .get(id.clone())
            .await
            .map_err(comm)?
            .ok_or(ProductError::NotFound(id))
    }

    #[instrument(skip(self, identity, patch))]
    pub async fn update_product(
        &self,
        identity: &Identity,
        id: String,
        patch: ProductPatch,
    ) -> Result<Product, ProductError> {
        identity.require_admin()?;
        debug!("Sending request");
        self.inner.update(id, patch).await.map_err(|e| match e {
            FrameworkError::NotFound { id, .. } => ProductError::NotFound(id),
            FrameworkError::Rejected(msg) => ProductError::ValidationError(msg),
            other => comm(other),
        })
    }

    /// Admin shortcut for topping stock back up.
    pub async fn restock(
        &self,
        identity: &Identity,
        id: String,
        stock: u32,
    ) -> Result<Product, ProductError> {
        self.update_product(
            identity,
            id,
            ProductPatch {
                stock: Some(stock),
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip(self, identity))]
    pub async fn delete_product(
        &self,
        identity: &Identity,
        id: String,
    ) -> Result<(), ProductError> {
        identity.require_admin()?;
        debug!("Sending request");
        self.inner.delete(id).await.map_err(|e| match e {
            FrameworkError::NotFound { id, .. } => ProductError::NotFound(id),
            other => comm(other),
        })
    }

    #[instrument(skip(self))]
    pub async fn get_product(&self, id: String) -> Result<Option<Product>, ProductError> {
        debug!("Sending request");
        self.inner.get(id).await.map_err(comm)
    }

    /// Storefront listing, newest first.
    #[instrument(skip(self, filter))]
    pub async fn storefront(&self, filter: &StorefrontFilter) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let mut products = self.inner.list().await.map_err(comm)?;
        products.retain(|p| p.matches(filter));
        newest_first(&mut products);
        Ok(products)
    }

    /// In-stock products of a category, best sellers first.
    #[instrument(skip(self))]
    pub async fn by_category(&self, category: Category) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let mut products = self.inner.list().await.map_err(comm)?;
        products.retain(|p| p.category == category && p.in_stock && p.stock > 0);
        products.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
        Ok(products)
    }

    /// What the shop is selling a lot of right now: manually flagged or past
    /// the sales threshold, still in stock.
    #[instrument(skip(self))]
    pub async fn trending(&self) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let mut products = self.inner.list().await.map_err(comm)?;
        products.retain(|p| {
            (p.is_trending || p.total_sold >= TRENDING_MIN_SOLD) && p.in_stock && p.stock > 0
        });
        products.sort_by(|a, b| b.total_sold.cmp(&a.total_sold));
        products.truncate(TRENDING_LIMIT);
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn featured(&self) -> Result<Vec<Product>, ProductError> {
        debug!("Sending request");
        let mut products = self.inner.list().await.map_err(comm)?;
        products.retain(|p| p.is_featured && p.in_stock && p.stock > 0);
        newest_first(&mut products);
        products.truncate(FEATURED_LIMIT);
        Ok(products)
    }

    /// Products at or below their low-stock threshold, most depleted first.
    #[instrument(skip(self, identity))]
    pub async fn low_stock(&self, identity: &Identity) -> Result<Vec<Product>, ProductError> {
        identity.require_admin()?;
        debug!("Sending request");
        let mut products = self.inner.list().await.map_err(comm)?;
        products.retain(|p| p.is_low_stock());
        products.sort_by(|a, b| a.stock.cmp(&b.stock));
        Ok(products)
    }

    /// Consume stock for every line of an order as one all-or-nothing batch.
    /// The actor re-checks each quantity against current stock inside the
    /// batch, so concurrent placements cannot both take the last units.
    ///
    /// Framework errors are returned raw; the order client owns the mapping
    /// into its own error vocabulary.
    #[instrument(skip(self, lines))]
    pub async fn reserve(
        &self,
        lines: &[LineItem],
    ) -> Result<Vec<ProductActionResult>, FrameworkError> {
        debug!("Sending request");
        let steps = lines
            .iter()
            .map(|line| {
                (
                    line.product_id.clone(),
                    ProductAction::Sell {
                        quantity: line.quantity,
                    },
                )
            })
            .collect();
        self.inner.transact(steps).await
    }
}

fn newest_first(products: &mut [Product]) {
    products.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
}

fn comm(e: FrameworkError) -> ProductError {
    ProductError::ActorCommunicationError(e.to_string())
}
