use tracing::{error, info, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::auth::Identity;
use crate::clients::{CatalogClient, UserClient};
use crate::domain::{LineItem, Order, OrderCreate, OrderStatus, PaymentMethod, PaymentStatus};
use crate::error::OrderError;
use crate::order_actor::OrderAction;
use crate::order_actor::entity::OrderPatch;

/// A line item resolved against the catalog for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl ReceiptLine {
    pub fn subtotal(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// An order together with its display-resolved line items.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderReceipt {
    pub order: Order,
    pub lines: Vec<ReceiptLine>,
}

/// Client for the order store.
///
/// This client handles the checkout orchestration: it validates the acting
/// user and every requested product, consumes stock, and records the order.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    users: UserClient,
    catalog: CatalogClient,
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        users: UserClient,
        catalog: CatalogClient,
    ) -> Self {
        Self {
            inner,
            users,
            catalog,
        }
    }

    /// Place an order for the authenticated user.
    ///
    /// Line items carry the caller's unit prices; they are snapshotted into
    /// the order as-is. Stock for all lines is consumed through a single
    /// all-or-nothing batch on the catalog actor: if any line cannot be
    /// covered, no stock moves and no order is created.
    #[instrument(skip(self, identity, items), fields(user_id = %identity.user_id))]
    pub async fn place_order(
        &self,
        identity: &Identity,
        items: Vec<LineItem>,
        payment_method: PaymentMethod,
    ) -> Result<OrderReceipt, OrderError> {
        info!("Processing place_order request");

        // Step 1: Validate user
        match self.users.get_user(identity.user_id.clone()).await {
            Ok(Some(user)) => info!(user_name = %user.name, "User validation successful"),
            Ok(None) => {
                error!("User not found");
                return Err(OrderError::InvalidUser(identity.user_id.clone()));
            }
            Err(e) => {
                error!(error = %e, "User validation failed");
                return Err(OrderError::InvalidUser(format!(
                    "User validation failed: {}",
                    e
                )));
            }
        }

        if items.is_empty() {
            return Err(OrderError::EmptyOrder);
        }

        // Step 2: Validate every product, snapshotting names for the receipt
        let mut product_names = Vec::with_capacity(items.len());
        for item in &items {
            if item.quantity == 0 {
                return Err(OrderError::InvalidQuantity(item.product_id.clone()));
            }
            match self.catalog.get_product(item.product_id.clone()).await {
                Ok(Some(product)) => {
                    if item.quantity > product.stock {
                        error!(product_id = %item.product_id, "Insufficient stock");
                        return Err(OrderError::InsufficientStock(format!(
                            "Insufficient stock for {}: requested {}, available {}",
                            product.name, item.quantity, product.stock
                        )));
                    }
                    product_names.push(product.name);
                }
                Ok(None) => {
                    error!(product_id = %item.product_id, "Product not found");
                    return Err(OrderError::ProductNotFound(item.product_id.clone()));
                }
                Err(e) => {
                    error!(error = %e, "Product validation failed");
                    return Err(OrderError::ActorCommunicationError(e.to_string()));
                }
            }
        }

        // Step 3: Consume stock, all lines or none
        if let Err(e) = self.catalog.reserve(&items).await {
            error!(error = %e, "Stock reservation failed");
            return Err(match e {
                FrameworkError::NotFound { id, .. } => OrderError::ProductNotFound(id),
                FrameworkError::Rejected(msg) => OrderError::InsufficientStock(msg),
                other => OrderError::ActorCommunicationError(other.to_string()),
            });
        }
        info!("Stock reserved successfully");

        // Step 4: Create the order
        let id = self
            .inner
            .create(OrderCreate {
                user_id: identity.user_id.clone(),
                items,
                payment_method,
            })
            .await
            .map_err(|e| match e {
                FrameworkError::Rejected(msg) => OrderError::ValidationError(msg),
                other => comm(other),
            })?;
        let order = self.fetch(id).await?;
        info!(order_id = %order.id, total = %order.total, "Order created successfully");

        let lines = order
            .items
            .iter()
            .zip(product_names)
            .map(|(item, product_name)| ReceiptLine {
                product_id: item.product_id.clone(),
                product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
            })
            .collect();
        Ok(OrderReceipt { order, lines })
    }

    #[instrument(skip(self))]
    pub async fn get_order(&self, id: String) -> Result<Option<Order>, OrderError> {
        self.inner.get(id).await.map_err(comm)
    }

    /// An order with its line items resolved for display. Products deleted
    /// since the order was placed show up under a placeholder name; the
    /// snapshot itself is untouched.
    #[instrument(skip(self))]
    pub async fn order_details(&self, id: String) -> Result<Option<OrderReceipt>, OrderError> {
        let Some(order) = self.inner.get(id).await.map_err(comm)? else {
            return Ok(None);
        };
        let mut lines = Vec::with_capacity(order.items.len());
        for item in &order.items {
            let product_name = self
                .catalog
                .get_product(item.product_id.clone())
                .await
                .map_err(|e| OrderError::ActorCommunicationError(e.to_string()))?
                .map(|p| p.name)
                .unwrap_or_else(|| "Unknown product".to_string());
            lines.push(ReceiptLine {
                product_id: item.product_id.clone(),
                product_name,
                quantity: item.quantity,
                unit_price: item.unit_price,
            });
        }
        Ok(Some(OrderReceipt { order, lines }))
    }

    /// Admins see every order; customers only their own. Newest first.
    #[instrument(skip(self, identity), fields(user_id = %identity.user_id))]
    pub async fn list_orders(&self, identity: &Identity) -> Result<Vec<Order>, OrderError> {
        let mut orders = self.inner.list().await.map_err(comm)?;
        if identity.require_admin().is_err() {
            orders.retain(|order| order.user_id == identity.user_id);
        }
        orders.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(orders)
    }

    /// Advance an order along its lifecycle. Transitions outside the state
    /// machine are rejected; cancellation does not restore stock.
    #[instrument(skip(self, identity))]
    pub async fn update_status(
        &self,
        identity: &Identity,
        id: String,
        status: OrderStatus,
    ) -> Result<Order, OrderError> {
        identity.require_admin()?;
        let order = self
            .fetch(id.clone())
            .await?;
        if !order.status.can_transition_to(status) {
            return Err(OrderError::InvalidTransition {
                from: order.status,
                to: status,
            });
        }
        info!(order_id = %id, from = %order.status, to = %status, "Advancing order status");
        self.inner
            .update(id, OrderPatch { status })
            .await
            .map_err(|e| match e {
                FrameworkError::NotFound { id, .. } => OrderError::NotFound(id),
                FrameworkError::Rejected(msg) => OrderError::ValidationError(msg),
                other => comm(other),
            })
    }

    /// Record the admin's verdict on a UPI payment. Approval moves the order
    /// to `preparing` and the payment to `verified`; rejection cancels the
    /// order and marks the payment `rejected`. Both fields change in the
    /// same actor message.
    #[instrument(skip(self, identity))]
    pub async fn review_payment(
        &self,
        identity: &Identity,
        id: String,
        approve: bool,
    ) -> Result<Order, OrderError> {
        identity.require_admin()?;
        let order = self.fetch(id.clone()).await?;
        if order.payment_status != PaymentStatus::PendingVerification {
            return Err(OrderError::PaymentNotPending(id));
        }
        info!(order_id = %id, approve, "Reviewing payment");
        self.inner
            .perform_action(id, OrderAction::ReviewPayment { approve })
            .await
            .map_err(|e| match e {
                FrameworkError::NotFound { id, .. } => OrderError::NotFound(id),
                FrameworkError::Rejected(msg) => OrderError::ValidationError(msg),
                other => comm(other),
            })
    }

    #[instrument(skip(self, identity))]
    pub async fn delete_order(&self, identity: &Identity, id: String) -> Result<(), OrderError> {
        identity.require_admin()?;
        self.inner.delete(id).await.map_err(|e| match e {
            FrameworkError::NotFound { id, .. } => OrderError::NotFound(id),
            other => comm(other),
        })
    }

    async fn fetch(&self, id: String) -> Result<Order, OrderError> {
        self.inner
            .get(id.clone())
            .await
            .map_err(comm)?
            .ok_or(OrderError::NotFound(id))
    }
}

fn comm(e: FrameworkError) -> OrderError {
    OrderError::ActorCommunicationError(e.to_string())
}
