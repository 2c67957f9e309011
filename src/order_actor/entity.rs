use chrono::Utc;

use super::actions::OrderAction;
use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, OrderStatus, PaymentStatus};

/// Payload for advancing an order through its lifecycle.
#[derive(Debug, Clone)]
pub struct OrderPatch {
    pub status: OrderStatus,
}

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = OrderPatch;
    type Action = OrderAction;
    type ActionResult = Order;

    const KIND: &'static str = "order";

    fn id(&self) -> &String {
        &self.id
    }

    /// The order starts `pending`; its payment state is derived from the
    /// payment method. The total is computed from the line-item snapshots.
    fn from_create(id: String, params: OrderCreate) -> Result<Self, String> {
        if params.items.is_empty() {
            return Err("order has no items".to_string());
        }
        if let Some(item) = params.items.iter().find(|item| item.quantity == 0) {
            return Err(format!("invalid quantity for product {}", item.product_id));
        }
        let total = params.items.iter().map(|item| item.subtotal()).sum();
        Ok(Self {
            id,
            user_id: params.user_id,
            items: params.items,
            total,
            status: OrderStatus::Pending,
            payment_method: params.payment_method,
            payment_status: params.payment_method.initial_payment_status(),
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, patch: OrderPatch) -> Result<(), String> {
        if !self.status.can_transition_to(patch.status) {
            return Err(format!(
                "invalid status transition: {} -> {}",
                self.status, patch.status
            ));
        }
        self.status = patch.status;
        Ok(())
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<Order, String> {
        match action {
            OrderAction::ReviewPayment { approve } => {
                if self.payment_status != PaymentStatus::PendingVerification {
                    return Err(format!(
                        "order {} is not awaiting payment verification",
                        self.id
                    ));
                }
                if self.status != OrderStatus::Pending {
                    return Err(format!(
                        "order {} is {} and can no longer take a payment verdict",
                        self.id, self.status
                    ));
                }
                // Both fields move together.
                if approve {
                    self.payment_status = PaymentStatus::Verified;
                    self.status = OrderStatus::Preparing;
                } else {
                    self.payment_status = PaymentStatus::Rejected;
                    self.status = OrderStatus::Cancelled;
                }
                Ok(self.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LineItem, PaymentMethod};

    fn upi_order() -> Order {
        Order::from_create(
            "order_1".to_string(),
            OrderCreate {
                user_id: "user_1".to_string(),
                items: vec![LineItem::new("product_1", 2, 4.0)],
                payment_method: PaymentMethod::Upi,
            },
        )
        .unwrap()
    }

    #[test]
    fn create_derives_total_and_payment_state() {
        let order = upi_order();
        assert_eq!(order.total, 8.0);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::PendingVerification);

        let counter = Order::from_create(
            "order_2".to_string(),
            OrderCreate {
                user_id: "user_1".to_string(),
                items: vec![LineItem::new("product_1", 1, 4.0)],
                payment_method: PaymentMethod::Counter,
            },
        )
        .unwrap();
        assert_eq!(counter.payment_status, PaymentStatus::Cash);
    }

    #[test]
    fn create_rejects_empty_and_zero_quantity() {
        assert!(Order::from_create(
            "order_1".to_string(),
            OrderCreate {
                user_id: "user_1".to_string(),
                items: vec![],
                payment_method: PaymentMethod::Counter,
            },
        )
        .is_err());

        assert!(Order::from_create(
            "order_1".to_string(),
            OrderCreate {
                user_id: "user_1".to_string(),
                items: vec![LineItem::new("product_1", 0, 4.0)],
                payment_method: PaymentMethod::Counter,
            },
        )
        .is_err());
    }

    #[test]
    fn update_enforces_the_state_machine() {
        let mut order = upi_order();
        order
            .on_update(OrderPatch {
                status: OrderStatus::Preparing,
            })
            .unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);

        let err = order
            .on_update(OrderPatch {
                status: OrderStatus::Completed,
            })
            .unwrap_err();
        assert_eq!(err, "invalid status transition: preparing -> completed");
    }

    #[test]
    fn payment_approval_pairs_both_fields() {
        let mut order = upi_order();
        let updated = order
            .handle_action(OrderAction::ReviewPayment { approve: true })
            .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Verified);
        assert_eq!(updated.status, OrderStatus::Preparing);
        // The entity itself moved too, not just the returned copy.
        assert_eq!(order.payment_status, PaymentStatus::Verified);
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[test]
    fn payment_rejection_pairs_both_fields() {
        let mut order = upi_order();
        let updated = order
            .handle_action(OrderAction::ReviewPayment { approve: false })
            .unwrap();
        assert_eq!(updated.payment_status, PaymentStatus::Rejected);
        assert_eq!(updated.status, OrderStatus::Cancelled);
    }

    #[test]
    fn verdict_requires_pending_verification() {
        let mut order = upi_order();
        order
            .handle_action(OrderAction::ReviewPayment { approve: true })
            .unwrap();

        // Already verified; a second verdict is rejected.
        assert!(order
            .handle_action(OrderAction::ReviewPayment { approve: false })
            .is_err());

        let mut cash = Order::from_create(
            "order_2".to_string(),
            OrderCreate {
                user_id: "user_1".to_string(),
                items: vec![LineItem::new("product_1", 1, 4.0)],
                payment_method: PaymentMethod::Counter,
            },
        )
        .unwrap();
        assert!(cash
            .handle_action(OrderAction::ReviewPayment { approve: true })
            .is_err());
    }
}
