mod actor_framework;
mod app_system;
mod auth;
mod clients;
mod config;
mod domain;
mod error;
mod order_actor;
mod product_actor;
mod review_actor;
mod user_actor;

#[cfg(test)]
mod mock_framework;

use tracing::{error, info, Instrument};

use crate::app_system::{setup_tracing, CafeSystem};
use crate::auth::Role;
use crate::config::Config;
use crate::domain::{
    Category, LineItem, OrderStatus, PaymentMethod, ProductCreate, ProductPatch, StorefrontFilter,
};

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    info!("Starting cafe order system");
    let system = CafeSystem::new(Config::load());

    // Staff and the first customers
    let admin = system
        .user_client
        .register("Maya".into(), "maya@thedailygrind.example".into(), Role::Admin)
        .await
        .map_err(|e| e.to_string())?;
    let alice = system
        .user_client
        .register("Alice".into(), "alice@example.com".into(), Role::Customer)
        .await
        .map_err(|e| e.to_string())?;
    let bob = system
        .user_client
        .register("Bob".into(), "bob@example.com".into(), Role::Customer)
        .await
        .map_err(|e| e.to_string())?;

    // Everyone acts through a verified token, staff included.
    let admin_id = system
        .authenticate(&system.issue_token(&admin.id, admin.role))
        .map_err(|e| e.to_string())?;
    let alice_id = system
        .authenticate(&system.issue_token(&alice.id, alice.role))
        .map_err(|e| e.to_string())?;
    let bob_id = system
        .authenticate(&system.issue_token(&bob.id, bob.role))
        .map_err(|e| e.to_string())?;

    let staff = system
        .user_client
        .list_users(&admin_id)
        .await
        .map_err(|e| e.to_string())?;
    info!(registered = staff.len(), "Accounts ready");

    // Stock the counter
    let espresso = system
        .catalog_client
        .add_product(
            &admin_id,
            ProductCreate::new("Espresso", "Short and strong", 3.0, Category::Coffee)
                .with_stock(40),
        )
        .await
        .map_err(|e| e.to_string())?;
    let croissant = system
        .catalog_client
        .add_product(
            &admin_id,
            ProductCreate {
                is_featured: true,
                ..ProductCreate::new(
                    "Butter Croissant",
                    "Baked this morning",
                    3.5,
                    Category::Pastry,
                )
                .with_stock(12)
            },
        )
        .await
        .map_err(|e| e.to_string())?;
    let earl_grey = system
        .catalog_client
        .add_product(
            &admin_id,
            ProductCreate::new("Earl Grey", "Bergamot black tea", 2.5, Category::Tea),
        )
        .await
        .map_err(|e| e.to_string())?;

    let menu = system
        .catalog_client
        .storefront(&StorefrontFilter::default())
        .await
        .map_err(|e| e.to_string())?;
    let featured = system.catalog_client.featured().await.map_err(|e| e.to_string())?;
    let teas = system
        .catalog_client
        .by_category(Category::Tea)
        .await
        .map_err(|e| e.to_string())?;
    info!(
        products = menu.len(),
        featured = featured.len(),
        teas = teas.len(),
        "Storefront ready"
    );

    // Alice checks out over UPI - this flows through user validation, the
    // transactional stock reservation, and order creation.
    let span = tracing::info_span!("order_processing");
    let receipt = async {
        info!("Placing order through the order system");
        system
            .order_client
            .place_order(
                &alice_id,
                vec![
                    LineItem::new(espresso.id.clone(), 6, espresso.price),
                    LineItem::new(croissant.id.clone(), 1, croissant.price),
                ],
                PaymentMethod::Upi,
            )
            .await
    }
    .instrument(span)
    .await
    .map_err(|e| e.to_string())?;

    info!(
        order_id = %receipt.order.id,
        total = %receipt.order.total,
        payment_status = %receipt.order.payment_status,
        "Order placed"
    );
    for line in &receipt.lines {
        info!(
            product = %line.product_name,
            quantity = line.quantity,
            subtotal = %line.subtotal(),
            "Line item"
        );
    }

    // Admin confirms the UPI payment landed, then works the order.
    let order = system
        .order_client
        .review_payment(&admin_id, receipt.order.id.clone(), true)
        .await
        .map_err(|e| e.to_string())?;
    info!(status = %order.status, payment = %order.payment_status, "Payment verified");

    for status in [OrderStatus::Ready, OrderStatus::Completed] {
        system
            .order_client
            .update_status(&admin_id, order.id.clone(), status)
            .await
            .map_err(|e| e.to_string())?;
    }

    // Alice tracks her order from her side.
    if let Some(current) = system
        .order_client
        .get_order(order.id.clone())
        .await
        .map_err(|e| e.to_string())?
    {
        info!(status = %current.status, "Customer sees order status");
    }
    match system
        .order_client
        .order_details(order.id.clone())
        .await
        .map_err(|e| e.to_string())?
    {
        Some(details) => info!(status = %details.order.status, "Order served"),
        None => error!(order_id = %order.id, "Order vanished"),
    }
    let history = system
        .order_client
        .list_orders(&alice_id)
        .await
        .map_err(|e| e.to_string())?;
    info!(orders = history.len(), "Alice's order history");

    // Bob tries UPI too, but the payment never shows up.
    let bob_receipt = system
        .order_client
        .place_order(
            &bob_id,
            vec![LineItem::new(espresso.id.clone(), 1, espresso.price)],
            PaymentMethod::Upi,
        )
        .await
        .map_err(|e| e.to_string())?;
    let rejected = system
        .order_client
        .review_payment(&admin_id, bob_receipt.order.id.clone(), false)
        .await
        .map_err(|e| e.to_string())?;
    info!(status = %rejected.status, payment = %rejected.payment_status, "Payment rejected");
    system
        .order_client
        .delete_order(&admin_id, rejected.id)
        .await
        .map_err(|e| e.to_string())?;

    // Reviews: Alice's goes live after approval, Bob's spam gets removed.
    let review = system
        .review_client
        .submit_review(&alice_id, 5, "Best espresso on the block".into())
        .await
        .map_err(|e| e.to_string())?;
    let spam = system
        .review_client
        .submit_review(&bob_id, 1, "Visit my website".into())
        .await
        .map_err(|e| e.to_string())?;
    let queue = system
        .review_client
        .list_all(&admin_id)
        .await
        .map_err(|e| e.to_string())?;
    info!(pending = queue.len(), "Moderation queue");
    system
        .review_client
        .moderate(&admin_id, review.id, true)
        .await
        .map_err(|e| e.to_string())?;
    system
        .review_client
        .delete_review(&admin_id, spam.id)
        .await
        .map_err(|e| e.to_string())?;
    let published = system.review_client.published().await.map_err(|e| e.to_string())?;
    info!(reviews = published.len(), "Published reviews");

    // Back office: espresso is moving, flag it and top the stock back up.
    system
        .catalog_client
        .update_product(
            &admin_id,
            espresso.id.clone(),
            ProductPatch {
                is_trending: Some(true),
                ..Default::default()
            },
        )
        .await
        .map_err(|e| e.to_string())?;
    let trending = system.catalog_client.trending().await.map_err(|e| e.to_string())?;
    info!(trending = trending.len(), "Trending products");

    let low = system
        .catalog_client
        .low_stock(&admin_id)
        .await
        .map_err(|e| e.to_string())?;
    for product in low {
        info!(product = %product.name, stock = product.stock, "Low stock, topping up");
        system
            .catalog_client
            .restock(&admin_id, product.id, 50)
            .await
            .map_err(|e| e.to_string())?;
    }

    // Nobody ordered tea all season; retire it.
    system
        .catalog_client
        .delete_product(&admin_id, earl_grey.id)
        .await
        .map_err(|e| e.to_string())?;

    let counts = system.analytics_client.counts().await.map_err(|e| e.to_string())?;
    info!(
        users = counts.users,
        orders = counts.orders,
        products = counts.products,
        "Store counts"
    );
    let report = system
        .analytics_client
        .report(&admin_id)
        .await
        .map_err(|e| e.to_string())?;
    info!(
        revenue = %report.total_revenue,
        pending = %report.pending_revenue,
        completed = report.completed_orders,
        "Sales report"
    );
    if let Some(top) = report.top_products.first() {
        info!(product = %top.name, sold = top.quantity, "Top seller");
    }

    system.shutdown().await?;
    info!("Application completed successfully");
    Ok(())
}
