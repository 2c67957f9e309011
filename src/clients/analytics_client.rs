use chrono::{Duration, NaiveDate, Utc};
use std::collections::HashMap;
use tracing::{debug, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::auth::Identity;
use crate::domain::{Order, OrderStatus, Product, User};
use crate::error::AnalyticsError;

/// Rough margin used for the profit estimate on the admin dashboard.
const PROFIT_MARGIN: f64 = 0.3;
const TOP_PRODUCT_LIMIT: usize = 5;
const REPORT_DAYS: i64 = 7;

/// Headline counts for the landing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCounts {
    pub users: usize,
    pub orders: usize,
    pub products: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySales {
    pub date: NaiveDate,
    pub revenue: f64,
    pub orders: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductSales {
    pub name: String,
    pub quantity: u32,
    pub revenue: f64,
}

/// The admin sales dashboard, computed over the full order history.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub total_revenue: f64,
    pub pending_revenue: f64,
    pub estimated_profit: f64,
    pub completed_orders: usize,
    pub active_orders: usize,
    /// Today first, going back one week.
    pub daily_sales: Vec<DailySales>,
    pub top_products: Vec<ProductSales>,
}

/// Read-only reporting over the other stores.
#[derive(Clone)]
pub struct AnalyticsClient {
    users: ResourceClient<User>,
    products: ResourceClient<Product>,
    orders: ResourceClient<Order>,
}

impl AnalyticsClient {
    pub fn new(
        users: ResourceClient<User>,
        products: ResourceClient<Product>,
        orders: ResourceClient<Order>,
    ) -> Self {
        Self {
            users,
            products,
            orders,
        }
    }

    #[instrument(skip(self))]
    pub async fn counts(&self) -> Result<StoreCounts, AnalyticsError> {
        debug!("Sending request");
        let users = self.users.list().await.map_err(comm)?.len();
        let orders = self.orders.list().await.map_err(comm)?.len();
        let products = self.products.list().await.map_err(comm)?.len();
        Ok(StoreCounts {
            users,
            orders,
            products,
        })
    }

    #[instrument(skip(self, identity))]
    pub async fn report(&self, identity: &Identity) -> Result<SalesReport, AnalyticsError> {
        identity.require_admin()?;
        debug!("Sending request");
        let orders = self.orders.list().await.map_err(comm)?;
        let product_names: HashMap<String, String> = self
            .products
            .list()
            .await
            .map_err(comm)?
            .into_iter()
            .map(|p| (p.id, p.name))
            .collect();
        Ok(build_report(
            &orders,
            &product_names,
            Utc::now().date_naive(),
        ))
    }
}

fn build_report(
    orders: &[Order],
    product_names: &HashMap<String, String>,
    today: NaiveDate,
) -> SalesReport {
    let completed: Vec<&Order> = orders
        .iter()
        .filter(|o| o.status == OrderStatus::Completed)
        .collect();
    let total_revenue: f64 = completed.iter().map(|o| o.total).sum();
    let pending_revenue: f64 = orders
        .iter()
        .filter(|o| !o.status.is_terminal())
        .map(|o| o.total)
        .sum();
    let active_orders = orders.iter().filter(|o| !o.status.is_terminal()).count();

    let daily_sales = (0..REPORT_DAYS)
        .map(|days_back| {
            let date = today - Duration::days(days_back);
            let day_orders: Vec<&&Order> = completed
                .iter()
                .filter(|o| o.created_at.date_naive() == date)
                .collect();
            DailySales {
                date,
                revenue: day_orders.iter().map(|o| o.total).sum(),
                orders: day_orders.len(),
            }
        })
        .collect();

    let mut by_product: HashMap<&str, ProductSales> = HashMap::new();
    for order in &completed {
        for item in &order.items {
            let name = product_names
                .get(&item.product_id)
                .map(String::as_str)
                .unwrap_or("Unknown product");
            let entry = by_product.entry(name).or_insert_with(|| ProductSales {
                name: name.to_string(),
                quantity: 0,
                revenue: 0.0,
            });
            entry.quantity += item.quantity;
            entry.revenue += item.subtotal();
        }
    }
    let mut top_products: Vec<ProductSales> = by_product.into_values().collect();
    top_products.sort_by(|a, b| {
        b.revenue
            .partial_cmp(&a.revenue)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    top_products.truncate(TOP_PRODUCT_LIMIT);

    SalesReport {
        total_revenue,
        pending_revenue,
        estimated_profit: total_revenue * PROFIT_MARGIN,
        completed_orders: completed.len(),
        active_orders,
        daily_sales,
        top_products,
    }
}

fn comm(e: FrameworkError) -> AnalyticsError {
    AnalyticsError::ActorCommunicationError(e.to_string())
}
