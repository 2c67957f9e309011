use chrono::Utc;

use super::actions::{ProductAction, ProductActionResult};
use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch, DEFAULT_LOW_STOCK_THRESHOLD};

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;

    const KIND: &'static str = "product";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create(id: String, params: ProductCreate) -> Result<Self, String> {
        if params.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if params.price < 0.0 {
            return Err(format!("price must not be negative: {}", params.price));
        }
        let mut product = Self {
            id,
            name: params.name,
            description: params.description,
            price: params.price,
            category: params.category,
            stock: params.stock,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
            total_sold: 0,
            in_stock: false,
            is_trending: params.is_trending,
            is_featured: params.is_featured,
            created_at: Utc::now(),
        };
        product.sync_in_stock();
        Ok(product)
    }

    fn on_update(&mut self, patch: ProductPatch) -> Result<(), String> {
        if let Some(price) = patch.price {
            if price < 0.0 {
                return Err(format!("price must not be negative: {}", price));
            }
            self.price = price;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(threshold) = patch.low_stock_threshold {
            self.low_stock_threshold = threshold;
        }
        if let Some(is_trending) = patch.is_trending {
            self.is_trending = is_trending;
        }
        if let Some(is_featured) = patch.is_featured {
            self.is_featured = is_featured;
        }
        self.sync_in_stock();
        Ok(())
    }

    /// Handles stock movements.
    ///
    /// `Sell` is the only mutation order placement performs; it keeps the
    /// stock / total_sold / in_stock triple consistent in one step.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, String> {
        match action {
            ProductAction::Sell { quantity } => {
                if quantity > self.stock {
                    return Err(format!(
                        "Insufficient stock for {}: requested {}, available {}",
                        self.name, quantity, self.stock
                    ));
                }
                self.stock -= quantity;
                self.total_sold += quantity;
                self.sync_in_stock();
                Ok(ProductActionResult::Sold {
                    remaining: self.stock,
                })
            }
        }
    }
}
