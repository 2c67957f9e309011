use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stock level a new product starts with unless the caller says otherwise.
pub const DEFAULT_STOCK: u32 = 100;
/// Threshold below which a product counts as low-stock unless overridden.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 10;

/// Menu category of a product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Coffee,
    Tea,
    Pastry,
    Sandwich,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Coffee => write!(f, "coffee"),
            Category::Tea => write!(f, "tea"),
            Category::Pastry => write!(f, "pastry"),
            Category::Sandwich => write!(f, "sandwich"),
        }
    }
}

/// Represents a product in the catalog.
///
/// `in_stock` is derived state: it must equal `stock > 0` after every
/// mutation, and `total_sold` only ever grows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub stock: u32,
    pub low_stock_threshold: u32,
    pub total_sold: u32,
    pub in_stock: bool,
    pub is_trending: bool,
    pub is_featured: bool,
    pub created_at: DateTime<Utc>,
}

impl Product {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.low_stock_threshold
    }

    /// Recompute the derived availability flag. Call after every stock change.
    pub fn sync_in_stock(&mut self) {
        self.in_stock = self.stock > 0;
    }

    pub fn matches(&self, filter: &StorefrontFilter) -> bool {
        if !filter.include_out_of_stock && !(self.in_stock && self.stock > 0) {
            return false;
        }
        if let Some(category) = filter.category {
            if self.category != category {
                return false;
            }
        }
        if let Some(search) = &filter.search {
            let needle = search.to_lowercase();
            if !self.name.to_lowercase().contains(&needle)
                && !self.description.to_lowercase().contains(&needle)
            {
                return false;
            }
        }
        true
    }
}

/// Parameters for adding a product to the catalog.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub category: Category,
    pub stock: u32,
    pub is_trending: bool,
    pub is_featured: bool,
}

impl ProductCreate {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: f64,
        category: Category,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            price,
            category,
            stock: DEFAULT_STOCK,
            is_trending: false,
            is_featured: false,
        }
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }
}

/// Payload for updating an existing product.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<Category>,
    pub stock: Option<u32>,
    pub low_stock_threshold: Option<u32>,
    pub is_trending: Option<bool>,
    pub is_featured: Option<bool>,
}

/// Storefront query over the catalog.
#[derive(Debug, Clone, Default)]
pub struct StorefrontFilter {
    pub category: Option<Category>,
    pub search: Option<String>,
    pub include_out_of_stock: bool,
}
