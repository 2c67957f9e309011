/// Custom actions for Product entities.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Sell a quantity of this product: decrements stock, bumps the sales
    /// counter, and recomputes availability.
    ///
    /// # Errors
    /// Rejected if the requested quantity exceeds the current stock; the
    /// message names the product and both quantities.
    Sell { quantity: u32 },
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    /// Stock remaining after the sale.
    Sold { remaining: u32 },
}
