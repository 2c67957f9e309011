//! Typed clients over the generic resource actors. Each client owns the
//! domain-error mapping for its store; the order client additionally
//! orchestrates the placement flow across users and the catalog.

mod analytics_client;
mod catalog_client;
mod order_client;
mod review_client;
mod user_client;

pub use analytics_client::*;
pub use catalog_client::*;
pub use order_client::*;
pub use review_client::*;
pub use user_client::*;
