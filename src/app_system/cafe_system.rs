use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{error, info};

use crate::actor_framework::ResourceActor;
use crate::auth::{AuthGate, Role};
use crate::clients::{AnalyticsClient, CatalogClient, OrderClient, ReviewClient, UserClient};
use crate::config::Config;
use crate::domain::{Order, Product, Review, User};
use crate::error::AuthError;

/// The main application system that orchestrates all actors.
///
/// Responsible for starting up actors, wiring them together, and handling
/// shutdown. Also owns the auth gate that fronts every protected operation.
pub struct CafeSystem {
    pub auth: AuthGate,
    pub user_client: UserClient,
    pub catalog_client: CatalogClient,
    pub order_client: OrderClient,
    pub review_client: ReviewClient,
    pub analytics_client: AnalyticsClient,
    token_ttl: chrono::Duration,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || {
        let id = counter.fetch_add(1, Ordering::SeqCst);
        format!("{}_{}", prefix, id)
    }
}

impl CafeSystem {
    pub fn new(config: Config) -> Self {
        let buffer = config.channel_buffer;

        // 1. User store
        let (user_actor, user_resource) = ResourceActor::<User>::new(buffer, sequential_ids("user"));
        let user_client = UserClient::new(user_resource.clone());
        let user_handle = tokio::spawn(user_actor.run());

        // 2. Catalog store
        let (product_actor, product_resource) =
            ResourceActor::<Product>::new(buffer, sequential_ids("product"));
        let catalog_client = CatalogClient::new(product_resource.clone());
        let product_handle = tokio::spawn(product_actor.run());

        // 3. Order store (client orchestrates users + catalog)
        let (order_actor, order_resource) =
            ResourceActor::<Order>::new(buffer, sequential_ids("order"));
        let order_client = OrderClient::new(
            order_resource.clone(),
            user_client.clone(),
            catalog_client.clone(),
        );
        let order_handle = tokio::spawn(order_actor.run());

        // 4. Review store
        let (review_actor, review_resource) =
            ResourceActor::<Review>::new(buffer, sequential_ids("review"));
        let review_client = ReviewClient::new(review_resource, user_client.clone());
        let review_handle = tokio::spawn(review_actor.run());

        let analytics_client = AnalyticsClient::new(user_resource, product_resource, order_resource);

        info!("Cafe system started");
        Self {
            auth: AuthGate::new(),
            user_client,
            catalog_client,
            order_client,
            review_client,
            analytics_client,
            token_ttl: chrono::Duration::seconds(config.token_ttl_secs),
            handles: vec![user_handle, product_handle, order_handle, review_handle],
        }
    }

    /// Issue a bearer token for a registered user, valid for the configured
    /// lifetime.
    pub fn issue_token(&self, user_id: &str, role: Role) -> String {
        self.auth.issue(user_id, role, self.token_ttl)
    }

    /// Resolve a bearer token into the acting identity.
    pub fn authenticate(&self, bearer: &str) -> Result<crate::auth::Identity, AuthError> {
        self.auth.authenticate(bearer)
    }

    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        // ResourceActor shuts down when its channel closes, so dropping every
        // client is enough; then wait for the tasks to drain.
        drop(self.user_client);
        drop(self.catalog_client);
        drop(self.order_client);
        drop(self.review_client);
        drop(self.analytics_client);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
