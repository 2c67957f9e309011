use tracing::{debug, instrument};

use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::auth::{Identity, Role};
use crate::domain::{User, UserCreate};
use crate::error::UserError;

/// Client for the user store.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
}

impl UserClient {
    pub fn new(inner: ResourceClient<User>) -> Self {
        Self { inner }
    }

    /// Registers a new account. Email addresses are unique across the store.
    #[instrument(skip(self))]
    pub async fn register(
        &self,
        name: String,
        email: String,
        role: Role,
    ) -> Result<User, UserError> {
        debug!("Sending request");
        let users = self.inner.list().await.map_err(comm)?;
        if users.iter().any(|user| user.email == email) {
            return Err(UserError::EmailTaken(email));
        }

        let id = self
            .inner
            .create(UserCreate { name, email, role })
            .await
            .map_err(|e| match e {
                FrameworkError::Rejected(msg) => UserError::ValidationError(msg),
                other => comm(other),
            })?;
        self.inner
            .get(id.clone())
            .await
            .map_err(comm)?
            .ok_or(UserError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn get_user(&self, id: String) -> Result<Option<User>, UserError> {
        debug!("Sending request");
        self.inner.get(id).await.map_err(comm)
    }

    #[instrument(skip(self, identity))]
    pub async fn list_users(&self, identity: &Identity) -> Result<Vec<User>, UserError> {
        identity.require_admin()?;
        debug!("Sending request");
        let mut users = self.inner.list().await.map_err(comm)?;
        users.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        Ok(users)
    }
}

fn comm(e: FrameworkError) -> UserError {
    UserError::ActorCommunicationError(e.to_string())
}
