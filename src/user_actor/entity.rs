use chrono::Utc;

use crate::actor_framework::Entity;
use crate::domain::{User, UserCreate, UserPatch};

impl Entity for User {
    type Id = String;
    type CreateParams = UserCreate;
    type Patch = UserPatch;
    type Action = ();
    type ActionResult = ();

    const KIND: &'static str = "user";

    fn id(&self) -> &String {
        &self.id
    }

    fn from_create(id: String, params: UserCreate) -> Result<Self, String> {
        if params.name.trim().is_empty() {
            return Err("name must not be empty".to_string());
        }
        if !params.email.contains('@') {
            return Err(format!("invalid email: {}", params.email));
        }
        Ok(Self {
            id,
            name: params.name,
            email: params.email,
            role: params.role,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, patch: UserPatch) -> Result<(), String> {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        Ok(())
    }

    fn handle_action(&mut self, _action: ()) -> Result<(), String> {
        Ok(())
    }
}
