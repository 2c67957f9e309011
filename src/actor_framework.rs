use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// 1. THE ABSTRACTION (Traits with Hooks, Payloads, and Actions)
// =============================================================================

/// Trait that any domain entity must implement to be managed by ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Patch: Send + Sync + Debug;

    // --- Custom Actions ---
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Short noun used in not-found messages ("product", "order", ...).
    const KIND: &'static str;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the full Entity from the ID and creation parameters
    fn from_create(id: Self::Id, params: Self::CreateParams) -> Result<Self, String>;

    // --- Lifecycle Hooks ---

    fn on_create(&mut self) -> Result<(), String> {
        Ok(())
    }
    fn on_update(&mut self, patch: Self::Patch) -> Result<(), String>;
    fn on_delete(&self) -> Result<(), String> {
        Ok(())
    }

    // --- Action Handler ---

    /// Handle a custom domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;
}

// =============================================================================
// 2. ERRORS AND GENERIC MESSAGES
// =============================================================================

/// Failures surfaced by the framework itself, as opposed to domain errors
/// which the typed clients layer on top.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    /// The entity refused a hook or action. Carries the entity's message.
    #[error("{0}")]
    Rejected(String),
    #[error("actor unavailable: {0}")]
    Channel(String),
}

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Update {
        id: T::Id,
        patch: T::Patch,
        respond_to: Response<T>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
    /// Apply a batch of actions all-or-nothing. Steps run in order against
    /// staged clones of the targeted entities; later steps observe the staged
    /// effect of earlier ones. Only if every step succeeds are the clones
    /// written back, so a failed step leaves the store untouched.
    Transact {
        steps: Vec<(T::Id, T::Action)>,
        respond_to: Response<Vec<T::ActionResult>>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_id_fn: Box<dyn Fn() -> T::Id + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_id_fn: impl Fn() -> T::Id + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_id_fn: Box::new(next_id_fn),
        };
        let client = ResourceClient::from_sender(sender);
        (actor, client)
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let id = (self.next_id_fn)();
                    match T::from_create(id.clone(), params) {
                        Ok(mut item) => {
                            if let Err(e) = item.on_create() {
                                let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                                continue;
                            }
                            self.store.insert(id.clone(), item);
                            let _ = respond_to.send(Ok(id));
                        }
                        Err(e) => {
                            let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                        }
                    }
                }
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::List { respond_to } => {
                    let items = self.store.values().cloned().collect();
                    let _ = respond_to.send(Ok(items));
                }
                ResourceRequest::Update {
                    id,
                    patch,
                    respond_to,
                } => {
                    if let Some(item) = self.store.get_mut(&id) {
                        if let Err(e) = item.on_update(patch) {
                            let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                            continue;
                        }
                        let _ = respond_to.send(Ok(item.clone()));
                    } else {
                        let _ = respond_to.send(Err(Self::not_found(&id)));
                    }
                }
                ResourceRequest::Delete { id, respond_to } => {
                    if let Some(item) = self.store.get(&id) {
                        if let Err(e) = item.on_delete() {
                            let _ = respond_to.send(Err(FrameworkError::Rejected(e)));
                            continue;
                        }
                        self.store.remove(&id);
                        let _ = respond_to.send(Ok(()));
                    } else {
                        let _ = respond_to.send(Err(Self::not_found(&id)));
                    }
                }
                ResourceRequest::Action {
                    id,
                    action,
                    respond_to,
                } => {
                    if let Some(item) = self.store.get_mut(&id) {
                        let result = item
                            .handle_action(action)
                            .map_err(FrameworkError::Rejected);
                        let _ = respond_to.send(result);
                    } else {
                        let _ = respond_to.send(Err(Self::not_found(&id)));
                    }
                }
                ResourceRequest::Transact { steps, respond_to } => {
                    let _ = respond_to.send(self.handle_transact(steps));
                }
            }
        }
    }

    fn handle_transact(
        &mut self,
        steps: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError> {
        let mut staged: HashMap<T::Id, T> = HashMap::new();
        let mut results = Vec::with_capacity(steps.len());

        for (id, action) in steps {
            let item = match staged.entry(id.clone()) {
                Entry::Occupied(entry) => entry.into_mut(),
                Entry::Vacant(entry) => match self.store.get(&id) {
                    Some(existing) => entry.insert(existing.clone()),
                    None => return Err(Self::not_found(&id)),
                },
            };
            let result = item.handle_action(action).map_err(FrameworkError::Rejected)?;
            results.push(result);
        }

        for (id, item) in staged {
            self.store.insert(id, item);
        }
        Ok(results)
    }

    fn not_found(id: &T::Id) -> FrameworkError {
        FrameworkError::NotFound {
            kind: T::KIND,
            id: id.to_string(),
        }
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    /// Build a client over an existing sender. Used by the mock framework.
    pub fn from_sender(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Create { params, respond_to }, response)
            .await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Get { id, respond_to }, response)
            .await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::List { respond_to }, response)
            .await
    }

    pub async fn update(&self, id: T::Id, patch: T::Patch) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(
            ResourceRequest::Update {
                id,
                patch,
                respond_to,
            },
            response,
        )
        .await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Delete { id, respond_to }, response)
            .await
    }

    pub async fn perform_action(
        &self,
        id: T::Id,
        action: T::Action,
    ) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(
            ResourceRequest::Action {
                id,
                action,
                respond_to,
            },
            response,
        )
        .await
    }

    pub async fn transact(
        &self,
        steps: Vec<(T::Id, T::Action)>,
    ) -> Result<Vec<T::ActionResult>, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.send(ResourceRequest::Transact { steps, respond_to }, response)
            .await
    }

    async fn send<R>(
        &self,
        request: ResourceRequest<T>,
        response: oneshot::Receiver<Result<R, FrameworkError>>,
    ) -> Result<R, FrameworkError> {
        self.sender
            .send(request)
            .await
            .map_err(|_| FrameworkError::Channel("actor closed".to_string()))?;
        response
            .await
            .map_err(|_| FrameworkError::Channel("actor dropped".to_string()))?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    // --- Domain Definition ---

    #[derive(Clone, Debug, PartialEq)]
    struct Counter {
        id: String,
        label: String,
        value: u32,
    }

    #[derive(Debug)]
    struct CounterCreate {
        label: String,
        value: u32,
    }

    #[derive(Debug)]
    struct CounterPatch {
        label: Option<String>,
    }

    #[derive(Debug)]
    enum CounterAction {
        Add(u32),
        TakeExactly(u32),
    }

    impl Entity for Counter {
        type Id = String;
        type CreateParams = CounterCreate;
        type Patch = CounterPatch;
        type Action = CounterAction;
        type ActionResult = u32;

        const KIND: &'static str = "counter";

        fn id(&self) -> &String {
            &self.id
        }

        fn from_create(id: String, params: CounterCreate) -> Result<Self, String> {
            Ok(Self {
                id,
                label: params.label,
                value: params.value,
            })
        }

        fn on_update(&mut self, patch: CounterPatch) -> Result<(), String> {
            if let Some(label) = patch.label {
                self.label = label;
            }
            Ok(())
        }

        fn handle_action(&mut self, action: CounterAction) -> Result<u32, String> {
            match action {
                CounterAction::Add(n) => {
                    self.value += n;
                    Ok(self.value)
                }
                CounterAction::TakeExactly(n) => {
                    if self.value < n {
                        return Err(format!("only {} left, wanted {}", self.value, n));
                    }
                    self.value -= n;
                    Ok(self.value)
                }
            }
        }
    }

    fn spawn_counter_actor() -> ResourceClient<Counter> {
        let seq = Arc::new(AtomicU64::new(1));
        let next_id = move || format!("counter_{}", seq.fetch_add(1, Ordering::SeqCst));
        let (actor, client) = ResourceActor::new(10, next_id);
        tokio::spawn(actor.run());
        client
    }

    #[tokio::test]
    async fn crud_and_actions() {
        let client = spawn_counter_actor();

        let id = client
            .create(CounterCreate {
                label: "beans".into(),
                value: 3,
            })
            .await
            .unwrap();
        assert_eq!(id, "counter_1");

        let after = client
            .perform_action(id.clone(), CounterAction::Add(4))
            .await
            .unwrap();
        assert_eq!(after, 7);

        let updated = client
            .update(
                id.clone(),
                CounterPatch {
                    label: Some("roast".into()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.label, "roast");

        client.delete(id.clone()).await.unwrap();
        assert_eq!(client.get(id.clone()).await.unwrap(), None);
        assert_eq!(
            client.delete(id.clone()).await,
            Err(FrameworkError::NotFound {
                kind: "counter",
                id: "counter_1".into()
            })
        );
    }

    #[tokio::test]
    async fn transact_commits_all_steps() {
        let client = spawn_counter_actor();
        let a = client
            .create(CounterCreate { label: "a".into(), value: 5 })
            .await
            .unwrap();
        let b = client
            .create(CounterCreate { label: "b".into(), value: 5 })
            .await
            .unwrap();

        let results = client
            .transact(vec![
                (a.clone(), CounterAction::TakeExactly(2)),
                (b.clone(), CounterAction::TakeExactly(1)),
                (a.clone(), CounterAction::TakeExactly(3)),
            ])
            .await
            .unwrap();
        assert_eq!(results, vec![3, 4, 0]);

        assert_eq!(client.get(a).await.unwrap().unwrap().value, 0);
        assert_eq!(client.get(b).await.unwrap().unwrap().value, 4);
    }

    #[tokio::test]
    async fn transact_rolls_back_on_failure() {
        let client = spawn_counter_actor();
        let a = client
            .create(CounterCreate { label: "a".into(), value: 5 })
            .await
            .unwrap();
        let b = client
            .create(CounterCreate { label: "b".into(), value: 1 })
            .await
            .unwrap();

        // Second step fails; the first step's decrement must not stick.
        let err = client
            .transact(vec![
                (a.clone(), CounterAction::TakeExactly(5)),
                (b.clone(), CounterAction::TakeExactly(2)),
            ])
            .await
            .unwrap_err();
        assert_eq!(err, FrameworkError::Rejected("only 1 left, wanted 2".into()));

        assert_eq!(client.get(a).await.unwrap().unwrap().value, 5);
        assert_eq!(client.get(b).await.unwrap().unwrap().value, 1);
    }

    #[tokio::test]
    async fn transact_missing_entity_aborts() {
        let client = spawn_counter_actor();
        let a = client
            .create(CounterCreate { label: "a".into(), value: 5 })
            .await
            .unwrap();

        let err = client
            .transact(vec![
                (a.clone(), CounterAction::TakeExactly(1)),
                ("counter_99".to_string(), CounterAction::Add(1)),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, FrameworkError::NotFound { .. }));
        assert_eq!(client.get(a).await.unwrap().unwrap().value, 5);
    }
}
