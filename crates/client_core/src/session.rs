use std::{fmt, sync::Arc};

use shared::domain::{Draft, DraftField, Product, ProductId};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

use crate::{
    error::{NetworkError, SessionError},
    store::RemoteStore,
};

const EVENT_CHANNEL_CAPACITY: usize = 256;

static EMPTY_DRAFT: Draft = Draft::empty();

/// Whether the product editor is showing, and for which mode. A closed editor
/// carries no draft, and only `Editing` names a target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Closed,
    Adding {
        draft: Draft,
    },
    Editing {
        target: ProductId,
        draft: Draft,
    },
}

impl EditorState {
    pub fn is_open(&self) -> bool {
        !matches!(self, EditorState::Closed)
    }

    pub fn edit_target(&self) -> Option<&ProductId> {
        match self {
            EditorState::Editing { target, .. } => Some(target),
            _ => None,
        }
    }

    pub fn draft(&self) -> &Draft {
        match self {
            EditorState::Closed => &EMPTY_DRAFT,
            EditorState::Adding { draft } | EditorState::Editing { draft, .. } => draft,
        }
    }

    fn draft_mut(&mut self) -> Option<&mut Draft> {
        match self {
            EditorState::Closed => None,
            EditorState::Adding { draft } | EditorState::Editing { draft, .. } => Some(draft),
        }
    }
}

/// Immutable view of the session handed to subscribers after every
/// successful intent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogSnapshot {
    pub products: Vec<Product>,
    pub editor: EditorState,
}

impl CatalogSnapshot {
    pub fn product(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Initialize,
    OpenAdd,
    OpenEdit(ProductId),
    EditField { field: DraftField, value: String },
    Cancel,
    Submit,
    Delete(ProductId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntentKind {
    Initialize,
    OpenAdd,
    OpenEdit,
    EditField,
    Cancel,
    Submit,
    Delete,
}

impl Intent {
    pub fn kind(&self) -> IntentKind {
        match self {
            Intent::Initialize => IntentKind::Initialize,
            Intent::OpenAdd => IntentKind::OpenAdd,
            Intent::OpenEdit(_) => IntentKind::OpenEdit,
            Intent::EditField { .. } => IntentKind::EditField,
            Intent::Cancel => IntentKind::Cancel,
            Intent::Submit => IntentKind::Submit,
            Intent::Delete(_) => IntentKind::Delete,
        }
    }
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IntentKind::Initialize => "initialize",
            IntentKind::OpenAdd => "open_add",
            IntentKind::OpenEdit => "open_edit",
            IntentKind::EditField => "edit_field",
            IntentKind::Cancel => "cancel",
            IntentKind::Submit => "submit",
            IntentKind::Delete => "delete",
        })
    }
}

#[derive(Debug, Clone)]
pub enum SessionEvent {
    StateChanged(Arc<CatalogSnapshot>),
    /// A remote call failed; session state was left as it was before the intent.
    IntentFailed { intent: IntentKind, error: NetworkError },
}

#[derive(Default)]
struct SessionState {
    catalog: Vec<Product>,
    editor: EditorState,
}

impl SessionState {
    fn snapshot(&self) -> CatalogSnapshot {
        CatalogSnapshot {
            products: self.catalog.clone(),
            editor: self.editor.clone(),
        }
    }

    fn contains(&self, id: &ProductId) -> bool {
        self.catalog.iter().any(|p| &p.id == id)
    }

    // A returned id already in the mirror replaces that entry, so ids stay unique.
    fn upsert(&mut self, product: Product) {
        match self.catalog.iter_mut().find(|p| p.id == product.id) {
            Some(slot) => *slot = product,
            None => self.catalog.push(product),
        }
    }
}

/// Local mirror of the remote product collection plus the editor state
/// machine. Mutations go to the remote store first; the mirror only changes
/// once the store has answered.
///
/// The state lock is never held across a remote call, so intents are not
/// serialised against each other: overlapping calls for the same product race
/// and whichever response is applied last wins.
pub struct CatalogSession {
    store: Arc<dyn RemoteStore>,
    inner: Mutex<SessionState>,
    events: broadcast::Sender<SessionEvent>,
}

impl CatalogSession {
    pub fn new(store: Arc<dyn RemoteStore>) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Arc::new(Self {
            store,
            inner: Mutex::new(SessionState::default()),
            events,
        })
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> CatalogSnapshot {
        self.inner.lock().await.snapshot()
    }

    pub async fn dispatch(&self, intent: Intent) -> Result<(), SessionError> {
        match intent {
            Intent::Initialize => self.initialize().await,
            Intent::OpenAdd => {
                self.open_add().await;
                Ok(())
            }
            Intent::OpenEdit(id) => self.open_edit(&id).await,
            Intent::EditField { field, value } => self.edit_field(field, value).await,
            Intent::Cancel => {
                self.cancel().await;
                Ok(())
            }
            Intent::Submit => self.submit().await,
            Intent::Delete(id) => self.delete(&id).await,
        }
    }

    /// Replaces the mirror with the remote collection and closes the editor.
    pub async fn initialize(&self) -> Result<(), SessionError> {
        let products = self
            .store
            .fetch_all()
            .await
            .map_err(|err| self.fail(IntentKind::Initialize, err))?;

        let mut guard = self.inner.lock().await;
        guard.catalog.clear();
        for product in products {
            guard.upsert(product);
        }
        guard.editor = EditorState::Closed;
        info!(count = guard.catalog.len(), "catalog: loaded products");
        self.publish(&guard);
        Ok(())
    }

    pub async fn open_add(&self) {
        let mut guard = self.inner.lock().await;
        guard.editor = EditorState::Adding {
            draft: Draft::empty(),
        };
        self.publish(&guard);
    }

    pub async fn open_edit(&self, id: &ProductId) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().await;
        let draft = guard
            .catalog
            .iter()
            .find(|p| &p.id == id)
            .map(Draft::from_product)
            .ok_or_else(|| SessionError::UnknownProduct(id.clone()))?;
        guard.editor = EditorState::Editing {
            target: id.clone(),
            draft,
        };
        self.publish(&guard);
        Ok(())
    }

    pub async fn edit_field(
        &self,
        field: DraftField,
        value: impl Into<String>,
    ) -> Result<(), SessionError> {
        let mut guard = self.inner.lock().await;
        guard
            .editor
            .draft_mut()
            .ok_or(SessionError::EditorClosed)?
            .set(field, value);
        self.publish(&guard);
        Ok(())
    }

    /// Closes the editor and drops the draft. A no-op when already closed.
    pub async fn cancel(&self) {
        let mut guard = self.inner.lock().await;
        if !guard.editor.is_open() {
            return;
        }
        guard.editor = EditorState::Closed;
        self.publish(&guard);
    }

    /// Creates or replaces depending solely on whether an edit target is set
    /// right now. On failure the editor stays open with the draft intact.
    pub async fn submit(&self) -> Result<(), SessionError> {
        let (target, draft) = {
            let guard = self.inner.lock().await;
            match &guard.editor {
                EditorState::Closed => return Err(SessionError::EditorClosed),
                EditorState::Adding { draft } => (None, draft.clone()),
                EditorState::Editing { target, draft } => (Some(target.clone()), draft.clone()),
            }
        };
        if let Some(field) = draft.first_missing_field() {
            return Err(SessionError::IncompleteDraft(field));
        }

        match target {
            Some(id) => {
                let updated = self
                    .store
                    .replace(&id, &draft)
                    .await
                    .map_err(|err| self.fail(IntentKind::Submit, err))?;
                let mut guard = self.inner.lock().await;
                if let Some(slot) = guard.catalog.iter_mut().find(|p| p.id == id) {
                    *slot = updated;
                }
                guard.editor = EditorState::Closed;
                info!(product_id = %id, "catalog: product replaced");
                self.publish(&guard);
            }
            None => {
                let created = self
                    .store
                    .create(&draft.fields())
                    .await
                    .map_err(|err| self.fail(IntentKind::Submit, err))?;
                let mut guard = self.inner.lock().await;
                info!(product_id = %created.id, "catalog: product created");
                guard.upsert(created);
                guard.editor = EditorState::Closed;
                self.publish(&guard);
            }
        }
        Ok(())
    }

    /// Removes a product remotely, then from the mirror. Editor state is untouched.
    pub async fn delete(&self, id: &ProductId) -> Result<(), SessionError> {
        if !self.inner.lock().await.contains(id) {
            return Err(SessionError::UnknownProduct(id.clone()));
        }

        self.store
            .delete(id)
            .await
            .map_err(|err| self.fail(IntentKind::Delete, err))?;

        let mut guard = self.inner.lock().await;
        guard.catalog.retain(|p| &p.id != id);
        info!(product_id = %id, "catalog: product deleted");
        self.publish(&guard);
        Ok(())
    }

    fn publish(&self, state: &SessionState) {
        let _ = self
            .events
            .send(SessionEvent::StateChanged(Arc::new(state.snapshot())));
    }

    fn fail(&self, intent: IntentKind, error: NetworkError) -> SessionError {
        warn!(%intent, %error, "catalog: intent aborted by remote failure");
        let _ = self.events.send(SessionEvent::IntentFailed {
            intent,
            error: error.clone(),
        });
        SessionError::Network(error)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
