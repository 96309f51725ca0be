//! Client side of the product catalog: the HTTP remote store and the session
//! that keeps a local mirror of the collection in step with it.

pub mod config;
pub mod error;
pub mod session;
pub mod store;

pub use error::{NetworkError, SessionError, StoreOperation};
pub use session::{CatalogSession, CatalogSnapshot, EditorState, Intent, IntentKind, SessionEvent};
pub use store::{HttpRemoteStore, RemoteStore};
