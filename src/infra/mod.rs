//! Infrastructure adapters for storage, tenant lookup, callbacks and alerts.

pub mod callback;
pub mod directory;
pub mod notify;
pub mod store;

pub use callback::HttpCallbackTransport;
pub use directory::InMemoryDirectory;
pub use notify::LogNotifier;
pub use store::InMemoryParticipantStore;
