//! Client-side session: durable storage backends, the keyed session store and
//! the controller that owns login state.

pub mod controller;
pub mod storage;
pub mod store;

pub use controller::{SessionController, SessionState};
pub use storage::{FileStorage, MemoryStorage, Storage, StoreError};
pub use store::SessionStore;
