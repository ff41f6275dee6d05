//! Authentication session state and the store that owns it. The store is the
//! only code path that mutates the session; views and guards read snapshots or
//! subscribe to changes.

mod state;
mod store;

pub use state::{Session, StatusKind};
pub use store::{LoginError, SessionStore, LOGIN_FALLBACK_MESSAGE};
