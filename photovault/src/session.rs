//! In-memory session state.
//!
//! The session holds the one piece of state shared across operations: the
//! numeric id of the account the user logged in as. It starts empty, is set
//! by the login success path, and is never cleared - the backend has no
//! logout, so the id simply lives for the rest of the process.
//!
//! There is deliberately no interior mutability here. The workflow owns its
//! `Session` directly and only the login event takes `&mut self`, so the
//! borrow checker enforces the single-writer rule that the original design
//! relied on callback ordering for.

use crate::types::UserId;

/// The logged-in user's identity, if any.
#[derive(Debug, Default)]
pub struct Session {
    user_id: Option<UserId>,
}

impl Session {
    /// Create an empty session (no user logged in).
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful login. Logging in again overwrites the id.
    pub fn set_user_id(&mut self, id: UserId) {
        self.user_id = Some(id);
    }

    /// The current user id, or `None` before the first successful login.
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }
}
