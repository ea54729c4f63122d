//! Current-user identity.
//!
//! Authentication itself belongs to the hosted backend. The marketplace only
//! needs to ask "who is signed in right now?", which is what
//! [`IdentityProvider`] answers.

use crate::ids::UserId;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// The signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// User ID.
    pub id: UserId,
    /// Email address.
    pub email: String,
}

impl Identity {
    /// Create a new identity.
    pub fn new(id: impl Into<UserId>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: email.into(),
        }
    }
}

/// Supplies the current identity, if any.
pub trait IdentityProvider: Send + Sync {
    /// The signed-in user, or `None` for anonymous visitors.
    fn current_identity(&self) -> Option<Identity>;
}

/// Session state that can be signed in and out at runtime.
#[derive(Debug, Default)]
pub struct Session {
    current: RwLock<Option<Identity>>,
}

impl Session {
    /// Create an anonymous session.
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Create a session already signed in as `identity`.
    pub fn signed_in(identity: Identity) -> Self {
        Self {
            current: RwLock::new(Some(identity)),
        }
    }

    /// Replace the current identity.
    pub fn sign_in(&self, identity: Identity) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        tracing::debug!(user = %identity.id, "signed in");
        *current = Some(identity);
    }

    /// Clear the current identity.
    pub fn sign_out(&self) {
        let mut current = self.current.write().unwrap_or_else(|e| e.into_inner());
        *current = None;
    }

    /// Check if someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.current_identity().is_some()
    }
}

impl IdentityProvider for Session {
    fn current_identity(&self) -> Option<Identity> {
        self.current.read().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_sign_in_out() {
        let session = Session::anonymous();
        assert!(session.current_identity().is_none());

        session.sign_in(Identity::new("user-1", "seller@example.com"));
        assert_eq!(
            session.current_identity().map(|i| i.id),
            Some(UserId::new("user-1"))
        );

        session.sign_out();
        assert!(!session.is_authenticated());
    }
}
