use std::sync::RwLock;

use quiz_core::model::UserId;

/// Snapshot from the identity provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<UserId>,
    pub is_loading: bool,
}

impl AuthState {
    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        Self {
            user: Some(user),
            is_loading: false,
        }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// The signed-in user, treating a still-loading session as anonymous.
    #[must_use]
    pub fn user(&self) -> Option<UserId> {
        if self.is_loading { None } else { self.user }
    }
}

/// Read-only oracle answering "who is signed in right now".
pub trait AuthProvider: Send + Sync {
    fn state(&self) -> AuthState;
}

/// Auth state held in process; sign-in flows live outside this crate.
#[derive(Debug, Default)]
pub struct LocalAuth {
    state: RwLock<AuthState>,
}

impl LocalAuth {
    #[must_use]
    pub fn new(state: AuthState) -> Self {
        Self {
            state: RwLock::new(state),
        }
    }

    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        Self::new(AuthState::signed_in(user))
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self::new(AuthState::anonymous())
    }

    pub fn set(&self, state: AuthState) {
        match self.state.write() {
            Ok(mut guard) => *guard = state,
            Err(poisoned) => *poisoned.into_inner() = state,
        }
    }
}

impl AuthProvider for LocalAuth {
    fn state(&self) -> AuthState {
        match self.state.read() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loading_state_has_no_user() {
        let state = AuthState {
            user: Some(UserId::random()),
            is_loading: true,
        };
        assert_eq!(state.user(), None);
    }

    #[test]
    fn local_auth_can_switch_users() {
        let auth = LocalAuth::anonymous();
        assert_eq!(auth.state().user(), None);

        let user = UserId::random();
        auth.set(AuthState::signed_in(user));
        assert_eq!(auth.state().user(), Some(user));
    }
}
