use serde::Serialize;

use super::AuthError;

/// The authenticated caller behind a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

/// Per-request identity. Derived only from a verified credential, never from
/// request parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Identity {
    #[default]
    Anonymous,
    User(AuthUser),
}

impl Identity {
    pub fn require(&self) -> Result<&AuthUser, AuthError> {
        match self {
            Identity::User(user) => Ok(user),
            Identity::Anonymous => Err(AuthError::Anonymous),
        }
    }

    pub fn user_id(&self) -> Option<i64> {
        match self {
            Identity::User(user) => Some(user.id),
            Identity::Anonymous => None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Identity::Anonymous)
    }
}
