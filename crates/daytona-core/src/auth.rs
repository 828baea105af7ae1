use crate::errors::{ActionError, ValidationError};
use crate::model::EntityKind;
use serde::{Deserialize, Serialize};

/// Identity resolved by the session layer, passed into every action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub user_id: String,
    #[serde(default)]
    pub is_admin: bool,
}

impl Caller {
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: false,
        }
    }

    pub fn admin(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            is_admin: true,
        }
    }

    pub fn ensure_present(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::MissingCaller);
        }
        Ok(())
    }
}

/// Administrators act on anything; everyone else only on what they own.
pub fn authorize(caller: &Caller, owner: &str, entity: EntityKind) -> Result<(), ActionError> {
    if caller.is_admin || caller.user_id == owner {
        return Ok(());
    }
    tracing::info!(
        event = "authorization_denied",
        entity = %entity,
        caller = %caller.user_id,
        owner = %owner
    );
    Err(ActionError::Unauthorized {
        entity,
        owner: owner.to_string(),
    })
}
