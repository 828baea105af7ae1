use crate::model::EntityKind;
use thiserror::Error;

/// Stable machine-readable codes, one per error family.
pub mod codes {
    pub const E_VALIDATION: &str = "E_VALIDATION";
    pub const E_UNAUTHORIZED: &str = "E_UNAUTHORIZED";
    pub const E_NOT_FOUND: &str = "E_NOT_FOUND";
    pub const E_DUPLICATE_NAME: &str = "E_DUPLICATE_NAME";
    pub const E_STORE: &str = "E_STORE";
}

/// Request problems detected before any row is written.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No action defined")]
    MissingAction,

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("No User defined")]
    MissingCaller,

    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    #[error("malformed request: {0}")]
    Malformed(String),

    #[error("Spaces are not allowed in framework name '{0}'. Remove spaces")]
    InvalidName(String),

    #[error("Execution script '{0}' should contain <folder_name>/<script_name>")]
    InvalidPath(String),

    #[error("Some values missing for {profiler} configuration: '{field}' is required")]
    MissingConfigField {
        profiler: &'static str,
        field: &'static str,
    },

    #[error("test {test_id} belongs to framework {stored}, cannot move it to framework {requested}")]
    FrameworkChanged {
        test_id: i64,
        stored: i64,
        requested: i64,
    },

    #[error("argument {argument_id} does not belong to framework {framework_id}")]
    ForeignArgument { argument_id: i64, framework_id: i64 },

    #[error("argument {0} appears more than once")]
    DuplicateArgument(i64),

    #[error("{0}")]
    Empty(&'static str),
}

/// Everything an action can fail with. Each variant aborts the action with no partial effect.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("You are not an administrator or the {entity} owner ({owner})")]
    Unauthorized { entity: EntityKind, owner: String },

    #[error("Could not find {entity} ID: {id}")]
    NotFound { entity: EntityKind, id: i64 },

    #[error("Framework '{0}' already exists.")]
    DuplicateName(String),

    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),
}

impl ActionError {
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::Validation(_) => codes::E_VALIDATION,
            ActionError::Unauthorized { .. } => codes::E_UNAUTHORIZED,
            ActionError::NotFound { .. } => codes::E_NOT_FOUND,
            ActionError::DuplicateName(_) => codes::E_DUPLICATE_NAME,
            ActionError::Store(_) => codes::E_STORE,
        }
    }

    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        ActionError::NotFound { entity, id }
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
pub struct ConfigError(pub String);
