//! Named action dispatch. The action name is parsed into a closed enum and
//! mapped to a handler; everything else is rejected before any persistence.

use crate::auth::Caller;
use crate::errors::{ActionError, ValidationError};
use crate::logdir::LogDirectoryCleaner;
use crate::model::{DeletedTest, FrameworkSummary, FrameworkVisibility, TestSummary};
use crate::storage::Store;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Instant;

mod handlers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    SaveFramework,
    DeleteFramework,
    SaveTest,
    SaveRunTest,
    DeleteTest,
    DeleteTests,
    SetUserFrameworks,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::SaveFramework,
        Action::DeleteFramework,
        Action::SaveTest,
        Action::SaveRunTest,
        Action::DeleteTest,
        Action::DeleteTests,
        Action::SetUserFrameworks,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::SaveFramework => "save_framework",
            Action::DeleteFramework => "delete_framework",
            Action::SaveTest => "save_test",
            Action::SaveRunTest => "save_run_test",
            Action::DeleteTest => "delete_test",
            Action::DeleteTests => "delete_tests",
            Action::SetUserFrameworks => "set_user_frameworks",
        }
    }

    fn handler(&self) -> &'static dyn ActionHandler {
        match self {
            Action::SaveFramework => &handlers::SaveFramework,
            Action::DeleteFramework => &handlers::DeleteFramework,
            Action::SaveTest => &handlers::SaveTest { run: false },
            Action::SaveRunTest => &handlers::SaveTest { run: true },
            Action::DeleteTest => &handlers::DeleteTest,
            Action::DeleteTests => &handlers::DeleteTests,
            Action::SetUserFrameworks => &handlers::SetUserFrameworks,
        }
    }
}

impl FromStr for Action {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingAction);
        }
        Action::ALL
            .into_iter()
            .find(|a| a.as_str() == name)
            .ok_or_else(|| ValidationError::UnknownAction(name.to_string()))
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a handler needs to run one action.
pub struct ActionContext<'a> {
    pub store: &'a Store,
    pub caller: &'a Caller,
    pub log_dirs: &'a dyn LogDirectoryCleaner,
}

pub trait ActionHandler: Sync {
    fn execute(&self, ctx: &ActionContext<'_>, params: &Value) -> Result<ActionOutcome, ActionError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionOutcome {
    Framework(FrameworkSummary),
    Test(TestSummary),
    Tests(Vec<DeletedTest>),
    Frameworks(Vec<FrameworkVisibility>),
}

#[derive(Clone)]
pub struct Dispatcher {
    store: Store,
    log_dirs: Arc<dyn LogDirectoryCleaner>,
}

impl Dispatcher {
    pub fn new(store: Store, log_dirs: Arc<dyn LogDirectoryCleaner>) -> Self {
        Self { store, log_dirs }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn dispatch(
        &self,
        caller: &Caller,
        action: Option<&str>,
        params: &Value,
    ) -> Result<ActionOutcome, ActionError> {
        let action: Action = action.ok_or(ValidationError::MissingAction)?.parse()?;
        caller.ensure_present()?;

        let ctx = ActionContext {
            store: &self.store,
            caller,
            log_dirs: self.log_dirs.as_ref(),
        };
        let started = Instant::now();
        let result = action.handler().execute(&ctx, params);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(_) => tracing::info!(
                event = "action_completed",
                action = action.as_str(),
                user = %caller.user_id,
                elapsed_ms
            ),
            Err(e) => tracing::warn!(
                event = "action_failed",
                action = action.as_str(),
                user = %caller.user_id,
                code = e.code(),
                error = %e,
                elapsed_ms
            ),
        }
        result
    }
}
