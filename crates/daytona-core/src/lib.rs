pub mod actions;
pub mod auth;
pub mod config;
pub mod errors;
pub mod hosts;
pub mod logdir;
pub mod model;
pub mod persist;
pub mod profiler;
pub mod reconcile;
pub mod request;
pub mod storage;
pub mod validate;

pub use actions::{Action, ActionContext, ActionOutcome, Dispatcher};
pub use auth::Caller;
pub use errors::{ActionError, ValidationError};
pub use storage::Store;
