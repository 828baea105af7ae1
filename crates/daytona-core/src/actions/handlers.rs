use super::{ActionContext, ActionHandler, ActionOutcome};
use crate::errors::ActionError;
use crate::persist::{framework, test};
use crate::request::{
    self, DeleteFrameworkRequest, DeleteTestRequest, DeleteTestsRequest, SaveFrameworkRequest,
    SaveTestRequest, SetUserFrameworksRequest,
};
use serde_json::Value;

pub(super) struct SaveFramework;

impl ActionHandler for SaveFramework {
    fn execute(&self, ctx: &ActionContext<'_>, params: &Value) -> Result<ActionOutcome, ActionError> {
        let req: SaveFrameworkRequest = request::parse(params)?;
        framework::save(ctx.store, ctx.caller, &req).map(ActionOutcome::Framework)
    }
}

pub(super) struct DeleteFramework;

impl ActionHandler for DeleteFramework {
    fn execute(&self, ctx: &ActionContext<'_>, params: &Value) -> Result<ActionOutcome, ActionError> {
        let req: DeleteFrameworkRequest = request::parse(params)?;
        framework::delete(ctx.store, ctx.caller, ctx.log_dirs, &req).map(ActionOutcome::Framework)
    }
}

/// `save_test` and `save_run_test` differ only in `run`.
pub(super) struct SaveTest {
    pub(super) run: bool,
}

impl ActionHandler for SaveTest {
    fn execute(&self, ctx: &ActionContext<'_>, params: &Value) -> Result<ActionOutcome, ActionError> {
        let req: SaveTestRequest = request::parse(params)?;
        test::save(ctx.store, ctx.caller, &req, self.run).map(ActionOutcome::Test)
    }
}

pub(super) struct DeleteTest;

impl ActionHandler for DeleteTest {
    fn execute(&self, ctx: &ActionContext<'_>, params: &Value) -> Result<ActionOutcome, ActionError> {
        let req: DeleteTestRequest = request::parse(params)?;
        test::delete(ctx.store, ctx.caller, ctx.log_dirs, &req).map(ActionOutcome::Test)
    }
}

pub(super) struct DeleteTests;

impl ActionHandler for DeleteTests {
    fn execute(&self, ctx: &ActionContext<'_>, params: &Value) -> Result<ActionOutcome, ActionError> {
        let req: DeleteTestsRequest = request::parse(params)?;
        test::delete_many(ctx.store, ctx.caller, ctx.log_dirs, &req).map(ActionOutcome::Tests)
    }
}

pub(super) struct SetUserFrameworks;

impl ActionHandler for SetUserFrameworks {
    fn execute(&self, ctx: &ActionContext<'_>, params: &Value) -> Result<ActionOutcome, ActionError> {
        let req: SetUserFrameworksRequest = request::parse(params)?;
        framework::set_user_frameworks(ctx.store, ctx.caller, &req).map(ActionOutcome::Frameworks)
    }
}
