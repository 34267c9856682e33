//! Change of remote working directory
// (c) 2026 the xfer-engine developers

use tracing::debug;

use crate::protocol::command::CommandId;
use crate::protocol::path::ServerPath;
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, unexpected_event};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Init,
    Cwd,
}

/// Changes the remote working directory, unless we are already there
#[derive(Debug)]
pub(crate) struct CwdOp {
    path: ServerPath,
    state: State,
}

impl CwdOp {
    pub(crate) fn new(path: ServerPath) -> Self {
        Self {
            path,
            state: State::Init,
        }
    }
}

impl Operation for CwdOp {
    fn id(&self) -> CommandId {
        CommandId::Cwd
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.state != State::Init {
            return unexpected_event(self, "send");
        }
        if self.path.is_empty() {
            debug!("no directory to change into");
            return Reply::ERROR;
        }
        if ctx.state.current_path.as_ref() == Some(&self.path) {
            debug!("already in {}", self.path);
            return Reply::OK;
        }
        // Until the server answers we don't know where we are
        ctx.state.current_path = None;
        self.state = State::Cwd;
        let quoted = ctx.transport.quote_filename(&self.path.to_string());
        ctx.transport.send_command(&format!("cd {quoted}"))
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.state != State::Cwd {
            return unexpected_event(self, "response");
        }
        let result = ctx.transport.result();
        if result == Reply::OK {
            ctx.state.current_path = Some(self.path.clone());
        }
        result
    }
}
