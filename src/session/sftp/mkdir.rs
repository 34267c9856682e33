//! Create directory
// (c) 2026 the xfer-engine developers

use tracing::info;

use crate::cache::Freshness;
use crate::protocol::command::{CommandId, MkdirArgs};
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, unexpected_event};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Init,
    Mkdir,
    Waiting,
}

/// Creates a directory, always by absolute path
#[derive(Debug)]
pub(crate) struct MkdirOp {
    args: MkdirArgs,
    state: State,
}

impl MkdirOp {
    pub(crate) fn new(args: MkdirArgs) -> Self {
        Self {
            args,
            state: State::Init,
        }
    }

    fn mark_cache(&self, ctx: &OpContext<'_>, freshness: Freshness) {
        let path = self.args.path();
        if let (Some(server), Some(parent), Some(name)) =
            (ctx.server(), path.parent(), path.last_segment())
        {
            let _ = ctx
                .cache
                .update_file(server, &parent, name, true, freshness);
        }
    }
}

impl Operation for MkdirOp {
    fn id(&self) -> CommandId {
        CommandId::Mkdir
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Init => {
                info!("Creating directory '{}'", self.args.path());
                self.state = State::Mkdir;
                Reply::CONTINUE
            }
            State::Mkdir => {
                self.mark_cache(ctx, Freshness::Unknown);
                self.state = State::Waiting;
                let quoted = ctx.transport.quote_filename(&self.args.path().to_string());
                ctx.transport.send_command(&format!("mkdir {quoted}"))
            }
            State::Waiting => unexpected_event(self, "send"),
        }
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Waiting => ctx.transport.result(),
            State::Init | State::Mkdir => unexpected_event(self, "response"),
        }
    }

    fn cancel(&mut self, ctx: &mut OpContext<'_>) {
        if self.state == State::Waiting {
            self.mark_cache(ctx, Freshness::Unsure);
        }
    }
}
