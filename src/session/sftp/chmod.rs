//! Change permissions
// (c) 2026 the xfer-engine developers

use tracing::{debug, info};

use super::change_dir;
use crate::cache::Freshness;
use crate::protocol::command::{ChmodArgs, CommandId};
use crate::protocol::reply::Reply;
use crate::session::{OpContext, Operation, unexpected_event};

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Init,
    WaitCwd,
    Chmod,
}

/// Changes permissions of a file or directory.
///
/// `init` → `wait_cwd` (directory change subcommand) → `chmod`.
/// If the directory change fails, the file is named by its absolute path instead.
#[derive(Debug)]
pub(crate) struct ChmodOp {
    args: ChmodArgs,
    state: State,
    use_absolute: bool,
    sent: bool,
}

impl ChmodOp {
    pub(crate) fn new(args: ChmodArgs) -> Self {
        Self {
            args,
            state: State::Init,
            use_absolute: false,
            sent: false,
        }
    }

    fn mark_cache(&self, ctx: &OpContext<'_>, freshness: Freshness) {
        if let Some(server) = ctx.server() {
            let _ = ctx.cache.update_file(
                server,
                self.args.path(),
                self.args.file(),
                false,
                freshness,
            );
        }
    }
}

impl Operation for ChmodOp {
    fn id(&self) -> CommandId {
        CommandId::Chmod
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Init => {
                info!(
                    "Setting permissions of '{}' to '{}'",
                    self.args.path().format_filename(self.args.file(), false),
                    self.args.permission()
                );
                self.state = State::WaitCwd;
                change_dir(ctx, self.args.path());
                Reply::CONTINUE
            }
            State::Chmod => {
                self.mark_cache(ctx, Freshness::Unknown);
                let name = self
                    .args
                    .path()
                    .format_filename(self.args.file(), !self.use_absolute);
                let quoted = ctx.transport.quote_filename(&name);
                self.sent = true;
                ctx.transport
                    .send_command(&format!("chmod {} {quoted}", self.args.permission()))
            }
            State::WaitCwd => unexpected_event(self, "send"),
        }
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Chmod => ctx.transport.result(),
            State::Init | State::WaitCwd => unexpected_event(self, "response"),
        }
    }

    fn subcommand_result(
        &mut self,
        prev: Reply,
        _prev_op: &dyn Operation,
        _ctx: &mut OpContext<'_>,
    ) -> Reply {
        match self.state {
            State::WaitCwd => {
                if prev != Reply::OK {
                    debug!("could not change directory ({prev}), using absolute path");
                    self.use_absolute = true;
                }
                self.state = State::Chmod;
                Reply::CONTINUE
            }
            State::Init | State::Chmod => unexpected_event(self, "subcommand result"),
        }
    }

    fn cancel(&mut self, ctx: &mut OpContext<'_>) {
        if self.sent {
            self.mark_cache(ctx, Freshness::Unsure);
        }
    }
}
