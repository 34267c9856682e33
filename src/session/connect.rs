//! Connect and disconnect, common to all protocols
// (c) 2026 the xfer-engine developers

use tracing::{debug, info, warn};

use super::{OpContext, Operation, unexpected_event};
use crate::protocol::command::{CommandId, ConnectArgs};
use crate::protocol::reply::Reply;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Connect,
    Connecting,
    RetryWait,
}

/// Establishes the connection, retrying if the command asks for it
#[derive(Debug)]
pub(crate) struct ConnectOp {
    args: ConnectArgs,
    state: State,
    attempts: u32,
}

impl ConnectOp {
    pub(crate) fn new(args: ConnectArgs) -> Self {
        Self {
            args,
            state: State::Connect,
            attempts: 0,
        }
    }
}

impl Operation for ConnectOp {
    fn id(&self) -> CommandId {
        CommandId::Connect
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.state != State::Connect {
            return unexpected_event(self, "send");
        }
        info!("Connecting to {}", self.args.server());
        ctx.state.server = Some(self.args.handle().clone());
        ctx.state.connected = false;
        ctx.state.current_path = None;
        self.attempts += 1;
        self.state = State::Connecting;
        ctx.transport
            .connect(self.args.server(), self.args.credentials())
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.state != State::Connecting {
            return unexpected_event(self, "response");
        }
        let result = ctx.transport.result();
        if result == Reply::OK {
            info!("Connected to {}", self.args.server());
            ctx.state.connected = true;
            return Reply::OK;
        }
        if result.contains(Reply::PASSWORDFAILED) {
            warn!("Authentication failed");
            return Reply::CRITICALERROR | Reply::PASSWORDFAILED;
        }
        if result.is_critical()
            || !self.args.retry_connecting()
            || self.attempts > ctx.config.connect_retries
        {
            return result;
        }
        let delay = ctx.config.retry_delay_duration();
        warn!(
            "Connection attempt {} failed ({result}), retrying in {delay:?}",
            self.attempts
        );
        self.state = State::RetryWait;
        ctx.sleep(delay);
        Reply::CONTINUE
    }

    fn subcommand_result(
        &mut self,
        prev: Reply,
        prev_op: &dyn Operation,
        _ctx: &mut OpContext<'_>,
    ) -> Reply {
        if self.state != State::RetryWait || prev_op.id() != CommandId::Sleep {
            return unexpected_event(self, "subcommand result");
        }
        if prev != Reply::OK {
            debug!("retry wait failed: {prev}");
            return prev;
        }
        self.state = State::Connect;
        Reply::CONTINUE
    }
}

/// Closes the connection
#[derive(Debug, Default)]
pub(crate) struct DisconnectOp {
    waiting: bool,
}

impl Operation for DisconnectOp {
    fn id(&self) -> CommandId {
        CommandId::Disconnect
    }

    fn state_name(&self) -> &'static str {
        if self.waiting { "waiting" } else { "disconnect" }
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if self.waiting {
            return unexpected_event(self, "send");
        }
        info!("Disconnecting");
        let reply = ctx.transport.disconnect();
        if reply == Reply::WOULDBLOCK {
            self.waiting = true;
            return reply;
        }
        if reply.is_error() {
            debug!("disconnect reported {reply}");
        }
        ctx.state.reset();
        Reply::OK
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        if !self.waiting {
            return unexpected_event(self, "response");
        }
        ctx.state.reset();
        Reply::OK
    }
}
