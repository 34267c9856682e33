//! Internal wait operation
// (c) 2026 the xfer-engine developers

use std::time::Duration;

use tracing::debug;

use super::{OpContext, Operation, unexpected_event};
use crate::protocol::command::CommandId;
use crate::protocol::reply::Reply;

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum_macros::IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
enum State {
    Sleep,
    Waiting,
}

/// Waits for a while, using the transport's timer
#[derive(Debug)]
pub(crate) struct SleepOp {
    duration: Duration,
    state: State,
}

impl SleepOp {
    pub(crate) fn new(duration: Duration) -> Self {
        Self {
            duration,
            state: State::Sleep,
        }
    }
}

impl Operation for SleepOp {
    fn id(&self) -> CommandId {
        CommandId::Sleep
    }

    fn state_name(&self) -> &'static str {
        self.state.into()
    }

    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Sleep => {
                debug!("sleeping for {:?}", self.duration);
                self.state = State::Waiting;
                ctx.transport.schedule_wakeup(self.duration)
            }
            State::Waiting => unexpected_event(self, "send"),
        }
    }

    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply {
        match self.state {
            State::Waiting => ctx.transport.result(),
            State::Sleep => unexpected_event(self, "response"),
        }
    }
}
