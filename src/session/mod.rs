//! Command execution
//!
//! Each [`Command`](crate::Command) is executed by an [`Operation`]: a small state machine
//! holding the command's parameters, an enumerated state and whatever scratch fields it needs
//! between steps. The [`Executor`] drives operations through three entry points:
//!
//! * [`Operation::send`] performs the side effect for the current state. That may be logging,
//!   requesting a subcommand (for example a directory change), or handing a wire command to
//!   the [`Transport`].
//! * [`Operation::parse_response`] is called when the transport's wire command has completed.
//! * [`Operation::subcommand_result`] is called when a subcommand this operation asked for
//!   has finished.
//!
//! Each returns a [`Reply`]. [`Reply::CONTINUE`] means "call `send` again now";
//! [`Reply::WOULDBLOCK`] means "wait for the transport"; anything else is the outcome.
//! Subcommands are themselves operations, stacked above their parent.
//!
//! [`Session`] wraps an executor in an async driver.
// (c) 2026 the xfer-engine developers

mod connect;
mod driver;
mod executor;
mod factory;
pub mod sftp;
mod sleep;
pub mod transport;


pub use driver::{AsyncTransport, Session};
pub use executor::Executor;
pub use transport::{TransferInfo, Transport};

use std::time::Duration;

use tracing::error;

use crate::cache::DirectoryCache;
use crate::config::Configuration;
use crate::protocol::command::CommandId;
use crate::protocol::data::DataChannel;
use crate::protocol::path::ServerPath;
use crate::protocol::reply::Reply;
use crate::protocol::server::{Server, ServerHandle};

/// Per-connection state shared by all operations on it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    /// The server we are connected (or connecting) to
    pub server: Option<ServerHandle>,
    /// Has a connection been established?
    pub connected: bool,
    /// The remote working directory, if known
    pub current_path: Option<ServerPath>,
}

impl SessionState {
    /// Forgets everything about the connection
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// What an operation may touch while it runs one step
pub struct OpContext<'a> {
    /// The connection
    pub transport: &'a mut dyn Transport,
    /// The directory cache
    pub cache: &'a dyn DirectoryCache,
    /// Run-time configuration
    pub config: &'a Configuration,
    /// Connection state
    pub state: &'a mut SessionState,
    subcommand: Option<Box<dyn Operation>>,
}

impl<'a> OpContext<'a> {
    /// Constructor
    pub fn new(
        transport: &'a mut dyn Transport,
        cache: &'a dyn DirectoryCache,
        config: &'a Configuration,
        state: &'a mut SessionState,
    ) -> Self {
        Self {
            transport,
            cache,
            config,
            state,
            subcommand: None,
        }
    }

    /// The server this session belongs to, for cache keys
    #[must_use]
    pub fn server(&self) -> Option<&Server> {
        self.state.server.as_ref().map(ServerHandle::server)
    }

    /// Asks the executor to run `op` before resuming the current operation.
    ///
    /// The request takes effect when the current step returns [`Reply::CONTINUE`];
    /// the current operation then receives [`Operation::subcommand_result`] when `op` finishes.
    pub fn push_subcommand(&mut self, op: Box<dyn Operation>) {
        if let Some(old) = self.subcommand.replace(op) {
            error!("subcommand {} replaced before it ran", old.id());
        }
    }

    /// Requests a wait of the given duration as a subcommand
    pub fn sleep(&mut self, duration: Duration) {
        self.push_subcommand(Box::new(sleep::SleepOp::new(duration)));
    }

    /// Takes the pending subcommand request, if any
    pub(crate) fn take_subcommand(&mut self) -> Option<Box<dyn Operation>> {
        self.subcommand.take()
    }
}

impl std::fmt::Debug for OpContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpContext")
            .field("state", &self.state)
            .field("subcommand", &self.subcommand.as_ref().map(|op| op.id()))
            .finish_non_exhaustive()
    }
}

/// The execution state machine for one command.
///
/// An operation is created when the executor starts a command and dropped when it produces
/// a terminal reply or is canceled. It is never reused.
pub trait Operation: Send {
    /// The kind of operation
    fn id(&self) -> CommandId;

    /// The name of the current state, for log messages
    fn state_name(&self) -> &'static str;

    /// Performs the side effect appropriate to the current state
    fn send(&mut self, ctx: &mut OpContext<'_>) -> Reply;

    /// Handles completion of the wire command this operation sent
    fn parse_response(&mut self, ctx: &mut OpContext<'_>) -> Reply;

    /// Handles completion of a subcommand this operation requested
    fn subcommand_result(
        &mut self,
        prev: Reply,
        prev_op: &dyn Operation,
        _ctx: &mut OpContext<'_>,
    ) -> Reply {
        error!(
            "{} in state {} received unexpected subcommand result {prev} from {}",
            self.id(),
            self.state_name(),
            prev_op.id()
        );
        Reply::INTERNALERROR
    }

    /// Called when the operation is abandoned before reaching a terminal reply.
    ///
    /// Mutating operations use this to downgrade cache entries whose fate is now unknown.
    fn cancel(&mut self, _ctx: &mut OpContext<'_>) {}

    /// The local end of a running transfer, if this operation owns one
    fn data_channel(&mut self) -> Option<&mut DataChannel> {
        None
    }
}

/// Logs an event which the operation's current state has no handling for
pub(crate) fn unexpected_event(op: &dyn Operation, event: &str) -> Reply {
    error!(
        "{} received {event} in state {}, which does not expect it",
        op.id(),
        op.state_name()
    );
    Reply::INTERNALERROR
}
