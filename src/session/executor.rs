//! The single point of re-entry for operations
// (c) 2026 the xfer-engine developers

use std::sync::Arc;

use tracing::{Span, debug, error, info, trace, trace_span, warn};

use super::{OpContext, Operation, SessionState, Transport, factory};
use crate::cache::DirectoryCache;
use crate::config::Configuration;
use crate::protocol::command::{Command, CommandId};
use crate::protocol::data::DataChannel;
use crate::protocol::path::ServerPath;
use crate::protocol::reply::Reply;

/// What the top operation on the stack is being told
enum Event {
    Send,
    Response,
    SubcommandDone(Reply, Box<dyn Operation>),
}

/// Executes commands, one at a time, over a [`Transport`].
///
/// The executor owns a stack of operations: the command's own operation at the bottom,
/// with any subcommands it requested above it. Only the top of the stack is ever driven.
///
/// Calls which start or resume execution return either [`Reply::WOULDBLOCK`], meaning the
/// transport has I/O outstanding and [`Executor::response_received`] should be called when it
/// completes, or the command's terminal reply.
pub struct Executor<T: Transport> {
    transport: T,
    cache: Arc<dyn DirectoryCache>,
    config: Configuration,
    state: SessionState,
    stack: Vec<Box<dyn Operation>>,
    span: Span,
}

impl<T: Transport + std::fmt::Debug> std::fmt::Debug for Executor<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("transport", &self.transport)
            .field("state", &self.state)
            .field(
                "stack",
                &self.stack.iter().map(|op| op.id()).collect::<Vec<_>>(),
            )
            .finish_non_exhaustive()
    }
}

impl<T: Transport> Executor<T> {
    /// Constructor
    pub fn new(transport: T, cache: Arc<dyn DirectoryCache>, config: Configuration) -> Self {
        Self {
            transport,
            cache,
            config,
            state: SessionState::default(),
            stack: Vec::new(),
            span: Span::none(),
        }
    }

    /// Accessor
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Mutable accessor
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Accessor
    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Mutable accessor. Changes take effect from the next step.
    pub fn config_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    /// Connection state
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Is a command in progress?
    pub fn is_busy(&self) -> bool {
        !self.stack.is_empty()
    }

    /// Is there an established connection?
    pub fn is_connected(&self) -> bool {
        self.state.connected
    }

    /// The remote working directory, if known
    pub fn current_path(&self) -> Option<&ServerPath> {
        self.state.current_path.as_ref()
    }

    /// The transport, and the local end of the running transfer if there is one.
    ///
    /// This is what a driver needs to perform outstanding I/O.
    pub fn wait_parts(&mut self) -> (&mut T, Option<&mut DataChannel>) {
        let data = self.stack.last_mut().and_then(|op| op.data_channel());
        (&mut self.transport, data)
    }

    /// Starts executing a command
    pub fn execute(&mut self, command: Command) -> Reply {
        if self.is_busy() {
            warn!("cannot start {command}: another command is in progress");
            return Reply::BUSY;
        }
        if !command.valid() {
            debug!("rejecting invalid {command} command '{}'", command.primary_arg());
            return Reply::SYNTAXERROR;
        }
        let protocol = match (&command, &self.state.server) {
            (Command::Connect(args), _) => {
                if self.state.connected {
                    return Reply::ALREADYCONNECTED;
                }
                args.server().protocol
            }
            (_, Some(handle)) if self.state.connected => handle.server().protocol,
            _ => return Reply::NOTCONNECTED,
        };
        let Some((op, info)) = factory::operation_for(command, protocol) else {
            debug!("command not supported by {protocol}");
            return Reply::NOTSUPPORTED;
        };
        self.span = trace_span!("CMD", name = info.name, arg = info.primary_arg);
        self.stack.push(op);
        self.drive(Event::Send)
    }

    /// Resumes the current operation once the transport's outstanding I/O has completed
    pub fn response_received(&mut self) -> Reply {
        if !self.is_busy() {
            debug!("response received with no command in progress");
            return Reply::INTERNALERROR;
        }
        self.drive(Event::Response)
    }

    /// Abandons the current command, if any.
    ///
    /// Returns [`Reply::CANCELED`], or [`Reply::OK`] if there was nothing to cancel.
    pub fn cancel(&mut self) -> Reply {
        if !self.is_busy() {
            return Reply::OK;
        }
        let span = self.span.clone();
        let _e = span.enter();
        info!("Command canceled");
        self.abandon();
        self.transport.abort();
        Reply::CANCELED
    }

    /// Informs the executor that the connection has gone away
    pub fn connection_lost(&mut self) -> Reply {
        let busy = self.is_busy();
        if busy {
            warn!("connection lost while a command was in progress");
            self.abandon();
        }
        self.state.reset();
        if busy {
            Reply::ERROR | Reply::DISCONNECTED
        } else {
            Reply::DISCONNECTED
        }
    }

    /// Cancels every operation on the stack, top first, and drops them
    fn abandon(&mut self) {
        let bottom = self.stack.first().map(|op| op.id());
        while let Some(mut op) = self.stack.pop() {
            let mut ctx = OpContext::new(
                &mut self.transport,
                &*self.cache,
                &self.config,
                &mut self.state,
            );
            op.cancel(&mut ctx);
        }
        if bottom == Some(CommandId::Connect) {
            self.state.reset();
        }
    }

    /// Runs the state machine until it waits for the transport or produces a terminal reply
    fn drive(&mut self, first: Event) -> Reply {
        let span = self.span.clone();
        let _e = span.enter();

        let mut event = first;
        let mut continues = 0u32;
        loop {
            let Some(op) = self.stack.last_mut() else {
                error!("no operation to drive");
                return Reply::INTERNALERROR;
            };
            let mut ctx = OpContext::new(
                &mut self.transport,
                &*self.cache,
                &self.config,
                &mut self.state,
            );
            let reply = match event {
                Event::Send => op.send(&mut ctx),
                Event::Response => op.parse_response(&mut ctx),
                Event::SubcommandDone(prev, prev_op) => {
                    op.subcommand_result(prev, prev_op.as_ref(), &mut ctx)
                }
            };
            let subcommand = ctx.take_subcommand();
            trace!("{} -> {} ({reply})", op.id(), op.state_name());

            if reply == Reply::CONTINUE {
                continues += 1;
                if continues > self.config.max_continue {
                    error!(
                        "{} continued {continues} times without waiting, giving up",
                        op.id()
                    );
                    self.abandon();
                    return Reply::INTERNALERROR;
                }
                if let Some(sub) = subcommand {
                    trace!("starting subcommand {}", sub.id());
                    self.stack.push(sub);
                }
                event = Event::Send;
                continue;
            }

            if let Some(sub) = subcommand {
                error!(
                    "{} requested subcommand {} but returned {reply}",
                    op.id(),
                    sub.id()
                );
                self.abandon();
                return Reply::INTERNALERROR;
            }
            if reply == Reply::WOULDBLOCK {
                return reply;
            }

            // Terminal reply for the top operation
            let Some(finished) = self.stack.pop() else {
                return Reply::INTERNALERROR;
            };
            if self.stack.is_empty() {
                self.finish(finished.id(), reply);
                return reply;
            }
            trace!("subcommand {} finished: {reply}", finished.id());
            event = Event::SubcommandDone(reply, finished);
        }
    }

    /// Bookkeeping when a top-level command ends
    fn finish(&mut self, id: CommandId, reply: Reply) {
        match id {
            CommandId::Connect if reply != Reply::OK => self.state.reset(),
            CommandId::Disconnect => self.state.reset(),
            _ => (),
        }
        if reply.is_error() {
            debug!("{id} failed: {reply}");
        } else {
            debug!("{id} finished: {reply}");
        }
    }
}
