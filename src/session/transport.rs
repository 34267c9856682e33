//! The transport collaborator
//!
//! A transport owns the actual connection to a server. Operations hand it fully-formed
//! wire commands; when a command completes, the transport stores the outcome (read back with
//! [`Transport::result`]) and its owner calls [`Executor::response_received`](super::Executor::response_received).
// (c) 2026 the xfer-engine developers

use std::time::Duration;

use crate::cache::DirEntry;
use crate::protocol::reply::Reply;
use crate::protocol::server::{Credentials, Server};

/// Details of a transfer about to start, for the transport's benefit
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TransferInfo {
    /// Direction
    pub download: bool,
    /// Remote file name, as it will appear in the wire command (before quoting)
    pub remote: String,
    /// Local source or sink name
    pub local: String,
    /// Size of the local source, for uploads, if known
    pub size: Option<u64>,
    /// Free-form extra flags from the command
    pub extra_flags: String,
    /// Opaque resume state from the command
    pub persistent_state: Vec<u8>,
}

/// The connection to a server, as seen by operations.
///
/// Methods which start I/O return [`Reply::WOULDBLOCK`] once the I/O is under way,
/// or an error code if it could not be started.
pub trait Transport: Send {
    /// Sends a wire command
    fn send_command(&mut self, command: &str) -> Reply;

    /// Quotes a file name for safe embedding in a wire command
    fn quote_filename(&self, name: &str) -> String;

    /// The outcome of the most recently completed command
    fn result(&self) -> Reply;

    /// Starts connecting to a server
    fn connect(&mut self, server: &Server, credentials: &Credentials) -> Reply;

    /// Closes the connection
    fn disconnect(&mut self) -> Reply;

    /// Arranges for a completion after the given delay, with a result of [`Reply::OK`]
    fn schedule_wakeup(&mut self, after: Duration) -> Reply;

    /// Takes the directory entries received by the most recent listing command, if any
    fn take_listing(&mut self) -> Option<Vec<DirEntry>> {
        None
    }

    /// Tells the transport about a transfer whose wire command is about to be sent
    fn announce_transfer(&mut self, _info: &TransferInfo) {}

    /// Abandons any outstanding I/O
    fn abort(&mut self) {}
}
