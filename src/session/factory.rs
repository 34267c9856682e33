//! Factory function for creating operations
// (c) 2026 the xfer-engine developers

use super::Operation;
use super::connect::{ConnectOp, DisconnectOp};
use super::sftp::{
    ChmodOp, DeleteOp, ListOp, MkdirOp, RawOp, RemoveDirOp, RenameOp, TransferOp,
};
use crate::protocol::command::Command;
use crate::protocol::server::Protocol;

/// Span information for a command (used for tracing)
#[derive(Debug)]
pub(crate) struct SpanInfo {
    pub name: &'static str,
    pub primary_arg: String,
}

/// Creates the operation which executes `command` over `protocol`.
///
/// Returns `None` if the protocol has no implementation of the command.
pub(crate) fn operation_for(
    command: Command,
    protocol: Protocol,
) -> Option<(Box<dyn Operation>, SpanInfo)> {
    let span_info = SpanInfo {
        name: span_name(&command),
        primary_arg: command.primary_arg(),
    };
    let op: Box<dyn Operation> = match (command, protocol) {
        (Command::Connect(args), _) => Box::new(ConnectOp::new(args)),
        (Command::Disconnect, _) => Box::<DisconnectOp>::default(),
        (Command::List(args), Protocol::Sftp) => Box::new(ListOp::new(args)),
        (Command::Transfer(args), Protocol::Sftp) => Box::new(TransferOp::new(args)),
        (Command::Delete(args), Protocol::Sftp) => Box::new(DeleteOp::new(args)),
        (Command::RemoveDir(args), Protocol::Sftp) => Box::new(RemoveDirOp::new(args)),
        (Command::Mkdir(args), Protocol::Sftp) => Box::new(MkdirOp::new(args)),
        (Command::Rename(args), Protocol::Sftp) => Box::new(RenameOp::new(args)),
        (Command::Chmod(args), Protocol::Sftp) => Box::new(ChmodOp::new(args)),
        (Command::Raw(args), Protocol::Sftp) => Box::new(RawOp::new(args)),
        _ => return None,
    };
    Some((op, span_info))
}

fn span_name(command: &Command) -> &'static str {
    match command {
        Command::Connect(_) => "CONNECT",
        Command::Disconnect => "DISCONNECT",
        Command::List(_) => "LIST",
        Command::Transfer(a) if a.download() => "GET",
        Command::Transfer(_) => "PUT",
        Command::Delete(_) => "DELETE",
        Command::RemoveDir(_) => "RMDIR",
        Command::Mkdir(_) => "MKDIR",
        Command::Rename(_) => "RENAME",
        Command::Chmod(_) => "CHMOD",
        Command::Raw(_) => "RAW",
        Command::HttpRequest(_) => "HTTP",
    }
}
