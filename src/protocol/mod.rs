//! Commands, reply codes and the value types they are built from
//!
//! Nothing in this module performs I/O or holds execution state;
//! see [`session`](crate::session) for that.
// (c) 2026 the xfer-engine developers

pub mod command;
pub mod data;
pub mod flags;
pub mod path;
pub mod reply;
pub mod server;

pub use command::{
    ChmodArgs, Command, CommandId, ConnectArgs, DeleteArgs, HttpRequestArgs, ListArgs, MkdirArgs,
    RawArgs, RemoveDirArgs, RenameArgs, TransferArgs, TransferData,
};
pub use data::{
    DataChannel, DataSink, DataSource, FileSink, FileSource, MemorySink, MemorySource,
    SharedBuffer,
};
pub use flags::{ListFlags, TransferFlags};
pub use path::ServerPath;
pub use reply::Reply;
pub use server::{Credentials, LogonType, Protocol, Server, ServerHandle};
