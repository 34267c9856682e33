// (c) 2026 the xfer-engine developers

#![allow(clippy::doc_markdown)]
//! `xfer-engine` is the command execution core of a multi-protocol file transfer client.
//!
//! It turns a high-level intent ("list this directory", "change permissions of this file",
//! "transfer this file") into a sequence of protocol-specific wire exchanges, tracks progress
//! through that sequence as an explicit state machine, and reports a [`Reply`] back to the caller.
//!
//! ## Overview
//!
//! * [`Command`] is an immutable description of one requested remote operation.
//!   Commands are checked with [`Command::valid`] before anything runs.
//! * [`Reply`] is a bit-set outcome. Every error-class code carries [`Reply::ERROR`], so
//!   a single mask test separates success from failure.
//! * Each command kind is executed by an [`Operation`](session::Operation): a small state
//!   machine with three entry points (`send`, `parse_response`, `subcommand_result`) driven by
//!   the [`Executor`].
//! * The [`Transport`] is the caller's control socket. It puts wire commands on the network
//!   and reports back when they complete; the engine never blocks waiting for it.
//! * Mutating operations keep a [`DirectoryCache`] consistent, marking entries they touch as
//!   stale before the wire command goes out.
//!
//! ## Driving the engine
//!
//! The [`Executor`] is callback driven. [`Executor::execute`] returns [`Reply::WOULDBLOCK`]
//! while the transport has I/O outstanding; the transport calls
//! [`Executor::response_received`] when it finishes.
//! [`Session`] wraps this in an async loop for tokio-based transports.
//!
//! ```ignore
//! let cache = Arc::new(MemoryDirectoryCache::new());
//! let mut exec = Executor::new(my_transport, cache, Configuration::system_default().clone());
//! let reply = exec.execute(Command::Chmod(ChmodArgs::new(
//!     ServerPath::new("/home/user"), "a.txt", "755",
//! )));
//! ```
//!
//! ## Configuration and logging
//!
//! See [`config`] for the configuration sources and [`util::setup_tracing`] for log output.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod cache;
pub use cache::{DirectoryCache, Freshness, MemoryDirectoryCache};

pub mod config;
pub use config::structure::Configuration;

pub mod protocol;
pub use protocol::{
    command::{Command, CommandId},
    path::ServerPath,
    reply::Reply,
};

pub mod session;
pub use session::{Executor, Session, transport::Transport};

pub mod util;
