//! User-requested operations
//!
//! A [`Command`] is an immutable description of one remote operation and its parameters.
//! It carries no execution state; that lives in the [`Operation`](crate::session::Operation)
//! which processes it.
//!
//! Arguments are constructed once and read through accessors. Cloning a command produces an
//! independent value.
// (c) 2026 the xfer-engine developers

use super::data::{DataSink, DataSource};
use super::flags::{ListFlags, TransferFlags};
use super::path::ServerPath;
use super::server::{Credentials, Server, ServerHandle};

/// The kind of a [`Command`] or [`Operation`](crate::session::Operation).
///
/// Some kinds are internal: they are used by the engine for subcommands and
/// never appear as a caller-visible [`Command`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandId {
    /// No command
    None,
    /// Connect to a server
    Connect,
    /// Disconnect from the server
    Disconnect,
    /// List a directory
    List,
    /// Upload or download a file
    Transfer,
    /// Delete files
    Delete,
    /// Remove a directory
    RemoveDir,
    /// Create a directory
    Mkdir,
    /// Rename a file or directory
    Rename,
    /// Change permissions
    Chmod,
    /// Send a raw protocol command
    Raw,
    /// An HTTP request
    HttpRequest,

    /// Internal: wait for a while
    Sleep,
    /// Internal: resolve a name
    Lookup,
    /// Internal: change the remote working directory
    Cwd,
    /// Internal: reserved for operations shared between protocols
    CommonPrivate1,
    /// Internal: reserved for operations shared between protocols
    CommonPrivate2,
    /// Internal: protocol private
    Private1,
    /// Internal: protocol private
    Private2,
    /// Internal: protocol private
    Private3,
    /// Internal: protocol private
    Private4,
    /// Internal: protocol private
    Private5,
    /// Internal: protocol private
    Private6,
}

impl CommandId {
    /// Is this kind reserved for use inside the engine?
    #[must_use]
    pub const fn is_internal(self) -> bool {
        matches!(
            self,
            CommandId::Sleep
                | CommandId::Lookup
                | CommandId::Cwd
                | CommandId::CommonPrivate1
                | CommandId::CommonPrivate2
                | CommandId::Private1
                | CommandId::Private2
                | CommandId::Private3
                | CommandId::Private4
                | CommandId::Private5
                | CommandId::Private6
        )
    }
}

/// A remote operation requested by the caller
#[derive(Clone, Debug, PartialEq, strum_macros::Display)]
pub enum Command {
    /// Establishes a session with a server
    Connect(ConnectArgs),
    /// Closes the session
    Disconnect,
    /// Lists a directory, possibly satisfied from the directory cache
    List(ListArgs),
    /// Moves a file in either direction
    Transfer(TransferArgs),
    /// Deletes one or more files in a single directory
    Delete(DeleteArgs),
    /// Removes a directory
    RemoveDir(RemoveDirArgs),
    /// Creates a directory
    Mkdir(MkdirArgs),
    /// Renames a file or directory, possibly moving it between directories
    Rename(RenameArgs),
    /// Changes permissions of a file or directory
    Chmod(ChmodArgs),
    /// Passes a protocol command through verbatim
    Raw(RawArgs),
    /// Protocol-specific request (HTTP)
    HttpRequest(HttpRequestArgs),
}

impl Command {
    /// The kind of this command. This is fixed at construction.
    #[must_use]
    pub fn id(&self) -> CommandId {
        match self {
            Command::Connect(_) => CommandId::Connect,
            Command::Disconnect => CommandId::Disconnect,
            Command::List(_) => CommandId::List,
            Command::Transfer(_) => CommandId::Transfer,
            Command::Delete(_) => CommandId::Delete,
            Command::RemoveDir(_) => CommandId::RemoveDir,
            Command::Mkdir(_) => CommandId::Mkdir,
            Command::Rename(_) => CommandId::Rename,
            Command::Chmod(_) => CommandId::Chmod,
            Command::Raw(_) => CommandId::Raw,
            Command::HttpRequest(_) => CommandId::HttpRequest,
        }
    }

    /// Could this command ever produce a well-formed wire operation?
    #[must_use]
    pub fn valid(&self) -> bool {
        match self {
            Command::Connect(a) => a.valid(),
            Command::Disconnect => true,
            Command::List(a) => a.valid(),
            Command::Transfer(a) => a.valid(),
            Command::Delete(a) => a.valid(),
            Command::RemoveDir(a) => a.valid(),
            Command::Mkdir(a) => a.valid(),
            Command::Rename(a) => a.valid(),
            Command::Chmod(a) => a.valid(),
            Command::Raw(a) => a.valid(),
            Command::HttpRequest(a) => a.valid(),
        }
    }

    /// A short description of the main argument, for log spans
    #[must_use]
    pub fn primary_arg(&self) -> String {
        match self {
            Command::Connect(a) => a.server.to_string(),
            Command::Disconnect => String::new(),
            Command::List(a) if a.sub_dir.is_empty() => a.path.to_string(),
            Command::List(a) => a.path.format_filename(&a.sub_dir, false),
            Command::Transfer(a) => a.remote_path.format_filename(&a.remote_file, false),
            Command::Delete(a) => a.path.to_string(),
            Command::RemoveDir(a) => a.path.format_filename(&a.sub_dir, false),
            Command::Mkdir(a) => a.path.to_string(),
            Command::Rename(a) => a.from_path.format_filename(&a.from_file, false),
            Command::Chmod(a) => a.path.format_filename(&a.file, false),
            Command::Raw(a) => a.command.clone(),
            Command::HttpRequest(a) => a.redacted_uri(),
        }
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// CONNECT

/// Arguments for [`Command::Connect`]
#[derive(Clone, Debug, PartialEq)]
pub struct ConnectArgs {
    server: Server,
    handle: ServerHandle,
    credentials: Credentials,
    retry_connecting: bool,
}

impl ConnectArgs {
    /// Constructor
    #[must_use]
    pub fn new(
        server: Server,
        handle: ServerHandle,
        credentials: Credentials,
        retry_connecting: bool,
    ) -> Self {
        Self {
            server,
            handle,
            credentials,
            retry_connecting,
        }
    }

    /// Convenience constructor, creating a fresh handle for the server
    #[must_use]
    pub fn for_server(server: Server, credentials: Credentials) -> Self {
        let handle = ServerHandle::new(server.clone());
        Self::new(server, handle, credentials, true)
    }

    /// Accessor
    #[must_use]
    pub fn server(&self) -> &Server {
        &self.server
    }
    /// Accessor
    #[must_use]
    pub fn handle(&self) -> &ServerHandle {
        &self.handle
    }
    /// Accessor
    #[must_use]
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }
    /// Should a failed connection attempt be retried?
    #[must_use]
    pub fn retry_connecting(&self) -> bool {
        self.retry_connecting
    }

    fn valid(&self) -> bool {
        self.server.valid() && self.credentials.valid() && self.handle.server() == &self.server
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// LIST

/// Arguments for [`Command::List`].
///
/// The default value lists the current directory.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListArgs {
    path: ServerPath,
    sub_dir: String,
    flags: ListFlags,
}

impl ListArgs {
    /// Constructor.
    ///
    /// `sub_dir` may be empty, in which case `path` itself is listed.
    #[must_use]
    pub fn new(path: ServerPath, sub_dir: &str, flags: ListFlags) -> Self {
        Self {
            path,
            sub_dir: sub_dir.to_string(),
            flags,
        }
    }

    /// Accessor
    #[must_use]
    pub fn path(&self) -> &ServerPath {
        &self.path
    }
    /// Accessor
    #[must_use]
    pub fn sub_dir(&self) -> &str {
        &self.sub_dir
    }
    /// Accessor
    #[must_use]
    pub fn flags(&self) -> ListFlags {
        self.flags
    }

    fn valid(&self) -> bool {
        if self.path.is_empty() && !self.sub_dir.is_empty() {
            return false;
        }
        if self.flags.contains(ListFlags::LINK) && self.sub_dir.is_empty() {
            return false;
        }
        true
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// TRANSFER

/// The local end of a transfer.
///
/// The variant determines which of source or sink is present.
#[derive(Clone, Debug, PartialEq)]
pub enum TransferData {
    /// Local data to send
    Upload(Box<dyn DataSource>),
    /// Where to put received data
    Download(Box<dyn DataSink>),
}

/// Arguments for [`Command::Transfer`]
#[derive(Clone, Debug, PartialEq)]
pub struct TransferArgs {
    data: TransferData,
    remote_path: ServerPath,
    remote_file: String,
    flags: TransferFlags,
    extra_flags: String,
    persistent_state: Vec<u8>,
}

impl TransferArgs {
    /// Constructor
    #[must_use]
    pub fn new(
        data: TransferData,
        remote_path: ServerPath,
        remote_file: &str,
        flags: TransferFlags,
    ) -> Self {
        Self {
            data,
            remote_path,
            remote_file: remote_file.to_string(),
            flags,
            extra_flags: String::new(),
            persistent_state: Vec::new(),
        }
    }

    /// Builder-style: free-form extra flags, passed to the protocol layer uninterpreted
    #[must_use]
    pub fn with_extra_flags(mut self, extra: &str) -> Self {
        self.extra_flags = extra.to_string();
        self
    }

    /// Builder-style: an opaque blob of resume state, owned by the protocol layer
    #[must_use]
    pub fn with_persistent_state(mut self, state: Vec<u8>) -> Self {
        self.persistent_state = state;
        self
    }

    /// Accessor
    #[must_use]
    pub fn data(&self) -> &TransferData {
        &self.data
    }
    /// Accessor
    #[must_use]
    pub fn remote_path(&self) -> &ServerPath {
        &self.remote_path
    }
    /// Accessor
    #[must_use]
    pub fn remote_file(&self) -> &str {
        &self.remote_file
    }
    /// Accessor
    #[must_use]
    pub fn flags(&self) -> TransferFlags {
        self.flags
    }
    /// Accessor
    #[must_use]
    pub fn extra_flags(&self) -> &str {
        &self.extra_flags
    }
    /// Accessor
    #[must_use]
    pub fn persistent_state(&self) -> &[u8] {
        &self.persistent_state
    }
    /// Is this a download?
    #[must_use]
    pub fn download(&self) -> bool {
        self.flags.download()
    }

    fn valid(&self) -> bool {
        if self.remote_path.is_empty() || self.remote_file.is_empty() {
            return false;
        }
        matches!(
            (&self.data, self.flags.download()),
            (TransferData::Upload(_), false) | (TransferData::Download(_), true)
        )
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// DELETE

/// Arguments for [`Command::Delete`]
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteArgs {
    path: ServerPath,
    files: Vec<String>,
}

impl DeleteArgs {
    /// Constructor
    #[must_use]
    pub fn new(path: ServerPath, files: Vec<String>) -> Self {
        Self { path, files }
    }

    /// Accessor
    #[must_use]
    pub fn path(&self) -> &ServerPath {
        &self.path
    }
    /// Accessor
    #[must_use]
    pub fn files(&self) -> &[String] {
        &self.files
    }

    /// Takes the arguments apart, moving the file list out.
    ///
    /// This consumes the arguments, so the list can be extracted only once.
    #[must_use]
    pub fn into_parts(self) -> (ServerPath, Vec<String>) {
        (self.path, self.files)
    }

    fn valid(&self) -> bool {
        !self.path.is_empty() && !self.files.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// DIRECTORIES

/// Arguments for [`Command::RemoveDir`]
#[derive(Clone, Debug, PartialEq)]
pub struct RemoveDirArgs {
    path: ServerPath,
    sub_dir: String,
}

impl RemoveDirArgs {
    /// Constructor. `sub_dir` is the name of the directory to remove, within `path`.
    #[must_use]
    pub fn new(path: ServerPath, sub_dir: &str) -> Self {
        Self {
            path,
            sub_dir: sub_dir.to_string(),
        }
    }

    /// Accessor
    #[must_use]
    pub fn path(&self) -> &ServerPath {
        &self.path
    }
    /// Accessor
    #[must_use]
    pub fn sub_dir(&self) -> &str {
        &self.sub_dir
    }

    fn valid(&self) -> bool {
        !self.path.is_empty() && !self.sub_dir.is_empty()
    }
}

/// Arguments for [`Command::Mkdir`]
#[derive(Clone, Debug, PartialEq)]
pub struct MkdirArgs {
    path: ServerPath,
}

impl MkdirArgs {
    /// Constructor. `path` is the full path of the directory to create.
    #[must_use]
    pub fn new(path: ServerPath) -> Self {
        Self { path }
    }

    /// Accessor
    #[must_use]
    pub fn path(&self) -> &ServerPath {
        &self.path
    }

    fn valid(&self) -> bool {
        // The root cannot be created
        self.path.has_parent()
    }
}

/// Arguments for [`Command::Rename`]
#[derive(Clone, Debug, PartialEq)]
pub struct RenameArgs {
    from_path: ServerPath,
    from_file: String,
    to_path: ServerPath,
    to_file: String,
}

impl RenameArgs {
    /// Constructor
    #[must_use]
    pub fn new(from_path: ServerPath, from_file: &str, to_path: ServerPath, to_file: &str) -> Self {
        Self {
            from_path,
            from_file: from_file.to_string(),
            to_path,
            to_file: to_file.to_string(),
        }
    }

    /// Accessor
    #[must_use]
    pub fn from_path(&self) -> &ServerPath {
        &self.from_path
    }
    /// Accessor
    #[must_use]
    pub fn from_file(&self) -> &str {
        &self.from_file
    }
    /// Accessor
    #[must_use]
    pub fn to_path(&self) -> &ServerPath {
        &self.to_path
    }
    /// Accessor
    #[must_use]
    pub fn to_file(&self) -> &str {
        &self.to_file
    }

    fn valid(&self) -> bool {
        !self.from_path.is_empty()
            && !self.from_file.is_empty()
            && !self.to_path.is_empty()
            && !self.to_file.is_empty()
    }
}

/// Arguments for [`Command::Chmod`]
#[derive(Clone, Debug, PartialEq)]
pub struct ChmodArgs {
    path: ServerPath,
    file: String,
    permission: String,
}

impl ChmodArgs {
    /// Constructor.
    ///
    /// The format of `permission` is defined by the server (octal on UNIX-like systems).
    #[must_use]
    pub fn new(path: ServerPath, file: &str, permission: &str) -> Self {
        Self {
            path,
            file: file.to_string(),
            permission: permission.to_string(),
        }
    }

    /// Accessor
    #[must_use]
    pub fn path(&self) -> &ServerPath {
        &self.path
    }
    /// Accessor
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }
    /// Accessor
    #[must_use]
    pub fn permission(&self) -> &str {
        &self.permission
    }

    fn valid(&self) -> bool {
        !self.path.is_empty() && !self.file.is_empty() && !self.permission.is_empty()
    }
}

/// Arguments for [`Command::Raw`]
#[derive(Clone, Debug, PartialEq)]
pub struct RawArgs {
    command: String,
}

impl RawArgs {
    /// Constructor
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
        }
    }

    /// Accessor
    #[must_use]
    pub fn command(&self) -> &str {
        &self.command
    }

    fn valid(&self) -> bool {
        !self.command.is_empty()
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// HTTP

/// Arguments for [`Command::HttpRequest`]
///
/// The Debug output shows [`HttpRequestArgs::redacted_uri`], never the full URI.
#[derive(Clone, PartialEq)]
pub struct HttpRequestArgs {
    uri: String,
    verb: String,
    body: Option<Box<dyn DataSource>>,
    response: Option<Box<dyn DataSink>>,
    confidential_qs: bool,
}

impl HttpRequestArgs {
    /// Constructor
    #[must_use]
    pub fn new(uri: &str, verb: &str) -> Self {
        Self {
            uri: uri.to_string(),
            verb: verb.to_string(),
            body: None,
            response: None,
            confidential_qs: false,
        }
    }

    /// Builder-style: request body
    #[must_use]
    pub fn with_body(mut self, body: Box<dyn DataSource>) -> Self {
        self.body = Some(body);
        self
    }

    /// Builder-style: where to write the response body
    #[must_use]
    pub fn with_response(mut self, sink: Box<dyn DataSink>) -> Self {
        self.response = Some(sink);
        self
    }

    /// Builder-style: marks the query string as containing secrets
    #[must_use]
    pub fn with_confidential_query(mut self) -> Self {
        self.confidential_qs = true;
        self
    }

    /// Accessor
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
    /// Accessor
    #[must_use]
    pub fn verb(&self) -> &str {
        &self.verb
    }
    /// Accessor
    #[must_use]
    pub fn body(&self) -> Option<&dyn DataSource> {
        self.body.as_deref()
    }
    /// Accessor
    #[must_use]
    pub fn response(&self) -> Option<&dyn DataSink> {
        self.response.as_deref()
    }
    /// Does the query string contain secrets?
    #[must_use]
    pub fn confidential_qs(&self) -> bool {
        self.confidential_qs
    }

    /// The URI, fit for logging
    #[must_use]
    pub fn redacted_uri(&self) -> String {
        match self.uri.split_once('?') {
            Some((base, _)) if self.confidential_qs => format!("{base}?<redacted>"),
            _ => self.uri.clone(),
        }
    }

    fn valid(&self) -> bool {
        let Some(rest) = self
            .uri
            .strip_prefix("https://")
            .or_else(|| self.uri.strip_prefix("http://"))
        else {
            return false;
        };
        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        !host.is_empty() && !self.verb.is_empty()
    }
}

impl std::fmt::Debug for HttpRequestArgs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpRequestArgs")
            .field("uri", &self.redacted_uri())
            .field("verb", &self.verb)
            .field("body", &self.body)
            .field("response", &self.response)
            .field("confidential_qs", &self.confidential_qs)
            .finish()
    }
}
