//! Server identity and credentials
// (c) 2026 the xfer-engine developers

use std::fmt::{self, Display};
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Wire protocols understood by a file transfer client
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::VariantNames,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// File Transfer Protocol
    Ftp,
    /// SSH File Transfer Protocol
    Sftp,
    /// HTTP(S)
    Http,
}

impl Protocol {
    /// The conventional port for this protocol
    #[must_use]
    pub const fn default_port(self) -> u16 {
        match self {
            Protocol::Ftp => 21,
            Protocol::Sftp => 22,
            Protocol::Http => 443,
        }
    }
}

/// Describes a remote server
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Server {
    /// Wire protocol
    pub protocol: Protocol,
    /// Host name or address
    pub host: String,
    /// Port number
    pub port: u16,
    /// User name
    pub user: String,
}

impl Server {
    /// Constructor, using the default port for the protocol
    #[must_use]
    pub fn new(protocol: Protocol, host: &str, user: &str) -> Self {
        Self {
            protocol,
            host: host.to_string(),
            port: protocol.default_port(),
            user: user.to_string(),
        }
    }

    /// Sets a port number
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Can this server description be connected to at all?
    #[must_use]
    pub fn valid(&self) -> bool {
        !self.host.is_empty() && self.port != 0
    }
}

impl Display for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.user.is_empty() {
            write!(f, "{}://{}:{}", self.protocol, self.host, self.port)
        } else {
            write!(
                f,
                "{}://{}@{}:{}",
                self.protocol, self.user, self.host, self.port
            )
        }
    }
}

/// A shared handle on the identity of a server session.
///
/// Handles are cheap to clone. Two handles compare equal if they describe the same server.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ServerHandle(Arc<Server>);

impl ServerHandle {
    /// Constructor
    #[must_use]
    pub fn new(server: Server) -> Self {
        Self(Arc::new(server))
    }

    /// Accessor
    #[must_use]
    pub fn server(&self) -> &Server {
        &self.0
    }
}

/// How we authenticate to a server
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, strum::Display)]
pub enum LogonType {
    /// No credentials
    #[default]
    Anonymous,
    /// User name and password
    Normal,
    /// The server asks questions, the user answers them
    Interactive,
    /// Public key authentication
    Key,
}

/// Authentication material for a server
#[derive(Clone, Default, PartialEq, Eq, derive_more::Debug)]
pub struct Credentials {
    /// How to log on
    pub logon_type: LogonType,
    /// Password, if applicable
    #[debug("<redacted>")]
    pub password: String,
    /// Private key file, for [`LogonType::Key`]
    pub key_file: Option<PathBuf>,
}

impl Credentials {
    /// Credentials for password login
    #[must_use]
    pub fn password(password: &str) -> Self {
        Self {
            logon_type: LogonType::Normal,
            password: password.to_string(),
            key_file: None,
        }
    }

    /// Credentials for key-based login
    #[must_use]
    pub fn key(key_file: PathBuf) -> Self {
        Self {
            logon_type: LogonType::Key,
            password: String::new(),
            key_file: Some(key_file),
        }
    }

    /// Are these credentials complete for their logon type?
    #[must_use]
    pub fn valid(&self) -> bool {
        match self.logon_type {
            LogonType::Key => self.key_file.is_some(),
            LogonType::Anonymous | LogonType::Normal | LogonType::Interactive => true,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod test {
    use super::{Credentials, Protocol, Server, ServerHandle};
    use assertables::assert_not_contains;
    use pretty_assertions::assert_eq;

    #[test]
    fn display() {
        let s = Server::new(Protocol::Sftp, "example.com", "user");
        assert_eq!(s.to_string(), "sftp://user@example.com:22");
        let s = Server::new(Protocol::Ftp, "example.com", "").with_port(2121);
        assert_eq!(s.to_string(), "ftp://example.com:2121");
    }

    #[test]
    fn validity() {
        assert!(Server::new(Protocol::Sftp, "h", "u").valid());
        assert!(!Server::new(Protocol::Sftp, "", "u").valid());
        assert!(!Server::new(Protocol::Sftp, "h", "u").with_port(0).valid());
    }

    #[test]
    fn handles_compare_by_server() {
        let a = ServerHandle::new(Server::new(Protocol::Sftp, "h", "u"));
        let b = ServerHandle::new(Server::new(Protocol::Sftp, "h", "u"));
        assert_eq!(a, b);
        assert_eq!(a.server().host, "h");
    }

    #[test]
    fn password_not_logged() {
        let c = Credentials::password("hunter2");
        assert_not_contains!(format!("{c:?}"), "hunter2");
        assert!(c.valid());
    }

    #[test]
    fn key_credentials() {
        let mut c = Credentials::key("/home/u/.ssh/id".into());
        assert!(c.valid());
        c.key_file = None;
        assert!(!c.valid());
    }
}
