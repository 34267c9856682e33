//! Local data sources and sinks for transfers
//!
//! A transfer command carries a _factory_ for its local data rather than an open file.
//! The operation opens it when the transfer starts and owns the resulting reader or writer
//! until the operation finishes, however it finishes.
// (c) 2026 the xfer-engine developers

use std::fmt::Debug;
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard};
use std::task::{Context, Poll};

use anyhow::Context as _;
use bytes::Bytes;
use tokio::io::{AsyncRead, AsyncWrite};

/// An open reader for upload data
pub type DataReader = Box<dyn AsyncRead + Send + Unpin>;
/// An open writer for download data
pub type DataWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Where upload data comes from
pub trait DataSource: Debug + Send + Sync {
    /// A human-readable name for the source, used in log messages and for equivalence
    fn name(&self) -> String;
    /// The size of the data, if known
    fn size(&self) -> Option<u64>;
    /// Opens the source for reading
    fn open(&self) -> anyhow::Result<DataReader>;
    /// Clones this source into a new box
    fn clone_box(&self) -> Box<dyn DataSource>;
}

/// Where download data goes
pub trait DataSink: Debug + Send + Sync {
    /// A human-readable name for the sink, used in log messages and for equivalence
    fn name(&self) -> String;
    /// Opens the sink for writing, truncating anything already there
    fn open(&self) -> anyhow::Result<DataWriter>;
    /// Clones this sink into a new box
    fn clone_box(&self) -> Box<dyn DataSink>;
}

impl Clone for Box<dyn DataSource> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl Clone for Box<dyn DataSink> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

// Sources and sinks are equivalent if they describe the same data.
impl PartialEq for Box<dyn DataSource> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name() && self.size() == other.size()
    }
}

impl PartialEq for Box<dyn DataSink> {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

/// The local side of a running transfer, owned by the transfer operation
#[derive(derive_more::Debug)]
pub enum DataChannel {
    /// Upload: read from here
    Upload(#[debug("DataReader")] DataReader),
    /// Download: write to here
    Download {
        /// Destination
        #[debug("DataWriter")]
        writer: DataWriter,
        /// Whether the destination should be synced to stable storage on completion
        fsync: bool,
    },
}

////////////////////////////////////////////////////////////////////////////////////////
// FILES

/// Uploads from a local file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    /// Constructor
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataSource for FileSource {
    fn name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn size(&self) -> Option<u64> {
        std::fs::metadata(&self.path).ok().map(|m| m.len())
    }

    fn open(&self) -> anyhow::Result<DataReader> {
        let file = std::fs::File::open(&self.path)
            .with_context(|| format!("opening {} for reading", self.path.display()))?;
        Ok(Box::new(tokio::fs::File::from_std(file)))
    }

    fn clone_box(&self) -> Box<dyn DataSource> {
        Box::new(self.clone())
    }
}

/// Downloads to a local file
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Constructor
    #[must_use]
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl DataSink for FileSink {
    fn name(&self) -> String {
        self.path.to_string_lossy().to_string()
    }

    fn open(&self) -> anyhow::Result<DataWriter> {
        let file = std::fs::File::create(&self.path)
            .with_context(|| format!("opening {} for writing", self.path.display()))?;
        Ok(Box::new(tokio::fs::File::from_std(file)))
    }

    fn clone_box(&self) -> Box<dyn DataSink> {
        Box::new(self.clone())
    }
}

////////////////////////////////////////////////////////////////////////////////////////
// MEMORY

/// Uploads from a memory buffer
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemorySource {
    name: String,
    data: Bytes,
}

impl MemorySource {
    /// Constructor
    #[must_use]
    pub fn new(name: &str, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.to_string(),
            data: data.into(),
        }
    }
}

impl DataSource for MemorySource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn size(&self) -> Option<u64> {
        u64::try_from(self.data.len()).ok()
    }

    fn open(&self) -> anyhow::Result<DataReader> {
        Ok(Box::new(io::Cursor::new(self.data.clone())))
    }

    fn clone_box(&self) -> Box<dyn DataSource> {
        Box::new(self.clone())
    }
}

/// A growable byte buffer which may be shared between a [`MemorySink`] and whoever wants the data
#[derive(Clone, Debug, Default)]
pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

impl SharedBuffer {
    fn lock(&self) -> MutexGuard<'_, Vec<u8>> {
        // A poisoned buffer still holds whatever was written before the panic
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Returns a copy of the contents
    #[must_use]
    pub fn contents(&self) -> Vec<u8> {
        self.lock().clone()
    }

    /// The number of live references to this buffer, including this one
    #[must_use]
    pub fn references(&self) -> usize {
        Arc::strong_count(&self.0)
    }
}

impl AsyncWrite for SharedBuffer {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        self.lock().extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// Downloads into a [`SharedBuffer`]
#[derive(Clone, Debug)]
pub struct MemorySink {
    name: String,
    buffer: SharedBuffer,
}

impl MemorySink {
    /// Constructor
    #[must_use]
    pub fn new(name: &str, buffer: SharedBuffer) -> Self {
        Self {
            name: name.to_string(),
            buffer,
        }
    }
}

impl DataSink for MemorySink {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn open(&self) -> anyhow::Result<DataWriter> {
        self.buffer.lock().clear();
        Ok(Box::new(self.buffer.clone()))
    }

    fn clone_box(&self) -> Box<dyn DataSink> {
        Box::new(self.clone())
    }
}
