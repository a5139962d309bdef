//! Binary file access behind a trait so tests can substitute fakes.

use async_trait::async_trait;
use std::io;
use std::path::Path;
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncRead, AsyncWrite};

/// Readable byte stream returned by [`Storage::open_read`].
pub type ByteReader = Box<dyn AsyncRead + Send + Unpin>;
/// Writable byte stream returned by [`Storage::open_write`].
pub type ByteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Binary open/read/write primitives addressed by path string.
///
/// Closing a handle is dropping it; the engine controls drop order.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Open a file for binary read.
    async fn open_read(&self, path: &Path) -> io::Result<ByteReader>;

    /// Open a file for binary write, truncating existing content.
    async fn open_write(&self, path: &Path) -> io::Result<ByteWriter>;
}

/// Host filesystem implementation.
pub struct HostStorage;

#[async_trait]
impl Storage for HostStorage {
    async fn open_read(&self, path: &Path) -> io::Result<ByteReader> {
        let file = File::open(path).await?;
        Ok(Box::new(file))
    }

    async fn open_write(&self, path: &Path) -> io::Result<ByteWriter> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)
            .await?;
        Ok(Box::new(file))
    }
}
