#![allow(dead_code)]

use async_trait::async_trait;
use std::io::{self, Cursor};
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tempfile::TempDir;
use themevault::platform::storage::{ByteReader, ByteWriter, HostStorage, Storage};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

pub fn setup_temp_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp directory")
}

/// Deterministic pseudo-random payload for copy tests.
pub fn random_bytes(len: usize) -> Vec<u8> {
    use rand::{rngs::StdRng, RngCore, SeedableRng};
    let mut rng = StdRng::seed_from_u64(0x7e11_57a7);
    let mut bytes = vec![0u8; len];
    rng.fill_bytes(&mut bytes);
    bytes
}

//====================
// Instrumented Reader
//====================

pub struct TrackedReader {
    inner: ByteReader,
    live: Arc<AtomicUsize>,
    sizes: Option<Arc<Mutex<Vec<usize>>>>,
}

impl AsyncRead for TrackedReader {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let (Poll::Ready(Ok(())), Some(sizes)) = (&poll, &this.sizes) {
            let n = buf.filled().len() - before;
            if n > 0 {
                sizes.lock().expect("sizes lock").push(n);
            }
        }
        poll
    }
}

impl Drop for TrackedReader {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

//====================
// Instrumented Writer
//====================

pub struct TrackedWriter {
    inner: ByteWriter,
    live: Arc<AtomicUsize>,
}

impl AsyncWrite for TrackedWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.get_mut().inner).poll_write(cx, buf)
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

impl Drop for TrackedWriter {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

//=================
// Counting Storage
//=================

/// Host-backed storage that counts opens and live handles, optionally
/// denying writes to model write-protected media.
pub struct CountingStorage {
    pub live_handles: Arc<AtomicUsize>,
    pub read_opens: Arc<AtomicUsize>,
    pub write_opens: Arc<AtomicUsize>,
    deny_writes: bool,
}

impl CountingStorage {
    pub fn new() -> Self {
        Self {
            live_handles: Arc::new(AtomicUsize::new(0)),
            read_opens: Arc::new(AtomicUsize::new(0)),
            write_opens: Arc::new(AtomicUsize::new(0)),
            deny_writes: false,
        }
    }

    pub fn deny_writes() -> Self {
        Self {
            deny_writes: true,
            ..Self::new()
        }
    }
}

#[async_trait]
impl Storage for CountingStorage {
    async fn open_read(&self, path: &Path) -> io::Result<ByteReader> {
        self.read_opens.fetch_add(1, Ordering::SeqCst);
        let inner = HostStorage.open_read(path).await?;
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedReader {
            inner,
            live: Arc::clone(&self.live_handles),
            sizes: None,
        }))
    }

    async fn open_write(&self, path: &Path) -> io::Result<ByteWriter> {
        self.write_opens.fetch_add(1, Ordering::SeqCst);
        if self.deny_writes {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let inner = HostStorage.open_write(path).await?;
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedWriter {
            inner,
            live: Arc::clone(&self.live_handles),
        }))
    }
}

//=================
// Scripted Storage
//=================

/// Serves one in-memory source payload (recording every read size) and
/// sends writes to the host filesystem, so chunking is deterministic.
pub struct ScriptedStorage {
    pub source_path: PathBuf,
    pub payload: Vec<u8>,
    pub read_sizes: Arc<Mutex<Vec<usize>>>,
    pub live_handles: Arc<AtomicUsize>,
}

impl ScriptedStorage {
    pub fn new(source_path: PathBuf, payload: Vec<u8>) -> Self {
        Self {
            source_path,
            payload,
            read_sizes: Arc::new(Mutex::new(Vec::new())),
            live_handles: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Storage for ScriptedStorage {
    async fn open_read(&self, path: &Path) -> io::Result<ByteReader> {
        if path != self.source_path {
            return Err(io::Error::from(io::ErrorKind::NotFound));
        }
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedReader {
            inner: Box::new(Cursor::new(self.payload.clone())),
            live: Arc::clone(&self.live_handles),
            sizes: Some(Arc::clone(&self.read_sizes)),
        }))
    }

    async fn open_write(&self, path: &Path) -> io::Result<ByteWriter> {
        let inner = HostStorage.open_write(path).await?;
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedWriter {
            inner,
            live: Arc::clone(&self.live_handles),
        }))
    }
}

//====================
// Short-Write Storage
//====================

struct ShortWriter {
    accepted: usize,
    limit: usize,
    live: Arc<AtomicUsize>,
}

impl AsyncWrite for ShortWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let n = buf.len().min(this.limit - this.accepted);
        this.accepted += n;
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

impl Drop for ShortWriter {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Reads from the host filesystem; the destination stops accepting bytes
/// after `limit`, like media running out of space.
pub struct ShortWriteStorage {
    pub limit: usize,
    pub live_handles: Arc<AtomicUsize>,
}

impl ShortWriteStorage {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            live_handles: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Storage for ShortWriteStorage {
    async fn open_read(&self, path: &Path) -> io::Result<ByteReader> {
        let inner = HostStorage.open_read(path).await?;
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(TrackedReader {
            inner,
            live: Arc::clone(&self.live_handles),
            sizes: None,
        }))
    }

    async fn open_write(&self, _path: &Path) -> io::Result<ByteWriter> {
        self.live_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ShortWriter {
            accepted: 0,
            limit: self.limit,
            live: Arc::clone(&self.live_handles),
        }))
    }
}

//==============
// Probe Storage
//==============

/// Only the listed paths open for read; every probe is recorded in order.
pub struct ProbeStorage {
    pub openable: Vec<PathBuf>,
    pub probed: Arc<Mutex<Vec<PathBuf>>>,
    pub write_opens: Arc<AtomicUsize>,
}

impl ProbeStorage {
    pub fn new(openable: Vec<PathBuf>) -> Self {
        Self {
            openable,
            probed: Arc::new(Mutex::new(Vec::new())),
            write_opens: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Storage for ProbeStorage {
    async fn open_read(&self, path: &Path) -> io::Result<ByteReader> {
        self.probed
            .lock()
            .expect("probed lock")
            .push(path.to_path_buf());
        if self.openable.iter().any(|p| p == path) {
            Ok(Box::new(Cursor::new(Vec::new())))
        } else {
            Err(io::Error::from(io::ErrorKind::NotFound))
        }
    }

    async fn open_write(&self, _path: &Path) -> io::Result<ByteWriter> {
        self.write_opens.fetch_add(1, Ordering::SeqCst);
        Err(io::Error::from(io::ErrorKind::Unsupported))
    }
}
