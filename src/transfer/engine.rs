//! Staged, buffered, fail-fast byte copy between storage paths.

use super::TransferRequest;
use crate::common::errors::StageError;
use crate::common::progress::{Stage, StageObserver, StageResult, TransferOutcome};
use crate::platform::storage::{ByteReader, ByteWriter, Storage};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

/// Buffered two-way copy engine.
///
/// Stages run strictly in order (open source, allocate buffer, open
/// destination, copy, close) and the first failure ends the invocation.
/// Already-acquired resources are released in reverse-acquisition order,
/// destination before buffer before source, on every exit path. Nothing is
/// retried; a failed invocation is re-triggered by the user or not at all.
pub struct TransferEngine {
    storage: Arc<dyn Storage>,
    buffer_size: usize,
}

impl TransferEngine {
    pub fn new(storage: Arc<dyn Storage>, buffer_size: usize) -> Self {
        Self {
            storage,
            buffer_size,
        }
    }

    /// Run one transfer to completion and return the ordered stage results.
    ///
    /// Each stage result is pushed to `observer` as it happens; the outcome
    /// carries the same sequence for the caller to render afterwards.
    pub async fn run(
        &self,
        request: &TransferRequest,
        observer: &dyn StageObserver,
    ) -> TransferOutcome {
        let mut outcome = TransferOutcome::new(request.direction);

        tracing::info!(
            direction = request.direction.label(),
            source = %request.source.display(),
            dest = %request.dest.display(),
            "starting transfer"
        );

        let mut source = match self.storage.open_read(&request.source).await {
            Ok(source) => {
                push(&mut outcome, observer, StageResult::ok(Stage::OpenSource));
                source
            }
            Err(err) => {
                let err = StageError::OpenSource {
                    path: request.source.display().to_string(),
                    source: err,
                };
                push(
                    &mut outcome,
                    observer,
                    StageResult::failed(Stage::OpenSource, err.to_string()),
                );
                return outcome;
            }
        };

        let mut buffer = match allocate(self.buffer_size) {
            Some(buffer) => {
                push(&mut outcome, observer, StageResult::ok(Stage::AllocateBuffer));
                buffer
            }
            None => {
                let err = StageError::AllocateBuffer {
                    size: self.buffer_size,
                };
                push(
                    &mut outcome,
                    observer,
                    StageResult::failed(Stage::AllocateBuffer, err.to_string()),
                );
                drop(source);
                return outcome;
            }
        };

        let mut dest = match self.storage.open_write(&request.dest).await {
            Ok(dest) => {
                push(
                    &mut outcome,
                    observer,
                    StageResult::ok(Stage::OpenDestination),
                );
                dest
            }
            Err(err) => {
                let err = StageError::OpenDestination {
                    path: request.dest.display().to_string(),
                    source: err,
                };
                push(
                    &mut outcome,
                    observer,
                    StageResult::failed(Stage::OpenDestination, err.to_string()),
                );
                drop(buffer);
                drop(source);
                return outcome;
            }
        };

        match copy(&mut source, &mut dest, &mut buffer).await {
            Ok(total) => {
                push(
                    &mut outcome,
                    observer,
                    StageResult::ok_with(Stage::Copy, format!("{total} bytes")),
                );
            }
            Err(err) => {
                push(
                    &mut outcome,
                    observer,
                    StageResult::failed(Stage::Copy, err.to_string()),
                );
                drop(dest);
                drop(buffer);
                drop(source);
                return outcome;
            }
        }

        // Close destination first, then release the buffer, then the source.
        let close = dest.shutdown().await;
        drop(dest);
        drop(buffer);
        drop(source);
        match close {
            Ok(()) => push(&mut outcome, observer, StageResult::ok(Stage::Close)),
            Err(err) => {
                let err = StageError::Close(err);
                push(
                    &mut outcome,
                    observer,
                    StageResult::failed(Stage::Close, err.to_string()),
                );
            }
        }

        outcome
    }
}

/// Fallible buffer acquisition; OOM is a reported stage, not an abort.
fn allocate(size: usize) -> Option<Vec<u8>> {
    let mut buffer = Vec::new();
    if buffer.try_reserve_exact(size).is_err() {
        return None;
    }
    buffer.resize(size, 0);
    Some(buffer)
}

/// Read up to one buffer's worth at a time until the source is exhausted,
/// writing exactly what was read. Every write's return is checked against
/// the requested length; a destination that stops accepting bytes surfaces
/// as a short write.
async fn copy(
    source: &mut ByteReader,
    dest: &mut ByteWriter,
    buffer: &mut [u8],
) -> Result<u64, StageError> {
    let mut total: u64 = 0;

    loop {
        let read = source.read(buffer).await.map_err(StageError::Copy)?;
        if read == 0 {
            break;
        }

        let mut written = 0;
        while written < read {
            let n = dest
                .write(&buffer[written..read])
                .await
                .map_err(StageError::Copy)?;
            if n == 0 {
                return Err(StageError::ShortWrite {
                    requested: read,
                    written,
                });
            }
            written += n;
        }

        total += read as u64;
    }

    Ok(total)
}

fn push(outcome: &mut TransferOutcome, observer: &dyn StageObserver, result: StageResult) {
    observer.stage(&result);
    outcome.stages.push(result);
}
