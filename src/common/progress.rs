//! Transfer stage reporting shared by the engine, runtime, and UI.

use tokio::sync::mpsc;

/// One step of a transfer, in fixed attempt order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    OpenSource,
    AllocateBuffer,
    OpenDestination,
    Copy,
    Close,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::OpenSource => "open source",
            Stage::AllocateBuffer => "allocate buffer",
            Stage::OpenDestination => "open destination",
            Stage::Copy => "copy",
            Stage::Close => "close",
        }
    }
}

/// Direction of a transfer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Protected storage -> removable-media backup file.
    Dump,
    /// Removable-media backup file -> protected storage.
    Restore,
}

impl Direction {
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Dump => "dump",
            Direction::Restore => "restore",
        }
    }
}

/// Result of a single attempted stage.
#[derive(Clone, Debug)]
pub struct StageResult {
    pub stage: Stage,
    pub ok: bool,
    /// Human-readable detail: byte count on a completed copy, error text on
    /// a failure.
    pub detail: Option<String>,
}

impl StageResult {
    pub fn ok(stage: Stage) -> Self {
        Self {
            stage,
            ok: true,
            detail: None,
        }
    }

    pub fn ok_with(stage: Stage, detail: String) -> Self {
        Self {
            stage,
            ok: true,
            detail: Some(detail),
        }
    }

    pub fn failed(stage: Stage, detail: String) -> Self {
        Self {
            stage,
            ok: false,
            detail: Some(detail),
        }
    }
}

/// Ordered stage results from one engine invocation.
///
/// Stages are attempted strictly in declaration order and the sequence ends
/// at the first failure, so the last element tells the whole story.
#[derive(Clone, Debug)]
pub struct TransferOutcome {
    pub direction: Direction,
    pub stages: Vec<StageResult>,
}

impl TransferOutcome {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            stages: Vec::new(),
        }
    }

    /// True when every stage ran and none failed.
    pub fn succeeded(&self) -> bool {
        self.stages
            .last()
            .map(|s| s.stage == Stage::Close && s.ok)
            .unwrap_or(false)
    }

    pub fn failed_stage(&self) -> Option<&StageResult> {
        self.stages.iter().find(|s| !s.ok)
    }
}

/// Sink for stage results as they are produced.
///
/// Purely an observer: the engine never depends on what the sink does with
/// them.
pub trait StageObserver: Send + Sync {
    fn stage(&self, result: &StageResult);
}

/// Logs each stage as a structured tracing event.
pub struct TracingObserver;

impl StageObserver for TracingObserver {
    fn stage(&self, result: &StageResult) {
        if result.ok {
            tracing::info!(stage = result.stage.label(), detail = ?result.detail, "stage ok");
        } else {
            tracing::warn!(stage = result.stage.label(), detail = ?result.detail, "stage failed");
        }
    }
}

/// Forwards each stage over a channel, for live UI rendering.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<StageResult>,
}

impl ChannelObserver {
    pub fn unbounded() -> (Self, mpsc::UnboundedReceiver<StageResult>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StageObserver for ChannelObserver {
    fn stage(&self, result: &StageResult) {
        // Receiver may already be gone during shutdown; nothing to do then.
        let _ = self.tx.send(result.clone());
    }
}

/// Discards everything.
pub struct NullObserver;

impl StageObserver for NullObserver {
    fn stage(&self, _result: &StageResult) {}
}
