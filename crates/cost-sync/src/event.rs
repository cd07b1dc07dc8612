//! Events a reconciliation run reports while it works.
//!
//! The engine never prints. Callers plug in a [`ProgressSink`] and decide
//! how to render phases, notices and per-record progress (the CLI writes to
//! the terminal, a UI can forward [`RunEvent`]s over a channel).

use std::fmt;
use std::ops::ControlFlow;

use tokio::sync::mpsc;

use crate::outcome::UpdateOutcome;

/// Lifecycle of one run. Phases are entered strictly in this order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching,
    Indexing,
    Matching,
    Completed,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Fetching => "fetching catalog",
            Self::Indexing => "indexing catalog",
            Self::Matching => "matching records",
            Self::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// A human-readable message about the run that is not tied to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

impl Notice {
    pub fn info(msg: impl Into<String>) -> Self {
        Self::Info(msg.into())
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self::Warning(msg.into())
    }

    pub fn is_warning(&self) -> bool {
        matches!(self, Self::Warning(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Info(msg) | Self::Warning(msg) => msg,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Info(msg) => write!(f, "{msg}"),
            Self::Warning(msg) => write!(f, "warning: {msg}"),
        }
    }
}

/// Reported once per record, in input order.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    pub outcome: &'a UpdateOutcome,
    /// Records finished so far, including this one.
    pub completed: usize,
    pub total: usize,
}

/// Receives everything a run reports.
///
/// Returning `ControlFlow::Break` from [`progress`](Self::progress), or
/// `true` from [`should_stop`](Self::should_stop), stops the run before the
/// next record is dispatched. Updates already in flight still report their
/// outcome.
pub trait ProgressSink: Send {
    fn phase(&mut self, _phase: RunPhase) {}

    fn notice(&mut self, _notice: Notice) {}

    fn progress(&mut self, progress: Progress<'_>) -> ControlFlow<()>;

    /// Polled before matching starts and between records.
    fn should_stop(&self) -> bool {
        false
    }
}

/// Sink that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl ProgressSink for NullSink {
    fn progress(&mut self, _progress: Progress<'_>) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Owned form of everything a sink can receive.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Phase(RunPhase),
    Notice(Notice),
    Progress {
        outcome: UpdateOutcome,
        completed: usize,
        total: usize,
    },
}

impl From<Progress<'_>> for RunEvent {
    fn from(progress: Progress<'_>) -> Self {
        Self::Progress {
            outcome: progress.outcome.clone(),
            completed: progress.completed,
            total: progress.total,
        }
    }
}

/// Forwards events over an unbounded channel.
///
/// When the receiver is dropped the run is asked to stop.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<RunEvent>,
}

impl ChannelSink {
    pub fn new(tx: mpsc::UnboundedSender<RunEvent>) -> Self {
        Self { tx }
    }

    /// A sink plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<RunEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn phase(&mut self, phase: RunPhase) {
        let _ = self.tx.send(RunEvent::Phase(phase));
    }

    fn notice(&mut self, notice: Notice) {
        let _ = self.tx.send(RunEvent::Notice(notice));
    }

    fn progress(&mut self, progress: Progress<'_>) -> ControlFlow<()> {
        match self.tx.send(RunEvent::from(progress)) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        }
    }

    fn should_stop(&self) -> bool {
        self.tx.is_closed()
    }
}
