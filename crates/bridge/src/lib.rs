//! Command bridge: many producers, one consumer, one owner of the state.
//!
//! Tool handlers run concurrently on the async runtime but the host state is
//! single-threaded. [`CommandBridge`] is the producer half handed to handlers;
//! [`CommandLoop`] is the consumer half pinned to the thread that owns the
//! state. Commands execute strictly in arrival order, one at a time.
//!
//! Each command reports exactly one outcome. A command that times out before
//! the loop picks it up is cancelled and never executes; a timeout after
//! execution began only abandons the wait, the command still runs to
//! completion and its result is discarded.

use std::{
    panic::{AssertUnwindSafe, catch_unwind},
    sync::{
        Arc,
        atomic::{AtomicU8, Ordering},
    },
    time::Duration,
};

use {
    tokio::sync::{mpsc, oneshot},
    tracing::{debug, error, warn},
    uuid::Uuid,
};

pub mod error;

pub use error::{Error, Result};

/// A unit of work executed against the owned state.
pub type CommandFn<S> =
    Box<dyn FnOnce(&mut S) -> std::result::Result<serde_json::Value, limelight_common::Error> + Send>;

// Command lifecycle, stored in a shared atomic so the submitter and the loop
// can race on it safely.
const PENDING: u8 = 0;
const RUNNING: u8 = 1;
const COMPLETED: u8 = 2;
const FAILED: u8 = 3;
const CANCELLED: u8 = 4;

struct Command<S> {
    id: Uuid,
    payload: CommandFn<S>,
    state: Arc<AtomicU8>,
    reply: oneshot::Sender<Result<serde_json::Value>>,
}

/// Producer half. Cheap to clone; every gateway handler gets one.
pub struct CommandBridge<S> {
    tx: mpsc::Sender<Command<S>>,
}

impl<S> Clone for CommandBridge<S> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

/// Consumer half. Owned by the thread that owns the state.
pub struct CommandLoop<S> {
    rx: mpsc::Receiver<Command<S>>,
}

/// Create a connected bridge/loop pair with a bounded queue.
pub fn channel<S>(capacity: usize) -> (CommandBridge<S>, CommandLoop<S>) {
    let (tx, rx) = mpsc::channel(capacity);
    (CommandBridge { tx }, CommandLoop { rx })
}

impl<S> CommandBridge<S> {
    /// Enqueue a command and wait up to `timeout` for its result.
    ///
    /// A full or closed queue fails immediately with [`Error::Unavailable`];
    /// enqueueing never blocks. On timeout the command is cancelled if it has
    /// not started, otherwise the wait is abandoned and the late result
    /// dropped.
    pub async fn submit<F>(&self, payload: F, timeout: Duration) -> Result<serde_json::Value>
    where
        F: FnOnce(&mut S) -> std::result::Result<serde_json::Value, limelight_common::Error>
            + Send
            + 'static,
    {
        let id = Uuid::new_v4();
        let state = Arc::new(AtomicU8::new(PENDING));
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = Command {
            id,
            payload: Box::new(payload),
            state: Arc::clone(&state),
            reply: reply_tx,
        };

        match self.tx.try_send(command) {
            Ok(()) => {},
            Err(mpsc::error::TrySendError::Full(_)) => {
                warn!(%id, "command queue full");
                return Err(Error::Unavailable("command queue is full".into()));
            },
            Err(mpsc::error::TrySendError::Closed(_)) => {
                return Err(Error::Unavailable("command loop has stopped".into()));
            },
        }

        match tokio::time::timeout(timeout, reply_rx).await {
            Ok(Ok(outcome)) => outcome,
            // Loop dropped the command without replying (shutdown mid-flight).
            Ok(Err(_)) => Err(Error::Unavailable("command loop has stopped".into())),
            Err(_) => {
                let cancelled = state
                    .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok();
                if cancelled {
                    debug!(%id, "command cancelled before execution");
                    Err(Error::Timeout { started: false })
                } else {
                    warn!(%id, "command timed out after execution started");
                    Err(Error::Timeout { started: true })
                }
            },
        }
    }

    /// True once the consumer has shut down.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl<S> CommandLoop<S> {
    /// Drain the queue against `state` until every bridge clone is dropped.
    ///
    /// Blocks the calling thread; run it on the thread that owns the state.
    /// A failing or panicking command is reported to its submitter and the
    /// loop moves on.
    pub fn run(mut self, state: &mut S) {
        while let Some(command) = self.rx.blocking_recv() {
            self.execute(command, state);
        }
        debug!("command loop stopped");
    }

    fn execute(&self, command: Command<S>, state: &mut S) {
        // A cancelled command is skipped without executing its payload.
        if command
            .state
            .compare_exchange(PENDING, RUNNING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(id = %command.id, "skipping cancelled command");
            return;
        }

        let payload = command.payload;
        let outcome = match catch_unwind(AssertUnwindSafe(|| payload(state))) {
            Ok(Ok(value)) => {
                command.state.store(COMPLETED, Ordering::Release);
                Ok(value)
            },
            Ok(Err(e)) => {
                command.state.store(FAILED, Ordering::Release);
                Err(Error::Failed(e.to_string()))
            },
            Err(panic) => {
                command.state.store(FAILED, Ordering::Release);
                let message = panic_message(panic.as_ref());
                error!(id = %command.id, %message, "command panicked");
                Err(Error::Panicked(message))
            },
        };

        // The submitter may have stopped waiting; a dropped receiver is fine.
        let _ = command.reply.send(outcome);
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_owned()
    }
}
