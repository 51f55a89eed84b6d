//! Single-worker event-queue actor underlying every pipeline stage.
//!
//! Each stage owns one unbounded event queue and at most one worker thread.
//! Producers only enqueue; the worker dispatches strictly in arrival order and
//! is the only thread that ever touches the stage's state. Forwarding to the
//! next stage enqueues into that stage's own queue, so cross-stage calls are
//! asynchronous even though the call site looks synchronous.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded, select, unbounded};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// How long `stop` waits for the worker to finish its current handler.
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Events flowing between pipeline stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WordEvent {
    Text(String),
    EndOfSentence,
    Error(String),
    Reset,
}

/// Handlers for one pipeline stage.
///
/// Implementations own their state; only the stage's worker thread calls in,
/// so no handler needs a lock.
pub trait WordStage: Send + 'static {
    fn on_text(&mut self, text: &str);
    fn on_end_of_sentence(&mut self);
    fn on_error(&mut self, message: &str);
    fn on_reset(&mut self);
}

/// Producer-side handle to a stage's event queue.
///
/// Cheap to clone; every operation merely enqueues and returns.
#[derive(Clone)]
pub struct StageSender {
    tx: Sender<WordEvent>,
}

impl StageSender {
    /// Enqueues a text event. Blank text carries no words and is dropped here,
    /// before it ever reaches a worker.
    pub fn put_text(&self, text: &str) {
        if text.trim().is_empty() {
            return;
        }
        self.tx.send(WordEvent::Text(text.to_string())).ok();
    }

    pub fn signal_end_of_sentence(&self) {
        self.tx.send(WordEvent::EndOfSentence).ok();
    }

    pub fn signal_error(&self, message: &str) {
        self.tx.send(WordEvent::Error(message.to_string())).ok();
    }

    pub fn reset(&self) {
        self.tx.send(WordEvent::Reset).ok();
    }

    /// A sender with no stage behind it; events pile up in the returned
    /// receiver. Lets an application consume pipeline output from a channel
    /// instead of implementing [`WordStage`].
    pub fn detached() -> (Self, Receiver<WordEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

struct Worker {
    handle: JoinHandle<()>,
    stop_tx: Sender<()>,
    /// Dropped by the worker on exit; disconnection doubles as the completion
    /// signal for the bounded join.
    done_rx: Receiver<()>,
}

/// Lifecycle and queue for one pipeline stage.
///
/// `start` builds the stage state through the supplied factory and spawns the
/// worker; `stop` parks the queue again. Events sent while no worker runs are
/// discarded by the next `start`.
pub struct StageQueue {
    name: &'static str,
    event_tx: Sender<WordEvent>,
    event_rx: Receiver<WordEvent>,
    factory: Box<dyn Fn() -> Box<dyn WordStage> + Send>,
    worker: Option<Worker>,
}

impl StageQueue {
    pub fn new<S, F>(name: &'static str, factory: F) -> Self
    where
        S: WordStage,
        F: Fn() -> S + Send + 'static,
    {
        let (event_tx, event_rx) = unbounded();
        Self {
            name,
            event_tx,
            event_rx,
            factory: Box::new(move || Box::new(factory())),
            worker: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Producer-side handle for feeding this stage.
    pub fn sender(&self) -> StageSender {
        StageSender {
            tx: self.event_tx.clone(),
        }
    }

    /// Number of queued, not yet dispatched events.
    pub fn pending(&self) -> usize {
        self.event_rx.len()
    }

    pub fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    /// Starts the worker. A no-op when one is already running; otherwise any
    /// stale queued events are discarded first.
    pub fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        while self.event_rx.try_recv().is_ok() {}

        let mut stage = (self.factory)();
        let events = self.event_rx.clone();
        let (stop_tx, stop_rx) = bounded::<()>(1);
        let (done_tx, done_rx) = bounded::<()>(0);

        let handle = thread::spawn(move || {
            run_worker(stage.as_mut(), &events, &stop_rx);
            drop(done_tx);
        });

        self.worker = Some(Worker {
            handle,
            stop_tx,
            done_rx,
        });
    }

    /// Requests termination and joins the worker with a bounded timeout.
    ///
    /// The worker finishes its current handler call; queued events that were
    /// never dispatched are abandoned. A missed join is logged and the worker
    /// considered released; the stage may be started again either way.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        worker.stop_tx.try_send(()).ok();

        match worker.done_rx.recv_timeout(JOIN_TIMEOUT) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                worker.handle.join().ok();
            }
            Err(RecvTimeoutError::Timeout) => {
                eprintln!(
                    "speechseal: stage '{}' did not stop within {:?}; abandoning its worker",
                    self.name, JOIN_TIMEOUT
                );
            }
        }
    }
}

impl Drop for StageQueue {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_worker(stage: &mut dyn WordStage, events: &Receiver<WordEvent>, stop: &Receiver<()>) {
    loop {
        // A stop request wins over queued events.
        if stop.try_recv().is_ok() {
            break;
        }

        select! {
            recv(stop) -> _ => break,
            recv(events) -> event => match event {
                Ok(event) => dispatch(stage, event),
                Err(_) => break,
            },
        }
    }
}

fn dispatch(stage: &mut dyn WordStage, event: WordEvent) {
    match event {
        WordEvent::Text(text) => stage.on_text(&text),
        WordEvent::EndOfSentence => stage.on_end_of_sentence(),
        WordEvent::Error(message) => stage.on_error(&message),
        WordEvent::Reset => stage.on_reset(),
    }
}
