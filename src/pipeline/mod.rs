//! Confirmed-word pipeline: debouncer → signer → display sink.
//!
//! Three independent single-worker stages connected by their event queues.
//! Raw words stop at the signer; only window fingerprints reach the display.

pub mod debouncer;
pub mod signer;
pub mod sink;
pub mod stage;

pub use debouncer::Debouncer;
pub use signer::Signer;
pub use sink::{CollectingDisplay, DiscardStage, DisplayOp, DisplaySink, DisplaySurface, StdoutDisplay};
pub use stage::{StageQueue, StageSender, WordEvent, WordStage};

use std::thread;
use std::time::{Duration, Instant};

/// The assembled three-stage pipeline.
pub struct Pipeline {
    debouncer: StageQueue,
    signer: StageQueue,
    sink: StageQueue,
}

impl Pipeline {
    /// Wires debouncer → signer → sink onto the given display surface.
    ///
    /// The surface is cloned for each (re)start of the sink stage, so
    /// implementations with shared interiors (like [`CollectingDisplay`])
    /// keep reporting to the caller's handle.
    pub fn new<S>(surface: S) -> Self
    where
        S: DisplaySurface + Clone,
    {
        let sink = StageQueue::new("sink", move || DisplaySink::new(Box::new(surface.clone())));

        let sink_input = sink.sender();
        let signer = StageQueue::new("signer", move || Signer::new(sink_input.clone()));

        let signer_input = signer.sender();
        let debouncer = StageQueue::new("debouncer", move || Debouncer::new(signer_input.clone()));

        Self {
            debouncer,
            signer,
            sink,
        }
    }

    /// Entry point for the recognizer side: partial hypotheses, sentence
    /// boundaries, errors and resets all go through this sender.
    pub fn input(&self) -> StageSender {
        self.debouncer.sender()
    }

    /// Starts all stage workers. Idempotent per stage.
    pub fn start(&mut self) {
        self.sink.start();
        self.signer.start();
        self.debouncer.start();
    }

    /// Stops the stages, upstream first. Queued-but-undispatched events are
    /// abandoned; call [`Pipeline::drain`] first when they matter.
    pub fn stop(&mut self) {
        self.debouncer.stop();
        self.signer.stop();
        self.sink.stop();
    }

    /// Waits until every stage queue has been empty for two consecutive
    /// checks (a handler may still be forwarding between single checks), or
    /// until `timeout` passes. Returns whether the queues drained.
    pub fn drain(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut clear_checks = 0;

        loop {
            let pending =
                self.debouncer.pending() + self.signer.pending() + self.sink.pending();
            if pending == 0 {
                clear_checks += 1;
                if clear_checks >= 2 {
                    return true;
                }
            } else {
                clear_checks = 0;
            }

            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }
}
