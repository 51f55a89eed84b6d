//! Terminal pipeline stage: forwards events to a display surface.
//!
//! The rendering side is behind [`DisplaySurface`], a three-operation trait
//! matching what any output target needs: clear, append a fragment, append a
//! line. Nothing else is assumed about the surface.

use crate::pipeline::stage::WordStage;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Pluggable rendering target for the sink stage.
pub trait DisplaySurface: Send + 'static {
    /// Discard everything shown so far.
    fn clear(&mut self);

    /// Append text to the current line.
    fn append_fragment(&mut self, text: &str);

    /// Terminate the current line, then append `text` as its own line when
    /// non-empty.
    fn append_line(&mut self, text: &str);
}

/// Sink stage bridging pipeline events onto a [`DisplaySurface`].
pub struct DisplaySink {
    surface: Box<dyn DisplaySurface>,
}

impl DisplaySink {
    pub fn new(surface: Box<dyn DisplaySurface>) -> Self {
        Self { surface }
    }
}

impl WordStage for DisplaySink {
    fn on_text(&mut self, text: &str) {
        self.surface.append_fragment(text);
    }

    fn on_end_of_sentence(&mut self) {
        self.surface.append_line("");
    }

    fn on_error(&mut self, message: &str) {
        self.surface.append_line(&format!("Error: {}", message));
        self.surface.append_line("");
    }

    fn on_reset(&mut self) {
        self.surface.clear();
    }
}

/// Writes fragments to stdout separated by spaces (pipe/CLI mode).
///
/// A terminal cannot un-print, so `clear` just terminates any open line.
#[derive(Clone, Default)]
pub struct StdoutDisplay {
    line_open: bool,
}

impl StdoutDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    fn end_line(&mut self) {
        if self.line_open {
            println!();
            self.line_open = false;
        }
    }
}

impl DisplaySurface for StdoutDisplay {
    fn clear(&mut self) {
        self.end_line();
    }

    fn append_fragment(&mut self, text: &str) {
        print!("{} ", text);
        io::stdout().flush().ok();
        self.line_open = true;
    }

    fn append_line(&mut self, text: &str) {
        self.end_line();
        if !text.is_empty() {
            println!("{}", text);
        }
    }
}

/// A display operation, recorded verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayOp {
    Clear,
    Fragment(String),
    Line(String),
}

/// Captures display operations for tests and collector-style consumers.
///
/// Clones share the same log, so a caller can keep one handle while the sink
/// owns another.
#[derive(Clone, Default)]
pub struct CollectingDisplay {
    ops: Arc<Mutex<Vec<DisplayOp>>>,
}

impl CollectingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> Vec<DisplayOp> {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// The fragments seen so far, in order.
    pub fn fragments(&self) -> Vec<String> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                DisplayOp::Fragment(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    fn push(&self, op: DisplayOp) {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).push(op);
    }
}

impl DisplaySurface for CollectingDisplay {
    fn clear(&mut self) {
        self.push(DisplayOp::Clear);
    }

    fn append_fragment(&mut self, text: &str) {
        self.push(DisplayOp::Fragment(text.to_string()));
    }

    fn append_line(&mut self, text: &str) {
        self.push(DisplayOp::Line(text.to_string()));
    }
}

/// Terminal stage that swallows everything. Caps a pipeline whose output is
/// not needed, e.g. in tests of upstream stages.
pub struct DiscardStage;

impl WordStage for DiscardStage {
    fn on_text(&mut self, _text: &str) {}
    fn on_end_of_sentence(&mut self) {}
    fn on_error(&mut self, _message: &str) {}
    fn on_reset(&mut self) {}
}
