//! The `document.write()/writeln()/open()/close()` state machine.
//!
//! One controller per document, single writer. While the page is being
//! parsed, written text is injected into the parse stream as soon as the
//! completeness scanner approves the accumulated buffer. Outside of parsing,
//! text accumulates until an explicit `close()` or the implicit close the
//! engine schedules on the postponed-action queue.

use crate::scanner::is_complete;

/// Where written text currently goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteMode {
    /// The page is actively being parsed; content streams into the parse
    /// stream once the scanner approves it.
    Parsing,
    /// An `open()` (explicit or implied by a bare `write()`) started
    /// collecting a fresh document's content.
    OpenBuffered,
    /// No parse in progress and no buffered session open.
    Idle,
}

/// Seam to the parser consuming flushed fragments. Fed scanner-approved
/// text, except for the best-effort remainder handed over when parsing is
/// forced to end with an incomplete buffer.
pub trait ParseSink {
    fn feed(&mut self, fragment: &str);
}

/// The replacement document a `close()` produces, shaped like a network
/// response so the owning window can load it through its normal path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticResponse {
    pub body: String,
    pub content_type: &'static str,
}

impl SyntheticResponse {
    fn html(body: String) -> Self {
        Self {
            body,
            content_type: "text/html",
        }
    }
}

/// What a `write` call did, and what the engine owes in return.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Scanner approved the buffer; it was fed to the parser and cleared.
    Flushed,
    /// Direct mode, but the buffer is not yet safe to cut. Held for the
    /// next `write` to extend.
    Held,
    /// Buffered mode. When `schedule_close` is set the engine must queue
    /// the implicit close; at most one is ever pending per controller.
    Buffered { schedule_close: bool },
}

pub struct ScriptWriteController {
    buffer: String,
    mode: WriteMode,
    close_scheduled: bool,
}

impl ScriptWriteController {
    /// Controller for a page whose parser currently owns the insertion
    /// point.
    pub fn new_parsing() -> Self {
        Self::with_mode(WriteMode::Parsing)
    }

    /// Controller for a finished page; the first `write` starts a buffered
    /// session.
    pub fn new_idle() -> Self {
        Self::with_mode(WriteMode::Idle)
    }

    fn with_mode(mode: WriteMode) -> Self {
        Self {
            buffer: String::new(),
            mode,
            close_scheduled: false,
        }
    }

    pub fn mode(&self) -> WriteMode {
        self.mode
    }

    /// Text currently awaiting completeness or a close.
    pub fn buffered(&self) -> &str {
        &self.buffer
    }

    pub fn close_scheduled(&self) -> bool {
        self.close_scheduled
    }

    /// The parser released the insertion point; a later bare `write` now
    /// starts a buffered session. Text still held as incomplete is flushed
    /// best-effort rather than leaking into the next session; the parser's
    /// own recovery governs what it makes of it.
    pub fn parsing_finished(&mut self, sink: &mut dyn ParseSink) {
        if self.mode == WriteMode::Parsing {
            if !self.buffer.is_empty() {
                log::debug!(
                    target: "doc.write",
                    "parse ended with {} held byte(s); flushing as-is",
                    self.buffer.len()
                );
                sink.feed(&self.buffer);
                self.buffer.clear();
            }
            self.mode = WriteMode::Idle;
        }
    }

    pub fn write(&mut self, text: &str, sink: &mut dyn ParseSink) -> WriteOutcome {
        self.buffer.push_str(text);
        match self.mode {
            WriteMode::Parsing => {
                if self.buffer.is_empty() {
                    return WriteOutcome::Flushed;
                }
                if is_complete(&self.buffer) {
                    log::debug!(
                        target: "doc.write",
                        "flushing {} byte(s) into the parse stream",
                        self.buffer.len()
                    );
                    sink.feed(&self.buffer);
                    self.buffer.clear();
                    WriteOutcome::Flushed
                } else {
                    log::trace!(
                        target: "doc.write",
                        "buffer incomplete after write; holding {} byte(s)",
                        self.buffer.len()
                    );
                    WriteOutcome::Held
                }
            }
            WriteMode::Idle | WriteMode::OpenBuffered => {
                // a bare write with no parse in progress opens a buffered
                // session implicitly
                self.mode = WriteMode::OpenBuffered;
                let schedule_close = !self.close_scheduled;
                self.close_scheduled = true;
                WriteOutcome::Buffered { schedule_close }
            }
        }
    }

    pub fn writeln(&mut self, text: &str, sink: &mut dyn ParseSink) -> WriteOutcome {
        let mut line = String::with_capacity(text.len() + 1);
        line.push_str(text);
        line.push('\n');
        self.write(&line, sink)
    }

    /// Start a fresh buffered document. Ignored while the parser owns the
    /// insertion point. Returns whether the call took effect.
    ///
    /// The historical `open(urlOrMime, name, features, replace)` arguments
    /// are accepted for surface compatibility and have no behavioral effect
    /// on an in-place document rewrite.
    pub fn open(
        &mut self,
        url_or_mime: Option<&str>,
        name: Option<&str>,
        features: Option<&str>,
        replace: bool,
    ) -> bool {
        if url_or_mime.is_some() || name.is_some() || features.is_some() || replace {
            log::trace!(
                target: "doc.write",
                "open() arguments ignored: url_or_mime={:?} name={:?} features={:?} replace={}",
                url_or_mime,
                name,
                features,
                replace
            );
        }
        match self.mode {
            WriteMode::Parsing => {
                log::warn!(
                    target: "doc.write",
                    "open() called while the document is being parsed; ignored"
                );
                false
            }
            WriteMode::Idle | WriteMode::OpenBuffered => {
                self.mode = WriteMode::OpenBuffered;
                self.buffer.clear();
                true
            }
        }
    }

    /// Hand the accumulated buffer over as a replacement document. The
    /// caller loads the response into the owning window; this controller is
    /// then parsing the new document. `close()` with no buffered session is
    /// a logged no-op.
    pub fn close(&mut self) -> Option<SyntheticResponse> {
        match self.mode {
            WriteMode::Parsing => {
                log::warn!(
                    target: "doc.write",
                    "close() called with no open buffered session; ignored"
                );
                None
            }
            WriteMode::Idle | WriteMode::OpenBuffered => {
                let body = std::mem::take(&mut self.buffer);
                self.close_scheduled = false;
                self.mode = WriteMode::Parsing;
                log::debug!(
                    target: "doc.write",
                    "close(): loading replacement document ({} byte(s))",
                    body.len()
                );
                Some(SyntheticResponse::html(body))
            }
        }
    }

    /// Run the postponed implicit close. Clears the scheduling guard and
    /// re-checks that the action is still relevant: an explicit `close()`
    /// may already have taken the buffer.
    pub fn run_scheduled_close(&mut self) -> Option<SyntheticResponse> {
        self.close_scheduled = false;
        if self.mode == WriteMode::Parsing || self.buffer.is_empty() {
            log::trace!(target: "doc.write", "scheduled close is stale; skipping");
            return None;
        }
        self.close()
    }
}
