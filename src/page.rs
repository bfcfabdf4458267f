use dom_core::Document;
use doc_write::{
    ParseSink, PostponedActionQueue, ScriptWriteController, SyntheticResponse, WriteMode,
    WriteOutcome,
};
use live_collect::LiveNodeCollection;

/// One window/document pair as the scripting surface sees it: the document
/// tree, the write controller, the engine-owned postponed-action queue and
/// the parser consuming flushed fragments.
///
/// Everything runs on one thread: script calls mutate the page to
/// completion, then the engine drains postponed actions and routes drained
/// tree mutations to live collections.
pub struct Page {
    pub document: Document,
    controller: ScriptWriteController,
    queue: PostponedActionQueue<Page>,
    parser: Box<dyn ParseSink>,
    window_open: bool,
    loaded: Vec<SyntheticResponse>,
}

impl Page {
    /// A page whose parser currently owns the insertion point.
    pub fn parsing(parser: Box<dyn ParseSink>) -> Self {
        Self::with_controller(ScriptWriteController::new_parsing(), parser)
    }

    /// A fully parsed page; the first `write` starts a buffered session.
    pub fn idle(parser: Box<dyn ParseSink>) -> Self {
        Self::with_controller(ScriptWriteController::new_idle(), parser)
    }

    fn with_controller(controller: ScriptWriteController, parser: Box<dyn ParseSink>) -> Self {
        Self {
            document: Document::new(),
            controller,
            queue: PostponedActionQueue::new(),
            parser,
            window_open: true,
            loaded: Vec::new(),
        }
    }

    pub fn write_mode(&self) -> WriteMode {
        self.controller.mode()
    }

    pub fn buffered(&self) -> &str {
        self.controller.buffered()
    }

    /// Documents loaded through `close()`, oldest first.
    pub fn loaded(&self) -> &[SyntheticResponse] {
        &self.loaded
    }

    pub fn pending_postponed(&self) -> usize {
        self.queue.len()
    }

    pub fn window_open(&self) -> bool {
        self.window_open
    }

    /// The user (or a script) closed the window. Pending postponed actions
    /// will be skipped by their liveness checks.
    pub fn close_window(&mut self) {
        self.window_open = false;
    }

    pub fn write(&mut self, text: &str) {
        let outcome = self.controller.write(text, self.parser.as_mut());
        self.handle_outcome(outcome);
    }

    pub fn writeln(&mut self, text: &str) {
        let outcome = self.controller.writeln(text, self.parser.as_mut());
        self.handle_outcome(outcome);
    }

    fn handle_outcome(&mut self, outcome: WriteOutcome) {
        if let WriteOutcome::Buffered {
            schedule_close: true,
        } = outcome
        {
            self.queue.schedule(
                |page: &mut Page| page.run_implicit_close(),
                |page: &Page| page.window_open,
            );
        }
    }

    /// `document.open(urlOrMime, name, features, replace)`. The arguments
    /// are accepted for surface compatibility and ignored; returns the
    /// document the reopened session writes into, as scripts expect.
    pub fn open(
        &mut self,
        url_or_mime: Option<&str>,
        name: Option<&str>,
        features: Option<&str>,
        replace: bool,
    ) -> &mut Document {
        self.controller.open(url_or_mime, name, features, replace);
        &mut self.document
    }

    pub fn close(&mut self) {
        if let Some(response) = self.controller.close() {
            self.load(response);
        }
    }

    pub fn parsing_finished(&mut self) {
        self.controller.parsing_finished(self.parser.as_mut());
    }

    fn run_implicit_close(&mut self) {
        if let Some(response) = self.controller.run_scheduled_close() {
            self.load(response);
        }
    }

    /// Load a replacement document produced by `close()`: a fresh tree,
    /// parsed synchronously in this model, then recorded in the history.
    fn load(&mut self, response: SyntheticResponse) {
        self.document = Document::new();
        self.parser.feed(&response.body);
        self.loaded.push(response);
        self.controller.parsing_finished(self.parser.as_mut());
    }

    /// Run the postponed actions queued so far, plus any an action schedules
    /// while running, until the queue settles.
    pub fn drain_postponed(&mut self) {
        loop {
            let mut queue = std::mem::take(&mut self.queue);
            if queue.is_empty() {
                break;
            }
            queue.drain(self);
        }
    }

    /// Drain the document's mutation log and feed every event to the given
    /// collections, in recording order.
    pub fn dispatch_mutations(&mut self, collections: &mut [&mut LiveNodeCollection]) {
        for mutation in self.document.take_mutations() {
            for collection in collections.iter_mut() {
                collection.apply(&self.document, &mutation);
            }
        }
    }
}
