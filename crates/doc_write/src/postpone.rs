//! Postponed actions: callbacks deferred until the current script turn has
//! returned control to the engine's dispatch loop.
//!
//! The queue has no cancel primitive. Staleness is handled at execution
//! time: each action carries a liveness predicate evaluated just before it
//! runs, and the action body itself re-checks relevance (the implicit-close
//! action, for example, skips when an explicit `close()` already emptied the
//! buffer).

use std::collections::VecDeque;

pub struct PostponedAction<Ctx> {
    run: Box<dyn FnOnce(&mut Ctx)>,
    alive: Box<dyn Fn(&Ctx) -> bool>,
}

/// FIFO of postponed actions, owned by the engine. Single-threaded: actions
/// run to completion, in scheduling order, at most once each.
pub struct PostponedActionQueue<Ctx> {
    pending: VecDeque<PostponedAction<Ctx>>,
}

impl<Ctx> Default for PostponedActionQueue<Ctx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Ctx> PostponedActionQueue<Ctx> {
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn schedule(
        &mut self,
        run: impl FnOnce(&mut Ctx) + 'static,
        alive: impl Fn(&Ctx) -> bool + 'static,
    ) {
        self.pending.push_back(PostponedAction {
            run: Box::new(run),
            alive: Box::new(alive),
        });
    }

    /// Execute everything queued, in order. Actions whose liveness check
    /// fails at run time are dropped without executing. Returns how many
    /// actions ran.
    pub fn drain(&mut self, ctx: &mut Ctx) -> usize {
        let mut executed = 0;
        while let Some(action) = self.pending.pop_front() {
            if !(action.alive)(ctx) {
                log::trace!(target: "doc.write", "postponed action no longer alive; skipped");
                continue;
            }
            (action.run)(ctx);
            executed += 1;
        }
        executed
    }
}
