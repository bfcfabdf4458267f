//! The `document.write` pipeline: buffer accumulation, the markup
//! completeness scanner gating the parser, the write/open/close state
//! machine, and the postponed-action queue used to schedule implicit closes.

mod controller;
mod postpone;
mod scanner;

pub use controller::{
    ParseSink, ScriptWriteController, SyntheticResponse, WriteMode, WriteOutcome,
};
pub use postpone::{PostponedAction, PostponedActionQueue};
pub use scanner::is_complete;
