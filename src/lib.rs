//! Engine-side wiring for the live-query and incremental-content layer:
//! the document tree and its mutation stream (`dom_core`), cached live
//! collections (`live_collect`), and the `document.write` pipeline
//! (`doc_write`), tied together by [`Page`].

mod page;

pub use dom_core::{AttributeMutationKind, Document, Mutation, NodeId, TreeError};
pub use doc_write::{
    ParseSink, PostponedActionQueue, ScriptWriteController, SyntheticResponse, WriteMode,
    WriteOutcome, is_complete,
};
pub use live_collect::{CacheEffect, LiveNodeCollection, NamedItem, Selection, policy};
pub use page::Page;
