//! Minimal arena-backed node tree plus the mutation event stream consumed by
//! the live-collection layer.
//!
//! This crate is deliberately small: it models only what the query and
//! document.write layers need from a DOM (identity, tag names, attributes,
//! parent/children links, structural edits) and records every mutation as an
//! event that the engine drains with [`Document::take_mutations`].

mod mutation;
mod tree;

pub use mutation::{AttributeMutationKind, Mutation};
pub use tree::{Document, NodeId, NodeKind, TreeError};
