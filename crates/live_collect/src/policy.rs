//! Stock cache-effect policies and per-call-site collection constructors.
//!
//! The original system specialized collection behavior with per-element
//! subclass overrides; here each call site passes small closure values into
//! the one monomorphic [`LiveNodeCollection`] instead.

use crate::{CacheEffect, EffectPolicy, LiveNodeCollection};
use dom_core::{Document, NodeId};

/// Reset when a `name` or `id` attribute changes anywhere in the subtree.
/// The right default for collections that serve `namedItem` lookups.
pub fn name_or_id() -> EffectPolicy {
    on_attrs(&["name", "id"])
}

/// Reset when any of the given attributes changes.
pub fn on_attrs(names: &[&str]) -> EffectPolicy {
    let names: Vec<String> = names.iter().map(|n| n.to_ascii_lowercase()).collect();
    Box::new(move |_, _, attr| {
        if names.iter().any(|n| n.eq_ignore_ascii_case(attr)) {
            CacheEffect::Reset
        } else {
            CacheEffect::NoEffect
        }
    })
}

/// Never reset on attribute changes. Membership derived purely from
/// structure still invalidates through child-list events.
pub fn never() -> EffectPolicy {
    Box::new(|_, _, _| CacheEffect::NoEffect)
}

/// `form.elements`: the listed form controls under a form.
pub fn form_elements(form: NodeId) -> LiveNodeCollection {
    LiveNodeCollection::with_predicate(
        form,
        |doc, id| {
            ["input", "button", "select", "textarea", "fieldset", "output"]
                .iter()
                .any(|tag| doc.has_tag(id, tag))
        },
        name_or_id(),
    )
}

/// `select.options`: option elements under a select, growable through
/// `options.length = n`.
pub fn select_options(select: NodeId) -> LiveNodeCollection {
    LiveNodeCollection::with_predicate(select, |doc, id| doc.has_tag(id, "option"), name_or_id())
        .synthesizing(|doc| doc.create_element("option"))
}

/// `table.rows`: `<tr>` children of the table itself or of one of its
/// row-group sections. Attribute changes never affect row membership.
pub fn table_rows(table: NodeId) -> LiveNodeCollection {
    LiveNodeCollection::with_predicate(
        table,
        move |doc, id| {
            if !doc.has_tag(id, "tr") {
                return false;
            }
            match doc.parent(id) {
                Some(parent) if parent == table => true,
                Some(parent) => {
                    doc.parent(parent) == Some(table)
                        && ["thead", "tbody", "tfoot"]
                            .iter()
                            .any(|tag| doc.has_tag(parent, tag))
                }
                None => false,
            }
        },
        never(),
    )
}

/// A collection fed by an external index, `getElementsByName`-style: every
/// recompute defers to the supplier, so node lists maintained elsewhere are
/// reused instead of rescanned. Name and id changes still drop the cache so
/// the next read consults the index again.
pub fn supplied(
    root: NodeId,
    supplier: impl Fn(&Document) -> Vec<NodeId> + 'static,
) -> LiveNodeCollection {
    LiveNodeCollection::with_supplier(root, supplier, name_or_id())
}

/// `tr.cells`: `<td>`/`<th>` children of a row.
pub fn table_cells(row: NodeId) -> LiveNodeCollection {
    LiveNodeCollection::with_predicate(
        row,
        move |doc, id| {
            (doc.has_tag(id, "td") || doc.has_tag(id, "th")) && doc.parent(id) == Some(row)
        },
        never(),
    )
}
