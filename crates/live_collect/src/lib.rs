//! Live node collections: ordered, cached views over a document subtree that
//! stay consistent with an externally mutated tree without rescanning on
//! every access.
//!
//! A collection owns a selection strategy (a predicate walked over the live
//! subtree, or an injected supplier), a cache-effect policy consulted for
//! every attribute mutation, and a lazily invalidated snapshot. The snapshot
//! invariant: whenever present, it equals exactly what the selection would
//! produce if run now. Invalidation drops the snapshot; recomputation waits
//! for the next read.

pub mod policy;

use dom_core::{Document, Mutation, NodeId};

/// Verdict of a cache-effect policy for one attribute mutation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheEffect {
    NoEffect,
    Reset,
}

/// Per-collection policy: given the mutated node and the attribute name,
/// decide whether the cached snapshot is still trustworthy.
pub type EffectPolicy = Box<dyn Fn(&Document, NodeId, &str) -> CacheEffect>;

/// Factory used by index writes that grow the collection: produces a fresh
/// detached element to pad with (the `options.length = n` behavior).
pub type SynthesizeFn = Box<dyn Fn(&mut Document) -> NodeId>;

/// How a collection selects its members.
pub enum Selection {
    /// Walk the live subtree under the root and keep matching nodes.
    Predicate(Box<dyn Fn(&Document, NodeId) -> bool>),
    /// Defer entirely to an injected recomputation function, which may reuse
    /// node-level indices maintained elsewhere.
    Supplier(Box<dyn Fn(&Document) -> Vec<NodeId>>),
}

/// Result of a `namedItem`-style lookup.
pub enum NamedItem {
    None,
    Node(NodeId),
    /// Two or more matches: a read-only point-in-time sub-collection over
    /// exactly those matches. It has no mutation subscription of its own.
    Collection(LiveNodeCollection),
}

pub struct LiveNodeCollection {
    root: NodeId,
    selection: Selection,
    effect: EffectPolicy,
    synthesize: Option<SynthesizeFn>,
    cache: Option<Vec<NodeId>>,
}

impl LiveNodeCollection {
    pub fn with_predicate(
        root: NodeId,
        predicate: impl Fn(&Document, NodeId) -> bool + 'static,
        effect: EffectPolicy,
    ) -> Self {
        Self {
            root,
            selection: Selection::Predicate(Box::new(predicate)),
            effect,
            synthesize: None,
            cache: None,
        }
    }

    pub fn with_supplier(
        root: NodeId,
        supplier: impl Fn(&Document) -> Vec<NodeId> + 'static,
        effect: EffectPolicy,
    ) -> Self {
        Self {
            root,
            selection: Selection::Supplier(Box::new(supplier)),
            effect,
            synthesize: None,
            cache: None,
        }
    }

    /// Configure the element factory used when index writes grow the
    /// collection past its current length.
    pub fn synthesizing(mut self, factory: impl Fn(&mut Document) -> NodeId + 'static) -> Self {
        self.synthesize = Some(Box::new(factory));
        self
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    fn recompute(&self, doc: &Document) -> Vec<NodeId> {
        match &self.selection {
            Selection::Predicate(predicate) => doc
                .descendants(self.root)
                .into_iter()
                .filter(|&id| predicate(doc, id))
                .collect(),
            Selection::Supplier(supplier) => supplier(doc),
        }
    }

    fn ensure(&mut self, doc: &Document) -> &[NodeId] {
        if self.cache.is_none() {
            let members = self.recompute(doc);
            log::trace!(
                target: "dom.collect",
                "recomputed collection under {:?}: {} member(s)",
                self.root,
                members.len()
            );
            self.cache = Some(members);
        }
        self.cache.as_deref().unwrap_or(&[])
    }

    /// Drop the cached snapshot. The next read recomputes.
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    pub fn len(&mut self, doc: &Document) -> usize {
        self.ensure(doc).len()
    }

    pub fn is_empty(&mut self, doc: &Document) -> bool {
        self.len(doc) == 0
    }

    /// Indexed access. Out-of-range reads return `None`, never panic.
    pub fn item(&mut self, doc: &Document, index: usize) -> Option<NodeId> {
        self.ensure(doc).get(index).copied()
    }

    /// Current members, snapshotted at call time. The returned vector is a
    /// restartable, finite iteration source; later tree mutation does not
    /// affect it.
    pub fn snapshot(&mut self, doc: &Document) -> Vec<NodeId> {
        self.ensure(doc).to_vec()
    }

    /// Look up members whose `name` or `id` attribute equals `name`.
    pub fn named_item(&mut self, doc: &Document, name: &str) -> NamedItem {
        let matches: Vec<NodeId> = self
            .ensure(doc)
            .iter()
            .copied()
            .filter(|&id| {
                doc.attr(id, "name") == Some(name) || doc.attr(id, "id") == Some(name)
            })
            .collect();
        match matches.len() {
            0 => NamedItem::None,
            1 => NamedItem::Node(matches[0]),
            _ => {
                let root = self.root;
                NamedItem::Collection(LiveNodeCollection::with_supplier(
                    root,
                    move |_: &Document| matches.clone(),
                    policy::never(),
                ))
            }
        }
    }

    /// Feed one drained mutation event to this collection.
    ///
    /// Attribute events inside the root subtree consult the cache-effect
    /// policy; child-list events inside the subtree always invalidate, since
    /// membership is derived from structure. Events elsewhere are ignored.
    pub fn apply(&mut self, doc: &Document, mutation: &Mutation) {
        if self.cache.is_none() {
            return;
        }
        match mutation {
            Mutation::ChildList { parent } => {
                if doc.is_in_subtree(*parent, self.root) {
                    log::trace!(
                        target: "dom.collect",
                        "child-list change under {:?}: cache dropped",
                        self.root
                    );
                    self.invalidate();
                }
            }
            Mutation::Attribute { node, name, .. } => {
                if doc.is_in_subtree(*node, self.root)
                    && (self.effect)(doc, *node, name) == CacheEffect::Reset
                {
                    log::trace!(
                        target: "dom.collect",
                        "attribute '{}' on {:?}: cache dropped",
                        name,
                        node
                    );
                    self.invalidate();
                }
            }
        }
    }

    /// Map `collection[index] = node` (or `= null`) to a structural edit on
    /// the underlying tree. The cache is a derived view and is never edited
    /// directly. Misuse is logged and left as a no-op, per the script-facing
    /// error policy.
    pub fn set_item(&mut self, doc: &mut Document, index: usize, node: Option<NodeId>) {
        let members = self.ensure(doc).to_vec();
        match node {
            Some(new) => {
                if let Some(&existing) = members.get(index) {
                    let Some(parent) = doc.parent(existing) else {
                        log::warn!(
                            target: "dom.collect",
                            "indexed write: member {:?} has no parent; ignoring",
                            existing
                        );
                        return;
                    };
                    if let Err(err) = doc.replace_child(parent, existing, new) {
                        log::warn!(target: "dom.collect", "indexed write failed: {err}");
                        return;
                    }
                } else {
                    if index > members.len() && !self.grow(doc, members.len(), index) {
                        return;
                    }
                    if let Err(err) = doc.append_child(self.root, new) {
                        log::warn!(target: "dom.collect", "indexed append failed: {err}");
                        return;
                    }
                }
                self.invalidate();
            }
            None => {
                if let Some(&existing) = members.get(index) {
                    if let Some(parent) = doc.parent(existing) {
                        if let Err(err) = doc.remove_child(parent, existing) {
                            log::warn!(target: "dom.collect", "indexed removal failed: {err}");
                            return;
                        }
                    }
                    self.invalidate();
                }
            }
        }
    }

    /// Map `collection.length = n` to structural edits: truncate, or grow by
    /// appending synthesized empty elements up to the new length.
    pub fn set_length(&mut self, doc: &mut Document, new_len: usize) {
        let members = self.ensure(doc).to_vec();
        if new_len < members.len() {
            for &id in &members[new_len..] {
                if let Some(parent) = doc.parent(id) {
                    if let Err(err) = doc.remove_child(parent, id) {
                        log::warn!(target: "dom.collect", "length truncation failed: {err}");
                    }
                }
            }
            self.invalidate();
        } else if new_len > members.len() {
            if self.grow(doc, members.len(), new_len) {
                self.invalidate();
            }
        }
    }

    /// Append `target - current` synthesized elements under the root.
    /// Returns false (and logs) when no factory is configured.
    fn grow(&self, doc: &mut Document, current: usize, target: usize) -> bool {
        let Some(factory) = &self.synthesize else {
            log::warn!(
                target: "dom.collect",
                "length growth requested on a collection without an element factory; ignoring"
            );
            return false;
        };
        for _ in current..target {
            let fresh = factory(doc);
            if let Err(err) = doc.append_child(self.root, fresh) {
                log::warn!(target: "dom.collect", "growth append failed: {err}");
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn form_fixture() -> (Document, NodeId, Vec<NodeId>) {
        let mut doc = Document::new();
        let form = doc.create_element("form");
        doc.append_child(doc.root(), form).unwrap();
        let mut inputs = Vec::new();
        for name in ["first", "second", "third"] {
            let input = doc.create_element("input");
            doc.set_attribute(input, "name", Some(name)).unwrap();
            doc.append_child(form, input).unwrap();
            inputs.push(input);
        }
        doc.take_mutations();
        (doc, form, inputs)
    }

    fn inputs_under(form: NodeId) -> LiveNodeCollection {
        LiveNodeCollection::with_predicate(
            form,
            |doc, id| doc.has_tag(id, "input"),
            policy::name_or_id(),
        )
    }

    #[test]
    fn reads_are_idempotent_without_mutations() {
        let (doc, form, inputs) = form_fixture();
        let mut collection = inputs_under(form);
        assert_eq!(collection.len(&doc), 3);
        for _ in 0..3 {
            assert_eq!(collection.item(&doc, 0), Some(inputs[0]));
            assert_eq!(collection.item(&doc, 2), Some(inputs[2]));
        }
        assert_eq!(collection.item(&doc, 3), None);
    }

    #[test]
    fn reset_policy_drops_cache_and_next_read_is_fresh() {
        let (mut doc, form, inputs) = form_fixture();
        let mut collection = inputs_under(form);
        assert_eq!(collection.len(&doc), 3);

        doc.remove_child(form, inputs[1]).unwrap();
        for mutation in doc.take_mutations() {
            collection.apply(&doc, &mutation);
        }
        assert_eq!(collection.len(&doc), 2);
        assert_eq!(collection.item(&doc, 1), Some(inputs[2]));
    }

    #[test]
    fn no_effect_mutation_keeps_cache() {
        let (mut doc, form, _) = form_fixture();
        let recomputes = Rc::new(Cell::new(0usize));
        let counter = recomputes.clone();
        let mut collection = LiveNodeCollection::with_supplier(
            form,
            move |doc| {
                counter.set(counter.get() + 1);
                doc.descendants(form)
                    .into_iter()
                    .filter(|&id| doc.has_tag(id, "input"))
                    .collect()
            },
            policy::name_or_id(),
        );

        let first = collection.item(&doc, 0).unwrap();
        assert_eq!(recomputes.get(), 1);

        // class is irrelevant to a name/id policy: the cache must survive
        doc.set_attribute(first, "class", Some("wide")).unwrap();
        for mutation in doc.take_mutations() {
            collection.apply(&doc, &mutation);
        }
        assert_eq!(collection.len(&doc), 3);
        assert_eq!(recomputes.get(), 1);

        // a name change must reset, and is recomputed only on the next read
        doc.set_attribute(first, "name", Some("renamed")).unwrap();
        for mutation in doc.take_mutations() {
            collection.apply(&doc, &mutation);
        }
        assert_eq!(recomputes.get(), 1);
        let _ = collection.len(&doc);
        assert_eq!(recomputes.get(), 2);
    }

    #[test]
    fn mutations_outside_the_subtree_are_ignored() {
        let (mut doc, form, _) = form_fixture();
        let stray = doc.create_element("input");
        doc.append_child(doc.root(), stray).unwrap();
        doc.take_mutations();

        let mut collection = inputs_under(form);
        assert_eq!(collection.len(&doc), 3);

        doc.set_attribute(stray, "name", Some("elsewhere")).unwrap();
        let events = doc.take_mutations();
        for mutation in &events {
            collection.apply(&doc, mutation);
        }
        // cache retained: still valid without recompute
        assert!(collection.cache.is_some());
        assert_eq!(collection.len(&doc), 3);
    }

    #[test]
    fn named_item_branches_on_match_count() {
        let (mut doc, form, inputs) = form_fixture();
        let mut collection = inputs_under(form);

        assert!(matches!(collection.named_item(&doc, "nope"), NamedItem::None));
        assert!(matches!(
            collection.named_item(&doc, "second"),
            NamedItem::Node(id) if id == inputs[1]
        ));

        doc.set_attribute(inputs[2], "name", Some("second")).unwrap();
        for mutation in doc.take_mutations() {
            collection.apply(&doc, &mutation);
        }
        match collection.named_item(&doc, "second") {
            NamedItem::Collection(mut sub) => {
                assert_eq!(sub.len(&doc), 2);
                assert_eq!(sub.item(&doc, 0), Some(inputs[1]));
                assert_eq!(sub.item(&doc, 1), Some(inputs[2]));
            }
            _ => panic!("expected a sub-collection for a duplicated name"),
        }
    }

    #[test]
    fn named_item_matches_id_as_well() {
        let (mut doc, form, inputs) = form_fixture();
        doc.set_attribute(inputs[0], "id", Some("by-id")).unwrap();
        doc.take_mutations();
        let mut collection = inputs_under(form);
        assert!(matches!(
            collection.named_item(&doc, "by-id"),
            NamedItem::Node(id) if id == inputs[0]
        ));
    }

    #[test]
    fn snapshot_is_point_in_time() {
        let (mut doc, form, inputs) = form_fixture();
        let mut collection = inputs_under(form);
        let snap = collection.snapshot(&doc);

        doc.remove_child(form, inputs[0]).unwrap();
        for mutation in doc.take_mutations() {
            collection.apply(&doc, &mutation);
        }
        assert_eq!(snap.len(), 3);
        assert_eq!(collection.len(&doc), 2);
    }

    #[test]
    fn set_item_replaces_in_the_tree() {
        let (mut doc, form, inputs) = form_fixture();
        let mut collection = inputs_under(form);
        let _ = collection.len(&doc);

        let replacement = doc.create_element("input");
        doc.set_attribute(replacement, "name", Some("fresh")).unwrap();
        collection.set_item(&mut doc, 1, Some(replacement));

        assert_eq!(doc.parent(replacement), Some(form));
        assert_eq!(doc.parent(inputs[1]), None);
        assert_eq!(collection.item(&doc, 1), Some(replacement));
    }

    #[test]
    fn set_item_with_the_current_member_is_a_no_op() {
        let mut doc = Document::new();
        let select = doc.create_element("select");
        doc.append_child(doc.root(), select).unwrap();
        let option = doc.create_element("option");
        doc.append_child(select, option).unwrap();
        doc.take_mutations();

        let mut options = policy::select_options(select);
        assert_eq!(options.item(&doc, 0), Some(option));

        // self-assignment must leave both the tree and the view intact
        options.set_item(&mut doc, 0, Some(option));
        assert_eq!(doc.parent(option), Some(select));
        assert_eq!(doc.children(select), &[option]);
        assert_eq!(options.item(&doc, 0), Some(option));
        assert_eq!(options.len(&doc), 1);
    }

    #[test]
    fn set_item_none_removes() {
        let (mut doc, form, inputs) = form_fixture();
        let mut collection = inputs_under(form);
        collection.set_item(&mut doc, 0, None);
        assert_eq!(doc.parent(inputs[0]), None);
        assert_eq!(collection.len(&doc), 2);
        let _ = form;
    }

    #[test]
    fn set_length_grows_with_synthesized_elements() {
        let mut doc = Document::new();
        let select = doc.create_element("select");
        doc.append_child(doc.root(), select).unwrap();
        doc.take_mutations();

        let mut options = policy::select_options(select);
        assert_eq!(options.len(&doc), 0);
        options.set_length(&mut doc, 3);
        assert_eq!(options.len(&doc), 3);
        let first = options.item(&doc, 0).unwrap();
        assert!(doc.has_tag(first, "option"));

        options.set_length(&mut doc, 1);
        assert_eq!(options.len(&doc), 1);
        assert_eq!(doc.children(select).len(), 1);
    }

    #[test]
    fn growth_without_factory_is_a_logged_no_op() {
        let (mut doc, form, _) = form_fixture();
        let mut collection = inputs_under(form);
        collection.set_length(&mut doc, 10);
        assert_eq!(collection.len(&doc), 3);
    }
}
