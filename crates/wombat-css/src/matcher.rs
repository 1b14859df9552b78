//! Compiled stylesheet matcher.
//!
//! A stylesheet is compiled once into a list of entries, one per selector
//! alternative, and four inverted indices over the subject compound of each
//! entry (tag, id, class and dynamic pseudo-class). Matching an element
//! starts from the entries its tag can reach, narrows them with the other
//! indices and only then runs the full selector test.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::trace;
use wombat_dom::{DomTree, NodeId};

use crate::ast::{Node, NodeKind};
use crate::selector::{ComplexSelector, Compiler, MatchContext};
use crate::value::{Declaration, Value};

/// Added to the priority of `!important` declarations.
pub const IMPORTANT: u32 = 10_000;

/// A declaration that won the cascade within one stylesheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Matched {
    /// Declared value, `var()` references unresolved.
    pub value: Value,
    /// Selector priority, plus [`IMPORTANT`] for `!important`.
    pub priority: u32,
}

/// Style rules keyed by every selector alternative.
#[derive(Debug)]
struct Entry {
    selector: ComplexSelector,
    declarations: Arc<Vec<Declaration>>,
    /// Indices into [`CompiledMatcher::media`] that must all match.
    media: Vec<usize>,
}

/// Inverted index from a key to entry numbers.
#[derive(Debug, Default)]
struct Index {
    /// Entries that do not constrain this key.
    unrestricted: BTreeSet<usize>,
    keyed: HashMap<String, BTreeSet<usize>>,
}

impl Index {
    fn insert(&mut self, keys: Vec<String>, entry: usize) {
        if keys.is_empty() {
            let _ = self.unrestricted.insert(entry);
        }
        for key in keys {
            let _ = self.keyed.entry(key).or_default().insert(entry);
        }
    }

    /// Whether any entry constrains this key.
    fn is_selective(&self) -> bool {
        !self.keyed.is_empty()
    }

    fn candidates<'a>(&self, keys: impl IntoIterator<Item = &'a str>) -> BTreeSet<usize> {
        let mut result = self.unrestricted.clone();
        for key in keys {
            if let Some(entries) = self.keyed.get(key) {
                result.extend(entries);
            }
        }
        result
    }
}

/// A stylesheet compiled for matching.
#[derive(Debug, Default)]
pub struct CompiledMatcher {
    entries: Vec<Entry>,
    /// `@media` preludes referenced by entries.
    media: Vec<Node>,
    tags: Index,
    ids: Index,
    classes: Index,
    pseudo_classes: Index,
}

impl CompiledMatcher {
    /// Compile a `stylesheet` node.
    ///
    /// Type selectors are qualified with `default_ns`. Returns the matcher and
    /// a warning for every selector part that was not understood.
    #[must_use]
    pub fn compile(root: &Node, default_ns: Option<&str>) -> (Self, Vec<String>) {
        let mut matcher = Self::default();
        let mut compiler = Compiler::new(default_ns);
        matcher.collect(&mut compiler, root, &[]);

        for (number, entry) in matcher.entries.iter().enumerate() {
            let selector = &entry.selector;
            matcher
                .tags
                .insert(selector.subject_tag().into_iter().collect(), number);
            matcher.ids.insert(selector.subject_ids(), number);
            matcher.classes.insert(selector.subject_classes(), number);
            matcher
                .pseudo_classes
                .insert(selector.subject_pseudo_classes(), number);
        }
        trace!(entries = matcher.entries.len(), "compiled stylesheet matcher");

        (matcher, compiler.warnings)
    }

    fn collect(&mut self, compiler: &mut Compiler<'_>, block: &Node, media: &[usize]) {
        for statement in block.nodes() {
            match statement.kind {
                NodeKind::Style => {
                    let declarations = Arc::new(
                        statement
                            .node(1)
                            .map(Declaration::from_rules)
                            .unwrap_or_default(),
                    );
                    let Some(selector) = statement.node(0) else {
                        continue;
                    };
                    for seq in selector.nodes_of(NodeKind::SelectorSeq) {
                        self.entries.push(Entry {
                            selector: compiler.complex(seq),
                            declarations: Arc::clone(&declarations),
                            media: media.to_vec(),
                        });
                    }
                }
                NodeKind::AtruleBlock => {
                    let Some(scope) = statement.node(2) else {
                        continue;
                    };
                    match statement.text(0) {
                        Some("media") => {
                            let prelude = statement
                                .node(1)
                                .cloned()
                                .unwrap_or_else(|| Node::new(NodeKind::Prelude, Vec::new()));
                            self.media.push(prelude);
                            let mut nested = media.to_vec();
                            nested.push(self.media.len() - 1);
                            self.collect(compiler, scope, &nested);
                        }
                        Some("supports" | "layer") => self.collect(compiler, scope, media),
                        // Keyframes and font feature values hold no style rules.
                        _ => {}
                    }
                }
                _ => {}
            }
        }
    }

    /// Number of compiled selector alternatives.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the stylesheet has no style rules.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declarations that apply to `node`, by property name.
    ///
    /// With `pseudo_element` set only rules for that pseudo-element apply,
    /// otherwise only rules without one. For every property the declaration
    /// with the highest priority wins; ties go to the later rule.
    #[must_use]
    pub fn match_element(
        &self,
        tree: &DomTree,
        node: NodeId,
        pseudo_element: Option<&str>,
        ctx: &dyn MatchContext,
    ) -> HashMap<String, Matched> {
        let mut result = HashMap::new();
        let Some(element) = tree.as_element(node) else {
            return result;
        };

        let tag = element.name.local.to_ascii_lowercase();
        let mut candidates = self.tags.candidates([tag.as_str()]);
        if self.ids.is_selective() {
            candidates = &candidates & &self.ids.candidates(element.id());
        }
        if self.classes.is_selective() {
            candidates = &candidates & &self.classes.candidates(element.classes());
        }
        if self.pseudo_classes.is_selective() {
            let active = ctx.pseudo_classes(tree, node);
            candidates = &candidates
                & &self
                    .pseudo_classes
                    .candidates(active.iter().map(String::as_str));
        }

        for number in candidates {
            let entry = &self.entries[number];
            if self.applies(entry, tree, node, pseudo_element, ctx) {
                apply(&mut result, entry);
            }
        }
        result
    }

    /// [`Self::match_element`] without the indices: every entry is tested.
    #[must_use]
    pub fn match_naive(
        &self,
        tree: &DomTree,
        node: NodeId,
        pseudo_element: Option<&str>,
        ctx: &dyn MatchContext,
    ) -> HashMap<String, Matched> {
        let mut result = HashMap::new();
        if tree.as_element(node).is_none() {
            return result;
        }
        for entry in &self.entries {
            if self.applies(entry, tree, node, pseudo_element, ctx) {
                apply(&mut result, entry);
            }
        }
        result
    }

    fn applies(
        &self,
        entry: &Entry,
        tree: &DomTree,
        node: NodeId,
        pseudo_element: Option<&str>,
        ctx: &dyn MatchContext,
    ) -> bool {
        entry.selector.pseudo_element.as_deref() == pseudo_element
            && entry.media.iter().all(|&m| ctx.media_matches(&self.media[m]))
            && entry.selector.matches(tree, node, ctx)
    }
}

fn apply(result: &mut HashMap<String, Matched>, entry: &Entry) {
    for declaration in entry.declarations.iter() {
        let priority = entry.selector.priority
            + if declaration.important { IMPORTANT } else { 0 };
        if result
            .get(&declaration.name)
            .is_some_and(|current| current.priority > priority)
        {
            continue;
        }
        let _ = result.insert(
            declaration.name.clone(),
            Matched {
                value: declaration.value.clone(),
                priority,
            },
        );
    }
}
