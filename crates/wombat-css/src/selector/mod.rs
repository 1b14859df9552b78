//! CSS selector compilation and matching
//!
//! Selectors arrive as `selector-seq` syntax tree nodes and are compiled
//! into [`ComplexSelector`]s per
//! [Selectors Level 4](https://www.w3.org/TR/selectors-4/). Matching walks
//! the DOM from the subject outward; dynamic pseudo-classes (`:hover`,
//! `:focus`, ...) are answered by a [`MatchContext`].

mod nth;

pub use nth::Nth;

use wombat_dom::{DomTree, ElementData, NodeId, NodeType, QualName, ns};

use crate::ast::{Arg, Node, NodeKind};

/// Answers the questions about an element that the document cannot.
pub trait MatchContext {
    /// Dynamic pseudo-classes the element is currently in, such as `hover`.
    fn pseudo_classes(&self, _tree: &DomTree, _node: NodeId) -> Vec<String> {
        Vec::new()
    }

    /// Whether the `@media` rule with this prelude applies.
    fn media_matches(&self, _prelude: &Node) -> bool {
        true
    }
}

/// A context with no dynamic state in which every media query applies.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoContext;

impl MatchContext for NoContext {}

/// [§ 5 Elemental selectors](https://www.w3.org/TR/selectors-4/#elemental-selectors)
/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
///
/// A simple selector is a single condition on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimpleSelector {
    /// [§ 5.1 Type selector](https://www.w3.org/TR/selectors-4/#type-selectors)
    /// "A type selector is the name of a document language element type,
    /// and represents an instance of that element type in the document tree."
    Type(QualName),

    /// [§ 5.2 Universal selector](https://www.w3.org/TR/selectors-4/#universal-selector)
    Universal,

    /// [§ 6.6 Class selector](https://www.w3.org/TR/selectors-4/#class-html)
    Class(String),

    /// [§ 6.7 ID selector](https://www.w3.org/TR/selectors-4/#id-selectors)
    Id(String),

    /// `[name]` or `[name op value]`.
    Attribute(AttributeSelector),

    /// Pseudo-class with a direct tree test.
    Structural(PseudoClass),

    /// Any other pseudo-class; asked of the [`MatchContext`].
    Dynamic(String),

    /// `:nth-child()` and relatives.
    Nth {
        /// The `An+B` pattern.
        pattern: Nth,
        /// Count only siblings of the same type.
        of_type: bool,
        /// Count from the last sibling.
        from_end: bool,
    },

    /// [§ 4.3 :not()](https://www.w3.org/TR/selectors-4/#negation)
    Not(Vec<ComplexSelector>),

    /// [§ 4.2 :is()](https://www.w3.org/TR/selectors-4/#matches), also `:where()`.
    Is(Vec<ComplexSelector>),

    /// [§ 4.5 :has()](https://www.w3.org/TR/selectors-4/#relational)
    Has(Vec<RelativeSelector>),

    /// Selector that cannot match, such as an unknown functional pseudo-class.
    Never,
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
/// answered from the tree alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PseudoClass {
    /// [§ 14.1 :root](https://www.w3.org/TR/selectors-4/#the-root-pseudo)
    Root,
    /// [§ 14.2 :empty](https://www.w3.org/TR/selectors-4/#the-empty-pseudo)
    Empty,
    /// [§ 14.4.1 :first-child](https://www.w3.org/TR/selectors-4/#the-first-child-pseudo)
    FirstChild,
    /// [§ 14.4.2 :last-child](https://www.w3.org/TR/selectors-4/#the-last-child-pseudo)
    LastChild,
    /// [§ 14.4.3 :only-child](https://www.w3.org/TR/selectors-4/#the-only-child-pseudo)
    OnlyChild,
    /// [§ 14.5.1 :first-of-type](https://www.w3.org/TR/selectors-4/#the-first-of-type-pseudo)
    FirstOfType,
    /// [§ 14.5.2 :last-of-type](https://www.w3.org/TR/selectors-4/#the-last-of-type-pseudo)
    LastOfType,
    /// [§ 14.5.3 :only-of-type](https://www.w3.org/TR/selectors-4/#the-only-of-type-pseudo)
    OnlyOfType,
}

impl PseudoClass {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "root" => Self::Root,
            "empty" => Self::Empty,
            "first-child" => Self::FirstChild,
            "last-child" => Self::LastChild,
            "only-child" => Self::OnlyChild,
            "first-of-type" => Self::FirstOfType,
            "last-of-type" => Self::LastOfType,
            "only-of-type" => Self::OnlyOfType,
            _ => return None,
        })
    }
}

/// [§ 6 Attribute selectors](https://www.w3.org/TR/selectors-4/#attribute-selectors)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute local name.
    pub name: String,
    /// Operator and operand; `None` tests presence only.
    pub test: Option<(AttributeOperator, String)>,
}

/// Attribute selector operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeOperator {
    /// `[att=val]`
    Equals,
    /// `[att~=val]`: "a whitespace-separated list of words, one of which is exactly val"
    Includes,
    /// `[att|=val]`: "exactly val or beginning with val immediately followed by -"
    DashMatch,
    /// `[att^=val]`
    Prefix,
    /// `[att$=val]`
    Suffix,
    /// `[att*=val]`
    Substring,
}

impl AttributeOperator {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "=" => Self::Equals,
            "~=" => Self::Includes,
            "|=" => Self::DashMatch,
            "^=" => Self::Prefix,
            "$=" => Self::Suffix,
            "*=" => Self::Substring,
            _ => return None,
        })
    }

    fn test(self, actual: &str, expected: &str) -> bool {
        match self {
            Self::Equals => actual == expected,
            Self::Includes => actual.split_whitespace().any(|word| word == expected),
            Self::DashMatch => {
                actual == expected
                    || actual
                        .strip_prefix(expected)
                        .is_some_and(|rest| rest.starts_with('-'))
            }
            Self::Prefix => !expected.is_empty() && actual.starts_with(expected),
            Self::Suffix => !expected.is_empty() && actual.ends_with(expected),
            Self::Substring => !expected.is_empty() && actual.contains(expected),
        }
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `A B`
    Descendant,
    /// `A > B`
    Child,
    /// `A + B`
    NextSibling,
    /// `A ~ B`
    SubsequentSibling,
}

impl Combinator {
    fn from_token(token: &str) -> Self {
        match token {
            ">" => Self::Child,
            "+" => Self::NextSibling,
            "~" => Self::SubsequentSibling,
            _ => Self::Descendant,
        }
    }

    /// Contribution to the selector priority.
    #[must_use]
    pub const fn priority(self) -> u32 {
        match self {
            Self::Descendant => 1,
            Self::Child => 2,
            Self::NextSibling | Self::SubsequentSibling => 5,
        }
    }
}

/// [§ 4.2 Compound selectors](https://www.w3.org/TR/selectors-4/#compound)
///
/// "A compound selector is a sequence of simple selectors that are not
/// separated by a combinator, and represents a set of simultaneous
/// conditions on a single element."
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompoundSelector {
    /// All must match.
    pub simple_selectors: Vec<SimpleSelector>,
}

/// [§ 4.3 Complex selectors](https://www.w3.org/TR/selectors-4/#complex)
///
/// The rightmost compound is the subject; the combinator chain is stored
/// from the subject outward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComplexSelector {
    /// The compound that must match the element itself.
    pub subject: CompoundSelector,
    /// `(combinator, compound)` pairs, right to left.
    pub combinators: Vec<(Combinator, CompoundSelector)>,
    /// `::name` of the subject, if any.
    pub pseudo_element: Option<String>,
    /// Summed priority of every part.
    pub priority: u32,
}

/// Argument of `:has()`: a complex selector anchored at the element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelativeSelector {
    /// Relationship to the anchor; descendant when none was written.
    pub combinator: Combinator,
    /// The selector the related element must match.
    pub selector: ComplexSelector,
}

/// Compiles `selector-seq` nodes.
pub(crate) struct Compiler<'a> {
    default_ns: Option<&'a str>,
    pub(crate) warnings: Vec<String>,
}

impl<'a> Compiler<'a> {
    pub(crate) const fn new(default_ns: Option<&'a str>) -> Self {
        Self {
            default_ns,
            warnings: Vec::new(),
        }
    }

    /// Compile a `selector-seq` node.
    pub(crate) fn complex(&mut self, seq: &Node) -> ComplexSelector {
        self.relative(seq).1
    }

    fn relative(&mut self, seq: &Node) -> (Option<Combinator>, ComplexSelector) {
        let mut leading = None;
        // Each compound with the combinator on its left.
        let mut parts: Vec<(Option<Combinator>, &Node)> = Vec::new();
        let mut pending = None;

        for part in seq.nodes() {
            if part.kind == NodeKind::PathOperator {
                let combinator = Combinator::from_token(part.text(0).unwrap_or(" "));
                if parts.is_empty() {
                    leading = Some(combinator);
                } else {
                    pending = Some(combinator);
                }
                continue;
            }
            let left = if parts.is_empty() {
                None
            } else {
                Some(pending.take().unwrap_or(Combinator::Descendant))
            };
            parts.push((left, part));
        }

        let mut selector = ComplexSelector::default();
        if parts.is_empty() {
            self.warnings.push("empty selector".to_owned());
            selector.subject.simple_selectors.push(SimpleSelector::Never);
            return (leading, selector);
        }

        let subject = parts.len() - 1;
        let mut link = None;
        for (index, (left, node)) in parts.into_iter().enumerate().rev() {
            let (mut compound, weight, pseudo_element) = self.compound(node);
            selector.priority += weight;
            if index == subject {
                selector.subject = compound;
                selector.pseudo_element = pseudo_element;
            } else {
                if pseudo_element.is_some() {
                    self.warnings
                        .push("pseudo-element before a combinator never matches".to_owned());
                    compound.simple_selectors.push(SimpleSelector::Never);
                }
                selector
                    .combinators
                    .push((link.unwrap_or(Combinator::Descendant), compound));
            }
            if let Some(combinator) = left {
                selector.priority += combinator.priority();
            }
            link = left;
        }

        (leading, selector)
    }

    /// Returns the compound, its priority and its pseudo-element.
    fn compound(&mut self, single: &Node) -> (CompoundSelector, u32, Option<String>) {
        let mut compound = CompoundSelector::default();
        let mut priority = 0;
        let mut pseudo_element = None;

        for part in single.nodes() {
            let name = part.text(0).unwrap_or_default();
            let (simple, weight) = match part.kind {
                NodeKind::SelectorTag if name == "*" => (SimpleSelector::Universal, 1),
                NodeKind::SelectorTag => (
                    SimpleSelector::Type(QualName::new(self.default_ns, name)),
                    2,
                ),
                NodeKind::SelectorClass => (SimpleSelector::Class(name.to_owned()), 10),
                NodeKind::SelectorId => (SimpleSelector::Id(name.to_owned()), 30),
                NodeKind::SelectorAttrPresent => (
                    SimpleSelector::Attribute(AttributeSelector {
                        name: name.to_owned(),
                        test: None,
                    }),
                    20,
                ),
                NodeKind::SelectorAttr => (self.attribute(part), 20),
                NodeKind::SelectorPseudoClass => {
                    let name = name.to_ascii_lowercase();
                    // `:active` outranks the other pseudo-classes by one.
                    let weight = if name == "active" { 41 } else { 40 };
                    let simple = PseudoClass::from_name(&name)
                        .map_or(SimpleSelector::Dynamic(name), SimpleSelector::Structural);
                    (simple, weight)
                }
                NodeKind::SelectorPseudoClassFn => (self.pseudo_class_function(part), 40),
                NodeKind::SelectorPseudoElement | NodeKind::SelectorPseudoElementFn => {
                    pseudo_element = Some(name.to_ascii_lowercase());
                    priority += 100;
                    continue;
                }
                NodeKind::SelectorPercentage => (SimpleSelector::Never, 1),
                other => {
                    self.warnings.push(format!("unexpected {other} in selector"));
                    (SimpleSelector::Never, 0)
                }
            };
            priority += weight;
            compound.simple_selectors.push(simple);
        }

        (compound, priority, pseudo_element)
    }

    fn attribute(&mut self, part: &Node) -> SimpleSelector {
        let name = part.text(0).unwrap_or_default();
        let operator = part.text(1).unwrap_or_default();
        let value = part.text(2).unwrap_or_default();
        match AttributeOperator::from_token(operator) {
            Some(operator) => SimpleSelector::Attribute(AttributeSelector {
                name: name.to_owned(),
                test: Some((operator, value.to_owned())),
            }),
            None => {
                self.warnings
                    .push(format!("unsupported attribute operator {operator:?}"));
                SimpleSelector::Never
            }
        }
    }

    fn pseudo_class_function(&mut self, part: &Node) -> SimpleSelector {
        let name = part.text(0).unwrap_or_default().to_ascii_lowercase();
        let arguments = part.node(1);
        let selectors = || {
            arguments
                .into_iter()
                .flat_map(|a| a.nodes_of(NodeKind::SelectorSeq))
        };

        match name.as_str() {
            "not" => SimpleSelector::Not(selectors().map(|seq| self.complex(seq)).collect()),
            "is" | "where" | "with" => {
                SimpleSelector::Is(selectors().map(|seq| self.complex(seq)).collect())
            }
            "has" => SimpleSelector::Has(
                selectors()
                    .map(|seq| {
                        let (combinator, selector) = self.relative(seq);
                        RelativeSelector {
                            combinator: combinator.unwrap_or(Combinator::Descendant),
                            selector,
                        }
                    })
                    .collect(),
            ),
            "nth-child" | "nth-last-child" | "nth-of-type" | "nth-last-of-type" => {
                let text: String = arguments
                    .map(|a| a.args.iter().filter_map(Arg::as_text).collect())
                    .unwrap_or_default();
                match Nth::parse(&text) {
                    Some(pattern) => SimpleSelector::Nth {
                        pattern,
                        of_type: name.ends_with("of-type"),
                        from_end: name.starts_with("nth-last"),
                    },
                    None => {
                        self.warnings
                            .push(format!("unsupported argument of :{name}(): {text:?}"));
                        SimpleSelector::Never
                    }
                }
            }
            _ => {
                self.warnings
                    .push(format!("unsupported pseudo-class function :{name}()"));
                SimpleSelector::Never
            }
        }
    }
}

impl ComplexSelector {
    /// Compile a `selector-seq` node.
    ///
    /// Type selectors are qualified with `default_ns`. Returns the selector
    /// and warnings for the parts that were not understood; those parts never
    /// match.
    #[must_use]
    pub fn compile(seq: &Node, default_ns: Option<&str>) -> (Self, Vec<String>) {
        let mut compiler = Compiler::new(default_ns);
        let selector = compiler.complex(seq);
        (selector, compiler.warnings)
    }

    /// Whether `node` matches, ignoring any pseudo-element.
    #[must_use]
    pub fn matches(&self, tree: &DomTree, node: NodeId, ctx: &dyn MatchContext) -> bool {
        if !compound_matches(&self.subject, tree, node, ctx) {
            return false;
        }
        combinators_match(&self.combinators, tree, node, ctx)
    }

    /// Tag of the subject, lowercased, when it names one.
    #[must_use]
    pub fn subject_tag(&self) -> Option<String> {
        self.subject.simple_selectors.iter().find_map(|simple| match simple {
            SimpleSelector::Type(name) => Some(name.local.to_ascii_lowercase()),
            _ => None,
        })
    }

    /// Ids the subject requires.
    #[must_use]
    pub fn subject_ids(&self) -> Vec<String> {
        self.subject_keys(|simple| match simple {
            SimpleSelector::Id(id) => Some(id.clone()),
            _ => None,
        })
    }

    /// Classes the subject requires.
    #[must_use]
    pub fn subject_classes(&self) -> Vec<String> {
        self.subject_keys(|simple| match simple {
            SimpleSelector::Class(class) => Some(class.clone()),
            _ => None,
        })
    }

    /// Dynamic pseudo-classes the subject requires.
    #[must_use]
    pub fn subject_pseudo_classes(&self) -> Vec<String> {
        self.subject_keys(|simple| match simple {
            SimpleSelector::Dynamic(name) => Some(name.clone()),
            _ => None,
        })
    }

    fn subject_keys(&self, key: impl Fn(&SimpleSelector) -> Option<String>) -> Vec<String> {
        self.subject.simple_selectors.iter().filter_map(key).collect()
    }
}

/// [§ 16 Combinators](https://www.w3.org/TR/selectors-4/#combinators)
///
/// Whether `node` satisfies `chain`, read from the subject outward. Descendant
/// and subsequent-sibling steps try every candidate until the rest of the
/// chain matches.
fn combinators_match(
    chain: &[(Combinator, CompoundSelector)],
    tree: &DomTree,
    node: NodeId,
    ctx: &dyn MatchContext,
) -> bool {
    let Some(((combinator, compound), rest)) = chain.split_first() else {
        return true;
    };
    let mut candidates: Box<dyn Iterator<Item = NodeId> + '_> = match combinator {
        // [§ 16.1 Descendant combinator](https://www.w3.org/TR/selectors-4/#descendant-combinators)
        // "A selector of the form 'A B' represents an element B that is an
        // arbitrary descendant of some ancestor element A."
        Combinator::Descendant => Box::new(tree.ancestors(node)),
        // [§ 16.2 Child combinator](https://www.w3.org/TR/selectors-4/#child-combinators)
        Combinator::Child => Box::new(tree.parent_element(node).into_iter()),
        // [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
        Combinator::NextSibling => Box::new(find_previous_element_sibling(tree, node).into_iter()),
        // [§ 16.4 Subsequent-sibling combinator](https://www.w3.org/TR/selectors-4/#general-sibling-combinators)
        Combinator::SubsequentSibling => Box::new(tree.preceding_siblings(node)),
    };
    candidates.any(|candidate| {
        compound_matches(compound, tree, candidate, ctx)
            && combinators_match(rest, tree, candidate, ctx)
    })
}

/// Whether every simple selector of `compound` matches the element `node`.
fn compound_matches(
    compound: &CompoundSelector,
    tree: &DomTree,
    node: NodeId,
    ctx: &dyn MatchContext,
) -> bool {
    let Some(element) = tree.as_element(node) else {
        return false;
    };
    compound
        .simple_selectors
        .iter()
        .all(|simple| simple_matches(simple, tree, node, element, ctx))
}

fn simple_matches(
    simple: &SimpleSelector,
    tree: &DomTree,
    node: NodeId,
    element: &ElementData,
    ctx: &dyn MatchContext,
) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(name) => tag_matches(name, element),
        SimpleSelector::Class(class) => element.classes().any(|c| c == class),
        SimpleSelector::Id(id) => element.id() == Some(id.as_str()),
        SimpleSelector::Attribute(attribute) => {
            let actual = element.attr(&attribute.name).or_else(|| {
                element
                    .attrs
                    .iter()
                    .find(|(name, _)| name.local == attribute.name)
                    .map(|(_, value)| value.as_str())
            });
            match (actual, &attribute.test) {
                (None, _) => false,
                (Some(_), None) => true,
                (Some(actual), Some((operator, expected))) => operator.test(actual, expected),
            }
        }
        SimpleSelector::Structural(pseudo_class) => {
            pseudo_class_matches(*pseudo_class, tree, node, element)
        }
        SimpleSelector::Dynamic(name) => ctx.pseudo_classes(tree, node).iter().any(|p| p == name),
        SimpleSelector::Nth {
            pattern,
            of_type,
            from_end,
        } => nth_position(tree, node, element, *of_type, *from_end)
            .is_some_and(|position| pattern.matches(position)),
        SimpleSelector::Not(selectors) => !selectors.iter().any(|s| s.matches(tree, node, ctx)),
        SimpleSelector::Is(selectors) => selectors.iter().any(|s| s.matches(tree, node, ctx)),
        SimpleSelector::Has(selectors) => selectors
            .iter()
            .any(|relative| has_matches(relative, tree, node, ctx)),
        SimpleSelector::Never => false,
    }
}

/// Type selectors in the XHTML namespace ignore case.
fn tag_matches(expected: &QualName, element: &ElementData) -> bool {
    if expected.ns != element.name.ns {
        return false;
    }
    if expected.ns.as_deref() == Some(ns::XHTML) {
        expected.local.eq_ignore_ascii_case(&element.name.local)
    } else {
        expected.local == element.name.local
    }
}

/// [§ 4 Pseudo-classes](https://www.w3.org/TR/selectors-4/#pseudo-classes)
///
/// Match a structural pseudo-class against an element with full DOM tree context.
fn pseudo_class_matches(
    pseudo_class: PseudoClass,
    tree: &DomTree,
    node: NodeId,
    element: &ElementData,
) -> bool {
    let siblings = || {
        tree.parent(node)
            .into_iter()
            .flat_map(|parent| tree.element_children(parent))
    };
    let same_type = |sibling: &NodeId| {
        tree.as_element(*sibling)
            .is_some_and(|e| e.name == element.name)
    };

    match pseudo_class {
        // "The :root pseudo-class represents an element that is the root of the document."
        PseudoClass::Root => tree.document_element() == Some(node),

        // "The :empty pseudo-class represents an element that has no children
        // except, optionally, document white space characters."
        PseudoClass::Empty => tree.children(node).iter().all(|&child| {
            match tree.get(child).map(|n| &n.node_type) {
                Some(NodeType::Text(text)) => text.trim().is_empty(),
                Some(NodeType::Comment(_) | NodeType::ProcessingInstruction { .. }) => true,
                _ => false,
            }
        }),

        PseudoClass::FirstChild => siblings().next() == Some(node),
        PseudoClass::LastChild => siblings().last() == Some(node),
        PseudoClass::OnlyChild => siblings().count() == 1,
        PseudoClass::FirstOfType => siblings().find(same_type) == Some(node),
        PseudoClass::LastOfType => siblings().filter(same_type).last() == Some(node),
        PseudoClass::OnlyOfType => siblings().filter(same_type).count() == 1,
    }
}

/// 1-based position among the element's siblings, as `:nth-*()` counts it.
fn nth_position(
    tree: &DomTree,
    node: NodeId,
    element: &ElementData,
    of_type: bool,
    from_end: bool,
) -> Option<i64> {
    let parent = tree.parent(node)?;
    let siblings: Vec<NodeId> = tree
        .element_children(parent)
        .filter(|&sibling| {
            !of_type
                || tree
                    .as_element(sibling)
                    .is_some_and(|e| e.name == element.name)
        })
        .collect();
    let index = siblings.iter().position(|&s| s == node)?;
    let position = if from_end { siblings.len() - index } else { index + 1 };
    i64::try_from(position).ok()
}

fn has_matches(
    relative: &RelativeSelector,
    tree: &DomTree,
    node: NodeId,
    ctx: &dyn MatchContext,
) -> bool {
    let selector = &relative.selector;
    match relative.combinator {
        Combinator::Descendant => tree
            .elements(node)
            .skip(1)
            .any(|descendant| selector.matches(tree, descendant, ctx)),
        Combinator::Child => tree
            .element_children(node)
            .any(|child| selector.matches(tree, child, ctx)),
        Combinator::NextSibling => following_element_siblings(tree, node)
            .next()
            .is_some_and(|sibling| selector.matches(tree, sibling, ctx)),
        Combinator::SubsequentSibling => {
            following_element_siblings(tree, node).any(|sibling| selector.matches(tree, sibling, ctx))
        }
    }
}

fn following_element_siblings(tree: &DomTree, node: NodeId) -> impl Iterator<Item = NodeId> + '_ {
    std::iter::successors(tree.next_sibling(node), move |&id| tree.next_sibling(id))
        .filter(move |&id| tree.as_element(id).is_some())
}

/// [§ 16.3 Next-sibling combinator](https://www.w3.org/TR/selectors-4/#adjacent-sibling-combinators)
///
/// Find the immediately preceding element sibling (skipping text/comment nodes).
fn find_previous_element_sibling(tree: &DomTree, node: NodeId) -> Option<NodeId> {
    tree.preceding_siblings(node)
        .find(|&sibling| tree.as_element(sibling).is_some())
}
