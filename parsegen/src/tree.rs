//! Parse results and the tree they are linked into.
//!
//! The evaluator builds [`ParserResult`] values bottom-up, each owning its
//! children. Once a parse is done, [`ParseTree::organize_parent_links`] moves
//! them into an arena where parents and the root are plain node ids.

use crate::span::Span;

/// Separator between a bootstrapped rule name and its generated qualifier,
/// as in `expr:::group:1:0`.
pub const QUALIFIER_SEPARATOR: &str = ":::";

/// Strip a generated qualifier from a name.
pub fn group_name(name: &str) -> &str {
    match name.find(QUALIFIER_SEPARATOR) {
        Some(at) => &name[..at],
        None => name,
    }
}

/// A node of a parse as built during evaluation. Leaves carry the matched
/// span, inner nodes carry their children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserResult {
    pub name: String,
    pub group_name: String,
    pub span: Option<Span>,
    pub inner_results: Vec<ParserResult>,
    pub level: usize,
    pub variable_name: Option<String>,
    pub variable_value: Option<String>,
}

impl ParserResult {
    fn new(name: &str, span: Option<Span>, level: usize) -> Self {
        ParserResult {
            name: name.to_owned(),
            group_name: group_name(name).to_owned(),
            span,
            inner_results: Vec::new(),
            level,
            variable_name: None,
            variable_value: None,
        }
    }

    pub fn leaf(name: &str, span: Span, level: usize) -> Self {
        Self::new(name, Some(span), level)
    }

    pub fn node(name: &str, level: usize) -> Self {
        Self::new(name, None, level)
    }

    /// The matched text, built from the leaves below this node.
    pub fn text(&self) -> String {
        match &self.span {
            Some(span) => span.text.clone(),
            None => self.inner_results.iter().map(ParserResult::text).collect(),
        }
    }

    /// Record a captured variable, its value being the matched text.
    pub fn capture(&mut self, variable: &str) {
        self.variable_name = Some(variable.to_owned());
        self.variable_value = Some(self.text());
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub group_name: String,
    pub span: Option<Span>,
    pub children: Vec<NodeId>,
    pub level: usize,
    pub variable_name: Option<String>,
    pub variable_value: Option<String>,
    pub parent: Option<NodeId>,
    pub root: NodeId,
}

/// A finished parse. Nodes are stored in pre-order, so the root is always
/// the first node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseTree {
    nodes: Vec<Node>,
}

impl ParseTree {
    /// Flatten a result into an arena, setting every parent and root link.
    pub fn organize_parent_links(result: ParserResult) -> ParseTree {
        let mut slots = Vec::new();
        link(result, None, None, &mut slots);
        ParseTree {
            nodes: slots.into_iter().flatten().collect(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Panics if `id` does not belong to this tree. See [`ParseTree::get`].
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Every other child of this node's parent, in order.
    pub fn siblings(&self, id: NodeId) -> Vec<NodeId> {
        match self.parent(id) {
            Some(parent) => self
                .children(parent)
                .iter()
                .copied()
                .filter(|&c| c != id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Pre-order ids of every node below `id`, `id` excluded.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev());
        }
        out
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    pub fn find_all<'t>(&'t self, name: &'t str) -> impl Iterator<Item = NodeId> + 't {
        self.iter()
            .filter(move |(_, node)| node.name == name)
            .map(|(id, _)| id)
    }

    /// First node, in pre-order, that captured `variable`.
    pub fn find_variable(&self, variable: &str) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|node| node.variable_name.as_deref() == Some(variable))
    }

    pub fn text(&self, id: NodeId) -> String {
        let node = self.node(id);
        match &node.span {
            Some(span) => span.text.clone(),
            None => node.children.iter().map(|&c| self.text(c)).collect(),
        }
    }

    /// Start and end of the input covered by a node, if it covers anything.
    pub fn position(&self, id: NodeId) -> Option<(usize, usize)> {
        let mut leaves = std::iter::once(id)
            .chain(self.descendants(id))
            .filter_map(|n| self.node(n).span.as_ref());
        let first = leaves.next()?;
        let end = leaves.last().unwrap_or(first).end();
        Some((first.start, end))
    }
}

/// Reserve this node's slot before its children are linked, so ids come
/// out in pre-order, then fill it in once the children's ids are known.
fn link(
    result: ParserResult,
    parent: Option<NodeId>,
    root: Option<NodeId>,
    slots: &mut Vec<Option<Node>>,
) -> NodeId {
    let id = NodeId(slots.len());
    slots.push(None);
    let root = root.unwrap_or(id);

    let ParserResult {
        name,
        group_name,
        span,
        inner_results,
        level,
        variable_name,
        variable_value,
    } = result;

    let children = inner_results
        .into_iter()
        .map(|child| link(child, Some(id), Some(root), slots))
        .collect();

    slots[id.0] = Some(Node {
        name,
        group_name,
        span,
        children,
        level,
        variable_name,
        variable_value,
        parent,
        root,
    });
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rule::RuleId;

    fn leaf(name: &str, start: usize, text: &str) -> ParserResult {
        ParserResult::leaf(name, Span::new(start, RuleId(0), 1, text.to_owned()), 2)
    }

    fn sample() -> ParseTree {
        let mut inner = ParserResult::node("expr:::group:1:0", 1);
        inner.inner_results = vec![leaf("plus", 1, "+"), leaf("num", 2, "3")];
        let mut root = ParserResult::node("expr", 0);
        root.inner_results = vec![leaf("num", 0, "1"), inner];
        ParseTree::organize_parent_links(root)
    }

    #[test]
    fn get_checks_the_id() {
        let tree = sample();
        assert_eq!(tree.len(), 5);
        assert_eq!(tree.get(NodeId(0)).map(|n| n.name.as_str()), Some("expr"));
        assert_eq!(tree.get(NodeId(4)).map(|n| n.name.as_str()), Some("num"));
        assert!(tree.get(NodeId(5)).is_none());
    }

    #[test]
    fn group_names_strip_qualifier() {
        let tests = vec![
            ("expr", "expr"),
            ("expr:::group:1:0", "expr"),
            ("expr:::terminal:2:3", "expr"),
            ("a:b", "a:b"),
        ];
        for test in tests {
            assert_eq!(group_name(test.0), test.1, "test case: {:?}", test);
        }
    }

    #[test]
    fn links_parents_and_root() {
        let tree = sample();
        let names: Vec<&str> = tree.iter().map(|(_, n)| n.name.as_str()).collect();
        assert_eq!(names, vec!["expr", "num", "expr:::group:1:0", "plus", "num"]);

        let root = tree.root();
        assert_eq!(tree.parent(root), None);
        for (id, node) in tree.iter() {
            assert_eq!(node.root, root);
            for &child in tree.children(id) {
                assert_eq!(tree.parent(child), Some(id));
            }
        }
        assert_eq!(tree.node(NodeId(2)).group_name, "expr");
        assert_eq!(tree.siblings(NodeId(3)), vec![NodeId(4)]);
        assert!(tree.siblings(root).is_empty());
    }

    #[test]
    fn text_and_position() {
        let tree = sample();
        assert_eq!(tree.text(tree.root()), "1+3");
        assert_eq!(tree.text(NodeId(2)), "+3");
        assert_eq!(tree.position(tree.root()), Some((0, 3)));
        assert_eq!(tree.position(NodeId(2)), Some((1, 3)));
        assert_eq!(tree.find_all("num").collect::<Vec<_>>(), vec![NodeId(1), NodeId(4)]);
        assert_eq!(tree.descendants(NodeId(2)), vec![NodeId(3), NodeId(4)]);
    }

    #[test]
    fn capture_records_text() {
        let mut result = ParserResult::node("expr", 0);
        result.inner_results = vec![leaf("num", 0, "12"), leaf("plus", 2, "+")];
        result.capture("value");
        assert_eq!(result.variable_name.as_deref(), Some("value"));
        assert_eq!(result.variable_value.as_deref(), Some("12+"));

        let tree = ParseTree::organize_parent_links(result);
        assert_eq!(tree.find_variable("value").map(|n| n.name.as_str()), Some("expr"));
        assert!(tree.find_variable("other").is_none());
    }
}
