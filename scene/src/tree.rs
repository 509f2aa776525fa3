use crate::graph::SceneGraph;
use crate::node::{Node, NodeId};

/// Trait for implementing tree traversal operations.
///
/// Implementors of this trait can be passed to [`walk_tree`] to perform
/// arbitrary operations on each node during traversal. The visitor receives
/// callbacks when entering and exiting nodes.
pub trait TreeVisitor {
    /// Called when entering a node (before processing its children).
    ///
    /// Returns true to continue traversing children, false to skip the subtree.
    fn enter_node(&mut self, node: &Node) -> bool;

    /// Called when exiting a node (after processing its children).
    fn exit_node(&mut self, node: &Node);
}

/// Walks the tree below `node_id` depth first, children in insertion order.
pub fn walk_tree<V: TreeVisitor>(graph: &SceneGraph, node_id: NodeId, visitor: &mut V) {
    let Some(node) = graph.get_node(node_id) else {
        return;
    };

    if visitor.enter_node(node) {
        for &child_id in node.children() {
            walk_tree(graph, child_id, visitor);
        }
    }

    visitor.exit_node(node);
}

/// Builds the text returned by [`SceneGraph::tree_repr`]:
///
/// ```text
/// scene #0 "root"
///     ├── camera #1
///     └── points #2 "markers"
/// ```
#[derive(Default)]
pub(crate) struct TreeRepr {
    lines: Vec<String>,
    /// Per open ancestor: children not yet visited, and whether the ancestor
    /// was itself the last of its siblings.
    stack: Vec<(usize, bool)>,
}

impl TreeRepr {
    pub(crate) fn finish(self) -> String {
        self.lines.join("\n")
    }
}

impl TreeVisitor for TreeRepr {
    fn enter_node(&mut self, node: &Node) -> bool {
        let mut is_last = true;
        if let Some((remaining, _)) = self.stack.last_mut() {
            *remaining = remaining.saturating_sub(1);
            is_last = *remaining == 0;
        }

        let mut line = String::new();
        if !self.stack.is_empty() {
            for &(_, ancestor_last) in &self.stack {
                line.push_str(if ancestor_last { "    " } else { "│   " });
            }
            line.push_str(if is_last { "└── " } else { "├── " });
        }
        line.push_str(&format!("{} #{}", node.kind().name(), node.id));
        if let Some(name) = node.name() {
            line.push_str(&format!(" {name:?}"));
        }
        self.lines.push(line);

        self.stack.push((node.children().len(), is_last));
        true
    }

    fn exit_node(&mut self, _node: &Node) {
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeDescriptor;

    struct Counter {
        entered: Vec<NodeId>,
        skip: Option<NodeId>,
    }

    impl TreeVisitor for Counter {
        fn enter_node(&mut self, node: &Node) -> bool {
            self.entered.push(node.id);
            Some(node.id) != self.skip
        }

        fn exit_node(&mut self, _node: &Node) {}
    }

    #[test]
    fn test_walk_tree_skips_pruned_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(None, NodeDescriptor::scene()).unwrap();
        let a = graph.add_node(Some(root), NodeDescriptor::scene()).unwrap();
        let a_child = graph.add_node(Some(a), NodeDescriptor::scene()).unwrap();
        let b = graph.add_node(Some(root), NodeDescriptor::scene()).unwrap();

        let mut visitor = Counter {
            entered: Vec::new(),
            skip: Some(a),
        };
        walk_tree(&graph, root, &mut visitor);
        assert_eq!(visitor.entered, vec![root, a, b]);

        visitor.entered.clear();
        visitor.skip = None;
        walk_tree(&graph, root, &mut visitor);
        assert_eq!(visitor.entered, vec![root, a, a_child, b]);
    }

    #[test]
    fn test_tree_repr_draws_branches() {
        let mut graph = SceneGraph::new();
        let root = graph.add_node(None, NodeDescriptor::scene().with_name("root")).unwrap();
        let group = graph.add_node(Some(root), NodeDescriptor::scene()).unwrap();
        graph.add_node(Some(group), NodeDescriptor::scene()).unwrap();
        graph.add_node(Some(root), NodeDescriptor::scene().with_name("last")).unwrap();

        let expected = [
            "scene #0 \"root\"",
            "    ├── scene #1",
            "    │   └── scene #2",
            "    └── scene #3 \"last\"",
        ]
        .join("\n");
        assert_eq!(graph.tree_repr(root), expected);
    }
}
