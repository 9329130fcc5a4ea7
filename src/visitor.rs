use crate::node::{Node, NodeId, NodeKind, NodeTree};

/// The TemplateVisitor trait is the read-only traversal over a lowered [`NodeTree`].
///
/// Rules:
/// 1. Traversal order is document order.
/// 2. Implementers override `visit_*` methods to add behavior.
/// 3. Implementers MUST call `walk_*` functions to continue traversal unless pruning is intended.
///
/// Rendering does not go through this trait: it evaluates control flow, so it
/// walks the tree itself.
pub trait TemplateVisitor {
    fn visit_tree(&mut self, tree: &NodeTree) {
        walk_children(self, tree, tree.roots());
    }

    fn visit_node(&mut self, tree: &NodeTree, node: &Node) {
        walk_node(self, tree, node);
    }

    fn visit_component(&mut self, tree: &NodeTree, node: &Node) {
        walk_node_children(self, tree, node);
    }

    fn visit_slot(&mut self, tree: &NodeTree, node: &Node) {
        walk_node_children(self, tree, node);
    }

    fn visit_fill(&mut self, tree: &NodeTree, node: &Node) {
        walk_node_children(self, tree, node);
    }
}

pub fn walk_children<V: TemplateVisitor + ?Sized>(visitor: &mut V, tree: &NodeTree, ids: &[NodeId]) {
    for id in ids {
        visitor.visit_node(tree, tree.node(*id));
    }
}

pub fn walk_node<V: TemplateVisitor + ?Sized>(visitor: &mut V, tree: &NodeTree, node: &Node) {
    match &node.kind {
        NodeKind::Component { .. } => visitor.visit_component(tree, node),
        NodeKind::Slot { .. } => visitor.visit_slot(tree, node),
        NodeKind::Fill { .. } => visitor.visit_fill(tree, node),
        _ => walk_node_children(visitor, tree, node),
    }
}

pub fn walk_node_children<V: TemplateVisitor + ?Sized>(
    visitor: &mut V,
    tree: &NodeTree,
    node: &Node,
) {
    for ids in node.kind.child_lists() {
        walk_children(visitor, tree, ids);
    }
}
