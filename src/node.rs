//! Node Tree
//!
//! Lowers the nested [`TemplateNode`] IR into an immutable arena. Children are
//! referenced by [`NodeId`], assigned in document order, so two slots sharing
//! a name stay distinguishable and the tree can be shared across renders.

use crate::error::{RenderError, Result};
use crate::expr::Expr;
use crate::ir::{ArgumentIR, SourceLocation, TemplateNode};
use crate::visitor::{walk_children, walk_node, walk_node_children, TemplateVisitor};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotFlags {
    pub default: bool,
    pub required: bool,
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub name: String,
    pub value: Expr,
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Text(String),
    Variable(Expr),
    For {
        item_var: String,
        index_var: Option<String>,
        source: Expr,
        body: Vec<NodeId>,
        empty: Vec<NodeId>,
    },
    If {
        condition: Expr,
        consequent: Vec<NodeId>,
        alternate: Vec<NodeId>,
    },
    With {
        bindings: Vec<Argument>,
        body: Vec<NodeId>,
    },
    Component {
        name: Expr,
        args: Vec<Argument>,
        body: Vec<NodeId>,
    },
    Slot {
        name: Expr,
        flags: SlotFlags,
        data: Vec<Argument>,
        body: Vec<NodeId>,
    },
    Fill {
        name: Expr,
        data_binding: Option<String>,
        default_binding: Option<String>,
        body: Vec<NodeId>,
    },
}

impl NodeKind {
    pub fn child_lists(&self) -> Vec<&[NodeId]> {
        match self {
            NodeKind::Text(_) | NodeKind::Variable(_) => vec![],
            NodeKind::For { body, empty, .. } => vec![body.as_slice(), empty.as_slice()],
            NodeKind::If {
                consequent,
                alternate,
                ..
            } => vec![consequent.as_slice(), alternate.as_slice()],
            NodeKind::With { body, .. }
            | NodeKind::Component { body, .. }
            | NodeKind::Slot { body, .. }
            | NodeKind::Fill { body, .. } => vec![body.as_slice()],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub location: SourceLocation,
    pub kind: NodeKind,
}

/// A slot declaration found by static inspection of a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclaredSlot {
    pub id: NodeId,
    /// `None` when the name is computed at render time
    pub name: Option<String>,
    pub flags: SlotFlags,
    pub location: SourceLocation,
}

#[derive(Debug)]
pub struct NodeTree {
    name: String,
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl NodeTree {
    pub fn from_ir(name: impl Into<String>, nodes: Vec<TemplateNode>) -> Result<Self> {
        let mut lowerer = Lowerer {
            template: name.into(),
            nodes: Vec::new(),
        };
        let roots = lowerer.lower_children(nodes)?;
        let tree = NodeTree {
            name: lowerer.template,
            nodes: lowerer.nodes,
            roots,
        };
        tree.validate()?;
        Ok(tree)
    }

    /// Lowers a JSON array of IR nodes.
    pub fn from_json(name: impl Into<String>, source: &str) -> Result<Self> {
        let name = name.into();
        let nodes: Vec<TemplateNode> = serde_json::from_str(source).map_err(|e| {
            RenderError::invalid_template(
                &name,
                e.to_string(),
                SourceLocation::new(e.line() as u32, e.column() as u32),
            )
        })?;
        Self::from_ir(name, nodes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every slot node of the tree in document order.
    pub fn declared_slots(&self) -> Vec<DeclaredSlot> {
        let mut inventory = SlotInventory::default();
        inventory.visit_tree(self);
        inventory.slots
    }

    /// Whether rendering `ids` may read the binding `name`. With
    /// `through_components` every component invocation counts as a reader.
    pub fn reads_binding(&self, ids: &[NodeId], name: &str, through_components: bool) -> bool {
        let mut reader = BindingReader {
            name,
            through_components,
            found: false,
        };
        walk_children(&mut reader, self, ids);
        reader.found
    }

    fn validate(&self) -> Result<()> {
        let mut placement = FillPlacement {
            template: &self.name,
            allowed: false,
            error: None,
        };
        placement.visit_tree(self);
        if let Some(err) = placement.error {
            return Err(err);
        }

        let mut default_slot: Option<(String, SourceLocation)> = None;
        for slot in self.declared_slots() {
            if !slot.flags.default {
                continue;
            }
            let Some(name) = slot.name else { continue };
            match &default_slot {
                Some((existing, _)) if *existing != name => {
                    return Err(RenderError::invalid_template(
                        &self.name,
                        format!(
                            "slots '{}' and '{}' are both marked default",
                            existing, name
                        ),
                        slot.location,
                    ));
                }
                Some(_) => {}
                None => default_slot = Some((name, slot.location)),
            }
        }
        Ok(())
    }
}

struct Lowerer {
    template: String,
    nodes: Vec<Node>,
}

impl Lowerer {
    fn lower_children(&mut self, nodes: Vec<TemplateNode>) -> Result<Vec<NodeId>> {
        nodes.into_iter().map(|n| self.lower(n)).collect()
    }

    fn lower(&mut self, ir: TemplateNode) -> Result<NodeId> {
        let location = ir.location();
        // Reserve the id first so ids follow document order.
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            id,
            location,
            kind: NodeKind::Text(String::new()),
        });

        let kind = match ir {
            TemplateNode::Text(t) => NodeKind::Text(t.value),
            TemplateNode::Variable(v) => NodeKind::Variable(self.expr(&v.expression, location)?),
            TemplateNode::For(f) => NodeKind::For {
                item_var: f.item_var,
                index_var: f.index_var,
                source: self.expr(&f.source, location)?,
                body: self.lower_children(f.body)?,
                empty: self.lower_children(f.empty)?,
            },
            TemplateNode::If(i) => NodeKind::If {
                condition: self.expr(&i.condition, location)?,
                consequent: self.lower_children(i.consequent)?,
                alternate: self.lower_children(i.alternate)?,
            },
            TemplateNode::With(w) => NodeKind::With {
                bindings: self.arguments(w.bindings, location)?,
                body: self.lower_children(w.body)?,
            },
            TemplateNode::Component(c) => NodeKind::Component {
                name: self.expr(&c.name, location)?,
                args: self.arguments(c.args, location)?,
                body: self.lower_children(c.body)?,
            },
            TemplateNode::Slot(s) => NodeKind::Slot {
                name: self.expr(&s.name, location)?,
                flags: SlotFlags {
                    default: s.default,
                    required: s.required,
                },
                data: self.arguments(s.data, location)?,
                body: self.lower_children(s.body)?,
            },
            TemplateNode::Fill(f) => {
                if let (Some(data), Some(default)) = (&f.data, &f.default) {
                    if data == default {
                        return Err(RenderError::invalid_template(
                            &self.template,
                            format!(
                                "fill binds both its data and its default content to '{}'",
                                data
                            ),
                            location,
                        ));
                    }
                }
                NodeKind::Fill {
                    name: self.expr(&f.name, location)?,
                    data_binding: f.data,
                    default_binding: f.default,
                    body: self.lower_children(f.body)?,
                }
            }
        };

        self.nodes[id.index()].kind = kind;
        Ok(id)
    }

    fn expr(&self, source: &str, location: SourceLocation) -> Result<Expr> {
        Expr::parse(source)
            .map_err(|message| RenderError::invalid_template(&self.template, message, location))
    }

    fn arguments(&self, args: Vec<ArgumentIR>, location: SourceLocation) -> Result<Vec<Argument>> {
        args.into_iter()
            .map(|a| {
                Ok(Argument {
                    value: self.expr(&a.value, location)?,
                    name: a.name,
                })
            })
            .collect()
    }
}

#[derive(Default)]
struct SlotInventory {
    slots: Vec<DeclaredSlot>,
}

impl TemplateVisitor for SlotInventory {
    fn visit_slot(&mut self, tree: &NodeTree, node: &Node) {
        if let NodeKind::Slot { name, flags, .. } = &node.kind {
            self.slots.push(DeclaredSlot {
                id: node.id,
                name: name.as_literal_str().map(str::to_string),
                flags: *flags,
                location: node.location,
            });
        }
        walk_node_children(self, tree, node);
    }
}

struct BindingReader<'a> {
    name: &'a str,
    through_components: bool,
    found: bool,
}

impl BindingReader<'_> {
    fn reads(&self, expr: &Expr) -> bool {
        expr.root() == Some(self.name)
    }

    fn reads_any(&self, args: &[Argument]) -> bool {
        args.iter().any(|a| self.reads(&a.value))
    }
}

impl TemplateVisitor for BindingReader<'_> {
    fn visit_node(&mut self, tree: &NodeTree, node: &Node) {
        if self.found {
            return;
        }
        self.found = match &node.kind {
            NodeKind::Text(_) => false,
            NodeKind::Variable(expr) => self.reads(expr),
            NodeKind::For { source, .. } => self.reads(source),
            NodeKind::If { condition, .. } => self.reads(condition),
            NodeKind::With { bindings, .. } => self.reads_any(bindings),
            NodeKind::Component { name, args, .. } => {
                self.through_components || self.reads(name) || self.reads_any(args)
            }
            NodeKind::Slot { name, data, .. } => self.reads(name) || self.reads_any(data),
            NodeKind::Fill { name, .. } => self.reads(name),
        };
        if !self.found {
            walk_node(self, tree, node);
        }
    }
}

/// Fills may only appear inside a component body, optionally wrapped in
/// control flow.
struct FillPlacement<'a> {
    template: &'a str,
    allowed: bool,
    error: Option<RenderError>,
}

impl FillPlacement<'_> {
    fn walk_with(&mut self, allowed: bool, tree: &NodeTree, node: &Node) {
        let previous = std::mem::replace(&mut self.allowed, allowed);
        walk_node_children(self, tree, node);
        self.allowed = previous;
    }
}

impl TemplateVisitor for FillPlacement<'_> {
    fn visit_component(&mut self, tree: &NodeTree, node: &Node) {
        self.walk_with(true, tree, node);
    }

    fn visit_slot(&mut self, tree: &NodeTree, node: &Node) {
        self.walk_with(false, tree, node);
    }

    fn visit_fill(&mut self, tree: &NodeTree, node: &Node) {
        if !self.allowed && self.error.is_none() {
            self.error = Some(RenderError::invalid_template(
                self.template,
                "fill outside of a component body",
                node.location,
            ));
        }
        self.walk_with(false, tree, node);
    }
}
