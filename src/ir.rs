//! Template IR
//!
//! The nested, serde-friendly node tree handed to the engine by an external
//! parser. Expressions are kept as source strings here; lowering into
//! [`crate::node::NodeTree`] parses them once.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

impl SourceLocation {
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum TemplateNode {
    Text(TextNode),
    Variable(VariableNode),
    For(ForNode),
    If(IfNode),
    With(WithNode),
    Component(ComponentNode),
    Slot(SlotNode),
    Fill(FillNode),
}

impl TemplateNode {
    pub fn location(&self) -> SourceLocation {
        match self {
            TemplateNode::Text(n) => n.location,
            TemplateNode::Variable(n) => n.location,
            TemplateNode::For(n) => n.location,
            TemplateNode::If(n) => n.location,
            TemplateNode::With(n) => n.location,
            TemplateNode::Component(n) => n.location,
            TemplateNode::Slot(n) => n.location,
            TemplateNode::Fill(n) => n.location,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    pub value: String,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableNode {
    pub expression: String,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForNode {
    pub item_var: String,
    #[serde(default)]
    pub index_var: Option<String>,
    pub source: String,
    pub body: Vec<TemplateNode>,
    /// Rendered instead of `body` when the source yields no items
    #[serde(default)]
    pub empty: Vec<TemplateNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IfNode {
    pub condition: String,
    pub consequent: Vec<TemplateNode>,
    #[serde(default)]
    pub alternate: Vec<TemplateNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithNode {
    pub bindings: Vec<ArgumentIR>,
    pub body: Vec<TemplateNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    /// Expression yielding the registered component name
    pub name: String,
    #[serde(default)]
    pub args: Vec<ArgumentIR>,
    #[serde(default)]
    pub body: Vec<TemplateNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotNode {
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub required: bool,
    /// Scoped-slot data exposed to whichever fill renders here
    #[serde(default)]
    pub data: Vec<ArgumentIR>,
    #[serde(default)]
    pub body: Vec<TemplateNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillNode {
    pub name: String,
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub body: Vec<TemplateNode>,
    #[serde(default)]
    pub location: SourceLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArgumentIR {
    pub name: String,
    pub value: String,
}
