//! Shared fixtures for the render test modules.

use crate::component::{ComponentDefinition, ComponentLibrary};
use crate::config::{RenderConfig, Visibility};
use crate::engine::Engine;
use crate::error::Result;
use crate::node::NodeTree;
use crate::report::RenderReport;
use crate::scope::Scope;
use serde_json::Value;
use std::sync::Arc;

pub fn tree(name: &str, nodes: Value) -> Arc<NodeTree> {
    Arc::new(NodeTree::from_json(name, &nodes.to_string()).unwrap())
}

pub fn component(name: &str, nodes: Value) -> ComponentDefinition {
    ComponentDefinition::new(name, tree(name, nodes))
}

pub fn library(components: Vec<ComponentDefinition>) -> ComponentLibrary {
    let mut library = ComponentLibrary::new();
    for definition in components {
        library.register(definition);
    }
    library
}

pub fn engine(visibility: Visibility, components: Vec<ComponentDefinition>) -> Engine {
    Engine::new(
        RenderConfig::default().with_visibility(visibility),
        library(components),
    )
}

pub fn render(engine: &Engine, page: Value, data: Scope) -> Result<String> {
    engine.render(&tree("page", page), data)
}

pub fn render_with_report(
    engine: &Engine,
    page: Value,
    data: Scope,
) -> Result<(String, RenderReport)> {
    engine.render_with_report(&tree("page", page), data)
}
