//! JSON bridge
//!
//! A single request/response entry point for hosts that hand the engine
//! serialized IR, such as the Node.js binding behind the `napi` feature.

#[cfg(feature = "napi")]
use napi_derive::napi;

use crate::component::{ComponentDefinition, ComponentLibrary};
use crate::config::RenderConfig;
use crate::engine::Engine;
use crate::error::{RenderError, Result};
use crate::ir::{SourceLocation, TemplateNode};
use crate::node::NodeTree;
use crate::report::SlotOutcome;
use crate::scope::Scope;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    #[serde(default = "default_template_name")]
    pub template_name: String,
    pub template: Vec<TemplateNode>,
    /// Component templates by name; every component passes its arguments
    /// through unchanged.
    #[serde(default)]
    pub components: BTreeMap<String, Vec<TemplateNode>>,
    #[serde(default)]
    pub data: Scope,
    #[serde(default)]
    pub config: RenderConfig,
}

fn default_template_name() -> String {
    "template".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NativeError {
    pub code: String,
    pub message: String,
    pub guarantee: String,
}

impl From<&RenderError> for NativeError {
    fn from(err: &RenderError) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            guarantee: err.guarantee().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderResponse {
    pub html: String,
    pub slots: Vec<SlotOutcome>,
    pub errors: Vec<NativeError>,
}

/// Renders a [`RenderRequest`]. Render failures are reported in
/// [`RenderResponse::errors`].
pub fn render_request(request: RenderRequest) -> RenderResponse {
    match run(request) {
        Ok((html, report)) => RenderResponse {
            html,
            slots: report.outcomes,
            errors: vec![],
        },
        Err(err) => RenderResponse {
            errors: vec![NativeError::from(&err)],
            ..Default::default()
        },
    }
}

fn run(request: RenderRequest) -> Result<(String, crate::report::RenderReport)> {
    let mut library = ComponentLibrary::new();
    for (name, nodes) in request.components {
        let tree = NodeTree::from_ir(name.clone(), nodes)?;
        library.register(ComponentDefinition::new(name, Arc::new(tree)));
    }

    let engine = Engine::new(request.config, library);
    let tree = Arc::new(NodeTree::from_ir(request.template_name, request.template)?);
    engine.render_with_report(&tree, request.data)
}

/// JSON in, JSON out. Render failures land in the response's `errors`; only
/// an unreadable request is an `Err`.
pub fn render_request_json(request_json: &str) -> Result<String> {
    let request: RenderRequest = serde_json::from_str(request_json).map_err(|e| {
        RenderError::invalid_template(
            "request",
            format!("Request parse error: {}", e),
            SourceLocation::new(e.line() as u32, e.column() as u32),
        )
    })?;
    let response = render_request(request);
    serde_json::to_string(&response).map_err(|e| {
        RenderError::invalid_template("response", e.to_string(), SourceLocation::default())
    })
}

#[cfg(feature = "napi")]
#[napi]
pub fn render_template_native(request_json: String) -> napi::Result<String> {
    render_request_json(&request_json).map_err(|e| napi::Error::from_reason(e.to_string()))
}
