//! Engine
//!
//! Entry point for rendering. An [`Engine`] owns the configuration, the
//! component lookup and the template cache; every render call builds its own
//! contexts and registries, so independent renders can run in parallel.

use crate::cache::TemplateCache;
use crate::component::ComponentLookup;
use crate::config::RenderConfig;
use crate::error::{RenderError, Result};
use crate::ir::{ArgumentIR, ComponentNode, SourceLocation, TemplateNode};
use crate::node::NodeTree;
use crate::render::Renderer;
use crate::report::RenderReport;
use crate::scope::Scope;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{debug, info_span};

/// One independent render for [`Engine::render_batch`].
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub tree: Arc<NodeTree>,
    pub data: Scope,
}

impl RenderJob {
    pub fn new(tree: Arc<NodeTree>, data: Scope) -> Self {
        Self { tree, data }
    }
}

pub struct Engine {
    config: RenderConfig,
    components: Arc<dyn ComponentLookup>,
    cache: TemplateCache,
}

impl Engine {
    pub fn new(config: RenderConfig, components: impl ComponentLookup + 'static) -> Self {
        Self::with_lookup(config, Arc::new(components))
    }

    pub fn with_lookup(config: RenderConfig, components: Arc<dyn ComponentLookup>) -> Self {
        Self {
            config,
            components,
            cache: TemplateCache::new(),
        }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    pub fn cache(&self) -> &TemplateCache {
        &self.cache
    }

    /// Lowers a JSON IR template, reusing the cached tree for identical input.
    pub fn load_template(&self, name: &str, source: &str) -> Result<Arc<NodeTree>> {
        self.cache.get_or_load(name, source)
    }

    pub fn render(&self, tree: &Arc<NodeTree>, data: Scope) -> Result<String> {
        self.render_with_report(tree, data).map(|(html, _)| html)
    }

    /// Renders and reports how each slot occurrence was satisfied.
    pub fn render_with_report(
        &self,
        tree: &Arc<NodeTree>,
        data: Scope,
    ) -> Result<(String, RenderReport)> {
        let span = info_span!("render", template = %tree.name());
        let _guard = span.enter();

        let mut renderer = Renderer::new(&self.config, self.components.as_ref());
        let html = renderer.render_root(tree, data)?;
        let report = renderer.into_report();
        debug!(slots = report.outcomes.len(), "render complete");
        Ok((html, report))
    }

    /// Renders a registered component with the given arguments and no fills.
    pub fn render_component(&self, name: &str, kwargs: Scope) -> Result<String> {
        let literal = |value: &serde_json::Value| {
            serde_json::to_string(value).map_err(|e| {
                RenderError::invalid_template(name, e.to_string(), SourceLocation::default())
            })
        };
        let args = kwargs
            .iter()
            .map(|(key, value)| {
                Ok(ArgumentIR {
                    name: key.to_string(),
                    value: literal(value)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let invocation = TemplateNode::Component(ComponentNode {
            name: literal(&serde_json::Value::from(name))?,
            args,
            body: vec![],
            location: SourceLocation::default(),
        });
        let tree = Arc::new(NodeTree::from_ir(name, vec![invocation])?);
        self.render(&tree, Scope::new())
    }

    /// Renders independent jobs in parallel. Jobs share nothing but their
    /// trees; results keep the order of `jobs`.
    pub fn render_batch(&self, jobs: &[RenderJob]) -> Vec<Result<String>> {
        jobs.par_iter()
            .map(|job| self.render(&job.tree, job.data.clone()))
            .collect()
    }
}
