//! Rendering
//!
//! One tree walk serves both passes of a component invocation. Under
//! [`Pass::Resolving`] every node renders normally. Under [`Pass::Capturing`]
//! fill nodes are recorded instead of rendered, and component and slot nodes
//! are deferred untouched so nothing inside an unselected branch runs early.

use crate::capture::CaptureState;
use crate::component::{ComponentLookup, HookInput};
use crate::config::{RenderConfig, Visibility};
use crate::context::{Context, FrameKind};
use crate::error::{RenderError, Result};
use crate::expr::{as_name, is_truthy, iterate, render_value};
use crate::node::{Argument, Node, NodeId, NodeKind, NodeTree};
use crate::registry::InvocationFrame;
use crate::report::{RenderReport, SlotOutcome};
use crate::scope::Scope;
use serde_json::{json, Value};
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, debug_span};

/// Binding under which a component's template finds per-invocation metadata
/// such as `component_vars.is_filled.<slot>`.
pub const COMPONENT_VARS: &str = "component_vars";

pub(crate) enum Pass<'p> {
    Resolving,
    Capturing(&'p mut CaptureState),
}

pub(crate) struct Renderer<'e> {
    pub(crate) config: &'e RenderConfig,
    lookup: &'e dyn ComponentLookup,
    depth: usize,
    pub(crate) outcomes: Vec<SlotOutcome>,
}

impl<'e> Renderer<'e> {
    pub fn new(config: &'e RenderConfig, lookup: &'e dyn ComponentLookup) -> Self {
        Self {
            config,
            lookup,
            depth: 0,
            outcomes: Vec::new(),
        }
    }

    pub fn into_report(self) -> RenderReport {
        RenderReport {
            outcomes: self.outcomes,
        }
    }

    /// Renders a tree that is not itself a component. `data` plays the role of
    /// the component bindings for fills written in it.
    pub fn render_root(&mut self, tree: &Arc<NodeTree>, data: Scope) -> Result<String> {
        let mut ctx = Context::new(self.config.globals.clone());
        ctx.push(FrameKind::Component, data.clone());
        let frame = Rc::new(InvocationFrame::root(tree.name(), data));

        let mut out = String::new();
        self.walk(
            tree,
            tree.roots(),
            &mut ctx,
            &frame,
            &mut Pass::Resolving,
            &mut out,
        )?;
        Ok(out)
    }

    pub(crate) fn walk(
        &mut self,
        tree: &Arc<NodeTree>,
        ids: &[NodeId],
        ctx: &mut Context,
        frame: &Rc<InvocationFrame>,
        pass: &mut Pass<'_>,
        out: &mut String,
    ) -> Result<()> {
        for id in ids {
            self.walk_node(tree, tree.node(*id), ctx, frame, pass, out)?;
        }
        Ok(())
    }

    fn walk_node(
        &mut self,
        tree: &Arc<NodeTree>,
        node: &Node,
        ctx: &mut Context,
        frame: &Rc<InvocationFrame>,
        pass: &mut Pass<'_>,
        out: &mut String,
    ) -> Result<()> {
        match &node.kind {
            NodeKind::Text(value) => {
                if let Pass::Capturing(state) = pass {
                    state.note_content(value, node.location);
                }
                out.push_str(value);
            }
            NodeKind::Variable(expr) => {
                let rendered = render_value(&expr.evaluate(ctx));
                if let Pass::Capturing(state) = pass {
                    state.note_content(&rendered, node.location);
                }
                out.push_str(&rendered);
            }
            NodeKind::For {
                item_var,
                index_var,
                source,
                body,
                empty,
            } => {
                let items = iterate(&source.evaluate(ctx));
                if items.is_empty() {
                    return self.walk(tree, empty, ctx, frame, pass, out);
                }
                for (index, item) in items.into_iter().enumerate() {
                    let mut scope = Scope::new().with(item_var.clone(), item);
                    if let Some(index_var) = index_var {
                        scope.set(index_var.clone(), Value::from(index));
                    }
                    ctx.push(FrameKind::Loop, scope);
                    let result = self.walk(tree, body, ctx, frame, pass, out);
                    ctx.pop();
                    result?;
                }
            }
            NodeKind::If {
                condition,
                consequent,
                alternate,
            } => {
                let branch = if is_truthy(&condition.evaluate(ctx)) {
                    consequent
                } else {
                    alternate
                };
                self.walk(tree, branch, ctx, frame, pass, out)?;
            }
            NodeKind::With { bindings, body } => {
                let scope = evaluate_arguments(bindings, ctx);
                ctx.push(FrameKind::With, scope);
                let result = self.walk(tree, body, ctx, frame, pass, out);
                ctx.pop();
                result?;
            }
            NodeKind::Component { .. } => match pass {
                Pass::Capturing(state) => state.note_deferred(node.location),
                Pass::Resolving => self.render_component(tree, node, ctx, frame, out)?,
            },
            NodeKind::Slot { .. } => match pass {
                Pass::Capturing(state) => state.note_deferred(node.location),
                Pass::Resolving => self.render_slot(tree, node, ctx, frame, out)?,
            },
            NodeKind::Fill { .. } => match pass {
                Pass::Capturing(state) => state.capture(tree, node, ctx, frame)?,
                Pass::Resolving => {
                    return Err(RenderError::invalid_template(
                        tree.name(),
                        "fill outside of a component body",
                        node.location,
                    ))
                }
            },
        }
        Ok(())
    }

    /// Invoked → Capturing → Captured → Resolving → Done
    fn render_component(
        &mut self,
        tree: &Arc<NodeTree>,
        node: &Node,
        ctx: &mut Context,
        frame: &Rc<InvocationFrame>,
        out: &mut String,
    ) -> Result<()> {
        let NodeKind::Component { name, args, body } = &node.kind else {
            return Err(RenderError::invalid_template(
                tree.name(),
                "expected a component node",
                node.location,
            ));
        };

        let name_value = name.evaluate(ctx);
        let Some(component) = as_name(&name_value) else {
            return Err(RenderError::UnknownComponent {
                name: name_value.to_string(),
            });
        };
        if self.depth >= self.config.max_depth {
            return Err(RenderError::RecursionLimit {
                component,
                limit: self.config.max_depth,
            });
        }
        let definition = self.lookup.resolve_component(&component)?;

        let span = debug_span!("component", name = %definition.name, node = %node.id);
        let _guard = span.enter();

        let kwargs = evaluate_arguments(args, ctx);

        debug!("capturing fills");
        let registry = self.capture_fills(tree, body, ctx, frame, &definition)?;
        debug!(fills = registry.len(), "captured fills");

        let filled = registry.filled_slots(definition.default_slot());
        let mut locals = definition
            .hook()
            .compute_local_bindings(&HookInput {
                component: &definition.name,
                kwargs: &kwargs,
                filled: &filled,
            })?;
        locals.set(COMPONENT_VARS, json!({ "is_filled": filled.to_value() }));

        let mut component_ctx = Context::new(self.config.globals.clone());
        if self.config.visibility == Visibility::Full {
            component_ctx.push(FrameKind::Block, ctx.ambient());
        }
        component_ctx.push(FrameKind::Component, locals.clone());

        let invocation = Rc::new(InvocationFrame::new(
            definition.name.clone(),
            registry,
            locals,
        ));

        debug!("resolving slots");
        self.depth += 1;
        let result = self.walk(
            &definition.template,
            definition.template.roots(),
            &mut component_ctx,
            &invocation,
            &mut Pass::Resolving,
            out,
        );
        self.depth -= 1;
        result?;

        debug!("done");
        Ok(())
    }
}

pub(crate) fn evaluate_arguments(args: &[Argument], ctx: &Context) -> Scope {
    args.iter()
        .map(|a| (a.name.clone(), a.value.evaluate(ctx)))
        .collect()
}
