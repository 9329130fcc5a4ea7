//! Slot Resolution Pass
//!
//! Decides, for each slot occurrence reached while rendering a component,
//! which captured fill supplies its content, and renders that fill in a
//! freshly reconstructed context.
//!
//! Fill context, outermost to innermost:
//!
//! | visibility | frames                                                        |
//! |------------|---------------------------------------------------------------|
//! | isolated   | author component bindings, captured bindings                 |
//! | full       | caller scope chain, slot owner bindings, captured bindings   |
//!
//! In both modes the fill's `data` binding (the slot's data) and `default`
//! binding (the slot's rendered default content) sit on top.

use crate::config::Visibility;
use crate::context::{Context, FrameKind};
use crate::error::{RenderError, Result};
use crate::expr::as_name;
use crate::node::{Node, NodeId, NodeKind, NodeTree};
use crate::registry::{CapturedFill, InvocationFrame, DEFAULT_SLOT_NAME};
use crate::render::{evaluate_arguments, Pass, Renderer};
use crate::report::{normalize_slot_name, SlotOutcome, SlotSource};
use crate::scope::Scope;
use serde_json::Value;
use std::rc::Rc;
use std::sync::Arc;
use tracing::debug;

impl Renderer<'_> {
    pub(crate) fn render_slot(
        &mut self,
        tree: &Arc<NodeTree>,
        node: &Node,
        ctx: &mut Context,
        frame: &Rc<InvocationFrame>,
        out: &mut String,
    ) -> Result<()> {
        let NodeKind::Slot {
            name,
            flags,
            data,
            body,
        } = &node.kind
        else {
            return Err(RenderError::invalid_template(
                tree.name(),
                "expected a slot node",
                node.location,
            ));
        };

        let value = name.evaluate(ctx);
        let Some(slot_name) = as_name(&value) else {
            return Err(RenderError::InvalidSlotName {
                value: value.to_string(),
                location: node.location,
            });
        };
        let flags = frame.effective_flags(&slot_name, node.id, *flags);

        let registry = &frame.registry;
        let named = registry.get(&slot_name);
        let fallback = if flags.default && slot_name != DEFAULT_SLOT_NAME {
            registry.get(DEFAULT_SLOT_NAME)
        } else {
            None
        };
        if let (Some(by_name), Some(by_default)) = (named, fallback) {
            return Err(RenderError::DoublyFilled {
                component: frame.component.clone(),
                name: slot_name,
                first: by_name.origin,
                second: by_default.origin,
                slot: Some(node.location),
            });
        }

        let fill = named.or(fallback);
        if fill.is_none() && flags.required {
            return Err(RenderError::RequiredSlotUnfilled {
                component: frame.component.clone(),
                name: slot_name,
                slot: node.location,
            });
        }

        let source = match fill {
            Some(f) => SlotSource::Fill { origin: f.origin },
            None if body.is_empty() => SlotSource::Empty,
            None => SlotSource::Default,
        };
        debug!(slot = %slot_name, node = %node.id, source = ?source, "resolving slot");
        self.outcomes.push(SlotOutcome {
            component: frame.component.clone(),
            slot: node.id,
            location: node.location,
            normalized: normalize_slot_name(&slot_name),
            name: slot_name,
            source,
        });

        let slot_data = evaluate_arguments(data, ctx);
        match fill {
            Some(fill) => self.render_fill(tree, fill, body, &slot_data, ctx, frame, out),
            None => self.render_slot_default(tree, body, &slot_data, ctx, frame, out),
        }
    }

    /// Renders a slot's own content with its data bound by name.
    fn render_slot_default(
        &mut self,
        tree: &Arc<NodeTree>,
        body: &[NodeId],
        slot_data: &Scope,
        ctx: &mut Context,
        frame: &Rc<InvocationFrame>,
        out: &mut String,
    ) -> Result<()> {
        ctx.push(FrameKind::Block, slot_data.clone());
        let result = self.walk(tree, body, ctx, frame, &mut Pass::Resolving, out);
        ctx.pop();
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn render_fill(
        &mut self,
        tree: &Arc<NodeTree>,
        fill: &CapturedFill,
        slot_body: &[NodeId],
        slot_data: &Scope,
        ctx: &mut Context,
        frame: &Rc<InvocationFrame>,
        out: &mut String,
    ) -> Result<()> {
        let mut fill_ctx = Context::new(self.config.globals.clone());
        match self.config.visibility {
            Visibility::Isolated => {
                fill_ctx.push(FrameKind::Component, fill.author.locals.clone());
            }
            Visibility::Full => {
                fill_ctx.push(FrameKind::Block, fill.caller_ambient.as_ref().clone());
                fill_ctx.push(FrameKind::Component, frame.locals.clone());
            }
        }
        fill_ctx.push(FrameKind::Loop, fill.captured.clone());

        let mut exposed = Scope::new();
        if let Some(binding) = &fill.data_binding {
            exposed.set(binding.clone(), slot_data.to_value());
        }
        // The slot's own content renders only when the fill can read it
        let through_components = self.config.visibility == Visibility::Full;
        if let Some(binding) = fill
            .default_binding
            .as_ref()
            .filter(|b| fill.tree.reads_binding(&fill.body, b, through_components))
        {
            let mut rendered = String::new();
            self.render_slot_default(tree, slot_body, slot_data, ctx, frame, &mut rendered)?;
            exposed.set(binding.clone(), Value::String(rendered));
        }
        fill_ctx.push(FrameKind::Block, exposed);

        self.walk(
            &fill.tree,
            &fill.body,
            &mut fill_ctx,
            &fill.author,
            &mut Pass::Resolving,
            out,
        )
    }
}
