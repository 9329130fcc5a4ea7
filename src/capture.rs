//! Fill Capture Pass
//!
//! Walks a component invocation's body in the caller's context and records
//! every fill it reaches, together with the loop bindings live at that point
//! and any `with` bindings introduced inside the invocation or inside one of
//! those loops. Fill bodies, components and slots are not rendered here; they
//! render later, when a slot selects them.

use crate::component::ComponentDefinition;
use crate::context::Context;
use crate::error::{RenderError, Result};
use crate::expr::as_name;
use crate::ir::SourceLocation;
use crate::node::{Node, NodeId, NodeKind, NodeTree};
use crate::registry::{CapturedFill, FillRegistry, InvocationFrame, DEFAULT_SLOT_NAME};
use crate::render::{Pass, Renderer};
use crate::scope::Scope;
use std::rc::Rc;
use std::sync::Arc;
use tracing::trace;

pub(crate) struct CaptureState {
    component: String,
    /// Context depth at the invocation site
    base_depth: usize,
    registry: FillRegistry,
    caller_ambient: Rc<Scope>,
    /// Loop bindings around the invocation, for the implicit default fill
    invocation_captured: Scope,
    first_fill: Option<SourceLocation>,
    /// First bare content found outside any fill
    first_content: Option<SourceLocation>,
}

impl CaptureState {
    fn new(component: &str, ctx: &Context) -> Self {
        Self {
            component: component.to_string(),
            base_depth: ctx.depth(),
            registry: FillRegistry::new(component),
            caller_ambient: Rc::new(ctx.ambient()),
            invocation_captured: ctx.snapshot_since(ctx.capture_start(ctx.depth())),
            first_fill: None,
            first_content: None,
        }
    }

    /// Whitespace-only output does not count as content.
    pub(crate) fn note_content(&mut self, rendered: &str, location: SourceLocation) {
        if !rendered.trim().is_empty() && self.first_content.is_none() {
            self.first_content = Some(location);
        }
    }

    /// A component or slot outside any fill: deferred, but still content.
    pub(crate) fn note_deferred(&mut self, location: SourceLocation) {
        if self.first_content.is_none() {
            self.first_content = Some(location);
        }
    }

    pub(crate) fn capture(
        &mut self,
        tree: &Arc<NodeTree>,
        node: &Node,
        ctx: &Context,
        frame: &Rc<InvocationFrame>,
    ) -> Result<()> {
        let NodeKind::Fill {
            name,
            data_binding,
            default_binding,
            body,
        } = &node.kind
        else {
            return Err(RenderError::invalid_template(
                tree.name(),
                "expected a fill node",
                node.location,
            ));
        };

        let value = name.evaluate(ctx);
        let Some(name) = as_name(&value) else {
            return Err(RenderError::InvalidFillName {
                value: value.to_string(),
                location: node.location,
            });
        };
        trace!(component = %self.component, fill = %name, node = %node.id, "captured fill");

        self.first_fill.get_or_insert(node.location);
        self.registry.insert(CapturedFill {
            name,
            tree: tree.clone(),
            body: body.clone(),
            node: Some(node.id),
            data_binding: data_binding.clone(),
            default_binding: default_binding.clone(),
            captured: ctx.snapshot_since(ctx.capture_start(self.base_depth)),
            origin: node.location,
            author: frame.clone(),
            caller_ambient: self.caller_ambient.clone(),
        })
    }

    fn finish(
        self,
        tree: &Arc<NodeTree>,
        body: &[NodeId],
        frame: &Rc<InvocationFrame>,
        definition: &ComponentDefinition,
    ) -> Result<FillRegistry> {
        let CaptureState {
            component,
            mut registry,
            caller_ambient,
            invocation_captured,
            first_fill,
            first_content,
            ..
        } = self;

        let Some(content) = first_content else {
            return Ok(registry);
        };

        let Some(fill) = first_fill else {
            // No named fills: the whole body is the default fill.
            registry.insert(CapturedFill {
                name: DEFAULT_SLOT_NAME.to_string(),
                tree: tree.clone(),
                body: body.to_vec(),
                node: None,
                data_binding: None,
                default_binding: None,
                captured: invocation_captured,
                origin: content,
                author: frame.clone(),
                caller_ambient,
            })?;
            return Ok(registry);
        };

        // Bare content next to named fills. If the default slot is also
        // filled by name, the bare content would fill it a second time.
        let conflict = registry.get(DEFAULT_SLOT_NAME).or_else(|| {
            definition
                .default_slot()
                .and_then(|name| registry.get(name))
        });
        match conflict {
            Some(existing) => Err(RenderError::DoublyFilled {
                component,
                name: existing.name.clone(),
                first: existing.origin,
                second: content,
                slot: None,
            }),
            None => Err(RenderError::MixedImplicitExplicitFill {
                component,
                content,
                fill,
            }),
        }
    }
}

impl Renderer<'_> {
    /// Builds the fill registry for one invocation of `definition`.
    pub(crate) fn capture_fills(
        &mut self,
        tree: &Arc<NodeTree>,
        body: &[NodeId],
        ctx: &mut Context,
        frame: &Rc<InvocationFrame>,
        definition: &ComponentDefinition,
    ) -> Result<FillRegistry> {
        let mut state = CaptureState::new(&definition.name, ctx);
        // Eagerly rendered text only matters for content detection.
        let mut scratch = String::new();
        self.walk(
            tree,
            body,
            ctx,
            frame,
            &mut Pass::Capturing(&mut state),
            &mut scratch,
        )?;
        state.finish(tree, body, frame, definition)
    }
}
