//! # Slotfill
//!
//! Slot/fill resolution for component templates. A component template
//! declares named slots; the caller's invocation body supplies fills for
//! them. Every invocation renders in two passes: fills are captured first,
//! then the component's template renders and each slot picks its fill.
//!
//! ## Slot Resolution Invariants
//!
//! 1. **Capture Before Resolve**: every fill of an invocation is captured
//!    before any slot of that invocation is resolved. Capturing renders no
//!    fill body, no nested component and no slot.
//!
//! 2. **One Fill Per Name**: a slot name receives at most one fill per
//!    invocation. A second fill for the same name fails with
//!    `SLOT-DOUBLY-FILLED`, including the default slot filled both by name
//!    and under `"default"`.
//!
//! 3. **Captured Bindings**: loop bindings live at the fill site, including
//!    loops around the invocation, are snapshotted at capture time together
//!    with any `with` bindings nested in them or in the invocation body. A
//!    fill inside a loop sees the iteration it was written in, never the
//!    last one. A `with` outside every loop is not captured.
//!
//! 4. **Fill Context**: a fill renders with (outermost first)
//!    - `isolated`: the bindings of the component whose template contains
//!      the fill, then the captured bindings
//!    - `full`: the caller's scope chain, then the slot owner's bindings,
//!      then the captured bindings
//!
//!    and, on top, its `data` binding (the slot's data) and `default`
//!    binding (the slot's own rendered content, rendered only when the fill
//!    body reads it).
//!
//! 5. **Required Slots**: a required slot with no fill fails with
//!    `SLOT-REQUIRED-UNFILLED`. An empty fill satisfies it.
//!
//! 6. **Idempotence**: rendering the same tree with the same data twice
//!    yields identical output. Trees are immutable and shared; registries
//!    and contexts belong to a single render.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod cache;
mod capture;
mod component;
mod config;
mod context;
mod engine;
mod error;
mod expr;
mod ir;
mod native;
mod node;
mod registry;
mod render;
mod report;
mod resolve;
mod scope;
mod visitor;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod capture_tests;
#[cfg(test)]
mod visibility_tests;

pub use cache::TemplateCache;
pub use component::{
    hook_fn, ComponentDefinition, ComponentLibrary, ComponentLookup, ContextHook, HookInput,
    PassThrough,
};
pub use config::{RenderConfig, Visibility, DEFAULT_MAX_DEPTH};
pub use context::{Context, FrameKind};
pub use engine::{Engine, RenderJob};
pub use error::*;
pub use expr::Expr;
pub use ir::*;
pub use native::{render_request, render_request_json, NativeError, RenderRequest, RenderResponse};
pub use node::{Argument, DeclaredSlot, Node, NodeId, NodeKind, NodeTree, SlotFlags};
pub use registry::{CapturedFill, FillRegistry, DEFAULT_SLOT_NAME};
pub use render::COMPONENT_VARS;
pub use report::{normalize_slot_name, FilledSlots, RenderReport, SlotOutcome, SlotSource};
pub use scope::Scope;
pub use visitor::{walk_children, walk_node, walk_node_children, TemplateVisitor};

#[cfg(feature = "napi")]
pub use native::render_template_native;

#[cfg(feature = "napi")]
#[napi]
pub fn render_bridge() -> String {
    "Slotfill Native Bridge Connected".to_string()
}
