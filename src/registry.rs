//! Fill Registry
//!
//! The fills discovered for one component invocation, keyed by resolved name.
//! A registry is populated once by the capture pass and only read afterwards.

use crate::error::{RenderError, Result};
use crate::ir::SourceLocation;
use crate::node::{NodeId, NodeTree, SlotFlags};
use crate::report::FilledSlots;
use crate::scope::Scope;
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;
use tracing::warn;

/// Name of the fill made from bare content, and of the slot it targets.
pub const DEFAULT_SLOT_NAME: &str = "default";

/// A fill body plus the bindings needed to render it later.
#[derive(Debug, Clone)]
pub struct CapturedFill {
    pub name: String,
    pub tree: Arc<NodeTree>,
    pub body: Vec<NodeId>,
    /// `None` for the implicit default fill made of the whole invocation body
    pub node: Option<NodeId>,
    pub data_binding: Option<String>,
    pub default_binding: Option<String>,
    /// Loop bindings live at the fill, plus `with` bindings introduced inside
    /// the invocation or inside one of those loops
    pub captured: Scope,
    pub origin: SourceLocation,
    /// Invocation whose template text the fill was written in
    pub(crate) author: Rc<InvocationFrame>,
    /// Everything visible at the invocation site
    pub(crate) caller_ambient: Rc<Scope>,
}

impl CapturedFill {
    pub fn is_implicit(&self) -> bool {
        self.node.is_none()
    }
}

#[derive(Debug, Default)]
pub struct FillRegistry {
    component: String,
    fills: BTreeMap<String, CapturedFill>,
}

impl FillRegistry {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            fills: BTreeMap::new(),
        }
    }

    pub fn component(&self) -> &str {
        &self.component
    }

    pub(crate) fn insert(&mut self, fill: CapturedFill) -> Result<()> {
        if let Some(existing) = self.fills.get(&fill.name) {
            return Err(RenderError::DoublyFilled {
                component: self.component.clone(),
                name: fill.name,
                first: existing.origin,
                second: fill.origin,
                slot: None,
            });
        }
        self.fills.insert(fill.name.clone(), fill);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&CapturedFill> {
        self.fills.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fills.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.fills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fills.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fills.keys().map(String::as_str)
    }

    /// Names with a fill. `"default"` and the component's default slot name
    /// answer for each other.
    pub fn filled_slots(&self, default_slot: Option<&str>) -> FilledSlots {
        let mut filled = FilledSlots::new();
        for name in self.fills.keys() {
            filled.mark(name);
        }
        if let Some(default_slot) = default_slot {
            if self.contains(DEFAULT_SLOT_NAME) {
                filled.mark(default_slot);
            }
            if self.contains(default_slot) {
                filled.mark(DEFAULT_SLOT_NAME);
            }
        }
        filled
    }
}

/// Runtime state of one component invocation (or of a top-level render).
///
/// Slots in the invocation's template text resolve against `registry`, no
/// matter which component ends up rendering that text.
#[derive(Debug)]
pub(crate) struct InvocationFrame {
    pub component: String,
    pub registry: FillRegistry,
    /// Bindings computed by the component's context hook
    pub locals: Scope,
    slot_flags: RefCell<HashMap<String, SlotFlags>>,
}

impl InvocationFrame {
    pub fn new(component: impl Into<String>, registry: FillRegistry, locals: Scope) -> Self {
        Self {
            component: component.into(),
            registry,
            locals,
            slot_flags: RefCell::new(HashMap::new()),
        }
    }

    pub fn root(name: &str, data: Scope) -> Self {
        Self::new(name, FillRegistry::new(name), data)
    }

    /// Flags governing the slot `name`. The first occurrence resolved in this
    /// invocation fixes them; later occurrences that disagree are logged.
    pub fn effective_flags(&self, name: &str, slot: NodeId, declared: SlotFlags) -> SlotFlags {
        let mut seen = self.slot_flags.borrow_mut();
        match seen.get(name) {
            Some(first) => {
                if *first != declared {
                    warn!(
                        component = %self.component,
                        slot = %name,
                        node = %slot,
                        "slot occurrences disagree on default/required flags, keeping the first"
                    );
                }
                *first
            }
            None => {
                seen.insert(name.to_string(), declared);
                declared
            }
        }
    }
}
