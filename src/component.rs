use crate::error::{RenderError, Result};
use crate::node::NodeTree;
use crate::report::FilledSlots;
use crate::scope::Scope;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// What a context hook gets to see about the invocation it is computing for.
#[derive(Debug, Clone, Copy)]
pub struct HookInput<'a> {
    pub component: &'a str,
    /// Arguments evaluated in the caller's context
    pub kwargs: &'a Scope,
    /// Fills supplied to this invocation
    pub filled: &'a FilledSlots,
}

/// Computes the bindings a component's own template renders with.
pub trait ContextHook: Send + Sync {
    fn compute_local_bindings(&self, input: &HookInput<'_>) -> Result<Scope>;
}

impl<F> ContextHook for F
where
    F: Fn(&HookInput<'_>) -> Result<Scope> + Send + Sync,
{
    fn compute_local_bindings(&self, input: &HookInput<'_>) -> Result<Scope> {
        self(input)
    }
}

/// Pins a closure to the [`ContextHook`] signature so its argument
/// lifetimes are inferred correctly.
pub fn hook_fn<F>(f: F) -> F
where
    F: Fn(&HookInput<'_>) -> Result<Scope> + Send + Sync,
{
    f
}

/// Exposes the invocation's arguments unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ContextHook for PassThrough {
    fn compute_local_bindings(&self, input: &HookInput<'_>) -> Result<Scope> {
        Ok(input.kwargs.clone())
    }
}

#[derive(Clone)]
pub struct ComponentDefinition {
    pub name: String,
    pub template: Arc<NodeTree>,
    hook: Arc<dyn ContextHook>,
    default_slot: Option<String>,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>, template: Arc<NodeTree>) -> Self {
        // Lowering guarantees at most one literal name is marked default.
        let default_slot = template
            .declared_slots()
            .into_iter()
            .filter(|s| s.flags.default)
            .find_map(|s| s.name);
        Self {
            name: name.into(),
            template,
            hook: Arc::new(PassThrough),
            default_slot,
        }
    }

    pub fn with_hook(mut self, hook: impl ContextHook + 'static) -> Self {
        self.hook = Arc::new(hook);
        self
    }

    pub fn hook(&self) -> &dyn ContextHook {
        self.hook.as_ref()
    }

    /// Literal name of the slot marked `default`, if the template has one.
    pub fn default_slot(&self) -> Option<&str> {
        self.default_slot.as_deref()
    }
}

impl fmt::Debug for ComponentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentDefinition")
            .field("name", &self.name)
            .field("template", &self.template.name())
            .field("default_slot", &self.default_slot)
            .finish()
    }
}

/// Resolves component names found in templates.
pub trait ComponentLookup: Send + Sync {
    fn resolve_component(&self, name: &str) -> Result<Arc<ComponentDefinition>>;
}

#[derive(Debug, Clone, Default)]
pub struct ComponentLibrary {
    components: HashMap<String, Arc<ComponentDefinition>>,
}

impl ComponentLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers under the definition's name, returning any replaced definition.
    pub fn register(&mut self, definition: ComponentDefinition) -> Option<Arc<ComponentDefinition>> {
        self.components
            .insert(definition.name.clone(), Arc::new(definition))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

impl ComponentLookup for ComponentLibrary {
    fn resolve_component(&self, name: &str) -> Result<Arc<ComponentDefinition>> {
        // Exact match first, then case-insensitive
        if let Some(found) = self.components.get(name) {
            return Ok(found.clone());
        }
        let lower_name = name.to_lowercase();
        self.components
            .iter()
            .find(|(comp_name, _)| comp_name.to_lowercase() == lower_name)
            .map(|(_, def)| def.clone())
            .ok_or_else(|| RenderError::UnknownComponent {
                name: name.to_string(),
            })
    }
}
