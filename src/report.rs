//! Slot diagnostics
//!
//! [`FilledSlots`] answers "was a fill supplied for this slot" for one
//! invocation and is handed to context hooks and templates. [`RenderReport`]
//! records how every slot occurrence of a render was satisfied.

use crate::ir::SourceLocation;
use crate::node::NodeId;
use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

lazy_static! {
    static ref NON_IDENTIFIER_RE: Regex = Regex::new(r"[^A-Za-z0-9_]").unwrap();
}

/// Replaces every non-identifier character with `_`, so `"my-slot"` can be
/// queried as `is_filled.my_slot`.
pub fn normalize_slot_name(name: &str) -> String {
    NON_IDENTIFIER_RE.replace_all(name, "_").into_owned()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilledSlots {
    names: BTreeMap<String, bool>,
}

impl FilledSlots {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn mark(&mut self, name: &str) {
        self.names.insert(normalize_slot_name(name), true);
    }

    pub fn is_filled(&self, name: &str) -> bool {
        self.names
            .get(&normalize_slot_name(name))
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .names
            .iter()
            .map(|(k, v)| (k.clone(), Value::Bool(*v)))
            .collect();
        Value::Object(map)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SlotSource {
    /// A fill supplied by the caller, declared at `origin`
    Fill { origin: SourceLocation },
    /// The slot's own default content
    Default,
    /// No fill and no default content
    Empty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotOutcome {
    pub component: String,
    pub slot: NodeId,
    pub location: SourceLocation,
    pub name: String,
    pub normalized: String,
    pub source: SlotSource,
}

impl SlotOutcome {
    pub fn is_filled(&self) -> bool {
        matches!(self.source, SlotSource::Fill { .. })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderReport {
    pub outcomes: Vec<SlotOutcome>,
}

impl RenderReport {
    /// Whether any occurrence of the named slot was rendered from a fill.
    pub fn is_filled(&self, name: &str) -> bool {
        let normalized = normalize_slot_name(name);
        self.outcomes
            .iter()
            .any(|o| o.normalized == normalized && o.is_filled())
    }

    pub fn for_component<'a>(&'a self, component: &'a str) -> impl Iterator<Item = &'a SlotOutcome> {
        self.outcomes.iter().filter(move |o| o.component == component)
    }
}
