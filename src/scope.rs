use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered set of `name -> value` bindings.
///
/// Setting an existing name replaces its value in place, so iteration order is
/// the order in which names were first bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Map<String, Value>", into = "Map<String, Value>")]
pub struct Scope {
    bindings: Vec<(String, Value)>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Scope::set`].
    pub fn with(mut self, name: impl Into<String>, value: Value) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.bindings.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.bindings.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Overlay `other` on top of this scope; its bindings win.
    pub fn merge(&mut self, other: &Scope) {
        for (name, value) in other.iter() {
            self.set(name, value.clone());
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.clone().into())
    }

    /// Bindings of a JSON object; `None` for any other value.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(map.into()),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Scope {
    fn from(map: Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl From<Scope> for Map<String, Value> {
    fn from(scope: Scope) -> Self {
        scope.bindings.into_iter().collect()
    }
}

impl FromIterator<(String, Value)> for Scope {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut scope = Scope::new();
        for (name, value) in iter {
            scope.set(name, value);
        }
        scope
    }
}
