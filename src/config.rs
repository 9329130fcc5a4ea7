use crate::scope::Scope;
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Which variables a rendered fill can see.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Fills see their author component's bindings and the loop/with
    /// bindings captured between the invocation and the fill.
    Isolated,
    /// Fills see the whole caller scope chain, then the bindings of the
    /// component that owns the slot, then the captured bindings.
    #[default]
    Full,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RenderConfig {
    pub visibility: Visibility,
    /// Maximum nesting of component invocations
    pub max_depth: usize,
    /// Request-scoped bindings visible from every template
    pub globals: Scope,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            visibility: Visibility::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            globals: Scope::new(),
        }
    }
}

impl RenderConfig {
    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_globals(mut self, globals: Scope) -> Self {
        self.globals = globals;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::from_json("{}").unwrap();
        assert_eq!(config.visibility, Visibility::Full);
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.globals.is_empty());
    }

    #[test]
    fn test_from_json() {
        let config = RenderConfig::from_json(
            r#"{ "visibility": "isolated", "maxDepth": 8, "globals": { "user": "ada" } }"#,
        )
        .unwrap();
        assert_eq!(config.visibility, Visibility::Isolated);
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.globals.get("user"), Some(&json!("ada")));
    }

    #[test]
    fn test_unknown_visibility_is_rejected() {
        assert!(RenderConfig::from_json(r#"{ "visibility": "django" }"#).is_err());
    }
}
