use crate::ir::SourceLocation;
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_DOUBLY_FILLED: &str = "SLOT-DOUBLY-FILLED";
pub const ERR_REQUIRED_UNFILLED: &str = "SLOT-REQUIRED-UNFILLED";
pub const ERR_INVALID_FILL_NAME: &str = "FILL-INVALID-NAME";
pub const ERR_INVALID_SLOT_NAME: &str = "SLOT-INVALID-NAME";
pub const ERR_MIXED_FILLS: &str = "FILL-MIXED-IMPLICIT-EXPLICIT";
pub const ERR_UNKNOWN_COMPONENT: &str = "COMPONENT-UNKNOWN";
pub const ERR_INVALID_TEMPLATE: &str = "TEMPLATE-INVALID";
pub const ERR_RECURSION_LIMIT: &str = "COMPONENT-RECURSION-LIMIT";
pub const ERR_HOOK: &str = "COMPONENT-HOOK";

pub type Result<T> = std::result::Result<T, RenderError>;

/// Every way a render can abort.
///
/// Errors are never recovered locally: they unwind the current component
/// invocation and propagate through enclosing renders unchanged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RenderError {
    #[error("Slot '{name}' of component '{component}' is filled more than once (fills at {first} and {second})")]
    DoublyFilled {
        component: String,
        name: String,
        first: SourceLocation,
        second: SourceLocation,
        slot: Option<SourceLocation>,
    },

    #[error("Required slot '{name}' of component '{component}' at {slot} was not filled")]
    RequiredSlotUnfilled {
        component: String,
        name: String,
        slot: SourceLocation,
    },

    #[error("Fill name must be a non-empty scalar, got {value} at {location}")]
    InvalidFillName {
        value: String,
        location: SourceLocation,
    },

    #[error("Slot name must be a non-empty scalar, got {value} at {location}")]
    InvalidSlotName {
        value: String,
        location: SourceLocation,
    },

    #[error("Component '{component}' was given bare content at {content} alongside named fills (first fill at {fill})")]
    MixedImplicitExplicitFill {
        component: String,
        content: SourceLocation,
        fill: SourceLocation,
    },

    #[error("Unknown component '{name}'")]
    UnknownComponent { name: String },

    #[error("Invalid template '{template}' at {location}: {message}")]
    InvalidTemplate {
        template: String,
        message: String,
        location: SourceLocation,
    },

    #[error("Component nesting exceeded {limit} levels while rendering '{component}'")]
    RecursionLimit { component: String, limit: usize },

    #[error("Context hook of component '{component}' failed: {message}")]
    Hook { component: String, message: String },
}

impl RenderError {
    pub fn code(&self) -> &'static str {
        match self {
            RenderError::DoublyFilled { .. } => ERR_DOUBLY_FILLED,
            RenderError::RequiredSlotUnfilled { .. } => ERR_REQUIRED_UNFILLED,
            RenderError::InvalidFillName { .. } => ERR_INVALID_FILL_NAME,
            RenderError::InvalidSlotName { .. } => ERR_INVALID_SLOT_NAME,
            RenderError::MixedImplicitExplicitFill { .. } => ERR_MIXED_FILLS,
            RenderError::UnknownComponent { .. } => ERR_UNKNOWN_COMPONENT,
            RenderError::InvalidTemplate { .. } => ERR_INVALID_TEMPLATE,
            RenderError::RecursionLimit { .. } => ERR_RECURSION_LIMIT,
            RenderError::Hook { .. } => ERR_HOOK,
        }
    }

    /// The rule the failed render would have upheld.
    pub fn guarantee(&self) -> &'static str {
        get_guarantee(self.code())
    }

    pub(crate) fn invalid_template(
        template: &str,
        message: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        RenderError::InvalidTemplate {
            template: template.to_string(),
            message: message.into(),
            location,
        }
    }
}

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_DOUBLY_FILLED => "Each slot name receives at most one fill per component invocation.",
        ERR_REQUIRED_UNFILLED => "Slots marked required are always filled by the caller.",
        ERR_INVALID_FILL_NAME => "Fill names resolve to non-empty strings or numbers.",
        ERR_INVALID_SLOT_NAME => "Slot names resolve to non-empty strings or numbers.",
        ERR_MIXED_FILLS => {
            "A component body is either entirely bare content or entirely named fills."
        }
        ERR_UNKNOWN_COMPONENT => "Every component reference names a registered component.",
        ERR_INVALID_TEMPLATE => "Templates are structurally valid before they are rendered.",
        ERR_RECURSION_LIMIT => "Component nesting stays within the configured depth.",
        ERR_HOOK => "Component context hooks produce their bindings or a reported failure.",
        _ => "Unknown invariant.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_and_guarantees() {
        let err = RenderError::RequiredSlotUnfilled {
            component: "card".to_string(),
            name: "header".to_string(),
            slot: SourceLocation::new(3, 7),
        };
        assert_eq!(err.code(), ERR_REQUIRED_UNFILLED);
        assert!(err.guarantee().contains("required"));
        assert_eq!(
            err.to_string(),
            "Required slot 'header' of component 'card' at 3:7 was not filled"
        );
    }

    #[test]
    fn test_doubly_filled_message_names_both_fills() {
        let err = RenderError::DoublyFilled {
            component: "card".to_string(),
            name: "body".to_string(),
            first: SourceLocation::new(1, 1),
            second: SourceLocation::new(4, 2),
            slot: None,
        };
        let message = err.to_string();
        assert!(message.contains("'body'"));
        assert!(message.contains("1:1"));
        assert!(message.contains("4:2"));
    }
}
