//! Capture Tests
//!
//! Fill discovery for a single invocation: which fills are registered, what
//! they capture, and which invocation bodies are rejected before any slot
//! is resolved.

#[cfg(test)]
mod tests {
    use crate::config::{RenderConfig, Visibility};
    use crate::context::{Context, FrameKind};
    use crate::error::{self, RenderError};
    use crate::ir::SourceLocation;
    use crate::node::{NodeKind, NodeTree};
    use crate::registry::{FillRegistry, InvocationFrame, DEFAULT_SLOT_NAME};
    use crate::render::Renderer;
    use crate::scope::Scope;
    use crate::test_support::{component, engine, library, render, tree};
    use serde_json::{json, Value};
    use std::rc::Rc;

    fn card() -> crate::component::ComponentDefinition {
        component(
            "card",
            json!([
                { "type": "slot", "name": "'header'" },
                { "type": "slot", "name": "'body'", "default": true }
            ]),
        )
    }

    /// Captures the fills of the first root node of `page`, which must be a
    /// component invocation.
    fn capture(page: Value, data: Scope) -> crate::error::Result<FillRegistry> {
        let config = RenderConfig::default();
        let components = library(vec![card()]);
        let definition = card();
        let page = tree("page", page);

        let mut renderer = Renderer::new(&config, &components);
        let mut ctx = Context::new(Scope::new());
        ctx.push(FrameKind::Component, data.clone());
        let frame = Rc::new(InvocationFrame::root("page", data));

        let invocation = page.node(page.roots()[0]);
        let NodeKind::Component { body, .. } = &invocation.kind else {
            panic!("expected a component invocation");
        };
        renderer.capture_fills(&page, body, &mut ctx, &frame, &definition)
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // REGISTRY CONTENTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_fills_capture_loop_bindings() {
        let registry = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "for", "itemVar": "v", "indexVar": "i", "source": "[\"a\", \"b\"]", "body": [
                        { "type": "fill", "name": "v" }
                    ]}
                ]}
            ]),
            Scope::new().with("title", json!("T")),
        )
        .unwrap();

        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["a", "b"]);
        let b = registry.get("b").unwrap();
        assert_eq!(b.captured.get("v"), Some(&json!("b")));
        assert_eq!(b.captured.get("i"), Some(&json!(1)));
        // Bindings outside the invocation are not part of the snapshot
        assert!(b.captured.get("title").is_none());
        assert!(!b.is_implicit());
    }

    #[test]
    fn test_fill_in_unselected_branch_is_not_captured() {
        let registry = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "if", "condition": "wide", "consequent": [
                        { "type": "fill", "name": "'header'" }
                    ], "alternate": [
                        { "type": "fill", "name": "'body'" }
                    ]}
                ]}
            ]),
            Scope::new().with("wide", json!(false)),
        )
        .unwrap();

        assert!(!registry.contains("header"));
        assert!(registry.contains("body"));
    }

    #[test]
    fn test_bare_content_becomes_implicit_default_fill() {
        let registry = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "text", "value": "  " },
                    { "type": "text", "value": "hello" }
                ]}
            ]),
            Scope::new(),
        )
        .unwrap();

        assert_eq!(registry.len(), 1);
        let fill = registry.get(DEFAULT_SLOT_NAME).unwrap();
        assert!(fill.is_implicit());
        assert_eq!(fill.body.len(), 2);
    }

    #[test]
    fn test_whitespace_only_body_registers_nothing() {
        let registry = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "text", "value": "\n   \n" }
                ]}
            ]),
            Scope::new(),
        )
        .unwrap();
        assert!(registry.is_empty());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CAPTURE ERRORS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_fill_name_must_be_non_empty_scalar() {
        for name in ["missing", "''", "[1]"] {
            let err = capture(
                json!([
                    { "type": "component", "name": "'card'", "body": [
                        { "type": "fill", "name": name }
                    ]}
                ]),
                Scope::new(),
            )
            .unwrap_err();
            assert_eq!(err.code(), error::ERR_INVALID_FILL_NAME, "fill name {}", name);
        }
    }

    #[test]
    fn test_numeric_fill_name_is_accepted() {
        let registry = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "fill", "name": "3" }
                ]}
            ]),
            Scope::new(),
        )
        .unwrap();
        assert!(registry.contains("3"));
    }

    #[test]
    fn test_loop_producing_same_fill_name_fails() {
        let err = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "for", "itemVar": "v", "source": "[1, 2]", "body": [
                        { "type": "fill", "name": "'header'" }
                    ]}
                ]}
            ]),
            Scope::new(),
        )
        .unwrap_err();
        assert_eq!(err.code(), error::ERR_DOUBLY_FILLED);
    }

    #[test]
    fn test_bare_content_next_to_named_fills_is_rejected() {
        let err = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "text", "value": "stray", "location": { "line": 2, "column": 1 } },
                    { "type": "fill", "name": "'header'", "location": { "line": 3, "column": 1 } }
                ]}
            ]),
            Scope::new(),
        )
        .unwrap_err();
        assert_eq!(
            err,
            RenderError::MixedImplicitExplicitFill {
                component: "card".to_string(),
                content: SourceLocation::new(2, 1),
                fill: SourceLocation::new(3, 1),
            }
        );
    }

    #[test]
    fn test_nested_component_counts_as_bare_content() {
        let err = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "fill", "name": "'header'" },
                    { "type": "component", "name": "'card'" }
                ]}
            ]),
            Scope::new(),
        )
        .unwrap_err();
        assert_eq!(err.code(), error::ERR_MIXED_FILLS);
    }

    #[test]
    fn test_bare_content_plus_fill_for_default_slot_is_doubly_filled() {
        let err = capture(
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "fill", "name": "'body'", "location": { "line": 1, "column": 1 } },
                    { "type": "text", "value": "stray", "location": { "line": 5, "column": 1 } }
                ]}
            ]),
            Scope::new(),
        )
        .unwrap_err();
        match err {
            RenderError::DoublyFilled {
                name,
                first,
                second,
                slot,
                ..
            } => {
                assert_eq!(name, "body");
                assert_eq!(first, SourceLocation::new(1, 1));
                assert_eq!(second, SourceLocation::new(5, 1));
                assert_eq!(slot, None);
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_capture_errors_surface_from_render() {
        let engine = engine(Visibility::Full, vec![card()]);
        let err = render(
            &engine,
            json!([
                { "type": "component", "name": "'card'", "body": [
                    { "type": "fill", "name": "nope" }
                ]}
            ]),
            Scope::new(),
        )
        .unwrap_err();
        assert_eq!(err.code(), error::ERR_INVALID_FILL_NAME);
    }

    #[test]
    fn test_fill_outside_component_is_rejected_when_lowering() {
        let err = NodeTree::from_json(
            "page",
            &json!([{ "type": "fill", "name": "'header'" }]).to_string(),
        )
        .unwrap_err();
        assert_eq!(err.code(), error::ERR_INVALID_TEMPLATE);
    }
}
