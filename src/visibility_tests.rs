//! Visibility Tests
//!
//! Which bindings a fill body and a component template can see under
//! `isolated` and `full` visibility.

#[cfg(test)]
mod tests {
    use crate::component::hook_fn;
    use crate::config::{RenderConfig, Visibility};
    use crate::engine::Engine;
    use crate::scope::Scope;
    use crate::test_support::{component, engine, library, render};
    use serde_json::{json, Value};

    fn frame() -> crate::component::ComponentDefinition {
        component(
            "frame",
            json!([
                { "type": "slot", "name": "'body'", "default": true }
            ]),
        )
    }

    fn render_in(visibility: Visibility, page: Value, data: Scope) -> String {
        let owner = component(
            "owner",
            json!([{ "type": "slot", "name": "'body'" }]),
        )
        .with_hook(hook_fn(|_| {
            Ok(Scope::new()
                .with("owned", json!("by-owner"))
                .with("v", json!("owner-v")))
        }));
        let leak = component("leak", json!([{ "type": "variable", "expression": "secret" }]));
        render(&engine(visibility, vec![frame(), owner, leak]), page, data).unwrap()
    }

    #[test]
    fn test_with_binding_outside_invocation() {
        let page = json!([
            { "type": "with", "bindings": [{ "name": "x", "value": "5" }], "body": [
                { "type": "component", "name": "'frame'", "body": [
                    { "type": "fill", "name": "'body'", "body": [
                        { "type": "variable", "expression": "x" }
                    ]}
                ]}
            ]}
        ]);

        assert_eq!(render_in(Visibility::Isolated, page.clone(), Scope::new()), "");
        assert_eq!(render_in(Visibility::Full, page, Scope::new()), "5");
    }

    #[test]
    fn test_loop_binding_outside_invocation_reaches_fill() {
        let page = json!([
            { "type": "for", "itemVar": "item", "source": "[\"a\", \"b\"]", "body": [
                { "type": "component", "name": "'frame'", "body": [
                    { "type": "fill", "name": "'body'", "body": [
                        { "type": "variable", "expression": "item" }
                    ]}
                ]}
            ]}
        ]);

        assert_eq!(render_in(Visibility::Isolated, page.clone(), Scope::new()), "ab");
        assert_eq!(render_in(Visibility::Full, page, Scope::new()), "ab");
    }

    #[test]
    fn test_loop_binding_reaches_implicit_default_fill() {
        let page = json!([
            { "type": "for", "itemVar": "item", "source": "[\"a\", \"b\"]", "body": [
                { "type": "component", "name": "'frame'", "body": [
                    { "type": "variable", "expression": "item" }
                ]}
            ]}
        ]);

        assert_eq!(render_in(Visibility::Isolated, page, Scope::new()), "ab");
    }

    #[test]
    fn test_with_inside_loop_is_captured_but_with_outside_is_not() {
        let page = json!([
            { "type": "with", "bindings": [{ "name": "x", "value": "5" }], "body": [
                { "type": "for", "itemVar": "item", "source": "[1, 2]", "body": [
                    { "type": "with", "bindings": [{ "name": "y", "value": "item" }], "body": [
                        { "type": "component", "name": "'frame'", "body": [
                            { "type": "fill", "name": "'body'", "body": [
                                { "type": "variable", "expression": "x" },
                                { "type": "variable", "expression": "y" },
                                { "type": "text", "value": ";" }
                            ]}
                        ]}
                    ]}
                ]}
            ]}
        ]);

        assert_eq!(render_in(Visibility::Isolated, page.clone(), Scope::new()), "1;2;");
        assert_eq!(render_in(Visibility::Full, page, Scope::new()), "51;52;");
    }

    #[test]
    fn test_author_bindings_are_visible_in_both_modes() {
        let page = json!([
            { "type": "component", "name": "'frame'", "body": [
                { "type": "fill", "name": "'body'", "body": [
                    { "type": "variable", "expression": "title" }
                ]}
            ]}
        ]);
        let data = Scope::new().with("title", json!("T"));

        assert_eq!(render_in(Visibility::Isolated, page.clone(), data.clone()), "T");
        assert_eq!(render_in(Visibility::Full, page, data), "T");
    }

    #[test]
    fn test_slot_owner_bindings_only_in_full_mode() {
        let page = json!([
            { "type": "component", "name": "'owner'", "body": [
                { "type": "fill", "name": "'body'", "body": [
                    { "type": "variable", "expression": "owned" }
                ]}
            ]}
        ]);

        assert_eq!(render_in(Visibility::Isolated, page.clone(), Scope::new()), "");
        assert_eq!(render_in(Visibility::Full, page, Scope::new()), "by-owner");
    }

    #[test]
    fn test_captured_bindings_shadow_slot_owner_bindings() {
        let page = json!([
            { "type": "component", "name": "'owner'", "body": [
                { "type": "for", "itemVar": "v", "source": "[\"loop-v\"]", "body": [
                    { "type": "fill", "name": "'body'", "body": [
                        { "type": "variable", "expression": "v" }
                    ]}
                ]}
            ]}
        ]);

        assert_eq!(render_in(Visibility::Full, page.clone(), Scope::new()), "loop-v");
        assert_eq!(render_in(Visibility::Isolated, page, Scope::new()), "loop-v");
    }

    #[test]
    fn test_fill_data_binding_shadows_captured_bindings() {
        let engine = engine(
            Visibility::Full,
            vec![component(
                "row",
                json!([
                    { "type": "slot", "name": "'cell'", "data": [{ "name": "n", "value": "1" }] }
                ]),
            )],
        );
        let html = render(
            &engine,
            json!([
                { "type": "with", "bindings": [{ "name": "item", "value": "'outer'" }], "body": [
                    { "type": "component", "name": "'row'", "body": [
                        { "type": "with", "bindings": [{ "name": "item", "value": "'captured'" }], "body": [
                            { "type": "fill", "name": "'cell'", "data": "item", "body": [
                                { "type": "variable", "expression": "item.n" }
                            ]}
                        ]}
                    ]}
                ]}
            ]),
            Scope::new(),
        )
        .unwrap();
        assert_eq!(html, "1");
    }

    #[test]
    fn test_component_template_sees_caller_only_in_full_mode() {
        let page = json!([{ "type": "component", "name": "'leak'" }]);
        let data = Scope::new().with("secret", json!("s"));

        assert_eq!(render_in(Visibility::Isolated, page.clone(), data.clone()), "");
        assert_eq!(render_in(Visibility::Full, page, data), "s");
    }

    #[test]
    fn test_globals_are_visible_everywhere() {
        for visibility in [Visibility::Isolated, Visibility::Full] {
            let config = RenderConfig::default()
                .with_visibility(visibility)
                .with_globals(Scope::new().with("site", json!("docs")));
            let engine = Engine::new(
                config,
                library(vec![component(
                    "header",
                    json!([
                        { "type": "variable", "expression": "site" },
                        { "type": "text", "value": "/" },
                        { "type": "slot", "name": "'body'" }
                    ]),
                )]),
            );
            let html = render(
                &engine,
                json!([
                    { "type": "component", "name": "'header'", "body": [
                        { "type": "fill", "name": "'body'", "body": [
                            { "type": "variable", "expression": "site" }
                        ]}
                    ]}
                ]),
                Scope::new(),
            )
            .unwrap();
            assert_eq!(html, "docs/docs", "{:?}", visibility);
        }
    }

    #[test]
    fn test_isolated_nested_fill_sees_its_author_component() {
        let inner = frame();
        let outer = component(
            "outer",
            json!([
                { "type": "component", "name": "'frame'", "body": [
                    { "type": "fill", "name": "'body'", "body": [
                        { "type": "variable", "expression": "label" }
                    ]}
                ]}
            ]),
        );
        let engine = engine(Visibility::Isolated, vec![inner, outer]);

        let html = render(
            &engine,
            json!([
                { "type": "component", "name": "'outer'", "args": [
                    { "name": "label", "value": "'from-outer'" }
                ]}
            ]),
            Scope::new().with("label", json!("from-page")),
        )
        .unwrap();
        assert_eq!(html, "from-outer");
    }
}
