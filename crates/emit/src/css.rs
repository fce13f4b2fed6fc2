//! Stylesheet generation from the build model.
//!
//! Section order is fixed: `@property` rules, `:root` custom properties,
//! theme blocks, component classes, responsive `@media` blocks,
//! `@container` overrides, `@keyframes`. Within each section every
//! sequence arrives pre-sorted from the extractors or is sorted here.

use cascade_core::extract::{css_var_name, ComponentDef, VariantDef};
use cascade_core::pipeline::ThemeModel;
use cascade_core::resolve::to_css_string;
use cascade_core::BuildModel;
use serde_json::Value;
use std::collections::BTreeMap;

const INDENT: &str = "  ";

/// Render the full stylesheet.
pub fn emit_css(model: &BuildModel) -> String {
    let mut out = String::from("/* Generated by cascade. Do not edit. */\n");

    emit_properties(&mut out, model);
    emit_root(&mut out, &model.resolved);
    for (name, theme) in &model.themes {
        emit_theme(&mut out, name, theme, &model.resolved);
    }
    for component in &model.components {
        emit_component(&mut out, component);
    }
    emit_media(&mut out, model);
    emit_containers(&mut out, model);
    emit_keyframes(&mut out, model);

    out
}

fn emit_properties(out: &mut String, model: &BuildModel) {
    for prop in &model.properties {
        out.push('\n');
        out.push_str(&format!("@property {} {{\n", prop.var_name));
        out.push_str(&format!("{}syntax: \"{}\";\n", INDENT, prop.syntax));
        out.push_str(&format!("{}inherits: {};\n", INDENT, prop.inherits));
        out.push_str(&format!(
            "{}initial-value: {};\n",
            INDENT, prop.initial_value
        ));
        out.push_str("}\n");
    }
}

fn emit_root(out: &mut String, resolved: &BTreeMap<String, Value>) {
    out.push_str("\n:root {\n");
    for (path, value) in resolved {
        if let Some(text) = variable_value(value) {
            out.push_str(&format!("{}{}: {};\n", INDENT, css_var_name(path), text));
        }
    }
    out.push_str("}\n");
}

/// Theme blocks carry only the variables whose resolved value differs
/// from base.
fn emit_theme(
    out: &mut String,
    name: &str,
    theme: &ThemeModel,
    base: &BTreeMap<String, Value>,
) {
    let mut lines = Vec::new();
    for (path, value) in &theme.resolved {
        if base.get(path) == Some(value) {
            continue;
        }
        if let Some(text) = variable_value(value) {
            lines.push(format!("{}{}: {};\n", INDENT, css_var_name(path), text));
        }
    }
    if lines.is_empty() {
        return;
    }
    out.push_str(&format!("\n[data-theme=\"{}\"] {{\n", name));
    for line in lines {
        out.push_str(&line);
    }
    out.push_str("}\n");
}

/// Custom-property text for a resolved value. Maps are composite
/// structure, not variables.
fn variable_value(value: &Value) -> Option<String> {
    match value {
        Value::Object(_) | Value::Null => None,
        other => Some(to_css_string(other)),
    }
}

fn emit_component(out: &mut String, component: &ComponentDef) {
    if let Some(desc) = &component.description {
        out.push_str(&format!("\n/* {} */", desc));
    }
    emit_rule(out, &component.class, &component.base);
    for (state, props) in &component.states {
        emit_rule(out, &state_selector(&component.class, state), props);
    }
    for (name, variant) in &component.variants {
        emit_variant(out, component, name, variant);
    }
    for (name, size) in &component.sizes {
        emit_variant(out, component, name, size);
    }
}

fn emit_variant(out: &mut String, component: &ComponentDef, name: &str, variant: &VariantDef) {
    let class = variant
        .class
        .clone()
        .unwrap_or_else(|| format!("{}--{}", component.class, name));
    emit_rule(out, &class, &variant.properties);
    for (state, props) in &variant.states {
        emit_rule(out, &state_selector(&class, state), props);
    }
}

fn emit_rule(out: &mut String, selector: &str, props: &BTreeMap<String, String>) {
    if props.is_empty() {
        return;
    }
    out.push_str(&format!("\n{} {{\n", selector));
    for (prop, value) in props {
        out.push_str(&format!("{}{}: {};\n", INDENT, prop, value));
    }
    out.push_str("}\n");
}

/// Selector for a state key: `&:hover` splices onto the class, a bare
/// pseudo (`:focus`) appends, anything else is treated as a pseudo-class
/// name.
fn state_selector(class: &str, state: &str) -> String {
    if let Some(rest) = state.strip_prefix('&') {
        format!("{}{}", class, rest)
    } else if state.starts_with(':') {
        format!("{}{}", class, state)
    } else {
        format!("{}:{}", class, state)
    }
}

/// One `@media (min-width: ...)` block per breakpoint that has at least
/// one override, ascending by pixel width.
fn emit_media(out: &mut String, model: &BuildModel) {
    for bp in &model.breakpoints {
        let mut lines = Vec::new();
        for token in &model.responsive {
            for (over_bp, value) in &token.overrides {
                if over_bp.name == bp.name {
                    lines.push(format!(
                        "{}{}{}: {};\n",
                        INDENT,
                        INDENT,
                        css_var_name(&token.path),
                        value
                    ));
                }
            }
        }
        if lines.is_empty() {
            continue;
        }
        out.push_str(&format!("\n@media (min-width: {}) {{\n", bp.width));
        out.push_str(&format!("{}:root {{\n", INDENT));
        for line in lines {
            out.push_str(&line);
        }
        out.push_str(&format!("{}}}\n", INDENT));
        out.push_str("}\n");
    }
}

fn emit_containers(out: &mut String, model: &BuildModel) {
    for over in &model.container_overrides {
        out.push_str(&format!("\n@container {} {{\n", over.query));
        out.push_str(&format!("{}{} {{\n", INDENT, over.class));
        for (prop, value) in &over.properties {
            out.push_str(&format!("{}{}{}: {};\n", INDENT, INDENT, prop, value));
        }
        out.push_str(&format!("{}}}\n", INDENT));
        out.push_str("}\n");
    }
}

fn emit_keyframes(out: &mut String, model: &BuildModel) {
    for kf in &model.keyframes {
        out.push_str(&format!("\n@keyframes {} {{\n", kf.name));
        for (selector, props) in &kf.frames {
            out.push_str(&format!("{}{} {{\n", INDENT, selector));
            for (prop, value) in props {
                out.push_str(&format!("{}{}{}: {};\n", INDENT, INDENT, prop, value));
            }
            out.push_str(&format!("{}}}\n", INDENT));
        }
        out.push_str("}\n");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cascade_core::{build, BuildOptions};
    use serde_json::json;
    use std::fs;

    fn model_from(tree: serde_json::Value) -> BuildModel {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("tokens.json"),
            serde_json::to_string(&tree).unwrap(),
        )
        .unwrap();
        build(tmp.path(), BuildOptions::default()).unwrap()
    }

    fn themed_model(base: serde_json::Value, theme: serde_json::Value) -> BuildModel {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("base.json"),
            serde_json::to_string(&base).unwrap(),
        )
        .unwrap();
        fs::create_dir_all(tmp.path().join("themes")).unwrap();
        fs::write(
            tmp.path().join("themes/dark.json"),
            serde_json::to_string(&theme).unwrap(),
        )
        .unwrap();
        build(tmp.path(), BuildOptions::default()).unwrap()
    }

    #[test]
    fn root_variables_come_out_sorted_and_dashed() {
        let model = model_from(json!({
            "color": {"b": {"$value": "#222"}, "a": {"$value": "#111"}}
        }));
        let css = emit_css(&model);
        let a = css.find("--color-a: #111;").unwrap();
        let b = css.find("--color-b: #222;").unwrap();
        assert!(a < b);
    }

    #[test]
    fn theme_block_contains_only_changed_variables() {
        let model = themed_model(
            json!({
                "color": {
                    "bg": {"$value": "#fff"},
                    "fg": {"$value": "#111"}
                }
            }),
            json!({"color": {"bg": {"$value": "#000"}}}),
        );
        let css = emit_css(&model);
        let block_start = css.find("[data-theme=\"dark\"]").unwrap();
        let block = &css[block_start..css[block_start..].find('}').unwrap() + block_start];
        assert!(block.contains("--color-bg: #000;"));
        assert!(!block.contains("--color-fg"));
    }

    #[test]
    fn component_states_and_variants_render_as_classes() {
        let model = model_from(json!({
            "color": {"primary": {"$value": "#3b82f6"}},
            "ui": {
                "button": {
                    "$type": "component",
                    "$class": ".btn",
                    "background": "{color.primary}",
                    "&:hover": {"opacity": "0.9"},
                    "variants": {
                        "ghost": {"background": "transparent"}
                    },
                    "sizes": {
                        "sm": {"$class": ".btn-sm", "padding": "0.25rem"}
                    }
                }
            }
        }));
        let css = emit_css(&model);
        assert!(css.contains("\n.btn {\n  background: #3b82f6;\n}\n"));
        assert!(css.contains("\n.btn:hover {\n  opacity: 0.9;\n}\n"));
        assert!(css.contains("\n.btn--ghost {\n  background: transparent;\n}\n"));
        assert!(css.contains("\n.btn-sm {\n  padding: 0.25rem;\n}\n"));
    }

    #[test]
    fn property_rules_carry_syntax_and_inherits() {
        let model = model_from(json!({
            "color": {
                "$type": "color",
                "primary": {"$value": "#3b82f6", "$property": true}
            }
        }));
        let css = emit_css(&model);
        assert!(css.contains("@property --color-primary {"));
        assert!(css.contains("syntax: \"<color>\";"));
        assert!(css.contains("inherits: false;"));
        assert!(css.contains("initial-value: #3b82f6;"));
    }

    #[test]
    fn media_blocks_ascend_by_breakpoint_width() {
        let model = model_from(json!({
            "layout": {
                "gap": {
                    "$value": "1rem",
                    "$responsive": {"lg": "3rem", "sm": "2rem"}
                }
            }
        }));
        let css = emit_css(&model);
        let sm = css.find("@media (min-width: 640px)").unwrap();
        let lg = css.find("@media (min-width: 1024px)").unwrap();
        assert!(sm < lg);
        assert!(css.contains("--layout-gap: 2rem;"));
    }

    #[test]
    fn container_query_is_emitted_verbatim() {
        let model = model_from(json!({
            "card": {
                "$type": "component",
                "padding": "1rem",
                "$container": {
                    "sidebar (min-width: 400px)": {"padding": "2rem"}
                }
            }
        }));
        let css = emit_css(&model);
        assert!(css.contains("@container sidebar (min-width: 400px) {"));
        assert!(css.contains("  .card {\n    padding: 2rem;\n  }\n"));
    }

    #[test]
    fn keyframes_render_in_frame_order() {
        let model = model_from(json!({
            "keyframes": {
                "fade": {
                    "to": {"opacity": "1"},
                    "from": {"opacity": "0"}
                }
            }
        }));
        let css = emit_css(&model);
        let block = css.find("@keyframes fade {").unwrap();
        let from = css[block..].find("from {").unwrap();
        let to = css[block..].find("to {").unwrap();
        assert!(from < to);
    }

    #[test]
    fn emission_is_byte_stable() {
        let model = model_from(json!({
            "color": {"a": {"$value": "#111"}, "b": {"$value": "{color.a}"}},
            "ui": {"chip": {"$type": "component", "gap": "0.5rem"}}
        }));
        assert_eq!(emit_css(&model), emit_css(&model));
    }
}
