//! End-to-end pipeline tests over real source directories.

use cascade_core::error::Severity;
use cascade_core::{build, BuildOptions};
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

fn write(dir: &Path, rel: &str, v: &Value) {
    let path = dir.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, serde_json::to_string_pretty(v).unwrap()).unwrap();
}

#[test]
fn simple_reference_resolves_with_type_preserved() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "colors.json",
        &json!({
            "color": {
                "$type": "color",
                "primary": {"$value": "#3b82f6"},
                "accent": {"$value": "{color.primary}"}
            }
        }),
    );
    let model = build(tmp.path(), BuildOptions::default()).unwrap();
    assert!(!model.has_errors(BuildOptions::default()));
    assert_eq!(model.resolved["color.accent"], json!("#3b82f6"));
}

#[test]
fn interpolation_coerces_to_text() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "base.json",
        &json!({
            "color": {"red": {"$value": "#f00"}},
            "border": {"thin": {"$value": "1px solid {color.red}"}}
        }),
    );
    let model = build(tmp.path(), BuildOptions::default()).unwrap();
    assert_eq!(model.resolved["border.thin"], json!("1px solid #f00"));
}

#[test]
fn scale_expansion_then_calc() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "size.json",
        &json!({
            "size": {
                "field": {
                    "$value": "2.5rem",
                    "$type": "dimension",
                    "$scale": {"xs": 0.6, "md": 1.0, "xl": 1.4}
                }
            }
        }),
    );
    let model = build(tmp.path(), BuildOptions::default()).unwrap();
    assert_eq!(model.resolved["size.field-xs"], json!("1.5rem"));
    assert_eq!(model.resolved["size.field-md"], json!("2.5rem"));
    assert_eq!(model.resolved["size.field-xl"], json!("3.5rem"));
    // Expansion leaves the base token without $scale
    let field = model.base.get("size.field").unwrap().as_object().unwrap();
    assert!(!field.contains_key("$scale"));
}

#[test]
fn reference_cycle_is_reported_not_broken() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "cycle.json",
        &json!({
            "a": {"$value": "{b}"},
            "b": {"$value": "{c}"},
            "c": {"$value": "{a}"}
        }),
    );
    let model = build(tmp.path(), BuildOptions::default()).unwrap();
    assert!(model.has_errors(BuildOptions::default()));
    let cycle = model
        .diagnostics
        .iter()
        .find(|d| d.path == "a")
        .expect("cycle diagnostic for 'a'");
    assert!(cycle.message.contains("circular dependency"), "{}", cycle.message);
    assert!(cycle.message.contains("a -> b -> c -> a"), "{}", cycle.message);
}

#[test]
fn theme_inheritance_chain() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "base.json",
        &json!({"spacing": {"base": {"$value": "1rem"}}}),
    );
    write(
        tmp.path(),
        "themes/compact.json",
        &json!({"spacing": {"base": {"$value": "0.5rem"}}}),
    );
    write(
        tmp.path(),
        "themes/comfortable.json",
        &json!({
            "$extends": "compact",
            "spacing": {"base": {"$value": "1.5rem"}}
        }),
    );
    let model = build(tmp.path(), BuildOptions::default()).unwrap();
    assert_eq!(
        model.themes["comfortable"].resolved["spacing.base"],
        json!("1.5rem")
    );
    assert_eq!(
        model.themes["compact"].resolved["spacing.base"],
        json!("0.5rem")
    );
    // The changed subtree honors the diff law: only spacing.base differs
    let changed = &model.themes["compact"].changed;
    assert!(changed.contains_key("spacing"));
}

#[test]
fn layer_violation_names_both_sides() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "layers.json",
        &json!({
            "brand": {"$layer": "brand", "color": {"$value": "{semantic.primary}"}},
            "semantic": {"$layer": "semantic", "primary": {"$value": "#00f"}}
        }),
    );
    let model = build(tmp.path(), BuildOptions::default()).unwrap();
    let layer_diag = model
        .diagnostics
        .iter()
        .find(|d| d.path == "brand.color")
        .expect("layer diagnostic");
    assert!(layer_diag.message.contains("brand"));
    assert!(layer_diag.message.contains("semantic.primary"));
    assert!(layer_diag.file.as_deref() == Some("layers.json"));
}

#[test]
fn merge_collision_is_a_warning_fatal_only_under_strict() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "a.json",
        &json!({"spacing": {"x": {"$value": "1rem"}}}),
    );
    write(
        tmp.path(),
        "b.json",
        &json!({"spacing": {"x": {"deep": {"$value": "2rem"}}}}),
    );
    let model = build(tmp.path(), BuildOptions::default()).unwrap();
    let warnings: Vec<_> = model
        .diagnostics
        .iter()
        .filter(|d| d.severity == Severity::Warning)
        .collect();
    assert!(!warnings.is_empty());
    assert!(warnings.iter().any(|w| w.path == "spacing.x"));
    assert!(!model.has_errors(BuildOptions::default()));
    assert!(model.has_errors(BuildOptions { strict: true }));
}

#[test]
fn build_output_is_deterministic() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "tokens.json",
        &json!({
            "color": {"$type": "color", "a": {"$value": "#111"}, "b": {"$value": "#222"}},
            "ui": {
                "button": {"$type": "component", "padding": "1rem"},
                "card": {"$type": "component", "padding": "2rem"}
            },
            "layout": {
                "gap": {"$value": "1rem", "$responsive": {"md": "2rem", "sm": "1.5rem"}}
            },
            "keyframes": {"spin": {"from": {"transform": "rotate(0)"}, "to": {"transform": "rotate(1turn)"}}}
        }),
    );
    let a = build(tmp.path(), BuildOptions::default()).unwrap();
    let b = build(tmp.path(), BuildOptions::default()).unwrap();
    assert_eq!(
        serde_json::to_string(&a.metadata).unwrap(),
        serde_json::to_string(&b.metadata).unwrap()
    );
    assert_eq!(
        serde_json::to_string(&a.components).unwrap(),
        serde_json::to_string(&b.components).unwrap()
    );
    let names: Vec<&str> = a.components.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["ui.button", "ui.card"]);
}

#[test]
fn responsive_tokens_pick_up_custom_breakpoints() {
    let tmp = tempfile::tempdir().unwrap();
    write(
        tmp.path(),
        "tokens.json",
        &json!({
            "$breakpoints": {"tablet": "768px", "desktop": "1200px"},
            "layout": {
                "gap": {
                    "$value": "1rem",
                    "$responsive": {"desktop": "3rem", "tablet": "2rem"}
                }
            }
        }),
    );
    let model = build(tmp.path(), BuildOptions::default()).unwrap();
    let gap = &model.responsive[0];
    let order: Vec<&str> = gap
        .overrides
        .iter()
        .map(|(bp, _)| bp.name.as_str())
        .collect();
    assert_eq!(order, vec!["tablet", "desktop"]);
}
