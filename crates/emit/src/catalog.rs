//! Token catalog generation: the machine-readable companion to the
//! stylesheet, a JSON array of per-token records sorted by path.

use cascade_core::BuildModel;

/// Render the catalog as pretty-printed JSON.
pub fn emit_catalog(model: &BuildModel) -> Result<String, serde_json::Error> {
    let mut text = serde_json::to_string_pretty(&model.metadata)?;
    text.push('\n');
    Ok(text)
}

#[cfg(test)]
mod tests {
    use cascade_core::{build, BuildOptions};
    use serde_json::{json, Value};
    use std::fs;

    #[test]
    fn catalog_is_a_sorted_array_of_records() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join("tokens.json"),
            serde_json::to_string(&json!({
                "color": {
                    "$type": "color",
                    "primary": {"$value": "#3b82f6", "$description": "Brand primary"},
                    "accent": {"$value": "{color.primary}"}
                }
            }))
            .unwrap(),
        )
        .unwrap();
        let model = build(tmp.path(), BuildOptions::default()).unwrap();
        let text = super::emit_catalog(&model).unwrap();
        let parsed: Value = serde_json::from_str(&text).unwrap();
        let records = parsed.as_array().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0]["path"], "color.accent");
        assert_eq!(records[0]["value"], "#3b82f6");
        assert_eq!(records[1]["path"], "color.primary");
        assert_eq!(records[1]["description"], "Brand primary");
        assert_eq!(records[1]["type"], "color");
    }
}
