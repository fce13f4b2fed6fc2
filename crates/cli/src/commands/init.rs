use std::fs;
use std::path::Path;
use std::process;

const COLORS_JSON: &str = r##"{
  "color": {
    "$type": "color",
    "$layer": "brand",
    "primary": {
      "$value": "#3b82f6",
      "$description": "Brand primary"
    },
    "surface": { "$value": "#ffffff" },
    "text": { "$value": "contrast({color.surface})" }
  }
}
"##;

const SPACING_JSON: &str = r##"{
  "spacing": {
    "$type": "dimension",
    "base": {
      "$value": "1rem",
      "$scale": { "sm": 0.5, "md": 1.0, "lg": 2.0 }
    }
  }
}
"##;

const DARK_THEME_JSON: &str = r##"{
  "color": {
    "surface": { "$value": "#111827" }
  }
}
"##;

/// Scaffold a starter token directory. Never overwrites: any existing
/// target file aborts before anything is written.
pub(crate) fn cmd_init(dir: &Path) {
    let files = [
        (dir.join("colors.json"), COLORS_JSON),
        (dir.join("spacing.json"), SPACING_JSON),
        (dir.join("themes").join("dark.json"), DARK_THEME_JSON),
    ];

    for (path, _) in &files {
        if path.exists() {
            eprintln!("refusing to overwrite '{}'", path.display());
            process::exit(1);
        }
    }

    for (path, contents) in &files {
        if let Some(parent) = path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                eprintln!("error creating '{}': {}", parent.display(), e);
                process::exit(1);
            }
        }
        if let Err(e) = fs::write(path, contents) {
            eprintln!("error writing '{}': {}", path.display(), e);
            process::exit(1);
        }
        println!("wrote {}", path.display());
    }
}
