use std::fs;
use std::path::Path;
use std::process;

use cascade_core::{build, BuildOptions};
use cascade_emit::{emit_catalog, emit_css};

use super::print_diagnostics;
use crate::OutputFormat;

pub(crate) fn cmd_build(dir: &Path, output: &Path, format: Option<OutputFormat>, strict: bool) {
    let options = BuildOptions { strict };
    let model = match build(dir, options) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    print_diagnostics(&model.diagnostics);
    if model.has_errors(options) {
        process::exit(1);
    }

    if let Err(e) = fs::create_dir_all(output) {
        eprintln!("error creating '{}': {}", output.display(), e);
        process::exit(1);
    }

    let css_wanted = matches!(format, None | Some(OutputFormat::Css));
    let catalog_wanted = matches!(format, None | Some(OutputFormat::Catalog));

    if css_wanted {
        let path = output.join("tokens.css");
        if let Err(e) = fs::write(&path, emit_css(&model)) {
            eprintln!("error writing '{}': {}", path.display(), e);
            process::exit(1);
        }
        println!("wrote {}", path.display());
    }

    if catalog_wanted {
        let text = match emit_catalog(&model) {
            Ok(t) => t,
            Err(e) => {
                eprintln!("error serializing catalog: {}", e);
                process::exit(1);
            }
        };
        let path = output.join("catalog.json");
        if let Err(e) = fs::write(&path, text) {
            eprintln!("error writing '{}': {}", path.display(), e);
            process::exit(1);
        }
        println!("wrote {}", path.display());
    }
}
