use std::path::Path;
use std::process;

use cascade_core::{build, BuildOptions};

use super::print_diagnostics;

pub(crate) fn cmd_validate(dir: &Path, strict: bool) {
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
    println!(
        "ok: {} tokens, {} themes",
        model.resolved.len(),
        model.themes.len()
    );
}
