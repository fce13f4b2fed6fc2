pub(crate) mod build;
pub(crate) mod init;
pub(crate) mod validate;

use cascade_core::Diagnostic;

/// Print diagnostics the way every subcommand reports them.
pub(crate) fn print_diagnostics(diagnostics: &[Diagnostic]) {
    for diag in diagnostics {
        eprintln!("{}", diag);
    }
}
