mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Which build artifacts to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Css,
    Catalog,
}

/// Cascade design-token compiler.
#[derive(Parser)]
#[command(name = "cascade", version, about = "Cascade design-token compiler")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a starter token directory
    Init {
        /// Directory to scaffold into
        #[arg(default_value = "tokens")]
        dir: PathBuf,
    },

    /// Validate a token directory and print diagnostics
    Validate {
        /// Directory of token JSON files
        #[arg(default_value = "tokens")]
        dir: PathBuf,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },

    /// Compile a token directory to CSS and a token catalog
    Build {
        /// Directory of token JSON files
        #[arg(default_value = "tokens")]
        dir: PathBuf,
        /// Directory to write artifacts into
        #[arg(long, default_value = "dist")]
        output: PathBuf,
        /// Write only one artifact (default: both)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { dir } => commands::init::cmd_init(&dir),
        Commands::Validate { dir, strict } => commands::validate::cmd_validate(&dir, strict),
        Commands::Build {
            dir,
            output,
            format,
            strict,
        } => commands::build::cmd_build(&dir, &output, format, strict),
    }
}
