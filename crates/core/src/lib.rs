//! cascade-core: design-token pipeline core library.
//!
//! Provides the pipeline from a directory of W3C-draft token JSON files
//! to a resolved, validated build model ready for stylesheet emission:
//!
//! 1. [`loader`] -- walk the source tree, parse JSON, assemble the base
//!    [`Dictionary`] and theme dictionaries with a per-path source index
//! 2. [`scale`] -- expand `$scale` annotations into sibling token families
//! 3. [`theme`] -- resolve `$extends` chains into per-theme dictionaries
//! 4. [`resolve`] -- evaluate `{path}` references and the fixed expression
//!    set (`calc`, `contrast`, `darken`, `lighten`, `scale`, `shade`)
//! 5. validation -- [`schema`] shape and layer policy, [`typecheck`]
//!    per-`$type` checks, [`constraint`] `$min`/`$max` bounds
//! 6. [`extract`] -- components, keyframes, responsive tokens, container
//!    overrides, `@property` tokens, catalog metadata
//!
//! [`pipeline::build`] sequences the stages and returns a [`BuildModel`].

pub mod color;
pub mod constraint;
pub mod dictionary;
pub mod dimension;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod loader;
pub mod pipeline;
pub mod resolve;
pub mod scale;
pub mod schema;
pub mod theme;
pub mod typecheck;

// ── Convenience re-exports: key types ────────────────────────────────

pub use color::{Color, ColorFormat};
pub use dictionary::Dictionary;
pub use dimension::Dimension;
pub use error::{BuildError, Diagnostic, DiagnosticKind, Severity};
pub use pipeline::{build, BuildModel, BuildOptions};
pub use resolve::Resolver;

// ── Convenience re-exports: pipeline entry points ────────────────────

pub use flatten::flatten;
pub use loader::{load_directory, LoadedSource};
pub use scale::expand_scales;
pub use theme::resolve_theme_inheritance;
