//! # vcxitems-gen
//!
//! Keep an MSBuild shared-items project in sync with a source tree.
//!
//! vcxitems-gen walks a folder and writes a `.vcxitems` / `.vcxitems.filters`
//! pair listing every file in it. Headers (`.h`, `.hpp`) become `ClInclude`,
//! sources (`.c`, `.cpp`) become `ClCompile` and everything else becomes
//! `None`. Each folder becomes a filter, so Solution Explorer mirrors the
//! tree. Every run regenerates both files from scratch.
//!
//! The work happens in two phases, each usable on its own:
//!
//! 1. [`walk::enumerate`] walks the tree into an [`Inventory`].
//! 2. [`ProjectDocuments`] turns an inventory into the two documents and writes them.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! let report = vcxitems_gen::generate()
//!     .input("external/lvgl")
//!     .strip_prefix("external")
//!     .output_dir("build")
//!     .name("lvgl")
//!     .run()?;
//!
//! println!(
//!     "{} files in {} folders -> {}",
//!     report.stats.files(),
//!     report.stats.folders,
//!     report.project_file.display(),
//! );
//! # Ok::<(), vcxitems_gen::GenError>(())
//! ```
//!
//! # Phases separately
//!
//! ```rust,no_run
//! use std::path::Path;
//! use vcxitems_gen::{walk, ExtensionClassifier, ProjectDocuments, RandomIds};
//!
//! let root = Path::new("external/lvgl");
//! let inventory = walk::enumerate(root, root, &walk::WalkConfig::default(), &ExtensionClassifier)?;
//! let documents = ProjectDocuments::build(&inventory, &mut RandomIds);
//! let project_xml = documents.render_project()?;
//! # Ok::<(), vcxitems_gen::GenError>(())
//! ```

#![forbid(unsafe_code)]

pub mod walk;
pub mod xml;

mod builder;
mod emit;
mod entry;
mod error;
mod results;
mod traits;

// ── Public re-exports ─────────────────────────────────────────────────────────

pub use builder::GeneratorBuilder;
pub use emit::{Filter, FilterTable, Item, ItemGroup, ProjectDocuments, FILTERS_EXTENSION, PROJECT_EXTENSION};
pub use entry::{FileEntry, FileKind, ProjectPath};
pub use error::GenError;
pub use results::{Report, ScanStats};
pub use traits::{Classifier, ExtensionClassifier, IdGenerator, RandomIds, SequentialIds};
pub use walk::{Inventory, WalkConfig};

// ── Entry points ──────────────────────────────────────────────────────────────

/// Create a new [`GeneratorBuilder`] to configure and run a generation.
pub fn generate() -> GeneratorBuilder {
    GeneratorBuilder::default()
}

/// Scan `input` and write `{name}.vcxitems` and `{name}.vcxitems.filters` into
/// `output_dir`, with every path made relative to `root`.
///
/// Shorthand for the builder with default walk settings.
///
/// ```rust,no_run
/// vcxitems_gen::generate_project("modules/lvgl", "modules", "vs", "lvgl")?;
/// # Ok::<(), vcxitems_gen::GenError>(())
/// ```
pub fn generate_project(
    input: impl AsRef<std::path::Path>,
    root: impl AsRef<std::path::Path>,
    output_dir: impl AsRef<std::path::Path>,
    name: &str,
) -> Result<Report, GenError> {
    generate()
        .input(input.as_ref())
        .strip_prefix(root.as_ref())
        .output_dir(output_dir.as_ref())
        .name(name)
        .run()
}
