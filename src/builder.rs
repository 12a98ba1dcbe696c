use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::info;

use crate::emit::ProjectDocuments;
use crate::error::GenError;
use crate::results::{Report, ScanStats};
use crate::traits::{Classifier, ExtensionClassifier, IdGenerator, RandomIds};
use crate::walk::{enumerate, WalkConfig};

// ---------------------------------------------------------------------------
// GeneratorBuilder
// ---------------------------------------------------------------------------

/// Entry point for configuring and running a generation.
///
/// Created via [`vcxitems_gen::generate()`](crate::generate). Configure with
/// chained builder methods, then call [`run()`](GeneratorBuilder::run).
///
/// # Example
///
/// ```rust,no_run
/// let report = vcxitems_gen::generate()
///     .input("third_party/lvgl")
///     .strip_prefix("third_party")
///     .output_dir("projects")
///     .name("lvgl")
///     .run()?;
/// # Ok::<(), vcxitems_gen::GenError>(())
/// ```
pub struct GeneratorBuilder {
    input:        Option<PathBuf>,
    root:         Option<PathBuf>,
    output_dir:   Option<PathBuf>,
    name:         Option<String>,
    follow_links: bool,
    max_depth:    Option<usize>,
    classifier:   Option<Box<dyn Classifier>>,
    ids:          Option<Box<dyn IdGenerator>>,
}

impl Default for GeneratorBuilder {
    fn default() -> Self {
        Self {
            input:        None,
            root:         None,
            output_dir:   None,
            name:         None,
            follow_links: WalkConfig::default().follow_links,
            max_depth:    None,
            classifier:   None,
            ids:          None,
        }
    }
}

impl GeneratorBuilder {
    // ── Paths ─────────────────────────────────────────────────────────────

    /// The folder to scan. Required.
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.input = Some(path.into());
        self
    }

    /// The prefix emitted paths are made relative to.
    ///
    /// Defaults to the input folder. Point it at an ancestor to keep the
    /// input folder's own name in every path (`lvgl\src\core\obj.c`).
    pub fn strip_prefix(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Where the two files are written. Defaults to the current directory.
    /// Must already exist.
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Base name of the output files. Defaults to the input folder's name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    // ── Walk ──────────────────────────────────────────────────────────────

    /// Descend into symlinked directories. Enabled by default.
    pub fn follow_links(mut self, yes: bool) -> Self {
        self.follow_links = yes;
        self
    }

    /// Fail the run if anything sits deeper than `d` levels below the input.
    /// Unlimited by default.
    pub fn max_depth(mut self, d: usize) -> Self {
        self.max_depth = Some(d);
        self
    }

    // ── Seams ─────────────────────────────────────────────────────────────

    /// Replace the default `.h/.hpp/.c/.cpp` classification.
    pub fn with_classifier(mut self, c: impl Classifier + 'static) -> Self {
        self.classifier = Some(Box::new(c));
        self
    }

    /// Replace the random filter identifiers, e.g. with
    /// [`SequentialIds`](crate::SequentialIds) for reproducible output.
    pub fn with_ids(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Box::new(ids));
        self
    }

    // ── Execute ───────────────────────────────────────────────────────────

    /// Walk the input, build both documents and write them.
    ///
    /// # Errors
    ///
    /// Configuration problems are reported before the filesystem is touched.
    /// After that, a missing or unreadable input, any traversal error other
    /// than a symlink loop, and any failure to write either file abort the run.
    pub fn run(self) -> Result<Report, GenError> {
        let input = self
            .input
            .ok_or_else(|| GenError::InvalidConfig("no input folder provided".into()))?;
        let name = match self.name {
            Some(name) => name,
            None => default_name(&input)?,
        };
        validate_name(&name)?;

        let output_dir = self.output_dir.unwrap_or_else(|| PathBuf::from("."));
        check_output_dir(&output_dir)?;

        let root = self.root.unwrap_or_else(|| input.clone());
        let config = WalkConfig {
            follow_links: self.follow_links,
            max_depth: self.max_depth,
        };
        let classifier: Box<dyn Classifier> = match self.classifier {
            Some(c) => c,
            None => Box::new(ExtensionClassifier),
        };
        let mut ids: Box<dyn IdGenerator> = match self.ids {
            Some(g) => g,
            None => Box::new(RandomIds),
        };

        info!(input = %input.display(), root = %root.display(), "scanning");
        let start = Instant::now();

        let inventory = enumerate(&input, &root, &config, classifier.as_ref())?;
        let documents = ProjectDocuments::build(&inventory, ids.as_mut());
        let (project_file, filters_file) = documents.write(&output_dir, &name)?;

        let stats = ScanStats {
            folders: inventory.folders.len(),
            filters: documents.filters.len(),
            headers: inventory.headers.len(),
            sources: inventory.sources.len(),
            others: inventory.others.len(),
            duration: start.elapsed(),
        };
        info!(
            folders = stats.folders,
            files = stats.files(),
            skipped = inventory.skipped.len(),
            "generation complete"
        );

        Ok(Report {
            project_file,
            filters_file,
            stats,
            skipped: inventory.skipped,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// The input folder's last component, resolving `.` and friends first.
fn default_name(input: &Path) -> Result<String, GenError> {
    let resolved = std::path::absolute(input).map_err(|e| GenError::io(input, e))?;
    let resolved = std::fs::canonicalize(&resolved).unwrap_or(resolved);
    resolved
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            GenError::InvalidConfig(format!(
                "cannot derive an output name from {}; set one explicitly",
                input.display()
            ))
        })
}

fn validate_name(name: &str) -> Result<(), GenError> {
    if name.trim().is_empty() {
        return Err(GenError::InvalidConfig("output name is empty".into()));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(GenError::InvalidConfig(format!(
            "output name {name:?} must be a plain file name"
        )));
    }
    Ok(())
}

fn check_output_dir(dir: &Path) -> Result<(), GenError> {
    let meta = std::fs::metadata(dir).map_err(|e| GenError::io(dir, e))?;
    if !meta.is_dir() {
        return Err(GenError::NotADirectory(dir.to_path_buf()));
    }
    Ok(())
}
