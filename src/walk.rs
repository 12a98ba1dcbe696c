use std::cmp::Ordering;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{debug, warn};

use crate::entry::{FileEntry, FileKind, ProjectPath};
use crate::error::GenError;
use crate::traits::Classifier;

// ---------------------------------------------------------------------------
// WalkConfig
// ---------------------------------------------------------------------------

/// Traversal parameters for [`enumerate`].
#[derive(Debug, Clone)]
pub struct WalkConfig {
    /// Descend into symlinked directories. Links that loop back to an
    /// ancestor are skipped and reported either way.
    pub follow_links: bool,

    /// Deepest entry allowed below the input folder (root = 0). Exceeding it
    /// aborts the walk rather than dropping files from the project.
    pub max_depth: Option<usize>,
}

impl Default for WalkConfig {
    fn default() -> Self {
        Self {
            follow_links: true,
            max_depth: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------------------

/// Everything one walk found, ready to hand to the emitter.
///
/// Folders are in pre-order. Within each category, a folder's files come
/// after everything found in its subfolders.
#[derive(Debug)]
pub struct Inventory {
    /// The prefix every [`ProjectPath`] was made relative to.
    pub root: PathBuf,

    pub folders: Vec<ProjectPath>,
    pub headers: Vec<FileEntry>,
    pub sources: Vec<FileEntry>,
    pub others: Vec<FileEntry>,

    /// Recoverable anomalies left out of the inventory (symlink loops).
    pub skipped: Vec<GenError>,
}

impl Inventory {
    fn new(root: PathBuf) -> Self {
        Self {
            root,
            folders: Vec::new(),
            headers: Vec::new(),
            sources: Vec::new(),
            others: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// The files of one category, in walk order.
    pub fn files(&self, kind: FileKind) -> &[FileEntry] {
        match kind {
            FileKind::Header => &self.headers,
            FileKind::Source => &self.sources,
            FileKind::Other => &self.others,
        }
    }

    /// Total number of files across all categories.
    pub fn file_count(&self) -> usize {
        self.headers.len() + self.sources.len() + self.others.len()
    }

    fn push(&mut self, entry: FileEntry) {
        match entry.kind {
            FileKind::Header => self.headers.push(entry),
            FileKind::Source => self.sources.push(entry),
            FileKind::Other => self.others.push(entry),
        }
    }
}

// ---------------------------------------------------------------------------
// enumerate()
// ---------------------------------------------------------------------------

struct FolderNode {
    path: PathBuf,
    children: Vec<usize>,
    files: Vec<(PathBuf, FileKind)>,
}

/// Walk `input` and classify every file under it.
///
/// Paths in the result are relative to `root`, which is usually `input`
/// itself or one of its ancestors.
///
/// The walk is iterative, so tree depth is bounded by memory rather than by
/// the call stack. Siblings are visited in case-insensitive name order, which
/// makes two runs over an unchanged tree produce the same inventory.
///
/// A symlink whose target is missing is listed as a file in both link modes.
///
/// # Errors
///
/// Fails fast if `input` is missing, unreadable or not a directory. Any
/// traversal error other than a symlink loop is fatal.
pub fn enumerate(
    input: &Path,
    root: &Path,
    config: &WalkConfig,
    classifier: &dyn Classifier,
) -> Result<Inventory, GenError> {
    let input = resolve_input(input)?;
    let root = resolve_root(root)?;

    let mut builder = WalkBuilder::new(&input);
    builder
        .standard_filters(false)
        .ignore(false)
        .parents(false)
        .hidden(false)
        .follow_links(config.follow_links)
        .same_file_system(false)
        .sort_by_file_name(compare_names);

    let mut nodes: Vec<FolderNode> = Vec::new();
    let mut index: HashMap<PathBuf, usize> = HashMap::new();
    let mut skipped = Vec::new();

    for res in builder.build() {
        let entry = match res {
            Ok(e) => e,
            Err(e) => {
                // A link whose target is gone is still an entry in its folder.
                if let Some(link) = dangling_link(&e) {
                    let depth = link.strip_prefix(&input).map_or(0, |r| r.components().count());
                    check_depth(&link, depth, config)?;
                    debug!(path = %link.display(), "listing dangling symlink");
                    add_file(&mut nodes, &index, link, classifier)?;
                    continue;
                }

                let err = map_ignore_error(e, None);
                if err.is_recoverable() {
                    warn!(error = %err, "skipping");
                    skipped.push(err);
                    continue;
                }
                return Err(err);
            }
        };

        check_depth(entry.path(), entry.depth(), config)?;

        let ft = match entry.file_type() {
            Some(ft) => ft,
            None => continue,
        };

        if ft.is_dir() {
            let id = nodes.len();
            if entry.depth() > 0 {
                let parent = parent_of(entry.path(), &index)?;
                nodes[parent].children.push(id);
            }
            debug!(folder = %entry.path().display(), "entering folder");
            index.insert(entry.path().to_path_buf(), id);
            nodes.push(FolderNode {
                path: entry.into_path(),
                children: Vec::new(),
                files: Vec::new(),
            });
        } else if ft.is_symlink() && entry.path().is_dir() {
            debug!(path = %entry.path().display(), "not following symlinked folder");
        } else {
            // Regular files, links to files and dangling links when links
            // are not followed, and any other non-folder entry.
            add_file(&mut nodes, &index, entry.into_path(), classifier)?;
        }
    }

    let mut inventory = Inventory::new(root);
    inventory.skipped = skipped;
    flatten(nodes, &mut inventory);
    Ok(inventory)
}

/// Emit folders in pre-order and each folder's files after its whole subtree.
fn flatten(mut nodes: Vec<FolderNode>, inventory: &mut Inventory) {
    if nodes.is_empty() {
        return;
    }

    let mut stack = vec![(0usize, false)];
    while let Some((id, expanded)) = stack.pop() {
        let folder = ProjectPath::new(nodes[id].path.clone(), &inventory.root);
        if expanded {
            for (path, kind) in std::mem::take(&mut nodes[id].files) {
                let path = ProjectPath::new(path, &inventory.root);
                inventory.push(FileEntry {
                    path,
                    folder: folder.clone(),
                    kind,
                });
            }
        } else {
            inventory.folders.push(folder);
            stack.push((id, true));
            stack.extend(nodes[id].children.iter().rev().map(|&c| (c, false)));
        }
    }
}

fn add_file(
    nodes: &mut [FolderNode],
    index: &HashMap<PathBuf, usize>,
    path: PathBuf,
    classifier: &dyn Classifier,
) -> Result<(), GenError> {
    let parent = parent_of(&path, index)?;
    let kind = classifier.classify(&path);
    nodes[parent].files.push((path, kind));
    Ok(())
}

fn parent_of(path: &Path, index: &HashMap<PathBuf, usize>) -> Result<usize, GenError> {
    path.parent()
        .and_then(|p| index.get(p))
        .copied()
        .ok_or_else(|| {
            GenError::Walk(format!(
                "no folder recorded for the parent of {}",
                path.display()
            ))
        })
}

fn check_depth(path: &Path, depth: usize, config: &WalkConfig) -> Result<(), GenError> {
    match config.max_depth {
        Some(limit) if depth > limit => Err(GenError::DepthExceeded {
            path: path.to_path_buf(),
            limit,
        }),
        _ => Ok(()),
    }
}

/// Case-insensitive, the way NTFS lists a folder. Names differing only in
/// case fall back to byte order so the result stays total.
fn compare_names(a: &OsStr, b: &OsStr) -> Ordering {
    let fold = |s: &OsStr| s.to_string_lossy().to_lowercase();
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

// ---------------------------------------------------------------------------
// Path resolution
// ---------------------------------------------------------------------------

/// Absolute, lexically normalized form of the input folder. Missing,
/// unreadable and non-directory inputs are rejected here, before the walk
/// starts.
fn resolve_input(input: &Path) -> Result<PathBuf, GenError> {
    let resolved = normalize(input)?;
    let meta = std::fs::metadata(&resolved).map_err(|e| GenError::io(input, e))?;
    if !meta.is_dir() {
        return Err(GenError::NotADirectory(input.to_path_buf()));
    }
    std::fs::read_dir(&resolved).map_err(|e| GenError::io(input, e))?;
    Ok(resolved)
}

/// The root prefix goes through the same normalization as the input, whether
/// or not it exists on disk, so the two always share one form.
fn resolve_root(root: &Path) -> Result<PathBuf, GenError> {
    normalize(root)
}

/// Make `path` absolute and fold away `.` and `..` without touching the
/// filesystem. Symlinks are not resolved, and no `\\?\` verbatim prefix is
/// introduced on Windows.
fn normalize(path: &Path) -> Result<PathBuf, GenError> {
    let absolute = std::path::absolute(path).map_err(|e| GenError::io(path, e))?;
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Map ignore::Error to GenError
// ---------------------------------------------------------------------------

fn map_ignore_error(e: ignore::Error, path: Option<PathBuf>) -> GenError {
    match e {
        ignore::Error::WithPath { path, err } => map_ignore_error(*err, Some(path)),
        ignore::Error::WithDepth { err, .. } => map_ignore_error(*err, path),
        ignore::Error::WithLineNumber { err, .. } => map_ignore_error(*err, path),
        ignore::Error::Loop { child, .. } => GenError::SymlinkLoop(child),
        ignore::Error::Io(io_err) => GenError::io(path.unwrap_or_default(), io_err),
        other => GenError::Walk(other.to_string()),
    }
}

/// The path of a symlink whose target does not exist, if that is what `e`
/// reports. Only raised when links are followed.
fn dangling_link(e: &ignore::Error) -> Option<PathBuf> {
    fn find(e: &ignore::Error, path: Option<&Path>) -> Option<PathBuf> {
        match e {
            ignore::Error::WithPath { path, err } => find(err, Some(path.as_path())),
            ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
                find(err, path)
            }
            ignore::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound => {
                path.filter(|p| p.is_symlink()).map(Path::to_path_buf)
            }
            _ => None,
        }
    }
    find(e, None)
}
