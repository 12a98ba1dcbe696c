use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{info, warn};
use uuid::Uuid;

use crate::entry::FileKind;
use crate::error::GenError;
use crate::traits::IdGenerator;
use crate::walk::Inventory;
use crate::xml::DocumentWriter;

pub const PROJECT_EXTENSION: &str = "vcxitems";
pub const FILTERS_EXTENSION: &str = "vcxitems.filters";

// ---------------------------------------------------------------------------
// FilterTable
// ---------------------------------------------------------------------------

/// A `<Filter>` declaration: a folder as it appears in Solution Explorer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Filter {
    pub include: String,
    pub id: Uuid,
}

/// Rendered folder path → filter declaration, in first-seen order.
///
/// Items look up their folder here instead of copying the folder string, so
/// every reference in the filters document names a declared filter.
#[derive(Debug, Default)]
pub struct FilterTable {
    filters: Vec<Filter>,
    index: HashMap<String, usize>,
}

impl FilterTable {
    /// Register a folder. Returns `false` if it was already declared; the
    /// original identifier is kept.
    pub fn insert(&mut self, include: String, ids: &mut dyn IdGenerator) -> bool {
        if self.index.contains_key(&include) {
            return false;
        }
        self.index.insert(include.clone(), self.filters.len());
        self.filters.push(Filter {
            include,
            id: ids.next_id(),
        });
        true
    }

    pub fn get(&self, include: &str) -> Option<&Filter> {
        self.index.get(include).map(|&i| &self.filters[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Filter> {
        self.filters.iter()
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

// ---------------------------------------------------------------------------
// ProjectDocuments
// ---------------------------------------------------------------------------

/// One `<ClInclude>`, `<ClCompile>` or `<None>` item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    /// Root-relative path, `\`-separated.
    pub include: String,

    /// Include value of the owning filter. `None` for files directly in the
    /// root prefix, which sit at the top level of the project.
    pub filter: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ItemGroup {
    pub kind: FileKind,
    pub items: Vec<Item>,
}

/// In-memory form of the `.vcxitems` and `.vcxitems.filters` pair.
#[derive(Debug)]
pub struct ProjectDocuments {
    pub filters: FilterTable,
    pub groups: Vec<ItemGroup>,
}

impl ProjectDocuments {
    /// Declare a filter for every folder, then list every file under its kind.
    ///
    /// The root prefix itself gets no filter. A folder that renders to an
    /// already declared path is declared once.
    pub fn build(inventory: &Inventory, ids: &mut dyn IdGenerator) -> Self {
        let mut filters = FilterTable::default();
        for folder in &inventory.folders {
            if folder.is_root() {
                continue;
            }
            let include = folder.render();
            if !filters.insert(include.clone(), ids) {
                warn!(folder = %include, "folder visited twice, keeping the first filter");
            }
        }

        let groups = FileKind::ALL
            .iter()
            .map(|&kind| ItemGroup {
                kind,
                items: inventory
                    .files(kind)
                    .iter()
                    .map(|file| Item {
                        include: file.path.render(),
                        filter: filters
                            .get(&file.folder.render())
                            .map(|f| f.include.clone()),
                    })
                    .collect(),
            })
            .collect();

        Self { filters, groups }
    }

    /// Number of items across all groups.
    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }

    /// Serialize the `.vcxitems` document.
    pub fn render_project(&self) -> Result<Vec<u8>, GenError> {
        let mut doc = DocumentWriter::begin()?;
        for group in &self.groups {
            if group.items.is_empty() {
                doc.empty("ItemGroup", &[])?;
                continue;
            }
            doc.start("ItemGroup", &[])?;
            for item in &group.items {
                doc.empty(group.kind.item_name(), &[("Include", item.include.as_str())])?;
            }
            doc.end("ItemGroup")?;
        }
        doc.finish()
    }

    /// Serialize the `.vcxitems.filters` document.
    pub fn render_filters(&self) -> Result<Vec<u8>, GenError> {
        let mut doc = DocumentWriter::begin()?;

        if self.filters.is_empty() {
            doc.empty("ItemGroup", &[])?;
        } else {
            doc.start("ItemGroup", &[])?;
            for filter in self.filters.iter() {
                doc.start("Filter", &[("Include", filter.include.as_str())])?;
                let id = filter.id.braced().to_string();
                doc.text_element("UniqueIdentifier", &id)?;
                doc.end("Filter")?;
            }
            doc.end("ItemGroup")?;
        }

        for group in &self.groups {
            if group.items.is_empty() {
                doc.empty("ItemGroup", &[])?;
                continue;
            }
            doc.start("ItemGroup", &[])?;
            let name = group.kind.item_name();
            for item in &group.items {
                match &item.filter {
                    Some(filter) => {
                        doc.start(name, &[("Include", item.include.as_str())])?;
                        doc.text_element("Filter", filter)?;
                        doc.end(name)?;
                    }
                    None => doc.empty(name, &[("Include", item.include.as_str())])?,
                }
            }
            doc.end("ItemGroup")?;
        }

        doc.finish()
    }

    /// Write `{base_name}.vcxitems` and `{base_name}.vcxitems.filters` into `output_dir`.
    ///
    /// Both targets are checked, and both documents rendered and staged in
    /// temp files next to their targets, before either target is replaced. A
    /// failure up to that point leaves the previous outputs as they were and
    /// no temp file behind. The two renames are not atomic as a pair.
    pub fn write(&self, output_dir: &Path, base_name: &str) -> Result<(PathBuf, PathBuf), GenError> {
        let project_path = output_dir.join(format!("{base_name}.{PROJECT_EXTENSION}"));
        let filters_path = output_dir.join(format!("{base_name}.{FILTERS_EXTENSION}"));

        check_target(&project_path)?;
        check_target(&filters_path)?;

        let project = stage(output_dir, &project_path, &self.render_project()?)?;
        let filters = stage(output_dir, &filters_path, &self.render_filters()?)?;

        commit(project, &project_path)?;
        commit(filters, &filters_path)?;

        info!(
            project = %project_path.display(),
            filters = %filters_path.display(),
            items = self.item_count(),
            "wrote project files"
        );
        Ok((project_path, filters_path))
    }
}

/// Targets must not be folders: the rename onto one fails only after the
/// other file has been replaced.
fn check_target(target: &Path) -> Result<(), GenError> {
    if target.is_dir() {
        return Err(GenError::Io {
            path: target.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::Other, "output target is a directory"),
        });
    }
    Ok(())
}

/// Write `bytes` to a temp file in `dir`. Dropping the result deletes it.
fn stage(dir: &Path, target: &Path, bytes: &[u8]) -> Result<NamedTempFile, GenError> {
    let mut file = NamedTempFile::new_in(dir).map_err(|e| GenError::io(target, e))?;
    file.write_all(bytes).map_err(|e| GenError::io(target, e))?;
    file.flush().map_err(|e| GenError::io(target, e))?;
    Ok(file)
}

fn commit(file: NamedTempFile, target: &Path) -> Result<(), GenError> {
    file.persist(target)
        .map(drop)
        .map_err(|e| GenError::io(target, e.error))
}
