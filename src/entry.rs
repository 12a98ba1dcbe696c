use std::path::{Component, Path, PathBuf};

/// A path found during the walk, paired with its part below the root prefix.
///
/// The relative part is computed once, component by component, when the path
/// is created. Rendering never does text substitution, so a root of
/// `/src/proj` leaves `/src/project2/a.c` alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectPath {
    absolute: PathBuf,
    relative: Option<PathBuf>,
}

impl ProjectPath {
    pub fn new(absolute: impl Into<PathBuf>, root: &Path) -> Self {
        let absolute = absolute.into();
        let relative = absolute.strip_prefix(root).ok().map(Path::to_path_buf);
        Self { absolute, relative }
    }

    /// Full path as found on disk.
    pub fn absolute(&self) -> &Path {
        &self.absolute
    }

    /// Path below the root prefix, or `None` if it lies outside the root.
    pub fn relative(&self) -> Option<&Path> {
        self.relative.as_deref()
    }

    /// Whether this is the root prefix itself.
    pub fn is_root(&self) -> bool {
        self.relative().is_some_and(|r| r.as_os_str().is_empty())
    }

    /// Render in MSBuild form: root-relative and joined with `\`.
    ///
    /// Paths outside the root keep their full form, separators rewritten.
    pub fn render(&self) -> String {
        match self.relative() {
            Some(rel) => rel
                .components()
                .filter_map(|c| match c {
                    Component::Normal(s) => Some(s.to_string_lossy()),
                    _ => None,
                })
                .collect::<Vec<_>>()
                .join("\\"),
            None => self.absolute().to_string_lossy().replace('/', "\\"),
        }
    }
}

/// How a file is listed in the project, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileKind {
    /// `.h`, `.hpp`
    Header,

    /// `.c`, `.cpp`
    Source,

    /// Everything else, including files without an extension.
    Other,
}

impl FileKind {
    /// All kinds, in the order their item groups are written.
    pub const ALL: [FileKind; 3] = [FileKind::Header, FileKind::Source, FileKind::Other];

    /// The MSBuild item element name.
    pub fn item_name(self) -> &'static str {
        match self {
            FileKind::Header => "ClInclude",
            FileKind::Source => "ClCompile",
            FileKind::Other => "None",
        }
    }
}

/// A regular file and the folder it sits in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: ProjectPath,
    pub folder: ProjectPath,
    pub kind: FileKind,
}
