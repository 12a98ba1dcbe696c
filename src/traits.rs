use std::path::Path;

use uuid::Uuid;

use crate::entry::FileKind;

/// Decides which item group a file belongs to.
///
/// The default, [`ExtensionClassifier`], follows the usual C/C++ split. Implement
/// this to route other extensions (`.inl`, `.cc`, ...) into compiled or header groups.
///
/// # Example
///
/// ```rust
/// use std::path::Path;
/// use vcxitems_gen::{Classifier, ExtensionClassifier, FileKind};
///
/// struct WithCc;
///
/// impl Classifier for WithCc {
///     fn classify(&self, path: &Path) -> FileKind {
///         match path.extension().and_then(|e| e.to_str()) {
///             Some("cc") => FileKind::Source,
///             _ => ExtensionClassifier.classify(path),
///         }
///     }
/// }
///
/// assert_eq!(WithCc.classify(Path::new("lib/a.cc")), FileKind::Source);
/// assert_eq!(WithCc.classify(Path::new("lib/a.hpp")), FileKind::Header);
/// ```
pub trait Classifier {
    /// Classify a regular file. Only the path is available; contents are never read.
    fn classify(&self, path: &Path) -> FileKind;
}

/// Produces the unique identifier for each filter declaration.
///
/// Identifiers only need to be unique within one filters document. They are
/// not stable across runs.
pub trait IdGenerator {
    fn next_id(&mut self) -> Uuid;
}

/// `.h`/`.hpp` are headers, `.c`/`.cpp` are sources, the rest is other.
/// Matching is case-sensitive: `A.H` is an other file.
///
/// The extension is whatever follows the last `.` of the file name, so a file
/// called just `.h` still counts as a header.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtensionClassifier;

impl Classifier for ExtensionClassifier {
    fn classify(&self, path: &Path) -> FileKind {
        let extension = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.rsplit_once('.'))
            .map(|(_, ext)| ext);

        match extension {
            Some("h" | "hpp") => FileKind::Header,
            Some("c" | "cpp") => FileKind::Source,
            _ => FileKind::Other,
        }
    }
}

/// Random v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&mut self) -> Uuid {
        Uuid::new_v4()
    }
}

/// Counts up from 1. Gives byte-for-byte reproducible filters documents.
#[derive(Debug, Default, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl IdGenerator for SequentialIds {
    fn next_id(&mut self) -> Uuid {
        self.next += 1;
        Uuid::from_u128(self.next)
    }
}
