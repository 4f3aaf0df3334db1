//! File and syntax-node identities.

use std::fmt;

/// Identifier of a source file within one analysis run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(u32);

impl FileId {
    pub const fn new(index: u32) -> Self {
        Self(index)
    }

    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}

/// Identity of a syntax node: its file plus a per-file index.
///
/// The binding trace is keyed by this identity; the parser collaborator is
/// responsible for handing out unique indices within a file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NodeId {
    file: FileId,
    local: u32,
}

impl NodeId {
    pub const fn new(file: FileId, local: u32) -> Self {
        Self { file, local }
    }

    pub const fn file(self) -> FileId {
        self.file
    }

    pub const fn local(self) -> u32 {
        self.local
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file.0, self.local)
    }
}
