//! Filesystem orchestrator data types shared by the desktop core and host adapters.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
/// Kind of a filesystem-backed record.
pub enum FsNodeKind {
    /// Folder that can contain prompts and other folders.
    Folder,
    /// Prompt document.
    Prompt,
}

impl FsNodeKind {
    /// Stable string tag used in icon ids and drag payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Folder => "folder",
            Self::Prompt => "prompt",
        }
    }
}

impl std::fmt::Display for FsNodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Record returned by [`crate::FilesystemService::load_children`].
pub struct FsNode {
    /// Backing record id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Folder or prompt.
    pub kind: FsNodeKind,
    /// Parent folder id, `None` for root-level records.
    #[serde(default)]
    pub parent_id: Option<String>,
}

impl FsNode {
    /// Builds a root-level folder record.
    pub fn folder(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: FsNodeKind::Folder,
            parent_id: None,
        }
    }

    /// Builds a root-level prompt record.
    pub fn prompt(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: FsNodeKind::Prompt,
            parent_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// One `move_node` request as observed by recording adapters.
pub struct FsMoveRequest {
    /// Kind of the moved record.
    pub kind: FsNodeKind,
    /// Moved record id.
    pub id: String,
    /// Destination folder, `None` for the root.
    pub target_folder_id: Option<String>,
}
