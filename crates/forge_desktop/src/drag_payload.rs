//! Cross-component drag payloads for filesystem-backed items and drop-target resolution.
//!
//! Payloads travel through the host's native drag-and-drop data transfer as JSON under
//! [`DRAG_PAYLOAD_MIME`]. Anything that fails to decode is ignored by drop handlers.

use platform_host::FsNodeKind;
use serde::{Deserialize, Serialize};

use crate::model::{DesktopIcon, IconKind};

/// Data-transfer type carrying an encoded [`DragPayload`].
pub const DRAG_PAYLOAD_MIME: &str = "application/x-promptforge-node";

const DESKTOP_SOURCE: &str = "desktop";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Identifies the dragged filesystem record.
pub struct DragDescriptor {
    /// Folder or prompt.
    pub kind: FsNodeKind,
    /// Backing record id.
    pub id: String,
    /// Display name.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
/// Surface the drag started from.
pub enum DragSource {
    /// The desktop grid.
    Desktop,
    /// Any other view, tagged by name. Build with [`DragSource::other`].
    Other(String),
}

impl DragSource {
    /// Tags a non-desktop source; the reserved `desktop` tag maps to [`DragSource::Desktop`].
    pub fn other(tag: impl Into<String>) -> Self {
        Self::from(tag.into())
    }
}

impl From<String> for DragSource {
    fn from(raw: String) -> Self {
        if raw == DESKTOP_SOURCE {
            Self::Desktop
        } else {
            Self::Other(raw)
        }
    }
}

impl From<DragSource> for String {
    fn from(source: DragSource) -> Self {
        match source {
            DragSource::Desktop => DESKTOP_SOURCE.to_string(),
            DragSource::Other(tag) => tag,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
/// Envelope stored in the data transfer.
pub struct DragPayload {
    /// Dragged record.
    pub descriptor: DragDescriptor,
    /// Originating surface.
    pub source: DragSource,
}

impl DragPayload {
    /// Payload for dragging a filesystem-backed desktop icon; `None` for system icons.
    pub fn from_icon(icon: &DesktopIcon) -> Option<Self> {
        let (kind, id) = icon.backing_record()?;
        Some(Self {
            descriptor: DragDescriptor {
                kind,
                id: id.to_string(),
                name: icon.label.clone(),
            },
            source: DragSource::Desktop,
        })
    }

    /// Serializes the envelope for the data transfer.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; the envelope only holds strings so this does not happen in
    /// practice.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parses an envelope; malformed JSON or an empty record id yields `None`.
    pub fn decode(raw: &str) -> Option<Self> {
        let payload: Self = serde_json::from_str(raw).ok()?;
        (!payload.descriptor.id.trim().is_empty()).then_some(payload)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Why a drop did nothing.
pub enum DropRejection {
    /// A folder was dropped onto its own icon.
    SelfDrop,
    /// A desktop item was dropped onto empty desktop space.
    AlreadyOnDesktop,
    /// The icon under the pointer is not a folder.
    NotAFolder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Outcome of dropping a payload.
pub enum DropDecision {
    /// Ask the filesystem to move the record into `folder_id`.
    MoveIntoFolder {
        kind: FsNodeKind,
        id: String,
        folder_id: String,
    },
    /// Ask the filesystem to move the record to the root.
    MoveToRoot { kind: FsNodeKind, id: String },
    /// Nothing to do.
    Rejected(DropRejection),
}

/// Decides what dropping `payload` over `target` (`None` = empty desktop) means.
pub fn resolve_drop(payload: &DragPayload, target: Option<&DesktopIcon>) -> DropDecision {
    let descriptor = &payload.descriptor;
    match target {
        Some(icon) => {
            let folder_id = match (icon.kind, icon.backing_record()) {
                (IconKind::Folder, Some((_, folder_id))) => folder_id,
                _ => return DropDecision::Rejected(DropRejection::NotAFolder),
            };
            if descriptor.kind == FsNodeKind::Folder && descriptor.id == folder_id {
                return DropDecision::Rejected(DropRejection::SelfDrop);
            }
            DropDecision::MoveIntoFolder {
                kind: descriptor.kind,
                id: descriptor.id.clone(),
                folder_id: folder_id.to_string(),
            }
        }
        None if payload.source == DragSource::Desktop => {
            DropDecision::Rejected(DropRejection::AlreadyOnDesktop)
        }
        None => DropDecision::MoveToRoot {
            kind: descriptor.kind,
            id: descriptor.id.clone(),
        },
    }
}
