use std::collections::{BTreeMap, BTreeSet};

use platform_host::{FsNode, FsNodeKind};
use serde::{Deserialize, Serialize};

use crate::{
    actions::ContextAction,
    config::{DesktopConfig, SystemIconSpec},
    grid::GridBounds,
    marquee::MarqueeSession,
};

pub const DESKTOP_LAYOUT_SCHEMA_VERSION: u32 = 1;
pub const RECYCLE_BIN_ICON_ID: &str = "sys:recycle-bin";

const FOLDER_GLYPH: &str = "folder";
const FOLDER_COLOR: &str = "amber";
const PROMPT_GLYPH: &str = "file-text";
const PROMPT_COLOR: &str = "sky";

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IconId(String);

impl IconId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Id of the icon representing a filesystem record: `"<kind>:<record id>"`.
    pub fn for_node(kind: FsNodeKind, record_id: &str) -> Self {
        Self(format!("{}:{record_id}", kind.as_str()))
    }

    pub fn recycle_bin() -> Self {
        Self(RECYCLE_BIN_ICON_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Splits a filesystem-backed id into kind and record id.
    pub fn backing_record(&self) -> Option<(FsNodeKind, &str)> {
        let (prefix, record_id) = self.0.split_once(':')?;
        let kind = match prefix {
            "folder" => FsNodeKind::Folder,
            "prompt" => FsNodeKind::Prompt,
            _ => return None,
        };
        (!record_id.is_empty()).then_some((kind, record_id))
    }
}

impl std::fmt::Display for IconId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IconKind {
    System,
    Folder,
    Prompt,
}

impl IconKind {
    pub fn from_node_kind(kind: FsNodeKind) -> Self {
        match kind {
            FsNodeKind::Folder => Self::Folder,
            FsNodeKind::Prompt => Self::Prompt,
        }
    }

    pub fn node_kind(self) -> Option<FsNodeKind> {
        match self {
            Self::System => None,
            Self::Folder => Some(FsNodeKind::Folder),
            Self::Prompt => Some(FsNodeKind::Prompt),
        }
    }
}

/// Grid address; ordering is column-major so sorted cells read top-down, left-to-right.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct GridPosition {
    pub col: u32,
    pub row: u32,
}

impl GridPosition {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopIcon {
    pub id: IconId,
    pub label: String,
    pub icon: String,
    pub color: String,
    pub kind: IconKind,
    pub position: GridPosition,
}

impl DesktopIcon {
    pub fn from_system_spec(spec: &SystemIconSpec) -> Self {
        Self {
            id: IconId::new(spec.id.clone()),
            label: spec.label.clone(),
            icon: spec.icon.clone(),
            color: spec.color.clone(),
            kind: IconKind::System,
            position: GridPosition::new(spec.col, spec.row),
        }
    }

    pub fn from_node(node: &FsNode, position: GridPosition, max_label_chars: usize) -> Self {
        let (icon, color) = node_glyph(node.kind);
        Self {
            id: IconId::for_node(node.kind, &node.id),
            label: truncate_label(&node.name, max_label_chars),
            icon: icon.to_string(),
            color: color.to_string(),
            kind: IconKind::from_node_kind(node.kind),
            position,
        }
    }

    pub fn is_system(&self) -> bool {
        self.kind == IconKind::System
    }

    pub fn is_recycle_bin(&self) -> bool {
        self.id.as_str() == RECYCLE_BIN_ICON_ID
    }

    /// Filesystem-backed icons move through payload drag/drop and never reposition on the grid.
    pub fn uses_grid_drag(&self) -> bool {
        self.is_system()
    }

    pub fn backing_record(&self) -> Option<(FsNodeKind, &str)> {
        let kind = self.kind.node_kind()?;
        let (id_kind, record_id) = self.id.backing_record()?;
        (id_kind == kind).then_some((kind, record_id))
    }
}

fn node_glyph(kind: FsNodeKind) -> (&'static str, &'static str) {
    match kind {
        FsNodeKind::Folder => (FOLDER_GLYPH, FOLDER_COLOR),
        FsNodeKind::Prompt => (PROMPT_GLYPH, PROMPT_COLOR),
    }
}

pub fn truncate_label(label: &str, max_chars: usize) -> String {
    label.trim().chars().take(max_chars).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TrashedSourceType {
    Optimization,
    Project,
    Folder,
    File,
}

impl TrashedSourceType {
    /// Folders and files have a filesystem record and so a desktop icon. Optimizations and
    /// projects belong to other views.
    pub fn has_desktop_icon(self) -> bool {
        matches!(self, Self::Folder | Self::File)
    }

    /// Kind of the desktop icon a restored item comes back as.
    pub fn node_kind(self) -> FsNodeKind {
        match self {
            Self::Folder | Self::Project => FsNodeKind::Folder,
            Self::File | Self::Optimization => FsNodeKind::Prompt,
        }
    }

    pub fn from_node_kind(kind: FsNodeKind) -> Self {
        match kind {
            FsNodeKind::Folder => Self::Folder,
            FsNodeKind::Prompt => Self::File,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecycleBinItem {
    /// Backing record id.
    pub id: String,
    pub name: String,
    pub source_type: TrashedSourceType,
    /// Unix milliseconds.
    pub trashed_at: u64,
    #[serde(default)]
    pub original_position: Option<GridPosition>,
}

impl RecycleBinItem {
    pub fn icon_id(&self) -> IconId {
        IconId::for_node(self.source_type.node_kind(), &self.id)
    }

    pub fn restored_icon(&self, position: GridPosition, max_label_chars: usize) -> DesktopIcon {
        let node = FsNode {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.source_type.node_kind(),
            parent_id: None,
        };
        DesktopIcon::from_node(&node, position, max_label_chars)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextMenuState {
    pub open: bool,
    pub x: i32,
    pub y: i32,
    /// `None` targets the desktop background.
    pub target: Option<IconId>,
    pub actions: Vec<ContextAction>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointerPosition {
    pub x: i32,
    pub y: i32,
}

impl PointerPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Client-space rectangle of the desktop surface element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl SurfaceRect {
    pub fn contains(self, pointer: PointerPosition) -> bool {
        pointer.x >= self.x
            && pointer.y >= self.y
            && pointer.x < self.x + self.w
            && pointer.y < self.y + self.h
    }

    /// Converts a client-space pointer into surface coordinates.
    pub fn local(self, pointer: PointerPosition) -> PointerPosition {
        PointerPosition::new(pointer.x - self.x, pointer.y - self.y)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    pub icon_id: IconId,
    /// Pointer offset inside the icon cell at drag start.
    pub offset_x: i32,
    pub offset_y: i32,
    pub origin: GridPosition,
    pub ghost: GridPosition,
}

/// Transient pointer gesture. Grid drags and marquees never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    Dragging(DragSession),
    Marqueeing(MarqueeSession),
}

impl InteractionMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn drag(&self) -> Option<&DragSession> {
        match self {
            Self::Dragging(session) => Some(session),
            _ => None,
        }
    }

    pub fn marquee(&self) -> Option<&MarqueeSession> {
        match self {
            Self::Marqueeing(session) => Some(session),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesktopState {
    pub icons: Vec<DesktopIcon>,
    pub selection: BTreeSet<IconId>,
    pub recycle_bin: Vec<RecycleBinItem>,
    pub context_menu: ContextMenuState,
    /// Icon whose label editor is open.
    pub renaming: Option<IconId>,
    pub bounds: GridBounds,
    /// Persisted cells for icons that are not currently on the desktop.
    pub remembered_positions: BTreeMap<IconId, GridPosition>,
}

impl Default for DesktopState {
    fn default() -> Self {
        Self {
            icons: Vec::new(),
            selection: BTreeSet::new(),
            recycle_bin: Vec::new(),
            context_menu: ContextMenuState::default(),
            renaming: None,
            bounds: GridBounds::new(1, 1),
            remembered_positions: BTreeMap::new(),
        }
    }
}

impl DesktopState {
    /// Builds the boot state: system icons at their manifest cells inside the initial viewport.
    pub fn from_config(config: &DesktopConfig) -> Self {
        let bounds = GridBounds::from_viewport(
            &config.grid,
            config.initial_viewport.width,
            config.initial_viewport.height,
        );
        let mut state = Self {
            icons: config
                .system_icons
                .iter()
                .map(DesktopIcon::from_system_spec)
                .collect(),
            bounds,
            ..Self::default()
        };
        crate::grid::settle_positions(&mut state.icons, bounds);
        state
    }

    pub fn icon(&self, icon_id: &IconId) -> Option<&DesktopIcon> {
        self.icons.iter().find(|icon| &icon.id == icon_id)
    }

    pub fn icon_mut(&mut self, icon_id: &IconId) -> Option<&mut DesktopIcon> {
        self.icons.iter_mut().find(|icon| &icon.id == icon_id)
    }

    pub fn is_selected(&self, icon_id: &IconId) -> bool {
        self.selection.contains(icon_id)
    }

    /// Whether an icon id is currently represented by a recycle bin entry.
    pub fn is_trashed(&self, icon_id: &IconId) -> bool {
        self.recycle_bin.iter().any(|item| &item.icon_id() == icon_id)
    }

    pub fn snapshot(&self) -> DesktopLayoutSnapshot {
        let mut positions = self.remembered_positions.clone();
        for icon in &self.icons {
            positions.insert(icon.id.clone(), icon.position);
        }
        DesktopLayoutSnapshot {
            schema_version: DESKTOP_LAYOUT_SCHEMA_VERSION,
            positions,
            recycle_bin: self.recycle_bin.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesktopLayoutSnapshot {
    pub schema_version: u32,
    pub positions: BTreeMap<IconId, GridPosition>,
    #[serde(default)]
    pub recycle_bin: Vec<RecycleBinItem>,
}
