//! Context-menu actions for desktop icons and the desktop background.

use crate::model::DesktopIcon;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Closed set of menu actions. Ids coming from stale or foreign menus parse to
/// [`ContextAction::Unhandled`].
pub enum ContextAction {
    /// Open the icon's view.
    Open,
    /// Open the recycle bin window.
    OpenRecycleBin,
    /// Start inline rename.
    Rename,
    /// Move the icon to the recycle bin.
    Delete,
    /// Permanently delete everything in the recycle bin.
    EmptyRecycleBin,
    /// Re-lay all icons column-major.
    ArrangeIcons,
    /// Select every icon.
    SelectAll,
    /// Reload filesystem-backed icons.
    Refresh,
    /// Unknown action id.
    Unhandled(String),
}

impl ContextAction {
    /// Stable action id used by menu markup.
    pub fn id(&self) -> &str {
        match self {
            Self::Open => "open",
            Self::OpenRecycleBin => "open-bin",
            Self::Rename => "rename-request",
            Self::Delete => "delete",
            Self::EmptyRecycleBin => "empty-bin",
            Self::ArrangeIcons => "arrange",
            Self::SelectAll => "select-all",
            Self::Refresh => "refresh",
            Self::Unhandled(raw) => raw,
        }
    }

    /// Menu label.
    pub fn label(&self) -> &str {
        match self {
            Self::Open => "Open",
            Self::OpenRecycleBin => "Open Recycle Bin",
            Self::Rename => "Rename",
            Self::Delete => "Delete",
            Self::EmptyRecycleBin => "Empty Recycle Bin",
            Self::ArrangeIcons => "Arrange Icons",
            Self::SelectAll => "Select All",
            Self::Refresh => "Refresh",
            Self::Unhandled(_) => "",
        }
    }

    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "open" => Self::Open,
            "open-bin" => Self::OpenRecycleBin,
            "rename-request" => Self::Rename,
            "delete" => Self::Delete,
            "empty-bin" => Self::EmptyRecycleBin,
            "arrange" => Self::ArrangeIcons,
            "select-all" => Self::SelectAll,
            "refresh" => Self::Refresh,
            _ => Self::Unhandled(raw.to_string()),
        }
    }
}

/// Actions offered on an icon's menu.
pub fn icon_menu_actions(icon: &DesktopIcon) -> Vec<ContextAction> {
    if icon.is_recycle_bin() {
        vec![ContextAction::OpenRecycleBin, ContextAction::EmptyRecycleBin]
    } else if icon.is_system() {
        vec![ContextAction::Open]
    } else {
        vec![
            ContextAction::Open,
            ContextAction::Rename,
            ContextAction::Delete,
        ]
    }
}

/// Actions offered on the desktop background menu.
pub fn desktop_menu_actions() -> Vec<ContextAction> {
    vec![
        ContextAction::ArrangeIcons,
        ContextAction::SelectAll,
        ContextAction::Refresh,
        ContextAction::OpenRecycleBin,
    ]
}
