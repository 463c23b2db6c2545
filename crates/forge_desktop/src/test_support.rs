//! Shared fixtures for unit tests: a 6x7 grid of 100px cells with no padding.

use platform_host::{FsNode, FsNodeKind};

use crate::{
    config::{DesktopConfig, GridMetrics, SystemIconSpec, ViewportSize},
    model::{
        DesktopIcon, DesktopState, GridPosition, IconId, InteractionMode, SurfaceRect,
        RECYCLE_BIN_ICON_ID,
    },
};

fn system_spec(id: &str, label: &str, col: u32, row: u32) -> SystemIconSpec {
    SystemIconSpec {
        id: id.to_string(),
        label: label.to_string(),
        icon: "gear".to_string(),
        color: "slate".to_string(),
        col,
        row,
    }
}

pub(crate) fn test_config() -> DesktopConfig {
    let mut config = DesktopConfig::embedded();
    config.grid = GridMetrics {
        cell_width: 100,
        cell_height: 100,
        padding: 0,
    };
    config.initial_viewport = ViewportSize {
        width: 600,
        height: 700,
    };
    config.system_icons = vec![
        system_spec(RECYCLE_BIN_ICON_ID, "Recycle Bin", 0, 0),
        system_spec("sys:a", "A", 2, 3),
        system_spec("sys:b", "B", 4, 5),
    ];
    config
}

pub(crate) fn test_surface() -> SurfaceRect {
    SurfaceRect {
        x: 0,
        y: 0,
        w: 600,
        h: 700,
    }
}

pub(crate) fn test_desktop() -> (DesktopState, InteractionMode) {
    (
        DesktopState::from_config(&test_config()),
        InteractionMode::Idle,
    )
}

pub(crate) fn sys_a() -> IconId {
    IconId::new("sys:a")
}

pub(crate) fn sys_b() -> IconId {
    IconId::new("sys:b")
}

pub(crate) fn folder_id(id: &str) -> IconId {
    IconId::for_node(FsNodeKind::Folder, id)
}

pub(crate) fn add_folder(state: &mut DesktopState, id: &str, col: u32, row: u32) {
    state.icons.push(DesktopIcon::from_node(
        &FsNode::folder(id, format!("Folder {id}")),
        GridPosition::new(col, row),
        40,
    ));
}

pub(crate) fn add_prompt(state: &mut DesktopState, id: &str, col: u32, row: u32) {
    state.icons.push(DesktopIcon::from_node(
        &FsNode::prompt(id, format!("Prompt {id}")),
        GridPosition::new(col, row),
        40,
    ));
}
