//! Reducer actions, side-effect intents, and transition logic for the desktop grid.

use std::collections::BTreeSet;

use platform_host::{FsNode, FsNodeKind};
use thiserror::Error;

use crate::{
    actions::{desktop_menu_actions, icon_menu_actions, ContextAction},
    config::DesktopConfig,
    drag_payload::{resolve_drop, DragPayload, DropDecision},
    grid::{self, GridBounds},
    marquee::MarqueeSession,
    model::{
        truncate_label, ContextMenuState, DesktopIcon, DesktopLayoutSnapshot, DesktopState,
        DragSession, IconId, IconKind, InteractionMode, PointerPosition, RecycleBinItem,
        SurfaceRect, TrashedSourceType,
    },
};

#[derive(Debug, Clone, PartialEq)]
/// Actions accepted by [`reduce_desktop`] to mutate [`DesktopState`].
pub enum DesktopAction {
    /// Replace the selection with one icon.
    SelectIcon {
        /// Icon to select.
        icon_id: IconId,
    },
    /// Add or remove one icon from the selection.
    ToggleIconSelection {
        /// Icon to toggle.
        icon_id: IconId,
    },
    /// Clear the selection.
    DeselectAll,
    /// Select every icon on the desktop.
    SelectAll,
    /// Begin repositioning a grid-draggable icon.
    StartDrag {
        /// Dragged icon.
        icon_id: IconId,
        /// Pointer offset inside the icon cell.
        offset_x: i32,
        /// Pointer offset inside the icon cell.
        offset_y: i32,
    },
    /// Move the drag ghost under the pointer.
    UpdateDragGhost {
        /// Client-space pointer.
        pointer: PointerPosition,
        /// Client-space desktop surface.
        surface: SurfaceRect,
    },
    /// Drop the dragged icon on its ghost cell when that cell is free.
    EndDrag,
    /// Begin a marquee over empty surface.
    BeginMarquee {
        /// Client-space pointer.
        pointer: PointerPosition,
        /// Client-space desktop surface.
        surface: SurfaceRect,
        /// Toggle membership instead of replacing the selection.
        additive: bool,
    },
    /// Stretch the marquee to the pointer.
    UpdateMarquee {
        /// Client-space pointer.
        pointer: PointerPosition,
    },
    /// Finish the marquee.
    EndMarquee,
    /// Force-end any gesture; drags snap back, marquees keep their selection.
    CancelGestures,
    /// Open the inline label editor.
    BeginRename {
        /// Icon to rename.
        icon_id: IconId,
    },
    /// Commit a label edit. Blank labels cancel the edit.
    RenameIcon {
        /// Renamed icon.
        icon_id: IconId,
        /// Raw editor text.
        label: String,
    },
    /// Close the label editor without changes.
    CancelRename,
    /// Recompute grid bounds for a new viewport size.
    SetViewport {
        /// Viewport width in px.
        width: i32,
        /// Viewport height in px.
        height: i32,
    },
    /// Pull icons outside the bounds back onto the grid.
    ReclampPositions,
    /// Re-lay all icons column-major.
    ArrangeIcons,
    /// Open the icon menu (`target` set) or background menu.
    OpenContextMenu {
        /// Client-space x.
        x: i32,
        /// Client-space y.
        y: i32,
        /// Icon under the pointer.
        target: Option<IconId>,
    },
    /// Close the context menu.
    CloseContextMenu,
    /// Run a menu action against an icon.
    ExecuteIconAction {
        /// Target icon.
        icon_id: IconId,
        /// Action to run.
        action: ContextAction,
        /// Unix ms, stamped on recycle bin entries.
        now_ms: u64,
    },
    /// Run a menu action against the open menu's target.
    ExecuteContextAction {
        /// Action to run.
        action: ContextAction,
        /// Unix ms, stamped on recycle bin entries.
        now_ms: u64,
    },
    /// Move a filesystem-backed icon into the recycle bin.
    TrashIcon {
        /// Icon to trash.
        icon_id: IconId,
        /// Unix ms.
        trashed_at: u64,
    },
    /// Trash every selected filesystem-backed icon.
    DeleteSelection {
        /// Unix ms.
        trashed_at: u64,
    },
    /// Record an item trashed from another view.
    TrashExternalItem {
        /// Bin entry.
        item: RecycleBinItem,
    },
    /// Put a bin entry back on the desktop.
    RestoreItem {
        /// Backing record id of the entry.
        item_id: String,
    },
    /// Drop one bin entry for good.
    PermanentlyDeleteItem {
        /// Backing record id of the entry.
        item_id: String,
    },
    /// Drop every bin entry for good.
    EmptyRecycleBin,
    /// Reconcile icons of `kind` against the backing records.
    SyncNodes {
        /// Icon family being reconciled.
        kind: FsNodeKind,
        /// Current root-level records.
        nodes: Vec<FsNode>,
    },
    /// Handle a payload dropped on an icon (`target`) or on empty desktop.
    DropPayload {
        /// Decoded payload.
        payload: DragPayload,
        /// Icon under the pointer.
        target: Option<IconId>,
    },
    /// Restore persisted positions and recycle bin.
    HydrateLayout {
        /// Persisted layout.
        snapshot: DesktopLayoutSnapshot,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Side-effect intents emitted by [`reduce_desktop`] for the host to execute.
pub enum RuntimeEffect {
    /// Persist the layout snapshot.
    PersistLayout,
    /// Open the view behind an icon.
    OpenIcon {
        /// Opened icon.
        icon_id: IconId,
    },
    /// Open the recycle bin window.
    OpenRecycleBin,
    /// Focus the label editor of an icon.
    BeginRename {
        /// Icon being renamed.
        icon_id: IconId,
    },
    /// Rename the backing record.
    RenameNode {
        /// Record kind.
        kind: FsNodeKind,
        /// Record id.
        id: String,
        /// New name.
        name: String,
    },
    /// Soft-delete the backing record.
    TrashNode {
        /// Record kind.
        kind: FsNodeKind,
        /// Record id.
        id: String,
    },
    /// Undo a soft delete.
    RestoreNode {
        /// Original entity type.
        source_type: TrashedSourceType,
        /// Record id.
        id: String,
    },
    /// Permanently delete bin entries.
    PurgeItems(Vec<RecycleBinItem>),
    /// Move a record through the filesystem orchestrator.
    MoveNode {
        /// Record kind.
        kind: FsNodeKind,
        /// Record id.
        id: String,
        /// Destination, `None` for the root.
        target_folder_id: Option<String>,
    },
    /// Reload filesystem-backed icons.
    RequestResync,
    /// A restore found no free visible cell; warn the user.
    RestoredOffGrid {
        /// Restored icon.
        icon_id: IconId,
    },
    /// A menu produced an action id this runtime does not know.
    UnhandledAction(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Reasons an action leaves state untouched.
pub enum ReducerError {
    /// No icon with this id is on the desktop.
    #[error("icon `{0}` not found")]
    IconNotFound(IconId),
    /// No recycle bin entry with this id.
    #[error("recycle bin item `{0}` not found")]
    RecycleItemNotFound(String),
    /// System icons cannot be renamed or deleted.
    #[error("system icon `{0}` cannot be renamed or deleted")]
    SystemIconProtected(IconId),
    /// Filesystem-backed icons use payload drag only.
    #[error("icon `{0}` uses payload drag, not grid repositioning")]
    NotGridDraggable(IconId),
    /// The icon id does not name a filesystem record.
    #[error("icon `{0}` has no backing record")]
    NoBackingRecord(IconId),
    /// A drag or marquee is already running.
    #[error("another pointer gesture is active")]
    GestureActive,
}

/// Applies a [`DesktopAction`] to the desktop state and collects resulting side effects.
///
/// On error the caller must discard `state` and `interaction`; the desktop store reduces into
/// clones for that reason.
///
/// # Errors
///
/// Returns a [`ReducerError`] when the action references a missing icon or bin entry, targets a
/// protected system icon, or starts a gesture while another one is active.
pub fn reduce_desktop(
    state: &mut DesktopState,
    interaction: &mut InteractionMode,
    config: &DesktopConfig,
    action: DesktopAction,
) -> Result<Vec<RuntimeEffect>, ReducerError> {
    let mut effects = Vec::new();
    match action {
        DesktopAction::SelectIcon { icon_id } => {
            ensure_icon(state, &icon_id)?;
            state.selection = BTreeSet::from([icon_id]);
        }
        DesktopAction::ToggleIconSelection { icon_id } => {
            ensure_icon(state, &icon_id)?;
            if !state.selection.remove(&icon_id) {
                state.selection.insert(icon_id);
            }
        }
        DesktopAction::DeselectAll => state.selection.clear(),
        DesktopAction::SelectAll => select_all(state),
        DesktopAction::StartDrag {
            icon_id,
            offset_x,
            offset_y,
        } => {
            if !interaction.is_idle() {
                return Err(ReducerError::GestureActive);
            }
            let icon = find_icon(state, &icon_id)?;
            if !icon.uses_grid_drag() {
                return Err(ReducerError::NotGridDraggable(icon_id));
            }
            let origin = icon.position;
            *interaction = InteractionMode::Dragging(DragSession {
                icon_id,
                offset_x,
                offset_y,
                origin,
                ghost: origin,
            });
            state.context_menu = ContextMenuState::default();
        }
        DesktopAction::UpdateDragGhost { pointer, surface } => {
            if let InteractionMode::Dragging(session) = interaction {
                let left = pointer.x - surface.x - session.offset_x;
                let top = pointer.y - surface.y - session.offset_y;
                session.ghost = grid::cell_at_point(&config.grid, state.bounds, left, top);
            }
        }
        DesktopAction::EndDrag => match std::mem::take(interaction) {
            InteractionMode::Dragging(session) => commit_drag(state, &session, &mut effects),
            other => *interaction = other,
        },
        DesktopAction::BeginMarquee {
            pointer,
            surface,
            additive,
        } => {
            if !interaction.is_idle() {
                return Err(ReducerError::GestureActive);
            }
            *interaction = InteractionMode::Marqueeing(MarqueeSession::begin(
                pointer,
                surface,
                additive,
                &state.selection,
            ));
            state.context_menu = ContextMenuState::default();
        }
        DesktopAction::UpdateMarquee { pointer } => {
            if let InteractionMode::Marqueeing(session) = interaction {
                session.update(pointer);
                state.selection = session.selection(
                    &state.icons,
                    &config.grid,
                    config.marquee_click_threshold_px,
                );
            }
        }
        DesktopAction::EndMarquee => match std::mem::take(interaction) {
            InteractionMode::Marqueeing(session) => {
                state.selection = session.selection(
                    &state.icons,
                    &config.grid,
                    config.marquee_click_threshold_px,
                );
            }
            other => *interaction = other,
        },
        DesktopAction::CancelGestures => {
            if let InteractionMode::Marqueeing(session) = std::mem::take(interaction) {
                state.selection = session.selection(
                    &state.icons,
                    &config.grid,
                    config.marquee_click_threshold_px,
                );
            }
        }
        DesktopAction::BeginRename { icon_id } => begin_rename(state, icon_id, &mut effects)?,
        DesktopAction::RenameIcon { icon_id, label } => {
            rename_icon(state, config, &icon_id, &label, &mut effects)?
        }
        DesktopAction::CancelRename => state.renaming = None,
        DesktopAction::SetViewport { width, height } => {
            state.bounds = GridBounds::from_viewport(&config.grid, width, height);
        }
        DesktopAction::ReclampPositions => {
            let moved = grid::reclamp(&mut state.icons, state.bounds);
            if let InteractionMode::Dragging(session) = interaction {
                session.ghost = state.bounds.clamp(session.ghost);
            }
            if !moved.is_empty() {
                push_persist(&mut effects);
            }
        }
        DesktopAction::ArrangeIcons => {
            grid::arrange(&mut state.icons, state.bounds);
            push_persist(&mut effects);
        }
        DesktopAction::OpenContextMenu { x, y, target } => {
            let actions = match &target {
                Some(icon_id) => icon_menu_actions(find_icon(state, icon_id)?),
                None => desktop_menu_actions(),
            };
            if let Some(icon_id) = &target {
                if !state.is_selected(icon_id) {
                    state.selection = BTreeSet::from([icon_id.clone()]);
                }
            }
            state.context_menu = ContextMenuState {
                open: true,
                x,
                y,
                target,
                actions,
            };
        }
        DesktopAction::CloseContextMenu => state.context_menu = ContextMenuState::default(),
        DesktopAction::ExecuteIconAction {
            icon_id,
            action,
            now_ms,
        } => {
            ensure_icon(state, &icon_id)?;
            state.context_menu = ContextMenuState::default();
            run_icon_action(state, &icon_id, action, now_ms, &mut effects)?;
        }
        DesktopAction::ExecuteContextAction { action, now_ms } => {
            let menu = std::mem::take(&mut state.context_menu);
            if menu.open {
                match menu.target {
                    Some(icon_id) if state.icon(&icon_id).is_some() => {
                        run_icon_action(state, &icon_id, action, now_ms, &mut effects)?
                    }
                    Some(_) => {}
                    None => run_desktop_action(state, action, &mut effects),
                }
            }
        }
        DesktopAction::TrashIcon {
            icon_id,
            trashed_at,
        } => trash_icon(state, &icon_id, trashed_at, &mut effects)?,
        DesktopAction::DeleteSelection { trashed_at } => {
            let targets: Vec<IconId> = state
                .icons
                .iter()
                .filter(|icon| !icon.is_system() && state.selection.contains(&icon.id))
                .map(|icon| icon.id.clone())
                .collect();
            for icon_id in targets {
                trash_icon(state, &icon_id, trashed_at, &mut effects)?;
            }
        }
        DesktopAction::TrashExternalItem { mut item } => {
            let icon_id = item.icon_id();
            if let Some(idx) = state.icons.iter().position(|icon| icon.id == icon_id) {
                let icon = state.icons.remove(idx);
                item.original_position.get_or_insert(icon.position);
            }
            state.recycle_bin.retain(|existing| existing.icon_id() != icon_id);
            state.recycle_bin.push(item);
            push_persist(&mut effects);
        }
        DesktopAction::RestoreItem { item_id } => {
            let idx = find_bin_item(state, &item_id)?;
            let item = state.recycle_bin.remove(idx);
            let icon_id = item.icon_id();
            if item.source_type.has_desktop_icon() && state.icon(&icon_id).is_none() {
                let preferred = item
                    .original_position
                    .or_else(|| state.remembered_positions.get(&icon_id).copied());
                let (position, off_grid) =
                    grid::place_new_icon(&state.icons, state.bounds, preferred);
                state
                    .icons
                    .push(item.restored_icon(position, config.max_label_chars));
                state.remembered_positions.remove(&icon_id);
                if off_grid {
                    effects.push(RuntimeEffect::RestoredOffGrid { icon_id });
                }
            }
            effects.push(RuntimeEffect::RestoreNode {
                source_type: item.source_type,
                id: item.id,
            });
            push_persist(&mut effects);
        }
        DesktopAction::PermanentlyDeleteItem { item_id } => {
            let idx = find_bin_item(state, &item_id)?;
            let item = state.recycle_bin.remove(idx);
            state.remembered_positions.remove(&item.icon_id());
            effects.push(RuntimeEffect::PurgeItems(vec![item]));
            push_persist(&mut effects);
        }
        DesktopAction::EmptyRecycleBin => empty_recycle_bin(state, &mut effects),
        DesktopAction::SyncNodes { kind, nodes } => {
            sync_nodes(state, config, kind, &nodes, &mut effects)
        }
        DesktopAction::DropPayload { payload, target } => {
            let target_icon = match &target {
                Some(icon_id) => Some(find_icon(state, icon_id)?),
                None => None,
            };
            match resolve_drop(&payload, target_icon) {
                DropDecision::MoveIntoFolder {
                    kind,
                    id,
                    folder_id,
                } => effects.push(RuntimeEffect::MoveNode {
                    kind,
                    id,
                    target_folder_id: Some(folder_id),
                }),
                DropDecision::MoveToRoot { kind, id } => effects.push(RuntimeEffect::MoveNode {
                    kind,
                    id,
                    target_folder_id: None,
                }),
                DropDecision::Rejected(_) => {}
            }
        }
        DesktopAction::HydrateLayout { snapshot } => hydrate_layout(state, snapshot),
    }

    normalize_desktop(state);
    Ok(effects)
}

fn ensure_icon(state: &DesktopState, icon_id: &IconId) -> Result<(), ReducerError> {
    find_icon(state, icon_id).map(|_| ())
}

fn find_icon<'a>(
    state: &'a DesktopState,
    icon_id: &IconId,
) -> Result<&'a DesktopIcon, ReducerError> {
    state
        .icon(icon_id)
        .ok_or_else(|| ReducerError::IconNotFound(icon_id.clone()))
}

fn find_bin_item(state: &DesktopState, item_id: &str) -> Result<usize, ReducerError> {
    state
        .recycle_bin
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| ReducerError::RecycleItemNotFound(item_id.to_string()))
}

fn push_persist(effects: &mut Vec<RuntimeEffect>) {
    if !effects.contains(&RuntimeEffect::PersistLayout) {
        effects.push(RuntimeEffect::PersistLayout);
    }
}

fn select_all(state: &mut DesktopState) {
    state.selection = state.icons.iter().map(|icon| icon.id.clone()).collect();
}

fn commit_drag(state: &mut DesktopState, session: &DragSession, effects: &mut Vec<RuntimeEffect>) {
    let ghost = session.ghost;
    if ghost == session.origin
        || !state.bounds.contains(ghost)
        || grid::is_occupied(&state.icons, ghost, Some(&session.icon_id))
    {
        return;
    }
    if let Some(icon) = state.icon_mut(&session.icon_id) {
        icon.position = ghost;
        push_persist(effects);
    }
}

fn begin_rename(
    state: &mut DesktopState,
    icon_id: IconId,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<(), ReducerError> {
    if find_icon(state, &icon_id)?.is_system() {
        return Err(ReducerError::SystemIconProtected(icon_id));
    }
    state.renaming = Some(icon_id.clone());
    effects.push(RuntimeEffect::BeginRename { icon_id });
    Ok(())
}

fn rename_icon(
    state: &mut DesktopState,
    config: &DesktopConfig,
    icon_id: &IconId,
    raw_label: &str,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<(), ReducerError> {
    if find_icon(state, icon_id)?.is_system() {
        return Err(ReducerError::SystemIconProtected(icon_id.clone()));
    }
    if state.renaming.as_ref() == Some(icon_id) {
        state.renaming = None;
    }
    let label = truncate_label(raw_label, config.max_label_chars);
    let Some(icon) = state.icon_mut(icon_id) else {
        return Ok(());
    };
    if label.is_empty() || label == icon.label {
        return Ok(());
    }
    icon.label = label.clone();
    if let Some((kind, record_id)) = icon.backing_record() {
        effects.push(RuntimeEffect::RenameNode {
            kind,
            id: record_id.to_string(),
            name: label,
        });
    }
    Ok(())
}

fn trash_icon(
    state: &mut DesktopState,
    icon_id: &IconId,
    trashed_at: u64,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<(), ReducerError> {
    let icon = find_icon(state, icon_id)?;
    if icon.is_system() {
        return Err(ReducerError::SystemIconProtected(icon_id.clone()));
    }
    let (kind, record_id) = icon
        .backing_record()
        .map(|(kind, id)| (kind, id.to_string()))
        .ok_or_else(|| ReducerError::NoBackingRecord(icon_id.clone()))?;
    let item = RecycleBinItem {
        id: record_id.clone(),
        name: icon.label.clone(),
        source_type: TrashedSourceType::from_node_kind(kind),
        trashed_at,
        original_position: Some(icon.position),
    };

    state.icons.retain(|icon| &icon.id != icon_id);
    state.recycle_bin.retain(|existing| &existing.icon_id() != icon_id);
    state.recycle_bin.push(item);
    effects.push(RuntimeEffect::TrashNode {
        kind,
        id: record_id,
    });
    push_persist(effects);
    Ok(())
}

fn empty_recycle_bin(state: &mut DesktopState, effects: &mut Vec<RuntimeEffect>) {
    if state.recycle_bin.is_empty() {
        return;
    }
    let items = std::mem::take(&mut state.recycle_bin);
    for item in &items {
        state.remembered_positions.remove(&item.icon_id());
    }
    effects.push(RuntimeEffect::PurgeItems(items));
    push_persist(effects);
}

fn run_icon_action(
    state: &mut DesktopState,
    icon_id: &IconId,
    action: ContextAction,
    now_ms: u64,
    effects: &mut Vec<RuntimeEffect>,
) -> Result<(), ReducerError> {
    match action {
        ContextAction::Open => {
            let is_bin = find_icon(state, icon_id)?.is_recycle_bin();
            effects.push(if is_bin {
                RuntimeEffect::OpenRecycleBin
            } else {
                RuntimeEffect::OpenIcon {
                    icon_id: icon_id.clone(),
                }
            });
        }
        ContextAction::Rename => begin_rename(state, icon_id.clone(), effects)?,
        ContextAction::Delete => trash_icon(state, icon_id, now_ms, effects)?,
        other => run_desktop_action(state, other, effects),
    }
    Ok(())
}

fn run_desktop_action(
    state: &mut DesktopState,
    action: ContextAction,
    effects: &mut Vec<RuntimeEffect>,
) {
    match action {
        ContextAction::ArrangeIcons => {
            grid::arrange(&mut state.icons, state.bounds);
            push_persist(effects);
        }
        ContextAction::SelectAll => select_all(state),
        ContextAction::Refresh => effects.push(RuntimeEffect::RequestResync),
        ContextAction::OpenRecycleBin => effects.push(RuntimeEffect::OpenRecycleBin),
        ContextAction::EmptyRecycleBin => empty_recycle_bin(state, effects),
        ContextAction::Unhandled(raw) => effects.push(RuntimeEffect::UnhandledAction(raw)),
        icon_only => effects.push(RuntimeEffect::UnhandledAction(icon_only.id().to_string())),
    }
}

fn sync_nodes(
    state: &mut DesktopState,
    config: &DesktopConfig,
    kind: FsNodeKind,
    nodes: &[FsNode],
    effects: &mut Vec<RuntimeEffect>,
) {
    let icon_kind = IconKind::from_node_kind(kind);
    let mut wanted_ids = BTreeSet::new();
    let mut wanted = Vec::new();
    for node in nodes.iter().filter(|node| node.kind == kind) {
        let icon_id = IconId::for_node(kind, &node.id);
        if state.is_trashed(&icon_id) || !wanted_ids.insert(icon_id.clone()) {
            continue;
        }
        wanted.push((icon_id, node));
    }

    let mut changed = false;
    let mut vanished = Vec::new();
    state.icons.retain(|icon| {
        let keep = icon.kind != icon_kind || wanted_ids.contains(&icon.id);
        if !keep {
            vanished.push((icon.id.clone(), icon.position));
        }
        keep
    });
    for (icon_id, position) in vanished {
        state.remembered_positions.insert(icon_id, position);
        changed = true;
    }

    for (icon_id, node) in wanted {
        let editing = state.renaming.as_ref() == Some(&icon_id);
        if let Some(icon) = state.icon_mut(&icon_id) {
            let label = truncate_label(&node.name, config.max_label_chars);
            if !editing && !label.is_empty() && icon.label != label {
                icon.label = label;
            }
            continue;
        }
        let preferred = state.remembered_positions.remove(&icon_id);
        let (position, _) = grid::place_new_icon(&state.icons, state.bounds, preferred);
        state
            .icons
            .push(DesktopIcon::from_node(node, position, config.max_label_chars));
        changed = true;
    }

    if changed {
        push_persist(effects);
    }
}

fn hydrate_layout(state: &mut DesktopState, snapshot: DesktopLayoutSnapshot) {
    state.recycle_bin = snapshot.recycle_bin;
    let trashed: BTreeSet<IconId> = state
        .recycle_bin
        .iter()
        .map(RecycleBinItem::icon_id)
        .collect();
    state.icons.retain(|icon| !trashed.contains(&icon.id));
    for (icon_id, position) in snapshot.positions {
        match state.icon_mut(&icon_id) {
            Some(icon) => icon.position = position,
            None => {
                state.remembered_positions.insert(icon_id, position);
            }
        }
    }
    grid::settle_positions(&mut state.icons, state.bounds);
}

fn normalize_desktop(state: &mut DesktopState) {
    let present: BTreeSet<&IconId> = state.icons.iter().map(|icon| &icon.id).collect();
    state.selection.retain(|icon_id| present.contains(icon_id));
    if matches!(&state.renaming, Some(icon_id) if !present.contains(icon_id)) {
        state.renaming = None;
    }
    if matches!(&state.context_menu.target, Some(icon_id) if !present.contains(icon_id)) {
        state.context_menu = ContextMenuState::default();
    }
    for icon in &state.icons {
        state.remembered_positions.remove(&icon.id);
    }
}
