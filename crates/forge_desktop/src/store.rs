//! Owned desktop store: reduces actions into cloned state, commits on success, and notifies an
//! explicit subscriber list.

use std::rc::Rc;

use leptos::logging;
use platform_host::{unix_time_ms_now, FsNode, FsNodeKind};

use crate::{
    actions::ContextAction,
    config::DesktopConfig,
    drag_payload::DragPayload,
    model::{
        DesktopLayoutSnapshot, DesktopState, IconId, InteractionMode, PointerPosition,
        RecycleBinItem, SurfaceRect, TrashedSourceType,
    },
    reducer::{reduce_desktop, DesktopAction, RuntimeEffect},
};

/// Callback invoked after every dispatch that changed state or interaction.
pub type StoreListener = Rc<dyn Fn(&DesktopState, &InteractionMode)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Handle returned by [`DesktopStore::subscribe`].
pub struct ListenerId(u64);

/// Single owner of desktop icon, selection, and recycle bin state.
///
/// Every public operation goes through [`DesktopStore::dispatch`]. Rejected actions are logged
/// and leave the store untouched.
pub struct DesktopStore {
    config: DesktopConfig,
    state: DesktopState,
    interaction: InteractionMode,
    listeners: Vec<(ListenerId, StoreListener)>,
    next_listener_id: u64,
    effects: Vec<RuntimeEffect>,
    clock: fn() -> u64,
}

impl std::fmt::Debug for DesktopStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DesktopStore")
            .field("state", &self.state)
            .field("interaction", &self.interaction)
            .field("listeners", &self.listeners.len())
            .field("effects", &self.effects)
            .finish()
    }
}

impl DesktopStore {
    /// Builds a store holding the boot layout for `config`.
    pub fn new(config: DesktopConfig) -> Self {
        let state = DesktopState::from_config(&config);
        Self {
            config,
            state,
            interaction: InteractionMode::Idle,
            listeners: Vec::new(),
            next_listener_id: 1,
            effects: Vec::new(),
            clock: unix_time_ms_now,
        }
    }

    /// Replaces the wall clock used to stamp recycle bin entries.
    pub fn with_clock(mut self, clock: fn() -> u64) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> &DesktopConfig {
        &self.config
    }

    pub fn state(&self) -> &DesktopState {
        &self.state
    }

    pub fn interaction(&self) -> &InteractionMode {
        &self.interaction
    }

    /// Effects produced since the last [`DesktopStore::take_effects`].
    pub fn pending_effects(&self) -> &[RuntimeEffect] {
        &self.effects
    }

    /// Drains queued effects for the host to run.
    pub fn take_effects(&mut self) -> Vec<RuntimeEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn subscribe(
        &mut self,
        listener: impl Fn(&DesktopState, &InteractionMode) + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Rc::new(listener)));
        id
    }

    /// Removes a listener; `false` when it was already gone.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    /// Reduces `action`, commits the result, and queues its effects.
    ///
    /// Returns the effects of this action, or `None` when the reducer rejected it.
    pub fn dispatch(&mut self, action: DesktopAction) -> Option<Vec<RuntimeEffect>> {
        let mut desktop = self.state.clone();
        let mut ui = self.interaction.clone();

        match reduce_desktop(&mut desktop, &mut ui, &self.config, action) {
            Ok(new_effects) => {
                let changed = desktop != self.state || ui != self.interaction;
                self.state = desktop;
                self.interaction = ui;
                self.effects.extend(new_effects.iter().cloned());
                if changed {
                    self.notify();
                }
                Some(new_effects)
            }
            Err(err) => {
                logging::warn!("desktop reducer error: {err}");
                None
            }
        }
    }

    fn notify(&self) {
        for (_, listener) in &self.listeners {
            listener(&self.state, &self.interaction);
        }
    }

    fn now_ms(&self) -> u64 {
        (self.clock)()
    }

    pub fn select_icon(&mut self, icon_id: &IconId) {
        self.dispatch(DesktopAction::SelectIcon {
            icon_id: icon_id.clone(),
        });
    }

    pub fn toggle_icon_selection(&mut self, icon_id: &IconId) {
        self.dispatch(DesktopAction::ToggleIconSelection {
            icon_id: icon_id.clone(),
        });
    }

    pub fn deselect_all(&mut self) {
        self.dispatch(DesktopAction::DeselectAll);
    }

    pub fn select_all(&mut self) {
        self.dispatch(DesktopAction::SelectAll);
    }

    /// Starts a grid drag; ignored while another gesture runs or for filesystem-backed icons.
    pub fn start_drag(&mut self, icon_id: &IconId, offset_x: i32, offset_y: i32) {
        self.dispatch(DesktopAction::StartDrag {
            icon_id: icon_id.clone(),
            offset_x,
            offset_y,
        });
    }

    pub fn update_drag_ghost(&mut self, client_x: i32, client_y: i32, surface: SurfaceRect) {
        self.dispatch(DesktopAction::UpdateDragGhost {
            pointer: PointerPosition::new(client_x, client_y),
            surface,
        });
    }

    pub fn end_drag(&mut self) {
        self.dispatch(DesktopAction::EndDrag);
    }

    pub fn begin_marquee(
        &mut self,
        client_x: i32,
        client_y: i32,
        surface: SurfaceRect,
        additive: bool,
    ) {
        self.dispatch(DesktopAction::BeginMarquee {
            pointer: PointerPosition::new(client_x, client_y),
            surface,
            additive,
        });
    }

    pub fn update_marquee(&mut self, client_x: i32, client_y: i32) {
        self.dispatch(DesktopAction::UpdateMarquee {
            pointer: PointerPosition::new(client_x, client_y),
        });
    }

    pub fn end_marquee(&mut self) {
        self.dispatch(DesktopAction::EndMarquee);
    }

    /// Force-ends a drag (snapping back) or marquee (keeping its selection).
    pub fn cancel_gestures(&mut self) {
        self.dispatch(DesktopAction::CancelGestures);
    }

    pub fn begin_rename(&mut self, icon_id: &IconId) {
        self.dispatch(DesktopAction::BeginRename {
            icon_id: icon_id.clone(),
        });
    }

    pub fn rename_icon(&mut self, icon_id: &IconId, new_label: &str) {
        self.dispatch(DesktopAction::RenameIcon {
            icon_id: icon_id.clone(),
            label: new_label.to_string(),
        });
    }

    pub fn cancel_rename(&mut self) {
        self.dispatch(DesktopAction::CancelRename);
    }

    pub fn set_viewport(&mut self, width: i32, height: i32) {
        self.dispatch(DesktopAction::SetViewport { width, height });
    }

    pub fn reclamp_positions(&mut self) {
        self.dispatch(DesktopAction::ReclampPositions);
    }

    pub fn arrange_icons(&mut self) {
        self.dispatch(DesktopAction::ArrangeIcons);
    }

    pub fn open_context_menu(&mut self, x: i32, y: i32, target: Option<&IconId>) {
        self.dispatch(DesktopAction::OpenContextMenu {
            x,
            y,
            target: target.cloned(),
        });
    }

    pub fn close_context_menu(&mut self) {
        self.dispatch(DesktopAction::CloseContextMenu);
    }

    pub fn execute_icon_action(&mut self, icon_id: &IconId, action: ContextAction) {
        let now_ms = self.now_ms();
        self.dispatch(DesktopAction::ExecuteIconAction {
            icon_id: icon_id.clone(),
            action,
            now_ms,
        });
    }

    pub fn execute_context_action(&mut self, action: ContextAction) {
        let now_ms = self.now_ms();
        self.dispatch(DesktopAction::ExecuteContextAction { action, now_ms });
    }

    pub fn trash_icon(&mut self, icon_id: &IconId) {
        let trashed_at = self.now_ms();
        self.dispatch(DesktopAction::TrashIcon {
            icon_id: icon_id.clone(),
            trashed_at,
        });
    }

    pub fn delete_selection(&mut self) {
        let trashed_at = self.now_ms();
        self.dispatch(DesktopAction::DeleteSelection { trashed_at });
    }

    /// Records an item another view already soft-deleted.
    pub fn trash_external_item(&mut self, id: &str, name: &str, source_type: TrashedSourceType) {
        let item = RecycleBinItem {
            id: id.to_string(),
            name: name.to_string(),
            source_type,
            trashed_at: self.now_ms(),
            original_position: None,
        };
        self.dispatch(DesktopAction::TrashExternalItem { item });
    }

    /// Puts a bin entry back on the grid. Returns `true` when no visible cell was free and the
    /// icon was parked off-grid.
    pub fn restore_item(&mut self, item_id: &str) -> bool {
        self.dispatch(DesktopAction::RestoreItem {
            item_id: item_id.to_string(),
        })
        .is_some_and(|effects| {
            effects
                .iter()
                .any(|effect| matches!(effect, RuntimeEffect::RestoredOffGrid { .. }))
        })
    }

    pub fn permanently_delete_item(&mut self, item_id: &str) {
        self.dispatch(DesktopAction::PermanentlyDeleteItem {
            item_id: item_id.to_string(),
        });
    }

    pub fn empty_recycle_bin(&mut self) {
        self.dispatch(DesktopAction::EmptyRecycleBin);
    }

    pub fn sync_db_folders(&mut self, nodes: Vec<FsNode>) {
        self.dispatch(DesktopAction::SyncNodes {
            kind: FsNodeKind::Folder,
            nodes,
        });
    }

    pub fn sync_db_prompts(&mut self, nodes: Vec<FsNode>) {
        self.dispatch(DesktopAction::SyncNodes {
            kind: FsNodeKind::Prompt,
            nodes,
        });
    }

    /// Handles a raw data-transfer payload dropped over `target` (or empty desktop).
    ///
    /// Returns `false` when the payload did not decode; such drops are ignored.
    pub fn drop_payload(&mut self, raw: &str, target: Option<&IconId>) -> bool {
        let Some(payload) = DragPayload::decode(raw) else {
            return false;
        };
        self.dispatch(DesktopAction::DropPayload {
            payload,
            target: target.cloned(),
        });
        true
    }

    /// Data-transfer payload for a native drag of `icon_id`, encoded for [`DRAG_PAYLOAD_MIME`].
    /// `None` for system icons, unknown ids, and encoding failures.
    ///
    /// [`DRAG_PAYLOAD_MIME`]: crate::drag_payload::DRAG_PAYLOAD_MIME
    pub fn drag_payload(&self, icon_id: &IconId) -> Option<String> {
        let payload = DragPayload::from_icon(self.state.icon(icon_id)?)?;
        payload.encode().ok()
    }

    pub fn hydrate_layout(&mut self, snapshot: DesktopLayoutSnapshot) {
        self.dispatch(DesktopAction::HydrateLayout { snapshot });
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, collections::BTreeSet};

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{model::GridPosition, test_support::*};

    fn fixed_clock() -> u64 {
        1_700_000_000_000
    }

    fn store() -> DesktopStore {
        DesktopStore::new(test_config()).with_clock(fixed_clock)
    }

    fn position(store: &DesktopStore, icon_id: &IconId) -> GridPosition {
        store.state().icon(icon_id).expect("icon").position
    }

    #[test]
    fn selecting_twice_equals_selecting_once() {
        let mut once = store();
        once.select_icon(&sys_a());
        let mut twice = store();
        twice.select_icon(&sys_a());
        twice.select_icon(&sys_a());

        assert_eq!(once.state().selection, twice.state().selection);
        assert_eq!(twice.state().selection, BTreeSet::from([sys_a()]));
    }

    #[test]
    fn unknown_ids_leave_store_untouched() {
        let mut store = store();
        let before = store.state().clone();
        store.select_icon(&IconId::new("folder:missing"));
        store.rename_icon(&IconId::new("folder:missing"), "x");
        store.permanently_delete_item("missing");

        assert_eq!(store.state(), &before);
        assert!(store.pending_effects().is_empty());
    }

    #[test]
    fn modifier_marquee_toggles_and_double_toggle_is_identity() {
        let mut store = store();
        store.select_icon(&sys_b());
        let start = store.state().selection.clone();

        let toggle_sys_a = |store: &mut DesktopStore| {
            store.begin_marquee(150, 250, test_surface(), true);
            store.update_marquee(360, 480);
            store.end_marquee();
        };

        toggle_sys_a(&mut store);
        assert_eq!(store.state().selection, BTreeSet::from([sys_a(), sys_b()]));

        toggle_sys_a(&mut store);
        assert_eq!(store.state().selection, start);
        assert!(store.interaction().is_idle());
    }

    #[test]
    fn drag_onto_occupied_cell_snaps_back() {
        let mut store = store();
        assert_eq!(position(&store, &sys_a()), GridPosition::new(2, 3));
        assert_eq!(position(&store, &sys_b()), GridPosition::new(4, 5));

        store.start_drag(&sys_a(), 0, 0);
        store.update_drag_ghost(400, 500, test_surface());
        assert_eq!(
            store.interaction().drag().expect("drag").ghost,
            GridPosition::new(4, 5)
        );
        store.end_drag();

        assert_eq!(position(&store, &sys_a()), GridPosition::new(2, 3));
        assert!(store.interaction().is_idle());
        assert!(store.pending_effects().is_empty());
    }

    #[test]
    fn second_drag_is_ignored_while_one_is_active() {
        let mut store = store();
        store.start_drag(&sys_a(), 0, 0);
        store.start_drag(&sys_b(), 0, 0);
        assert_eq!(store.interaction().drag().expect("drag").icon_id, sys_a());
    }

    #[test]
    fn reclamp_keeps_every_icon_inside_shrunken_bounds() {
        let mut store = store();
        store.sync_db_folders(vec![
            FsNode::folder("f1", "One"),
            FsNode::folder("f2", "Two"),
        ]);
        store.set_viewport(250, 320);
        store.reclamp_positions();

        let bounds = store.state().bounds;
        assert_eq!((bounds.max_col(), bounds.max_row()), (1, 2));
        for icon in &store.state().icons {
            assert!(icon.position.col <= bounds.max_col(), "{icon:?}");
            assert!(icon.position.row <= bounds.max_row(), "{icon:?}");
        }
        let cells: BTreeSet<_> = store.state().icons.iter().map(|i| i.position).collect();
        assert_eq!(cells.len(), store.state().icons.len());
    }

    #[test]
    fn restore_into_full_grid_reports_off_grid() {
        let mut store = store();
        store.set_viewport(200, 200);
        store.reclamp_positions();
        store.sync_db_folders(vec![FsNode::folder("f1", "One")]);
        assert_eq!(store.state().icons.len(), 4);

        store.trash_icon(&folder_id("f1"));
        store.sync_db_folders(vec![FsNode::folder("f2", "Two")]);
        assert_eq!(store.state().icons.len(), 4);

        assert!(store.restore_item("f1"));
        let restored = position(&store, &folder_id("f1"));
        assert_eq!(restored.col, store.state().bounds.cols);
        assert!(store
            .take_effects()
            .contains(&RuntimeEffect::RestoredOffGrid {
                icon_id: folder_id("f1")
            }));
    }

    #[test]
    fn restore_with_free_cell_lands_on_previously_free_cell() {
        let mut store = store();
        store.sync_db_folders(vec![FsNode::folder("f1", "One")]);
        let original = position(&store, &folder_id("f1"));
        store.trash_icon(&folder_id("f1"));
        let occupied: BTreeSet<_> = store.state().icons.iter().map(|i| i.position).collect();

        assert!(!store.restore_item("f1"));
        let restored = position(&store, &folder_id("f1"));
        assert_eq!(restored, original);
        assert!(!occupied.contains(&restored));
    }

    #[test]
    fn sync_preserves_positions_of_surviving_icons() {
        let mut store = store();
        add_folder(&mut store.state, "x", 1, 1);
        store.sync_db_folders(vec![FsNode::folder("x", "X"), FsNode::folder("y", "Y")]);
        assert_eq!(position(&store, &folder_id("x")), GridPosition::new(1, 1));

        store.sync_db_folders(vec![FsNode::folder("x", "X")]);
        store.sync_db_folders(vec![FsNode::folder("x", "X")]);
        assert_eq!(position(&store, &folder_id("x")), GridPosition::new(1, 1));
    }

    #[test]
    fn vanished_icon_comes_back_to_its_last_cell() {
        let mut store = store();
        add_prompt(&mut store.state, "p1", 3, 2);
        store.sync_db_prompts(vec![]);
        assert!(store.state().icon(&IconId::for_node(FsNodeKind::Prompt, "p1")).is_none());

        store.sync_db_prompts(vec![FsNode::prompt("p1", "Back")]);
        assert_eq!(
            position(&store, &IconId::for_node(FsNodeKind::Prompt, "p1")),
            GridPosition::new(3, 2)
        );
    }

    #[test]
    fn trashed_entries_carry_store_clock() {
        let mut store = store();
        store.trash_external_item("proj-1", "Launch plan", TrashedSourceType::Project);
        let item = &store.state().recycle_bin[0];
        assert_eq!(item.trashed_at, fixed_clock());
        assert_eq!(item.source_type, TrashedSourceType::Project);

        store.permanently_delete_item("proj-1");
        assert!(store.state().recycle_bin.is_empty());
        assert!(matches!(
            store.take_effects().as_slice(),
            [RuntimeEffect::PersistLayout, RuntimeEffect::PurgeItems(items), RuntimeEffect::PersistLayout]
                if items.len() == 1
        ));
    }

    #[test]
    fn exported_drag_payload_drops_into_folder() {
        let mut store = store();
        store.sync_db_folders(vec![FsNode::folder("f1", "One")]);
        store.sync_db_prompts(vec![FsNode::prompt("p1", "Draft")]);
        store.take_effects();
        assert_eq!(store.drag_payload(&sys_a()), None);

        let raw = store
            .drag_payload(&IconId::for_node(FsNodeKind::Prompt, "p1"))
            .expect("prompt payload");
        assert!(store.drop_payload(&raw, Some(&folder_id("f1"))));
        assert!(store.take_effects().contains(&RuntimeEffect::MoveNode {
            kind: FsNodeKind::Prompt,
            id: "p1".to_string(),
            target_folder_id: Some("f1".to_string()),
        }));
    }

    #[test]
    fn restored_optimizations_do_not_vanish_on_next_sync() {
        let mut store = store();
        let icons_before = store.state().icons.len();
        store.trash_external_item("opt-7", "Tone rewrite", TrashedSourceType::Optimization);

        assert!(!store.restore_item("opt-7"));
        assert!(store.state().recycle_bin.is_empty());
        assert_eq!(store.state().icons.len(), icons_before);
        assert!(store.take_effects().contains(&RuntimeEffect::RestoreNode {
            source_type: TrashedSourceType::Optimization,
            id: "opt-7".to_string(),
        }));

        store.sync_db_prompts(vec![FsNode::prompt("p1", "Draft")]);
        assert!(store.state().recycle_bin.is_empty());
        assert!(store.state().icon(&IconId::for_node(FsNodeKind::Prompt, "p1")).is_some());
        assert_eq!(store.state().icons.len(), icons_before + 1);
    }

    #[test]
    fn listeners_fire_on_change_until_unsubscribed() {
        let mut store = store();
        let calls = Rc::new(Cell::new(0));
        let seen = Rc::clone(&calls);
        let id = store.subscribe(move |state, _| {
            seen.set(seen.get() + state.selection.len() + 1);
        });

        store.select_icon(&sys_a());
        assert_eq!(calls.get(), 2);
        store.select_icon(&sys_a());
        assert_eq!(calls.get(), 2);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.deselect_all();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn malformed_drop_payload_is_ignored() {
        let mut store = store();
        assert!(!store.drop_payload("{oops", None));
        assert!(store.pending_effects().is_empty());
    }

    #[test]
    fn stale_context_action_is_unhandled_not_applied() {
        let mut store = store();
        store.open_context_menu(10, 10, None);
        store.execute_context_action(ContextAction::parse("rename-everything"));
        assert_eq!(
            store.take_effects(),
            vec![RuntimeEffect::UnhandledAction(
                "rename-everything".to_string()
            )]
        );
        assert!(!store.state().context_menu.open);
    }
}
