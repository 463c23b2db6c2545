//! Input event queue and router translating pointer, keyboard, and resize events into store
//! operations on the UI thread.

use std::collections::VecDeque;

use crate::{
    actions::ContextAction,
    grid::{self, cell_box},
    model::{IconId, PointerPosition, SurfaceRect},
    store::DesktopStore,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
/// Modifier keys held during an event.
pub struct Modifiers {
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        meta: false,
        shift: false,
    };

    /// Ctrl (or Cmd) switches selection gestures to toggle mode.
    pub fn toggles_selection(self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Raw host input, in client coordinates.
pub enum DesktopInput {
    PointerDown {
        pointer: PointerPosition,
        button: PointerButton,
        modifiers: Modifiers,
    },
    PointerMove {
        pointer: PointerPosition,
    },
    PointerUp {
        pointer: PointerPosition,
    },
    DoubleClick {
        pointer: PointerPosition,
    },
    /// The pointer left the window; orphaned gestures must end.
    PointerLeftWindow,
    KeyDown {
        /// DOM-style key name (`Escape`, `Delete`, `F2`, `a`, ...).
        key: String,
        modifiers: Modifiers,
    },
    ViewportResized {
        width: i32,
        height: i32,
        at_ms: u64,
    },
    /// Clock tick used to settle debounced work.
    Tick {
        now_ms: u64,
    },
    /// Native drag-and-drop payload released over the surface.
    Drop {
        raw_payload: String,
        pointer: PointerPosition,
    },
}

#[derive(Debug, Default)]
/// FIFO of host input drained by [`crate::runtime::DesktopRuntime::pump`].
pub struct InputQueue {
    events: VecDeque<DesktopInput>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, input: DesktopInput) {
        self.events.push_back(input);
    }

    pub fn pop(&mut self) -> Option<DesktopInput> {
        self.events.pop_front()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Trailing-edge debounce for viewport resizes.
pub struct ResizeDebouncer {
    delay_ms: u64,
    pending: Option<PendingResize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingResize {
    width: i32,
    height: i32,
    due_at_ms: u64,
}

impl ResizeDebouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            delay_ms,
            pending: None,
        }
    }

    /// Records a resize; a newer one restarts the quiet period.
    pub fn record(&mut self, width: i32, height: i32, at_ms: u64) {
        self.pending = Some(PendingResize {
            width,
            height,
            due_at_ms: at_ms.saturating_add(self.delay_ms),
        });
    }

    /// Returns the settled size once the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> Option<(i32, i32)> {
        let pending = self.pending?;
        if now_ms < pending.due_at_ms {
            return None;
        }
        self.pending = None;
        Some((pending.width, pending.height))
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[derive(Debug, Clone)]
/// Maps input events onto store operations.
pub struct InputRouter {
    surface: SurfaceRect,
    resize: ResizeDebouncer,
}

impl InputRouter {
    pub fn new(surface: SurfaceRect, resize_debounce_ms: u64) -> Self {
        Self {
            surface,
            resize: ResizeDebouncer::new(resize_debounce_ms),
        }
    }

    pub fn surface(&self) -> SurfaceRect {
        self.surface
    }

    pub fn set_surface(&mut self, surface: SurfaceRect) {
        self.surface = surface;
    }

    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }

    /// Applies one input event to `store`.
    pub fn route(&mut self, store: &mut DesktopStore, input: DesktopInput) {
        match input {
            DesktopInput::PointerDown {
                pointer,
                button,
                modifiers,
            } => self.pointer_down(store, pointer, button, modifiers),
            DesktopInput::PointerMove { pointer } => self.pointer_move(store, pointer),
            DesktopInput::PointerUp { pointer } => self.pointer_up(store, pointer),
            DesktopInput::DoubleClick { pointer } => {
                if let Some(icon_id) = self.icon_at(store, pointer) {
                    store.execute_icon_action(&icon_id, ContextAction::Open);
                }
            }
            DesktopInput::PointerLeftWindow => store.cancel_gestures(),
            DesktopInput::KeyDown { key, modifiers } => key_down(store, &key, modifiers),
            DesktopInput::ViewportResized {
                width,
                height,
                at_ms,
            } => self.resize.record(width, height, at_ms),
            DesktopInput::Tick { now_ms } => {
                if let Some((width, height)) = self.resize.poll(now_ms) {
                    self.surface.w = width;
                    self.surface.h = height;
                    store.set_viewport(width, height);
                    store.reclamp_positions();
                }
            }
            DesktopInput::Drop {
                raw_payload,
                pointer,
            } => {
                let target = self.icon_at(store, pointer);
                store.drop_payload(&raw_payload, target.as_ref());
            }
        }
    }

    fn icon_at(&self, store: &DesktopStore, pointer: PointerPosition) -> Option<IconId> {
        let local = self.surface.local(pointer);
        grid::hit_test(&store.state().icons, &store.config().grid, local.x, local.y)
            .map(|icon| icon.id.clone())
    }

    fn pointer_down(
        &mut self,
        store: &mut DesktopStore,
        pointer: PointerPosition,
        button: PointerButton,
        modifiers: Modifiers,
    ) {
        if !self.surface.contains(pointer) || !store.interaction().is_idle() {
            return;
        }
        let hit = self.icon_at(store, pointer);
        match button {
            PointerButton::Primary => {
                if store.state().context_menu.open {
                    store.close_context_menu();
                }
                match hit {
                    Some(icon_id) => self.press_icon(store, icon_id, pointer, modifiers),
                    None => store.begin_marquee(
                        pointer.x,
                        pointer.y,
                        self.surface,
                        modifiers.toggles_selection(),
                    ),
                }
            }
            PointerButton::Secondary => store.open_context_menu(pointer.x, pointer.y, hit.as_ref()),
            PointerButton::Other => {}
        }
    }

    fn press_icon(
        &self,
        store: &mut DesktopStore,
        icon_id: IconId,
        pointer: PointerPosition,
        modifiers: Modifiers,
    ) {
        if modifiers.toggles_selection() {
            store.toggle_icon_selection(&icon_id);
            return;
        }
        if !store.state().is_selected(&icon_id) {
            store.select_icon(&icon_id);
        }
        let Some(icon) = store.state().icon(&icon_id) else {
            return;
        };
        if icon.uses_grid_drag() {
            let cell = cell_box(&store.config().grid, icon.position);
            let local = self.surface.local(pointer);
            store.start_drag(&icon_id, local.x - cell.left, local.y - cell.top);
        }
    }

    fn pointer_move(&self, store: &mut DesktopStore, pointer: PointerPosition) {
        if store.interaction().drag().is_some() {
            store.update_drag_ghost(pointer.x, pointer.y, self.surface);
        } else if store.interaction().marquee().is_some() {
            store.update_marquee(pointer.x, pointer.y);
        }
    }

    fn pointer_up(&self, store: &mut DesktopStore, pointer: PointerPosition) {
        if store.interaction().drag().is_some() {
            store.update_drag_ghost(pointer.x, pointer.y, self.surface);
            store.end_drag();
        } else if store.interaction().marquee().is_some() {
            store.update_marquee(pointer.x, pointer.y);
            let threshold = store.config().marquee_click_threshold_px;
            let background_click = store
                .interaction()
                .marquee()
                .is_some_and(|session| !session.additive && session.is_click(threshold));
            store.end_marquee();
            if background_click {
                store.deselect_all();
            }
        }
    }
}

fn key_down(store: &mut DesktopStore, key: &str, modifiers: Modifiers) {
    let renaming = store.state().renaming.is_some();
    match key {
        "Escape" => {
            if renaming {
                store.cancel_rename();
            } else if store.state().context_menu.open {
                store.close_context_menu();
            } else {
                store.cancel_gestures();
                store.deselect_all();
            }
        }
        "Delete" | "Backspace" if !renaming => store.delete_selection(),
        "F2" if !renaming => {
            if let Some(icon_id) = single_selection(store) {
                store.begin_rename(&icon_id);
            }
        }
        "Enter" if !renaming => {
            if let Some(icon_id) = single_selection(store) {
                store.execute_icon_action(&icon_id, ContextAction::Open);
            }
        }
        "a" | "A" if modifiers.toggles_selection() && !renaming => store.select_all(),
        _ => {}
    }
}

fn single_selection(store: &DesktopStore) -> Option<IconId> {
    let selection = &store.state().selection;
    if selection.len() == 1 {
        selection.iter().next().cloned()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use platform_host::FsNode;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{model::GridPosition, reducer::RuntimeEffect, test_support::*};

    fn setup() -> (DesktopStore, InputRouter) {
        let store = DesktopStore::new(test_config()).with_clock(|| 5);
        let router = InputRouter::new(test_surface(), 250);
        (store, router)
    }

    fn down(x: i32, y: i32, button: PointerButton, modifiers: Modifiers) -> DesktopInput {
        DesktopInput::PointerDown {
            pointer: PointerPosition::new(x, y),
            button,
            modifiers,
        }
    }

    fn primary(x: i32, y: i32) -> DesktopInput {
        down(x, y, PointerButton::Primary, Modifiers::NONE)
    }

    fn moved(x: i32, y: i32) -> DesktopInput {
        DesktopInput::PointerMove {
            pointer: PointerPosition::new(x, y),
        }
    }

    fn up(x: i32, y: i32) -> DesktopInput {
        DesktopInput::PointerUp {
            pointer: PointerPosition::new(x, y),
        }
    }

    fn key(name: &str) -> DesktopInput {
        DesktopInput::KeyDown {
            key: name.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    #[test]
    fn debouncer_fires_once_after_quiet_period() {
        let mut debouncer = ResizeDebouncer::new(250);
        debouncer.record(800, 600, 0);
        debouncer.record(700, 500, 100);
        assert_eq!(debouncer.poll(300), None);
        assert_eq!(debouncer.poll(350), Some((700, 500)));
        assert_eq!(debouncer.poll(1_000), None);
    }

    #[test]
    fn queue_is_first_in_first_out() {
        let mut queue = InputQueue::new();
        queue.push(key("Escape"));
        queue.push(DesktopInput::PointerLeftWindow);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.pop(), Some(key("Escape")));
        assert_eq!(queue.pop(), Some(DesktopInput::PointerLeftWindow));
        assert!(queue.is_empty());
    }

    #[test]
    fn press_drag_release_moves_system_icon() {
        let (mut store, mut router) = setup();
        router.route(&mut store, primary(230, 340));
        assert_eq!(store.state().selection, BTreeSet::from([sys_a()]));
        assert!(store.interaction().drag().is_some());

        router.route(&mut store, moved(330, 140));
        router.route(&mut store, up(330, 140));

        assert_eq!(
            store.state().icon(&sys_a()).expect("a").position,
            GridPosition::new(3, 1)
        );
        assert!(store.interaction().is_idle());
    }

    #[test]
    fn pressing_a_folder_selects_without_grid_drag() {
        let (mut store, mut router) = setup();
        store.sync_db_folders(vec![FsNode::folder("f1", "Docs")]);
        router.route(&mut store, primary(50, 150));
        assert_eq!(store.state().selection, BTreeSet::from([folder_id("f1")]));
        assert!(store.interaction().is_idle());
    }

    #[test]
    fn background_click_deselects_but_toggle_click_keeps_selection() {
        let (mut store, mut router) = setup();
        store.select_icon(&sys_b());

        router.route(
            &mut store,
            down(550, 50, PointerButton::Primary, Modifiers {
                ctrl: true,
                ..Modifiers::NONE
            }),
        );
        router.route(&mut store, up(551, 51));
        assert_eq!(store.state().selection, BTreeSet::from([sys_b()]));

        router.route(&mut store, primary(550, 50));
        router.route(&mut store, up(551, 51));
        assert!(store.state().selection.is_empty());
    }

    #[test]
    fn marquee_drag_selects_covered_icons() {
        let (mut store, mut router) = setup();
        router.route(&mut store, primary(150, 250));
        router.route(&mut store, moved(450, 550));
        router.route(&mut store, up(450, 550));
        assert_eq!(store.state().selection, BTreeSet::from([sys_a(), sys_b()]));
    }

    #[test]
    fn leaving_window_ends_gestures() {
        let (mut store, mut router) = setup();
        router.route(&mut store, primary(230, 340));
        router.route(&mut store, moved(30, 640));
        router.route(&mut store, DesktopInput::PointerLeftWindow);
        assert!(store.interaction().is_idle());
        assert_eq!(
            store.state().icon(&sys_a()).expect("a").position,
            GridPosition::new(2, 3)
        );
    }

    #[test]
    fn secondary_click_opens_icon_or_background_menu() {
        let (mut store, mut router) = setup();
        router.route(
            &mut store,
            down(20, 20, PointerButton::Secondary, Modifiers::NONE),
        );
        assert_eq!(
            store.state().context_menu.target,
            Some(IconId::recycle_bin())
        );
        router.route(
            &mut store,
            down(550, 650, PointerButton::Secondary, Modifiers::NONE),
        );
        assert_eq!(store.state().context_menu.target, None);
        assert!(store.state().context_menu.open);

        router.route(&mut store, key("Escape"));
        assert!(!store.state().context_menu.open);
    }

    #[test]
    fn keyboard_shortcuts_drive_rename_and_delete() {
        let (mut store, mut router) = setup();
        store.sync_db_prompts(vec![FsNode::prompt("p1", "Outline")]);
        let prompt = store.state().icons.last().expect("prompt").id.clone();
        store.select_icon(&prompt);

        router.route(&mut store, key("F2"));
        assert_eq!(store.state().renaming, Some(prompt.clone()));
        router.route(&mut store, key("Delete"));
        assert!(store.state().icon(&prompt).is_some());
        router.route(&mut store, key("Escape"));
        assert_eq!(store.state().renaming, None);

        router.route(&mut store, key("Delete"));
        assert!(store.state().icon(&prompt).is_none());
        assert_eq!(store.state().recycle_bin[0].trashed_at, 5);
    }

    #[test]
    fn settled_resize_reclamps_once() {
        let (mut store, mut router) = setup();
        router.route(
            &mut store,
            DesktopInput::ViewportResized {
                width: 300,
                height: 300,
                at_ms: 1_000,
            },
        );
        router.route(&mut store, DesktopInput::Tick { now_ms: 1_100 });
        assert_eq!(store.state().bounds.cols, 6);

        router.route(&mut store, DesktopInput::Tick { now_ms: 1_250 });
        let bounds = store.state().bounds;
        assert_eq!((bounds.cols, bounds.rows), (3, 3));
        assert!(store
            .state()
            .icons
            .iter()
            .all(|icon| bounds.contains(icon.position)));
        assert_eq!(router.surface().w, 300);
        assert!(store.pending_effects().contains(&RuntimeEffect::PersistLayout));
    }

    #[test]
    fn payload_drop_targets_icon_under_pointer() {
        let (mut store, mut router) = setup();
        store.sync_db_folders(vec![FsNode::folder("f1", "Docs")]);
        store.take_effects();
        router.route(
            &mut store,
            DesktopInput::Drop {
                raw_payload:
                    r#"{"descriptor":{"kind":"prompt","id":"p4","name":"N"},"source":"editor"}"#
                        .to_string(),
                pointer: PointerPosition::new(40, 140),
            },
        );
        assert_eq!(
            store.take_effects(),
            vec![RuntimeEffect::MoveNode {
                kind: platform_host::FsNodeKind::Prompt,
                id: "p4".to_string(),
                target_folder_id: Some("f1".to_string()),
            }]
        );
    }
}
