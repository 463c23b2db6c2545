//! Single-threaded desktop runtime: input queue, store, host effects, and filesystem resync.

use platform_host::Subscription;

use crate::{
    host::{
        boot_store, refresh_desktop, run_runtime_effect, watch_filesystem_events,
        DesktopHostContext, EffectOutcome, ResyncFlag,
    },
    input::{DesktopInput, InputQueue, InputRouter},
    model::SurfaceRect,
    reducer::RuntimeEffect,
    store::DesktopStore,
};

/// Owns the desktop store and drives it from queued input on the UI thread.
///
/// Hosts push [`DesktopInput`] events as they arrive, call [`DesktopRuntime::pump`] to apply them,
/// then await [`DesktopRuntime::flush_effects`] to run persistence and filesystem requests.
/// Effects meant for the surrounding shell are returned from `flush_effects`.
pub struct DesktopRuntime {
    host: DesktopHostContext,
    store: DesktopStore,
    router: InputRouter,
    queue: InputQueue,
    resync: ResyncFlag,
    _fs_watch: Vec<Subscription>,
}

impl DesktopRuntime {
    /// Boots the store from host preferences and the filesystem, sized to `surface`.
    pub async fn boot(host: DesktopHostContext, surface: SurfaceRect) -> Self {
        let mut store = boot_store(&host, surface).await;
        store.reclamp_positions();
        let router = InputRouter::new(surface, store.config().resize_debounce_ms);
        let resync = ResyncFlag::default();
        let fs_watch = watch_filesystem_events(host.event_bus().as_ref(), &resync);
        Self {
            host,
            store,
            router,
            queue: InputQueue::new(),
            resync,
            _fs_watch: fs_watch,
        }
    }

    pub fn store(&self) -> &DesktopStore {
        &self.store
    }

    /// Direct store access for presentation code calling operations outside the input path.
    pub fn store_mut(&mut self) -> &mut DesktopStore {
        &mut self.store
    }

    pub fn router(&self) -> &InputRouter {
        &self.router
    }

    pub fn push_input(&mut self, input: DesktopInput) {
        self.queue.push(input);
    }

    /// Applies every queued input in order. Returns how many were processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Some(input) = self.queue.pop() {
            self.router.route(&mut self.store, input);
            processed += 1;
        }
        processed
    }

    /// Runs queued effects and any pending resync until both are drained.
    pub async fn flush_effects(&mut self) -> Vec<RuntimeEffect> {
        let mut forwarded = Vec::new();
        loop {
            let effects = self.store.take_effects();
            for effect in effects {
                match run_runtime_effect(&self.host, self.store.state(), effect).await {
                    EffectOutcome::Handled => {}
                    EffectOutcome::Resync => self.resync.raise(),
                    EffectOutcome::Forward(effect) => forwarded.push(effect),
                }
            }
            if self.resync.take() {
                refresh_desktop(&self.host, &mut self.store).await;
            }
            if self.store.pending_effects().is_empty() && !self.resync.is_raised() {
                return forwarded;
            }
        }
    }

    /// Pumps input, then flushes effects.
    pub async fn tick(&mut self) -> Vec<RuntimeEffect> {
        self.pump();
        self.flush_effects().await
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use futures::executor::block_on;
    use platform_host::{
        EventBus, FsNode, FsNodeKind, LocalEventBus, MemoryFilesystemService, MemoryPrefsStore,
        SystemEvent, FS_CREATED,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        drag_payload::{DragDescriptor, DragPayload, DragSource},
        input::{Modifiers, PointerButton},
        model::{GridPosition, IconId, PointerPosition},
        persistence::LAYOUT_PREFS_KEY,
    };

    const SURFACE: SurfaceRect = SurfaceRect {
        x: 0,
        y: 0,
        w: 1280,
        h: 720,
    };

    struct Harness {
        fs: MemoryFilesystemService,
        prefs: MemoryPrefsStore,
        bus: LocalEventBus,
        runtime: DesktopRuntime,
    }

    fn boot(nodes: Vec<FsNode>) -> Harness {
        let fs = MemoryFilesystemService::with_nodes(nodes);
        let prefs = MemoryPrefsStore::default();
        let bus = LocalEventBus::default();
        let host = DesktopHostContext::new(
            Rc::new(fs.clone()),
            Rc::new(prefs.clone()),
            Rc::new(bus.clone()),
        );
        let runtime = block_on(DesktopRuntime::boot(host, SURFACE));
        Harness {
            fs,
            prefs,
            bus,
            runtime,
        }
    }

    fn folder_icon() -> IconId {
        IconId::for_node(FsNodeKind::Folder, "f1")
    }

    fn drop_on_folder(harness: &mut Harness, kind: FsNodeKind, id: &str) {
        let position = harness
            .runtime
            .store()
            .state()
            .icon(&folder_icon())
            .expect("folder icon")
            .position;
        assert_eq!(position, GridPosition::new(0, 4));
        let payload = DragPayload {
            descriptor: DragDescriptor {
                kind,
                id: id.to_string(),
                name: "dragged".to_string(),
            },
            source: DragSource::Desktop,
        };
        harness.runtime.push_input(DesktopInput::Drop {
            raw_payload: payload.encode().expect("encode"),
            pointer: PointerPosition::new(50, 430),
        });
        block_on(harness.runtime.tick());
    }

    #[test]
    fn folder_dropped_on_itself_never_reaches_move_collaborator() {
        let mut harness = boot(vec![FsNode::folder("f1", "Docs")]);
        drop_on_folder(&mut harness, FsNodeKind::Folder, "f1");
        assert!(harness.fs.recorded_moves().is_empty());
    }

    #[test]
    fn prompt_dropped_on_folder_moves_and_resyncs() {
        let mut harness = boot(vec![
            FsNode::folder("f1", "Docs"),
            FsNode::prompt("p1", "Draft"),
        ]);
        let prompt = IconId::for_node(FsNodeKind::Prompt, "p1");
        assert!(harness.runtime.store().state().icon(&prompt).is_some());

        drop_on_folder(&mut harness, FsNodeKind::Prompt, "p1");

        assert_eq!(harness.fs.recorded_moves().len(), 1);
        assert_eq!(
            harness.fs.node("p1").expect("p1").parent_id.as_deref(),
            Some("f1")
        );
        assert!(harness.runtime.store().state().icon(&prompt).is_none());
    }

    #[test]
    fn filesystem_events_trigger_refresh_on_next_flush() {
        let mut harness = boot(Vec::new());
        harness.fs.upsert(FsNode::folder("f9", "Fresh"));
        harness
            .bus
            .emit(&SystemEvent::new(FS_CREATED, json!({ "id": "f9" })));

        block_on(harness.runtime.flush_effects());

        assert!(harness
            .runtime
            .store()
            .state()
            .icon(&IconId::for_node(FsNodeKind::Folder, "f9"))
            .is_some());
    }

    #[test]
    fn grid_drag_persists_layout_and_open_is_forwarded() {
        let mut harness = boot(Vec::new());
        let runtime = &mut harness.runtime;
        runtime.push_input(DesktopInput::PointerDown {
            pointer: PointerPosition::new(40, 40),
            button: PointerButton::Primary,
            modifiers: Modifiers::NONE,
        });
        runtime.push_input(DesktopInput::PointerMove {
            pointer: PointerPosition::new(300, 40),
        });
        runtime.push_input(DesktopInput::PointerUp {
            pointer: PointerPosition::new(300, 40),
        });
        runtime.push_input(DesktopInput::DoubleClick {
            pointer: PointerPosition::new(40, 130),
        });

        let forwarded = block_on(runtime.tick());

        assert_eq!(
            forwarded,
            vec![RuntimeEffect::OpenIcon {
                icon_id: IconId::new("sys:history")
            }]
        );
        let saved = harness.prefs.raw(LAYOUT_PREFS_KEY).expect("layout saved");
        let snapshot: serde_json::Value = serde_json::from_str(&saved).expect("json");
        assert_eq!(snapshot["positions"]["sys:forge"], json!({ "col": 3, "row": 0 }));
    }
}
