//! Host-side helpers for executing reducer effects, loading boot state, and keeping filesystem
//! icons in sync.
//!
//! The store itself never awaits. Everything that touches a host service lives here behind the
//! `platform_host` traits so browser, desktop, and test hosts can inject their own adapters.

mod boot;
mod effects;
mod sync;

use std::rc::Rc;

use platform_host::{
    EventBus, FilesystemService, LocalEventBus, NoopFilesystemService, NoopPrefsStore, PrefsStore,
};

pub use boot::{boot_store, load_desktop_config};
pub use effects::{run_runtime_effect, EffectOutcome};
pub use sync::{refresh_desktop, watch_filesystem_events, ResyncFlag};

#[derive(Clone)]
/// Host service bundle for desktop side effects.
pub struct DesktopHostContext {
    fs: Rc<dyn FilesystemService>,
    prefs: Rc<dyn PrefsStore>,
    events: Rc<dyn EventBus>,
}

impl Default for DesktopHostContext {
    fn default() -> Self {
        Self {
            fs: Rc::new(NoopFilesystemService),
            prefs: Rc::new(NoopPrefsStore),
            events: Rc::new(LocalEventBus::default()),
        }
    }
}

impl DesktopHostContext {
    /// Bundles injected services.
    pub fn new(
        fs: Rc<dyn FilesystemService>,
        prefs: Rc<dyn PrefsStore>,
        events: Rc<dyn EventBus>,
    ) -> Self {
        Self { fs, prefs, events }
    }

    /// Returns the filesystem orchestrator.
    pub fn fs_service(&self) -> Rc<dyn FilesystemService> {
        self.fs.clone()
    }

    /// Returns the preference store.
    pub fn prefs_store(&self) -> Rc<dyn PrefsStore> {
        self.prefs.clone()
    }

    /// Returns the system event bus.
    pub fn event_bus(&self) -> Rc<dyn EventBus> {
        self.events.clone()
    }
}
