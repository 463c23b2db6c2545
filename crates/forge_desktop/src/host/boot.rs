use platform_host::PrefsStore;

use crate::{
    config::DesktopConfig,
    host::{refresh_desktop, DesktopHostContext},
    model::SurfaceRect,
    persistence,
    store::DesktopStore,
};

/// Embedded manifest with user overrides from preferences applied.
pub async fn load_desktop_config(prefs: &dyn PrefsStore) -> DesktopConfig {
    let mut config = DesktopConfig::embedded();
    if let Some(overrides) = persistence::load_config_overrides(prefs).await {
        config.apply_overrides(overrides);
    }
    config
}

/// Builds the boot store: configuration, persisted layout, then the first filesystem sync.
///
/// The grid is sized to `surface` before the saved layout is applied so remembered cells beyond
/// the manifest viewport survive.
pub async fn boot_store(host: &DesktopHostContext, surface: SurfaceRect) -> DesktopStore {
    let prefs = host.prefs_store();
    let mut store = DesktopStore::new(load_desktop_config(prefs.as_ref()).await);
    store.set_viewport(surface.w, surface.h);
    if let Some(snapshot) = persistence::load_layout_snapshot(prefs.as_ref()).await {
        store.hydrate_layout(snapshot);
    }
    refresh_desktop(host, &mut store).await;
    store
}
